use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::accrual::AccrualError;

/// The body of a successful status response from the accrual service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualOrder {
    pub order: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<f64>,
}

/// A status response, classified by HTTP status code.
#[derive(Debug, Clone, PartialEq)]
pub enum AccrualResponse {
    /// 200. The service knows the order.
    Accepted(AccrualOrder),
    /// 204. The service has not registered the order yet.
    NoContent,
    /// 429
    TooManyRequests,
    /// 500
    ServerError,
    UnexpectedStatus(u16),
}

#[async_trait]
pub trait AccrualClient: Send + Sync {
    /// Asks the accrual service for the status of one order.
    ///
    /// Only failures to complete the exchange (network errors, timeouts, an unreadable 200 body) are errors. Every
    /// status code the service sends is reported as an [`AccrualResponse`].
    async fn fetch_accrual(&self, order_id: i64) -> Result<AccrualResponse, AccrualError>;
}

#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    base_url: String,
    client: Client,
}

impl HttpAccrualClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AccrualError> {
        // `gzip(true)` sends `Accept-Encoding: gzip` and decodes compressed bodies
        let client =
            Client::builder().timeout(timeout).gzip(true).build().map_err(|e| AccrualError::Transport(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn order_url(&self, order_id: i64) -> String {
        format!("{}/api/orders/{order_id}", self.base_url)
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn fetch_accrual(&self, order_id: i64) -> Result<AccrualResponse, AccrualError> {
        let url = self.order_url(order_id);
        trace!("🛰️ GET {url}");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| AccrualError::Transport(e.to_string()))?;
        let status = response.status();
        trace!("🛰️ Accrual service replied {status} for order {order_id}");
        let result = match status {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(|e| AccrualError::Transport(e.to_string()))?;
                let order = serde_json::from_slice::<AccrualOrder>(&body)
                    .map_err(|e| AccrualError::InvalidResponse(format!("Order {order_id}: {e}")))?;
                AccrualResponse::Accepted(order)
            },
            StatusCode::NO_CONTENT => AccrualResponse::NoContent,
            StatusCode::TOO_MANY_REQUESTS => AccrualResponse::TooManyRequests,
            StatusCode::INTERNAL_SERVER_ERROR => AccrualResponse::ServerError,
            other => AccrualResponse::UnexpectedStatus(other.as_u16()),
        };
        Ok(result)
    }
}
