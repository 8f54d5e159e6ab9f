//! Server configuration.
//!
//! Every setting comes from an `LPS_*` environment variable and has a default. A value that cannot be parsed is
//! logged and replaced by the default, so a typo never stops the server from starting.
use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use loyalty_engine::accrual::{PollerConfig, DEFAULT_CONCURRENCY_LIMIT};
use lp_common::helpers::parse_boolean_flag;

use crate::errors::ServerError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_ACCRUAL_ADDRESS: &str = "http://localhost:8081";
const DEFAULT_ACCRUAL_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_POLL_TIME_UNIT: Duration = Duration::from_millis(1000);
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// If true, the embedded migrations are applied to the database on startup.
    pub run_migrations: bool,
    pub accrual: AccrualConfig,
    /// How long to wait for the accrual poller to wind down on shutdown before aborting it.
    pub shutdown_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AccrualConfig {
    /// Base URL of the accrual service, e.g. `http://localhost:8081`.
    pub address: String,
    pub request_timeout: Duration,
    pub initial_limit: u32,
    pub time_unit: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            run_migrations: true,
            accrual: AccrualConfig::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ACCRUAL_ADDRESS.to_string(),
            request_timeout: DEFAULT_ACCRUAL_REQUEST_TIMEOUT,
            initial_limit: DEFAULT_CONCURRENCY_LIMIT,
            time_unit: DEFAULT_POLL_TIME_UNIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from any source of variables. `get` returns `None` for unset variables.
    pub fn from_source<F>(get: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let database_url = get("LPS_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ LPS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections =
            parse_or_default(&get, "LPS_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS, |n: &u32| *n > 0);
        let run_migrations = parse_boolean_flag(get("LPS_RUN_MIGRATIONS"), true);
        let address = get("LPS_ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|| {
            info!("🪛️ LPS_ACCRUAL_SYSTEM_ADDRESS is not set. Using the default, {DEFAULT_ACCRUAL_ADDRESS}.");
            DEFAULT_ACCRUAL_ADDRESS.to_string()
        });
        let request_timeout = Duration::from_secs(parse_or_default(
            &get,
            "LPS_ACCRUAL_REQUEST_TIMEOUT",
            DEFAULT_ACCRUAL_REQUEST_TIMEOUT.as_secs(),
            |s: &u64| *s > 0,
        ));
        let initial_limit = parse_or_default(&get, "LPS_POLL_INITIAL_LIMIT", DEFAULT_CONCURRENCY_LIMIT, |n: &u32| *n > 0);
        let time_unit = Duration::from_millis(parse_or_default(
            &get,
            "LPS_POLL_TIME_UNIT_MS",
            1000,
            |ms: &u64| *ms > 0,
        ));
        let shutdown_timeout = Duration::from_secs(parse_or_default(
            &get,
            "LPS_SHUTDOWN_TIMEOUT",
            DEFAULT_SHUTDOWN_TIMEOUT.as_secs(),
            |_: &u64| true,
        ));
        Self {
            database_url,
            db_max_connections,
            run_migrations,
            accrual: AccrualConfig { address, request_timeout, initial_limit, time_unit },
            shutdown_timeout,
        }
    }

    /// Checks the settings that have no sensible fallback.
    pub fn validate(&self) -> Result<(), ServerError> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(ServerError::ConfigurationError(format!(
                "LPS_DATABASE_URL must be a sqlite URL, but is {}",
                self.database_url
            )));
        }
        let address = self.accrual.address.as_str();
        if !(address.starts_with("http://") || address.starts_with("https://")) {
            return Err(ServerError::ConfigurationError(format!(
                "LPS_ACCRUAL_SYSTEM_ADDRESS must be an http(s) URL, but is {address}"
            )));
        }
        Ok(())
    }
}

impl AccrualConfig {
    /// The poller settings for this configuration. The worker's request budget is the request timeout rounded up to
    /// whole time units.
    pub fn poller_config(&self) -> PollerConfig {
        let unit = self.time_unit.as_millis().max(1);
        let budget = self.request_timeout.as_millis().div_ceil(unit);
        let budget = u32::try_from(budget).unwrap_or(u32::MAX).max(1);
        PollerConfig::default()
            .with_initial_limit(self.initial_limit)
            .with_time_unit(self.time_unit)
            .with_request_budget(budget)
    }
}

fn parse_or_default<F, T, V>(get: &F, name: &str, default: T, valid: V) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
    V: Fn(&T) -> bool,
{
    match get(name) {
        None => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) if valid(&v) => v,
            Ok(v) => {
                warn!("🪛️ {v} is out of range for {name}. Using the default value of {default}.");
                default
            },
            Err(e) => {
                warn!("🪛️ Invalid configuration value for {name}. {e}. Using the default value of {default}.");
                default
            },
        },
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>();
        ServerConfig::from_source(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]);
        assert_eq!(config.database_url, "sqlite://data/loyalty.db");
        assert_eq!(config.db_max_connections, 25);
        assert!(config.run_migrations);
        assert_eq!(config.accrual.address, "http://localhost:8081");
        assert_eq!(config.accrual.request_timeout, Duration::from_secs(60));
        assert_eq!(config.accrual.initial_limit, 1000);
        assert_eq!(config.accrual.time_unit, Duration::from_secs(1));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn values_from_environment() {
        let config = config_from(&[
            ("LPS_DATABASE_URL", "sqlite::memory:"),
            ("LPS_DB_MAX_CONNECTIONS", "4"),
            ("LPS_RUN_MIGRATIONS", "false"),
            ("LPS_ACCRUAL_SYSTEM_ADDRESS", "https://accrual.example.com"),
            ("LPS_ACCRUAL_REQUEST_TIMEOUT", "15"),
            ("LPS_POLL_INITIAL_LIMIT", "50"),
            ("LPS_POLL_TIME_UNIT_MS", "10"),
            ("LPS_SHUTDOWN_TIMEOUT", "30"),
        ]);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.db_max_connections, 4);
        assert!(!config.run_migrations);
        assert_eq!(config.accrual.address, "https://accrual.example.com");
        assert_eq!(config.accrual.request_timeout, Duration::from_secs(15));
        assert_eq!(config.accrual.initial_limit, 50);
        assert_eq!(config.accrual.time_unit, Duration::from_millis(10));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("LPS_DB_MAX_CONNECTIONS", "lots"),
            ("LPS_POLL_INITIAL_LIMIT", "0"),
            ("LPS_POLL_TIME_UNIT_MS", "-5"),
            ("LPS_ACCRUAL_REQUEST_TIMEOUT", "1.5"),
        ]);
        assert_eq!(config.db_max_connections, 25);
        assert_eq!(config.accrual.initial_limit, 1000);
        assert_eq!(config.accrual.time_unit, Duration::from_secs(1));
        assert_eq!(config.accrual.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn validation() {
        let config = config_from(&[("LPS_DATABASE_URL", "postgres://localhost/loyalty")]);
        assert!(matches!(config.validate(), Err(ServerError::ConfigurationError(_))));
        let config = config_from(&[("LPS_ACCRUAL_SYSTEM_ADDRESS", "localhost:8081")]);
        assert!(matches!(config.validate(), Err(ServerError::ConfigurationError(_))));
    }

    #[test]
    fn poller_budget_covers_the_request_timeout() {
        let config = config_from(&[("LPS_POLL_TIME_UNIT_MS", "250"), ("LPS_ACCRUAL_REQUEST_TIMEOUT", "1")]);
        let poller = config.accrual.poller_config();
        assert_eq!(poller.request_budget, 4);
        assert_eq!(poller.request_timeout(), Duration::from_secs(1));
        assert_eq!(poller.initial_limit, 1000);
        let defaults = AccrualConfig::default().poller_config();
        assert_eq!(defaults.request_timeout(), Duration::from_secs(60));
        assert_eq!(defaults.pause_duration(loyalty_engine::accrual::Pause::Long), Duration::from_secs(60));
    }
}
