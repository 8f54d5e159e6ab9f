use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// The number of minor units in one decimal point as reported by the accrual service.
pub const MINOR_UNITS_PER_POINT: i64 = 100;

//--------------------------------------        Points         ---------------------------------------------------------
/// An amount of loyalty points, held as an integer number of minor units (1/100 of a point).
///
/// The decimal representation only exists at the edges of the system. Everything that is stored or summed uses
/// the integer value.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Points(i64);

op!(binary Points, Add, add);
op!(binary Points, Sub, sub);
op!(inplace Points, AddAssign, add_assign);
op!(inplace Points, SubAssign, sub_assign);
op!(unary Points, Neg, neg);

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in points: {0}")]
pub struct PointsConversionError(String);

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_point = MINOR_UNITS_PER_POINT.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_point, abs % per_point)
    }
}

impl Points {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Converts a decimal amount (e.g. `729.98`) into minor units, rounding to the nearest minor unit.
    ///
    /// Plain truncation of `value * 100` would turn `729.98` into `72997`, so the rounding is not optional.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_decimal(value: f64) -> Result<Self, PointsConversionError> {
        if !value.is_finite() {
            return Err(PointsConversionError(format!("{value} is not a finite number")));
        }
        let minor = (value * MINOR_UNITS_PER_POINT as f64).round();
        if minor >= i64::MAX as f64 || minor <= i64::MIN as f64 {
            return Err(PointsConversionError(format!("{value} is out of range")));
        }
        Ok(Self(minor as i64))
    }

    /// The decimal representation of this amount, as used by the public API.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / MINOR_UNITS_PER_POINT as f64
    }
}
