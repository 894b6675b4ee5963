//! Fixed-point arithmetic used for all monetary and ratio values.

pub mod common;
pub mod decimal;

pub use common::{TryAdd, TryDiv, TryMul, TrySub, HALF_WAD, PERCENT_SCALER, SCALE, WAD};
pub use decimal::Decimal;
