//! Protocol state: per-collection risk profiles and per-NFT loan positions.

pub mod ledger;
pub mod position;
pub mod risk_profile;

pub use ledger::PositionLedger;
pub use position::{Position, PositionKey};
pub use risk_profile::CollectionRiskProfile;

/// LTV values are percentages; capacity and ratio math divides by this.
pub const PERCENT_DIVISOR: u64 = 100;

/// Upper bound for both `max_ltv` and `liq_ltv`, in whole percent.
pub const MAX_LTV_PERCENT: u64 = 100;
