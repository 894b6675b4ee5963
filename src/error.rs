//! Typed protocol errors surfaced through the host on every revert.

use core::fmt;

use odra::prelude::*;

/// Protocol error kinds. Every rejected call surfaces one of these so a
/// caller can tell "not my position" apart from "exceeds capacity" apart
/// from "not whitelisted".
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    // 0
    /// Caller is not allowed to perform the operation.
    NotAuthorized = 0,
    /// Collection has no profile in the risk registry.
    NotWhitelisted = 1,
    /// Collection already has a profile in the risk registry.
    AlreadyWhitelisted = 2,
    /// LTV bound violation: outside [0, 100] or liq_ltv <= max_ltv.
    InvalidLtv = 3,
    /// Zero amount where a positive amount is required, or an amount
    /// exceeding the outstanding principal on repay.
    InvalidAmount = 4,

    // 5
    /// No matching open position for the given key.
    PositionNotFound = 5,
    /// Caller does not hold the referenced NFT or position.
    NotOwner = 6,
    /// Borrow would push principal above the available loan amount.
    ExceedsLoanCapacity = 7,
    /// Engine lacks credit-token balance to fund the borrow.
    InsufficientLiquidity = 8,
    /// Operation attempted on a terminal, liquidated position.
    AlreadyLiquidated = 9,

    // 10
    /// Collateral asset does not conform to the non-fungible interface.
    UnsupportedToken = 10,
    /// Contract wiring (registry or token address) is unset or invalid.
    InvalidConfig = 11,
    /// Math operation overflow.
    MathOverflow = 12,
}

impl Error {
    /// Human-readable message for the error kind.
    pub fn message(&self) -> &str {
        match self {
            Error::NotAuthorized => "Caller is not authorized for this operation",
            Error::NotWhitelisted => "Collection is not whitelisted",
            Error::AlreadyWhitelisted => "Collection is already whitelisted",
            Error::InvalidLtv => "LTV outside [0, 100] or liquidation LTV not above max LTV",
            Error::InvalidAmount => "Input amount is invalid",
            Error::PositionNotFound => "No matching open position",
            Error::NotOwner => "Caller does not own the token or position",
            Error::ExceedsLoanCapacity => "Borrow amount exceeds available loan capacity",
            Error::InsufficientLiquidity => "Insufficient credit-token liquidity available",
            Error::AlreadyLiquidated => "Position has already been liquidated",
            Error::UnsupportedToken => "Collateral is not a conforming non-fungible token",
            Error::InvalidConfig => "Contract configuration is invalid",
            Error::MathOverflow => "Math operation overflow",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
