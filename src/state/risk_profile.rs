//! Per-collection risk parameters and derived loan-capacity math.

use odra::casper_types::U256;

use crate::error::Error;
use crate::math::{Decimal, TryDiv, TryMul, WAD};
use crate::state::{MAX_LTV_PERCENT, PERCENT_DIVISOR};

/// Risk profile of a whitelisted NFT collection.
///
/// Floor price and available loan amount are derived on read, never stored.
/// A profile exists only while `is_whitelisted` is true; removal clears the
/// whole record so later reads see zero/false sentinels instead of stale
/// values.
#[odra::odra_type]
pub struct CollectionRiskProfile {
    /// Whitelist membership flag.
    pub is_whitelisted: bool,
    /// Maximum LTV permitted when drawing a loan, WAD-scaled percent in
    /// [0, 100].
    pub max_ltv: U256,
    /// LTV at or above which a position becomes liquidatable; strictly
    /// greater than `max_ltv`, at most 100.
    pub liq_ltv: U256,
    /// Interest rate, WAD-scaled percent. Stored and queryable only;
    /// accrual is not implemented.
    pub interest_rate: U256,
    /// Last-pushed raw unit price in the priced currency, WAD-scaled.
    pub nft_unit_price: U256,
    /// Conversion rate from the priced currency to the settlement
    /// currency, WAD-scaled.
    pub exchange_rate: U256,
}

impl CollectionRiskProfile {
    /// New whitelisted profile with zeroed oracle and interest fields.
    pub fn new(max_ltv: U256, liq_ltv: U256) -> Self {
        Self {
            is_whitelisted: true,
            max_ltv,
            liq_ltv,
            interest_rate: U256::zero(),
            nft_unit_price: U256::zero(),
            exchange_rate: U256::zero(),
        }
    }

    /// Fully zeroed record written on whitelist removal.
    pub fn cleared() -> Self {
        Self {
            is_whitelisted: false,
            max_ltv: U256::zero(),
            liq_ltv: U256::zero(),
            interest_rate: U256::zero(),
            nft_unit_price: U256::zero(),
            exchange_rate: U256::zero(),
        }
    }

    /// Checks the LTV ordering invariant: both bounds in [0, 100] and
    /// `liq_ltv` strictly above `max_ltv`.
    pub fn validate_ltv_bounds(max_ltv: U256, liq_ltv: U256) -> Result<(), Error> {
        let limit = U256::from(MAX_LTV_PERCENT) * U256::from(WAD);
        if max_ltv > limit || liq_ltv > limit {
            return Err(Error::InvalidLtv);
        }
        if liq_ltv <= max_ltv {
            return Err(Error::InvalidLtv);
        }
        Ok(())
    }

    /// Floor price in the settlement currency:
    /// `nft_unit_price * exchange_rate / WAD`.
    pub fn floor_price(&self) -> Result<Decimal, Error> {
        Decimal(self.nft_unit_price).try_mul(Decimal(self.exchange_rate))
    }

    /// Loan capacity against one token of the collection:
    /// `floor_price * max_ltv / 100`.
    pub fn available_loan_amount(&self) -> Result<Decimal, Error> {
        self.floor_price()?
            .try_mul(Decimal(self.max_ltv))?
            .try_div(PERCENT_DIVISOR)
    }
}
