//! A single collateral position: one staked NFT and its outstanding loan.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::error::Error;
use crate::math::{Decimal, TryDiv, TryMul};
use crate::state::PERCENT_DIVISOR;

/// A staked NFT is unique protocol-wide, so positions are keyed by
/// (collection, token id); the owner lives inside the record.
#[odra::odra_type]
#[derive(Copy)]
pub struct PositionKey {
    /// Collection contract address.
    pub collection: Address,
    /// Token id within the collection.
    pub token_id: u64,
}

/// Lifecycle: created on stake with zero principal, principal raised only
/// by borrow and lowered only by repay, closed on full repayment or
/// liquidation. `is_liquidated` is terminal and monotonic.
#[odra::odra_type]
pub struct Position {
    /// Staker who deposited the NFT. Immutable identity field.
    pub owner: Address,
    /// Collection contract address. Immutable identity field.
    pub collection: Address,
    /// Token id within the collection. Immutable identity field.
    pub token_id: u64,
    /// True from successful stake until repayment-to-zero or liquidation
    /// relinquishes the right to reclaim the NFT.
    pub has_ownership: bool,
    /// Outstanding borrowed amount, WAD-scaled; zero while
    /// staked-but-not-borrowed.
    pub principal: U256,
    /// Terminal liquidation flag.
    pub is_liquidated: bool,
}

impl Position {
    /// Freshly staked position with no debt.
    pub fn new(owner: Address, collection: Address, token_id: u64) -> Self {
        Self {
            owner,
            collection,
            token_id,
            has_ownership: true,
            principal: U256::zero(),
            is_liquidated: false,
        }
    }

    /// Composite ledger key of this position.
    pub fn key(&self) -> PositionKey {
        PositionKey {
            collection: self.collection,
            token_id: self.token_id,
        }
    }

    /// Staked or borrowed, not yet closed or liquidated.
    pub fn is_open(&self) -> bool {
        self.has_ownership && !self.is_liquidated
    }

    /// Raises principal by `amount`. Capacity is checked by the engine
    /// against the live registry before this is called.
    pub fn draw(&mut self, amount: U256) -> Result<(), Error> {
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        Ok(())
    }

    /// Lowers principal by `amount`; overpayment is rejected. Returns true
    /// when the position reached zero debt and closed.
    pub fn settle(&mut self, amount: U256) -> Result<bool, Error> {
        if amount > self.principal {
            return Err(Error::InvalidAmount);
        }
        self.principal = self
            .principal
            .checked_sub(amount)
            .ok_or(Error::MathOverflow)?;
        if self.principal.is_zero() {
            self.has_ownership = false;
            return Ok(true);
        }
        Ok(false)
    }

    /// Drawn ratio against the given floor price, as a WAD-scaled percent:
    /// `principal / floor_price * 100`.
    pub fn current_ltv(&self, floor_price: Decimal) -> Result<Decimal, Error> {
        Decimal(self.principal)
            .try_div(floor_price)?
            .try_mul(PERCENT_DIVISOR)
    }

    /// Terminal transition: revokes the reclaim right and freezes the
    /// position.
    pub fn mark_liquidated(&mut self) {
        self.is_liquidated = true;
        self.has_ownership = false;
    }
}
