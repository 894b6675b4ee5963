//! Contract events emitted on every state mutation.

use odra::prelude::*;
use odra::casper_types::U256;

/// A collection was added to the whitelist.
#[odra::event]
pub struct WhitelistAdded {
    /// Collection contract address.
    pub collection: Address,
    /// Maximum loan-to-value, WAD-scaled percent.
    pub max_ltv: U256,
    /// Liquidation loan-to-value, WAD-scaled percent.
    pub liq_ltv: U256,
}

/// A collection was removed from the whitelist.
#[odra::event]
pub struct WhitelistRemoved {
    /// Collection contract address.
    pub collection: Address,
}

/// New oracle price data was pushed for a collection.
#[odra::event]
pub struct FloorPriceSet {
    /// Collection contract address.
    pub collection: Address,
    /// Raw unit price in the priced currency, WAD-scaled.
    pub nft_unit_price: U256,
    /// Conversion rate to the settlement currency, WAD-scaled.
    pub exchange_rate: U256,
}

/// A risk parameter of a whitelisted collection changed.
#[odra::event]
pub struct RiskParamsUpdated {
    /// Collection contract address.
    pub collection: Address,
    /// Maximum loan-to-value after the change.
    pub max_ltv: U256,
    /// Liquidation loan-to-value after the change.
    pub liq_ltv: U256,
    /// Interest rate after the change.
    pub interest_rate: U256,
}

/// An NFT was taken into engine custody.
#[odra::event]
pub struct NftStaked {
    /// Position owner.
    pub staker: Address,
    /// Collection contract address.
    pub collection: Address,
    /// Token id within the collection.
    pub token_id: u64,
}

/// Credit was drawn against a staked NFT.
#[odra::event]
pub struct LoanDrawn {
    /// Position owner.
    pub staker: Address,
    /// Collection contract address.
    pub collection: Address,
    /// Token id within the collection.
    pub token_id: u64,
    /// Amount drawn in this call, WAD-scaled.
    pub amount: U256,
    /// Outstanding principal after the draw.
    pub principal: U256,
}

/// Outstanding principal was paid down.
#[odra::event]
pub struct LoanRepaid {
    /// Position owner.
    pub staker: Address,
    /// Collection contract address.
    pub collection: Address,
    /// Token id within the collection.
    pub token_id: u64,
    /// Amount repaid in this call, WAD-scaled.
    pub amount: U256,
    /// True when the repayment closed the position and returned the NFT.
    pub closed: bool,
}

/// A position breached the liquidation threshold and was closed out.
#[odra::event]
pub struct PositionLiquidated {
    /// Former position owner.
    pub staker: Address,
    /// Collection contract address.
    pub collection: Address,
    /// Token id within the collection.
    pub token_id: u64,
    /// Principal outstanding at liquidation time.
    pub principal: U256,
}
