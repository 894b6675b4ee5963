//! Capability interfaces for the external token collaborators.
//!
//! The engine calls into arbitrary contract addresses expecting these
//! entrypoints; conformance of a collateral collection is probed at stake
//! time through `supports_interface` and rejected with
//! [`UnsupportedToken`](crate::error::Error::UnsupportedToken) when the
//! probe fails. Token transfers are synchronous and all-or-nothing: a
//! failed transfer reverts the whole enclosing operation.

use odra::prelude::*;
use odra::casper_types::U256;

/// KIP17/ERC721 interface id, the value a conforming non-fungible
/// collection must acknowledge.
pub const NFT_INTERFACE_ID: u32 = 0x80ac58cd;

/// ERC165-style base interface id acknowledged by any probeable token.
pub const INTROSPECTION_INTERFACE_ID: u32 = 0x01ffc9a7;

/// Non-fungible collateral collection.
#[odra::external_contract]
pub trait NonFungibleToken {
    /// Current holder of `token_id`. Reverts for a nonexistent token.
    fn owner_of(&self, token_id: u64) -> Address;
    /// Moves `token_id` from `from` to `to`. Reverts unless the caller is
    /// the holder or pre-authorized.
    fn transfer_from(&mut self, from: Address, to: Address, token_id: u64);
    /// Capability probe for interface conformance.
    fn supports_interface(&self, interface_id: u32) -> bool;
}

/// Fungible credit token used for loan payout and repayment.
#[odra::external_contract]
pub trait FungibleToken {
    /// Balance held by `owner`.
    fn balance_of(&self, owner: Address) -> U256;
    /// Moves `amount` from the caller to `to`.
    fn transfer(&mut self, to: Address, amount: U256);
    /// Moves `amount` from `from` to `to`; requires prior allowance.
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256);
}
