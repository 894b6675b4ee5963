//! Minimal token contracts used by the integration tests, standing in for
//! the external collaborators: a KIP17/ERC721-style NFT collection and a
//! KIP7/ERC20-style credit token.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::token::{INTROSPECTION_INTERFACE_ID, NFT_INTERFACE_ID};

/// Mock-token failure kinds. Discriminants start at 100 to keep them
/// apart from the protocol's own error codes.
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockTokenError {
    /// Token id already minted.
    TokenAlreadyMinted = 100,
    /// Token id does not exist.
    TokenNotMinted = 101,
    /// Caller is neither holder nor approved for the transfer.
    TransferNotAuthorized = 102,
    /// Sender balance too low.
    InsufficientBalance = 103,
    /// Spender allowance too low.
    InsufficientAllowance = 104,
}

/// Non-fungible test collection.
#[odra::module]
pub struct MockNft {
    name: Var<String>,
    symbol: Var<String>,
    owners: Mapping<u64, Address>,
    balances: Mapping<Address, u64>,
    token_approvals: Mapping<u64, Address>,
    operator_approvals: Mapping<(Address, Address), bool>,
}

#[odra::module]
impl MockNft {
    /// Names the collection.
    pub fn init(&mut self, name: String, symbol: String) {
        self.name.set(name);
        self.symbol.set(symbol);
    }

    /// Collection name.
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Collection symbol.
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Mints `token_id` to `to`. Open to any caller; this is a test
    /// double, not a production token.
    pub fn mint(&mut self, to: Address, token_id: u64) {
        if self.owners.get(&token_id).is_some() {
            self.env().revert(MockTokenError::TokenAlreadyMinted);
        }
        self.owners.set(&token_id, to);
        self.balances.set(&to, self.balances.get_or_default(&to) + 1);
    }

    /// Current holder of `token_id`.
    pub fn owner_of(&self, token_id: u64) -> Address {
        match self.owners.get(&token_id) {
            Some(owner) => owner,
            None => self.env().revert(MockTokenError::TokenNotMinted),
        }
    }

    /// Number of tokens held by `owner`.
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.balances.get_or_default(&owner)
    }

    /// Approves `to` to move `token_id` once. Caller must hold the token.
    pub fn approve(&mut self, to: Address, token_id: u64) {
        let owner = self.owner_of(token_id);
        if self.env().caller() != owner {
            self.env().revert(MockTokenError::TransferNotAuthorized);
        }
        self.token_approvals.set(&token_id, to);
    }

    /// Grants or revokes `operator` the right to move any of the caller's
    /// tokens.
    pub fn set_approval_for_all(&mut self, operator: Address, approved: bool) {
        let caller = self.env().caller();
        self.operator_approvals.set(&(caller, operator), approved);
    }

    /// Moves `token_id` from `from` to `to`. The caller must be the
    /// holder, the per-token approvee, or an approved operator.
    pub fn transfer_from(&mut self, from: Address, to: Address, token_id: u64) {
        let owner = self.owner_of(token_id);
        if owner != from {
            self.env().revert(MockTokenError::TransferNotAuthorized);
        }

        let caller = self.env().caller();
        let approved = self.token_approvals.get(&token_id) == Some(caller)
            || self.operator_approvals.get_or_default(&(owner, caller));
        if caller != owner && !approved {
            self.env().revert(MockTokenError::TransferNotAuthorized);
        }

        // Collapse any stale approval onto the new holder.
        self.token_approvals.set(&token_id, to);
        self.owners.set(&token_id, to);
        self.balances.set(&from, self.balances.get_or_default(&from) - 1);
        self.balances.set(&to, self.balances.get_or_default(&to) + 1);
    }

    /// Acknowledges the non-fungible and introspection interface ids.
    pub fn supports_interface(&self, interface_id: u32) -> bool {
        interface_id == NFT_INTERFACE_ID || interface_id == INTROSPECTION_INTERFACE_ID
    }
}

/// Fungible test credit token.
#[odra::module]
pub struct MockCreditToken {
    name: Var<String>,
    symbol: Var<String>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockCreditToken {
    /// Names the token.
    pub fn init(&mut self, name: String, symbol: String) {
        self.name.set(name);
        self.symbol.set(symbol);
    }

    /// Token name.
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Token symbol.
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    /// Mints `amount` to `to`. Open to any caller; this is a test double.
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.balances
            .set(&to, self.balances.get_or_default(&to) + amount);
        self.total_supply
            .set(self.total_supply.get_or_default() + amount);
    }

    /// Balance held by `owner`.
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get_or_default(&owner)
    }

    /// Moves `amount` from the caller to `to`.
    pub fn transfer(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        self.move_balance(caller, to, amount);
    }

    /// Authorizes `spender` to move up to `amount` of the caller's
    /// balance.
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let caller = self.env().caller();
        self.allowances.set(&(caller, spender), amount);
    }

    /// Remaining allowance from `owner` to `spender`.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get_or_default(&(owner, spender))
    }

    /// Moves `amount` from `from` to `to`, consuming the caller's
    /// allowance.
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) {
        let caller = self.env().caller();
        let allowance = self.allowances.get_or_default(&(from, caller));
        if allowance < amount {
            self.env().revert(MockTokenError::InsufficientAllowance);
        }
        self.allowances.set(&(from, caller), allowance - amount);
        self.move_balance(from, to, amount);
    }

    /// Acknowledges only the introspection interface id; this is not a
    /// non-fungible token.
    pub fn supports_interface(&self, interface_id: u32) -> bool {
        interface_id == INTROSPECTION_INTERFACE_ID
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balances.get_or_default(&from);
        if from_balance < amount {
            self.env().revert(MockTokenError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - amount);
        self.balances.set(&to, self.balances.get_or_default(&to) + amount);
    }
}
