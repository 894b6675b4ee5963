//! Lending engine: stake, borrow, repay, liquidate and the sync sweep.
//!
//! Every lending decision reads the risk registry cross-contract at call
//! time; registry state is never cached here. The engine is the only
//! writer of the position ledger. Token collaborators are invoked at the
//! operation boundary as synchronous, all-or-nothing calls; a failed
//! transfer reverts the whole operation together with every storage write.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;

use crate::error::Error;
use crate::events::{LoanDrawn, LoanRepaid, NftStaked, PositionLiquidated};
use crate::math::Decimal;
use crate::registry::RiskRegistryContractRef;
use crate::state::{Position, PositionKey, PositionLedger};
use crate::token::{
    FungibleTokenContractRef, NonFungibleTokenContractRef, NFT_INTERFACE_ID,
};

/// Lending engine contract.
///
/// Per-position state machine:
/// `Unopened -> Staked -> Borrowed -> { Repaid(closed) | Liquidated }`.
/// A closed slot is reachable again only through a fresh stake.
#[odra::module]
pub struct LendingEngine {
    admin: Var<Address>,
    risk_registry: Var<Address>,
    credit_token: Var<Address>,
    ledger: SubModule<PositionLedger>,
}

#[odra::module]
impl LendingEngine {
    /// Initializes the engine with its collaborator addresses. The caller
    /// becomes the immutable administrator.
    pub fn init(&mut self, risk_registry: Address, credit_token: Address) {
        self.admin.set(self.env().caller());
        self.risk_registry.set(risk_registry);
        self.credit_token.set(credit_token);
    }

    // =======================================================================
    // LENDING OPERATIONS
    // =======================================================================

    /// Deposits a whitelisted NFT into engine custody and opens a position
    /// with zero principal.
    pub fn stake(&mut self, collection: Address, token_id: u64) {
        if let Err(error) = self.stake_position(collection, token_id) {
            self.env().revert(error);
        }
    }

    /// Draws `amount` of the credit token against a staked NFT, bounded by
    /// the collection's available loan amount at the current floor price.
    pub fn borrow(&mut self, amount: U256, collection: Address, token_id: u64) {
        if let Err(error) = self.borrow_against_position(amount, collection, token_id) {
            self.env().revert(error);
        }
    }

    /// Stakes and borrows in one atomic call.
    pub fn stake_and_borrow(&mut self, collection: Address, token_id: u64, amount: U256) {
        if let Err(error) = self.stake_position(collection, token_id) {
            self.env().revert(error);
        }
        if let Err(error) = self.borrow_against_position(amount, collection, token_id) {
            self.env().revert(error);
        }
    }

    /// Pays down `amount` of the outstanding principal. Repaying to zero
    /// returns the NFT to its owner and closes the position.
    pub fn repay(&mut self, amount: U256, collection: Address, token_id: u64) {
        if let Err(error) = self.repay_position(amount, collection, token_id) {
            self.env().revert(error);
        }
    }

    /// Administrator-only direct liquidation trigger.
    pub fn liquidate(&mut self, owner: Address, collection: Address, token_id: u64) {
        if self.env().caller() != self.admin() {
            self.env().revert(Error::NotAuthorized);
        }
        if let Err(error) = self.liquidate_position(owner, collection, token_id) {
            self.env().revert(error);
        }
    }

    /// Re-evaluates every open position against the live registry floor
    /// price and liquidates those whose drawn ratio reached the
    /// collection's liquidation LTV. Callable by anyone: the decision is
    /// price-objective, not caller-trusted.
    ///
    /// Each open position is visited exactly once per call, against a
    /// snapshot of the open index, so liquidating one position never
    /// affects evaluation of another. A position whose price data is
    /// missing or zero is left untouched rather than aborting the sweep.
    pub fn sync(&mut self) {
        let registry = self.registry_ref();
        for key in self.ledger.open_positions() {
            let position = match self.ledger.position(key) {
                Some(position) => position,
                None => continue,
            };
            if !position.is_open() || position.principal.is_zero() {
                continue;
            }

            let floor_price = Decimal(registry.get_floor_price(key.collection));
            if floor_price == Decimal::zero() {
                continue;
            }
            let liq_ltv = registry.get_liq_ltv(key.collection);
            if liq_ltv.is_zero() {
                continue;
            }

            let current_ltv = match position.current_ltv(floor_price) {
                Ok(ltv) => ltv,
                Err(_) => continue,
            };
            if current_ltv.0 >= liq_ltv {
                self.apply_liquidation(position);
            }
        }
    }

    // =======================================================================
    // READ ACCESSORS
    // =======================================================================

    /// Every address that has ever staked.
    pub fn get_user_list(&self) -> Vec<Address> {
        self.ledger.stakers()
    }

    /// Token ids of `owner`'s currently open positions in `collection`.
    pub fn get_staked_nft_list(&self, owner: Address, collection: Address) -> Vec<u64> {
        self.ledger.list_by_owner(owner, collection)
    }

    /// Whether the position for (collection, token id) has been
    /// liquidated. False when no such position is tracked.
    pub fn is_liquidated(&self, collection: Address, token_id: u64) -> bool {
        self.ledger
            .position(PositionKey { collection, token_id })
            .map(|position| position.is_liquidated)
            .unwrap_or(false)
    }

    /// Full position record, if one is tracked for (collection, token id).
    pub fn get_position(&self, collection: Address, token_id: u64) -> Option<Position> {
        self.ledger.position(PositionKey { collection, token_id })
    }

    /// Engine administrator.
    pub fn admin(&self) -> Address {
        self.admin.get_or_revert_with(Error::InvalidConfig)
    }

    /// Address of the risk registry consulted on every lending decision.
    pub fn risk_registry(&self) -> Address {
        self.risk_registry.get_or_revert_with(Error::InvalidConfig)
    }

    /// Address of the credit token paid out on borrow.
    pub fn credit_token(&self) -> Address {
        self.credit_token.get_or_revert_with(Error::InvalidConfig)
    }

    // =======================================================================
    // INTERNAL OPERATIONS
    // =======================================================================

    fn stake_position(&mut self, collection: Address, token_id: u64) -> Result<(), Error> {
        let caller = self.env().caller();

        if !self.registry_ref().is_white_list(collection) {
            return Err(Error::NotWhitelisted);
        }

        let mut nft = NonFungibleTokenContractRef::new(self.env(), collection);
        if !nft.supports_interface(NFT_INTERFACE_ID) {
            return Err(Error::UnsupportedToken);
        }
        // Also the path hit when the token is already in engine custody.
        if nft.owner_of(token_id) != caller {
            return Err(Error::NotOwner);
        }

        nft.transfer_from(caller, self.env().self_address(), token_id);

        self.ledger
            .insert_open(Position::new(caller, collection, token_id));
        self.ledger.add_staker(caller);

        self.env().emit_event(NftStaked {
            staker: caller,
            collection,
            token_id,
        });
        Ok(())
    }

    fn borrow_against_position(
        &mut self,
        amount: U256,
        collection: Address,
        token_id: u64,
    ) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount);
        }

        let caller = self.env().caller();
        let mut position = self.open_position(collection, token_id)?;
        if position.owner != caller {
            return Err(Error::NotOwner);
        }

        let new_principal = position
            .principal
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        let available = self.registry_ref().get_available_loan_amount(collection);
        if new_principal > available {
            return Err(Error::ExceedsLoanCapacity);
        }

        let mut credit = self.credit_token_ref();
        if credit.balance_of(self.env().self_address()) < amount {
            return Err(Error::InsufficientLiquidity);
        }

        credit.transfer(caller, amount);
        position.draw(amount)?;
        self.ledger.save(position);

        self.env().emit_event(LoanDrawn {
            staker: caller,
            collection,
            token_id,
            amount,
            principal: new_principal,
        });
        Ok(())
    }

    fn repay_position(
        &mut self,
        amount: U256,
        collection: Address,
        token_id: u64,
    ) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidAmount);
        }

        let caller = self.env().caller();
        let mut position = self.open_position(collection, token_id)?;
        if position.owner != caller {
            return Err(Error::NotOwner);
        }
        // Rejected before the token pull so an overpayer sees the
        // protocol error, not the token's balance error.
        if amount > position.principal {
            return Err(Error::InvalidAmount);
        }

        // Requires prior allowance at the token boundary.
        let mut credit = self.credit_token_ref();
        credit.transfer_from(caller, self.env().self_address(), amount);

        let closed = position.settle(amount)?;
        let owner = position.owner;
        self.ledger.save(position);

        if closed {
            let mut nft = NonFungibleTokenContractRef::new(self.env(), collection);
            nft.transfer_from(self.env().self_address(), owner, token_id);
            self.ledger
                .remove_open(PositionKey { collection, token_id });
        }

        self.env().emit_event(LoanRepaid {
            staker: caller,
            collection,
            token_id,
            amount,
            closed,
        });
        Ok(())
    }

    fn liquidate_position(
        &mut self,
        owner: Address,
        collection: Address,
        token_id: u64,
    ) -> Result<(), Error> {
        let key = PositionKey { collection, token_id };
        let position = self
            .ledger
            .position(key)
            .ok_or(Error::PositionNotFound)?;
        if position.is_liquidated {
            return Err(Error::AlreadyLiquidated);
        }
        if !position.has_ownership || position.owner != owner {
            return Err(Error::PositionNotFound);
        }

        self.apply_liquidation(position);
        Ok(())
    }

    /// Shared terminal transition for direct and sync-driven liquidation.
    /// The NFT stays in engine custody; handing it to a proceeds market is
    /// outside this contract.
    fn apply_liquidation(&mut self, mut position: Position) {
        let staker = position.owner;
        let principal = position.principal;
        let key = position.key();

        position.mark_liquidated();
        self.ledger.save(position);
        self.ledger.remove_open(key);

        self.env().emit_event(PositionLiquidated {
            staker,
            collection: key.collection,
            token_id: key.token_id,
            principal,
        });
    }

    /// Loads an open position, distinguishing "never staked / closed"
    /// from "terminal".
    fn open_position(&self, collection: Address, token_id: u64) -> Result<Position, Error> {
        let position = self
            .ledger
            .position(PositionKey { collection, token_id })
            .ok_or(Error::PositionNotFound)?;
        if position.is_liquidated {
            return Err(Error::AlreadyLiquidated);
        }
        if !position.has_ownership {
            return Err(Error::PositionNotFound);
        }
        Ok(position)
    }

    fn registry_ref(&self) -> RiskRegistryContractRef {
        RiskRegistryContractRef::new(self.env(), self.risk_registry())
    }

    fn credit_token_ref(&self) -> FungibleTokenContractRef {
        FungibleTokenContractRef::new(self.env(), self.credit_token())
    }
}
