//! Risk registry: whitelist of accepted NFT collections, their risk
//! parameters, and the floor-price oracle intake.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::error::Error;
use crate::events::{FloorPriceSet, RiskParamsUpdated, WhitelistAdded, WhitelistRemoved};
use crate::state::CollectionRiskProfile;

/// Registry contract. The deployer becomes the administrator; every
/// mutator is administrator-only, every read accessor is open and returns
/// a zero/false sentinel for an absent collection instead of failing.
#[odra::module]
pub struct RiskRegistry {
    admin: Var<Address>,
    profiles: Mapping<Address, CollectionRiskProfile>,
}

#[odra::module]
impl RiskRegistry {
    /// Initializes the registry; the caller becomes the immutable
    /// administrator.
    pub fn init(&mut self) {
        self.admin.set(self.env().caller());
    }

    // =======================================================================
    // WHITELIST MANAGEMENT
    // =======================================================================

    /// Whitelists `collection` with the given LTV bounds. Oracle and
    /// interest fields start at zero.
    pub fn add_white_list(&mut self, collection: Address, max_ltv: U256, liq_ltv: U256) {
        self.ensure_admin();
        if self.whitelisted_profile(collection).is_some() {
            self.env().revert(Error::AlreadyWhitelisted);
        }
        if let Err(error) = CollectionRiskProfile::validate_ltv_bounds(max_ltv, liq_ltv) {
            self.env().revert(error);
        }

        self.profiles
            .set(&collection, CollectionRiskProfile::new(max_ltv, liq_ltv));
        self.env().emit_event(WhitelistAdded {
            collection,
            max_ltv,
            liq_ltv,
        });
    }

    /// Removes `collection` from the whitelist, clearing its whole
    /// profile.
    pub fn remove_white_list(&mut self, collection: Address) {
        self.ensure_admin();
        if self.whitelisted_profile(collection).is_none() {
            self.env().revert(Error::NotWhitelisted);
        }

        self.profiles.set(&collection, CollectionRiskProfile::cleared());
        self.env().emit_event(WhitelistRemoved { collection });
    }

    // =======================================================================
    // ORACLE INTAKE AND RISK PARAMETERS
    // =======================================================================

    /// Overwrites both oracle fields for a whitelisted collection. The
    /// floor price itself is derived lazily on read.
    pub fn set_floor_price(
        &mut self,
        collection: Address,
        nft_unit_price: U256,
        exchange_rate: U256,
    ) {
        self.ensure_admin();
        let mut profile = self.load_whitelisted(collection);
        profile.nft_unit_price = nft_unit_price;
        profile.exchange_rate = exchange_rate;
        self.profiles.set(&collection, profile);
        self.env().emit_event(FloorPriceSet {
            collection,
            nft_unit_price,
            exchange_rate,
        });
    }

    /// Updates the maximum LTV, keeping the ordering invariant.
    pub fn set_max_ltv(&mut self, collection: Address, new_max: U256) {
        self.ensure_admin();
        let mut profile = self.load_whitelisted(collection);
        if let Err(error) = CollectionRiskProfile::validate_ltv_bounds(new_max, profile.liq_ltv) {
            self.env().revert(error);
        }
        profile.max_ltv = new_max;
        self.save_and_emit_params(collection, profile);
    }

    /// Updates the liquidation LTV, keeping the ordering invariant.
    pub fn set_liq_ltv(&mut self, collection: Address, new_liq: U256) {
        self.ensure_admin();
        let mut profile = self.load_whitelisted(collection);
        if let Err(error) = CollectionRiskProfile::validate_ltv_bounds(profile.max_ltv, new_liq) {
            self.env().revert(error);
        }
        profile.liq_ltv = new_liq;
        self.save_and_emit_params(collection, profile);
    }

    /// Updates the stored interest rate. Accrual is not implemented.
    pub fn set_interest(&mut self, collection: Address, rate: U256) {
        self.ensure_admin();
        let mut profile = self.load_whitelisted(collection);
        profile.interest_rate = rate;
        self.save_and_emit_params(collection, profile);
    }

    // =======================================================================
    // READ ACCESSORS
    // =======================================================================

    /// Whitelist membership.
    pub fn is_white_list(&self, collection: Address) -> bool {
        self.whitelisted_profile(collection).is_some()
    }

    /// Derived floor price, `nft_unit_price * exchange_rate / WAD`; zero
    /// for an absent collection.
    pub fn get_floor_price(&self, collection: Address) -> U256 {
        match self.whitelisted_profile(collection) {
            Some(profile) => match profile.floor_price() {
                Ok(floor) => floor.0,
                Err(error) => self.env().revert(error),
            },
            None => U256::zero(),
        }
    }

    /// Derived loan capacity, `floor_price * max_ltv / 100`; zero for an
    /// absent collection.
    pub fn get_available_loan_amount(&self, collection: Address) -> U256 {
        match self.whitelisted_profile(collection) {
            Some(profile) => match profile.available_loan_amount() {
                Ok(amount) => amount.0,
                Err(error) => self.env().revert(error),
            },
            None => U256::zero(),
        }
    }

    /// Last-pushed raw unit price; zero for an absent collection.
    pub fn get_nft_unit_price(&self, collection: Address) -> U256 {
        self.whitelisted_profile(collection)
            .map(|profile| profile.nft_unit_price)
            .unwrap_or_default()
    }

    /// Maximum LTV; zero for an absent collection.
    pub fn get_max_ltv(&self, collection: Address) -> U256 {
        self.whitelisted_profile(collection)
            .map(|profile| profile.max_ltv)
            .unwrap_or_default()
    }

    /// Liquidation LTV; zero for an absent collection.
    pub fn get_liq_ltv(&self, collection: Address) -> U256 {
        self.whitelisted_profile(collection)
            .map(|profile| profile.liq_ltv)
            .unwrap_or_default()
    }

    /// Stored interest rate; zero for an absent collection.
    pub fn get_interest(&self, collection: Address) -> U256 {
        self.whitelisted_profile(collection)
            .map(|profile| profile.interest_rate)
            .unwrap_or_default()
    }

    /// Registry administrator.
    pub fn admin(&self) -> Address {
        self.admin.get_or_revert_with(Error::InvalidConfig)
    }

    // =======================================================================
    // INTERNAL
    // =======================================================================

    fn ensure_admin(&self) {
        if self.env().caller() != self.admin() {
            self.env().revert(Error::NotAuthorized);
        }
    }

    fn whitelisted_profile(&self, collection: Address) -> Option<CollectionRiskProfile> {
        self.profiles
            .get(&collection)
            .filter(|profile| profile.is_whitelisted)
    }

    fn load_whitelisted(&self, collection: Address) -> CollectionRiskProfile {
        match self.whitelisted_profile(collection) {
            Some(profile) => profile,
            None => self.env().revert(Error::NotWhitelisted),
        }
    }

    fn save_and_emit_params(&mut self, collection: Address, profile: CollectionRiskProfile) {
        self.env().emit_event(RiskParamsUpdated {
            collection,
            max_ltv: profile.max_ltv,
            liq_ltv: profile.liq_ltv,
            interest_rate: profile.interest_rate,
        });
        self.profiles.set(&collection, profile);
    }
}
