//! Position ledger: pure data holder for the engine's collateral
//! positions. All invariants are enforced by the engine before mutation.

use odra::prelude::*;

use crate::state::{Position, PositionKey};

/// Storage submodule owning every position plus two incremental indexes:
/// the open-position list (so a sweep is O(open positions), maintained on
/// stake and close/liquidate) and the append-only staker list.
#[odra::module]
pub struct PositionLedger {
    positions: Mapping<PositionKey, Position>,
    open_keys: Var<Vec<PositionKey>>,
    stakers: Var<Vec<Address>>,
}

#[odra::module]
impl PositionLedger {
    /// Looks up a position record, open or closed.
    pub fn position(&self, key: PositionKey) -> Option<Position> {
        self.positions.get(&key)
    }

    /// Writes back a mutated position. Identity fields are only ever set
    /// through [`insert_open`](Self::insert_open).
    pub fn save(&mut self, position: Position) {
        let key = position.key();
        self.positions.set(&key, position);
    }

    /// Records a freshly staked position and indexes it as open.
    pub fn insert_open(&mut self, position: Position) {
        let key = position.key();
        self.positions.set(&key, position);
        let mut open = self.open_keys.get_or_default();
        if !open.contains(&key) {
            open.push(key);
            self.open_keys.set(open);
        }
    }

    /// Drops a key from the open index after close or liquidation.
    pub fn remove_open(&mut self, key: PositionKey) {
        let mut open = self.open_keys.get_or_default();
        open.retain(|k| *k != key);
        self.open_keys.set(open);
    }

    /// Snapshot of every open (staked or borrowed) position key.
    pub fn open_positions(&self) -> Vec<PositionKey> {
        self.open_keys.get_or_default()
    }

    /// Token ids of `owner`'s open positions within `collection`.
    pub fn list_by_owner(&self, owner: Address, collection: Address) -> Vec<u64> {
        let mut token_ids = Vec::new();
        for key in self.open_keys.get_or_default() {
            if key.collection != collection {
                continue;
            }
            if let Some(position) = self.positions.get(&key) {
                if position.owner == owner {
                    token_ids.push(key.token_id);
                }
            }
        }
        token_ids
    }

    /// Adds `staker` to the staker list if not already present.
    pub fn add_staker(&mut self, staker: Address) {
        let mut stakers = self.stakers.get_or_default();
        if !stakers.contains(&staker) {
            stakers.push(staker);
            self.stakers.set(stakers);
        }
    }

    /// Every address that has ever staked.
    pub fn stakers(&self) -> Vec<Address> {
        self.stakers.get_or_default()
    }
}
