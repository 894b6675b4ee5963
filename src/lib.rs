#![allow(clippy::arithmetic_side_effects)]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

//! An NFT-collateralized lending protocol for the Casper blockchain.
//!
//! The protocol is split into two cooperating contracts. [`RiskRegistry`]
//! keeps the whitelist of accepted NFT collections together with their risk
//! parameters and oracle-fed floor prices. [`LendingEngine`] takes staked
//! NFTs into custody, pays out credit-token loans against them up to the
//! registry's loan-to-value limit, and liquidates positions whose drawn
//! ratio breaches the liquidation threshold. The engine reads the registry
//! cross-contract on every lending decision and never caches its state.

pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod mocks;
pub mod registry;
pub mod state;
pub mod token;

extern crate alloc;

pub use engine::LendingEngine;
pub use error::Error;
pub use registry::RiskRegistry;
