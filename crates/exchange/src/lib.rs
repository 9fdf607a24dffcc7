#![forbid(unsafe_code)]

//! Settlement engine of a peer-to-peer exchange for native value, ERC-20,
//! ERC-721 and ERC-1155 assets. Offerers sign orders off-chain; fulfillers
//! submit them, alone, in batches or matched against each other, and the
//! engine moves every asset atomically through the [`infra::Ledger`].

mod amount;
mod basic;
pub mod calldata;
pub mod conduit;
pub mod criteria;
mod engine;
pub mod error;
pub mod events;
mod fulfillment;
pub mod infra;
mod matching;
pub mod metrics;
pub mod run;
mod signature;
pub mod status;
mod zone;

#[cfg(test)]
mod tests;

pub use {
    engine::{Call, Exchange, Information},
    error::Error,
    events::Event,
};
