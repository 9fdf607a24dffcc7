//! Numeric helpers shared by the exchange crates: checked 256-bit arithmetic
//! and serialization adapters.

pub mod serialization;
pub mod u256_ext;

pub use u256_ext::U256Ext;
