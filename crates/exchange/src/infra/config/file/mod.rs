pub use load::load;
use {
    alloy::primitives::{Address, B256},
    serde::Deserialize,
};

mod load;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// The chain the exchange settles on, part of every signing domain.
    chain_id: u64,

    /// Address the exchange is deployed at.
    verifying_contract: Address,

    /// Name of the signing domain.
    #[serde(default = "default_name")]
    name: String,

    /// Version of the signing domain.
    #[serde(default = "default_version")]
    version: String,

    /// The account allowed to open and close conduit channels.
    #[serde(default)]
    conduit_controller: Address,

    /// Conduits with an open channel.
    #[serde(default, rename = "conduit")]
    conduits: Vec<ConduitConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConduitConfig {
    /// Key orders use to refer to the conduit.
    key: B256,

    /// Address of the conduit.
    address: Address,
}

fn default_name() -> String {
    "Seaport".to_owned()
}

fn default_version() -> String {
    "1.1".to_owned()
}
