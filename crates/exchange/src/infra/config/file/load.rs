use {
    crate::infra::{self, config::file},
    anyhow::Context,
    std::path::Path,
};

/// Load the exchange configuration from a TOML file.
pub fn load(path: &Path) -> anyhow::Result<infra::Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data).with_context(|| format!("invalid configuration in {path:?}"))
}

fn parse(data: &str) -> anyhow::Result<infra::Config> {
    let config: file::Config = toml::de::from_str(data)?;
    let mut conduits = Vec::with_capacity(config.conduits.len());
    for conduit in config.conduits {
        anyhow::ensure!(
            !conduit.key.is_zero(),
            "conduit {:?} uses the zero key, which is reserved for the exchange",
            conduit.address
        );
        anyhow::ensure!(
            conduits.iter().all(|(key, _)| *key != conduit.key),
            "duplicate conduit key {:?}",
            conduit.key
        );
        conduits.push((conduit.key, conduit.address));
    }
    Ok(infra::Config {
        name: config.name,
        version: config.version,
        chain_id: config.chain_id,
        address: config.verifying_contract,
        conduit_controller: config.conduit_controller,
        conduits,
    })
}
