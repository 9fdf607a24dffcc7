use {
    std::path::PathBuf,
    tracing::level_filters::LevelFilter,
};

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// The log filter.
    #[clap(long, env, default_value = "warn,exchange=debug")]
    pub log_filter: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,

    /// Path to the exchange configuration file. This file should be in TOML
    /// format. For an example see `crates/exchange/example.toml`.
    #[clap(long, env)]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Prints the signing domain and the open conduits of the exchange.
    Info,
    /// Reads order components as JSON and prints their order hash and the
    /// digest the offerer has to sign.
    OrderHash {
        /// File with the order components. Reads stdin when omitted.
        file: Option<PathBuf>,
    },
}
