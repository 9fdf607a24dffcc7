use {
    crate::{
        Exchange,
        infra::{cli, config},
        metrics,
    },
    anyhow::Context,
    clap::Parser,
    model::order::OrderComponents,
    serde::Serialize,
    std::{io::Read, path::Path},
};

pub fn main() {
    if let Err(err) = run(std::env::args()) {
        tracing::error!(?err, "exchange command failed");
        std::process::exit(1);
    }
}

/// Runs the command line interface with the given arguments.
pub fn run(args: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let args = cli::Args::parse_from(args);
    let mut tracing = observe::tracing::Config::new(&args.log_filter, args.log_stderr_threshold);
    if args.use_json_logs {
        tracing = tracing.with_json_format();
    }
    observe::tracing::initialize(&tracing);
    metrics::init();
    tracing::info!("running exchange with {args:#?}");

    let config = config::load(&args.config)?;
    let exchange = Exchange::new(&config);
    let output = match args.command {
        cli::Command::Info => serde_json::to_string_pretty(&Info::new(&exchange))?,
        cli::Command::OrderHash { file } => {
            let components = read_components(file.as_deref())?;
            serde_json::to_string_pretty(&OrderHash::new(&exchange, &components))?
        }
    };
    println!("{output}");
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Info {
    name: String,
    #[serde(flatten)]
    information: crate::Information,
}

impl Info {
    fn new(exchange: &Exchange) -> Self {
        Self {
            name: exchange.name().to_owned(),
            information: exchange.information(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderHash {
    order_hash: alloy::primitives::B256,
    signing_digest: alloy::primitives::B256,
}

impl OrderHash {
    fn new(exchange: &Exchange, components: &OrderComponents) -> Self {
        Self {
            order_hash: exchange.get_order_hash(components),
            signing_digest: components.signing_digest(exchange.domain_separator()),
        }
    }
}

fn read_components(file: Option<&Path>) -> anyhow::Result<OrderComponents> {
    let data = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("I/O error while reading {path:?}"))?,
        None => {
            let mut data = String::new();
            std::io::stdin()
                .read_to_string(&mut data)
                .context("I/O error while reading stdin")?;
            data
        }
    };
    serde_json::from_str(&data).context("invalid order components")
}
