use {
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{
            MakeWriter,
            time::UtcTime,
            writer::MakeWriterExt as _,
        },
        prelude::*,
        util::SubscriberInitExt,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    /// Filters spans and events based on a set of filter directives
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub env_filter: String,
    /// Events at this level or more severe go to stderr, everything else to
    /// stdout.
    pub stderr_threshold: LevelFilter,
    /// Output log events as JSON
    pub use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: LevelFilter) -> Self {
        Self {
            env_filter: env_filter.to_string(),
            stderr_threshold,
            use_json_format: false,
        }
    }

    pub fn with_json_format(mut self) -> Self {
        self.use_json_format = true;
        self
    }
}

/// Initializes tracing setup that is shared between the binaries.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    // The tracing subscriber below is global object so initializing it again in the
    // same process by a different thread would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        set_tracing_subscriber(&Config::new(env_filter, LevelFilter::ERROR));
        std::panic::set_hook(Box::new(tracing_panic_hook));
    });
}

fn set_tracing_subscriber(config: &Config) {
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));
    let filter = EnvFilter::new(&config.env_filter);
    let layer = if config.use_json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer(config.stderr_threshold))
            .with_timer(timer)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer(config.stderr_threshold))
            .with_timer(timer)
            .with_ansi(std::io::stdout().is_terminal())
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).init();
    tracing::info!(json = config.use_json_format, "initialized logging");
}

fn writer(stderr_threshold: LevelFilter) -> impl for<'a> MakeWriter<'a> + Send + Sync + 'static {
    std::io::stderr
        .with_max_level(stderr_threshold.into_level().unwrap_or(tracing::Level::ERROR))
        .or_else(std::io::stdout)
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
///
/// Useful when we want panic messages to have the proper log format.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
