use tracing_subscriber::EnvFilter;

/// Environment variable consulted after `RUST_LOG`.
pub const LOG_ENV: &str = "TYPOWATCH_LOG";

/// Installs the stderr subscriber. `verbosity` picks the level when neither
/// `RUST_LOG` nor [`LOG_ENV`] is set: 0 warn, 1 info, 2 debug, 3+ trace.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let directives = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), default_level));

    // A second initialisation (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
