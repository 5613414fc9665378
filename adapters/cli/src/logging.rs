use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` takes precedence. Without it, `verbose` selects debug output
/// and info level is used otherwise.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // Fails only when a logger is already installed.
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}
