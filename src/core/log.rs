use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Tracing target of everything this crate logs.
pub const LOG_TARGET: &str = "etf_helper";

/// Levels for the crate itself and for the HTTP stack underneath it.
fn levels(verbose: bool) -> (LevelFilter, LevelFilter) {
    if verbose {
        (LevelFilter::DEBUG, LevelFilter::INFO)
    } else {
        (LevelFilter::ERROR, LevelFilter::OFF)
    }
}

/// Installs the global subscriber, writing to stderr. Only API errors are shown
/// unless `verbose` is set; `RUST_LOG` narrows further. Calling it twice is a
/// no-op.
pub fn init_logging(verbose: bool) {
    let (app_level, http_level) = levels(verbose);
    let targets = Targets::new()
        .with_target(LOG_TARGET, app_level)
        .with_target("reqwest", http_level)
        .with_target("hyper_util", http_level);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app_level.to_string().to_lowercase()));

    // A subscriber already installed (tests, embedding apps) keeps precedence.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        )
        .with(targets)
        .with(env_filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(levels(false), (LevelFilter::ERROR, LevelFilter::OFF));
        assert_eq!(levels(true), (LevelFilter::DEBUG, LevelFilter::INFO));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
