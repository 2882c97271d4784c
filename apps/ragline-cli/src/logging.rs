//! Subscriber setup for the binary. Library crates only emit events.
//!
//! `RUST_LOG` takes precedence over `logging.default`; `--debug` adds
//! `rag=debug` on top of either:
//! ```bash
//! RUST_LOG=index=debug ragline query --debug "What is RDF?"
//! ```

use ragline_core::config::LoggingSettings;
use tracing_subscriber::EnvFilter;

pub fn init(settings: &LoggingSettings, debug: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(settings, rust_log.as_deref(), debug);
    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_filter(settings: &LoggingSettings, rust_log: Option<&str>, debug: bool) -> EnvFilter {
    let filter = EnvFilter::new(rust_log.unwrap_or(&settings.default));
    if !debug {
        return filter;
    }
    match "rag=debug".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
