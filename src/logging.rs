// src/logging.rs
// =============================================================================
// Sets up the tracing subscriber.
//
// Logs go to stderr so `resolve --json` output on stdout stays clean.
// The level comes from RUST_LOG when set, otherwise this crate logs at info.
//
// Examples:
//   RUST_LOG=url_unshortener=debug url-unshortener run
//   url-unshortener --log-json run
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("url_unshortener=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
