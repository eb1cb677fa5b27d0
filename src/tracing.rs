//! Tracing initialization.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

static INIT: Once = Once::new();

/// Initialize tracing. Safe to call multiple times.
///
/// Under a test harness the subscriber uses the captured test writer at DEBUG,
/// otherwise it logs at INFO to stderr so stdout stays free for query results.
pub fn init() {
    init_with(under_test_harness());
}

/// Initialize tracing for integration tests, which link the library built
/// without `cfg(test)` and so cannot be detected from inside it.
pub fn init_for_tests() {
    init_with(true);
}

fn init_with(is_test: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(
            if is_test {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            }
            .into(),
        );

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
            .compact();

        if is_test {
            if let Err(e) = builder.with_test_writer().try_init() {
                eprintln!("Failed to initialize tracing: {}", e);
            }
        } else if let Err(e) = builder.with_writer(std::io::stderr).try_init() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}

/// Unit tests are detected at compile time. `CARGO_TARGET_TMPDIR` exists only
/// while cargo compiles test crates, never in the environment of a run.
fn under_test_harness() -> bool {
    cfg!(test)
        || option_env!("CARGO_TARGET_TMPDIR").is_some()
        || std::env::var_os("NEXTEST").is_some()
}
