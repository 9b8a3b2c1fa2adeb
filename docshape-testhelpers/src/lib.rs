#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Test setup for the docshape crates.
//!
//! Annotate tests with `#[docshape_testhelpers::test]` to get compact
//! tracing output and colored backtraces on panic. The `DOCSHAPE_LOG`
//! environment variable overrides the default filter, e.g.
//! `DOCSHAPE_LOG=docshape_encoder=trace`.

pub use docshape_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "DOCSHAPE_LOG";

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

/// Debug output from the encoder crates, warnings from everything else.
fn default_filter() -> Targets {
    Targets::new()
        .with_target("docshape_encoder", Level::DEBUG)
        .with_target("docshape_json", Level::DEBUG)
        .with_default(Level::WARN)
}

/// Frames from the test harness and panic machinery.
fn is_harness_frame(name: &str) -> bool {
    ["test::", "std::panicking::", "core::panicking::", "std::sys::"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    color_backtrace::BacktracePrinter::new()
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| {
                frame
                    .name
                    .as_deref()
                    .is_none_or(|name| !is_harness_frame(name))
            });
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::Auto,
        )));

    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(default_filter);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_test_writer()
                .with_timer(Uptime)
                .with_target(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Installs the tracing subscriber and backtrace printer, once per process.
///
/// Called by `#[docshape_testhelpers::test]`; call it by hand from tests that
/// use another harness attribute.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

#[cfg(test)]
mod tests {
    use super::{is_harness_frame, setup};

    #[test]
    fn harness_frames_are_recognised() {
        assert!(is_harness_frame("test::run_test::{{closure}}"));
        assert!(is_harness_frame("std::panicking::begin_panic_handler"));
        assert!(!is_harness_frame("docshape_encoder::exec::Run::call"));
    }

    #[test]
    fn setup_is_idempotent() {
        setup();
        setup();
        tracing::debug!(target: "docshape_encoder", "subscriber installed");
    }
}
