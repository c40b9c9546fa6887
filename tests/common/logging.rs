use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "xmr_light_send=trace,httpmock=warn";

/// install a process-wide subscriber for a send scenario.
///
/// Integration tests are compiled as separate crates, so `#[traced_test]`
/// never sees events emitted by the library. Call this first in each test
/// instead. `RUST_LOG` overrides [DEFAULT_FILTER]. Output goes through the
/// test writer and is only shown for failing tests.
pub fn tracing_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // a second call within the same test binary finds a subscriber already
    // installed; keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_timer(UtcTime::rfc_3339())
        .with_env_filter(env_filter)
        .with_thread_ids(true)
        .with_test_writer()
        .try_init();
}
