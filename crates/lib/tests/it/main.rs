/*! Integration tests for guardlist.
 *
 * This test suite is organized as a single integration test binary.
 * The module structure mirrors the main library structure:
 * - guarded: Tests for the guard protocol as seen through the public API
 * - sorted: Tests for the sorted variant, including persistence
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("guardlist=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod guarded;
mod sorted;
