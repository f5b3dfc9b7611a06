//! Shared helpers for in-crate tests.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

/// Whether the environment insists that socket-bound tests run rather than
/// skip.
#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var("MEDIAFETCH_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Returns `true` when no loopback socket can be bound, in which case tests
/// that need an in-process HTTP server bail out early instead of failing on
/// an environment limitation.
#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let caller = Location::caller();
    if socket_tests_required() {
        panic!(
            "no loopback socket available at {}:{} and MEDIAFETCH_REQUIRE_SOCKET_TESTS is set",
            caller.file(),
            caller.line()
        );
    }
    eprintln!(
        "skipping {}:{}: no loopback socket available for the in-process HTTP server \
         (set MEDIAFETCH_REQUIRE_SOCKET_TESTS=1 to fail instead)",
        caller.file(),
        caller.line()
    );
    true
}

/// Starts a mock server, or `None` when loopback sockets are unavailable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}
