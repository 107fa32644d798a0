use serde::Serialize;
use tracing::{Level, debug};

/// Logs `value` as pretty JSON at DEBUG; serialization is skipped entirely otherwise.
pub(crate) fn debug_json<T: Serialize>(what: &str, value: &T) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(pretty_json) => debug!(what, "\n{pretty_json}"),
        Err(error) => debug!(what, %error, "pretty serialize failed"),
    }
}
