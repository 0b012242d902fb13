//! Wire format shared by the hotwire daemon and its senders.
//!
//! Control messages are UTF-8 JSON documents shaped as JSON-RPC 2.0
//! notifications:
//!
//! ```json
//! {"jsonrpc":"2.0","method":"run_test","params":{"module":"sale","test_tags":"/sale"}}
//! ```
//!
//! There is no response channel. The daemon decodes each payload with
//! [`RequestEnvelope::parse`] and silently drops anything that does not
//! validate, so senders build payloads with [`Notification`] to stay within
//! the accepted shape.

mod envelope;
mod errors;
mod notification;

pub use envelope::{Params, RequestEnvelope};
pub use errors::ParseFailure;
pub use notification::Notification;

/// The only JSON-RPC protocol version accepted on the wire.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name that schedules a test run for a module.
pub const RUN_TEST_METHOD: &str = "run_test";

/// Method name that toggles verbose logging of data-store interactions.
pub const LOG_SQL_METHOD: &str = "log_sql";

/// Maximum number of characters kept by [`excerpt`].
pub const EXCERPT_LIMIT: usize = 256;

/// Renders a bounded, lossy view of a raw payload for diagnostics.
///
/// Invalid UTF-8 sequences are replaced and the text is cut after
/// [`EXCERPT_LIMIT`] characters, with an ellipsis marking the truncation.
///
/// # Examples
///
/// ```
/// let text = hotwire_protocol::excerpt(b"{\"jsonrpc\":\"1.0\"}");
/// assert_eq!(text, "{\"jsonrpc\":\"1.0\"}");
/// ```
#[must_use]
pub fn excerpt(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
