//! Builder for outgoing JSON-RPC notifications.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::JSONRPC_VERSION;
use crate::envelope::Params;

/// A JSON-RPC 2.0 notification ready to be published.
///
/// # Examples
///
/// ```
/// use hotwire_protocol::Notification;
/// use serde_json::json;
///
/// let payload = Notification::new("log_sql")
///     .positional(vec![json!(true)])
///     .to_json()?;
/// assert_eq!(payload, r#"{"jsonrpc":"2.0","method":"log_sql","params":[true]}"#);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    jsonrpc: &'static str,
    method: String,
    #[serde(skip_serializing_if = "Params::is_none")]
    params: Params,
}

impl Notification {
    /// Starts a notification for `method` without parameters.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params: Params::None,
        }
    }

    /// Attaches named parameters.
    #[must_use]
    pub fn named(mut self, params: Map<String, Value>) -> Self {
        self.params = Params::Named(params);
        self
    }

    /// Attaches positional parameters.
    #[must_use]
    pub fn positional(mut self, params: Vec<Value>) -> Self {
        self.params = Params::Positional(params);
        self
    }

    /// Method name carried by the notification.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Serialises the notification to its wire text.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only occurs for values that JSON
    /// cannot represent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::RequestEnvelope;

    #[test]
    fn omits_params_when_absent() {
        let payload = Notification::new("ping").to_json().expect("serialise");
        assert_eq!(payload, r#"{"jsonrpc":"2.0","method":"ping"}"#);
    }

    #[test]
    fn named_params_survive_parsing() {
        let mut params = Map::new();
        params.insert("module".to_owned(), json!("sale"));
        params.insert("test_tags".to_owned(), json!("/sale"));
        let payload = Notification::new("run_test")
            .named(params.clone())
            .to_json()
            .expect("serialise");

        let envelope = RequestEnvelope::parse(payload.as_bytes()).expect("parse");
        assert_eq!(envelope.method(), "run_test");
        assert_eq!(envelope.params(), &Params::Named(params));
    }
}
