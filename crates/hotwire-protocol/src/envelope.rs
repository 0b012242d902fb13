//! Decoding of raw payloads into validated request envelopes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::JSONRPC_VERSION;
use crate::errors::ParseFailure;

/// Parameters carried by a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    /// A JSON object, bound to the handler by parameter name.
    Named(Map<String, Value>),
    /// A JSON array, bound to the handler by position.
    Positional(Vec<Value>),
    /// The member was absent or `null`.
    #[default]
    None,
}

impl Params {
    /// Returns `true` when no parameters were supplied.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short label describing the calling convention.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Named(_) => "named",
            Self::Positional(_) => "positional",
            Self::None => "none",
        }
    }

    fn from_member(member: Option<Value>) -> Result<Self, ParseFailure> {
        match member {
            None | Some(Value::Null) => Ok(Self::None),
            Some(Value::Object(map)) => Ok(Self::Named(map)),
            Some(Value::Array(values)) => Ok(Self::Positional(values)),
            Some(other) => Err(ParseFailure::InvalidParams {
                found: json_type(&other),
            }),
        }
    }
}

/// A validated remote call decoded from one payload.
///
/// Envelopes are immutable once parsed and are discarded after dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    method: String,
    params: Params,
}

impl RequestEnvelope {
    /// Decodes a raw payload, enforcing the JSON-RPC 2.0 notification shape.
    ///
    /// Checks run in order: JSON decoding, object shape, protocol version,
    /// method name, then the parameter shape. Unknown members (such as
    /// `id`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseFailure`] encountered.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotwire_protocol::{Params, RequestEnvelope};
    ///
    /// let envelope = RequestEnvelope::parse(
    ///     br#"{"jsonrpc":"2.0","method":"log_sql","params":[true]}"#,
    /// )?;
    /// assert_eq!(envelope.method(), "log_sql");
    /// assert!(matches!(envelope.params(), Params::Positional(values) if values.len() == 1));
    /// # Ok::<(), hotwire_protocol::ParseFailure>(())
    /// ```
    pub fn parse(payload: &[u8]) -> Result<Self, ParseFailure> {
        let document: Value = serde_json::from_slice(payload)
            .map_err(|error| ParseFailure::malformed(error.to_string()))?;
        let mut fields = match document {
            Value::Object(fields) => fields,
            other => {
                return Err(ParseFailure::malformed(format!(
                    "expected a JSON object, found {}",
                    json_type(&other)
                )));
            }
        };

        match fields.get("jsonrpc") {
            Some(Value::String(version)) if version == JSONRPC_VERSION => {}
            Some(Value::String(version)) => {
                return Err(ParseFailure::UnsupportedProtocol {
                    found: Some(version.clone()),
                });
            }
            Some(other) => {
                return Err(ParseFailure::UnsupportedProtocol {
                    found: Some(other.to_string()),
                });
            }
            None => return Err(ParseFailure::UnsupportedProtocol { found: None }),
        }

        let method = match fields.remove("method") {
            Some(Value::String(method)) => method,
            _ => return Err(ParseFailure::MissingMethod),
        };

        let params = Params::from_member(fields.remove("params"))?;
        Ok(Self { method, params })
    }

    /// Name of the method to invoke.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parameters supplied with the call.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Splits the envelope into its method name and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Params) {
        (self.method, self.params)
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
