//! Rejection reasons produced while decoding a payload.

use thiserror::Error;

/// Reasons a raw payload was rejected before dispatch.
///
/// None of these reach a caller; they exist so the receiving side can log
/// a precise diagnostic and drop the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// The payload is not JSON, or the JSON document is not an object.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Decoder message or a description of the unexpected document.
        message: String,
    },
    /// The `jsonrpc` member is absent or not the supported version.
    #[error("unsupported JSON-RPC version: {}", describe_version(.found.as_deref()))]
    UnsupportedProtocol {
        /// The version text found in the payload, if any.
        found: Option<String>,
    },
    /// The `method` member is absent or not a string.
    #[error("missing method")]
    MissingMethod,
    /// The `params` member is neither an object, an array, nor null.
    #[error("invalid params: expected object, array or null, found {found}")]
    InvalidParams {
        /// JSON type name of the offending member.
        found: &'static str,
    },
}

impl ParseFailure {
    /// Stable snake_case label used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::UnsupportedProtocol { .. } => "unsupported_protocol",
            Self::MissingMethod => "missing_method",
            Self::InvalidParams { .. } => "invalid_params",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}

fn describe_version(found: Option<&str>) -> &str {
    found.unwrap_or("<absent>")
}
