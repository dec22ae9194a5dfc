//! JSON contract of the `/chat/` endpoint.
//!
//! Both sides of the wire live here: the server serializes [`ChatReply`]
//! and the widget backend decodes it with [`ChatReply::from_slice`], which
//! follows the widget's rules for what counts as a failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::widget::ChatError;

/// Path of the chat endpoint, relative to the backend base URL.
pub const CHAT_PATH: &str = "/chat/";

/// Request body for `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
}

/// Response body for `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// The backend produced a reply.
    Success {
        /// Bot text to render.
        response: String,
    },
    /// The backend signalled a failure.
    Failure {
        /// Diagnostic detail. Never shown to the user.
        error: String,
    },
}

impl ChatReply {
    /// Create a success reply.
    #[must_use]
    pub fn success(response: impl Into<String>) -> Self {
        Self::Success {
            response: response.into(),
        }
    }

    /// Create a failure reply.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Decode a reply body.
    ///
    /// A truthy `error` field wins over everything else. Otherwise the body
    /// must carry a string `response`. Bodies that are not JSON objects, or
    /// that carry neither field, are decode errors.
    pub fn from_slice(body: &[u8]) -> Result<Self, ChatError> {
        // A map, not a derived struct: arrays must not fill fields by position.
        let mut fields: Map<String, Value> = serde_json::from_slice(body)?;

        match fields.remove("error") {
            Some(Value::String(error)) if !error.is_empty() => {
                return Ok(Self::Failure { error });
            }
            Some(error) if is_truthy(&error) => {
                return Ok(Self::Failure {
                    error: error.to_string(),
                });
            }
            _ => {}
        }

        match fields.remove("response") {
            Some(Value::String(response)) => Ok(Self::Success { response }),
            _ => Err(ChatError::MissingResponse),
        }
    }

    /// Collapse the reply into the bot text or an application error.
    pub fn into_result(self) -> Result<String, ChatError> {
        match self {
            Self::Success { response } => Ok(response),
            Self::Failure { error } => Err(ChatError::Application(error)),
        }
    }
}

/// JSON truthiness, as a browser client would judge `data.error`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let reply = ChatReply::from_slice(br#"{"response": "hi there"}"#).unwrap();
        assert_eq!(reply, ChatReply::success("hi there"));
    }

    #[test]
    fn test_error_field_wins_over_response() {
        let reply = ChatReply::from_slice(br#"{"error": "bad", "response": "ignored"}"#).unwrap();
        assert_eq!(reply, ChatReply::failure("bad"));
    }

    #[test]
    fn test_falsy_error_is_ignored() {
        let reply = ChatReply::from_slice(br#"{"error": "", "response": "ok"}"#).unwrap();
        assert_eq!(reply, ChatReply::success("ok"));

        let reply = ChatReply::from_slice(br#"{"error": null, "response": "ok"}"#).unwrap();
        assert_eq!(reply, ChatReply::success("ok"));
    }

    #[test]
    fn test_non_string_error_is_stringified() {
        let reply = ChatReply::from_slice(br#"{"error": {"code": 7}}"#).unwrap();
        assert_eq!(reply, ChatReply::failure(r#"{"code":7}"#));
    }

    #[test]
    fn test_unexpected_shapes_are_errors() {
        assert!(matches!(
            ChatReply::from_slice(b"{}"),
            Err(ChatError::MissingResponse)
        ));
        assert!(matches!(
            ChatReply::from_slice(br#"{"response": 42}"#),
            Err(ChatError::MissingResponse)
        ));
        assert!(matches!(
            ChatReply::from_slice(b"<html>502</html>"),
            Err(ChatError::Decode(_))
        ));
        assert!(matches!(
            ChatReply::from_slice(b"null"),
            Err(ChatError::Decode(_))
        ));
        assert!(matches!(
            ChatReply::from_slice(br#"[null, "hi"]"#),
            Err(ChatError::Decode(_))
        ));
        assert!(matches!(
            ChatReply::from_slice(br#"["bad", "x"]"#),
            Err(ChatError::Decode(_))
        ));
    }

    #[test]
    fn test_serialized_shapes() {
        let ok = serde_json::to_value(ChatReply::success("hi")).unwrap();
        assert_eq!(ok, serde_json::json!({ "response": "hi" }));

        let err = serde_json::to_value(ChatReply::failure("nope")).unwrap();
        assert_eq!(err, serde_json::json!({ "error": "nope" }));
    }
}
