//! Wire model for the request/response channel.
//!
//! A request is a UTF-8 command name plus a map of named arguments; a reply
//! is either a success payload or a typed error with a machine-readable code.
//! One reply per request, always.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming named command with loosely-typed arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
}

impl Request {
    pub fn new(command: impl Into<String>, arguments: serde_json::Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    /// Look up a string argument. Non-string values read as absent.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    /// Look up a list-of-strings argument. Non-string elements are skipped.
    pub fn arg_str_list(&self, key: &str) -> Vec<String> {
        self.arguments
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The single reply produced for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Success {
        payload: Option<Value>,
    },
    Failure {
        code: String,
        message: String,
        details: Option<String>,
    },
}

impl Reply {
    pub fn success(payload: Option<Value>) -> Self {
        Reply::Success { payload }
    }

    pub fn failure(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Reply::Failure {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success { .. })
    }

    /// The failure code, if this is a failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            Reply::Success { .. } => None,
            Reply::Failure { code, .. } => Some(code),
        }
    }

    /// The success payload, if this is a success.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Reply::Success { payload } => payload.as_ref(),
            Reply::Failure { .. } => None,
        }
    }
}
