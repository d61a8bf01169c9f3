//! The envelope the backend wraps around every tool invocation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::outcome::ToolOutcome;

/// Result of one backend tool invocation.
///
/// Unknown sibling keys are kept so that a debug dump shows everything the
/// backend sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultEnvelope>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outer `result` object; the payload lives one level further down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolPayload>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inner payload: a code tag, a message, and code-dependent data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,

    #[serde(default)]
    pub data: Value,
}

/// Reads a string field that the backend may send as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ToolResult {
    /// Wraps a payload in the two-level envelope.
    pub fn payload(code: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        Self {
            result: Some(ResultEnvelope {
                result: Some(ToolPayload::new(code, message, data)),
                extra: Map::new(),
            }),
            ..Default::default()
        }
    }

    /// A result that only carries a backend error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// The error string, if present and non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// The inner payload, if the envelope is complete.
    pub fn inner(&self) -> Option<&ToolPayload> {
        self.result.as_ref().and_then(|r| r.result.as_ref())
    }
}

impl ToolPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    /// Decodes `data` according to `code`.
    pub fn outcome(&self) -> ToolOutcome {
        ToolOutcome::decode(&self.code, &self.data)
    }
}
