use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /submissions`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(source_code: impl Into<String>, language_id: u32, stdin: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            language_id,
            stdin: stdin.into(),
        }
    }

    /// Copy with the text fields base64-encoded, for `base64_encoded=true`.
    pub fn encoded(&self) -> Self {
        Self {
            source_code: STANDARD.encode(&self.source_code),
            language_id: self.language_id,
            stdin: STANDARD.encode(&self.stdin),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub id: u32,
    pub description: String,
}

impl Status {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;
    pub const ACCEPTED: u32 = 3;

    /// Still queued or running on the sandbox.
    pub fn is_pending(&self) -> bool {
        matches!(self.id, Self::IN_QUEUE | Self::PROCESSING)
    }
}

/// A submission as returned by the sandbox. Text fields stay in wire form
/// until [`RunReport`](super::RunReport) decodes them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds; Judge0 sends it as a string, some forks as a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub time: Option<String>,
    /// Kilobytes.
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub status: Option<Status>,
    /// Whether the text fields above are base64; set by the client from the
    /// query it sent.
    #[serde(skip)]
    pub base64_encoded: bool,
}

impl ExecutionResponse {
    pub fn status_description(&self) -> &str {
        self.status.as_ref().map_or("Unknown", |s| s.description.as_str())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
