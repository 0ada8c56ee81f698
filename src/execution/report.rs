use super::model::ExecutionResponse;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use tracing::warn;

pub const DECODE_FAILED: &str = "failed to decode output";
pub const NO_OUTPUT: &str = "(no output)";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// stdout and stderr are not shown.
    CompilationError { output: String },
    /// `stdout` is whatever the program printed before failing.
    RuntimeError { stdout: String, error: String },
    Success { stdout: String },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub verdict: Verdict,
    pub status: String,
    pub time_seconds: Option<String>,
    pub memory_kb: Option<u64>,
}

impl RunReport {
    /// Classifies a response: compile output first, then stderr or a
    /// sandbox message, else success. `prompts` are the prompts already shown
    /// during collection, removed from stdout in order.
    pub fn from_response(response: &ExecutionResponse, prompts: &[String]) -> Self {
        let encoded = response.base64_encoded;
        let compile_output = decode_field(response.compile_output.as_deref(), encoded);
        let stderr = decode_field(response.stderr.as_deref(), encoded);
        let message = response
            .message
            .as_deref()
            .map(|m| decode_message(m, encoded))
            .filter(|m| !m.trim().is_empty());

        let verdict = if !compile_output.is_empty() {
            Verdict::CompilationError {
                output: compile_output,
            }
        } else {
            let stdout = strip_prompts(&decode_field(response.stdout.as_deref(), encoded), prompts);
            let error = match (stderr.is_empty(), message) {
                (true, None) => None,
                (false, None) => Some(stderr),
                (true, Some(message)) => Some(message),
                (false, Some(message)) => Some(format!("{}\n{}", stderr.trim_end_matches('\n'), message)),
            };
            match error {
                Some(error) => Verdict::RuntimeError { stdout, error },
                None => Verdict::Success { stdout },
            }
        };

        Self {
            verdict,
            status: response.status_description().to_string(),
            time_seconds: response.time.clone(),
            memory_kb: response.memory,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.verdict, Verdict::Success { .. })
    }

    /// The primary text shown for the run.
    pub fn display_text(&self) -> &str {
        match &self.verdict {
            Verdict::CompilationError { output } => output,
            Verdict::RuntimeError { error, .. } => error,
            Verdict::Success { stdout } if stdout.is_empty() => NO_OUTPUT,
            Verdict::Success { stdout } => stdout,
        }
    }

    /// `Accepted | 0.002 s | 3400 KB`
    pub fn metadata(&self) -> String {
        let mut parts = vec![self.status.clone()];
        if let Some(time) = &self.time_seconds {
            parts.push(format!("{} s", time));
        }
        if let Some(memory) = self.memory_kb {
            parts.push(format!("{} KB", memory));
        }
        parts.join(" | ")
    }
}

/// Decodes a base64 output field into text. Judge0 wraps long values at 60
/// columns, so whitespace is dropped first. Invalid UTF-8 is replaced, bad
/// base64 yields [`DECODE_FAILED`].
pub fn decode_field(value: Option<&str>, encoded: bool) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if !encoded {
        return value.to_string();
    }
    decode_b64(value).unwrap_or_else(|| {
        warn!(len = value.len(), "undecodable output field");
        DECODE_FAILED.to_string()
    })
}

pub fn decode_b64(value: &str) -> Option<String> {
    let compact = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    STANDARD
        .decode(compact.as_bytes())
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Messages are base64 under `base64_encoded=true`, but some deployments send
/// them in clear; keep the raw text when it does not decode.
fn decode_message(message: &str, encoded: bool) -> String {
    if encoded {
        decode_b64(message).unwrap_or_else(|| message.to_string())
    } else {
        message.to_string()
    }
}

/// Removes each prompt (first occurrence at or after the previous removal)
/// from `stdout`, along with one newline directly following it.
pub fn strip_prompts(stdout: &str, prompts: &[String]) -> String {
    let mut out = stdout.to_string();
    let mut cursor = 0;
    for prompt in prompts.iter().filter(|p| !p.is_empty()) {
        let Some(found) = out[cursor..].find(prompt.as_str()) else {
            continue;
        };
        let start = cursor + found;
        let mut end = start + prompt.len();
        if out[end..].starts_with("\r\n") {
            end += 2;
        } else if out[end..].starts_with('\n') {
            end += 1;
        }
        out.replace_range(start..end, "");
        cursor = start;
    }
    out
}
