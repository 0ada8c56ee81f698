//! # coderunner
//!
//! Runs console programs that read from stdin against a remote sandbox as if
//! they were attached to a terminal.
//!
//! ```text
//! source → detector (InputGroups) → session (prompts, answers)
//!        → composer (stdin) → execution (Judge0) → transcript
//! ```

pub mod composer;
pub mod config;
pub mod detector;
pub mod execution;
pub mod model;
pub mod session;
pub mod transcript;

pub use config::{ConfigError, RunnerConfig};
pub use detector::{detect, detect_for};
pub use execution::{ExecutionError, Judge0Client, RunReport, Sandbox};
pub use model::{Field, FieldType, InputGroup, Language, Separator};
pub use session::{execute, Controller, Job, Phase, RunId};
pub use transcript::{LineKind, Transcript, TranscriptLine};
