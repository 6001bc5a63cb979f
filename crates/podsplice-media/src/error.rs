//! Error types for editing and media operations.

use std::path::PathBuf;
use thiserror::Error;

use podsplice_models::ModelError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Pipeline stage an external tool was running for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Measure,
    Decode,
    Extract,
    Concat,
    Encode,
    SilenceDetect,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Probe => "probe",
            Stage::Measure => "measure",
            Stage::Decode => "decode",
            Stage::Extract => "extract",
            Stage::Concat => "concat",
            Stage::Encode => "encode",
            Stage::SilenceDetect => "silence_detect",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while resolving edits or rendering them.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{stage} failed: {message}")]
    ToolFailure {
        stage: Stage,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("{stage} timed out after {secs} seconds")]
    Timeout { stage: Stage, secs: u64 },

    #[error("No loudness measurement for speaker {speaker}: {reason}")]
    MeasurementGap { speaker: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<ModelError> for MediaError {
    fn from(err: ModelError) -> Self {
        MediaError::Input(err.to_string())
    }
}

impl MediaError {
    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Create an external tool failure error.
    pub fn tool_failed(
        stage: Stage,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailure {
            stage,
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a measurement gap.
    pub fn measurement_gap(speaker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MeasurementGap {
            speaker: speaker.into(),
            reason: reason.into(),
        }
    }

    /// True for malformed or missing inputs.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MediaError::Input(_) | MediaError::FileNotFound(_) | MediaError::JsonParse(_)
        )
    }

    /// True for failures of an external process.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            MediaError::ToolFailure { .. }
                | MediaError::Timeout { .. }
                | MediaError::FfmpegNotFound
                | MediaError::FfprobeNotFound
        )
    }

    /// Stage of a tool failure, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MediaError::ToolFailure { stage, .. } | MediaError::Timeout { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// Captured diagnostic output of a failed tool.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            MediaError::ToolFailure { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_input_error() {
            2
        } else if self.is_tool_failure() {
            3
        } else if matches!(self, MediaError::InvariantViolation(_)) {
            4
        } else {
            1
        }
    }
}
