//! CLI error types and exit status mapping.

use thiserror::Error;

use podsplice_media::MediaError;
use podsplice_models::ModelError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Invalid input document: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit status: 2 bad input, 3 tool failure, 4 invariant, 1 other.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Model(_) => 2,
            CliError::Media(e) => e.exit_code(),
            CliError::Io(_) | CliError::Json(_) => 1,
        }
    }
}

/// Exit status for an error bubbled up to `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<CliError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<MediaError>() {
        return e.exit_code();
    }
    if err.downcast_ref::<ModelError>().is_some() {
        return 2;
    }
    1
}

/// Captured tool diagnostics, if the failure came from an external process.
pub fn diagnostic_for(err: &anyhow::Error) -> Option<&str> {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Media(e)) => e.diagnostic(),
        _ => err.downcast_ref::<MediaError>().and_then(|e| e.diagnostic()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use podsplice_media::Stage;

    #[test]
    fn test_exit_codes_through_context() {
        let err: anyhow::Result<()> = Err(MediaError::invariant("overlap")).context("cut failed");
        assert_eq!(exit_code_for(&err.unwrap_err()), 4);

        let err = anyhow::Error::new(CliError::from(MediaError::FileNotFound("d.json".into())));
        assert_eq!(exit_code_for(&err), 2);

        let err = anyhow::Error::new(CliError::config("bad SPLICE_MAX_GAIN_DB"));
        assert_eq!(exit_code_for(&err), 2);

        assert_eq!(exit_code_for(&anyhow::anyhow!("unexpected")), 1);
    }

    #[test]
    fn test_diagnostic_is_surfaced() {
        let media = MediaError::tool_failed(Stage::Encode, "boom", Some("Unknown encoder".into()), Some(1));
        let err = anyhow::Error::new(CliError::from(media));
        assert_eq!(exit_code_for(&err), 3);
        assert_eq!(diagnostic_for(&err), Some("Unknown encoder"));
    }
}
