use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single menu action. None of them is retried.
#[derive(Debug, Error)]
pub enum CreatorError {
    #[error("Failed to resolve the target directory, check that the integration is enabled.")]
    TargetUnresolved,

    #[error("{}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to launch terminal `{program}`: {source}")]
    ProcessLaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
