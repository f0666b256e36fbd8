//! Error types for the build core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Internal faults of a build job.
///
/// A compiler or disassembler exiting non-zero is NOT a fault — that is
/// reported as a [`BuildOutcome`](crate::pipeline::BuildOutcome) variant.
/// Faults mean the environment is broken (missing tool binaries, unwritable
/// scratch directory), not that the user's source is.
#[derive(Debug, Error)]
pub enum BuildFault {
    #[error("failed to create scratch directory {path}: {source}")]
    CreateScratchDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write source artifact {path}: {source}")]
    WriteSource {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to redirect {stream} to {path}: {source}")]
    OpenRedirect {
        stream: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read artifact {path}: {source}")]
    ReadArtifact {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildFault>;
