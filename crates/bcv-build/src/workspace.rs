//! Per-job scratch workspace.
//!
//! Each build job exclusively owns one scratch directory for its duration.
//! Artifact files are registered as they are created, and every registered
//! artifact (then the directory itself) is removed when the workspace drops,
//! whichever way the job ends — success, tool failure, cancellation, or
//! fault. Cleanup is best-effort: individual removal failures are logged and
//! never mask the job's result.

use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

use crate::error::{BuildFault, Result};

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a uniquely named scratch directory under `base`.
///
/// The name derives from timestamp + pid + an atomic counter, so concurrent
/// processes sharing a base directory never collide.
pub async fn create_scratch_dir(base: &Utf8Path) -> Result<Utf8PathBuf> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let pid = std::process::id();
    let count = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = base.join(format!("{timestamp:x}-{pid}-{count}"));

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| BuildFault::CreateScratchDir {
            path: dir.clone(),
            source,
        })?;

    Ok(dir)
}

/// One job's scratch directory and the artifacts registered inside it.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: Utf8PathBuf,
    artifacts: Vec<Utf8PathBuf>,
}

impl JobWorkspace {
    /// Allocate a fresh scratch directory for one job under `base`.
    pub async fn allocate(base: &Utf8Path) -> Result<Self> {
        Ok(Self {
            dir: create_scratch_dir(base).await?,
            artifacts: Vec::new(),
        })
    }

    /// The job's scratch directory; the working directory for tool runs.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Register `file_name` as an artifact of this job and return its path.
    ///
    /// Registration does not create the file; it guarantees the path is
    /// deleted when the job ends.
    pub fn register(&mut self, file_name: &str) -> Utf8PathBuf {
        let path = self.dir.join(file_name);
        self.artifacts.push(path.clone());
        path
    }

    /// Write the job's source text, registering the artifact.
    ///
    /// A failed write is a fault of the job: it means the scratch directory
    /// is broken, not the source.
    pub async fn write_source(&mut self, file_name: &str, text: &str) -> Result<Utf8PathBuf> {
        let path = self.register(file_name);
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| BuildFault::WriteSource {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Read an artifact as UTF-8 text (lossy for tool output that isn't).
    pub async fn read_text(&self, path: &Utf8Path) -> Result<String> {
        let bytes = self.read_bytes(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read an artifact's raw bytes.
    pub async fn read_bytes(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|source| BuildFault::ReadArtifact {
                path: path.to_owned(),
                source,
            })
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        for path in &self.artifacts {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove artifact {path}: {e}");
                }
            }
        }
        // Backstop for anything the tools created without registering.
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            warn!("failed to remove scratch directory {}: {e}", self.dir);
        }
    }
}
