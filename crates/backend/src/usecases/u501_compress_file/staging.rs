//! Staging directory and temp files of one compression job.
//!
//! Temp files are removed in two steps (rename, then unlink) because the
//! compressor process may still hold a handle right after it exits. If the
//! rename is refused the file is unlinked in place. Removal is best-effort:
//! failures are logged and never returned.
//!
//! Removal uses blocking `std::fs` calls, so the normal path runs it on the
//! blocking pool via [`StagedJob::cleanup`]. The `Drop` fallback only fires
//! when a job future is dropped before cleanup (a cancelled request).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::error::CompressError;
use super::naming;

/// Staging directory shared by all requests
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if absent. Idempotent.
    pub async fn ensure(&self) -> Result<(), CompressError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CompressError::StagingUnavailable {
                path: self.dir.clone(),
                source,
            })
    }

    /// Mint fresh temp paths for one job. Nothing is created on disk yet.
    pub fn allocate(&self, file_name: &str) -> StagedJob {
        let (input, output) = naming::staging_names(Uuid::new_v4(), file_name);
        StagedJob {
            input: self.dir.join(input),
            output: self.dir.join(output),
        }
    }
}

/// Temp input/output of one job; both are removed when the guard drops
#[derive(Debug)]
pub struct StagedJob {
    input: PathBuf,
    output: PathBuf,
}

impl StagedJob {
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub async fn write_input(&self, bytes: &[u8]) -> Result<(), CompressError> {
        tokio::fs::write(&self.input, bytes)
            .await
            .map_err(|source| CompressError::Io {
                path: self.input.clone(),
                source,
            })
    }

    /// Read the compressor output. A missing or unreadable file means the
    /// compressor did not do its job.
    pub async fn read_output(&self) -> Result<Vec<u8>, CompressError> {
        tokio::fs::read(&self.output).await.map_err(|e| {
            CompressError::CompressionFailed(format!(
                "output file {} is not readable: {}",
                self.output.display(),
                e
            ))
        })
    }
}

impl StagedJob {
    /// Remove both temp files on the blocking pool and disarm the guard
    pub async fn cleanup(mut self) {
        let input = std::mem::take(&mut self.input);
        let output = std::mem::take(&mut self.output);
        let removal = tokio::task::spawn_blocking(move || {
            remove(&input);
            remove(&output);
        });
        if let Err(e) = removal.await {
            tracing::warn!(kind = "CleanupFailed", "Cleanup task failed: {}", e);
        }
    }
}

impl Drop for StagedJob {
    fn drop(&mut self) {
        // Пустые пути означают, что cleanup уже выполнен
        for path in [&self.input, &self.output] {
            if !path.as_os_str().is_empty() {
                remove(path);
            }
        }
    }
}

/// Best-effort removal. A missing path is a no-op.
pub fn remove(path: &Path) {
    if let Err(e) = try_remove(path) {
        tracing::warn!(kind = e.kind(), "{}", e);
    }
}

fn try_remove(path: &Path) -> Result<(), CompressError> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(CompressError::CleanupFailed {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let renamed = renamed_path(path);
    let target = match std::fs::rename(path, &renamed) {
        Ok(()) => renamed,
        // Удалён кем-то между проверкой и переименованием
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            tracing::debug!(
                "Rename of {} failed ({}), removing in place",
                path.display(),
                e
            );
            path.to_path_buf()
        }
    };

    match std::fs::remove_file(&target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CompressError::CleanupFailed {
            path: target,
            source,
        }),
    }
}

/// Sibling path `temp_<name>` used as the rename target
fn renamed_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = format!("temp_{}", name);
    match path.parent() {
        Some(parent) => parent.join(renamed),
        None => PathBuf::from(renamed),
    }
}
