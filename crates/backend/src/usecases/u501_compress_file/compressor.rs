use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use super::error::CompressError;
use crate::shared::config::CompressorConfig;

/// Режим, передаваемый внешнему компрессору первым аргументом
pub const COMPRESS_MODE: &str = "compress";

/// Внешний компрессор: читает `input`, пишет сжатый результат в `output`
#[async_trait]
pub trait ExternalCompressor: Send + Sync {
    async fn run(&self, input: &Path, output: &Path) -> Result<(), CompressError>;
}

/// One-shot subprocess: `<program> <args...> compress <input> <output>`
#[derive(Debug, Clone)]
pub struct ProcessCompressor {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessCompressor {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &CompressorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.timeout())
    }
}

#[async_trait]
impl ExternalCompressor for ProcessCompressor {
    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn run(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(COMPRESS_MODE)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Процесс убивается, если future отброшен по таймауту
            .kill_on_drop(true);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    CompressError::CompressionFailed(format!(
                        "{} did not finish within {:?}",
                        self.program, limit
                    ))
                })?,
            None => command.output().await,
        };

        let output = result.map_err(|e| {
            CompressError::CompressionFailed(format!("failed to execute {}: {}", self.program, e))
        })?;

        if !output.status.success() {
            return Err(CompressError::CompressionFailed(diagnostic(
                &self.program,
                &output,
            )));
        }

        tracing::debug!("Compressor exited successfully");
        Ok(())
    }
}

/// stderr, иначе stdout, иначе код завершения
fn diagnostic(program: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    format!("{} exited with {}", program, output.status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// `sh -c <script> sh compress <input> <output>`: $1=mode, $2=input, $3=output
    fn shell(script: &str, timeout: Option<Duration>) -> ProcessCompressor {
        ProcessCompressor::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            timeout,
        )
    }

    #[tokio::test]
    async fn test_success_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, b"abc").unwrap();

        let compressor = shell(r#"[ "$1" = compress ] && cp "$2" "$3""#, None);
        compressor.run(&input, &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = shell("echo 'unsupported format' >&2; exit 3", None);
        let err = compressor
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some("unsupported format"));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = shell("echo 'Error processing file: boom'; exit 1", None);
        let err = compressor
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message().as_deref(),
            Some("Error processing file: boom")
        );
    }

    #[tokio::test]
    async fn test_silent_failure_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = shell("exit 7", None);
        let err = compressor
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .await
            .unwrap_err();
        let message = err.user_message().unwrap();
        assert!(message.starts_with("sh exited with"), "{}", message);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = ProcessCompressor::new("definitely-not-a-compressor", vec![], None);
        let err = compressor
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "CompressionFailed");
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = shell("sleep 5", Some(Duration::from_millis(200)));
        let err = compressor
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not finish"));
    }
}
