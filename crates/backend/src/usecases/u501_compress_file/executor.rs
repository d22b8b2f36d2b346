use contracts::shared::data_url;
use std::sync::Arc;

use super::compressor::{ExternalCompressor, ProcessCompressor};
use super::error::CompressError;
use super::naming;
use super::staging::{StagedJob, StagingArea};
use crate::shared::config::{self, Config};
use crate::shared::format::{compression_ratio, format_number};

/// Результат сжатия: байты и имя для Content-Disposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Executor для UseCase сжатия файла.
///
/// Не хранит состояния между запросами: каждый вызов получает свои
/// временные файлы и удаляет их перед возвратом.
pub struct CompressExecutor {
    staging: StagingArea,
    compressor: Arc<dyn ExternalCompressor>,
}

impl CompressExecutor {
    pub fn new(staging: StagingArea, compressor: Arc<dyn ExternalCompressor>) -> Self {
        Self {
            staging,
            compressor,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let staging_dir = config::resolve_path(&config.staging.dir);
        tracing::info!(
            "Compressor: {} {:?}, staging dir: {}",
            config.compressor.program,
            config.compressor.args,
            staging_dir.display()
        );
        Self::new(
            StagingArea::new(staging_dir),
            Arc::new(ProcessCompressor::from_config(&config.compressor)),
        )
    }

    /// Сжать один файл: decode -> stage -> external compressor -> read -> cleanup
    pub async fn compress(
        &self,
        file_name: &str,
        payload: &str,
    ) -> Result<CompressedFile, CompressError> {
        let start = std::time::Instant::now();
        let file_name = naming::sanitize_file_name(file_name);

        let decoded = data_url::parse(payload)?;
        tracing::info!(
            "Compressing {} ({}, {} bytes)",
            file_name,
            decoded.mime_type,
            format_number(decoded.bytes.len())
        );

        self.staging.ensure().await?;

        // Оба временных файла удаляются до возврата, при любом исходе
        let job = self.staging.allocate(&file_name);
        let result = self.run_job(&job, &decoded.bytes).await;
        job.cleanup().await;
        let bytes = result?;

        tracing::info!(
            "Compressed {} in {}ms: {} -> {} bytes ({})",
            file_name,
            start.elapsed().as_millis(),
            format_number(decoded.bytes.len()),
            format_number(bytes.len()),
            compression_ratio(decoded.bytes.len(), bytes.len())
        );

        Ok(CompressedFile {
            file_name: naming::compressed_file_name(&file_name),
            bytes,
        })
    }

    async fn run_job(&self, job: &StagedJob, input: &[u8]) -> Result<Vec<u8>, CompressError> {
        job.write_input(input).await?;
        self.compressor
            .run(job.input_path(), job.output_path())
            .await?;
        job.read_output().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Test compressor: reverses the input bytes, optionally after a delay
    #[derive(Default)]
    pub(crate) struct ReversingCompressor {
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    #[async_trait]
    impl ExternalCompressor for ReversingCompressor {
        async fn run(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut bytes = tokio::fs::read(input).await.unwrap();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            bytes.reverse();
            tokio::fs::write(output, bytes).await.unwrap();
            Ok(())
        }
    }

    /// Test compressor that always fails after leaving a partial output
    pub(crate) struct FailingCompressor(pub &'static str);

    #[async_trait]
    impl ExternalCompressor for FailingCompressor {
        async fn run(&self, _input: &Path, output: &Path) -> Result<(), CompressError> {
            tokio::fs::write(output, b"partial").await.unwrap();
            Err(CompressError::CompressionFailed(self.0.to_string()))
        }
    }

    /// Exits successfully without writing anything
    struct SilentCompressor;

    #[async_trait]
    impl ExternalCompressor for SilentCompressor {
        async fn run(&self, _input: &Path, _output: &Path) -> Result<(), CompressError> {
            Ok(())
        }
    }

    fn executor(dir: &Path, compressor: Arc<dyn ExternalCompressor>) -> CompressExecutor {
        CompressExecutor::new(StagingArea::new(dir.join("temp")), compressor)
    }

    fn staged_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir.join("temp"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_compress_success() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor::default());
        let executor = executor(dir.path(), compressor.clone());

        let payload = data_url::encode(b"abc", "text/plain");
        let result = executor.compress("report.txt", &payload).await.unwrap();

        assert_eq!(result.file_name, "report.compressed.txt");
        assert_eq!(result.bytes, b"cba");
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(dir.path(), Arc::new(ReversingCompressor::default()));

        let payload = data_url::encode(&[], "");
        let result = executor.compress("empty", &payload).await.unwrap();
        assert!(result.bytes.is_empty());
        assert_eq!(result.file_name, "empty.compressed");
    }

    #[tokio::test]
    async fn test_malformed_payload_never_reaches_compressor() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor::default());
        let executor = executor(dir.path(), compressor.clone());

        let err = executor
            .compress("a.bin", "not a data url")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedPayload");
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(dir.path(), Arc::new(FailingCompressor("bad input")));

        let payload = data_url::encode(b"abc", "text/plain");
        let err = executor.compress("a.txt", &payload).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some("bad input"));
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(dir.path(), Arc::new(SilentCompressor));

        let payload = data_url::encode(b"abc", "text/plain");
        let err = executor.compress("a.txt", &payload).await.unwrap_err();
        assert_eq!(err.kind(), "CompressionFailed");
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_long_file_name_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(dir.path(), Arc::new(ReversingCompressor::default()));

        let name = format!("{}.txt", "a".repeat(201));
        let payload = data_url::encode(b"abc", "text/plain");
        let result = executor.compress(&name, &payload).await.unwrap();

        assert_eq!(result.bytes, b"cba");
        assert_eq!(result.file_name, format!("{}.compressed.txt", "a".repeat(201)));
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_multibyte_file_name_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor(dir.path(), Arc::new(FailingCompressor("bad input")));

        let name = format!("{}.bin", "文".repeat(80));
        let payload = data_url::encode(b"abc", DEFAULT_MIME);
        let err = executor.compress(&name, &payload).await.unwrap_err();

        assert_eq!(err.kind(), "CompressionFailed");
        assert_eq!(staged_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_staging_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("temp"), b"a file where the dir should be").unwrap();
        let executor = executor(dir.path(), Arc::new(ReversingCompressor::default()));

        let payload = data_url::encode(b"abc", "text/plain");
        let err = executor.compress("a.txt", &payload).await.unwrap_err();
        assert_eq!(err.kind(), "StagingUnavailable");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_same_name_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let compressor = Arc::new(ReversingCompressor {
            calls: AtomicUsize::new(0),
            delay: Some(Duration::from_millis(50)),
        });
        let executor = Arc::new(executor(dir.path(), compressor));

        let first = data_url::encode(b"first content", DEFAULT_MIME);
        let second = data_url::encode(b"SECOND", DEFAULT_MIME);

        let (a, b) = tokio::join!(
            executor.compress("dup.bin", &first),
            executor.compress("dup.bin", &second)
        );

        assert_eq!(a.unwrap().bytes, b"tnetnoc tsrif");
        assert_eq!(b.unwrap().bytes, b"DNOCES");
        assert_eq!(staged_entries(dir.path()), 0);
    }

    const DEFAULT_MIME: &str = data_url::DEFAULT_MIME_TYPE;
}
