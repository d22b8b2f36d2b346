//! Конвейер сжатия: uploading -> processing -> completed | error.
//!
//! Браузерные операции спрятаны за [`CompressPort`], хранилище сессии за
//! [`SessionStore`], поэтому переходы проверяются обычными тестами.

use contracts::shared::data_url;
use contracts::usecases::u501_compress_file::CompressRequest;
use leptos::prelude::{RwSignal, Update};

use super::error::ClientError;
use super::session::{CompressedArtifact, SelectedFile, Session, TransitionError};

/// Где живёт [`Session`]. `None` означает, что хранилище уже уничтожено.
pub trait SessionStore {
    fn update_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R>;
}

impl SessionStore for RwSignal<Session> {
    fn update_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.try_update(f)
    }
}

/// Операции конвейера, требующие браузера или сети
#[allow(async_fn_in_trait)]
pub trait CompressPort {
    /// Отдать управление UI, чтобы отрисовалось состояние uploading
    async fn yield_to_ui(&self);

    async fn read_content(&self, file: &SelectedFile) -> Result<Vec<u8>, ClientError>;

    /// Отправить запрос; Ok содержит сжатые байты
    async fn send(&self, request: CompressRequest) -> Result<Vec<u8>, ClientError>;

    /// Создать локальный handle (object URL) для скачивания
    fn create_artifact(&self, bytes: &[u8]) -> Result<String, ClientError>;

    fn release_artifact(&self, handle: &str);
}

/// Запустить сжатие выбранного файла.
///
/// Ошибка возвращается только если сессия не в idle с выбранным файлом;
/// сбои сети и сервера переводят сессию в error.
pub async fn run_compression<S, P>(store: &S, port: &P) -> Result<(), TransitionError>
where
    S: SessionStore,
    P: CompressPort,
{
    let Some(file) = store.update_session(Session::begin_upload).transpose()? else {
        return Ok(());
    };
    log::info!("Compressing {} ({} bytes)", file.name, file.size);

    port.yield_to_ui().await;

    let content = match port.read_content(&file).await {
        Ok(bytes) => data_url::encode(&bytes, file.effective_mime_type()),
        Err(e) => return fail(store, e),
    };

    if store
        .update_session(Session::mark_processing)
        .transpose()?
        .is_none()
    {
        return Ok(());
    }

    let request = CompressRequest {
        file_name: file.name.clone(),
        content,
    };
    let compressed = match port.send(request).await {
        Ok(bytes) => bytes,
        Err(e) => return fail(store, e),
    };
    let handle = match port.create_artifact(&compressed) {
        Ok(handle) => handle,
        Err(e) => return fail(store, e),
    };

    let artifact = CompressedArtifact {
        handle: handle.clone(),
        size: compressed.len(),
        download_name: file.download_name(),
    };
    match store.update_session(|s| s.complete(artifact)) {
        Some(Ok(())) => {
            log::info!(
                "Compressed {}: {} -> {} bytes",
                file.name,
                file.size,
                compressed.len()
            );
            Ok(())
        }
        Some(Err(e)) => {
            port.release_artifact(&handle);
            Err(e)
        }
        // Сессия уничтожена, handle больше никто не освободит
        None => {
            port.release_artifact(&handle);
            Ok(())
        }
    }
}

fn fail<S: SessionStore>(store: &S, error: ClientError) -> Result<(), TransitionError> {
    log::error!("Compression failed: {}", error);
    store
        .update_session(|s| s.fail(error.status_message()))
        .transpose()
        .map(|_| ())
}

/// Сбросить сессию и освободить артефакт, если он был
pub fn reset_session<S, P>(store: &S, port: &P) -> Result<(), TransitionError>
where
    S: SessionStore,
    P: CompressPort,
{
    if let Some(artifact) = store.update_session(Session::reset).transpose()?.flatten() {
        port.release_artifact(&artifact.handle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u501_compress_file::ProcessingState;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    use crate::usecases::u501_compress_file::session::{
        Control, COMPRESSING_MESSAGE, SUCCESS_MESSAGE, UPLOADING_MESSAGE,
    };

    /// Хранилище, которое запоминает каждое новое состояние
    struct RecordingStore {
        session: RefCell<Session>,
        history: RefCell<Vec<(ProcessingState, Option<String>)>>,
    }

    impl RecordingStore {
        fn with_file(file: SelectedFile) -> Self {
            let mut session = Session::new();
            session.select_file(file).unwrap();
            Self {
                session: RefCell::new(session),
                history: RefCell::new(vec![(ProcessingState::Idle, None)]),
            }
        }

        fn states(&self) -> Vec<ProcessingState> {
            self.history.borrow().iter().map(|(s, _)| *s).collect()
        }

        fn session(&self) -> Session {
            self.session.borrow().clone()
        }
    }

    impl SessionStore for RecordingStore {
        fn update_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
            let mut session = self.session.borrow_mut();
            let result = f(&mut *session);
            let entry = (
                session.state(),
                session.status_message().map(str::to_string),
            );
            let mut history = self.history.borrow_mut();
            if history.last() != Some(&entry) {
                history.push(entry);
            }
            Some(result)
        }
    }

    struct FakePort {
        content: Result<Vec<u8>, ClientError>,
        response: Result<Vec<u8>, ClientError>,
        yields: Cell<usize>,
        sent: RefCell<Vec<CompressRequest>>,
        created: Cell<usize>,
        released: RefCell<Vec<String>>,
    }

    impl FakePort {
        fn responding(response: Result<Vec<u8>, ClientError>) -> Self {
            Self {
                content: Ok(vec![7u8; 2048]),
                response,
                yields: Cell::new(0),
                sent: RefCell::new(Vec::new()),
                created: Cell::new(0),
                released: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompressPort for FakePort {
        async fn yield_to_ui(&self) {
            self.yields.set(self.yields.get() + 1);
        }

        async fn read_content(&self, _file: &SelectedFile) -> Result<Vec<u8>, ClientError> {
            self.content.clone()
        }

        async fn send(&self, request: CompressRequest) -> Result<Vec<u8>, ClientError> {
            self.sent.borrow_mut().push(request);
            self.response.clone()
        }

        fn create_artifact(&self, _bytes: &[u8]) -> Result<String, ClientError> {
            self.created.set(self.created.get() + 1);
            Ok(format!("blob:test/{}", self.created.get()))
        }

        fn release_artifact(&self, handle: &str) {
            self.released.borrow_mut().push(handle.to_string());
        }
    }

    fn png() -> SelectedFile {
        SelectedFile::new("test.png", 2048, "image/png")
    }

    #[test]
    fn test_successful_compression() {
        let store = RecordingStore::with_file(png());
        let port = FakePort::responding(Ok(vec![1, 2, 3]));

        block_on(run_compression(&store, &port)).unwrap();

        assert_eq!(
            store.states(),
            vec![
                ProcessingState::Idle,
                ProcessingState::Uploading,
                ProcessingState::Processing,
                ProcessingState::Completed,
            ]
        );
        let statuses: Vec<_> = store
            .history
            .borrow()
            .iter()
            .filter_map(|(_, m)| m.clone())
            .collect();
        assert_eq!(
            statuses,
            vec![UPLOADING_MESSAGE, COMPRESSING_MESSAGE, SUCCESS_MESSAGE]
        );
        assert_eq!(port.yields.get(), 1);

        let session = store.session();
        let artifact = session.artifact().unwrap();
        assert_eq!(artifact.download_name, "compressed_test.png");
        assert_eq!(artifact.size, 3);
        assert!(session.has_control(Control::DownloadCompressedFile));

        let sent = port.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].file_name, "test.png");
        let decoded = data_url::parse(&sent[0].content).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, vec![7u8; 2048]);
    }

    #[test]
    fn test_server_rejection_shows_message() {
        let store = RecordingStore::with_file(png());
        let port = FakePort::responding(Err(ClientError::rejected(
            500,
            r#"{"message":"Compression failed by mock"}"#,
        )));

        block_on(run_compression(&store, &port)).unwrap();

        assert_eq!(
            store.states(),
            vec![
                ProcessingState::Idle,
                ProcessingState::Uploading,
                ProcessingState::Processing,
                ProcessingState::Error,
            ]
        );
        let session = store.session();
        assert_eq!(session.status_message(), Some("Compression failed by mock"));
        assert!(!session.has_control(Control::DownloadCompressedFile));
        assert_eq!(port.created.get(), 0);
    }

    #[test]
    fn test_read_failure_goes_to_error_from_uploading() {
        let store = RecordingStore::with_file(png());
        let mut port = FakePort::responding(Ok(vec![1]));
        port.content = Err(ClientError::Encoding("NotReadableError".to_string()));

        block_on(run_compression(&store, &port)).unwrap();

        assert_eq!(
            store.states(),
            vec![
                ProcessingState::Idle,
                ProcessingState::Uploading,
                ProcessingState::Error,
            ]
        );
        assert!(port.sent.borrow().is_empty());
        assert_eq!(
            store.session().status_message(),
            Some("failed to read file: NotReadableError")
        );
    }

    #[test]
    fn test_empty_mime_type_defaults() {
        let store = RecordingStore::with_file(SelectedFile::new("blob", 0, ""));
        let mut port = FakePort::responding(Ok(vec![]));
        port.content = Ok(vec![]);

        block_on(run_compression(&store, &port)).unwrap();

        let sent = port.sent.borrow();
        assert_eq!(sent[0].content, "data:application/octet-stream;base64,");
        assert_eq!(store.session().state(), ProcessingState::Completed);
    }

    #[test]
    fn test_compress_without_file_is_rejected() {
        let store = RecordingStore::with_file(png());
        store.session.borrow_mut().cancel().unwrap();
        let port = FakePort::responding(Ok(vec![1]));

        let err = block_on(run_compression(&store, &port)).unwrap_err();
        assert_eq!(err.event, "compress");
        assert!(port.sent.borrow().is_empty());
        assert_eq!(store.session(), Session::new());
    }

    #[test]
    fn test_reset_releases_artifact_exactly_once() {
        let store = RecordingStore::with_file(png());
        let port = FakePort::responding(Ok(vec![1, 2, 3]));
        block_on(run_compression(&store, &port)).unwrap();

        reset_session(&store, &port).unwrap();
        assert!(reset_session(&store, &port).is_err());

        assert_eq!(*port.released.borrow(), vec!["blob:test/1".to_string()]);
        let session = store.session();
        assert_eq!(session, Session::new());
        assert_eq!(session.controls(), vec![Control::ChooseFile]);
    }

    #[test]
    fn test_reset_after_error() {
        let store = RecordingStore::with_file(png());
        let port = FakePort::responding(Err(ClientError::NetworkFailure("offline".into())));
        block_on(run_compression(&store, &port)).unwrap();
        assert_eq!(store.session().status_message(), Some("Failed to compress file"));

        reset_session(&store, &port).unwrap();
        assert_eq!(store.session(), Session::new());
        assert!(port.released.borrow().is_empty());
    }

    #[test]
    fn test_cancel_with_selected_file() {
        let store = RecordingStore::with_file(png());
        store.update_session(Session::cancel).unwrap().unwrap();

        let session = store.session();
        assert_eq!(session.state(), ProcessingState::Idle);
        assert!(session.file().is_none());
        assert_eq!(session.status_message(), None);
    }
}
