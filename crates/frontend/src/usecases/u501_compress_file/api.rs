use contracts::usecases::u501_compress_file::{CompressRequest, COMPRESS_API_PATH};
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, RequestInit, RequestMode, Response};

use super::error::ClientError;
use super::pipeline::CompressPort;
use super::session::SelectedFile;
use crate::shared::api_utils::api_url;
use crate::shared::download;

/// Сколько держать состояние uploading на экране перед чтением файла
const UPLOAD_PAINT_DELAY_MS: u32 = 500;

/// API клиент для UseCase u501
pub async fn compress(request: &CompressRequest) -> Result<Vec<u8>, ClientError> {
    let window = window().ok_or_else(|| ClientError::NetworkFailure("No window object".into()))?;

    let body = serde_json::to_string(request)
        .map_err(|e| ClientError::NetworkFailure(e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let request = web_sys::Request::new_with_str_and_init(&api_url(COMPRESS_API_PATH), &opts)
        .map_err(|e| ClientError::NetworkFailure(format!("Failed to create request: {:?}", e)))?;

    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| ClientError::NetworkFailure(format!("Failed to set header: {:?}", e)))?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| ClientError::NetworkFailure(format!("Fetch failed: {:?}", e)))?;

    let response: Response = response_value
        .dyn_into()
        .map_err(|_| ClientError::NetworkFailure("Not a Response".into()))?;

    if !response.ok() {
        // Тело ошибки может отсутствовать или быть не JSON
        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|text| text.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        return Err(ClientError::rejected(response.status(), &body));
    }

    let buffer = JsFuture::from(
        response
            .array_buffer()
            .map_err(|e| ClientError::NetworkFailure(format!("Failed to read body: {:?}", e)))?,
    )
    .await
    .map_err(|e| ClientError::NetworkFailure(format!("Failed to read body: {:?}", e)))?;

    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Читает содержимое файла как байты
pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, ClientError> {
    let array_buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| ClientError::Encoding(format!("{:?}", e)))?;

    Ok(js_sys::Uint8Array::new(&array_buffer).to_vec())
}

/// [`CompressPort`] поверх fetch, Blob URL и таймеров браузера.
///
/// Сам `web_sys::File` не `Send`, поэтому хранится в локальном StoredValue
/// рядом с view, а в [`Session`](super::session::Session) попадают только
/// его метаданные.
#[derive(Clone, Copy)]
pub struct BrowserPort {
    pub file: StoredValue<Option<web_sys::File>, LocalStorage>,
}

impl CompressPort for BrowserPort {
    async fn yield_to_ui(&self) {
        gloo_timers::future::TimeoutFuture::new(UPLOAD_PAINT_DELAY_MS).await;
    }

    async fn read_content(&self, selected: &SelectedFile) -> Result<Vec<u8>, ClientError> {
        let file = self
            .file
            .try_get_value()
            .flatten()
            .ok_or_else(|| ClientError::Encoding(format!("{} is no longer available", selected.name)))?;
        read_file(&file).await
    }

    async fn send(&self, request: CompressRequest) -> Result<Vec<u8>, ClientError> {
        compress(&request).await
    }

    fn create_artifact(&self, bytes: &[u8]) -> Result<String, ClientError> {
        download::create_object_url(bytes, "application/octet-stream").map_err(ClientError::Artifact)
    }

    fn release_artifact(&self, handle: &str) {
        download::revoke_object_url(handle);
    }
}
