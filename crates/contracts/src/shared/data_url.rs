//! Data URL transcoding used to move file content inside JSON bodies.
//!
//! Wire format: `data:<mime type>;base64,<standard base64 with padding>`.
//! The browser encodes with [`encode`], the backend recovers bytes and MIME
//! type with [`parse`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// MIME type used when the browser reports none for a file
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";
const DELIMITER: char = ',';

/// Ошибки разбора data URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("payload does not start with `data:`")]
    MissingScheme,

    #[error("payload has no `,` delimiter")]
    MissingDelimiter,

    #[error("payload is not marked as base64")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Decoded data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encode raw bytes as a data URL carrying `mime_type`.
///
/// `,` and `%` inside the MIME type are percent-escaped so that the first
/// `,` of the result is always the header/payload delimiter.
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "{}{}{}{}{}",
        SCHEME,
        escape_mime(mime_type),
        BASE64_MARKER,
        DELIMITER,
        STANDARD.encode(bytes)
    )
}

/// Split a data URL on its first `,` and decode both halves.
pub fn parse(payload: &str) -> Result<DataUrl, TranscodeError> {
    let rest = payload
        .strip_prefix(SCHEME)
        .ok_or(TranscodeError::MissingScheme)?;
    let (header, body) = rest
        .split_once(DELIMITER)
        .ok_or(TranscodeError::MissingDelimiter)?;
    let mime_type = header
        .strip_suffix(BASE64_MARKER)
        .ok_or(TranscodeError::NotBase64)?;

    let bytes = STANDARD
        .decode(body.trim())
        .map_err(|e| TranscodeError::InvalidBase64(e.to_string()))?;

    Ok(DataUrl {
        mime_type: unescape_mime(mime_type),
        bytes,
    })
}

/// Inverse of [`encode`] for the byte content only.
pub fn decode(payload: &str) -> Result<Vec<u8>, TranscodeError> {
    parse(payload).map(|data_url| data_url.bytes)
}

fn escape_mime(mime_type: &str) -> String {
    let mut escaped = String::with_capacity(mime_type.len());
    for ch in mime_type.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            ',' => escaped.push_str("%2C"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape_mime(header: &str) -> String {
    let mut result = String::with_capacity(header.len());
    let mut rest = header;
    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%25") {
            result.push('%');
            rest = &tail[3..];
        } else if tail.starts_with("%2C") || tail.starts_with("%2c") {
            result.push(',');
            rest = &tail[3..];
        } else {
            result.push('%');
            rest = &tail[1..];
        }
    }
    result.push_str(rest);
    result
}
