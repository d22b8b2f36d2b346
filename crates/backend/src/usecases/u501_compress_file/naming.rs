//! File names derived from the client-supplied name.

use uuid::Uuid;

/// Маркер, вставляемый перед расширением сжатого файла
pub const COMPRESSED_MARKER: &str = "compressed";

const FALLBACK_NAME: &str = "file";

/// Reduce a client-supplied name to a safe final path component.
///
/// Directory parts (both `/` and `\`), quotes and control characters are
/// dropped; an empty or dot-only result becomes `file`.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `report.txt` -> `report.compressed.txt`, `README` -> `README.compressed`
pub fn compressed_file_name(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!(
            "{}.{}{}",
            &name[..idx],
            COMPRESSED_MARKER,
            &name[idx..]
        ),
        _ => format!("{}.{}", name, COMPRESSED_MARKER),
    }
}

/// Самое длинное расширение, переносимое в имя временного файла
const MAX_STAGED_EXTENSION: usize = 16;

/// Staging names unique per job: `<job id><.ext>` and `<job id><.ext>.compressed`.
///
/// Only a short ASCII extension of the client name is kept, so the names
/// (and their `temp_` rename targets) stay far below the 255-byte limit
/// whatever the client sends.
pub fn staging_names(job_id: Uuid, name: &str) -> (String, String) {
    let input = format!("{}{}", job_id, staged_extension(name));
    let output = format!("{}.{}", input, COMPRESSED_MARKER);
    (input, output)
}

fn staged_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx..];
            let valid = ext.len() > 1
                && ext.len() <= MAX_STAGED_EXTENSION
                && ext[1..].chars().all(|c| c.is_ascii_alphanumeric());
            if valid {
                ext
            } else {
                ""
            }
        }
        _ => "",
    }
}
