//! Decoding object bytes into prompt-ready text.

use std::str;

use super::ContentKind;
use crate::{Error, Result};

/// Decodes raw object bytes into a display string for the given kind.
///
/// JSON is re-serialized with two-space indentation, CSV rows are rendered
/// one per line as `Headers: ..` followed by `Row i: ..`, and text or
/// markdown is returned verbatim. A multi-byte character cut off at the very
/// end of `bytes` is dropped, since partial reads may end mid-character.
pub fn decode_content(bytes: &[u8], kind: ContentKind) -> Result<String> {
    let text = decode_utf8(bytes, kind)?;
    match kind {
        ContentKind::Text | ContentKind::Markdown => Ok(text.to_owned()),
        ContentKind::Json => decode_json(text),
        ContentKind::Csv => decode_csv(text),
    }
}

/// Truncates `text` to at most `max_bytes` bytes of UTF-8.
///
/// The cut never splits a character: it moves back to the nearest character
/// boundary at or below the budget.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn decode_utf8(bytes: &[u8], kind: ContentKind) -> Result<&str> {
    match str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        // Incomplete sequence at the end of the buffer.
        Err(e) if e.error_len().is_none() => {
            Ok(str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default())
        }
        Err(e) => Err(Error::file_processing()
            .with_message(format!("Failed to parse {kind} file: {e}"))
            .with_source(e)),
    }
}

fn decode_json(text: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        Error::file_processing()
            .with_message(format!("Failed to parse json file: {e}"))
            .with_source(e)
    })?;
    serde_json::to_string_pretty(&value).map_err(|e| {
        Error::file_processing()
            .with_message(format!("Failed to render json file: {e}"))
            .with_source(e)
    })
}

fn decode_csv(text: &str) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut lines = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::file_processing()
                .with_message(format!("Failed to parse csv file: {e}"))
                .with_source(e)
        })?;
        let row = record.iter().collect::<Vec<_>>().join(", ");
        if i == 0 {
            lines.push(format!("Headers: {row}"));
        } else {
            lines.push(format!("Row {i}: {row}"));
        }
    }
    Ok(lines.join("\n"))
}
