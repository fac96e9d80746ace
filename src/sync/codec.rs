//! Wire encoding of the document: pretty JSON, UTF-8, then standard base64.

use crate::domain::AppData;
use crate::error::SyncError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode_document(data: &AppData) -> Result<String, SyncError> {
    let json = data.to_pretty_json().map_err(|e| SyncError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode base64 content as served by the content API.
/// The API wraps base64 across lines, so whitespace is ignored.
pub fn decode_document(content: &str) -> Result<AppData, SyncError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SyncError::Decode(format!("invalid base64: {}", e)))?;
    let json = String::from_utf8(bytes).map_err(|e| SyncError::Decode(format!("invalid UTF-8: {}", e)))?;
    AppData::from_json(&json).map_err(|e| SyncError::Decode(format!("invalid document: {}", e)))
}
