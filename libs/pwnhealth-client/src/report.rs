use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ClientResult;

/// Decode a Base64 report payload (typically a PDF) into raw bytes.
///
/// Line breaks and other ASCII whitespace inside the payload are ignored.
/// Purely local, no network call.
///
/// # Errors
/// Returns `ClientError::Decode` when the payload is not valid standard Base64.
pub fn decode_report(payload: &str) -> ClientResult<Vec<u8>> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}
