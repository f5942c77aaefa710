pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// MIME type recorded for an upload.
///
/// A detected image format wins, then the caller's hint, then content
/// sniffing, then `application/octet-stream`.
pub fn resolve_mime_type(detected: Option<&str>, hint: Option<&str>, data: &[u8]) -> String {
    detected
        .or(hint.map(str::trim).filter(|h| !h.is_empty()))
        .map(str::to_string)
        .or_else(|| infer::get(data).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}
