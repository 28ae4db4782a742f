//! MIME type detection based on file extensions.

const DEFAULT_MIME_TYPE: &str = "text/plain";

const MIME_TYPES: &[(&str, &str)] = &[
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("txt", "text/plain"),
];

/// Maps an extension (without the dot) to a MIME type.
///
/// Unknown or empty extensions fall back to `text/plain`.
pub fn from_extension(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
