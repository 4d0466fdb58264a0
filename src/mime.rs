//! Static extension-to-MIME lookup used for generic file uploads
//!
//! Repository writes always use [`APPLICATION_JSON`]; this table only covers
//! the file-transfer path, where the content type follows the local file's
//! extension.

use std::ffi::OsStr;
use std::path::Path;

/// Content type of every entity and tagged-document write.
pub const APPLICATION_JSON: &str = "application/json";

/// Fallback content type for unrecognized extensions.
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Map a file extension (with or without the leading dot) to a MIME type.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "eot" => "application/vnd.ms-fontobject",
        "gif" => "image/gif",
        "html" => "text/html",
        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" => "text/javascript",
        "json" | "map" => APPLICATION_JSON,
        "otf" => "application/x-font-otf",
        "png" => "image/png",
        "ps1" | "scss" | "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "ttf" => "application/x-font-ttf",
        "wof" => "application/x-font-woff",
        "xml" => "application/xml",
        _ => APPLICATION_OCTET_STREAM,
    }
}

/// Map a path to a MIME type by its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(OsStr::to_str)
        .map(content_type_for_extension)
        .unwrap_or(APPLICATION_OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for_extension("css"), "text/css");
        assert_eq!(content_type_for_extension(".jpg"), "image/jpeg");
        assert_eq!(content_type_for_extension("jpeg"), "image/jpeg");
        assert_eq!(content_type_for_extension("js"), "text/javascript");
        assert_eq!(content_type_for_extension("map"), APPLICATION_JSON);
        assert_eq!(content_type_for_extension("SVG"), "image/svg+xml");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(content_type_for_extension("wasm"), APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for_extension(""), APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_path_lookup() {
        assert_eq!(content_type_for_path(Path::new("photos/photo.jpg")), "image/jpeg");
        assert_eq!(content_type_for_path(Path::new("no-extension")), APPLICATION_OCTET_STREAM);
    }
}
