//! Content-Type ↔ file extension lookups.

const MIME_TABLE: &[(&str, &str)] = &[
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/javascript", "js"),
    ("text/xml", "xml"),
    ("application/json", "json"),
    ("application/xml", "xml"),
    ("application/javascript", "js"),
    ("application/pdf", "pdf"),
    ("application/zip", "zip"),
    ("application/gzip", "gz"),
    ("application/x-tar", "tar"),
    ("application/x-7z-compressed", "7z"),
    ("application/x-rar-compressed", "rar"),
    ("application/x-iso9660-image", "iso"),
    ("application/vnd.android.package-archive", "apk"),
    ("application/epub+zip", "epub"),
    ("application/octet-stream", "bin"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("audio/wav", "wav"),
    ("audio/flac", "flac"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
    ("video/x-matroska", "mkv"),
    ("video/quicktime", "mov"),
];

/// Strip parameters (`; charset=...`) and normalise case.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Extension (without the dot) registered for a content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = essence(content_type);
    MIME_TABLE
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

/// Guess a content type from a filename's extension.
pub fn guess_from_filename(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if ext.is_empty() {
        return None;
    }

    match ext.as_str() {
        "jpeg" => return Some("image/jpeg"),
        "htm" => return Some("text/html"),
        "tgz" => return Some("application/gzip"),
        _ => {}
    }

    MIME_TABLE
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(m, _)| *m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(essence("text/html; charset=UTF-8"), "text/html");
        assert_eq!(essence("  Image/PNG "), "image/png");
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("application/pdf; q=1"), Some("pdf"));
        assert_eq!(extension_for("application/x-unknown"), None);
    }

    #[test]
    fn test_guess_from_filename() {
        assert_eq!(guess_from_filename("report.pdf"), Some("application/pdf"));
        assert_eq!(guess_from_filename("photo.JPEG"), Some("image/jpeg"));
        assert_eq!(guess_from_filename("archive.tar.gz"), Some("application/gzip"));
        assert_eq!(guess_from_filename("README"), None);
        assert_eq!(guess_from_filename("trailing."), None);
    }
}
