//! Remote resource metadata: filename, size, content type and final URL.
//!
//! Resolution issues a single redirect-following GET and only inspects the
//! response head; the body is discarded when the response is dropped.

use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use tracing::debug;
use url::Url;

use super::mime;
use super::progress::gen_id;
use crate::error::{DownloadError, Result};

/// Length of the random stem used when no filename can be derived.
const GENERATED_NAME_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub filename: String,
    /// Announced body size, 0 when the server did not send one.
    pub size: u64,
    pub mime_type: Option<String>,
    /// URL after redirects; the body is fetched from here.
    pub resolved_url: Url,
}

pub async fn resolve(client: &Client, url: &Url) -> Result<RemoteMetadata> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| DownloadError::network(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }

    let metadata = metadata_from_response(response.url(), response.headers());
    debug!(
        url = %url,
        resolved_url = %metadata.resolved_url,
        filename = %metadata.filename,
        size = metadata.size,
        "Resolved remote metadata"
    );

    Ok(metadata)
}

/// Derive metadata from the final URL and response headers of a successful response.
pub fn metadata_from_response(final_url: &Url, headers: &HeaderMap) -> RemoteMetadata {
    let content_type = header_str(headers, CONTENT_TYPE.as_str())
        .map(mime::essence)
        .filter(|m| !m.is_empty());

    let filename = header_str(headers, CONTENT_DISPOSITION.as_str())
        .and_then(parse_content_disposition)
        .or_else(|| filename_from_url(final_url))
        .unwrap_or_else(|| generated_filename(content_type.as_deref()));

    let size = header_str(headers, CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let mime_type = content_type
        .or_else(|| mime::guess_from_filename(&filename).map(str::to_string));

    RemoteMetadata {
        filename,
        size,
        mime_type,
        resolved_url: final_url.clone(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract the `filename` parameter of a Content-Disposition header.
///
/// The RFC 5987 form (`filename*=UTF-8''...`) takes precedence over the plain
/// one. Values are unquoted and percent-decoded, with `+` read as a space.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `header`.
    let lower = header.to_ascii_lowercase();

    if let Some(pos) = lower.find("filename*=") {
        let value = &header[pos + 10..];
        let value = value.split(';').next().unwrap_or("").trim();
        let encoded = value
            .split_once("''")
            .map(|(_, encoded)| encoded)
            .unwrap_or(value);
        if let Some(name) = decode_filename(encoded.trim_matches('"')) {
            return Some(name);
        }
    }

    let mut search_from = 0;
    while let Some(offset) = lower[search_from..].find("filename=") {
        let pos = search_from + offset;
        search_from = pos + 9;

        // Skip matches that are the tail of another parameter name.
        let preceding = lower[..pos].trim_end().chars().last();
        if !matches!(preceding, None | Some(';')) {
            continue;
        }

        let rest = header[pos + 9..].trim_start();
        let raw = if let Some(stripped) = rest.strip_prefix('"') {
            match stripped.find('"') {
                Some(end) => &stripped[..end],
                None => stripped,
            }
        } else {
            rest.split(';').next().unwrap_or("").trim()
        };

        return decode_filename(raw);
    }

    None
}

fn decode_filename(raw: &str) -> Option<String> {
    let plus_decoded = raw.replace('+', " ");
    let decoded = urlencoding::decode(&plus_decoded)
        .map(|d| d.into_owned())
        .unwrap_or(plus_decoded);
    sanitize_filename(&decoded)
}

/// Last path segment of a URL, percent-decoded; `None` when the path ends in `/`.
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    sanitize_filename(&decoded)
}

/// `<5 random chars>.<ext>`, with the extension looked up from the content type.
pub fn generated_filename(content_type: Option<&str>) -> String {
    let stem = gen_id(GENERATED_NAME_LEN);
    match content_type.and_then(mime::extension_for) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Replace path separators and control characters so the name stays a single
/// path component. Empty and dot-only names are rejected.
fn sanitize_filename(name: &str) -> Option<String> {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return None;
    }

    Some(sanitized)
}
