//! Hand-rolled multipart/form-data decoding.
//!
//! The admin panel posts uploads as `multipart/form-data`; this module turns a
//! fully buffered request body into an ordered list of [`Part`]s without
//! delegating to a parsing crate. Everything operates on raw bytes: part
//! payloads are arbitrary binary and may contain text that resembles
//! delimiters.
//!
//! The decoder is deliberately permissive. Candidate parts missing the
//! `\r\n\r\n` header/body separator are dropped and decoding continues, one
//! corrupt part must not abort an otherwise valid upload. Structural problems
//! (no boundary at all, no file part) are left to the caller to surface.

/// Fallback content type for parts that declare none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Header/body separator inside a part.
const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// One decoded unit of a multipart body.
///
/// `data` excludes the header block and the trailing CRLF that precedes the
/// next boundary. Field presence is explicit: a part without a
/// `filename="..."` attribute is a plain form field, not a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Form field name from a `name="..."` attribute, if present.
    pub name: Option<String>,
    /// Original filename from a `filename="..."` attribute; presence marks
    /// this part as file content.
    pub filename: Option<String>,
    /// Declared content type, [`DEFAULT_CONTENT_TYPE`] when absent.
    pub content_type: String,
    /// Payload bytes.
    pub data: Vec<u8>,
}

impl Part {
    /// True when this part carries file content.
    pub fn is_file(&self) -> bool {
        self.filename.as_deref().is_some_and(|f| !f.is_empty())
    }

    /// Payload as UTF-8 text, for plain form fields.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Lowest index >= `from` at which `needle` occurs in `haystack`.
///
/// Operates on raw bytes, never on decoded text.
pub fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}

/// Extract the `boundary=` parameter from a Content-Type header value.
///
/// Returns `None` when the parameter is absent or empty; the caller reports
/// that as a client error.
pub fn parse_boundary(content_type: &str) -> Option<String> {
    for param in content_type.split(';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse one part's header block into `(name, filename, content_type)`.
///
/// Attribute values are matched as literal `name="..."` / `filename="..."`
/// sequences anywhere in the block; the Content-Type line is matched
/// case-insensitively.
pub fn parse_part_headers(headers: &[u8]) -> (Option<String>, Option<String>, String) {
    let name = name_attr(headers);
    let filename = quoted_attr(headers, b"filename=\"");
    let content_type =
        declared_content_type(headers).unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    (name, filename, content_type)
}

/// Value of the first `key"..."` attribute in a header block, where `key`
/// includes the opening quote (e.g. `filename="`).
fn quoted_attr(headers: &[u8], key: &[u8]) -> Option<String> {
    let start = find_bytes(headers, key, 0)? + key.len();
    let end = find_bytes(headers, b"\"", start)?;
    Some(String::from_utf8_lossy(&headers[start..end]).into_owned())
}

/// First `name="..."` attribute value that is not the tail of `filename="`.
fn name_attr(headers: &[u8]) -> Option<String> {
    const KEY: &[u8] = b"name=\"";
    let mut from = 0;
    while let Some(idx) = find_bytes(headers, KEY, from) {
        // `filename="` ends with `name="`; skip matches that are its tail.
        if idx >= 4 && &headers[idx - 4..idx] == b"file" {
            from = idx + KEY.len();
            continue;
        }
        let start = idx + KEY.len();
        let end = find_bytes(headers, b"\"", start)?;
        return Some(String::from_utf8_lossy(&headers[start..end]).into_owned());
    }
    None
}

/// Trimmed value of a `Content-Type:` header line, matched case-insensitively.
fn declared_content_type(headers: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(headers);
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-type") {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Decode a multipart body into its ordered list of parts.
///
/// Decoding starts after the first occurrence of `--{boundary}`; a body with
/// no occurrence yields an empty list. The final `--{boundary}--` terminator
/// is not separately validated, running out of boundary occurrences simply
/// ends the loop.
pub fn decode(body: &[u8], boundary: &str) -> Vec<Part> {
    let marker = format!("--{boundary}").into_bytes();
    let mut parts = Vec::new();

    let Some(first) = find_bytes(body, &marker, 0) else {
        return parts;
    };
    let mut cursor = first + marker.len();

    while let Some(next) = find_bytes(body, &marker, cursor) {
        // Progress invariant: each iteration moves past a boundary occurrence.
        debug_assert!(next + marker.len() > cursor);

        let candidate = &body[cursor..next];
        if let Some(sep) = find_bytes(candidate, HEADER_SEPARATOR, 0) {
            let headers = &candidate[..sep];
            let mut data = &candidate[sep + HEADER_SEPARATOR.len()..];
            // The CRLF before the next boundary belongs to the encoding, not
            // the payload.
            if data.ends_with(b"\r\n") {
                data = &data[..data.len() - 2];
            }
            let (name, filename, content_type) = parse_part_headers(headers);
            parts.push(Part {
                name,
                filename,
                content_type,
                data: data.to_vec(),
            });
        }
        cursor = next + marker.len();
    }

    parts
}
