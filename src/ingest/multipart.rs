use std::collections::HashMap;

use mime::Mime;

use super::IngestError;

/// A decoded multipart body. Field names are case-sensitive; when a name
/// repeats, the last occurrence wins.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Field>,
}

impl FormData {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn file(&self, name: &str) -> Option<&FileUpload> {
        match self.fields.get(name) {
            Some(Field::File(upload)) => Some(upload),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Field::Text(value)) => Some(value),
            _ => None,
        }
    }
}

/// One named part. A part with a `filename` attribute is a file; anything
/// else is a scalar text field.
#[derive(Debug)]
pub enum Field {
    Text(String),
    File(FileUpload),
}

#[derive(Debug)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Extracts the boundary parameter from a `multipart/form-data` content type.
pub fn boundary_from_content_type(content_type: Option<&str>) -> Result<String, IngestError> {
    let raw = content_type.ok_or_else(|| malformed("request carries no content type"))?;
    let parsed: Mime = raw
        .parse()
        .map_err(|_| malformed("content type is unparseable"))?;
    if parsed.essence_str() != "multipart/form-data" {
        return Err(malformed("content type is not multipart/form-data"));
    }
    parsed
        .get_param(mime::BOUNDARY)
        .map(|b| b.as_str().to_string())
        .ok_or_else(|| malformed("multipart content type is missing its boundary parameter"))
}

/// Decodes a complete, length-framed multipart body.
///
/// The body is split on the `--boundary` delimiter; each part carries a small
/// CRLF-framed header block terminated by a blank line, then raw content up to
/// the next delimiter. The closing `--boundary--` ends parsing and anything
/// after it is ignored. An empty body decodes to an empty `FormData`.
pub fn decode(body: &[u8], boundary: &str) -> Result<FormData, IngestError> {
    let mut form = FormData::default();
    if body.is_empty() {
        return Ok(form);
    }

    let delimiter = format!("--{boundary}").into_bytes();
    let first = find(body, &delimiter)
        .ok_or_else(|| malformed("body contains no boundary delimiter"))?;
    let mut rest = &body[first + delimiter.len()..];

    // Content runs up to the CRLF that precedes the next delimiter.
    let closing: Vec<u8> = [b"\r\n".as_slice(), delimiter.as_slice()].concat();

    loop {
        if rest.starts_with(b"--") {
            // Closing delimiter; the epilogue is not ours to interpret.
            return Ok(form);
        }
        let after_crlf = rest
            .strip_prefix(b"\r\n")
            .ok_or_else(|| malformed("boundary delimiter is not followed by CRLF"))?;
        let end = find(after_crlf, &closing)
            .ok_or_else(|| malformed("part is missing its closing boundary"))?;
        parse_part(&after_crlf[..end], &mut form)?;
        rest = &after_crlf[end + closing.len()..];
    }
}

fn parse_part(part: &[u8], form: &mut FormData) -> Result<(), IngestError> {
    // The first blank line ends the headers; everything after is raw content.
    let (header_block, content) = match find(part, b"\r\n\r\n") {
        Some(ix) => (&part[..ix], &part[ix + 4..]),
        None => return Err(malformed("part has no blank line after its headers")),
    };
    let header_block = std::str::from_utf8(header_block)
        .map_err(|_| malformed("part headers are not valid UTF-8"))?;

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in header_block.split("\r\n") {
        let Some((header, value)) = line.split_once(':') else {
            return Err(malformed("part header line has no colon"));
        };
        let value = value.trim();
        if header.eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((key, raw)) = param.split_once('=') else {
                    continue;
                };
                let unquoted = raw.trim().trim_matches('"').to_string();
                match key.trim() {
                    "name" => name = Some(unquoted),
                    "filename" => filename = Some(unquoted),
                    _ => {}
                }
            }
        } else if header.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        }
    }

    let name = name.ok_or_else(|| malformed("part declares no field name"))?;
    let field = match filename {
        Some(filename) => Field::File(FileUpload {
            filename,
            content_type,
            bytes: content.to_vec(),
        }),
        None => Field::Text(String::from_utf8_lossy(content).into_owned()),
    };
    form.fields.insert(name, field);
    Ok(())
}

fn malformed(reason: impl Into<String>) -> IngestError {
    IngestError::MalformedBody(reason.into())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
