//! `multipart/form-data` encoding.

use std::fmt;
use std::io::{self, Read};

/// One entry of a multipart form.
///
/// A row with `data` is sent as a file part named `value`; a row without is
/// a plain field whose content is `value`.
pub struct FormDataRow {
    pub key: String,
    pub value: String,
    pub data: Option<Box<dyn Read + Send>>,
}

impl FormDataRow {
    /// Plain form field
    #[must_use]
    pub fn field(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            data: None,
        }
    }

    /// File upload read from `data`
    #[must_use]
    pub fn file(
        key: impl Into<String>,
        filename: impl Into<String>,
        data: impl Read + Send + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            value: filename.into(),
            data: Some(Box::new(data)),
        }
    }
}

impl fmt::Debug for FormDataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDataRow")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("data", &self.data.as_ref().map(|_| "<reader>"))
            .finish()
    }
}

/// Buffered multipart writer.
///
/// The encoded bytes are only reachable through [`finish`](Self::finish),
/// which writes the closing delimiter; a form without it reads as truncated
/// on the server side.
pub struct MultipartWriter {
    buf: Vec<u8>,
    boundary: String,
}

impl MultipartWriter {
    pub fn new() -> Self {
        let random: [u8; 30] = rand::random();
        let boundary: String = random.iter().map(|b| format!("{b:02x}")).collect();
        Self::with_boundary(boundary)
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            buf: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// `Content-Type` header value announcing this writer's boundary
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn write_field(&mut self, name: &str, value: &str) {
        self.part_header(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_quotes(name)
        ));
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn write_file(
        &mut self,
        name: &str,
        filename: &str,
        data: &mut dyn Read,
    ) -> io::Result<()> {
        self.part_header(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n",
            escape_quotes(name),
            escape_quotes(filename)
        ));
        io::copy(data, &mut self.buf)?;
        Ok(())
    }

    /// Write the closing delimiter and return the encoded form.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buf
    }

    fn part_header(&mut self, headers: &str) {
        if !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf
            .extend_from_slice(format!("--{}\r\n{headers}\r\n", self.boundary).as_bytes());
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Encode `rows`, returning the content type and the finished body.
pub fn encode(rows: Vec<FormDataRow>) -> io::Result<(String, Vec<u8>)> {
    let mut writer = MultipartWriter::new();
    for row in rows {
        match row.data {
            Some(mut data) => writer.write_file(&row.key, &row.value, &mut data)?,
            None => writer.write_field(&row.key, &row.value),
        }
    }
    let content_type = writer.content_type();
    Ok((content_type, writer.finish()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_field_and_file_layout() {
        let mut writer = MultipartWriter::with_boundary("XYZ");
        writer.write_field("name", "niconiconi");
        writer
            .write_file("upload", "a \"b\".txt", &mut &b"file-bytes"[..])
            .unwrap();
        let body = String::from_utf8(writer.finish()).unwrap();

        assert_eq!(
            body,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"name\"\r\n\
             \r\n\
             niconiconi\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"upload\"; filename=\"a \\\"b\\\".txt\"\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n\
             file-bytes\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn test_empty_form_is_only_closing_delimiter() {
        let writer = MultipartWriter::with_boundary("B");
        assert_eq!(writer.finish(), b"--B--\r\n");
    }

    #[test]
    fn test_random_boundary_in_content_type() {
        let writer = MultipartWriter::new();
        let content_type = writer.content_type();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert_eq!(boundary.len(), 60);
        assert!(boundary.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_encode_propagates_read_errors() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
        }

        let rows = vec![FormDataRow::file("f", "f.bin", Failing)];
        let err = encode(rows).unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
    }
}
