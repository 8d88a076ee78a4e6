use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, Response, StatusCode};
use serde::Serialize;
use std::io;

/// Buffered response handed to handlers, error handlers and response encoders.
///
/// Starts as an empty `200 OK`; whatever was written is turned into an
/// [`http::Response`] once dispatch finishes.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Bytes written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the body with `value` as JSON and set the content type.
    ///
    /// # Errors
    ///
    /// Serialization failure; the writer is left unchanged.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = bytes;
        Ok(())
    }

    #[must_use]
    pub fn into_response(self) -> Response<Vec<u8>> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write a pre-serialized JSON error body with `status`, discarding anything written before.
pub fn write_json_error(out: &mut ResponseWriter, status: StatusCode, body: Vec<u8>) {
    out.status = status;
    out.headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    out.body = body;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_to_empty_ok() {
        let response = ResponseWriter::new().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_write_appends() {
        let mut out = ResponseWriter::new();
        out.write_all(b"hello ").unwrap();
        out.write_all(b"world").unwrap();
        assert_eq!(out.body(), b"hello world");
    }

    #[test]
    fn test_json_error_replaces_body() {
        let mut out = ResponseWriter::new();
        out.write_all(b"partial").unwrap();
        write_json_error(&mut out, StatusCode::BAD_REQUEST, b"{}".to_vec());
        let response = out.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.body(), b"{}");
    }
}
