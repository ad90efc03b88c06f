//! Request and response values exchanged with a [`Transport`](super::Transport).

use reqwest::{Method, StatusCode, Url};
use std::collections::BTreeMap;

use super::retry::PostError;

/// A single POST request.
///
/// A new value is built for every attempt; the body is owned by the request
/// and handed to the transport, which may consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    url: Url,
    body: Vec<u8>,
}

impl PostRequest {
    /// Builds a request for `url` carrying `body`.
    ///
    /// Fails with [`PostError::InvalidRequest`] if the URL cannot be parsed or
    /// is not an `http`/`https` URL.
    pub fn new(url: &str, body: &[u8]) -> Result<Self, PostError> {
        let url = Url::parse(url)
            .map_err(|e| PostError::InvalidRequest(format!("invalid URL '{}': {}", url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PostError::InvalidRequest(format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            url,
            body: body.to_vec(),
        })
    }

    pub fn method(&self) -> Method {
        Method::POST
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Splits the request into its URL and body.
    pub fn into_parts(self) -> (Url, Vec<u8>) {
        (self.url, self.body)
    }
}

/// A response returned by a transport, with any status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Status line text, e.g. `"500 Internal Server Error"`.
    pub status_text: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the canonical status text for `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: status_text(status),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Returns all values of a header; names are matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn status_text(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request_new() {
        let request = PostRequest::new("http://localhost:8000/random", br#"{"key":"value"}"#)
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:8000/random");
        assert_eq!(request.body(), br#"{"key":"value"}"#);
    }

    #[test]
    fn test_post_request_invalid_url() {
        let err = PostRequest::new("not a url", b"").unwrap_err();
        assert!(matches!(err, PostError::InvalidRequest(_)));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_post_request_unsupported_scheme() {
        let err = PostRequest::new("ftp://example.com/upload", b"").unwrap_err();
        assert!(matches!(err, PostError::InvalidRequest(_)));
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_post_request_into_parts() {
        let request = PostRequest::new("https://example.com/", b"abc").unwrap();
        let (url, body) = request.into_parts();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(body, b"abc");
    }

    #[test]
    fn test_response_status_text() {
        assert_eq!(Response::new(200).status_text, "200 OK");
        assert_eq!(Response::new(500).status_text, "500 Internal Server Error");
        assert_eq!(Response::new(599).status_text, "599");
    }

    #[test]
    fn test_response_headers_case_insensitive() {
        let response = Response::new(200)
            .with_header("Content-Type", "application/json")
            .with_header("set-cookie", "a=1")
            .with_header("Set-Cookie", "b=2");

        assert_eq!(
            response.header("content-type"),
            Some(&["application/json".to_string()][..])
        );
        assert_eq!(response.header("SET-COOKIE").map(<[String]>::len), Some(2));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_response_body_text_lossy() {
        let response = Response::new(200).with_body(vec![b'o', b'k', 0xff]);
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }
}
