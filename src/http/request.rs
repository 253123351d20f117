//! Invocation request as received from the host.

use bytes::Bytes;
use std::collections::HashMap;

/// HTTP method of an invocation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::Post,
        }
    }
}

/// One invocation request. The host always sends the envelope as the body.
#[derive(Debug, Clone, Default)]
pub struct HostRequest {
    pub method: Method,
    /// Request path, starting with the function name.
    pub url: String,
    /// Header names are stored lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

impl HostRequest {
    /// A `POST` request carrying an invocation envelope.
    pub fn envelope(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    /// The body, empty when absent.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}
