use crate::data::RawValue;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Binding name of the HTTP response unless configured otherwise.
pub const DEFAULT_HTTP_OUTPUT: &str = "res";

const DEFAULT_STATUS: u16 = 200;

/// The HTTP response returned through the host.
///
/// Status, headers and body can be set in any order; the last call to
/// [`write_header`](HttpOutput::write_header) decides the status code.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOutput {
    name: String,
    status_code: u16,
    headers: BTreeMap<String, String>,
    body: RawValue,
}

impl Default for HttpOutput {
    fn default() -> Self {
        Self {
            name: DEFAULT_HTTP_OUTPUT.to_string(),
            status_code: DEFAULT_STATUS,
            headers: BTreeMap::new(),
            body: RawValue::default(),
        }
    }
}

impl HttpOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Initial status code. Values outside 100..=511 fall back to 200.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = if (100..=511).contains(&status_code) {
            status_code
        } else {
            DEFAULT_STATUS
        };
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<RawValue>) -> Self {
        self.body = body.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &RawValue {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.headers
    }

    /// Header value, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing any value stored under the same name in
    /// another case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    pub fn write_header(&mut self, status_code: u16) {
        self.status_code = status_code;
    }

    /// Replace the body.
    pub fn write(&mut self, body: impl Into<RawValue>) {
        self.body = body.into();
    }

    /// Set status, body and headers at once. Existing headers are dropped.
    pub fn write_response<I, K, V>(&mut self, status_code: u16, body: impl Into<RawValue>, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.status_code = status_code;
        self.body = body.into();
        self.headers.clear();
        for (name, value) in headers {
            self.set_header(name, value);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse<'a> {
    status_code: String,
    body: &'a RawValue,
    headers: &'a BTreeMap<String, String>,
}

impl Serialize for HttpOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireResponse {
            status_code: self.status_code.to_string(),
            body: &self.body,
            headers: &self.headers,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let output = HttpOutput::new();
        assert_eq!(output.name(), "res");
        assert_eq!(output.status_code(), 200);
        assert!(output.headers().is_empty());
        assert!(output.body().is_empty());
    }

    #[test]
    fn test_with_status_out_of_range() {
        assert_eq!(HttpOutput::new().with_status(99).status_code(), 200);
        assert_eq!(HttpOutput::new().with_status(600).status_code(), 200);
        assert_eq!(HttpOutput::new().with_status(404).status_code(), 404);
    }

    #[test]
    fn test_last_write_header_wins() {
        let mut output = HttpOutput::new();
        output.write(r#"{"ok":true}"#);
        output.write_header(201);
        output.set_header("Content-Type", "application/json");
        output.write_header(202);
        assert_eq!(output.status_code(), 202);
    }

    #[test]
    fn test_set_header_is_case_insensitive() {
        let mut output = HttpOutput::new().with_header("content-type", "text/plain");
        output.set_header("Content-Type", "application/json");
        assert_eq!(output.headers().len(), 1);
        assert_eq!(output.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_write_response_replaces_headers() {
        let mut output = HttpOutput::new().with_header("X-Old", "1");
        output.write_response(404, "missing", [("Content-Type", "text/plain")]);
        assert_eq!(output.status_code(), 404);
        assert_eq!(output.body().as_bytes(), b"missing");
        assert!(output.header("X-Old").is_none());
    }

    #[test]
    fn test_serialize() {
        let output = HttpOutput::new()
            .with_body(r#"{"ok":true}"#)
            .with_header("Content-Type", "application/json");
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"statusCode":"200","body":"{\"ok\":true}","headers":{"Content-Type":"application/json"}}"#
        );
    }
}
