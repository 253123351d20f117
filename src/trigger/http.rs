//! HTTP trigger and its form helpers.

use crate::data::RawValue;
use crate::envelope::Invocation;
use crate::trigger::{fields, SysMetadata, Trigger, TriggerError, TriggerKind};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Memory limit applied to multipart parsing when none is given.
const DEFAULT_MULTIPART_MAX_MEMORY: u64 = 32 << 20;

/// Parsed form fields, keyed by field name.
pub type FormValues = HashMap<String, Vec<String>>;

/// An HTTP request forwarded by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpTrigger {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub method: String,
    #[serde(default, deserialize_with = "fields::header_values")]
    pub headers: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub params: HashMap<String, String>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub query: HashMap<String, String>,
    #[serde(default)]
    body: RawValue,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub identities: Vec<HttpIdentity>,
    #[serde(skip)]
    pub metadata: HttpMetadata,
}

/// Invocation metadata of an HTTP trigger.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpMetadata {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub headers: HashMap<String, String>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub params: HashMap<String, String>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub query: HashMap<String, String>,
    #[serde(rename = "sys", default)]
    pub sys: SysMetadata,
}

/// An identity attached to the request by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpIdentity {
    #[serde(default)]
    pub actor: Value,
    #[serde(default)]
    pub bootstrap_context: Value,
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub authentication_type: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub name_claim_type: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub role_claim_type: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub claims: Vec<HttpIdentityClaim>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub is_authenticated: bool,
}

/// A claim of an [`HttpIdentity`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpIdentityClaim {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub properties: HashMap<String, String>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub issuer: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub original_issuer: String,
    #[serde(rename = "Type", default, deserialize_with = "fields::null_default")]
    pub claim_type: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub value: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub value_type: String,
}

/// A file part of a multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A parsed `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    /// Non-file fields.
    pub values: FormValues,
    /// File fields, keyed by field name.
    pub files: HashMap<String, Vec<FormFile>>,
}

impl HttpTrigger {
    /// The request body.
    pub fn body(&self) -> &RawValue {
        &self.body
    }

    /// First value of the named header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> Result<FormValues, TriggerError> {
        let content_type = self.header("Content-Type").unwrap_or_default();
        if !media_type(content_type).eq_ignore_ascii_case(FORM_URLENCODED) {
            return Err(TriggerError::InvalidContentType(content_type.to_string()));
        }

        let invalid = || TriggerError::InvalidBody(self.body.to_text_lossy());
        if !valid_escapes(&self.body) {
            return Err(invalid());
        }

        let mut values = FormValues::new();
        for (key, value) in url::form_urlencoded::parse(&self.body) {
            values.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        if values.len() == 1 && values.values().all(|v| v.first().map_or(true, String::is_empty)) {
            return Err(invalid());
        }
        Ok(values)
    }

    /// Parse a `multipart/form-data` body, holding at most `max_memory`
    /// bytes. A limit of zero or less uses 32 MiB.
    pub async fn multipart_form(&self, max_memory: i64) -> Result<MultipartForm, TriggerError> {
        let content_type = self.header("Content-Type").unwrap_or_default();
        let boundary = multer::parse_boundary(content_type)
            .map_err(|_| TriggerError::InvalidContentType(content_type.to_string()))?;

        let limit = u64::try_from(max_memory)
            .ok()
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MULTIPART_MAX_MEMORY);
        let constraints =
            multer::Constraints::new().size_limit(multer::SizeLimit::new().whole_stream(limit));

        let body = self.body.clone().into_bytes();
        let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

        let invalid = |err: multer::Error| TriggerError::InvalidBody(err.to_string());
        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(|mime| mime.to_string());
                    let data = field.bytes().await.map_err(invalid)?;
                    form.files.entry(name).or_default().push(FormFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field.text().await.map_err(invalid)?;
                    form.values.entry(name).or_default().push(value);
                }
            }
        }
        Ok(form)
    }

    /// Rebuild the forwarded request as a [`hyper::Request`].
    ///
    /// Route parameters are appended to the path as `/{name}/{value}` in
    /// name order. Query entries whose key is missing from the URL are
    /// added to its query string.
    pub fn to_request(&self) -> Result<hyper::Request<Bytes>, TriggerError> {
        let url = self.request_url()?;
        let mut builder = hyper::Request::builder()
            .method(self.method.as_str())
            .uri(url.as_str());
        for (name, values) in &self.headers {
            for value in values {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        builder
            .body(self.body.clone().into_bytes())
            .map_err(TriggerError::malformed)
    }

    fn request_url(&self) -> Result<url::Url, TriggerError> {
        let mut url = url::Url::parse(&self.url).map_err(TriggerError::malformed)?;

        if !self.params.is_empty() {
            let mut params: Vec<_> = self.params.iter().collect();
            params.sort();
            let mut path = url.path().trim_end_matches('/').to_string();
            for (name, value) in params {
                path.push('/');
                path.push_str(name);
                path.push('/');
                path.push_str(value);
            }
            url.set_path(&path);
        }

        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let mut missing: Vec<_> = self
            .query
            .iter()
            .filter(|(key, _)| !pairs.iter().any(|(existing, _)| existing == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !missing.is_empty() {
            missing.sort();
            pairs.append(&mut missing);
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        Ok(url)
    }
}

impl Trigger for HttpTrigger {
    const KIND: TriggerKind = TriggerKind::Http;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let mut trigger = invocation.payload_as::<HttpTrigger>()?;
        trigger.metadata = invocation.metadata_as::<HttpMetadata>()?;
        Ok(trigger)
    }

    fn data(&self) -> &RawValue {
        &self.body
    }
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

// Every `%` must start a two digit hex escape.
fn valid_escapes(body: &[u8]) -> bool {
    let mut rest = body;
    while let Some(pos) = rest.iter().position(|b| *b == b'%') {
        match rest.get(pos + 1..pos + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => rest = &rest[pos + 3..],
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &[u8] = br#"{
        "Data": {
            "req": {
                "Url": "http://localhost:7071/api/endpoint",
                "Method": "POST",
                "Body": "{\"message\":\"hello\",\"number\":2}",
                "Params": {},
                "Query": {},
                "Headers": {
                    "Content-Type": ["application/json"]
                },
                "Identities": [
                    {
                        "AuthenticationType": "WebJobsAuthLevel",
                        "IsAuthenticated": true,
                        "Actor": null,
                        "BootstrapContext": null,
                        "Claims": [
                            {
                                "Issuer": "LOCAL AUTHORITY",
                                "OriginalIssuer": "LOCAL AUTHORITY",
                                "Properties": {},
                                "Type": "http://schemas.microsoft.com/2017/07/functions/claims/authlevel",
                                "Value": "Admin",
                                "ValueType": "http://www.w3.org/2001/XMLSchema#string"
                            }
                        ],
                        "Label": null,
                        "Name": null,
                        "NameClaimType": "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
                        "RoleClaimType": "http://schemas.microsoft.com/ws/2008/06/identity/claims/role"
                    }
                ]
            }
        },
        "Metadata": {
            "Params": {},
            "Query": {},
            "Headers": {"Content-Type": "application/json"},
            "sys": {
                "MethodName": "helloHTTP",
                "UtcNow": "2023-10-12T20:13:49.640002Z",
                "RandGuid": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741"
            }
        }
    }"#;

    const MULTIPART: &str = "--------------------------458d15332083a867\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"test.txt\"\r\n\
        Content-Type: text/plain\r\n\
        \r\n\
        a file\r\n\
        --------------------------458d15332083a867\r\n\
        Content-Disposition: form-data; name=\"title\"\r\n\
        \r\n\
        notes\r\n\
        --------------------------458d15332083a867--\r\n";

    #[derive(Debug, Deserialize, PartialEq)]
    struct Message {
        message: String,
        number: i32,
    }

    fn with_body(content_type: Option<&str>, body: &str) -> HttpTrigger {
        let mut trigger = HttpTrigger {
            method: "POST".into(),
            url: "http://localhost:7071/api/endpoint".into(),
            body: RawValue::from(body),
            ..Default::default()
        };
        if let Some(content_type) = content_type {
            trigger
                .headers
                .insert("Content-Type".into(), vec![content_type.to_string()]);
        }
        trigger
    }

    #[test]
    fn test_http_trigger() {
        let trigger = HttpTrigger::decode(REQUEST, "req").unwrap();

        assert_eq!(trigger.url, "http://localhost:7071/api/endpoint");
        assert_eq!(trigger.method, "POST");
        assert_eq!(trigger.body().as_bytes(), br#"{"message":"hello","number":2}"#);
        assert_eq!(trigger.header("content-type"), Some("application/json"));
        assert!(trigger.params.is_empty());

        let identity = &trigger.identities[0];
        assert!(identity.is_authenticated);
        assert!(identity.actor.is_null());
        assert_eq!(identity.claims[0].value, "Admin");
        assert_eq!(
            identity.claims[0].claim_type,
            "http://schemas.microsoft.com/2017/07/functions/claims/authlevel"
        );

        assert_eq!(trigger.metadata.headers["Content-Type"], "application/json");
        assert_eq!(trigger.metadata.sys.method_name, "helloHTTP");
    }

    #[test]
    fn test_http_parse() {
        let trigger = HttpTrigger::decode(REQUEST, "req").unwrap();
        let message: Message = trigger.parse().unwrap();
        assert_eq!(message, Message { message: "hello".into(), number: 2 });
    }

    #[test]
    fn test_http_name_mismatch() {
        let err = HttpTrigger::decode(REQUEST, "request").unwrap_err();
        assert!(matches!(err, TriggerError::NameMismatch(_)));
    }

    #[test]
    fn test_form() {
        let trigger = with_body(Some(FORM_URLENCODED), "field1=value1&field2=value2");
        let form = trigger.form().unwrap();
        assert_eq!(form["field1"], vec!["value1"]);
        assert_eq!(form["field2"], vec!["value2"]);
    }

    #[test]
    fn test_form_with_charset() {
        let trigger = with_body(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            "name=a%20b",
        );
        assert_eq!(trigger.form().unwrap()["name"], vec!["a b"]);
    }

    #[test]
    fn test_form_invalid_content_type() {
        let err = with_body(None, "field1=value1").form().unwrap_err();
        assert!(matches!(err, TriggerError::InvalidContentType(_)));

        let err = with_body(Some("application/json"), "field1=value1").form().unwrap_err();
        assert!(matches!(err, TriggerError::InvalidContentType(_)));
    }

    #[test]
    fn test_form_invalid_body() {
        let err = with_body(Some(FORM_URLENCODED), r#"{"message":"hello"}"#)
            .form()
            .unwrap_err();
        assert!(matches!(err, TriggerError::InvalidBody(_)));

        let err = with_body(Some(FORM_URLENCODED), "a=%zz").form().unwrap_err();
        assert!(matches!(err, TriggerError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_multipart_form() {
        let trigger = with_body(
            Some("multipart/form-data; boundary=------------------------458d15332083a867"),
            MULTIPART,
        );
        let form = trigger.multipart_form(32 << 20).await.unwrap();

        let file = &form.files["file"][0];
        assert_eq!(file.file_name, "test.txt");
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(file.data, Bytes::from_static(b"a file"));
        assert_eq!(form.values["title"], vec!["notes"]);
    }

    #[tokio::test]
    async fn test_multipart_form_invalid_content_type() {
        let err = with_body(None, MULTIPART).multipart_form(0).await.unwrap_err();
        assert!(matches!(err, TriggerError::InvalidContentType(_)));
    }

    #[tokio::test]
    async fn test_multipart_form_invalid_body() {
        let trigger = with_body(
            Some("multipart/form-data; boundary=------------------------458d15332083a867"),
            "test",
        );
        let err = trigger.multipart_form(0).await.unwrap_err();
        assert!(matches!(err, TriggerError::InvalidBody(_)));
    }

    #[test]
    fn test_object_body_keeps_bytes() {
        let body = br#"{"Data":{"req":{"Method":"POST","Url":"http://localhost/api/f",
            "Body":{"b":1,"a":2}}},"Metadata":{}}"#;
        let trigger = HttpTrigger::decode(body, "req").unwrap();
        assert_eq!(trigger.body().as_bytes(), br#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_to_request() {
        let trigger = HttpTrigger::decode(REQUEST, "req").unwrap();
        let request = trigger.to_request().unwrap();
        assert_eq!(request.method(), &hyper::Method::POST);
        assert_eq!(request.uri().path(), "/api/endpoint");
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.body().as_ref(), br#"{"message":"hello","number":2}"#);
    }

    #[test]
    fn test_to_request_adds_params_and_query() {
        let mut trigger = with_body(None, "");
        trigger.url = "http://localhost:7071/api/users?page=2".into();
        trigger.params.insert("id".into(), "42".into());
        trigger.query.insert("page".into(), "2".into());
        trigger.query.insert("expand".into(), "roles".into());

        let request = trigger.to_request().unwrap();
        assert_eq!(request.uri().path(), "/api/users/id/42");
        assert_eq!(request.uri().query(), Some("expand=roles&page=2"));
    }

    #[test]
    fn test_to_request_invalid_url() {
        let mut trigger = with_body(None, "");
        trigger.url = "not a url".into();
        assert!(matches!(
            trigger.to_request(),
            Err(TriggerError::PayloadMalformed(_))
        ));
    }
}
