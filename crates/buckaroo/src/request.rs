//! Transport-facing request types.
//!
//! The body is carried as raw bytes: the authorization signature is computed
//! over the exact byte sequence that goes on the wire, so the request must
//! never be re-serialized after signing.

use error_stack::ResultExt;
use masking::{Maskable, PeekInterface};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, HttpClientError};

pub type Headers = Vec<(String, Maskable<String>)>;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.push((String::from(header), value));
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<http::HeaderMap, HttpClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<http::HeaderMap, HttpClientError> {
        use http::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_bytes(header_name.as_bytes())
                    .change_context(HttpClientError::HeaderMapConstructionFailed)?;
                let header_value = match header_value {
                    Maskable::Masked(masked_value) => {
                        let mut header_value = HeaderValue::from_str(masked_value.peek())
                            .change_context(HttpClientError::HeaderMapConstructionFailed)?;
                        header_value.set_sensitive(true);
                        header_value
                    }
                    Maskable::Normal(value) => HeaderValue::from_str(&value)
                        .change_context(HttpClientError::HeaderMapConstructionFailed)?,
                };
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}
