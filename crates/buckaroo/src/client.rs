//! Thin HTTP layer over `reqwest`.
//!
//! A single shot per call: any transport failure is wrapped into one
//! [`HttpClientError`] and handed back, retry policy is the caller's
//! business.

use std::time::Duration;

use error_stack::ResultExt;

use crate::{
    errors::{CustomResult, HttpClientError},
    request::{HeaderExt, Method, Request},
};

/// Seconds before an exchange is abandoned, unless overridden per call.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw reply from the processor.
#[derive(Clone, Debug)]
pub struct Response {
    pub status_code: u16,
    pub response: bytes::Bytes,
}

pub async fn send_request(
    client: &reqwest::Client,
    request: Request,
    option_timeout_secs: Option<u64>,
) -> CustomResult<Response, HttpClientError> {
    tracing::info!(method = ?request.method, url = %request.url, headers = ?request.headers, "outgoing call");

    let url =
        url::Url::parse(&request.url).change_context(HttpClientError::UrlParsingFailed)?;
    let headers = request.headers.construct_header_map()?;

    let request_builder = match request.method {
        Method::Get => client.get(url),
        Method::Post => {
            let builder = client.post(url);
            match request.body {
                Some(body) => builder.body(body),
                None => builder,
            }
        }
    }
    .headers(headers)
    .timeout(Duration::from_secs(
        option_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS),
    ));

    let response = request_builder
        .send()
        .await
        .map_err(|error| {
            if error.is_timeout() {
                error_stack::report!(HttpClientError::RequestTimeoutReceived)
            } else {
                error_stack::report!(HttpClientError::RequestNotSent(error.to_string()))
            }
        })
        .attach_printable("unable to send request to the processor")?;

    let status_code = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .change_context(HttpClientError::ResponseDecodingFailed)?;
    tracing::info!(status_code, "processor replied");

    Ok(Response {
        status_code,
        response: body,
    })
}
