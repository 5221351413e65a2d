//! Error taxonomy.
//!
//! [`GatewayError`] covers everything that can go wrong while building a
//! request or decoding a reply; [`HttpClientError`] covers the transport
//! exchange itself. A failure reported by the processor inside a decoded
//! response body is not an error here; callers inspect the normalized
//! response for that.

/// Result alias carrying an [`error_stack::Report`] on the error side.
pub type CustomResult<T, E> = Result<T, error_stack::Report<E>>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GatewayError {
    #[error("Failed to encode request")]
    RequestEncodingFailed,
    #[error("Failed to deserialize the processor response")]
    ResponseDeserializationFailed,
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    #[error("Incomplete billing address")]
    IncompleteBillingAddress,
    #[error("Date formatting failed")]
    DateFormattingFailed,
    #[error("Failed to decode push notification body")]
    NotificationBodyDecodingFailed,
    #[error("Operation not supported: {message}")]
    NotSupported { message: String },
    #[error("Failed to execute the call: {0:?}")]
    ProcessingStepFailed(Option<bytes::Bytes>),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HttpClientError {
    #[error("Error while parsing the request URL")]
    UrlParsingFailed,
    #[error("Error while constructing the request headers")]
    HeaderMapConstructionFailed,
    #[error("Request was not sent: {0}")]
    RequestNotSent(String),
    #[error("Request timed out")]
    RequestTimeoutReceived,
    #[error("Failed to read the response body")]
    ResponseDecodingFailed,
}
