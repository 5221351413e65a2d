//! Shared constants for the Buckaroo checkout JSON API.

/// Base 64 engine used for content digests and hmac signatures
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Live checkout endpoint base
pub const LIVE_BASE_URL: &str = "https://checkout.buckaroo.nl/json";
/// Test checkout endpoint base
pub const TEST_BASE_URL: &str = "https://testcheckout.buckaroo.nl/json";

/// Transaction path, used by purchase and refund calls
pub const TRANSACTION_PATH: &str = "/Transaction";
/// Data request path, used by reservation and QR generation calls
pub const DATA_REQUEST_PATH: &str = "/DataRequest";
/// Status query path prefix, the transaction key is appended
pub const TRANSACTION_STATUS_PATH: &str = "/Transaction/Status/";

/// Authorization scheme token expected by the processor
pub const AUTH_SCHEME: &str = "hmac";
/// URL scheme every endpoint must carry; the signature covers the URL with
/// this prefix stripped
pub const URL_SCHEME_PREFIX: &str = "https://";
/// Upper bound (inclusive) of the random nonce suffix
pub const NONCE_MAX: u32 = 9_999_999;
/// Textual prefix of the nonce segment
pub const NONCE_PREFIX: &str = "nonce_";

/// Default `Culture` header value
pub const DEFAULT_CULTURE: &str = "nl-NL";
/// Default operating country for Klarna reservations
pub const DEFAULT_OPERATING_COUNTRY: &str = "NL";

/// Validity window of a generated iDEAL QR code, in days
pub const QR_EXPIRY_DAYS: i64 = 21;
/// Pixel size of the generated QR image
pub const QR_IMAGE_SIZE: u32 = 2000;
/// Maximum length the processor accepts for article descriptions
pub const DESCRIPTION_MAX_LEN: usize = 100;

/// Site identifier whose credit card brand list is extended with maestro,
/// carte bleue and carte bancaire
pub const EXTENDED_CARD_BRANDS_SITE_ID: i64 = 7;

pub mod headers {
    //! Header names used on outgoing calls.

    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CULTURE: &str = "Culture";
}
