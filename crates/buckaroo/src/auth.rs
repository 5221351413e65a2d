//! Hmac authorization tokens.
//!
//! Every call carries `Authorization: hmac <token>` where the token is
//! `websiteKey:signature:nonce:timestamp`. The signature is an HMAC-SHA256
//! over the plain concatenation of website key, HTTP method, the lower-cased
//! percent-encoded endpoint (scheme stripped), the Unix timestamp, the nonce
//! and the base64 MD5 digest of the body (empty for GET).

use base64::Engine;
use masking::PeekInterface;
use rand::Rng;

use crate::{
    consts,
    crypto::{GenerateDigest, HmacSha256, Md5, SignMessage},
    types::BuckarooAuthType,
};

/// Generate a token for the given body and endpoint using the system clock
/// and a randomly drawn nonce.
pub fn generate_authorization_token(
    auth: &BuckarooAuthType,
    body: Option<&[u8]>,
    endpoint_url: &str,
) -> String {
    let nonce = format!(
        "{}{}",
        consts::NONCE_PREFIX,
        rand::rngs::OsRng.gen_range(0..=consts::NONCE_MAX)
    );
    let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
    generate_authorization_token_at(auth, body, endpoint_url, timestamp, &nonce)
}

/// Deterministic core of the token generation; the clock and nonce are
/// explicit so signatures can be reproduced.
pub fn generate_authorization_token_at(
    auth: &BuckarooAuthType,
    body: Option<&[u8]>,
    endpoint_url: &str,
    timestamp: i64,
    nonce: &str,
) -> String {
    let (method, content_hash) = match body {
        Some(bytes) if !bytes.is_empty() => (
            "POST",
            consts::BASE64_ENGINE.encode(Md5.generate_digest(bytes)),
        ),
        _ => ("GET", String::new()),
    };

    let uri = endpoint_url
        .strip_prefix(consts::URL_SCHEME_PREFIX)
        .unwrap_or(endpoint_url);
    let uri = urlencoding::encode(uri).to_lowercase();

    let website_key = auth.website_key.peek();
    let signing_input = format!("{website_key}{method}{uri}{timestamp}{nonce}{content_hash}");
    let signature = consts::BASE64_ENGINE.encode(
        HmacSha256.sign_message(&auth.secret_key, signing_input.as_bytes()),
    );

    format!("{website_key}:{signature}:{nonce}:{timestamp}")
}
