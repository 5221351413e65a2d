//! Cryptographic primitives behind the authorization scheme.

use masking::{PeekInterface, Secret};
use ring::hmac;

/// Trait for signing a message with a shared secret
pub trait SignMessage {
    /// Sign the message, returning the raw signature bytes.
    fn sign_message(&self, secret: &Secret<String>, msg: &[u8]) -> Vec<u8>;
}

/// Trait for generating a message digest
pub trait GenerateDigest {
    /// Compute the digest of the message.
    fn generate_digest(&self, message: &[u8]) -> Vec<u8>;
}

/// Message signing through HMAC-SHA256
#[derive(Debug)]
pub struct HmacSha256;

impl SignMessage for HmacSha256 {
    fn sign_message(&self, secret: &Secret<String>, msg: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.peek().as_bytes());
        hmac::sign(&key, msg).as_ref().to_vec()
    }
}

/// MD5 digest, used for the request content hash
#[derive(Debug)]
pub struct Md5;

impl GenerateDigest for Md5 {
    fn generate_digest(&self, message: &[u8]) -> Vec<u8> {
        md5::compute(message).0.to_vec()
    }
}
