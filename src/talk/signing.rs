// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Talk bot request signing.
//!
//! Signature: hex(HMAC-SHA256(secret, random || message)), where `random` is
//! a fresh 32-byte nonce sent hex-encoded alongside the signature.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a nonce (64 hex characters on the wire).
pub const NONCE_LEN: usize = 32;

/// Hex-encoded single-use random value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Draw a nonce from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Nonce and signature headers for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSignature {
    pub random: Nonce,
    pub signature: String,
}

impl BotSignature {
    /// Sign `message` with a freshly generated nonce.
    pub fn sign(secret: &str, message: &str) -> Self {
        let random = Nonce::generate();
        let signature = sign_message(secret, random.as_str(), message);
        Self { random, signature }
    }
}

fn mac_over(secret: &str, random: &str, message: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(random.as_bytes());
    mac.update(message.as_bytes());
    mac
}

/// Lowercase hex HMAC-SHA256 of `random || message` keyed by `secret`.
pub fn sign_message(secret: &str, random: &str, message: &str) -> String {
    hex::encode(mac_over(secret, random, message).finalize().into_bytes())
}

/// Constant-time check of a hex signature, as performed by the receiving
/// Talk server.
pub fn verify_signature(secret: &str, random: &str, message: &str, signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    mac_over(secret, random, message)
        .verify_slice(&signature)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nonce_is_64_hex_chars() {
        let nonce = Nonce::generate();
        assert_eq!(nonce.as_str().len(), NONCE_LEN * 2);
        assert!(nonce.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn nonce_is_not_the_zero_buffer() {
        let zero = "0".repeat(NONCE_LEN * 2);
        assert_ne!(Nonce::generate().as_str(), zero);
    }

    #[test]
    fn nonces_do_not_repeat() {
        let seen: HashSet<String> = (0..64).map(|_| Nonce::generate().0).collect();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn signature_matches_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let sig = sign_message("key", "The quick brown fox ", "jumps over the lazy dog");
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn signature_covers_nonce_and_message() {
        let nonce = "a".repeat(64);
        let sig = sign_message("k", &nonce, "hello");
        assert!(verify_signature("k", &nonce, "hello", &sig));
        assert!(!verify_signature("k", &nonce, "hello!", &sig));
        assert!(!verify_signature("k", &"b".repeat(64), "hello", &sig));
        assert!(!verify_signature("other", &nonce, "hello", &sig));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        assert!(!verify_signature("k", "r", "m", "not-hex"));
        assert!(!verify_signature("k", "r", "m", "abcd"));
    }

    #[test]
    fn each_signing_uses_a_new_nonce() {
        let first = BotSignature::sign("k", "same message");
        let second = BotSignature::sign("k", "same message");
        assert_ne!(first.random, second.random);
        assert_ne!(first.signature, second.signature);
        assert!(verify_signature(
            "k",
            first.random.as_str(),
            "same message",
            &first.signature
        ));
    }
}
