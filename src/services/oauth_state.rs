// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth `state` nonces bound to the browser that started the login.
//!
//! A state value is `base64url("nonce_hex|timestamp_hex|signature_hex")`. The
//! same value is handed to Reddit and kept in a cookie; the callback must
//! return it unchanged, with a valid signature, within [`STATE_MAX_AGE_MS`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 32;

/// How long a login handshake may take (15 minutes).
pub const STATE_MAX_AGE_MS: u128 = 15 * 60 * 1000;

/// Issues and checks signed OAuth state values.
#[derive(Clone)]
pub struct OAuthStateSigner {
    key: Vec<u8>,
    rng: SystemRandom,
}

impl OAuthStateSigner {
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            rng: SystemRandom::new(),
        }
    }

    /// Create a fresh signed state value.
    pub fn issue(&self) -> anyhow::Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| anyhow::anyhow!("Failed to generate OAuth nonce"))?;

        self.sign(&hex::encode(nonce), now_millis()?)
    }

    fn sign(&self, nonce_hex: &str, timestamp_ms: u128) -> anyhow::Result<String> {
        let payload = format!("{}|{:x}", nonce_hex, timestamp_ms);

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let signed = format!("{}|{}", payload, signature);
        Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
    }

    /// True if `returned` equals the `expected` value issued to this browser
    /// and carries a fresh, valid signature.
    pub fn verify(&self, returned: &str, expected: &str) -> bool {
        if !bool::from(returned.as_bytes().ct_eq(expected.as_bytes())) {
            tracing::warn!("OAuth state does not match the issued nonce");
            return false;
        }

        let Ok(now) = now_millis() else {
            return false;
        };
        self.check_signature(returned, now)
    }

    fn check_signature(&self, state: &str, now_ms: u128) -> bool {
        let Some(state_str) = URL_SAFE_NO_PAD
            .decode(state)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
        else {
            return false;
        };

        // Format is "nonce_hex|timestamp_hex|signature_hex"
        let parts: Vec<&str> = state_str.splitn(3, '|').collect();
        let [nonce_hex, timestamp_hex, signature_hex] = parts.as_slice() else {
            return false;
        };

        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            return false;
        };
        mac.update(format!("{}|{}", nonce_hex, timestamp_hex).as_bytes());

        if mac.verify_slice(&signature).is_err() {
            tracing::error!("OAuth state signature mismatch! Potential tampering.");
            return false;
        }

        match u128::from_str_radix(timestamp_hex, 16) {
            Ok(issued) => now_ms.saturating_sub(issued) <= STATE_MAX_AGE_MS,
            Err(_) => false,
        }
    }
}

fn now_millis() -> anyhow::Result<u128> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = OAuthStateSigner::new(b"secret_key");
        let state = signer.issue().unwrap();
        assert!(signer.verify(&state, &state));
    }

    #[test]
    fn test_states_are_unique_and_url_safe() {
        let signer = OAuthStateSigner::new(b"secret_key");
        let a = signer.issue().unwrap();
        let b = signer.issue().unwrap();
        assert_ne!(a, b);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }

    #[test]
    fn test_mismatch_rejected() {
        let signer = OAuthStateSigner::new(b"secret_key");
        let issued = signer.issue().unwrap();
        let other = signer.issue().unwrap();
        assert!(!signer.verify(&other, &issued));
        assert!(!signer.verify("", &issued));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let state = OAuthStateSigner::new(b"secret_key").issue().unwrap();
        let other = OAuthStateSigner::new(b"wrong_key");
        assert!(!other.verify(&state, &state));
    }

    #[test]
    fn test_expired_state_rejected() {
        let signer = OAuthStateSigner::new(b"secret_key");
        let state = signer.sign("00ff", 1_000).unwrap();
        assert!(signer.check_signature(&state, 1_000 + STATE_MAX_AGE_MS));
        assert!(!signer.check_signature(&state, 1_001 + STATE_MAX_AGE_MS));
    }

    #[test]
    fn test_malformed_rejected() {
        let signer = OAuthStateSigner::new(b"secret_key");
        let state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert!(!signer.verify(&state, &state));
        assert!(!signer.verify("not-base64!!", "not-base64!!"));
    }
}
