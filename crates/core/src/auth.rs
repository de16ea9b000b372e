//! Credential primitives for the account surface: salted keyed password
//! digests and opaque session tokens. Token wire formats (JWT and friends)
//! are deliberately out of scope; sessions are plain server-side records.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::user::UserId;

type HmacSha256 = Hmac<Sha256>;

const SALT_BYTES: usize = 16;

/// HMAC-SHA256 password digests keyed by the configured token secret, with
/// a per-user random salt mixed into the message.
#[derive(Clone)]
pub struct PasswordHasher {
    secret: Vec<u8>,
}

impl PasswordHasher {
    pub fn new(secret: &SecretString) -> Self {
        Self { secret: secret.expose_secret().as_bytes().to_vec() }
    }

    pub fn generate_salt() -> String {
        let mut bytes = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex_encode(&bytes)
    }

    pub fn digest(&self, password: &str, salt: &str) -> String {
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            // Hmac accepts any key length; keep a plain-hash fallback anyway.
            Err(_) => return sha256_hex(salt, password),
        };
        mac.update(salt.as_bytes());
        mac.update(b":");
        mac.update(password.as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    /// Constant-time comparison via the MAC verifier.
    pub fn verify(&self, password: &str, salt: &str, expected_digest: &str) -> bool {
        let Some(expected) = hex_decode(expected_digest) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(salt.as_bytes());
        mac.update(b":");
        mac.update(password.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

/// Server-side session record behind an opaque bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user_id: UserId, ttl_secs: u64) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: Utc::now() + Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn sha256_hex(salt: &str, password: &str) -> String {
    use sha2::Digest;

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn hex_decode(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(input.get(i..i + 2)?, 16).ok())
        .collect()
}
