use crate::domain::comment::{errors::CommentError, validation::SecurityToken};
use anyhow::anyhow;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation salt mixed into the signing key.
pub const KEY_SALT: &str = "comment_threads.CommentForm";

/// How far a new-comment timestamp may drift from the server clock.
pub const MAX_TIMESTAMP_SKEW_SECONDS: i64 = 2 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampRule {
    /// New comments: within two hours of `now`.
    Fresh { now: i64 },
    /// Edits: exactly the comment's stored submission second.
    MatchesSubmission(i64),
}

/// Signs and verifies the `(type, pk, timestamp)` triple carried by comment forms.
#[derive(Clone)]
pub struct SecurityHashCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for SecurityHashCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityHashCodec").finish_non_exhaustive()
    }
}

impl SecurityHashCodec {
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        if secret.is_empty() {
            return Err(anyhow!("SECRET_KEY must not be empty"));
        }
        let mut hasher = Sha256::new();
        hasher.update(KEY_SALT.as_bytes());
        hasher.update(secret.as_bytes());
        let key = hasher.finalize();
        let mac = HmacSha256::new_from_slice(&key).map_err(|e| anyhow!("invalid HMAC key: {}", e))?;
        Ok(Self { mac })
    }

    fn message(target_type: &str, target_pk: &str, timestamp: i64) -> String {
        format!("{}-{}-{}", target_type, target_pk, timestamp)
    }

    /// Deterministic hex digest of the triple.
    pub fn issue(&self, target_type: &str, target_pk: &str, timestamp: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(Self::message(target_type, target_pk, timestamp).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn token(&self, target_type: &str, target_pk: &str, timestamp: i64) -> SecurityToken {
        SecurityToken {
            target_type: target_type.to_string(),
            target_pk: target_pk.to_string(),
            timestamp,
            digest: self.issue(target_type, target_pk, timestamp),
        }
    }

    /// Constant-time comparison of `digest` against the expected value.
    pub fn verify(&self, target_type: &str, target_pk: &str, timestamp: i64, digest: &str) -> bool {
        let expected = self.issue(target_type, target_pk, timestamp);
        let given = digest.trim().to_ascii_lowercase();
        expected.len() == given.len() && bool::from(expected.as_bytes().ct_eq(given.as_bytes()))
    }

    pub fn check_digest(
        &self,
        target_type: &str,
        target_pk: &str,
        timestamp: i64,
        digest: &str,
    ) -> Result<(), CommentError> {
        if self.verify(target_type, target_pk, timestamp, digest) {
            Ok(())
        } else {
            Err(CommentError::SecurityHashInvalid)
        }
    }
}

pub fn check_timestamp(timestamp: i64, rule: TimestampRule) -> Result<(), CommentError> {
    let ok = match rule {
        TimestampRule::Fresh { now } => {
            now.abs_diff(timestamp) <= MAX_TIMESTAMP_SKEW_SECONDS.unsigned_abs()
        }
        TimestampRule::MatchesSubmission(submitted) => timestamp == submitted,
    };
    if ok { Ok(()) } else { Err(CommentError::TimestampInvalid) }
}
