//! Passphrase-based key derivation (PBKDF2)
//!
//! Stretches a passphrase and a salt into a 256-bit AES key. The hash and
//! iteration count are configurable; the default is the legacy HMAC-SHA1 /
//! 2000 iteration setting every existing envelope was produced with.
//!
//! Envelopes do not record which parameters were used. Changing them means
//! envelopes produced under the old parameters no longer decrypt.

use std::fmt;

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, Result, TextcryptError};

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// Iteration count of the legacy parameters
pub const LEGACY_ITERATIONS: u32 = 2000;

/// Iteration count of the recommended parameters (PBKDF2-HMAC-SHA256)
pub const RECOMMENDED_ITERATIONS: u32 = 600_000;

/// Pseudorandom function used inside PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KdfHash {
    Sha1,
    Sha256,
}

impl fmt::Display for KdfHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdfHash::Sha1 => f.write_str("hmac-sha1"),
            KdfHash::Sha256 => f.write_str("hmac-sha256"),
        }
    }
}

/// PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KdfParams {
    hash: KdfHash,
    iterations: u32,
}

impl KdfParams {
    /// Creates parameters, rejecting a zero iteration count.
    pub fn new(hash: KdfHash, iterations: u32) -> Result<Self> {
        if iterations == 0 {
            return Err(TextcryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidConfig,
                "key derivation iteration count must be at least 1",
            ));
        }
        Ok(Self { hash, iterations })
    }

    /// HMAC-SHA1 with 2000 iterations. Compatible with existing envelopes.
    pub const fn legacy() -> Self {
        Self {
            hash: KdfHash::Sha1,
            iterations: LEGACY_ITERATIONS,
        }
    }

    /// HMAC-SHA256 with 600 000 iterations.
    pub const fn recommended() -> Self {
        Self {
            hash: KdfHash::Sha256,
            iterations: RECOMMENDED_ITERATIONS,
        }
    }

    pub fn hash(&self) -> KdfHash {
        self.hash
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::legacy()
    }
}

/// A 256-bit key derived from a passphrase. Wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive a 32-byte key from a passphrase and salt using PBKDF2
///
/// The salt is used as raw bytes; for envelopes that is the ASCII text of the
/// salt/IV. Identical inputs always produce the identical key.
pub fn derive(passphrase: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    debug!(
        hash = %params.hash,
        iterations = params.iterations,
        salt_len = salt.len(),
        "deriving key"
    );

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let outcome = match params.hash {
        KdfHash::Sha1 => pbkdf2::<Hmac<Sha1>>(passphrase, salt, params.iterations, &mut *key),
        KdfHash::Sha256 => pbkdf2::<Hmac<Sha256>>(passphrase, salt, params.iterations, &mut *key),
    };
    outcome.map_err(|e| {
        TextcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::UnsupportedAlgorithm,
            format!("PBKDF2 with {} rejected its parameters: {}", params.hash, e),
        )
    })?;

    Ok(DerivedKey(key))
}
