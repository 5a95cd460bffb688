//! Random salt/IV values
//!
//! A single 16-character value drawn from the Base58 alphabet serves as both
//! the PBKDF2 salt and, through its ASCII bytes, the AES-CBC initialization
//! vector. A fresh value is generated for every encryption.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

use crate::base58::ALPHABET;

/// Length of the salt/IV in characters (and bytes; all symbols are ASCII).
pub const SALT_IV_LEN: usize = 16;

/// A salt/IV value: 16 single-byte characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaltIv([u8; SALT_IV_LEN]);

impl SaltIv {
    /// Generate a fresh value from the operating system's CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a value from the supplied cryptographically secure RNG, each
    /// character drawn uniformly and independently from the Base58 alphabet.
    pub fn generate_with<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SALT_IV_LEN];
        for b in bytes.iter_mut() {
            *b = ALPHABET[rng.gen_range(0..ALPHABET.len())];
        }
        Self(bytes)
    }

    /// Interpret `text` as a salt/IV.
    ///
    /// Returns `None` unless `text` is exactly 16 ASCII characters. Symbols
    /// outside the Base58 alphabet are accepted, as long as each is one byte.
    pub fn from_ascii(text: &str) -> Option<Self> {
        if !text.is_ascii() {
            return None;
        }
        let bytes: [u8; SALT_IV_LEN] = text.as_bytes().try_into().ok()?;
        Some(Self(bytes))
    }

    /// Raw bytes, used both as the PBKDF2 salt and as the cipher IV.
    pub fn as_bytes(&self) -> &[u8; SALT_IV_LEN] {
        &self.0
    }
}

impl fmt::Display for SaltIv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bytes are ASCII by construction.
        for &b in &self.0 {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for SaltIv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaltIv(\"{}\")", self)
    }
}
