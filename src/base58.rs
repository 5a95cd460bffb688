//! Base58 text encoding for ciphertext
//!
//! Uses the Bitcoin Base58 alphabet (no `0`, `O`, `I` or `l`). The encoded
//! form is:
//! - Free of whitespace and punctuation
//! - Plain ASCII, so every symbol is exactly one byte
//! - Safe to paste into chat messages, URLs and shell arguments
//!
//! The same alphabet is used to draw the random salt/IV characters.

use crate::error::{ErrorCategory, ErrorKind, Result, TextcryptError};

/// Number of symbols in the alphabet.
pub const ALPHABET_LEN: usize = 58;

/// The Base58 alphabet, in digit order.
pub const ALPHABET: &[u8; ALPHABET_LEN] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Returns the alphabet in digit order.
pub fn alphabet() -> &'static [u8; ALPHABET_LEN] {
    ALPHABET
}

/// Whether `c` is one of the 58 alphabet symbols.
pub fn is_alphabet_symbol(c: char) -> bool {
    c.is_ascii() && ALPHABET.contains(&(c as u8))
}

/// Encode bytes as Base58 text.
///
/// Leading zero bytes are preserved as leading `1` symbols.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode Base58 text, returning the original bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    bs58::decode(text)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| {
            TextcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::MalformedInput,
                format!("base58 decoding failed: {}", e),
                e,
            )
        })
}
