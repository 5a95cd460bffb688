//! Encryption/decryption of text into envelope strings
//!
//! This module implements passphrase-based text encryption using:
//! - PBKDF2 (see [`crate::kdf`]) for key derivation from the passphrase
//! - AES-256 in CBC mode with PKCS#7 padding
//!
//! The envelope format is:
//! - salt/IV: 16 Base58 characters (PBKDF2 salt and cipher IV at once)
//! - separator: one character, `❤` when produced by this module
//! - payload: Base58 encoding of the ciphertext
//!
//! Parsing splits at fixed character offsets; the separator is skipped
//! without being checked.
//!
//! There is no authentication tag. A failed padding check is the only
//! signal of a wrong passphrase or corrupted data, and it is not reliable.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::{debug, trace};

use crate::base58;
use crate::error::{ErrorCategory, ErrorKind, Result, TextcryptError};
use crate::kdf::{self, KdfParams};
use crate::saltiv::{SALT_IV_LEN, SaltIv};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Separator written between the salt/IV and the payload
pub const SEPARATOR: char = '❤';

/// Minimum envelope length in characters: salt/IV plus separator
pub const MIN_ENVELOPE_CHARS: usize = SALT_IV_LEN + 1;

/// Encrypt plaintext with a passphrase using a random salt/IV and the legacy
/// key derivation parameters
pub fn encrypt(passphrase: &[u8], plaintext: &str) -> Result<String> {
    encrypt_with_params(passphrase, plaintext, &KdfParams::default())
}

/// Encrypt plaintext with a passphrase using a random salt/IV
pub fn encrypt_with_params(passphrase: &[u8], plaintext: &str, params: &KdfParams) -> Result<String> {
    let salt_iv = SaltIv::generate();
    encrypt_deterministic(passphrase, plaintext, &salt_iv, params)
}

/// Encrypt plaintext with a passphrase using the provided salt/IV
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates a
/// fresh salt/IV.
pub fn encrypt_deterministic(
    passphrase: &[u8],
    plaintext: &str,
    salt_iv: &SaltIv,
    params: &KdfParams,
) -> Result<String> {
    let key = kdf::derive(passphrase, salt_iv.as_bytes(), params)?;

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), salt_iv.as_bytes()).map_err(|e| {
        TextcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EncryptionFailed,
            format!("failed to initialize AES-256-CBC: {}", e),
        )
    })?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted text"
    );

    let payload = base58::encode(&ciphertext);
    let mut envelope =
        String::with_capacity(SALT_IV_LEN + SEPARATOR.len_utf8() + payload.len());
    envelope.push_str(&salt_iv.to_string());
    envelope.push(SEPARATOR);
    envelope.push_str(&payload);

    Ok(envelope)
}

/// Decrypt an envelope with a passphrase using the legacy key derivation
/// parameters
pub fn decrypt(passphrase: &[u8], envelope: &str) -> Result<String> {
    decrypt_with_params(passphrase, envelope, &KdfParams::default())
}

/// Decrypt an envelope with a passphrase
///
/// `params` must match the parameters the envelope was encrypted with.
pub fn decrypt_with_params(passphrase: &[u8], envelope: &str, params: &KdfParams) -> Result<String> {
    let (salt_iv, payload) = split(envelope)?;
    trace!(salt_iv = %salt_iv, payload_len = payload.len(), "parsed envelope");

    let key = kdf::derive(passphrase, salt_iv.as_bytes(), params)?;

    let ciphertext = base58::decode(payload)
        .map_err(|e| e.with_context("envelope payload is not valid base58"))?;

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), salt_iv.as_bytes()).map_err(|e| {
        TextcryptError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EncryptionFailed,
            format!("failed to initialize AES-256-CBC: {}", e),
        )
    })?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| {
            debug!(ciphertext_len = ciphertext.len(), "cipher rejected ciphertext");
            wrong_password_or_corrupt()
        })?;

    String::from_utf8(plaintext).map_err(|_| {
        debug!("decrypted bytes are not valid UTF-8");
        wrong_password_or_corrupt()
    })
}

/// Split an envelope into its salt/IV and encoded payload.
fn split(envelope: &str) -> Result<(SaltIv, &str)> {
    // Byte offset of the separator, i.e. of the 17th character.
    let Some((sep_start, separator)) = envelope.char_indices().nth(SALT_IV_LEN) else {
        return Err(TextcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedInput,
            format!(
                "input shorter than {} characters; likely truncated or not an envelope",
                MIN_ENVELOPE_CHARS
            ),
        ));
    };

    let salt_iv = SaltIv::from_ascii(&envelope[..sep_start]).ok_or_else(|| {
        TextcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedInput,
            "salt/IV must consist of 16 single-byte characters",
        )
    })?;

    Ok((salt_iv, &envelope[sep_start + separator.len_utf8()..]))
}

fn wrong_password_or_corrupt() -> TextcryptError {
    TextcryptError::with_kind(
        ErrorCategory::User,
        ErrorKind::WrongPasswordOrCorruptData,
        "corrupt input, tampered-with data, or bad passphrase",
    )
}
