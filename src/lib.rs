//! Textcrypt - Passphrase-based text encryption
//!
//! Turns a passphrase and a piece of text into a compact, paste-friendly
//! envelope string (`<salt/IV>❤<base58 ciphertext>`) and back, using
//! PBKDF2 key derivation and AES-256-CBC.

#![forbid(unsafe_code)]

pub mod base58;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod saltiv;
pub mod text_ops;

pub use envelope::{decrypt, encrypt};
pub use error::{ErrorCategory, ErrorKind, Result, TextcryptError};
pub use kdf::{KdfHash, KdfParams};
