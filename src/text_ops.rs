//! Text encryption/decryption operations
//!
//! This module provides the high-level operations behind the command line:
//! reading text from a file or stdin, obtaining the passphrase, and writing
//! the envelope or the recovered plaintext to a file or stdout.

use crate::envelope;
use crate::error::{ErrorCategory, ErrorKind, Result, TextcryptError};
use crate::kdf::KdfParams;
use crate::passphrase::{self, PassphraseReader};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

/// Where text is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// `None` and `-` mean stdin.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Input::File(p),
            _ => Input::Stdin,
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, Input::Stdin)
    }

    /// Read the whole input as UTF-8 text.
    fn read_text(&self) -> Result<Zeroizing<String>> {
        let bytes = match self {
            Input::Stdin => {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf).map_err(|e| {
                    TextcryptError::with_kind_and_source(
                        ErrorCategory::Internal,
                        ErrorKind::Io,
                        "failed to read from stdin",
                        e,
                    )
                })?;
                buf
            }
            Input::File(path) => fs::read(path).map_err(|e| read_error(path, e))?,
        };
        let text = String::from_utf8(bytes).map_err(|e| {
            TextcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::EncodingFailed,
                format!("{} is not valid UTF-8 text", self),
                e,
            )
        })?;
        Ok(Zeroizing::new(text))
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("stdin"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where results are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `None` and `-` mean stdout.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Output::File(p),
            _ => Output::Stdout,
        }
    }

    fn write(&self, contents: &[u8]) -> Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(contents)
                    .and_then(|()| stdout.flush())
                    .map_err(|e| {
                        TextcryptError::with_kind_and_source(
                            ErrorCategory::Internal,
                            ErrorKind::Io,
                            "failed to write to stdout",
                            e,
                        )
                    })
            }
            Output::File(path) => write_file_secure(path, contents)
                .map_err(|e| e.with_context(format!("failed to write to {}", path.display()))),
        }
    }
}

/// Encrypt text with a passphrase
///
/// Reads plaintext from `input`, encrypts it using a passphrase from
/// `passphrase_reader`, and writes the envelope to `output`. On stdout the
/// envelope is followed by a newline.
///
/// Output files are created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_text(
    input: &Input,
    output: &Output,
    passphrase_reader: &mut dyn PassphraseReader,
    params: &KdfParams,
) -> Result<()> {
    let plaintext = input.read_text()?;
    let passphrase = passphrase::read_nonempty(passphrase_reader)?;
    let mut sealed = envelope::encrypt_with_params(&passphrase, &plaintext, params)
        .map_err(|e| e.with_context("encryption failed"))?;
    if *output == Output::Stdout {
        sealed.push('\n');
    }
    output.write(sealed.as_bytes())?;
    info!(input = %input, "encrypted text");

    Ok(())
}

/// Decrypt an envelope with a passphrase
///
/// Reads the envelope from `input`, decrypts it using a passphrase from
/// `passphrase_reader`, and writes the plaintext to `output` exactly as it
/// was encrypted. Whitespace around the envelope is ignored.
///
/// Output files are created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_text(
    input: &Input,
    output: &Output,
    passphrase_reader: &mut dyn PassphraseReader,
    params: &KdfParams,
) -> Result<()> {
    let sealed = input.read_text()?;
    let passphrase = passphrase::read_nonempty(passphrase_reader)?;
    let plaintext = Zeroizing::new(
        envelope::decrypt_with_params(&passphrase, sealed.trim(), params)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );
    output.write(plaintext.as_bytes())?;
    info!(input = %input, "decrypted text");

    Ok(())
}

/// Update an encrypted file with new plaintext using the same passphrase
///
/// This function:
/// 1. Decrypts the existing envelope at `crypt_path` to validate the passphrase
/// 2. Reads new plaintext from `input`
/// 3. Encrypts the new plaintext with the validated passphrase
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
///
/// The passphrase validation prevents accidental passphrase changes. Without
/// an authentication tag it is not proof, but a wrong passphrase is rejected
/// with overwhelming probability since the old plaintext must also be UTF-8.
pub fn update_file(
    input: &Input,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    params: &KdfParams,
) -> Result<()> {
    let existing = Input::File(crypt_path.to_path_buf()).read_text()?;
    let passphrase = passphrase::read_nonempty(passphrase_reader)?;

    // Validate passphrase by decrypting existing file (discard plaintext)
    let _old_plaintext = Zeroizing::new(
        envelope::decrypt_with_params(&passphrase, existing.trim(), params)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );

    // Great, let's re-write it (atomically).
    let crypt_dir = match crypt_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::Builder::new()
        .prefix(".textcrypt-update")
        .tempfile_in(crypt_dir)
        .map_err(|e| {
            TextcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to create tempfile",
                e,
            )
        })?;
    let new_plaintext = input.read_text()?;
    let new_envelope = envelope::encrypt_with_params(&passphrase, &new_plaintext, params)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    temp_file.write_all(new_envelope.as_bytes()).map_err(|e| {
        TextcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        TextcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        TextcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // tempfile already creates files with mode 0o600 on Unix; keep it explicit.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                TextcryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        TextcryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", crypt_path.display()),
            e,
        )
    })?;
    info!(path = %crypt_path.display(), "updated encrypted file");
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                TextcryptError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            TextcryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            TextcryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> TextcryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    TextcryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
