//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Get path to the textcrypt binary
fn textcrypt_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_textcrypt"))
}

/// Run textcrypt with passphrase from stdin
fn run_textcrypt_with_passphrase(
    args: &[&str],
    passphrase: &str,
) -> Result<Output, std::io::Error> {
    run_textcrypt_with_env(args, passphrase, &[])
}

fn run_textcrypt_with_env(
    args: &[&str],
    passphrase: &str,
    envs: &[(&str, &str)],
) -> Result<Output, std::io::Error> {
    let mut child = Command::new(textcrypt_bin())
        .arg("--passphrase-stdin")
        .args(args)
        .env_remove("TEXTCRYPT_KDF")
        .env_remove("TEXTCRYPT_ITERATIONS")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., file not found)
        let _ = stdin.write_all(passphrase.as_bytes());
    }

    child.wait_with_output()
}

/// Get path to testdata directory
fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

fn assert_success(result: &Output, what: &str) {
    assert!(
        result.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&result.stderr)
    );
}

/// Decrypt known ciphertext.
#[test]
fn test_decrypt_known_ciphertext() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello-decrypted.txt");

    let result = run_textcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            testdata_path("hello.txt.tc").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert_success(&result, "decrypt");

    let decrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();
    assert_eq!(decrypted, expected);
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = testdata_path("hello.txt");
    let encrypted_path = temp_dir.path().join("hello-encrypted.txt.tc");
    let decrypted_path = temp_dir.path().join("hello-decrypted.txt");

    let result = run_textcrypt_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext_path.to_str().unwrap(),
            "-o",
            encrypted_path.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert_success(&result, "encrypt");

    let result = run_textcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted_path.to_str().unwrap(),
            "-o",
            decrypted_path.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert_success(&result, "decrypt");

    let original = fs::read_to_string(&plaintext_path).unwrap();
    let decrypted = fs::read_to_string(&decrypted_path).unwrap();
    assert_eq!(original, decrypted);
}

#[test]
fn test_encrypt_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let pasted = temp_dir.path().join("pasted.tc");

    fs::write(&plaintext, "attack at dawn").unwrap();

    let result = run_textcrypt_with_passphrase(
        &["encrypt", "-i", plaintext.to_str().unwrap()],
        "correct horse",
    )
    .unwrap();
    assert_success(&result, "encrypt");

    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.ends_with('\n'));
    let sealed = stdout.trim_end();
    assert_eq!(sealed.chars().nth(16), Some('❤'));
    assert!(sealed.chars().count() > 17);

    // Round-trip through a file, newline included, and decrypt to stdout.
    fs::write(&pasted, &stdout).unwrap();
    let result = run_textcrypt_with_passphrase(
        &["decrypt", "-i", pasted.to_str().unwrap()],
        "correct horse",
    )
    .unwrap();
    assert_success(&result, "decrypt");
    assert_eq!(result.stdout, b"attack at dawn");
}

#[test]
fn test_update_operation() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.tc");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext1, "Original content").unwrap();

    let result = run_textcrypt_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext1.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert!(result.status.success());

    fs::write(&plaintext2, "Updated content").unwrap();

    let result = run_textcrypt_with_passphrase(
        &[
            "update",
            "-i",
            plaintext2.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert_success(&result, "update");

    let result = run_textcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert!(result.status.success());

    let decrypted_content = fs::read_to_string(&decrypted).unwrap();
    assert_eq!(decrypted_content, "Updated content");
}

#[test]
fn test_update_with_wrong_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plaintext.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.tc");

    // Encrypted with "correct horse"; "wrong horse" fails the padding check.
    let original = "Zq3xRtV9mK2pLw8N❤MbcvVxLFmsrcXygYT1o59Z";
    fs::write(&encrypted, original).unwrap();
    fs::write(&plaintext, "Updated").unwrap();

    let result = run_textcrypt_with_passphrase(
        &[
            "update",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "wrong horse",
    )
    .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("decrypt") && stderr.contains("passphrase"),
        "Expected error message about decryption/passphrase, got: {}",
        stderr
    );
    assert_eq!(fs::read_to_string(&encrypted).unwrap(), original);
}

#[test]
fn test_decrypt_nonexistent_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let nonexistent = temp_dir.path().join("nonexistent.tc");
    let output = temp_dir.path().join("output.txt");

    let result = run_textcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            nonexistent.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_decrypt_malformed_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let encrypted = temp_dir.path().join("short.tc");
    fs::write(&encrypted, "short").unwrap();

    let result = run_textcrypt_with_passphrase(
        &["decrypt", "-i", encrypted.to_str().unwrap()],
        "test",
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Error: failed to decrypt"), "got: {}", stderr);
}

#[test]
fn test_empty_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let encrypted = temp_dir.path().join("plain.txt.tc");
    fs::write(&plaintext, "secret").unwrap();

    let result = run_textcrypt_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "",
    )
    .unwrap();

    assert!(!result.status.success());
    assert!(!encrypted.exists());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("encryption key is not set"), "got: {}", stderr);
}

#[test]
fn test_passphrase_stdin_requires_input_file() {
    let result = run_textcrypt_with_passphrase(&["encrypt"], "test").unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("-i FILE"), "got: {}", stderr);
}

#[test]
fn test_custom_iterations_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let encrypted = temp_dir.path().join("plain.txt.tc");
    let decrypted = temp_dir.path().join("decrypted.txt");
    fs::write(&plaintext, "configurable stretching").unwrap();

    let envs = [("TEXTCRYPT_ITERATIONS", "5000")];
    let result = run_textcrypt_with_env(
        &[
            "--kdf",
            "recommended",
            "encrypt",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
        &envs,
    )
    .unwrap();
    assert_success(&result, "encrypt");

    let result = run_textcrypt_with_env(
        &[
            "decrypt",
            "--kdf",
            "recommended",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
        &envs,
    )
    .unwrap();
    assert_success(&result, "decrypt");
    assert_eq!(
        fs::read_to_string(&decrypted).unwrap(),
        "configurable stretching"
    );
}

#[test]
fn test_zero_iterations_rejected() {
    let result = run_textcrypt_with_passphrase(
        &[
            "--iterations",
            "0",
            "decrypt",
            "-i",
            testdata_path("hello.txt.tc").to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("iteration count"), "got: {}", stderr);
}

#[test]
fn test_empty_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("empty.txt");
    let encrypted = temp_dir.path().join("empty.txt.tc");
    let decrypted = temp_dir.path().join("empty-decrypted.txt");

    fs::write(&plaintext, b"").unwrap();

    let result = run_textcrypt_with_passphrase(
        &[
            "encrypt",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert!(result.status.success());

    let result = run_textcrypt_with_passphrase(
        &[
            "decrypt",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();

    assert!(result.status.success());
    let content = fs::read(&decrypted).unwrap();
    assert_eq!(content, b"");
}
