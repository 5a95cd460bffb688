//! Textcrypt CLI - Passphrase-based text encryption
//!
//! Command-line interface for encrypting and decrypting text using
//! AES-256-CBC with PBKDF2 key derivation.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use textcrypt::error::{ErrorCategory, ErrorKind, Result, TextcryptError};
use textcrypt::kdf::{KdfHash, KdfParams};
use textcrypt::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use textcrypt::text_ops::{self, Input, Output};

#[derive(Parser)]
#[command(name = "textcrypt")]
#[command(version)]
#[command(about = "Passphrase-based text encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Key derivation profile; must match the one used to encrypt
    #[arg(long, global = true, value_enum, env = "TEXTCRYPT_KDF", default_value_t = KdfProfile::Legacy)]
    kdf: KdfProfile,

    /// Override the PBKDF2 iteration count of the selected profile
    #[arg(long, global = true, env = "TEXTCRYPT_ITERATIONS", value_name = "N")]
    iterations: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KdfProfile {
    /// PBKDF2-HMAC-SHA1, 2000 iterations (compatible with existing envelopes)
    Legacy,
    /// PBKDF2-HMAC-SHA256, 600000 iterations
    Recommended,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text
    #[command(alias = "e")]
    Encrypt {
        /// File whose contents is to be encrypted (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// File to write the envelope to (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt an envelope
    #[command(alias = "d")]
    Decrypt {
        /// File containing the envelope (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// File to write the decrypted text to (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// File whose contents is to be encrypted (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Path to the existing envelope file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e.chain_message());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let params = kdf_params(cli.kdf, cli.iterations)?;

    match cli.command {
        Commands::Encrypt { input, output } => {
            let input = Input::from_arg(input);
            let mut reader = get_passphrase_reader(cli.passphrase_stdin, &input)?;
            text_ops::encrypt_text(&input, &Output::from_arg(output), &mut *reader, &params)
        }
        Commands::Decrypt { input, output } => {
            let input = Input::from_arg(input);
            let mut reader = get_passphrase_reader(cli.passphrase_stdin, &input)?;
            text_ops::decrypt_text(&input, &Output::from_arg(output), &mut *reader, &params)
        }
        Commands::Update { input, output } => {
            let input = Input::from_arg(input);
            let mut reader = get_passphrase_reader(cli.passphrase_stdin, &input)?;
            text_ops::update_file(&input, &output, &mut *reader, &params)
        }
    }
}

fn kdf_params(profile: KdfProfile, iterations: Option<u32>) -> Result<KdfParams> {
    let base = match profile {
        KdfProfile::Legacy => KdfParams::legacy(),
        KdfProfile::Recommended => KdfParams::recommended(),
    };
    match iterations {
        Some(n) => KdfParams::new(base.hash(), n),
        None => Ok(base),
    }
}

fn get_passphrase_reader(use_stdin: bool, input: &Input) -> Result<Box<dyn PassphraseReader>> {
    if !use_stdin {
        return Ok(Box::new(TerminalPassphraseReader::new()));
    }
    if input.is_stdin() {
        return Err(TextcryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::PassphraseUnavailable,
            "--passphrase-stdin requires the text to come from a file (-i FILE)",
        ));
    }
    Ok(Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin()))))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
