//! frodo-lwe: key encapsulation and key-recovery CLI
//!
//! Generates keys, encapsulates and decapsulates messages, and runs the
//! primal attack against a stored public key.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use frodo_lwe::attack::crack_with;
use frodo_lwe::kem::{decapsulate, encapsulate, keygen, Ciphertext, PublicKey, SecretKey};
use frodo_lwe::params::FrodoParams;

#[derive(Parser)]
#[command(name = "frodo-lwe")]
#[command(about = "FrodoKEM-style LWE key encapsulation and key recovery")]
#[command(version)]
struct Args {
    /// Parameter preset: reference, primal-demo, attack-demo or weak-prime
    #[arg(long, default_value = "reference", conflicts_with = "params")]
    preset: String,

    /// JSON parameter file overriding the preset
    #[arg(long)]
    params: Option<PathBuf>,

    /// Random seed for reproducible keys and ciphertexts (optional)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key pair
    Keygen { pk_file: PathBuf, sk_file: PathBuf },

    /// Encapsulate a message under a public key
    Encaps {
        pk_file: PathBuf,
        ct_file: PathBuf,
        /// Truncated to the message length of the parameter set
        message: String,
    },

    /// Decapsulate a ciphertext with the secret key
    Decaps {
        pk_file: PathBuf,
        sk_file: PathBuf,
        ct_file: PathBuf,
    },

    /// Recover the secret key from the public key and decrypt a ciphertext
    Crack { pk_file: PathBuf, ct_file: PathBuf },

    /// Print the active parameter set as JSON
    Params,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let params = load_params(&args)?;
    params
        .validate()
        .map_err(|e| eyre::eyre!("Invalid parameters: {}", e))?;

    let mut rng = match args.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    match args.command {
        Command::Keygen { pk_file, sk_file } => {
            let (pk, sk) = keygen(&params, &mut rng)?;
            write_file(&pk_file, &pk.to_bytes(&params)?)?;
            write_file(&sk_file, &sk.to_bytes(&params)?)?;
            info!("Public key: {} ({} bytes)", pk_file.display(), params.public_key_bytes());
            info!("Secret key: {} ({} bytes)", sk_file.display(), params.secret_key_bytes());
        }
        Command::Encaps {
            pk_file,
            ct_file,
            message,
        } => {
            let pk = PublicKey::from_bytes(&read_file(&pk_file)?, &params)
                .wrap_err("Failed to parse public key")?;
            let bytes = message.as_bytes();
            let bytes = &bytes[..bytes.len().min(params.message_bytes)];

            let (ct, ss, _) = encapsulate(&params, &pk, Some(bytes), &mut rng)?;
            write_file(&ct_file, &ct.to_bytes(&params)?)?;
            info!("Ciphertext: {} ({} bytes)", ct_file.display(), params.ciphertext_bytes());
            println!("shared secret: {}", hex::encode(&ss));
        }
        Command::Decaps {
            pk_file,
            sk_file,
            ct_file,
        } => {
            let pk = PublicKey::from_bytes(&read_file(&pk_file)?, &params)
                .wrap_err("Failed to parse public key")?;
            let sk = SecretKey::from_bytes(&read_file(&sk_file)?, &params)
                .wrap_err("Failed to parse secret key")?;
            let ct = Ciphertext::from_bytes(&read_file(&ct_file)?, &params)
                .wrap_err("Failed to parse ciphertext")?;

            let (message, ss) = decapsulate(&params, &pk, &sk, &ct)?;
            println!("message: {}", display_message(&message));
            println!("shared secret: {}", hex::encode(&ss));
        }
        Command::Crack { pk_file, ct_file } => {
            let pk = PublicKey::from_bytes(&read_file(&pk_file)?, &params)
                .wrap_err("Failed to parse public key")?;
            let ct = Ciphertext::from_bytes(&read_file(&ct_file)?, &params)
                .wrap_err("Failed to parse ciphertext")?;

            info!("Attacking n={} m={} nbar={} q={}", params.n, params.m, params.nbar, params.q);
            let start = Instant::now();

            let pb = ProgressBar::new(params.nbar as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} columns")?
                    .progress_chars("#>-"),
            );
            let sk = crack_with(&params, &pk, |_| pb.inc(1)).wrap_err("Primal attack failed")?;
            pb.finish_with_message("Done");
            info!("Recovered secret key in {:.2?}", start.elapsed());

            let (message, ss) = decapsulate(&params, &pk, &sk, &ct)?;
            println!("message: {}", display_message(&message));
            println!("shared secret: {}", hex::encode(&ss));
        }
        Command::Params => {
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
    }

    Ok(())
}

fn load_params(args: &Args) -> Result<FrodoParams> {
    match &args.params {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse parameter file: {}", path.display()))
        }
        None => FrodoParams::preset(&args.preset).ok_or_else(|| {
            eyre::eyre!(
                "Unknown preset: {}. Must be reference, primal-demo, attack-demo or weak-prime",
                args.preset
            )
        }),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Message with trailing zero padding stripped
fn display_message(message: &[u8]) -> String {
    let end = message.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&message[..end]).into_owned()
}
