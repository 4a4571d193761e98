//! `hidr` binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise logging.
//! 4. Run the command and map any [`HidrError`] to its exit code.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use hidr::config::Config;
use hidr::envfile::{self, convert};
use hidr::keystore::KeyStore;
use hidr::secret::{read_secret_file, ReadQuota, SecretService, ShareRequest};
use hidr::storage::HttpStorage;
use hidr::telemetry::{self, LogFormat};
use hidr::HidrError;

#[derive(Debug, Parser)]
#[command(name = "hidr", version, about = "Share secrets once; keep env files encrypted")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a key pair and register it under a user id.
    Init { user_id: String },

    /// Encrypt a secret and print the identifier to hand out.
    Share {
        /// Secret text. Use --file to share a file instead.
        secret: Option<String>,
        #[arg(short, long, conflicts_with = "secret")]
        file: Option<PathBuf>,
        /// Time to live, e.g. 10m, 2h, 1d.
        #[arg(short, long)]
        ttl: Option<String>,
        /// Only this user may view the secret.
        #[arg(short, long)]
        uid: Option<String>,
        /// Maximum number of views.
        #[arg(short = 'l', long = "limit")]
        reads: Option<u32>,
    },

    /// Fetch and decrypt a shared secret.
    View {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encrypt the values of an env file.
    Encrypt {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Decrypt an env file encrypted with `encrypt`.
    Decrypt {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Convert between JSON and env files.
    Convert {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, default_value = "")]
        suffix: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Logging is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = telemetry::init(&cfg.log_level, LogFormat::parse(&cfg.log_format)) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: Command, cfg: &Config) -> Result<(), HidrError> {
    match command {
        Command::Init { user_id } => {
            secrets(cfg)?.init(&user_id).await?;
            eprintln!("Initialised as `{}`; key stored in {}", user_id.trim(), cfg.data_dir.display());
        }

        Command::Share {
            secret,
            file,
            ttl,
            uid,
            reads,
        } => {
            let content = match (secret, file) {
                (Some(text), None) => zeroize::Zeroizing::new(text),
                (None, Some(path)) => read_secret_file(&path, cfg.max_secret_file_bytes)?,
                _ => return Err(HidrError::Input("provide a secret or --file".into())),
            };
            let token = secrets(cfg)?
                .share(ShareRequest {
                    content: &content,
                    ttl: ttl.as_deref(),
                    recipient: uid.as_deref(),
                    max_reads: reads,
                })
                .await?;
            println!("{token}");
        }

        Command::View { id, output } => {
            let outcome = secrets(cfg)?.view(&id).await?;
            match output.as_deref() {
                Some(path) => write_output(Some(path), &outcome.plaintext)?,
                None => println!("{}", outcome.plaintext.as_str()),
            }
            match outcome.reads {
                ReadQuota::Unlimited => {}
                ReadQuota::Remaining(n) => eprintln!("Reads remaining: {n}"),
                ReadQuota::Unconfirmed => eprintln!("Reads remaining: unconfirmed"),
            }
        }

        Command::Encrypt {
            file,
            output,
            password,
        } => {
            let text = envfile::encrypt_file(&file, password.as_deref(), output.as_deref())?;
            write_output(output.as_deref(), &text)?;
        }

        Command::Decrypt {
            file,
            output,
            password,
        } => {
            let text = zeroize::Zeroizing::new(envfile::decrypt_file(&file, password.as_deref())?);
            write_output(output.as_deref(), &text)?;
        }

        Command::Convert {
            file,
            output,
            prefix,
            suffix,
        } => {
            let text = convert::convert_file(&file, &prefix, &suffix)?;
            write_output(output.as_deref(), &text)?;
        }
    }
    Ok(())
}

fn secrets(cfg: &Config) -> Result<SecretService<HttpStorage>, HidrError> {
    let storage = HttpStorage::new(
        cfg.require_rpc_url()?,
        Duration::from_secs(cfg.request_timeout_secs),
    )?;
    Ok(SecretService::new(storage, KeyStore::new(&cfg.data_dir)))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), HidrError> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            info!(path = %path.display(), "output written");
            eprintln!("Written to {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
