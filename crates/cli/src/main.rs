//! Cardlink CLI - Command-line client for the card service
//!
//! Signs in against a Cardlink server, keeps the session in a local
//! cookie file, and exposes the profile, card and upload operations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cardlink_application::{ApiError, AuthApi, CardApi, CredentialStore, RequestCoordinator, UploadApi, UserApi};
use cardlink_domain::{CardDraft, DeviceInfo, LoginRequest, RegisterRequest};
use cardlink_infrastructure::{FileCookieCache, ReqwestTransport};

#[derive(Parser)]
#[command(name = "cardlink", version, about = "Client for the Cardlink card service")]
struct Cli {
    /// Base URL of the service API.
    #[arg(
        long,
        env = "CARDLINK_API_URL",
        default_value = "http://localhost:3000/api/v1"
    )]
    base_url: String,

    /// Where the session cookies are stored.
    #[arg(long, env = "CARDLINK_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log filter (tracing syntax).
    #[arg(long, env = "CARDLINK_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in.
    Register {
        /// Desired user name.
        #[arg(long)]
        user_name: String,
        /// Display name.
        #[arg(long)]
        full_name: String,
        /// Contact email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// Device name reported to the server.
        #[arg(long)]
        device_name: Option<String>,
    },
    /// Sign in with user name and password.
    Login {
        /// Account user name.
        #[arg(long)]
        user_name: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear the local session.
    Logout,
    /// Show the current profile and its cards.
    Me,
    /// Show the local session status.
    Status,
    /// Manage business cards.
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
    /// Upload an image and print its URL.
    Upload {
        /// Path of the image file.
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Create a card from a JSON draft file.
    Create {
        /// Path of the draft JSON.
        #[arg(long)]
        from: PathBuf,
    },
    /// Update a card from a JSON draft file.
    Update {
        /// Id of the card to update.
        id: String,
        /// Path of the draft JSON.
        #[arg(long)]
        from: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if err
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_auth_expired)
            {
                eprintln!("session expired; sign in again with `cardlink login`");
            }
            Err(err)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let session_path = cli
        .session_file
        .or_else(FileCookieCache::default_path)
        .unwrap_or_else(|| PathBuf::from(".cardlink-session.json"));
    let cache = Arc::new(FileCookieCache::new(session_path));

    let credentials = CredentialStore::new(cache);
    credentials.hydrate().await;

    let transport = Arc::new(ReqwestTransport::new(&cli.base_url)?);
    let coordinator = Arc::new(RequestCoordinator::new(transport, credentials));

    match cli.command {
        Command::Register {
            user_name,
            full_name,
            email,
            password,
            device_name,
        } => {
            let session = AuthApi::new(coordinator)
                .register(&RegisterRequest {
                    user_name,
                    full_name,
                    email,
                    password,
                    device: DeviceInfo {
                        device_name,
                        device_type: Some("cli".to_string()),
                        os: Some(std::env::consts::OS.to_string()),
                        browser: None,
                        ip_address: None,
                    },
                })
                .await?;
            println!("registered as {}", session.user.user_name);
        }
        Command::Login {
            user_name,
            password,
        } => {
            let session = AuthApi::new(coordinator)
                .login(&LoginRequest {
                    user_name,
                    password,
                })
                .await?;
            println!("signed in as {}", session.user.user_name);
        }
        Command::Logout => {
            AuthApi::new(coordinator).logout().await?;
            println!("signed out");
        }
        Command::Me => {
            let profile = UserApi::new(coordinator).me().await?;
            print_json(&profile)?;
        }
        Command::Status => {
            let status = coordinator.credentials().status().await;
            println!("{}", status.display_message());
        }
        Command::Card { command } => {
            let api = CardApi::new(coordinator);
            let card = match command {
                CardCommand::Create { from } => api.create_card(&read_draft(&from)?).await?,
                CardCommand::Update { id, from } => {
                    api.update_card(&id, &read_draft(&from)?).await?
                }
            };
            print_json(&card)?;
        }
        Command::Upload { path } => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .context("image path has no file name")?;
            let uploaded = UploadApi::new(coordinator)
                .upload_image(file_name, data)
                .await?;
            println!("{}", uploaded.url);
        }
    }
    Ok(())
}

fn read_draft(path: &PathBuf) -> anyhow::Result<CardDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid card draft in {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
