//! CLI administration tool for alias-manager.
//!
//! Provides commands for creating admin tokens, inspecting and transferring
//! the alias map, and checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin token and print its digest
//! cargo run --bin admin -- token create
//!
//! # Print the digest of an existing token
//! cargo run --bin admin -- token hash "<token>"
//!
//! # Show the stored alias map
//! cargo run --bin admin -- aliases show
//!
//! # Export / import
//! cargo run --bin admin -- aliases export --format csv --output aliases.csv
//! cargo run --bin admin -- aliases import aliases.csv
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the service (see `alias_manager::config`). `token` commands only
//! need `TOKEN_SIGNING_SECRET`.

use alias_manager::application::services::AliasService;
use alias_manager::application::services::auth_service::hash_token;
use alias_manager::config::{self, Config, StorageBackend};
use alias_manager::domain::repositories::SettingsRepository;
use alias_manager::infrastructure::cache::{AliasCache, PublishHooks};
use alias_manager::server;
use alias_manager::utils::alias_codec::TransferFormat;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI tool for managing alias-manager.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage admin tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect and transfer the alias map
    Aliases {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Generate a new admin token and its digest
    Create {
        /// Label shown next to the token (e.g., "Ops laptop")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the digest of an existing token
    Hash {
        token: String,
    },
}

/// Alias map subcommands.
#[derive(Subcommand)]
enum AliasAction {
    /// Print the stored alias map
    Show,

    /// Write the alias map to a file
    Export {
        #[arg(short, long, default_value = "json")]
        format: TransferFormat,

        /// Output path (default: email-aliases-YYYY-MM-DD.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the alias map with the content of a file
    Import {
        file: PathBuf,

        /// File format (default: from the file extension, else json)
        #[arg(short, long)]
        format: Option<TransferFormat>,
    },

    /// Remove the alias map, its backup and the cache entry
    Purge {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action)?,
        Commands::Aliases { action } => handle_alias_action(action).await?,
        Commands::Db { action } => handle_db_action(action).await?,
    }

    Ok(())
}

fn signing_secret() -> Result<String> {
    let secret = std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    anyhow::ensure!(!secret.is_empty(), "TOKEN_SIGNING_SECRET must not be empty");
    Ok(secret)
}

/// Dispatches token management commands.
fn handle_token_action(action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Create { name, yes } => create_token(name, yes),
        TokenAction::Hash { token } => {
            println!("{}", hash_token(&signing_secret()?, &token));
            Ok(())
        }
    }
}

/// Creates a new admin token with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for a label (or use provided)
/// 2. Generate a random token
/// 3. Confirm (unless `--yes` flag)
/// 4. Print the token and its HMAC digest
///
/// The service only stores the digest (in `ADMIN_TOKEN_HASHES`); the raw
/// token is shown once.
fn create_token(name: Option<String>, skip_confirm: bool) -> Result<()> {
    let secret = signing_secret()?;

    println!("{}", "🔑 Create Admin Token".bright_blue().bold());
    println!();

    let label = match name {
        Some(n) => n,
        None if skip_confirm => "admin".to_string(),
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("admin")
            .interact_text()?,
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Generate token '{label}'?"))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token = generate_token();
    let digest = hash_token(&secret, &token);

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:   {}", label.cyan());
    println!("  Token:  {}", token.bright_yellow().bold());
    println!("  Digest: {}", digest.bright_white());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Append the digest to the service configuration:".bright_white());
    println!("  {}={}", "ADMIN_TOKEN_HASHES".bright_cyan(), digest);
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/admin/aliases",
        token.bright_yellow()
    );
    println!();

    Ok(())
}

/// Builds an alias service over the configured persistent storage.
async fn alias_service(config: &Config) -> Result<AliasService<dyn SettingsRepository>> {
    anyhow::ensure!(
        config.storage_backend == StorageBackend::Postgres,
        "alias commands need persistent storage (STORAGE_BACKEND=postgres)"
    );

    let settings = server::build_settings(config).await?;
    let cache = server::build_cache(config).await;
    if cache.backend() == "memory" {
        println!(
            "{}",
            "⚠️  No shared cache; running servers serve their cached map until it expires".yellow()
        );
    }

    let cache = Arc::new(AliasCache::new(
        cache,
        PublishHooks::default(),
        config.cache_ttl_seconds,
    ));

    Ok(AliasService::new(settings, cache))
}

/// Dispatches alias map commands.
async fn handle_alias_action(action: AliasAction) -> Result<()> {
    let config = config::load_from_env()?;
    let service = alias_service(&config).await?;

    match action {
        AliasAction::Show => show_aliases(&service).await?,
        AliasAction::Export { format, output } => {
            let file = service.export(format).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&file.filename));

            std::fs::write(&path, &file.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "{} {}",
                "✅ Exported to".green().bold(),
                path.display().to_string().cyan()
            );
        }
        AliasAction::Import { file, format } => {
            let format = format.unwrap_or_else(|| format_from_extension(&file));
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let outcome = service.import(format, &bytes).await?;

            println!(
                "{} {} aliases stored, {} entries dropped",
                "✅ Imported:".green().bold(),
                outcome.map.len().to_string().bright_white().bold(),
                outcome.dropped.to_string().yellow()
            );
        }
        AliasAction::Purge { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Remove all aliases, the backup copy and the cache entry?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service.purge().await?;
            println!("{}", "✅ All alias data removed".green().bold());
        }
    }

    Ok(())
}

/// Prints the stored alias map as a table.
///
/// # Output Format
///
/// ```text
/// 📋 Aliases
///
///   Alias                          Destinations
///   ───────────────────────────────────────────────────────────────
///   help@acme.com                  agent1@acme.com, agent2@acme.com
/// ```
async fn show_aliases(service: &AliasService<dyn SettingsRepository>) -> Result<()> {
    println!("{}", "📋 Aliases".bright_blue().bold());
    println!();

    let map = service.current().await?;

    if map.is_empty() {
        println!("{}", "  No aliases stored".yellow());
        return Ok(());
    }

    println!(
        "  {:<30} {}",
        "Alias".bright_white().bold(),
        "Destinations".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for (alias, destinations) in map.iter() {
        println!("  {:<30} {}", alias.cyan(), destinations.join(", "));
    }

    println!();
    println!("  Total: {}", map.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let config = config::load_from_env()?;
            let pool = server::connect_database(&config).await?;
            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}

fn format_from_extension(path: &Path) -> TransferFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

/// Generates a cryptographically random token.
///
/// # Format
///
/// - Length: 48 characters
/// - Character set: A-Z, a-z, 0-9
/// - Entropy: ~286 bits
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
