// src/config.rs
use crate::constants::{DEFAULT_ARTICLES_DIR, DEFAULT_IMAGES_DIR, DEFAULT_STATE_FILE};
use crate::error::AppError;
use crate::types::{ApiToken, NotionId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Directory where article Markdown files are written
    #[arg(long, global = true)]
    pub articles_dir: Option<String>,

    /// Directory where localized images are written
    #[arg(long, global = true)]
    pub images_dir: Option<String>,

    /// Path of the persisted sync state file
    #[arg(long, global = true)]
    pub state_file: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one synchronization pass
    Sync {
        /// Reprocess every document, ignoring the last sync time
        #[arg(long, default_value_t = false)]
        full_sync: bool,
    },
    /// Run the synchronizer repeatedly on a fixed interval
    Watch {
        /// Seconds between sync passes
        #[arg(long, default_value_t = 300)]
        interval: u64,

        /// Reprocess every document on every pass
        #[arg(long, default_value_t = false)]
        full_sync: bool,
    },
}

/// Resolved sync configuration — validated and ready to drive a run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub token: ApiToken,
    pub database_id: NotionId,
    pub articles_dir: PathBuf,
    pub images_dir: PathBuf,
    pub state_file: PathBuf,
}

impl SyncConfig {
    /// Resolves configuration from CLI input and environment.
    ///
    /// Missing credentials abort here, before any remote call is made.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let token_str = std::env::var("NOTION_TOKEN").map_err(|_| {
            AppError::MissingConfiguration("NOTION_TOKEN environment variable not set".to_string())
        })?;
        let database_str = std::env::var("NOTION_DATABASE_ID").map_err(|_| {
            AppError::MissingConfiguration(
                "NOTION_DATABASE_ID environment variable not set".to_string(),
            )
        })?;

        let token = ApiToken::new(token_str)?;
        let database_id = NotionId::parse(&database_str)?;

        Ok(SyncConfig {
            token,
            database_id,
            articles_dir: cli
                .articles_dir
                .as_deref()
                .unwrap_or(DEFAULT_ARTICLES_DIR)
                .into(),
            images_dir: cli
                .images_dir
                .as_deref()
                .unwrap_or(DEFAULT_IMAGES_DIR)
                .into(),
            state_file: cli
                .state_file
                .as_deref()
                .unwrap_or(DEFAULT_STATE_FILE)
                .into(),
        })
    }
}
