// src/lib.rs
//! notion2blog library — syncs Notion pages into Markdown blog articles.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `NotionErrorCode`
//! - **Configuration** — `SyncConfig`, `CommandLineInput`
//! - **Domain model** — `Page`, `Block`, `BlockPayload`, `RichTextItem`
//! - **Domain types** — `NotionId`, `ArticleId`, `ApiToken`
//! - **API client** — `NotionRepository`, `NotionHttpClient`
//! - **Conversion** — `MarkdownConverter`, rich-text rendering
//! - **Sync engine** — `Synchronizer`, `SyncReport`, `SyncState`

mod api;
mod article;
mod config;
mod constants;
mod convert;
mod error;
mod error_recovery;
mod images;
mod metadata;
mod model;
mod state;
mod sync;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};

// --- Configuration ---
pub use crate::config::{Command, CommandLineInput, SyncConfig};
pub use crate::constants::{
    BLOCK_MAX_RECURSION_DEPTH, DEFAULT_ARTICLES_DIR, DEFAULT_IMAGES_DIR, DEFAULT_STATE_FILE,
    IMAGE_WEB_PREFIX, READ_CHARS_PER_MINUTE, REMOTE_CALL_MAX_ATTEMPTS, REMOTE_CALL_RETRY_DELAY,
    UNTITLED_PLACEHOLDER,
};

// --- Domain Model ---
pub use crate::model::{
    Annotations, Block, BlockPayload, CalloutContent, CodeContent, DateValue, ExternalFile,
    HostedFile, Icon, ImageContent, Page, Parent, PropertyValue, RichTextContent, RichTextItem,
    SelectOption, TableRowContent,
};

// --- Domain Types ---
pub use crate::types::{ApiToken, ArticleId, NotionId};

// --- API Client ---
pub use crate::api::{pagination::fetch_all_pages, NotionHttpClient, NotionRepository};

// --- Conversion ---
pub use crate::convert::rich_text::{plain_text, render_span, render_spans};
pub use crate::convert::MarkdownConverter;

// --- Images ---
pub use crate::images::{HttpImageFetcher, ImageFetcher, ImageLocalizer};

// --- Metadata & Articles ---
pub use crate::article::Article;
pub use crate::metadata::{extract_metadata, read_time, ArticleMetadata};

// --- Sync Engine ---
pub use crate::error_recovery::retry_with_delay;
pub use crate::state::{SyncState, SyncStateStore};
pub use crate::sync::{SyncReport, Synchronizer};
