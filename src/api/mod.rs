// src/api/mod.rs
//! Notion API interaction — the ability to read a workspace.
//!
//! The rest of the engine depends on the [`NotionRepository`] trait, never
//! on HTTP details, so the tree walker and synchronizer are testable
//! against an in-memory fake store.

pub mod client;
pub mod pagination;

use crate::error::AppError;
use crate::model::{Block, Page};
use crate::types::NotionId;

/// The ability to read documents and block trees from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Lists candidate pages via the workspace search endpoint, newest
    /// edits first. Follows pagination until exhausted. The result is NOT
    /// yet filtered to the configured database; the synchronizer does
    /// that, since `parent` filtering is a domain decision.
    async fn search_pages(&self) -> Result<Vec<Page>, AppError>;

    /// Lists all children of a block, following pagination until
    /// exhausted.
    async fn list_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError>;
}

pub use client::NotionHttpClient;
