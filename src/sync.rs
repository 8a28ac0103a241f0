// src/sync.rs
//! The synchronizer: one full reconciliation pass between the remote
//! database and the local article directory.
//!
//! Per-document failures never abort a run: one bad document is logged,
//! counted as skipped, and the loop moves on. Only configuration errors
//! and the top-level search call may abort the whole run.

use crate::api::NotionRepository;
use crate::article::Article;
use crate::config::SyncConfig;
use crate::constants::{REMOTE_CALL_MAX_ATTEMPTS, REMOTE_CALL_RETRY_DELAY};
use crate::convert::MarkdownConverter;
use crate::error::AppError;
use crate::error_recovery::retry_with_delay;
use crate::images::{ImageFetcher, ImageLocalizer};
use crate::metadata::{extract_metadata, read_time};
use crate::model::Page;
use crate::state::{SyncState, SyncStateStore};
use crate::types::{ArticleId, NotionId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

/// Tally of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub total: usize,
}

impl SyncReport {
    /// Whether the run changed anything on disk. Governs whether the
    /// sync cutoff advances.
    pub fn changed(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "new {}, updated {}, skipped {}, deleted {}, total {}",
            self.created, self.updated, self.skipped, self.deleted, self.total
        )
    }
}

/// How one document relates to the previous sync cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Never synced; always process.
    New,
    /// Synced before and edited since the cutoff; reprocess.
    Updated,
    /// Synced before and untouched since the cutoff; skip.
    Unchanged,
}

fn classify(page: &Page, state: &SyncState, last_sync: DateTime<Utc>) -> Disposition {
    match state.synced_pages.get(&page.id) {
        None => Disposition::New,
        Some(_) if page.last_edited_time > last_sync => Disposition::Updated,
        Some(_) => Disposition::Unchanged,
    }
}

/// What processing one page did.
enum PageOutcome {
    Created,
    Updated,
    Skipped,
}

/// Orchestrates a sync run over injected capabilities.
pub struct Synchronizer<'a> {
    repo: &'a dyn NotionRepository,
    image_fetcher: &'a dyn ImageFetcher,
    config: &'a SyncConfig,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        repo: &'a dyn NotionRepository,
        image_fetcher: &'a dyn ImageFetcher,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            repo,
            image_fetcher,
            config,
        }
    }

    /// Runs one synchronization pass.
    ///
    /// With `full_sync` set, the cutoff is ignored and every document is
    /// reprocessed (existing article ids are still reused).
    pub async fn run(&self, full_sync: bool) -> Result<SyncReport, AppError> {
        let store = SyncStateStore::new(&self.config.state_file);
        let mut state = store.load()?;
        let last_sync = state.last_sync_time;

        log::info!(
            "Last sync: {}; {} article(s) tracked",
            last_sync.to_rfc3339(),
            state.synced_pages.len()
        );

        let candidates = retry_with_delay(
            || self.repo.search_pages(),
            REMOTE_CALL_MAX_ATTEMPTS,
            REMOTE_CALL_RETRY_DELAY,
        )
        .await?;
        let total_candidates = candidates.len();

        let pages: Vec<Page> = candidates
            .into_iter()
            .filter(|p| p.belongs_to_database(&self.config.database_id))
            .collect();
        log::info!(
            "Found {} page(s) in database {} ({} candidate(s) searched)",
            pages.len(),
            self.config.database_id,
            total_candidates
        );

        let mut report = SyncReport {
            total: pages.len(),
            ..Default::default()
        };

        for page in &pages {
            match self.process_page(page, &mut state, last_sync, full_sync).await {
                Ok(PageOutcome::Created) => report.created += 1,
                Ok(PageOutcome::Updated) => report.updated += 1,
                Ok(PageOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    log::error!("Failed to process page {}: {}", page.id, e);
                    report.skipped += 1;
                }
            }
        }

        report.deleted = self.reconcile_deletions(&pages, &mut state);

        if report.changed() {
            state.last_sync_time = Utc::now();
            store.save(&state)?;
            log::info!(
                "Sync state saved; cutoff advanced to {}",
                state.last_sync_time.to_rfc3339()
            );
        } else {
            log::info!("Nothing changed; keeping previous sync cutoff");
        }

        Ok(report)
    }

    async fn process_page(
        &self,
        page: &Page,
        state: &mut SyncState,
        last_sync: DateTime<Utc>,
        full_sync: bool,
    ) -> Result<PageOutcome, AppError> {
        let meta = extract_metadata(page);

        if !full_sync && classify(page, state, last_sync) == Disposition::Unchanged {
            log::debug!(
                "Skipping '{}': edited {} <= cutoff {}",
                meta.title,
                page.last_edited_time.to_rfc3339(),
                last_sync.to_rfc3339()
            );
            return Ok(PageOutcome::Skipped);
        }

        let markdown = MarkdownConverter::new(self.repo)
            .page_to_markdown(&page.id)
            .await?;
        if markdown.trim().is_empty() {
            log::warn!("Skipping '{}': converted body is empty", meta.title);
            return Ok(PageOutcome::Skipped);
        }

        // Reuse the assigned id so permalinks survive updates.
        let article_id = state
            .synced_pages
            .get(&page.id)
            .cloned()
            .unwrap_or_else(ArticleId::generate);

        let localizer = ImageLocalizer::new(self.image_fetcher, &self.config.images_dir);
        let body = localizer.localize_all(&markdown, &article_id).await;

        let article = Article {
            id: article_id.clone(),
            title: meta.title,
            date: meta.date,
            read_time: read_time(&body),
            category: meta.category,
            tags: meta.tags,
            body,
        };
        article.write_to(&self.config.articles_dir)?;

        let was_synced = state
            .synced_pages
            .insert(page.id.clone(), article_id)
            .is_some();
        if was_synced {
            log::info!("Updated '{}'", article.title);
            Ok(PageOutcome::Updated)
        } else {
            log::info!("Created '{}' as {}", article.title, article.file_name());
            Ok(PageOutcome::Created)
        }
    }

    /// Removes local articles whose remote page no longer exists.
    ///
    /// An empty remote result is treated as a possible transient or auth
    /// failure and never triggers deletion; this is a safety invariant,
    /// not an optimization.
    fn reconcile_deletions(&self, pages: &[Page], state: &mut SyncState) -> usize {
        if pages.is_empty() {
            if !state.synced_pages.is_empty() {
                log::warn!(
                    "Remote returned no pages while {} article(s) are tracked; \
                     skipping deletion reconciliation",
                    state.synced_pages.len()
                );
            }
            return 0;
        }

        let current: HashSet<&NotionId> = pages.iter().map(|p| &p.id).collect();
        let stale: Vec<NotionId> = state
            .synced_pages
            .keys()
            .filter(|id| !current.contains(*id))
            .cloned()
            .collect();

        let mut deleted = 0;
        for page_id in stale {
            let Some(article_id) = state.synced_pages.get(&page_id).cloned() else {
                continue;
            };
            let path = self.config.articles_dir.join(format!("{}.md", article_id));
            match std::fs::remove_file(&path) {
                Ok(()) => log::info!("Removed article {} (page {} deleted remotely)", article_id, page_id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("Article file {} already absent", path.display());
                }
                Err(e) => {
                    // Keep the mapping so the file is retried next run.
                    log::error!("Could not remove {}: {}", path.display(), e);
                    continue;
                }
            }
            state.synced_pages.shift_remove(&page_id);
            deleted += 1;
        }

        deleted
    }
}
