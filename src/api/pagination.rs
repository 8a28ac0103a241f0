// src/api/pagination.rs
//! Cursor-driven pagination over Notion list endpoints.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;
use serde::Deserialize;

/// One page of a paginated Notion list response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Fetches every page of a listing by looping on the response cursor
/// until the API reports no more results.
///
/// The closure receives the page size and the cursor to resume from
/// (`None` on the first call).
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_fn: F) -> Result<Vec<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;

    loop {
        let response = fetch_fn(NOTION_API_PAGE_SIZE, cursor).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor;
        all_items.extend(response.results);

        if !has_more || cursor.is_none() {
            break;
        }
        log::debug!("Following pagination cursor ({} items so far)", all_items.len());
    }

    Ok(all_items)
}
