// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story
//! of how a sync run operates: how deep it recurses, how often it retries,
//! how it turns body length into a reading time.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips while walking block trees.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Maximum nesting depth when recursively converting blocks to Markdown.
///
/// Guards against malformed cyclic parent/child references from the API.
/// Exceeding the cap yields empty output for that subtree instead of
/// failing the whole conversion.
pub const BLOCK_MAX_RECURSION_DEPTH: usize = 10;

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// How many times a remote call (search, children listing) is attempted
/// before the failure propagates to the caller.
pub const REMOTE_CALL_MAX_ATTEMPTS: u32 = 3;

/// Fixed pause between attempts. Notion rate limiting resolves within a
/// couple of seconds, and a fixed delay keeps a run's worst-case duration
/// predictable.
pub const REMOTE_CALL_RETRY_DELAY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Article derivation
// ---------------------------------------------------------------------------

/// Reading speed used to derive `readTime`: non-whitespace characters per
/// minute. Calibrated for CJK prose, where a character is roughly a word.
pub const READ_CHARS_PER_MINUTE: usize = 300;

/// Front-matter title used when no title property matches.
pub const UNTITLED_PLACEHOLDER: &str = "未命名";

// ---------------------------------------------------------------------------
// Local layout
// ---------------------------------------------------------------------------

/// Where article Markdown files are written, relative to the working dir.
pub const DEFAULT_ARTICLES_DIR: &str = "app/data/articles";

/// Where localized images are written, relative to the working dir.
pub const DEFAULT_IMAGES_DIR: &str = "public/images/articles";

/// The web path prefix articles use to reference localized images.
pub const IMAGE_WEB_PREFIX: &str = "/images/articles";

/// Where incremental sync state is persisted between runs.
pub const DEFAULT_STATE_FILE: &str = ".notion-sync-state.json";

/// Fallback extension when the source URL path has none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";
