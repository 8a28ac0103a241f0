// src/convert/mod.rs
//! Recursive conversion of a remote block tree into flat Markdown.
//!
//! Children are not embedded in block payloads: expanding a node costs a
//! paginated listing call. The walker therefore takes the repository as an
//! injected capability and drives the traversal depth-first, converting
//! each block to its Markdown fragment in original order.

pub mod rich_text;

use crate::api::NotionRepository;
use crate::constants::{
    BLOCK_MAX_RECURSION_DEPTH, REMOTE_CALL_MAX_ATTEMPTS, REMOTE_CALL_RETRY_DELAY,
};
use crate::error::AppError;
use crate::error_recovery::retry_with_delay;
use crate::model::{Block, BlockPayload, Icon};
use crate::types::NotionId;
use futures::future::{BoxFuture, FutureExt};
use rich_text::{plain_text, render_spans};

/// Default icon for callouts that declare none.
const CALLOUT_FALLBACK_EMOJI: &str = "💡";

/// Converts a document's block tree into Markdown.
pub struct MarkdownConverter<'a> {
    repo: &'a dyn NotionRepository,
}

impl<'a> MarkdownConverter<'a> {
    pub fn new(repo: &'a dyn NotionRepository) -> Self {
        Self { repo }
    }

    /// Converts the full block tree under a page into trimmed Markdown.
    ///
    /// A children listing that exhausts its retry budget propagates as a
    /// hard failure for the whole document; the synchronizer catches it
    /// per-document.
    pub async fn page_to_markdown(&self, page_id: &NotionId) -> Result<String, AppError> {
        self.walk(page_id, 0).await
    }

    /// Fetches all children of `block_id`, converts each in order, and
    /// recurses into nested children. Boxed because async recursion needs
    /// an indirection.
    fn walk<'s>(
        &'s self,
        block_id: &'s NotionId,
        depth: usize,
    ) -> BoxFuture<'s, Result<String, AppError>> {
        async move {
            if depth > BLOCK_MAX_RECURSION_DEPTH {
                log::warn!(
                    "Recursion depth {} exceeded under block {}; emitting nothing for this subtree",
                    BLOCK_MAX_RECURSION_DEPTH,
                    block_id
                );
                return Ok(String::new());
            }

            let blocks = retry_with_delay(
                || self.repo.list_children(block_id),
                REMOTE_CALL_MAX_ATTEMPTS,
                REMOTE_CALL_RETRY_DELAY,
            )
            .await?;

            let mut markdown = String::new();

            for block in &blocks {
                match &block.payload {
                    BlockPayload::Paragraph { paragraph } => {
                        let text = render_spans(&paragraph.rich_text);
                        if text.trim().is_empty() {
                            markdown.push('\n');
                        } else {
                            markdown.push_str(&text);
                            markdown.push_str("\n\n");
                        }
                    }

                    BlockPayload::Heading1 { heading_1 } => {
                        markdown.push_str(&format!("# {}\n\n", render_spans(&heading_1.rich_text)));
                    }
                    BlockPayload::Heading2 { heading_2 } => {
                        markdown.push_str(&format!("## {}\n\n", render_spans(&heading_2.rich_text)));
                    }
                    BlockPayload::Heading3 { heading_3 } => {
                        markdown
                            .push_str(&format!("### {}\n\n", render_spans(&heading_3.rich_text)));
                    }

                    BlockPayload::BulletedListItem { bulleted_list_item } => {
                        let text = render_spans(&bulleted_list_item.rich_text);
                        if !text.trim().is_empty() {
                            markdown.push_str(&format!("- {}\n", text));
                        }
                        self.append_indented_children(block, depth, &mut markdown)
                            .await?;
                    }

                    BlockPayload::NumberedListItem { numbered_list_item } => {
                        // Always a literal "1."; downstream renderers
                        // re-number ordered lists.
                        let text = render_spans(&numbered_list_item.rich_text);
                        if !text.trim().is_empty() {
                            markdown.push_str(&format!("1. {}\n", text));
                        }
                        self.append_indented_children(block, depth, &mut markdown)
                            .await?;
                    }

                    BlockPayload::Quote { quote } => {
                        markdown.push_str(&format!("> {}\n\n", render_spans(&quote.rich_text)));
                    }

                    BlockPayload::Code { code } => {
                        markdown.push_str(&format!(
                            "```{}\n{}\n```\n\n",
                            code.language,
                            plain_text(&code.rich_text)
                        ));
                    }

                    BlockPayload::Divider => {
                        markdown.push_str("---\n\n");
                    }

                    BlockPayload::Image { image } => {
                        // No resolvable URL means nothing worth emitting.
                        if let Some(url) = image.url() {
                            let caption = plain_text(&image.caption);
                            markdown.push_str(&format!("![{}]({})\n\n", caption, url));
                        }
                    }

                    BlockPayload::Callout { callout } => {
                        let emoji = match &callout.icon {
                            Some(Icon::Emoji { emoji }) => emoji.as_str(),
                            _ => CALLOUT_FALLBACK_EMOJI,
                        };
                        markdown.push_str(&format!(
                            "> {} {}\n\n",
                            emoji,
                            render_spans(&callout.rich_text)
                        ));
                    }

                    BlockPayload::Toggle { toggle } => {
                        markdown.push_str(&format!(
                            "<details>\n<summary>{}</summary>\n\n",
                            render_spans(&toggle.rich_text)
                        ));
                        if block.has_children {
                            let child = self.walk(&block.id, depth + 1).await?;
                            markdown.push_str(&child);
                        }
                        markdown.push_str("\n</details>\n\n");
                    }

                    BlockPayload::Table => {
                        if block.has_children {
                            let rows = self.walk(&block.id, depth + 1).await?;
                            if !rows.is_empty() {
                                markdown.push_str(&rows);
                                markdown.push_str("\n\n");
                            }
                        }
                    }

                    BlockPayload::TableRow { table_row } => {
                        let cells: Vec<String> =
                            table_row.cells.iter().map(|cell| plain_text(cell)).collect();
                        markdown.push_str(&format!("| {} |\n", cells.join(" | ")));
                    }

                    BlockPayload::Other => {
                        // Unknown kinds carry no marker of their own, but
                        // their children must not be lost.
                        if block.has_children {
                            let child = self.walk(&block.id, depth + 1).await?;
                            markdown.push_str(&child);
                        }
                    }
                }
            }

            Ok(markdown.trim().to_string())
        }
        .boxed()
    }

    /// Walks a list item's children and appends them indented two spaces,
    /// terminated with a newline so the next sibling starts on its own
    /// line.
    async fn append_indented_children(
        &self,
        block: &Block,
        depth: usize,
        markdown: &mut String,
    ) -> Result<(), AppError> {
        if !block.has_children {
            return Ok(());
        }
        let child = self.walk(&block.id, depth + 1).await?;
        if !child.is_empty() {
            markdown.push_str(&indent_two_spaces(&child));
        }
        Ok(())
    }
}

/// Prefixes every line with two spaces; the result ends with a newline.
fn indent_two_spaces(text: &str) -> String {
    text.lines().map(|line| format!("  {}\n", line)).collect()
}
