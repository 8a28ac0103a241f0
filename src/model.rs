// src/model.rs
//! Domain model for remote documents and their content blocks.
//!
//! Types deserialize straight from Notion API JSON. Unknown block types
//! and property types collapse into explicit `Other` variants so future
//! API additions degrade gracefully instead of failing a whole sync run.

use crate::types::NotionId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rich text
// ---------------------------------------------------------------------------

/// One styled text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RichTextItem {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl RichTextItem {
    /// A bare, unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Default::default()
        }
    }
}

/// Independent, composable style flags on a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A node in the remote document tree.
///
/// Children are never embedded in the payload; when `has_children` is set
/// they must be fetched with a separate paginated listing call keyed by
/// `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NotionId,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: BlockPayload,
}

impl Block {
    /// Block type name for logging.
    pub fn block_type(&self) -> &'static str {
        match self.payload {
            BlockPayload::Paragraph { .. } => "paragraph",
            BlockPayload::Heading1 { .. } => "heading_1",
            BlockPayload::Heading2 { .. } => "heading_2",
            BlockPayload::Heading3 { .. } => "heading_3",
            BlockPayload::BulletedListItem { .. } => "bulleted_list_item",
            BlockPayload::NumberedListItem { .. } => "numbered_list_item",
            BlockPayload::Quote { .. } => "quote",
            BlockPayload::Code { .. } => "code",
            BlockPayload::Divider => "divider",
            BlockPayload::Image { .. } => "image",
            BlockPayload::Callout { .. } => "callout",
            BlockPayload::Toggle { .. } => "toggle",
            BlockPayload::Table => "table",
            BlockPayload::TableRow { .. } => "table_row",
            BlockPayload::Other => "unsupported",
        }
    }
}

/// The typed payload of a block, tagged by the API's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockPayload {
    Paragraph {
        paragraph: RichTextContent,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: RichTextContent,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: RichTextContent,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: RichTextContent,
    },
    BulletedListItem {
        bulleted_list_item: RichTextContent,
    },
    NumberedListItem {
        numbered_list_item: RichTextContent,
    },
    Quote {
        quote: RichTextContent,
    },
    Code {
        code: CodeContent,
    },
    Divider,
    Image {
        image: ImageContent,
    },
    Callout {
        callout: CalloutContent,
    },
    Toggle {
        toggle: RichTextContent,
    },
    /// Row content lives in the table's children; the table payload itself
    /// carries only layout hints this engine does not use.
    Table,
    TableRow {
        table_row: TableRowContent,
    },
    /// Any block kind this engine does not render. If it has children they
    /// are still walked so the content inside is not lost.
    #[serde(other)]
    Other,
}

/// Text-bearing block content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RichTextContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
}

/// Code block content with its declared language tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodeContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default)]
    pub language: String,
}

/// Image block content: a Notion-hosted file, an external link, or (from
/// older API versions) both fields present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageContent {
    #[serde(default)]
    pub caption: Vec<RichTextItem>,
    #[serde(default)]
    pub file: Option<HostedFile>,
    #[serde(default)]
    pub external: Option<ExternalFile>,
}

impl ImageContent {
    /// The source URL: the hosted-file URL wins over the external URL.
    pub fn url(&self) -> Option<&str> {
        self.file
            .as_ref()
            .map(|f| f.url.as_str())
            .or_else(|| self.external.as_ref().map(|e| e.url.as_str()))
    }
}

/// A file hosted by Notion; its URL is pre-signed and expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default)]
    pub expiry_time: Option<DateTime<Utc>>,
}

/// A file referenced by external URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

/// Callout content: styled text plus an optional icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalloutContent {
    #[serde(default)]
    pub rich_text: Vec<RichTextItem>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

/// Callout icon. Only emoji icons render; uploaded icon files fall back to
/// the default emoji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    #[serde(other)]
    Other,
}

/// One table row: a grid of rich-text cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableRowContent {
    #[serde(default)]
    pub cells: Vec<Vec<RichTextItem>>,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// A remote document: one row of the configured database.
///
/// Read-only from this system's perspective; never mutated remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: NotionId,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
}

impl Page {
    /// Whether this page belongs to the given database.
    ///
    /// Checks both the tagged form (`type == "database_id"`) and a bare
    /// `database_id` field, mirroring the two shapes the API has produced.
    pub fn belongs_to_database(&self, database_id: &NotionId) -> bool {
        let Some(parent) = &self.parent else {
            return false;
        };
        match parent.parent_type.as_deref() {
            Some("database_id") => parent.database_id.as_ref() == Some(database_id),
            _ => parent.database_id.as_ref() == Some(database_id),
        }
    }
}

/// The parent reference of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Parent {
    #[serde(rename = "type", default)]
    pub parent_type: Option<String>,
    #[serde(default)]
    pub database_id: Option<NotionId>,
}

/// A typed page property value, tagged by the API's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichTextItem>,
    },
    Date {
        date: Option<DateValue>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    CreatedTime {
        created_time: DateTime<Utc>,
    },
    LastEditedTime {
        last_edited_time: DateTime<Utc>,
    },
    #[serde(other)]
    Other,
}

/// A date property value. `start` may be a bare date or a full timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

/// A select or multi-select option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_paragraph_block_from_wire_json() {
        let json = r#"{
            "object": "block",
            "id": "216cd412-8533-8087-a989-cf37889137c3",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [
                    {
                        "type": "text",
                        "plain_text": "Hello",
                        "href": null,
                        "annotations": {"bold": true, "italic": false, "strikethrough": false, "underline": false, "code": false, "color": "default"}
                    }
                ],
                "color": "default"
            }
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.block_type(), "paragraph");
        let BlockPayload::Paragraph { paragraph } = &block.payload else {
            panic!("expected paragraph payload");
        };
        assert_eq!(paragraph.rich_text[0].plain_text, "Hello");
        assert!(paragraph.rich_text[0].annotations.bold);
    }

    #[test]
    fn unknown_block_type_becomes_other_but_keeps_children_flag() {
        let json = r#"{
            "id": "216cd412-8533-8087-a989-cf37889137c3",
            "type": "synced_block",
            "has_children": true,
            "synced_block": {"synced_from": null}
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.payload, BlockPayload::Other);
        assert!(block.has_children);
    }

    #[test]
    fn image_url_prefers_hosted_file_over_external() {
        let both = ImageContent {
            caption: vec![],
            file: Some(HostedFile {
                url: "https://files.notion.so/a.png".to_string(),
                expiry_time: None,
            }),
            external: Some(ExternalFile {
                url: "https://x/b.png".to_string(),
            }),
        };
        assert_eq!(both.url(), Some("https://files.notion.so/a.png"));

        let external_only = ImageContent {
            file: None,
            ..both.clone()
        };
        assert_eq!(external_only.url(), Some("https://x/b.png"));

        let neither = ImageContent::default();
        assert_eq!(neither.url(), None);
    }

    #[test]
    fn parses_page_with_typed_properties() {
        let json = r#"{
            "object": "page",
            "id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
            "created_time": "2025-01-01T00:00:00.000Z",
            "last_edited_time": "2025-01-02T03:04:05.000Z",
            "parent": {"type": "database_id", "database_id": "11111111-2222-3333-4444-555555555555"},
            "properties": {
                "Title": {"id": "title", "type": "title", "title": [{"plain_text": "Hi"}]},
                "Date": {"id": "d", "type": "date", "date": {"start": "2025-01-01"}},
                "分类": {"id": "s", "type": "select", "select": {"id": "o", "name": "随笔", "color": "blue"}},
                "Tags": {"id": "m", "type": "multi_select", "multi_select": [{"name": "rust"}, {"name": "notion"}]},
                "Priority": {"id": "n", "type": "number", "number": 5}
            }
        }"#;

        let page: Page = serde_json::from_str(json).unwrap();
        let db = NotionId::parse("11111111222233334444555555555555").unwrap();
        assert!(page.belongs_to_database(&db));
        assert_eq!(page.properties.len(), 5);
        assert_eq!(page.properties["Priority"], PropertyValue::Other);
        let PropertyValue::MultiSelect { multi_select } = &page.properties["Tags"] else {
            panic!("expected multi_select");
        };
        assert_eq!(multi_select[1].name, "notion");
    }

    #[test]
    fn page_without_parent_belongs_nowhere() {
        let json = r#"{
            "id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
            "created_time": "2025-01-01T00:00:00.000Z",
            "last_edited_time": "2025-01-01T00:00:00.000Z"
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        let db = NotionId::parse("11111111222233334444555555555555").unwrap();
        assert!(!page.belongs_to_database(&db));
    }
}
