// src/metadata.rs
//! Resolves article front-matter fields from a page's typed properties.
//!
//! Property names are author-chosen and the workspace is bilingual, so
//! every field resolves through an ordered list of candidate names, and
//! the first matching non-empty value wins. Read time is not a remote
//! property; it is always derived locally from the converted body.

use crate::constants::{READ_CHARS_PER_MINUTE, UNTITLED_PLACEHOLDER};
use crate::model::{Page, PropertyValue};
use chrono::{DateTime, Datelike, NaiveDate};

/// Candidate property names for the article title.
const TITLE_KEYS: &[&str] = &["标题", "Title", "title", "Name", "name"];

/// Candidate names for an explicit date property.
const DATE_KEYS: &[&str] = &["发布日期", "發布日期", "Date", "date"];

/// Candidate names for timestamp-typed properties, tried after explicit
/// dates: last-edited first, then creation time.
const TIMESTAMP_KEYS: &[&str] = &["最后编辑时间", "Last edited time", "创建时间", "created_time"];

/// Candidate names for the category select property.
const CATEGORY_KEYS: &[&str] = &["分类", "Category", "category", "分類"];

/// Candidate names for the tags multi-select property.
const TAGS_KEYS: &[&str] = &["标签", "Tags", "tags", "標籤"];

/// Front-matter fields resolved from a remote page.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleMetadata {
    pub title: String,
    /// Localized calendar string, `YYYY年M月D日`. This exact format is a
    /// contract with the pages that parse the front matter back.
    pub date: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Resolves title, date, category and tags from a page's properties.
pub fn extract_metadata(page: &Page) -> ArticleMetadata {
    ArticleMetadata {
        title: resolve_title(page),
        date: resolve_date(page),
        category: resolve_category(page),
        tags: resolve_tags(page),
    }
}

fn resolve_title(page: &Page) -> String {
    for key in TITLE_KEYS {
        if let Some(PropertyValue::Title { title }) = page.properties.get(*key) {
            if let Some(first) = title.first() {
                if !first.plain_text.is_empty() {
                    return first.plain_text.clone();
                }
            }
        }
    }
    UNTITLED_PLACEHOLDER.to_string()
}

fn resolve_date(page: &Page) -> String {
    for key in DATE_KEYS {
        if let Some(PropertyValue::Date { date: Some(value) }) = page.properties.get(*key) {
            if let Some(parsed) = parse_date_start(&value.start) {
                return calendar_string(parsed);
            }
        }
    }

    for key in TIMESTAMP_KEYS {
        match page.properties.get(*key) {
            Some(PropertyValue::LastEditedTime { last_edited_time }) => {
                return calendar_string(last_edited_time.date_naive());
            }
            Some(PropertyValue::CreatedTime { created_time }) => {
                return calendar_string(created_time.date_naive());
            }
            _ => {}
        }
    }

    calendar_string(page.created_time.date_naive())
}

fn resolve_category(page: &Page) -> Option<String> {
    for key in CATEGORY_KEYS {
        if let Some(PropertyValue::Select {
            select: Some(option),
        }) = page.properties.get(*key)
        {
            return Some(option.name.clone());
        }
    }
    None
}

fn resolve_tags(page: &Page) -> Vec<String> {
    for key in TAGS_KEYS {
        if let Some(PropertyValue::MultiSelect { multi_select }) = page.properties.get(*key) {
            return multi_select.iter().map(|t| t.name.clone()).collect();
        }
    }
    Vec::new()
}

/// A date property's `start` may be a bare date or a full timestamp.
fn parse_date_start(raw: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Formats a date as `YYYY年M月D日`, month and day unpadded.
fn calendar_string(date: NaiveDate) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}

/// Derives the `readTime` front-matter value from a converted body:
/// `ceil(non-whitespace characters / 300)` minutes.
pub fn read_time(body: &str) -> String {
    let count = body.chars().filter(|c| !c.is_whitespace()).count();
    let minutes = count.div_ceil(READ_CHARS_PER_MINUTE);
    format!("{} 分钟", minutes)
}
