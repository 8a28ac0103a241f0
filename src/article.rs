// src/article.rs
//! The local article: a Markdown file with a YAML front-matter header.
//!
//! The front-matter layout is a contract with the display layer that
//! parses these files back; field order and the omit-when-absent rules
//! must stay exactly as emitted here.

use crate::error::AppError;
use crate::types::ArticleId;
use std::path::{Path, PathBuf};

/// A fully-assembled article, ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub date: String,
    pub read_time: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

impl Article {
    /// The article's file name within the articles directory.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.id)
    }

    /// Renders the complete file content: front matter, blank line, body.
    ///
    /// `category` and `tags` are omitted entirely when absent; an empty
    /// `tags:` line would read back as a single empty tag.
    pub fn render(&self) -> String {
        let mut front_matter = format!(
            "---\ntitle: {}\ndate: {}\nreadTime: {}",
            escape_yaml_value(&self.title),
            self.date,
            self.read_time
        );

        if let Some(category) = &self.category {
            front_matter.push_str(&format!("\ncategory: {}", escape_yaml_value(category)));
        }

        if !self.tags.is_empty() {
            front_matter.push_str(&format!("\ntags: {}", self.tags.join(", ")));
        }

        front_matter.push_str("\n---\n\n");
        front_matter + &self.body
    }

    /// Writes the article into the directory, creating it if needed.
    pub fn write_to(&self, articles_dir: &Path) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(articles_dir)?;
        let path = articles_dir.join(self.file_name());
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}

/// Quotes a YAML value when it would otherwise break parsing: a colon,
/// newline, or double quote in the value.
fn escape_yaml_value(value: &str) -> String {
    if value.contains(':') || value.contains('\n') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article() -> Article {
        Article {
            id: ArticleId::new("1735689600000-abc123def"),
            title: "Hi".to_string(),
            date: "2025年1月1日".to_string(),
            read_time: "1 分钟".to_string(),
            category: None,
            tags: Vec::new(),
            body: "Hello".to_string(),
        }
    }

    #[test]
    fn renders_minimal_front_matter() {
        assert_eq!(
            article().render(),
            "---\ntitle: Hi\ndate: 2025年1月1日\nreadTime: 1 分钟\n---\n\nHello"
        );
    }

    #[test]
    fn renders_category_and_tags_when_present() {
        let mut a = article();
        a.category = Some("随笔".to_string());
        a.tags = vec!["rust".to_string(), "notion".to_string()];

        assert_eq!(
            a.render(),
            "---\ntitle: Hi\ndate: 2025年1月1日\nreadTime: 1 分钟\ncategory: 随笔\ntags: rust, notion\n---\n\nHello"
        );
    }

    #[test]
    fn title_with_colon_is_quoted() {
        let mut a = article();
        a.title = "Rust: a retrospective".to_string();
        assert!(a.render().contains("title: \"Rust: a retrospective\""));
    }

    #[test]
    fn title_with_quotes_escapes_them() {
        let mut a = article();
        a.title = "the \"best\" tool".to_string();
        assert!(a.render().contains("title: \"the \\\"best\\\" tool\""));
    }

    #[test]
    fn write_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("articles");

        let path = article().write_to(&target).unwrap();
        assert_eq!(path, target.join("1735689600000-abc123def.md"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("---\ntitle: Hi\n"));
        assert!(content.ends_with("Hello"));
    }
}
