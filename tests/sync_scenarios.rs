//! End-to-end sync scenarios against an in-memory fake workspace.
//!
//! The fake repository stands in for the Notion API; everything below it
//! (conversion, image localization, state tracking, reconciliation) runs
//! for real against a temporary directory.

use async_trait::async_trait;
use indexmap::IndexMap;
use notion2blog::{
    ApiToken, AppError, ArticleId, Block, BlockPayload, DateValue, ExternalFile, ImageContent,
    ImageFetcher, NotionId, NotionRepository, Page, Parent, PropertyValue, RichTextContent,
    RichTextItem, SyncConfig, SyncReport, SyncState, SyncStateStore, Synchronizer,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeRepository {
    pages: Vec<Page>,
    children: HashMap<NotionId, Vec<Block>>,
}

#[async_trait]
impl NotionRepository for FakeRepository {
    async fn search_pages(&self) -> Result<Vec<Page>, AppError> {
        Ok(self.pages.clone())
    }

    async fn list_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        Ok(self.children.get(parent).cloned().unwrap_or_default())
    }
}

struct ServingFetcher;

#[async_trait]
impl ImageFetcher for ServingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, AppError> {
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

fn nid(n: u8) -> NotionId {
    NotionId::parse(&format!("{:032x}", n)).unwrap()
}

fn database_id() -> NotionId {
    NotionId::parse("11111111222233334444555555555555").unwrap()
}

fn test_config(root: &Path) -> SyncConfig {
    SyncConfig {
        token: ApiToken::new("secret_test_token").unwrap(),
        database_id: database_id(),
        articles_dir: root.join("articles"),
        images_dir: root.join("images"),
        state_file: root.join("state.json"),
    }
}

fn page(n: u8, title: &str, date: Option<&str>, edited: &str) -> Page {
    let mut properties = IndexMap::new();
    properties.insert(
        "Title".to_string(),
        PropertyValue::Title {
            title: vec![RichTextItem::plain(title)],
        },
    );
    if let Some(date) = date {
        properties.insert(
            "Date".to_string(),
            PropertyValue::Date {
                date: Some(DateValue {
                    start: date.to_string(),
                }),
            },
        );
    }

    Page {
        id: nid(n),
        parent: Some(Parent {
            parent_type: Some("database_id".to_string()),
            database_id: Some(database_id()),
        }),
        properties,
        created_time: "2025-01-01T00:00:00Z".parse().unwrap(),
        last_edited_time: edited.parse().unwrap(),
    }
}

fn paragraph(n: u8, text: &str) -> Block {
    Block {
        id: nid(n),
        has_children: false,
        payload: BlockPayload::Paragraph {
            paragraph: RichTextContent {
                rich_text: vec![RichTextItem::plain(text)],
            },
        },
    }
}

fn bulleted(n: u8, text: &str, has_children: bool) -> Block {
    Block {
        id: nid(n),
        has_children,
        payload: BlockPayload::BulletedListItem {
            bulleted_list_item: RichTextContent {
                rich_text: vec![RichTextItem::plain(text)],
            },
        },
    }
}

async fn run(repo: &FakeRepository, config: &SyncConfig, full_sync: bool) -> SyncReport {
    let fetcher = ServingFetcher;
    Synchronizer::new(repo, &fetcher, config)
        .run(full_sync)
        .await
        .unwrap()
}

fn article_files(config: &SyncConfig) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(&config.articles_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn load_state(config: &SyncConfig) -> SyncState {
    SyncStateStore::new(&config.state_file).load().unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_new_document_becomes_article_with_front_matter() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let repo = FakeRepository {
        pages: vec![page(1, "Hi", Some("2025-01-01"), "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![paragraph(10, "Hello")])]),
    };

    let report = run(&repo, &config, false).await;
    assert_eq!(report.created, 1);
    assert_eq!(report.total, 1);

    let files = article_files(&config);
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(config.articles_dir.join(&files[0])).unwrap();
    assert_eq!(
        content,
        "---\ntitle: Hi\ndate: 2025年1月1日\nreadTime: 1 分钟\n---\n\nHello"
    );
}

#[tokio::test]
async fn scenario_b_bulleted_children_stay_in_original_order() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let repo = FakeRepository {
        pages: vec![page(1, "List", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([
            (nid(1), vec![bulleted(10, "first", true), bulleted(11, "second", true)]),
            (nid(10), vec![paragraph(20, "alpha")]),
            (nid(11), vec![paragraph(21, "beta")]),
        ]),
    };

    run(&repo, &config, false).await;

    let files = article_files(&config);
    let content = std::fs::read_to_string(config.articles_dir.join(&files[0])).unwrap();
    let body = content.split_once("---\n\n").unwrap().1;
    assert_eq!(body, "- first\n  alpha\n- second\n  beta");
}

#[tokio::test]
async fn scenario_c_external_image_is_localized_on_first_sync() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let image = Block {
        id: nid(10),
        has_children: false,
        payload: BlockPayload::Image {
            image: ImageContent {
                caption: vec![RichTextItem::plain("cap")],
                file: None,
                external: Some(ExternalFile {
                    url: "https://x/a.png".to_string(),
                }),
            },
        },
    };
    let repo = FakeRepository {
        pages: vec![page(1, "Pics", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![image])]),
    };

    run(&repo, &config, false).await;

    let state = load_state(&config);
    let article_id = state.synced_pages.get(&nid(1)).unwrap().clone();
    let expected_ref = format!("/images/articles/{}-1.png", article_id);

    let files = article_files(&config);
    let content = std::fs::read_to_string(config.articles_dir.join(&files[0])).unwrap();
    assert!(
        content.contains(&format!("![cap]({})", expected_ref)),
        "body should reference the localized image: {}",
        content
    );
    let image_path = config
        .images_dir
        .join(format!("{}-1.png", article_id));
    assert!(image_path.exists());
    assert!(std::fs::metadata(image_path).unwrap().len() > 0);
}

#[tokio::test]
async fn scenario_d_second_run_without_changes_skips_everything() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let repo = FakeRepository {
        pages: vec![
            page(1, "One", None, "2025-01-02T00:00:00Z"),
            page(2, "Two", None, "2025-01-03T00:00:00Z"),
        ],
        children: HashMap::from([
            (nid(1), vec![paragraph(10, "a")]),
            (nid(2), vec![paragraph(11, "b")]),
        ]),
    };

    let first = run(&repo, &config, false).await;
    assert_eq!(first.created, 2);
    let cutoff_after_first = load_state(&config).last_sync_time;

    let second = run(&repo, &config, false).await;
    assert_eq!(second.skipped, second.total);
    assert_eq!(second.created + second.updated + second.deleted, 0);
    assert_eq!(load_state(&config).last_sync_time, cutoff_after_first);
}

#[tokio::test]
async fn edited_page_is_updated_in_place() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let mut repo = FakeRepository {
        pages: vec![page(1, "Post", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![paragraph(10, "draft")])]),
    };

    run(&repo, &config, false).await;
    let files_before = article_files(&config);

    // Remote edit after the first sync's cutoff.
    repo.pages = vec![page(1, "Post", None, "2099-01-01T00:00:00Z")];
    repo.children
        .insert(nid(1), vec![paragraph(10, "published")]);

    let report = run(&repo, &config, false).await;
    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 0);

    let files_after = article_files(&config);
    assert_eq!(files_before, files_after, "article id must stay stable");
    let content =
        std::fs::read_to_string(config.articles_dir.join(&files_after[0])).unwrap();
    assert!(content.ends_with("published"));
}

#[tokio::test]
async fn full_sync_reprocesses_but_keeps_assigned_ids() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let repo = FakeRepository {
        pages: vec![page(1, "Post", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![paragraph(10, "body")])]),
    };

    run(&repo, &config, false).await;
    let id_before = load_state(&config).synced_pages.get(&nid(1)).unwrap().clone();

    let report = run(&repo, &config, true).await;
    assert_eq!(report.updated, 1);

    let id_after = load_state(&config).synced_pages.get(&nid(1)).unwrap().clone();
    assert_eq!(id_before, id_after);
    assert_eq!(article_files(&config).len(), 1);
}

#[tokio::test]
async fn remotely_deleted_page_removes_local_article() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let mut repo = FakeRepository {
        pages: vec![
            page(1, "Keep", None, "2025-01-02T00:00:00Z"),
            page(2, "Drop", None, "2025-01-02T00:00:00Z"),
        ],
        children: HashMap::from([
            (nid(1), vec![paragraph(10, "keep")]),
            (nid(2), vec![paragraph(11, "drop")]),
        ]),
    };

    run(&repo, &config, false).await;
    assert_eq!(article_files(&config).len(), 2);
    let dropped_id = load_state(&config).synced_pages.get(&nid(2)).unwrap().clone();

    repo.pages.remove(1);
    let report = run(&repo, &config, false).await;
    assert_eq!(report.deleted, 1);

    let state = load_state(&config);
    assert!(state.synced_pages.get(&nid(2)).is_none());
    assert!(state.synced_pages.get(&nid(1)).is_some());
    assert_eq!(article_files(&config).len(), 1);
    assert!(!config
        .articles_dir
        .join(format!("{}.md", dropped_id))
        .exists());
}

#[tokio::test]
async fn empty_remote_result_never_deletes_anything() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let mut repo = FakeRepository {
        pages: vec![page(1, "Post", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![paragraph(10, "body")])]),
    };

    run(&repo, &config, false).await;
    let state_before = load_state(&config);
    assert_eq!(state_before.synced_pages.len(), 1);

    // A token revocation or outage can make search come back empty; that
    // must never wipe the local articles.
    repo.pages.clear();
    let report = run(&repo, &config, false).await;
    assert_eq!(report.deleted, 0);
    assert_eq!(report.total, 0);

    assert_eq!(article_files(&config).len(), 1);
    let state_after = load_state(&config);
    assert_eq!(state_after.synced_pages.len(), 1);
    assert_eq!(state_after.last_sync_time, state_before.last_sync_time);
}

#[tokio::test]
async fn page_with_empty_body_is_skipped_not_created() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let repo = FakeRepository {
        pages: vec![page(1, "Empty", None, "2025-01-02T00:00:00Z")],
        children: HashMap::new(),
    };

    let report = run(&repo, &config, false).await;
    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 0);
    assert!(article_files(&config).is_empty());
    // Nothing changed, so there is no state file yet.
    assert_eq!(load_state(&config), SyncState::default());
}

#[tokio::test]
async fn pages_outside_the_configured_database_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());

    let mut foreign = page(3, "Foreign", None, "2025-01-02T00:00:00Z");
    foreign.parent = Some(Parent {
        parent_type: Some("database_id".to_string()),
        database_id: Some(nid(99)),
    });
    let mut orphan = page(4, "Orphan", None, "2025-01-02T00:00:00Z");
    orphan.parent = None;

    let repo = FakeRepository {
        pages: vec![page(1, "Mine", None, "2025-01-02T00:00:00Z"), foreign, orphan],
        children: HashMap::from([
            (nid(1), vec![paragraph(10, "mine")]),
            (nid(3), vec![paragraph(11, "foreign")]),
            (nid(4), vec![paragraph(12, "orphan")]),
        ]),
    };

    let report = run(&repo, &config, false).await;
    assert_eq!(report.total, 1);
    assert_eq!(report.created, 1);
    assert_eq!(article_files(&config).len(), 1);
}

#[tokio::test]
async fn assigned_article_id_is_stable_across_runs() {
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    let mut repo = FakeRepository {
        pages: vec![page(1, "Post", None, "2025-01-02T00:00:00Z")],
        children: HashMap::from([(nid(1), vec![paragraph(10, "v1")])]),
    };

    run(&repo, &config, false).await;
    let id_first: ArticleId = load_state(&config).synced_pages.get(&nid(1)).unwrap().clone();

    for edit_year in [2096, 2097, 2098] {
        repo.pages = vec![page(
            1,
            "Post",
            None,
            &format!("{}-01-01T00:00:00Z", edit_year),
        )];
        run(&repo, &config, false).await;
        let id_now = load_state(&config).synced_pages.get(&nid(1)).unwrap().clone();
        assert_eq!(id_now, id_first);
    }
}
