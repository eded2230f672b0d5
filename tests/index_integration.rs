use folio_core::index::{Article, IndexEngine, IndexError};
use std::path::Path;
use tempfile::TempDir;

fn article(id: &str, dir: &Path, content: &str) -> Article {
    Article {
        id: id.to_string(),
        path: dir.join(format!("{id}.md")),
        content: content.to_string(),
        title: None,
        keywords: None,
    }
}

#[tokio::test]
async fn index_then_get_returns_metadata() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let mut a = article("id-1", tmpdir.path(), "Some plain content");
    a.title = Some("Explicit Title".to_string());
    a.keywords = Some("tag1,tag2".to_string());
    engine.index_article(&a).await?;

    let meta = engine.get("id-1").await?.expect("article should be indexed");
    assert_eq!(meta.id, "id-1");
    assert_eq!(meta.path, a.path);
    assert_eq!(meta.title.as_deref(), Some("Explicit Title"));
    assert_eq!(meta.keywords.as_deref(), Some("tag1,tag2"));

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn title_derived_from_first_heading() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let a = article("id-1", tmpdir.path(), "# Hello\nWorld about cats");
    engine.index_article(&a).await?;

    let meta = engine.get("id-1").await?.unwrap();
    assert_eq!(meta.title.as_deref(), Some("Hello"));

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn explicit_title_wins_over_heading() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let mut a = article("id-1", tmpdir.path(), "# Heading Title\nBody");
    a.title = Some("Supplied Title".to_string());
    engine.index_article(&a).await?;

    let meta = engine.get("id-1").await?.unwrap();
    assert_eq!(meta.title.as_deref(), Some("Supplied Title"));

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn untitled_article_stays_untitled() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let a = article("id-1", tmpdir.path(), "no heading here\n## only level two");
    engine.index_article(&a).await?;

    let meta = engine.get("id-1").await?.unwrap();
    assert_eq!(meta.title, None);

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn reindex_same_id_replaces_all_fields() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let mut a = article("id-1", tmpdir.path(), "# Old\nOld body");
    a.keywords = Some("old".to_string());
    engine.index_article(&a).await?;

    let mut updated = article("id-1", tmpdir.path(), "# New\nNew body");
    updated.keywords = Some("new".to_string());
    engine.index_article(&updated).await?;

    let meta = engine.get("id-1").await?.unwrap();
    assert_eq!(meta.title.as_deref(), Some("New"));
    assert_eq!(meta.keywords.as_deref(), Some("new"));

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn deindex_removes_article() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    let a = article("id-1", tmpdir.path(), "# Gone Soon\nBody");
    engine.index_article(&a).await?;
    assert!(engine.get("id-1").await?.is_some());

    engine.deindex_article("id-1").await?;
    assert!(engine.get("id-1").await?.is_none());

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn deindex_unknown_id_is_not_an_error() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    engine.deindex_article("never-indexed").await?;

    engine.close().await;
    Ok(())
}

#[tokio::test]
async fn capability_is_fixed_across_reopens() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let db_path = tmpdir.path().join("index.db");

    let engine = IndexEngine::open(&db_path).await?;
    let first = engine.capability();
    engine.close().await;

    let reopened = IndexEngine::open(&db_path).await?;
    assert_eq!(reopened.capability(), first);

    reopened.close().await;
    Ok(())
}

#[tokio::test]
async fn close_twice_is_safe() -> Result<(), IndexError> {
    let tmpdir = TempDir::new().unwrap();
    let engine = IndexEngine::open(&tmpdir.path().join("index.db")).await?;

    engine.close().await;
    engine.close().await;

    Ok(())
}
