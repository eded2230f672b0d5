use folio_core::store::{ArticleStore, StoreError};
use tempfile::TempDir;

#[test]
fn create_then_read_round_trips_content() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let content = "# Title\n\nSome body text with *emphasis*.";
    let (id, path) = store.create(content)?;

    assert_eq!(store.read(&path)?, content);
    assert_eq!(path, store.path_for(&id));

    Ok(())
}

#[test]
fn file_stem_matches_generated_id() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let (id, path) = store.create("content")?;

    assert_eq!(path.file_stem().unwrap().to_str().unwrap(), id);
    assert_eq!(path.extension().unwrap(), "md");

    Ok(())
}

#[test]
fn generated_ids_are_unique() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let (id1, _) = store.create("first")?;
    let (id2, _) = store.create("second")?;

    assert_ne!(id1, id2);

    Ok(())
}

#[test]
fn update_overwrites_existing_content() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let (_, path) = store.create("old content")?;
    store.update(&path, "new content")?;

    assert_eq!(store.read(&path)?, "new content");

    Ok(())
}

#[test]
fn read_missing_file_is_not_found() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let missing = store.path_for("no-such-id");
    let result = store.read(&missing);

    assert!(matches!(result, Err(StoreError::NotFound(_))));

    Ok(())
}

#[test]
fn delete_removes_file() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let (_, path) = store.create("to delete")?;
    store.delete(&path)?;

    assert!(!path.exists());
    assert!(matches!(store.read(&path), Err(StoreError::NotFound(_))));

    Ok(())
}

#[test]
fn delete_missing_file_is_not_found() -> Result<(), StoreError> {
    let tmpdir = TempDir::new().unwrap();
    let store = ArticleStore::new(tmpdir.path())?;

    let missing = store.path_for("already-gone");
    let result = store.delete(&missing);

    assert!(matches!(result, Err(StoreError::NotFound(_))));

    Ok(())
}
