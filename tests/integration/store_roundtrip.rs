use std::fs;
use std::path::PathBuf;

use aspect_store::error::ErrorKind;
use aspect_store::identifier::ModelIdentifier;
use aspect_store::store::{LocalFolderStore, ModelStore};
use aspect_store::types::LATEST_FILE_NAME;
use tempfile::TempDir;

use crate::integration::support::{models_root, BAR};

#[test]
fn save_without_identifier_derives_path_from_declared_urn() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();

    let saved = store.save(None, None, BAR, &root).unwrap();

    let expected = PathBuf::from("acme").join("1.0.0").join("Bar.ttl");
    assert_eq!(saved, expected.to_string_lossy());
    assert!(root.path().join(&expected).is_file());
}

#[test]
fn save_then_read_returns_identical_content() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    let content = format!("{}# trailing comment with ümlauts\n", BAR);

    store
        .save(Some("acme:1.0.0"), Some("Bar.ttl"), &content, &root)
        .unwrap();
    let id = ModelIdentifier::parse("acme:1.0.0:Bar.ttl");

    assert!(store.exists(&id, &root));
    assert_eq!(store.read_as_string(&id, &root).unwrap(), content);
}

#[test]
fn save_overwrites_existing_content() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();

    store
        .save(Some("acme:1.0.0"), Some("Bar.ttl"), "first", &root)
        .unwrap();
    store
        .save(Some("acme:1.0.0"), Some("Bar.ttl"), BAR, &root)
        .unwrap();

    let id = ModelIdentifier::parse("acme:1.0.0:Bar.ttl");
    assert_eq!(store.read_as_string(&id, &root).unwrap(), BAR);
}

#[test]
fn latest_marker_is_written_at_the_root() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();

    let saved = store
        .save(Some("acme:1.0.0"), Some(LATEST_FILE_NAME), BAR, &root)
        .unwrap();

    assert_eq!(saved, LATEST_FILE_NAME);
    assert!(root.path().join(LATEST_FILE_NAME).is_file());
    assert!(store.exists(&ModelIdentifier::parse(LATEST_FILE_NAME), &root));
}

#[test]
fn read_missing_or_partial_identifier_is_not_found() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    store.save(None, None, BAR, &root).unwrap();

    for token in ["acme:1.0.0:Missing.ttl", "acme:1.0.0", "acme", "a:b:c:d"] {
        let id = ModelIdentifier::parse(token);
        assert!(!store.exists(&id, &root), "{token} should not exist");
        let err = store.read_as_string(&id, &root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound, "{token}");
    }
}

#[test]
fn delete_removes_file_and_empty_ancestors_but_not_root() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    store.save(None, None, BAR, &root).unwrap();

    store.delete("acme:1.0.0", "Bar.ttl", &root).unwrap();

    let id = ModelIdentifier::parse("acme:1.0.0:Bar.ttl");
    assert!(!store.exists(&id, &root));
    assert!(!root.path().join("acme").exists());
    assert!(root.path().is_dir());
}

#[test]
fn delete_keeps_sibling_versions() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    store
        .save(Some("acme:1.0.0"), Some("Bar.ttl"), BAR, &root)
        .unwrap();
    store
        .save(Some("acme:2.0.0"), Some("Bar.ttl"), BAR, &root)
        .unwrap();

    store.delete("acme:1.0.0", "Bar.ttl", &root).unwrap();

    assert!(!root.path().join("acme").join("1.0.0").exists());
    assert!(root.path().join("acme").join("2.0.0").join("Bar.ttl").is_file());
}

#[test]
fn delete_directory_removes_whole_tree() {
    let temp = TempDir::new().unwrap();
    let store = LocalFolderStore::new();
    let export = temp.path().join("export-package");
    fs::create_dir_all(export.join("acme").join("1.0.0")).unwrap();
    fs::write(export.join("acme").join("1.0.0").join("Bar.ttl"), BAR).unwrap();

    store.delete_directory(&export).unwrap();
    assert!(!export.exists());

    store.delete_directory(&export).unwrap();
}

#[test]
fn urn_conversions() {
    let store = LocalFolderStore::new();
    assert_eq!(
        store
            .convert_file_name_to_urn("acme.example:1.0.0:Bar.ttl")
            .unwrap()
            .to_string(),
        "urn:samm:acme.example:1.0.0#Bar"
    );

    let file = PathBuf::from("models")
        .join("acme.example")
        .join("1.0.0")
        .join("Bar.ttl");
    assert_eq!(
        store.convert_file_to_urn(&file).unwrap().to_string(),
        "urn:samm:acme.example:1.0.0#Bar"
    );

    let err = store.convert_file_name_to_urn("not-a-model").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAspectModel);
}

#[test]
fn identifiers_cannot_climb_out_of_the_root() {
    let temp = TempDir::new().unwrap();
    let root = aspect_store::store::StorageRoot::new(
        aspect_store::types::ValidationProcess::Models,
        temp.path().join("base").join("models"),
    );
    fs::create_dir_all(root.path()).unwrap();
    let outside = temp.path().join("X.ttl");
    fs::write(&outside, "secret").unwrap();
    let store = LocalFolderStore::new();

    let err = store
        .read_as_string(&ModelIdentifier::parse("..:..:X.ttl"), &root)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalArgument);
    let err = store.delete("..:..", "X.ttl", &root).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalArgument);
    assert!(outside.is_file());
}
