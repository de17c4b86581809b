use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::thread;

use aspect_store::error::ErrorKind;
use aspect_store::store::{LocalFolderStore, ModelStore};
use aspect_store::types::ValidationProcess;
use tempfile::TempDir;

use crate::integration::support::{aspect, models_root, root, write_file, BAR};

#[test]
fn listing_groups_models_and_keeps_empty_versions() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    write_file(root.path(), "acme.example/1.0.0/Foo.ttl", BAR);
    fs::create_dir_all(root.path().join("acme.example").join("2.0.0")).unwrap();

    let listing = LocalFolderStore::new()
        .list_all_namespaces(true, &root)
        .unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("acme.example:1.0.0".to_string(), vec!["Foo.ttl".to_string()]);
    expected.insert("acme.example:2.0.0".to_string(), Vec::new());
    assert_eq!(listing, expected);
}

#[test]
fn cached_listing_stays_stale_until_refresh() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    store.save(None, None, BAR, &root).unwrap();

    let first = store.list_all_namespaces(false, &root).unwrap();
    store
        .save(None, None, &aspect("acme", "1.0.0", "Baz"), &root)
        .unwrap();
    let second = store.list_all_namespaces(false, &root).unwrap();
    assert_eq!(first, second);
    assert_eq!(second["acme:1.0.0"], vec!["Bar.ttl".to_string()]);

    let refreshed = store.list_all_namespaces(true, &root).unwrap();
    assert_eq!(
        refreshed["acme:1.0.0"],
        vec!["Bar.ttl".to_string(), "Baz.ttl".to_string()]
    );
    assert_eq!(store.list_all_namespaces(false, &root).unwrap(), refreshed);
}

#[test]
fn empty_cache_rescans_without_refresh_flag() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();

    assert!(store.list_all_namespaces(false, &root).unwrap().is_empty());
    store.save(None, None, BAR, &root).unwrap();
    assert_eq!(store.list_all_namespaces(false, &root).unwrap().len(), 1);
}

#[test]
fn listings_are_cached_per_root() {
    let temp = TempDir::new().unwrap();
    let models = models_root(&temp);
    let import = root(&temp, ValidationProcess::Import, "import-package");
    let store = LocalFolderStore::new();
    store.save(None, None, BAR, &models).unwrap();
    store
        .save(None, None, &aspect("other", "3.0.0", "Imported"), &import)
        .unwrap();

    let from_models = store.list_all_namespaces(true, &models).unwrap();
    let from_import = store.list_all_namespaces(true, &import).unwrap();

    assert!(from_models.contains_key("acme:1.0.0"));
    assert!(from_import.contains_key("other:3.0.0"));
    assert_eq!(store.list_all_namespaces(false, &models).unwrap(), from_models);
}

#[test]
fn marker_and_stray_files_stay_out_of_the_listing() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = LocalFolderStore::new();
    store.save(None, None, BAR, &root).unwrap();
    store
        .save(Some("acme:1.0.0"), Some("latest.ttl"), BAR, &root)
        .unwrap();
    write_file(root.path(), "Loose.ttl", BAR);
    write_file(root.path(), "acme/1.0.0/README.md", "docs");

    let listing = store.list_all_namespaces(true, &root).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing["acme:1.0.0"], vec!["Bar.ttl".to_string()]);

    let stray = store.list_non_turtle_files(&root).unwrap();
    assert_eq!(stray.len(), 1);
    assert!(stray[0].ends_with("README.md"));
}

#[test]
fn missing_root_is_not_found() {
    let temp = TempDir::new().unwrap();
    let root = aspect_store::store::StorageRoot::new(
        ValidationProcess::Migration,
        temp.path().join("migration"),
    );
    let err = LocalFolderStore::new()
        .list_all_namespaces(true, &root)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn concurrent_refreshes_all_see_a_complete_listing() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());
    for i in 0..10 {
        store
            .save(None, None, &aspect("acme", "1.0.0", &format!("Model{}", i)), &root)
            .unwrap();
    }

    let mut handles = vec![];
    for i in 0..8 {
        let store = store.clone();
        let root = root.clone();
        handles.push(thread::spawn(move || {
            store.list_all_namespaces(i % 2 == 0, &root).unwrap()
        }));
    }
    for handle in handles {
        let listing = handle.join().unwrap();
        assert_eq!(listing["acme:1.0.0"].len(), 10);
    }
}

#[test]
fn deleting_a_root_drops_its_cached_listing() {
    let temp = TempDir::new().unwrap();
    let export = root(&temp, ValidationProcess::Export, "export-package");
    let store = LocalFolderStore::new();
    write_file(export.path(), "acme/1.0.0/Bar.ttl", BAR);
    assert!(store
        .list_all_namespaces(false, &export)
        .unwrap()
        .contains_key("acme:1.0.0"));

    store.delete_directory(export.path()).unwrap();
    write_file(export.path(), "other/2.0.0/Other.ttl", BAR);

    let listing = store.list_all_namespaces(false, &export).unwrap();
    assert!(!listing.contains_key("acme:1.0.0"));
    assert!(listing.contains_key("other:2.0.0"));
}
