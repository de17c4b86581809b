use std::fs;
use std::sync::Arc;

use aspect_store::error::{ApiError, SdkError};
use aspect_store::identifier::{AspectModelUrn, ModelIdentifier};
use aspect_store::sdk::{ModelToolkit, ParsedModel, ValidationReport, Violation};
use aspect_store::service::{ModelService, PackageImporter};
use aspect_store::store::{LocalFolderStore, ModelStore};
use aspect_store::types::{ValidationProcess, LATEST_FILE_NAME};
use tempfile::TempDir;

use crate::integration::support::{aspect, models_root, root, write_file, BAR};

const UNSUPPORTED: &str = "# unsupported meta model";

/// Toolkit that flags models containing `samm:Unknown` and refuses to migrate unsupported ones.
struct FakeToolkit;

impl ModelToolkit for FakeToolkit {
    fn validate(&self, model: &ParsedModel) -> ValidationReport {
        let violations = if model.source.contains("samm:Unknown") {
            vec![Violation {
                error_code: "ERR_TYPE".to_string(),
                message: "unknown element type".to_string(),
                focus_element: None,
                fixes: vec![],
            }]
        } else {
            vec![]
        };
        ValidationReport { violations }
    }

    fn migrate(&self, model: ParsedModel) -> Result<ParsedModel, SdkError> {
        if model.source.contains(UNSUPPORTED) {
            return Err(SdkError::Migration("meta model version not supported".to_string()));
        }
        Ok(model)
    }

    fn pretty_print(&self, model: &ParsedModel, urn: &AspectModelUrn) -> String {
        format!("# migrated {}\n{}", urn, model.source)
    }
}

fn service(store: &Arc<LocalFolderStore>) -> ModelService {
    ModelService::new(store.clone(), Arc::new(FakeToolkit))
}

#[test]
fn validate_and_stash_writes_latest_marker() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());

    let report = service(&store).validate_and_stash(BAR, &root).unwrap();

    assert!(report.is_valid());
    let latest = ModelIdentifier::parse(LATEST_FILE_NAME);
    assert_eq!(store.read_as_string(&latest, &root).unwrap(), BAR);
    assert!(store.list_all_namespaces(true, &root).unwrap().is_empty());
}

#[test]
fn validate_and_stash_keeps_content_with_violations() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());
    let content = format!("{}\n:thing a samm:Unknown .\n", BAR);

    let report = service(&store).validate_and_stash(&content, &root).unwrap();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].error_code, "ERR_TYPE");
    assert!(root.path().join(LATEST_FILE_NAME).is_file());
}

#[test]
fn validate_and_stash_rejects_malformed_turtle() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());

    let err = service(&store)
        .validate_and_stash("@prefix broken <urn:x> .\n", &root)
        .unwrap_err();

    assert!(matches!(err, ApiError::Sdk(SdkError::Parse(_))));
    assert!(!root.path().join(LATEST_FILE_NAME).exists());
}

#[test]
fn create_or_save_is_visible_in_cached_listing() {
    let temp = TempDir::new().unwrap();
    let root = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());
    let service = service(&store);

    service.create_or_save(None, None, BAR, &root).unwrap();
    assert_eq!(store.list_all_namespaces(false, &root).unwrap().len(), 1);

    service
        .create_or_save(Some("acme:1.0.0"), Some("Copy.ttl"), BAR, &root)
        .unwrap();
    let listing = store.list_all_namespaces(false, &root).unwrap();
    assert_eq!(
        listing["acme:1.0.0"],
        vec!["Bar.ttl".to_string(), "Copy.ttl".to_string()]
    );
}

#[test]
fn migrate_workspace_collects_failures_and_continues() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp, ValidationProcess::Migration, "migration");
    let store = Arc::new(LocalFolderStore::new());
    store.save(None, None, BAR, &root).unwrap();
    let broken = format!("{}\n{}", UNSUPPORTED, aspect("acme", "1.0.0", "Old"));
    store.save(None, None, &broken, &root).unwrap();

    let report = service(&store).migrate_workspace(&root).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.migrated, vec!["acme:1.0.0:Bar.ttl".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].model, "acme:1.0.0:Old.ttl");

    let migrated = store
        .read_as_string(&ModelIdentifier::parse("acme:1.0.0:Bar.ttl"), &root)
        .unwrap();
    assert!(migrated.starts_with("# migrated urn:samm:acme:1.0.0#Bar"));
    let untouched = store
        .read_as_string(&ModelIdentifier::parse("acme:1.0.0:Old.ttl"), &root)
        .unwrap();
    assert_eq!(untouched, broken);
}

fn unpacked_package(temp: &TempDir) -> aspect_store::store::StorageRoot {
    let import = root(temp, ValidationProcess::Import, "import-package");
    write_file(import.path(), "acme/1.0.0/Bar.ttl", BAR);
    write_file(import.path(), "acme/1.0.0/notes.txt", "not a model");
    write_file(
        import.path(),
        "other/2.0.0/Other.ttl",
        &aspect("other", "2.0.0", "Other"),
    );
    fs::create_dir_all(import.path().join("empty").join("3.0.0")).unwrap();
    import
}

#[test]
fn import_moves_package_into_models_root() {
    let temp = TempDir::new().unwrap();
    let import = unpacked_package(&temp);
    let models = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());

    let report = PackageImporter::new(store.clone())
        .import(&import, &models, false)
        .unwrap();

    assert_eq!(
        report.imported,
        vec![
            "acme:1.0.0:Bar.ttl".to_string(),
            "other:2.0.0:Other.ttl".to_string()
        ]
    );
    assert!(report.skipped.is_empty());
    assert_eq!(report.stray_files.len(), 1);
    assert!(report.stray_files[0].ends_with("notes.txt"));

    assert!(!import.path().exists());
    assert!(models.path().join("empty").join("3.0.0").is_dir());
    let listing = store.list_all_namespaces(false, &models).unwrap();
    assert_eq!(listing.len(), 3);
    assert!(listing["empty:3.0.0"].is_empty());
}

#[test]
fn import_skips_existing_models_unless_overwriting() {
    let temp = TempDir::new().unwrap();
    let models = models_root(&temp);
    let store = Arc::new(LocalFolderStore::new());
    store
        .save(Some("acme:1.0.0"), Some("Bar.ttl"), "# kept", &models)
        .unwrap();
    let bar = ModelIdentifier::parse("acme:1.0.0:Bar.ttl");

    let import = unpacked_package(&temp);
    let report = PackageImporter::new(store.clone())
        .import(&import, &models, false)
        .unwrap();
    assert_eq!(report.skipped, vec!["acme:1.0.0:Bar.ttl".to_string()]);
    assert_eq!(store.read_as_string(&bar, &models).unwrap(), "# kept");

    let import = unpacked_package(&temp);
    let report = PackageImporter::new(store.clone())
        .import(&import, &models, true)
        .unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(store.read_as_string(&bar, &models).unwrap(), BAR);
}

#[test]
fn import_records_failed_copies_and_keeps_the_package() {
    let temp = TempDir::new().unwrap();
    let models = models_root(&temp);
    // A directory where the model file should go makes the copy fail.
    fs::create_dir_all(models.path().join("acme").join("1.0.0").join("Bar.ttl")).unwrap();
    let import = unpacked_package(&temp);
    write_file(import.path(), "a/b/1.0.0/Deep.ttl", &aspect("a", "1.0.0", "Deep"));
    let store = Arc::new(LocalFolderStore::new());

    let report = PackageImporter::new(store.clone())
        .import(&import, &models, false)
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].model, "acme:1.0.0:Bar.ttl");
    assert_eq!(report.imported, vec!["other:2.0.0:Other.ttl".to_string()]);
    assert!(import.path().join("acme").join("1.0.0").join("Bar.ttl").is_file());
    assert!(models.path().join("other").join("2.0.0").join("Other.ttl").is_file());
    assert!(!store
        .list_all_namespaces(false, &models)
        .unwrap()
        .keys()
        .any(|key| key.starts_with("ab:")));
}
