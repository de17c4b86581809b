use aspect_store::store::StorageRoot;
use aspect_store::types::ValidationProcess;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const BAR: &str = r#"@prefix samm: <urn:samm:org.eclipse.esmf.samm:meta-model:2.1.0#> .
@prefix samm-c: <urn:samm:org.eclipse.esmf.samm:characteristic:2.1.0#> .
@prefix : <urn:samm:acme:1.0.0#> .

:Bar a samm:Aspect ;
   samm:properties ( :level ) ;
   samm:operations ( ) .

:level a samm:Property ;
   samm:characteristic samm-c:Text .
"#;

/// Aspect declaring `urn:samm:<namespace>:<version>#<name>`.
pub fn aspect(namespace: &str, version: &str, name: &str) -> String {
    format!(
        "@prefix samm: <urn:samm:org.eclipse.esmf.samm:meta-model:2.1.0#> .\n\
         @prefix : <urn:samm:{}:{}#> .\n\
         \n\
         :{} a samm:Aspect ;\n   samm:properties ( ) ;\n   samm:operations ( ) .\n",
        namespace, version, name
    )
}

pub fn root(temp: &TempDir, process: ValidationProcess, dir: &str) -> StorageRoot {
    let path = temp.path().join(dir);
    fs::create_dir_all(&path).unwrap();
    StorageRoot::new(process, path)
}

pub fn models_root(temp: &TempDir) -> StorageRoot {
    root(temp, ValidationProcess::Models, "models")
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
