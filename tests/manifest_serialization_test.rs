use std::cell::RefCell;
use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::TempDir;
use workflowproj::core::serializer::{write_manifests, MANIFEST_FILE_EXTENSION};
use workflowproj::domain::ports::Storage;
use workflowproj::{LocalStorage, Manifest, ProjectBuilder, ProjectError, ResourceType};

fn fixture(relative: &str) -> File {
    File::open(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/testdata/workflows")
            .join(relative),
    )
    .unwrap()
}

fn decode_all(dir: &std::path::Path) -> Vec<Manifest> {
    let mut manifests = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.to_string_lossy().ends_with(MANIFEST_FILE_EXTENSION) {
            let contents = fs::read_to_string(&path).unwrap();
            let manifest = Manifest::from_yaml(&contents).unwrap();
            assert!(!manifest.type_meta().api_version.is_empty());
            assert!(!manifest.type_meta().kind.is_empty());
            manifests.push(manifest);
        }
    }
    manifests
}

#[test]
fn test_workflow_service_and_props_and_spec_save_as() {
    let builder = ProjectBuilder::new("default")
        .with_workflow(fixture("workflow-service.sw.json"))
        .with_properties(fixture("application.properties"))
        .add_resource("myopenapi.json", fixture("specs/workflow-service-openapi.json"))
        .add_resource_typed(
            "schema.json",
            fixture("specs/workflow-service-schema.json"),
            ResourceType::Generic,
        );

    let project = builder.materialize().unwrap();
    assert!(project.properties().is_some());
    assert!(!project.resources().is_empty());

    let temp_dir = TempDir::new().unwrap();
    let written = builder.serialize_to_directory(temp_dir.path()).unwrap();
    assert_eq!(written.len(), 4);
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 4);

    let manifests = decode_all(temp_dir.path());
    assert_eq!(manifests.len(), 4);

    let flow = manifests
        .iter()
        .find_map(|m| match m {
            Manifest::SonataFlow(flow) => Some(flow),
            _ => None,
        })
        .unwrap();
    assert_eq!(flow.metadata.name, "service");
    assert_eq!(flow.metadata.namespace.as_deref(), Some("default"));
    assert_eq!(
        flow.metadata.annotations[&ResourceType::OpenApi.annotation_key()],
        "service-openapis"
    );
    assert_eq!(
        flow.metadata.annotations[&ResourceType::Generic.annotation_key()],
        "service-genericres"
    );
    assert_eq!(flow.spec.flow["start"], "Greet");
    assert!(flow.spec.flow.get("id").is_none());

    let config_map_names: Vec<&str> = manifests
        .iter()
        .filter_map(|m| match m {
            Manifest::ConfigMap(config_map) => Some(config_map.metadata.name.as_str()),
            _ => None,
        })
        .collect();
    assert!(config_map_names.contains(&"service-props"));
    assert!(config_map_names.contains(&"service-openapis"));
    assert!(config_map_names.contains(&"service-genericres"));
}

#[test]
fn test_workflow_service_save_as() {
    let builder = ProjectBuilder::new("default").with_workflow(fixture("workflow-service.sw.json"));
    assert!(builder.materialize().is_ok());

    let temp_dir = TempDir::new().unwrap();
    builder.serialize_to_directory(temp_dir.path()).unwrap();

    let files: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["01-sonataflow_service.yaml".to_string()]);

    let manifests = decode_all(temp_dir.path());
    assert!(matches!(manifests[0], Manifest::SonataFlow(_)));
}

#[test]
fn test_workflow_props_and_one_resource_writes_three_files() {
    let builder = ProjectBuilder::new("default")
        .with_workflow(fixture("workflow-minimal.sw.json"))
        .with_properties(fixture("application.properties"))
        .add_resource("myopenapi.json", fixture("specs/workflow-service-openapi.json"));

    let temp_dir = TempDir::new().unwrap();
    builder.serialize_to_directory(temp_dir.path()).unwrap();

    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 3);

    let props = fs::read_to_string(temp_dir.path().join("02-configmap_hello-props.yaml")).unwrap();
    let Manifest::ConfigMap(config_map) = Manifest::from_yaml(&props).unwrap() else {
        panic!("expected a ConfigMap");
    };
    assert!(config_map.data["application.properties"].contains("quarkus.log.level=INFO"));

    let openapis =
        fs::read_to_string(temp_dir.path().join("03-configmap_hello-openapis.yaml")).unwrap();
    let Manifest::ConfigMap(config_map) = Manifest::from_yaml(&openapis).unwrap() else {
        panic!("expected a ConfigMap");
    };
    assert!(config_map.data["myopenapi.json"].contains("\"openapi\": \"3.0.3\""));
}

#[test]
fn test_serialize_invalid_project_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let err = ProjectBuilder::new("default")
        .with_workflow(fixture("workflow-minimal-invalid.sw.json"))
        .serialize_to_directory(temp_dir.path())
        .unwrap_err();

    assert!(matches!(err, ProjectError::ParseError { .. }));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_serialize_into_unwritable_target_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let err = ProjectBuilder::new("default")
        .with_workflow(fixture("workflow-minimal.sw.json"))
        .serialize_to_directory(&blocker)
        .unwrap_err();

    assert!(matches!(err, ProjectError::IoError(_)));
}

/// Accepts a fixed number of writes, then fails.
struct FlakyStorage {
    inner: LocalStorage,
    remaining: RefCell<usize>,
}

impl Storage for FlakyStorage {
    fn write_file(&self, file_name: &str, data: &[u8]) -> workflowproj::Result<PathBuf> {
        let mut remaining = self.remaining.borrow_mut();
        if *remaining == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        *remaining -= 1;
        self.inner.write_file(file_name, data)
    }
}

#[test]
fn test_partial_writes_are_kept() {
    let temp_dir = TempDir::new().unwrap();
    let project = ProjectBuilder::new("default")
        .with_workflow(fixture("workflow-minimal.sw.json"))
        .with_properties(fixture("application.properties"))
        .add_resource("myopenapi.json", fixture("specs/workflow-service-openapi.json"))
        .materialize()
        .unwrap();

    let storage = FlakyStorage {
        inner: LocalStorage::new(temp_dir.path()),
        remaining: RefCell::new(2),
    };

    let err = write_manifests(&project, &storage).unwrap_err();
    assert!(matches!(err, ProjectError::IoError(_)));

    let mut files: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec!["01-sonataflow_hello.yaml", "02-configmap_hello-props.yaml"]
    );
}

#[test]
fn test_decoded_workflow_keeps_declared_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let workflow = r#"{
        "id": "hello",
        "name": "Hello World",
        "description": "Inject a greeting",
        "annotations": ["team-a"],
        "start": "A",
        "states": [{"name": "A", "type": "inject", "end": true}]
    }"#;

    ProjectBuilder::new("default")
        .with_workflow(workflow.as_bytes())
        .serialize_to_directory(temp_dir.path())
        .unwrap();

    let contents = fs::read_to_string(temp_dir.path().join("01-sonataflow_hello.yaml")).unwrap();
    let Manifest::SonataFlow(flow) = Manifest::from_yaml(&contents).unwrap() else {
        panic!("expected a SonataFlow");
    };

    assert_eq!(flow.metadata.annotations["sonataflow.org/name"], "Hello World");
    assert_eq!(
        flow.metadata.annotations["sonataflow.org/description"],
        "Inject a greeting"
    );
    assert_eq!(flow.spec.flow["annotations"][0], "team-a");
    assert!(flow.spec.flow.get("name").is_none());
}
