use crate::adapters::storage::LocalStorage;
use crate::core::classifier::{classify, group_by_type};
use crate::core::naming::derive_names;
use crate::core::properties::parse_properties;
use crate::core::serializer::write_manifests;
use crate::core::workflow::parse_workflow;
use crate::domain::model::{
    Project, PropertiesArtifact, ResourceGroup, ResourceType, Workflow, DEFAULT_PROFILE,
    DESCRIPTION_ANNOTATION, EXPRESSION_LANG_ANNOTATION, NAME_ANNOTATION, PROFILE_ANNOTATION,
    VERSION_ANNOTATION,
};
use crate::utils::error::{ProjectError, Result};
use crate::utils::validation::validate_object_name;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A read that failed at registration time, replayed by `materialize`.
#[derive(Debug, Clone)]
struct ReadFailure {
    source: String,
    kind: io::ErrorKind,
    message: String,
}

impl ReadFailure {
    fn to_error(&self) -> ProjectError {
        ProjectError::IoError(io::Error::new(
            self.kind,
            format!("failed to read {}: {}", self.source, self.message),
        ))
    }
}

type PendingInput = std::result::Result<Vec<u8>, ReadFailure>;

#[derive(Debug, Clone)]
enum TypeHint {
    Inferred,
    Explicit(ResourceType),
    Tagged(String),
}

#[derive(Debug, Clone)]
struct PendingResource {
    filename: String,
    payload: PendingInput,
    hint: TypeHint,
}

/// Accumulates the inputs of a workflow project and materializes them into a
/// [`Project`].
///
/// Every input is read once, when it is registered, and the reader is dropped
/// right away. Read failures are kept and returned by [`materialize`], which is
/// the only place errors surface.
///
/// [`materialize`]: ProjectBuilder::materialize
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    namespace: String,
    name: Option<String>,
    workflow: Option<PendingInput>,
    properties: Option<PendingInput>,
    resources: Vec<PendingResource>,
}

impl ProjectBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: None,
            workflow: None,
            properties: None,
            resources: Vec::new(),
        }
    }

    /// Overrides the base name derived from the workflow `id`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_workflow<R: Read>(mut self, reader: R) -> Self {
        self.workflow = Some(read_source("workflow", reader));
        self
    }

    pub fn with_workflow_file(mut self, path: impl AsRef<Path>) -> Self {
        self.workflow = Some(read_path(path.as_ref()));
        self
    }

    pub fn with_properties<R: Read>(mut self, reader: R) -> Self {
        self.properties = Some(read_source("properties", reader));
        self
    }

    pub fn with_properties_file(mut self, path: impl AsRef<Path>) -> Self {
        self.properties = Some(read_path(path.as_ref()));
        self
    }

    /// Registers a resource whose type is inferred at materialization.
    pub fn add_resource<R: Read>(self, filename: impl Into<String>, reader: R) -> Self {
        self.push_resource(filename.into(), reader, TypeHint::Inferred)
    }

    pub fn add_resource_typed<R: Read>(
        self,
        filename: impl Into<String>,
        reader: R,
        resource_type: ResourceType,
    ) -> Self {
        self.push_resource(filename.into(), reader, TypeHint::Explicit(resource_type))
    }

    /// Registers a resource with a type given by tag (`"openapi"`, `"generic"`).
    /// An unknown tag fails materialization with a validation error.
    pub fn add_resource_tagged<R: Read>(
        self,
        filename: impl Into<String>,
        reader: R,
        tag: impl Into<String>,
    ) -> Self {
        self.push_resource(filename.into(), reader, TypeHint::Tagged(tag.into()))
    }

    /// Registers a resource from disk, keyed by the file's name.
    pub fn add_resource_file(
        self,
        path: impl AsRef<Path>,
        resource_type: Option<ResourceType>,
    ) -> Self {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add_resource_file_named(filename, path, resource_type)
    }

    /// Registers a resource from disk under an explicit key.
    pub fn add_resource_file_named(
        mut self,
        filename: impl Into<String>,
        path: impl AsRef<Path>,
        resource_type: Option<ResourceType>,
    ) -> Self {
        let hint = resource_type.map_or(TypeHint::Inferred, TypeHint::Explicit);
        self.resources.push(PendingResource {
            filename: filename.into(),
            payload: read_path(path.as_ref()),
            hint,
        });
        self
    }

    fn push_resource<R: Read>(mut self, filename: String, reader: R, hint: TypeHint) -> Self {
        let payload = read_source(&format!("resource '{}'", filename), reader);
        self.resources.push(PendingResource {
            filename,
            payload,
            hint,
        });
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the project. Deterministic: the builder is left untouched, so
    /// calling it again yields an identical project.
    ///
    /// Without [`named`](ProjectBuilder::named) the base name is the workflow
    /// `id` lowercased (`helloWorld` becomes `helloworld`). The base and every
    /// name derived from it must be valid Kubernetes object names; an `id`
    /// such as `hello_world` is rejected with a validation error.
    pub fn materialize(&self) -> Result<Project> {
        // 1. workflow
        let workflow_bytes = match &self.workflow {
            None => return Err(ProjectError::validation("workflow is required")),
            Some(Err(failure)) => return Err(failure.to_error()),
            Some(Ok(bytes)) => bytes,
        };
        let document = parse_workflow(workflow_bytes)?;

        // 未指定名稱時以小寫的 workflow id 為基礎
        let base = self
            .name
            .clone()
            .unwrap_or_else(|| document.id.to_lowercase());
        validate_object_name("project name", &base)?;

        let properties_entries = match &self.properties {
            None => None,
            Some(Err(failure)) => return Err(failure.to_error()),
            Some(Ok(bytes)) => {
                let entries = parse_properties(bytes)?;
                let source = String::from_utf8_lossy(bytes).into_owned();
                Some((source, entries))
            }
        };

        // 2. resources
        let mut classified = Vec::with_capacity(self.resources.len());
        for pending in &self.resources {
            let payload = pending.payload.as_ref().map_err(ReadFailure::to_error)?;
            let explicit = match &pending.hint {
                TypeHint::Inferred => None,
                TypeHint::Explicit(resource_type) => Some(*resource_type),
                TypeHint::Tagged(tag) => Some(tag.parse::<ResourceType>()?),
            };
            classified.push(classify(&pending.filename, payload.clone(), explicit)?);
        }
        let buckets = group_by_type(classified);

        // 3. names and cross references
        let names = derive_names(&base, buckets.iter().map(|bucket| bucket.resource_type));
        if properties_entries.is_some() {
            validate_object_name("properties name", &names.properties)?;
        }
        for group_name in names.resource_groups.values() {
            validate_object_name("resource group name", group_name)?;
        }

        let mut annotations = BTreeMap::new();
        let declared = [
            (NAME_ANNOTATION, &document.name),
            (DESCRIPTION_ANNOTATION, &document.description),
            (VERSION_ANNOTATION, &document.version),
            (EXPRESSION_LANG_ANNOTATION, &document.expression_lang),
        ];
        for (key, value) in declared {
            if let Some(value) = value {
                annotations.insert(key.to_string(), value.clone());
            }
        }
        annotations.insert(PROFILE_ANNOTATION.to_string(), DEFAULT_PROFILE.to_string());
        annotations.extend(names.annotations.clone());

        // 4. assemble
        let resources = buckets
            .into_iter()
            .map(|bucket| ResourceGroup {
                name: names.resource_groups[&bucket.resource_type].clone(),
                resource_type: bucket.resource_type,
                data: bucket.data,
            })
            .collect::<Vec<_>>();

        let properties = properties_entries.map(|(source, entries)| PropertiesArtifact {
            name: names.properties.clone(),
            source,
            entries,
        });

        let workflow = Workflow {
            name: names.workflow.clone(),
            id: document.id.clone(),
            document: document.document,
            annotations,
        };

        tracing::debug!(
            "Materialized project '{}' with {} resource group(s){}",
            workflow.name,
            resources.len(),
            if properties.is_some() { " and properties" } else { "" }
        );

        Ok(Project::new(
            self.namespace.clone(),
            workflow,
            properties,
            resources,
        ))
    }

    /// Materializes the project and writes its manifests into `dir`, creating
    /// it when missing. Files written before a failure are left in place.
    pub fn serialize_to_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let project = self.materialize()?;
        let storage = LocalStorage::new(dir.as_ref());
        write_manifests(&project, &storage)
    }
}

fn read_source<R: Read>(source: &str, mut reader: R) -> PendingInput {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map(|_| buffer)
        .map_err(|e| ReadFailure {
            source: source.to_string(),
            kind: e.kind(),
            message: e.to_string(),
        })
}

fn read_path(path: &Path) -> PendingInput {
    let source = path.display().to_string();
    match File::open(path) {
        Ok(file) => read_source(&source, file),
        Err(e) => Err(ReadFailure {
            source,
            kind: e.kind(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = r#"{"id": "hello", "start": "Hello", "states": [{"name": "Hello", "type": "inject", "end": true}]}"#;
    const OPENAPI: &str = r#"{"openapi": "3.0.3", "info": {"title": "t", "version": "1"}, "paths": {}}"#;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }
    }

    #[test]
    fn test_workflow_is_required() {
        let err = ProjectBuilder::new("default").materialize().unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));
        assert!(err.to_string().contains("workflow is required"));
    }

    #[test]
    fn test_last_workflow_wins() {
        let project = ProjectBuilder::new("default")
            .with_workflow(FailingReader)
            .with_workflow(HELLO.as_bytes())
            .materialize()
            .unwrap();
        assert_eq!(project.workflow().name, "hello");
    }

    #[test]
    fn test_read_failure_surfaces_at_materialize() {
        let builder = ProjectBuilder::new("default")
            .with_workflow(HELLO.as_bytes())
            .add_resource("broken.json", FailingReader);

        let err = builder.materialize().unwrap_err();
        match err {
            ProjectError::IoError(e) => {
                assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
                assert!(e.to_string().contains("broken.json"));
            }
            other => panic!("expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_is_validation_error() {
        let err = ProjectBuilder::new("default")
            .with_workflow(HELLO.as_bytes())
            .add_resource_tagged("route.xml", "<route/>".as_bytes(), "camel")
            .materialize()
            .unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));
    }

    #[test]
    fn test_invalid_name_override_is_rejected() {
        let err = ProjectBuilder::new("default")
            .named("Not_A_Name")
            .with_workflow(HELLO.as_bytes())
            .materialize()
            .unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));
    }

    #[test]
    fn test_materialize_is_repeatable() {
        let builder = ProjectBuilder::new("default")
            .with_workflow(HELLO.as_bytes())
            .add_resource("myopenapi.json", OPENAPI.as_bytes());

        let first = builder.materialize().unwrap();
        let second = builder.materialize().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.namespace(), "default");
    }

    #[test]
    fn test_workflow_annotations() {
        let workflow = r#"{"id": "hello", "description": "Greets", "version": "1.0", "start": "A", "states": [{"name": "A"}]}"#;
        let project = ProjectBuilder::new("default")
            .with_workflow(workflow.as_bytes())
            .materialize()
            .unwrap();

        let annotations = &project.workflow().annotations;
        assert_eq!(annotations[DESCRIPTION_ANNOTATION], "Greets");
        assert_eq!(annotations[VERSION_ANNOTATION], "1.0");
        assert_eq!(annotations[PROFILE_ANNOTATION], DEFAULT_PROFILE);
        assert_eq!(project.workflow().document["id"], "hello");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ProjectBuilder::new("default")
            .with_workflow_file("/definitely/not/here.sw.json")
            .materialize()
            .unwrap_err();
        assert!(matches!(err, ProjectError::IoError(_)));
    }

    #[test]
    fn test_declared_name_is_kept() {
        let workflow = r#"{"id": "hello", "name": "Hello World", "expressionLang": "jq", "annotations": ["team-a"], "start": "A", "states": [{"name": "A"}]}"#;
        let project = ProjectBuilder::new("default")
            .with_workflow(workflow.as_bytes())
            .materialize()
            .unwrap();

        let workflow = project.workflow();
        assert_eq!(workflow.annotations[NAME_ANNOTATION], "Hello World");
        assert_eq!(workflow.annotations[EXPRESSION_LANG_ANNOTATION], "jq");
        assert_eq!(workflow.document["name"], "Hello World");
        assert_eq!(workflow.document["annotations"][0], "team-a");
    }

    #[test]
    fn test_camel_case_id_is_lowercased() {
        let workflow = r#"{"id": "helloWorld", "start": "A", "states": [{"name": "A"}]}"#;
        let project = ProjectBuilder::new("default")
            .with_workflow(workflow.as_bytes())
            .add_resource("myopenapi.json", OPENAPI.as_bytes())
            .materialize()
            .unwrap();

        assert_eq!(project.workflow().name, "helloworld");
        assert_eq!(project.workflow().id, "helloWorld");
        assert_eq!(project.resources()[0].name, "helloworld-openapis");
    }

    #[test]
    fn test_id_that_is_not_an_object_name_is_rejected() {
        let workflow = r#"{"id": "hello_world", "start": "A", "states": [{"name": "A"}]}"#;
        let err = ProjectBuilder::new("default")
            .with_workflow(workflow.as_bytes())
            .materialize()
            .unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));
    }

    #[test]
    fn test_derived_names_respect_length_limit() {
        let base = "a".repeat(250);
        let err = ProjectBuilder::new("default")
            .named(base.clone())
            .with_workflow(HELLO.as_bytes())
            .add_resource_typed("input.json", "{}".as_bytes(), ResourceType::Generic)
            .materialize()
            .unwrap_err();
        assert!(matches!(err, ProjectError::ValidationError { .. }));
        assert!(err.to_string().contains("resource group name"));

        // 沒有資源時基礎名稱本身仍然合法
        let project = ProjectBuilder::new("default")
            .named(base)
            .with_workflow(HELLO.as_bytes())
            .materialize()
            .unwrap();
        assert_eq!(project.workflow().name.len(), 250);
    }
}
