use crate::core::workflow::flow_of;
use crate::domain::manifest::{ConfigMap, Manifest, ObjectMeta, SonataFlow, APPLICATION_PROPERTIES_KEY};
use crate::domain::model::{Project, PropertiesArtifact, ResourceGroup, Workflow, WORKFLOW_APP_LABEL};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use base64::{engine::general_purpose, Engine};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const MANIFEST_FILE_EXTENSION: &str = ".yaml";

/// Converts every entity of the project into its manifest: workflow first,
/// then properties, then resource groups in project order.
pub fn to_manifests(project: &Project) -> Vec<Manifest> {
    let namespace = project.namespace();
    let workflow = project.workflow();

    let mut manifests = vec![Manifest::SonataFlow(workflow_manifest(workflow, namespace))];

    if let Some(properties) = project.properties() {
        manifests.push(Manifest::ConfigMap(properties_manifest(
            properties,
            &workflow.name,
            namespace,
        )));
    }

    for group in project.resources() {
        manifests.push(Manifest::ConfigMap(resource_group_manifest(
            group,
            &workflow.name,
            namespace,
        )));
    }

    manifests
}

/// `01-sonataflow_hello.yaml`
pub fn manifest_file_name(position: usize, manifest: &Manifest) -> String {
    format!(
        "{:02}-{}_{}{}",
        position,
        manifest.type_meta().kind.to_ascii_lowercase(),
        manifest.metadata().name,
        MANIFEST_FILE_EXTENSION
    )
}

/// Writes one manifest file per entity. Stops at the first failure; files
/// already written stay where they are.
pub fn write_manifests<S: Storage>(project: &Project, storage: &S) -> Result<Vec<PathBuf>> {
    let manifests = to_manifests(project);
    let mut written = Vec::with_capacity(manifests.len());

    for (index, manifest) in manifests.iter().enumerate() {
        let file_name = manifest_file_name(index + 1, manifest);
        let yaml = manifest.to_yaml()?;
        let path = storage.write_file(&file_name, yaml.as_bytes())?;
        tracing::info!("Wrote {} manifest to {}", manifest.type_meta().kind, path.display());
        written.push(path);
    }

    Ok(written)
}

fn object_meta(name: &str, workflow_name: &str, namespace: &str) -> ObjectMeta {
    let mut labels = BTreeMap::new();
    labels.insert(WORKFLOW_APP_LABEL.to_string(), workflow_name.to_string());

    ObjectMeta {
        name: name.to_string(),
        namespace: if namespace.is_empty() {
            None
        } else {
            Some(namespace.to_string())
        },
        labels,
        annotations: BTreeMap::new(),
    }
}

fn workflow_manifest(workflow: &Workflow, namespace: &str) -> SonataFlow {
    let mut metadata = object_meta(&workflow.name, &workflow.name, namespace);
    metadata.annotations = workflow.annotations.clone();
    SonataFlow::new(metadata, flow_of(&workflow.document))
}

fn properties_manifest(properties: &PropertiesArtifact, workflow_name: &str, namespace: &str) -> ConfigMap {
    let mut config_map = ConfigMap::new(object_meta(&properties.name, workflow_name, namespace));
    config_map
        .data
        .insert(APPLICATION_PROPERTIES_KEY.to_string(), properties.source.clone());
    config_map
}

fn resource_group_manifest(group: &ResourceGroup, workflow_name: &str, namespace: &str) -> ConfigMap {
    let mut config_map = ConfigMap::new(object_meta(&group.name, workflow_name, namespace));
    for (filename, payload) in &group.data {
        match std::str::from_utf8(payload) {
            Ok(text) => {
                config_map.data.insert(filename.clone(), text.to_string());
            }
            Err(_) => {
                config_map
                    .binary_data
                    .insert(filename.clone(), general_purpose::STANDARD.encode(payload));
            }
        }
    }
    config_map
}
