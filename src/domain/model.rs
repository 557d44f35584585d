use crate::utils::error::{ProjectError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 所有 annotation 與 label 共用的網域前綴
pub const ANNOTATION_DOMAIN: &str = "sonataflow.org";

pub const NAME_ANNOTATION: &str = "sonataflow.org/name";
pub const DESCRIPTION_ANNOTATION: &str = "sonataflow.org/description";
pub const VERSION_ANNOTATION: &str = "sonataflow.org/version";
pub const EXPRESSION_LANG_ANNOTATION: &str = "sonataflow.org/expressionLang";
pub const PROFILE_ANNOTATION: &str = "sonataflow.org/profile";
pub const DEFAULT_PROFILE: &str = "dev";
pub const WORKFLOW_APP_LABEL: &str = "sonataflow.org/workflow-app";

/// Semantic type of an auxiliary resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    OpenApi,
    Generic,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [ResourceType::OpenApi, ResourceType::Generic];

    pub fn tag(self) -> &'static str {
        match self {
            ResourceType::OpenApi => "openapi",
            ResourceType::Generic => "generic",
        }
    }

    /// Suffix appended to the base name for this type's group.
    pub fn name_suffix(self) -> &'static str {
        match self {
            ResourceType::OpenApi => "openapis",
            ResourceType::Generic => "genericres",
        }
    }

    /// Workflow annotation key that points at this type's resource group.
    pub fn annotation_key(self) -> String {
        format!("{}/ext-res-{}", ANNOTATION_DOMAIN, self.tag())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ResourceType {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        ResourceType::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| {
                ProjectError::validation(format!(
                    "unrecognized resource type '{}' (expected one of: {})",
                    s,
                    ResourceType::ALL.map(|t| t.tag()).join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    pub name: String,
    /// Identifier declared by the source document.
    pub id: String,
    /// The full source document, identity fields included.
    pub document: serde_json::Value,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesArtifact {
    pub name: String,
    pub source: String,
    pub entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
    pub resource_type: ResourceType,
    pub data: BTreeMap<String, Vec<u8>>,
}

/// Immutable result of [`crate::ProjectBuilder::materialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    namespace: String,
    workflow: Workflow,
    properties: Option<PropertiesArtifact>,
    resources: Vec<ResourceGroup>,
}

impl Project {
    pub(crate) fn new(
        namespace: String,
        workflow: Workflow,
        properties: Option<PropertiesArtifact>,
        resources: Vec<ResourceGroup>,
    ) -> Self {
        Self {
            namespace,
            workflow,
            properties,
            resources,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn properties(&self) -> Option<&PropertiesArtifact> {
        self.properties.as_ref()
    }

    pub fn resources(&self) -> &[ResourceGroup] {
        &self.resources
    }

    pub fn resource_group(&self, resource_type: ResourceType) -> Option<&ResourceGroup> {
        self.resources
            .iter()
            .find(|group| group.resource_type == resource_type)
    }

    /// Number of manifests [`crate::ProjectBuilder::serialize_to_directory`] writes.
    pub fn entity_count(&self) -> usize {
        1 + usize::from(self.properties.is_some()) + self.resources.len()
    }
}
