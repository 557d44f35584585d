use crate::domain::model::ResourceType;
use std::collections::BTreeMap;

pub const PROPERTIES_SUFFIX: &str = "props";

/// Names derived from a project's base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNames {
    pub workflow: String,
    pub properties: String,
    pub resource_groups: BTreeMap<ResourceType, String>,
    /// Annotations the workflow carries to reference its resource groups.
    pub annotations: BTreeMap<String, String>,
}

pub fn properties_name(base: &str) -> String {
    format!("{}-{}", base, PROPERTIES_SUFFIX)
}

pub fn resource_group_name(base: &str, resource_type: ResourceType) -> String {
    format!("{}-{}", base, resource_type.name_suffix())
}

/// Computes every derived name and cross-reference annotation. Each name
/// depends only on the base and its own type, so the order of `types` does
/// not matter.
pub fn derive_names(base: &str, types: impl IntoIterator<Item = ResourceType>) -> ProjectNames {
    let mut resource_groups = BTreeMap::new();
    let mut annotations = BTreeMap::new();

    for resource_type in types {
        let name = resource_group_name(base, resource_type);
        annotations.insert(resource_type.annotation_key(), name.clone());
        resource_groups.insert(resource_type, name);
    }

    ProjectNames {
        workflow: base.to_string(),
        properties: properties_name(base),
        resource_groups,
        annotations,
    }
}
