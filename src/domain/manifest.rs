//! Kubernetes object model the project is rendered into.
//!
//! Only the fields this crate writes are modelled. Every document carries
//! `apiVersion` and `kind` so that any YAML decoder can recover its type.

use crate::utils::error::{ProjectError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SONATAFLOW_API_VERSION: &str = "sonataflow.org/v1alpha08";
pub const SONATAFLOW_KIND: &str = "SonataFlow";
pub const CONFIG_MAP_API_VERSION: &str = "v1";
pub const CONFIG_MAP_KIND: &str = "ConfigMap";

/// Data key of the properties ConfigMap.
pub const APPLICATION_PROPERTIES_KEY: &str = "application.properties";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    pub api_version: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonataFlowSpec {
    pub flow: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonataFlow {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    pub spec: SonataFlowSpec,
}

impl SonataFlow {
    pub fn new(metadata: ObjectMeta, flow: serde_json::Value) -> Self {
        Self {
            type_meta: TypeMeta {
                api_version: SONATAFLOW_API_VERSION.to_string(),
                kind: SONATAFLOW_KIND.to_string(),
            },
            metadata,
            spec: SonataFlowSpec { flow },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    /// Base64 encoded payloads that are not valid UTF-8.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary_data: BTreeMap<String, String>,
}

impl ConfigMap {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            type_meta: TypeMeta {
                api_version: CONFIG_MAP_API_VERSION.to_string(),
                kind: CONFIG_MAP_KIND.to_string(),
            },
            metadata,
            data: BTreeMap::new(),
            binary_data: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    SonataFlow(SonataFlow),
    ConfigMap(ConfigMap),
}

impl Manifest {
    pub fn type_meta(&self) -> &TypeMeta {
        match self {
            Manifest::SonataFlow(flow) => &flow.type_meta,
            Manifest::ConfigMap(config_map) => &config_map.type_meta,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Manifest::SonataFlow(flow) => &flow.metadata,
            Manifest::ConfigMap(config_map) => &config_map.metadata,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            Manifest::SonataFlow(flow) => serde_yaml::to_string(flow)?,
            Manifest::ConfigMap(config_map) => serde_yaml::to_string(config_map)?,
        };
        Ok(yaml)
    }

    /// Decodes a single YAML document, dispatching on its `apiVersion`/`kind`.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let type_meta: TypeMeta = serde_yaml::from_str(content)?;
        match (type_meta.api_version.as_str(), type_meta.kind.as_str()) {
            (SONATAFLOW_API_VERSION, SONATAFLOW_KIND) => {
                Ok(Manifest::SonataFlow(serde_yaml::from_str(content)?))
            }
            (CONFIG_MAP_API_VERSION, CONFIG_MAP_KIND) => {
                Ok(Manifest::ConfigMap(serde_yaml::from_str(content)?))
            }
            (api_version, kind) => Err(ProjectError::parse(format!(
                "unsupported manifest type {}/{}",
                api_version, kind
            ))),
        }
    }
}
