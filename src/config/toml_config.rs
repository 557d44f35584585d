use crate::core::builder::ProjectBuilder;
use crate::domain::model::ResourceType;
use crate::utils::error::{ProjectError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_OUTPUT_PATH: &str = "./manifests";

/// Project description loaded from a TOML file.
///
/// ```toml
/// [project]
/// namespace = "default"
///
/// [workflow]
/// path = "hello.sw.json"
/// properties = "application.properties"
///
/// [[resources]]
/// path = "specs/openapi.json"
/// type = "openapi"
///
/// [output]
/// path = "./manifests"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    pub workflow: WorkflowSection,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub output: OutputSection,
    /// Relative paths resolve against this directory.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSection {
    pub path: String,
    pub properties: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// Key in the resource group, defaults to the file name.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            name: None,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl ResourceEntry {
    /// 解析 `path[=type]` 形式的命令列參數
    ///
    /// Only a suffix naming a known resource type is split off; any other
    /// `=` belongs to the path.
    pub fn from_arg(arg: &str) -> Result<Self> {
        let (path, resource_type) = match arg.rsplit_once('=') {
            Some((path, tag)) if tag.parse::<ResourceType>().is_ok() => {
                (path, Some(tag.trim().to_string()))
            }
            _ => (arg, None),
        };
        validate_path("resource", path)?;

        Ok(Self {
            path: path.to_string(),
            resource_type,
            name: None,
        })
    }

    pub fn parsed_type(&self) -> Result<Option<ResourceType>> {
        self.resource_type
            .as_deref()
            .map(str::parse::<ResourceType>)
            .transpose()
    }
}

impl ProjectConfig {
    /// Configuration for a single workflow file, everything else defaulted.
    pub fn for_workflow(path: impl Into<String>) -> Self {
        Self {
            project: ProjectSection::default(),
            workflow: WorkflowSection {
                path: path.into(),
                properties: None,
            },
            resources: Vec::new(),
            output: OutputSection::default(),
            base_dir: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ProjectError::config(format!("TOML parsing error: {}", e)))
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output.path)
    }

    /// Registers every configured input on a fresh builder. Files are read
    /// here; read failures surface when the builder is materialized.
    pub fn into_builder(&self) -> Result<ProjectBuilder> {
        self.validate()?;

        let mut builder = ProjectBuilder::new(self.project.namespace.clone())
            .with_workflow_file(self.resolve(&self.workflow.path));

        if let Some(name) = &self.project.name {
            builder = builder.named(name.clone());
        }

        if let Some(properties) = &self.workflow.properties {
            builder = builder.with_properties_file(self.resolve(properties));
        }

        for entry in &self.resources {
            let resource_type = entry.parsed_type()?;
            let path = self.resolve(&entry.path);
            builder = match &entry.name {
                Some(name) => builder.add_resource_file_named(name.clone(), path, resource_type),
                None => builder.add_resource_file(path, resource_type),
            };
        }

        Ok(builder)
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("project.namespace", &self.project.namespace)?;
        if let Some(name) = &self.project.name {
            validate_non_empty_string("project.name", name)?;
        }
        validate_path("workflow.path", &self.workflow.path)?;
        if let Some(properties) = &self.workflow.properties {
            validate_path("workflow.properties", properties)?;
        }
        for (index, entry) in self.resources.iter().enumerate() {
            validate_path(&format!("resources[{}].path", index), &entry.path)?;
            entry.parsed_type()?;
        }
        validate_path("output.path", &self.output.path)?;
        Ok(())
    }
}
