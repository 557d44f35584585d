use crate::config::toml_config::{ProjectConfig, ResourceEntry};
use crate::utils::error::{ProjectError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "workflowproj")]
#[command(about = "Render a serverless workflow project into Kubernetes manifests")]
pub struct CliConfig {
    /// Path to a TOML project file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target namespace (overrides the project file)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Base name for all manifests, defaults to the workflow id
    #[arg(long)]
    pub name: Option<String>,

    /// Workflow document (JSON or YAML)
    #[arg(short, long)]
    pub workflow: Option<String>,

    /// application.properties file
    #[arg(short, long)]
    pub properties: Option<String>,

    /// Auxiliary resource as PATH or PATH=TYPE, repeatable
    #[arg(short, long = "resource", value_name = "PATH[=TYPE]")]
    pub resources: Vec<String>,

    /// Output directory for the manifests
    #[arg(short, long)]
    pub output: Option<String>,

    /// Materialize and print a summary without writing files
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Merges the project file (if any) with command line overrides.
    pub fn project_config(&self) -> Result<ProjectConfig> {
        let mut config = match (&self.config, &self.workflow) {
            (Some(path), _) => ProjectConfig::from_file(path)?,
            (None, Some(workflow)) => ProjectConfig::for_workflow(workflow.clone()),
            (None, None) => {
                return Err(ProjectError::config(
                    "either --config or --workflow is required",
                ))
            }
        };

        // 命令列路徑以目前目錄為基準
        if let Some(workflow) = &self.workflow {
            config.workflow.path = absolutize(Path::new(workflow));
        }
        if let Some(properties) = &self.properties {
            config.workflow.properties = Some(absolutize(Path::new(properties)));
        }
        if let Some(namespace) = &self.namespace {
            config.project.namespace = namespace.clone();
        }
        if let Some(name) = &self.name {
            config.project.name = Some(name.clone());
        }
        if let Some(output) = &self.output {
            config.output.path = absolutize(Path::new(output));
        }
        for arg in &self.resources {
            let mut entry = ResourceEntry::from_arg(arg)?;
            entry.path = absolutize(Path::new(&entry.path));
            config.resources.push(entry);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.config.is_none() && self.workflow.is_none() {
            return Err(ProjectError::config(
                "either --config or --workflow is required",
            ));
        }
        if let Some(namespace) = &self.namespace {
            validate_non_empty_string("--namespace", namespace)?;
        }
        for arg in &self.resources {
            ResourceEntry::from_arg(arg)?;
        }
        Ok(())
    }
}

fn absolutize(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
