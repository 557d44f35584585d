pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::ProjectConfig;
pub use core::builder::ProjectBuilder;
pub use domain::manifest::Manifest;
pub use domain::model::{Project, PropertiesArtifact, ResourceGroup, ResourceType, Workflow};
pub use utils::error::{ProjectError, Result};
