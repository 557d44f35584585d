use crate::utils::error::{ProjectError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Kubernetes 物件名稱上限 (DNS-1123 subdomain)
pub const MAX_OBJECT_NAME_LENGTH: usize = 253;

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("DNS-1123 pattern is valid")
});

static CONFIG_MAP_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._a-zA-Z0-9]+$").expect("ConfigMap key pattern is valid"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_object_name(field_name: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ProjectError::validation(format!(
            "{} cannot be empty",
            field_name
        )));
    }

    if name.len() > MAX_OBJECT_NAME_LENGTH {
        return Err(ProjectError::validation(format!(
            "{} '{}' is longer than {} characters",
            field_name, name, MAX_OBJECT_NAME_LENGTH
        )));
    }

    if !DNS1123_SUBDOMAIN.is_match(name) {
        return Err(ProjectError::validation(format!(
            "{} '{}' must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character",
            field_name, name
        )));
    }

    Ok(())
}

pub fn validate_config_map_key(field_name: &str, key: &str) -> Result<()> {
    if !CONFIG_MAP_KEY.is_match(key) || key == "." || key == ".." {
        return Err(ProjectError::validation(format!(
            "{} '{}' must consist of alphanumeric characters, '-', '_' or '.'",
            field_name, key
        )));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ProjectError::config(format!(
            "{}: path cannot be empty",
            field_name
        )));
    }

    if path.contains('\0') {
        return Err(ProjectError::config(format!(
            "{}: path contains null bytes",
            field_name
        )));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProjectError::config(format!(
            "{} cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}
