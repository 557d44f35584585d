use crate::utils::error::{ProjectError, Result};
use serde_json::Value;

/// Keys carried as manifest metadata instead of in `spec.flow`.
pub const IDENTITY_FIELDS: [&str; 4] = ["id", "name", "description", "version"];

/// Structural view of a workflow document, enough to name and annotate it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDocument {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub expression_lang: Option<String>,
    pub document: Value,
}

impl WorkflowDocument {
    /// The document without its identity fields, as carried in `spec.flow`.
    pub fn flow(&self) -> Value {
        flow_of(&self.document)
    }
}

/// Strips [`IDENTITY_FIELDS`] from a full workflow document.
pub fn flow_of(document: &Value) -> Value {
    let mut flow = document.clone();
    if let Value::Object(map) = &mut flow {
        for field in IDENTITY_FIELDS {
            map.remove(field);
        }
    }
    flow
}

/// 解析 workflow 文件 (JSON 或 YAML)
pub fn parse_workflow(bytes: &[u8]) -> Result<WorkflowDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ProjectError::parse(format!("workflow is not valid UTF-8: {}", e)))?;

    let document = parse_structured(text)
        .map_err(|message| ProjectError::parse(format!("workflow is not well-formed: {}", message)))?;

    let Value::Object(map) = &document else {
        return Err(ProjectError::parse("workflow document must be a mapping"));
    };

    let id = match map.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::String(_)) => return Err(ProjectError::parse("workflow `id` cannot be empty")),
        Some(_) => return Err(ProjectError::parse("workflow `id` must be a string")),
        None => return Err(ProjectError::parse("workflow is missing the required `id` field")),
    };

    match map.get("states") {
        Some(Value::Array(states)) if !states.is_empty() => {}
        Some(Value::Array(_)) => {
            return Err(ProjectError::parse(format!(
                "workflow '{}' must declare at least one state",
                id
            )))
        }
        Some(_) => {
            return Err(ProjectError::parse(format!(
                "workflow '{}' has a `states` field that is not a list",
                id
            )))
        }
        None => {
            return Err(ProjectError::parse(format!(
                "workflow '{}' is missing the required `states` field",
                id
            )))
        }
    }

    let name = optional_string(map.get("name"));
    let description = optional_string(map.get("description"));
    let version = optional_string(map.get("version"));
    let expression_lang = optional_string(map.get("expressionLang"));

    tracing::debug!("Parsed workflow document '{}'", id);

    Ok(WorkflowDocument {
        id,
        name,
        description,
        version,
        expression_lang,
        document,
    })
}

/// JSON when the document opens with `{`, YAML otherwise.
pub(crate) fn parse_structured(text: &str) -> std::result::Result<Value, String> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| e.to_string())
    }
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
