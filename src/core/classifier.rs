use crate::core::workflow::parse_structured;
use crate::domain::model::ResourceType;
use crate::utils::error::Result;
use crate::utils::validation::validate_config_map_key;
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level keys that mark a document as an API specification.
const OPENAPI_MARKERS: [&str; 2] = ["openapi", "swagger"];

const OPENAPI_FILE_SUFFIXES: [&str; 3] = [".openapi.json", ".openapi.yaml", ".openapi.yml"];

/// A resource after its type has been settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResource {
    pub filename: String,
    pub resource_type: ResourceType,
    pub payload: Vec<u8>,
}

/// Resources of one type, before the group has a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBucket {
    pub resource_type: ResourceType,
    pub data: BTreeMap<String, Vec<u8>>,
}

/// Infers the semantic type of a resource from its content, then its file name.
pub fn infer_resource_type(filename: &str, payload: &[u8]) -> ResourceType {
    if let Some(document) = sniff_document(payload) {
        return if declares_openapi(&document) {
            ResourceType::OpenApi
        } else {
            ResourceType::Generic
        };
    }

    let lower = filename.to_ascii_lowercase();
    if OPENAPI_FILE_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        ResourceType::OpenApi
    } else {
        ResourceType::Generic
    }
}

/// Settles the type of one resource. An explicit type always wins over inference.
pub fn classify(
    filename: &str,
    payload: Vec<u8>,
    explicit: Option<ResourceType>,
) -> Result<ClassifiedResource> {
    validate_config_map_key("resource file name", filename)?;

    let resource_type = explicit.unwrap_or_else(|| infer_resource_type(filename, &payload));
    tracing::debug!("Classified resource '{}' as {}", filename, resource_type);

    Ok(ClassifiedResource {
        filename: filename.to_string(),
        resource_type,
        payload,
    })
}

/// Groups resources by type in first-seen order; a repeated file name within a
/// type keeps the last payload.
pub fn group_by_type(resources: impl IntoIterator<Item = ClassifiedResource>) -> Vec<ResourceBucket> {
    let mut buckets: Vec<ResourceBucket> = Vec::new();

    for resource in resources {
        let index = match buckets
            .iter()
            .position(|bucket| bucket.resource_type == resource.resource_type)
        {
            Some(index) => index,
            None => {
                buckets.push(ResourceBucket {
                    resource_type: resource.resource_type,
                    data: BTreeMap::new(),
                });
                buckets.len() - 1
            }
        };

        if buckets[index]
            .data
            .insert(resource.filename.clone(), resource.payload)
            .is_some()
        {
            tracing::debug!(
                "Resource '{}' registered twice as {}, keeping the last payload",
                resource.filename,
                resource.resource_type
            );
        }
    }

    buckets
}

fn sniff_document(payload: &[u8]) -> Option<Value> {
    let text = std::str::from_utf8(payload).ok()?;
    match parse_structured(text).ok()? {
        document @ Value::Object(_) => Some(document),
        _ => None,
    }
}

fn declares_openapi(document: &Value) -> bool {
    OPENAPI_MARKERS
        .iter()
        .any(|marker| document.get(marker).is_some())
}
