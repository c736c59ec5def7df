//! Service-schema validation.
//!
//! Works on an untyped `serde_json::Value` and never fails: every violation is collected into a
//! [`SchemaError`] with a path such as `/services[2]/type`. An empty report means the document is
//! valid. Only two conditions stop the pass early, because nothing below them can be checked:
//! a non-object root and a missing or non-array `services`.

use crate::registry::TypeRegistry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub fn validate_service_schema(doc: &Value, registry: &TypeRegistry) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    let Some(root) = doc.as_object() else {
        errors.push(SchemaError::new("/", "root must be an object"));
        return errors;
    };

    optional_str(root, "version", "", &mut errors);

    let Some(services) = root.get("services").and_then(Value::as_array) else {
        errors.push(SchemaError::new("/services", "services must be an array"));
        return errors;
    };

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (idx, service) in services.iter().enumerate() {
        let path = format!("/services[{idx}]");
        let Some(service) = service.as_object() else {
            errors.push(SchemaError::new(path, "service must be an object"));
            continue;
        };

        if let Some(id) = required_str(service, "id", &path, &mut errors) {
            if !seen_ids.insert(id) {
                errors.push(SchemaError::new(
                    format!("{path}/id"),
                    format!("duplicate service id \"{id}\""),
                ));
            }
        }

        required_str(service, "name", &path, &mut errors);

        if let Some(ty) = required_str(service, "type", &path, &mut errors) {
            if !registry.is_node_type(ty) {
                errors.push(SchemaError::new(
                    format!("{path}/type"),
                    format!("unknown service type \"{ty}\""),
                ));
            }
        }

        optional_str(service, "namespace", &path, &mut errors);

        match service.get("integrations") {
            None | Some(Value::Null) => {}
            Some(Value::Array(integrations)) => {
                for (j, integration) in integrations.iter().enumerate() {
                    validate_integration(
                        integration,
                        &format!("{path}/integrations[{j}]"),
                        registry,
                        &mut errors,
                    );
                }
            }
            Some(_) => errors.push(SchemaError::new(
                format!("{path}/integrations"),
                "integrations must be an array",
            )),
        }
    }

    errors
}

fn validate_integration(
    integration: &Value,
    path: &str,
    registry: &TypeRegistry,
    errors: &mut Vec<SchemaError>,
) {
    let Some(integration) = integration.as_object() else {
        errors.push(SchemaError::new(path, "integration must be an object"));
        return;
    };

    required_str(integration, "target", path, errors);

    if let Some(ty) = optional_str(integration, "type", path, errors) {
        if !registry.is_integration_type(ty) {
            errors.push(SchemaError::new(
                format!("{path}/type"),
                format!("unknown integration type \"{ty}\""),
            ));
        }
    }

    optional_str(integration, "label", path, errors);
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<SchemaError>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        None | Some(Value::Null) => {
            errors.push(SchemaError::new(
                format!("{path}/{key}"),
                format!("{key} is required"),
            ));
            None
        }
        Some(_) => {
            errors.push(SchemaError::new(
                format!("{path}/{key}"),
                format!("{key} must be a string"),
            ));
            None
        }
    }
}

/// `null` counts as absent.
fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<SchemaError>,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        None | Some(Value::Null) => None,
        Some(_) => {
            errors.push(SchemaError::new(
                format!("{path}/{key}"),
                format!("{key} must be a string"),
            ));
            None
        }
    }
}
