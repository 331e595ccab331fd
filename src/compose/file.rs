//! Docker Compose file parsing utilities

use serde::Serialize;
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

/// What the status report shows for one compose service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Published ports as `host:container`
    pub ports: Vec<String>,
}

/// Reads service summaries from a compose file. A missing or unparsable file
/// yields an empty list.
pub fn read_services(path: &Path) -> Vec<ServiceSummary> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_services(&content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Compose file not readable");
            Vec::new()
        }
    }
}

/// Parses the `services` section of a compose document, in file order
pub fn parse_services(content: &str) -> Vec<ServiceSummary> {
    let document: Value = match serde_yaml::from_str(content) {
        Ok(document) => document,
        Err(e) => {
            debug!(error = %e, "Compose file is not valid YAML");
            return Vec::new();
        }
    };

    let Some(services) = document.get("services").and_then(Value::as_mapping) else {
        return Vec::new();
    };

    services
        .iter()
        .filter_map(|(name, service)| {
            let name = name.as_str()?.to_string();
            let image = service
                .get("image")
                .and_then(Value::as_str)
                .map(String::from);
            let ports = service
                .get("ports")
                .and_then(Value::as_sequence)
                .map(|ports| ports.iter().filter_map(port_mapping).collect())
                .unwrap_or_default();

            Some(ServiceSummary { name, image, ports })
        })
        .collect()
}

fn port_mapping(port: &Value) -> Option<String> {
    match port {
        Value::String(short) => Some(short.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Mapping(_) => {
            let target = scalar(port.get("target")?)?;
            match port.get("published").and_then(scalar) {
                Some(published) => Some(format!("{}:{}", published, target)),
                None => Some(target),
            }
        }
        _ => None,
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
