//! Variable context file loading.
//!
//! The user supplies template variables in a small configuration file:
//!
//! ```yaml
//! variables:
//!   - name: DNS_1
//!     value: 8.8.8.8
//!   - name: FW_NAME
//!     value: edge-fw
//! ```
//!
//! YAML is tried first, then JSON with the same shape. A missing file is
//! not an error - the caller falls back to the descriptor defaults for a
//! preview render - but a file that exists and decodes as neither format
//! is fatal.

use std::collections::HashMap;
use std::path::Path;
use std::{fs, io};

use serde::Deserialize;

use crate::core::{Result, SnipstackError};

#[derive(Debug, Deserialize)]
struct VarsFile<V> {
    variables: Vec<VarEntry<V>>,
}

#[derive(Debug, Deserialize)]
struct VarEntry<V> {
    name: String,
    value: V,
}

/// Load a variable context file into a flat map.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_variables(path: &Path) -> Result<Option<HashMap<String, String>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("variable file {} not found", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if let Ok(parsed) = serde_yaml::from_str::<VarsFile<serde_yaml::Value>>(&text) {
        return Ok(Some(
            parsed
                .variables
                .into_iter()
                .map(|v| (v.name, yaml_value_to_string(v.value)))
                .collect(),
        ));
    }

    if let Ok(parsed) = serde_json::from_str::<VarsFile<serde_json::Value>>(&text) {
        return Ok(Some(
            parsed
                .variables
                .into_iter()
                .map(|v| (v.name, json_value_to_string(v.value)))
                .collect(),
        ));
    }

    Err(SnipstackError::VariableFileParse { file: path.display().to_string() })
}

fn yaml_value_to_string(value: serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(&other).unwrap_or_default().trim_end().to_string(),
    }
}

fn json_value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
