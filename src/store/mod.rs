//! Document-store record shapes.
//!
//! The hosted snippet service stores one record per fragment, keyed by
//! collection name. This module only produces and matches that record shape;
//! storage itself belongs to the service. Records carry the *raw* templates
//! (the uploader never renders), so variable substitution happens at
//! retrieval time through the normal template engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Stack};
use crate::core::Result;

/// Fields a retrieval filter may constrain. Anything else is dropped.
pub const FILTER_FIELDS: &[&str] = &["type", "stack", "path"];

/// One stored snippet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Fragment name
    pub name: String,
    /// Destination xpath template
    pub path: String,
    /// XML content template
    pub xml: String,
    /// Device type of the owning group
    #[serde(rename = "type")]
    pub device_type: String,
    /// Owning stack name
    pub stack: String,
    /// Collection name the record is keyed under
    pub skillet: String,
}

/// Allow-listed filter over stored records.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    fields: HashMap<String, String>,
}

impl RecordFilter {
    /// Build a filter from arbitrary key/value pairs, keeping only the
    /// allow-listed fields. Dropped keys are logged, not errors: the filter
    /// contract is best effort narrowing, never arbitrary queries.
    pub fn from_map(raw: HashMap<String, String>) -> Self {
        let mut fields = HashMap::new();
        for (key, value) in raw {
            if FILTER_FIELDS.contains(&key.as_str()) {
                fields.insert(key, value);
            } else {
                tracing::warn!("dropping filter field '{key}': not in the allow-list");
            }
        }
        Self { fields }
    }

    /// Whether any constraint survived the allow-list.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The retained constraints, for use as query parameters.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether a record satisfies every retained constraint.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.fields.iter().all(|(key, want)| match key.as_str() {
            "type" => record.device_type == *want,
            "stack" => record.stack == *want,
            "path" => record.path == *want,
            _ => false,
        })
    }
}

/// Records for one stack, carrying raw templates.
pub fn stack_records(collection: &str, device_type: &str, stack: &Stack) -> Vec<StoredRecord> {
    stack
        .fragments
        .iter()
        .map(|f| StoredRecord {
            name: f.name.clone(),
            path: f.xpath.clone(),
            xml: f.xml.clone(),
            device_type: device_type.to_string(),
            stack: stack.name.clone(),
            skillet: collection.to_string(),
        })
        .collect()
}

/// The full record batch for a collection: every stack of every group.
pub fn collection_records(collection: &Collection) -> Result<Vec<StoredRecord>> {
    let mut records = Vec::new();
    let mut group_names = collection.group_names();
    group_names.sort_unstable();
    for group_name in group_names {
        let group = collection.group(group_name)?;
        let mut stack_names = group.stack_names();
        stack_names.sort_unstable();
        for stack_name in stack_names {
            let stack = group.stack(stack_name)?;
            records.extend(stack_records(&collection.name, &group.device_type, stack));
        }
    }
    Ok(records)
}
