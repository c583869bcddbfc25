//! Descriptor parsing and snippet repository walking.
//!
//! Every stack directory carries one `.meta-cnc.yaml` descriptor naming the
//! stack's snippets, the XML file each lives in, and the destination xpath
//! each targets. The descriptor's top-level fields (display name, device
//! type, declared variables) become the stack's shared metadata.
//!
//! The descriptor is deserialized into a typed struct with explicit optional
//! fields and validated once here, at load time; nothing downstream ever
//! pokes at raw YAML. A missing or unparseable descriptor is fatal for the
//! directory being loaded, while an individual entry missing a required
//! field (or pointing at a file that does not exist) is skipped with a
//! warning so the remaining entries still load.
//!
//! Repository layout:
//!
//! ```text
//! <root>/templates/<group>/<stack-dir>/.meta-cnc.yaml
//! <root>/templates/<group>/<stack-dir>/*.xml
//! ```
//!
//! Group directories are device types (`panos`, `panorama`); stack
//! directories are recognized by `snippets` in their name. Stack directories
//! without a descriptor are skipped with a debug log - the walker only
//! hands the loader directories that claim to be stacks.

use std::path::Path;
use std::sync::Arc;
use std::{fs, io};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::collection::{Collection, Fragment, Stack, StackMeta, VariableDecl};
use crate::constants::{DESCRIPTOR_FILE, STACK_DIR_PATTERN, TEMPLATES_DIR};
use crate::core::{Result, SnipstackError};

/// Raw descriptor shape as it appears on disk.
///
/// Fields the tool does not consume (labels, type hints, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    device_type: Option<String>,
    #[serde(default)]
    variables: Vec<RawVariable>,
    snippets: Option<Vec<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Defaults may be written as strings, numbers, or booleans in YAML.
    #[serde(default)]
    default: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: Option<String>,
    file: Option<String>,
    xpath: Option<String>,
}

/// Load one stack directory through its descriptor.
///
/// The stack takes its name from the directory. Returns
/// [`SnipstackError::DescriptorNotFound`] when the descriptor file is
/// absent and [`SnipstackError::DescriptorParse`] when it cannot be read or
/// parsed or lacks the `snippets` key.
pub fn load_stack(dir: &Path) -> Result<Stack> {
    let descriptor = dir.join(DESCRIPTOR_FILE);
    if !descriptor.is_file() {
        return Err(SnipstackError::DescriptorNotFound { dir: dir.display().to_string() });
    }

    let text = fs::read_to_string(&descriptor).map_err(|e| SnipstackError::DescriptorParse {
        file: descriptor.display().to_string(),
        reason: e.to_string(),
    })?;
    let raw: RawDescriptor =
        serde_yaml::from_str(&text).map_err(|e| SnipstackError::DescriptorParse {
            file: descriptor.display().to_string(),
            reason: e.to_string(),
        })?;

    let entries = raw.snippets.ok_or_else(|| SnipstackError::DescriptorParse {
        file: descriptor.display().to_string(),
        reason: "missing snippet definitions".to_string(),
    })?;

    let metadata = Arc::new(StackMeta {
        name: raw.name,
        device_type: raw.device_type,
        variables: raw.variables.into_iter().filter_map(variable_decl).collect(),
    });

    let mut fragments = Vec::with_capacity(entries.len());
    for entry in entries {
        match load_entry(dir, entry, &metadata) {
            Some(fragment) => fragments.push(fragment),
            None => continue,
        }
    }

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| STACK_DIR_PATTERN.to_string());
    Ok(Stack::new(name, fragments, metadata))
}

/// Build one fragment from a descriptor entry, or skip it with a warning.
fn load_entry(dir: &Path, entry: RawEntry, metadata: &Arc<StackMeta>) -> Option<Fragment> {
    let (Some(name), Some(file), Some(xpath)) = (entry.name, entry.file, entry.xpath) else {
        tracing::warn!(
            "skipping descriptor entry in {} with missing name/file/xpath",
            dir.display()
        );
        return None;
    };

    let path = dir.join(&file);
    let xml = match fs::read_to_string(&path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("skipping snippet '{}': {} does not exist", name, path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("skipping snippet '{}': cannot read {}: {}", name, path.display(), e);
            return None;
        }
    };

    Some(Fragment::new(name, xpath, xml, Arc::clone(metadata)))
}

fn variable_decl(raw: RawVariable) -> Option<VariableDecl> {
    let Some(name) = raw.name else {
        tracing::warn!("skipping descriptor variable with no name");
        return None;
    };
    Some(VariableDecl {
        name,
        description: raw.description,
        default: raw.default.as_ref().map(yaml_scalar_to_string),
    })
}

/// Render a YAML scalar the way it would be written in a template context.
fn yaml_scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim_end().to_string(),
    }
}

/// Walk a snippet repository checkout into a [`Collection`].
///
/// One group per directory under `templates/`, one stack per subdirectory
/// whose name contains `snippets` and which carries a descriptor.
pub fn build_collection(root: &Path, name: &str) -> Result<Collection> {
    let templates = root.join(TEMPLATES_DIR);
    if !templates.is_dir() {
        return Err(SnipstackError::RepoLayout {
            path: root.display().to_string(),
            reason: format!("no {TEMPLATES_DIR}/ directory"),
        });
    }

    let mut collection = Collection::new(name);
    for group_dir in subdirectories(&templates) {
        let group_name = dir_name(&group_dir);
        let mut stacks = std::collections::HashMap::new();

        for stack_dir in subdirectories(&group_dir) {
            let stack_name = dir_name(&stack_dir);
            if !stack_name.contains(STACK_DIR_PATTERN) {
                continue;
            }
            if !stack_dir.join(DESCRIPTOR_FILE).is_file() {
                tracing::debug!("no descriptor in {}, skipping", stack_dir.display());
                continue;
            }
            let stack = load_stack(&stack_dir)?;
            stacks.insert(stack_name, stack);
        }

        if stacks.is_empty() {
            tracing::debug!("group directory {} holds no stacks", group_dir.display());
            continue;
        }
        collection.new_group(&group_name, &group_name, ".*").add_stacks(stacks);
    }

    Ok(collection)
}

/// Immediate subdirectories of `dir`, sorted by name for deterministic
/// iteration.
fn subdirectories(dir: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect()
}

fn dir_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
