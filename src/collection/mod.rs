//! The Collection -> Group -> Stack -> Fragment tree.
//!
//! A [`Collection`] represents one retrieved repository or service. It holds
//! named [`Group`]s (device-type variants, e.g. `panos` and `panorama`), each
//! of which holds named [`Stack`]s (one per stack directory), each of which
//! holds ordered [`Fragment`]s sharing the descriptor metadata they were
//! loaded under.
//!
//! The tree is the sole owner of its fragments. Rendering
//! ([`Stack::render_all`]) mutates fragments in place; selection
//! ([`Group::select`]) returns independent copies, so callers can mutate the
//! results freely without aliasing the tree.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::SELECT_ALL;
use crate::core::{Result, SnipstackError};
use crate::splitter::Splitter;
use crate::templating;

/// One declared template variable from a stack descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Variable name as referenced from templates
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value used when no explicit context is supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Descriptor metadata shared by every fragment in a stack.
///
/// One instance is created per descriptor file and handed to each fragment
/// behind an [`Arc`]; the loader never clones it per fragment. It is
/// read-only after construction, so fragments of one stack may be rendered
/// concurrently without racing on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackMeta {
    /// Display name from the descriptor, if any
    pub name: Option<String>,
    /// Device type the descriptor declares (`panos`, `panorama`, ...)
    pub device_type: Option<String>,
    /// Declared variables with their defaults
    pub variables: Vec<VariableDecl>,
}

impl StackMeta {
    /// Flat context built from the declared variable defaults.
    ///
    /// Variables without a default are absent from the map, so templates
    /// referencing them still fail loudly in preview mode.
    pub fn default_context(&self) -> HashMap<String, String> {
        self.variables
            .iter()
            .filter_map(|v| v.default.clone().map(|d| (v.name.clone(), d)))
            .collect()
    }
}

/// One named unit of XML content plus its destination-xpath template.
///
/// `rendered_xpath` and `rendered_xml` stay empty until
/// [`Stack::render_all`] runs; consumers must render before selecting.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Name, unique within its stack
    pub name: String,
    /// Destination xpath template (may contain placeholders)
    pub xpath: String,
    /// XML content template (may contain placeholders)
    pub xml: String,
    /// Descriptor metadata shared with the rest of the stack
    pub metadata: Arc<StackMeta>,
    /// Rendered destination xpath, empty until rendered
    pub rendered_xpath: String,
    /// Rendered XML content, empty until rendered
    pub rendered_xml: String,
}

impl Fragment {
    /// Create an unrendered fragment.
    pub fn new(name: String, xpath: String, xml: String, metadata: Arc<StackMeta>) -> Self {
        Self {
            name,
            xpath,
            xml,
            metadata,
            rendered_xpath: String::new(),
            rendered_xml: String::new(),
        }
    }

    /// Render the xpath and content templates against `context`.
    ///
    /// Both are rendered together; a failure in either leaves the fragment
    /// unrendered rather than half-rendered.
    pub fn render(&mut self, context: &HashMap<String, String>) -> Result<()> {
        let xpath = templating::render(&self.name, &self.xpath, context)?;
        let xml = templating::render(&self.name, &self.xml, context)?;
        self.rendered_xpath = xpath;
        self.rendered_xml = xml;
        Ok(())
    }
}

/// Named, ordered set of fragments sharing one descriptor.
#[derive(Debug, Clone)]
pub struct Stack {
    /// Stack name (the stack directory name)
    pub name: String,
    /// Fragments in descriptor declaration order
    pub fragments: Vec<Fragment>,
    /// The shared descriptor metadata
    pub metadata: Arc<StackMeta>,
}

impl Stack {
    /// Create a stack from already-loaded fragments.
    pub fn new(name: String, fragments: Vec<Fragment>, metadata: Arc<StackMeta>) -> Self {
        Self { name, fragments, metadata }
    }

    /// Render xpath and content for every fragment in the stack.
    ///
    /// This is the only rendering entry point: path-only or content-only
    /// rendering is not exposed because consumers always use them together.
    /// When `context` is `None` the descriptor's declared defaults are used,
    /// which allows previewing a stack with no configuration supplied.
    pub fn render_all(&mut self, context: Option<&HashMap<String, String>>) -> Result<()> {
        let defaults;
        let ctx = match context {
            Some(c) => c,
            None => {
                defaults = self.metadata.default_context();
                &defaults
            }
        };
        for fragment in &mut self.fragments {
            fragment.render(ctx)?;
        }
        Ok(())
    }

    /// Look up a fragment by name.
    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.name == name)
    }
}

/// Device-type-scoped container of stacks.
#[derive(Debug, Clone)]
pub struct Group {
    /// Group name (lookup key within the collection)
    pub name: String,
    /// Device type identifier this group targets
    pub device_type: String,
    /// Supported software versions, as declared by the repository
    pub supported_versions: String,
    stacks: HashMap<String, Stack>,
}

impl Group {
    /// Create an empty group.
    pub fn new(name: String, device_type: String, supported_versions: String) -> Self {
        Self { name, device_type, supported_versions, stacks: HashMap::new() }
    }

    /// Attach a named-stack map, overwriting any previous stacks with the
    /// same names.
    pub fn add_stacks(&mut self, stacks: HashMap<String, Stack>) {
        self.stacks.extend(stacks);
    }

    /// Stack names in this group (no particular order).
    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.keys().map(String::as_str).collect()
    }

    /// Look up a stack by name.
    pub fn stack(&self, name: &str) -> Result<&Stack> {
        self.stacks.get(name).ok_or_else(|| SnipstackError::StackNotFound {
            name: name.to_string(),
            group: self.name.clone(),
        })
    }

    /// Render every stack in the group. See [`Stack::render_all`].
    pub fn render_all(&mut self, context: Option<&HashMap<String, String>>) -> Result<()> {
        for stack in self.stacks.values_mut() {
            stack.render_all(context)?;
        }
        Ok(())
    }

    /// Resolve requested fragment names against a stack.
    ///
    /// `requested == ["all"]` returns every fragment in declared order,
    /// whole: a bulk export keeps its structure, so the splitter is bypassed
    /// entirely. Otherwise entries are processed in the order the caller
    /// gave them (argument order controls apply order) and each may be
    /// `name` or `name/entry`; the latter extracts exactly one named
    /// `<entry>` child. Every matched fragment runs through the splitter so
    /// oversized list fragments come back normalized.
    ///
    /// A requested name with no match fails with
    /// [`SnipstackError::FragmentNotFound`]; the legacy behavior of silently
    /// skipping unmatched names was dropped in favor of the fail-loud policy
    /// used everywhere else.
    pub fn select(
        &self,
        stack_name: &str,
        requested: &[String],
        splitter: &Splitter,
    ) -> Result<Vec<Fragment>> {
        let stack = self.stack(stack_name)?;

        if requested.len() == 1 && requested[0] == SELECT_ALL {
            return Ok(stack.fragments.clone());
        }

        let mut selected = Vec::new();
        for request in requested {
            let (name, entry) = match request.split_once('/') {
                Some((name, entry)) => (name, Some(entry)),
                None => (request.as_str(), None),
            };
            let fragment =
                stack.fragment(name).ok_or_else(|| SnipstackError::FragmentNotFound {
                    name: name.to_string(),
                    stack: stack_name.to_string(),
                })?;
            selected.extend(splitter.split(fragment, entry)?);
        }
        Ok(selected)
    }
}

/// Top-level named container of groups, one per retrieved source.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Collection name (the repository or service name)
    pub name: String,
    groups: HashMap<String, Group>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), groups: HashMap::new() }
    }

    /// Register a group, or return the existing one if `name` is already
    /// registered.
    pub fn new_group(
        &mut self,
        name: &str,
        device_type: &str,
        supported_versions: &str,
    ) -> &mut Group {
        self.groups.entry(name.to_string()).or_insert_with(|| {
            Group::new(name.to_string(), device_type.to_string(), supported_versions.to_string())
        })
    }

    /// Look up a group by name.
    ///
    /// Lookup is deliberately case-sensitive: device-type identifiers are
    /// documented in lower case and callers normalize before asking, so a
    /// miss here is a real error, never a silent empty result.
    pub fn group(&self, name: &str) -> Result<&Group> {
        self.groups
            .get(name)
            .ok_or_else(|| SnipstackError::GroupNotFound { name: name.to_string() })
    }

    /// Mutable group lookup with the same contract as [`Collection::group`].
    pub fn group_mut(&mut self, name: &str) -> Result<&mut Group> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| SnipstackError::GroupNotFound { name: name.to_string() })
    }

    /// Group names in this collection (no particular order).
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }
}
