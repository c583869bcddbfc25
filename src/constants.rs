//! Shared constants for repository layout and service endpoints.

/// Descriptor file expected in every stack directory.
pub const DESCRIPTOR_FILE: &str = ".meta-cnc.yaml";

/// Directory under the repository root that holds the device-type groups.
pub const TEMPLATES_DIR: &str = "templates";

/// Stack directories are recognized by this substring in their name
/// (`snippets`, `snippets_9.0`, ...).
pub const STACK_DIR_PATTERN: &str = "snippets";

/// Wildcard accepted by the selector in place of a fragment name.
pub const SELECT_ALL: &str = "all";

/// Default variable configuration file consulted by the CLI.
pub const DEFAULT_VARS_FILE: &str = "config_variables.yaml";

/// Default base URL of the hosted snippet service.
pub const DEFAULT_API_URL: &str = "https://api-dot-skilletcloud-prod.appspot.com";

/// Well-known git repositories addressable by name alone.
pub const GIT_REPO_REGISTRY: &[(&str, &str)] =
    &[("iron-skillet", "https://github.com/PaloAltoNetworks/iron-skillet.git")];

/// Look up a registered repository URL by name.
pub fn registry_url(name: &str) -> Option<&'static str> {
    GIT_REPO_REGISTRY.iter().find(|(n, _)| *n == name).map(|(_, url)| *url)
}
