//! Error handling for snipstack.
//!
//! One strongly-typed error enum covers the whole crate. The core pipeline
//! (loader, model, templating, selection, splitting) never prints and never
//! retries: every failure is returned as a [`SnipstackError`] for the CLI
//! layer to present. Collaborator failures (git, device API, hosted service)
//! use the same enum so callers get a single error surface.
//!
//! # Error Categories
//!
//! - **Descriptor parsing**: [`SnipstackError::DescriptorNotFound`],
//!   [`SnipstackError::DescriptorParse`] - a missing or unreadable
//!   descriptor file is fatal for the directory being loaded; individual
//!   malformed entries are skipped by the loader and never surface here.
//! - **Lookup**: [`SnipstackError::GroupNotFound`],
//!   [`SnipstackError::StackNotFound`], [`SnipstackError::FragmentNotFound`]
//!   - fatal to the calling operation, not to the process.
//! - **Rendering**: [`SnipstackError::MissingVariable`],
//!   [`SnipstackError::Render`] - a placeholder referencing a variable the
//!   context does not define fails that fragment's render; blanks are never
//!   substituted silently.
//! - **Splitting**: [`SnipstackError::EntryNotFound`],
//!   [`SnipstackError::UnsplittableFragment`], [`SnipstackError::Xml`].
//! - **Collaborators**: git, device API, hosted service, variable files.

use thiserror::Error;

/// Convenience alias used throughout the core modules.
pub type Result<T> = std::result::Result<T, SnipstackError>;

/// The main error type for snipstack operations.
#[derive(Error, Debug)]
pub enum SnipstackError {
    /// Stack directory has no descriptor file.
    ///
    /// Fatal when loading a single stack directory. The repository walker
    /// only treats directories containing a descriptor as stacks, so this
    /// surfaces when a caller points the loader at a directory explicitly.
    #[error("no .meta-cnc.yaml descriptor found in {dir}")]
    DescriptorNotFound {
        /// Directory that was expected to contain the descriptor
        dir: String,
    },

    /// Descriptor file exists but could not be parsed.
    #[error("invalid descriptor file {file}: {reason}")]
    DescriptorParse {
        /// Path to the descriptor that failed to parse
        file: String,
        /// Specific reason for the failure
        reason: String,
    },

    /// Device group not present in the collection.
    ///
    /// Lookup is case-sensitive; callers normalize device-type identifiers
    /// (lower case) before asking.
    #[error("device group '{name}' not found in collection")]
    GroupNotFound {
        /// The group name that was requested
        name: String,
    },

    /// Snippet stack not present in the group.
    #[error("snippet stack '{name}' not found in group '{group}'")]
    StackNotFound {
        /// The stack name that was requested
        name: String,
        /// The group that was searched
        group: String,
    },

    /// Requested fragment name matched nothing in the stack.
    #[error("snippet '{name}' not found in stack '{stack}'")]
    FragmentNotFound {
        /// The fragment name that was requested
        name: String,
        /// The stack that was searched
        stack: String,
    },

    /// A template referenced a variable the context does not define.
    #[error("snippet '{fragment}' references undefined variable '{variable}'")]
    MissingVariable {
        /// Fragment whose render failed
        fragment: String,
        /// The undefined variable name
        variable: String,
    },

    /// Template rendering failed for a reason other than a missing variable.
    #[error("failed to render snippet '{fragment}': {reason}")]
    Render {
        /// Fragment whose render failed
        fragment: String,
        /// Cleaned-up engine error text
        reason: String,
    },

    /// A `name/entry` selection named an entry the fragment does not contain.
    ///
    /// Matching is exact; a near miss is a user typo and is surfaced
    /// immediately rather than resolved to the closest candidate.
    #[error("entry '{entry}' not found in snippet '{fragment}'")]
    EntryNotFound {
        /// Fragment that was searched
        fragment: String,
        /// The entry name that was requested
        entry: String,
    },

    /// An oversized fragment has no `<entry>` children to split on.
    ///
    /// Such a fragment cannot be sent as-is and has no defined smaller
    /// representation.
    #[error("snippet '{fragment}' is {size} bytes but contains no entry elements to split on")]
    UnsplittableFragment {
        /// Fragment that could not be split
        fragment: String,
        /// Serialized size that tripped the threshold
        size: usize,
    },

    /// Fragment content is not well-formed XML.
    #[error("invalid XML in snippet '{fragment}': {reason}")]
    Xml {
        /// Fragment whose content failed to parse
        fragment: String,
        /// Parser error text
        reason: String,
    },

    /// Directory does not follow the snippet repository layout.
    #[error("invalid snippet repository at {path}: {reason}")]
    RepoLayout {
        /// Repository root that was inspected
        path: String,
        /// What was missing or wrong
        reason: String,
    },

    /// Variable configuration file could not be decoded.
    #[error("variable file {file} could not be decoded as YAML or JSON")]
    VariableFileParse {
        /// Path to the variable file
        file: String,
    },

    /// Repository name is not in the built-in registry and no URL was given.
    #[error("repository '{name}' is not registered; pass an explicit repository URL")]
    UnknownRepository {
        /// The unregistered repository name
        name: String,
    },

    /// Git executable not found in PATH.
    #[error("git is not installed or not found in PATH")]
    GitNotFound,

    /// Git command returned a non-zero exit code.
    #[error("git {operation} failed: {stderr}")]
    GitCommand {
        /// The git operation that failed (e.g. "clone", "checkout")
        operation: String,
        /// Error output from the git command
        stderr: String,
    },

    /// Device API call failed or returned an error response.
    #[error("device API {operation} failed: {reason}")]
    DeviceApi {
        /// The API operation that failed (e.g. "keygen", "set")
        operation: String,
        /// Failure detail, including any device-reported message
        reason: String,
    },

    /// Device rejected the supplied credentials.
    #[error("authentication to {addr} failed: {reason}")]
    DeviceAuth {
        /// Device address
        addr: String,
        /// Device-reported failure text
        reason: String,
    },

    /// Hosted snippet service request failed.
    #[error("snippet service request to {url} failed: {reason}")]
    RemoteApi {
        /// Request URL
        url: String,
        /// Failure detail
        reason: String,
    },

    /// I/O error from the standard library.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
