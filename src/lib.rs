//! snipstack - templated XML snippet deployment
//!
//! A tool for retrieving named XML configuration snippets from git
//! repositories, local checkouts, or a hosted snippet service, rendering the
//! placeholder variables inside them, and pushing the results to an
//! xpath-addressed device configuration API.
//!
//! # Architecture Overview
//!
//! Snippet repositories follow a fixed layout: `templates/<group>/<stack>/`
//! where each stack directory carries a `.meta-cnc.yaml` descriptor listing
//! its snippets, their source files, and their destination xpaths. The
//! pipeline is:
//!
//! 1. A [`source`] implementation produces a [`collection::Collection`]
//!    (groups keyed by device type, each holding stacks of ordered
//!    fragments).
//! 2. [`templating`] renders every fragment's xpath and content against a
//!    flat variable context, or against the descriptor's declared defaults
//!    when no context is supplied.
//! 3. The selector ([`collection::Group::select`]) resolves requested names
//!    (including the `all` wildcard and `name/entry` sub-selections) into an
//!    ordered result list.
//! 4. The [`splitter`] normalizes the results: oversized list fragments are
//!    broken into one fragment per `<entry>` element, and sub-selections
//!    extract exactly one named entry.
//! 5. The [`device`] client applies each result with a `set` call at its
//!    rendered xpath.
//!
//! # Core Modules
//!
//! - [`collection`] - Collection/Group/Stack/Fragment model and selection
//! - [`loader`] - descriptor parsing and repository walking
//! - [`templating`] - Tera-based rendering with the `password_hash` filter
//! - [`splitter`] - size-threshold splitting and sub-entry extraction
//!
//! # Collaborator Modules
//!
//! - [`source`] - local, git-backed, and hosted-API fragment sources
//! - [`git`] - system-git wrapper used by the git source
//! - [`device`] - device configuration API client
//! - [`keystore`] - per-device API key cache
//! - [`store`] - document-store record shapes and filters
//! - [`vars`] - variable context file loading

// Core functionality
pub mod cli;
pub mod collection;
pub mod constants;
pub mod core;
pub mod loader;
pub mod splitter;
pub mod templating;

// Repository access
pub mod git;
pub mod source;

// Device and service collaborators
pub mod device;
pub mod keystore;
pub mod store;
pub mod vars;
