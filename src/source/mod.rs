//! Fragment sources.
//!
//! Everything downstream of retrieval works on a [`Collection`]; where the
//! collection came from is this module's concern alone. The
//! [`FragmentSource`] trait is the seam: a local checkout, a git clone, and
//! the hosted snippet service all produce the same model, and the core
//! never branches on which one it was.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::collection::{Collection, Fragment, Stack, StackMeta};
use crate::constants::registry_url;
use crate::core::{Result, SnipstackError};
use crate::git::GitRepo;
use crate::loader;
use crate::store::{RecordFilter, StoredRecord};

/// Anything that can produce a snippet [`Collection`].
#[allow(async_fn_in_trait)]
pub trait FragmentSource {
    /// Retrieve and assemble the collection.
    async fn collection(&self) -> Result<Collection>;
}

/// A snippet repository already on disk.
#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
    name: String,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into() }
    }
}

impl FragmentSource for LocalSource {
    async fn collection(&self) -> Result<Collection> {
        loader::build_collection(&self.path, &self.name)
    }
}

/// A snippet repository fetched with git and cached under a store
/// directory.
#[derive(Debug, Clone)]
pub struct GitSource {
    name: String,
    url: String,
    store: PathBuf,
    branch: Option<String>,
    update: bool,
    refresh: bool,
}

impl GitSource {
    /// Source for an explicit repository URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>, store: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            store: store.into(),
            branch: None,
            update: false,
            refresh: false,
        }
    }

    /// Source for a repository known by name, with an optional URL override
    /// for repositories outside the registry.
    pub fn from_registry(
        name: &str,
        url_override: Option<&str>,
        store: impl Into<PathBuf>,
    ) -> Result<Self> {
        let url = match url_override {
            Some(url) => url.to_string(),
            None => registry_url(name)
                .ok_or_else(|| SnipstackError::UnknownRepository { name: name.to_string() })?
                .to_string(),
        };
        Ok(Self::new(name, url, store))
    }

    /// Check out this branch after cloning or opening.
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Pull the existing clone before building.
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Delete any existing clone and start over.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Where the clone lives (or will live).
    pub fn checkout_path(&self) -> PathBuf {
        self.store.join(&self.name)
    }

    /// Clone or open the repository, honoring refresh/update/branch.
    async fn checkout(&self) -> Result<GitRepo> {
        let target = self.checkout_path();

        if self.refresh && target.exists() {
            tracing::info!("refreshing clone at {}", target.display());
            std::fs::remove_dir_all(&target)?;
        }

        let repo = if target.is_dir() {
            let repo = GitRepo::open(&target);
            if self.update {
                tracing::info!("updating repository at {}", target.display());
                repo.pull().await?;
            }
            repo
        } else {
            tracing::info!("cloning {} into {}", self.url, target.display());
            GitRepo::clone(&self.url, &target).await?
        };

        if let Some(branch) = &self.branch {
            repo.checkout(branch).await?;
        }
        Ok(repo)
    }

    /// Remote branches of the repository, cloning first if needed.
    pub async fn branches(&self) -> Result<Vec<String>> {
        let repo = self.checkout().await?;
        repo.list_branches().await
    }
}

impl FragmentSource for GitSource {
    async fn collection(&self) -> Result<Collection> {
        let repo = self.checkout().await?;
        loader::build_collection(repo.path(), &self.name)
    }
}

/// The hosted snippet service.
///
/// Stored records carry unrendered templates; after reassembly they render
/// and select exactly like repository-loaded fragments.
#[derive(Debug, Clone)]
pub struct ApiSource {
    base_url: String,
    skillet: String,
    filter: RecordFilter,
}

impl ApiSource {
    pub fn new(base_url: impl Into<String>, skillet: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), skillet: skillet.into(), filter: RecordFilter::default() }
    }

    /// Narrow the retrieval with an allow-listed filter.
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    async fn fetch_records(&self) -> Result<Vec<StoredRecord>> {
        let url = format!("{}/skillet", self.base_url.trim_end_matches('/'));
        let remote_err = |reason: String| SnipstackError::RemoteApi {
            url: url.clone(),
            reason,
        };

        let mut query: Vec<(&str, &str)> = vec![("skillet", self.skillet.as_str())];
        query.extend(self.filter.fields());

        let response = reqwest::Client::new()
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| remote_err(e.to_string()))?;
        let response = response.error_for_status().map_err(|e| remote_err(e.to_string()))?;
        response.json().await.map_err(|e| remote_err(e.to_string()))
    }
}

impl FragmentSource for ApiSource {
    async fn collection(&self) -> Result<Collection> {
        let records = self.fetch_records().await?;
        Ok(collection_from_records(&self.skillet, records))
    }
}

/// Reassemble stored records into the Collection model.
///
/// Records group by device type, then by stack. Stack metadata is minimal -
/// the service stores no variable declarations, so preview renders fall
/// back to an empty default context and fail loudly on any placeholder.
pub fn collection_from_records(name: &str, records: Vec<StoredRecord>) -> Collection {
    let mut by_group: HashMap<String, HashMap<String, Vec<StoredRecord>>> = HashMap::new();
    for record in records {
        by_group
            .entry(record.device_type.clone())
            .or_default()
            .entry(record.stack.clone())
            .or_default()
            .push(record);
    }

    let mut collection = Collection::new(name);
    for (device_type, stacks) in by_group {
        let group = collection.new_group(&device_type, &device_type, ".*");
        let mut stack_map = HashMap::new();
        for (stack_name, records) in stacks {
            let metadata = std::sync::Arc::new(StackMeta {
                name: None,
                device_type: Some(device_type.clone()),
                variables: Vec::new(),
            });
            let fragments = records
                .into_iter()
                .map(|r| Fragment::new(r.name, r.path, r.xml, std::sync::Arc::clone(&metadata)))
                .collect();
            stack_map.insert(stack_name.clone(), Stack::new(stack_name, fragments, metadata));
        }
        group.add_stacks(stack_map);
    }
    collection
}

/// The concrete source kinds the CLI can construct.
///
/// The dispatch lives here at the boundary; everything past
/// [`FragmentSource::collection`] is source-agnostic.
#[derive(Debug, Clone)]
pub enum AnySource {
    Local(LocalSource),
    Git(GitSource),
    Api(ApiSource),
}

impl FragmentSource for AnySource {
    async fn collection(&self) -> Result<Collection> {
        match self {
            Self::Local(s) => s.collection().await,
            Self::Git(s) => s.collection().await,
            Self::Api(s) => s.collection().await,
        }
    }
}
