//! Per-device API key cache.
//!
//! Maps device addresses to API keys so repeated pushes skip the keygen
//! round trip. The store is an explicit service object handed by reference
//! into the push path - nothing global - with an explicit `enabled` flag:
//! [`KeyStore::store`] is a no-op until the user opts in, so keys never
//! land on disk by surprise. The backing file is JSON in the user's home
//! directory and is written owner-read-write only.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::Result;

/// File name under `~/.snipstack/`.
const KEYS_FILE: &str = "keys.json";

/// Cache of device address -> API key.
#[derive(Debug)]
pub struct KeyStore {
    path: PathBuf,
    enabled: bool,
    keys: HashMap<String, String>,
}

impl KeyStore {
    /// Open the store backed by `path`, loading any existing keys.
    ///
    /// An unreadable or corrupt file is treated as empty with a warning;
    /// the next [`KeyStore::store`] rewrites it.
    pub fn open(path: PathBuf) -> Self {
        let keys = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("ignoring corrupt key store {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, enabled: false, keys }
    }

    /// Default store location in the user's home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".snipstack").join(KEYS_FILE))
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether new keys will be persisted.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Opt in to persisting keys.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Cached key for a device address, if any.
    pub fn lookup(&self, addr: &str) -> Option<&str> {
        self.keys.get(addr).map(String::as_str)
    }

    /// Remember a key for `addr` and write the store to disk.
    ///
    /// Does nothing while the store is disabled.
    pub fn store(&mut self, addr: &str, key: &str) -> Result<()> {
        if !self.enabled {
            tracing::debug!("key store disabled, not persisting key for {addr}");
            return Ok(());
        }
        self.keys.insert(addr.to_string(), key.to_string());
        self.write()
    }

    /// Drop every cached key and remove the backing file.
    pub fn clear(&mut self) -> Result<()> {
        self.keys.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.keys)
            .unwrap_or_else(|_| "{}".to_string());
        fs::write(&self.path, text)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

/// Owner read-write only; API keys are credentials.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
