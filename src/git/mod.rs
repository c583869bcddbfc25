//! Wrapper around the system `git` binary.
//!
//! Snippet repositories are fetched with the system git command rather than
//! an embedded git library, so existing authentication (SSH agents,
//! credential helpers, platform keychains) just works. Arguments are always
//! passed as separate parameters, never through a shell. A non-zero exit
//! becomes [`SnipstackError::GitCommand`] carrying the operation name and
//! git's stderr.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::core::{Result, SnipstackError};

/// Verify that a git client is available on PATH.
pub fn ensure_git_available() -> Result<()> {
    which::which("git").map(|_| ()).map_err(|_| SnipstackError::GitNotFound)
}

/// Handle to a local clone of a snippet repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Wrap an existing checkout without touching it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Clone `url` into `target`.
    pub async fn clone(url: &str, target: &Path) -> Result<Self> {
        ensure_git_available()?;
        git(None, &["clone", url, &target.to_string_lossy()], "clone").await?;
        Ok(Self { path: target.to_path_buf() })
    }

    /// Local checkout path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fast-forward the current branch from its remote.
    pub async fn pull(&self) -> Result<()> {
        self.run(&["pull", "--ff-only"], "pull").await.map(|_| ())
    }

    /// Check out a branch, tag, or commit.
    pub async fn checkout(&self, reference: &str) -> Result<()> {
        self.run(&["checkout", reference], "checkout").await.map(|_| ())
    }

    /// Remote branch names, without the remote prefix.
    pub async fn list_branches(&self) -> Result<Vec<String>> {
        let stdout = self
            .run(&["branch", "-r", "--format", "%(refname:short)"], "branch")
            .await?;
        Ok(parse_remote_branches(&stdout))
    }

    async fn run(&self, args: &[&str], operation: &str) -> Result<String> {
        git(Some(&self.path), args, operation).await
    }
}

/// Run a git command, returning stdout on success.
async fn git(cwd: Option<&Path>, args: &[&str], operation: &str) -> Result<String> {
    let mut cmd = Command::new("git");
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    tracing::debug!("running git {}", args.join(" "));

    let output = cmd.args(args).output().await.map_err(|e| SnipstackError::GitCommand {
        operation: operation.to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(SnipstackError::GitCommand {
            operation: operation.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_remote_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.ends_with("/HEAD"))
        .map(|l| l.split_once('/').map_or(l, |(_, branch)| branch).to_string())
        .collect()
}
