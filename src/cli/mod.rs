//! Command-line interface.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! an `execute()` method:
//!
//! - `list` - show the groups, stacks, and snippets of a repository
//! - `push` - render, select, split, and apply snippets to a device
//! - `export` - emit the document-store record batch for a collection
//!
//! All subcommands share the source-selection flags ([`SourceArgs`]):
//! which repository, how to reach it (git clone, local checkout, or the
//! hosted service), and which branch to use. Passing `--branch list` prints
//! the available branches instead of running the subcommand.

mod export;
mod list;
mod push;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::constants::DEFAULT_API_URL;
use crate::source::{AnySource, ApiSource, GitSource, LocalSource};

/// Top-level CLI for snipstack.
#[derive(Parser)]
#[command(
    name = "snipstack",
    about = "Deploy templated XML configuration snippets to PAN-OS style devices",
    version,
    long_about = "snipstack retrieves XML configuration snippets from git repositories, \
                  local checkouts, or a hosted snippet service, renders their template \
                  variables, and pushes the results to a device's configuration API."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Install the tracing subscriber according to the verbosity flags.
    /// `RUST_LOG` still wins when set.
    pub fn init_tracing(&self) {
        let default_level = if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Run the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::List(cmd) => cmd.execute().await,
            Commands::Push(cmd) => cmd.execute().await,
            Commands::Export(cmd) => cmd.execute().await,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the snippets available in a repository
    List(list::ListCommand),

    /// Push snippets to a device
    Push(push::PushCommand),

    /// Emit the document-store record batch for a collection
    Export(export::ExportCommand),
}

/// How a repository is reached.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoKind {
    /// Clone (or reuse a clone of) a git repository
    Git,
    /// Use a checkout already on disk
    Local,
    /// Query the hosted snippet service
    Api,
}

/// Source-selection flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Name of the snippet repository or collection
    #[arg(long, default_value = "iron-skillet", value_name = "NAME")]
    pub repository: String,

    /// Kind of repository to use
    #[arg(long = "repo-type", value_enum, default_value_t = RepoKind::Git)]
    pub repo_type: RepoKind,

    /// Repository URL (git), checkout path (local), or service base URL (api)
    #[arg(long = "repo-path", value_name = "PATH_OR_URL")]
    pub repo_path: Option<String>,

    /// Git branch to check out; `list` prints the available branches
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Pull an existing clone before building
    #[arg(long)]
    pub update: bool,

    /// Delete any existing clone and clone again
    #[arg(long)]
    pub refresh: bool,
}

impl SourceArgs {
    /// Build the concrete source these flags describe.
    pub fn build(&self) -> Result<AnySource> {
        match self.repo_type {
            RepoKind::Local => {
                let path = self
                    .repo_path
                    .clone()
                    .context("--repo-path is required with --repo-type local")?;
                let name = std::path::Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.repository.clone());
                Ok(AnySource::Local(LocalSource::new(path, name)))
            }
            RepoKind::Git => {
                let source = self.git_source()?;
                Ok(AnySource::Git(source.with_branch(self.branch.clone())))
            }
            RepoKind::Api => {
                let base =
                    self.repo_path.clone().unwrap_or_else(|| DEFAULT_API_URL.to_string());
                Ok(AnySource::Api(ApiSource::new(base, &self.repository)))
            }
        }
    }

    fn git_source(&self) -> Result<GitSource> {
        let store = std::env::current_dir()?;
        Ok(GitSource::from_registry(&self.repository, self.repo_path.as_deref(), store)?
            .with_update(self.update)
            .with_refresh(self.refresh))
    }
}

/// Honor `--branch list` for git sources: print the remote branches and
/// report that the subcommand should stop.
pub(crate) async fn print_branches_if_requested(args: &SourceArgs) -> Result<bool> {
    if args.repo_type != RepoKind::Git || args.branch.as_deref() != Some("list") {
        return Ok(false);
    }
    let source = args.git_source()?;
    for branch in source.branches().await? {
        println!("{branch}");
    }
    Ok(true)
}
