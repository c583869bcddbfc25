//! `snipstack push` - render, select, and apply snippets to a device.
//!
//! The full pipeline: build the collection from the selected source, learn
//! the device's type so the right group is used, render the group against
//! the variable file (or the descriptor defaults when there is none),
//! resolve the requested names through the selector and splitter, then
//! apply each result with a `set` call at its rendered xpath.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::SourceArgs;
use crate::constants::DEFAULT_VARS_FILE;
use crate::device::Device;
use crate::keystore::KeyStore;
use crate::source::FragmentSource;
use crate::splitter::{DEFAULT_SPLIT_THRESHOLD, Splitter};
use crate::vars;

#[derive(Args, Debug)]
pub struct PushCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Snippets to push: `all`, `name`, or `name/entry`.
    /// With none given, the available snippets are listed instead.
    #[arg(value_name = "SNIPPET")]
    names: Vec<String>,

    /// Snippet stack to select from
    #[arg(long, default_value = "snippets", value_name = "STACK")]
    stack: String,

    /// Variable configuration file
    #[arg(long, default_value = DEFAULT_VARS_FILE, value_name = "FILE")]
    config: PathBuf,

    /// Device address (host or host:port)
    #[arg(long, env = "SNIPSTACK_ADDRESS", value_name = "ADDR")]
    address: Option<String>,

    /// Device username
    #[arg(long, env = "SNIPSTACK_USERNAME")]
    username: Option<String>,

    /// Device password
    #[arg(long, env = "SNIPSTACK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable TLS certificate validation
    #[arg(long)]
    validate: bool,

    /// Byte threshold above which list snippets are split per entry
    #[arg(long, default_value_t = DEFAULT_SPLIT_THRESHOLD, value_name = "BYTES")]
    split_threshold: usize,

    /// Persist API keys per device in the key store
    #[arg(long)]
    enable_keystore: bool,

    /// Remove all stored API keys before doing anything else
    #[arg(long)]
    clear_keystore: bool,
}

impl PushCommand {
    pub async fn execute(self) -> Result<()> {
        if super::print_branches_if_requested(&self.source).await? {
            return Ok(());
        }

        if !self.validate {
            eprintln!(
                "{}",
                "warning: TLS validation is disabled; pass --validate to enable it".yellow()
            );
        }

        let mut collection = self.source.build()?.collection().await?;

        if self.names.is_empty() {
            println!("available snippets in {}", collection.name.bold());
            super::list::print_collection(&collection, false);
            return Ok(());
        }

        let mut keystore = KeyStore::open(
            KeyStore::default_path().context("cannot locate a home directory for the key store")?,
        );
        if self.clear_keystore {
            keystore.clear()?;
        }
        if self.enable_keystore {
            println!(
                "{}",
                format!("API keys will be saved, per device, at {}", keystore.path().display())
                    .magenta()
            );
            keystore.enable();
        }

        let addr = prompt_if_missing(
            self.address.clone(),
            "address or address:port of device to configure",
        )?;
        let cached_key = keystore.lookup(&addr).map(str::to_string);
        let mut device = match cached_key {
            Some(key) => Device::with_key(&addr, &key, self.validate)?,
            None => {
                let user = prompt_if_missing(self.username.clone(), "username")?;
                let password = match self.password.clone() {
                    Some(p) => p,
                    None => Password::new().with_prompt("password").interact()?,
                };
                let device = Device::connect(&addr, &user, &password, self.validate).await?;
                keystore.store(&addr, device.api_key())?;
                device
            }
        };

        let group_name = device.device_group().await?;
        tracing::info!("device {} uses snippet group '{}'", device.addr(), group_name);

        let context = vars::load_variables(&self.config)?;
        if context.is_none() {
            eprintln!(
                "{}",
                format!(
                    "note: {} not found, using snippet stack defaults",
                    self.config.display()
                )
                .yellow()
            );
        }

        let group = collection.group_mut(&group_name)?;
        group.render_all(context.as_ref())?;

        let splitter = Splitter::with_threshold(self.split_threshold);
        let snippets = group.select(&self.stack, &self.names, &splitter)?;

        let mut failures = 0usize;
        for snippet in &snippets {
            print!("applying {} at {} ... ", snippet.name.bold(), snippet.rendered_xpath);
            let _ = std::io::Write::flush(&mut std::io::stdout());
            match device.set_at_xpath(&snippet.rendered_xpath, &snippet.rendered_xml).await {
                Ok(()) => println!("{}", "ok".green()),
                Err(e) => {
                    println!("{}", "failed".red());
                    eprintln!("  {e}");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            anyhow::bail!("{failures} of {} snippets failed to apply", snippets.len());
        }
        Ok(())
    }
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}
