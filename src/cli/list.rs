//! `snipstack list` - show what a repository offers.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::SourceArgs;
use crate::collection::Collection;
use crate::source::FragmentSource;
use crate::splitter;

#[derive(Args, Debug)]
pub struct ListCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Also print the entry names inside each snippet
    #[arg(long)]
    entries: bool,
}

impl ListCommand {
    pub async fn execute(self) -> Result<()> {
        if super::print_branches_if_requested(&self.source).await? {
            return Ok(());
        }
        let collection = self.source.build()?.collection().await?;
        print_collection(&collection, self.entries);
        Ok(())
    }
}

/// Print groups, stacks, and snippet names. Groups and stacks are sorted
/// for stable output; snippets keep their descriptor order.
pub(crate) fn print_collection(collection: &Collection, entries: bool) {
    let mut group_names = collection.group_names();
    group_names.sort_unstable();

    for group_name in group_names {
        let Ok(group) = collection.group(group_name) else { continue };
        println!("{}", group_name.bold());

        let mut stack_names = group.stack_names();
        stack_names.sort_unstable();
        for stack_name in stack_names {
            let Ok(stack) = group.stack(stack_name) else { continue };
            println!("  {}", stack_name.cyan());
            for fragment in &stack.fragments {
                println!("    {}  {}", fragment.name, fragment.xpath.dimmed());
                if entries {
                    for entry in splitter::entry_names(&fragment.xml) {
                        println!("      - {entry}");
                    }
                }
            }
        }
    }
}
