//! `snipstack export` - emit the document-store record batch.
//!
//! Produces the records a storage collaborator would persist: one per
//! snippet, raw templates, keyed by collection name. Output goes to stdout
//! as JSON unless `--output` names a file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::SourceArgs;
use crate::source::FragmentSource;
use crate::store;

#[derive(Args, Debug)]
pub struct ExportCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Write the record batch to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub async fn execute(self) -> Result<()> {
        if super::print_branches_if_requested(&self.source).await? {
            return Ok(());
        }
        let collection = self.source.build()?.collection().await?;
        let records = store::collection_records(&collection)?;
        tracing::info!("exporting {} records from {}", records.len(), collection.name);

        let json = serde_json::to_string_pretty(&records)?;
        match self.output {
            Some(path) => {
                std::fs::write(&path, json)?;
                println!("wrote {} records to {}", records.len(), path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
