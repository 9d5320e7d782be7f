use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::{output_success, pool};
use crate::cli::OutputFormat;
use crate::services::export::{CsvDocument, ExportService, MemberExportQuery, TransactionExportQuery};
use crate::types::{EntryKind, MemberStatus};

#[derive(Subcommand)]
pub enum ExportCommands {
    #[command(about = "Export transactions as CSV")]
    Transactions {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, help = "income or expense")]
        kind: Option<EntryKind>,
        #[arg(long, short, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    #[command(about = "Export members as CSV")]
    Members {
        #[arg(long)]
        status: Option<MemberStatus>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn write(document: CsvDocument, output: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    match output {
        None => {
            print!("{}", document.body);
            Ok(())
        }
        Some(path) => {
            std::fs::write(&path, &document.body)?;
            output_success(
                &output_format,
                &format!("Wrote {} (sha256 {})", path.display(), document.sha256),
                Some(json!({ "path": path.display().to_string(), "sha256": document.sha256, "bytes": document.body.len() })),
            )
        }
    }
}

pub async fn handle(cmd: ExportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let exports = ExportService::new(pool()?);

    match cmd {
        ExportCommands::Transactions { from, to, kind, output } => {
            let document = exports.transactions(&TransactionExportQuery { from, to, kind }).await?;
            write(document, output, output_format)
        }
        ExportCommands::Members { status, output } => {
            let document = exports.members(&MemberExportQuery { status }).await?;
            write(document, output, output_format)
        }
    }
}
