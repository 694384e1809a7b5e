//! `scone check` command implementation.

use std::path::PathBuf;

use clap::Args;
use scone_config::{CliSettings, Config};
use scone_manifest::{Item, Manifest};
use scone_viewer::{FetchError, Fetcher, load_manifest};

use crate::error::CliError;
use crate::fetcher;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover scone.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document origin, a directory or http(s) URL (overrides config).
    #[arg(long)]
    origin: Option<String>,

    /// Only validate the manifest, skip probing documents.
    #[arg(long)]
    manifest_only: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is invalid or any document it
    /// references cannot be fetched.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            origin: self.origin,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let fetcher = fetcher::for_origin(&config.origin);

        let manifest = load_manifest(fetcher.as_ref(), &config.site.manifest).await?;
        print_summary(&output, &config.site.manifest, &manifest);

        if self.manifest_only {
            return Ok(());
        }

        let missing = missing_documents(fetcher.as_ref(), &manifest).await;
        if missing.is_empty() {
            output.success(&format!(
                "All {} documents are reachable",
                manifest.document_count()
            ));
            return Ok(());
        }

        for err in &missing {
            output.warning(&format!("  {err}"));
        }
        Err(CliError::Validation(format!(
            "{} of {} documents could not be fetched",
            missing.len(),
            manifest.document_count()
        )))
    }
}

fn print_summary(output: &Output, path: &str, manifest: &Manifest) {
    output.heading(&format!("Manifest {path}"));
    for section in manifest.sections() {
        output.item(&section.name, &format!("{} items", section.items.len()));
    }
    output.info(&format!(
        "{} sections, {} documents, {} external links",
        manifest.sections().len(),
        manifest.document_count(),
        manifest.external_count()
    ));
}

/// Probe every document the manifest references, in navigation order.
async fn missing_documents(fetcher: &dyn Fetcher, manifest: &Manifest) -> Vec<FetchError> {
    let mut missing = Vec::new();
    for file in manifest.items().filter_map(Item::file) {
        if let Err(err) = fetcher.probe(file).await {
            tracing::debug!(file, error = %err, "Document probe failed");
            missing.push(err);
        }
    }
    missing
}
