mod bootstrap;
mod report;

use std::sync::Arc;

use analyzer_core::settings::Settings;
use analyzer_data::store::DatasetStore;
use analyzer_runtime::ingest::Ingestor;
use anyhow::Result;

use crate::report::{build_report, render_json, render_text, ReportOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("lb-analyzer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Timezone: {}",
        settings.view,
        settings.format,
        settings.timezone
    );

    let options = ReportOptions::from_settings(&settings)?;

    let store = Arc::new(DatasetStore::new());
    let ingestor = Ingestor::new(Arc::clone(&store));
    let ingest = ingestor.ingest(&settings.inputs).await;

    if store.is_empty() {
        for failure in &ingest.failed {
            eprintln!("{}: {}", failure.path.display(), failure.error);
        }
        anyhow::bail!("no datasets could be loaded");
    }

    let report = build_report(&store.snapshot(), &ingest, &options);
    let output = match settings.format.as_str() {
        "json" => render_json(&report)?,
        _ => render_text(&report),
    };
    println!("{output}");

    Ok(())
}
