//! Async ingestion of input files into the dataset store.
//!
//! Every input file gets its own tokio task running read → parse → load.
//! Tasks report back over an `mpsc` channel; the order of those reports is
//! whatever the scheduler produces. Two files of the same schema race for
//! the schema's slot and the last one to write wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_data::pipeline::{process_content, LoadSummary};
use analyzer_data::reader::{find_input_files, sources_from_bytes, InputKind, SourceFile};
use analyzer_data::store::DatasetStore;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// ── Report types ──────────────────────────────────────────────────────────────

/// An input that could not be read or unpacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedInput {
    pub path: PathBuf,
    pub error: String,
}

/// Everything that happened during one [`Ingestor::ingest`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// One entry per loaded blob, in completion order.
    pub loaded: Vec<LoadSummary>,
    pub failed: Vec<FailedInput>,
}

impl IngestReport {
    pub fn total_records(&self) -> usize {
        self.loaded.iter().map(|l| l.records).sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.loaded.iter().map(|l| l.dropped).sum()
    }
}

enum IngestEvent {
    Loaded(LoadSummary),
    Failed(FailedInput),
}

// ── Ingestor ──────────────────────────────────────────────────────────────────

/// Loads files into a shared [`DatasetStore`].
#[derive(Debug, Clone)]
pub struct Ingestor {
    store: Arc<DatasetStore>,
}

impl Ingestor {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    /// Discover and load every input under `inputs`.
    ///
    /// Inputs that are missing, unsupported, unreadable or corrupt are
    /// recorded in [`IngestReport::failed`]; they never stop other inputs
    /// from loading.
    pub async fn ingest(&self, inputs: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();

        let mut files = Vec::new();
        for input in inputs {
            match find_input_files(input) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    warn!("Skipping input {}: {}", input.display(), e);
                    report.failed.push(FailedInput {
                        path: input.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!("Ingesting {} files", files.len());

        let (tx, mut rx) = mpsc::channel(files.len().max(1));
        for path in files {
            let tx = tx.clone();
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                ingest_file(store, path, tx).await;
            });
        }
        drop(tx);

        while let Some(event) = rx.recv().await {
            match event {
                IngestEvent::Loaded(summary) => report.loaded.push(summary),
                IngestEvent::Failed(failure) => report.failed.push(failure),
            }
        }

        info!(
            "Ingested {} datasets ({} records, {} dropped rows, {} failed inputs)",
            report.loaded.len(),
            report.total_records(),
            report.total_dropped(),
            report.failed.len()
        );
        report
    }
}

// ── Per-file task ─────────────────────────────────────────────────────────────

async fn ingest_file(store: Arc<DatasetStore>, path: PathBuf, tx: mpsc::Sender<IngestEvent>) {
    match read_sources(&path).await {
        Ok(sources) => {
            for source in sources {
                let summary = process_content(&store, &source.text, &source.name);
                if tx.send(IngestEvent::Loaded(summary)).await.is_err() {
                    debug!("Ingest receiver dropped; stopping {}", path.display());
                    return;
                }
            }
        }
        Err(e) => {
            warn!("Failed to ingest {}: {}", path.display(), e);
            let failure = FailedInput {
                path,
                error: e.to_string(),
            };
            if tx.send(IngestEvent::Failed(failure)).await.is_err() {
                debug!("Ingest receiver dropped before failure was reported");
            }
        }
    }
}

/// Read one input file into named text blobs.
async fn read_sources(path: &Path) -> Result<Vec<SourceFile>> {
    let kind = InputKind::from_path(path)
        .ok_or_else(|| AnalyzerError::UnsupportedInput(path.to_path_buf()))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AnalyzerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    match kind {
        InputKind::Text => sources_from_bytes(path, kind, &bytes),
        InputKind::Archive => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || sources_from_bytes(&path, kind, &bytes))
                .await
                .map_err(|e| AnalyzerError::Archive(format!("extraction task failed: {e}")))?
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::models::RecordSchema;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const LB_CSV: &str = "normalized_url,elb_status_code,request_verb,processing_time_bucket,count,total_requests,percentage\n\
                          /api/a,200,GET,0-1,5,10,50\n\
                          /api/a,500,GET,10-30,5,10,50\n";

    const SLOW_CSV: &str = "time,processing_time,request_url,elb_status_code\n\
                            2024-01-01T00:00:00Z,12.5,/api/players/42,200\n";

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = SimpleFileOptions::default();
            for (name, text) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(text.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        std::fs::write(path, buf).unwrap();
    }

    fn ingestor() -> Ingestor {
        Ingestor::new(Arc::new(DatasetStore::new()))
    }

    #[tokio::test]
    async fn test_ingest_plain_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lb.csv"), LB_CSV).unwrap();
        std::fs::write(dir.path().join("errors.txt"), "42 \"disk full\"\n").unwrap();

        let ingestor = ingestor();
        let report = ingestor.ingest(&[dir.path().to_path_buf()]).await;

        assert!(report.failed.is_empty());
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.total_records(), 3);
        assert_eq!(
            ingestor.store().active_schemas(),
            vec![RecordSchema::LoadBalancerSummary, RecordSchema::ErrorSummary]
        );
        assert_eq!(
            ingestor.store().filename(RecordSchema::LoadBalancerSummary).as_deref(),
            Some("lb.csv")
        );
    }

    #[tokio::test]
    async fn test_ingest_zip_bundle() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("exports.zip");
        write_zip(
            &bundle,
            &[("lb.csv", LB_CSV), ("slow.csv", SLOW_CSV), ("notes.md", "skip me")],
        );

        let ingestor = ingestor();
        let report = ingestor.ingest(&[bundle]).await;

        assert!(report.failed.is_empty());
        assert_eq!(report.loaded.len(), 2);
        let snapshot = ingestor.store().snapshot();
        assert_eq!(snapshot.slow_queries().unwrap()[0].player_id, "42");
        assert_eq!(snapshot.filename(RecordSchema::SlowQuery), Some("slow.csv"));
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_other_inputs() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("lb.csv");
        let corrupt = dir.path().join("broken.zip");
        let missing = dir.path().join("missing.csv");
        std::fs::write(&good, LB_CSV).unwrap();
        std::fs::write(&corrupt, b"this is not a zip").unwrap();

        let ingestor = ingestor();
        let report = ingestor
            .ingest(&[missing.clone(), corrupt.clone(), good])
            .await;

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().any(|f| f.path == missing));
        assert!(report.failed.iter().any(|f| f.path == corrupt));
        assert_eq!(
            ingestor.store().active_schemas(),
            vec![RecordSchema::LoadBalancerSummary]
        );
    }

    #[tokio::test]
    async fn test_same_schema_inputs_leave_one_consistent_slot() {
        let dir = TempDir::new().unwrap();
        let one_row = "normalized_url,elb_status_code,request_verb,processing_time_bucket,count,total_requests,percentage\n\
                       /only,200,GET,0-1,1,1,100\n";
        std::fs::write(dir.path().join("a.csv"), LB_CSV).unwrap();
        std::fs::write(dir.path().join("b.csv"), one_row).unwrap();

        let ingestor = ingestor();
        let report = ingestor.ingest(&[dir.path().to_path_buf()]).await;
        assert_eq!(report.loaded.len(), 2);

        // Whichever load wrote last owns both the records and the filename.
        let winner = report
            .loaded
            .iter()
            .max_by_key(|l| l.generation)
            .unwrap();
        let slot = ingestor
            .store()
            .slot(RecordSchema::LoadBalancerSummary)
            .unwrap();
        assert_eq!(slot.filename, winner.name);
        assert_eq!(slot.dataset.len(), winner.records);
    }

    #[tokio::test]
    async fn test_second_ingest_replaces_previous_load() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        std::fs::write(&first, "1 \"a\"\n2 \"b\"\n").unwrap();
        std::fs::write(&second, "3 \"c\"\n").unwrap();

        let ingestor = ingestor();
        ingestor.ingest(&[first]).await;
        let report = ingestor.ingest(&[second]).await;

        assert_eq!(report.loaded[0].records, 1);
        let snapshot = ingestor.store().snapshot();
        assert_eq!(snapshot.error_summary().unwrap().len(), 1);
        assert_eq!(snapshot.filename(RecordSchema::ErrorSummary), Some("second.txt"));
    }
}
