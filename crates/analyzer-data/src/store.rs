//! Session-scoped dataset store.
//!
//! Holds at most one dataset and one source filename per schema. A load
//! replaces the slot wholesale; nothing is ever merged. Each slot has its own
//! lock, taken only for the duration of a write or a read, so concurrent
//! loads into the same schema serialize and the last writer wins.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use analyzer_core::models::{
    Dataset, ErrorSummaryEntry, LoadBalancerSummaryEntry, PerformanceMetricsEntry, RecordSchema,
    SlowQueryEntry,
};
use tracing::{debug, info};

/// Contents of one populated slot.
#[derive(Debug, Clone)]
pub struct Slot {
    pub dataset: Arc<Dataset>,
    /// Name of the file (or archive entry) the dataset was parsed from.
    pub filename: String,
    /// Store-wide write sequence number of the load that filled this slot.
    pub generation: u64,
}

/// Four optional slots keyed by [`RecordSchema`].
#[derive(Debug, Default)]
pub struct DatasetStore {
    slots: [Mutex<Option<Slot>>; 4],
    generation: AtomicU64,
}

impl DatasetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, schema: RecordSchema) -> MutexGuard<'_, Option<Slot>> {
        self.slots[schema.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the slot for the dataset's schema and return the write's
    /// generation number.
    ///
    /// Any previously loaded dataset and filename for that schema are
    /// discarded without warning.
    pub fn load(&self, dataset: Dataset, filename: impl Into<String>) -> u64 {
        let schema = dataset.schema();
        let filename = filename.into();
        let records = dataset.len();

        let mut slot = self.lock(schema);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = slot.as_ref() {
            debug!(
                "Replacing {} dataset from {} ({} records)",
                schema,
                previous.filename,
                previous.dataset.len()
            );
        }
        *slot = Some(Slot {
            dataset: Arc::new(dataset),
            filename: filename.clone(),
            generation,
        });
        drop(slot);

        info!("Loaded {} records from {} as {}", records, filename, schema);
        generation
    }

    /// Clear one slot, or every slot when `schema` is `None`.
    pub fn clear(&self, schema: Option<RecordSchema>) {
        match schema {
            Some(s) => {
                *self.lock(s) = None;
                debug!("Cleared {} dataset", s);
            }
            None => {
                for s in RecordSchema::ALL {
                    *self.lock(s) = None;
                }
                debug!("Cleared all datasets");
            }
        }
    }

    /// Schemas that currently hold a dataset, in display order.
    ///
    /// A slot loaded with zero records still counts as populated.
    pub fn active_schemas(&self) -> Vec<RecordSchema> {
        RecordSchema::ALL
            .into_iter()
            .filter(|s| self.lock(*s).is_some())
            .collect()
    }

    /// `true` when no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.active_schemas().is_empty()
    }

    /// Copy of the slot for `schema`.
    pub fn slot(&self, schema: RecordSchema) -> Option<Slot> {
        self.lock(schema).clone()
    }

    pub fn dataset(&self, schema: RecordSchema) -> Option<Arc<Dataset>> {
        self.lock(schema).as_ref().map(|s| Arc::clone(&s.dataset))
    }

    pub fn filename(&self, schema: RecordSchema) -> Option<String> {
        self.lock(schema).as_ref().map(|s| s.filename.clone())
    }

    /// Point-in-time copy of every populated slot.
    pub fn snapshot(&self) -> StoreSnapshot {
        let slots = RecordSchema::ALL
            .into_iter()
            .filter_map(|s| self.slot(s).map(|slot| (s, slot)))
            .collect();
        StoreSnapshot { slots }
    }
}

// ── StoreSnapshot ─────────────────────────────────────────────────────────────

/// Immutable view of the store handed to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    slots: BTreeMap<RecordSchema, Slot>,
}

impl StoreSnapshot {
    pub fn slot(&self, schema: RecordSchema) -> Option<&Slot> {
        self.slots.get(&schema)
    }

    pub fn filename(&self, schema: RecordSchema) -> Option<&str> {
        self.slot(schema).map(|s| s.filename.as_str())
    }

    pub fn schemas(&self) -> Vec<RecordSchema> {
        self.slots.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn load_balancer(&self) -> Option<&[LoadBalancerSummaryEntry]> {
        self.slot(RecordSchema::LoadBalancerSummary)?
            .dataset
            .as_load_balancer()
    }

    pub fn performance(&self) -> Option<&[PerformanceMetricsEntry]> {
        self.slot(RecordSchema::PerformanceMetrics)?
            .dataset
            .as_performance()
    }

    pub fn slow_queries(&self) -> Option<&[SlowQueryEntry]> {
        self.slot(RecordSchema::SlowQuery)?.dataset.as_slow_queries()
    }

    pub fn error_summary(&self) -> Option<&[ErrorSummaryEntry]> {
        self.slot(RecordSchema::ErrorSummary)?
            .dataset
            .as_error_summary()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
