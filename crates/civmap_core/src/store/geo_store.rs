//! Geo entity store.
//!
//! # Responsibility
//! - Provide whole-list replacement, full-record upsert and removal.
//! - Keep iteration order equal to the order of the last `replace_all`,
//!   with upserted newcomers appended.
//! - Publish the list to listeners once the caller has released its
//!   mutable borrow.
//!
//! # Invariants
//! - Every stored record passed `CivilizationRecord::validate()`.
//! - Record ids are unique; `replace_all` keeps the first row per id.
//! - `upsert` replaces a record wholesale, never field-by-field.
//! - Mutations only stage a change; listeners run from `publish(&self)`,
//!   so they may read the store but must not mutate it.

use crate::model::civilization::{CivilizationId, CivilizationRecord, ValidationError};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors for store mutations that would break record invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    InvalidRecord {
        id: CivilizationId,
        source: ValidationError,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord { id, source } => {
                write!(f, "civilization {id} is invalid: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord { source, .. } => Some(source),
        }
    }
}

/// Result of an `upsert` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// What `replace_all` kept out of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceSummary {
    pub kept: usize,
    pub dropped_invalid: usize,
    pub dropped_duplicate: usize,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[CivilizationRecord])>;

/// Authoritative in-memory list of civilization records.
#[derive(Default)]
pub struct GeoEntityStore {
    records: Vec<CivilizationRecord>,
    revision: u64,
    published_revision: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: u64,
}

impl GeoEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the whole list.
    ///
    /// Rows that fail validation are dropped with a warning, and a repeated
    /// id keeps its first row. The remaining rows are swapped in as one
    /// change, in listing order.
    pub fn replace_all(&mut self, records: Vec<CivilizationRecord>) -> ReplaceSummary {
        let mut summary = ReplaceSummary::default();
        let mut seen = HashSet::with_capacity(records.len());
        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            if let Err(err) = validate_record(&record) {
                warn!(
                    "event=store_drop_record module=store status=rejected id={} reason=invalid error={}",
                    record.id, err
                );
                summary.dropped_invalid += 1;
                continue;
            }
            if !seen.insert(record.id) {
                warn!(
                    "event=store_drop_record module=store status=rejected id={} reason=duplicate_id",
                    record.id
                );
                summary.dropped_duplicate += 1;
                continue;
            }
            accepted.push(record);
        }

        summary.kept = accepted.len();
        self.records = accepted;
        self.mark_changed("replace_all");
        summary
    }

    /// Inserts a new record or replaces the record with the same id.
    pub fn upsert(&mut self, record: CivilizationRecord) -> StoreResult<UpsertOutcome> {
        validate_record(&record)?;

        let outcome = match self.position(record.id) {
            Some(index) => {
                self.records[index] = record;
                UpsertOutcome::Replaced
            }
            None => {
                self.records.push(record);
                UpsertOutcome::Inserted
            }
        };
        self.mark_changed("upsert");
        Ok(outcome)
    }

    /// Removes the record with `id`. Returns `false` when it was absent.
    pub fn remove(&mut self, id: CivilizationId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.records.remove(index);
        self.mark_changed("remove");
        true
    }

    pub fn records(&self) -> &[CivilizationRecord] {
        &self.records
    }

    pub fn get(&self, id: CivilizationId) -> Option<&CivilizationRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: CivilizationId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotonic counter bumped by every applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a listener called with the full list on each publish.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&[CivilizationRecord]) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.get_mut().push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let listeners = self.listeners.get_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Calls listeners if a mutation happened since the last publish.
    ///
    /// Returns whether listeners were called.
    pub fn publish(&self) -> bool {
        if self.published_revision.get() == self.revision {
            return false;
        }
        self.republish();
        true
    }

    /// Calls listeners with the current list unconditionally.
    ///
    /// Used when derived view state changed without a store mutation.
    pub fn republish(&self) {
        self.published_revision.set(self.revision);
        let mut listeners = self.listeners.borrow_mut();
        for (_, listener) in listeners.iter_mut() {
            listener(&self.records);
        }
    }

    fn position(&self, id: CivilizationId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn mark_changed(&mut self, operation: &str) {
        self.revision += 1;
        debug!(
            "event=store_mutation module=store status=ok op={} revision={} count={}",
            operation,
            self.revision,
            self.records.len()
        );
    }
}

fn validate_record(record: &CivilizationRecord) -> StoreResult<()> {
    record
        .validate()
        .map_err(|source| StoreError::InvalidRecord {
            id: record.id,
            source,
        })
}
