//! Per-record edit drafts.
//!
//! # Responsibility
//! - Snapshot a record into an isolated `EditDraft` when its editor opens.
//! - Stage keystrokes field-by-field and hand the values out on submit.
//!
//! # Invariants
//! - At most one draft per record id; the latest `begin_edit` wins.
//! - `set_field` on an unknown id is a silent no-op.
//! - Drafts are cleared only by `commit`, `settle` or `discard`, never
//!   speculatively.
//! - `settle` never clears input typed after the submitted values were
//!   taken.

use crate::draft::field::DraftEdit;
use crate::model::civilization::{CivilizationForm, CivilizationId, CivilizationRecord};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    NoActiveDraft(CivilizationId),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveDraft(id) => write!(f, "no active draft for civilization {id}"),
        }
    }
}

impl Error for DraftError {}

/// Shadow copy of one record's mutable fields during an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: CivilizationId,
    pub form: CivilizationForm,
}

impl EditDraft {
    fn snapshot(record: &CivilizationRecord) -> Self {
        Self {
            id: record.id,
            form: CivilizationForm::new(record.fields()),
        }
    }
}

/// How `settle` treated a draft after its update was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The draft still held the submitted values and was cleared.
    Cleared,
    /// The draft changed while the update was in flight and stays open.
    Kept,
    /// No draft was open for the id.
    Missing,
}

/// Edit drafts keyed by record id.
#[derive(Debug, Default)]
pub struct DraftEditor {
    drafts: BTreeMap<CivilizationId, EditDraft>,
}

impl DraftEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or reopens) a draft from the record's current values.
    ///
    /// An existing draft for the same id is replaced, not merged.
    pub fn begin_edit(&mut self, record: &CivilizationRecord) -> &EditDraft {
        debug!(
            "event=draft_begin module=draft status=ok id={} replaced={}",
            record.id,
            self.drafts.contains_key(&record.id)
        );
        self.drafts.insert(record.id, EditDraft::snapshot(record));
        &self.drafts[&record.id]
    }

    /// Applies one field change. Returns `false` when no draft exists.
    pub fn set_field(&mut self, id: CivilizationId, edit: DraftEdit) -> bool {
        match self.drafts.get_mut(&id) {
            Some(draft) => {
                edit.apply(&mut draft.form);
                true
            }
            None => {
                debug!("event=draft_set_field module=draft status=skipped id={id}");
                false
            }
        }
    }

    /// Returns the draft values for submission and clears the draft.
    pub fn commit(&mut self, id: CivilizationId) -> DraftResult<CivilizationForm> {
        self.drafts
            .remove(&id)
            .map(|draft| draft.form)
            .ok_or(DraftError::NoActiveDraft(id))
    }

    /// Returns a copy of the draft values without clearing the draft.
    pub fn pending(&self, id: CivilizationId) -> DraftResult<CivilizationForm> {
        self.drafts
            .get(&id)
            .map(|draft| draft.form.clone())
            .ok_or(DraftError::NoActiveDraft(id))
    }

    /// Clears the draft for `id` only if it still equals `submitted`.
    pub fn settle(&mut self, id: CivilizationId, submitted: &CivilizationForm) -> SettleOutcome {
        let unchanged = self.drafts.get(&id).map(|draft| draft.form == *submitted);
        let outcome = match unchanged {
            None => SettleOutcome::Missing,
            Some(true) => {
                self.drafts.remove(&id);
                SettleOutcome::Cleared
            }
            Some(false) => SettleOutcome::Kept,
        };
        debug!("event=draft_settle module=draft status=ok id={id} outcome={outcome:?}");
        outcome
    }

    /// Drops the draft when its editor closes. Returns whether one existed.
    pub fn discard(&mut self, id: CivilizationId) -> bool {
        self.drafts.remove(&id).is_some()
    }

    pub fn get(&self, id: CivilizationId) -> Option<&EditDraft> {
        self.drafts.get(&id)
    }

    pub fn is_editing(&self, id: CivilizationId) -> bool {
        self.drafts.contains_key(&id)
    }

    /// Ids with an open draft, ascending.
    pub fn active_ids(&self) -> Vec<CivilizationId> {
        self.drafts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
