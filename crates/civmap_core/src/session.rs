//! Map session: the composition root behind one map view.
//!
//! # Responsibility
//! - Route UI events to the new-civilization draft, edit drafts and the
//!   sync gateway.
//! - Expose the current marker set and re-project it on store changes.
//!
//! # Invariants
//! - The new-civilization draft is reset only after a successful create.
//! - An edit draft is cleared only after its update is acknowledged, and
//!   only if nothing was typed into it while the request was in flight.
//! - Marker listeners see the settled draft state in the render that
//!   follows an acknowledged update.
//! - Closing or deleting a record drops its draft; in-flight requests still
//!   complete.

use crate::draft::editor::{DraftEditor, DraftError, SettleOutcome};
use crate::draft::field::DraftEdit;
use crate::model::civilization::{CivilizationId, NewCivilizationDraft};
use crate::projection::marker::{Marker, MarkerProjector};
use crate::projection::viewport::MapViewport;
use crate::store::geo_store::{GeoEntityStore, SubscriptionId};
use crate::sync::api::CivilizationApi;
use crate::sync::gateway::{SyncError, SyncGateway, SyncResult};
use log::debug;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    /// The record is not in the store.
    UnknownRecord(CivilizationId),
    Draft(DraftError),
    Sync(SyncError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRecord(id) => write!(f, "civilization {id} is not on the map"),
            Self::Draft(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownRecord(_) => None,
            Self::Draft(err) => Some(err),
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<DraftError> for SessionError {
    fn from(value: DraftError) -> Self {
        Self::Draft(value)
    }
}

impl From<SyncError> for SessionError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

/// State and intents of one interactive map.
pub struct MapSession<A: CivilizationApi> {
    gateway: SyncGateway<A>,
    store: Rc<RefCell<GeoEntityStore>>,
    drafts: Rc<RefCell<DraftEditor>>,
    new_draft: RefCell<NewCivilizationDraft>,
    projector: Rc<MarkerProjector>,
    viewport: MapViewport,
}

impl<A: CivilizationApi> MapSession<A> {
    pub fn new(api: A, projector: MarkerProjector) -> Self {
        let store = Rc::new(RefCell::new(GeoEntityStore::new()));
        Self {
            gateway: SyncGateway::new(api, Rc::clone(&store)),
            store,
            drafts: Rc::new(RefCell::new(DraftEditor::new())),
            new_draft: RefCell::new(NewCivilizationDraft::default()),
            projector: Rc::new(projector),
            viewport: MapViewport::default(),
        }
    }

    pub fn gateway(&self) -> &SyncGateway<A> {
        &self.gateway
    }

    pub fn store(&self) -> Rc<RefCell<GeoEntityStore>> {
        Rc::clone(&self.store)
    }

    pub fn viewport(&self) -> &MapViewport {
        &self.viewport
    }

    pub fn projector(&self) -> &MarkerProjector {
        &self.projector
    }

    /// Loads the initial record list.
    pub async fn mount(&self) -> SyncResult<usize> {
        self.gateway.list().await
    }

    /// Snapshot of the "add civilization" form.
    pub fn new_draft(&self) -> NewCivilizationDraft {
        self.new_draft.borrow().clone()
    }

    pub fn edit_new(&self, edit: DraftEdit) {
        edit.apply(&mut self.new_draft.borrow_mut());
    }

    /// Submits the "add civilization" form.
    ///
    /// The form is reset on success and kept intact on any failure.
    pub async fn submit_new(&self) -> SyncResult<()> {
        let form = self.new_draft();
        self.gateway.create(&form).await?;
        *self.new_draft.borrow_mut() = NewCivilizationDraft::default();
        Ok(())
    }

    /// Opens the popup editor for `id`, snapshotting the stored record.
    pub fn open_editor(&self, id: CivilizationId) -> SessionResult<()> {
        let store = self.store.borrow();
        let record = store.get(id).ok_or(SessionError::UnknownRecord(id))?;
        self.drafts.borrow_mut().begin_edit(record);
        Ok(())
    }

    /// Applies one keystroke-level change; ignored if the editor is closed.
    pub fn edit(&self, id: CivilizationId, edit: DraftEdit) -> bool {
        self.drafts.borrow_mut().set_field(id, edit)
    }

    pub fn close_editor(&self, id: CivilizationId) -> bool {
        self.drafts.borrow_mut().discard(id)
    }

    pub fn is_editing(&self, id: CivilizationId) -> bool {
        self.drafts.borrow().is_editing(id)
    }

    /// Submits the draft for `id`.
    ///
    /// The draft stays open when the update fails so the user can retry,
    /// and when it was edited or reopened while the update was in flight.
    pub async fn submit_edit(&self, id: CivilizationId) -> SessionResult<()> {
        let form = self.drafts.borrow().pending(id)?;
        self.gateway.push_update(id, &form).await?;

        // Settle before re-listing so the refresh render has the final draft state.
        let outcome = self.drafts.borrow_mut().settle(id, &form);
        let refreshed = self.gateway.refresh_after_write("civ_update").await;
        if !refreshed && outcome == SettleOutcome::Cleared {
            debug!("event=draft_settle module=session status=republish id={id}");
            self.store.borrow().republish();
        }
        Ok(())
    }

    /// Drops any open draft for `id` and deletes the record optimistically.
    pub async fn delete(&self, id: CivilizationId) -> SyncResult<()> {
        self.drafts.borrow_mut().discard(id);
        self.gateway.delete(id).await
    }

    /// Current markers with draft-backed popup forms.
    pub fn markers(&self) -> Vec<Marker> {
        let store = self.store.borrow();
        let drafts = self.drafts.borrow();
        self.projector
            .project_with_drafts(store.records(), &drafts)
            .collect()
    }

    /// Calls `on_change` with a fresh marker set after every store mutation.
    pub fn on_markers_changed(
        &self,
        mut on_change: impl FnMut(Vec<Marker>) + 'static,
    ) -> SubscriptionId {
        let projector = Rc::clone(&self.projector);
        let drafts = Rc::clone(&self.drafts);
        self.store.borrow_mut().subscribe(move |records| {
            let drafts = drafts.borrow();
            on_change(projector.project_with_drafts(records, &drafts).collect());
        })
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.store.borrow_mut().unsubscribe(subscription)
    }
}
