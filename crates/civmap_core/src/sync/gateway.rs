//! Sync gateway between store intents and the remote service.
//!
//! # Responsibility
//! - Translate list/create/update/delete intents into `CivilizationApi` calls.
//! - Reconcile successful responses back into the `GeoEntityStore`.
//! - Catch and log every remote failure at this boundary.
//!
//! # Invariants
//! - Invalid forms never reach the network.
//! - A failed `list` leaves the store unchanged; rows the store drops are
//!   logged there and do not fail the listing.
//! - Acknowledged writes are followed by a full `list`; the store never
//!   holds a locally guessed record.
//! - `delete` removes the record before the remote call and does not
//!   restore it on failure.
//! - No store borrow is held across an `.await`, and listeners are
//!   published only after the mutable borrow is released.

use crate::model::civilization::{CivilizationForm, CivilizationId, ValidationError};
use crate::store::geo_store::GeoEntityStore;
use crate::sync::api::{ApiError, CivilizationApi};
use log::{error, info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Instant;

pub type SyncResult<T> = Result<T, SyncError>;

/// Gateway-level failures.
#[derive(Debug)]
pub enum SyncError {
    FetchFailed(ApiError),
    CreateFailed(ApiError),
    UpdateFailed {
        id: CivilizationId,
        source: ApiError,
    },
    DeleteFailed {
        id: CivilizationId,
        source: ApiError,
    },
    ValidationFailed(ValidationError),
}

impl SyncError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::CreateFailed(_) => "create_failed",
            Self::UpdateFailed { .. } => "update_failed",
            Self::DeleteFailed { .. } => "delete_failed",
            Self::ValidationFailed(_) => "validation_failed",
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(err) => write!(f, "fetching civilizations failed: {err}"),
            Self::CreateFailed(err) => write!(f, "creating civilization failed: {err}"),
            Self::UpdateFailed { id, source } => {
                write!(f, "updating civilization {id} failed: {source}")
            }
            Self::DeleteFailed { id, source } => {
                write!(f, "deleting civilization {id} failed: {source}")
            }
            Self::ValidationFailed(err) => write!(f, "validation failed: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FetchFailed(err) => Some(err),
            Self::CreateFailed(err) => Some(err),
            Self::UpdateFailed { source, .. } => Some(source),
            Self::DeleteFailed { source, .. } => Some(source),
            Self::ValidationFailed(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SyncError {
    fn from(value: ValidationError) -> Self {
        Self::ValidationFailed(value)
    }
}

/// Gateway bound to one remote service and one shared store.
pub struct SyncGateway<A: CivilizationApi> {
    api: A,
    store: Rc<RefCell<GeoEntityStore>>,
}

impl<A: CivilizationApi> SyncGateway<A> {
    pub fn new(api: A, store: Rc<RefCell<GeoEntityStore>>) -> Self {
        Self { api, store }
    }

    /// Shared handle to the store this gateway reconciles into.
    pub fn store(&self) -> Rc<RefCell<GeoEntityStore>> {
        Rc::clone(&self.store)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetches all records and replaces the store contents.
    ///
    /// Returns the number of records kept by the store.
    pub async fn list(&self) -> SyncResult<usize> {
        let started_at = Instant::now();
        let records = match self.api.list().await {
            Ok(records) => records,
            Err(err) => {
                return Err(log_failure(
                    "civ_list",
                    started_at,
                    None,
                    SyncError::FetchFailed(err),
                ))
            }
        };

        let received = records.len();
        let summary = self.store.borrow_mut().replace_all(records);
        info!(
            "event=civ_list module=sync status=ok count={} received={} dropped={} duration_ms={}",
            summary.kept,
            received,
            summary.dropped_invalid + summary.dropped_duplicate,
            started_at.elapsed().as_millis()
        );
        self.publish();
        Ok(summary.kept)
    }

    /// Validates and sends a new civilization, then re-lists.
    pub async fn create(&self, form: &CivilizationForm) -> SyncResult<()> {
        let started_at = Instant::now();
        if let Err(err) = form.validate() {
            return Err(log_failure("civ_create", started_at, None, err.into()));
        }

        if let Err(err) = self.api.create(form).await {
            return Err(log_failure(
                "civ_create",
                started_at,
                None,
                SyncError::CreateFailed(err),
            ));
        }

        info!(
            "event=civ_create module=sync status=ok has_image={} duration_ms={}",
            form.image.is_some(),
            started_at.elapsed().as_millis()
        );
        self.refresh_after_write("civ_create").await;
        Ok(())
    }

    /// Sends the full field set of `id`, then re-lists.
    pub async fn update(&self, id: CivilizationId, form: &CivilizationForm) -> SyncResult<()> {
        self.push_update(id, form).await?;
        self.refresh_after_write("civ_update").await;
        Ok(())
    }

    /// Sends the full field set of `id` without re-listing.
    ///
    /// `Ok` means the service acknowledged the write; the store is untouched
    /// until the caller refreshes.
    pub async fn push_update(
        &self,
        id: CivilizationId,
        form: &CivilizationForm,
    ) -> SyncResult<()> {
        let started_at = Instant::now();
        if let Err(err) = form.validate() {
            return Err(log_failure("civ_update", started_at, Some(id), err.into()));
        }

        if let Err(source) = self.api.update(id, form).await {
            return Err(log_failure(
                "civ_update",
                started_at,
                Some(id),
                SyncError::UpdateFailed { id, source },
            ));
        }

        info!(
            "event=civ_update module=sync status=ok id={} has_image={} duration_ms={}",
            id,
            form.image.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes `id` from the store immediately, then deletes it remotely.
    ///
    /// A remote failure is reported but the record stays removed until the
    /// next successful `list`.
    pub async fn delete(&self, id: CivilizationId) -> SyncResult<()> {
        let started_at = Instant::now();
        let removed = self.store.borrow_mut().remove(id);
        self.publish();

        if let Err(source) = self.api.delete(id).await {
            return Err(log_failure(
                "civ_delete",
                started_at,
                Some(id),
                SyncError::DeleteFailed { id, source },
            ));
        }

        info!(
            "event=civ_delete module=sync status=ok id={} was_visible={} duration_ms={}",
            id,
            removed,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Re-lists after an acknowledged write. Returns whether the store was
    /// refreshed; a failure only leaves it stale.
    pub async fn refresh_after_write(&self, trigger: &str) -> bool {
        match self.list().await {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    "event=civ_refresh module=sync status=stale trigger={} error_code={}",
                    trigger,
                    err.code()
                );
                false
            }
        }
    }

    fn publish(&self) {
        self.store.borrow().publish();
    }
}

fn log_failure(
    event: &str,
    started_at: Instant,
    id: Option<CivilizationId>,
    err: SyncError,
) -> SyncError {
    let id = id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    match &err {
        SyncError::ValidationFailed(_) => warn!(
            "event={} module=sync status=rejected id={} error_code={} error={}",
            event,
            id,
            err.code(),
            err
        ),
        _ => error!(
            "event={} module=sync status=error id={} duration_ms={} error_code={} error={}",
            event,
            id,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }
    err
}
