//! In-memory civilization service for gateway and session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use civmap_core::{
    ApiError, ApiResult, CivilizationApi, CivilizationForm, CivilizationId, CivilizationRecord,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct BackendState {
    records: Vec<CivilizationRecord>,
    next_id: CivilizationId,
    failing: HashSet<Op>,
    delays: HashMap<Op, VecDeque<Duration>>,
    calls: Vec<Op>,
}

/// Cloneable handle to a fake backend; clones share state.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<CivilizationRecord>) -> Self {
        let next_id = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        Self {
            state: Rc::new(RefCell::new(BackendState {
                records,
                next_id,
                ..BackendState::default()
            })),
        }
    }

    /// Makes the next call of `op` fail with a 500.
    pub fn fail_next(&self, op: Op) {
        self.state.borrow_mut().failing.insert(op);
    }

    /// Queues a latency for the next call of `op`.
    pub fn delay_next(&self, op: Op, delay: Duration) {
        self.state
            .borrow_mut()
            .delays
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    /// Replaces server-side data without going through the API.
    pub fn set_records(&self, records: Vec<CivilizationRecord>) {
        self.state.borrow_mut().records = records;
    }

    pub fn records(&self) -> Vec<CivilizationRecord> {
        self.state.borrow().records.clone()
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| **call == op)
            .count()
    }

    fn begin(&self, op: Op, method: &'static str, path: String) -> ApiResult<Option<Duration>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(op);
        if state.failing.remove(&op) {
            return Err(ApiError::Status {
                method,
                path,
                status: 500,
            });
        }
        Ok(state.delays.get_mut(&op).and_then(VecDeque::pop_front))
    }
}

async fn wait(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

fn record_from_form(id: CivilizationId, form: &CivilizationForm) -> CivilizationRecord {
    CivilizationRecord {
        id,
        name: form.fields.name.clone(),
        description: form.fields.description.clone(),
        latitude: form.fields.latitude,
        longitude: form.fields.longitude,
        image_ref: form
            .image
            .as_ref()
            .map(|image| format!("/uploads/{}", image.file_name)),
    }
}

#[async_trait(?Send)]
impl CivilizationApi for FakeBackend {
    async fn list(&self) -> ApiResult<Vec<CivilizationRecord>> {
        let delay = self.begin(Op::List, "GET", "/civilizations".to_string())?;
        // Snapshot at request time, like a server reading before a slow reply.
        let snapshot = self.records();
        wait(delay).await;
        Ok(snapshot)
    }

    async fn create(&self, form: &CivilizationForm) -> ApiResult<()> {
        let delay = self.begin(Op::Create, "POST", "/civilizations".to_string())?;
        wait(delay).await;
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.records.push(record_from_form(id, form));
        Ok(())
    }

    async fn update(&self, id: CivilizationId, form: &CivilizationForm) -> ApiResult<()> {
        let path = format!("/civilizations/{id}");
        let delay = self.begin(Op::Update, "PUT", path.clone())?;
        wait(delay).await;
        let mut state = self.state.borrow_mut();
        let Some(existing) = state.records.iter_mut().find(|record| record.id == id) else {
            return Err(ApiError::Status {
                method: "PUT",
                path,
                status: 404,
            });
        };
        let mut updated = record_from_form(id, form);
        if updated.image_ref.is_none() {
            updated.image_ref = existing.image_ref.clone();
        }
        *existing = updated;
        Ok(())
    }

    async fn delete(&self, id: CivilizationId) -> ApiResult<()> {
        let path = format!("/civilizations/{id}");
        let delay = self.begin(Op::Delete, "DELETE", path.clone())?;
        wait(delay).await;
        let mut state = self.state.borrow_mut();
        let before = state.records.len();
        state.records.retain(|record| record.id != id);
        if state.records.len() == before {
            return Err(ApiError::Status {
                method: "DELETE",
                path,
                status: 404,
            });
        }
        Ok(())
    }
}

pub fn civ(id: CivilizationId, name: &str, latitude: f64, longitude: f64) -> CivilizationRecord {
    CivilizationRecord::new(id, name, latitude, longitude)
}
