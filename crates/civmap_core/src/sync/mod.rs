//! Remote synchronization for civilization records.
//!
//! # Responsibility
//! - Define the remote service seam (`CivilizationApi`) and its HTTP adapter.
//! - Reconcile remote results into the shared store via `SyncGateway`.
//!
//! # Invariants
//! - Network failures stop at the gateway boundary and are logged there.
//! - The backend is the only source of server-derived fields.

pub mod api;
pub mod gateway;
pub mod http;
