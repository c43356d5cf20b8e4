//! Civilization domain model.
//!
//! # Responsibility
//! - Define the server-owned record and the client-owned form shapes.
//! - Keep coordinate and name invariants next to the data they guard.
//!
//! # Invariants
//! - Every record is identified by a backend-assigned `CivilizationId`.
//! - Stored coordinates are finite and inside world bounds.

pub mod civilization;
pub mod image;
