//! In-memory store of civilization records.
//!
//! # Responsibility
//! - Own the authoritative list of records shown on the map.
//! - Notify dependent projections after every mutation.
//!
//! # Invariants
//! - Record ids are unique within the store.
//! - Readers never observe a partially replaced list.
//! - The store holds no network state.

pub mod geo_store;
