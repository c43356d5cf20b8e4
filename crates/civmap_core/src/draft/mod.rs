//! Unsaved form state for create and edit flows.
//!
//! # Responsibility
//! - Stage field edits against isolated per-record shadow copies.
//! - Parse raw form input into typed field changes.
//!
//! # Invariants
//! - A draft never mutates the record it shadows.
//! - Drafts for different ids share no mutable state.

pub mod editor;
pub mod field;
