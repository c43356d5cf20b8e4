//! Read-only map projections of store state.
//!
//! # Responsibility
//! - Turn records (plus open drafts) into markers, icons and popups.
//! - Describe the fixed viewport the renderer draws them in.
//!
//! # Invariants
//! - Projections hold no memory of earlier runs.

pub mod icons;
pub mod marker;
pub mod viewport;
