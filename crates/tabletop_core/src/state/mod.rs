//! In-memory game state transitions.
//!
//! # Responsibility
//! - Reconcile partial edits (one container, item or counter) into a whole
//!   game without touching storage.
//!
//! # Invariants
//! - Transitions are pure; persistence happens only through services.

pub mod reducer;
