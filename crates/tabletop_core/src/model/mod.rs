//! Game document model and identifiers.
//!
//! # Responsibility
//! - Define the canonical game tree: game, containers, items, counters.
//! - Generate and recognize the two identifier formats used by the tree.
//!
//! # Invariants
//! - Containers, items and counters use 36-char entity ids.
//! - Games and players use 24-char document ids.

pub mod game;
pub mod ids;
