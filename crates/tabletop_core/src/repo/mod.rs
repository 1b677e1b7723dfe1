//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories persist what they are given; validation and ownership
//!   checks belong to the service layer.
//! - Repository APIs return semantic errors (`NotFound`, `RevisionConflict`)
//!   in addition to DB transport errors.

pub mod game_repo;
