//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the card store contract used by services.
//! - Isolate SQLite query details from request orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Identifiers reaching the repository are already validated.

pub mod card_repo;
