//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical card record returned to callers.
//! - Define the persisted tag encoding shared by write and read paths.
//!
//! # Invariants
//! - Every card is identified by a server-assigned `CardId` that is never reused.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod card;
pub mod tags;
