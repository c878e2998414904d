//! Card use-case services.
//!
//! # Responsibility
//! - Run validation, persistence and filtering in sequence per request.
//! - Keep transport layers decoupled from storage details.

pub mod card_service;
