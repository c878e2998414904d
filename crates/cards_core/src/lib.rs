//! Core card management logic.
//! This crate owns validation, tag encoding, filtering and persistence of cards.

pub mod api;
pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use api::{ApiRequest, ApiResponse, CardApi};
pub use config::{ConfigError, CoreConfig};
pub use filter::CardFilter;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::card::{Card, CardId, CardPatch, CardStatus, CardType, NewCard, Patch};
pub use model::tags::{decode_tags, encode_tags, MAX_TAGS};
pub use repo::card_repo::{CardRepository, RepoError, RepoResult, SqliteCardRepository};
pub use service::card_service::{CardService, CardServiceError, CardServiceResult};
pub use validation::{
    parse_card_id, validate_create, validate_update, ValidationError, ValidationReason,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
