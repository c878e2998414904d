//! Card use-case service.
//!
//! # Responsibility
//! - Validate request bodies before they reach the repository.
//! - Filter listings after retrieval.
//! - Lift repository `NotFound` into a service-level error.
//!
//! # Invariants
//! - A request with any validation failure performs no write.
//! - Storage failures are surfaced unchanged; nothing is retried.

use crate::filter::CardFilter;
use crate::model::card::{Card, CardId};
use crate::repo::card_repo::{CardRepository, RepoError};
use crate::validation::{validate_create, validate_update, ValidationError};
use log::{debug, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CardServiceResult<T> = Result<T, CardServiceError>;

/// Service error for card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Malformed or out-of-range input.
    Validation(ValidationError),
    /// Target card does not exist.
    NotFound(CardId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for CardServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Card service facade over repository implementations.
pub struct CardService<R: CardRepository> {
    repo: R,
}

impl<R: CardRepository> CardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a create body and persists the card.
    pub fn create_card(&self, body: &Value) -> CardServiceResult<Card> {
        let new_card = validate_create(body)?;
        let card = self.repo.create_card(&new_card)?;
        info!(
            "event=card_create module=service status=ok card_id={} tag_count={}",
            card.id,
            card.tags.len()
        );
        Ok(card)
    }

    /// Lists cards (most recently updated first) narrowed by `filter`.
    pub fn list_cards(&self, filter: &CardFilter) -> CardServiceResult<Vec<Card>> {
        let all = self.repo.list_cards()?;
        let total = all.len();
        let cards = filter.apply(all);
        debug!(
            "event=card_list module=service status=ok total={total} returned={}",
            cards.len()
        );
        Ok(cards)
    }

    /// Gets one card by id.
    pub fn get_card(&self, id: CardId) -> CardServiceResult<Card> {
        self.repo.get_card(id)?.ok_or(CardServiceError::NotFound(id))
    }

    /// Validates an update body and applies only the supplied fields.
    pub fn update_card(&self, id: CardId, body: &Value) -> CardServiceResult<Card> {
        let patch = validate_update(body)?;
        let card = self.repo.update_card(id, &patch)?;
        info!(
            "event=card_update module=service status=ok card_id={id} empty_patch={}",
            patch.is_empty()
        );
        Ok(card)
    }

    /// Permanently deletes one card.
    pub fn delete_card(&self, id: CardId) -> CardServiceResult<()> {
        self.repo.delete_card(id)?;
        info!("event=card_delete module=service status=ok card_id={id}");
        Ok(())
    }
}
