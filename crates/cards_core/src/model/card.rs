//! Card domain model.
//!
//! # Responsibility
//! - Define the card record and its enumerated `type`/`status` values.
//! - Define validated write payloads (`NewCard`, `CardPatch`).
//!
//! # Invariants
//! - `kind` and `status` are always one of their enumerated values.
//! - `tags` is the decoded sequence, never the persisted blob.
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned, monotonically increasing card identifier.
pub type CardId = i64;

/// Card category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Actionable item. Default for new cards.
    #[default]
    Task,
    /// Free-form note.
    Note,
    /// Longer-running objective.
    Goal,
}

impl CardType {
    /// All accepted wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["task", "note", "goal"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
            Self::Goal => "goal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "task" => Some(Self::Task),
            "note" => Some(Self::Note),
            "goal" => Some(Self::Goal),
            _ => None,
        }
    }
}

/// Card lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    /// Not started. Default for new cards.
    #[default]
    Todo,
    /// In progress.
    Doing,
    /// Finished.
    Done,
}

impl CardStatus {
    /// All accepted wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["todo", "doing", "done"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Canonical card record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    /// 1-120 characters.
    pub title: String,
    /// Absent is distinct from empty.
    pub content: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: CardType,
    pub status: CardStatus,
    /// Decoded tag sequence, at most 12 entries when written through the store.
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful mutation.
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for card creation.
///
/// Defaults (`task`, `todo`, no tags) are already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub content: Option<String>,
    pub kind: CardType,
    pub status: CardStatus,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewCard {
    /// Creates a payload with the given title and every other field defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Presence-aware value for one field of a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the request; keep the stored value.
    #[default]
    Unset,
    /// Field explicitly null; clear the stored value.
    Clear,
    /// Field present with a value; replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Borrows the present value, keeping `Unset`/`Clear` as-is.
    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Unset => Patch::Unset,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(value),
        }
    }

    /// Converts to the nullable value to write, or `None` when the field is unset.
    pub fn into_write(self) -> Option<Option<T>> {
        match self {
            Self::Unset => None,
            Self::Clear => Some(None),
            Self::Set(value) => Some(Some(value)),
        }
    }
}

/// Validated partial update.
///
/// Only `content` and `due_date` are nullable; the remaining fields are
/// either replaced or left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub content: Patch<String>,
    pub kind: Option<CardType>,
    pub status: Option<CardStatus>,
    pub tags: Option<Vec<String>>,
    pub due_date: Patch<DateTime<Utc>>,
}

impl CardPatch {
    /// Returns whether the patch changes no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_unset()
            && self.kind.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.due_date.is_unset()
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardStatus, CardType, Patch};
    use chrono::{TimeZone, Utc};

    #[test]
    fn enum_values_round_trip_through_parse() {
        for value in CardType::VALUES {
            assert_eq!(CardType::parse(value).map(CardType::as_str), Some(*value));
        }
        for value in CardStatus::VALUES {
            assert_eq!(
                CardStatus::parse(value).map(CardStatus::as_str),
                Some(*value)
            );
        }
        assert_eq!(CardType::parse("Task"), None);
        assert_eq!(CardStatus::parse("in_progress"), None);
    }

    #[test]
    fn card_serializes_with_wire_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let card = Card {
            id: 7,
            title: "Ship v1".to_string(),
            content: None,
            kind: CardType::Goal,
            status: CardStatus::Doing,
            tags: vec!["release".to_string()],
            due_date: None,
            created_at: at,
            updated_at: at,
        };

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["type"], "goal");
        assert_eq!(value["status"], "doing");
        assert_eq!(value["tags"][0], "release");
        assert!(value["content"].is_null());
        assert!(value["dueDate"].is_null());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn patch_into_write_distinguishes_unset_and_clear() {
        assert_eq!(Patch::<i32>::Unset.into_write(), None);
        assert_eq!(Patch::<i32>::Clear.into_write(), Some(None));
        assert_eq!(Patch::Set(3).into_write(), Some(Some(3)));

        let content = Patch::Set("notes".to_string());
        assert_eq!(content.as_ref().into_write(), Some(Some(&"notes".to_string())));
        assert_eq!(content, Patch::Set("notes".to_string()));
    }
}
