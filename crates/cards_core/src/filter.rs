//! In-memory card filtering applied after retrieval.
//!
//! # Invariants
//! - Predicates compose conjunctively; absent predicates impose no constraint.
//! - `q` matches title or content case-insensitively (absent content is empty).
//! - `type`/`status` values outside the enumerations are ignored, not rejected.
//! - Input order is preserved.

use crate::model::card::{Card, CardStatus, CardType};

/// Optional list predicates taken from query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    /// Lowercased free-text needle.
    pub q: Option<String>,
    pub kind: Option<CardType>,
    pub status: Option<CardStatus>,
    /// Exact tag membership.
    pub tag: Option<String>,
}

impl CardFilter {
    /// Builds a filter from raw query parameter values.
    ///
    /// Empty strings are treated as absent.
    pub fn from_params(
        q: Option<&str>,
        kind: Option<&str>,
        status: Option<&str>,
        tag: Option<&str>,
    ) -> Self {
        Self {
            q: non_empty(q).map(str::to_lowercase),
            kind: kind.and_then(CardType::parse),
            status: status.and_then(CardStatus::parse),
            tag: non_empty(tag).map(str::to_string),
        }
    }

    /// Builds a filter from `(name, value)` query pairs; the last value wins.
    pub fn from_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let (mut q, mut kind, mut status, mut tag) = (None, None, None, None);
        for (name, value) in pairs {
            match name {
                "q" => q = Some(value),
                "type" => kind = Some(value),
                "status" => status = Some(value),
                "tag" => tag = Some(value),
                _ => {}
            }
        }
        Self::from_params(q, kind, status, tag)
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.kind.is_none() && self.status.is_none() && self.tag.is_none()
    }

    /// Returns whether `card` satisfies every present predicate.
    pub fn matches(&self, card: &Card) -> bool {
        if let Some(needle) = self.q.as_deref() {
            let in_title = card.title.to_lowercase().contains(needle);
            let in_content = card
                .content
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(needle);
            if !in_title && !in_content {
                return false;
            }
        }
        if self.kind.is_some_and(|kind| kind != card.kind) {
            return false;
        }
        if self.status.is_some_and(|status| status != card.status) {
            return false;
        }
        if let Some(tag) = self.tag.as_deref() {
            if !card.tags.iter().any(|candidate| candidate == tag) {
                return false;
            }
        }
        true
    }

    /// Keeps the cards matching every present predicate, in input order.
    pub fn apply(&self, cards: Vec<Card>) -> Vec<Card> {
        if self.is_empty() {
            return cards;
        }
        cards.into_iter().filter(|card| self.matches(card)).collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::CardFilter;
    use crate::model::card::{Card, CardStatus, CardType};
    use chrono::{TimeZone, Utc};

    fn card(id: i64, title: &str, content: Option<&str>, tags: &[&str]) -> Card {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Card {
            id,
            title: title.to_string(),
            content: content.map(str::to_string),
            kind: CardType::Task,
            status: CardStatus::Todo,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            due_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(cards: &[Card]) -> Vec<i64> {
        cards.iter().map(|card| card.id).collect()
    }

    fn sample() -> Vec<Card> {
        let mut sync = card(1, "Weekly sync", Some("Meeting notes"), &["work"]);
        sync.kind = CardType::Note;
        let mut milk = card(2, "Buy milk", None, &["home"]);
        milk.status = CardStatus::Done;
        let mut ship = card(3, "Ship v1", Some("release"), &["work", "v1"]);
        ship.status = CardStatus::Doing;
        let mut retro = card(4, "Retro", Some("post-MEETING"), &[]);
        retro.status = CardStatus::Done;
        vec![sync, milk, ship, retro]
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let filter = CardFilter::from_params(None, None, None, None);
        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(sample())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn q_matches_title_or_content_case_insensitively() {
        let filter = CardFilter::from_params(Some("meeting"), None, None, None);
        assert_eq!(ids(&filter.apply(sample())), vec![1, 4]);

        let filter = CardFilter::from_params(Some("SHIP"), None, None, None);
        assert_eq!(ids(&filter.apply(sample())), vec![3]);
    }

    #[test]
    fn q_treats_missing_content_as_empty() {
        let filter = CardFilter::from_params(Some("milk"), None, None, None);
        assert_eq!(ids(&filter.apply(sample())), vec![2]);
        let filter = CardFilter::from_params(Some("notes"), None, None, None);
        assert_eq!(ids(&filter.apply(sample())), vec![1]);
    }

    #[test]
    fn type_and_status_compose_conjunctively() {
        let filter = CardFilter::from_params(None, Some("task"), Some("done"), None);
        assert_eq!(ids(&filter.apply(sample())), vec![2, 4]);

        let filter = CardFilter::from_params(Some("retro"), Some("task"), Some("done"), None);
        assert_eq!(ids(&filter.apply(sample())), vec![4]);
    }

    #[test]
    fn unknown_type_and_status_are_ignored() {
        let filter = CardFilter::from_params(None, Some("epic"), Some("blocked"), None);
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sample()).len(), 4);
    }

    #[test]
    fn tag_is_exact_membership() {
        let filter = CardFilter::from_params(None, None, None, Some("work"));
        assert_eq!(ids(&filter.apply(sample())), vec![1, 3]);

        let filter = CardFilter::from_params(None, None, None, Some("Work"));
        assert!(filter.apply(sample()).is_empty());

        let filter = CardFilter::from_params(None, None, None, Some("wor"));
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn empty_strings_impose_no_constraint() {
        let filter = CardFilter::from_params(Some(""), None, None, Some(""));
        assert!(filter.is_empty());
    }

    #[test]
    fn from_query_reads_known_keys_only() {
        let filter = CardFilter::from_query([("status", "doing"), ("page", "2"), ("tag", "v1")]);
        assert_eq!(filter.status, Some(CardStatus::Doing));
        assert_eq!(filter.tag.as_deref(), Some("v1"));
        assert_eq!(ids(&filter.apply(sample())), vec![3]);
    }
}
