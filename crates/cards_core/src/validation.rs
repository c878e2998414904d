//! Boundary validation for card write requests.
//!
//! # Responsibility
//! - Turn semi-structured request input into `NewCard` / `CardPatch`.
//! - Reject malformed input before it reaches storage.
//!
//! # Invariants
//! - The first violated constraint is reported; nothing is partially applied.
//! - Fields are checked in a fixed order: title, content, type, status, tags, dueDate.
//! - Lengths count Unicode scalar values.

use crate::model::card::{CardId, CardPatch, CardStatus, CardType, NewCard, Patch};
use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 120;
pub const CONTENT_MAX_CHARS: usize = 4000;
pub const TAG_MIN_CHARS: usize = 1;
pub const TAG_MAX_CHARS: usize = 24;

static CARD_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid id regex"));
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z$").expect("valid timestamp regex")
});

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Why one field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Required,
    WrongType { expected: &'static str },
    TooShort { min: usize },
    TooLong { max: usize },
    NotOneOf { allowed: &'static [&'static str] },
    InvalidTimestamp,
    InvalidIdentifier,
}

impl Display for ValidationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::TooShort { min } => write!(f, "must contain at least {min} character(s)"),
            Self::TooLong { max } => write!(f, "must contain at most {max} character(s)"),
            Self::NotOneOf { allowed } => write!(f, "must be one of {}", allowed.join("|")),
            Self::InvalidTimestamp => write!(f, "must be an ISO 8601 UTC timestamp"),
            Self::InvalidIdentifier => write!(f, "must be a positive integer"),
        }
    }
}

/// Caller-fixable input error naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.reason)
    }
}

impl Error for ValidationError {}

/// Validates a create request body, applying defaults for absent fields.
pub fn validate_create(body: &Value) -> ValidationResult<NewCard> {
    let fields = as_object(body)?;

    let title = match fields.get("title") {
        None => return Err(ValidationError::new("title", ValidationReason::Required)),
        Some(value) => parse_title(value)?,
    };
    let content = match fields.get("content") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_content(value)?),
    };
    let kind = match fields.get("type") {
        None => CardType::default(),
        Some(value) => parse_type(value)?,
    };
    let status = match fields.get("status") {
        None => CardStatus::default(),
        Some(value) => parse_status(value)?,
    };
    let tags = match fields.get("tags") {
        None => Vec::new(),
        Some(value) => parse_tags(value)?,
    };
    let due_date = match fields.get("dueDate") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_due_date(value)?),
    };

    Ok(NewCard {
        title,
        content,
        kind,
        status,
        tags,
        due_date,
    })
}

/// Validates an update request body.
///
/// Absent keys stay `Unset`; explicit `null` clears `content` / `dueDate`.
pub fn validate_update(body: &Value) -> ValidationResult<CardPatch> {
    let fields = as_object(body)?;

    Ok(CardPatch {
        title: fields.get("title").map(parse_title).transpose()?,
        content: nullable(fields.get("content"), parse_content)?,
        kind: fields.get("type").map(parse_type).transpose()?,
        status: fields.get("status").map(parse_status).transpose()?,
        tags: fields.get("tags").map(parse_tags).transpose()?,
        due_date: nullable(fields.get("dueDate"), parse_due_date)?,
    })
}

/// Parses a path-supplied identifier (`^[0-9]+$`, positive, fits `i64`).
pub fn parse_card_id(raw: &str) -> ValidationResult<CardId> {
    let invalid = || ValidationError::new("id", ValidationReason::InvalidIdentifier);
    if !CARD_ID_RE.is_match(raw) {
        return Err(invalid());
    }
    match raw.parse::<CardId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

fn as_object(body: &Value) -> ValidationResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        ValidationError::new("body", ValidationReason::WrongType { expected: "object" })
    })
}

fn nullable<T>(
    value: Option<&Value>,
    parse: impl FnOnce(&Value) -> ValidationResult<T>,
) -> ValidationResult<Patch<T>> {
    match value {
        None => Ok(Patch::Unset),
        Some(Value::Null) => Ok(Patch::Clear),
        Some(value) => parse(value).map(Patch::Set),
    }
}

fn parse_title(value: &Value) -> ValidationResult<String> {
    bounded_string("title", value, TITLE_MIN_CHARS, TITLE_MAX_CHARS)
}

fn parse_content(value: &Value) -> ValidationResult<String> {
    bounded_string("content", value, 0, CONTENT_MAX_CHARS)
}

fn parse_type(value: &Value) -> ValidationResult<CardType> {
    let raw = expect_str("type", value)?;
    CardType::parse(raw).ok_or_else(|| {
        ValidationError::new(
            "type",
            ValidationReason::NotOneOf {
                allowed: CardType::VALUES,
            },
        )
    })
}

fn parse_status(value: &Value) -> ValidationResult<CardStatus> {
    let raw = expect_str("status", value)?;
    CardStatus::parse(raw).ok_or_else(|| {
        ValidationError::new(
            "status",
            ValidationReason::NotOneOf {
                allowed: CardStatus::VALUES,
            },
        )
    })
}

fn parse_tags(value: &Value) -> ValidationResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        ValidationError::new("tags", ValidationReason::WrongType { expected: "array" })
    })?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let field = format!("tags[{idx}]");
            bounded_string(&field, item, TAG_MIN_CHARS, TAG_MAX_CHARS)
        })
        .collect()
}

fn parse_due_date(value: &Value) -> ValidationResult<DateTime<Utc>> {
    let raw = expect_str("dueDate", value)?;
    if !TIMESTAMP_RE.is_match(raw) {
        return Err(ValidationError::new("dueDate", ValidationReason::InvalidTimestamp));
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|_| ValidationError::new("dueDate", ValidationReason::InvalidTimestamp))?;
    // Storage keeps millisecond precision.
    Ok(parsed.with_timezone(&Utc).trunc_subsecs(3))
}

fn expect_str<'v>(field: &str, value: &'v Value) -> ValidationResult<&'v str> {
    value.as_str().ok_or_else(|| {
        ValidationError::new(field, ValidationReason::WrongType { expected: "string" })
    })
}

fn bounded_string(field: &str, value: &Value, min: usize, max: usize) -> ValidationResult<String> {
    let raw = expect_str(field, value)?;
    let chars = raw.chars().count();
    if chars < min {
        return Err(ValidationError::new(field, ValidationReason::TooShort { min }));
    }
    if chars > max {
        return Err(ValidationError::new(field, ValidationReason::TooLong { max }));
    }
    Ok(raw.to_string())
}
