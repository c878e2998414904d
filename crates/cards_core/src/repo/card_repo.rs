//! Card repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete over the `cards` table.
//! - Own tag blob encoding on write and lenient decoding on read.
//! - Assign ids and timestamps server-side.
//!
//! # Invariants
//! - `list_cards` is ordered by `updated_at DESC, id DESC`.
//! - Every successful update strictly increases `updated_at`.
//! - A corrupted tag blob reads back as zero tags; it never fails a read.
//! - Unknown `type`/`status` values in storage are reported as `InvalidData`.

use crate::db::DbError;
use crate::model::card::{Card, CardId, CardPatch, CardStatus, CardType, NewCard};
use crate::model::tags::{encode_tags, try_decode_tags, MAX_TAGS};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CARD_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    type,
    status,
    tags,
    due_date,
    created_at,
    updated_at
FROM cards";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for card persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(CardId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Card store contract.
pub trait CardRepository {
    /// Persists a new card and returns it with server-assigned fields.
    ///
    /// The returned `tags` are the caller's tags after the 12-entry cap,
    /// not re-read from storage.
    fn create_card(&self, card: &NewCard) -> RepoResult<Card>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>>;
    /// Lists every card, most recently updated first.
    fn list_cards(&self) -> RepoResult<Vec<Card>>;
    /// Applies only the fields present in `patch`.
    fn update_card(&self, id: CardId, patch: &CardPatch) -> RepoResult<Card>;
    /// Permanently removes a card.
    fn delete_card(&self, id: CardId) -> RepoResult<()>;
}

/// SQLite-backed card repository.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "cards")? {
            return Err(RepoError::MissingRequiredTable("cards"));
        }
        Ok(Self { conn })
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn create_card(&self, card: &NewCard) -> RepoResult<Card> {
        let now = now_millis();
        let tags = encode_tags(&card.tags);

        self.conn.execute(
            "INSERT INTO cards (
                title,
                content,
                type,
                status,
                tags,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                card.title.as_str(),
                card.content.as_deref(),
                card.kind.as_str(),
                card.status.as_str(),
                tags,
                card.due_date.map(|due| due.timestamp_millis()),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let created_at = millis_to_datetime("created_at", now)?;

        Ok(Card {
            id,
            title: card.title.clone(),
            content: card.content.clone(),
            kind: card.kind,
            status: card.status,
            tags: card.tags.iter().take(MAX_TAGS).cloned().collect(),
            due_date: card.due_date,
            created_at,
            updated_at: created_at,
        })
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        get_card_with(self.conn, id)
    }

    fn list_cards(&self) -> RepoResult<Vec<Card>> {
        let sql = format!("{CARD_SELECT_SQL} ORDER BY updated_at DESC, id DESC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn update_card(&self, id: CardId, patch: &CardPatch) -> RepoResult<Card> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(content) = patch.content.as_ref().into_write() {
            let value = content.map_or(Value::Null, |text| Value::Text(text.clone()));
            assignments.push("content = ?");
            bind_values.push(value);
        }
        if let Some(kind) = patch.kind {
            assignments.push("type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(tags) = patch.tags.as_ref() {
            assignments.push("tags = ?");
            bind_values.push(Value::Text(encode_tags(tags)));
        }
        if let Some(due_date) = patch.due_date.as_ref().into_write() {
            let millis = due_date.map(|due| due.timestamp_millis());
            assignments.push("due_date = ?");
            bind_values.push(millis.map_or(Value::Null, Value::Integer));
        }
        // An empty patch still counts as a mutation and refreshes `updated_at`.
        assignments.push("updated_at = MAX(?, updated_at + 1)");
        bind_values.push(Value::Integer(now_millis()));
        bind_values.push(Value::Integer(id));

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            &format!("UPDATE cards SET {} WHERE id = ?;", assignments.join(", ")),
            params_from_iter(bind_values),
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        let updated = get_card_with(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(updated)
    }

    fn delete_card(&self, id: CardId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM cards WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn get_card_with(conn: &Connection, id: CardId) -> RepoResult<Option<Card>> {
    let mut stmt = conn.prepare(&format!("{CARD_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_card_row(row)?)),
        None => Ok(None),
    }
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id: CardId = row.get("id")?;

    let type_text: String = row.get("type")?;
    let kind = CardType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid card type `{type_text}` in cards.type"))
    })?;

    let status_text: String = row.get("status")?;
    let status = CardStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid card status `{status_text}` in cards.status"
        ))
    })?;

    let tags_blob: String = row.get("tags")?;
    let tags = match try_decode_tags(&tags_blob) {
        Ok(tags) => tags,
        Err(err) => {
            warn!("event=tags_decode module=repo status=degraded card_id={id} error={err}");
            Vec::new()
        }
    };

    let due_date = row
        .get::<_, Option<i64>>("due_date")?
        .map(|millis| millis_to_datetime("due_date", millis))
        .transpose()?;

    Ok(Card {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        kind,
        status,
        tags,
        due_date,
        created_at: millis_to_datetime("created_at", row.get("created_at")?)?,
        updated_at: millis_to_datetime("updated_at", row.get("updated_at")?)?,
    })
}

fn millis_to_datetime(column: &str, millis: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{millis}` out of range in cards.{column}"))
    })
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}
