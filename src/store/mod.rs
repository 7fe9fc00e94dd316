use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

#[cfg(test)]
pub mod recording;
pub mod rest;
pub mod sqlite;

/// One row as the store returns it: a flat JSON object.
pub type Record = Map<String, Value>;

pub const PROJECTS: &str = "projects";
pub const TASKS: &str = "tasks";
pub const NOTIFICATIONS: &str = "notification";
pub const PROJECT_NOTES: &str = "project_notes";
pub const TASK_NOTES: &str = "task_notes";
pub const USERS: &str = "users_ext";
pub const USER_ROLES: &str = "users_roles";

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    IsNull(String),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Eq(field, expected) => record
                .get(field)
                .is_some_and(|actual| values_match(actual, expected)),
            Filter::IsNull(field) => record.get(field).map_or(true, Value::is_null),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    #[cfg(test)]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Table-oriented access to the backing record store.
///
/// Every call is an independent request: there are no transactions across
/// calls and concurrent writers simply overwrite each other.
pub trait RecordStore: Send + Sync {
    fn select(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError>;

    fn select_one(&self, collection: &str, filters: &[Filter]) -> Result<Record, StoreError> {
        let mut rows = self.select(collection, filters, None)?;
        match rows.len() {
            0 => Err(StoreError::NotFound {
                collection: collection.to_string(),
            }),
            1 => Ok(rows.remove(0)),
            count => Err(StoreError::Ambiguous {
                collection: collection.to_string(),
                count,
            }),
        }
    }

    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>, StoreError>;

    fn update(
        &self,
        collection: &str,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, StoreError>;
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Typed `select`. A row that does not decode is logged and skipped so the
/// rest of the collection still shows.
pub fn select_as<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
    filters: &[Filter],
    order: Option<&Order>,
) -> Result<Vec<T>, StoreError> {
    let rows = store.select(collection, filters, order)?;
    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.get("id").and_then(scalar_text).unwrap_or_default();
        match from_record(row) {
            Ok(value) => decoded.push(value),
            Err(err) => warn!(collection, id = %id, error = %err, "skipping undecodable row"),
        }
    }
    Ok(decoded)
}

pub fn select_one_as<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
    filters: &[Filter],
) -> Result<T, StoreError> {
    from_record(store.select_one(collection, filters)?)
}

pub fn insert_one<T: Serialize + DeserializeOwned>(
    store: &dyn RecordStore,
    collection: &str,
    value: &T,
) -> Result<T, StoreError> {
    let mut rows = store.insert(collection, vec![to_record(value)?])?;
    match rows.pop() {
        Some(row) => from_record(row),
        None => Err(StoreError::InvalidRecord(format!(
            "insert into '{collection}' returned no rows"
        ))),
    }
}

/// Filters and orders rows the way the hosted store would, for stores that
/// hold whole collections locally.
pub(crate) fn apply_query(
    rows: Vec<Record>,
    filters: &[Filter],
    order: Option<&Order>,
) -> Vec<Record> {
    let mut rows: Vec<Record> = rows
        .into_iter()
        .filter(|row| filters.iter().all(|filter| filter.matches(row)))
        .collect();
    if let Some(order) = order {
        rows.sort_by(|left, right| {
            let ordering = compare_nullable(left.get(&order.field), right.get(&order.field));
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
    rows
}

/// Renders a scalar the way it appears in a query string or an id column.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (scalar_text(actual), scalar_text(expected)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

// Nulls sort last ascending and first descending.
fn compare_nullable(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => compare_values(left, right),
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            let left = left.as_f64().unwrap_or(0.0);
            let right = right.as_f64().unwrap_or(0.0);
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        _ => scalar_text(left)
            .unwrap_or_default()
            .cmp(&scalar_text(right).unwrap_or_default()),
    }
}

#[derive(Debug)]
pub enum StoreError {
    Db(rusqlite::Error),
    Http {
        status: Option<u16>,
        message: String,
    },
    Json(serde_json::Error),
    NotFound {
        collection: String,
    },
    Ambiguous {
        collection: String,
        count: usize,
    },
    InvalidRecord(String),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Db(err) => write!(f, "database error: {}", err),
            StoreError::Http {
                status: Some(status),
                message,
            } => write!(f, "store request failed with HTTP {}: {}", status, message),
            StoreError::Http {
                status: None,
                message,
            } => write!(f, "store request failed: {}", message),
            StoreError::Json(err) => write!(f, "record decode error: {}", err),
            StoreError::NotFound { collection } => {
                write!(f, "no matching row in '{}'", collection)
            }
            StoreError::Ambiguous { collection, count } => write!(
                f,
                "expected one row in '{}', found {}",
                collection, count
            ),
            StoreError::InvalidRecord(message) => write!(f, "invalid record: {}", message),
            StoreError::Unavailable(message) => write!(f, "store unavailable: {}", message),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Db(err) => Some(err),
            StoreError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Json(value)
    }
}
