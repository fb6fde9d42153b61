//! Persistence collaborator of the CRUD controller.
//!
//! Records travel as JSON objects; the backend decides how they are stored and
//! what an identifier looks like. Two backends are shipped: [`memory`] for
//! document-style opaque ids and [`sqlite`] for integer row ids.

pub mod memory;
pub mod sqlite;

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use error_chain::bail;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

pub type Record = Map<String, JsonValue>;

/// Equality filter, `{}` matches everything.
pub type Query = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
  Int(i64),
  Opaque(String),
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      RecordId::Int(id) => write!(f, "{}", id),
      RecordId::Opaque(id) => f.write_str(id),
    }
  }
}

impl RecordId {
  /// Identifier exposed by a stored record under `id`, if any.
  pub fn of(record: &Record) -> Option<RecordId> {
    match record.get("id")? {
      JsonValue::Number(n) => n.as_i64().map(RecordId::Int),
      JsonValue::String(s) if !s.is_empty() => Some(RecordId::Opaque(s.clone())),
      _ => None,
    }
  }

  pub fn to_json(&self) -> JsonValue {
    match self {
      RecordId::Int(id) => JsonValue::from(*id),
      RecordId::Opaque(id) => JsonValue::from(id.as_str()),
    }
  }
}

/// How a raw identifier taken from the request is coerced before it reaches
/// the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
  /// Passed through untouched (document stores).
  Opaque,
  /// Parsed as a signed integer (relational stores).
  Integer,
}

impl Default for IdStrategy {
  fn default() -> Self {
    IdStrategy::Opaque
  }
}

impl IdStrategy {
  pub fn extract(self, raw: &str) -> Result<RecordId> {
    match self {
      IdStrategy::Opaque => Ok(RecordId::Opaque(raw.to_string())),
      IdStrategy::Integer => match raw.trim().parse::<i64>() {
        Ok(id) => Ok(RecordId::Int(id)),
        Err(_) => bail!(ErrorKind::InvalidId(raw.to_string())),
      },
    }
  }
}

#[async_trait(?Send)]
pub trait Model: Send + Sync {
  /// Records matching `query`, projected on `fields`.
  async fn find(&self, query: &Query, fields: &str) -> Result<Vec<Record>>;

  /// Stores `data` and returns the stored record, identifier included.
  async fn create(&self, data: Record) -> Result<Record>;

  async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>>;

  /// Overwrites the given fields, keeping the others. `None` when no record
  /// has this id.
  async fn update_by_id(&self, id: &RecordId, data: Record) -> Result<Option<Record>>;

  /// Returns the removed record, `None` when there was nothing to remove.
  async fn remove_by_id(&self, id: &RecordId) -> Result<Option<Record>>;
}

pub fn matches(record: &Record, query: &Query) -> bool {
  query
    .iter()
    .all(|(key, expected)| record.get(key).map_or(expected.is_null(), |value| value == expected))
}

/// Field selection in the `"name age"` / `"-notes"` form; empty keeps every
/// field. Inclusive selections always keep `id`.
pub fn project(mut record: Record, fields: &str) -> Record {
  let (excluded, included): (Vec<&str>, Vec<&str>) =
    fields.split_whitespace().partition(|field| field.starts_with('-'));

  if !included.is_empty() {
    record.retain(|key, _| key == "id" || included.contains(&key.as_str()));
  }
  for field in excluded {
    record.remove(&field[1..]);
  }
  record
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn record(value: JsonValue) -> Record {
    match value {
      JsonValue::Object(map) => map,
      _ => unreachable!(),
    }
  }

  #[test]
  fn record_id_of() {
    assert_eq!(RecordId::of(&record(json!({"id": 5}))), Some(RecordId::Int(5)));
    assert_eq!(
      RecordId::of(&record(json!({"id": "some id"}))),
      Some(RecordId::Opaque("some id".into()))
    );
    assert_eq!(RecordId::of(&record(json!({"id": ""}))), None);
    assert_eq!(RecordId::of(&record(json!({"name": "x"}))), None);
  }

  #[test]
  fn id_strategies() {
    assert_eq!(IdStrategy::Opaque.extract("abc").unwrap(), RecordId::Opaque("abc".into()));
    assert_eq!(IdStrategy::Integer.extract("1234").unwrap(), RecordId::Int(1234));
    match IdStrategy::Integer.extract("abc") {
      Err(e) => assert!(matches!(e.kind(), ErrorKind::InvalidId(raw) if raw == "abc")),
      Ok(_) => panic!("non-numeric id accepted"),
    }
  }

  #[test]
  fn filtering() {
    let rec = record(json!({"id": 1, "isActive": true, "name": "a"}));
    assert!(matches(&rec, &Query::new()));
    assert!(matches(&rec, &record(json!({"isActive": true}))));
    assert!(!matches(&rec, &record(json!({"isActive": false}))));
    assert!(matches(&rec, &record(json!({"missing": null}))));
  }

  #[test]
  fn projection() {
    let rec = record(json!({"id": 1, "name": "a", "age": 3, "notes": "n"}));
    assert_eq!(project(rec.clone(), ""), rec);
    assert_eq!(
      JsonValue::Object(project(rec.clone(), "name age")),
      json!({"id": 1, "name": "a", "age": 3})
    );
    assert_eq!(
      JsonValue::Object(project(rec, "-notes")),
      json!({"id": 1, "name": "a", "age": 3})
    );
  }
}
