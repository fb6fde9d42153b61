use super::{matches, project, Model, Query, Record, RecordId};
use crate::{error::Result, util};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::{Mutex, MutexGuard};

/// Document store kept in process memory. Identifiers are opaque hex strings
/// generated on insert; records keep their insertion order.
#[derive(Default)]
pub struct MemoryModel {
  records: Mutex<Vec<Record>>,
}

impl MemoryModel {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_records(records: Vec<Record>) -> Self {
    MemoryModel {
      records: Mutex::new(records),
    }
  }

  fn records(&self) -> Result<MutexGuard<'_, Vec<Record>>> {
    self.records.lock().map_err(|e| e.to_string().into())
  }

  fn position(records: &[Record], id: &RecordId) -> Option<usize> {
    records.iter().position(|record| RecordId::of(record).as_ref() == Some(id))
  }
}

#[async_trait(?Send)]
impl Model for MemoryModel {
  async fn find(&self, query: &Query, fields: &str) -> Result<Vec<Record>> {
    Ok(
      self
        .records()?
        .iter()
        .filter(|record| matches(record, query))
        .map(|record| project(record.clone(), fields))
        .collect(),
    )
  }

  async fn create(&self, mut data: Record) -> Result<Record> {
    data.insert("id".to_string(), JsonValue::String(util::gen_id()));
    self.records()?.push(data.clone());
    Ok(data)
  }

  async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    let records = self.records()?;
    Ok(Self::position(&records, id).map(|i| records[i].clone()))
  }

  async fn update_by_id(&self, id: &RecordId, data: Record) -> Result<Option<Record>> {
    let mut records = self.records()?;
    Ok(Self::position(&records, id).map(|i| {
      let record = &mut records[i];
      for (key, value) in data {
        // the identifier is owned by the store
        if key != "id" {
          record.insert(key, value);
        }
      }
      record.clone()
    }))
  }

  async fn remove_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    let mut records = self.records()?;
    Ok(Self::position(&records, id).map(|i| records.remove(i)))
  }
}
