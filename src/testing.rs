//! Test doubles for the controller collaborators.

use crate::{
  error::Result,
  model::{Model, Query, Record, RecordId},
  web::Response,
};
use actix_web::http::StatusCode;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::Mutex;

pub fn record(value: JsonValue) -> Record {
  match value {
    JsonValue::Object(map) => map,
    other => panic!("not an object: {}", other),
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Render(String, JsonValue),
  Send(StatusCode, String),
  Redirect(StatusCode, String),
}

#[derive(Debug, Default)]
pub struct RecordingResponse {
  pub calls: Vec<Call>,
  status: Option<StatusCode>,
}

impl Response for RecordingResponse {
  fn render(&mut self, view: &str, data: JsonValue) -> Result<()> {
    self.calls.push(Call::Render(view.to_string(), data));
    Ok(())
  }

  fn status(&mut self, status: StatusCode) -> &mut dyn Response {
    self.status = Some(status);
    self
  }

  fn send(&mut self, body: String) {
    self
      .calls
      .push(Call::Send(self.status.unwrap_or(StatusCode::OK), body));
  }

  fn redirect(&mut self, status: StatusCode, location: &str) {
    self.calls.push(Call::Redirect(status, location.to_string()));
  }
}

/// Model answering every call with canned data, or rejecting every call
/// with `reject` when set.
#[derive(Default)]
pub struct FakeModel {
  pub list: Vec<Record>,
  pub item: Option<Record>,
  pub reject: Option<String>,
  calls: Mutex<Vec<(&'static str, JsonValue)>>,
}

impl FakeModel {
  pub fn with_list(list: Vec<Record>) -> Self {
    FakeModel {
      list,
      ..FakeModel::default()
    }
  }

  pub fn with_item(item: Record) -> Self {
    FakeModel {
      item: Some(item),
      ..FakeModel::default()
    }
  }

  pub fn rejecting(reason: &str) -> Self {
    FakeModel {
      reject: Some(reason.to_string()),
      ..FakeModel::default()
    }
  }

  pub fn calls(&self) -> Vec<(&'static str, JsonValue)> {
    self.calls.lock().unwrap().clone()
  }

  fn log(&self, operation: &'static str, argument: JsonValue) -> Result<()> {
    self.calls.lock().unwrap().push((operation, argument));
    match &self.reject {
      Some(reason) => Err(reason.as_str().into()),
      None => Ok(()),
    }
  }
}

#[async_trait(?Send)]
impl Model for FakeModel {
  async fn find(&self, query: &Query, fields: &str) -> Result<Vec<Record>> {
    self.log("find", json!({ "query": query, "fields": fields }))?;
    Ok(self.list.clone())
  }

  async fn create(&self, data: Record) -> Result<Record> {
    self.log("create", JsonValue::Object(data))?;
    Ok(self.item.clone().unwrap_or_default())
  }

  async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    self.log("find_by_id", id.to_json())?;
    Ok(self.item.clone())
  }

  async fn update_by_id(&self, id: &RecordId, data: Record) -> Result<Option<Record>> {
    self.log("update_by_id", json!({ "id": id.to_json(), "data": data }))?;
    Ok(self.item.clone())
  }

  async fn remove_by_id(&self, id: &RecordId) -> Result<Option<Record>> {
    self.log("remove_by_id", id.to_json())?;
    Ok(self.item.clone())
  }
}
