//! The authors section: form validation for the CRUD controller and the
//! summary shown on the home page.

use async_trait::async_trait;
use mvc_controllers::{
  controller::{CrudHooks, PageData},
  error::Result,
  model::{Model, Query, Record},
  web::Request,
};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

pub const FIELDS: [&str; 4] = ["name", "age", "home_city", "notes"];

pub struct AuthorForm;

impl CrudHooks for AuthorForm {
  /// `?city=` narrows the list to one home city.
  fn list_query(&self, req: &Request) -> Query {
    let mut query = Query::new();
    if let Some(city) = req.query.get("city").filter(|city| !city.is_empty()) {
      query.insert("home_city".into(), JsonValue::String(city.clone()));
    }
    query
  }

  fn list_fields(&self) -> &str {
    "-notes"
  }

  fn parse_form(&self, form: Record) -> (Record, Option<JsonValue>) {
    let mut parsed = Record::new();
    let mut errors = Map::new();

    for field in FIELDS.iter() {
      let value = match form.get(*field) {
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
      };
      match *field {
        "name" if value.is_empty() => {
          errors.insert("name".into(), json!("Name is required"));
          parsed.insert("name".into(), json!(value));
        }
        "age" if value.is_empty() => {
          parsed.insert("age".into(), JsonValue::Null);
        }
        "age" => match value.parse::<u32>() {
          Ok(age) => {
            parsed.insert("age".into(), json!(age));
          }
          Err(_) => {
            errors.insert("age".into(), json!("Age must be a positive number"));
            parsed.insert("age".into(), json!(value));
          }
        },
        _ => {
          parsed.insert((*field).into(), json!(value));
        }
      }
    }

    let errors = match errors.is_empty() {
      true => None,
      false => Some(JsonValue::Object(errors)),
    };
    (parsed, errors)
  }
}

/// Home page data: author count and the most common home cities.
pub struct Summary {
  model: Arc<dyn Model>,
}

impl Summary {
  pub fn new(model: Arc<dyn Model>) -> Self {
    Summary { model }
  }
}

#[async_trait(?Send)]
impl PageData for Summary {
  async fn get_data(&self, _req: &Request) -> Result<JsonValue> {
    let authors = self.model.find(&Query::new(), "home_city").await?;

    let mut cities: Vec<(String, usize)> = vec![];
    for city in authors
      .iter()
      .filter_map(|author| author.get("home_city").and_then(JsonValue::as_str))
      .filter(|city| !city.is_empty())
    {
      match cities.iter_mut().find(|(name, _)| name == city) {
        Some((_, count)) => *count += 1,
        None => cities.push((city.to_string(), 1)),
      }
    }
    cities.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    cities.truncate(5);

    Ok(json!({
      "authors": authors.len(),
      "cities": cities
        .into_iter()
        .map(|(city, count)| json!({ "city": city, "count": count }))
        .collect::<Vec<_>>(),
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::executor::block_on;
  use mvc_controllers::model::memory::MemoryModel;

  fn record(value: JsonValue) -> Record {
    match value {
      JsonValue::Object(map) => map,
      _ => unreachable!(),
    }
  }

  #[test]
  fn valid_form() {
    let (parsed, error) = AuthorForm.parse_form(record(json!({
      "name": "  Banksy ",
      "age": "45",
      "home_city": "Bristol",
      "ignored": "field"
    })));
    assert!(error.is_none());
    assert_eq!(
      JsonValue::Object(parsed),
      json!({"name": "Banksy", "age": 45, "home_city": "Bristol", "notes": ""})
    );
  }

  #[test]
  fn invalid_form() {
    let (parsed, error) = AuthorForm.parse_form(record(json!({"name": "", "age": "old"})));
    assert_eq!(
      error,
      Some(json!({"name": "Name is required", "age": "Age must be a positive number"}))
    );
    assert_eq!(parsed.get("age"), Some(&json!("old")));
  }

  #[test]
  fn city_filter() {
    let mut req = Request::default();
    assert!(AuthorForm.list_query(&req).is_empty());

    req.query.insert("city".into(), "Paris".into());
    assert_eq!(
      JsonValue::Object(AuthorForm.list_query(&req)),
      json!({"home_city": "Paris"})
    );
  }

  #[test]
  fn summary() {
    let model = MemoryModel::with_records(vec![
      record(json!({"id": "1", "name": "a", "home_city": "Paris"})),
      record(json!({"id": "2", "name": "b", "home_city": "Lyon"})),
      record(json!({"id": "3", "name": "c", "home_city": "Paris"})),
      record(json!({"id": "4", "name": "d"})),
    ]);
    let data = block_on(Summary::new(Arc::new(model)).get_data(&Request::default())).unwrap();
    assert_eq!(
      data,
      json!({
        "authors": 4,
        "cities": [{"city": "Paris", "count": 2}, {"city": "Lyon", "count": 1}]
      })
    );
  }
}
