use crate::{
  error::{ErrorKind, Result, ResultExt},
  model::Record,
};
use actix_web::{
  http::{header, Method},
  HttpRequest,
};
use error_chain::bail;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Per-request state handed to middleware and controller actions.
///
/// `parsed` and `parse_error` are written by the form-parsing hook of the
/// route, and are discarded together with the request.
#[derive(Debug, Default, Clone)]
pub struct Request {
  pub method: Method,
  pub path: String,
  pub original_url: String,
  pub params: HashMap<String, String>,
  pub query: HashMap<String, String>,
  pub body: Record,
  pub parsed: Option<Record>,
  pub parse_error: Option<JsonValue>,
}

impl Request {
  pub fn from_http(req: &HttpRequest, body: &[u8], params: HashMap<String, String>) -> Result<Self> {
    let query = serde_urlencoded::from_str::<Vec<(String, String)>>(req.query_string())
      .chain_err(|| ErrorKind::MalformedRequest("query string".into()))?
      .into_iter()
      .collect();

    let content_type = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .unwrap_or("");

    Ok(Request {
      method: req.method().clone(),
      path: req.path().to_string(),
      original_url: req.uri().to_string(),
      params,
      query,
      body: parse_body(content_type, body).chain_err(|| ErrorKind::MalformedRequest("body".into()))?,
      parsed: None,
      parse_error: None,
    })
  }
}

fn parse_body(content_type: &str, body: &[u8]) -> Result<Record> {
  if body.is_empty() {
    return Ok(Record::new());
  }
  if content_type.starts_with("application/json") {
    match serde_json::from_slice::<JsonValue>(body)? {
      JsonValue::Object(record) => Ok(record),
      _ => bail!("request body must be a JSON object"),
    }
  } else {
    Ok(
      serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?
        .into_iter()
        .map(|(key, value)| (key, JsonValue::String(value)))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;
  use serde_json::json;

  #[test]
  fn form_body() {
    let req = TestRequest::post()
      .uri("/authors/?page=2&sort=name")
      .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
      .to_http_request();
    let mut params = HashMap::new();
    params.insert("id".to_string(), "7".to_string());

    let request = Request::from_http(&req, b"name=Jane+Doe&age=31", params).unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/authors/");
    assert_eq!(request.original_url, "/authors/?page=2&sort=name");
    assert_eq!(request.query.get("page").map(String::as_str), Some("2"));
    assert_eq!(request.params.get("id").map(String::as_str), Some("7"));
    assert_eq!(
      JsonValue::Object(request.body),
      json!({"name": "Jane Doe", "age": "31"})
    );
    assert!(request.parsed.is_none());
  }

  #[test]
  fn json_body() {
    let req = TestRequest::post()
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .to_http_request();
    let request = Request::from_http(&req, br#"{"age": 31}"#, HashMap::new()).unwrap();
    assert_eq!(JsonValue::Object(request.body), json!({"age": 31}));

    for body in [&b"[1, 2]"[..], &b"{\"age\": "[..]] {
      match Request::from_http(&req, body, HashMap::new()) {
        Err(e) => {
          assert!(matches!(e.kind(), ErrorKind::MalformedRequest(part) if part == "body"));
          assert_eq!(e.status(), actix_web::http::StatusCode::BAD_REQUEST);
        }
        Ok(_) => panic!("accepted {:?}", body),
      }
    }
  }

  #[test]
  fn empty_body() {
    let req = TestRequest::get().uri("/").to_http_request();
    let request = Request::from_http(&req, b"", HashMap::new()).unwrap();
    assert!(request.body.is_empty());
    assert!(request.query.is_empty());
  }
}
