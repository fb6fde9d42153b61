use crate::{
  error::{ErrorKind, Result},
  util,
};
use error_chain::bail;
use maud::Markup;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub type Template = fn(&JsonValue) -> Result<Markup>;

/// Template registry keyed by normalized view path, e.g. `authors/item`.
#[derive(Default)]
pub struct Views {
  templates: HashMap<String, Template>,
}

impl Views {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(mut self, view: &str, template: Template) -> Self {
    self.templates.insert(util::normalize(view), template);
    self
  }

  pub fn contains(&self, view: &str) -> bool {
    self.templates.contains_key(&util::normalize(view))
  }

  pub fn render(&self, view: &str, data: &JsonValue) -> Result<Markup> {
    match self.templates.get(&util::normalize(view)) {
      Some(template) => template(data),
      None => bail!(ErrorKind::ViewNotFound(view.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use maud::html;
  use serde_json::json;

  #[test]
  fn lookup_is_normalized() {
    let views = Views::new().register("authors//list", |data| {
      Ok(html! { p { (data["list"].as_array().map_or(0, Vec::len)) } })
    });
    assert!(views.contains("authors/list"));
    assert!(views.contains("./authors/list"));

    let markup = views.render("authors/./list", &json!({"list": [1, 2]})).unwrap();
    assert_eq!(markup.into_string(), "<p>2</p>");
  }

  #[test]
  fn missing_view() {
    let e = Views::new().render("nope", &json!({})).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::ViewNotFound(view) if view == "nope"));
  }
}
