use crate::authors::FIELDS;
use lazy_static::lazy_static;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use mvc_controllers::{error::Result, util, view::Views};
use serde_json::Value as JsonValue;
use std::sync::RwLock;

#[derive(Default)]
struct Site {
  root_url: String,
  nav: Vec<(String, String)>,
}

lazy_static! {
  static ref SITE: RwLock<Site> = RwLock::new(Site::default());
}

/// Mount path and navigation links of the pages, set once at start-up.
pub fn set_site(root_url: &str, links: &[(String, String)]) {
  if let Ok(mut site) = SITE.write() {
    site.root_url = root_url.to_string();
    site.nav = links
      .iter()
      .map(|(link, name)| (util::join(&["/", root_url, link]), name.clone()))
      .collect();
  }
}

fn url(path: &str) -> String {
  let root_url = SITE.read().map(|site| site.root_url.clone()).unwrap_or_default();
  util::join(&["/", &root_url, path])
}

pub fn views() -> Views {
  Views::new()
    .register("home", home)
    .register("help", help)
    .register("authors/list", authors)
    .register("authors/item", author)
}

fn layout(title: &str, page: Markup) -> Markup {
  let nav = SITE.read().map(|site| site.nav.clone()).unwrap_or_default();
  html! {
    (DOCTYPE)
    html lang="en" {
      head {
        meta http-equiv="Content-Type" content="text/html; charset=utf-8";
        meta name="viewport" content="width=device-width";
        link rel="stylesheet" href=(url("static/style.css")) type="text/css" media="screen";
        title { (title) " | Back-office" }
      }
      body {
        .header {
          .container {
            .logo { "Back-office" }
            .nav-menu {
              @for (href, name) in &nav {
                a href=(href) { (name) }
              }
            }
          }
        }
        (page)
      }
    }
  }
}

fn text(value: &JsonValue) -> String {
  match value {
    JsonValue::Null => String::new(),
    JsonValue::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn home(data: &JsonValue) -> Result<Markup> {
  Ok(layout(
    "Home",
    html! {
      .page-home { .container {
        p { "Authors registered: " b { (text(&data["authors"])) } }
        @if let Some(cities) = data["cities"].as_array().filter(|cities| !cities.is_empty()) {
          h3 { "Home cities" }
          ul {
            @for city in cities {
              li {
                a href={ (url("authors/")) "?city=" (text(&city["city"])) } { (text(&city["city"])) }
                " (" (text(&city["count"])) ")"
              }
            }
          }
        }
      } }
    },
  ))
}

fn help(_data: &JsonValue) -> Result<Markup> {
  Ok(layout(
    "Help",
    html! {
      .page-help { .container {
        p {
          "The Authors menu lists every registered author. New entries are added with the form
           below the list; an author's page allows modifying or deleting the entry."
        }
        p { "The list can be narrowed to a single home city by following the links of the home page." }
      } }
    },
  ))
}

fn author_form(action: &str, item: &JsonValue, error: &JsonValue) -> Markup {
  html! {
    form.author-form method="post" action=(action) {
      @for field in FIELDS.iter() {
        .field {
          label for=(field) { (field.replace('_', " ")) }
          @if *field == "notes" {
            textarea name=(field) id=(field) { (text(&item[*field])) }
          } @else {
            input type="text" name=(field) id=(field) value=(text(&item[*field]));
          }
          @if let Some(message) = error[*field].as_str() {
            span.error { (message) }
          }
        }
      }
      @if let Some(message) = error.as_str() {
        .error { (message) }
      }
      button type="submit" { "Save" }
    }
  }
}

fn authors(data: &JsonValue) -> Result<Markup> {
  let empty = vec![];
  let list = data["list"].as_array().unwrap_or(&empty);
  let root = url("authors/");
  Ok(layout(
    "Authors",
    html! {
      .page-authors { .container {
        .table {
          .row.head {
            .col1 { "ID" }
            .col2 { "Name" }
            .col3 { "Age" }
            .col4 { "Home city" }
          }
          @for author in list {
            .row {
              .col1 { (text(&author["id"])) }
              .col2 { a href={ (root) (text(&author["id"])) } { (text(&author["name"])) } }
              .col3 { (text(&author["age"])) }
              .col4 { (text(&author["home_city"])) }
            }
          }
        }
        h3 { "Add new author" }
        (author_form(&root, &JsonValue::Null, &JsonValue::Null))
      } }
    },
  ))
}

fn author(data: &JsonValue) -> Result<Markup> {
  let item = &data["item"];
  let root = url("authors/");
  let (title, action) = match item["id"].is_null() {
    true => ("New author".to_string(), root.clone()),
    false => (text(&item["name"]), format!("{}{}", root, text(&item["id"]))),
  };
  Ok(layout(
    &title,
    html! {
      .page-author { .container {
        .actions-wrapper {
          a.action-btn href=(root) { "Back to the list" }
          @if !item["id"].is_null() {
            span.action-btn.red #delete data-url=(action) { "Delete" }
          }
        }
        (author_form(&action, item, &data["error"]))
      } }
      script type="text/javascript" {
        (PreEscaped(r#"
          var del = document.getElementById('delete');
          if (del) del.addEventListener('click', function () {
            if (!confirm('Delete this author?')) return;
            fetch(del.dataset.url, { method: 'DELETE' })
              .then(function (res) { window.location = res.url; });
          });
        "#))
      }
    },
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn renders_author_errors() {
    let markup = views()
      .render(
        "authors/item",
        &json!({"item": {"name": "", "age": "old"}, "error": {"age": "Age must be a positive number"}}),
      )
      .unwrap()
      .into_string();
    assert!(markup.contains("Age must be a positive number"));
    assert!(markup.contains("value=\"old\""));
    assert!(!markup.contains("id=\"delete\""));
  }

  #[test]
  fn renders_delete_button_for_stored_author() {
    let markup = views()
      .render("authors/item", &json!({"item": {"id": 7, "name": "Banksy"}}))
      .unwrap()
      .into_string();
    assert!(markup.contains("id=\"delete\""));
    assert!(markup.contains("data-url=\"/authors/7\""));
  }

  #[test]
  fn renders_author_list() {
    let markup = views()
      .render(
        "authors/list",
        &json!({"list": [{"id": 7, "name": "Banksy", "age": 45, "home_city": "Bristol"}]}),
      )
      .unwrap()
      .into_string();
    assert!(markup.contains("Banksy"));
    assert!(markup.contains("/authors/7"));
  }
}
