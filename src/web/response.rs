use crate::{error::Result, view::Views};
use actix_web::{
  http::{header, StatusCode},
  web, HttpResponse,
};
use serde_json::Value as JsonValue;

/// Response collaborator of the controllers. The first of `render`, `send`
/// or `redirect` decides the response; `status` only sets the code used by
/// the next `render` or `send`.
pub trait Response {
  fn render(&mut self, view: &str, data: JsonValue) -> Result<()>;
  fn status(&mut self, status: StatusCode) -> &mut dyn Response;
  fn send(&mut self, body: String);
  fn redirect(&mut self, status: StatusCode, location: &str);
}

/// [`Response`] rendering maud views into an actix-web [`HttpResponse`].
pub struct HtmlResponse {
  views: web::Data<Views>,
  status: StatusCode,
  response: Option<HttpResponse>,
}

impl HtmlResponse {
  pub fn new(views: web::Data<Views>) -> Self {
    HtmlResponse {
      views,
      status: StatusCode::OK,
      response: None,
    }
  }

  pub fn finish(self) -> HttpResponse {
    match self.response {
      Some(response) => response,
      None => {
        log::warn!("controller action completed without a response");
        HttpResponse::InternalServerError().finish()
      }
    }
  }

  fn set(&mut self, response: HttpResponse) {
    if self.response.is_some() {
      log::warn!("response already sent, ignoring {}", response.status());
      return;
    }
    self.response = Some(response);
  }
}

impl Response for HtmlResponse {
  fn render(&mut self, view: &str, data: JsonValue) -> Result<()> {
    let markup = self.views.render(view, &data)?;
    let response = HttpResponse::build(self.status)
      .content_type("text/html; charset=utf-8")
      .body(markup.into_string());
    self.set(response);
    Ok(())
  }

  fn status(&mut self, status: StatusCode) -> &mut dyn Response {
    self.status = status;
    self
  }

  fn send(&mut self, body: String) {
    let response = HttpResponse::build(self.status)
      .content_type("text/plain; charset=utf-8")
      .body(body);
    self.set(response);
  }

  fn redirect(&mut self, status: StatusCode, location: &str) {
    let response = HttpResponse::build(status)
      .insert_header((header::LOCATION, location))
      .finish();
    self.set(response);
  }
}
