use actix_web::{http::StatusCode, HttpResponse};
use error_chain::error_chain;

error_chain! {
  foreign_links {
    R2D2Error(r2d2::Error);
    RusqliteError(rusqlite::Error);
    SerdeJsonError(serde_json::error::Error);
    UrlEncodedError(serde_urlencoded::de::Error);
    IoError(std::io::Error);
    TomlError(toml::de::Error);
    ClapError(clap::Error);
  }

  errors {
    ModelNotProvided {
      description("model not provided")
      display("Model not provided")
    }
    MissingItem {
      description("item not provided")
      display("\"item\" is not provided for render_item")
    }
    PureVirtualCall {
      description("pure virtual call")
      display("Pure virtual call")
    }
    NoSuchItem(id: String) {
      description("no such item")
      display("No such item: {}", id)
    }
    SavedIncorrectly {
      description("item saved incorrectly")
      display("Item saved incorrectly")
    }
    InvalidId(raw: String) {
      description("invalid item id")
      display("Invalid item id: {:?}", raw)
    }
    MissingId {
      description("item id not provided")
      display("Item id not provided")
    }
    UnsupportedAction(action: String) {
      description("unsupported action")
      display("Action `{}` is not supported by this controller", action)
    }
    ViewNotFound(view: String) {
      description("view not found")
      display("View not found: {}", view)
    }
    InvalidTableName(name: String) {
      description("invalid table name")
      display("Invalid table name: {:?}", name)
    }
    InvalidPathParam(name: String) {
      description("invalid path parameter")
      display("Path parameter `{}` is not valid utf-8 once decoded", name)
    }
    MalformedRequest(part: String) {
      description("malformed request")
      display("Malformed request {}", part)
    }
    RouteNotFound
  }
}

impl From<actix_web::error::BlockingError> for Error {
  fn from(e: actix_web::error::BlockingError) -> Self {
    e.to_string().into()
  }
}

impl Error {
  /// Status used when the error ends up in an HTTP response.
  pub fn status(&self) -> StatusCode {
    match self.kind() {
      ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
      ErrorKind::InvalidId(_)
      | ErrorKind::MissingId
      | ErrorKind::InvalidPathParam(_)
      | ErrorKind::MalformedRequest(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

pub fn display(error: &Error) -> String {
  match error.kind() {
    ErrorKind::RouteNotFound => "".to_string(),
    _ => {
      let mut msg = "Error:\n".to_string();
      error
        .iter()
        .enumerate()
        .for_each(|(index, error)| msg.push_str(&format!("└> {} - {}\n", index, error)));

      #[cfg(debug_assertions)]
      {
        if let Some(backtrace) = error.backtrace() {
          msg.push_str(&format!("\n{:?}", backtrace));
        }
      }
      log::error!("{}", msg);
      msg
    }
  }
}

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    self.status()
  }

  fn error_response(&self) -> HttpResponse {
    match self.kind() {
      ErrorKind::RouteNotFound => HttpResponse::NotFound().finish(),
      _ => HttpResponse::build(self.status_code())
        .content_type("text/plain; charset=utf-8")
        .body({
          #[cfg(debug_assertions)]
          {
            display(self)
          }
          #[cfg(not(debug_assertions))]
          {
            display(self);
            self.to_string()
          }
        }),
    }
  }
}
