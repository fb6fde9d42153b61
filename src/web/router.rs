use crate::{controller::Action, error::Result, web::Request};
use actix_web::http::Method;
use async_trait::async_trait;
use std::{fmt, sync::Arc};

/// Request pre-processing step. Returning an error aborts the request.
#[async_trait(?Send)]
pub trait Middleware: Send + Sync {
  async fn handle(&self, req: &mut Request) -> Result<()>;
}

/// One entry of a route's pre-processing chain.
#[derive(Clone)]
pub enum Hook {
  Custom(Arc<dyn Middleware>),
  /// The controller's own form parsing, see
  /// [`Controller::parse_form_middleware`](crate::controller::Controller::parse_form_middleware).
  ParseForm,
}

impl fmt::Debug for Hook {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Hook::Custom(_) => f.write_str("Custom"),
      Hook::ParseForm => f.write_str("ParseForm"),
    }
  }
}

/// Ordered middleware list of a controller.
#[derive(Clone, Default)]
pub struct MiddlewareStack(Vec<Arc<dyn Middleware>>);

impl MiddlewareStack {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn append(&mut self, other: MiddlewareStack) {
    self.0.extend(other.0);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Middleware>> {
    self.0.iter()
  }

  pub fn hooks(&self) -> Vec<Hook> {
    self.0.iter().cloned().map(Hook::Custom).collect()
  }
}

impl From<Arc<dyn Middleware>> for MiddlewareStack {
  fn from(middleware: Arc<dyn Middleware>) -> Self {
    MiddlewareStack(vec![middleware])
  }
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewareStack {
  fn from(middleware: Vec<Arc<dyn Middleware>>) -> Self {
    MiddlewareStack(middleware)
  }
}

impl fmt::Debug for MiddlewareStack {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "MiddlewareStack({})", self.0.len())
  }
}

#[derive(Debug, Clone)]
pub struct Route {
  pub method: Method,
  pub path: String,
  pub hooks: Vec<Hook>,
  pub action: Action,
}

/// Router collaborator: controllers declare their routes through it.
pub trait Router {
  fn route(&mut self, method: Method, path: &str, hooks: Vec<Hook>, action: Action);

  fn get(&mut self, path: &str, hooks: Vec<Hook>, action: Action) {
    self.route(Method::GET, path, hooks, action)
  }

  fn post(&mut self, path: &str, hooks: Vec<Hook>, action: Action) {
    self.route(Method::POST, path, hooks, action)
  }

  fn delete(&mut self, path: &str, hooks: Vec<Hook>, action: Action) {
    self.route(Method::DELETE, path, hooks, action)
  }
}

/// Records routes in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
  routes: Vec<Route>,
}

impl RouteTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn routes(&self) -> &[Route] {
    &self.routes
  }

  pub fn into_routes(self) -> Vec<Route> {
    self.routes
  }
}

impl Router for RouteTable {
  fn route(&mut self, method: Method, path: &str, hooks: Vec<Hook>, action: Action) {
    self.routes.push(Route {
      method,
      path: path.to_string(),
      hooks,
      action,
    });
  }
}
