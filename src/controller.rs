//! Controllers: request-handling units bound to a URL prefix and a view
//! namespace.
//!
//! Every controller owns a [`ControllerBase`] holding its routing and view
//! configuration, and implements [`Controller`]: `make_routes` declares its
//! routes on a [`Router`], `handle` runs one of its actions. The
//! [`AbstractController`] only carries the configuration and does not declare
//! routes, so building it with a router fails.

pub mod crud;
pub mod static_page;

use crate::{
  error::{ErrorKind, Result},
  util,
  web::{MiddlewareStack, Request, Response, Router},
};
use async_trait::async_trait;
use error_chain::bail;
use std::fmt;

pub use crud::{CrudController, CrudHooks, CrudParams, DefaultHooks};
pub use static_page::{PageData, StaticController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  List,
  Create,
  Read,
  Update,
  Destroy,
  Index,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      Action::List => "list",
      Action::Create => "create",
      Action::Read => "read",
      Action::Update => "update",
      Action::Destroy => "destroy",
      Action::Index => "index",
    })
  }
}

/// Construction parameters shared by every controller.
pub struct ControllerParams<'a> {
  pub view_root: String,
  pub url_root: String,
  pub human_name: String,
  pub mount_path: String,
  pub middleware: MiddlewareStack,
  /// When set, routes are registered as part of the construction.
  pub router: Option<&'a mut dyn Router>,
}

impl<'a> ControllerParams<'a> {
  pub fn new(view_root: &str, human_name: &str) -> Self {
    ControllerParams {
      view_root: view_root.to_string(),
      url_root: "/".to_string(),
      human_name: human_name.to_string(),
      mount_path: String::new(),
      middleware: MiddlewareStack::new(),
      router: None,
    }
  }

  pub fn url_root(mut self, url_root: &str) -> Self {
    self.url_root = url_root.to_string();
    self
  }

  pub fn mount_path(mut self, mount_path: &str) -> Self {
    self.mount_path = mount_path.to_string();
    self
  }

  pub fn middleware(mut self, middleware: impl Into<MiddlewareStack>) -> Self {
    self.middleware.append(middleware.into());
    self
  }

  pub fn router(mut self, router: &'a mut dyn Router) -> Self {
    self.router = Some(router);
    self
  }
}

/// Routing and view configuration of a controller.
#[derive(Debug, Clone)]
pub struct ControllerBase {
  pub view_root: String,
  pub url_root: String,
  /// `url_root` nested under the mount path.
  pub url_root_full: String,
  pub human_name: String,
  middleware: MiddlewareStack,
}

impl ControllerBase {
  /// Ignores `params.router`, see [`build`].
  pub fn new(params: ControllerParams) -> Self {
    let mut base = ControllerBase {
      view_root: params.view_root,
      url_root_full: params.url_root.clone(),
      url_root: params.url_root,
      human_name: params.human_name,
      middleware: MiddlewareStack::new(),
    };
    base.make_full_root(&params.mount_path);
    base.set_middleware(params.middleware);
    base
  }

  /// `(url root without its leading '/', human name)`, for navigation menus.
  pub fn get_link(&self) -> (&str, &str) {
    let link = self.url_root.strip_prefix('/').unwrap_or(&self.url_root);
    (link, &self.human_name)
  }

  pub fn make_full_root(&mut self, mount_path: &str) {
    self.url_root_full = match mount_path {
      "" => self.url_root.clone(),
      _ => util::join(&[mount_path, &self.url_root]),
    };
  }

  /// Appends to the middleware already present.
  pub fn set_middleware(&mut self, middleware: impl Into<MiddlewareStack>) {
    self.middleware.append(middleware.into());
  }

  pub fn middleware(&self) -> &MiddlewareStack {
    &self.middleware
  }
}

#[async_trait(?Send)]
pub trait Controller: Send + Sync {
  fn base(&self) -> &ControllerBase;

  fn base_mut(&mut self) -> &mut ControllerBase;

  /// Declares the routes of the controller. A non-empty `mount_path`
  /// recomputes [`ControllerBase::url_root_full`] first.
  fn make_routes(&mut self, _router: &mut dyn Router, _mount_path: Option<&str>) -> Result<()> {
    bail!(ErrorKind::PureVirtualCall)
  }

  /// Form-parsing hook, runs before the actions of the routes that
  /// registered it.
  fn parse_form_middleware(&self, _req: &mut Request) {}

  async fn handle(&self, action: Action, req: &mut Request, res: &mut dyn Response) -> Result<()>;

  fn get_link(&self) -> (&str, &str) {
    self.base().get_link()
  }
}

/// Splits the router out of `params`; the rest becomes the controller base.
pub fn split<'a>(params: ControllerParams<'a>) -> (ControllerBase, Option<&'a mut dyn Router>, String) {
  let ControllerParams {
    view_root,
    url_root,
    human_name,
    mount_path,
    middleware,
    router,
  } = params;
  let base = ControllerBase::new(ControllerParams {
    view_root,
    url_root,
    human_name,
    mount_path: mount_path.clone(),
    middleware,
    router: None,
  });
  (base, router, mount_path)
}

/// Registers the routes of a freshly built controller when a router was
/// supplied.
pub fn build<C: Controller>(
  mut controller: C,
  router: Option<&mut dyn Router>,
  mount_path: &str,
) -> Result<C> {
  if let Some(router) = router {
    controller.make_routes(router, Some(mount_path))?;
  }
  Ok(controller)
}

/// Configuration-only controller, serves nothing.
#[derive(Debug)]
pub struct AbstractController {
  base: ControllerBase,
}

impl AbstractController {
  pub fn new(params: ControllerParams) -> Result<Self> {
    let (base, router, mount_path) = split(params);
    build(AbstractController { base }, router, &mount_path)
  }
}

#[async_trait(?Send)]
impl Controller for AbstractController {
  fn base(&self) -> &ControllerBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut ControllerBase {
    &mut self.base
  }

  async fn handle(&self, action: Action, _req: &mut Request, _res: &mut dyn Response) -> Result<()> {
    bail!(ErrorKind::UnsupportedAction(action.to_string()))
  }
}
