use super::{router::Hook, HtmlResponse, Request, Response, Route, RouteTable};
use crate::{
  controller::{Action, Controller},
  error::{self, ErrorKind, Result},
  util,
  view::Views,
};
use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use error_chain::bail;
use path_tree::PathTree;
use std::{collections::HashMap, sync::Arc};

/// A route bound to the controller that declared it.
pub struct Binding {
  pub controller: Arc<dyn Controller>,
  pub route: Route,
}

impl Binding {
  /// Runs the hook chain, then the action.
  pub async fn run(&self, req: &mut Request, res: &mut dyn Response) -> Result<()> {
    for hook in &self.route.hooks {
      match hook {
        Hook::Custom(middleware) => middleware.handle(req).await?,
        Hook::ParseForm => self.controller.parse_form_middleware(req),
      }
    }
    self.controller.handle(self.route.action, req, res).await
  }
}

pub enum Resolved<'a> {
  Found(&'a Binding, HashMap<String, String>),
  MethodNotAllowed,
  NotFound,
}

/// Route lookup for every mounted controller.
///
/// Paths are matched with a path tree (`:name` segments become route params);
/// all bindings sharing a path form one group, searched by method.
pub struct Dispatcher {
  bindings: Vec<Binding>,
  groups: Vec<Vec<usize>>,
  paths: HashMap<String, usize>,
  tree: PathTree<usize>,
  links: Vec<(String, String)>,
}

impl Dispatcher {
  pub fn new() -> Self {
    Dispatcher {
      bindings: vec![],
      groups: vec![],
      paths: HashMap::new(),
      tree: PathTree::new(),
      links: vec![],
    }
  }

  /// Lets the controller register its routes, and nests them under
  /// `mount_path` (may be empty).
  pub fn mount<C: Controller + 'static>(&mut self, mount_path: &str, mut controller: C) -> Result<()> {
    let mut table = RouteTable::new();
    controller.make_routes(&mut table, Some(mount_path))?;

    let (link, name) = controller.get_link();
    self.links.push((link.to_string(), name.to_string()));

    let controller: Arc<dyn Controller> = Arc::new(controller);
    for route in table.into_routes() {
      let path = match mount_path {
        "" => route.path.clone(),
        _ => util::join(&[mount_path, &route.path]),
      };
      log::info!("mounted {} {} -> {}", route.method, path, route.action);
      self.insert(
        path,
        Binding {
          controller: controller.clone(),
          route,
        },
      );
    }
    Ok(())
  }

  fn insert(&mut self, path: String, binding: Binding) {
    let index = self.bindings.len();
    self.bindings.push(binding);
    match self.paths.get(&path) {
      Some(&group) => self.groups[group].push(index),
      None => {
        let group = self.groups.len();
        self.groups.push(vec![index]);
        let _ = self.tree.insert(&path, group);
        self.paths.insert(path, group);
      }
    }
  }

  fn lookup(&self, path: &str) -> Option<(usize, Vec<(String, String)>)> {
    let (group, matched) = self.tree.find(path)?;
    let params = matched
      .params()
      .into_iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    Some((*group, params))
  }

  /// Trailing slashes are optional: `/items` falls back to `/items/` and
  /// the other way round. Route params are percent-decoded.
  pub fn resolve(&self, method: &Method, path: &str) -> Result<Resolved<'_>> {
    let found = self.lookup(path).or_else(|| {
      let toggled = match path.strip_suffix('/') {
        Some("") => return None,
        Some(trimmed) => trimmed.to_string(),
        None => format!("{}/", path),
      };
      self.lookup(&toggled)
    });
    let (group, raw) = match found {
      Some(found) => found,
      None => return Ok(Resolved::NotFound),
    };

    let mut params = HashMap::new();
    for (key, value) in raw {
      match urlencoding::decode(&value) {
        Ok(decoded) => params.insert(key, decoded.into_owned()),
        Err(_) => bail!(ErrorKind::InvalidPathParam(key)),
      };
    }

    Ok(
      self.groups[group]
        .iter()
        .map(|&index| &self.bindings[index])
        .find(|binding| &binding.route.method == method)
        .map_or(Resolved::MethodNotAllowed, |binding| Resolved::Found(binding, params)),
    )
  }

  /// `(method, full path, action)` of every binding, in mount order.
  pub fn routes(&self) -> Vec<(Method, &str, Action)> {
    let mut paths: Vec<&str> = vec![""; self.bindings.len()];
    for (path, &group) in &self.paths {
      for &index in &self.groups[group] {
        paths[index] = path.as_str();
      }
    }
    self
      .bindings
      .iter()
      .zip(paths)
      .map(|(binding, path)| (binding.route.method.clone(), path, binding.route.action))
      .collect()
  }

  /// Navigation links of the mounted controllers, see
  /// [`ControllerBase::get_link`](crate::controller::ControllerBase::get_link).
  pub fn links(&self) -> &[(String, String)] {
    &self.links
  }
}

/// Default service of the actix application: every request ends up here.
pub async fn dispatch(
  req: HttpRequest,
  body: web::Bytes,
  dispatcher: web::Data<Dispatcher>,
  views: web::Data<Views>,
) -> std::result::Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();

  let (binding, params) = match dispatcher.resolve(req.method(), req.path())? {
    Resolved::Found(binding, params) => (binding, params),
    Resolved::MethodNotAllowed => return Ok(HttpResponse::MethodNotAllowed().finish()),
    Resolved::NotFound => bail!(ErrorKind::RouteNotFound),
  };

  let mut request = Request::from_http(&req, &body, params)?;
  let mut response = HtmlResponse::new(views);
  binding.run(&mut request, &mut response).await?;

  log::debug!(
    "{} {} -> {} in {:?}",
    req.method(),
    req.path(),
    binding.route.action,
    t0.elapsed()
  );
  Ok(response.finish())
}
