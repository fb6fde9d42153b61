use super::{build, split, Action, Controller, ControllerBase, ControllerParams};
use crate::{
  error::{ErrorKind, Result},
  util,
  web::{Request, Response, Router},
};
use actix_web::http::StatusCode;
use async_trait::async_trait;
use error_chain::bail;
use serde_json::{json, Value as JsonValue};

/// Data source of a static page.
#[async_trait(?Send)]
pub trait PageData: Send + Sync {
  async fn get_data(&self, req: &Request) -> Result<JsonValue>;
}

/// Renders `view_root` on GET `url_root`.
pub struct StaticController {
  base: ControllerBase,
  data: Option<Box<dyn PageData>>,
}

impl StaticController {
  pub fn new(params: ControllerParams) -> Result<Self> {
    Self::build(params, None)
  }

  pub fn with_data(params: ControllerParams, data: impl PageData + 'static) -> Result<Self> {
    Self::build(params, Some(Box::new(data)))
  }

  fn build(params: ControllerParams, data: Option<Box<dyn PageData>>) -> Result<Self> {
    let (base, router, mount_path) = split(params);
    build(StaticController { base, data }, router, &mount_path)
  }

  pub async fn index(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    let data = match &self.data {
      Some(provider) => match provider.get_data(req).await {
        Ok(data) => data,
        Err(e) => {
          log::warn!("{}: {}", self.base.human_name, e);
          res
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .send(e.to_string());
          return Ok(());
        }
      },
      None => json!({}),
    };
    res.render(&util::normalize(&self.base.view_root), data)
  }
}

#[async_trait(?Send)]
impl Controller for StaticController {
  fn base(&self) -> &ControllerBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut ControllerBase {
    &mut self.base
  }

  fn make_routes(&mut self, router: &mut dyn Router, mount_path: Option<&str>) -> Result<()> {
    if let Some(mount_path) = mount_path.filter(|path| !path.is_empty()) {
      self.base.make_full_root(mount_path);
    }
    router.get(&self.base.url_root, self.base.middleware().hooks(), Action::Index);
    Ok(())
  }

  async fn handle(&self, action: Action, req: &mut Request, res: &mut dyn Response) -> Result<()> {
    match action {
      Action::Index => self.index(req, res).await,
      _ => bail!(ErrorKind::UnsupportedAction(action.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    testing::{Call, RecordingResponse},
    web::RouteTable,
  };
  use actix_web::http::Method;
  use futures::executor::block_on;

  struct Greeting;

  #[async_trait(?Send)]
  impl PageData for Greeting {
    async fn get_data(&self, req: &Request) -> Result<JsonValue> {
      Ok(json!({ "greeting": "hello", "path": req.path }))
    }
  }

  struct Broken;

  #[async_trait(?Send)]
  impl PageData for Broken {
    async fn get_data(&self, _req: &Request) -> Result<JsonValue> {
      Err("backend unavailable".into())
    }
  }

  fn params<'a>() -> ControllerParams<'a> {
    ControllerParams::new("pages/home/", "Home").url_root("/home")
  }

  #[test]
  fn index_without_data() {
    let controller = StaticController::new(params()).unwrap();
    let mut res = RecordingResponse::default();
    block_on(controller.index(&Request::default(), &mut res)).unwrap();
    assert_eq!(res.calls, vec![Call::Render("pages/home/".into(), json!({}))]);
  }

  #[test]
  fn index_with_data() {
    let controller = StaticController::with_data(params(), Greeting).unwrap();
    let mut req = Request::default();
    req.path = "/home".into();
    let mut res = RecordingResponse::default();
    block_on(controller.handle(Action::Index, &mut req, &mut res)).unwrap();
    assert_eq!(
      res.calls,
      vec![Call::Render(
        "pages/home/".into(),
        json!({"greeting": "hello", "path": "/home"})
      )]
    );
  }

  #[test]
  fn failing_provider() {
    let controller = StaticController::with_data(params(), Broken).unwrap();
    let mut res = RecordingResponse::default();
    block_on(controller.index(&Request::default(), &mut res)).unwrap();
    assert_eq!(
      res.calls,
      vec![Call::Send(StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable".into())]
    );
  }

  #[test]
  fn single_route() {
    let mut table = RouteTable::new();
    StaticController::new(params().router(&mut table)).unwrap();
    let routes: Vec<_> = table
      .routes()
      .iter()
      .map(|route| (route.method.clone(), route.path.as_str(), route.action))
      .collect();
    assert_eq!(routes, vec![(Method::GET, "/home", Action::Index)]);
  }

  #[test]
  fn other_actions() {
    let controller = StaticController::new(params()).unwrap();
    let mut res = RecordingResponse::default();
    let e = block_on(controller.handle(Action::List, &mut Request::default(), &mut res)).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::UnsupportedAction(action) if action == "list"));
  }
}
