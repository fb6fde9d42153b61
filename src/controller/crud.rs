//! Generic CRUD controller over a [`Model`], designed mainly for back-offices
//! and admin interfaces.
//!
//! | method | path            | action    | hooks                     |
//! |--------|-----------------|-----------|---------------------------|
//! | GET    | `url_root`      | `list`    | middleware                |
//! | POST   | `url_root`      | `create`  | middleware + form parsing |
//! | GET    | `url_root` `:id`| `read`    | middleware                |
//! | POST   | `url_root` `:id`| `update`  | middleware + form parsing |
//! | DELETE | `url_root` `:id`| `destroy` | middleware                |

use super::{build, split, Action, Controller, ControllerBase, ControllerParams};
use crate::{
  error::{Error, ErrorKind, Result},
  model::{IdStrategy, Model, Query, Record, RecordId},
  util,
  web::{Hook, Request, Response, Router},
};
use actix_web::http::StatusCode;
use async_trait::async_trait;
use error_chain::bail;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Override points of [`CrudController`].
pub trait CrudHooks: Send + Sync {
  /// Filter used by `list`.
  fn list_query(&self, _req: &Request) -> Query {
    Query::new()
  }

  /// Field selection used by `list`, empty for every field.
  fn list_fields(&self) -> &str {
    ""
  }

  /// Validation, sanitation and transformation of submitted forms. Returns
  /// the parsed data and, when the form is rejected, the error rendered back
  /// to the user next to it.
  fn parse_form(&self, form: Record) -> (Record, Option<JsonValue>) {
    (form, None)
  }
}

pub struct DefaultHooks;

impl CrudHooks for DefaultHooks {}

pub struct CrudParams<'a> {
  pub controller: ControllerParams<'a>,
  pub model: Option<Arc<dyn Model>>,
  pub id_strategy: IdStrategy,
  pub hooks: Box<dyn CrudHooks>,
}

impl<'a> CrudParams<'a> {
  pub fn new(controller: ControllerParams<'a>) -> Self {
    CrudParams {
      controller,
      model: None,
      id_strategy: IdStrategy::default(),
      hooks: Box::new(DefaultHooks),
    }
  }

  pub fn model(mut self, model: Arc<dyn Model>) -> Self {
    self.model = Some(model);
    self
  }

  pub fn id_strategy(mut self, id_strategy: IdStrategy) -> Self {
    self.id_strategy = id_strategy;
    self
  }

  pub fn hooks(mut self, hooks: impl CrudHooks + 'static) -> Self {
    self.hooks = Box::new(hooks);
    self
  }
}

pub struct CrudController {
  base: ControllerBase,
  model: Arc<dyn Model>,
  id_strategy: IdStrategy,
  hooks: Box<dyn CrudHooks>,
}

impl CrudController {
  pub fn new(params: CrudParams) -> Result<Self> {
    let model = match params.model {
      Some(model) => model,
      None => bail!(ErrorKind::ModelNotProvided),
    };
    let (base, router, mount_path) = split(params.controller);
    build(
      CrudController {
        base,
        model,
        id_strategy: params.id_strategy,
        hooks: params.hooks,
      },
      router,
      &mount_path,
    )
  }

  /// Route parameter first, query string second.
  pub fn get_id(&self, req: &Request) -> Result<RecordId> {
    let raw = [req.params.get("id"), req.query.get("id")]
      .into_iter()
      .flatten()
      .find(|id| !id.is_empty());
    match raw {
      Some(raw) => self.id_strategy.extract(raw),
      None => bail!(ErrorKind::MissingId),
    }
  }

  /// `data` must carry an `item` key.
  pub fn render_item(&self, res: &mut dyn Response, data: JsonValue) -> Result<()> {
    if data.get("item").is_none() {
      bail!(ErrorKind::MissingItem);
    }
    res.render(&util::normalize(&format!("{}/item", self.base.view_root)), data)
  }

  pub fn render_list(&self, res: &mut dyn Response, list: Vec<Record>) -> Result<()> {
    res.render(
      &util::normalize(&format!("{}/list", self.base.view_root)),
      json!({ "list": list }),
    )
  }

  /// Sets the error status (500 unless given) and sends the error.
  pub fn error(&self, res: &mut dyn Response, error: &Error, status: Option<StatusCode>) {
    let status = status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    log::warn!("{} {}: {}", self.base.human_name, status, error);
    res.status(status).send(error.to_string());
  }

  /// Id errors are the client's fault.
  fn fail(&self, res: &mut dyn Response, error: Error) -> Result<()> {
    let status = match error.kind() {
      ErrorKind::InvalidId(_) | ErrorKind::MissingId => Some(StatusCode::BAD_REQUEST),
      _ => None,
    };
    self.error(res, &error, status);
    Ok(())
  }

  fn form_data(req: &Request) -> Record {
    req.parsed.clone().unwrap_or_else(|| req.body.clone())
  }

  pub async fn list_request(&self, req: &Request) -> Result<Vec<Record>> {
    self
      .model
      .find(&self.hooks.list_query(req), self.hooks.list_fields())
      .await
  }

  pub async fn create_request(&self, req: &Request) -> Result<Record> {
    self.model.create(Self::form_data(req)).await
  }

  pub async fn read_request(&self, req: &Request) -> Result<Option<Record>> {
    let id = self.get_id(req)?;
    self.model.find_by_id(&id).await
  }

  pub async fn update_request(&self, req: &Request) -> Result<Option<Record>> {
    let id = self.get_id(req)?;
    self.model.update_by_id(&id, Self::form_data(req)).await
  }

  pub async fn destroy_request(&self, req: &Request) -> Result<Option<Record>> {
    let id = self.get_id(req)?;
    self.model.remove_by_id(&id).await
  }

  /// Renders the list of all records.
  pub async fn list(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    match self.list_request(req).await {
      Ok(list) => self.render_list(res, list),
      Err(e) => self.fail(res, e),
    }
  }

  pub async fn create(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    if let Some(error) = &req.parse_error {
      return self.render_item(res, json!({ "item": req.parsed, "error": error }));
    }

    match self.create_request(req).await {
      Ok(created) => match RecordId::of(&created) {
        Some(id) => {
          res.redirect(StatusCode::FOUND, &format!("{}{}", self.base.url_root_full, id));
          Ok(())
        }
        None => self.fail(res, ErrorKind::SavedIncorrectly.into()),
      },
      Err(e) => self.fail(res, e),
    }
  }

  pub async fn read(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    match self.read_request(req).await {
      Ok(Some(item)) => self.render_item(res, json!({ "item": item })),
      Ok(None) => {
        let id = self.get_id(req).map(|id| id.to_string()).unwrap_or_default();
        self.fail(res, ErrorKind::NoSuchItem(id).into())
      }
      Err(e) => self.fail(res, e),
    }
  }

  pub async fn update(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    if let Some(error) = &req.parse_error {
      return self.render_item(res, json!({ "item": req.parsed, "error": error }));
    }

    match self.update_request(req).await {
      Ok(Some(item)) => self.render_item(res, json!({ "item": item })),
      Ok(None) => {
        let id = self.get_id(req).map(|id| id.to_string()).unwrap_or_default();
        self.fail(res, ErrorKind::NoSuchItem(id).into())
      }
      Err(e) => self.fail(res, e),
    }
  }

  pub async fn destroy(&self, req: &Request, res: &mut dyn Response) -> Result<()> {
    match self.destroy_request(req).await {
      Ok(_) => {
        res.redirect(StatusCode::FOUND, &self.base.url_root_full);
        Ok(())
      }
      Err(e) => self.fail(res, e),
    }
  }
}

#[async_trait(?Send)]
impl Controller for CrudController {
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

    let hooks = self.base.middleware().hooks();
    let mut with_form = hooks.clone();
    with_form.push(Hook::ParseForm);

    let root = self.base.url_root.as_str();
    let single = format!("{}:id", root);
    router.get(root, hooks.clone(), Action::List);
    router.post(root, with_form.clone(), Action::Create);
    router.get(&single, hooks.clone(), Action::Read);
    router.post(&single, with_form, Action::Update);
    router.delete(&single, hooks, Action::Destroy);
    Ok(())
  }

  fn parse_form_middleware(&self, req: &mut Request) {
    let (parsed, error) = self.hooks.parse_form(req.body.clone());
    req.parsed = Some(parsed);
    if error.is_some() {
      req.parse_error = error;
    }
  }

  async fn handle(&self, action: Action, req: &mut Request, res: &mut dyn Response) -> Result<()> {
    match action {
      Action::List => self.list(req, res).await,
      Action::Create => self.create(req, res).await,
      Action::Read => self.read(req, res).await,
      Action::Update => self.update(req, res).await,
      Action::Destroy => self.destroy(req, res).await,
      Action::Index => bail!(ErrorKind::UnsupportedAction(action.to_string())),
    }
  }
}
