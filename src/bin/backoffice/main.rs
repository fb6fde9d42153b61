mod authors;
mod cli;
mod templates;

use mvc_controllers::{
  config::{self, Config},
  controller::{ControllerParams, CrudController, CrudParams, StaticController},
  error::{self, ErrorKind, Result},
  model::{sqlite::SqliteModel, IdStrategy, Model},
  web::{self, Dispatcher},
};
use r2d2_sqlite::SqliteConnectionManager;
use std::sync::Arc;

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,actix_web=debug")).init();

  if let Err(e) = run() {
    match e.kind() {
      ErrorKind::ClapError(e) => e.exit(),
      _ => {
        error::display(&e);
        std::process::exit(1);
      }
    }
  }
}

fn run() -> Result<()> {
  let args = cli::parse(std::env::args_os())?;
  let config = config::load(&args.config)?;

  // r2d2 pool
  let manager = SqliteConnectionManager::file(&config.server.db_path);
  let db_pool = r2d2::Pool::new(manager)?;
  let authors: Arc<dyn Model> = Arc::new(SqliteModel::new(db_pool, "author")?);

  let dispatcher = mount(&config, authors)?;
  templates::set_site(&config.web.root_url, dispatcher.links());

  match args.command {
    cli::Command::Routes => {
      for (method, path, action) in dispatcher.routes() {
        println!("{:<8}{:<32}{}", method.as_str(), path, action);
      }
      Ok(())
    }
    cli::Command::Serve => web::init(config, dispatcher, templates::views()),
  }
}

fn mount(config: &Config, authors: Arc<dyn Model>) -> Result<Dispatcher> {
  let root_url = config.web.root_url.as_str();
  let mut dispatcher = Dispatcher::new();

  dispatcher.mount(
    root_url,
    StaticController::with_data(
      ControllerParams::new("home", "Home"),
      authors::Summary::new(authors.clone()),
    )?,
  )?;
  dispatcher.mount(
    root_url,
    CrudController::new(
      CrudParams::new(ControllerParams::new("authors", "Authors").url_root("/authors/"))
        .model(authors)
        .id_strategy(IdStrategy::Integer)
        .hooks(authors::AuthorForm),
    )?,
  )?;
  dispatcher.mount(
    root_url,
    StaticController::new(ControllerParams::new("help", "Help").url_root("/help"))?,
  )?;
  Ok(dispatcher)
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::Method;
  use mvc_controllers::{controller::Action, model::memory::MemoryModel};

  #[test]
  fn mounted_routes() {
    let config = config::parse(
      r#"
        [server]
        bind_addr = "127.0.0.1:8080"
        db_path = ":memory:"

        [web]
        root_url = "/admin/"
      "#,
    )
    .unwrap();
    let dispatcher = mount(&config, Arc::new(MemoryModel::new())).unwrap();

    let routes: Vec<_> = dispatcher
      .routes()
      .into_iter()
      .map(|(method, path, action)| (method, path.to_string(), action))
      .collect();
    assert_eq!(
      routes,
      vec![
        (Method::GET, "/admin/".to_string(), Action::Index),
        (Method::GET, "/admin/authors/".to_string(), Action::List),
        (Method::POST, "/admin/authors/".to_string(), Action::Create),
        (Method::GET, "/admin/authors/:id".to_string(), Action::Read),
        (Method::POST, "/admin/authors/:id".to_string(), Action::Update),
        (Method::DELETE, "/admin/authors/:id".to_string(), Action::Destroy),
        (Method::GET, "/admin/help".to_string(), Action::Index),
      ]
    );
    assert_eq!(dispatcher.links().len(), 3);
  }
}
