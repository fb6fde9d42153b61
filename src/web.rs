use crate::{config::Config, error::Result, view::Views};
use actix_web::{middleware, web, App, HttpServer};
#[cfg(not(unix))]
use error_chain::bail;

mod dispatch;
mod request;
mod response;
mod router;

pub use dispatch::{dispatch, Binding, Dispatcher, Resolved};
pub use request::Request;
pub use response::{HtmlResponse, Response};
pub use router::{Hook, Middleware, MiddlewareStack, Route, RouteTable, Router};

/// Starts the http server; every request goes through the [`Dispatcher`].
#[actix_rt::main]
pub async fn init(config: Config, dispatcher: Dispatcher, views: Views) -> Result<()> {
  let dispatcher = web::Data::new(dispatcher);
  let views = web::Data::new(views);

  let server = HttpServer::new({
    let config = config.clone();
    move || {
      let mut app = App::new()
        .app_data(dispatcher.clone())
        .app_data(views.clone())
        .wrap(middleware::Logger::default());
      if let Some(static_dir) = &config.web.static_dir {
        app = app.service(actix_files::Files::new("/static", static_dir));
      }
      app.default_service(web::to(dispatch))
    }
  });

  log::info!("listening on {}", config.server.bind_addr);
  if config.server.bind_addr.starts_with("unix:/") {
    #[cfg(unix)]
    {
      server
        .bind_uds(config.server.bind_addr.trim_start_matches("unix:"))?
        .run()
        .await?;
    }
    #[cfg(not(unix))]
    bail!("Unix sockets are not available for this target");
  } else {
    server.bind(&config.server.bind_addr)?.run().await?;
  }
  Ok(())
}
