use clap::clap_app;
use mvc_controllers::error::Result;
use std::ffi::OsString;

pub const DEFAULT_CONFIG: &str = "data/config.toml";

#[derive(Debug, PartialEq)]
pub enum Command {
  Serve,
  Routes,
}

#[derive(Debug)]
pub struct Args {
  pub config: String,
  pub command: Command,
}

pub fn parse<I, T>(args: I) -> Result<Args>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
{
  let matches = clap_app!(backoffice =>
    (version: env!("CARGO_PKG_VERSION"))
    (about: "Authors back-office")
    (@arg config: -c --config +takes_value "Config file, data/config.toml by default")
    (@subcommand serve => (about: "Start the http server (default)"))
    (@subcommand routes => (about: "Print the routes of every mounted controller"))
  )
  .get_matches_from_safe(args)?;

  let command = match matches.subcommand_name() {
    Some("routes") => Command::Routes,
    _ => Command::Serve,
  };
  Ok(Args {
    config: matches.value_of("config").unwrap_or(DEFAULT_CONFIG).to_string(),
    command,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_serve() {
    let args = parse(vec!["backoffice"]).unwrap();
    assert_eq!(args.config, DEFAULT_CONFIG);
    assert_eq!(args.command, Command::Serve);
  }

  #[test]
  fn routes_with_config() {
    let args = parse(vec!["backoffice", "-c", "other.toml", "routes"]).unwrap();
    assert_eq!(args.config, "other.toml");
    assert_eq!(args.command, Command::Routes);
  }

  #[test]
  fn unknown_subcommand() {
    assert!(parse(vec!["backoffice", "frobnicate"]).is_err());
  }
}
