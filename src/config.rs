use crate::error::{Result, ResultExt};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// `host:port`, or `unix:/path/to.sock`
  pub bind_addr: String,
  pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
  /// Mount path of every controller.
  #[serde(default)]
  pub root_url: String,
  pub static_dir: Option<String>,
}

pub fn parse(file: &str) -> Result<Config> {
  Ok(toml::from_str(file)?)
}

pub fn load(path: &str) -> Result<Config> {
  std::fs::read_to_string(path)
    .map_err(Into::into)
    .and_then(|file| parse(&file))
    .chain_err(|| format!("Unable to load \"{}\"", path))
}
