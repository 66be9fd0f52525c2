use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Deserialize, Clone)]
pub struct Config {
  pub buckets: BucketConfig,
  pub thumbnail: ThumbnailConfig,
}

#[derive(Deserialize, Clone)]
pub struct BucketConfig {
  pub source: String,
  pub destination: String,
  pub dest_prefix: String,
}

#[derive(Deserialize, Clone)]
pub struct ThumbnailConfig {
  pub width: u32,
  pub height: u32,
  pub allowed_extensions: Vec<String>,
}

pub fn parse(config_path: &str) -> Result<Config> {
  let toml_str = fs::read_to_string(config_path)
    .with_context(|| format!("failed to read config file: {}", config_path))?;
  let cfg: Config = toml::from_str(&toml_str).context("failed to deserialize config")?;

  Ok(cfg)
}
