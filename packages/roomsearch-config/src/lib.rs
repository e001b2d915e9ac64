mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Dialect, Service, Storage};

use std::{
	fs,
	path::{Path, PathBuf},
};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	finish(cfg)
}

/// Parses a config payload that is already in memory. Errors carry an empty path.
pub fn parse(raw: &str) -> Result<Config> {
	let cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: PathBuf::new(), source: err })?;

	finish(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	cfg.storage.dialect()?;

	if cfg.storage.dsn.trim().is_empty() {
		return Err(Error::Validation { message: "storage.dsn must be non-empty.".to_string() });
	}
	if cfg.storage.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.service.log_level.is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn finish(mut cfg: Config) -> Result<Config> {
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

fn normalize(cfg: &mut Config) {
	cfg.storage.engine = cfg.storage.engine.trim().to_ascii_lowercase();
	cfg.storage.dsn = cfg.storage.dsn.trim().to_string();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
