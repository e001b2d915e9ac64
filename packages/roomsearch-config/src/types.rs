use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::Deserialize;

use crate::Error;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// Engine name as written in the config file. Parsed into a [`Dialect`] by [`Storage::dialect`].
	pub engine: String,
	pub dsn: String,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}
impl Storage {
	pub fn dialect(&self) -> Result<Dialect, Error> {
		self.engine.parse()
	}
}

/// Full-text search dialect of the configured backend.
///
/// The set is closed. An engine name outside it is rejected with [`Error::UnsupportedEngine`]
/// while the configuration is loaded, so request paths only ever see a recognized variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
	/// `tsvector` columns queried with `@@` and ranked by `ts_rank_cd`.
	Postgres,
	/// FTS virtual table queried with `MATCH`. No ranking function is used.
	Sqlite,
}
impl Dialect {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Postgres => "postgres",
			Self::Sqlite => "sqlite",
		}
	}

	/// Whether the engine computes a relevance score. When false every rank is zero.
	pub fn supports_ranking(self) -> bool {
		matches!(self, Self::Postgres)
	}
}
impl FromStr for Dialect {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" => Ok(Self::Postgres),
			"sqlite" | "sqlite3" => Ok(Self::Sqlite),
			_ => Err(Error::UnsupportedEngine { engine: raw.to_string() }),
		}
	}
}
impl Display for Dialect {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_pool_max_conns() -> u32 {
	4
}
