// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{AclConfigLayer, LogFormat, LoggingConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/cabinet/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: CABINET_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from(&|name: &str| std::env::var(name).ok())
	}
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn load_from(lookup: Lookup<'_>) -> Result<ServerConfigLayer, ConfigError> {
	Ok(ServerConfigLayer {
		acl: Some(load_acl(lookup)?),
		logging: Some(load_logging(lookup)?),
	})
}

fn env_var(lookup: Lookup<'_>, name: &str) -> Option<String> {
	lookup(name).filter(|s| !s.is_empty())
}

fn env_bool(lookup: Lookup<'_>, name: &str) -> Option<bool> {
	env_var(lookup, name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_usize(lookup: Lookup<'_>, name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(lookup, name) {
		Some(v) => v
			.parse()
			.map(Some)
			.map_err(|_| ConfigError::invalid_value(name, format!("invalid usize value '{v}'"))),
		None => Ok(None),
	}
}

fn load_acl(lookup: Lookup<'_>) -> Result<AclConfigLayer, ConfigError> {
	Ok(AclConfigLayer {
		include_link_history: env_bool(lookup, "CABINET_SERVER_ACL_INCLUDE_LINK_HISTORY"),
		bulk_concurrency: env_usize(lookup, "CABINET_SERVER_ACL_BULK_CONCURRENCY")?,
		memoize_decisions: env_bool(lookup, "CABINET_SERVER_ACL_MEMOIZE_DECISIONS"),
		cache_parent_chains: env_bool(lookup, "CABINET_SERVER_ACL_CACHE_PARENT_CHAINS"),
	})
}

fn load_logging(lookup: Lookup<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var(lookup, "CABINET_SERVER_LOG_FORMAT") {
		Some(v) => Some(LogFormat::parse(&v).ok_or_else(|| {
			ConfigError::invalid_value("CABINET_SERVER_LOG_FORMAT", format!("unknown format '{v}'"))
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var(lookup, "CABINET_SERVER_LOG_LEVEL"),
		format,
	})
}
