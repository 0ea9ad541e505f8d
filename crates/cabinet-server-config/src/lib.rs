// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Cabinet access-control server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`CABINET_SERVER_*`)
//! - Tracing subscriber installation driven by the `logging` section
//!
//! # Usage
//!
//! ```ignore
//! use cabinet_server_config::{init_tracing, load_config};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use logging::{env_filter, init_tracing};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub acl: AclConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`CABINET_SERVER_*`)
/// 2. Config file (`/etc/cabinet/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let acl = layer.acl.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&acl, &logging)?;

	info!(
		include_link_history = acl.include_link_history,
		bulk_concurrency = acl.bulk_concurrency,
		memoize_decisions = acl.memoize_decisions,
		cache_parent_chains = acl.cache_parent_chains,
		log_level = %logging.level,
		log_format = %logging.format,
		"Server configuration loaded"
	);

	Ok(ServerConfig { acl, logging })
}

/// Validate cross-field configuration rules.
fn validate_config(acl: &AclConfig, logging: &LoggingConfig) -> Result<(), ConfigError> {
	if acl.bulk_concurrency == 0 {
		return Err(ConfigError::validation(
			"acl.bulk_concurrency must be at least 1",
		));
	}

	logging::validate_level(&logging.level)
}
