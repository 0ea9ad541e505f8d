// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber installation.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::{LogFormat, LoggingConfig};

/// Build the filter for `config`. `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.clone().into())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
	let registry = tracing_subscriber::registry().with(env_filter(config));

	let result = match config.format {
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init(),
	};

	result.map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Check that `level` parses as a filter directive.
pub(crate) fn validate_level(level: &str) -> Result<(), ConfigError> {
	EnvFilter::try_new(level)
		.map(|_| ())
		.map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))
}
