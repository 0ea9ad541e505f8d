// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("failed to read {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Invalid value
	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	/// Validation error
	#[error("Validation error: {0}")]
	Validation(String),

	/// The global tracing subscriber could not be installed
	#[error("failed to install tracing subscriber: {0}")]
	Logging(String),
}

impl ConfigError {
	/// Create a validation error
	pub fn validation(msg: impl Into<String>) -> Self {
		Self::Validation(msg.into())
	}

	/// Create an invalid value error
	pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}
