// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("unknown {kind}: '{value}'")]
	UnknownVariant { kind: &'static str, value: String },
}

impl ParseError {
	pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
		ParseError::UnknownVariant {
			kind,
			value: value.to_string(),
		}
	}
}
