// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control engine configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_BULK_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AclConfigLayer {
	pub include_link_history: Option<bool>,
	pub bulk_concurrency: Option<usize>,
	pub memoize_decisions: Option<bool>,
	pub cache_parent_chains: Option<bool>,
}

impl AclConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.include_link_history.is_some() {
			self.include_link_history = other.include_link_history;
		}
		if other.bulk_concurrency.is_some() {
			self.bulk_concurrency = other.bulk_concurrency;
		}
		if other.memoize_decisions.is_some() {
			self.memoize_decisions = other.memoize_decisions;
		}
		if other.cache_parent_chains.is_some() {
			self.cache_parent_chains = other.cache_parent_chains;
		}
	}

	pub fn finalize(self) -> AclConfig {
		AclConfig {
			include_link_history: self.include_link_history.unwrap_or(true),
			bulk_concurrency: self.bulk_concurrency.unwrap_or(DEFAULT_BULK_CONCURRENCY),
			memoize_decisions: self.memoize_decisions.unwrap_or(true),
			cache_parent_chains: self.cache_parent_chains.unwrap_or(true),
		}
	}
}

/// Access-control engine settings (runtime, fully resolved).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AclConfig {
	/// Consider links the caller used before when resolving records.
	pub include_link_history: bool,
	/// Evaluations in flight at once during bulk filtering. Must be at least 1.
	pub bulk_concurrency: usize,
	/// Memoize decisions per request.
	pub memoize_decisions: bool,
	/// Cache ancestor chains per request.
	pub cache_parent_chains: bool,
}

impl Default for AclConfig {
	fn default() -> Self {
		Self {
			include_link_history: true,
			bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
			memoize_decisions: true,
			cache_parent_chains: true,
		}
	}
}
