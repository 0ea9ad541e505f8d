// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration assembled from one source.

use serde::{Deserialize, Serialize};

use crate::sections::{AclConfigLayer, LoggingConfigLayer};

/// One source's view of the configuration. Unset sections are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub acl: Option<AclConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.acl, other.acl, AclConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(existing), Some(overlay)) => merge(existing, overlay),
		(None, Some(overlay)) => *base = Some(overlay),
		(_, None) => {}
	}
}
