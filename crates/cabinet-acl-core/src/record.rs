// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control records (grants).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::EntryType;
use crate::entry::Entry;
use crate::ids::{EntryId, SubjectId, TenantId, UserId};
use crate::level::PermissionLevel;
use crate::subject::SubjectType;

/// Inheritance depth carried by synthetic default records.
pub const DEFAULT_RECORD_LEVEL: u32 = u32::MAX;

/// One grant of a permission level to a subject on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlRecord {
	pub tenant_id: TenantId,
	pub entry_id: EntryId,
	pub entry_type: EntryType,
	pub subject_type: SubjectType,
	pub subject: SubjectId,
	/// Who made the grant.
	pub owner: UserId,
	pub share: PermissionLevel,
	pub options: Option<RecordOptions>,
	/// Folder the grant was made on.
	pub parent_id: Option<EntryId>,
	/// 0 on the entry itself, >0 inherited from that many levels up.
	pub level: u32,
}

/// Link-specific options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOptions {
	/// Lowercase hex SHA-256 of the link password.
	pub password_hash: Option<String>,
	pub expiration: Option<DateTime<Utc>>,
	pub deny_download: bool,
	/// Only visible to members of the tenant.
	pub internal: bool,
	pub title: Option<String>,
}

impl AccessControlRecord {
	pub fn new(
		entry: &Entry,
		subject_type: SubjectType,
		subject: impl Into<SubjectId>,
		share: PermissionLevel,
		owner: UserId,
	) -> Self {
		Self {
			tenant_id: entry.tenant_id,
			entry_id: entry.id.clone(),
			entry_type: entry.entry_type(),
			subject_type,
			subject: subject.into(),
			owner,
			share,
			options: None,
			parent_id: entry.parent_id.clone(),
			level: 0,
		}
	}

	/// The synthetic record standing in for "no stored grant".
	pub fn synthetic_default(
		entry: &Entry,
		subject: impl Into<SubjectId>,
		share: PermissionLevel,
	) -> Self {
		Self {
			level: DEFAULT_RECORD_LEVEL,
			..Self::new(entry, SubjectType::User, subject, share, entry.root_create_by)
		}
	}

	pub fn with_options(mut self, options: RecordOptions) -> Self {
		self.options = Some(options);
		self
	}

	pub fn with_level(mut self, level: u32) -> Self {
		self.level = level;
		self
	}

	pub fn is_link(&self) -> bool {
		self.subject_type.is_link()
	}

	pub fn is_default(&self) -> bool {
		self.level == DEFAULT_RECORD_LEVEL
	}

	pub fn deny_download(&self) -> bool {
		self.options.as_ref().is_some_and(|o| o.deny_download)
	}
}

/// Outcome of validating an external link for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
	Ok,
	Invalid,
	Expired,
	RequiredPassword,
	InvalidPassword,
}
