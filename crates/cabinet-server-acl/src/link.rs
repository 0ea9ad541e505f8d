// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External-link validation.

use cabinet_acl_core::{AccessControlRecord, Entry, LinkId, LinkStatus, SubjectId};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::engine::AccessEngine;
use crate::error::Result;
use crate::scope::RequestScope;

/// Hex SHA-256 of a link password, as stored in `RecordOptions::password_hash`.
pub fn hash_password(password: &str) -> String {
	hex::encode(Sha256::digest(password.as_bytes()))
}

/// Status of a link record at `now`.
pub fn link_status(
	record: &AccessControlRecord,
	password: Option<&str>,
	now: DateTime<Utc>,
) -> LinkStatus {
	if !record.is_link() {
		return LinkStatus::Invalid;
	}
	let Some(options) = &record.options else {
		return LinkStatus::Ok;
	};
	if options.expiration.is_some_and(|expires| expires <= now) {
		return LinkStatus::Expired;
	}
	match (&options.password_hash, password) {
		(None, _) => LinkStatus::Ok,
		(Some(_), None) => LinkStatus::RequiredPassword,
		(Some(expected), Some(given)) => {
			if expected.eq_ignore_ascii_case(&hash_password(given)) {
				LinkStatus::Ok
			} else {
				LinkStatus::InvalidPassword
			}
		}
	}
}

impl AccessEngine {
	/// Validate a link presented for an entry. A link with no record on the
	/// entry or its ancestors is invalid.
	#[instrument(skip(self, scope, entry, password), fields(entry_id = %entry.id, link_id = %link))]
	pub async fn validate_link(
		&self,
		scope: &RequestScope,
		entry: &Entry,
		link: LinkId,
		password: Option<&str>,
	) -> Result<LinkStatus> {
		let subject = SubjectId::from(link);
		let records = self.records.get_records(entry, Some(&[subject])).await?;
		let record = records
			.into_iter()
			.filter(|r| r.is_link() && r.subject == subject)
			.min_by_key(|r| r.level);

		let status = match record {
			Some(record) => scope.links().validate_record(&record, password).await?,
			None => LinkStatus::Invalid,
		};
		debug!(status = ?status, "link validated");
		Ok(status)
	}
}
