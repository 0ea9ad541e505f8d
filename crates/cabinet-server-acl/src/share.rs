// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Granting and revoking access.

use cabinet_acl_core::{
	tables, AccessControlRecord, Action, Entry, FolderType, PermissionLevel, RecordOptions,
	RootType, SubjectId, SubjectType, TenantId,
};
use tracing::{info, instrument};

use crate::engine::AccessEngine;
use crate::error::{Result, ShareViolation};
use crate::scope::RequestScope;

/// A grant to be written on an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
	pub subject_type: SubjectType,
	pub subject: SubjectId,
	pub level: PermissionLevel,
	pub options: Option<RecordOptions>,
}

impl ShareRequest {
	pub fn new(
		subject_type: SubjectType,
		subject: impl Into<SubjectId>,
		level: PermissionLevel,
	) -> Self {
		Self {
			subject_type,
			subject: subject.into(),
			level,
			options: None,
		}
	}

	pub fn with_options(mut self, options: RecordOptions) -> Self {
		self.options = Some(options);
		self
	}
}

impl AccessEngine {
	/// Write a grant after checking that the caller may edit access, that the
	/// level is grantable to this kind of subject in the enclosing container,
	/// and that link limits hold. Replacing an existing grant of the same
	/// subject never counts against a limit.
	#[instrument(
		skip(self, scope, entry, request),
		fields(
			entry_id = %entry.id,
			subject_type = %request.subject_type,
			level = %request.level
		)
	)]
	pub async fn share(
		&self,
		scope: &RequestScope,
		entry: &Entry,
		request: ShareRequest,
	) -> Result<AccessControlRecord> {
		if !self.can(scope, entry, Action::EditAccess).await? {
			return Err(ShareViolation::AccessDenied.into());
		}

		let parents = self.parent_chain(scope, entry).await?;
		let container = share_container(entry, &parents).ok_or(ShareViolation::NotShareable)?;

		if !tables::available_access(container, request.subject_type).contains(request.level) {
			return Err(ShareViolation::LevelNotAvailable {
				container,
				subject_type: request.subject_type,
				level: request.level,
			}
			.into());
		}

		if let Some(limit) = tables::link_limit(container, request.subject_type) {
			let existing = self
				.records
				.get_records(entry, None)
				.await?
				.iter()
				.filter(|r| {
					r.entry_id == entry.id
						&& r.level == 0
						&& r.subject_type == request.subject_type
						&& r.subject != request.subject
				})
				.count();
			if existing >= limit {
				return Err(ShareViolation::LinkLimitReached {
					container,
					subject_type: request.subject_type,
					limit,
				}
				.into());
			}
		}

		let mut record = AccessControlRecord::new(
			entry,
			request.subject_type,
			request.subject,
			request.level,
			scope.principal().id,
		);
		record.options = request.options;
		self.records.set_record(&record).await?;

		info!(
			subject = %record.subject,
			container = %container,
			owner = %record.owner,
			"access granted"
		);
		Ok(record)
	}

	/// Drop every grant of a subject, typically when a user or group is
	/// deleted. With `without_owner`, grants the subject made to others stay.
	#[instrument(skip(self), fields(tenant = %tenant, subject = %subject))]
	pub async fn remove_subject(
		&self,
		tenant: TenantId,
		subject: SubjectId,
		without_owner: bool,
	) -> Result<()> {
		self.records
			.remove_by_subject(tenant, subject, without_owner)
			.await?;
		info!(without_owner, "subject removed from access lists");
		Ok(())
	}
}

/// The container whose grant table applies: the nearest room, or the
/// personal tree itself.
fn share_container(entry: &Entry, parents: &[Entry]) -> Option<FolderType> {
	let room = std::iter::once(entry)
		.chain(parents.iter())
		.find(|e| e.is_room());
	match room {
		Some(room) => room.folder_type(),
		None => (entry.root_type == RootType::User).then_some(FolderType::User),
	}
}
