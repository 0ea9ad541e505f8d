// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator contracts.
//!
//! The engine owns no storage. Records, the user directory, link state and the
//! folder tree are reached through these traits, all of which are async and
//! may fail; a failure aborts the current decision with an [`AclError`].
//!
//! [`AclError`]: crate::AclError

use async_trait::async_trait;
use cabinet_acl_core::{
	AccessControlRecord, Entry, EntryId, GroupId, LinkId, LinkStatus, SubjectId, SubjectType,
	TenantId, UserId, UserType,
};

use crate::error::Result;
use crate::link::link_status;

/// Storage of access-control records.
#[async_trait]
pub trait AccessRecordStore: Send + Sync {
	/// Records applying to an entry, inherited ones included.
	///
	/// For a folder, ancestor grants are projected onto the folder with
	/// `level` set to the distance from it. For a file, the file's own records
	/// come back at level 0 and ancestor grants are projected onto the parent
	/// folder. `subjects = None` returns records for every subject.
	async fn get_records(
		&self,
		entry: &Entry,
		subjects: Option<&[SubjectId]>,
	) -> Result<Vec<AccessControlRecord>>;

	/// Every record granted to any of the given subjects in a tenant.
	async fn get_records_by_subjects(
		&self,
		tenant: TenantId,
		subjects: &[SubjectId],
	) -> Result<Vec<AccessControlRecord>>;

	/// Insert or replace the record keyed by (entry, subject).
	async fn set_record(&self, record: &AccessControlRecord) -> Result<()>;

	/// Drop every record of a subject. With `without_owner`, records the
	/// subject granted to others are left alone.
	async fn remove_by_subject(
		&self,
		tenant: TenantId,
		subject: SubjectId,
		without_owner: bool,
	) -> Result<()>;

	/// Whether the entry or an ancestor carries a record of any given type.
	async fn is_shared(&self, entry: &Entry, subject_types: &[SubjectType]) -> Result<bool>;
}

/// The user directory.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
	async fn user_type(&self, tenant: TenantId, user: UserId) -> Result<UserType>;

	/// Whether the user sits outside the tenant's membership.
	async fn is_outsider(&self, tenant: TenantId, user: UserId) -> Result<bool>;

	async fn groups_of(&self, tenant: TenantId, user: UserId) -> Result<Vec<GroupId>>;

	/// Part of the directory contract; access decisions do not call it yet.
	async fn is_in_group(&self, tenant: TenantId, user: UserId, group: GroupId) -> Result<bool>;

	async fn active_users_in_group(&self, tenant: TenantId, group: GroupId) -> Result<Vec<UserId>>;
}

/// External-link state for one request.
#[async_trait]
pub trait ExternalLinkContext: Send + Sync {
	/// The validated link presented with the request, if any.
	async fn presented_link_id(&self) -> Result<Option<LinkId>>;

	/// Links the user opened before.
	async fn recent_link_ids(&self, tenant: TenantId, user: UserId) -> Result<Vec<LinkId>>;

	/// Check expiry and password of a link record.
	async fn validate_record(
		&self,
		record: &AccessControlRecord,
		password: Option<&str>,
	) -> Result<LinkStatus> {
		Ok(link_status(record, password, chrono::Utc::now()))
	}
}

/// Read access to the folder hierarchy.
#[async_trait]
pub trait FolderTreeLookup: Send + Sync {
	/// The folder and its ancestors, nearest first, ending at the tree root.
	async fn parent_chain(&self, tenant: TenantId, folder: &EntryId) -> Result<Vec<Entry>>;
}
