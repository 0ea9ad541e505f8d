// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use cabinet_acl_core::{EntryId, FolderType, PermissionLevel, SubjectType};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Faults raised by the engine or its collaborators.
///
/// A denied action is never an error; it is `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
	#[error("access record store failed: {0}")]
	Store(#[source] BoxError),

	#[error("directory lookup failed: {0}")]
	Directory(#[source] BoxError),

	#[error("external link context failed: {0}")]
	Link(#[source] BoxError),

	#[error("folder tree lookup failed: {0}")]
	Tree(#[source] BoxError),

	#[error("malformed entry {entry_id}: {reason}")]
	MalformedEntry { entry_id: EntryId, reason: String },

	#[error("malformed record on entry {entry_id}: {reason}")]
	MalformedRecord { entry_id: EntryId, reason: String },

	#[error("share rejected: {0}")]
	ShareRejected(#[from] ShareViolation),
}

impl AclError {
	pub fn store(err: impl Into<BoxError>) -> Self {
		Self::Store(err.into())
	}

	pub fn directory(err: impl Into<BoxError>) -> Self {
		Self::Directory(err.into())
	}

	pub fn link(err: impl Into<BoxError>) -> Self {
		Self::Link(err.into())
	}

	pub fn tree(err: impl Into<BoxError>) -> Self {
		Self::Tree(err.into())
	}

	pub(crate) fn malformed_entry(entry_id: &EntryId, reason: impl Into<String>) -> Self {
		Self::MalformedEntry {
			entry_id: entry_id.clone(),
			reason: reason.into(),
		}
	}

	pub(crate) fn malformed_record(entry_id: &EntryId, reason: impl Into<String>) -> Self {
		Self::MalformedRecord {
			entry_id: entry_id.clone(),
			reason: reason.into(),
		}
	}

	/// True for failures of an external collaborator.
	pub fn is_collaborator_failure(&self) -> bool {
		matches!(
			self,
			AclError::Store(_) | AclError::Directory(_) | AclError::Link(_) | AclError::Tree(_)
		)
	}
}

/// Why a grant was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareViolation {
	#[error("caller may not edit access on this entry")]
	AccessDenied,

	#[error("entry is not inside a shareable container")]
	NotShareable,

	#[error("{level} cannot be granted to {subject_type} in {container}")]
	LevelNotAvailable {
		container: FolderType,
		subject_type: SubjectType,
		level: PermissionLevel,
	},

	#[error("{container} already holds {limit} {subject_type} link(s)")]
	LinkLimitReached {
		container: FolderType,
		subject_type: SubjectType,
		limit: usize,
	},
}

pub type Result<T> = std::result::Result<T, AclError>;
