// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Files, folders and the principal asking about them.
//!
//! Entries are plain values supplied by storage. Nothing computed during an
//! evaluation is written back onto them; per-request results live in the
//! engine's request scope instead.

use serde::{Deserialize, Serialize};

use crate::action::EntryType;
use crate::folder::{FolderType, RootType};
use crate::ids::{EntryId, GroupId, LinkId, TenantId, UserId};

// =============================================================================
// Entries
// =============================================================================

/// A file or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
	pub id: EntryId,
	pub tenant_id: TenantId,
	/// `None` only for tree roots.
	pub parent_id: Option<EntryId>,
	pub root_id: EntryId,
	pub root_type: RootType,
	pub create_by: UserId,
	/// Creator of the root ancestor.
	pub root_create_by: UserId,
	/// Mapped from a third-party storage provider.
	pub provider_entry: bool,
	pub encrypted: bool,
	/// Full-shared (public) entry.
	pub shared: bool,
	pub shared_by: Option<UserId>,
	pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
	File(FileAttrs),
	Folder(FolderAttrs),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttrs {
	pub is_form: bool,
	pub is_completed_form: bool,
	pub previewable: bool,
	pub locked_by: Option<UserId>,
	pub filling: Option<FormFilling>,
	pub vectorization: Option<VectorizationStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderAttrs {
	pub folder_type: FolderType,
	/// Room setting: members below content creator may not download.
	pub deny_download: bool,
	/// Room setting: content indexing enabled.
	pub indexing: bool,
}

/// State of a form-filling session on a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFilling {
	/// `-1` not started, `0` completed, `n > 0` in progress at step `n`.
	pub current_step: i32,
	pub stopped: bool,
	pub roles: Vec<FormRole>,
}

impl FormFilling {
	pub const NOT_STARTED: i32 = -1;
	pub const COMPLETED: i32 = 0;

	pub fn roles_of(&self, user: UserId) -> impl Iterator<Item = &FormRole> {
		self.roles.iter().filter(move |r| r.user == user)
	}
}

impl Default for FormFilling {
	/// A draft nobody has started filling.
	fn default() -> Self {
		Self {
			current_step: Self::NOT_STARTED,
			stopped: false,
			roles: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRole {
	pub user: UserId,
	pub sequence: i32,
	pub submitted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorizationStatus {
	InProgress,
	Completed,
	Failed,
}

impl Entry {
	/// A file with default attributes.
	pub fn file(
		id: impl Into<EntryId>,
		tenant_id: TenantId,
		root_type: RootType,
		create_by: UserId,
	) -> Self {
		Self::new(
			id.into(),
			tenant_id,
			root_type,
			create_by,
			EntryKind::File(FileAttrs::default()),
		)
	}

	/// A folder of the given type.
	pub fn folder(
		id: impl Into<EntryId>,
		tenant_id: TenantId,
		folder_type: FolderType,
		root_type: RootType,
		create_by: UserId,
	) -> Self {
		Self::new(
			id.into(),
			tenant_id,
			root_type,
			create_by,
			EntryKind::Folder(FolderAttrs {
				folder_type,
				deny_download: false,
				indexing: false,
			}),
		)
	}

	fn new(
		id: EntryId,
		tenant_id: TenantId,
		root_type: RootType,
		create_by: UserId,
		kind: EntryKind,
	) -> Self {
		Self {
			root_id: id.clone(),
			id,
			tenant_id,
			parent_id: None,
			root_type,
			create_by,
			root_create_by: create_by,
			provider_entry: false,
			encrypted: false,
			shared: false,
			shared_by: None,
			kind,
		}
	}

	pub fn with_parent(mut self, parent_id: impl Into<EntryId>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	pub fn with_root(mut self, root_id: impl Into<EntryId>, root_create_by: UserId) -> Self {
		self.root_id = root_id.into();
		self.root_create_by = root_create_by;
		self
	}

	pub fn entry_type(&self) -> EntryType {
		match self.kind {
			EntryKind::File(_) => EntryType::File,
			EntryKind::Folder(_) => EntryType::Folder,
		}
	}

	pub fn is_folder(&self) -> bool {
		matches!(self.kind, EntryKind::Folder(_))
	}

	pub fn file_attrs(&self) -> Option<&FileAttrs> {
		match &self.kind {
			EntryKind::File(attrs) => Some(attrs),
			EntryKind::Folder(_) => None,
		}
	}

	pub fn file_attrs_mut(&mut self) -> Option<&mut FileAttrs> {
		match &mut self.kind {
			EntryKind::File(attrs) => Some(attrs),
			EntryKind::Folder(_) => None,
		}
	}

	pub fn folder_attrs(&self) -> Option<&FolderAttrs> {
		match &self.kind {
			EntryKind::Folder(attrs) => Some(attrs),
			EntryKind::File(_) => None,
		}
	}

	pub fn folder_attrs_mut(&mut self) -> Option<&mut FolderAttrs> {
		match &mut self.kind {
			EntryKind::Folder(attrs) => Some(attrs),
			EntryKind::File(_) => None,
		}
	}

	pub fn folder_type(&self) -> Option<FolderType> {
		self.folder_attrs().map(|f| f.folder_type)
	}

	pub fn is_room(&self) -> bool {
		self.folder_type().is_some_and(|t| t.is_room())
	}

	/// True for forms and completed forms.
	pub fn is_form(&self) -> bool {
		self.file_attrs()
			.is_some_and(|f| f.is_form || f.is_completed_form)
	}

	/// True when this entry sits directly under its tree root.
	pub fn is_root_level(&self) -> bool {
		self.parent_id.as_ref() == Some(&self.root_id)
	}

	/// True when this entry is the tree root itself.
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none() || self.id == self.root_id
	}
}

// =============================================================================
// Principals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
	DocSpaceAdmin,
	RoomAdmin,
	User,
	Guest,
}

/// The caller of one request, loaded once from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: UserId,
	pub user_type: UserType,
	pub outsider: bool,
	pub authenticated: bool,
	pub groups: Vec<GroupId>,
	/// Validated link presented with the current request.
	pub link: Option<LinkId>,
	/// Links this principal has used before ("recent-by-link" tags).
	pub recent_links: Vec<LinkId>,
}

impl Principal {
	/// An authenticated member with no groups or links.
	pub fn new(id: UserId, user_type: UserType) -> Self {
		Self {
			id,
			user_type,
			outsider: false,
			authenticated: true,
			groups: Vec::new(),
			link: None,
			recent_links: Vec::new(),
		}
	}

	pub fn is_admin(&self) -> bool {
		self.user_type == UserType::DocSpaceAdmin
	}

	pub fn is_guest(&self) -> bool {
		self.user_type == UserType::Guest
	}

	/// May create rooms.
	pub fn can_create_rooms(&self) -> bool {
		matches!(self.user_type, UserType::DocSpaceAdmin | UserType::RoomAdmin)
	}
}
