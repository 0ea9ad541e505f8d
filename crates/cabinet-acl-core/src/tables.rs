// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Frozen sharing policy tables.
//!
//! - `available_access`: which levels may be granted to a subject kind inside a
//!   container (personal folder or room subtype). Used when granting, not when
//!   evaluating, but [`crate::rules`] tests keep the two consistent.
//! - `link_limit`: how many links of a kind a container may carry at once.
//! - `default_level`: the level assumed when no record applies.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::folder::{FolderType, RootType};
use crate::level::{LevelSet, PermissionLevel};
use crate::subject::SubjectType;

use PermissionLevel::*;

/// Containers a grant can be made in.
pub const SHARE_CONTAINERS: &[FolderType] = &[
	FolderType::User,
	FolderType::CustomRoom,
	FolderType::PublicRoom,
	FolderType::FillingFormsRoom,
	FolderType::EditingRoom,
	FolderType::VirtualDataRoom,
	FolderType::AiRoom,
];

/// Primary external links per container.
pub const PRIMARY_LINK_LIMIT: usize = 1;
/// Additional (non-primary) external links per container.
pub const EXTERNAL_LINK_LIMIT: usize = 5;

static AVAILABLE_ACCESS: Lazy<HashMap<(FolderType, SubjectType), LevelSet>> = Lazy::new(|| {
	let mut table = HashMap::new();
	let mut put = |container: FolderType, subjects: &[SubjectType], levels: &[PermissionLevel]| {
		for subject in subjects {
			table.insert((container, *subject), LevelSet::of(levels));
		}
	};

	let links: &[SubjectType] = &[SubjectType::ExternalLink, SubjectType::PrimaryExternalLink];
	let members: &[SubjectType] = &[SubjectType::Group, SubjectType::InvitationLink];

	put(
		FolderType::User,
		&[SubjectType::User, SubjectType::Group],
		&[Editing, CustomFilter, Review, Comment, FillForms, Read, Restrict, None],
	);
	put(
		FolderType::User,
		links,
		&[Editing, CustomFilter, Review, Comment, FillForms, Read, None],
	);
	put(FolderType::User, &[SubjectType::InvitationLink], &[]);

	put(
		FolderType::CustomRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, Editing, Review, Comment, Read, None],
	);
	put(
		FolderType::CustomRoom,
		members,
		&[ContentCreator, Editing, Review, Comment, Read, None],
	);
	put(FolderType::CustomRoom, links, &[Editing, Review, Comment, Read, None]);

	put(
		FolderType::PublicRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, Read, None],
	);
	put(FolderType::PublicRoom, members, &[ContentCreator, Read, None]);
	put(FolderType::PublicRoom, links, &[Read, None]);

	put(
		FolderType::FillingFormsRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, FillForms, None],
	);
	put(
		FolderType::FillingFormsRoom,
		members,
		&[ContentCreator, FillForms, None],
	);
	put(FolderType::FillingFormsRoom, links, &[FillForms, None]);

	put(
		FolderType::EditingRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, Editing, Read, None],
	);
	put(
		FolderType::EditingRoom,
		members,
		&[ContentCreator, Editing, Read, None],
	);
	put(FolderType::EditingRoom, links, &[Editing, Read, None]);

	put(
		FolderType::VirtualDataRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, Editing, FillForms, Review, Comment, Read, None],
	);
	put(
		FolderType::VirtualDataRoom,
		members,
		&[ContentCreator, Editing, FillForms, Review, Comment, Read, None],
	);
	put(
		FolderType::VirtualDataRoom,
		links,
		&[Editing, FillForms, Review, Comment, Read, None],
	);

	put(
		FolderType::AiRoom,
		&[SubjectType::User],
		&[RoomManager, ContentCreator, Read, None],
	);
	put(FolderType::AiRoom, members, &[ContentCreator, Read, None]);
	put(FolderType::AiRoom, links, &[]);

	table
});

/// Levels selectable when granting `subject` access inside `container`.
///
/// Containers that cannot carry grants return the empty set.
pub fn available_access(container: FolderType, subject: SubjectType) -> LevelSet {
	AVAILABLE_ACCESS
		.get(&(container, subject))
		.copied()
		.unwrap_or_default()
}

/// Maximum simultaneous links of `subject` kind inside `container`.
///
/// `None` means unlimited. Non-link subjects are unlimited.
pub fn link_limit(container: FolderType, subject: SubjectType) -> Option<usize> {
	if !subject.is_link() {
		return Option::None;
	}
	if available_access(container, subject).is_empty() {
		return Some(0);
	}
	match subject {
		SubjectType::PrimaryExternalLink => Some(PRIMARY_LINK_LIMIT),
		SubjectType::ExternalLink => Some(EXTERNAL_LINK_LIMIT),
		_ => Option::None,
	}
}

/// Level assumed for an entry with no applicable record.
pub fn default_level(root: RootType) -> PermissionLevel {
	match root {
		RootType::Common => Read,
		RootType::User
		| RootType::Privacy
		| RootType::Archive
		| RootType::RoomTemplates
		| RootType::VirtualRooms => Restrict,
		_ => Read,
	}
}
