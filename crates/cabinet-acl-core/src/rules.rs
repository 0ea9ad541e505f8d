// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission-level table.
//!
//! Each action maps to the set of levels that satisfy it plus a short list of
//! side conditions ([`Hook`]). There is one table per [`ShareContext`]: rooms
//! rank management levels highest, plain-file trees rank `Editing` highest.
//! Every level set is built with [`LevelSet::at_least`], so it is an upper set
//! of its context's order and a more senior level never loses an action.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::action::Action;
use crate::entry::Entry;
use crate::folder::RootType;
use crate::ids::UserId;
use crate::level::{LevelSet, PermissionLevel, ShareContext};
use crate::record::AccessControlRecord;

// =============================================================================
// Hooks
// =============================================================================

/// Side conditions checked after the level matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
	/// Neither the record nor the enclosing room forbids downloading. Room
	/// managers and content creators are exempt from the room setting.
	DownloadAllowed,
	/// A content creator may only act on entries they created.
	OwnEntryForContentCreator,
	/// In the personal tree the grant must come from an ancestor, so the
	/// shared entry itself cannot be deleted or moved by the grantee.
	InheritedInPersonalRoot,
	/// The record is a link grant.
	LinkRecord,
	/// A content creator may not override someone else's lock.
	LockOwnership,
	/// Only the creator of the entry.
	OwnerOnly,
}

/// Everything a hook may look at.
#[derive(Debug, Clone, Copy)]
pub struct HookInput<'a> {
	pub entry: &'a Entry,
	pub caller: UserId,
	pub level: PermissionLevel,
	pub record: Option<&'a AccessControlRecord>,
	/// Nearest enclosing room, or the entry itself when it is a room.
	pub room: Option<&'a Entry>,
}

impl Hook {
	pub fn check(&self, input: &HookInput<'_>) -> bool {
		match self {
			Hook::DownloadAllowed => {
				if input.record.is_some_and(|r| r.deny_download()) {
					return false;
				}
				let room_denies = input
					.room
					.and_then(|room| room.folder_attrs())
					.is_some_and(|attrs| attrs.deny_download);
				!room_denies || input.level.is_room_admin()
			}
			Hook::OwnEntryForContentCreator => {
				input.level != PermissionLevel::ContentCreator || input.entry.create_by == input.caller
			}
			Hook::InheritedInPersonalRoot => {
				input.entry.root_type != RootType::User || input.record.is_some_and(|r| r.level > 0)
			}
			Hook::LinkRecord => input.record.is_some_and(|r| r.is_link()),
			Hook::LockOwnership => {
				if input.level != PermissionLevel::ContentCreator {
					return true;
				}
				match input.entry.file_attrs().and_then(|f| f.locked_by) {
					Some(holder) => holder == input.caller,
					None => true,
				}
			}
			Hook::OwnerOnly => input.entry.create_by == input.caller,
		}
	}
}

// =============================================================================
// Rules
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRule {
	pub levels: LevelSet,
	pub hooks: &'static [Hook],
}

impl ActionRule {
	const DENY: ActionRule = ActionRule {
		levels: LevelSet::empty(),
		hooks: &[],
	};

	pub fn permits(&self, input: &HookInput<'_>) -> bool {
		self.levels.contains(input.level) && self.hooks.iter().all(|h| h.check(input))
	}
}

#[derive(Debug)]
pub struct ActionTable {
	context: ShareContext,
	rules: HashMap<Action, ActionRule>,
}

impl ActionTable {
	pub fn for_context(context: ShareContext) -> &'static ActionTable {
		match context {
			ShareContext::Room => &ROOM_TABLE,
			ShareContext::File => &FILE_TABLE,
		}
	}

	pub fn context(&self) -> ShareContext {
		self.context
	}

	/// The rule for an action. Actions without a rule never pass.
	pub fn rule(&self, action: Action) -> ActionRule {
		self.rules.get(&action).copied().unwrap_or(ActionRule::DENY)
	}

	pub fn permits(&self, action: Action, input: &HookInput<'_>) -> bool {
		self.rule(action).permits(input)
	}

	fn build(context: ShareContext, thresholds: &[(Action, PermissionLevel, &'static [Hook])]) -> Self {
		let rules = thresholds
			.iter()
			.map(|(action, floor, hooks)| {
				(
					*action,
					ActionRule {
						levels: LevelSet::at_least(context, *floor),
						hooks: *hooks,
					},
				)
			})
			.collect();
		Self { context, rules }
	}
}

const DOWNLOAD: &[Hook] = &[Hook::DownloadAllowed];
const OWN_ENTRY: &[Hook] = &[Hook::OwnEntryForContentCreator];
const INHERITED: &[Hook] = &[Hook::InheritedInPersonalRoot];
const LINK_ONLY: &[Hook] = &[Hook::LinkRecord];
const LOCK: &[Hook] = &[Hook::LockOwnership];
const OWNER: &[Hook] = &[Hook::OwnerOnly];
const NONE: &[Hook] = &[];

static ROOM_TABLE: Lazy<ActionTable> = Lazy::new(|| {
	use Action as A;
	use PermissionLevel as L;
	ActionTable::build(
		ShareContext::Room,
		&[
			(A::EditRoom, L::RoomManager, NONE),
			(A::EditAccess, L::RoomManager, NONE),
			(A::IndexExport, L::RoomManager, NONE),
			(A::EditExpiration, L::RoomManager, NONE),
			(A::ChangeOwner, L::RoomManager, OWNER),
			(A::Create, L::ContentCreator, NONE),
			(A::CreateFrom, L::ContentCreator, NONE),
			(A::Delete, L::ContentCreator, OWN_ENTRY),
			(A::Rename, L::ContentCreator, OWN_ENTRY),
			(A::Move, L::ContentCreator, OWN_ENTRY),
			(A::Lock, L::ContentCreator, LOCK),
			(A::CopyTo, L::ContentCreator, NONE),
			(A::MoveTo, L::ContentCreator, NONE),
			(A::Duplicate, L::ContentCreator, DOWNLOAD),
			(A::ReadLinks, L::ContentCreator, NONE),
			(A::Vectorization, L::ContentCreator, NONE),
			(A::Edit, L::ReadWrite, NONE),
			(A::EditHistory, L::ReadWrite, NONE),
			(A::Convert, L::ReadWrite, NONE),
			(A::EditInternal, L::ReadWrite, NONE),
			(A::SubmitToFormGallery, L::ReadWrite, NONE),
			(A::CustomFilter, L::CustomFilter, NONE),
			(A::Review, L::Review, NONE),
			(A::Comment, L::Comment, NONE),
			(A::FillForms, L::FillForms, NONE),
			(A::Read, L::Read, NONE),
			(A::ReadHistory, L::Read, NONE),
			(A::Copy, L::Read, DOWNLOAD),
			(A::Pin, L::Read, NONE),
			(A::Mute, L::Read, NONE),
			(A::Download, L::Read, DOWNLOAD),
			(A::Embed, L::Read, DOWNLOAD),
			(A::CopySharedLink, L::Read, LINK_ONLY),
			(A::CopyLink, L::Read, NONE),
			(A::OpenForm, L::Read, NONE),
			(A::AscAi, L::Read, NONE),
			(A::UseChat, L::Read, NONE),
		],
	)
});

static FILE_TABLE: Lazy<ActionTable> = Lazy::new(|| {
	use Action as A;
	use PermissionLevel as L;
	ActionTable::build(
		ShareContext::File,
		&[
			(A::Create, L::ReadWrite, NONE),
			(A::CreateFrom, L::ReadWrite, NONE),
			(A::Edit, L::ReadWrite, NONE),
			(A::Delete, L::ReadWrite, INHERITED),
			(A::Move, L::ReadWrite, INHERITED),
			(A::Rename, L::ReadWrite, NONE),
			(A::Lock, L::ReadWrite, NONE),
			(A::EditHistory, L::ReadWrite, NONE),
			(A::CopyTo, L::ReadWrite, NONE),
			(A::MoveTo, L::ReadWrite, NONE),
			(A::Duplicate, L::ReadWrite, DOWNLOAD),
			(A::SubmitToFormGallery, L::ReadWrite, NONE),
			(A::Convert, L::ReadWrite, NONE),
			(A::EditInternal, L::ReadWrite, NONE),
			(A::CustomFilter, L::CustomFilter, NONE),
			(A::Review, L::Review, NONE),
			(A::Comment, L::Comment, NONE),
			(A::FillForms, L::FillForms, NONE),
			(A::Read, L::Read, NONE),
			(A::ReadHistory, L::Read, NONE),
			(A::Copy, L::Read, DOWNLOAD),
			(A::Download, L::Read, DOWNLOAD),
			(A::CopySharedLink, L::Read, LINK_ONLY),
			(A::CopyLink, L::Read, NONE),
			(A::OpenForm, L::Read, NONE),
			(A::AscAi, L::Read, NONE),
		],
	)
});

#[cfg(test)]
mod tests {
	use super::*;
	use crate::folder::FolderType;
	use crate::ids::TenantId;
	use crate::record::RecordOptions;
	use crate::subject::SubjectType;
	use crate::tables::{available_access, SHARE_CONTAINERS};
	use proptest::prelude::*;

	const CONTEXTS: [ShareContext; 2] = [ShareContext::Room, ShareContext::File];

	fn room_file(creator: UserId) -> (Entry, Entry) {
		let room = Entry::folder(10, TenantId(1), FolderType::CustomRoom, RootType::VirtualRooms, creator)
			.with_root(1, creator)
			.with_parent(1);
		let file = Entry::file(11, TenantId(1), RootType::VirtualRooms, creator)
			.with_root(1, creator)
			.with_parent(10);
		(room, file)
	}

	fn input<'a>(
		entry: &'a Entry,
		caller: UserId,
		level: PermissionLevel,
		record: Option<&'a AccessControlRecord>,
		room: Option<&'a Entry>,
	) -> HookInput<'a> {
		HookInput {
			entry,
			caller,
			level,
			record,
			room,
		}
	}

	mod monotonicity {
		use super::*;

		#[test]
		fn every_rule_is_an_upper_set() {
			for ctx in CONTEXTS {
				let table = ActionTable::for_context(ctx);
				for action in Action::all() {
					assert!(
						table.rule(*action).levels.is_upper_set(ctx),
						"{action} is not monotone in {ctx:?}"
					);
				}
			}
		}

		#[test]
		fn restrict_and_none_grant_nothing() {
			for ctx in CONTEXTS {
				let table = ActionTable::for_context(ctx);
				for action in Action::all() {
					let levels = table.rule(*action).levels;
					assert!(!levels.contains(PermissionLevel::Restrict));
					assert!(!levels.contains(PermissionLevel::None));
					assert!(!levels.contains(PermissionLevel::Varies));
				}
			}
		}

		proptest! {
			#[test]
			fn senior_level_keeps_every_action(
				ctx_idx in 0usize..2,
				a in 0usize..12,
				b in 0usize..12,
				action_idx in 0usize..Action::all().len(),
			) {
				let ctx = CONTEXTS[ctx_idx];
				let levels = PermissionLevel::all();
				let (low, high) = if ctx.outranks(levels[a], levels[b]) {
					(levels[b], levels[a])
				} else {
					(levels[a], levels[b])
				};
				let action = Action::all()[action_idx];
				let rule = ActionTable::for_context(ctx).rule(action);
				if rule.levels.contains(low) {
					prop_assert!(rule.levels.contains(high));
				}
			}
		}
	}

	mod consistency {
		use super::*;

		#[test]
		fn grantable_levels_can_read() {
			for container in SHARE_CONTAINERS {
				let ctx = if container.is_room() {
					ShareContext::Room
				} else {
					ShareContext::File
				};
				let table = ActionTable::for_context(ctx);
				for subject in SubjectType::all() {
					for level in available_access(*container, *subject).iter() {
						if matches!(level, PermissionLevel::None | PermissionLevel::Restrict) {
							continue;
						}
						assert!(
							table.rule(Action::Read).levels.contains(level),
							"{level} grantable in {container} cannot read"
						);
					}
				}
			}
		}

		#[test]
		fn room_table_ranks_managers_above_editors() {
			let table = ActionTable::for_context(ShareContext::Room);
			let edit_room = table.rule(Action::EditRoom).levels;
			assert!(edit_room.contains(PermissionLevel::RoomManager));
			assert!(!edit_room.contains(PermissionLevel::Editing));
			assert!(table.rule(Action::Edit).levels.contains(PermissionLevel::Editing));
		}

		#[test]
		fn file_table_has_no_room_actions() {
			let table = ActionTable::for_context(ShareContext::File);
			for action in [Action::EditRoom, Action::Pin, Action::Mute, Action::ChangeOwner] {
				assert!(table.rule(action).levels.is_empty());
			}
		}
	}

	mod hooks {
		use super::*;

		#[test]
		fn content_creator_deletes_only_own_entries() {
			let me = UserId::generate();
			let (_room, mine) = room_file(me);
			let (_room, theirs) = room_file(UserId::generate());
			let table = ActionTable::for_context(ShareContext::Room);
			let cc = PermissionLevel::ContentCreator;

			assert!(table.permits(Action::Delete, &input(&mine, me, cc, None, None)));
			assert!(!table.permits(Action::Delete, &input(&theirs, me, cc, None, None)));
			assert!(table.permits(
				Action::Delete,
				&input(&theirs, me, PermissionLevel::RoomManager, None, None)
			));
		}

		#[test]
		fn room_deny_download_exempts_managers() {
			let me = UserId::generate();
			let (mut room, file) = room_file(me);
			if let Some(attrs) = room.folder_attrs_mut() {
				attrs.deny_download = true;
			}
			let table = ActionTable::for_context(ShareContext::Room);

			assert!(!table.permits(
				Action::Download,
				&input(&file, me, PermissionLevel::Read, None, Some(&room))
			));
			assert!(table.permits(
				Action::Download,
				&input(&file, me, PermissionLevel::ContentCreator, None, Some(&room))
			));
		}

		#[test]
		fn embedding_needs_a_grant_and_respects_room_bans() {
			let me = UserId::generate();
			let (mut room, file) = room_file(me);
			let table = ActionTable::for_context(ShareContext::Room);
			let embed = |level, room: &Entry| {
				table.permits(Action::Embed, &input(&file, me, level, None, Some(room)))
			};

			assert!(!embed(PermissionLevel::Restrict, &room));
			assert!(embed(PermissionLevel::Read, &room));
			if let Some(attrs) = room.folder_attrs_mut() {
				attrs.deny_download = true;
			}
			assert!(!embed(PermissionLevel::Read, &room));
			assert!(embed(PermissionLevel::RoomManager, &room));
		}

		#[test]
		fn record_deny_download_applies_to_everyone() {
			let me = UserId::generate();
			let (room, file) = room_file(me);
			let record = AccessControlRecord::new(
				&file,
				SubjectType::ExternalLink,
				me,
				PermissionLevel::FillForms,
				me,
			)
			.with_options(RecordOptions {
				deny_download: true,
				..Default::default()
			});
			let table = ActionTable::for_context(ShareContext::Room);
			assert!(!table.permits(
				Action::Download,
				&input(&file, me, PermissionLevel::FillForms, Some(&record), Some(&room))
			));
			assert!(table.permits(
				Action::FillForms,
				&input(&file, me, PermissionLevel::FillForms, Some(&record), Some(&room))
			));
		}

		#[test]
		fn personal_delete_needs_inherited_grant() {
			let owner = UserId::generate();
			let guest = UserId::generate();
			let file = Entry::file(5, TenantId(1), RootType::User, owner)
				.with_root(1, owner)
				.with_parent(2);
			let direct =
				AccessControlRecord::new(&file, SubjectType::User, guest, PermissionLevel::Editing, owner);
			let inherited = direct.clone().with_level(1);
			let table = ActionTable::for_context(ShareContext::File);
			let level = PermissionLevel::Editing;

			assert!(!table.permits(Action::Delete, &input(&file, guest, level, Some(&direct), None)));
			assert!(table.permits(Action::Delete, &input(&file, guest, level, Some(&inherited), None)));
			assert!(table.permits(Action::Edit, &input(&file, guest, level, Some(&direct), None)));
		}

		#[test]
		fn copy_shared_link_needs_link_record() {
			let me = UserId::generate();
			let (_room, file) = room_file(me);
			let user_record =
				AccessControlRecord::new(&file, SubjectType::User, me, PermissionLevel::Read, me);
			let link_record = AccessControlRecord::new(
				&file,
				SubjectType::PrimaryExternalLink,
				me,
				PermissionLevel::Read,
				me,
			);
			let table = ActionTable::for_context(ShareContext::Room);
			let level = PermissionLevel::Read;
			assert!(!table.permits(
				Action::CopySharedLink,
				&input(&file, me, level, Some(&user_record), None)
			));
			assert!(table.permits(
				Action::CopySharedLink,
				&input(&file, me, level, Some(&link_record), None)
			));
		}

		#[test]
		fn content_creator_respects_foreign_lock() {
			let me = UserId::generate();
			let (_room, mut file) = room_file(me);
			if let Some(attrs) = file.file_attrs_mut() {
				attrs.locked_by = Some(UserId::generate());
			}
			let table = ActionTable::for_context(ShareContext::Room);
			assert!(!table.permits(
				Action::Lock,
				&input(&file, me, PermissionLevel::ContentCreator, None, None)
			));
			assert!(table.permits(
				Action::Lock,
				&input(&file, me, PermissionLevel::RoomManager, None, None)
			));
		}
	}
}
