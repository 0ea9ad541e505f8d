// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute guards and ownership shortcuts.

use cabinet_acl_core::{Action, FolderType, RootType, VectorizationStatus};

use super::EvalInput;

/// Actions an AI room never offers on itself.
const AI_ROOM_DENIED: &[Action] = &[
	Action::Create,
	Action::CreateFrom,
	Action::CopyTo,
	Action::MoveTo,
	Action::Duplicate,
	Action::IndexExport,
	Action::Embed,
	Action::CreateRoomFrom,
];

/// Content actions unavailable on encrypted entries.
const ENCRYPTED_DENIED: &[Action] = &[
	Action::Convert,
	Action::Embed,
	Action::AscAi,
	Action::Vectorization,
];

/// Denials that follow from the entry's own attributes. Never permits.
pub(super) fn type_guard(input: &EvalInput<'_>) -> Option<bool> {
	let entry = input.entry;
	let action = input.action;

	if entry.encrypted && ENCRYPTED_DENIED.contains(&action) {
		return Some(false);
	}
	if entry.provider_entry && action.is_history() {
		return Some(false);
	}
	if action == Action::Embed && !embeddable(input) {
		return Some(false);
	}

	if let Some(file) = entry.file_attrs() {
		let denied = match action {
			Action::FillForms => !entry.is_form(),
			Action::Edit => file.is_completed_form,
			Action::SubmitToFormGallery => !file.is_form,
			Action::Vectorization => file.vectorization != Some(VectorizationStatus::Failed),
			_ => false,
		};
		return denied.then_some(false);
	}

	let folder_type = entry.folder_type()?;
	let denied = match action {
		Action::UseChat => folder_type != FolderType::AiRoom,
		Action::IndexExport => {
			!entry.is_room() || !entry.folder_attrs().is_some_and(|f| f.indexing)
		}
		_ => folder_type == FolderType::AiRoom && AI_ROOM_DENIED.contains(&action),
	};
	denied.then_some(false)
}

/// Decisions that follow from who created what.
pub(super) fn ownership(input: &EvalInput<'_>) -> Option<bool> {
	let entry = input.entry;
	let caller = input.caller();

	if entry.is_folder() && entry.provider_entry && entry.is_root_level() && entry.create_by == caller
	{
		return Some(true);
	}

	match input.action {
		Action::Reconnect => Some(entry.is_room() && entry.provider_entry && entry.create_by == caller),
		Action::CreateRoomFrom => Some(
			entry.root_type == RootType::User
				&& entry.root_create_by == caller
				&& input.principal.can_create_rooms()
				&& entry
					.folder_type()
					.map_or(true, |t| t == FolderType::Default),
		),
		_ => None,
	}
}

/// Only shared room content can be embedded; the level check still applies.
fn embeddable(input: &EvalInput<'_>) -> bool {
	let entry = input.entry;
	if entry.root_type != RootType::VirtualRooms {
		return false;
	}
	match entry.file_attrs() {
		Some(file) => entry.shared && file.previewable,
		None => entry.is_room() && entry.shared,
	}
}

#[cfg(test)]
mod tests {
	use super::super::fixtures::*;
	use super::super::Branch;
	use cabinet_acl_core::{
		Action, Entry, FolderType, PermissionLevel, Principal, RootType, UserId, UserType,
		VectorizationStatus,
	};

	#[test]
	fn fill_forms_needs_a_form() {
		let owner = UserId::generate();
		let room = room(FolderType::FillingFormsRoom, owner);
		let filler = user(UserType::User);
		let mut file = file_in(&room, owner);
		let parents = vec![room.clone()];

		let case = Case::new(&file, &filler)
			.parents(&parents)
			.level(PermissionLevel::FillForms);
		assert_eq!(case.decide(Action::FillForms).branch, Branch::TypeGuard);

		file.file_attrs_mut().unwrap().is_form = true;
		let case = Case::new(&file, &filler)
			.parents(&parents)
			.level(PermissionLevel::FillForms);
		assert!(case.allows(Action::FillForms));
	}

	#[test]
	fn completed_forms_are_read_only() {
		let owner = Principal::new(UserId::generate(), UserType::User);
		let mut file = Entry::file(1, TENANT, RootType::Common, owner.id);
		file.file_attrs_mut().unwrap().is_completed_form = true;
		let case = Case::new(&file, &owner).level(PermissionLevel::Editing);
		assert!(!case.allows(Action::Edit));
		assert!(case.allows(Action::Read));
	}

	#[test]
	fn ai_rooms_refuse_structural_actions() {
		let admin = user(UserType::DocSpaceAdmin);
		let room = room(FolderType::AiRoom, admin.id);
		let case = Case::new(&room, &admin).level(PermissionLevel::RoomManager);
		for action in [Action::Create, Action::Duplicate, Action::Embed, Action::CopyTo] {
			let decision = case.decide(action);
			assert!(!decision.allowed, "{action} allowed");
			assert_eq!(decision.branch, Branch::TypeGuard);
		}
		assert!(case.allows(Action::UseChat));
		assert!(case.allows(Action::Read));
	}

	#[test]
	fn chat_only_in_ai_rooms() {
		let admin = user(UserType::DocSpaceAdmin);
		let room = room(FolderType::CustomRoom, admin.id);
		assert!(!Case::new(&room, &admin).allows(Action::UseChat));
	}

	#[test]
	fn vectorization_only_retries_failures() {
		let owner = UserId::generate();
		let room = room(FolderType::AiRoom, owner);
		let manager = user(UserType::RoomAdmin);
		let parents = vec![room.clone()];
		let mut file = file_in(&room, manager.id);

		for (status, expected) in [
			(None, false),
			(Some(VectorizationStatus::InProgress), false),
			(Some(VectorizationStatus::Completed), false),
			(Some(VectorizationStatus::Failed), true),
		] {
			file.file_attrs_mut().unwrap().vectorization = status;
			let case = Case::new(&file, &manager)
				.parents(&parents)
				.level(PermissionLevel::RoomManager);
			assert_eq!(case.allows(Action::Vectorization), expected, "{status:?}");
		}
	}

	#[test]
	fn index_export_needs_indexing_room() {
		let admin = user(UserType::DocSpaceAdmin);
		let mut room = room(FolderType::VirtualDataRoom, admin.id);
		assert!(!Case::new(&room, &admin).allows(Action::IndexExport));
		room.folder_attrs_mut().unwrap().indexing = true;
		assert!(Case::new(&room, &admin).allows(Action::IndexExport));
	}

	#[test]
	fn provider_entries_have_no_history() {
		let owner = user(UserType::User);
		let mut file = Entry::file("sbox-1-a", TENANT, RootType::Common, owner.id);
		file.provider_entry = true;
		let case = Case::new(&file, &owner).level(PermissionLevel::Editing);
		assert!(!case.allows(Action::ReadHistory));
		assert!(!case.allows(Action::EditHistory));
	}

	#[test]
	fn encrypted_files_cannot_be_converted() {
		let owner = user(UserType::User);
		let mut file = Entry::file(1, TENANT, RootType::User, owner.id);
		file.encrypted = true;
		let case = Case::new(&file, &owner);
		assert!(!case.allows(Action::Convert));
		assert!(case.allows(Action::Edit));
	}

	#[test]
	fn provider_folder_creator_shortcut() {
		let creator = user(UserType::User);
		let mut folder = Entry::folder(
			"sbox-7",
			TENANT,
			FolderType::Default,
			RootType::Common,
			creator.id,
		)
		.with_parent(9)
		.with_root(9, UserId::generate());
		folder.provider_entry = true;
		let decision = Case::new(&folder, &creator).decide(Action::Rename);
		assert!(decision.allowed);
		assert_eq!(decision.branch, Branch::Ownership);

		let stranger = user(UserType::User);
		assert!(!Case::new(&folder, &stranger).decide(Action::Rename).allowed);
	}

	#[test]
	fn reconnect_is_for_the_provider_room_creator() {
		let creator = user(UserType::RoomAdmin);
		let mut room = room(FolderType::CustomRoom, creator.id);
		assert!(!Case::new(&room, &creator).allows(Action::Reconnect));
		room.provider_entry = true;
		assert!(Case::new(&room, &creator).allows(Action::Reconnect));
		let admin = user(UserType::DocSpaceAdmin);
		assert!(!Case::new(&room, &admin).allows(Action::Reconnect));
	}

	#[test]
	fn create_room_from_personal_content() {
		let owner = user(UserType::RoomAdmin);
		let file = Entry::file(5, TENANT, RootType::User, owner.id)
			.with_parent(1)
			.with_root(1, owner.id);
		assert!(Case::new(&file, &owner).allows(Action::CreateRoomFrom));

		let limited = user(UserType::User);
		let theirs = Entry::file(6, TENANT, RootType::User, limited.id)
			.with_parent(2)
			.with_root(2, limited.id);
		assert!(!Case::new(&theirs, &limited).allows(Action::CreateRoomFrom));

		let common = Entry::file(7, TENANT, RootType::Common, owner.id);
		assert!(!Case::new(&common, &owner).allows(Action::CreateRoomFrom));
	}

	#[test]
	fn embed_needs_shared_previewable_content() {
		let owner = UserId::generate();
		let mut room = room(FolderType::PublicRoom, owner);
		let manager = Principal::new(owner, UserType::RoomAdmin);
		let level = PermissionLevel::RoomManager;
		let case = Case::new(&room, &manager).level(level);
		assert_eq!(case.decide(Action::Embed).branch, Branch::TypeGuard);
		room.shared = true;
		assert!(Case::new(&room, &manager).level(level).allows(Action::Embed));

		let parents = vec![room.clone()];
		let mut file = file_in(&room, owner);
		file.shared = true;
		let case = Case::new(&file, &manager).parents(&parents).level(level);
		assert!(!case.allows(Action::Embed));
		file.file_attrs_mut().unwrap().previewable = true;
		let case = Case::new(&file, &manager).parents(&parents).level(level);
		assert!(case.allows(Action::Embed));
	}

	#[test]
	fn shared_room_is_not_embeddable_without_a_grant() {
		let owner = UserId::generate();
		let mut room = room(FolderType::PublicRoom, owner);
		room.shared = true;
		let stranger = user(UserType::User);

		let case = Case::new(&room, &stranger);
		assert!(!case.allows(Action::Embed));
		assert!(!case.allows(Action::Read));
		assert!(Case::new(&room, &stranger)
			.level(PermissionLevel::Read)
			.allows(Action::Embed));
	}
}
