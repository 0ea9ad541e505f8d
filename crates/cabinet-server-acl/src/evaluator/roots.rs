// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rules that depend on which tree an entry lives in.

use cabinet_acl_core::{Action, RootType};

use super::EvalInput;

/// The only actions reachable inside the trash, whoever asks.
const TRASH_ALLOWED: &[Action] = &[Action::Read, Action::Delete, Action::Move];

/// What an archived room still allows.
const ARCHIVE_ALLOWED: &[Action] = &[
	Action::Read,
	Action::ReadHistory,
	Action::Download,
	Action::Copy,
	Action::Delete,
	Action::Move,
	Action::CopyLink,
	Action::CopySharedLink,
	Action::ReadLinks,
	Action::OpenForm,
];

/// Actions that only make sense inside rooms.
const ROOM_ONLY: &[Action] = &[
	Action::EditRoom,
	Action::Pin,
	Action::Mute,
	Action::ChangeOwner,
	Action::IndexExport,
	Action::EditExpiration,
	Action::Vectorization,
	Action::UseChat,
];

pub(super) fn root_dispatch(input: &EvalInput<'_>) -> Option<bool> {
	let entry = input.entry;
	let principal = input.principal;
	let action = input.action;
	let caller = input.caller();

	match entry.root_type {
		RootType::Default | RootType::Common => principal.is_admin().then_some(true),
		RootType::Trash => {
			if !TRASH_ALLOWED.contains(&action) {
				return Some(false);
			}
			Some(entry.root_create_by == caller)
		}
		RootType::User => {
			if entry.root_create_by == caller {
				if principal.is_guest() {
					return Some(matches!(action, Action::Read | Action::Download));
				}
				return Some(!ROOM_ONLY.contains(&action));
			}
			if principal.outsider && principal.link.is_none() {
				return Some(false);
			}
			None
		}
		RootType::Privacy => (entry.root_create_by == caller).then_some(true),
		RootType::VirtualRooms | RootType::AiAgents => {
			if is_room_container(input) {
				return Some(container_action(input));
			}
			principal.is_admin().then(|| admin_bypass(input))
		}
		RootType::Archive => {
			if !ARCHIVE_ALLOWED.contains(&action) {
				return Some(false);
			}
			if is_room_container(input) {
				return Some(action == Action::Read);
			}
			principal.is_admin().then(|| admin_bypass(input))
		}
		RootType::RoomTemplates => {
			if is_room_container(input) {
				return Some(container_action(input));
			}
			principal.is_admin().then(|| admin_bypass(input))
		}
		RootType::ThirdpartyBackup => Some(principal.is_admin()),
		RootType::Share => None,
	}
}

fn is_room_container(input: &EvalInput<'_>) -> bool {
	input
		.entry
		.folder_type()
		.is_some_and(|t| t.is_room_container())
}

/// The synthetic folder listing rooms.
fn container_action(input: &EvalInput<'_>) -> bool {
	match input.action {
		Action::Read => true,
		Action::Create => input.principal.can_create_rooms(),
		_ => false,
	}
}

/// Administrators may do anything in a room except take content out of a room
/// that forbids downloading.
fn admin_bypass(input: &EvalInput<'_>) -> bool {
	match input.action {
		Action::Download | Action::Copy | Action::Duplicate => !input
			.room()
			.and_then(|r| r.folder_attrs())
			.is_some_and(|f| f.deny_download),
		_ => true,
	}
}
