// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Folders the system maintains on the user's behalf.

use cabinet_acl_core::{Action, FolderType};

use super::EvalInput;

/// Structure of AI knowledge folders is fixed.
const KNOWLEDGE_DENIED: &[Action] = &[
	Action::Delete,
	Action::Move,
	Action::Rename,
	Action::Copy,
	Action::Duplicate,
	Action::EditAccess,
	Action::EditRoom,
	Action::ChangeOwner,
	Action::Pin,
	Action::Mute,
	Action::CreateRoomFrom,
];

/// Form workflow folders are filled by the workflow only.
const WORKFLOW_DENIED: &[Action] = &[
	Action::Create,
	Action::CreateFrom,
	Action::Delete,
	Action::Move,
	Action::MoveTo,
	Action::CopyTo,
	Action::Rename,
	Action::Duplicate,
	Action::EditAccess,
	Action::CreateRoomFrom,
];

pub(super) fn system_folder(input: &EvalInput<'_>) -> Option<bool> {
	let folder_type = input.entry.folder_type()?;
	let action = input.action;

	match folder_type {
		FolderType::Recent | FolderType::Favorites | FolderType::Share => {
			Some(action == Action::Read)
		}
		FolderType::Knowledge => KNOWLEDGE_DENIED.contains(&action).then_some(false),
		FolderType::ResultStorage => (KNOWLEDGE_DENIED.contains(&action)
			|| matches!(action, Action::Create | Action::CreateFrom))
		.then_some(false),
		t if t.is_form_workflow_folder() => {
			if input.principal.is_guest() || WORKFLOW_DENIED.contains(&action) {
				Some(false)
			} else {
				None
			}
		}
		_ => None,
	}
}
