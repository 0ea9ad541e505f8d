// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic level check and the creator fallback.

use cabinet_acl_core::{ActionTable, PermissionLevel, RootType, ShareContext};

use super::{Branch, Decision, EvalInput};

/// Permits when the resolved level satisfies the action's rule. A failed check
/// is not final; the fallback still runs.
pub(super) fn permission_table(input: &EvalInput<'_>) -> Option<bool> {
	let table = ActionTable::for_context(ShareContext::for_root(input.entry.root_type));
	table
		.permits(input.action, &input.hook_input())
		.then_some(true)
}

/// Creators keep access to their own entries outside room trees unless a
/// `Restrict` grant says otherwise.
pub(super) fn fallback(input: &EvalInput<'_>) -> Decision {
	let creator = input.entry.create_by == input.caller();
	let room_tree = matches!(
		input.entry.root_type,
		RootType::Archive | RootType::RoomTemplates | RootType::VirtualRooms
	);
	let allowed = creator && input.level != PermissionLevel::Restrict && !room_tree;

	Decision {
		allowed,
		branch: Branch::Fallback,
		reset_access: !allowed && creator,
	}
}
