// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Form filling inside virtual data rooms.
//!
//! A form runs through numbered steps. `current_step` is
//! [`FormFilling::NOT_STARTED`] while the form is a draft, positive while
//! participants fill it in sequence, and [`FormFilling::COMPLETED`] once done.
//! Each participant role has a sequence number; the role whose sequence equals
//! the current step is the one allowed to fill.

use cabinet_acl_core::{Action, FolderType, FormFilling, PermissionLevel};

use super::EvalInput;

pub(super) fn form_workflow(input: &EvalInput<'_>) -> Option<bool> {
	let action = input.action;
	if !matches!(
		action,
		Action::StartFilling
			| Action::StopFilling
			| Action::ResetFilling
			| Action::FillingStatus
			| Action::FillForms
			| Action::Edit
			| Action::OpenForm
	) {
		return None;
	}

	let in_data_room = input
		.room()
		.and_then(|r| r.folder_type())
		.is_some_and(|t| t == FolderType::VirtualDataRoom);
	let file = match input.entry.file_attrs() {
		Some(file) if in_data_room && input.entry.is_form() => file,
		_ => return action.is_filling_workflow().then_some(false),
	};

	let caller = input.caller();
	let full = has_full_access(input);
	let member = full || !matches!(input.level, PermissionLevel::None | PermissionLevel::Restrict);

	let draft = FormFilling::default();
	let filling = file.filling.as_ref().unwrap_or(&draft);
	let step = filling.current_step;
	let stopped = filling.stopped;
	let has_role = filling.roles_of(caller).next().is_some();

	let allowed = match action {
		Action::ResetFilling => full && (stopped || step == FormFilling::COMPLETED),
		Action::StopFilling => full && step > 0 && !stopped,
		Action::StartFilling => {
			full && step == FormFilling::NOT_STARTED && file.is_form && !file.is_completed_form
		}
		Action::FillForms => {
			!stopped
				&& step > 0
				&& filling
					.roles_of(caller)
					.any(|r| !r.submitted && r.sequence == step)
		}
		Action::Edit => step == FormFilling::NOT_STARTED && full,
		Action::FillingStatus => step != FormFilling::NOT_STARTED && (full || has_role),
		Action::OpenForm => {
			full
				|| filling
					.roles_of(caller)
					.any(|r| r.submitted || r.sequence <= step)
				|| (step == FormFilling::COMPLETED && has_role)
		}
		_ => return None,
	};

	Some(allowed && member)
}

/// Administrators, the room owner and room managers run the workflow.
fn has_full_access(input: &EvalInput<'_>) -> bool {
	input.principal.is_admin()
		|| input.room_owner == Some(input.caller())
		|| input.level.is_room_admin()
}
