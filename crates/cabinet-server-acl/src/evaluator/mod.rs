// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The decision procedure.
//!
//! Evaluation is a pure function of pre-fetched data: the entry, its ancestor
//! chain, the caller and the record resolved for them. Stages run in a fixed
//! order and the first stage that decides wins:
//!
//! 1. anonymous callers without a link, and actions the entry type does not
//!    declare, are denied
//! 2. type guards on entry attributes ([`guards`])
//! 3. ownership shortcuts ([`guards`])
//! 4. system folders ([`system`])
//! 5. the form-filling workflow of data rooms ([`forms`])
//! 6. per-root dispatch ([`roots`])
//! 7. the permission-level table, then the creator fallback ([`table`])

mod forms;
mod guards;
mod roots;
mod system;
mod table;

use cabinet_acl_core::{
	AccessControlRecord, Action, Entry, HookInput, PermissionLevel, Principal, UserId,
};
use tracing::{instrument, warn};

/// Everything one decision looks at.
#[derive(Debug, Clone, Copy)]
pub struct EvalInput<'a> {
	pub entry: &'a Entry,
	pub principal: &'a Principal,
	pub action: Action,
	/// Ancestors of the entry, nearest first.
	pub parents: &'a [Entry],
	pub record: Option<&'a AccessControlRecord>,
	pub level: PermissionLevel,
	/// Creator of the nearest enclosing room.
	pub room_owner: Option<UserId>,
}

impl<'a> EvalInput<'a> {
	pub fn caller(&self) -> UserId {
		self.principal.id
	}

	/// The entry itself when it is a room, else the nearest enclosing room.
	pub fn room(&self) -> Option<&'a Entry> {
		if self.entry.is_room() {
			return Some(self.entry);
		}
		self.parents.iter().find(|p| p.is_room())
	}

	pub(crate) fn hook_input(&self) -> HookInput<'a> {
		HookInput {
			entry: self.entry,
			caller: self.principal.id,
			level: self.level,
			record: self.record,
			room: self.room(),
		}
	}
}

/// The stage that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
	Anonymous,
	UndeclaredAction,
	TypeGuard,
	Ownership,
	SystemFolder,
	FormWorkflow,
	RootDispatch,
	PermissionTable,
	Fallback,
}

impl Branch {
	pub fn as_str(&self) -> &'static str {
		match self {
			Branch::Anonymous => "anonymous",
			Branch::UndeclaredAction => "undeclared_action",
			Branch::TypeGuard => "type_guard",
			Branch::Ownership => "ownership",
			Branch::SystemFolder => "system_folder",
			Branch::FormWorkflow => "form_workflow",
			Branch::RootDispatch => "root_dispatch",
			Branch::PermissionTable => "permission_table",
			Branch::Fallback => "fallback",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
	pub allowed: bool,
	pub branch: Branch,
	/// The caller's displayed access on the entry must be cleared.
	pub reset_access: bool,
}

impl Decision {
	fn new(allowed: bool, branch: Branch) -> Self {
		Self {
			allowed,
			branch,
			reset_access: false,
		}
	}
}

type Stage = fn(&EvalInput<'_>) -> Option<bool>;

const STAGES: &[(Branch, Stage)] = &[
	(Branch::TypeGuard, guards::type_guard),
	(Branch::Ownership, guards::ownership),
	(Branch::SystemFolder, system::system_folder),
	(Branch::FormWorkflow, forms::form_workflow),
	(Branch::RootDispatch, roots::root_dispatch),
	(Branch::PermissionTable, table::permission_table),
];

#[instrument(
	level = "trace",
	skip(input),
	fields(entry_id = %input.entry.id, action = %input.action, level = %input.level)
)]
pub fn evaluate(input: &EvalInput<'_>) -> Decision {
	let principal = input.principal;
	if !principal.authenticated && principal.link.is_none() {
		return Decision::new(false, Branch::Anonymous);
	}

	if !input.action.is_available_for(input.entry.entry_type()) {
		warn!(
			action = %input.action,
			entry_type = %input.entry.entry_type(),
			"action is not declared for entry type"
		);
		return Decision::new(false, Branch::UndeclaredAction);
	}

	for (branch, stage) in STAGES {
		if let Some(allowed) = stage(input) {
			return Decision::new(allowed, *branch);
		}
	}

	table::fallback(input)
}
