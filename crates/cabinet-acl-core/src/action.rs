// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actions that can be requested on files and folders.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// File or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
	File,
	Folder,
}

impl fmt::Display for EntryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryType::File => write!(f, "file"),
			EntryType::Folder => write!(f, "folder"),
		}
	}
}

/// Operations a principal can request on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Read,
	Comment,
	FillForms,
	Review,
	Create,
	CreateFrom,
	Edit,
	Delete,
	CustomFilter,
	EditRoom,
	Rename,
	ReadHistory,
	Lock,
	EditHistory,
	CopyTo,
	Copy,
	MoveTo,
	Move,
	Pin,
	Mute,
	EditAccess,
	Duplicate,
	SubmitToFormGallery,
	Download,
	Convert,
	CopySharedLink,
	ReadLinks,
	Reconnect,
	CreateRoomFrom,
	CopyLink,
	Embed,
	ChangeOwner,
	IndexExport,
	StartFilling,
	FillingStatus,
	ResetFilling,
	StopFilling,
	OpenForm,
	EditInternal,
	EditExpiration,
	Vectorization,
	AscAi,
	UseChat,
}

const FILE_ACTIONS: &[Action] = &[
	Action::Read,
	Action::Comment,
	Action::FillForms,
	Action::Review,
	Action::Edit,
	Action::Delete,
	Action::CustomFilter,
	Action::Rename,
	Action::ReadHistory,
	Action::Lock,
	Action::EditHistory,
	Action::Copy,
	Action::Move,
	Action::Duplicate,
	Action::SubmitToFormGallery,
	Action::Download,
	Action::Convert,
	Action::CopySharedLink,
	Action::ReadLinks,
	Action::EditAccess,
	Action::CreateRoomFrom,
	Action::CopyLink,
	Action::Embed,
	Action::StartFilling,
	Action::FillingStatus,
	Action::ResetFilling,
	Action::StopFilling,
	Action::OpenForm,
	Action::EditInternal,
	Action::EditExpiration,
	Action::Vectorization,
	Action::AscAi,
];

const FOLDER_ACTIONS: &[Action] = &[
	Action::Read,
	Action::Create,
	Action::CreateFrom,
	Action::Delete,
	Action::EditRoom,
	Action::Rename,
	Action::ReadHistory,
	Action::CopyTo,
	Action::Copy,
	Action::MoveTo,
	Action::Move,
	Action::Pin,
	Action::Mute,
	Action::EditAccess,
	Action::Duplicate,
	Action::Download,
	Action::CopySharedLink,
	Action::ReadLinks,
	Action::Reconnect,
	Action::CreateRoomFrom,
	Action::CopyLink,
	Action::Embed,
	Action::ChangeOwner,
	Action::IndexExport,
	Action::EditExpiration,
	Action::UseChat,
];

impl Action {
	pub fn all() -> &'static [Action] {
		&[
			Action::Read,
			Action::Comment,
			Action::FillForms,
			Action::Review,
			Action::Create,
			Action::CreateFrom,
			Action::Edit,
			Action::Delete,
			Action::CustomFilter,
			Action::EditRoom,
			Action::Rename,
			Action::ReadHistory,
			Action::Lock,
			Action::EditHistory,
			Action::CopyTo,
			Action::Copy,
			Action::MoveTo,
			Action::Move,
			Action::Pin,
			Action::Mute,
			Action::EditAccess,
			Action::Duplicate,
			Action::SubmitToFormGallery,
			Action::Download,
			Action::Convert,
			Action::CopySharedLink,
			Action::ReadLinks,
			Action::Reconnect,
			Action::CreateRoomFrom,
			Action::CopyLink,
			Action::Embed,
			Action::ChangeOwner,
			Action::IndexExport,
			Action::StartFilling,
			Action::FillingStatus,
			Action::ResetFilling,
			Action::StopFilling,
			Action::OpenForm,
			Action::EditInternal,
			Action::EditExpiration,
			Action::Vectorization,
			Action::AscAi,
			Action::UseChat,
		]
	}

	/// Actions meaningful for the given entry type. Anything else always denies.
	pub fn available_for(entry_type: EntryType) -> &'static [Action] {
		match entry_type {
			EntryType::File => FILE_ACTIONS,
			EntryType::Folder => FOLDER_ACTIONS,
		}
	}

	pub fn is_available_for(&self, entry_type: EntryType) -> bool {
		Self::available_for(entry_type).contains(self)
	}

	/// Version-history actions.
	pub fn is_history(&self) -> bool {
		matches!(self, Action::ReadHistory | Action::EditHistory)
	}

	/// Actions that only make sense on a form inside a filling workflow.
	pub fn is_filling_workflow(&self) -> bool {
		matches!(
			self,
			Action::StartFilling | Action::StopFilling | Action::ResetFilling | Action::FillingStatus
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Action::Read => "read",
			Action::Comment => "comment",
			Action::FillForms => "fill_forms",
			Action::Review => "review",
			Action::Create => "create",
			Action::CreateFrom => "create_from",
			Action::Edit => "edit",
			Action::Delete => "delete",
			Action::CustomFilter => "custom_filter",
			Action::EditRoom => "edit_room",
			Action::Rename => "rename",
			Action::ReadHistory => "read_history",
			Action::Lock => "lock",
			Action::EditHistory => "edit_history",
			Action::CopyTo => "copy_to",
			Action::Copy => "copy",
			Action::MoveTo => "move_to",
			Action::Move => "move",
			Action::Pin => "pin",
			Action::Mute => "mute",
			Action::EditAccess => "edit_access",
			Action::Duplicate => "duplicate",
			Action::SubmitToFormGallery => "submit_to_form_gallery",
			Action::Download => "download",
			Action::Convert => "convert",
			Action::CopySharedLink => "copy_shared_link",
			Action::ReadLinks => "read_links",
			Action::Reconnect => "reconnect",
			Action::CreateRoomFrom => "create_room_from",
			Action::CopyLink => "copy_link",
			Action::Embed => "embed",
			Action::ChangeOwner => "change_owner",
			Action::IndexExport => "index_export",
			Action::StartFilling => "start_filling",
			Action::FillingStatus => "filling_status",
			Action::ResetFilling => "reset_filling",
			Action::StopFilling => "stop_filling",
			Action::OpenForm => "open_form",
			Action::EditInternal => "edit_internal",
			Action::EditExpiration => "edit_expiration",
			Action::Vectorization => "vectorization",
			Action::AscAi => "asc_ai",
			Action::UseChat => "use_chat",
		}
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Action {
	type Err = ParseError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::all()
			.iter()
			.copied()
			.find(|a| a.as_str() == s)
			.ok_or_else(|| ParseError::unknown("action", s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_action_is_declared_somewhere() {
		for action in Action::all() {
			assert!(
				action.is_available_for(EntryType::File) || action.is_available_for(EntryType::Folder),
				"{action} is declared for neither files nor folders"
			);
		}
	}

	#[test]
	fn type_specific_actions() {
		assert!(Action::FillForms.is_available_for(EntryType::File));
		assert!(!Action::FillForms.is_available_for(EntryType::Folder));
		assert!(Action::Create.is_available_for(EntryType::Folder));
		assert!(!Action::Create.is_available_for(EntryType::File));
		assert!(Action::Reconnect.is_available_for(EntryType::Folder));
		assert!(!Action::Lock.is_available_for(EntryType::Folder));
	}

	#[test]
	fn declared_sets_have_no_duplicates() {
		for entry_type in [EntryType::File, EntryType::Folder] {
			let actions = Action::available_for(entry_type);
			for (i, a) in actions.iter().enumerate() {
				assert!(!actions[i + 1..].contains(a), "duplicate {a}");
			}
		}
	}

	#[test]
	fn action_parse_round_trip() {
		for action in Action::all() {
			assert_eq!(action.as_str().parse::<Action>().unwrap(), *action);
		}
		assert!("share".parse::<Action>().is_err());
	}
}
