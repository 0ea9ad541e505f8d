// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tree and folder classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// The tree an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootType {
	Default,
	/// Shared "common documents".
	Common,
	/// Personal "my documents".
	User,
	/// "Shared with me" virtual tree.
	Share,
	Trash,
	Privacy,
	VirtualRooms,
	Archive,
	RoomTemplates,
	ThirdpartyBackup,
	AiAgents,
}

impl RootType {
	pub fn all() -> &'static [RootType] {
		&[
			RootType::Default,
			RootType::Common,
			RootType::User,
			RootType::Share,
			RootType::Trash,
			RootType::Privacy,
			RootType::VirtualRooms,
			RootType::Archive,
			RootType::RoomTemplates,
			RootType::ThirdpartyBackup,
			RootType::AiAgents,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RootType::Default => "default",
			RootType::Common => "common",
			RootType::User => "user",
			RootType::Share => "share",
			RootType::Trash => "trash",
			RootType::Privacy => "privacy",
			RootType::VirtualRooms => "virtual_rooms",
			RootType::Archive => "archive",
			RootType::RoomTemplates => "room_templates",
			RootType::ThirdpartyBackup => "thirdparty_backup",
			RootType::AiAgents => "ai_agents",
		}
	}

	/// Trees whose entries are rooms or live inside rooms.
	pub fn holds_rooms(&self) -> bool {
		matches!(
			self,
			RootType::VirtualRooms | RootType::Archive | RootType::RoomTemplates | RootType::AiAgents
		)
	}
}

impl fmt::Display for RootType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for RootType {
	type Err = ParseError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RootType::all()
			.iter()
			.copied()
			.find(|r| r.as_str() == s)
			.ok_or_else(|| ParseError::unknown("root type", s))
	}
}

/// Finer classification of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
	/// A plain folder.
	Default,

	// Rooms
	CustomRoom,
	PublicRoom,
	EditingRoom,
	VirtualDataRoom,
	FillingFormsRoom,
	AiRoom,

	// Tree roots
	Common,
	User,
	Share,
	Trash,
	Privacy,
	VirtualRooms,
	Archive,
	RoomTemplates,
	ThirdpartyBackup,
	AiAgents,

	// System folders
	Recent,
	Favorites,
	Knowledge,
	ResultStorage,
	InProcessFormFolder,
	ReadyFormFolder,
	FormFillingFolderInProgress,
	FormFillingFolderDone,
}

impl FolderType {
	pub fn as_str(&self) -> &'static str {
		match self {
			FolderType::Default => "default",
			FolderType::CustomRoom => "custom_room",
			FolderType::PublicRoom => "public_room",
			FolderType::EditingRoom => "editing_room",
			FolderType::VirtualDataRoom => "virtual_data_room",
			FolderType::FillingFormsRoom => "filling_forms_room",
			FolderType::AiRoom => "ai_room",
			FolderType::Common => "common",
			FolderType::User => "user",
			FolderType::Share => "share",
			FolderType::Trash => "trash",
			FolderType::Privacy => "privacy",
			FolderType::VirtualRooms => "virtual_rooms",
			FolderType::Archive => "archive",
			FolderType::RoomTemplates => "room_templates",
			FolderType::ThirdpartyBackup => "thirdparty_backup",
			FolderType::AiAgents => "ai_agents",
			FolderType::Recent => "recent",
			FolderType::Favorites => "favorites",
			FolderType::Knowledge => "knowledge",
			FolderType::ResultStorage => "result_storage",
			FolderType::InProcessFormFolder => "in_process_form_folder",
			FolderType::ReadyFormFolder => "ready_form_folder",
			FolderType::FormFillingFolderInProgress => "form_filling_folder_in_progress",
			FolderType::FormFillingFolderDone => "form_filling_folder_done",
		}
	}

	/// Every room subtype.
	pub fn rooms() -> &'static [FolderType] {
		&[
			FolderType::CustomRoom,
			FolderType::PublicRoom,
			FolderType::EditingRoom,
			FolderType::VirtualDataRoom,
			FolderType::FillingFormsRoom,
			FolderType::AiRoom,
		]
	}

	pub fn is_room(&self) -> bool {
		Self::rooms().contains(self)
	}

	/// Synthetic containers that hold rooms but are not rooms themselves.
	pub fn is_room_container(&self) -> bool {
		matches!(
			self,
			FolderType::VirtualRooms
				| FolderType::Archive
				| FolderType::RoomTemplates
				| FolderType::AiAgents
		)
	}

	/// Folders generated by a form-filling workflow.
	pub fn is_form_workflow_folder(&self) -> bool {
		matches!(
			self,
			FolderType::InProcessFormFolder
				| FolderType::ReadyFormFolder
				| FolderType::FormFillingFolderInProgress
				| FolderType::FormFillingFolderDone
		)
	}
}

impl fmt::Display for FolderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
