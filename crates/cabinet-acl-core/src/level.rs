// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission levels and the two share orders used to rank them.
//!
//! The enumeration itself has no meaningful order. Ranking is contextual:
//! [`ShareContext::Room`] ranks `RoomManager` highest, [`ShareContext::File`]
//! ranks `Editing` highest. `Restrict` is last in both.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;
use crate::folder::RootType;

/// A permission level carried by an access-control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
	None,
	ReadWrite,
	Read,
	Restrict,
	Varies,
	Review,
	Comment,
	FillForms,
	CustomFilter,
	RoomManager,
	Editing,
	ContentCreator,
}

impl PermissionLevel {
	/// Returns all permission levels in declaration order.
	pub fn all() -> &'static [PermissionLevel] {
		&[
			PermissionLevel::None,
			PermissionLevel::ReadWrite,
			PermissionLevel::Read,
			PermissionLevel::Restrict,
			PermissionLevel::Varies,
			PermissionLevel::Review,
			PermissionLevel::Comment,
			PermissionLevel::FillForms,
			PermissionLevel::CustomFilter,
			PermissionLevel::RoomManager,
			PermissionLevel::Editing,
			PermissionLevel::ContentCreator,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			PermissionLevel::None => "none",
			PermissionLevel::ReadWrite => "read_write",
			PermissionLevel::Read => "read",
			PermissionLevel::Restrict => "restrict",
			PermissionLevel::Varies => "varies",
			PermissionLevel::Review => "review",
			PermissionLevel::Comment => "comment",
			PermissionLevel::FillForms => "fill_forms",
			PermissionLevel::CustomFilter => "custom_filter",
			PermissionLevel::RoomManager => "room_manager",
			PermissionLevel::Editing => "editing",
			PermissionLevel::ContentCreator => "content_creator",
		}
	}

	fn bit(self) -> u16 {
		1 << (self as u16)
	}

	/// Room-scoped management levels.
	pub fn is_room_admin(&self) -> bool {
		matches!(
			self,
			PermissionLevel::RoomManager | PermissionLevel::ContentCreator
		)
	}
}

impl fmt::Display for PermissionLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for PermissionLevel {
	type Err = ParseError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PermissionLevel::all()
			.iter()
			.copied()
			.find(|l| l.as_str() == s)
			.ok_or_else(|| ParseError::unknown("permission level", s))
	}
}

// =============================================================================
// Share orders
// =============================================================================

/// Which total order (and which action table) applies to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareContext {
	/// Rooms and the trees that hold them.
	Room,
	/// Personal documents and every other plain-file tree.
	File,
}

const ROOM_ORDER: [PermissionLevel; 12] = [
	PermissionLevel::RoomManager,
	PermissionLevel::ContentCreator,
	PermissionLevel::Editing,
	PermissionLevel::ReadWrite,
	PermissionLevel::CustomFilter,
	PermissionLevel::Review,
	PermissionLevel::Comment,
	PermissionLevel::FillForms,
	PermissionLevel::Read,
	PermissionLevel::Varies,
	PermissionLevel::None,
	PermissionLevel::Restrict,
];

const FILE_ORDER: [PermissionLevel; 12] = [
	PermissionLevel::Editing,
	PermissionLevel::RoomManager,
	PermissionLevel::ContentCreator,
	PermissionLevel::ReadWrite,
	PermissionLevel::CustomFilter,
	PermissionLevel::Review,
	PermissionLevel::Comment,
	PermissionLevel::FillForms,
	PermissionLevel::Read,
	PermissionLevel::Varies,
	PermissionLevel::None,
	PermissionLevel::Restrict,
];

impl ShareContext {
	/// The share context for entries under the given root.
	pub fn for_root(root: RootType) -> Self {
		match root {
			RootType::VirtualRooms
			| RootType::Archive
			| RootType::RoomTemplates
			| RootType::AiAgents
			| RootType::ThirdpartyBackup => ShareContext::Room,
			RootType::Default
			| RootType::Common
			| RootType::User
			| RootType::Share
			| RootType::Trash
			| RootType::Privacy => ShareContext::File,
		}
	}

	/// Levels from most to least senior.
	pub fn order(&self) -> &'static [PermissionLevel; 12] {
		match self {
			ShareContext::Room => &ROOM_ORDER,
			ShareContext::File => &FILE_ORDER,
		}
	}

	/// Seniority of a level; higher is more senior.
	pub fn rank(&self, level: PermissionLevel) -> u8 {
		let order = self.order();
		let pos = order.iter().position(|l| *l == level).unwrap_or(order.len() - 1);
		(order.len() - pos) as u8
	}

	/// Returns true if `a` outranks `b`.
	pub fn outranks(&self, a: PermissionLevel, b: PermissionLevel) -> bool {
		self.rank(a) > self.rank(b)
	}
}

// =============================================================================
// Level sets
// =============================================================================

/// A compact set of permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LevelSet(u16);

impl LevelSet {
	pub const fn empty() -> Self {
		LevelSet(0)
	}

	pub fn of(levels: &[PermissionLevel]) -> Self {
		LevelSet(levels.iter().fold(0, |acc, l| acc | l.bit()))
	}

	/// Every level ranked at or above `floor` in the given context.
	pub fn at_least(context: ShareContext, floor: PermissionLevel) -> Self {
		let floor_rank = context.rank(floor);
		Self::of(
			&context
				.order()
				.iter()
				.copied()
				.filter(|l| context.rank(*l) >= floor_rank)
				.collect::<Vec<_>>(),
		)
	}

	pub fn contains(&self, level: PermissionLevel) -> bool {
		self.0 & level.bit() != 0
	}

	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	pub fn iter(&self) -> impl Iterator<Item = PermissionLevel> + '_ {
		PermissionLevel::all()
			.iter()
			.copied()
			.filter(move |l| self.contains(*l))
	}

	/// True when every level outranking a member is also a member.
	pub fn is_upper_set(&self, context: ShareContext) -> bool {
		self.iter().all(|member| {
			context
				.order()
				.iter()
				.filter(|l| context.outranks(**l, member))
				.all(|l| self.contains(*l))
		})
	}
}
