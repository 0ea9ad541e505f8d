// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier types.
//!
//! - **Principal ids**: [`UserId`], [`GroupId`], [`LinkId`] wrap UUIDs so a group id
//!   can never be passed where a user id is expected.
//! - **[`SubjectId`]**: the untyped id stored on an access-control record. Every
//!   principal id converts into it; the record's `SubjectType` says what it is.
//! - **[`EntryId`]**: files and folders are keyed either by integer (native
//!   storage) or by string (third-party providers), so it is a sum type rather
//!   than a generic parameter.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// UUID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub const fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(GroupId, "Unique identifier for a group.");
define_id_type!(LinkId, "Unique identifier for an external or invitation link.");
define_id_type!(
	SubjectId,
	"Identifier of the subject a grant is made to (user, group or link)."
);

impl From<UserId> for SubjectId {
	fn from(id: UserId) -> Self {
		SubjectId(id.0)
	}
}

impl From<GroupId> for SubjectId {
	fn from(id: GroupId) -> Self {
		SubjectId(id.0)
	}
}

impl From<LinkId> for SubjectId {
	fn from(id: LinkId) -> Self {
		SubjectId(id.0)
	}
}

impl SubjectId {
	/// Reinterpret as a user id (caller knows the record's subject type).
	pub fn as_user(self) -> UserId {
		UserId(self.0)
	}

	/// Reinterpret as a group id.
	pub fn as_group(self) -> GroupId {
		GroupId(self.0)
	}

	/// Reinterpret as a link id.
	pub fn as_link(self) -> LinkId {
		LinkId(self.0)
	}
}

/// Tenant (portal) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub u32);

impl fmt::Display for TenantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

// =============================================================================
// Entry Ids
// =============================================================================

/// Identifier of a file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
	Int(i64),
	Str(String),
}

impl EntryId {
	/// Returns true for the zero/empty id used by storage layers as "no entry".
	pub fn is_unset(&self) -> bool {
		match self {
			EntryId::Int(v) => *v == 0,
			EntryId::Str(s) => s.is_empty(),
		}
	}
}

impl fmt::Display for EntryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryId::Int(v) => write!(f, "{v}"),
			EntryId::Str(s) => f.write_str(s),
		}
	}
}

impl From<i64> for EntryId {
	fn from(v: i64) -> Self {
		EntryId::Int(v)
	}
}

impl From<i32> for EntryId {
	fn from(v: i32) -> Self {
		EntryId::Int(i64::from(v))
	}
}

impl From<&str> for EntryId {
	fn from(v: &str) -> Self {
		EntryId::Str(v.to_string())
	}
}

impl From<String> for EntryId {
	fn from(v: String) -> Self {
		EntryId::Str(v)
	}
}

// =============================================================================
// Well-known ids
// =============================================================================

/// The "everyone" group every principal belongs to.
pub const EVERYONE_GROUP: GroupId =
	GroupId::new(Uuid::from_u128(0xc5cc67d1_c3e8_43c0_a3ad_3928ae3e5b5e));

/// The tenant administrators group.
pub const ADMIN_GROUP: GroupId =
	GroupId::new(Uuid::from_u128(0xcd84e66b_b803_40fc_99f9_b2969a54a1de));

/// The user id an unauthenticated link holder is evaluated as.
pub const ANONYMOUS_USER: UserId =
	UserId::new(Uuid::from_u128(0x712d9ec3_5d2b_4b13_824f_71f00191dcca));

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn subject_id_round_trips_principal_ids() {
		let user = UserId::generate();
		let group = GroupId::generate();
		let link = LinkId::generate();

		assert_eq!(SubjectId::from(user).as_user(), user);
		assert_eq!(SubjectId::from(group).as_group(), group);
		assert_eq!(SubjectId::from(link).as_link(), link);
	}

	#[test]
	fn entry_id_display() {
		assert_eq!(EntryId::Int(42).to_string(), "42");
		assert_eq!(EntryId::from("sbox-7-abc").to_string(), "sbox-7-abc");
	}

	#[test]
	fn entry_id_unset() {
		assert!(EntryId::Int(0).is_unset());
		assert!(EntryId::from("").is_unset());
		assert!(!EntryId::Int(3).is_unset());
	}

	#[test]
	fn entry_id_serializes_untagged() {
		assert_eq!(serde_json::to_string(&EntryId::Int(5)).unwrap(), "5");
		assert_eq!(
			serde_json::to_string(&EntryId::from("box-1")).unwrap(),
			"\"box-1\""
		);
		let parsed: EntryId = serde_json::from_str("17").unwrap();
		assert_eq!(parsed, EntryId::Int(17));
	}

	#[test]
	fn well_known_ids_are_distinct() {
		assert_ne!(EVERYONE_GROUP, ADMIN_GROUP);
		assert_ne!(SubjectId::from(EVERYONE_GROUP), SubjectId::from(ANONYMOUS_USER));
	}
}
