// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Cabinet file and room access control.
//!
//! This crate holds the pure data model shared by the decision engine
//! (`cabinet-server-acl`) and anything that grants access: identifiers,
//! entries and principals, permission levels with their two share orders,
//! access-control records, and the frozen policy tables. Nothing here performs
//! I/O.
//!
//! # Overview
//!
//! - [`PermissionLevel`] has no intrinsic order; [`ShareContext`] ranks it
//!   either room-style (`RoomManager` first) or file-style (`Editing` first)
//! - [`ActionTable`] maps each [`Action`] to the levels that satisfy it plus a
//!   few side conditions
//! - [`tables`] holds the grantable levels and link limits per container
//!
//! # Example
//!
//! ```
//! use cabinet_acl_core::{Action, PermissionLevel, ShareContext, ActionTable};
//!
//! let table = ActionTable::for_context(ShareContext::Room);
//! assert!(table.rule(Action::EditRoom).levels.contains(PermissionLevel::RoomManager));
//! assert!(!table.rule(Action::EditRoom).levels.contains(PermissionLevel::Editing));
//! ```

pub mod action;
pub mod entry;
pub mod error;
pub mod folder;
pub mod ids;
pub mod level;
pub mod record;
pub mod rules;
pub mod subject;
pub mod tables;

pub use action::{Action, EntryType};
pub use entry::{
	Entry, EntryKind, FileAttrs, FolderAttrs, FormFilling, FormRole, Principal, UserType,
	VectorizationStatus,
};
pub use error::ParseError;
pub use folder::{FolderType, RootType};
pub use ids::{
	EntryId, GroupId, LinkId, SubjectId, TenantId, UserId, ADMIN_GROUP, ANONYMOUS_USER,
	EVERYONE_GROUP,
};
pub use level::{LevelSet, PermissionLevel, ShareContext};
pub use record::{AccessControlRecord, LinkStatus, RecordOptions, DEFAULT_RECORD_LEVEL};
pub use rules::{ActionRule, ActionTable, Hook, HookInput};
pub use subject::{Subject, SubjectClass, SubjectType};
