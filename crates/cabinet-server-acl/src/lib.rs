// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control decisions for Cabinet files, folders and rooms.
//!
//! Given a principal, an entry and an [`Action`], the [`AccessEngine`] answers
//! permit or deny. It resolves the one access-control record that governs the
//! principal (user grants beat group grants beat link grants, nearer grants
//! beat inherited ones), then runs a fixed sequence of guards, per-root rules
//! and the permission-level table over pre-fetched data.
//!
//! Storage, the user directory, link state and the folder tree are
//! collaborators behind the traits in [`store`]. Per-request state lives in a
//! [`RequestScope`]: a decision memo, the resolved access of each entry, and
//! an [`EntryCache`] of inherited state that is never invalidated while the
//! request runs.
//!
//! # Usage
//!
//! ```ignore
//! let engine = AccessEngine::new(records, directory, tree, config.acl);
//! let scope = engine.begin(tenant, Some(user_id), link_context).await?;
//! if engine.can(&scope, &file, Action::Edit).await? {
//!     // ...
//! }
//! let visible = engine.filter(&scope, listing, Action::Read).await?;
//! ```

pub mod bulk;
pub mod cache;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod link;
pub mod resolver;
pub mod scope;
pub mod share;
pub mod store;
pub mod subject;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bulk::WhoCanAct;
pub use cache::{CacheStats, EntryCache};
pub use engine::AccessEngine;
pub use error::{AclError, BoxError, Result, ShareViolation};
pub use evaluator::{evaluate, Branch, Decision, EvalInput};
pub use link::{hash_password, link_status};
pub use resolver::RecordResolver;
pub use scope::{RequestScope, ResolvedAccess};
pub use share::ShareRequest;
pub use store::{AccessRecordStore, DirectoryLookup, ExternalLinkContext, FolderTreeLookup};
pub use subject::resolve_subjects;

pub use cabinet_acl_core::{Action, Entry, LinkStatus, PermissionLevel, Principal};
