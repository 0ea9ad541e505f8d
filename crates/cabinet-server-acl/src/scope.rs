// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! State bound to one request.

use std::collections::HashMap;
use std::sync::Arc;

use cabinet_acl_core::{
	AccessControlRecord, Action, Entry, EntryId, EntryType, PermissionLevel, Principal, TenantId,
};
use parking_lot::RwLock;

use crate::cache::EntryCache;
use crate::store::ExternalLinkContext;

type EntryKey = (EntryType, EntryId);

/// The record that governs the principal on an entry, and the level it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccess {
	/// The stored record, or the synthetic default standing in for it. `None`
	/// when the default does not name the principal.
	pub record: Option<AccessControlRecord>,
	pub level: PermissionLevel,
}

/// One caller, one request.
///
/// Holds the loaded principal, the link context of the request, the decision
/// memo and the resolved-access side table. Display resets live in their own
/// table and never feed back into evaluation. The [`EntryCache`] may be shared
/// with child scopes created for other principals within the same operation.
pub struct RequestScope {
	tenant: TenantId,
	principal: Principal,
	links: Arc<dyn ExternalLinkContext>,
	cache: Arc<EntryCache>,
	decisions: RwLock<HashMap<(EntryType, EntryId, Action), bool>>,
	access: RwLock<HashMap<EntryKey, ResolvedAccess>>,
	displayed: RwLock<HashMap<EntryKey, PermissionLevel>>,
}

impl RequestScope {
	pub fn new(tenant: TenantId, principal: Principal, links: Arc<dyn ExternalLinkContext>) -> Self {
		Self {
			tenant,
			principal,
			links,
			cache: Arc::new(EntryCache::new()),
			decisions: RwLock::new(HashMap::new()),
			access: RwLock::new(HashMap::new()),
			displayed: RwLock::new(HashMap::new()),
		}
	}

	/// A scope for another principal sharing this scope's cache and links.
	pub fn child(&self, principal: Principal) -> Self {
		Self {
			tenant: self.tenant,
			principal,
			links: Arc::clone(&self.links),
			cache: Arc::clone(&self.cache),
			decisions: RwLock::new(HashMap::new()),
			access: RwLock::new(HashMap::new()),
			displayed: RwLock::new(HashMap::new()),
		}
	}

	pub fn tenant(&self) -> TenantId {
		self.tenant
	}

	pub fn principal(&self) -> &Principal {
		&self.principal
	}

	pub fn links(&self) -> &dyn ExternalLinkContext {
		self.links.as_ref()
	}

	pub fn cache(&self) -> &EntryCache {
		&self.cache
	}

	pub(crate) fn decision(&self, entry: &Entry, action: Action) -> Option<bool> {
		self.decisions
			.read()
			.get(&(entry.entry_type(), entry.id.clone(), action))
			.copied()
	}

	/// Store a decision; an earlier one for the same key wins.
	pub(crate) fn remember(&self, entry: &Entry, action: Action, allowed: bool) -> bool {
		*self
			.decisions
			.write()
			.entry((entry.entry_type(), entry.id.clone(), action))
			.or_insert(allowed)
	}

	pub(crate) fn resolved(&self, entry: &Entry) -> Option<ResolvedAccess> {
		self.access.read().get(&key(entry)).cloned()
	}

	pub(crate) fn store_resolved(&self, entry: &Entry, resolved: ResolvedAccess) -> ResolvedAccess {
		self.access
			.write()
			.entry(key(entry))
			.or_insert(resolved)
			.clone()
	}

	/// Show the entry as carrying no access. The resolved level used for
	/// decisions is left alone.
	pub(crate) fn reset_access(&self, entry: &Entry) {
		self.displayed
			.write()
			.insert(key(entry), PermissionLevel::None);
	}

	/// The access level to display for an entry in this request.
	pub fn access(&self, entry: &Entry) -> Option<PermissionLevel> {
		if let Some(level) = self.displayed.read().get(&key(entry)) {
			return Some(*level);
		}
		self.access.read().get(&key(entry)).map(|r| r.level)
	}
}

fn key(entry: &Entry) -> EntryKey {
	(entry.entry_type(), entry.id.clone())
}

impl std::fmt::Debug for RequestScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RequestScope")
			.field("tenant", &self.tenant)
			.field("principal", &self.principal.id)
			.field("cache", &self.cache.stats())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use cabinet_acl_core::{LinkId, RootType, UserId, UserType};

	struct NoLinks;

	#[async_trait]
	impl ExternalLinkContext for NoLinks {
		async fn presented_link_id(&self) -> crate::Result<Option<LinkId>> {
			Ok(None)
		}

		async fn recent_link_ids(&self, _tenant: TenantId, _user: UserId) -> crate::Result<Vec<LinkId>> {
			Ok(Vec::new())
		}
	}

	fn scope() -> RequestScope {
		RequestScope::new(
			TenantId(1),
			Principal::new(UserId::generate(), UserType::User),
			Arc::new(NoLinks),
		)
	}

	fn file() -> Entry {
		Entry::file(1, TenantId(1), RootType::Common, UserId::generate())
	}

	#[test]
	fn first_decision_is_kept() {
		let scope = scope();
		let entry = file();
		assert_eq!(scope.decision(&entry, Action::Read), None);
		assert!(scope.remember(&entry, Action::Read, true));
		assert!(scope.remember(&entry, Action::Read, false));
		assert_eq!(scope.decision(&entry, Action::Read), Some(true));
		assert_eq!(scope.decision(&entry, Action::Edit), None);
	}

	#[test]
	fn files_and_folders_do_not_share_keys() {
		let scope = scope();
		let file = file();
		let folder = Entry::folder(
			1,
			TenantId(1),
			cabinet_acl_core::FolderType::Default,
			RootType::Common,
			UserId::generate(),
		);
		scope.remember(&file, Action::Read, true);
		assert_eq!(scope.decision(&folder, Action::Read), None);
	}

	#[test]
	fn reset_only_changes_the_displayed_level() {
		let scope = scope();
		let entry = file();
		scope.store_resolved(
			&entry,
			ResolvedAccess {
				record: None,
				level: PermissionLevel::Read,
			},
		);
		assert_eq!(scope.access(&entry), Some(PermissionLevel::Read));
		scope.reset_access(&entry);
		assert_eq!(scope.access(&entry), Some(PermissionLevel::None));
		assert_eq!(scope.resolved(&entry).unwrap().level, PermissionLevel::Read);
	}

	#[test]
	fn child_shares_cache_not_memo() {
		let parent = scope();
		let entry = file();
		parent.remember(&entry, Action::Read, true);
		parent
			.cache()
			.insert_room_owner("1/1".to_string(), Some(UserId::generate()));

		let child = parent.child(Principal::new(UserId::generate(), UserType::Guest));
		assert_eq!(child.decision(&entry, Action::Read), None);
		assert_eq!(child.cache().stats().room_owners, 1);
		assert_eq!(child.tenant(), parent.tenant());
	}
}
