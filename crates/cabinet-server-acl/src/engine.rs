// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The access engine: collaborators in, decisions out.

use std::collections::BTreeMap;
use std::sync::Arc;

use cabinet_acl_core::{
	tables, AccessControlRecord, Action, Entry, LinkId, PermissionLevel, Principal, RootType,
	ShareContext, SubjectType, TenantId, UserId, UserType, ANONYMOUS_USER, EVERYONE_GROUP,
};
use cabinet_server_config::AclConfig;
use tracing::{debug, instrument, trace, warn};

use crate::cache::{entry_key, record_key};
use crate::error::{AclError, Result};
use crate::evaluator::{evaluate, Decision, EvalInput};
use crate::resolver::{has_no_records, uses_link_history, RecordResolver};
use crate::scope::{RequestScope, ResolvedAccess};
use crate::store::{AccessRecordStore, DirectoryLookup, ExternalLinkContext, FolderTreeLookup};
use crate::subject::{resolve_subjects, subject_ids};

/// Decides whether principals may act on files and folders.
///
/// The engine is cheap to clone and holds no per-request state; everything
/// request-bound lives in a [`RequestScope`] obtained from [`begin`].
///
/// [`begin`]: AccessEngine::begin
#[derive(Clone)]
pub struct AccessEngine {
	pub(crate) records: Arc<dyn AccessRecordStore>,
	pub(crate) directory: Arc<dyn DirectoryLookup>,
	pub(crate) tree: Arc<dyn FolderTreeLookup>,
	pub(crate) config: AclConfig,
}

impl AccessEngine {
	pub fn new(
		records: Arc<dyn AccessRecordStore>,
		directory: Arc<dyn DirectoryLookup>,
		tree: Arc<dyn FolderTreeLookup>,
		config: AclConfig,
	) -> Self {
		Self {
			records,
			directory,
			tree,
			config,
		}
	}

	pub fn config(&self) -> &AclConfig {
		&self.config
	}

	/// Start a request. `user = None` is an anonymous caller, who can only
	/// get anywhere through the link presented with the request.
	#[instrument(skip(self, links), fields(tenant = %tenant))]
	pub async fn begin(
		&self,
		tenant: TenantId,
		user: Option<UserId>,
		links: Arc<dyn ExternalLinkContext>,
	) -> Result<RequestScope> {
		let link = links.presented_link_id().await?;
		let principal = match user {
			Some(user) => Principal {
				link,
				..self.load_principal(tenant, user, links.as_ref()).await?
			},
			None => anonymous(link),
		};
		debug!(
			user_id = %principal.id,
			user_type = ?principal.user_type,
			groups = principal.groups.len(),
			has_link = principal.link.is_some(),
			"request scope started"
		);
		Ok(RequestScope::new(tenant, principal, links))
	}

	pub(crate) async fn load_principal(
		&self,
		tenant: TenantId,
		user: UserId,
		links: &dyn ExternalLinkContext,
	) -> Result<Principal> {
		Ok(Principal {
			id: user,
			user_type: self.directory.user_type(tenant, user).await?,
			outsider: self.directory.is_outsider(tenant, user).await?,
			authenticated: true,
			groups: self.directory.groups_of(tenant, user).await?,
			link: None,
			recent_links: links.recent_link_ids(tenant, user).await?,
		})
	}

	/// Whether the scope's principal may perform `action` on `entry`.
	///
	/// Denial is `Ok(false)`. Errors are collaborator failures or malformed
	/// input, and abort the decision.
	#[instrument(
		level = "debug",
		skip(self, scope, entry),
		fields(user_id = %scope.principal().id, entry_id = %entry.id, action = %action)
	)]
	pub async fn can(&self, scope: &RequestScope, entry: &Entry, action: Action) -> Result<bool> {
		if self.config.memoize_decisions {
			if let Some(allowed) = scope.decision(entry, action) {
				trace!(allowed, "memoized decision");
				return Ok(allowed);
			}
		}

		let decision = self.decide(scope, entry, action).await.map_err(|e| {
			warn!(error = %e, "access decision aborted");
			e
		})?;

		if decision.reset_access {
			scope.reset_access(entry);
		}
		debug!(
			allowed = decision.allowed,
			branch = decision.branch.as_str(),
			"access decision"
		);

		if self.config.memoize_decisions {
			Ok(scope.remember(entry, action, decision.allowed))
		} else {
			Ok(decision.allowed)
		}
	}

	async fn decide(&self, scope: &RequestScope, entry: &Entry, action: Action) -> Result<Decision> {
		check_entry(scope, entry)?;
		let principal = scope.principal();

		let reachable = (principal.authenticated || principal.link.is_some())
			&& action.is_available_for(entry.entry_type());
		if !reachable {
			return Ok(evaluate(&EvalInput {
				entry,
				principal,
				action,
				parents: &[],
				record: None,
				level: PermissionLevel::Restrict,
				room_owner: None,
			}));
		}

		let parents = self.parent_chain(scope, entry).await?;
		let access = self.resolve_access(scope, entry).await?;
		let room_owner = room_owner(scope, entry, &parents);

		Ok(evaluate(&EvalInput {
			entry,
			principal,
			action,
			parents: &parents,
			record: access.record.as_ref(),
			level: access.level,
			room_owner,
		}))
	}

	/// Every action declared for the entry type, with its decision.
	pub async fn actions(
		&self,
		scope: &RequestScope,
		entry: &Entry,
	) -> Result<BTreeMap<Action, bool>> {
		let mut decisions = BTreeMap::new();
		for action in Action::available_for(entry.entry_type()) {
			decisions.insert(*action, self.can(scope, entry, *action).await?);
		}
		Ok(decisions)
	}

	/// Download check used by content delivery. Provider entries carry no
	/// download setting of their own and only need read access.
	pub async fn can_download(&self, scope: &RequestScope, entry: &Entry) -> Result<bool> {
		let action = if entry.provider_entry {
			Action::Read
		} else {
			Action::Download
		};
		self.can(scope, entry, action).await
	}

	/// Whether the principal administers the entry's room: a tenant
	/// administrator, the room's creator, or a room manager or content creator.
	pub async fn has_full_access(&self, scope: &RequestScope, entry: &Entry) -> Result<bool> {
		let principal = scope.principal();
		if principal.is_admin() {
			return Ok(true);
		}
		let parents = self.parent_chain(scope, entry).await?;
		if room_owner(scope, entry, &parents) == Some(principal.id) {
			return Ok(true);
		}
		Ok(self.resolve_access(scope, entry).await?.level.is_room_admin())
	}

	/// The stored record governing the principal on an entry, or `None` when
	/// no stored record applies.
	#[instrument(level = "debug", skip(self, scope, entry), fields(entry_id = %entry.id))]
	pub async fn resolve_record(
		&self,
		scope: &RequestScope,
		entry: &Entry,
	) -> Result<Option<AccessControlRecord>> {
		if has_no_records(entry) {
			return Ok(None);
		}

		let principal = scope.principal();
		let history = uses_link_history(entry, principal, self.config.include_link_history);
		let subjects = resolve_subjects(principal, history);
		let records = self
			.records
			.get_records(entry, Some(&subject_ids(&subjects)))
			.await?;
		check_records(entry, &records)?;

		let resolver = RecordResolver::new(&subjects, ShareContext::for_root(entry.root_type));
		let own = records.iter().filter(|r| r.entry_id == entry.id);
		if entry.is_folder() {
			return Ok(resolver.best(own, true).cloned());
		}
		if let Some(record) = resolver.best(own, false) {
			return Ok(Some(record.clone()));
		}

		let Some(parent) = &entry.parent_id else {
			return Ok(None);
		};
		let key = record_key(scope.tenant(), parent, principal.id.into(), principal.link);
		if let Some(cached) = scope.cache().record(&key) {
			return Ok(cached);
		}
		let inherited = resolver
			.best(records.iter().filter(|r| &r.entry_id == parent), true)
			.cloned();
		Ok(scope.cache().insert_record(key, inherited))
	}

	pub(crate) async fn resolve_access(
		&self,
		scope: &RequestScope,
		entry: &Entry,
	) -> Result<ResolvedAccess> {
		if let Some(resolved) = scope.resolved(entry) {
			return Ok(resolved);
		}
		let resolved = match self.resolve_record(scope, entry).await? {
			Some(record) => ResolvedAccess {
				level: record.share,
				record: Some(record),
			},
			None => default_access(entry, scope.principal()),
		};
		Ok(scope.store_resolved(entry, resolved))
	}

	pub(crate) async fn parent_chain(
		&self,
		scope: &RequestScope,
		entry: &Entry,
	) -> Result<Arc<[Entry]>> {
		let Some(parent) = &entry.parent_id else {
			return Ok(Arc::from(Vec::new()));
		};
		let key = entry_key(scope.tenant(), parent);
		if self.config.cache_parent_chains {
			if let Some(chain) = scope.cache().chain(&key) {
				return Ok(chain);
			}
		}

		let chain = self.tree.parent_chain(scope.tenant(), parent).await?;
		if chain.first().is_some_and(|first| &first.id != parent) {
			return Err(AclError::malformed_entry(
				&entry.id,
				format!("ancestor chain does not start at parent {parent}"),
			));
		}

		let chain: Arc<[Entry]> = chain.into();
		if self.config.cache_parent_chains {
			Ok(scope.cache().insert_chain(key, chain))
		} else {
			Ok(chain)
		}
	}
}

pub(crate) fn anonymous(link: Option<LinkId>) -> Principal {
	Principal {
		outsider: true,
		authenticated: false,
		link,
		..Principal::new(ANONYMOUS_USER, UserType::Guest)
	}
}

/// Creator of the nearest room, cached per anchor folder.
fn room_owner(scope: &RequestScope, entry: &Entry, parents: &[Entry]) -> Option<UserId> {
	let anchor = if entry.is_room() {
		&entry.id
	} else {
		entry.parent_id.as_ref()?
	};
	let key = entry_key(scope.tenant(), anchor);
	if let Some(owner) = scope.cache().room_owner(&key) {
		return owner;
	}
	let owner = std::iter::once(entry)
		.chain(parents.iter())
		.find(|e| e.is_room())
		.map(|room| room.create_by);
	scope.cache().insert_room_owner(key, owner)
}

/// Access assumed when no stored record applies.
///
/// In a personal tree only the tree's owner holds the default grant. Elsewhere
/// everyone holds the root's default level.
fn default_access(entry: &Entry, principal: &Principal) -> ResolvedAccess {
	if entry.root_type == RootType::User {
		if principal.id != entry.root_create_by {
			return ResolvedAccess {
				record: None,
				level: tables::default_level(RootType::User),
			};
		}
		let level = PermissionLevel::ReadWrite;
		return ResolvedAccess {
			record: Some(AccessControlRecord::synthetic_default(entry, principal.id, level)),
			level,
		};
	}

	let level = tables::default_level(entry.root_type);
	let mut record = AccessControlRecord::synthetic_default(entry, EVERYONE_GROUP, level);
	record.subject_type = SubjectType::Group;
	ResolvedAccess {
		record: Some(record),
		level,
	}
}

fn check_entry(scope: &RequestScope, entry: &Entry) -> Result<()> {
	if entry.tenant_id != scope.tenant() {
		return Err(AclError::malformed_entry(
			&entry.id,
			format!("belongs to tenant {}, request is for {}", entry.tenant_id, scope.tenant()),
		));
	}
	if entry.parent_id.as_ref() == Some(&entry.id) {
		return Err(AclError::malformed_entry(&entry.id, "entry is its own parent"));
	}
	Ok(())
}

fn check_records(entry: &Entry, records: &[AccessControlRecord]) -> Result<()> {
	for record in records {
		if record.tenant_id != entry.tenant_id {
			return Err(AclError::malformed_record(
				&entry.id,
				format!("record belongs to tenant {}", record.tenant_id),
			));
		}
		let on_entry = record.entry_id == entry.id;
		let on_parent = !entry.is_folder() && entry.parent_id.as_ref() == Some(&record.entry_id);
		if !on_entry && !on_parent {
			return Err(AclError::malformed_record(
				&entry.id,
				format!("record is attached to unrelated entry {}", record.entry_id),
			));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::InMemoryBackend;
	use cabinet_acl_core::{FolderType, SubjectId};

	const TENANT: TenantId = TenantId(7);

	struct Room {
		backend: Arc<InMemoryBackend>,
		engine: AccessEngine,
		owner: UserId,
		room: Entry,
	}

	fn custom_room() -> Room {
		let backend = InMemoryBackend::new();
		let owner = UserId::generate();
		backend.add_user(owner, UserType::RoomAdmin);

		let container = rooms_container(owner);
		let room = Entry::folder(
			10,
			TENANT,
			FolderType::CustomRoom,
			RootType::VirtualRooms,
			owner,
		)
		.with_parent(1)
		.with_root(1, owner);
		backend.add_entry(container);
		backend.add_entry(room.clone());

		let engine = backend.engine(AclConfig::default());
		Room {
			backend,
			engine,
			owner,
			room,
		}
	}

	fn rooms_container(owner: UserId) -> Entry {
		Entry::folder(1, TENANT, FolderType::VirtualRooms, RootType::VirtualRooms, owner)
	}

	fn file(id: i64, room: &Entry, creator: UserId) -> Entry {
		Entry::file(id, TENANT, RootType::VirtualRooms, creator)
			.with_parent(room.id.clone())
			.with_root(room.root_id.clone(), room.root_create_by)
	}

	#[tokio::test]
	async fn memoized_decision_skips_collaborators() {
		let r = custom_room();
		let reader = UserId::generate();
		r.backend.grant(AccessControlRecord::new(
			&r.room,
			SubjectType::User,
			reader,
			PermissionLevel::Read,
			r.owner,
		));
		let scope = r.engine.begin(TENANT, Some(reader), r.backend.clone()).await.unwrap();
		let entry = file(100, &r.room, r.owner);

		assert!(r.engine.can(&scope, &entry, Action::Read).await.unwrap());
		let after_first = r.backend.calls();
		assert!(r.engine.can(&scope, &entry, Action::Read).await.unwrap());
		assert_eq!(r.backend.calls(), after_first);
	}

	#[tokio::test]
	async fn memo_can_be_disabled() {
		let r = custom_room();
		let engine = r.backend.engine(AclConfig {
			memoize_decisions: false,
			..AclConfig::default()
		});
		let scope = engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		let entry = file(100, &r.room, r.owner);

		engine.can(&scope, &entry, Action::Read).await.unwrap();
		assert_eq!(scope.decision(&entry, Action::Read), None);
	}

	#[tokio::test]
	async fn siblings_share_one_chain_lookup() {
		let r = custom_room();
		let scope = r.engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		for id in 100..105 {
			r.engine
				.can(&scope, &file(id, &r.room, r.owner), Action::Read)
				.await
				.unwrap();
		}
		assert_eq!(r.backend.calls().tree, 1);
		assert_eq!(scope.cache().stats().chains, 1);
	}

	#[tokio::test]
	async fn room_owner_cache_holds_the_owner_not_the_verdict() {
		let r = custom_room();
		let entry = file(100, &r.room, r.owner);

		let owner_scope = r.engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		assert!(r.engine.has_full_access(&owner_scope, &entry).await.unwrap());

		let member = UserId::generate();
		let member_scope = owner_scope.child(
			r.engine
				.load_principal(TENANT, member, r.backend.as_ref())
				.await
				.unwrap(),
		);
		assert!(!r.engine.has_full_access(&member_scope, &entry).await.unwrap());
		assert_eq!(owner_scope.cache().stats().room_owners, 1);
	}

	#[tokio::test]
	async fn first_cached_room_owner_wins() {
		let r = custom_room();
		let entry = file(100, &r.room, r.owner);
		let impostor = UserId::generate();

		let scope = r.engine.begin(TENANT, Some(impostor), r.backend.clone()).await.unwrap();
		scope
			.cache()
			.insert_room_owner(entry_key(TENANT, &r.room.id), Some(impostor));
		assert!(r.engine.has_full_access(&scope, &entry).await.unwrap());
	}

	#[tokio::test]
	async fn foreign_tenant_entry_is_malformed() {
		let r = custom_room();
		let scope = r.engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		let foreign = Entry::file(5, TenantId(99), RootType::Common, r.owner);
		let err = r.engine.can(&scope, &foreign, Action::Read).await.unwrap_err();
		assert!(matches!(err, AclError::MalformedEntry { .. }));
	}

	#[tokio::test]
	async fn store_failure_is_an_error_not_a_denial() {
		let r = custom_room();
		let scope = r.engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		r.backend.fail_records(true);
		let err = r
			.engine
			.can(&scope, &file(100, &r.room, r.owner), Action::Read)
			.await
			.unwrap_err();
		assert!(err.is_collaborator_failure());
		assert_eq!(scope.decision(&file(100, &r.room, r.owner), Action::Read), None);
	}

	#[tokio::test]
	async fn anonymous_without_link_touches_no_store() {
		let r = custom_room();
		let scope = r.engine.begin(TENANT, None, r.backend.clone()).await.unwrap();
		let before = r.backend.calls();
		assert!(!r
			.engine
			.can(&scope, &file(100, &r.room, r.owner), Action::Read)
			.await
			.unwrap());
		assert_eq!(r.backend.calls().records, before.records);
		assert_eq!(r.backend.calls().tree, before.tree);
	}

	#[tokio::test]
	async fn anonymous_link_holder_resolves_the_link_record() {
		let r = custom_room();
		let link = LinkId::generate();
		r.backend.grant(AccessControlRecord::new(
			&r.room,
			SubjectType::ExternalLink,
			link,
			PermissionLevel::Read,
			r.owner,
		));
		r.backend.present_link(Some(link));

		let scope = r.engine.begin(TENANT, None, r.backend.clone()).await.unwrap();
		assert_eq!(scope.principal().id, ANONYMOUS_USER);
		let entry = file(100, &r.room, r.owner);
		let record = r.engine.resolve_record(&scope, &entry).await.unwrap().unwrap();
		assert_eq!(record.subject, SubjectId::from(link));
		assert_eq!(record.entry_id, r.room.id);
		assert!(r.engine.can(&scope, &entry, Action::Read).await.unwrap());
		assert!(!r.engine.can(&scope, &entry, Action::Edit).await.unwrap());
	}

	#[tokio::test]
	async fn rooms_container_has_no_record() {
		let r = custom_room();
		let admin = UserId::generate();
		r.backend.add_user(admin, UserType::DocSpaceAdmin);
		let scope = r.engine.begin(TENANT, Some(admin), r.backend.clone()).await.unwrap();
		let container = rooms_container(r.owner);
		assert!(r.engine.resolve_record(&scope, &container).await.unwrap().is_none());
		assert!(r.engine.can(&scope, &container, Action::Create).await.unwrap());
	}

	#[tokio::test]
	async fn actions_map_covers_declared_actions() {
		let r = custom_room();
		let scope = r.engine.begin(TENANT, Some(r.owner), r.backend.clone()).await.unwrap();
		let entry = file(100, &r.room, r.owner);
		let actions = r.engine.actions(&scope, &entry).await.unwrap();
		assert_eq!(actions.len(), Action::available_for(entry.entry_type()).len());
		assert!(!actions.contains_key(&Action::Create));
	}

	#[tokio::test]
	async fn provider_download_goes_through_read() {
		let r = custom_room();
		let reader = UserId::generate();
		let mut room = r.room.clone();
		room.folder_attrs_mut().unwrap().deny_download = true;
		r.backend.add_entry(room.clone());
		r.backend.grant(AccessControlRecord::new(
			&room,
			SubjectType::User,
			reader,
			PermissionLevel::Read,
			r.owner,
		));
		let scope = r.engine.begin(TENANT, Some(reader), r.backend.clone()).await.unwrap();

		let native = file(100, &room, r.owner);
		assert!(!r.engine.can_download(&scope, &native).await.unwrap());

		let mut provided = file(101, &room, r.owner);
		provided.provider_entry = true;
		assert!(r.engine.can_download(&scope, &provided).await.unwrap());
	}
}
