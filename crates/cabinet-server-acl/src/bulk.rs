// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decisions over many entries or many principals.

use std::collections::BTreeSet;

use cabinet_acl_core::{
	AccessControlRecord, Action, Entry, GroupId, LinkId, RootType, SubjectId, SubjectType,
	UserId, ADMIN_GROUP, ANONYMOUS_USER, EVERYONE_GROUP,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, instrument};

use crate::engine::{anonymous, AccessEngine};
use crate::error::Result;
use crate::scope::RequestScope;
use crate::subject::{resolve_subjects, subject_ids};

/// Who may perform an action on an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoCanAct {
	/// Users holding access through ownership or the tree's defaults.
	pub direct: Vec<UserId>,
	/// Users granted access by a record, directly or through a group.
	pub shared: Vec<UserId>,
	/// Links whose holders may act.
	pub links: Vec<LinkId>,
}

impl AccessEngine {
	/// The entries the principal may perform `action` on, in input order.
	///
	/// Up to `bulk_concurrency` evaluations run at once; the first failure
	/// aborts the whole batch.
	#[instrument(skip(self, scope, entries), fields(count = entries.len(), action = %action))]
	pub async fn filter(
		&self,
		scope: &RequestScope,
		entries: Vec<Entry>,
		action: Action,
	) -> Result<Vec<Entry>> {
		let checks = entries.iter().map(|entry| self.can(scope, entry, action));
		let verdicts: Vec<bool> = stream::iter(checks)
			.buffered(self.config.bulk_concurrency.max(1))
			.try_collect()
			.await?;

		let allowed: Vec<Entry> = entries
			.into_iter()
			.zip(verdicts)
			.filter_map(|(entry, allowed)| allowed.then_some(entry))
			.collect();
		debug!(allowed = allowed.len(), "entries filtered");
		Ok(allowed)
	}

	/// Every principal that may perform `action` on `entry`.
	///
	/// Candidates are the entry's creator and the tree's default holders, the
	/// subjects of every record on the entry with groups expanded to their
	/// active members, and (with `include_links`) link subjects. A user holding
	/// an explicit grant is reported as shared unless they own the entry. Each
	/// candidate is evaluated as itself; link holders are evaluated as the
	/// anonymous user presenting that link.
	#[instrument(skip(self, scope, entry), fields(entry_id = %entry.id, action = %action))]
	pub async fn who_can_act(
		&self,
		scope: &RequestScope,
		entry: &Entry,
		action: Action,
		include_links: bool,
	) -> Result<WhoCanAct> {
		let unshared_personal = entry.root_type == RootType::User
			&& !self.records.is_shared(entry, SubjectType::all()).await?;
		let records = if unshared_personal {
			Vec::new()
		} else {
			self.records.get_records(entry, None).await?
		};

		let owners = BTreeSet::from([entry.create_by, entry.root_create_by]);
		let mut defaults = BTreeSet::new();
		match entry.root_type {
			RootType::Common => {
				defaults.extend(self.group_members(scope, EVERYONE_GROUP).await?);
			}
			RootType::VirtualRooms
			| RootType::Archive
			| RootType::RoomTemplates
			| RootType::AiAgents => {
				defaults.extend(self.group_members(scope, ADMIN_GROUP).await?);
				if records.is_empty() {
					defaults.extend(self.group_members(scope, EVERYONE_GROUP).await?);
				}
			}
			_ => {}
		}

		let mut shared = BTreeSet::new();
		let mut links = BTreeSet::new();
		for record in &records {
			match record.subject_type {
				SubjectType::User => {
					shared.insert(record.subject.as_user());
				}
				SubjectType::Group => {
					shared.extend(self.group_members(scope, record.subject.as_group()).await?);
				}
				SubjectType::ExternalLink | SubjectType::PrimaryExternalLink if include_links => {
					links.insert(record.subject.as_link());
				}
				_ => {}
			}
		}

		// Owners stay direct; an explicit grant beats default membership.
		shared.retain(|user| !owners.contains(user));
		defaults.retain(|user| !shared.contains(user));
		let mut direct = owners;
		direct.extend(defaults);
		direct.remove(&ANONYMOUS_USER);

		let mut result = WhoCanAct::default();
		for user in direct {
			if self.user_can(scope, entry, action, user).await? {
				result.direct.push(user);
			}
		}
		for user in shared {
			if self.user_can(scope, entry, action, user).await? {
				result.shared.push(user);
			}
		}
		for link in links {
			if self.can(&scope.child(anonymous(Some(link))), entry, action).await? {
				result.links.push(link);
			}
		}

		debug!(
			direct = result.direct.len(),
			shared = result.shared.len(),
			links = result.links.len(),
			"principals resolved"
		);
		Ok(result)
	}

	async fn group_members(&self, scope: &RequestScope, group: GroupId) -> Result<Vec<UserId>> {
		self.directory
			.active_users_in_group(scope.tenant(), group)
			.await
	}

	async fn user_can(
		&self,
		scope: &RequestScope,
		entry: &Entry,
		action: Action,
		user: UserId,
	) -> Result<bool> {
		let principal = self.load_principal(scope.tenant(), user, scope.links()).await?;
		self.can(&scope.child(principal), entry, action).await
	}

	/// Entries shared with the principal: records granted to any of their
	/// subjects by someone else, one per entry, keeping the record of the
	/// most specific subject.
	pub async fn shared_with(&self, scope: &RequestScope) -> Result<Vec<AccessControlRecord>> {
		let subjects = resolve_subjects(scope.principal(), self.config.include_link_history);
		let ids = subject_ids(&subjects);
		let mut records = self
			.records
			.get_records_by_subjects(scope.tenant(), &ids)
			.await?;

		let position = |subject: &SubjectId| {
			ids.iter().position(|id| id == subject).unwrap_or(usize::MAX)
		};
		records.retain(|r| r.owner != scope.principal().id);
		records.sort_by_key(|r| (r.entry_type, r.entry_id.clone(), position(&r.subject)));
		records.dedup_by(|a, b| a.entry_type == b.entry_type && a.entry_id == b.entry_id);
		Ok(records)
	}
}
