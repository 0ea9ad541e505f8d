// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators.
//!
//! [`InMemoryBackend`] implements every collaborator trait over plain maps and
//! counts the calls it receives, so tests can assert on both decisions and
//! the traffic behind them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cabinet_acl_core::{
	AccessControlRecord, Entry, EntryId, EntryType, GroupId, LinkId, SubjectId, SubjectType,
	TenantId, UserId, UserType, ADMIN_GROUP, EVERYONE_GROUP,
};
use cabinet_server_config::AclConfig;
use parking_lot::Mutex;

use crate::engine::AccessEngine;
use crate::error::{AclError, Result};
use crate::store::{AccessRecordStore, DirectoryLookup, ExternalLinkContext, FolderTreeLookup};

#[derive(Debug, Clone)]
struct DirectoryUser {
	user_type: UserType,
	outsider: bool,
}

/// Calls received per collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
	pub records: usize,
	pub directory: usize,
	pub links: usize,
	pub tree: usize,
}

impl CallCounts {
	pub fn total(&self) -> usize {
		self.records + self.directory + self.links + self.tree
	}
}

#[derive(Debug, Default)]
struct Counters {
	records: AtomicUsize,
	directory: AtomicUsize,
	links: AtomicUsize,
	tree: AtomicUsize,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
	entries: Mutex<HashMap<EntryId, Entry>>,
	records: Mutex<Vec<AccessControlRecord>>,
	users: Mutex<HashMap<UserId, DirectoryUser>>,
	groups: Mutex<HashMap<GroupId, Vec<UserId>>>,
	presented_link: Mutex<Option<LinkId>>,
	recent_links: Mutex<HashMap<UserId, Vec<LinkId>>>,
	counters: Counters,
	fail_records: AtomicBool,
}

impl InMemoryBackend {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// An engine wired to this backend for all collaborators.
	pub fn engine(self: &Arc<Self>, config: AclConfig) -> AccessEngine {
		AccessEngine::new(self.clone(), self.clone(), self.clone(), config)
	}

	/// Register a folder so ancestor chains can be walked through it.
	pub fn add_entry(&self, entry: Entry) {
		self.entries.lock().insert(entry.id.clone(), entry);
	}

	pub fn add_user(&self, user: UserId, user_type: UserType) {
		self.users.lock().insert(
			user,
			DirectoryUser {
				user_type,
				outsider: false,
			},
		);
	}

	pub fn add_outsider(&self, user: UserId) {
		self.users.lock().insert(
			user,
			DirectoryUser {
				user_type: UserType::Guest,
				outsider: true,
			},
		);
	}

	pub fn add_to_group(&self, user: UserId, group: GroupId) {
		self.groups.lock().entry(group).or_default().push(user);
	}

	/// Store a grant on the entry it names, at level 0.
	pub fn grant(&self, record: AccessControlRecord) {
		self.records.lock().push(record.with_level(0));
	}

	pub fn present_link(&self, link: Option<LinkId>) {
		*self.presented_link.lock() = link;
	}

	pub fn remember_link(&self, user: UserId, link: LinkId) {
		self.recent_links.lock().entry(user).or_default().push(link);
	}

	/// Make every record-store call fail.
	pub fn fail_records(&self, fail: bool) {
		self.fail_records.store(fail, Ordering::SeqCst);
	}

	pub fn stored_records(&self) -> Vec<AccessControlRecord> {
		self.records.lock().clone()
	}

	pub fn calls(&self) -> CallCounts {
		CallCounts {
			records: self.counters.records.load(Ordering::SeqCst),
			directory: self.counters.directory.load(Ordering::SeqCst),
			links: self.counters.links.load(Ordering::SeqCst),
			tree: self.counters.tree.load(Ordering::SeqCst),
		}
	}

	fn record_call(&self) -> Result<()> {
		self.counters.records.fetch_add(1, Ordering::SeqCst);
		if self.fail_records.load(Ordering::SeqCst) {
			return Err(AclError::store("record store unavailable"));
		}
		Ok(())
	}

	/// Folder ids from `folder` up to the root, nearest first.
	fn ancestry(&self, folder: Option<&EntryId>) -> Vec<EntryId> {
		let entries = self.entries.lock();
		let mut chain = Vec::new();
		let mut next = folder.cloned();
		while let Some(id) = next {
			if chain.contains(&id) {
				break;
			}
			next = entries.get(&id).and_then(|e| e.parent_id.clone());
			chain.push(id);
		}
		chain
	}

	fn raw_on(&self, entry_type: EntryType, entry_id: &EntryId) -> Vec<AccessControlRecord> {
		self.records
			.lock()
			.iter()
			.filter(|r| r.entry_type == entry_type && &r.entry_id == entry_id)
			.cloned()
			.collect()
	}

	fn project(&self, entry: &Entry) -> Vec<AccessControlRecord> {
		let mut projected = Vec::new();
		let (target, chain) = match entry.entry_type() {
			EntryType::Folder => {
				let mut chain = vec![entry.id.clone()];
				chain.extend(self.ancestry(entry.parent_id.as_ref()));
				(entry.id.clone(), chain)
			}
			EntryType::File => {
				projected.extend(self.raw_on(EntryType::File, &entry.id));
				match &entry.parent_id {
					Some(parent) => (parent.clone(), self.ancestry(Some(parent))),
					None => return projected,
				}
			}
		};

		for (distance, folder) in chain.iter().enumerate() {
			for mut record in self.raw_on(EntryType::Folder, folder) {
				record.entry_id = target.clone();
				record.level = distance as u32;
				projected.push(record);
			}
		}
		projected
	}
}

#[async_trait]
impl AccessRecordStore for InMemoryBackend {
	async fn get_records(
		&self,
		entry: &Entry,
		subjects: Option<&[SubjectId]>,
	) -> Result<Vec<AccessControlRecord>> {
		self.record_call()?;
		let mut records = self.project(entry);
		if let Some(subjects) = subjects {
			records.retain(|r| subjects.contains(&r.subject));
		}
		Ok(records)
	}

	async fn get_records_by_subjects(
		&self,
		tenant: TenantId,
		subjects: &[SubjectId],
	) -> Result<Vec<AccessControlRecord>> {
		self.record_call()?;
		Ok(self
			.records
			.lock()
			.iter()
			.filter(|r| r.tenant_id == tenant && subjects.contains(&r.subject))
			.cloned()
			.collect())
	}

	async fn set_record(&self, record: &AccessControlRecord) -> Result<()> {
		self.record_call()?;
		let mut records = self.records.lock();
		let existing = records.iter_mut().find(|r| {
			r.entry_type == record.entry_type
				&& r.entry_id == record.entry_id
				&& r.subject == record.subject
		});
		match existing {
			Some(existing) => *existing = record.clone(),
			None => records.push(record.clone()),
		}
		Ok(())
	}

	async fn remove_by_subject(
		&self,
		tenant: TenantId,
		subject: SubjectId,
		without_owner: bool,
	) -> Result<()> {
		self.record_call()?;
		let owner = subject.as_user();
		self.records.lock().retain(|r| {
			r.tenant_id != tenant || (r.subject != subject && (without_owner || r.owner != owner))
		});
		Ok(())
	}

	async fn is_shared(&self, entry: &Entry, subject_types: &[SubjectType]) -> Result<bool> {
		self.record_call()?;
		let mut targets: Vec<(EntryType, EntryId)> = vec![(entry.entry_type(), entry.id.clone())];
		targets.extend(
			self.ancestry(entry.parent_id.as_ref())
				.into_iter()
				.map(|id| (EntryType::Folder, id)),
		);
		Ok(self.records.lock().iter().any(|r| {
			subject_types.contains(&r.subject_type)
				&& targets
					.iter()
					.any(|(t, id)| *t == r.entry_type && *id == r.entry_id)
		}))
	}
}

#[async_trait]
impl DirectoryLookup for InMemoryBackend {
	async fn user_type(&self, _tenant: TenantId, user: UserId) -> Result<UserType> {
		self.counters.directory.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.users
			.lock()
			.get(&user)
			.map(|u| u.user_type)
			.unwrap_or(UserType::User))
	}

	async fn is_outsider(&self, _tenant: TenantId, user: UserId) -> Result<bool> {
		self.counters.directory.fetch_add(1, Ordering::SeqCst);
		Ok(self.users.lock().get(&user).is_some_and(|u| u.outsider))
	}

	async fn groups_of(&self, _tenant: TenantId, user: UserId) -> Result<Vec<GroupId>> {
		self.counters.directory.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.groups
			.lock()
			.iter()
			.filter(|(_, members)| members.contains(&user))
			.map(|(group, _)| *group)
			.collect())
	}

	async fn is_in_group(&self, tenant: TenantId, user: UserId, group: GroupId) -> Result<bool> {
		Ok(self
			.active_users_in_group(tenant, group)
			.await?
			.contains(&user))
	}

	async fn active_users_in_group(&self, _tenant: TenantId, group: GroupId) -> Result<Vec<UserId>> {
		self.counters.directory.fetch_add(1, Ordering::SeqCst);
		let users = self.users.lock();
		let mut members: Vec<UserId> = if group == EVERYONE_GROUP {
			users
				.iter()
				.filter(|(_, u)| !u.outsider)
				.map(|(id, _)| *id)
				.collect()
		} else if group == ADMIN_GROUP {
			users
				.iter()
				.filter(|(_, u)| u.user_type == UserType::DocSpaceAdmin)
				.map(|(id, _)| *id)
				.collect()
		} else {
			Vec::new()
		};
		if let Some(explicit) = self.groups.lock().get(&group) {
			members.extend(explicit.iter().copied());
		}
		members.sort();
		members.dedup();
		Ok(members)
	}
}

#[async_trait]
impl ExternalLinkContext for InMemoryBackend {
	async fn presented_link_id(&self) -> Result<Option<LinkId>> {
		self.counters.links.fetch_add(1, Ordering::SeqCst);
		Ok(*self.presented_link.lock())
	}

	async fn recent_link_ids(&self, _tenant: TenantId, user: UserId) -> Result<Vec<LinkId>> {
		self.counters.links.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.recent_links
			.lock()
			.get(&user)
			.cloned()
			.unwrap_or_default())
	}
}

#[async_trait]
impl FolderTreeLookup for InMemoryBackend {
	async fn parent_chain(&self, _tenant: TenantId, folder: &EntryId) -> Result<Vec<Entry>> {
		self.counters.tree.fetch_add(1, Ordering::SeqCst);
		let ids = self.ancestry(Some(folder));
		let entries = self.entries.lock();
		ids.iter()
			.map(|id| {
				entries
					.get(id)
					.cloned()
					.ok_or_else(|| AclError::tree(format!("folder {id} is not registered")))
			})
			.collect()
	}
}
