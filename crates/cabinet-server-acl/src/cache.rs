// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-operation cache of inherited state.
//!
//! Keys are composite strings so that a tenant, an entry and a subject can
//! never collide. The first value stored under a key wins; a concurrent
//! evaluation that resolved the same key gets the stored value back. Nothing is
//! ever invalidated: the cache lives exactly as long as one logical operation.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use cabinet_acl_core::{
	AccessControlRecord, Entry, EntryId, LinkId, SubjectId, TenantId, UserId,
};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct EntryCache {
	records: RwLock<HashMap<String, Option<AccessControlRecord>>>,
	room_owners: RwLock<HashMap<String, Option<UserId>>>,
	chains: RwLock<HashMap<String, Arc<[Entry]>>>,
}

/// Number of cached values per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub records: usize,
	pub room_owners: usize,
	pub chains: usize,
}

/// Key of an inherited record. Link holders all evaluate as the anonymous
/// user, so the link is part of the key.
pub(crate) fn record_key(
	tenant: TenantId,
	parent: &EntryId,
	subject: SubjectId,
	link: Option<LinkId>,
) -> String {
	match link {
		Some(link) => format!("{tenant}/{parent}/{subject}/{link}"),
		None => format!("{tenant}/{parent}/{subject}"),
	}
}

pub(crate) fn entry_key(tenant: TenantId, entry: &EntryId) -> String {
	format!("{tenant}/{entry}")
}

fn lookup<V: Clone>(map: &RwLock<HashMap<String, V>>, key: &str) -> Option<V> {
	map.read().get(key).cloned()
}

fn first_wins<V: Clone>(map: &RwLock<HashMap<String, V>>, key: String, value: V) -> V {
	map.write().entry(key).or_insert(value).clone()
}

impl EntryCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Best inherited record for a subject under a parent. The inner `None`
	/// means "resolved, nothing applies".
	pub fn record(&self, key: &str) -> Option<Option<AccessControlRecord>> {
		lookup(&self.records, key)
	}

	pub fn insert_record(
		&self,
		key: String,
		record: Option<AccessControlRecord>,
	) -> Option<AccessControlRecord> {
		first_wins(&self.records, key, record)
	}

	pub fn room_owner(&self, key: &str) -> Option<Option<UserId>> {
		lookup(&self.room_owners, key)
	}

	pub fn insert_room_owner(&self, key: String, owner: Option<UserId>) -> Option<UserId> {
		first_wins(&self.room_owners, key, owner)
	}

	pub fn chain(&self, key: &str) -> Option<Arc<[Entry]>> {
		lookup(&self.chains, key)
	}

	pub fn insert_chain(&self, key: String, chain: Arc<[Entry]>) -> Arc<[Entry]> {
		first_wins(&self.chains, key, chain)
	}

	pub fn stats(&self) -> CacheStats {
		CacheStats {
			records: self.records.read().len(),
			room_owners: self.room_owners.read().len(),
			chains: self.chains.read().len(),
		}
	}
}

impl Display for CacheStats {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"records={} room_owners={} chains={}",
			self.records, self.room_owners, self.chains
		)
	}
}
