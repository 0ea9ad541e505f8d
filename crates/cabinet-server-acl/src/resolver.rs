// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Selection of the single record that governs a principal's access.

use std::cmp::Reverse;

use cabinet_acl_core::{
	AccessControlRecord, Entry, FolderType, Principal, RootType, ShareContext, Subject,
	SubjectClass,
};

/// Picks the best record among candidates for one principal.
///
/// Candidates are compared by subject class first (user before group before
/// link), then by inheritance level when asked (nearest grant wins), then by
/// permission rank in the entry's share context, then by the position of the
/// subject in the principal's list.
pub struct RecordResolver<'a> {
	subjects: &'a [Subject],
	context: ShareContext,
}

type RankKey = (SubjectClass, u32, Reverse<u8>, usize);

impl<'a> RecordResolver<'a> {
	pub fn new(subjects: &'a [Subject], context: ShareContext) -> Self {
		Self { subjects, context }
	}

	pub fn best<'r, I>(&self, candidates: I, by_level: bool) -> Option<&'r AccessControlRecord>
	where
		I: IntoIterator<Item = &'r AccessControlRecord>,
	{
		candidates
			.into_iter()
			.filter_map(|record| self.key(record, by_level).map(|key| (key, record)))
			.min_by_key(|(key, _)| *key)
			.map(|(_, record)| record)
	}

	fn key(&self, record: &AccessControlRecord, by_level: bool) -> Option<RankKey> {
		let position = self.subjects.iter().position(|s| s.id == record.subject)?;
		let class = self.subjects[position].class;
		let level = if by_level { record.level } else { 0 };
		Some((
			class,
			level,
			Reverse(self.context.rank(record.share)),
			position,
		))
	}
}

/// Root containers that never carry records of their own.
pub(crate) fn has_no_records(entry: &Entry) -> bool {
	matches!(
		entry.folder_type(),
		Some(FolderType::VirtualRooms | FolderType::Archive)
	)
}

/// Whether links the principal used before count for this entry.
pub(crate) fn uses_link_history(entry: &Entry, principal: &Principal, enabled: bool) -> bool {
	if !enabled {
		return false;
	}
	match entry.root_type {
		RootType::User => principal.id != entry.root_create_by,
		RootType::VirtualRooms => !principal.is_admin(),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cabinet_acl_core::{
		GroupId, LinkId, PermissionLevel, SubjectId, SubjectType, TenantId, UserId, UserType,
		EVERYONE_GROUP,
	};

	fn folder() -> Entry {
		Entry::folder(
			10,
			TenantId(1),
			FolderType::CustomRoom,
			RootType::VirtualRooms,
			UserId::generate(),
		)
	}

	fn record(
		entry: &Entry,
		subject_type: SubjectType,
		subject: impl Into<SubjectId>,
		share: PermissionLevel,
		level: u32,
	) -> AccessControlRecord {
		AccessControlRecord::new(entry, subject_type, subject, share, entry.create_by)
			.with_level(level)
	}

	struct Fixture {
		user: UserId,
		group: GroupId,
		link: LinkId,
		subjects: Vec<Subject>,
	}

	fn fixture() -> Fixture {
		let user = UserId::generate();
		let group = GroupId::generate();
		let link = LinkId::generate();
		let subjects = vec![
			Subject::new(user, SubjectClass::User),
			Subject::new(group, SubjectClass::Group),
			Subject::new(EVERYONE_GROUP, SubjectClass::Group),
			Subject::new(link, SubjectClass::CurrentLink),
		];
		Fixture {
			user,
			group,
			link,
			subjects,
		}
	}

	#[test]
	fn user_record_beats_more_senior_group_record() {
		let f = fixture();
		let entry = folder();
		let records = vec![
			record(&entry, SubjectType::Group, f.group, PermissionLevel::RoomManager, 0),
			record(&entry, SubjectType::User, f.user, PermissionLevel::Read, 0),
		];
		let resolver = RecordResolver::new(&f.subjects, ShareContext::Room);
		let best = resolver.best(&records, true).unwrap();
		assert_eq!(best.share, PermissionLevel::Read);
	}

	#[test]
	fn group_record_beats_link_record() {
		let f = fixture();
		let entry = folder();
		let records = vec![
			record(&entry, SubjectType::ExternalLink, f.link, PermissionLevel::Editing, 0),
			record(&entry, SubjectType::Group, EVERYONE_GROUP, PermissionLevel::Read, 0),
		];
		let resolver = RecordResolver::new(&f.subjects, ShareContext::Room);
		assert_eq!(resolver.best(&records, true).unwrap().share, PermissionLevel::Read);
	}

	#[test]
	fn nearest_grant_wins_within_a_class() {
		let f = fixture();
		let entry = folder();
		let records = vec![
			record(&entry, SubjectType::User, f.user, PermissionLevel::Editing, 2),
			record(&entry, SubjectType::User, f.user, PermissionLevel::Read, 1),
		];
		let resolver = RecordResolver::new(&f.subjects, ShareContext::File);
		assert_eq!(resolver.best(&records, true).unwrap().share, PermissionLevel::Read);
		assert_eq!(resolver.best(&records, false).unwrap().share, PermissionLevel::Editing);
	}

	#[test]
	fn share_rank_depends_on_context() {
		let f = fixture();
		let entry = folder();
		let records = vec![
			record(&entry, SubjectType::Group, f.group, PermissionLevel::Editing, 0),
			record(&entry, SubjectType::Group, EVERYONE_GROUP, PermissionLevel::RoomManager, 0),
		];
		let room = RecordResolver::new(&f.subjects, ShareContext::Room);
		assert_eq!(room.best(&records, true).unwrap().share, PermissionLevel::RoomManager);
		let file = RecordResolver::new(&f.subjects, ShareContext::File);
		assert_eq!(file.best(&records, true).unwrap().share, PermissionLevel::Editing);
	}

	#[test]
	fn equal_rank_falls_back_to_subject_order() {
		let f = fixture();
		let entry = folder();
		let records = vec![
			record(&entry, SubjectType::Group, EVERYONE_GROUP, PermissionLevel::Read, 0),
			record(&entry, SubjectType::Group, f.group, PermissionLevel::Read, 0),
		];
		let resolver = RecordResolver::new(&f.subjects, ShareContext::Room);
		assert_eq!(
			resolver.best(&records, true).unwrap().subject,
			SubjectId::from(f.group)
		);
	}

	#[test]
	fn foreign_subjects_are_ignored() {
		let f = fixture();
		let entry = folder();
		let records = vec![record(
			&entry,
			SubjectType::User,
			UserId::generate(),
			PermissionLevel::RoomManager,
			0,
		)];
		let resolver = RecordResolver::new(&f.subjects, ShareContext::Room);
		assert!(resolver.best(&records, true).is_none());
	}

	#[test]
	fn link_history_applies_to_foreign_personal_trees_and_member_rooms() {
		let owner = UserId::generate();
		let visitor = Principal::new(UserId::generate(), UserType::User);
		let personal = Entry::file(1, TenantId(1), RootType::User, owner);
		assert!(uses_link_history(&personal, &visitor, true));
		assert!(!uses_link_history(&personal, &visitor, false));
		assert!(!uses_link_history(
			&personal,
			&Principal::new(owner, UserType::User),
			true
		));

		let room_file = Entry::file(2, TenantId(1), RootType::VirtualRooms, owner);
		assert!(uses_link_history(&room_file, &visitor, true));
		assert!(!uses_link_history(
			&room_file,
			&Principal::new(UserId::generate(), UserType::DocSpaceAdmin),
			true
		));

		let common = Entry::file(3, TenantId(1), RootType::Common, owner);
		assert!(!uses_link_history(&common, &visitor, true));
	}

	mod ordering {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn selection_ignores_candidate_order(
				picks in proptest::collection::vec((0usize..4, 0usize..12, 0u32..3), 1..12),
				rotate in 0usize..12,
				room in any::<bool>(),
			) {
				let f = fixture();
				let entry = folder();
				let levels = PermissionLevel::all();
				let records: Vec<AccessControlRecord> = picks
					.iter()
					.map(|(subject, share, level)| {
						let (subject_type, id) = match subject {
							0 => (SubjectType::User, SubjectId::from(f.user)),
							1 => (SubjectType::Group, SubjectId::from(f.group)),
							2 => (SubjectType::Group, SubjectId::from(EVERYONE_GROUP)),
							_ => (SubjectType::ExternalLink, SubjectId::from(f.link)),
						};
						record(&entry, subject_type, id, levels[*share], *level)
					})
					.collect();

				let mut shuffled = records.clone();
				shuffled.rotate_left(rotate % records.len());
				shuffled.reverse();

				let context = if room { ShareContext::Room } else { ShareContext::File };
				let resolver = RecordResolver::new(&f.subjects, context);
				let pick = |r: &AccessControlRecord| (r.subject, r.share, r.level);
				prop_assert_eq!(
					resolver.best(&records, true).map(pick),
					resolver.best(&shuffled, true).map(pick)
				);
			}
		}
	}
}
