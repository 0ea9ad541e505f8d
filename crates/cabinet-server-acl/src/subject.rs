// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expansion of a principal into the subjects records may be granted to.

use cabinet_acl_core::{
	Principal, Subject, SubjectClass, SubjectId, ADMIN_GROUP, EVERYONE_GROUP,
};

/// The principal's subjects in priority order.
///
/// The user comes first, then groups (explicit memberships, the admin group
/// for administrators, then everyone), then the link presented with the
/// request, then links used before. A subject id appears at most once; the
/// first occurrence keeps its class.
pub fn resolve_subjects(principal: &Principal, include_link_history: bool) -> Vec<Subject> {
	let mut subjects = Vec::with_capacity(principal.groups.len() + 4);
	let mut push = |id: SubjectId, class: SubjectClass| {
		if !subjects.iter().any(|s: &Subject| s.id == id) {
			subjects.push(Subject { id, class });
		}
	};

	push(principal.id.into(), SubjectClass::User);
	for group in &principal.groups {
		push((*group).into(), SubjectClass::Group);
	}
	if principal.is_admin() {
		push(ADMIN_GROUP.into(), SubjectClass::Group);
	}
	push(EVERYONE_GROUP.into(), SubjectClass::Group);

	if let Some(link) = principal.link {
		push(link.into(), SubjectClass::CurrentLink);
	}
	if include_link_history {
		for link in &principal.recent_links {
			push((*link).into(), SubjectClass::RecentlyUsedLink);
		}
	}

	subjects
}

pub(crate) fn subject_ids(subjects: &[Subject]) -> Vec<SubjectId> {
	subjects.iter().map(|s| s.id).collect()
}
