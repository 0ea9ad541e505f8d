// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subjects: who a grant is made to, and how a principal expands into them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;
use crate::ids::SubjectId;

/// The kind of subject an access-control record names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
	User,
	Group,
	ExternalLink,
	PrimaryExternalLink,
	InvitationLink,
}

impl SubjectType {
	pub fn all() -> &'static [SubjectType] {
		&[
			SubjectType::User,
			SubjectType::Group,
			SubjectType::ExternalLink,
			SubjectType::PrimaryExternalLink,
			SubjectType::InvitationLink,
		]
	}

	/// The three link kinds.
	pub fn links() -> &'static [SubjectType] {
		&[
			SubjectType::ExternalLink,
			SubjectType::PrimaryExternalLink,
			SubjectType::InvitationLink,
		]
	}

	pub fn is_link(&self) -> bool {
		matches!(
			self,
			SubjectType::ExternalLink | SubjectType::PrimaryExternalLink | SubjectType::InvitationLink
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SubjectType::User => "user",
			SubjectType::Group => "group",
			SubjectType::ExternalLink => "external_link",
			SubjectType::PrimaryExternalLink => "primary_external_link",
			SubjectType::InvitationLink => "invitation_link",
		}
	}
}

impl fmt::Display for SubjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for SubjectType {
	type Err = ParseError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SubjectType::all()
			.iter()
			.copied()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| ParseError::unknown("subject type", s))
	}
}

/// Priority class of a principal-derived subject. Lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectClass {
	User = 0,
	Group = 1,
	CurrentLink = 2,
	RecentlyUsedLink = 3,
}

/// One of a principal's "selves".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
	pub id: SubjectId,
	pub class: SubjectClass,
}

impl Subject {
	pub fn new(id: impl Into<SubjectId>, class: SubjectClass) -> Self {
		Self {
			id: id.into(),
			class,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn link_kinds() {
		for t in SubjectType::all() {
			assert_eq!(t.is_link(), SubjectType::links().contains(t));
		}
		assert!(!SubjectType::User.is_link());
		assert!(!SubjectType::Group.is_link());
	}

	#[test]
	fn class_order_matches_priority() {
		assert!(SubjectClass::User < SubjectClass::Group);
		assert!(SubjectClass::Group < SubjectClass::CurrentLink);
		assert!(SubjectClass::CurrentLink < SubjectClass::RecentlyUsedLink);
	}

	#[test]
	fn subject_type_parse() {
		assert_eq!(
			"primary_external_link".parse::<SubjectType>().unwrap(),
			SubjectType::PrimaryExternalLink
		);
		assert!("role".parse::<SubjectType>().is_err());
	}
}
