// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod acl;
mod logging;

pub use acl::{AclConfig, AclConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
