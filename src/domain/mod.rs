//! Core domain models for go-change-detector
//!
//! This module contains the fundamental types used throughout the application:
//! - Build units (Go packages) as reported by the package lister
//! - Module versions, requirements and replacements read from go.mod
//! - The change set produced by a detection run

mod build_unit;
mod change_set;
mod module_version;

pub use build_unit::{BuildUnit, ModuleRef};
pub use change_set::{ChangeReason, ChangeSet};
pub use module_version::{ManifestSnapshot, ModuleVersion, Replacement, Requirement};
