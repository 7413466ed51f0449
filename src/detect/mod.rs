//! Changed package detection
//!
//! This module provides:
//! - The modified source file set
//! - Import path → owning module candidates
//! - The propagation engine and its `detect_changed_packages` entry point

mod candidates;
mod changed_files;
mod engine;

pub use candidates::owning_candidates;
pub use changed_files::{ChangedFileSet, GO_SOURCE_SUFFIX};
pub use engine::{detect_changed_packages, ChangeDetector, ChangedPackage, Detection};
