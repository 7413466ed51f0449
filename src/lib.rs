//! go-change-detector - find the Go packages affected by a change
//!
//! Given a base git revision, this library works out which packages of one
//! or more Go modules differ from the working tree:
//! - packages whose own `.go` files changed
//! - packages whose module requirement resolves to a different version
//!   once `replace` directives in go.mod are applied
//! - packages that depend on a package changed in the same repository

pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod output;
pub mod process;
pub mod progress;
pub mod test_support;
pub mod toolchain;
pub mod vcs;
