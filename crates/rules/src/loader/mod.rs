//! Filesystem merge rule loader with hot-reload via `notify` watcher.
//!
//! Watches the rules directory for YAML file changes (create, modify, delete)
//! and reloads affected rules into the in-memory rule set. Every file is
//! validated before it replaces the previous version.

mod core;
mod error;
mod watcher;


pub use self::core::{RuleLoader, RuleMap};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
