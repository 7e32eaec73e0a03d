//! YAML rule schema types with serde deserialization.
//!
//! - `MergeRule`: root document (apiVersion, kind, metadata, indexType, merge)
//! - `MergeConfig` / `Group` / `FieldMath`: the merge configuration tree
//!
//! Field paths are parsed while deserializing, so a malformed path fails the
//! whole rule file rather than surfacing mid-merge.

mod merge;
mod metadata;
mod rule;

pub use merge::*;
pub use metadata::*;
pub use rule::*;
