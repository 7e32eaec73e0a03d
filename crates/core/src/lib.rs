//! Document model and tree utilities shared by the merge engine.
//!
//! - [`document`]: documents and the dynamic tree type
//! - [`path`]: dotted/indexed field paths with lookup, patch and delete
//! - [`temporal`]: best-effort timestamp coercion for date-based strategies

pub mod config;
pub mod document;
pub mod error;
pub mod path;
pub mod temporal;

pub use config::Config;
pub use document::*;
pub use error::*;
pub use path::{FieldPath, PatchOutcome, PathSegment};
