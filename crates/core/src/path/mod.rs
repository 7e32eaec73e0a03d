//! Dotted, optionally indexed field paths into document trees.
//!
//! A path such as `customer.addresses[0].city` is parsed once (at config load)
//! into [`PathSegment`]s. Each segment names a mapping key and may carry a
//! single array index. Wildcards are not part of this syntax.
//!
//! The tree operations live in [`ops`]: [`lookup`], [`lookup_leaf`], [`patch`]
//! and [`delete`]. None of them fail; a miss is reported as `None`, `false`
//! or [`PatchOutcome::Rejected`].

mod ops;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

pub use ops::{delete, lookup, lookup_leaf, patch, PatchOutcome};

/// One step of a [`FieldPath`]: a mapping key, optionally followed by an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub key: String,
    pub index: Option<usize>,
}

/// A parsed field path. Keeps its source text for literal-key lookups and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = raw
            .split('.')
            .enumerate()
            .map(|(position, segment)| parse_segment(raw, position, segment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True for a single unindexed segment, i.e. a direct top-level key.
    pub fn is_top_level_key(&self) -> bool {
        matches!(self.segments.as_slice(), [PathSegment { index: None, .. }])
    }
}

fn parse_segment(path: &str, position: usize, segment: &str) -> Result<PathSegment, PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment {
            path: path.to_string(),
            position,
        });
    }
    if segment.contains('*') {
        return Err(PathError::Wildcard {
            path: path.to_string(),
        });
    }

    let Some(open) = segment.find('[') else {
        if segment.contains(']') {
            return Err(PathError::InvalidIndex {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
        return Ok(PathSegment {
            key: segment.to_string(),
            index: None,
        });
    };

    let key = &segment[..open];
    if key.is_empty() {
        return Err(PathError::MissingKey {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }

    let rest = &segment[open + 1..];
    let close = rest.find(']').ok_or_else(|| PathError::UnclosedBracket {
        path: path.to_string(),
        segment: segment.to_string(),
    })?;

    let digits = &rest[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathError::InvalidIndex {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    let index = digits.parse::<usize>().map_err(|_| PathError::InvalidIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })?;

    if !rest[close + 1..].is_empty() {
        return Err(PathError::TrailingCharacters {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }

    Ok(PathSegment {
        key: key.to_string(),
        index: Some(index),
    })
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
