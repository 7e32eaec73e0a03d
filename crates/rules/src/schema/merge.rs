//! Merge configuration: groups of field operations under optional guards.

use docmerge_core::FieldPath;
use serde::{Deserialize, Serialize};

/// How two documents of one index type are reconciled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeConfig {
    /// When true the stored document is mutated and returned; otherwise the
    /// incoming one is.
    #[serde(default)]
    pub existing_as_master: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A guarded set of field operations, with nested groups that inherit the guard.
///
/// Operations run in a fixed order: math, replace-if-missing, replace,
/// keep-latest, keep-earliest, merge, force-update, then nested groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_math: Vec<FieldMath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_replace_if_missing: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_replace: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_keep_latest: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_keep_earliest: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_merge: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_force_update: Vec<FieldPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

/// Field names accepted inside a group, as spelled in rule files.
pub const GROUP_FIELDS: &[&str] = &[
    "condition",
    "fieldMath",
    "fieldReplaceIfMissing",
    "fieldReplace",
    "fieldKeepLatest",
    "fieldKeepEarliest",
    "fieldMerge",
    "fieldForceUpdate",
    "groups",
];

impl Group {
    /// The guard expression, if any. A blank condition means "always run".
    pub fn guard(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Number of field operations configured directly on this group.
    pub fn operation_count(&self) -> usize {
        self.field_math.len()
            + self.field_replace_if_missing.len()
            + self.field_replace.len()
            + self.field_keep_latest.len()
            + self.field_keep_earliest.len()
            + self.field_merge.len()
            + self.field_force_update.len()
    }

    /// Path lists keyed by their rule-file field name, in application order.
    pub fn path_operations(&self) -> [(&'static str, &[FieldPath]); 6] {
        [
            ("fieldReplaceIfMissing", self.field_replace_if_missing.as_slice()),
            ("fieldReplace", self.field_replace.as_slice()),
            ("fieldKeepLatest", self.field_keep_latest.as_slice()),
            ("fieldKeepEarliest", self.field_keep_earliest.as_slice()),
            ("fieldMerge", self.field_merge.as_slice()),
            ("fieldForceUpdate", self.field_force_update.as_slice()),
        ]
    }
}

/// A computed field: `expression` is evaluated and written to `output_field`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldMath {
    pub expression: String,
    pub output_field: FieldPath,
}
