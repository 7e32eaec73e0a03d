//! `MergeRule` root document.

use serde::{Deserialize, Serialize};

use super::{CommonMetadata, MergeConfig};

/// Kind string identifying merge rule files.
pub const MERGE_RULE_KIND: &str = "MergeRule";

/// Top-level merge rule parsed from YAML: which index type it governs and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MergeRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    #[serde(rename = "indexType")]
    pub index_type: String,
    pub merge: MergeConfig,
}

impl MergeRule {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
