use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document tree: string keys mapped to dynamic JSON values.
///
/// Absence of a key is distinct from a present `null`.
pub type Tree = Map<String, Value>;

/// A document as handed over by the ingestion pipeline or fetched from the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(rename = "indexType", default)]
    pub index_type: String,
    /// `None` when the upstream produced no body at all.
    #[serde(default)]
    pub source: Option<Tree>,
}

impl Document {
    pub fn new(id: impl Into<String>, index_type: impl Into<String>, source: Tree) -> Self {
        Self {
            id: id.into(),
            index_type: index_type.into(),
            source: Some(source),
        }
    }

    /// Build a document from a JSON object literal. Non-object values yield an
    /// absent source.
    pub fn from_json(id: impl Into<String>, index_type: impl Into<String>, source: Value) -> Self {
        let source = match source {
            Value::Object(map) => Some(map),
            _ => None,
        };
        Self {
            id: id.into(),
            index_type: index_type.into(),
            source,
        }
    }

    /// The document tree, or an empty tree when absent.
    pub fn source_or_empty(&self) -> std::borrow::Cow<'_, Tree> {
        match &self.source {
            Some(tree) => std::borrow::Cow::Borrowed(tree),
            None => std::borrow::Cow::Owned(Tree::new()),
        }
    }
}

/// Empty value for replace/force-update purposes: absent, `null`, or `""`.
///
/// Zero, `false`, and empty collections are values.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
