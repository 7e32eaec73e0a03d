//! Integration tests that verify every example YAML rule in
//! `data/rules/examples/` deserializes, validates and loads.

use std::sync::Arc;

use docmerge_rules::loader::{LoadStatus, RuleLoader};
use docmerge_rules::schema::MergeRule;
use docmerge_rules::validation::{validate_rule, validate_yaml};
use docmerge_rules::JinjaEvaluator;

/// Resolve the examples directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn examples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules/examples")
}

fn load_rule(filename: &str) -> MergeRule {
    let path = examples_dir().join(filename);
    let yaml = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_yaml::from_str(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

// ── customer-profile.yml ────────────────────────────────────

#[test]
fn parse_customer_profile_example() {
    let rule = load_rule("customer-profile.yml");

    assert_eq!(rule.api_version, "v1");
    assert_eq!(rule.kind, "MergeRule");
    assert_eq!(rule.id(), "customer-profile");
    assert!(rule.metadata.enabled);
    assert_eq!(rule.index_type, "customers");
    assert!(rule.merge.existing_as_master);

    let groups = &rule.merge.groups;
    assert_eq!(groups.len(), 2);
    assert!(groups[0].guard().is_none());
    assert_eq!(groups[0].field_replace.len(), 3);
    assert_eq!(groups[1].guard(), Some(r#"New.status == "active""#));
    assert_eq!(groups[1].groups.len(), 1);
    assert_eq!(groups[1].groups[0].field_math[0].output_field.as_str(), "tierChanges");
}

// ── order-totals.yml ────────────────────────────────────────

#[test]
fn parse_order_totals_example() {
    let rule = load_rule("order-totals.yml");

    assert_eq!(rule.index_type, "accounts");
    let group = &rule.merge.groups[0];
    assert_eq!(group.field_math.len(), 2);
    let indexed = &group.field_replace[1];
    assert_eq!(indexed.segments()[1].index, Some(0));
}

// ── session-snapshot.yml ────────────────────────────────────

#[test]
fn parse_session_snapshot_example() {
    let rule = load_rule("session-snapshot.yml");

    assert!(!rule.metadata.enabled);
    assert!(!rule.merge.existing_as_master);
    assert_eq!(rule.merge.groups[0].field_merge[0].as_str(), "pages");
}

// ── whole directory ─────────────────────────────────────────

#[test]
fn every_example_validates_cleanly() {
    let evaluator = JinjaEvaluator::new();
    for entry in std::fs::read_dir(examples_dir()).unwrap() {
        let path = entry.unwrap().path();
        let yaml = std::fs::read_to_string(&path).unwrap();

        let result = validate_yaml(&yaml);
        assert!(result.valid, "{}: {:?}", path.display(), result.errors);
        assert!(result.warnings.is_empty(), "{}: {:?}", path.display(), result.warnings);

        let rule: MergeRule = serde_yaml::from_str(&yaml).unwrap();
        assert!(validate_rule(&rule, Some(&evaluator)).valid);
    }
}

#[test]
fn loader_loads_every_example() {
    let loader = RuleLoader::new(examples_dir()).with_evaluator(Arc::new(JinjaEvaluator::new()));
    let results = loader.load_all().unwrap();

    let mut loaded: Vec<&str> = results
        .iter()
        .filter_map(|r| match &r.status {
            LoadStatus::Loaded { rule_id } => Some(rule_id.as_str()),
            _ => None,
        })
        .collect();
    loaded.sort_unstable();
    assert_eq!(loaded, vec!["customer-profile", "order-totals", "session-snapshot"]);

    assert_eq!(loader.rule_for_index("customers").unwrap().id(), "customer-profile");
    assert!(loader.rule_for_index("sessions").is_none(), "disabled rules are not selected");
}
