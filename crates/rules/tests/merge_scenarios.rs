//! End-to-end merges driven by the example rules in `data/rules/examples/`.

use std::sync::Arc;

use docmerge_core::Document;
use docmerge_rules::loader::RuleLoader;
use docmerge_rules::{JinjaEvaluator, MergeEngine, MergeEvent, RecordingObserver};
use serde_json::{json, Value};

fn loader() -> RuleLoader {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let loader = RuleLoader::new(manifest.join("../../data/rules/examples"))
        .with_evaluator(Arc::new(JinjaEvaluator::new()));
    loader.load_all().unwrap();
    loader
}

fn doc(index_type: &str, source: Value) -> Document {
    Document::from_json("entity-42", index_type, source)
}

fn source(doc: Document) -> Value {
    Value::Object(doc.source.unwrap())
}

#[test]
fn customer_profile_merge() {
    let loader = loader();
    let rule = loader.rule_for_index("customers").unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let engine = MergeEngine::default().with_observer(observer.clone());

    let existing = doc(
        "customers",
        json!({
            "name": "Ada L.",
            "email": "ada@old.io",
            "address": {"city": "London", "zip": "N1"},
            "createdAt": "2019-05-01",
            "firstSeenAt": "2019-05-01T10:00:00Z",
            "lastSeenAt": "2024-01-01T00:00:00Z",
            "tags": ["vip"],
            "nickname": "ada",
            "status": "inactive",
            "tier": "silver",
            "tierChanges": 2,
        }),
    );
    let incoming = doc(
        "customers",
        json!({
            "name": "Ada Lovelace",
            "email": "",
            "address": {"city": "Paris"},
            "createdAt": "2024-06-01",
            "signupChannel": "web",
            "firstSeenAt": "2024-06-01T00:00:00Z",
            "lastSeenAt": "2024-06-01T00:00:00Z",
            "tags": ["newsletter", "vip"],
            "nickname": "",
            "status": "active",
            "tier": "gold",
        }),
    );

    let merged = source(engine.apply_rule(&rule, incoming, Some(existing)));
    assert_eq!(
        merged,
        json!({
            "name": "Ada Lovelace",
            "email": "ada@old.io",
            "address": {"city": "Paris", "zip": "N1"},
            "createdAt": "2019-05-01",
            "signupChannel": "web",
            "firstSeenAt": "2019-05-01T10:00:00Z",
            "lastSeenAt": "2024-06-01T00:00:00Z",
            "tags": ["vip", "newsletter"],
            "status": "active",
            "tier": "gold",
            "tierChanges": 3,
        })
    );
    assert!(observer.events().is_empty(), "{:?}", observer.events());
}

#[test]
fn inactive_customer_skips_guarded_groups() {
    let loader = loader();
    let rule = loader.get("customer-profile").unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let engine = MergeEngine::default().with_observer(observer.clone());

    let existing = doc("customers", json!({"status": "active", "tier": "gold"}));
    let incoming = doc("customers", json!({"status": "churned", "tier": "bronze"}));

    let merged = source(engine.apply_rule(&rule, incoming, Some(existing)));
    assert_eq!(merged, json!({"status": "active", "tier": "gold"}));
    assert!(matches!(
        observer.events().as_slice(),
        [MergeEvent::GuardRejected { .. }]
    ));
}

#[test]
fn order_totals_computes_delta() {
    let loader = loader();
    let rule = loader.rule_for_index("accounts").unwrap();
    let engine = MergeEngine::default();

    let existing = doc(
        "accounts",
        json!({
            "orders": {
                "total": 100,
                "lastOrderAt": "2024-05-01",
                "items": [{"sku": "A-1", "qty": 1}],
            },
        }),
    );
    let incoming = doc(
        "accounts",
        json!({
            "orders": {
                "total": 150,
                "lastOrderAt": "2024-04-01",
                "items": [{"sku": "B-2"}],
            },
        }),
    );

    let merged = source(engine.apply_rule(&rule, incoming, Some(existing)));
    assert_eq!(merged["stats"], json!({"orderDelta": 50, "grew": true}));
    assert_eq!(merged["orders"]["total"], json!(150));
    assert_eq!(merged["orders"]["lastOrderAt"], json!("2024-05-01"));
    assert_eq!(merged["orders"]["items"], json!([{"sku": "B-2", "qty": 1}]));
}

#[test]
fn first_sighting_is_indexed_as_is() {
    let loader = loader();
    let rule = loader.rule_for_index("accounts").unwrap();
    let incoming = doc("accounts", json!({"orders": {"total": 5}}));

    let merged = MergeEngine::default().apply_rule(&rule, incoming.clone(), None);
    assert_eq!(merged, incoming);
}
