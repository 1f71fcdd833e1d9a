//! Both backends must answer every query identically: the in-memory blob
//! evaluator and the SQL pushdown are two renderings of the same predicate
//! language, and rows with missing or null fields are where they most easily
//! drift apart.

use pretty_assertions::assert_eq;
use serde_json::json;
use wastetrack_store::{
    EntityStore, Filter, MemoryStore, QuerySpec, SortKey, SqliteStore, StagedBatch,
};

fn seed(store: &dyn EntityStore) {
    let mut batch = StagedBatch::new();
    batch.stage_insert(
        -1,
        json!({"name": "alpha", "tax_id": "5213017228", "mass_kg": 10.0}),
    );
    batch.stage_insert(-2, json!({"name": "bravo"}));
    batch.stage_insert(-3, json!({"name": "charlie", "tax_id": null, "mass_kg": 30.0}));
    store.commit("client", batch).unwrap();
}

fn both() -> (MemoryStore, SqliteStore) {
    let memory = MemoryStore::new();
    let sqlite = SqliteStore::open_in_memory().unwrap();
    seed(&memory);
    seed(&sqlite);
    (memory, sqlite)
}

fn names(store: &dyn EntityStore, spec: &QuerySpec) -> Vec<String> {
    store
        .scan("client", spec)
        .unwrap()
        .into_iter()
        .map(|r| r.data["name"].as_str().unwrap().to_string())
        .collect()
}

fn assert_agree(spec: &QuerySpec, expected: &[&str]) {
    let (memory, sqlite) = both();
    let from_memory = names(&memory, spec);
    let from_sqlite = names(&sqlite, spec);
    assert_eq!(from_memory, from_sqlite);
    assert_eq!(from_memory, expected);
}

// ── Predicates over missing and null fields ──────────────────────

#[test]
fn ne_includes_missing_and_null_fields() {
    assert_agree(
        &QuerySpec::filtered(Filter::ne("/tax_id", "5213017228")),
        &["bravo", "charlie"],
    );
}

#[test]
fn negated_eq_includes_missing_and_null_fields() {
    assert_agree(
        &QuerySpec::filtered(Filter::eq("/tax_id", "5213017228").negate()),
        &["bravo", "charlie"],
    );
}

#[test]
fn eq_null_matches_missing_and_null_fields() {
    assert_agree(
        &QuerySpec::filtered(Filter::eq("/tax_id", serde_json::Value::Null)),
        &["bravo", "charlie"],
    );
}

#[test]
fn ne_null_matches_only_present_values() {
    assert_agree(
        &QuerySpec::filtered(Filter::ne("/tax_id", serde_json::Value::Null)),
        &["alpha"],
    );
}

#[test]
fn ordering_predicate_skips_missing_fields() {
    assert_agree(
        &QuerySpec::filtered(Filter::gt("/mass_kg", 5)),
        &["alpha", "charlie"],
    );
}

#[test]
fn negated_ordering_predicate_includes_missing_fields() {
    assert_agree(
        &QuerySpec::filtered(Filter::gt("/mass_kg", 15).negate()),
        &["alpha", "bravo"],
    );
}

#[test]
fn double_negation_restores_the_predicate() {
    assert_agree(
        &QuerySpec::filtered(Filter::gt("/mass_kg", 15).negate().negate()),
        &["charlie"],
    );
}

#[test]
fn conjunction_over_partly_missing_fields() {
    let filter = Filter::ne("/tax_id", "5213017228").and(Filter::gt("/mass_kg", 5));
    assert_agree(&QuerySpec::filtered(filter), &["charlie"]);
}

#[test]
fn disjunction_over_partly_missing_fields() {
    let filter = Filter::eq("/name", "bravo").or(Filter::gt("/mass_kg", 20));
    assert_agree(&QuerySpec::filtered(filter), &["bravo", "charlie"]);
}

// ── Ordering with missing and null sort keys ─────────────────────

#[test]
fn missing_sort_keys_order_last_ascending() {
    let spec = QuerySpec {
        order: vec![SortKey::ascending("/mass_kg")],
        ..QuerySpec::default()
    };
    assert_agree(&spec, &["alpha", "charlie", "bravo"]);
}

#[test]
fn missing_sort_keys_order_last_descending() {
    let spec = QuerySpec {
        order: vec![SortKey::descending("/mass_kg")],
        ..QuerySpec::default()
    };
    assert_agree(&spec, &["charlie", "alpha", "bravo"]);
}

#[test]
fn null_sort_keys_order_with_missing_ones() {
    let spec = QuerySpec {
        order: vec![SortKey::ascending("/tax_id")],
        ..QuerySpec::default()
    };
    // bravo lacks the field, charlie holds null: both sort after alpha, in
    // id order.
    assert_agree(&spec, &["alpha", "bravo", "charlie"]);
}
