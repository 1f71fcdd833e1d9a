use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;
use wastetrack_types::{EntityId, HandleId};

// ── EntityId ──────────────────────────────────────────────────────

#[test]
fn entity_id_raw_roundtrip() {
    let id = EntityId::from_raw(42);
    assert_eq!(id.raw(), 42);
}

#[test]
fn entity_id_temporary_is_negative() {
    assert!(EntityId::from_raw(-1).is_temporary());
    assert!(!EntityId::from_raw(1).is_temporary());
    assert!(!EntityId::from_raw(0).is_temporary());
}

#[test]
fn entity_id_display_roundtrip() {
    let id = EntityId::from_raw(7);
    let parsed: EntityId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn entity_id_from_str_invalid() {
    assert!(EntityId::from_str("not-a-number").is_err());
}

#[test]
fn entity_id_serde_is_transparent() {
    let id = EntityId::from_raw(99);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "99");
    let parsed: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn entity_id_ordering_follows_raw() {
    assert!(EntityId::from_raw(1) < EntityId::from_raw(2));
}

proptest! {
    #[test]
    fn entity_id_parse_roundtrip(raw in any::<i64>()) {
        let id = EntityId::from_raw(raw);
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        prop_assert_eq!(id, parsed);
    }

    #[test]
    fn entity_id_temporary_iff_negative(raw in any::<i64>()) {
        prop_assert_eq!(EntityId::from_raw(raw).is_temporary(), raw < 0);
    }
}

// ── HandleId ──────────────────────────────────────────────────────

#[test]
fn handle_id_new_is_unique() {
    let a = HandleId::new();
    let b = HandleId::new();
    assert_ne!(a, b);
}

#[test]
fn handle_id_default_unique() {
    assert_ne!(HandleId::default(), HandleId::default());
}

#[test]
fn handle_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = HandleId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn handle_id_hash_eq() {
    let id = HandleId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn handle_id_serde_roundtrip() {
    let id = HandleId::new();
    let json = serde_json::to_string(&id).unwrap();
    let parsed: HandleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}
