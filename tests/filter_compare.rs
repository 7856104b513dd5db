// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use covenant::crypto::hash::hash_buf;
use covenant::model::filter::matches;
use covenant::model::{CmpOp, FieldSpec, FieldType, Filter, Model, Value};

static SCHEMA: &[FieldSpec] = &[
    FieldSpec::new(1, "id1", FieldType::Block32),
    FieldSpec::new(2, "id2", FieldType::Block32),
    FieldSpec::new(3, "name", FieldType::String).with_max(32),
    FieldSpec::new(4, "blob", FieldType::Bytes).with_max(32),
    FieldSpec::new(5, "flags", FieldType::UInt16BE),
    FieldSpec::new(6, "offset", FieldType::Int32BE),
];

const MODEL_TYPE: &[u8] = &[0, 7, 0, 2, 0, 0];

fn model() -> Model {
    Model::new(MODEL_TYPE, SCHEMA).expect("model")
}

fn filter(field: &str, operator: &str, cmp: CmpOp, value: Option<Value>) -> Filter {
    Filter { field: field.into(), operator: operator.into(), cmp, value }
}

#[test]
fn pseudo_field_id_prefers_id2_then_falls_back() {
    let mut m = model();
    m.set_bytes("id1", vec![1u8; 32]).expect("set");

    let f = filter("id", "", CmpOp::Eq, Some(Value::Bytes(vec![1u8; 32])));
    assert!(matches(&m, &f).expect("matches"));

    m.set_bytes("id2", vec![2u8; 32]).expect("set");
    assert!(!matches(&m, &f).expect("matches"));
    let f2 = filter("id", "", CmpOp::Eq, Some(Value::Bytes(vec![2u8; 32])));
    assert!(matches(&m, &f2).expect("matches"));
}

#[test]
fn hash_operator_hashes_utf8_for_strings() {
    let mut m = model();
    m.set_str("name", "alice").expect("set");
    let expected = hash_buf(b"alice").to_vec();
    assert!(matches(&m, &filter("name", "hash", CmpOp::Eq, Some(Value::Bytes(expected))))
        .expect("matches"));
    assert!(!matches(&m, &filter("name", "hash", CmpOp::Eq, Some(Value::Bytes(vec![0u8; 32]))))
        .expect("matches"));
}

#[test]
fn substring_operator_slices_bytes_and_strings() {
    let mut m = model();
    m.set_bytes("blob", vec![1, 2, 3, 4, 5]).expect("set");
    m.set_str("name", "covenant").expect("set");

    assert!(matches(&m, &filter("blob", ":1,2", CmpOp::Eq, Some(Value::Bytes(vec![2, 3]))))
        .expect("matches"));
    // Negative start counts from the end; omitted length runs to the end.
    assert!(matches(&m, &filter("blob", ":-2", CmpOp::Eq, Some(Value::Bytes(vec![4, 5]))))
        .expect("matches"));
    assert!(matches(&m, &filter("name", ":0,3", CmpOp::Eq, Some(Value::Text("cov".into()))))
        .expect("matches"));
}

#[test]
fn bitwise_operators_mask_to_field_width() {
    let mut m = model();
    m.set_int("flags", 0xff00).expect("set");

    assert!(matches(&m, &filter("flags", "& 0x0f00", CmpOp::Eq, Some(Value::Int(0x0f00))))
        .expect("matches"));
    assert!(matches(&m, &filter("flags", ">> 8", CmpOp::Eq, Some(Value::Int(0xff))))
        .expect("matches"));
    // Shifting out of a 16-bit field leaves nothing behind.
    assert!(matches(&m, &filter("flags", "<< 8", CmpOp::Eq, Some(Value::Int(0))))
        .expect("matches"));
}

#[test]
fn bitwise_operator_rejects_signed_fields() {
    let mut m = model();
    m.set_int("offset", 12).expect("set");
    assert!(matches(&m, &filter("offset", "& 1", CmpOp::Eq, Some(Value::Int(0)))).is_err());
}

#[test]
fn undefined_semantics() {
    let m = model();

    // undefined == undefined holds for EQ only.
    assert!(matches(&m, &filter("name", "", CmpOp::Eq, None)).expect("matches"));
    assert!(!matches(&m, &filter("name", "", CmpOp::Ne, None)).expect("matches"));
    assert!(!matches(&m, &filter("name", "", CmpOp::Le, None)).expect("matches"));

    // Asymmetric undefined yields only NE.
    let some = Some(Value::Text("x".into()));
    assert!(!matches(&m, &filter("name", "", CmpOp::Eq, some.clone())).expect("matches"));
    assert!(matches(&m, &filter("name", "", CmpOp::Ne, some)).expect("matches"));

    // Operations on undefined yield only NE.
    assert!(matches(&m, &filter("name", "hash", CmpOp::Ne, None)).expect("matches"));
    assert!(!matches(&m, &filter("name", "hash", CmpOp::Eq, None)).expect("matches"));
}

#[test]
fn numeric_ordering_respects_signedness() {
    let mut m = model();
    m.set_int("offset", -5).expect("set");
    assert!(matches(&m, &filter("offset", "", CmpOp::Lt, Some(Value::Int(3)))).expect("matches"));
    assert!(matches(&m, &filter("offset", "", CmpOp::Ge, Some(Value::Int(-5)))).expect("matches"));
}

#[test]
fn mismatched_value_families_only_differ() {
    let mut m = model();
    m.set_str("name", "alice").expect("set");
    assert!(matches(&m, &filter("name", "", CmpOp::Ne, Some(Value::Int(1)))).expect("matches"));
    assert!(!matches(&m, &filter("name", "", CmpOp::Eq, Some(Value::Int(1)))).expect("matches"));
}

#[test]
fn unknown_field_is_a_schema_violation() {
    let m = model();
    assert!(matches(&m, &filter("nope", "", CmpOp::Eq, None)).is_err());
}
