// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use covenant::model::{FieldSpec, FieldType, Model, ModelError};

static SCHEMA: &[FieldSpec] = &[
    FieldSpec::new(1, "seq", FieldType::UInt48BE),
    FieldSpec::new(2, "label", FieldType::String).with_max(8),
    FieldSpec::new(3, "payload", FieldType::Bytes).with_max(16),
    FieldSpec::new(4, "digest", FieldType::Block32),
    FieldSpec::new(5, "note", FieldType::String).with_max(64).transient(),
    FieldSpec::new(6, "scratch", FieldType::Bytes).with_max(8).transient().unhashed(),
    FieldSpec::new(7, "count", FieldType::UInt16LE),
    FieldSpec::new(8, "delta", FieldType::Int24BE),
    FieldSpec::new(9, "total", FieldType::UInt64BE),
];

const MODEL_TYPE: &[u8] = &[0, 7, 0, 1, 0, 0];

fn model() -> Model {
    Model::new(MODEL_TYPE, SCHEMA).expect("model")
}

#[test]
fn model_type_must_be_six_bytes() {
    assert!(matches!(Model::new(&[0, 7, 0, 1, 0], SCHEMA), Err(ModelError::Malformed(_))));
    assert!(matches!(Model::new(&[0, 7, 0, 1, 0, 0, 0], SCHEMA), Err(ModelError::Malformed(_))));
}

#[test]
fn string_at_max_size_roundtrips_and_one_over_fails() {
    let mut m = model();
    m.set_str("label", "12345678").expect("exactly max");
    let image = m.export(false, false).expect("export");

    let mut loaded = model();
    loaded.load(&image, false, false).expect("load");
    assert_eq!(loaded.get_str("label").expect("get"), Some("12345678"));

    assert!(matches!(m.set_str("label", "123456789"), Err(ModelError::OutOfRange(_))));
}

#[test]
fn oversized_length_in_image_is_malformed() {
    let mut image = MODEL_TYPE.to_vec();
    image.push(FieldType::String.tag());
    image.push(2);
    image.extend_from_slice(&9u16.to_be_bytes());
    image.extend_from_slice(b"123456789");

    let mut m = model();
    assert!(matches!(m.load(&image, false, false), Err(ModelError::Malformed(_))));
}

#[test]
fn uint48_boundary() {
    let mut m = model();
    let max = (1i64 << 48) - 1;
    m.set_int("seq", max).expect("max fits");
    let image = m.export(false, false).expect("export");
    let mut loaded = model();
    loaded.load(&image, false, false).expect("load");
    assert_eq!(loaded.get_int("seq").expect("get"), Some(max));

    assert!(matches!(m.set_int("seq", 1i64 << 48), Err(ModelError::OutOfRange(_))));
}

#[test]
fn u64_field_roundtrips() {
    let mut m = model();
    m.set_u64("total", u64::MAX).expect("set");
    let image = m.export(false, false).expect("export");
    let mut loaded = model();
    loaded.load(&image, false, false).expect("load");
    assert_eq!(loaded.get_u64("total").expect("get"), Some(u64::MAX));
}

#[test]
fn header_bit_flip_is_rejected() {
    let mut m = model();
    m.set_int("count", 3).expect("set");
    let mut image = m.export(false, false).expect("export");
    image[1] ^= 0x01;
    let mut loaded = model();
    assert!(matches!(loaded.load(&image, false, false), Err(ModelError::Malformed(_))));
}

#[test]
fn unknown_index_fails_or_skips() {
    let mut image = MODEL_TYPE.to_vec();
    image.push(FieldType::UInt8.tag());
    image.push(99);
    image.push(42);
    image.push(FieldType::UInt16LE.tag());
    image.push(7);
    image.extend_from_slice(&[0x22, 0x11]);

    let mut strict = model();
    assert!(matches!(strict.load(&image, false, false), Err(ModelError::Malformed(_))));

    let mut lenient = model();
    lenient.load(&image, false, true).expect("skip unknown");
    assert_eq!(lenient.get_int("count").expect("get"), Some(0x1122));
}

#[test]
fn unknown_type_tag_is_always_fatal() {
    let mut image = MODEL_TYPE.to_vec();
    image.push(0xee);
    image.push(99);
    let mut m = model();
    assert!(matches!(m.load(&image, false, true), Err(ModelError::Malformed(_))));
}

#[test]
fn duplicate_index_is_rejected_even_out_of_order() {
    let mut image = MODEL_TYPE.to_vec();
    for _ in 0..2 {
        image.push(FieldType::UInt16LE.tag());
        image.push(7);
        image.extend_from_slice(&[1, 0]);
    }
    let mut m = model();
    assert!(matches!(m.load(&image, false, false), Err(ModelError::Malformed(_))));
}

#[test]
fn records_load_in_any_order_and_export_sorted() {
    let mut image = MODEL_TYPE.to_vec();
    // count (index 7) first, then seq (index 1).
    image.push(FieldType::UInt16LE.tag());
    image.push(7);
    image.extend_from_slice(&[0x01, 0x00]);
    image.push(FieldType::UInt48BE.tag());
    image.push(1);
    image.extend_from_slice(&[0, 0, 0, 0, 0, 9]);

    let mut m = model();
    m.load(&image, false, false).expect("load");
    let exported = m.export(false, false).expect("export");

    // Exported records come back ascending by index.
    assert_eq!(exported[6], FieldType::UInt48BE.tag());
    assert_eq!(exported[7], 1);
    assert_eq!(m.get_int("seq").expect("get"), Some(9));
    assert_eq!(m.get_int("count").expect("get"), Some(1));
}

#[test]
fn negative_int_roundtrips_with_sign_extension() {
    let mut m = model();
    m.set_int("delta", -5).expect("set");
    let image = m.export(false, false).expect("export");
    let mut loaded = model();
    loaded.load(&image, false, false).expect("load");
    assert_eq!(loaded.get_int("delta").expect("get"), Some(-5));
}

#[test]
fn block_field_requires_exact_length() {
    let mut m = model();
    assert!(matches!(m.set_bytes("digest", vec![0u8; 31]), Err(ModelError::OutOfRange(_))));
    m.set_bytes("digest", vec![0u8; 32]).expect("exact length");
}

#[test]
fn typed_getters_reject_wrong_types() {
    let m = model();
    assert!(matches!(m.get_str("seq"), Err(ModelError::Schema(_))));
    assert!(matches!(m.get_int("label"), Err(ModelError::Schema(_))));
    let mut m = model();
    assert!(matches!(m.set_int("unknown", 1), Err(ModelError::Schema(_))));
}

#[test]
fn transient_fields_export_and_load_behind_flags() {
    let mut m = model();
    m.set_int("count", 1).expect("set");
    m.set_str("note", "remember").expect("set");
    m.set_bytes("scratch", vec![1, 2, 3]).expect("set");

    let plain = m.export(false, false).expect("export");
    let with_transient = m.export(true, false).expect("export");
    let with_all = m.export(true, true).expect("export");
    assert!(plain.len() < with_transient.len());
    assert!(with_transient.len() < with_all.len());

    // Transient fields in the image are dropped unless preserved.
    let mut dropped = model();
    dropped.load(&with_all, false, false).expect("load");
    assert!(!dropped.has("note"));
    assert!(!dropped.has("scratch"));

    let mut kept = model();
    kept.load(&with_all, true, false).expect("load");
    assert_eq!(kept.get_str("note").expect("get"), Some("remember"));
    assert_eq!(kept.get_bytes("scratch").expect("get"), Some(&[1u8, 2, 3][..]));
}

#[test]
fn content_hash_exclusion_matches_unset() {
    let mut with_payload = model();
    with_payload.set_int("count", 2).expect("set");
    with_payload.set_bytes("payload", vec![9, 9]).expect("set");

    let mut without_payload = model();
    without_payload.set_int("count", 2).expect("set");

    assert_eq!(
        with_payload.content_hash(&["payload"]).expect("hash"),
        without_payload.content_hash(&[]).expect("hash"),
    );
    assert_ne!(
        with_payload.content_hash(&[]).expect("hash"),
        without_payload.content_hash(&[]).expect("hash"),
    );
}

#[test]
fn transient_hash_ignores_persistent_fields() {
    let mut a = model();
    a.set_str("note", "fingerprint").expect("set");
    a.set_int("count", 1).expect("set");

    let mut b = model();
    b.set_str("note", "fingerprint").expect("set");
    b.set_int("count", 999).expect("set");

    assert_eq!(a.transient_hash().expect("hash"), b.transient_hash().expect("hash"));
    assert_ne!(a.content_hash(&[]).expect("hash"), b.content_hash(&[]).expect("hash"));
}
