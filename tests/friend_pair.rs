// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use covenant::cert::factory::derive_friend_constraints;
use covenant::cert::schema::{config, friend_locks};
use covenant::cert::{create_friend_cert, friend, Cert, CertError, CertParams, TargetValues};
use covenant::crypto::keys::KeyPair;

fn keypair(seed: u8) -> KeyPair {
    KeyPair::ed25519_from_seed(&[seed; 32]).expect("keypair")
}

struct PairSide {
    owner: KeyPair,
    key: Vec<u8>,
}

fn pair_context(other: &PairSide, friend_level: Option<u8>) -> TargetValues {
    TargetValues {
        other_issuer_public_key: Some(other.owner.public_key().to_vec()),
        other_key: Some(other.key.clone()),
        friend_level,
        ..TargetValues::default()
    }
}

fn issue(
    side: &PairSide,
    other: &PairSide,
    target_type: Option<Vec<u8>>,
    locked_config: Option<u16>,
    friend_level: Option<u8>,
) -> Result<Cert, CertError> {
    let params = CertParams {
        target_public_keys: vec![side.key.clone()],
        creation_time: 10,
        expire_time: 1000,
        target_type,
        locked_config,
        ..CertParams::default()
    };
    let constraints = derive_friend_constraints(
        &params,
        side.owner.public_key(),
        &pair_context(other, friend_level),
    )?;
    let params = CertParams { constraints: Some(constraints), ..params };
    create_friend_cert(&params, side.owner.public_key(), Some(&side.owner))
}

fn sides() -> (PairSide, PairSide) {
    let a = PairSide { owner: keypair(31), key: keypair(32).public_key().to_vec() };
    let b = PairSide { owner: keypair(33), key: keypair(34).public_key().to_vec() };
    (a, b)
}

#[test]
fn independently_issued_pair_derives_identical_constraints() {
    let (a, b) = sides();
    let cert_a = issue(&a, &b, None, None, None).expect("A's cert");
    let cert_b = issue(&b, &a, None, None, None).expect("B's cert");

    assert_eq!(cert_a.constraints(), cert_b.constraints());
    assert!(cert_a.constraints().is_some());
    assert!(cert_a.verify());
    assert!(cert_b.verify());
}

#[test]
fn target_type_change_breaks_the_match() {
    let (a, b) = sides();
    let cert_a = issue(&a, &b, None, None, None).expect("A's cert");
    let cert_b = issue(&b, &a, Some(vec![0, 3]), None, None).expect("B's cert");
    assert_ne!(cert_a.constraints(), cert_b.constraints());
}

#[test]
fn constraint_inputs_are_order_canonicalized() {
    let (a, b) = sides();
    let params_a = CertParams {
        target_public_keys: vec![a.key.clone()],
        creation_time: 10,
        expire_time: 1000,
        ..CertParams::default()
    };
    let params_b = CertParams { target_public_keys: vec![b.key.clone()], ..params_a.clone() };

    let from_a = derive_friend_constraints(&params_a, a.owner.public_key(), &pair_context(&b, None))
        .expect("derive");
    let from_b = derive_friend_constraints(&params_b, b.owner.public_key(), &pair_context(&a, None))
        .expect("derive");
    assert_eq!(from_a, from_b);
}

#[test]
fn friend_cert_validates_against_a_license_target() {
    let (a, b) = sides();
    let cert_a = issue(&a, &b, None, None, None).expect("A's cert");
    let cert_b = issue(&b, &a, None, None, None).expect("B's cert");

    let target = TargetValues {
        creation_time: 40,
        expire_time: 700,
        model_type: [0, 3, 0, 2, 0, 0],
        signing_public_keys: vec![a.key.clone()],
        other_issuer_public_key: Some(b.owner.public_key().to_vec()),
        other_key: Some(b.key.clone()),
        other_constraints: cert_b.constraints(),
        ..TargetValues::default()
    };
    cert_a.validate_against_target(&target).expect("validates");

    // A mismatched paired cert is a constraints failure.
    let mut poisoned = target.clone();
    poisoned.other_constraints = Some([0u8; 32]);
    assert!(matches!(
        cert_a.validate_against_target(&poisoned),
        Err(CertError::Constraints(_))
    ));

    // Dropping the pair context makes the constraints unverifiable.
    let mut missing = target.clone();
    missing.other_constraints = None;
    assert!(matches!(
        cert_a.validate_against_target(&missing),
        Err(CertError::Constraints(_))
    ));
}

#[test]
fn locked_level_feeds_the_constraint_hash() {
    let (a, b) = sides();
    let locked = Some(friend_locks::LEVEL);
    let cert_a = issue(&a, &b, None, locked, Some(3)).expect("A's cert");
    let cert_b = issue(&b, &a, None, locked, Some(3)).expect("B's cert");
    assert_eq!(cert_a.constraints(), cert_b.constraints());

    // A different level on one side diverges.
    let cert_b4 = issue(&b, &a, None, locked, Some(4)).expect("B's cert");
    assert_ne!(cert_a.constraints(), cert_b4.constraints());

    // Locked without a level in the unlocked variant also diverges.
    let unlocked = issue(&b, &a, None, None, None).expect("B's cert");
    assert_ne!(cert_a.constraints(), unlocked.constraints());
}

#[test]
fn friend_cert_requires_constraints_and_destructibility() {
    let (a, b) = sides();

    let bare = CertParams {
        target_public_keys: vec![a.key.clone()],
        creation_time: 10,
        expire_time: 1000,
        ..CertParams::default()
    };
    assert!(matches!(
        create_friend_cert(&bare, a.owner.public_key(), Some(&a.owner)),
        Err(CertError::Validation(_))
    ));

    let constraints = derive_friend_constraints(&bare, a.owner.public_key(), &pair_context(&b, None))
        .expect("derive");
    let indestructible = CertParams {
        constraints: Some(constraints),
        config: Some(config::IS_INDESTRUCTIBLE),
        ..bare
    };
    assert!(matches!(
        create_friend_cert(&indestructible, a.owner.public_key(), Some(&a.owner)),
        Err(CertError::Validation(_))
    ));
}

#[test]
fn destruction_hash_is_published_and_reproducible() {
    let (a, b) = sides();
    let cert_a = issue(&a, &b, None, None, None).expect("A's cert");

    let published = cert_a.destruction_hash().expect("hash").expect("friend certs have one");
    assert_eq!(published, friend::destruction_hash(a.owner.public_key(), &a.key));

    // The revealable pre-image commits to the published hash.
    let preimage = friend::destruction_preimage(a.owner.public_key(), &a.key);
    assert_ne!(preimage, published);
}
