// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use covenant::cert::factory::derive_friend_constraints;
use covenant::cert::{
    create_chain_cert, create_data_cert, create_friend_cert, Cert, CertParams, TargetValues,
};
use covenant::crypto::keys::KeyPair;

fn keypair(seed: u8) -> KeyPair {
    KeyPair::ed25519_from_seed(&[seed; 32]).expect("keypair")
}

/// FriendCert embedding a ChainCert embedding a ChainCert, fully signed.
fn three_deep_stack() -> (Cert, TargetValues) {
    let root_owner = keypair(21);
    let mid_signer = keypair(22);
    let leaf_signer = keypair(23);
    let friend_owner = keypair(24);
    let shared_key = keypair(25).public_key().to_vec();
    let other_owner = keypair(26);
    let other_key = keypair(27).public_key().to_vec();

    let inner_chain = create_chain_cert(
        &CertParams {
            target_public_keys: vec![mid_signer.public_key().to_vec()],
            max_chain_length: Some(3),
            creation_time: 10,
            expire_time: 1000,
            ..CertParams::default()
        },
        root_owner.public_key(),
        Some(&root_owner),
    )
    .expect("inner chain");

    let outer_chain = create_chain_cert(
        &CertParams {
            target_public_keys: vec![leaf_signer.public_key().to_vec()],
            max_chain_length: Some(2),
            creation_time: 20,
            expire_time: 900,
            cert: Some(inner_chain.export().expect("export")),
            ..CertParams::default()
        },
        mid_signer.public_key(),
        Some(&mid_signer),
    )
    .expect("outer chain");

    let friend_params = CertParams {
        owner: Some(friend_owner.public_key().to_vec()),
        target_public_keys: vec![shared_key.clone()],
        max_chain_length: Some(1),
        creation_time: 30,
        expire_time: 800,
        cert: Some(outer_chain.export().expect("export")),
        ..CertParams::default()
    };
    let pair_context = TargetValues {
        other_issuer_public_key: Some(other_owner.public_key().to_vec()),
        other_key: Some(other_key.clone()),
        ..TargetValues::default()
    };
    let constraints =
        derive_friend_constraints(&friend_params, friend_owner.public_key(), &pair_context)
            .expect("derive");
    let friend_params = CertParams { constraints: Some(constraints), ..friend_params };
    let friend = create_friend_cert(&friend_params, friend_owner.public_key(), Some(&leaf_signer))
        .expect("friend cert");

    let license_target = TargetValues {
        creation_time: 40,
        expire_time: 700,
        model_type: [0, 3, 0, 2, 0, 0],
        signing_public_keys: vec![shared_key],
        other_issuer_public_key: Some(other_owner.public_key().to_vec()),
        other_key: Some(other_key),
        other_constraints: Some(constraints),
        ..TargetValues::default()
    };
    (friend, license_target)
}

#[test]
fn three_deep_stack_roundtrips_byte_for_byte() {
    let (cert, _) = three_deep_stack();
    let image = cert.export().expect("export");
    let loaded = Cert::load(&image).expect("load");
    assert_eq!(loaded.export().expect("export"), image);
    assert_eq!(loaded.calc_id1().expect("id"), cert.calc_id1().expect("id"));
}

#[test]
fn three_deep_stack_verifies_and_walks() {
    let (cert, license_target) = three_deep_stack();
    assert!(cert.verify());
    cert.validate(0, Some(500)).expect("structure and signatures");
    cert.validate_against_target(&license_target).expect("chain walk");
}

#[test]
fn chain_walk_rejects_budget_inversion_between_links() {
    let (cert, mut license_target) = three_deep_stack();
    // A chain-link target with a budget equal to the friend cert's own.
    license_target.max_chain_length = Some(1);
    assert!(cert.validate_against_target(&license_target).is_err());
}

#[test]
fn id_is_stable_under_signature_insertion_order() {
    let owner = keypair(9);
    let k1 = keypair(11);
    let k1b = keypair(12);

    let chain = create_chain_cert(
        &CertParams {
            target_public_keys: vec![k1.public_key().to_vec(), k1b.public_key().to_vec()],
            multi_sig_threshold: Some(2),
            max_chain_length: Some(2),
            creation_time: 10,
            expire_time: 1000,
            ..CertParams::default()
        },
        owner.public_key(),
        Some(&owner),
    )
    .expect("chain");

    let params = CertParams {
        target_public_keys: vec![keypair(14).public_key().to_vec()],
        creation_time: 20,
        expire_time: 500,
        cert: Some(chain.export().expect("export")),
        ..CertParams::default()
    };

    let mut first = create_data_cert(&params, k1.public_key(), Some(&k1)).expect("data cert");
    first.sign(&k1b).expect("second signature");

    let mut second = create_data_cert(&params, k1b.public_key(), Some(&k1b)).expect("data cert");
    second.sign(&k1).expect("second signature");

    assert!(first.verify());
    assert!(second.verify());
    // The wire images preserve insertion order and so differ...
    assert_ne!(first.export().expect("export"), second.export().expect("export"));
    // ...while the identifier does not depend on it.
    assert_eq!(first.calc_id1().expect("id"), second.calc_id1().expect("id"));
}
