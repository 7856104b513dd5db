// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! FriendCert: one half of a friendship pair.
//!
//! Two owners independently issue certs around a shared 32-byte key
//! (`targetPublicKeys[0]`). Constraint inputs are order-canonicalized by
//! sorting the issuer pair and the key pair, so both halves derive the same
//! hash regardless of who computes it.

use crate::cert::base::{Cert, CertError};
use crate::cert::schema::friend_locks;
use crate::cert::target::TargetValues;
use crate::crypto::hash::{hash_items, Hash32, HashItem};

/// Domain string for the destruction ("achilles") hash.
pub const DESTROY_FRIEND_CERT: &str = "destroy friend cert";

/// The pre-image an owner reveals to destroy every FriendCert tied to `key`.
pub fn destruction_preimage(owner: &[u8], key: &[u8]) -> Hash32 {
    hash_items(&[
        HashItem::Text(DESTROY_FRIEND_CERT),
        HashItem::Bytes(owner),
        HashItem::Bytes(key),
    ])
}

/// The published destruction hash: the double hash of the pre-image inputs.
pub fn destruction_hash(owner: &[u8], key: &[u8]) -> Hash32 {
    let inner = destruction_preimage(owner, key);
    hash_items(&[
        HashItem::Text(DESTROY_FRIEND_CERT),
        HashItem::Bytes(owner),
        HashItem::Bytes(&inner),
    ])
}

pub(crate) fn validate_extra(cert: &Cert) -> Result<(), CertError> {
    if cert.constraints().is_none() {
        return Err(CertError::Validation("FriendCert must carry constraints".into()));
    }
    if cert.owner().is_none() {
        return Err(CertError::Validation("FriendCert must carry an owner".into()));
    }
    if cert.is_indestructible() {
        return Err(CertError::Validation("FriendCert cannot be indestructible".into()));
    }
    Ok(())
}

pub(crate) fn validate_against_target_extra(
    cert: &Cert,
    target: &TargetValues,
) -> Result<(), CertError> {
    // The paired cert's constraints must agree before anything is recomputed.
    let own = cert.constraints().ok_or_else(|| {
        CertError::Validation("FriendCert must carry constraints".into())
    })?;
    match target.other_constraints {
        Some(other) if other == own => Ok(()),
        Some(_) => Err(CertError::Constraints(
            "Paired FriendCert constraints do not match".into(),
        )),
        None => Err(CertError::Constraints(
            "Target supplies no paired FriendCert constraints".into(),
        )),
    }
}

/// Order-canonicalized pair constraints:
/// `Hash(pubLow, pubHigh, targetType, keyLow, keyHigh, level?, intermediary?)`.
pub(crate) fn constraints_on_target(
    cert: &Cert,
    target: &TargetValues,
) -> Result<Option<Hash32>, CertError> {
    let owner = cert
        .owner()
        .ok_or_else(|| CertError::Validation("FriendCert must carry an owner".into()))?;
    let other_issuer = target.other_issuer_public_key.as_deref().ok_or_else(|| {
        CertError::Validation("Target supplies no other-issuer public key".into())
    })?;
    let keys = cert.target_public_keys()?;
    let my_key = keys.first().map(Vec::as_slice).ok_or_else(|| {
        CertError::Validation("FriendCert targetPublicKeys must contain the shared key".into())
    })?;
    let other_key = target
        .other_key
        .as_deref()
        .ok_or_else(|| CertError::Validation("Target supplies no other shared key".into()))?;

    let (pub_low, pub_high) =
        if owner <= other_issuer { (owner, other_issuer) } else { (other_issuer, owner) };
    let (key_low, key_high) =
        if my_key <= other_key { (my_key, other_key) } else { (other_key, my_key) };

    let locked = cert.locked_config();
    let level = if locked & friend_locks::LEVEL != 0 {
        let lvl = target.friend_level.ok_or_else(|| {
            CertError::Validation("FriendCert is locked on level but the target has none".into())
        })?;
        HashItem::UInt(lvl as u64)
    } else {
        HashItem::Absent
    };
    let intermediary = if locked & friend_locks::INTERMEDIARY != 0 {
        let pk = target.intermediary_public_key.as_deref().ok_or_else(|| {
            CertError::Validation(
                "FriendCert is locked on intermediary but the target has none".into(),
            )
        })?;
        HashItem::Bytes(pk)
    } else {
        HashItem::Absent
    };

    let target_type = match cert.target_type() {
        Some(tt) => HashItem::Bytes(tt),
        None => HashItem::Absent,
    };

    Ok(Some(hash_items(&[
        HashItem::Bytes(pub_low),
        HashItem::Bytes(pub_high),
        target_type,
        HashItem::Bytes(key_low),
        HashItem::Bytes(key_high),
        level,
        intermediary,
    ])))
}
