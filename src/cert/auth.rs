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

//! AuthCert: presented at handshake to prove the presenter acts under a
//! different identity. Carries no delegation depth, so it can never sit
//! beneath a chain link; it may lock on the presented public key, region,
//! or jurisdiction.

use crate::cert::base::{Cert, CertError};
use crate::cert::locks::{gated_bytes, gated_text};
use crate::cert::schema::auth_locks;
use crate::cert::target::TargetValues;
use crate::crypto::hash::{hash_items, Hash32, HashItem};

pub(crate) fn validate_extra(cert: &Cert) -> Result<(), CertError> {
    if cert.max_chain_length() != 0 {
        return Err(CertError::Validation("AuthCert cannot delegate further".into()));
    }
    Ok(())
}

pub(crate) fn validate_against_target_extra(
    _cert: &Cert,
    _target: &TargetValues,
) -> Result<(), CertError> {
    Ok(())
}

pub(crate) fn constraints_on_target(
    cert: &Cert,
    target: &TargetValues,
) -> Result<Option<Hash32>, CertError> {
    let locked = cert.locked_config();
    let owner = match cert.owner() {
        Some(o) => HashItem::Bytes(o),
        None => HashItem::Absent,
    };
    let target_type = match cert.target_type() {
        Some(tt) => HashItem::Bytes(tt),
        None => HashItem::Absent,
    };
    let items = [
        owner,
        target_type,
        gated_bytes(locked, auth_locks::PUBLIC_KEY, target.public_key.as_deref(), "publicKey")?,
        gated_text(locked, auth_locks::REGION, target.region.as_deref(), "region")?,
        gated_text(
            locked,
            auth_locks::JURISDICTION,
            target.jurisdiction.as_deref(),
            "jurisdiction",
        )?,
    ];
    Ok(Some(hash_items(&items)))
}
