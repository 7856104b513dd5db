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

//! LicenseCert: authorizes signing licenses, optionally bound to specific
//! license fields through lock bits.

use crate::cert::base::{Cert, CertError};
use crate::cert::locks::{gated_bytes, gated_text, gated_uint};
use crate::cert::schema::license_locks;
use crate::cert::target::TargetValues;
use crate::crypto::hash::{hash_items, Hash32, HashItem};

pub(crate) fn validate_extra(_cert: &Cert) -> Result<(), CertError> {
    Ok(())
}

pub(crate) fn validate_against_target_extra(
    cert: &Cert,
    target: &TargetValues,
) -> Result<(), CertError> {
    if let Some(extensions) = target.extensions {
        if extensions > cert.max_extensions() {
            return Err(CertError::Validation(
                "Target extensions exceed the certificate's maxExtensions".into(),
            ));
        }
    }
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
        gated_bytes(
            locked,
            license_locks::TARGET_PUBLIC_KEY,
            target.target_public_key.as_deref(),
            "targetPublicKey",
        )?,
        gated_uint(
            locked,
            license_locks::LICENSE_CONFIG,
            target.license_config.map(u64::from),
            "licenseConfig",
        )?,
        gated_text(locked, license_locks::TERMS, target.terms.as_deref(), "terms")?,
        gated_uint(
            locked,
            license_locks::EXTENSIONS,
            target.extensions.map(u64::from),
            "extensions",
        )?,
        gated_uint(
            locked,
            license_locks::FRIEND_LEVEL,
            target.friend_level.map(u64::from),
            "friendLevel",
        )?,
        gated_uint(
            locked,
            license_locks::MAX_EXTENSIONS,
            target.max_extensions.map(u64::from),
            "maxExtensions",
        )?,
    ];
    Ok(Some(hash_items(&items)))
}
