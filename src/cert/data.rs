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

//! DataCert: authorizes signing data nodes, optionally bound to the node's
//! config bits, content type, or user bits through lock bits.

use crate::cert::base::{Cert, CertError};
use crate::cert::locks::{gated_text, gated_uint};
use crate::cert::schema::data_locks;
use crate::cert::target::TargetValues;
use crate::crypto::hash::{hash_items, Hash32, HashItem};

pub(crate) fn validate_extra(_cert: &Cert) -> Result<(), CertError> {
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
        gated_uint(
            locked,
            data_locks::DATA_CONFIG,
            target.data_config.map(u64::from),
            "dataConfig",
        )?,
        gated_text(
            locked,
            data_locks::CONTENT_TYPE,
            target.content_type.as_deref(),
            "contentType",
        )?,
        gated_uint(locked, data_locks::USER_BITS, target.user_bits.map(u64::from), "userBits")?,
    ];
    Ok(Some(hash_items(&items)))
}
