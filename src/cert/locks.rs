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

//! Lock-bit gating for constraint hashes.
//!
//! A set lock bit feeds the corresponding target value into the constraint
//! hash and makes that value mandatory; an unset bit feeds the absent
//! marker instead.

use crate::cert::base::CertError;
use crate::crypto::hash::HashItem;

fn missing(what: &str) -> CertError {
    CertError::Validation(format!(
        "Certificate is locked on {} but the target has none",
        what
    ))
}

pub(crate) fn gated_bytes<'a>(
    locked: u16,
    bit: u16,
    v: Option<&'a [u8]>,
    what: &str,
) -> Result<HashItem<'a>, CertError> {
    if locked & bit == 0 {
        return Ok(HashItem::Absent);
    }
    v.map(HashItem::Bytes).ok_or_else(|| missing(what))
}

pub(crate) fn gated_text<'a>(
    locked: u16,
    bit: u16,
    v: Option<&'a str>,
    what: &str,
) -> Result<HashItem<'a>, CertError> {
    if locked & bit == 0 {
        return Ok(HashItem::Absent);
    }
    v.map(HashItem::Text).ok_or_else(|| missing(what))
}

pub(crate) fn gated_uint(
    locked: u16,
    bit: u16,
    v: Option<u64>,
    what: &str,
) -> Result<HashItem<'static>, CertError> {
    if locked & bit == 0 {
        return Ok(HashItem::Absent);
    }
    v.map(HashItem::UInt).ok_or_else(|| missing(what))
}
