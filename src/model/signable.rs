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

//! Signature slots for signable models.
//!
//! Signatures live in a single BYTES field as repeated slots:
//!
//! ```text
//! signer  : u8   index into the eligible key list
//! scheme  : u8   (1 Ed25519, 2 Ethereum-secp256k1)
//! sig_len : u8
//! sig     : sig_len bytes
//! ```
//!
//! A slot names its signer by index rather than repeating the key: the
//! eligible list (the owner, or an embedded cert's target keys) is already
//! part of the signed data, so the index pins the key while keeping slots
//! compact and making eligibility structural. Slot order is append order
//! and is preserved across export/load. The self hash of a signable model
//! excludes the signatures field, so adding a signature never invalidates
//! earlier ones.

use crate::crypto::hash::Hash32;
use crate::crypto::keys::CryptoScheme;
use crate::model::codec::{Model, ModelError};

/// Name of the signature slot field in signable schemas.
pub const SIGNATURES_FIELD: &str = "signatures";

/// One signature slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureSlot {
    /// Index of the signer in the eligible key list.
    pub signer: u8,
    /// Scheme used for this slot.
    pub scheme: CryptoScheme,
    /// Signature bytes.
    pub signature: Vec<u8>,
}

/// Pack signature slots into the field payload.
pub fn encode_signatures(slots: &[SignatureSlot]) -> Vec<u8> {
    let mut out = Vec::with_capacity(slots.iter().map(|s| 3 + s.signature.len()).sum());
    for slot in slots {
        out.push(slot.signer);
        out.push(slot.scheme.to_u8());
        out.push(slot.signature.len() as u8);
        out.extend_from_slice(&slot.signature);
    }
    out
}

/// Unpack signature slots from the field payload.
pub fn decode_signatures(raw: &[u8]) -> Result<Vec<SignatureSlot>, ModelError> {
    let mut slots = Vec::new();
    let mut pos = 0usize;
    while pos < raw.len() {
        if raw.len() - pos < 3 {
            return Err(ModelError::Malformed("truncated signature slot".into()));
        }
        let signer = raw[pos];
        let scheme = CryptoScheme::from_u8(raw[pos + 1]).ok_or_else(|| {
            ModelError::Malformed(format!("unknown signature scheme {}", raw[pos + 1]))
        })?;
        let sig_len = raw[pos + 2] as usize;
        pos += 3;
        if raw.len() - pos < sig_len {
            return Err(ModelError::Malformed("truncated signature slot".into()));
        }
        let signature = raw[pos..pos + sig_len].to_vec();
        pos += sig_len;
        slots.push(SignatureSlot { signer, scheme, signature });
    }
    Ok(slots)
}

/// Self hash of a signable model: the content hash minus the signatures
/// field and any caller-configured exclusions.
pub fn self_hash(model: &Model, extra_exclude: &[&str]) -> Result<Hash32, ModelError> {
    let mut exclude = Vec::with_capacity(1 + extra_exclude.len());
    exclude.push(SIGNATURES_FIELD);
    exclude.extend_from_slice(extra_exclude);
    model.content_hash(&exclude)
}
