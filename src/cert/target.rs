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

//! The embedder's values, carried into `validate_against_target`.

use crate::cert::base::{Cert, CertError};
use crate::crypto::hash::Hash32;
use crate::model::codec::MODEL_TYPE_LEN;

/// Values an embedder (outer cert, node, or handshake) supplies when
/// validating an embedded certificate. Lock-relevant values are optional:
/// a variant only reads the ones its lock bits name.
#[derive(Clone, Debug, Default)]
pub struct TargetValues {
    /// Embedder creation time, ms since epoch.
    pub creation_time: u64,
    /// Embedder expire time, ms since epoch.
    pub expire_time: u64,
    /// Embedder model type.
    pub model_type: [u8; MODEL_TYPE_LEN],
    /// Embedder chain budget. `None` for embedders that are not chain links
    /// (nodes, handshakes); those skip the strict-descent check.
    pub max_chain_length: Option<u8>,
    /// Public keys that signed the embedder.
    pub signing_public_keys: Vec<Vec<u8>>,
    /// Embedder constraints, when it carries any.
    pub constraints: Option<Hash32>,

    /// Friend level (FriendCert pair context).
    pub friend_level: Option<u8>,
    /// Intermediary public key (FriendCert pair context).
    pub intermediary_public_key: Option<Vec<u8>>,
    /// The other issuer's public key (FriendCert pair context).
    pub other_issuer_public_key: Option<Vec<u8>>,
    /// The other cert's shared key (FriendCert pair context).
    pub other_key: Option<Vec<u8>>,
    /// The other cert's constraints (FriendCert pair context).
    pub other_constraints: Option<Hash32>,

    /// Embedding license's target public key.
    pub target_public_key: Option<Vec<u8>>,
    /// Embedding license's config bits.
    pub license_config: Option<u16>,
    /// Embedding license's terms.
    pub terms: Option<String>,
    /// Embedding license's extension count.
    pub extensions: Option<u8>,
    /// Embedding license's extension ceiling.
    pub max_extensions: Option<u8>,

    /// Embedding data node's config bits.
    pub data_config: Option<u16>,
    /// Embedding data node's content type.
    pub content_type: Option<String>,
    /// Embedding data node's user bits.
    pub user_bits: Option<u32>,

    /// Presented public key (handshake context).
    pub public_key: Option<Vec<u8>>,
    /// Presented region (handshake context).
    pub region: Option<String>,
    /// Presented jurisdiction (handshake context).
    pub jurisdiction: Option<String>,
}

impl TargetValues {
    /// Build the target view of a certificate, used when walking into its
    /// embedded certificate.
    pub fn from_cert(cert: &Cert) -> Result<Self, CertError> {
        let creation_time = cert.creation_time().ok_or_else(|| {
            CertError::Validation("Certificate is missing creationTime".into())
        })?;
        let expire_time = cert
            .expire_time()
            .ok_or_else(|| CertError::Validation("Certificate is missing expireTime".into()))?;
        let signing_public_keys =
            cert.signatures()?.into_iter().map(|e| e.public_key).collect();
        Ok(Self {
            creation_time,
            expire_time,
            model_type: *cert.model().model_type(),
            max_chain_length: Some(cert.max_chain_length()),
            signing_public_keys,
            constraints: cert.constraints(),
            ..Self::default()
        })
    }
}
