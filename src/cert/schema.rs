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

//! Certificate schemas and the model-type registry.
//!
//! Model types are `[0, primary, 0, secondary, 0, 0]`. Primary ids:
//! ChainCert 1, DefaultCert 2, NodeCert 3, AuthCert 4; secondary ids are
//! assigned per variant. Byte-prefix truncation of a model type acts as a
//! wildcard for `targetType`.
//!
//! Base fields occupy indices 1..=15; variants add fields at 30 and up.
//! Indices are append-only and never repurposed.

use crate::model::field::{FieldSpec, FieldType};

/// Maximum nesting depth of embedded certificates.
pub const MAX_EMBED_DEPTH: usize = 4;

/// Base field names.
pub mod fields {
    /// Issuer public key (absent when an embedded cert supplies signers).
    pub const OWNER: &str = "owner";
    /// Ordered delegate keys.
    pub const TARGET_PUBLIC_KEYS: &str = "targetPublicKeys";
    /// Config bitfield.
    pub const CONFIG: &str = "config";
    /// Variant-specific lock bitfield.
    pub const LOCKED_CONFIG: &str = "lockedConfig";
    /// Validity window start, ms since epoch.
    pub const CREATION_TIME: &str = "creationTime";
    /// Validity window end, ms since epoch.
    pub const EXPIRE_TIME: &str = "expireTime";
    /// Signature slots.
    pub const SIGNATURES: &str = "signatures";
    /// Context-binding hash.
    pub const CONSTRAINTS: &str = "constraints";
    /// Embedded certificate image.
    pub const CERT: &str = "cert";
    /// Required number of delegate signatures on the embedder.
    pub const MULTI_SIG_THRESHOLD: &str = "multiSigThreshold";
    /// Model-type prefix the embedder must match.
    pub const TARGET_TYPE: &str = "targetType";
    /// Remaining chain budget.
    pub const MAX_CHAIN_LENGTH: &str = "maxChainLength";
    /// Cap on the embedder's expire time.
    pub const TARGET_MAX_EXPIRE_TIME: &str = "targetMaxExpireTime";
    /// Opaque blob folded into the self hash when `hasDynamicSelf` is set.
    pub const DYNAMIC_SELF_SPEC: &str = "dynamicSelfSpec";
    /// Transient config bitfield.
    pub const TRANSIENT_CONFIG: &str = "transientConfig";
    /// LicenseCert: maximum number of license extensions.
    pub const MAX_EXTENSIONS: &str = "maxExtensions";
}

/// Config bitfield bits.
pub mod config {
    /// Include `dynamicSelfSpec` in the self hash.
    pub const HAS_DYNAMIC_SELF: u8 = 0x01;
    /// The embedded cert's signatures cover the outer cert's data.
    pub const HAS_DYNAMIC_CERT: u8 = 0x02;
    /// No destruction hash exists for this cert.
    pub const IS_INDESTRUCTIBLE: u8 = 0x04;
}

/// FriendCert lock bits.
pub mod friend_locks {
    /// Bind the constraints to the friend level.
    pub const LEVEL: u16 = 0x0001;
    /// Bind the constraints to an intermediary public key.
    pub const INTERMEDIARY: u16 = 0x0002;
}

/// LicenseCert lock bits, in constraint-input order.
pub mod license_locks {
    #![allow(missing_docs)]
    pub const TARGET_PUBLIC_KEY: u16 = 0x0001;
    pub const LICENSE_CONFIG: u16 = 0x0002;
    pub const TERMS: u16 = 0x0004;
    pub const EXTENSIONS: u16 = 0x0008;
    pub const FRIEND_LEVEL: u16 = 0x0010;
    pub const MAX_EXTENSIONS: u16 = 0x0020;
}

/// DataCert lock bits, in constraint-input order.
pub mod data_locks {
    #![allow(missing_docs)]
    pub const DATA_CONFIG: u16 = 0x0001;
    pub const CONTENT_TYPE: u16 = 0x0002;
    pub const USER_BITS: u16 = 0x0004;
}

/// AuthCert lock bits, in constraint-input order.
pub mod auth_locks {
    #![allow(missing_docs)]
    pub const PUBLIC_KEY: u16 = 0x0001;
    pub const REGION: u16 = 0x0002;
    pub const JURISDICTION: u16 = 0x0004;
}

macro_rules! cert_schema {
    ($($extra:expr),* $(,)?) => {
        &[
            FieldSpec::new(1, fields::OWNER, FieldType::Block32),
            FieldSpec::new(2, fields::TARGET_PUBLIC_KEYS, FieldType::Bytes).with_max(4096),
            FieldSpec::new(3, fields::CONFIG, FieldType::UInt8),
            FieldSpec::new(4, fields::LOCKED_CONFIG, FieldType::UInt16BE),
            FieldSpec::new(5, fields::CREATION_TIME, FieldType::UInt48BE),
            FieldSpec::new(6, fields::EXPIRE_TIME, FieldType::UInt48BE),
            FieldSpec::new(7, fields::SIGNATURES, FieldType::Bytes).with_max(8192),
            FieldSpec::new(8, fields::CONSTRAINTS, FieldType::Block32),
            FieldSpec::new(9, fields::CERT, FieldType::Bytes).with_max(65535),
            FieldSpec::new(10, fields::MULTI_SIG_THRESHOLD, FieldType::UInt8),
            FieldSpec::new(11, fields::TARGET_TYPE, FieldType::Bytes).with_max(6),
            FieldSpec::new(12, fields::MAX_CHAIN_LENGTH, FieldType::UInt8),
            FieldSpec::new(13, fields::TARGET_MAX_EXPIRE_TIME, FieldType::UInt48BE),
            FieldSpec::new(14, fields::DYNAMIC_SELF_SPEC, FieldType::Bytes).with_max(1024),
            FieldSpec::new(15, fields::TRANSIENT_CONFIG, FieldType::UInt8).transient(),
            $($extra),*
        ]
    };
}

/// ChainCert schema: the base fields only.
pub static CHAIN_SCHEMA: &[FieldSpec] = cert_schema![];
/// FriendCert schema: the base fields only (the shared key is
/// `targetPublicKeys[0]`; pair context arrives at validation time).
pub static FRIEND_SCHEMA: &[FieldSpec] = cert_schema![];
/// LicenseCert schema.
pub static LICENSE_SCHEMA: &[FieldSpec] =
    cert_schema![FieldSpec::new(30, fields::MAX_EXTENSIONS, FieldType::UInt8)];
/// DataCert schema: the base fields only.
pub static DATA_SCHEMA: &[FieldSpec] = cert_schema![];
/// AuthCert schema: the base fields only.
pub static AUTH_SCHEMA: &[FieldSpec] = cert_schema![];

/// Certificate variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CertKind {
    /// Delegation link.
    Chain,
    /// Friendship pair cert (DefaultCert/2).
    Friend,
    /// License-signing cert (NodeCert/2).
    License,
    /// Data-signing cert (NodeCert/1).
    Data,
    /// Handshake identity cert (AuthCert/1).
    Auth,
}

impl CertKind {
    /// The variant's 6-byte model type.
    pub fn model_type(self) -> &'static [u8; 6] {
        match self {
            CertKind::Chain => &[0, 1, 0, 0, 0, 0],
            CertKind::Friend => &[0, 2, 0, 2, 0, 0],
            CertKind::Data => &[0, 3, 0, 1, 0, 0],
            CertKind::License => &[0, 3, 0, 2, 0, 0],
            CertKind::Auth => &[0, 4, 0, 1, 0, 0],
        }
    }

    /// The variant's field schema.
    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            CertKind::Chain => CHAIN_SCHEMA,
            CertKind::Friend => FRIEND_SCHEMA,
            CertKind::License => LICENSE_SCHEMA,
            CertKind::Data => DATA_SCHEMA,
            CertKind::Auth => AUTH_SCHEMA,
        }
    }

    /// Resolve a 6-byte model type to a variant.
    pub fn from_model_type(mt: &[u8]) -> Option<Self> {
        [CertKind::Chain, CertKind::Friend, CertKind::License, CertKind::Data, CertKind::Auth]
            .into_iter()
            .find(|k| k.model_type().as_slice() == mt)
    }

    /// Human-readable variant name.
    pub fn name(self) -> &'static str {
        match self {
            CertKind::Chain => "ChainCert",
            CertKind::Friend => "FriendCert",
            CertKind::License => "LicenseCert",
            CertKind::Data => "DataCert",
            CertKind::Auth => "AuthCert",
        }
    }
}
