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

//! Certificate construction.
//!
//! The factory populates a cert from a params struct, defaults the owner to
//! the signer's public key, optionally signs, and structurally validates
//! (signatures excluded, since a multi-sig cert may still be collecting
//! them) before handing the cert back.

use crate::cert::base::{Cert, CertError};
use crate::cert::schema::CertKind;
use crate::cert::target::TargetValues;
use crate::crypto::hash::Hash32;
use crate::crypto::keys::KeyPair;

/// Shared cert parameters. `None` leaves the field unset.
#[derive(Clone, Debug, Default)]
pub struct CertParams {
    /// Issuer public key; defaults to the signer's public key.
    pub owner: Option<Vec<u8>>,
    /// Ordered delegate keys.
    pub target_public_keys: Vec<Vec<u8>>,
    /// Required delegate signature count (unset reads as 1).
    pub multi_sig_threshold: Option<u8>,
    /// Validity window start, ms since epoch.
    pub creation_time: u64,
    /// Validity window end, ms since epoch.
    pub expire_time: u64,
    /// Config bitfield.
    pub config: Option<u8>,
    /// Variant lock bitfield.
    pub locked_config: Option<u16>,
    /// Transient config bitfield.
    pub transient_config: Option<u8>,
    /// Embedder model-type prefix.
    pub target_type: Option<Vec<u8>>,
    /// Remaining chain budget.
    pub max_chain_length: Option<u8>,
    /// Cap on the embedder's expire time.
    pub target_max_expire_time: Option<u64>,
    /// Context-binding constraints.
    pub constraints: Option<Hash32>,
    /// Opaque self-spec blob.
    pub dynamic_self_spec: Option<Vec<u8>>,
    /// Embedded cert image bytes.
    pub cert: Option<Vec<u8>>,
}

/// LicenseCert parameters.
#[derive(Clone, Debug, Default)]
pub struct LicenseCertParams {
    /// Shared parameters.
    pub base: CertParams,
    /// Extension ceiling.
    pub max_extensions: Option<u8>,
}

fn populate(
    kind: CertKind,
    params: &CertParams,
    signer_public_key: &[u8],
) -> Result<Cert, CertError> {
    let mut cert = Cert::new(kind)?;

    match (&params.owner, &params.cert) {
        // An embedded cert supplies the signers; no owner then.
        (None, Some(_)) => {}
        (Some(owner), _) => cert.set_owner(owner)?,
        (None, None) => cert.set_owner(signer_public_key)?,
    }
    if !params.target_public_keys.is_empty() {
        cert.set_target_public_keys(&params.target_public_keys)?;
    }
    if let Some(threshold) = params.multi_sig_threshold {
        cert.set_multi_sig_threshold(threshold)?;
    }
    cert.set_creation_time(params.creation_time)?;
    cert.set_expire_time(params.expire_time)?;
    if let Some(bits) = params.config {
        cert.set_config(bits)?;
    }
    if let Some(bits) = params.locked_config {
        cert.set_locked_config(bits)?;
    }
    if let Some(bits) = params.transient_config {
        cert.set_transient_config(bits)?;
    }
    if let Some(prefix) = &params.target_type {
        cert.set_target_type(prefix)?;
    }
    if let Some(budget) = params.max_chain_length {
        cert.set_max_chain_length(budget)?;
    }
    if let Some(cap) = params.target_max_expire_time {
        cert.set_target_max_expire_time(cap)?;
    }
    if let Some(constraints) = &params.constraints {
        cert.set_constraints(constraints)?;
    }
    if let Some(spec) = &params.dynamic_self_spec {
        cert.set_dynamic_self_spec(spec)?;
    }
    if let Some(image) = &params.cert {
        cert.set_embedded_cert_image(image)?;
    }
    Ok(cert)
}

fn finish(mut cert: Cert, keypair: Option<&KeyPair>) -> Result<Cert, CertError> {
    if let Some(kp) = keypair {
        cert.sign(kp)?;
    }
    cert.validate(2, None)?;
    Ok(cert)
}

/// Create a ChainCert (delegation link).
pub fn create_chain_cert(
    params: &CertParams,
    signer_public_key: &[u8],
    keypair: Option<&KeyPair>,
) -> Result<Cert, CertError> {
    finish(populate(CertKind::Chain, params, signer_public_key)?, keypair)
}

/// Create a FriendCert (one half of a friendship pair).
pub fn create_friend_cert(
    params: &CertParams,
    signer_public_key: &[u8],
    keypair: Option<&KeyPair>,
) -> Result<Cert, CertError> {
    finish(populate(CertKind::Friend, params, signer_public_key)?, keypair)
}

/// Create a LicenseCert.
pub fn create_license_cert(
    params: &LicenseCertParams,
    signer_public_key: &[u8],
    keypair: Option<&KeyPair>,
) -> Result<Cert, CertError> {
    let mut cert = populate(CertKind::License, &params.base, signer_public_key)?;
    if let Some(ceiling) = params.max_extensions {
        cert.set_max_extensions(ceiling)?;
    }
    finish(cert, keypair)
}

/// Create a DataCert.
pub fn create_data_cert(
    params: &CertParams,
    signer_public_key: &[u8],
    keypair: Option<&KeyPair>,
) -> Result<Cert, CertError> {
    finish(populate(CertKind::Data, params, signer_public_key)?, keypair)
}

/// Create an AuthCert. Delegation depth is rejected up front.
pub fn create_auth_cert(
    params: &CertParams,
    signer_public_key: &[u8],
    keypair: Option<&KeyPair>,
) -> Result<Cert, CertError> {
    if params.max_chain_length.unwrap_or(0) != 0 {
        return Err(CertError::Validation("AuthCert cannot delegate further".into()));
    }
    finish(populate(CertKind::Auth, params, signer_public_key)?, keypair)
}

/// Load a cert image, resolving the variant from the model type.
pub fn load_cert(image: &[u8]) -> Result<Cert, CertError> {
    Cert::load(image)
}

/// Derive and stamp a cert's constraints from a target context, for issuers
/// that bind a cert before any embedder exists.
pub fn stamp_constraints(cert: &mut Cert, target: &TargetValues) -> Result<(), CertError> {
    let derived = cert.calc_constraints_on_target(target)?.ok_or_else(|| {
        CertError::Constraints("Certificate constraints cannot be derived from the target".into())
    })?;
    cert.set_constraints(&derived)
}

/// Compute the pair constraints a FriendCert would carry, before the cert
/// exists. FriendCerts must be issued with constraints already set, so the
/// issuer derives them from the intended pair context first.
pub fn derive_friend_constraints(
    params: &CertParams,
    signer_public_key: &[u8],
    target: &TargetValues,
) -> Result<Hash32, CertError> {
    let cert = populate(CertKind::Friend, params, signer_public_key)?;
    cert.calc_constraints_on_target(target)?.ok_or_else(|| {
        CertError::Constraints("Certificate constraints cannot be derived from the target".into())
    })
}
