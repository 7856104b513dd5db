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

//! The certificate value type.
//!
//! A `Cert` is a signable model with a variant discriminant. Variant rules
//! (constraint hashing, extra validation) dispatch by pattern match; the
//! shared fields, signing, verification, and the chain walk live here.
//!
//! A cert without an embedded cert is signed by its owner. A cert with an
//! embedded cert is signed by the embedded cert's target keys, exactly its
//! `multiSigThreshold` of them. Certs are immutable once signed: the self
//! hash covers everything except the signature slots, so any other mutation
//! invalidates existing signatures.
//!
//! Public keys are stored uniformly as 32-byte values: Ed25519 keys
//! natively, Ethereum signers as their 20-byte address left-padded with 12
//! zero bytes (the slot's scheme byte says how to read the key back).

use crate::cert::schema::{config, fields, CertKind, MAX_EMBED_DEPTH};
use crate::cert::target::TargetValues;
use crate::cert::{auth, chain, data, friend, license};
use crate::crypto::hash::{hash_buf, Hash32};
use crate::crypto::keys::{self, CryptoError, CryptoScheme, KeyPair};
use crate::model::codec::{Model, ModelError, MODEL_TYPE_LEN};
use crate::model::signable::{self_hash as signable_hash, decode_signatures, encode_signatures, SignatureSlot};
use std::collections::BTreeSet;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

/// Certificate errors.
#[derive(Debug, Error)]
pub enum CertError {
    /// Codec-level failure (malformed image, out-of-range value, schema).
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Crypto-level failure (key material, signing).
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// A structural, temporal, or chain-walk rule failed.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Missing, extra, invalid, duplicate, or ineligible signature.
    #[error("signature failure: {0}")]
    Signature(String),
    /// Constraints disagree; the caller may retry with corrected context.
    #[error("constraints mismatch: {0}")]
    Constraints(String),
}

/// Width of every stored public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Canonicalize a public key to its 32-byte stored form. Ed25519 keys pass
/// through; 20-byte Ethereum addresses are left-padded with zero bytes.
pub(crate) fn canonical_public_key(pk: &[u8]) -> Result<Vec<u8>, CertError> {
    match pk.len() {
        PUBLIC_KEY_LEN => Ok(pk.to_vec()),
        20 => {
            let mut out = vec![0u8; PUBLIC_KEY_LEN - 20];
            out.extend_from_slice(pk);
            Ok(out)
        }
        n => Err(CertError::Validation(format!(
            "public keys must be 32 bytes or 20-byte addresses, got {}",
            n
        ))),
    }
}

/// View a stored key the way a slot's scheme reads it, or `None` when the
/// key and scheme disagree.
fn scheme_key(scheme: CryptoScheme, key: &[u8]) -> Option<&[u8]> {
    match scheme {
        CryptoScheme::Ed25519 => (key.len() == PUBLIC_KEY_LEN).then_some(key),
        CryptoScheme::EthSecp256k1 => {
            (key.len() == PUBLIC_KEY_LEN && key[..12].iter().all(|b| *b == 0))
                .then(|| &key[12..])
        }
    }
}

/// Encode an ordered key list: canonical 32-byte keys, concatenated.
pub(crate) fn encode_key_list(keys: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(keys.len() * PUBLIC_KEY_LEN);
    for k in keys {
        out.extend_from_slice(k);
    }
    out
}

/// Decode an ordered key list.
pub(crate) fn decode_key_list(raw: &[u8]) -> Result<Vec<Vec<u8>>, ModelError> {
    if raw.len() % PUBLIC_KEY_LEN != 0 {
        return Err(ModelError::Malformed(
            "public key list is not a sequence of 32-byte keys".into(),
        ));
    }
    Ok(raw.chunks(PUBLIC_KEY_LEN).map(<[u8]>::to_vec).collect())
}

/// A resolved signature slot: the signer's stored key alongside the
/// signature and its scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEntry {
    /// Canonical 32-byte signer key.
    pub public_key: Vec<u8>,
    /// Signature bytes.
    pub signature: Vec<u8>,
    /// Scheme the slot was signed under.
    pub scheme: CryptoScheme,
}

/// A certificate: delegated-signing or relational facts between keys.
#[derive(Clone, Debug)]
pub struct Cert {
    kind: CertKind,
    model: Model,
}

impl Cert {
    /// Create an empty, unsigned cert of the given variant.
    pub fn new(kind: CertKind) -> Result<Self, CertError> {
        let model = Model::new(kind.model_type(), kind.schema())?;
        Ok(Self { kind, model })
    }

    /// Load a cert from image bytes. The variant is resolved from the first
    /// six bytes; an unknown model type is a malformed image.
    pub fn load(image: &[u8]) -> Result<Self, CertError> {
        Self::load_with(image, false, false)
    }

    /// Load with explicit transient/unknown-field handling.
    pub fn load_with(
        image: &[u8],
        preserve_transient: bool,
        ignore_unknown: bool,
    ) -> Result<Self, CertError> {
        if image.len() < MODEL_TYPE_LEN {
            return Err(ModelError::Malformed("image shorter than the model type header".into()).into());
        }
        let kind = CertKind::from_model_type(&image[..MODEL_TYPE_LEN]).ok_or_else(|| {
            ModelError::Malformed("unknown certificate model type".into())
        })?;
        let mut cert = Self::new(kind)?;
        cert.model.load(image, preserve_transient, ignore_unknown)?;
        Ok(cert)
    }

    /// Variant discriminant.
    pub fn kind(&self) -> CertKind {
        self.kind
    }

    /// The underlying model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Serialize the non-transient fields.
    pub fn export(&self) -> Result<Vec<u8>, CertError> {
        Ok(self.model.export(false, false)?)
    }

    /// Serialize including transient fields (and, when both flags are set,
    /// non-hashable transient fields).
    pub fn export_with(
        &self,
        transient: bool,
        transient_non_hashable: bool,
    ) -> Result<Vec<u8>, CertError> {
        Ok(self.model.export(transient, transient_non_hashable)?)
    }

    /// Stable identifier: hash of the exported non-transient image, with
    /// the signature slots viewed in canonical (sorted-by-signer) order so
    /// the id does not depend on the order signatures were collected in.
    pub fn calc_id1(&self) -> Result<Hash32, CertError> {
        let mut slots = self.slots()?;
        if slots.len() > 1 {
            let mut canonical = self.clone();
            slots.sort_by_key(|s| s.signer);
            canonical.set_slots(&slots)?;
            return Ok(hash_buf(&canonical.export()?));
        }
        Ok(hash_buf(&self.export()?))
    }

    // --- field accessors -------------------------------------------------
    // The schemas are compile-time constants, so typed gets on known names
    // cannot fail; accessors flatten the impossible error away.

    /// Issuer public key (canonical 32-byte form).
    pub fn owner(&self) -> Option<&[u8]> {
        self.model.get_bytes(fields::OWNER).ok().flatten()
    }

    /// Set the issuer public key (an Ed25519 key or an Ethereum address).
    pub fn set_owner(&mut self, pk: &[u8]) -> Result<(), CertError> {
        let canonical = canonical_public_key(pk)?;
        Ok(self.model.set_bytes(fields::OWNER, canonical)?)
    }

    /// Ordered delegate keys (canonical 32-byte form).
    pub fn target_public_keys(&self) -> Result<Vec<Vec<u8>>, CertError> {
        match self.model.get_bytes(fields::TARGET_PUBLIC_KEYS)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(decode_key_list(raw)?),
        }
    }

    /// Set the ordered delegate keys (Ed25519 keys or Ethereum addresses).
    pub fn set_target_public_keys(&mut self, keys: &[Vec<u8>]) -> Result<(), CertError> {
        let canonical = keys
            .iter()
            .map(|k| canonical_public_key(k))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.model.set_bytes(fields::TARGET_PUBLIC_KEYS, encode_key_list(&canonical))?)
    }

    /// Config bitfield (0 when unset).
    pub fn config(&self) -> u8 {
        self.model.get_int(fields::CONFIG).ok().flatten().unwrap_or(0) as u8
    }

    /// Set the config bitfield.
    pub fn set_config(&mut self, bits: u8) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::CONFIG, bits as i64)?)
    }

    /// Whether `dynamicSelfSpec` is folded into the self hash.
    pub fn has_dynamic_self(&self) -> bool {
        self.config() & config::HAS_DYNAMIC_SELF != 0
    }

    /// Whether the embedded cert's signatures cover this cert's data.
    pub fn has_dynamic_cert(&self) -> bool {
        self.config() & config::HAS_DYNAMIC_CERT != 0
    }

    /// Whether this cert renounces a destruction hash.
    pub fn is_indestructible(&self) -> bool {
        self.config() & config::IS_INDESTRUCTIBLE != 0
    }

    /// Lock bitfield (0 when unset).
    pub fn locked_config(&self) -> u16 {
        self.model.get_int(fields::LOCKED_CONFIG).ok().flatten().unwrap_or(0) as u16
    }

    /// Set the lock bitfield.
    pub fn set_locked_config(&mut self, bits: u16) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::LOCKED_CONFIG, bits as i64)?)
    }

    /// Transient config bitfield (0 when unset).
    pub fn transient_config(&self) -> u8 {
        self.model.get_int(fields::TRANSIENT_CONFIG).ok().flatten().unwrap_or(0) as u8
    }

    /// Set the transient config bitfield.
    pub fn set_transient_config(&mut self, bits: u8) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::TRANSIENT_CONFIG, bits as i64)?)
    }

    /// Validity window start.
    pub fn creation_time(&self) -> Option<u64> {
        self.model.get_int(fields::CREATION_TIME).ok().flatten().map(|v| v as u64)
    }

    /// Set the validity window start.
    pub fn set_creation_time(&mut self, ms: u64) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::CREATION_TIME, ms as i64)?)
    }

    /// Validity window end.
    pub fn expire_time(&self) -> Option<u64> {
        self.model.get_int(fields::EXPIRE_TIME).ok().flatten().map(|v| v as u64)
    }

    /// Set the validity window end.
    pub fn set_expire_time(&mut self, ms: u64) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::EXPIRE_TIME, ms as i64)?)
    }

    /// Required number of delegate signatures on the embedder (default 1).
    pub fn multi_sig_threshold(&self) -> u8 {
        self.model.get_int(fields::MULTI_SIG_THRESHOLD).ok().flatten().unwrap_or(1) as u8
    }

    /// Set the multi-signature threshold.
    pub fn set_multi_sig_threshold(&mut self, threshold: u8) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::MULTI_SIG_THRESHOLD, threshold as i64)?)
    }

    /// Model-type prefix the embedder must match.
    pub fn target_type(&self) -> Option<&[u8]> {
        self.model.get_bytes(fields::TARGET_TYPE).ok().flatten()
    }

    /// Set the target model-type prefix (up to 6 bytes; truncation is a
    /// wildcard).
    pub fn set_target_type(&mut self, prefix: &[u8]) -> Result<(), CertError> {
        Ok(self.model.set_bytes(fields::TARGET_TYPE, prefix.to_vec())?)
    }

    /// Remaining chain budget (0 when unset).
    pub fn max_chain_length(&self) -> u8 {
        self.model.get_int(fields::MAX_CHAIN_LENGTH).ok().flatten().unwrap_or(0) as u8
    }

    /// Set the chain budget.
    pub fn set_max_chain_length(&mut self, n: u8) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::MAX_CHAIN_LENGTH, n as i64)?)
    }

    /// Cap on the embedder's expire time.
    pub fn target_max_expire_time(&self) -> Option<u64> {
        self.model.get_int(fields::TARGET_MAX_EXPIRE_TIME).ok().flatten().map(|v| v as u64)
    }

    /// Set the cap on the embedder's expire time.
    pub fn set_target_max_expire_time(&mut self, ms: u64) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::TARGET_MAX_EXPIRE_TIME, ms as i64)?)
    }

    /// Context-binding constraints.
    pub fn constraints(&self) -> Option<Hash32> {
        let raw = self.model.get_bytes(fields::CONSTRAINTS).ok().flatten()?;
        let mut out = [0u8; 32];
        out.copy_from_slice(raw);
        Some(out)
    }

    /// Set the context-binding constraints.
    pub fn set_constraints(&mut self, c: &Hash32) -> Result<(), CertError> {
        Ok(self.model.set_bytes(fields::CONSTRAINTS, c.to_vec())?)
    }

    /// Opaque self-spec blob.
    pub fn dynamic_self_spec(&self) -> Option<&[u8]> {
        self.model.get_bytes(fields::DYNAMIC_SELF_SPEC).ok().flatten()
    }

    /// Set the opaque self-spec blob.
    pub fn set_dynamic_self_spec(&mut self, spec: &[u8]) -> Result<(), CertError> {
        Ok(self.model.set_bytes(fields::DYNAMIC_SELF_SPEC, spec.to_vec())?)
    }

    /// LicenseCert: extension ceiling (0 when unset).
    pub fn max_extensions(&self) -> u8 {
        self.model.get_int(fields::MAX_EXTENSIONS).ok().flatten().unwrap_or(0) as u8
    }

    /// LicenseCert: set the extension ceiling.
    pub fn set_max_extensions(&mut self, n: u8) -> Result<(), CertError> {
        Ok(self.model.set_int(fields::MAX_EXTENSIONS, n as i64)?)
    }

    /// Raw embedded cert image, if any.
    pub fn embedded_cert_image(&self) -> Option<&[u8]> {
        self.model.get_bytes(fields::CERT).ok().flatten()
    }

    /// Decode the embedded cert, if any.
    pub fn embedded_cert(&self) -> Result<Option<Cert>, CertError> {
        match self.embedded_cert_image() {
            None => Ok(None),
            Some(image) => Ok(Some(Cert::load(image)?)),
        }
    }

    /// Nesting depth of this cert's embedded chain (0 when none).
    pub fn embed_depth(&self) -> Result<usize, CertError> {
        let mut depth = 0usize;
        let mut image = self.embedded_cert_image().map(<[u8]>::to_vec);
        while let Some(bytes) = image {
            depth += 1;
            if depth > MAX_EMBED_DEPTH {
                return Err(ModelError::Malformed(format!(
                    "embedded certificate depth exceeds {}",
                    MAX_EMBED_DEPTH
                ))
                .into());
            }
            let inner = Cert::load(&bytes)?;
            image = inner.embedded_cert_image().map(<[u8]>::to_vec);
        }
        Ok(depth)
    }

    /// Embed another cert by value. Rejects nesting beyond the depth cap.
    pub fn embed(&mut self, inner: &Cert) -> Result<(), CertError> {
        if inner.embed_depth()? + 1 > MAX_EMBED_DEPTH {
            return Err(ModelError::Malformed(format!(
                "embedded certificate depth exceeds {}",
                MAX_EMBED_DEPTH
            ))
            .into());
        }
        Ok(self.model.set_bytes(fields::CERT, inner.export()?)?)
    }

    /// Embed a cert from its image bytes, preserving them verbatim.
    pub fn set_embedded_cert_image(&mut self, image: &[u8]) -> Result<(), CertError> {
        let inner = Cert::load(image)?;
        if inner.embed_depth()? + 1 > MAX_EMBED_DEPTH {
            return Err(ModelError::Malformed(format!(
                "embedded certificate depth exceeds {}",
                MAX_EMBED_DEPTH
            ))
            .into());
        }
        Ok(self.model.set_bytes(fields::CERT, image.to_vec())?)
    }

    /// Raw signature slots, in append order.
    fn slots(&self) -> Result<Vec<SignatureSlot>, CertError> {
        match self.model.get_bytes(fields::SIGNATURES)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(decode_signatures(raw)?),
        }
    }

    fn set_slots(&mut self, slots: &[SignatureSlot]) -> Result<(), CertError> {
        Ok(self.model.set_bytes(fields::SIGNATURES, encode_signatures(slots))?)
    }

    /// Decoded signatures in append order, each slot's signer index
    /// resolved to its key in the eligible list.
    pub fn signatures(&self) -> Result<Vec<SignatureEntry>, CertError> {
        let slots = self.slots()?;
        if slots.is_empty() {
            return Ok(Vec::new());
        }
        let (eligible, _) = self.signer_context()?;
        slots
            .into_iter()
            .map(|slot| {
                let public_key =
                    eligible.get(slot.signer as usize).cloned().ok_or_else(|| {
                        CertError::Signature(
                            "Signature slot references an unknown signer".into(),
                        )
                    })?;
                Ok(SignatureEntry { public_key, signature: slot.signature, scheme: slot.scheme })
            })
            .collect()
    }

    // --- hashing and signing ---------------------------------------------

    /// The hash signatures are computed over: every hashable field except
    /// the signature slots, `dynamicSelfSpec` unless `hasDynamicSelf`, and
    /// the embedded image under composite signing.
    pub fn self_hash(&self) -> Result<Hash32, CertError> {
        let mut exclude: Vec<&str> = Vec::new();
        if !self.has_dynamic_self() {
            exclude.push(fields::DYNAMIC_SELF_SPEC);
        }
        if self.has_dynamic_cert() {
            exclude.push(fields::CERT);
        }
        Ok(signable_hash(&self.model, &exclude)?)
    }

    /// Eligible signer keys and the required signature count: the embedded
    /// cert's delegates at its threshold, or the owner alone.
    fn signer_context(&self) -> Result<(Vec<Vec<u8>>, usize), CertError> {
        match self.embedded_cert()? {
            Some(embedded) => {
                let keys = embedded.target_public_keys()?;
                let threshold = embedded.multi_sig_threshold() as usize;
                Ok((keys, threshold))
            }
            None => {
                let owner = self.owner().ok_or_else(|| {
                    CertError::Validation(
                        "Certificate carries neither owner nor embedded certificate".into(),
                    )
                })?;
                Ok((vec![owner.to_vec()], 1))
            }
        }
    }

    fn add_signature(&mut self, keypair: &KeyPair, msg: &[u8]) -> Result<(), CertError> {
        let (eligible, threshold) = self.signer_context()?;
        let pk = canonical_public_key(keypair.public_key())?;
        let Some(signer) = eligible.iter().position(|k| *k == pk) else {
            return Err(CertError::Signature(
                "Signing key is not among the eligible signer keys".into(),
            ));
        };
        let mut slots = self.slots()?;
        if slots.iter().any(|s| s.signer as usize == signer) {
            return Err(CertError::Signature(
                "Public key has already signed this certificate".into(),
            ));
        }
        if slots.len() >= threshold {
            return Err(CertError::Signature(
                "Certificate already carries its required number of signatures".into(),
            ));
        }
        let signature = keypair.sign(msg)?;
        slots.push(SignatureSlot {
            signer: signer as u8,
            scheme: keypair.scheme(),
            signature,
        });
        self.set_slots(&slots)
    }

    /// Append a signature over the self hash. Order-preserving; rejects
    /// ineligible keys, duplicates, and signing past the threshold.
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<(), CertError> {
        let msg = self.self_hash()?;
        self.add_signature(keypair, &msg)
    }

    /// Append a composite signature covering this cert's data and the data
    /// of the outer cert that will embed it under `hasDynamicCert`.
    pub fn sign_dynamic(
        &mut self,
        keypair: &KeyPair,
        outer_self_hash: &Hash32,
    ) -> Result<(), CertError> {
        let mut msg = self.self_hash()?.to_vec();
        msg.extend_from_slice(outer_self_hash);
        self.add_signature(keypair, &msg)
    }

    /// Verify the signature slots: exactly the required count of distinct,
    /// eligible, valid signatures; the embedded cert (if any) verifies
    /// recursively.
    pub fn verify(&self) -> bool {
        match self.verify_at(0, None) {
            Ok(ok) => ok,
            Err(err) => {
                debug!(kind = self.kind.name(), %err, "certificate verification errored");
                false
            }
        }
    }

    fn verify_at(&self, depth: usize, outer: Option<&Hash32>) -> Result<bool, CertError> {
        if depth > MAX_EMBED_DEPTH {
            return Ok(false);
        }
        let (eligible, threshold) = self.signer_context()?;
        let slots = self.slots()?;
        if slots.len() != threshold {
            return Ok(false);
        }

        let msg = match outer {
            None => self.self_hash()?.to_vec(),
            Some(h) => {
                let mut m = self.self_hash()?.to_vec();
                m.extend_from_slice(h.as_slice());
                m
            }
        };

        let mut seen: BTreeSet<u8> = BTreeSet::new();
        for slot in &slots {
            let Some(key) = eligible.get(slot.signer as usize) else {
                return Ok(false);
            };
            if !seen.insert(slot.signer) {
                return Ok(false);
            }
            let Some(verify_key) = scheme_key(slot.scheme, key) else {
                return Ok(false);
            };
            if !keys::verify(verify_key, &msg, &slot.signature) {
                return Ok(false);
            }
        }

        if let Some(embedded) = self.embedded_cert()? {
            let outer_hash = if self.has_dynamic_cert() { Some(self.self_hash()?) } else { None };
            if !embedded.verify_at(depth + 1, outer_hash.as_ref())? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // --- validation ------------------------------------------------------

    /// Structural and temporal validation. `deep >= 2` skips signature
    /// verification (for not-yet-fully-signed certs); `now_ms`, when given,
    /// must fall inside the validity window.
    pub fn validate(&self, deep: u32, now_ms: Option<u64>) -> Result<(), CertError> {
        self.validate_at(deep, now_ms, 0)
    }

    fn validate_at(&self, deep: u32, now_ms: Option<u64>, depth: usize) -> Result<(), CertError> {
        if depth > MAX_EMBED_DEPTH {
            return Err(ModelError::Malformed(format!(
                "embedded certificate depth exceeds {}",
                MAX_EMBED_DEPTH
            ))
            .into());
        }

        let creation = self.creation_time().ok_or_else(|| {
            CertError::Validation("Certificate is missing creationTime".into())
        })?;
        let expire = self
            .expire_time()
            .ok_or_else(|| CertError::Validation("Certificate is missing expireTime".into()))?;
        if creation >= expire {
            return Err(CertError::Validation(
                "Certificate creationTime must be before expireTime".into(),
            ));
        }
        if let Some(now) = now_ms {
            if now < creation {
                return Err(CertError::Validation("Certificate is not yet valid".into()));
            }
            if now > expire {
                return Err(CertError::Validation("Certificate has expired".into()));
            }
        }

        let threshold = self.multi_sig_threshold();
        if threshold < 1 {
            return Err(CertError::Validation("multiSigThreshold must be at least 1".into()));
        }
        let targets = self.target_public_keys()?;
        if targets.len() < threshold as usize {
            return Err(CertError::Validation(
                "targetPublicKeys must contain at least multiSigThreshold keys".into(),
            ));
        }

        let embedded = self.embedded_cert()?;
        if embedded.is_none() && self.owner().is_none() {
            return Err(CertError::Validation(
                "Certificate carries neither owner nor embedded certificate".into(),
            ));
        }

        match self.kind {
            CertKind::Chain => chain::validate_extra(self)?,
            CertKind::Friend => friend::validate_extra(self)?,
            CertKind::License => license::validate_extra(self)?,
            CertKind::Data => data::validate_extra(self)?,
            CertKind::Auth => auth::validate_extra(self)?,
        }

        if let Some(inner) = &embedded {
            if inner.max_chain_length() < 1 {
                return Err(CertError::Validation(
                    "Embedded certificate has no remaining chain budget".into(),
                ));
            }
            inner.validate_at(deep, now_ms, depth + 1)?;
        }

        if deep < 2 && !self.verify() {
            return Err(CertError::Signature(
                "Certificate signature verification failed".into(),
            ));
        }
        Ok(())
    }

    /// Per-variant constraint derivation from the embedder's values.
    pub fn calc_constraints_on_target(
        &self,
        target: &TargetValues,
    ) -> Result<Option<Hash32>, CertError> {
        match self.kind {
            CertKind::Chain => chain::constraints_on_target(self, target),
            CertKind::Friend => friend::constraints_on_target(self, target),
            CertKind::License => license::constraints_on_target(self, target),
            CertKind::Data => data::constraints_on_target(self, target),
            CertKind::Auth => auth::constraints_on_target(self, target),
        }
    }

    /// Chain-walk validation: check this cert against its embedder's values
    /// and recurse into the embedded cert with this cert as the target.
    pub fn validate_against_target(&self, target: &TargetValues) -> Result<(), CertError> {
        self.validate_against_target_at(target, 0)
    }

    fn validate_against_target_at(
        &self,
        target: &TargetValues,
        depth: usize,
    ) -> Result<(), CertError> {
        if depth > MAX_EMBED_DEPTH {
            return Err(ModelError::Malformed(format!(
                "embedded certificate depth exceeds {}",
                MAX_EMBED_DEPTH
            ))
            .into());
        }

        let creation = self.creation_time().ok_or_else(|| {
            CertError::Validation("Certificate is missing creationTime".into())
        })?;
        let expire = self
            .expire_time()
            .ok_or_else(|| CertError::Validation("Certificate is missing expireTime".into()))?;

        // 1. The embedder's window nests inside this cert's window.
        if target.creation_time < creation {
            return Err(CertError::Validation(
                "Target cannot be created before certificate's creation time".into(),
            ));
        }
        if target.expire_time > expire {
            return Err(CertError::Validation(
                "Target cannot expire after certificate's expire time".into(),
            ));
        }

        // 2. Explicit cap on the embedder's expire time.
        if let Some(cap) = self.target_max_expire_time() {
            if target.expire_time > cap {
                return Err(CertError::Validation(
                    "Target expire time exceeds certificate's targetMaxExpireTime".into(),
                ));
            }
        }

        // 3. Model-type prefix wildcard.
        if let Some(prefix) = self.target_type() {
            if !target.model_type.starts_with(prefix) {
                return Err(CertError::Validation(
                    "Target model type does not match certificate's targetType".into(),
                ));
            }
        }

        // 4. Every embedder signing key must be a delegate; the distinct
        //    overlap must equal the threshold.
        let delegates = self.target_public_keys()?;
        let mut overlap: BTreeSet<&[u8]> = BTreeSet::new();
        for key in &target.signing_public_keys {
            if !delegates.iter().any(|d| d == key) {
                return Err(CertError::Signature(
                    "Target signing key is not among certificate's targetPublicKeys".into(),
                ));
            }
            overlap.insert(key.as_slice());
        }
        if overlap.len() != self.multi_sig_threshold() as usize {
            return Err(CertError::Signature(
                "Target signature count does not match certificate's multiSigThreshold".into(),
            ));
        }

        // 5. The chain budget strictly descends as the chain ascends.
        if let Some(target_budget) = target.max_chain_length {
            if target_budget >= self.max_chain_length() {
                return Err(CertError::Validation(
                    "Target maxChainLength must be lesser as the chain propagates".into(),
                ));
            }
        }

        // 6. Constraints, once introduced, must match all the way up.
        if let Some(own) = self.constraints() {
            let derived = self.calc_constraints_on_target(target)?.ok_or_else(|| {
                CertError::Constraints(
                    "Certificate constraints cannot be derived from the target".into(),
                )
            })?;
            if !bool::from(own.as_slice().ct_eq(derived.as_slice())) {
                return Err(CertError::Constraints(
                    "Certificate constraints do not match the target-derived constraints".into(),
                ));
            }
            if let Some(target_constraints) = target.constraints {
                if !bool::from(own.as_slice().ct_eq(target_constraints.as_slice())) {
                    return Err(CertError::Constraints(
                        "Target constraints do not match certificate constraints".into(),
                    ));
                }
            }
        }

        match self.kind {
            CertKind::Chain => chain::validate_against_target_extra(self, target)?,
            CertKind::Friend => friend::validate_against_target_extra(self, target)?,
            CertKind::License => license::validate_against_target_extra(self, target)?,
            CertKind::Data => data::validate_against_target_extra(self, target)?,
            CertKind::Auth => auth::validate_against_target_extra(self, target)?,
        }

        if let Some(embedded) = self.embedded_cert()? {
            let own_values = TargetValues::from_cert(self)?;
            embedded.validate_against_target_at(&own_values, depth + 1)?;
        }
        Ok(())
    }

    /// Published destruction hash. Only FriendCerts define one; its
    /// pre-image is revealed by the owner to destroy the cert pair.
    pub fn destruction_hash(&self) -> Result<Option<Hash32>, CertError> {
        if self.kind != CertKind::Friend || self.is_indestructible() {
            return Ok(None);
        }
        let owner = self.owner().ok_or_else(|| {
            CertError::Validation("FriendCert must carry an owner".into())
        })?;
        let keys = self.target_public_keys()?;
        let key = keys.first().map(Vec::as_slice).ok_or_else(|| {
            CertError::Validation(
                "FriendCert targetPublicKeys must contain the shared key".into(),
            )
        })?;
        Ok(Some(friend::destruction_hash(owner, key)))
    }
}
