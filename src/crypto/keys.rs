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

//! Key pairs and signature scheme dispatch.
//!
//! Two schemes are supported and inferred from the public key length:
//! - Ed25519 (32-byte keys, 64-byte signatures)
//! - Ethereum-secp256k1 (20-byte addresses or 33-byte compressed keys,
//!   65-byte recoverable signatures over the keccak-256 of the message)

use ring::{
    rand::{SecureRandom, SystemRandom},
    signature::{Ed25519KeyPair, KeyPair as _, UnparsedPublicKey, ED25519},
};
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};
use zeroize::Zeroize;

/// Crypto errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The system RNG failed.
    #[error("rng failure")]
    Rng,
    /// Key material could not be parsed.
    #[error("invalid key material")]
    InvalidKey,
}

/// Signature scheme, carried in each signature slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CryptoScheme {
    /// Ed25519 (32-byte public keys).
    Ed25519,
    /// Ethereum-style secp256k1 with public key recovery.
    EthSecp256k1,
}

impl CryptoScheme {
    /// Wire byte for the signature slot encoding.
    pub fn to_u8(self) -> u8 {
        match self {
            CryptoScheme::Ed25519 => 1,
            CryptoScheme::EthSecp256k1 => 2,
        }
    }

    /// Decode the wire byte.
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            1 => Some(CryptoScheme::Ed25519),
            2 => Some(CryptoScheme::EthSecp256k1),
            _ => None,
        }
    }

    /// Infer the scheme from a public key length.
    pub fn for_public_key(pk: &[u8]) -> Option<Self> {
        match pk.len() {
            32 => Some(CryptoScheme::Ed25519),
            20 | 33 => Some(CryptoScheme::EthSecp256k1),
            _ => None,
        }
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut k = Keccak::v256();
    k.update(data);
    k.finalize(&mut out);
    out
}

/// Ethereum address of an uncompressed secp256k1 public key.
fn eth_address(pk: &libsecp256k1::PublicKey) -> [u8; 20] {
    let raw = pk.serialize();
    let digest = keccak256(&raw[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    out
}

/// A signing key pair. Secret material is zeroized on drop.
pub struct KeyPair {
    scheme: CryptoScheme,
    public: Vec<u8>,
    secret: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh Ed25519 key pair from the system RNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let mut seed = [0u8; 32];
        rng.fill(&mut seed).map_err(|_| CryptoError::Rng)?;
        let kp = Self::ed25519_from_seed(&seed);
        seed.zeroize();
        kp
    }

    /// Build an Ed25519 key pair from a 32-byte seed.
    pub fn ed25519_from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let kp = Ed25519KeyPair::from_seed_unchecked(seed).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self {
            scheme: CryptoScheme::Ed25519,
            public: kp.public_key().as_ref().to_vec(),
            secret: seed.to_vec(),
        })
    }

    /// Build an Ethereum-secp256k1 key pair from a 32-byte secret key.
    /// The public identity is the 20-byte address.
    pub fn eth_from_secret(secret: &[u8]) -> Result<Self, CryptoError> {
        let sk = libsecp256k1::SecretKey::parse_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
        let pk = libsecp256k1::PublicKey::from_secret_key(&sk);
        Ok(Self {
            scheme: CryptoScheme::EthSecp256k1,
            public: eth_address(&pk).to_vec(),
            secret: secret.to_vec(),
        })
    }

    /// Signature scheme of this key pair.
    pub fn scheme(&self) -> CryptoScheme {
        self.scheme
    }

    /// Public key bytes (32 for Ed25519, 20 for Ethereum).
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Sign a message.
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.scheme {
            CryptoScheme::Ed25519 => {
                let kp = Ed25519KeyPair::from_seed_unchecked(&self.secret)
                    .map_err(|_| CryptoError::InvalidKey)?;
                Ok(kp.sign(msg).as_ref().to_vec())
            }
            CryptoScheme::EthSecp256k1 => {
                let sk = libsecp256k1::SecretKey::parse_slice(&self.secret)
                    .map_err(|_| CryptoError::InvalidKey)?;
                let digest = keccak256(msg);
                let (sig, recid) = libsecp256k1::sign(&libsecp256k1::Message::parse(&digest), &sk);
                let mut out = sig.serialize().to_vec();
                out.push(recid.serialize());
                Ok(out)
            }
        }
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Verify `sig` over `msg` for `public_key`, inferring the scheme from the
/// key length. Unknown key or signature shapes verify as false.
pub fn verify(public_key: &[u8], msg: &[u8], sig: &[u8]) -> bool {
    match CryptoScheme::for_public_key(public_key) {
        Some(CryptoScheme::Ed25519) => {
            if sig.len() != 64 {
                return false;
            }
            UnparsedPublicKey::new(&ED25519, public_key).verify(msg, sig).is_ok()
        }
        Some(CryptoScheme::EthSecp256k1) => verify_eth(public_key, msg, sig),
        None => false,
    }
}

fn verify_eth(public_key: &[u8], msg: &[u8], sig: &[u8]) -> bool {
    if sig.len() != 65 {
        return false;
    }
    let Ok(parsed) = libsecp256k1::Signature::parse_standard_slice(&sig[..64]) else {
        return false;
    };
    // Accept both raw (0/1) and Ethereum-offset (27/28) recovery ids.
    let v = if sig[64] >= 27 { sig[64] - 27 } else { sig[64] };
    let Ok(recid) = libsecp256k1::RecoveryId::parse(v) else {
        return false;
    };
    let digest = keccak256(msg);
    let Ok(recovered) =
        libsecp256k1::recover(&libsecp256k1::Message::parse(&digest), &parsed, &recid)
    else {
        return false;
    };
    match public_key.len() {
        33 => recovered.serialize_compressed().as_slice() == public_key,
        20 => eth_address(&recovered).as_slice() == public_key,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_sign_verify_roundtrip() {
        let kp = KeyPair::ed25519_from_seed(&[7u8; 32]).expect("keypair");
        let sig = kp.sign(b"covenant").expect("sign");
        assert!(verify(kp.public_key(), b"covenant", &sig));
        assert!(!verify(kp.public_key(), b"other", &sig));
    }

    #[test]
    fn eth_sign_verify_roundtrip() {
        let kp = KeyPair::eth_from_secret(&[9u8; 32]).expect("keypair");
        assert_eq!(kp.public_key().len(), 20);
        let sig = kp.sign(b"covenant").expect("sign");
        assert!(verify(kp.public_key(), b"covenant", &sig));
        assert!(!verify(kp.public_key(), b"other", &sig));
    }
}
