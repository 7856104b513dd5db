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
#![warn(missing_docs)]

//! Covenant data model and certificate chain subsystem.
//!
//! This crate is the foundation the platform's signed nodes, licenses, and
//! delegated-signing certificates are built on:
//! - A deterministic field-tagged binary codec with stable field indices,
//!   forward/backward-compatible loading, and content hashing
//! - A certificate hierarchy with chainable delegation, multi-signature
//!   thresholds, constraint hashing, and target validation
//! - Signature verification over Ed25519 and Ethereum-secp256k1 keys, with
//!   an offloadable batch verifier
//!
//! The subsystem is pure data manipulation: time is an injected parameter
//! and no operation suspends or performs I/O.

/// Certificates: variants, factory, chain-walk validation, batch verifier.
pub mod cert;
/// Cryptographic primitives: typed-value hashing and signature schemes.
pub mod crypto;
/// The binary data model: codec, filtering, signature slots.
pub mod model;
