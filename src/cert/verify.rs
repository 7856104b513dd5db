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

//! Batch signature verification behind a lazy future.
//!
//! The contract: the returned subset preserves input order and never
//! contains a cert whose own or embedded signatures failed. Dropping the
//! future is advisory cancellation; already-submitted batches may still
//! consume CPU.

use crate::cert::base::Cert;
use futures::future::{self, BoxFuture, FutureExt};
use tracing::debug;

/// Batch signature verifier. Implementations may fan out to worker threads;
/// the core never assumes which.
pub trait SignatureVerifier: Send + Sync {
    /// Verify a batch, resolving to the verified subset in input order.
    fn verify(&self, certs: Vec<Cert>) -> BoxFuture<'static, Vec<Cert>>;
}

fn filter_verified(certs: Vec<Cert>) -> Vec<Cert> {
    certs
        .into_iter()
        .filter(|cert| {
            let ok = cert.verify();
            if !ok {
                debug!(kind = cert.kind().name(), "dropping cert from verified batch");
            }
            ok
        })
        .collect()
}

/// Synchronous in-process verifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineVerifier;

impl SignatureVerifier for InlineVerifier {
    fn verify(&self, certs: Vec<Cert>) -> BoxFuture<'static, Vec<Cert>> {
        future::ready(filter_verified(certs)).boxed()
    }
}

/// Verifier that offloads the batch onto the blocking thread pool of a
/// tokio runtime.
#[derive(Clone, Debug)]
pub struct OffloadVerifier {
    handle: tokio::runtime::Handle,
}

impl OffloadVerifier {
    /// Offload onto the given runtime.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl SignatureVerifier for OffloadVerifier {
    fn verify(&self, certs: Vec<Cert>) -> BoxFuture<'static, Vec<Cert>> {
        let task = self.handle.spawn_blocking(move || filter_verified(certs));
        async move { task.await.unwrap_or_default() }.boxed()
    }
}
