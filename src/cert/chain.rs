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

//! ChainCert: a delegation link. Constraints pass through unchanged so that
//! a constraint introduced anywhere below must match all the way up.

use crate::cert::base::{Cert, CertError};
use crate::cert::target::TargetValues;
use crate::crypto::hash::Hash32;

pub(crate) fn validate_extra(cert: &Cert) -> Result<(), CertError> {
    if cert.max_chain_length() < 1 {
        return Err(CertError::Validation(
            "ChainCert maxChainLength must be at least 1".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_against_target_extra(
    _cert: &Cert,
    _target: &TargetValues,
) -> Result<(), CertError> {
    Ok(())
}

/// Passthrough: a chain link derives its constraints from the target.
pub(crate) fn constraints_on_target(
    _cert: &Cert,
    target: &TargetValues,
) -> Result<Option<Hash32>, CertError> {
    Ok(target.constraints)
}
