// Copyright (c) 2026 Covenant
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

use covenant::cert::CertKind;
use covenant::model::Model;

fuzz_target!(|data: &[u8]| {
    // Loader robustness: arbitrary bytes must never panic, in either
    // unknown-field mode.
    let kind = CertKind::Chain;
    if let Ok(mut model) = Model::new(kind.model_type(), kind.schema()) {
        let _ = model.load(data, false, false);
        let _ = model.load(data, true, true);
    }
});
