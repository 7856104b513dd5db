// Copyright (c) 2026 Covenant
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

use covenant::cert::Cert;

fuzz_target!(|data: &[u8]| {
    // A loaded cert must survive validation and verification without
    // panicking, whatever the bytes were.
    if let Ok(cert) = Cert::load(data) {
        let _ = cert.validate(2, Some(1_700_000_000_000));
        let _ = cert.verify();
        let _ = cert.calc_id1();
    }
});
