// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use chainval::x509::load_certificate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Loading must never panic, and anything it accepts must be displayable
    if let Ok(cert) = load_certificate(data) {
        let _ = cert.to_string();
        let _ = cert.extensions.basic_constraints();
        assert!(cert.not_valid_before <= cert.not_valid_after);
    }
});
