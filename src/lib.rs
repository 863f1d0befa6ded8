// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Explicit validation of three-certificate X.509 chains.
//!
//! Certificates are loaded from PEM or DER with [`x509::load_certificate`]
//! and handed to [`chain::validate`] together with the instant to validate
//! at. The result is a [`chain::Verdict`] naming the first failing check.

pub mod chain;
pub mod pem;
pub mod rsa;
pub mod x509;

pub use chain::{CheckKind, Policy, Validator, Verdict, validate};
pub use x509::{Certificate, load_certificate, load_certificate_file};
