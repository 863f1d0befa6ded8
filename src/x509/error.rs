// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

/// Result type used by x509 APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by x509 APIs.
///
/// Everything here is a malformed-input condition raised while loading or
/// issuing certificates. Chain validation failures are reported through
/// [`crate::chain::Verdict`] instead and never surface as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("PEM decoding error: {0}")]
    Pem(#[from] crate::pem::Error),
    #[error("PEM block is not a CERTIFICATE but {label}")]
    InvalidPemLabel { label: String },
    #[error("input is neither a PEM certificate nor DER: {details}")]
    X509Parse { details: String },
    #[error("trailing data after DER certificate")]
    TrailingDerData,
    #[error("outer signature algorithm does not match TBSCertificate signature algorithm")]
    SignatureAlgorithmMismatch,
    #[error("invalid certificate validity window: not_before must be <= not_after")]
    InvalidValidityWindow,
    #[error("certificate validity time is out of range")]
    TimeOutOfRange,
    #[error("issued certificates cannot be valid before 1970")]
    PreUnixTimestamp,
    #[error("invalid RSA subject public key")]
    InvalidPublicKey,
    #[error("certificate {field} DN must not be empty")]
    EmptyDistinguishedName { field: &'static str },
    #[error("invalid PrintableString characters")]
    InvalidPrintableString,
    #[error("raw DN attribute bytes are not allowed for certificate issuance")]
    RawNameValueNotAllowedForIssuance,
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),
    #[error("failed to generate certificate serial: {0}")]
    Serial(#[from] getrandom::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Oid(#[from] const_oid::Error),
}
