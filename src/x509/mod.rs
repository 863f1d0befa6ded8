// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! X.509 certificate records, loading and issuance.
//!
//! https://datatracker.ietf.org/doc/html/rfc5280
//!
//! Parsing is delegated to `x509-parser`, issuance to `x509-cert`. Both are
//! normalized into the owned [`Certificate`] record that the chain validator
//! consumes.

mod error;
mod issue;
mod load;
mod name;
mod types;

pub use error::{Error, Result};
pub use issue::{Role, Template, issue_cert_der, issue_cert_pem};
pub use load::{load_certificate, load_certificate_file};
pub use name::{DistinguishedName, NameAttribute, NameValue, OID_C, OID_CN, OID_O, OID_OU};
pub use types::{
    BasicConstraints, Certificate, Extension, Extensions, OID_BASIC_CONSTRAINTS, PublicKey,
    SignatureAlgorithm,
};

pub use crate::rsa::HashAlgorithm;

/// Shorthand used by templates: `Name::new().cn("Root CA")`.
pub type Name = DistinguishedName;
