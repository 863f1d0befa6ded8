// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::DistinguishedName;
use crate::rsa::{self, HashAlgorithm};
use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use der::Decode;
use sha2::{Digest, Sha256};
use std::fmt;

/// OID for the basicConstraints extension (2.5.29.19).
pub const OID_BASIC_CONSTRAINTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.19");

/// A parsed X.509 certificate.
///
/// Records are immutable inputs to chain validation. Fields are public so
/// callers can build or inspect them without going through DER, but the
/// validator never writes to them.
#[derive(Clone, Debug)]
pub struct Certificate {
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Serial number, unique per issuing CA.
    pub serial_number: ::rsa::BigUint,
    /// Start of the validity window (inclusive).
    pub not_valid_before: DateTime<Utc>,
    /// End of the validity window (inclusive).
    pub not_valid_after: DateTime<Utc>,
    /// DER encoding of the TBSCertificate, the exact bytes that were signed.
    pub tbs_certificate_bytes: Vec<u8>,
    /// Raw signature over `tbs_certificate_bytes`.
    pub signature: Vec<u8>,
    /// Algorithm the issuer declares it signed the certificate with.
    pub signature_algorithm: SignatureAlgorithm,
    /// Subject public key.
    pub public_key: PublicKey,
    /// Certificate extensions keyed by OID.
    pub extensions: Extensions,
    /// Complete DER encoding of the certificate.
    pub der: Vec<u8>,
}

impl Certificate {
    /// Reports whether `at` falls inside the inclusive validity window.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_valid_before <= at && at <= self.not_valid_after
    }

    /// Digest to verify the signature with, if it is RSA PKCS#1 v1.5.
    pub fn signature_hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self.signature_algorithm {
            SignatureAlgorithm::RsaPkcs1v15(hash) => Some(hash),
            SignatureAlgorithm::Unsupported { .. } => None,
        }
    }

    /// SHA-256 over the full DER encoding.
    pub fn fingerprint(&self) -> [u8; 32] {
        Sha256::digest(&self.der).into()
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.subject)?;
        writeln!(f, "  - Serial: {}", self.serial_number)?;
        writeln!(
            f,
            "  - Valid from: {} to {}",
            self.not_valid_before.to_rfc3339(),
            self.not_valid_after.to_rfc3339()
        )?;
        writeln!(f, "  - Issued by: {}", self.issuer)?;
        writeln!(f, "  - Signature: {}", self.signature_algorithm)?;
        writeln!(f, "  - Public key: {}", self.public_key)?;
        match self.extensions.basic_constraints() {
            Ok(Some(bc)) => writeln!(f, "  - Basic constraints: {bc}")?,
            Ok(None) => writeln!(f, "  - Basic constraints: absent")?,
            Err(err) => writeln!(f, "  - Basic constraints: undecodable ({err})")?,
        }
        write!(f, "  - SHA-256 fingerprint: {}", hex::encode(self.fingerprint()))
    }
}

/// Signature algorithm of a certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// One of the `sha*WithRSAEncryption` algorithms.
    RsaPkcs1v15(HashAlgorithm),
    /// Anything else (ECDSA, RSA-PSS, MD5, ...). Such certificates load, but
    /// their signature cannot be checked.
    Unsupported { algorithm: ObjectIdentifier },
}

impl SignatureAlgorithm {
    /// Maps a signature algorithm OID, keeping unknown ones as markers.
    pub fn from_oid(oid: ObjectIdentifier) -> Self {
        match HashAlgorithm::from_signature_oid(&oid) {
            Some(hash) => SignatureAlgorithm::RsaPkcs1v15(hash),
            None => SignatureAlgorithm::Unsupported { algorithm: oid },
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::RsaPkcs1v15(hash) => write!(f, "{hash} with RSA"),
            SignatureAlgorithm::Unsupported { algorithm } => write!(f, "unsupported ({algorithm})"),
        }
    }
}

/// Subject public key of a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    /// An rsaEncryption key.
    Rsa(rsa::PublicKey),
    /// Any other algorithm. It loads fine, but cannot verify signatures.
    Unsupported { algorithm: ObjectIdentifier },
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Rsa(key) => write!(f, "RSA-{}", key.bits()),
            PublicKey::Unsupported { algorithm } => write!(f, "unsupported ({algorithm})"),
        }
    }
}

/// A raw certificate extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    /// Extension OID.
    pub oid: ObjectIdentifier,
    /// Whether the extension is marked critical.
    pub critical: bool,
    /// DER-encoded extension payload (inside the extnValue OCTET STRING).
    pub value: Vec<u8>,
}

/// Certificate extensions, looked up by OID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extensions(pub Vec<Extension>);

impl Extensions {
    /// Returns the extension with the given OID.
    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.0.iter().find(|ext| ext.oid == *oid)
    }

    /// Removes the extension with the given OID, returning it.
    pub fn remove(&mut self, oid: &ObjectIdentifier) -> Option<Extension> {
        let idx = self.0.iter().position(|ext| ext.oid == *oid)?;
        Some(self.0.remove(idx))
    }

    /// Decodes the basicConstraints extension, if present.
    pub fn basic_constraints(&self) -> der::Result<Option<BasicConstraints>> {
        let Some(ext) = self.get(&OID_BASIC_CONSTRAINTS) else {
            return Ok(None);
        };
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(&ext.value)?;
        Ok(Some(BasicConstraints {
            is_ca: bc.ca,
            path_length: bc.path_len_constraint,
            critical: ext.critical,
        }))
    }
}

/// Decoded basicConstraints extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicConstraints {
    /// Whether the subject may act as a CA.
    pub is_ca: bool,
    /// Maximum number of intermediates that may follow this certificate.
    pub path_length: Option<u8>,
    /// Whether the extension was marked critical.
    pub critical: bool,
}

impl fmt::Display for BasicConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CA={}", self.is_ca)?;
        if let Some(len) = self.path_length {
            write!(f, ", pathlen={len}")?;
        }
        if self.critical {
            f.write_str(", critical")?;
        }
        Ok(())
    }
}
