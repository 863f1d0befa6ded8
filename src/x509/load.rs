// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{
    Certificate, DistinguishedName, Error, Extension, Extensions, PublicKey, Result,
    SignatureAlgorithm,
};
use crate::pem;
use crate::rsa;
use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use std::path::Path;
use x509_parser::certificate::X509Certificate;

const CERTIFICATE_HEADER: &[u8] = b"-----BEGIN CERTIFICATE-----";
const CERTIFICATE_FOOTER: &[u8] = b"-----END CERTIFICATE-----";

/// Loads a certificate from either PEM or raw DER.
///
/// PEM input may carry text before the first `CERTIFICATE` block (such as
/// the dump `openssl x509 -text` prepends) and further blocks after it; only
/// the first certificate is loaded. Input without a `CERTIFICATE` block is
/// treated as DER. Any failure here means the input is malformed and must
/// not be handed to the chain validator.
pub fn load_certificate(data: &[u8]) -> Result<Certificate> {
    if let Some(block) = certificate_block(data) {
        let block = pem::decode(block)?;
        log::debug!("decoded certificate as PEM ({} bytes of DER)", block.contents.len());
        return parse_der(&block.contents);
    }
    let trimmed = data.trim_ascii();
    if trimmed.starts_with(b"-----BEGIN ") {
        let block = pem::decode(trimmed)?;
        return Err(Error::InvalidPemLabel { label: block.label });
    }
    log::debug!("input is not PEM, parsing {} bytes as DER", data.len());
    parse_der(data)
}

/// Reads a file and loads the certificate inside it.
pub fn load_certificate_file(path: impl AsRef<Path>) -> Result<Certificate> {
    let path = path.as_ref();
    log::debug!("loading certificate from {}", path.display());

    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_certificate(&data)
}

/// Cuts the first `CERTIFICATE` block out of the input. A block missing its
/// footer is returned up to the end of the input, so the PEM codec reports
/// the truncation.
fn certificate_block(data: &[u8]) -> Option<&[u8]> {
    let start = find(data, CERTIFICATE_HEADER)?;
    let rest = &data[start..];
    match find(rest, CERTIFICATE_FOOTER) {
        Some(end) => Some(&rest[..end + CERTIFICATE_FOOTER.len()]),
        None => Some(rest),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parses a DER certificate into the record consumed by the validator.
fn parse_der(der: &[u8]) -> Result<Certificate> {
    let (rem, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| Error::X509Parse {
        details: e.to_string(),
    })?;
    if !rem.is_empty() {
        return Err(Error::TrailingDerData);
    }
    let signature_algorithm = signature_algorithm(&cert)?;

    let not_valid_before = parse_time(cert.tbs_certificate.validity.not_before.timestamp())?;
    let not_valid_after = parse_time(cert.tbs_certificate.validity.not_after.timestamp())?;
    if not_valid_before > not_valid_after {
        return Err(Error::InvalidValidityWindow);
    }

    // Version 1 certificates simply have none
    let mut extensions = Vec::new();
    for ext in cert.tbs_certificate.extensions() {
        extensions.push(Extension {
            oid: ObjectIdentifier::new(ext.oid.to_id_string().as_str())?,
            critical: ext.critical,
            value: ext.value.to_vec(),
        });
    }

    Ok(Certificate {
        subject: DistinguishedName::from_parsed(&cert.tbs_certificate.subject)?,
        issuer: DistinguishedName::from_parsed(&cert.tbs_certificate.issuer)?,
        serial_number: ::rsa::BigUint::from_bytes_be(cert.tbs_certificate.raw_serial()),
        not_valid_before,
        not_valid_after,
        tbs_certificate_bytes: cert.tbs_certificate.as_ref().to_vec(),
        signature: cert.signature_value.data.to_vec(),
        signature_algorithm,
        public_key: subject_public_key(&cert)?,
        extensions: Extensions(extensions),
        der: der.to_vec(),
    })
}

/// Resolves the signature algorithm, requiring both algorithm fields to agree.
/// Algorithms other than RSA PKCS#1 v1.5 load fine; the validator rejects
/// them only if it has to check that signature.
fn signature_algorithm(cert: &X509Certificate<'_>) -> Result<SignatureAlgorithm> {
    let outer = cert.signature_algorithm.algorithm.to_id_string();
    if outer != cert.tbs_certificate.signature.algorithm.to_id_string() {
        return Err(Error::SignatureAlgorithmMismatch);
    }
    Ok(SignatureAlgorithm::from_oid(ObjectIdentifier::new(outer.as_str())?))
}

/// Extracts the subject key, keeping non-RSA algorithms as opaque markers.
fn subject_public_key(cert: &X509Certificate<'_>) -> Result<PublicKey> {
    let spki = &cert.tbs_certificate.subject_pki;
    let algorithm = ObjectIdentifier::new(spki.algorithm.algorithm.to_id_string().as_str())?;
    if algorithm != rsa::OID {
        return Ok(PublicKey::Unsupported { algorithm });
    }
    let key = rsa::PublicKey::from_pkcs1_der(&spki.subject_public_key.data)
        .map_err(|_| Error::InvalidPublicKey)?;
    Ok(PublicKey::Rsa(key))
}

/// UTCTime covers 1950 to 2049, so instants before the epoch are legitimate.
fn parse_time(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or(Error::TimeOutOfRange)
}

#[cfg(test)]
mod test {
    use super::super::*;
    use crate::rsa::{HashAlgorithm, SecretKey};
    use chrono::{TimeZone, Utc};
    use const_oid::ObjectIdentifier;
    use der::asn1::{Any, BitString};
    use der::{Decode, Encode};
    use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

    const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
    const OID_PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
    const OID_ECDSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

    fn issue(role: Role) -> (SecretKey, Vec<u8>) {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();
        let template = Template {
            subject: Name::new().o("Dark Bio").cn("Loader Test"),
            issuer: Name::new().cn("Loader Root"),
            not_before: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            role,
            hash: HashAlgorithm::Sha384,
        };
        let der = issue_cert_der(&subject.public_key(), &issuer, &template).unwrap();
        (subject, der)
    }

    /// Verifies that every field of the record is populated from DER.
    #[test]
    fn test_load_der_fields() {
        let (subject, der) = issue(Role::Authority { path_len: Some(2) });
        let cert = load_certificate(&der).unwrap();

        assert_eq!(cert.subject.to_string(), "CN=Loader Test,O=Dark Bio");
        assert_eq!(cert.issuer.common_name(), Some("Loader Root"));
        assert_eq!(
            cert.not_valid_before,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            cert.not_valid_after,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            cert.signature_algorithm,
            SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha384)
        );
        assert_eq!(cert.signature_hash_algorithm(), Some(HashAlgorithm::Sha384));
        assert_eq!(cert.public_key, PublicKey::Rsa(subject.public_key()));
        assert_eq!(cert.signature.len(), 128);
        assert_eq!(cert.der, der);

        let bc = cert.extensions.basic_constraints().unwrap().unwrap();
        assert!(bc.is_ca);
        assert!(bc.critical);
        assert_eq!(bc.path_length, Some(2));
    }

    /// Verifies that PEM and DER encodings of the same certificate load identically.
    #[test]
    fn test_load_pem_and_der_agree() {
        let (_, der) = issue(Role::Leaf);
        let pem = crate::pem::encode("CERTIFICATE", &der);

        let from_der = load_certificate(&der).unwrap();
        let from_pem = load_certificate(pem.as_bytes()).unwrap();
        assert_eq!(from_der.tbs_certificate_bytes, from_pem.tbs_certificate_bytes);
        assert_eq!(from_der.serial_number, from_pem.serial_number);
        assert_eq!(from_der.signature, from_pem.signature);

        // Surrounding whitespace, as left behind by editors, is tolerated
        let padded = format!("\n\n{pem}\n");
        assert!(load_certificate(padded.as_bytes()).is_ok());

        let bc = from_der.extensions.basic_constraints().unwrap().unwrap();
        assert!(!bc.is_ca);
    }

    /// Verifies that a certificate issued without basicConstraints loads fine.
    #[test]
    fn test_load_without_basic_constraints() {
        let (_, der) = issue(Role::Unconstrained);
        let cert = load_certificate(&der).unwrap();
        assert!(cert.extensions.basic_constraints().unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            load_certificate(b"definitely not a certificate"),
            Err(Error::X509Parse { .. })
        ));
        assert!(load_certificate(&[]).is_err());
    }

    #[test]
    fn test_load_rejects_trailing_der() {
        let (_, mut der) = issue(Role::Leaf);
        der.push(0x00);
        assert!(matches!(load_certificate(&der), Err(Error::TrailingDerData)));
    }

    #[test]
    fn test_load_rejects_wrong_pem_label() {
        let (_, der) = issue(Role::Leaf);
        let pem = crate::pem::encode("PUBLIC KEY", &der);
        assert!(matches!(
            load_certificate(pem.as_bytes()),
            Err(Error::InvalidPemLabel { .. })
        ));
    }

    #[test]
    fn test_load_rejects_broken_pem() {
        let (_, der) = issue(Role::Leaf);
        let pem = crate::pem::encode("CERTIFICATE", &der);
        let truncated = &pem[..pem.len() / 2];
        assert!(matches!(load_certificate(truncated.as_bytes()), Err(Error::Pem(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_certificate_file("/nonexistent/chainval/root.pem").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    /// Rewrites a certificate to carry a P-256 key and an ECDSA signature.
    /// The signature itself is junk, which the loader never looks at.
    fn with_ec_key(der: &[u8]) -> Vec<u8> {
        let mut cert = x509_cert::Certificate::from_der(der).unwrap();
        let ecdsa = AlgorithmIdentifierOwned {
            oid: OID_ECDSA_SHA256,
            parameters: None,
        };
        cert.tbs_certificate.subject_public_key_info = SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: OID_EC_PUBLIC_KEY,
                parameters: Some(Any::encode_from(&OID_PRIME256V1).unwrap()),
            },
            subject_public_key: BitString::from_bytes(&[0x04; 65]).unwrap(),
        };
        cert.tbs_certificate.signature = ecdsa.clone();
        cert.signature_algorithm = ecdsa;
        cert.signature = BitString::from_bytes(&[0x30; 70]).unwrap();
        cert.to_der().unwrap()
    }

    /// Verifies that X.509 v1 certificates, which have no extensions, load.
    #[test]
    fn test_load_version1() {
        let (subject, der) = issue(Role::Legacy);
        let cert = load_certificate(&der).unwrap();

        assert_eq!(cert.public_key, PublicKey::Rsa(subject.public_key()));
        assert!(cert.extensions.0.is_empty());
        assert!(cert.extensions.basic_constraints().unwrap().is_none());
    }

    /// Verifies that text before the PEM block is skipped, as left behind by
    /// `openssl x509 -text` or `-subject` dumps.
    #[test]
    fn test_load_pem_with_preamble() {
        let (_, der) = issue(Role::Leaf);
        let pem = crate::pem::encode("CERTIFICATE", &der);

        let dump = format!("subject=CN=Loader Test, O=Dark Bio\nissuer=CN=Loader Root\n\n{pem}");
        let cert = load_certificate(dump.as_bytes()).unwrap();
        assert_eq!(cert.der, der);
    }

    /// Verifies that only the first certificate of a bundle is loaded, and that
    /// blocks of other types are skipped.
    #[test]
    fn test_load_pem_bundle() {
        let (first, first_der) = issue(Role::Leaf);
        let (_, second_der) = issue(Role::Authority { path_len: None });

        let bundle = format!(
            "{}{}",
            crate::pem::encode("CERTIFICATE", &first_der),
            crate::pem::encode("CERTIFICATE", &second_der)
        );
        let cert = load_certificate(bundle.as_bytes()).unwrap();
        assert_eq!(cert.der, first_der);
        assert_eq!(cert.public_key, PublicKey::Rsa(first.public_key()));

        let keyed = format!(
            "{}{}",
            crate::pem::encode("PUBLIC KEY", &first.public_key().to_der().unwrap()),
            crate::pem::encode("CERTIFICATE", &second_der)
        );
        let cert = load_certificate(keyed.as_bytes()).unwrap();
        assert_eq!(cert.der, second_der);
    }

    /// Verifies that a certificate with an EC key and an ECDSA signature loads,
    /// keeping both algorithms as unsupported markers.
    #[test]
    fn test_load_ec_certificate() {
        let (_, der) = issue(Role::Authority { path_len: None });
        let cert = load_certificate(&with_ec_key(&der)).unwrap();

        assert_eq!(
            cert.public_key,
            PublicKey::Unsupported {
                algorithm: OID_EC_PUBLIC_KEY
            }
        );
        assert_eq!(
            cert.signature_algorithm,
            SignatureAlgorithm::Unsupported {
                algorithm: OID_ECDSA_SHA256
            }
        );
        assert_eq!(cert.signature_hash_algorithm(), None);
    }

    /// Verifies that UTCTime years 50-69 load as instants before 1970.
    #[test]
    fn test_load_pre_epoch_validity() {
        let (_, mut der) = issue(Role::Leaf);

        // Same length encodings, so only the TBS content changes
        let from: &[u8] = b"250101000000Z";
        let at = der.windows(from.len()).position(|w| w == from).unwrap();
        der[at..at + from.len()].copy_from_slice(b"600101000000Z");

        let cert = load_certificate(&der).unwrap();
        assert_eq!(
            cert.not_valid_before,
            Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(cert.not_valid_before.timestamp() < 0);
    }
}
