// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{DistinguishedName, Error, Result};
use crate::pem;
use crate::rsa::{HashAlgorithm, PublicKey, SecretKey};
use chrono::{DateTime, Utc};
use der::asn1::{Any, BitString, GeneralizedTime, OctetString, UtcTime};
use der::{Decode, Encode};
use sha1::{Digest, Sha1};
use std::time::Duration;
use x509_cert::certificate::{CertificateInner, TbsCertificateInner, Version};
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use x509_cert::ext::{AsExtension, Extension};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};

/// First instant that RFC 5280 requires to be encoded as GeneralizedTime.
const GENERALIZED_TIME_FROM: u64 = 2_524_608_000; // 2050-01-01T00:00:00Z

/// Basic constraints to embed in an issued certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// End-entity certificate (`CA=false`).
    Leaf,
    /// CA certificate, with an optional path length constraint.
    Authority { path_len: Option<u8> },
    /// No basicConstraints extension at all.
    Unconstrained,
    /// X.509 v1 certificate, which carries no extensions whatsoever.
    Legacy,
}

/// Certificate issuance template.
#[derive(Clone, Debug)]
pub struct Template {
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// Basic constraints profile.
    pub role: Role,
    /// Digest used for the PKCS#1 v1.5 signature.
    pub hash: HashAlgorithm,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            subject: DistinguishedName::default(),
            issuer: DistinguishedName::default(),
            not_before: DateTime::<Utc>::UNIX_EPOCH,
            not_after: DateTime::<Utc>::UNIX_EPOCH,
            role: Role::Leaf,
            hash: HashAlgorithm::Sha256,
        }
    }
}

/// Issues a DER encoded certificate for `subject`, signed by `issuer`.
pub fn issue_cert_der(
    subject: &PublicKey,
    issuer: &SecretKey,
    template: &Template,
) -> Result<Vec<u8>> {
    Ok(issue_cert(subject, issuer, template)?.to_der()?)
}

/// Issues a PEM encoded certificate for `subject`, signed by `issuer`.
pub fn issue_cert_pem(
    subject: &PublicKey,
    issuer: &SecretKey,
    template: &Template,
) -> Result<String> {
    Ok(pem::encode("CERTIFICATE", &issue_cert_der(subject, issuer, template)?))
}

/// Builds and signs the certificate object shared by the public issue APIs.
fn issue_cert(
    subject_key: &PublicKey,
    issuer: &SecretKey,
    template: &Template,
) -> Result<CertificateInner> {
    if template.subject.attrs.is_empty() {
        return Err(Error::EmptyDistinguishedName { field: "subject" });
    }
    if template.issuer.attrs.is_empty() {
        return Err(Error::EmptyDistinguishedName { field: "issuer" });
    }
    if template.not_before > template.not_after {
        return Err(Error::InvalidValidityWindow);
    }
    // Random positive serial, with a non-zero leading byte to stay canonical
    let mut serial = [0u8; 16];
    getrandom::fill(&mut serial)?;
    serial[0] = (serial[0] & 0x7F) | 0x01;
    let serial_number = SerialNumber::new(&serial)?;

    // sha*WithRSAEncryption carries explicit NULL parameters (RFC 4055)
    let signature_alg = AlgorithmIdentifierOwned {
        oid: template.hash.signature_oid(),
        parameters: Some(Any::null()),
    };
    let subject_name = template.subject.to_x509_name()?;
    let issuer_name = template.issuer.to_x509_name()?;

    let subject_spki = SubjectPublicKeyInfoOwned::from_der(
        &subject_key.to_der().map_err(|_| Error::InvalidPublicKey)?,
    )?;
    let issuer_spki = SubjectPublicKeyInfoOwned::from_der(
        &issuer.public_key().to_der().map_err(|_| Error::InvalidPublicKey)?,
    )?;
    let (version, extensions) = match template.role {
        Role::Legacy => (Version::V1, None),
        role => (
            Version::V3,
            Some(build_extensions(&subject_name, role, &subject_spki, &issuer_spki)?),
        ),
    };

    let tbs_certificate = TbsCertificateInner {
        version,
        serial_number,
        signature: signature_alg.clone(),
        issuer: issuer_name,
        validity: Validity {
            not_before: encode_time(template.not_before)?,
            not_after: encode_time(template.not_after)?,
        },
        subject: subject_name,
        subject_public_key_info: subject_spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    // Sign the canonical DER encoding of TBSCertificate
    let tbs_der = tbs_certificate.to_der()?;
    let signature = issuer.sign(template.hash, &tbs_der)?;

    Ok(CertificateInner {
        tbs_certificate,
        signature_algorithm: signature_alg,
        signature: BitString::from_bytes(&signature)?,
    })
}

/// Builds basicConstraints, keyUsage and the SKI/AKI key bindings.
fn build_extensions(
    subject_name: &Name,
    role: Role,
    subject_spki: &SubjectPublicKeyInfoOwned,
    issuer_spki: &SubjectPublicKeyInfoOwned,
) -> Result<Vec<Extension>> {
    let mut extensions = Vec::<Extension>::new();

    let usage = match role {
        Role::Leaf => {
            let bc = BasicConstraints {
                ca: false,
                path_len_constraint: None,
            };
            extensions.push(bc.to_extension(subject_name, &extensions)?);
            KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment
        }
        Role::Authority { path_len } => {
            let bc = BasicConstraints {
                ca: true,
                path_len_constraint: path_len,
            };
            extensions.push(bc.to_extension(subject_name, &extensions)?);
            KeyUsages::KeyCertSign | KeyUsages::CRLSign
        }
        Role::Unconstrained | Role::Legacy => KeyUsages::DigitalSignature.into(),
    };
    let ku = KeyUsage(usage);
    extensions.push(ku.to_extension(subject_name, &extensions)?);

    let ski = SubjectKeyIdentifier(OctetString::new(key_identifier(subject_spki))?);
    extensions.push(ski.to_extension(subject_name, &extensions)?);

    let aki = AuthorityKeyIdentifier {
        key_identifier: Some(OctetString::new(key_identifier(issuer_spki))?),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    };
    extensions.push(aki.to_extension(subject_name, &extensions)?);

    Ok(extensions)
}

/// Computes the RFC 5280 method (1) key identifier: SHA-1 of the key bits.
fn key_identifier(spki: &SubjectPublicKeyInfoOwned) -> Vec<u8> {
    Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec()
}

/// Encodes a validity instant as UTCTime before 2050, GeneralizedTime after.
fn encode_time(instant: DateTime<Utc>) -> Result<Time> {
    let secs = u64::try_from(instant.timestamp()).map_err(|_| Error::PreUnixTimestamp)?;
    let since_epoch = Duration::from_secs(secs);
    if secs < GENERALIZED_TIME_FROM {
        Ok(Time::UtcTime(UtcTime::from_unix_duration(since_epoch)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_unix_duration(
            since_epoch,
        )?))
    }
}

#[cfg(test)]
mod test {
    use super::super::*;
    use crate::rsa::{HashAlgorithm, SecretKey};
    use chrono::{TimeZone, Utc};

    fn template() -> Template {
        Template {
            subject: Name::new().cn("Alice"),
            issuer: Name::new().cn("Root"),
            not_before: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            role: Role::Leaf,
            hash: HashAlgorithm::Sha256,
        }
    }

    /// Verifies that an issued certificate carries a signature the issuer key
    /// accepts over the exact TBS bytes.
    #[test]
    fn test_issue_signature_verifies() {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();

        let pem = issue_cert_pem(&subject.public_key(), &issuer, &template()).unwrap();
        let cert = load_certificate(pem.as_bytes()).unwrap();

        issuer
            .public_key()
            .verify(
                cert.signature_hash_algorithm().unwrap(),
                &cert.tbs_certificate_bytes,
                &cert.signature,
            )
            .unwrap();
        assert!(
            subject
                .public_key()
                .verify(
                    cert.signature_hash_algorithm().unwrap(),
                    &cert.tbs_certificate_bytes,
                    &cert.signature,
                )
                .is_err()
        );
    }

    /// Verifies that validity instants past 2049 survive as GeneralizedTime.
    #[test]
    fn test_issue_far_future_validity() {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();

        let mut template = template();
        template.not_after = Utc.with_ymd_and_hms(2070, 1, 1, 0, 0, 0).unwrap();

        let der = issue_cert_der(&subject.public_key(), &issuer, &template).unwrap();
        let cert = load_certificate(&der).unwrap();
        assert_eq!(cert.not_valid_after, template.not_after);
    }

    /// Verifies that serial numbers are random and positive.
    #[test]
    fn test_issue_unique_serials() {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();

        let a = issue_cert_der(&subject.public_key(), &issuer, &template()).unwrap();
        let b = issue_cert_der(&subject.public_key(), &issuer, &template()).unwrap();
        let a = load_certificate(&a).unwrap();
        let b = load_certificate(&b).unwrap();
        assert_ne!(a.serial_number, b.serial_number);
    }

    /// Verifies that a template with not_before > not_after is rejected.
    #[test]
    fn test_issue_rejects_inverted_validity_window() {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();

        let mut template = template();
        std::mem::swap(&mut template.not_before, &mut template.not_after);

        let result = issue_cert_der(&subject.public_key(), &issuer, &template);
        assert!(matches!(result, Err(Error::InvalidValidityWindow)));
    }

    /// Verifies that templates with empty subject or issuer DNs are rejected.
    #[test]
    fn test_issue_rejects_empty_names() {
        let subject = SecretKey::generate(1024).unwrap();
        let issuer = SecretKey::generate(1024).unwrap();

        let template = Template {
            subject: Name::new(),
            ..template()
        };
        let result = issue_cert_der(&subject.public_key(), &issuer, &template);
        assert!(matches!(
            result,
            Err(Error::EmptyDistinguishedName { field: "subject" })
        ));

        let template = Template {
            issuer: Name::new(),
            ..self::template()
        };
        let result = issue_cert_der(&subject.public_key(), &issuer, &template);
        assert!(matches!(
            result,
            Err(Error::EmptyDistinguishedName { field: "issuer" })
        ));
    }
}
