// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RSA PKCS#1 v1.5 signature wrappers and parametrization.
//!
//! https://datatracker.ietf.org/doc/html/rfc8017

use const_oid::ObjectIdentifier;
use der::Decode;
use rsa::pkcs8::EncodePublicKey;
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;

/// OID for rsaEncryption: 1.2.840.113549.1.1.1
pub const OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Largest modulus accepted from certificates. Trust anchors with 8192 bit
/// keys exist in the wild, so this is above the upstream 4096 bit default.
pub const MAX_MODULUS_BITS: usize = 16384;

/// Digest used inside a PKCS#1 v1.5 signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// All digests the verifier knows how to dispatch.
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Maps a `*WithRSAEncryption` signature algorithm OID to its digest.
    pub fn from_signature_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.signature_oid() == *oid)
    }

    /// Returns the `*WithRSAEncryption` signature algorithm OID (RFC 4055).
    pub fn signature_oid(&self) -> ObjectIdentifier {
        match self {
            Self::Sha1 => ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5"),
            Self::Sha224 => ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.14"),
            Self::Sha256 => ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11"),
            Self::Sha384 => ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12"),
            Self::Sha512 => ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13"),
        }
    }

    /// Hashes the message with this digest.
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(message).to_vec(),
            Self::Sha224 => Sha224::digest(message).to_vec(),
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn padding(&self) -> Pkcs1v15Sign {
        match self {
            Self::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            Self::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            Self::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            Self::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    /// Parses a lowercase name such as `sha256`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Some(Self::Sha1),
            "sha224" => Some(Self::Sha224),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sha1 => "SHA-1",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

/// SecretKey contains an RSA private key usable for PKCS#1 v1.5 signing. It
/// exists to issue certificates, the validator itself only needs public keys.
#[derive(Clone)]
pub struct SecretKey {
    inner: RsaPrivateKey,
}

impl SecretKey {
    /// generate creates a new, random private key with the given modulus size.
    pub fn generate(bits: usize) -> Result<Self, rsa::Error> {
        let inner = RsaPrivateKey::new(&mut OsRng, bits)?;
        Ok(Self { inner })
    }

    /// public_key retrieves the public counterpart of the secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
        }
    }

    /// sign creates a PKCS#1 v1.5 signature of the message.
    pub fn sign(&self, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<u8>, rsa::Error> {
        let digest = hash.digest(message);
        self.inner.sign(hash.padding(), &digest)
    }
}

/// PublicKey contains an RSA public key usable for PKCS#1 v1.5 verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// from_pkcs1_der parses a PKCS#1 `RSAPublicKey`, the payload of the
    /// subjectPublicKey bit string in an rsaEncryption SPKI.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, rsa::Error> {
        let key = rsa::pkcs1::RsaPublicKey::from_der(der).map_err(|_| rsa::Error::InvalidModulus)?;
        let n = BigUint::from_bytes_be(key.modulus.as_bytes());
        let e = BigUint::from_bytes_be(key.public_exponent.as_bytes());
        let inner = RsaPublicKey::new_with_max_size(n, e, MAX_MODULUS_BITS)?;
        Ok(Self { inner })
    }

    /// to_der serializes a public key into a SubjectPublicKeyInfo DER buffer.
    pub fn to_der(&self) -> Result<Vec<u8>, rsa::pkcs8::spki::Error> {
        Ok(self.inner.to_public_key_der()?.as_bytes().to_vec())
    }

    /// bits returns the size of the modulus.
    pub fn bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// verify checks a PKCS#1 v1.5 signature over the message.
    pub fn verify(
        &self,
        hash: HashAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), rsa::Error> {
        let digest = hash.digest(message);
        self.inner.verify(hash.padding(), &digest, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests signing and verifying messages with every supported digest. This is
    // an API sanity check, not a test of the underlying cryptography.
    #[test]
    fn test_sign_verify() {
        let secret = SecretKey::generate(1024).unwrap();
        let public = secret.public_key();

        for hash in HashAlgorithm::ALL {
            let signature = secret.sign(hash, b"message to authenticate").unwrap();
            public
                .verify(hash, b"message to authenticate", &signature)
                .unwrap_or_else(|e| panic!("failed to verify {hash} signature: {e}"));

            // Different message, or a different digest must both fail
            assert!(public.verify(hash, b"another message", &signature).is_err());
            let other = if hash == HashAlgorithm::Sha256 {
                HashAlgorithm::Sha512
            } else {
                HashAlgorithm::Sha256
            };
            assert!(public.verify(other, b"message to authenticate", &signature).is_err());
        }
    }

    // Tests that the signature OIDs map back to their digests.
    #[test]
    fn test_signature_oids() {
        for hash in HashAlgorithm::ALL {
            assert_eq!(HashAlgorithm::from_signature_oid(&hash.signature_oid()), Some(hash));
        }
        // ecdsa-with-SHA256 is not an RSA signature
        let ecdsa = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
        assert_eq!(HashAlgorithm::from_signature_oid(&ecdsa), None);
    }

    #[test]
    fn test_hash_names() {
        assert_eq!(HashAlgorithm::from_name("sha256"), Some(HashAlgorithm::Sha256));
        assert_eq!(HashAlgorithm::from_name("SHA-384"), Some(HashAlgorithm::Sha384));
        assert_eq!(HashAlgorithm::from_name("md5"), None);
    }

    // Tests that the public key can be rebuilt from the raw PKCS#1 payload of
    // its SubjectPublicKeyInfo encoding.
    #[test]
    fn test_key_codecs() {
        let secret = SecretKey::generate(1024).unwrap();
        let spki = secret.public_key().to_der().unwrap();
        let spki = x509_cert::spki::SubjectPublicKeyInfoOwned::from_der(&spki).unwrap();
        let public = PublicKey::from_pkcs1_der(spki.subject_public_key.raw_bytes()).unwrap();
        assert_eq!(public, secret.public_key());
        assert_eq!(public.bits(), 1024);
    }

    #[test]
    fn test_pkcs1_rejects_garbage() {
        assert!(PublicKey::from_pkcs1_der(&[0x30, 0x03, 0x02, 0x01, 0x00]).is_err());
        assert!(PublicKey::from_pkcs1_der(b"not der").is_err());
    }
}
