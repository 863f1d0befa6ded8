// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{Error, Result};
use const_oid::ObjectIdentifier;
use der::Tag;
use der::asn1::{Any, SetOfVec};
use std::fmt;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_parser::x509::X509Name;

/// OID for CommonName (2.5.4.3).
pub const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// OID for CountryName (2.5.4.6).
pub const OID_C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// OID for LocalityName (2.5.4.7).
pub const OID_L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// OID for StateOrProvinceName (2.5.4.8).
pub const OID_ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
/// OID for OrganizationName (2.5.4.10).
pub const OID_O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// OID for OrganizationalUnitName (2.5.4.11).
pub const OID_OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
/// OID for SerialNumber (2.5.4.5).
pub const OID_SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");

/// A DN attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameValue {
    /// Any textual string type (UTF8String, PrintableString, IA5String, ...).
    Utf8(String),
    /// PrintableString value, only distinguished when issuing.
    Printable(String),
    /// Raw bytes for non-text or undecodable values.
    Bytes(Vec<u8>),
}

impl NameValue {
    fn as_any(&self) -> Result<Any> {
        match self {
            NameValue::Utf8(value) => Ok(Any::new(Tag::Utf8String, value.as_bytes())?),
            NameValue::Printable(value) => {
                if !is_printable_string(value) {
                    return Err(Error::InvalidPrintableString);
                }
                Ok(Any::new(Tag::PrintableString, value.as_bytes())?)
            }
            NameValue::Bytes(_) => Err(Error::RawNameValueNotAllowedForIssuance),
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            NameValue::Utf8(value) | NameValue::Printable(value) => Some(value),
            NameValue::Bytes(_) => None,
        }
    }
}

fn is_printable_string(value: &str) -> bool {
    value.as_bytes().iter().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                *b,
                b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
            )
    })
}

/// A single DN attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameAttribute {
    /// Attribute OID (for example `2.5.4.3` for CN).
    pub oid: ObjectIdentifier,
    /// Attribute value.
    pub value: NameValue,
}

impl NameAttribute {
    /// Equality used for issuer/subject chaining. Text values compare by
    /// content regardless of the ASN.1 string type they were encoded with.
    fn matches(&self, other: &NameAttribute) -> bool {
        if self.oid != other.oid {
            return false;
        }
        match (self.value.text(), other.value.text()) {
            (Some(a), Some(b)) => a == b,
            _ => self.value == other.value,
        }
    }
}

/// Distinguished Name represented as ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    /// Ordered list of RDN attributes.
    pub attrs: Vec<NameAttribute>,
}

impl DistinguishedName {
    /// Creates an empty DN.
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Adds a UTF8String CN attribute.
    pub fn cn(self, value: impl Into<String>) -> Self {
        self.push(OID_CN, NameValue::Utf8(value.into()))
    }

    /// Adds a UTF8String O attribute.
    pub fn o(self, value: impl Into<String>) -> Self {
        self.push(OID_O, NameValue::Utf8(value.into()))
    }

    /// Adds a PrintableString C attribute.
    pub fn c(self, value: impl Into<String>) -> Self {
        self.push(OID_C, NameValue::Printable(value.into()))
    }

    /// Adds an arbitrary attribute.
    pub fn push(mut self, oid: ObjectIdentifier, value: NameValue) -> Self {
        self.attrs.push(NameAttribute { oid, value });
        self
    }

    /// Returns the first CN attribute, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.oid == OID_CN)
            .and_then(|attr| attr.value.text())
    }

    /// Reports whether two names denote the same entity for chaining purposes.
    pub fn matches(&self, other: &DistinguishedName) -> bool {
        self.attrs.len() == other.attrs.len()
            && self.attrs.iter().zip(&other.attrs).all(|(a, b)| a.matches(b))
    }

    pub(super) fn from_parsed(name: &X509Name<'_>) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in name.iter_attributes() {
            let value = match attr.as_str() {
                Ok(text) => NameValue::Utf8(text.to_string()),
                Err(_) => NameValue::Bytes(attr.as_slice().to_vec()),
            };
            attrs.push(NameAttribute {
                oid: ObjectIdentifier::new(attr.attr_type().to_id_string().as_str())?,
                value,
            });
        }
        Ok(Self { attrs })
    }

    pub(super) fn to_x509_name(&self) -> Result<Name> {
        let mut rdns = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let mut set = SetOfVec::new();
            set.insert(AttributeTypeAndValue {
                oid: attr.oid,
                value: attr.value.as_any()?,
            })?;
            rdns.push(RelativeDistinguishedName::from(set));
        }
        Ok(RdnSequence(rdns))
    }
}

impl fmt::Display for DistinguishedName {
    /// Renders the name in RFC 4514 order (most specific attribute first).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attrs.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match short_name(&attr.oid) {
                Some(short) => write!(f, "{short}=")?,
                None => write!(f, "{}=", attr.oid)?,
            }
            match &attr.value {
                NameValue::Utf8(value) | NameValue::Printable(value) => f.write_str(value)?,
                NameValue::Bytes(bytes) => write!(f, "#{}", hex::encode(bytes))?,
            }
        }
        Ok(())
    }
}

fn short_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    [
        (OID_CN, "CN"),
        (OID_C, "C"),
        (OID_L, "L"),
        (OID_ST, "ST"),
        (OID_O, "O"),
        (OID_OU, "OU"),
        (OID_SERIAL_NUMBER, "serialNumber"),
    ]
    .into_iter()
    .find(|(known, _)| known == oid)
    .map(|(_, short)| short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_reverses_rdns() {
        let name = DistinguishedName::new().c("HU").o("Dark Bio").cn("Root CA");
        assert_eq!(name.to_string(), "CN=Root CA,O=Dark Bio,C=HU");
        assert_eq!(name.common_name(), Some("Root CA"));
    }

    #[test]
    fn test_display_unknown_oid() {
        let oid = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.62253.42");
        let name = DistinguishedName::new().push(oid, NameValue::Bytes(vec![0xca, 0xfe]));
        assert_eq!(name.to_string(), "1.3.6.1.4.1.62253.42=#cafe");
    }

    #[test]
    fn test_matches_ignores_string_type() {
        let printable = DistinguishedName::new().push(OID_CN, NameValue::Printable("CA".into()));
        let utf8 = DistinguishedName::new().cn("CA");
        assert!(printable.matches(&utf8));
        assert!(!utf8.matches(&DistinguishedName::new().cn("Other CA")));
        assert!(!utf8.matches(&DistinguishedName::new().cn("CA").o("Extra")));
    }

    #[test]
    fn test_issuance_rejects_bad_values() {
        let name = DistinguishedName::new().c("H*U");
        assert!(matches!(name.to_x509_name(), Err(Error::InvalidPrintableString)));

        let name = DistinguishedName::new().push(OID_CN, NameValue::Bytes(vec![1]));
        assert!(matches!(
            name.to_x509_name(),
            Err(Error::RawNameValueNotAllowedForIssuance)
        ));
    }
}
