// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Explicit validation of a root ← intermediate ← end-entity chain.
//!
//! The validator runs a fixed sequence of checks and stops at the first one
//! that fails:
//!
//! 1. time validity of the end-entity and the intermediate (the root is only
//!    warned about, unless [`Policy::enforce_root_validity`] is set)
//! 2. basicConstraints `CA=true` on the intermediate
//! 3. the end-entity signature under the intermediate key
//! 4. the intermediate signature under the root key
//!
//! Signatures are RSA PKCS#1 v1.5 using whatever digest the signed
//! certificate declares. No Extended Key Usage, revocation or name constraint
//! processing takes place.

mod report;

pub use report::{Collector, Diagnostic, LogReporter, Reporter};

use crate::x509::{Certificate, HashAlgorithm, PublicKey, SignatureAlgorithm};
use chrono::{DateTime, Utc};
use log::Level;
use std::fmt;

/// Identifies an individual check of the validation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// A certificate is outside its validity window.
    TimeValidity,
    /// The intermediate is not allowed to act as a CA.
    BasicConstraints,
    /// The end-entity was not signed by the intermediate.
    EndEntitySignature,
    /// The intermediate was not signed by the root.
    IntermediateSignature,
    /// Issuer and subject names do not link up. Only run when
    /// [`Policy::require_name_chaining`] is set.
    NameChaining,
    /// A certificate declares a digest outside the allow-list. Only run when
    /// [`Policy::allowed_hash_algorithms`] is set.
    SignatureAlgorithm,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::TimeValidity => "time validity",
            CheckKind::BasicConstraints => "basic constraints",
            CheckKind::EndEntitySignature => "end-entity signature",
            CheckKind::IntermediateSignature => "intermediate signature",
            CheckKind::NameChaining => "name chaining",
            CheckKind::SignatureAlgorithm => "signature algorithm",
        };
        f.write_str(name)
    }
}

/// Outcome of a validation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed.
    Valid,
    /// The named check failed; later checks were not run.
    Invalid {
        failing_check: CheckKind,
        detail: String,
    },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Returns the failing check, if any.
    pub fn failing_check(&self) -> Option<CheckKind> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid { failing_check, .. } => Some(*failing_check),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => f.write_str("valid"),
            Verdict::Invalid {
                failing_check,
                detail,
            } => write!(f, "invalid ({failing_check}): {detail}"),
        }
    }
}

/// Validation knobs. The default reproduces the lenient behaviour: root
/// expiry only warns, any supported digest is accepted and names are not
/// compared.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    /// Require `end_entity.issuer == intermediate.subject` and
    /// `intermediate.issuer == root.subject` as a final check.
    pub require_name_chaining: bool,
    /// Restrict the digests certificates may declare for their signature.
    /// `None` trusts the declared algorithm.
    pub allowed_hash_algorithms: Option<Vec<HashAlgorithm>>,
    /// Fail instead of warn when the root is outside its validity window.
    pub enforce_root_validity: bool,
}

/// Verdict along with every diagnostic emitted while producing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub verdict: Verdict,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validates a chain with the default policy, logging through `log`.
pub fn validate(
    root: &Certificate,
    intermediate: &Certificate,
    end_entity: &Certificate,
    at: DateTime<Utc>,
) -> Verdict {
    Validator::default().validate(root, intermediate, end_entity, at)
}

/// Three-certificate chain validator.
///
/// The validator holds nothing but its policy, so a single instance can be
/// shared across threads and reused for any number of chains.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    policy: Policy,
}

impl Validator {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Validates the chain at `at`, forwarding diagnostics to `log`.
    pub fn validate(
        &self,
        root: &Certificate,
        intermediate: &Certificate,
        end_entity: &Certificate,
        at: DateTime<Utc>,
    ) -> Verdict {
        self.validate_with(root, intermediate, end_entity, at, &mut LogReporter)
    }

    /// Validates the chain at `at`, returning the diagnostics alongside.
    pub fn validate_report(
        &self,
        root: &Certificate,
        intermediate: &Certificate,
        end_entity: &Certificate,
        at: DateTime<Utc>,
    ) -> Report {
        let mut collector = Collector::default();
        let verdict = self.validate_with(root, intermediate, end_entity, at, &mut collector);
        Report {
            verdict,
            diagnostics: collector.diagnostics,
        }
    }

    /// Validates the chain at `at`, emitting diagnostics into `reporter`.
    pub fn validate_with(
        &self,
        root: &Certificate,
        intermediate: &Certificate,
        end_entity: &Certificate,
        at: DateTime<Utc>,
        reporter: &mut dyn Reporter,
    ) -> Verdict {
        let chain = Chain {
            root,
            intermediate,
            end_entity,
        };
        let mut run = Run {
            policy: &self.policy,
            reporter,
            at,
        };
        match run.execute(&chain) {
            Ok(()) => Verdict::Valid,
            Err(failure) => {
                run.emit(Level::Error, failure.check, failure.detail.clone());
                Verdict::Invalid {
                    failing_check: failure.check,
                    detail: failure.detail,
                }
            }
        }
    }
}

/// Slot a certificate occupies in the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Root,
    Intermediate,
    EndEntity,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Position::Root => "root CA",
            Position::Intermediate => "intermediate CA",
            Position::EndEntity => "end-entity",
        };
        f.write_str(name)
    }
}

struct Chain<'a> {
    root: &'a Certificate,
    intermediate: &'a Certificate,
    end_entity: &'a Certificate,
}

/// A failed check along with its diagnostic.
struct Failure {
    check: CheckKind,
    detail: String,
}

impl Failure {
    fn new(check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            check,
            detail: detail.into(),
        }
    }
}

/// State of a single validation call.
struct Run<'a> {
    policy: &'a Policy,
    reporter: &'a mut dyn Reporter,
    at: DateTime<Utc>,
}

impl Run<'_> {
    fn emit(&mut self, level: Level, check: CheckKind, message: impl Into<String>) {
        self.reporter.report(Diagnostic {
            level,
            check,
            message: message.into(),
        });
    }

    fn execute(&mut self, chain: &Chain<'_>) -> Result<(), Failure> {
        self.emit(
            Level::Debug,
            CheckKind::TimeValidity,
            format!("validating at {}", self.at.to_rfc3339()),
        );
        self.check_time(chain.end_entity, Position::EndEntity)?;
        self.check_time(chain.intermediate, Position::Intermediate)?;
        self.check_root_time(chain.root)?;

        self.check_basic_constraints(chain.intermediate)?;

        self.check_signature(
            chain.end_entity,
            Position::EndEntity,
            chain.intermediate,
            Position::Intermediate,
            CheckKind::EndEntitySignature,
        )?;
        self.check_signature(
            chain.intermediate,
            Position::Intermediate,
            chain.root,
            Position::Root,
            CheckKind::IntermediateSignature,
        )?;

        if self.policy.require_name_chaining {
            self.check_name_chaining(chain)?;
        }
        Ok(())
    }

    fn check_time(&mut self, cert: &Certificate, position: Position) -> Result<(), Failure> {
        if !cert.is_valid_at(self.at) {
            return Err(Failure::new(
                CheckKind::TimeValidity,
                format!(
                    "{position} certificate {} is not valid at {}: validity window is {} to {}",
                    cert.subject,
                    self.at.to_rfc3339(),
                    cert.not_valid_before.to_rfc3339(),
                    cert.not_valid_after.to_rfc3339()
                ),
            ));
        }
        self.emit(
            Level::Info,
            CheckKind::TimeValidity,
            format!("{position} certificate is within its validity window"),
        );
        Ok(())
    }

    /// Root expiry only warns by default. Trust anchors are trusted by
    /// configuration, not by their own stated lifetime.
    fn check_root_time(&mut self, root: &Certificate) -> Result<(), Failure> {
        if self.policy.enforce_root_validity {
            return self.check_time(root, Position::Root);
        }
        if root.is_valid_at(self.at) {
            self.emit(
                Level::Info,
                CheckKind::TimeValidity,
                "root CA certificate is within its validity window",
            );
        } else {
            self.emit(
                Level::Warn,
                CheckKind::TimeValidity,
                format!(
                    "root CA certificate {} is not valid at {} (window {} to {}), accepted",
                    root.subject,
                    self.at.to_rfc3339(),
                    root.not_valid_before.to_rfc3339(),
                    root.not_valid_after.to_rfc3339()
                ),
            );
        }
        Ok(())
    }

    fn check_basic_constraints(&mut self, intermediate: &Certificate) -> Result<(), Failure> {
        let bc = intermediate
            .extensions
            .basic_constraints()
            .map_err(|err| {
                Failure::new(
                    CheckKind::BasicConstraints,
                    format!("intermediate CA basicConstraints extension is malformed: {err}"),
                )
            })?
            .ok_or_else(|| {
                Failure::new(
                    CheckKind::BasicConstraints,
                    format!(
                        "intermediate CA certificate {} lacks the basicConstraints extension",
                        intermediate.subject
                    ),
                )
            })?;

        if !bc.is_ca {
            return Err(Failure::new(
                CheckKind::BasicConstraints,
                format!(
                    "intermediate CA certificate {} has CA=false in basicConstraints",
                    intermediate.subject
                ),
            ));
        }
        self.emit(
            Level::Info,
            CheckKind::BasicConstraints,
            "intermediate CA has CA=true in basicConstraints",
        );
        // Nothing sits below the intermediate except the end-entity, so any
        // path length satisfies the chain. Surface it for the record.
        if let Some(len) = bc.path_length {
            self.emit(
                Level::Info,
                CheckKind::BasicConstraints,
                format!("intermediate CA path length constraint: {len}"),
            );
        }
        Ok(())
    }

    fn check_signature(
        &mut self,
        subject: &Certificate,
        subject_position: Position,
        issuer: &Certificate,
        issuer_position: Position,
        check: CheckKind,
    ) -> Result<(), Failure> {
        let hash = match subject.signature_algorithm {
            SignatureAlgorithm::RsaPkcs1v15(hash) => hash,
            SignatureAlgorithm::Unsupported { algorithm } => {
                return Err(Failure::new(
                    check,
                    format!(
                        "{subject_position} is signed with {algorithm}, not RSA PKCS#1 v1.5"
                    ),
                ));
            }
        };
        if let Some(allowed) = &self.policy.allowed_hash_algorithms
            && !allowed.contains(&hash)
        {
            return Err(Failure::new(
                CheckKind::SignatureAlgorithm,
                format!(
                    "{subject_position} certificate is signed with {hash}, not allowed by policy"
                ),
            ));
        }

        let key = match &issuer.public_key {
            PublicKey::Rsa(key) => key,
            PublicKey::Unsupported { algorithm } => {
                return Err(Failure::new(
                    check,
                    format!("{issuer_position} public key {algorithm} is not an RSA key"),
                ));
            }
        };
        key.verify(hash, &subject.tbs_certificate_bytes, &subject.signature)
            .map_err(|err| {
                let detail = format!("{subject_position} {hash} signature does not verify");
                Failure::new(check, format!("{detail} with the {issuer_position} key: {err}"))
            })?;

        self.emit(
            Level::Info,
            check,
            format!("{subject_position} signature verified using the {issuer_position} public key"),
        );
        Ok(())
    }

    fn check_name_chaining(&mut self, chain: &Chain<'_>) -> Result<(), Failure> {
        let links = [
            (chain.end_entity, Position::EndEntity, chain.intermediate, Position::Intermediate),
            (chain.intermediate, Position::Intermediate, chain.root, Position::Root),
        ];
        for (subject, subject_position, issuer, issuer_position) in links {
            if !subject.issuer.matches(&issuer.subject) {
                return Err(Failure::new(
                    CheckKind::NameChaining,
                    format!(
                        "{subject_position} issuer {} does not match {issuer_position} subject {}",
                        subject.issuer, issuer.subject
                    ),
                ));
            }
        }
        self.emit(
            Level::Info,
            CheckKind::NameChaining,
            "issuer and subject names link up along the chain",
        );
        Ok(())
    }
}
