// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::CheckKind;
use log::Level;
use std::fmt;

/// A single levelled event emitted while a check runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the event.
    pub level: Level,
    /// Check that produced the event.
    pub check: CheckKind,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.check, self.message)
    }
}

/// Sink for diagnostics produced during validation.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::log!(
            target: "chainval::chain",
            diagnostic.level,
            "{}: {}",
            diagnostic.check,
            diagnostic.message
        );
    }
}

/// Buffers diagnostics in memory.
#[derive(Clone, Debug, Default)]
pub struct Collector {
    pub diagnostics: Vec<Diagnostic>,
}

impl Reporter for Collector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
