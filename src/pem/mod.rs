// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Strict single-block PEM encoding and decoding.
//!
//! https://datatracker.ietf.org/doc/html/rfc7468

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const BEGIN: &[u8] = b"-----BEGIN ";
const END: &[u8] = b"-----END ";
const DASHES: &[u8] = b"-----";

/// Error type used by the PEM codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("missing PEM header")]
    MissingHeader,
    #[error("malformed PEM header")]
    MalformedHeader,
    #[error("empty PEM label")]
    EmptyLabel,
    #[error("PEM label is not valid UTF-8")]
    InvalidLabel,
    #[error("missing PEM footer for {label}")]
    MissingFooter { label: String },
    #[error("empty PEM body")]
    EmptyBody,
    #[error("PEM body must end with a line break before the footer")]
    UnterminatedBody,
    #[error("trailing data after PEM block")]
    TrailingData,
    #[error("invalid base64 in PEM body: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A decoded PEM block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Label between the BEGIN/END markers, e.g. `CERTIFICATE`.
    pub label: String,
    /// Decoded binary contents.
    pub contents: Vec<u8>,
}

/// Decodes exactly one PEM block.
///
/// The header must start at byte 0, line endings must be consistently `\n`
/// or `\r\n`, and nothing but a single line ending may follow the footer.
pub fn decode(data: &[u8]) -> Result<Block, Error> {
    if !data.starts_with(BEGIN) {
        return Err(Error::MissingHeader);
    }
    let header_end = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(Error::MalformedHeader)?;

    // The first line decides the line ending for the whole block
    let newline: &[u8] = if header_end > 0 && data[header_end - 1] == b'\r' {
        b"\r\n"
    } else {
        b"\n"
    };
    let header = &data[..header_end + 1 - newline.len()];
    if !header.ends_with(DASHES) || header.len() < BEGIN.len() + DASHES.len() {
        return Err(Error::MalformedHeader);
    }
    let label = &header[BEGIN.len()..header.len() - DASHES.len()];
    if label.is_empty() {
        return Err(Error::EmptyLabel);
    }
    let label = std::str::from_utf8(label)
        .map_err(|_| Error::InvalidLabel)?
        .to_string();

    let mut footer = Vec::with_capacity(END.len() + label.len() + DASHES.len());
    footer.extend_from_slice(END);
    footer.extend_from_slice(label.as_bytes());
    footer.extend_from_slice(DASHES);

    let rest = &data[header_end + 1..];
    let footer_at = rest
        .windows(footer.len())
        .position(|w| w == footer.as_slice())
        .ok_or_else(|| Error::MissingFooter {
            label: label.clone(),
        })?;

    let tail = &rest[footer_at + footer.len()..];
    if !tail.is_empty() && tail != newline {
        return Err(Error::TrailingData);
    }
    let body = &rest[..footer_at];
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }
    if !body.ends_with(newline) {
        return Err(Error::UnterminatedBody);
    }
    let body = &body[..body.len() - newline.len()];

    let b64: Vec<u8> = body
        .split(|&b| b == b'\n')
        .flat_map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .copied()
        .collect();

    Ok(Block {
        label,
        contents: STANDARD.decode(&b64)?,
    })
}

/// Encodes data as a PEM block with 64 character lines and `\n` endings.
pub fn encode(label: &str, data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);

    let mut buf = String::with_capacity(b64.len() + b64.len() / 64 + 2 * label.len() + 32);
    buf.push_str("-----BEGIN ");
    buf.push_str(label);
    buf.push_str("-----\n");

    // Base64 output is pure ASCII, so splitting on any byte boundary is safe
    let mut line = b64.as_str();
    while !line.is_empty() {
        let (head, tail) = line.split_at(line.len().min(64));
        buf.push_str(head);
        buf.push('\n');
        line = tail;
    }
    buf.push_str("-----END ");
    buf.push_str(label);
    buf.push_str("-----\n");
    buf
}
