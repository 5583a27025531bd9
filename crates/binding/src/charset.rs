//! Charset handling for text bodies.
//!
//! Covers the charsets that actually occur as HTTP text defaults. Anything
//! else fails the call with [`RequestError::UnsupportedCharset`] instead of
//! guessing.

use std::fmt;

use bytes::Bytes;
use mime::Mime;

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl Charset {
    /// Parses a charset label, case-insensitively, accepting common aliases.
    pub fn parse(label: &str) -> Result<Self, RequestError> {
        let normalized = label.trim().trim_matches('"').to_ascii_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" | "ansi_x3.4-1968" => Ok(Self::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1" | "cp819" => Ok(Self::Latin1),
            _ => Err(RequestError::unsupported_charset(label.trim())),
        }
    }

    /// Encodes text into bytes. Characters outside the target repertoire are
    /// replaced with `?`, matching the usual lossy encode behavior.
    pub fn encode(self, text: &str) -> Bytes {
        match self {
            Self::Utf8 => Bytes::copy_from_slice(text.as_bytes()),
            Self::Ascii => text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect::<Vec<u8>>().into(),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    let code = c as u32;
                    if code <= 0xFF { code as u8 } else { b'?' }
                })
                .collect::<Vec<u8>>()
                .into(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "us-ascii",
            Self::Latin1 => "iso-8859-1",
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extracts the charset label from a content-type value, e.g.
/// `text/plain; charset=UTF-8` yields `UTF-8`. `None` when the value does not
/// parse as a mime type or carries no charset parameter.
pub fn content_type_charset(value: &str) -> Option<String> {
    let mime = value.trim().parse::<Mime>().ok()?;
    mime.get_param(mime::CHARSET).map(|charset| charset.as_str().trim_matches('"').to_owned())
}
