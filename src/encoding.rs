//! Text encodings available to [`DataBuilder::append_text`](crate::DataBuilder::append_text)
//!
//! Each [`TextEncoding`] is a deterministic, total transform from `&str` to
//! bytes. Characters that a single-byte encoding cannot represent are
//! replaced with one `?` per UTF-16 code unit (so a character outside the
//! Basic Multilingual Plane becomes `??`) rather than rejected, and no
//! encoding emits a byte-order mark or terminator.
//!
//! Encodings can also be looked up by label (see [`TextEncoding::from_name`]),
//! which accepts the common IANA names as well as a handful of aliases.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::error::{InvalidArgument, Result};

/// Byte substituted for characters outside of a single-byte repertoire
const REPLACEMENT: u8 = b'?';

/// Supported text encodings
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    /// 7-bit US-ASCII
    #[default]
    Ascii,
    /// ISO-8859-1
    Latin1,
    /// UTF-7 (RFC 2152), without optional direct characters
    Utf7,
    Utf8,
    /// UTF-16, least significant byte of each code unit first
    Utf16Le,
    /// UTF-16, most significant byte of each code unit first
    Utf16Be,
    /// UTF-32, least significant byte first
    Utf32Le,
    /// UTF-32, most significant byte first
    Utf32Be,
}

lazy_static! {
    static ref LABELS: HashMap<&'static str, TextEncoding> = {
        use TextEncoding::*;
        let mut m = HashMap::new();
        for (label, enc) in [
            ("ascii", Ascii),
            ("us-ascii", Ascii),
            ("latin1", Latin1),
            ("latin-1", Latin1),
            ("iso-8859-1", Latin1),
            ("utf-7", Utf7),
            ("utf7", Utf7),
            ("utf-8", Utf8),
            ("utf8", Utf8),
            ("utf-16", Utf16Le),
            ("utf-16le", Utf16Le),
            ("unicode", Utf16Le),
            ("utf-16be", Utf16Be),
            ("unicodefffe", Utf16Be),
            ("bigendianunicode", Utf16Be),
            ("utf-32", Utf32Le),
            ("utf-32le", Utf32Le),
            ("utf-32be", Utf32Be),
        ] {
            m.insert(label, enc);
        }
        m
    };
}

impl TextEncoding {
    /// Looks up an encoding by (case-insensitive) label
    ///
    /// # Examples
    ///
    /// ```
    /// # use databuilder::TextEncoding;
    /// assert_eq!(TextEncoding::from_name("UTF-16BE"), Ok(TextEncoding::Utf16Be));
    /// assert!(TextEncoding::from_name("ebcdic").is_err());
    /// ```
    pub fn from_name(label: &str) -> Result<Self> {
        LABELS
            .get(label.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| InvalidArgument::UnknownEncoding(label.to_owned()))
    }

    /// Canonical label, which [`from_name`](TextEncoding::from_name) maps back to `self`
    pub const fn name(self) -> &'static str {
        match self {
            TextEncoding::Ascii => "us-ascii",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Utf7 => "utf-7",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Utf32Le => "utf-32le",
            TextEncoding::Utf32Be => "utf-32be",
        }
    }

    /// Encodes `text` into a freshly allocated byte vector
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Ascii => narrow(text, 0x7f),
            TextEncoding::Latin1 => narrow(text, 0xff),
            TextEncoding::Utf7 => utf7::encode(text),
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            TextEncoding::Utf32Le => text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
            TextEncoding::Utf32Be => text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
        }
    }
}

/// Single-byte transform; an unrepresentable char yields one `REPLACEMENT` per UTF-16 code unit
fn narrow(text: &str, max: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(b) if u32::from(b) <= max => out.push(b),
            _ => out.extend(std::iter::repeat(REPLACEMENT).take(c.len_utf16())),
        }
    }
    out
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

mod utf7 {
    const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    /// Set D of RFC 2152 plus the whitespace characters that may be encoded directly
    fn is_direct(c: char) -> bool {
        matches!(c,
            'A'..='Z' | 'a'..='z' | '0'..='9'
            | '\'' | '(' | ')' | ',' | '-' | '.' | '/' | ':' | '?'
            | ' ' | '\t' | '\r' | '\n')
    }

    fn is_base64(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '+' || c == '/'
    }

    /// Pending bits of a shifted (base64) run
    #[derive(Default)]
    struct Shift {
        bits: u32,
        n_bits: u32,
    }

    impl Shift {
        fn push_unit(&mut self, unit: u16, out: &mut Vec<u8>) {
            self.bits = (self.bits << 16) | u32::from(unit);
            self.n_bits += 16;
            while self.n_bits >= 6 {
                self.n_bits -= 6;
                out.push(BASE64[((self.bits >> self.n_bits) & 0x3f) as usize]);
            }
            self.bits &= (1 << self.n_bits) - 1;
        }

        /// Emits any leftover bits, zero-padded to a full sextet
        fn flush(&mut self, out: &mut Vec<u8>) {
            if self.n_bits > 0 {
                out.push(BASE64[((self.bits << (6 - self.n_bits)) & 0x3f) as usize]);
            }
            *self = Shift::default();
        }
    }

    pub(super) fn encode(text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        let mut shift: Option<Shift> = None;

        for c in text.chars() {
            if is_direct(c) {
                if let Some(mut s) = shift.take() {
                    s.flush(&mut out);
                    if is_base64(c) || c == '-' {
                        out.push(b'-');
                    }
                }
                out.push(c as u8);
            } else if c == '+' && shift.is_none() {
                out.extend_from_slice(b"+-");
            } else {
                let s = shift.get_or_insert_with(|| {
                    out.push(b'+');
                    Shift::default()
                });
                let mut units = [0u16; 2];
                for &unit in c.encode_utf16(&mut units).iter() {
                    s.push_unit(unit, &mut out);
                }
            }
        }

        if let Some(mut s) = shift {
            s.flush(&mut out);
            out.push(b'-');
        }
        out
    }
}
