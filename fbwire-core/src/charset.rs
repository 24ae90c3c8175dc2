//! Charset definitions and encode/decode helpers for CHAR/VARCHAR columns.

use encoding::{all, types::EncodingRef, DecoderTrap, EncoderTrap};
use std::str;

use crate::FbError;

/// A charset the wire engine can encode parameters into and decode columns
/// from. `fb` is the name as Firebird spells it in the DPB/TPB `lc_ctype`
/// item.
pub struct Charset {
    pub fb: &'static str,
    pub codec: Option<EncodingRef>,
}

impl Charset {
    pub fn decode(&self, bytes: &[u8]) -> Result<String, FbError> {
        if let Some(codec) = self.codec {
            codec
                .decode(bytes, DecoderTrap::Strict)
                .map_err(|e| format!("invalid {} string: {}", codec.name(), e).into())
        } else {
            str::from_utf8(bytes)
                .map(|s| s.to_string())
                .map_err(|e| format!("invalid UTF-8 string: {}", e).into())
        }
    }

    pub fn encode(&self, s: &str) -> Result<Vec<u8>, FbError> {
        if let Some(codec) = self.codec {
            codec
                .encode(s, EncoderTrap::Strict)
                .map_err(|e| format!("invalid {} string: {}", codec.name(), e).into())
        } else {
            Ok(s.as_bytes().to_vec())
        }
    }
}

impl Clone for Charset {
    fn clone(&self) -> Self {
        Self {
            fb: self.fb,
            codec: self.codec,
        }
    }
}

pub const UTF_8: Charset = Charset {
    fb: "UTF8",
    codec: None,
};

pub const ISO_8859_1: Charset = Charset {
    fb: "ISO8859_1",
    codec: Some(all::ISO_8859_1),
};

pub const WIN_1252: Charset = Charset {
    fb: "WIN1252",
    codec: Some(all::WINDOWS_1252),
};

/// Looks up a charset by the name Firebird uses for `isc_dpb_lc_ctype`,
/// falling back to UTF-8 for anything not in this short list.
pub fn by_firebird_name(name: &str) -> Charset {
    match name.to_uppercase().as_str() {
        "ISO8859_1" => ISO_8859_1.clone(),
        "WIN1252" => WIN_1252.clone(),
        _ => UTF_8.clone(),
    }
}
