//! Lossy UTF-8 decoding with an explicit policy.
//!
//! Container files frequently surround embedded text with binary garbage, so
//! the byte span handed to a decoder is rarely clean UTF-8. Rather than
//! letting the lossy behavior hide inside call sites, the policy is an
//! explicit parameter.

use std::borrow::Cow;

use crate::Result;

/// How to treat invalid UTF-8 sequences when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Fail on the first invalid sequence.
    Strict,
    /// Substitute U+FFFD for each invalid sequence.
    Replace,
    /// Silently drop invalid sequences.
    #[default]
    Drop,
}

/// Decode a byte slice as UTF-8 according to `policy`.
pub fn decode_text(bytes: &[u8], policy: DecodePolicy) -> Result<Cow<'_, str>> {
    match policy {
        DecodePolicy::Strict => Ok(Cow::Borrowed(std::str::from_utf8(bytes)?)),
        DecodePolicy::Replace => Ok(String::from_utf8_lossy(bytes)),
        DecodePolicy::Drop => Ok(decode_dropping(bytes)),
    }
}

/// Decode while skipping invalid sequences entirely.
fn decode_dropping(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let mut out = String::with_capacity(bytes.len());
            let mut rest = bytes;
            loop {
                match std::str::from_utf8(rest) {
                    Ok(s) => {
                        out.push_str(s);
                        break;
                    }
                    Err(e) => {
                        let (valid, invalid) = rest.split_at(e.valid_up_to());
                        // Valid prefix is guaranteed UTF-8 by valid_up_to.
                        out.push_str(unsafe { std::str::from_utf8_unchecked(valid) });
                        match e.error_len() {
                            Some(len) => rest = &invalid[len..],
                            None => break,
                        }
                    }
                }
            }
            Cow::Owned(out)
        }
    }
}
