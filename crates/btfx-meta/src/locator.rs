//! Multi-strategy locator for the embedded XML block.
//!
//! Three strategies are tried in a fixed order and the first match wins:
//!
//! 1. scan the whole file for an XML declaration followed by a closing tag;
//! 2. scan for literal `<XML>` / `</XML>` markers;
//! 3. read the fixed BTF header and follow its offset/length fields.
//!
//! All strategies failing is a normal outcome, not an error; the container
//! simply carries no metadata this tool can find.

use std::fmt;
use std::sync::OnceLock;

use btfx_common::memchr::memmem;
use btfx_common::{decode_text, DecodePolicy};
use regex::bytes::Regex;

use crate::header::BtfHeader;

/// Which strategy located the XML block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<?xml ... ?>` declaration scan over the whole file.
    DeclScan,
    /// Literal `<XML>` / `</XML>` marker scan.
    MarkerScan,
    /// Offset/length fields in the fixed BTF header.
    HeaderOffset,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclScan => write!(f, "declaration scan"),
            Self::MarkerScan => write!(f, "marker scan"),
            Self::HeaderOffset => write!(f, "header offset"),
        }
    }
}

/// A located and leniently decoded XML block.
#[derive(Debug, Clone)]
pub struct Located {
    /// Decoded XML text; invalid byte sequences are dropped.
    pub text: String,
    /// The strategy that produced the match.
    pub strategy: Strategy,
}

/// Opening byte of the marker span.
const XML_MARKER: &[u8] = b"<XML>";
/// Closing marker, included in the span.
const XML_END_MARKER: &[u8] = b"</XML>";

/// Prefixes the header-offset strategy accepts as XML.
const XML_PREFIXES: [&str; 3] = ["<?xml", "<XML>", "<root>"];

/// Lazily compiled declaration pattern. DOTALL so the match spans embedded
/// newlines; Unicode off so it runs over raw bytes.
fn decl_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s-u)<\?xml.*?>.+?</[^>]+>").expect("declaration pattern is valid")
    })
}

/// Locate the embedded XML block in a container's bytes.
pub fn locate(data: &[u8]) -> Option<Located> {
    if let Some(text) = scan_declaration(data) {
        return Some(Located { text, strategy: Strategy::DeclScan });
    }

    if let Some(text) = scan_markers(data) {
        return Some(Located { text, strategy: Strategy::MarkerScan });
    }

    scan_header(data).map(|text| Located { text, strategy: Strategy::HeaderOffset })
}

/// Strategy 1: first `<?xml ... ?> ... </tag>` match anywhere in the file.
fn scan_declaration(data: &[u8]) -> Option<String> {
    let m = decl_pattern().find(data)?;
    decode_lossy(m.as_bytes())
}

/// Strategy 2: literal `<XML>` through the next `</XML>`, markers included.
fn scan_markers(data: &[u8]) -> Option<String> {
    let start = memmem::find(data, XML_MARKER)?;
    let end = start + memmem::find(&data[start..], XML_END_MARKER)? + XML_END_MARKER.len();

    decode_lossy(&data[start..end])
}

/// Strategy 3: follow the header's offset/length fields, accepting the slice
/// only when it starts like XML.
fn scan_header(data: &[u8]) -> Option<String> {
    let header = BtfHeader::parse(data).ok()?;
    if !header.bounds_ok(data.len()) {
        return None;
    }

    let offset = header.xml_offset as usize;
    let length = header.xml_length as usize;
    // Tolerate a length running past EOF, like a short file read would.
    let end = (offset + length).min(data.len());

    let text = decode_lossy(&data[offset..end])?;
    if XML_PREFIXES.iter().any(|p| text.starts_with(p)) {
        Some(text)
    } else {
        None
    }
}

fn decode_lossy(bytes: &[u8]) -> Option<String> {
    decode_text(bytes, DecodePolicy::Drop)
        .ok()
        .map(|cow| cow.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btf_with_header(magic: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let offset = 32u32;
        let mut data = magic.to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.resize(offset as usize, 0);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_declaration_scan_amid_noise() {
        let mut data = vec![0xDE, 0xAD, 0xBE, 0xEF];
        data.extend_from_slice(b"<?xml version=\"1.0\"?>\n<meta>\nhello\n</meta>");
        data.extend_from_slice(&[0x00, 0xFF, 0x13]);

        let located = locate(&data).unwrap();
        assert_eq!(located.strategy, Strategy::DeclScan);
        assert_eq!(
            located.text,
            "<?xml version=\"1.0\"?>\n<meta>\nhello\n</meta>"
        );
    }

    #[test]
    fn test_declaration_scan_stops_at_first_closing_tag() {
        // The non-greedy pattern ends at the first closing tag it sees,
        // even when that truncates the document.
        let data = b"<?xml?><meta><v>7</v></meta>";
        let located = locate(data).unwrap();
        assert_eq!(located.text, "<?xml?><meta><v>7</v>");
    }

    #[test]
    fn test_declaration_scan_takes_first_match() {
        let data = b"junk<?xml?><a>1</a>more<?xml?><b>2</b>";
        let located = locate(data).unwrap();
        assert_eq!(located.strategy, Strategy::DeclScan);
        assert_eq!(located.text, "<?xml?><a>1</a>");
    }

    #[test]
    fn test_marker_scan() {
        let mut data = vec![0x01, 0x02];
        data.extend_from_slice(b"<XML><item>yes</item></XML>");
        data.push(0x03);

        let located = locate(&data).unwrap();
        assert_eq!(located.strategy, Strategy::MarkerScan);
        assert_eq!(located.text, "<XML><item>yes</item></XML>");
    }

    #[test]
    fn test_marker_scan_requires_closing_marker() {
        assert!(locate(b"\x00<XML><item>unterminated").is_none());
    }

    #[test]
    fn test_header_offset_scan() {
        let data = btf_with_header(b"BTF\0", b"<root><a>1</a></root>");
        let located = locate(&data).unwrap();
        assert_eq!(located.strategy, Strategy::HeaderOffset);
        assert_eq!(located.text, "<root><a>1</a></root>");
    }

    #[test]
    fn test_header_offset_rejects_non_xml_payload() {
        // Bounds hold but the pointed-to bytes do not look like XML.
        let data = btf_with_header(b"\0FTB", b"not xml at all");
        assert!(locate(&data).is_none());
    }

    #[test]
    fn test_header_offset_drops_invalid_bytes() {
        let data = btf_with_header(b" FTB", b"<root>\xFF\xFEok</root>");
        let located = locate(&data).unwrap();
        assert_eq!(located.text, "<root>ok</root>");
    }

    #[test]
    fn test_no_strategy_matches() {
        assert!(locate(&[0u8; 64]).is_none());
        assert!(locate(b"plain text without any xml").is_none());
        assert!(locate(b"").is_none());
    }

    #[test]
    fn test_strategy_order_declaration_wins() {
        // Both a declaration block and markers present; strategy 1 wins.
        let data = b"<XML>m</XML><?xml?><a>1</a>";
        let located = locate(data).unwrap();
        assert_eq!(located.strategy, Strategy::DeclScan);
    }
}
