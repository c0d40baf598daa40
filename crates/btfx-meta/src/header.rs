//! BTF container header structure.

use btfx_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

/// Fixed header at the start of a BTF container.
///
/// Four magic bytes, then three little-endian u32 fields. The version is
/// carried but never validated; only the offset and length matter for
/// locating the XML block.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BtfHeader {
    /// Container magic, one of [`BtfHeader::MAGICS`].
    pub magic: [u8; 4],
    /// Format version (read but not validated).
    pub version: u32,
    /// Byte offset of the XML block within the file.
    pub xml_offset: u32,
    /// Byte length of the XML block.
    pub xml_length: u32,
}

impl BtfHeader {
    /// Size of the header in bytes.
    pub const LEN: usize = 16;

    /// Recognized magic values, big- and little-orientation variants.
    pub const MAGICS: [[u8; 4]; 4] = [*b"BTF\0", *b"BTF ", *b"\0FTB", *b" FTB"];

    /// Upper bound on a plausible XML block length.
    pub const MAX_XML_LENGTH: u32 = 10_000_000;

    /// Parse the header from the start of a container.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header: BtfHeader = reader.read_struct()?;

        if !Self::is_recognized(&header.magic) {
            return Err(btfx_common::Error::InvalidMagic {
                expected: Self::MAGICS.iter().map(|m| m.to_vec()).collect(),
                actual: header.magic.to_vec(),
            }
            .into());
        }

        Ok(header)
    }

    /// Check whether magic bytes name a BTF container.
    pub fn is_recognized(magic: &[u8; 4]) -> bool {
        Self::MAGICS.iter().any(|m| m == magic)
    }

    /// Sanity-check the offset and length against the file size.
    ///
    /// The offset must fall strictly inside the file and the length must be
    /// strictly between zero and [`BtfHeader::MAX_XML_LENGTH`].
    pub fn bounds_ok(&self, file_size: usize) -> bool {
        // Copy out of the packed struct before use.
        let offset = self.xml_offset as usize;
        let length = self.xml_length;

        offset > 0 && offset < file_size && length > 0 && length < Self::MAX_XML_LENGTH
    }
}
