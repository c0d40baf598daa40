//! Embedded XML metadata extraction for BTF container files.
//!
//! BTF containers carry an XML metadata block somewhere inside an otherwise
//! opaque binary stream. This crate locates that block with a series of
//! heuristics, converts the XML into a recursive key/value structure, and can
//! write both the raw XML and an indented summary to disk.
//!
//! # Example
//!
//! ```no_run
//! use btfx_meta::extract_metadata;
//!
//! let data = std::fs::read("capture.btf")?;
//!
//! if let Some(extraction) = extract_metadata(&data) {
//!     println!("found via {}", extraction.strategy);
//!     println!("{}", extraction.xml);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod node;

pub mod convert;
pub mod locator;
pub mod report;

pub use error::{Error, Result};
pub use header::BtfHeader;
pub use locator::{locate, Located, Strategy};
pub use node::{MetadataMap, MetadataNode};
pub use report::OutputPair;

/// Result of a successful end-to-end extraction from one container.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The raw XML text, decoded leniently from the container bytes.
    pub xml: String,
    /// The structured form of the XML.
    pub metadata: MetadataNode,
    /// Which locator strategy found the block.
    pub strategy: Strategy,
}

/// Locate and convert the XML metadata block in one container's bytes.
///
/// Returns `None` when no strategy finds a block, which is a normal outcome
/// for containers without embedded metadata.
pub fn extract_metadata(data: &[u8]) -> Option<Extraction> {
    let located = locator::locate(data)?;
    let metadata = convert::to_structure(&located.text);

    Some(Extraction {
        xml: located.text,
        metadata,
        strategy: located.strategy,
    })
}
