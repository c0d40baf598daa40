//! Common utilities for btfx.
//!
//! This crate provides the foundational types used across the btfx crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`decode`] - Lossy UTF-8 decoding with an explicit policy

mod error;
mod reader;

pub mod decode;

pub use decode::{decode_text, DecodePolicy};
pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for fast byte searching
pub use memchr;
