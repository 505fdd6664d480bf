//! rsrc-dcmp: decompression of classic Mac OS compressed resources.
//!
//! The crate provides:
//! - The extended resource wire format (`format`)
//! - The DonnBits, byte-wise and GreggyBits decoders (`codec`)
//! - A dispatcher with an optional cache and a custom decoder registry (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use rsrc_dcmp::engine::Engine;
//! use rsrc_dcmp::format::header::{DCMP_DONN_BITS, ResourceHeader};
//!
//! // A DonnBits resource holding one 4-byte literal.
//! let mut blob = ResourceHeader::donn_bits(4, 255, DCMP_DONN_BITS).to_bytes();
//! blob.extend_from_slice(&[0x11, b'r', b's', b'r', b'c']);
//!
//! let mut engine = Engine::default();
//! assert_eq!(engine.decompress_resource(&blob).unwrap(), b"rsrc");
//! ```

pub mod cache;
pub mod checksum;
pub mod codec;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod registry;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{
    Engine, EngineOptions, Method, clear_decompress_cache, decompress_cache_stats,
    decompress_resource, get_decompressor, register_decompressor, set_decompress_caching,
    set_decompress_debug, unregister_decompressor,
};
pub use error::{DecompressError, error_string};
