// Compressed resource wire format.
//
// header   extended resource header parsing and introspection
// encoded  the stream's variable-width integer encoding
// tables   constant-word tables and the static byte expansion table

pub mod encoded;
pub mod header;
pub mod tables;

pub use encoded::read_encoded;
pub use header::{
    CompressFlags, DonnBitsParams, ExtendedAttributes, ExtendedHeader, FormatParams,
    GreggyBitsParams, ROBUSTNESS_SIGNATURE, ResourceHeader, decompressed_size,
    is_compressed_resource, is_extended_resource,
};
