// The three resource decoders and the machinery they share.
//
// context     cursor, bounded output, statistics
// var_table   dictionary for the two token grammars
// token       token classes and the `Grammar` trait
// dictionary  the generic token interpreter
// extended    extended operations reachable from either grammar

pub mod byte_wise;
pub mod context;
pub mod dictionary;
pub mod donn_bits;
pub mod extended;
pub mod greggy_bits;
pub mod token;
pub mod var_table;

pub use context::{DecodeContext, DecompressStats, Decoded};
pub use token::{Grammar, Token};
pub use var_table::VarTable;
