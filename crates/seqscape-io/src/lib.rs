//! seqscape-io
//!
//! Reads protein sequences from directories of FASTA-format files.
pub mod fasta;

pub use fasta::{load_sequences, read_sequences};
