//! Category Encoding
//!
//! Maps the human-readable state, crop and season labels onto the integer
//! codes the model was trained against.

pub mod lookup_tables;

pub use lookup_tables::{decode, encode, labels, CategoryKind};
