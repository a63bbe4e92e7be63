//! Feature schema and assembly
//!
//! - `vector`: the 15 named features and the name-keyed vector type
//! - `assembler`: raw form/JSON record → complete feature vector

pub mod assembler;
pub mod vector;

pub use assembler::{assemble, decade_of, InputMode, RawInput, RawValue};
pub use vector::{Feature, FeatureVector};
