//! Serialization: escaping, value encoding, folding.

pub mod escape;
pub mod fold;
mod serializer;
pub mod values;

pub use serializer::{SerializeOptions, serialize, serialize_line, serialize_with};
