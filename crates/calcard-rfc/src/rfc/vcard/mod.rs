//! vCard (RFC 2426, RFC 6350): card behaviors and structured values.

pub mod behaviors;
pub mod structured;

pub use structured::{Address, Organization, StructuredName};
