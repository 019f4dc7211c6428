//! Payload validation: shared format rules for the identifier fields that
//! appear across request bodies.

pub mod rules;

pub use validator::Validate;
