//! # Model Error Types
//!
//! Errors raised while declaring descriptors and constructing record values.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Error while declaring a type descriptor.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The record's field table was sealed twice.
    #[error("field table for record '{record}' is already sealed")]
    AlreadySealed {
        /// Full name of the record descriptor.
        record: String,
    },
}

/// Error raised by the record constructor.
///
/// Construction checks keyword names against the declared field table and
/// nothing else; type checking is the schema layer's job.
#[derive(Error, Debug)]
pub enum ConstructError {
    /// A keyword argument does not name a declared field.
    #[error("record '{record}' has no field named '{field}'")]
    UnknownField {
        /// Full name of the record being constructed.
        record: String,
        /// The offending keyword.
        field: String,
    },
}
