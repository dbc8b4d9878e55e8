//! # wireform-http — Request Decoding at the HTTP Boundary
//!
//! Turns an inbound request (content-type tag plus a buffered body or a
//! parsed form) into a validated schema instance, or a structured rejection
//! the transport can return as-is.
//!
//! ## Two Decode Paths
//!
//! - **JSON** (`application/json`, exact match): the body parses once and
//!   validates against the schema; the validator's field-error list is
//!   surfaced unchanged.
//! - **Form data** (any content type containing `multipart/form-data`): the
//!   flat dotted-key space folds back into the nested schema shape —
//!   resolving each key through record fields and union alternatives,
//!   probing candidates in declared order, reading file parts for binary
//!   leaves — before one final validation pass.
//!
//! Anything else is a 415.
//!
//! ## Boundary Contract
//!
//! The transport does the wire work: it buffers the whole body, parses
//! multipart into the flat [`FormData`] mapping, and converts [`DecodeError`]
//! into a response (an `IntoResponse` impl is provided). No server is
//! assembled here and nothing is retried — every decode failure is terminal
//! for its request.

pub mod decode;
pub mod error;
pub mod request;

// Re-export primary types for ergonomic imports.
pub use decode::decode;
pub use error::{DecodeError, ErrorBody, ErrorDetail};
pub use request::{FilePart, FormData, FormValue, Inbound, Payload};
