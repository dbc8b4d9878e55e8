//! # wireform-schema — Validation Schema Generation & Checking
//!
//! Bridges the transport-independent data model (`wireform-model`) to the
//! validation schema used at the HTTP boundary.
//!
//! ## Type Mapper (`mapper`)
//!
//! A pure, total function from data-model types to validation-schema types.
//! Leaf types map structurally (integer and floating families collapse to
//! canonical `int`/`float`, bytes become a base64-aware binary leaf), records
//! recurse through their reflection tables, and primitive-sequence aliases
//! unify to plain sequences so clients submit bare lists.
//!
//! ## Schema Registry (`registry`)
//!
//! Process-wide memoized bidirectional mapping between record descriptors and
//! their generated schemas. Built lazily on first use; a single mutex guards
//! the whole get-or-build recursion so concurrent first use cannot produce
//! two schemas for one type. Registration happens before field recursion,
//! which is what terminates self-referential records.
//!
//! ## Validation (`validate`)
//!
//! Validation is a trust boundary: documents that fail are rejected with
//! structured violations carrying the dotted path to every offending field.
//! Coercion is lenient where form submissions demand it (integral text,
//! base64 text for bytes, enum member names or numbers) and closed where
//! union disambiguation demands it (records reject unknown fields).
//!
//! ## Instance Converter (`convert`)
//!
//! Walks a validated instance back into a data-model value (and the reverse),
//! restoring alias wrappers from the declared field types and invoking the
//! record constructor exactly once per record.

pub mod convert;
pub mod mapper;
pub mod registry;
pub mod types;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use convert::{from_data_model, list_to_alias, to_data_model, ConvertError};
pub use mapper::SchemaBuildError;
pub use registry::SchemaRegistry;
pub use types::{EnumSchema, RecordSchema, SchemaField, SchemaType};
pub use validate::{validate, PendingValue, SchemaInstance, Violation, Violations};
