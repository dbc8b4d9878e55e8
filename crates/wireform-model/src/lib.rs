//! # wireform-model — Source Data-Model Type System
//!
//! This crate is the bedrock of Wireform. It defines the transport-independent
//! data model that the rest of the workspace bridges to the HTTP boundary:
//! type descriptors, the static reflection tables over record fields, and the
//! runtime values those types describe.
//!
//! ## Key Design Principles
//!
//! 1. **Descriptors, not introspection.** Every record carries a precomputed,
//!    ordered field-name → type table ([`RecordDescriptor`]). Schema
//!    generation walks these tables; nothing inspects live values to learn
//!    shapes.
//!
//! 2. **Identity-stable descriptors.** Descriptors live behind `Arc` for the
//!    process lifetime. The four canonical primitive-sequence aliases are
//!    process-wide singletons so that every reference to "list of strings"
//!    is the same object.
//!
//! 3. **Sealed field tables.** A record descriptor is created first and its
//!    fields are sealed exactly once afterwards, so self-referential records
//!    can be declared without unsafe tricks.
//!
//! 4. **Construction is the only gate.** [`RecordDescriptor::build`] rejects
//!    unknown field names; it does not re-validate field types. Validation
//!    belongs to the schema layer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wireform-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod error;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use descriptor::{
    AliasDescriptor, DataModelType, EnumDescriptor, FieldDescriptor, PrimitiveKind,
    RecordDescriptor,
};
pub use error::{ConstructError, DescriptorError};
pub use value::DataValue;
