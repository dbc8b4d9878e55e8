//! # Validation-Schema Types
//!
//! [`SchemaType`] mirrors the data-model kinds with two deliberate
//! differences: integer/floating families are already collapsed to canonical
//! leaves, and primitive-sequence aliases do not exist — they arrive here as
//! plain sequences.
//!
//! Record schemas use the same forward-declared-handle pattern as the model
//! descriptors: the schema is registered (and referenceable) before its field
//! table is sealed, which is what lets recursive schemas terminate.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// A node in the generated validation schema.
#[derive(Debug, Clone)]
pub enum SchemaType {
    /// Canonical integer leaf (all integer families).
    Int,
    /// Canonical float leaf (all floating families).
    Float,
    /// Boolean leaf.
    Bool,
    /// String leaf.
    Str,
    /// Binary leaf: accepts raw bytes or base64 text, normalized to bytes.
    Bytes,
    /// Arbitrary JSON object leaf.
    Json,
    /// The null/unit leaf.
    Null,
    /// Closed set of named integer constants.
    Enum(Arc<EnumSchema>),
    /// A record with named, typed fields.
    Record(Arc<RecordSchema>),
    /// Homogeneous list.
    Sequence(Box<SchemaType>),
    /// Typed key/value map.
    Map(Box<SchemaType>, Box<SchemaType>),
    /// Oneof alternatives, declaration order preserved.
    Union(Vec<SchemaType>),
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Int => write!(f, "int"),
            SchemaType::Float => write!(f, "float"),
            SchemaType::Bool => write!(f, "bool"),
            SchemaType::Str => write!(f, "str"),
            SchemaType::Bytes => write!(f, "bytes"),
            SchemaType::Json => write!(f, "json"),
            SchemaType::Null => write!(f, "null"),
            SchemaType::Enum(e) => write!(f, "enum {}", e.name()),
            SchemaType::Record(r) => write!(f, "record {}", r.name()),
            SchemaType::Sequence(el) => write!(f, "list<{el}>"),
            SchemaType::Map(k, v) => write!(f, "map<{k}, {v}>"),
            SchemaType::Union(alts) => {
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for SchemaType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SchemaType::Int, SchemaType::Int)
            | (SchemaType::Float, SchemaType::Float)
            | (SchemaType::Bool, SchemaType::Bool)
            | (SchemaType::Str, SchemaType::Str)
            | (SchemaType::Bytes, SchemaType::Bytes)
            | (SchemaType::Json, SchemaType::Json)
            | (SchemaType::Null, SchemaType::Null) => true,
            (SchemaType::Enum(a), SchemaType::Enum(b)) => a == b,
            (SchemaType::Record(a), SchemaType::Record(b)) => a == b,
            (SchemaType::Sequence(a), SchemaType::Sequence(b)) => a == b,
            (SchemaType::Map(ak, av), SchemaType::Map(bk, bv)) => ak == bk && av == bv,
            (SchemaType::Union(a), SchemaType::Union(b)) => a == b,
            _ => false,
        }
    }
}

/// The allowed value set of a generated enum.
#[derive(Debug)]
pub struct EnumSchema {
    name: String,
    members: Vec<(String, i32)>,
}

impl EnumSchema {
    pub(crate) fn new(name: impl Into<String>, members: Vec<(String, i32)>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            members,
        })
    }

    /// Fully qualified enum name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[(String, i32)] {
        &self.members
    }

    /// Look up a member number by name.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Look up a member name by number.
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == number)
            .map(|(n, _)| n.as_str())
    }
}

// Generated schemas are registry singletons per name.
impl PartialEq for EnumSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for EnumSchema {}

/// One named, typed field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Field name exactly as declared on the source record.
    pub name: String,
    /// Mapped field type.
    pub ty: SchemaType,
}

/// A generated record schema.
///
/// All fields are optional at validation time (absent validates as null) and
/// unknown fields are rejected — the closed shape is what lets the form
/// decoder disambiguate union alternatives by parse success.
#[derive(Debug)]
pub struct RecordSchema {
    name: String,
    fields: OnceLock<Vec<SchemaField>>,
}

impl RecordSchema {
    /// Forward-declare a schema with an unsealed field table.
    pub(crate) fn declare(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fields: OnceLock::new(),
        })
    }

    /// Seal the field table. Only the mapper calls this, exactly once per
    /// schema, after registration.
    pub(crate) fn seal(&self, fields: Vec<SchemaField>) {
        let _ = self.fields.set(fields);
    }

    /// Fully qualified schema name (mirrors the source record name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field table, in declaration order. Empty while the schema is
    /// still being built (mid-recursion on a cyclic type).
    pub fn fields(&self) -> &[SchemaField] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl PartialEq for RecordSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for RecordSchema {}
