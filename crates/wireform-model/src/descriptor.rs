//! # Type Descriptors — Static Reflection Tables
//!
//! A [`DataModelType`] is a node in the source type system: primitives,
//! enums, records, sequences, maps, unions, optional wrappers, and the
//! primitive-sequence aliases that exist for wire-format reasons.
//!
//! Records carry their field tables as data ([`RecordDescriptor`]) built
//! once at declaration time, so schema generation never inspects runtime
//! values. Field tables are sealed after construction, which is what lets a
//! record reference itself:
//!
//! ```
//! use wireform_model::{DataModelType, FieldDescriptor, PrimitiveKind, RecordDescriptor};
//!
//! let node = RecordDescriptor::new("demo.TreeNode");
//! node.seal_fields(vec![
//!     FieldDescriptor::new("label", DataModelType::Primitive(PrimitiveKind::Str)),
//!     FieldDescriptor::new(
//!         "children",
//!         DataModelType::Sequence(Box::new(DataModelType::Record(node.clone()))),
//!     ),
//! ]).unwrap();
//! ```

use std::sync::{Arc, OnceLock};

use crate::error::DescriptorError;

/// Leaf kinds of the source type system.
///
/// The integer and floating families are distinct here because the wire
/// format distinguishes them; the validation schema collapses each family
/// to a single canonical leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
    /// Opaque byte blob.
    Bytes,
    /// Arbitrary JSON object (schemaless struct field).
    JsonObject,
    /// The unit/none type, used as a union alternative.
    Null,
}

/// Named integer constants, declaration order preserved.
#[derive(Debug)]
pub struct EnumDescriptor {
    full_name: String,
    members: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Declare an enum with its member set.
    pub fn new<S: Into<String>>(full_name: impl Into<String>, members: Vec<(S, i32)>) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.into(),
            members: members.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        })
    }

    /// Fully qualified enum name.
    pub fn full_name(&self) -> &str {
        &self.full_name
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

// Descriptors are identity-stable singletons per full name, so name equality
// is object equality.
impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}
impl Eq for EnumDescriptor {}

/// One entry in a record's reflection table.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name exactly as declared (case-sensitive).
    pub name: String,
    /// Declared field type.
    pub ty: DataModelType,
}

impl FieldDescriptor {
    /// Declare a field.
    pub fn new(name: impl Into<String>, ty: DataModelType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A record type: an ordered mapping of field name → type.
///
/// The field table is sealed exactly once after construction. An unsealed
/// descriptor has no observable fields; schema generation treats it as a
/// build-time error rather than guessing.
#[derive(Debug)]
pub struct RecordDescriptor {
    full_name: String,
    fields: OnceLock<Vec<FieldDescriptor>>,
}

impl RecordDescriptor {
    /// Declare a record with an unsealed field table.
    pub fn new(full_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.into(),
            fields: OnceLock::new(),
        })
    }

    /// Declare a record and seal its fields in one step.
    ///
    /// Convenience for the common non-recursive case.
    pub fn with_fields(full_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Arc<Self> {
        let record = Self::new(full_name);
        // A freshly created table cannot already be sealed.
        let _ = record.fields.set(fields);
        record
    }

    /// Seal the field table. Fails if called twice.
    pub fn seal_fields(&self, fields: Vec<FieldDescriptor>) -> Result<(), DescriptorError> {
        self.fields
            .set(fields)
            .map_err(|_| DescriptorError::AlreadySealed {
                record: self.full_name.clone(),
            })
    }

    /// Fully qualified record name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// True once the field table has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.fields.get().is_some()
    }

    /// The reflection table, in declaration order. Empty until sealed.
    pub fn fields(&self) -> &[FieldDescriptor] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl PartialEq for RecordDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}
impl Eq for RecordDescriptor {}

/// A primitive-sequence alias: a named record-like wrapper that is
/// semantically just a homogeneous list of one primitive.
///
/// These exist for wire-format reasons in the source schema; the validation
/// schema collapses them to plain sequences so a client never wraps a bare
/// list in an extra object.
#[derive(Debug)]
pub struct AliasDescriptor {
    full_name: String,
    element: PrimitiveKind,
}

impl AliasDescriptor {
    /// Declare an alias over a primitive element type.
    pub fn new(full_name: impl Into<String>, element: PrimitiveKind) -> Arc<Self> {
        Arc::new(Self {
            full_name: full_name.into(),
            element,
        })
    }

    /// Fully qualified alias name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The element primitive.
    pub fn element(&self) -> PrimitiveKind {
        self.element
    }

    /// The canonical "list of strings" alias.
    pub fn str_list() -> Arc<Self> {
        static INSTANCE: OnceLock<Arc<AliasDescriptor>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Self::new("wireform.StrList", PrimitiveKind::Str))
            .clone()
    }

    /// The canonical "list of integers" alias.
    pub fn int_list() -> Arc<Self> {
        static INSTANCE: OnceLock<Arc<AliasDescriptor>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Self::new("wireform.IntList", PrimitiveKind::Int64))
            .clone()
    }

    /// The canonical "list of floats" alias.
    pub fn float_list() -> Arc<Self> {
        static INSTANCE: OnceLock<Arc<AliasDescriptor>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Self::new("wireform.FloatList", PrimitiveKind::Double))
            .clone()
    }

    /// The canonical "list of booleans" alias.
    pub fn bool_list() -> Arc<Self> {
        static INSTANCE: OnceLock<Arc<AliasDescriptor>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Self::new("wireform.BoolList", PrimitiveKind::Bool))
            .clone()
    }
}

impl PartialEq for AliasDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name && self.element == other.element
    }
}
impl Eq for AliasDescriptor {}

/// A node in the source type system.
#[derive(Debug, Clone)]
pub enum DataModelType {
    /// A leaf primitive.
    Primitive(PrimitiveKind),
    /// Named integer constants.
    Enum(Arc<EnumDescriptor>),
    /// A record with a declared field table.
    Record(Arc<RecordDescriptor>),
    /// A named wrapper that is semantically a homogeneous primitive list.
    SequenceAlias(Arc<AliasDescriptor>),
    /// A homogeneous list of the element type.
    Sequence(Box<DataModelType>),
    /// A map with typed keys and values.
    Map(Box<DataModelType>, Box<DataModelType>),
    /// Alternatives with oneof semantics; declaration order is significant.
    Union(Vec<DataModelType>),
    /// An annotated wrapper: unwraps during schema generation.
    Optional(Box<DataModelType>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_member_lookup() {
        let e = EnumDescriptor::new("demo.Color", vec![("RED", 0), ("GREEN", 1), ("BLUE", 2)]);
        assert_eq!(e.number_of("GREEN"), Some(1));
        assert_eq!(e.number_of("PUCE"), None);
        assert_eq!(e.name_of(2), Some("BLUE"));
        assert_eq!(e.name_of(9), None);
        assert_eq!(e.members().len(), 3);
    }

    #[test]
    fn record_fields_ordered() {
        let r = RecordDescriptor::with_fields(
            "demo.Pair",
            vec![
                FieldDescriptor::new("first", DataModelType::Primitive(PrimitiveKind::Str)),
                FieldDescriptor::new("second", DataModelType::Primitive(PrimitiveKind::Int64)),
            ],
        );
        assert!(r.is_sealed());
        let names: Vec<&str> = r.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(r.field("second").is_some());
        assert!(r.field("third").is_none());
    }

    #[test]
    fn sealing_twice_is_an_error() {
        let r = RecordDescriptor::new("demo.Once");
        r.seal_fields(vec![]).unwrap();
        let err = r.seal_fields(vec![]).unwrap_err();
        assert!(err.to_string().contains("demo.Once"));
    }

    #[test]
    fn unsealed_record_has_no_fields() {
        let r = RecordDescriptor::new("demo.Pending");
        assert!(!r.is_sealed());
        assert!(r.fields().is_empty());
        assert!(r.field("anything").is_none());
    }

    #[test]
    fn self_referential_record_declares() {
        let node = RecordDescriptor::new("demo.TreeNode");
        node.seal_fields(vec![
            FieldDescriptor::new("label", DataModelType::Primitive(PrimitiveKind::Str)),
            FieldDescriptor::new(
                "children",
                DataModelType::Sequence(Box::new(DataModelType::Record(node.clone()))),
            ),
        ])
        .unwrap();
        // The field table closes the loop back to the same descriptor.
        match &node.field("children").unwrap().ty {
            DataModelType::Sequence(el) => match el.as_ref() {
                DataModelType::Record(inner) => {
                    assert!(Arc::ptr_eq(inner, &node));
                }
                other => panic!("expected record element, got {other:?}"),
            },
            other => panic!("expected sequence field, got {other:?}"),
        }
    }

    #[test]
    fn alias_singletons_are_identity_stable() {
        assert!(Arc::ptr_eq(
            &AliasDescriptor::str_list(),
            &AliasDescriptor::str_list()
        ));
        assert!(Arc::ptr_eq(
            &AliasDescriptor::int_list(),
            &AliasDescriptor::int_list()
        ));
        assert_eq!(AliasDescriptor::bool_list().element(), PrimitiveKind::Bool);
        assert_eq!(
            AliasDescriptor::float_list().element(),
            PrimitiveKind::Double
        );
    }
}
