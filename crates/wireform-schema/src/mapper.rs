//! # Type Mapper
//!
//! Pure structural mapping from data-model types to validation-schema types.
//! Rules apply in order, first match wins:
//!
//! 1. Integer families → `int`; floating families → `float`.
//! 2. `bytes` → the binary leaf (raw bytes or base64 text at validation).
//! 3. Remaining primitive leaves map to themselves.
//! 4. Enums keep their member sets (memoized for identity).
//! 5. Records recurse through their reflection tables; the schema is
//!    registered BEFORE field recursion so cyclic types terminate.
//! 6. Optional wrappers unwrap and recurse.
//! 7. Unions map alternatives in declared order.
//! 8. Sequences map their element.
//! 9. Maps map key and value.
//! 10. Primitive-sequence aliases collapse to plain sequences.
//!
//! The mapper performs no I/O and mutates nothing outside the registry table
//! it is handed; all public access goes through [`crate::SchemaRegistry`].

use std::sync::Arc;

use thiserror::Error;
use wireform_model::{DataModelType, PrimitiveKind, RecordDescriptor};

use crate::registry::TypeTable;
use crate::types::{RecordSchema, SchemaField, SchemaType};

/// Schema-build-time failure. Fatal: a data model that trips this cannot be
/// served, and the error surfaces at process warm-up rather than per-request.
#[derive(Error, Debug)]
pub enum SchemaBuildError {
    /// A record descriptor's reflection table was never sealed, so there is
    /// nothing to map.
    #[error("record '{0}' has no sealed field table; seal descriptors before schema generation")]
    UnsealedRecord(String),
}

/// Map one type node, recursing through the registry table.
pub(crate) fn map_type(
    table: &mut TypeTable,
    ty: &DataModelType,
) -> Result<SchemaType, SchemaBuildError> {
    match ty {
        DataModelType::Primitive(kind) => Ok(map_primitive(*kind)),
        DataModelType::Enum(desc) => Ok(SchemaType::Enum(table.enum_schema(desc))),
        DataModelType::Record(desc) => Ok(SchemaType::Record(map_record(table, desc)?)),
        DataModelType::Optional(inner) => map_type(table, inner),
        DataModelType::Union(alts) => {
            let mapped = alts
                .iter()
                .map(|alt| map_type(table, alt))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SchemaType::Union(mapped))
        }
        DataModelType::Sequence(element) => {
            Ok(SchemaType::Sequence(Box::new(map_type(table, element)?)))
        }
        DataModelType::Map(key, value) => Ok(SchemaType::Map(
            Box::new(map_type(table, key)?),
            Box::new(map_type(table, value)?),
        )),
        // Alias collapse: the named wrapper disappears; clients submit a
        // bare list of the element primitive.
        DataModelType::SequenceAlias(alias) => Ok(SchemaType::Sequence(Box::new(map_primitive(
            alias.element(),
        )))),
    }
}

/// Map a record descriptor, registering before recursing into fields so that
/// self-referential records short-circuit on the registry lookup instead of
/// recursing forever.
pub(crate) fn map_record(
    table: &mut TypeTable,
    desc: &Arc<RecordDescriptor>,
) -> Result<Arc<RecordSchema>, SchemaBuildError> {
    if let Some(existing) = table.record(desc.full_name()) {
        return Ok(existing);
    }
    if !desc.is_sealed() {
        return Err(SchemaBuildError::UnsealedRecord(
            desc.full_name().to_string(),
        ));
    }

    let schema = RecordSchema::declare(desc.full_name());
    table.insert_record(desc, &schema);

    let mut fields = Vec::with_capacity(desc.fields().len());
    for field in desc.fields() {
        fields.push(SchemaField {
            name: field.name.clone(),
            ty: map_type(table, &field.ty)?,
        });
    }
    schema.seal(fields);
    Ok(schema)
}

fn map_primitive(kind: PrimitiveKind) -> SchemaType {
    match kind {
        PrimitiveKind::Int32
        | PrimitiveKind::Int64
        | PrimitiveKind::Uint32
        | PrimitiveKind::Uint64 => SchemaType::Int,
        PrimitiveKind::Float | PrimitiveKind::Double => SchemaType::Float,
        PrimitiveKind::Bool => SchemaType::Bool,
        PrimitiveKind::Str => SchemaType::Str,
        PrimitiveKind::Bytes => SchemaType::Bytes,
        PrimitiveKind::JsonObject => SchemaType::Json,
        PrimitiveKind::Null => SchemaType::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;
    use wireform_model::{AliasDescriptor, EnumDescriptor, FieldDescriptor};

    #[test]
    fn integer_families_collapse() {
        let reg = SchemaRegistry::global();
        for kind in [
            PrimitiveKind::Int32,
            PrimitiveKind::Int64,
            PrimitiveKind::Uint32,
            PrimitiveKind::Uint64,
        ] {
            let ty = reg
                .schema_for_type(&DataModelType::Primitive(kind))
                .unwrap();
            assert_eq!(ty, SchemaType::Int, "{kind:?}");
        }
        for kind in [PrimitiveKind::Float, PrimitiveKind::Double] {
            let ty = reg
                .schema_for_type(&DataModelType::Primitive(kind))
                .unwrap();
            assert_eq!(ty, SchemaType::Float, "{kind:?}");
        }
    }

    #[test]
    fn plain_leaves_map_to_themselves() {
        let reg = SchemaRegistry::global();
        let pairs = [
            (PrimitiveKind::Bool, SchemaType::Bool),
            (PrimitiveKind::Str, SchemaType::Str),
            (PrimitiveKind::Bytes, SchemaType::Bytes),
            (PrimitiveKind::JsonObject, SchemaType::Json),
            (PrimitiveKind::Null, SchemaType::Null),
        ];
        for (kind, expected) in pairs {
            let ty = reg
                .schema_for_type(&DataModelType::Primitive(kind))
                .unwrap();
            assert_eq!(ty, expected);
        }
    }

    #[test]
    fn optional_unwraps() {
        let ty = SchemaRegistry::global()
            .schema_for_type(&DataModelType::Optional(Box::new(
                DataModelType::Primitive(PrimitiveKind::Str),
            )))
            .unwrap();
        assert_eq!(ty, SchemaType::Str);
    }

    #[test]
    fn union_preserves_order() {
        let union = DataModelType::Union(vec![
            DataModelType::Primitive(PrimitiveKind::Str),
            DataModelType::Primitive(PrimitiveKind::Int64),
            DataModelType::Primitive(PrimitiveKind::Null),
        ]);
        let ty = SchemaRegistry::global().schema_for_type(&union).unwrap();
        assert_eq!(
            ty,
            SchemaType::Union(vec![SchemaType::Str, SchemaType::Int, SchemaType::Null])
        );
    }

    #[test]
    fn alias_collapses_to_sequence() {
        let ty = SchemaRegistry::global()
            .schema_for_type(&DataModelType::SequenceAlias(AliasDescriptor::int_list()))
            .unwrap();
        assert_eq!(ty, SchemaType::Sequence(Box::new(SchemaType::Int)));
    }

    #[test]
    fn enum_keeps_member_set() {
        let desc = EnumDescriptor::new(
            "mapper.Weekday",
            vec![("MONDAY", 0), ("TUESDAY", 1), ("WEDNESDAY", 2)],
        );
        let ty = SchemaRegistry::global()
            .schema_for_type(&DataModelType::Enum(desc))
            .unwrap();
        match ty {
            SchemaType::Enum(e) => {
                assert_eq!(e.members().len(), 3);
                assert_eq!(e.number_of("TUESDAY"), Some(1));
            }
            other => panic!("expected enum, got {other}"),
        }
    }

    #[test]
    fn record_maps_all_fields() {
        let desc = RecordDescriptor::with_fields(
            "mapper.Sample",
            vec![
                FieldDescriptor::new("count", DataModelType::Primitive(PrimitiveKind::Uint32)),
                FieldDescriptor::new("payload", DataModelType::Primitive(PrimitiveKind::Bytes)),
                FieldDescriptor::new(
                    "tags",
                    DataModelType::Sequence(Box::new(DataModelType::Primitive(PrimitiveKind::Str))),
                ),
            ],
        );
        let schema = SchemaRegistry::global().schema_for(&desc).unwrap();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field("count").unwrap().ty, SchemaType::Int);
        assert_eq!(schema.field("payload").unwrap().ty, SchemaType::Bytes);
        assert_eq!(
            schema.field("tags").unwrap().ty,
            SchemaType::Sequence(Box::new(SchemaType::Str))
        );
    }

    #[test]
    fn cyclic_record_terminates() {
        let node = RecordDescriptor::new("mapper.Cycle");
        node.seal_fields(vec![
            FieldDescriptor::new("name", DataModelType::Primitive(PrimitiveKind::Str)),
            FieldDescriptor::new(
                "next",
                DataModelType::Union(vec![
                    DataModelType::Record(node.clone()),
                    DataModelType::Primitive(PrimitiveKind::Null),
                ]),
            ),
        ])
        .unwrap();

        let schema = SchemaRegistry::global().schema_for(&node).unwrap();
        match &schema.field("next").unwrap().ty {
            SchemaType::Union(alts) => match &alts[0] {
                SchemaType::Record(inner) => assert!(Arc::ptr_eq(inner, &schema)),
                other => panic!("expected record alternative, got {other}"),
            },
            other => panic!("expected union, got {other}"),
        }
    }

    #[test]
    fn unsealed_record_is_a_build_error() {
        let desc = RecordDescriptor::new("mapper.NeverSealed");
        let err = SchemaRegistry::global().schema_for(&desc).unwrap_err();
        assert!(err.to_string().contains("mapper.NeverSealed"));
    }
}
