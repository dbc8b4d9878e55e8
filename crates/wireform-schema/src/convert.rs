//! # Instance Converter
//!
//! Walks a validated [`SchemaInstance`] back into a data-model [`DataValue`]
//! and the reverse. The walk is driven by the declared field types on the
//! record descriptors, which is what restores the information the schema
//! side deliberately erased: primitive-sequence aliases come back as their
//! named wrappers, unsigned fields come back unsigned, and enum members
//! carry their numbers again.
//!
//! A bare list has no declared type to consult, so converting one into an
//! alias requires the caller to name the alias ([`list_to_alias`]) — the
//! registry never infers a many-to-one reverse mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use wireform_model::{
    AliasDescriptor, ConstructError, DataModelType, DataValue, PrimitiveKind, RecordDescriptor,
};

use crate::mapper::SchemaBuildError;
use crate::registry::SchemaRegistry;
use crate::types::SchemaType;
use crate::validate::SchemaInstance;

/// Error while converting between schema instances and data-model values.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Top-level conversion requires a record instance.
    #[error("top-level conversion requires a record instance")]
    NotARecord,

    /// The schema was not produced by the registry, so there is no
    /// descriptor to convert into.
    #[error("no data-model type registered for schema '{0}'")]
    UnknownSchema(String),

    /// An enum member name or number has no counterpart on the descriptor.
    #[error("enum '{enum_name}' has no member '{member}'")]
    UnknownEnumMember {
        /// The enum's full name.
        enum_name: String,
        /// The member name or number that failed to resolve.
        member: String,
    },

    /// A numeric value does not fit the declared target type.
    #[error("value {value} does not fit {target}")]
    OutOfRange {
        /// Rendered source value.
        value: String,
        /// Rendered target type.
        target: String,
    },

    /// The instance shape does not match the declared type.
    #[error("cannot convert {found} into {expected}")]
    Mismatch {
        /// Rendered declared type.
        expected: String,
        /// Rendered instance kind.
        found: String,
    },

    /// Building the schema side on demand failed.
    #[error(transparent)]
    Schema(#[from] SchemaBuildError),

    /// The data-model constructor rejected the assembled keyword set.
    #[error(transparent)]
    Construct(#[from] ConstructError),
}

/// Convert a validated record instance into a data-model value.
///
/// The target descriptor comes from the registry's reverse mapping; nested
/// records, lists of records, and alias-declared fields recurse per the
/// descriptor's field types. The data-model constructor runs once per record
/// with the fully resolved keyword set, and its rejection is surfaced
/// unchanged.
pub fn to_data_model(instance: &SchemaInstance) -> Result<DataValue, ConvertError> {
    match instance {
        SchemaInstance::Record { schema, fields } => {
            let descriptor = SchemaRegistry::global()
                .model_for(schema)
                .ok_or_else(|| ConvertError::UnknownSchema(schema.name().to_string()))?;
            build_record(&descriptor, fields)
        }
        _ => Err(ConvertError::NotARecord),
    }
}

/// Convert a bare validated list into a named primitive-sequence alias.
///
/// The expected alias must be supplied by the caller: four distinct aliases
/// all collapse to "list of primitive", so the reverse direction is
/// ambiguous without it.
pub fn list_to_alias(
    instance: &SchemaInstance,
    alias: &Arc<AliasDescriptor>,
) -> Result<DataValue, ConvertError> {
    match instance {
        SchemaInstance::List(items) => {
            let values = items
                .iter()
                .map(|item| primitive_value(alias.element(), item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(alias.wrap(values))
        }
        other => Err(mismatch(&format!("alias {}", alias.full_name()), other)),
    }
}

/// Convert a data-model value into a validated schema instance.
///
/// Aliases collapse to plain lists, records map through the registry
/// (building their schemas on demand), and everything else passes through.
pub fn from_data_model(value: &DataValue) -> Result<SchemaInstance, ConvertError> {
    match value {
        DataValue::Null => Ok(SchemaInstance::Null),
        DataValue::Bool(b) => Ok(SchemaInstance::Bool(*b)),
        DataValue::Int(i) => Ok(SchemaInstance::Int(*i)),
        DataValue::Uint(u) => {
            if *u <= i64::MAX as u64 {
                Ok(SchemaInstance::Int(*u as i64))
            } else {
                Err(ConvertError::OutOfRange {
                    value: u.to_string(),
                    target: "int".to_string(),
                })
            }
        }
        DataValue::Float(f) => Ok(SchemaInstance::Float(*f)),
        DataValue::Str(s) => Ok(SchemaInstance::Str(s.clone())),
        DataValue::Bytes(b) => Ok(SchemaInstance::Bytes(b.clone())),
        DataValue::Json(v) => Ok(SchemaInstance::Json(v.clone())),
        DataValue::Enum { descriptor, number } => {
            let name = descriptor
                .name_of(*number)
                .ok_or_else(|| ConvertError::UnknownEnumMember {
                    enum_name: descriptor.full_name().to_string(),
                    member: number.to_string(),
                })?
                .to_string();
            let mapped = SchemaRegistry::global()
                .schema_for_type(&DataModelType::Enum(descriptor.clone()))?;
            match mapped {
                SchemaType::Enum(schema) => Ok(SchemaInstance::Enum { schema, name }),
                other => Err(ConvertError::Mismatch {
                    expected: format!("enum {}", descriptor.full_name()),
                    found: other.to_string(),
                }),
            }
        }
        DataValue::List(items) => Ok(SchemaInstance::List(
            items
                .iter()
                .map(from_data_model)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        DataValue::Map(entries) => {
            let mut out = BTreeMap::new();
            for (k, v) in entries {
                out.insert(k.clone(), from_data_model(v)?);
            }
            Ok(SchemaInstance::Map(out))
        }
        DataValue::Record { descriptor, fields } => {
            let schema = SchemaRegistry::global().schema_for(descriptor)?;
            let mut out = BTreeMap::new();
            for (k, v) in fields {
                out.insert(k.clone(), from_data_model(v)?);
            }
            Ok(SchemaInstance::Record {
                schema,
                fields: out,
            })
        }
        // Alias collapse: the wrapper disappears on the schema side.
        DataValue::SequenceAlias { values, .. } => Ok(SchemaInstance::List(
            values
                .iter()
                .map(from_data_model)
                .collect::<Result<Vec<_>, _>>()?,
        )),
    }
}

fn build_record(
    descriptor: &Arc<RecordDescriptor>,
    fields: &BTreeMap<String, SchemaInstance>,
) -> Result<DataValue, ConvertError> {
    let mut kwargs = BTreeMap::new();
    for field in descriptor.fields() {
        if let Some(instance) = fields.get(&field.name) {
            kwargs.insert(field.name.clone(), model_value(&field.ty, instance)?);
        }
    }
    // Keywords that do not name a declared field are handed to the
    // constructor anyway; rejecting them is its call, not ours.
    for name in fields.keys() {
        if descriptor.field(name).is_none() {
            kwargs.insert(name.clone(), DataValue::Null);
        }
    }
    Ok(descriptor.build(kwargs)?)
}

fn model_value(declared: &DataModelType, instance: &SchemaInstance) -> Result<DataValue, ConvertError> {
    // Unset fields stay unset regardless of their declared type.
    if matches!(instance, SchemaInstance::Null) {
        return Ok(DataValue::Null);
    }
    match declared {
        DataModelType::Primitive(kind) => primitive_value(*kind, instance),
        DataModelType::Enum(descriptor) => match instance {
            SchemaInstance::Enum { name, .. } => {
                let number =
                    descriptor
                        .number_of(name)
                        .ok_or_else(|| ConvertError::UnknownEnumMember {
                            enum_name: descriptor.full_name().to_string(),
                            member: name.clone(),
                        })?;
                Ok(DataValue::Enum {
                    descriptor: descriptor.clone(),
                    number,
                })
            }
            SchemaInstance::Int(i) => {
                let number = i32::try_from(*i).map_err(|_| ConvertError::OutOfRange {
                    value: i.to_string(),
                    target: format!("enum {}", descriptor.full_name()),
                })?;
                descriptor
                    .name_of(number)
                    .ok_or_else(|| ConvertError::UnknownEnumMember {
                        enum_name: descriptor.full_name().to_string(),
                        member: number.to_string(),
                    })?;
                Ok(DataValue::Enum {
                    descriptor: descriptor.clone(),
                    number,
                })
            }
            other => Err(mismatch(&format!("enum {}", descriptor.full_name()), other)),
        },
        DataModelType::Record(descriptor) => match instance {
            SchemaInstance::Record { fields, .. } => build_record(descriptor, fields),
            other => Err(mismatch(
                &format!("record {}", descriptor.full_name()),
                other,
            )),
        },
        DataModelType::SequenceAlias(alias) => match instance {
            SchemaInstance::List(items) => {
                let values = items
                    .iter()
                    .map(|item| primitive_value(alias.element(), item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(alias.wrap(values))
            }
            other => Err(mismatch(&format!("alias {}", alias.full_name()), other)),
        },
        DataModelType::Sequence(element) => match instance {
            SchemaInstance::List(items) => Ok(DataValue::List(
                items
                    .iter()
                    .map(|item| model_value(element, item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            other => Err(mismatch("list", other)),
        },
        DataModelType::Map(_, value_ty) => match instance {
            SchemaInstance::Map(entries) => {
                let mut out = BTreeMap::new();
                for (k, v) in entries {
                    out.insert(k.clone(), model_value(value_ty, v)?);
                }
                Ok(DataValue::Map(out))
            }
            other => Err(mismatch("map", other)),
        },
        DataModelType::Union(alternatives) => {
            // Same tie-break as validation: declared order, first fit wins.
            for alt in alternatives {
                if let Ok(value) = model_value(alt, instance) {
                    return Ok(value);
                }
            }
            Err(mismatch("union", instance))
        }
        DataModelType::Optional(inner) => model_value(inner, instance),
    }
}

fn primitive_value(kind: PrimitiveKind, instance: &SchemaInstance) -> Result<DataValue, ConvertError> {
    match (kind, instance) {
        (_, SchemaInstance::Null) => Ok(DataValue::Null),
        (PrimitiveKind::Int32 | PrimitiveKind::Int64, SchemaInstance::Int(i)) => {
            Ok(DataValue::Int(*i))
        }
        (PrimitiveKind::Uint32 | PrimitiveKind::Uint64, SchemaInstance::Int(i)) => {
            u64::try_from(*i)
                .map(DataValue::Uint)
                .map_err(|_| ConvertError::OutOfRange {
                    value: i.to_string(),
                    target: "unsigned integer".to_string(),
                })
        }
        (PrimitiveKind::Float | PrimitiveKind::Double, SchemaInstance::Float(f)) => {
            Ok(DataValue::Float(*f))
        }
        (PrimitiveKind::Float | PrimitiveKind::Double, SchemaInstance::Int(i)) => {
            Ok(DataValue::Float(*i as f64))
        }
        (PrimitiveKind::Bool, SchemaInstance::Bool(b)) => Ok(DataValue::Bool(*b)),
        (PrimitiveKind::Str, SchemaInstance::Str(s)) => Ok(DataValue::Str(s.clone())),
        (PrimitiveKind::Bytes, SchemaInstance::Bytes(b)) => Ok(DataValue::Bytes(b.clone())),
        (PrimitiveKind::JsonObject, SchemaInstance::Json(v)) => Ok(DataValue::Json(v.clone())),
        (kind, other) => Err(mismatch(&format!("{kind:?}").to_lowercase(), other)),
    }
}

fn instance_kind(instance: &SchemaInstance) -> &'static str {
    match instance {
        SchemaInstance::Null => "null",
        SchemaInstance::Bool(_) => "bool",
        SchemaInstance::Int(_) => "int",
        SchemaInstance::Float(_) => "float",
        SchemaInstance::Str(_) => "str",
        SchemaInstance::Bytes(_) => "bytes",
        SchemaInstance::Json(_) => "json",
        SchemaInstance::Enum { .. } => "enum",
        SchemaInstance::List(_) => "list",
        SchemaInstance::Map(_) => "map",
        SchemaInstance::Record { .. } => "record",
    }
}

fn mismatch(expected: &str, found: &SchemaInstance) -> ConvertError {
    ConvertError::Mismatch {
        expected: expected.to_string(),
        found: instance_kind(found).to_string(),
    }
}
