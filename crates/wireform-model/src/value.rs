//! # Runtime Values
//!
//! [`DataValue`] is a runtime instance of a [`DataModelType`]. Values are
//! per-call and short-lived; the descriptors they reference are process-wide.
//!
//! The record constructor ([`RecordDescriptor::build`]) is the single entry
//! point for assembling record values from keyword sets. It checks keyword
//! names against the declared field table and nothing else — type validation
//! happens in the schema layer before conversion ever reaches this crate.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::{AliasDescriptor, EnumDescriptor, RecordDescriptor};
use crate::error::ConstructError;

/// A runtime instance of a data-model type.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Absent/none.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer (both integer families narrow to this at runtime).
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point (both float families widen to this at runtime).
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Opaque byte blob.
    Bytes(Vec<u8>),
    /// Arbitrary JSON object value.
    Json(serde_json::Value),
    /// An enum member, stored by number.
    Enum {
        /// The enum this member belongs to.
        descriptor: Arc<EnumDescriptor>,
        /// The member number.
        number: i32,
    },
    /// A homogeneous list.
    List(Vec<DataValue>),
    /// A map with string-rendered keys.
    Map(BTreeMap<String, DataValue>),
    /// A record instance.
    Record {
        /// The record's descriptor.
        descriptor: Arc<RecordDescriptor>,
        /// Field values, one entry per declared field.
        fields: BTreeMap<String, DataValue>,
    },
    /// A primitive-sequence alias instance.
    SequenceAlias {
        /// The alias descriptor.
        descriptor: Arc<AliasDescriptor>,
        /// The wrapped values.
        values: Vec<DataValue>,
    },
}

impl RecordDescriptor {
    /// The data-model constructor: build a record value from a keyword set.
    ///
    /// Invoked once with the fully resolved keywords. Unknown field names are
    /// rejected; declared fields absent from the keyword set default to
    /// [`DataValue::Null`]. Field types are NOT re-checked here — by the time
    /// a caller reaches this constructor the values have already passed
    /// schema validation, and re-validating would duplicate that gate.
    pub fn build(
        self: &Arc<Self>,
        kwargs: BTreeMap<String, DataValue>,
    ) -> Result<DataValue, ConstructError> {
        let mut kwargs = kwargs;
        let mut fields = BTreeMap::new();
        for field in self.fields() {
            let value = kwargs.remove(&field.name).unwrap_or(DataValue::Null);
            fields.insert(field.name.clone(), value);
        }
        if let Some((name, _)) = kwargs.into_iter().next() {
            return Err(ConstructError::UnknownField {
                record: self.full_name().to_string(),
                field: name,
            });
        }
        Ok(DataValue::Record {
            descriptor: Arc::clone(self),
            fields,
        })
    }
}

impl AliasDescriptor {
    /// Wrap a list of primitive values in this alias.
    pub fn wrap(self: &Arc<Self>, values: Vec<DataValue>) -> DataValue {
        DataValue::SequenceAlias {
            descriptor: Arc::clone(self),
            values,
        }
    }
}
