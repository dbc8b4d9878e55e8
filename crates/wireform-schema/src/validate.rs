//! # Schema Validation
//!
//! Validates an in-progress decode tree ([`PendingValue`]) against a
//! [`SchemaType`], producing either a typed [`SchemaInstance`] or a
//! structured list of violations with the dotted path to every offending
//! field.
//!
//! ## Security Invariant
//!
//! Validation is a trust boundary. Every rejection carries the path and a
//! human-readable message; no input is silently dropped or coerced into a
//! shape the schema does not declare.
//!
//! ## Coercion Rules
//!
//! Form submissions deliver everything as text, so leaves are lenient about
//! representation while staying strict about meaning:
//!
//! - `int` accepts JSON integers, integral floats, and integral text.
//! - `float` accepts JSON numbers and numeric text.
//! - `bool` accepts JSON booleans and `true`/`false`/`1`/`0` text.
//! - `bytes` accepts raw bytes or base64 text (standard alphabet);
//!   malformed base64 is a violation, never a passthrough.
//! - `enum` accepts a member name or a member number.
//! - records are closed: unknown fields are violations, absent fields
//!   validate as null.
//! - unions try alternatives in declared order; first success wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use crate::types::{EnumSchema, RecordSchema, SchemaType};

/// The nested mapping being assembled during one decode call, before final
/// validation. Created per call, never shared between requests.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingValue {
    /// A parsed JSON value (whole bodies, or form values that passed the
    /// JSON probe).
    Json(Value),
    /// Raw text from a form field, not yet coerced.
    Text(String),
    /// Raw bytes from a fully-read file part.
    Bytes(Vec<u8>),
    /// An ordered list folded from repeated form values.
    List(Vec<PendingValue>),
    /// An object folded from dotted form keys.
    Object(BTreeMap<String, PendingValue>),
}

impl From<Value> for PendingValue {
    fn from(value: Value) -> Self {
        PendingValue::Json(value)
    }
}

/// A validated instance of a schema type.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaInstance {
    /// Null / absent.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Str(String),
    /// Normalized binary payload.
    Bytes(Vec<u8>),
    /// Arbitrary JSON object.
    Json(Value),
    /// A resolved enum member.
    Enum {
        /// The enum this member belongs to.
        schema: Arc<EnumSchema>,
        /// The member name.
        name: String,
    },
    /// A list of validated elements.
    List(Vec<SchemaInstance>),
    /// A map with string-rendered keys.
    Map(BTreeMap<String, SchemaInstance>),
    /// A validated record.
    Record {
        /// The record's schema.
        schema: Arc<RecordSchema>,
        /// One entry per declared field.
        fields: BTreeMap<String, SchemaInstance>,
    },
}

impl SchemaInstance {
    /// Render the instance as a JSON value for the response path.
    ///
    /// Binary payloads re-encode as base64 text, symmetric with the inbound
    /// decode rule; enum members render by name.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaInstance::Null => Value::Null,
            SchemaInstance::Bool(b) => Value::Bool(*b),
            SchemaInstance::Int(i) => Value::from(*i),
            SchemaInstance::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SchemaInstance::Str(s) => Value::String(s.clone()),
            SchemaInstance::Bytes(b) => Value::String(BASE64.encode(b)),
            SchemaInstance::Json(v) => v.clone(),
            SchemaInstance::Enum { name, .. } => Value::String(name.clone()),
            SchemaInstance::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            SchemaInstance::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            SchemaInstance::Record { fields, .. } => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// A single validation violation with the dotted path to the offending field.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Dotted path into the instance (`a.b[0].c`); empty at the root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// Ordered collection of violations from one validation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validate a pending value against a schema type.
///
/// Collects every violation rather than stopping at the first, so clients
/// see the full field-error list in one response.
pub fn validate(schema: &SchemaType, value: &PendingValue) -> Result<SchemaInstance, Violations> {
    let mut out = Vec::new();
    match check(schema, value, "", &mut out) {
        Some(instance) if out.is_empty() => Ok(instance),
        _ => Err(Violations::from(out)),
    }
}

fn child(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn reject(out: &mut Vec<Violation>, path: &str, message: String) -> Option<SchemaInstance> {
    out.push(Violation {
        path: path.to_string(),
        message,
    });
    None
}

// Returns None if and only if at least one violation was pushed.
fn check(
    schema: &SchemaType,
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    match schema {
        SchemaType::Int => check_int(value, path, out),
        SchemaType::Float => check_float(value, path, out),
        SchemaType::Bool => check_bool(value, path, out),
        SchemaType::Str => check_str(value, path, out),
        SchemaType::Bytes => check_bytes(value, path, out),
        SchemaType::Json => match value {
            PendingValue::Json(v @ Value::Object(_)) => Some(SchemaInstance::Json(v.clone())),
            _ => reject(out, path, "expected a JSON object".to_string()),
        },
        SchemaType::Null => match value {
            PendingValue::Json(Value::Null) => Some(SchemaInstance::Null),
            _ => reject(out, path, "expected null".to_string()),
        },
        SchemaType::Enum(e) => check_enum(e, value, path, out),
        SchemaType::Record(r) => check_record(r, value, path, out),
        SchemaType::Sequence(element) => check_sequence(element, value, path, out),
        SchemaType::Map(key, val) => check_map(key, val, value, path, out),
        SchemaType::Union(alts) => {
            for alt in alts {
                let mut scratch = Vec::new();
                if let Some(instance) = check(alt, value, path, &mut scratch) {
                    return Some(instance);
                }
            }
            reject(
                out,
                path,
                format!(
                    "does not match any alternative of {}",
                    SchemaType::Union(alts.clone())
                ),
            )
        }
    }
}

fn check_int(value: &PendingValue, path: &str, out: &mut Vec<Violation>) -> Option<SchemaInstance> {
    match value {
        PendingValue::Json(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(SchemaInstance::Int(i))
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(SchemaInstance::Int(f as i64))
                } else {
                    reject(out, path, format!("'{f}' is not a valid integer"))
                }
            } else {
                reject(out, path, "integer out of range".to_string())
            }
        }
        PendingValue::Json(Value::String(s)) | PendingValue::Text(s) => {
            match s.trim().parse::<i64>() {
                Ok(i) => Some(SchemaInstance::Int(i)),
                Err(_) => reject(out, path, format!("cannot parse '{s}' as an integer")),
            }
        }
        _ => reject(out, path, "expected an integer".to_string()),
    }
}

fn check_float(
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    match value {
        PendingValue::Json(Value::Number(n)) => match n.as_f64() {
            Some(f) => Some(SchemaInstance::Float(f)),
            None => reject(out, path, "float out of range".to_string()),
        },
        PendingValue::Json(Value::String(s)) | PendingValue::Text(s) => {
            match s.trim().parse::<f64>() {
                Ok(f) => Some(SchemaInstance::Float(f)),
                Err(_) => reject(out, path, format!("cannot parse '{s}' as a float")),
            }
        }
        _ => reject(out, path, "expected a float".to_string()),
    }
}

fn check_bool(
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    match value {
        PendingValue::Json(Value::Bool(b)) => Some(SchemaInstance::Bool(*b)),
        PendingValue::Json(Value::String(s)) | PendingValue::Text(s) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(SchemaInstance::Bool(true)),
                "false" | "0" => Some(SchemaInstance::Bool(false)),
                _ => reject(out, path, format!("cannot parse '{s}' as a boolean")),
            }
        }
        _ => reject(out, path, "expected a boolean".to_string()),
    }
}

fn check_str(value: &PendingValue, path: &str, out: &mut Vec<Violation>) -> Option<SchemaInstance> {
    match value {
        PendingValue::Text(s) | PendingValue::Json(Value::String(s)) => {
            Some(SchemaInstance::Str(s.clone()))
        }
        _ => reject(out, path, "expected a string".to_string()),
    }
}

// The binary-leaf decode rule: raw bytes pass through, text is base64 in the
// standard alphabet, anything else is a violation.
fn check_bytes(
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    match value {
        PendingValue::Bytes(b) => Some(SchemaInstance::Bytes(b.clone())),
        PendingValue::Text(s) | PendingValue::Json(Value::String(s)) => match BASE64.decode(s) {
            Ok(bytes) => Some(SchemaInstance::Bytes(bytes)),
            Err(err) => reject(out, path, format!("invalid base64 payload: {err}")),
        },
        _ => reject(out, path, "expected bytes or base64 text".to_string()),
    }
}

fn check_enum(
    schema: &Arc<EnumSchema>,
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    let member = |name: &str| SchemaInstance::Enum {
        schema: schema.clone(),
        name: name.to_string(),
    };
    match value {
        PendingValue::Json(Value::String(s)) | PendingValue::Text(s) => {
            if schema.number_of(s).is_some() {
                return Some(member(s));
            }
            // Numeric text selects a member by number.
            if let Ok(n) = s.trim().parse::<i32>() {
                if let Some(name) = schema.name_of(n) {
                    return Some(member(name));
                }
            }
            reject(
                out,
                path,
                format!("'{s}' is not a member of enum {}", schema.name()),
            )
        }
        PendingValue::Json(Value::Number(n)) => match n.as_i64() {
            Some(i) if i >= i32::MIN as i64 && i <= i32::MAX as i64 => {
                match schema.name_of(i as i32) {
                    Some(name) => Some(member(name)),
                    None => reject(
                        out,
                        path,
                        format!("'{i}' is not a member of enum {}", schema.name()),
                    ),
                }
            }
            _ => reject(
                out,
                path,
                format!("'{n}' is not a member of enum {}", schema.name()),
            ),
        },
        _ => reject(
            out,
            path,
            format!("expected a member of enum {}", schema.name()),
        ),
    }
}

fn check_record(
    schema: &Arc<RecordSchema>,
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    let entries: Vec<(String, PendingValue)> = match value {
        PendingValue::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        PendingValue::Json(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), PendingValue::Json(v.clone())))
            .collect(),
        _ => {
            return reject(
                out,
                path,
                format!("expected an object for record {}", schema.name()),
            )
        }
    };

    let mut ok = true;
    // The record shape is closed; unknown fields fail rather than vanish.
    for (name, _) in &entries {
        if schema.field(name).is_none() {
            out.push(Violation {
                path: child(path, name),
                message: format!("unknown field '{name}' for record {}", schema.name()),
            });
            ok = false;
        }
    }

    let mut fields = BTreeMap::new();
    for field in schema.fields() {
        match entries.iter().find(|(name, _)| name == &field.name) {
            Some((_, pending)) => {
                match check(&field.ty, pending, &child(path, &field.name), out) {
                    Some(instance) => {
                        fields.insert(field.name.clone(), instance);
                    }
                    None => ok = false,
                }
            }
            // Absent fields validate as null; only explicit values are checked.
            None => {
                fields.insert(field.name.clone(), SchemaInstance::Null);
            }
        }
    }

    if ok {
        Some(SchemaInstance::Record {
            schema: schema.clone(),
            fields,
        })
    } else {
        None
    }
}

fn check_sequence(
    element: &SchemaType,
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    let items: Vec<PendingValue> = match value {
        PendingValue::List(items) => items.clone(),
        PendingValue::Json(Value::Array(items)) => {
            items.iter().map(|v| PendingValue::Json(v.clone())).collect()
        }
        _ => return reject(out, path, "expected a list".to_string()),
    };

    let mut ok = true;
    let mut validated = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match check(element, item, &format!("{path}[{i}]"), out) {
            Some(instance) => validated.push(instance),
            None => ok = false,
        }
    }
    if ok {
        Some(SchemaInstance::List(validated))
    } else {
        None
    }
}

fn check_map(
    key_schema: &SchemaType,
    value_schema: &SchemaType,
    value: &PendingValue,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<SchemaInstance> {
    let entries: Vec<(String, PendingValue)> = match value {
        PendingValue::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        PendingValue::Json(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), PendingValue::Json(v.clone())))
            .collect(),
        _ => return reject(out, path, "expected a map".to_string()),
    };

    let mut ok = true;
    let mut validated = BTreeMap::new();
    for (key, pending) in &entries {
        let entry_path = child(path, key);
        // Keys arrive as strings; the key schema decides whether that text
        // is acceptable (e.g. integral text for int keys).
        if check(key_schema, &PendingValue::Text(key.clone()), &entry_path, out).is_none() {
            ok = false;
            continue;
        }
        match check(value_schema, pending, &entry_path, out) {
            Some(instance) => {
                validated.insert(key.clone(), instance);
            }
            None => ok = false,
        }
    }
    if ok {
        Some(SchemaInstance::Map(validated))
    } else {
        None
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Integral text always validates to the integer it spells.
        #[test]
        fn int_text_roundtrip(n in any::<i64>()) {
            let instance = validate(&SchemaType::Int, &PendingValue::Text(n.to_string())).unwrap();
            prop_assert_eq!(instance, SchemaInstance::Int(n));
        }

        /// The binary leaf normalizes base64 text and raw bytes to the same
        /// payload, and to_json re-encodes losslessly.
        #[test]
        fn bytes_encodings_agree(payload in prop::collection::vec(any::<u8>(), 0..256)) {
            use base64::engine::general_purpose::STANDARD;
            use base64::Engine as _;

            let from_raw =
                validate(&SchemaType::Bytes, &PendingValue::Bytes(payload.clone())).unwrap();
            let from_text = validate(
                &SchemaType::Bytes,
                &PendingValue::Text(STANDARD.encode(&payload)),
            )
            .unwrap();
            prop_assert_eq!(&from_raw, &from_text);
            prop_assert_eq!(from_raw.to_json(), serde_json::json!(STANDARD.encode(&payload)));
        }

        /// Validation never panics on arbitrary text against any scalar leaf.
        #[test]
        fn scalar_leaves_never_panic(s in ".{0,64}") {
            for schema in [
                SchemaType::Int,
                SchemaType::Float,
                SchemaType::Bool,
                SchemaType::Str,
                SchemaType::Bytes,
                SchemaType::Null,
            ] {
                let _ = validate(&schema, &PendingValue::Text(s.clone()));
            }
        }
    }
}
