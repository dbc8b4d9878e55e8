//! # Request Decoder
//!
//! Content-type dispatch plus the two decode paths.
//!
//! The JSON path is one parse and one validation pass. The form path is the
//! interesting half: form data arrives as a flat mapping from dotted string
//! keys to raw text or file parts, and has to fold back into the nested
//! schema shape without ambiguity:
//!
//! 1. Each key resolves through record field declarations one segment at a
//!    time. Union nodes resolve first-match-wins: the final segment expands
//!    to all alternatives, an interior segment takes the first alternative
//!    whose sub-path resolves. This tie-break is preserved source behavior,
//!    not a correctness guarantee.
//! 2. A sequence target switches the key to expect-many and unwraps to the
//!    element type (re-expanding unions).
//! 3. Candidates are probed in declared order. A record candidate accepts
//!    only values that parse as JSON — the probe that tells a JSON blob
//!    apart from a scalar or a file. A binary candidate materializes file
//!    parts to bytes. Scalar candidates pass text through for validation to
//!    coerce. The first accepting candidate writes into the pending tree at
//!    the dotted path and wins.
//! 4. Exhausting all candidates is a visible 422, never a dropped field.
//!
//! After all keys fold, the assembled tree gets one full validation pass.

use std::collections::BTreeMap;

use wireform_schema::{validate, PendingValue, SchemaInstance, SchemaType};

use crate::error::DecodeError;
use crate::request::{FormData, FormValue, Inbound, Payload};

enum MediaKind {
    Json,
    Multipart,
    Other,
}

// JSON must match exactly; multipart carries a boundary parameter, so a
// substring check is the contract.
fn media_kind(content_type: Option<&str>) -> MediaKind {
    match content_type {
        Some("application/json") => MediaKind::Json,
        Some(ct) if ct.contains("multipart/form-data") => MediaKind::Multipart,
        _ => MediaKind::Other,
    }
}

/// Decode an inbound request against a schema.
///
/// Returns the validated instance, or the structured rejection the transport
/// should translate into a 415/422 response.
pub fn decode(schema: &SchemaType, request: Inbound) -> Result<SchemaInstance, DecodeError> {
    let (content_type, payload) = request.into_parts();
    match (media_kind(content_type.as_deref()), payload) {
        (MediaKind::Json, Payload::Body(bytes)) => decode_json(schema, &bytes),
        (MediaKind::Multipart, Payload::Form(form)) => decode_form(schema, &form),
        _ => Err(DecodeError::UnsupportedMediaType(
            content_type.unwrap_or_else(|| "<none>".to_string()),
        )),
    }
}

fn decode_json(schema: &SchemaType, body: &[u8]) -> Result<SchemaInstance, DecodeError> {
    tracing::debug!(bytes = body.len(), "decoding JSON body");
    let parsed: serde_json::Value = serde_json::from_slice(body)?;
    Ok(validate(schema, &PendingValue::Json(parsed))?)
}

fn decode_form(schema: &SchemaType, form: &FormData) -> Result<SchemaInstance, DecodeError> {
    let keys = form.keys();
    tracing::debug!(keys = keys.len(), "decoding form payload");

    let mut pending = BTreeMap::new();
    for key in keys {
        let raw = form.get_all(key);
        // A blank first value means the field was submitted empty: treat the
        // key as absent rather than as an explicit empty value.
        if raw.is_empty() || matches!(raw[0], FormValue::Text(t) if t.is_empty()) {
            continue;
        }

        let segments: Vec<&str> = key.split('.').collect();
        let resolved = resolve_path(schema, &segments);
        if resolved.is_empty() {
            return Err(DecodeError::UnknownKey(key.to_string()));
        }

        let (candidates, expect_many) = expand_candidates(resolved);
        // A scalar slot can only be populated once per request.
        if !expect_many && raw.len() > 1 {
            return Err(DecodeError::DuplicateKey(key.to_string()));
        }

        let mut parsed = false;
        for candidate in &candidates {
            let Some(value) = try_accept(candidate, &raw, expect_many) else {
                continue;
            };
            if !insert_at_path(&mut pending, &segments, value) {
                return Err(DecodeError::DuplicateKey(key.to_string()));
            }
            parsed = true;
            break;
        }
        if !parsed {
            return Err(DecodeError::KeyUnmatched {
                key: key.to_string(),
                candidates: render_candidates(&candidates),
            });
        }
    }

    Ok(validate(schema, &PendingValue::Object(pending))?)
}

/// Resolve a dotted path against the schema, one record field per segment.
///
/// Returns the candidate types for the final segment: one type normally,
/// every alternative when the path lands on a union, empty when any segment
/// fails to resolve.
fn resolve_path(ty: &SchemaType, segments: &[&str]) -> Vec<SchemaType> {
    if segments.is_empty() {
        return vec![ty.clone()];
    }
    let SchemaType::Record(record) = ty else {
        return Vec::new();
    };
    let Some(field) = record.field(segments[0]) else {
        return Vec::new();
    };
    match &field.ty {
        SchemaType::Union(alternatives) => {
            if segments.len() == 1 {
                return alternatives.clone();
            }
            // First alternative whose sub-path resolves wins; overlapping
            // alternatives are not detected.
            for alt in alternatives {
                let resolved = resolve_path(alt, &segments[1..]);
                if !resolved.is_empty() {
                    return resolved;
                }
            }
            Vec::new()
        }
        other => resolve_path(other, &segments[1..]),
    }
}

/// A sequence target switches to expect-many and contributes its element
/// type as the candidate set, re-expanding a union element.
fn expand_candidates(resolved: Vec<SchemaType>) -> (Vec<SchemaType>, bool) {
    if resolved.len() == 1 {
        if let SchemaType::Sequence(element) = &resolved[0] {
            let candidates = match element.as_ref() {
                SchemaType::Union(alternatives) => alternatives.clone(),
                other => vec![other.clone()],
            };
            return (candidates, true);
        }
    }
    (resolved, false)
}

/// Probe one candidate type against the raw values.
///
/// `None` means the candidate does not fit and the next one should be tried;
/// `Some` carries the processed value(s) ready to fold into the pending tree.
fn try_accept(
    candidate: &SchemaType,
    raw: &[&FormValue],
    expect_many: bool,
) -> Option<PendingValue> {
    let mut processed = Vec::with_capacity(raw.len());
    match candidate {
        // A nested record arrives as a JSON blob; failing the parse is how
        // the decoder learns this value belongs to a different alternative.
        SchemaType::Record(_) => {
            for value in raw {
                match value {
                    FormValue::Text(text) => match serde_json::from_str::<serde_json::Value>(text)
                    {
                        Ok(json) => processed.push(PendingValue::Json(json)),
                        Err(_) => return None,
                    },
                    FormValue::File(_) => return None,
                }
            }
        }
        // The binary leaf reads file parts to completion; text flows on to
        // the base64 rule at validation time.
        SchemaType::Bytes => {
            for value in raw {
                match value {
                    FormValue::File(part) => {
                        processed.push(PendingValue::Bytes(part.content().to_vec()))
                    }
                    FormValue::Text(text) => processed.push(PendingValue::Text(text.clone())),
                }
            }
        }
        // Scalars pass through untouched; validation owns coercion. A file
        // part lands as raw bytes so the final pass rejects it visibly
        // instead of this loop dropping the field.
        _ => {
            for value in raw {
                match value {
                    FormValue::Text(text) => processed.push(PendingValue::Text(text.clone())),
                    FormValue::File(part) => {
                        processed.push(PendingValue::Bytes(part.content().to_vec()))
                    }
                }
            }
        }
    }

    if expect_many {
        Some(PendingValue::List(processed))
    } else {
        processed.into_iter().next()
    }
}

fn render_candidates(candidates: &[SchemaType]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write a processed value at a dotted path, creating interior objects.
///
/// Returns false when the slot is already populated or an interior segment
/// already holds a leaf — each dotted key populates its target exactly once
/// per request.
fn insert_at_path(
    root: &mut BTreeMap<String, PendingValue>,
    segments: &[&str],
    value: PendingValue,
) -> bool {
    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| PendingValue::Object(BTreeMap::new()));
        match entry {
            PendingValue::Object(map) => current = map,
            _ => return false,
        }
    }
    let last = segments[segments.len() - 1];
    if current.contains_key(last) {
        return false;
    }
    current.insert(last.to_string(), value);
    true
}
