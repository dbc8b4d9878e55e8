//! # Inbound Boundary
//!
//! The transport-facing request shape. The surrounding HTTP layer performs
//! the wire work — one blocking read of the full body, multipart parsing —
//! and hands the decoder an [`Inbound`]: the content-type tag plus either
//! the buffered body bytes or the flat multi-valued form mapping.
//!
//! [`FormData`] preserves submission order: `keys()` yields distinct keys in
//! first-seen order and `get_all` yields that key's values in the order they
//! appeared, which is what makes repeated-key list folding deterministic.

/// A fully-read multipart file part.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Client-supplied filename, if any.
    pub filename: Option<String>,
    /// Declared part content type, if any.
    pub content_type: Option<String>,
    content: Vec<u8>,
}

impl FilePart {
    /// A part with content and no metadata.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: None,
            content_type: None,
            content: content.into(),
        }
    }

    /// Attach the client-supplied filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach the declared part content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The part's bytes, already read to completion.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// One submitted form value: text, or an opaque byte stream tagged as a
/// file part.
#[derive(Debug, Clone)]
pub enum FormValue {
    /// A text field.
    Text(String),
    /// A file part with its bytes fully materialized.
    File(FilePart),
}

/// Flat multi-valued form mapping, the multipart black box's output.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    /// An empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a key, preserving submission order.
    pub fn append(&mut self, key: impl Into<String>, value: FormValue) {
        self.entries.push((key.into(), value));
    }

    /// Append a text field.
    pub fn append_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.append(key, FormValue::Text(value.into()));
    }

    /// Append a file part.
    pub fn append_file(&mut self, key: impl Into<String>, part: FilePart) {
        self.append(key, FormValue::File(part));
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for (key, _) in &self.entries {
            if !seen.contains(&key.as_str()) {
                seen.push(key.as_str());
            }
        }
        seen
    }

    /// All values submitted under a key, in submission order.
    pub fn get_all(&self, key: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    /// True if no fields were submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The buffered request payload.
#[derive(Debug)]
pub enum Payload {
    /// Whole body bytes (JSON path).
    Body(Vec<u8>),
    /// Parsed form mapping (multipart path).
    Form(FormData),
}

/// An inbound request as the decoder sees it.
#[derive(Debug)]
pub struct Inbound {
    content_type: Option<String>,
    payload: Payload,
}

impl Inbound {
    /// Build from an explicit content-type header value and payload.
    pub fn new(content_type: Option<String>, payload: Payload) -> Self {
        Self {
            content_type,
            payload,
        }
    }

    /// A JSON request with the conventional content type.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(
            Some("application/json".to_string()),
            Payload::Body(body.into()),
        )
    }

    /// A multipart request with the conventional content type.
    pub fn multipart(form: FormData) -> Self {
        Self::new(
            Some("multipart/form-data; boundary=wireform".to_string()),
            Payload::Form(form),
        )
    }

    /// The content-type header value, if one was sent.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Payload) {
        (self.content_type, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_and_ordered() {
        let mut form = FormData::new();
        form.append_text("b", "1");
        form.append_text("a", "2");
        form.append_text("b", "3");
        assert_eq!(form.keys(), vec!["b", "a"]);
    }

    #[test]
    fn get_all_preserves_submission_order() {
        let mut form = FormData::new();
        form.append_text("items", "first");
        form.append_text("other", "x");
        form.append_text("items", "second");
        let values: Vec<&str> = form
            .get_all("items")
            .into_iter()
            .map(|v| match v {
                FormValue::Text(t) => t.as_str(),
                FormValue::File(_) => "<file>",
            })
            .collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[test]
    fn file_parts_keep_their_bytes() {
        let part = FilePart::new(b"\x00\x01\x02".to_vec()).with_filename("blob.bin");
        assert_eq!(part.content(), b"\x00\x01\x02");
        assert_eq!(part.filename.as_deref(), Some("blob.bin"));
    }

    #[test]
    fn conventional_content_types() {
        assert_eq!(
            Inbound::json(b"{}".to_vec()).content_type(),
            Some("application/json")
        );
        assert!(Inbound::multipart(FormData::new())
            .content_type()
            .unwrap()
            .contains("multipart/form-data"));
    }
}
