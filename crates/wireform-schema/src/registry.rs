//! # Schema Registry
//!
//! Process-wide memoized mapping between data-model record descriptors and
//! their generated validation schemas, plus the reverse direction.
//!
//! ## Concurrency
//!
//! The registry is the only shared mutable state in the workspace. One mutex
//! guards the entire get-or-build recursion, so two threads racing on the
//! first use of a type cannot produce two distinct schemas — the loser of the
//! race observes the winner's entry on lookup. The registry is read-mostly
//! after warm-up.
//!
//! ## Identity
//!
//! Entries are keyed by descriptor full name. Descriptors are identity-stable
//! singletons per name in the source model layer, so name identity equals
//! object identity. The reverse mapping covers records only: alias targets
//! are ambiguous by design (several aliases all collapse to "list of
//! primitive"), so converting a bare list back requires the caller to supply
//! the expected alias type.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use wireform_model::{DataModelType, EnumDescriptor, RecordDescriptor};

use crate::mapper::{self, SchemaBuildError};
use crate::types::{EnumSchema, RecordSchema, SchemaType};

/// The underlying store. Only the mapper touches this, under the registry
/// mutex.
pub(crate) struct TypeTable {
    records: HashMap<String, Arc<RecordSchema>>,
    enums: HashMap<String, Arc<EnumSchema>>,
    reverse: HashMap<String, Arc<RecordDescriptor>>,
    // Record names registered by the in-flight build, for rollback when a
    // nested descriptor turns out to be unmappable.
    session_added: Vec<String>,
}

impl TypeTable {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            enums: HashMap::new(),
            reverse: HashMap::new(),
            session_added: Vec::new(),
        }
    }

    pub(crate) fn record(&self, name: &str) -> Option<Arc<RecordSchema>> {
        self.records.get(name).cloned()
    }

    pub(crate) fn insert_record(&mut self, desc: &Arc<RecordDescriptor>, schema: &Arc<RecordSchema>) {
        let name = desc.full_name().to_string();
        self.records.insert(name.clone(), schema.clone());
        self.reverse.insert(name.clone(), desc.clone());
        self.session_added.push(name);
    }

    pub(crate) fn enum_schema(&mut self, desc: &Arc<EnumDescriptor>) -> Arc<EnumSchema> {
        if let Some(existing) = self.enums.get(desc.full_name()) {
            return existing.clone();
        }
        let schema = EnumSchema::new(desc.full_name(), desc.members().to_vec());
        self.enums
            .insert(desc.full_name().to_string(), schema.clone());
        schema
    }

    fn begin_session(&mut self) {
        self.session_added.clear();
    }

    fn rollback_session(&mut self) {
        for name in self.session_added.drain(..) {
            self.records.remove(&name);
            self.reverse.remove(&name);
        }
    }
}

/// Process-wide bidirectional schema registry.
pub struct SchemaRegistry {
    inner: Mutex<TypeTable>,
}

impl SchemaRegistry {
    /// The singleton instance, initialized empty on first use.
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| SchemaRegistry {
            inner: Mutex::new(TypeTable::new()),
        })
    }

    /// Memoized get-or-build for a record descriptor.
    ///
    /// Calling twice for the same descriptor returns the identical `Arc`.
    /// A failed build leaves no trace of the failed session in the registry.
    pub fn schema_for(
        &self,
        record: &Arc<RecordDescriptor>,
    ) -> Result<Arc<RecordSchema>, SchemaBuildError> {
        let mut table = self.inner.lock();
        table.begin_session();
        let result = mapper::map_record(&mut table, record);
        if result.is_err() {
            table.rollback_session();
        }
        result
    }

    /// Memoized get-or-build for an arbitrary type node. Records and enums
    /// nested anywhere inside share registry entries.
    pub fn schema_for_type(&self, ty: &DataModelType) -> Result<SchemaType, SchemaBuildError> {
        let mut table = self.inner.lock();
        table.begin_session();
        let result = mapper::map_type(&mut table, ty);
        if result.is_err() {
            table.rollback_session();
        }
        result
    }

    /// Reverse lookup: the descriptor a record schema was generated from.
    ///
    /// Returns `None` for schemas the registry did not produce. There is
    /// deliberately no reverse lookup for sequence types — alias targets are
    /// many-to-one.
    pub fn model_for(&self, schema: &Arc<RecordSchema>) -> Option<Arc<RecordDescriptor>> {
        self.inner.lock().reverse.get(schema.name()).cloned()
    }
}
