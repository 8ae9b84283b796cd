//! Keys for caching responses.
//!
//! This crate caches nothing itself. Callers which do cache responses key them with a
//! [`CacheKey`], which includes the schema version the document was built against. A new schema
//! version may change the fields of an object type, so a response cached under one version must
//! never be served for another; including the version in the key makes that impossible.

use crate::{document::Document, meta::SchemaVersion, transport::Request};
use std::collections::BTreeMap;

/// Identifies the response to one request against one schema version.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub operation: String,
    pub object_type: Option<String>,
    pub uid: Option<String>,
    pub schema_version: SchemaVersion,
    /// Variable values in their JSON encoding.
    pub variables: BTreeMap<String, String>,
}

impl CacheKey {
    /// The key for `doc`, built against `schema_version`.
    pub fn for_document(doc: &Document, schema_version: SchemaVersion) -> Self {
        Self {
            operation: doc.name().to_string(),
            object_type: None,
            uid: None,
            schema_version,
            variables: Default::default(),
        }
    }

    /// The key for `request`, including all of its variables.
    ///
    /// The `uid` variable, if there is one, is also recorded as the key's uid.
    pub fn for_request(request: &Request, schema_version: SchemaVersion) -> Self {
        let mut key = Self::for_document(request.document(), schema_version);
        for (name, value) in request.variables() {
            key = key.variable(name, value);
        }
        if let Some(uid) = request.variables().get("uid").and_then(|uid| uid.as_str()) {
            key.uid = Some(uid.to_string());
        }
        key
    }

    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        self.variables.insert(name.into(), value.to_string());
        self
    }
}
