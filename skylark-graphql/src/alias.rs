//! Collision-free response aliases and their decoder.
//!
//! Two situations force a document to rename things in the response:
//!
//! * Polymorphic selections. A search result or a set's content can hold objects of many types,
//!   selected with one inline fragment per type. If `Episode` and `Brand` both have a `title`
//!   field with different types, the two fragments would clash on the `title` response key, so
//!   every field inside a fragment is selected under a [field alias](encode_field_alias) of the
//!   form `__{ObjectType}__{field}`. [`decode_response`] strips those prefixes again before the
//!   response is parsed into domain objects.
//! * Batched mutations. The API has no bulk-write endpoint for some operations, so one document
//!   carries many copies of the same root field, each under an
//!   [operation alias](operation_alias) of the form `{operation}_{identifier}`.
//!
//! Both schemes are collision-free by construction for legal GraphQL names, so there is no
//! runtime "duplicate alias" error.

use serde_json::{Map, Value};
use std::collections::HashSet;

/// The marker that starts and separates the parts of a field alias.
pub const FIELD_ALIAS_SEPARATOR: &str = "__";

/// The response key under which a polymorphic result reports its concrete type.
pub const TYPENAME: &str = "__typename";

/// The alias for `field` selected inside a fragment on `object_type`.
pub fn encode_field_alias(object_type: &str, field: &str) -> String {
    format!("{FIELD_ALIAS_SEPARATOR}{object_type}{FIELD_ALIAS_SEPARATOR}{field}")
}

/// Strip the `object_type` prefix from a response key.
///
/// Keys which were never prefixed for `object_type` are returned unchanged.
pub fn decode_field_alias<'a>(object_type: &str, key: &'a str) -> &'a str {
    key.strip_prefix(FIELD_ALIAS_SEPARATOR)
        .and_then(|rest| rest.strip_prefix(object_type))
        .and_then(|rest| rest.strip_prefix(FIELD_ALIAS_SEPARATOR))
        .filter(|field| !field.is_empty())
        .unwrap_or(key)
}

/// Split a field alias into its object type and field when the object type is not known.
///
/// The object type is taken to end at the first separator after the prefix, so this cannot
/// recover object type names that themselves contain `__`. [`decode_response`] prefers the
/// `__typename` of the enclosing object whenever the response has one.
pub fn split_field_alias(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(FIELD_ALIAS_SEPARATOR)?;
    let (object_type, field) = rest.split_once(FIELD_ALIAS_SEPARATOR)?;
    if object_type.is_empty() || field.is_empty() {
        return None;
    }
    Some((object_type, field))
}

/// Remove field alias prefixes from every object in a response.
///
/// For each JSON object the prefix to strip is decided by its own `__typename` when present;
/// otherwise any key that looks like a field alias is split generically. Arrays and nested
/// objects are decoded recursively and all other values are returned as they are.
pub fn decode_response(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(decode_response).collect()),
        Value::Object(object) => Value::Object(decode_object(object)),
        value => value,
    }
}

fn decode_object(object: Map<String, Value>) -> Map<String, Value> {
    let typename = object
        .get(TYPENAME)
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut decoded = Map::with_capacity(object.len());
    for (key, value) in object {
        let key = match &typename {
            Some(typename) => decode_field_alias(typename, &key).to_string(),
            None => match split_field_alias(&key) {
                Some((_, field)) => field.to_string(),
                None => key,
            },
        };
        decoded.insert(key, decode_response(value));
    }
    decoded
}

/// The alias for one copy of `operation` in a batched document.
///
/// `identifier` can be anything that tells the copies apart (an index, a uid, an object type);
/// every character outside `[A-Za-z0-9_]` is replaced with `_` so the alias is a legal GraphQL
/// name.
pub fn operation_alias(operation: &str, identifier: impl AsRef<str>) -> String {
    format!("{operation}_{}", sanitize_identifier(identifier.as_ref()))
}

/// Allocates operation aliases for one batched document, never handing out the same alias twice.
///
/// Sanitizing can map distinct identifiers to the same alias (`a-b` and `a_b`). When that
/// happens the later alias gets a numeric suffix.
#[derive(Clone, Debug, Default)]
pub struct OperationAliases {
    used: HashSet<String>,
}

impl OperationAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// The alias for the next copy of `operation`.
    pub fn next(&mut self, operation: &str, identifier: impl AsRef<str>) -> String {
        let alias = operation_alias(operation, identifier);
        if self.used.insert(alias.clone()) {
            return alias;
        }
        let unique = (1..)
            .map(|n| format!("{alias}_{n}"))
            .find(|candidate| !self.used.contains(candidate))
            .unwrap_or_default();
        self.used.insert(unique.clone());
        unique
    }
}

/// Replace every character that may not appear in a GraphQL name with `_`.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
