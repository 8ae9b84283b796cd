//! Builders for write operations.
//!
//! Like the [query](crate::query) builders, these are pure functions returning
//! `Option<Document>`, where [`None`] means there is nothing to send: the metadata is not loaded,
//! the type has no resolver for the write, or the change is empty. A caller can pass the result
//! straight to [`Client::run`](crate::transport::Client::run), which skips the network call for
//! [`None`].
//!
//! Writes which change lists of links (relationships, content, availability) are computed from
//! the original and updated lists with [`diff_links`](crate::diff::diff_links), so a document
//! only mentions what changed.

use crate::{
    document::{Field, Value, VariableDefinition},
    meta::{ObjectTypeMeta, OperationMeta},
    query::vars,
};

pub mod availability;
pub mod delete;
pub mod links;
pub mod metadata;
pub mod schema;

pub use availability::*;
pub use delete::*;
pub use links::*;
pub use metadata::*;
pub use schema::*;

/// The root field for a write to a single existing object, identified by a required `$uid`.
///
/// Returns the field, aliased to `alias`, together with the variables it references.
pub(crate) fn write_root(
    meta: &ObjectTypeMeta,
    op: &OperationMeta,
    alias: &str,
) -> (Field, Vec<VariableDefinition>) {
    let mut variables = vec![vars::required_uid()];
    let mut field = Field::new(&op.name)
        .alias(alias)
        .arg("uid", Value::var("uid"));
    if meta.is_translatable() {
        variables.push(vars::language());
        field = field.arg("language", Value::var("language"));
    }
    (field, variables)
}

/// A `{link: [...], unlink: [...]}` block, with only the non-empty entries.
///
/// Returns [`None`] when both are empty.
pub(crate) fn link_block(link: Vec<Value>, unlink: Vec<Value>) -> Option<Value> {
    let entries = [("link", link), ("unlink", unlink)]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| (name, Value::List(values)))
        .collect::<Vec<_>>();
    if entries.is_empty() {
        None
    } else {
        Some(Value::object(entries))
    }
}
