//! Common items that you will always want in scope when building documents.

pub use crate::{
    diff::{diff_links, Link, LinkRef},
    document::{Document, Field, InlineFragment, Selection, Value, VariableDefinition},
    meta::{Capabilities, FieldMeta, Loadable, ObjectTypeMeta, Schema, SchemaVersion, Verb},
    mutation, query,
    transport::{Client, Request, Response, Transport},
};
