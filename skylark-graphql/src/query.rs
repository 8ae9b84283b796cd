//! Builders for read operations.
//!
//! Every builder here is a pure function from object metadata (and sometimes a little caller
//! data) to an `Option<Document>`. A builder returns [`None`] when its metadata is
//! [`NotReady`](crate::meta::Loadable::NotReady) or when the object type cannot support the
//! operation at all, for example because it has no `get` resolver. Callers treat [`None`] as
//! "nothing to execute yet".
//!
//! Documents follow a few shared conventions, implemented by the helpers in this module:
//! * Operations are named `SL_UI_{VERB}_{OBJECT_TYPE}` in upper snake case.
//! * The root field is aliased to a fixed response key (`getObject`, `listObjects`, ...), so
//!   response handling does not depend on the customer's type names.
//! * Field selections follow the declaration order of [`ObjectTypeMeta::fields`].
//! * Connections are paged with a fixed `limit` of [`PAGE_SIZE`] and a `next_token` variable.

use crate::{
    alias::{encode_field_alias, TYPENAME},
    document::{Document, Field, InlineFragment, Selection, Value, VariableDefinition},
    meta::{ObjectTypeMeta, OperationMeta},
};

pub mod availability;
pub mod dynamic_content;
pub mod object;
pub mod relationships;
pub mod schema;
pub mod search;

pub use availability::*;
pub use dynamic_content::*;
pub use object::*;
pub use relationships::*;
pub use schema::*;
pub use search::*;

/// Prefix of every operation name generated by this crate.
pub const OPERATION_PREFIX: &str = "SL_UI";

/// The page size requested from every paginated connection.
pub const PAGE_SIZE: u32 = 50;

/// The operation name made of `parts`, like `SL_UI_GET_EPISODE`.
pub(crate) fn operation_name(parts: &[&str]) -> String {
    format!("{OPERATION_PREFIX}_{}", parts.join("_"))
}

/// Log a finished document and hand it back.
pub(crate) fn finished(doc: Document) -> Document {
    tracing::debug!(operation = doc.name(), "built {} document", doc.kind());
    tracing::trace!("{doc}");
    doc
}

/// Like [`finished`], for builders which may not produce a document.
pub(crate) fn built(doc: Document) -> Option<Document> {
    Some(finished(doc))
}

/// Variable declarations shared by queries and mutations.
pub(crate) mod vars {
    use super::*;

    pub fn ignore_availability() -> VariableDefinition {
        VariableDefinition::new("ignoreAvailability", "Boolean").default_value(true)
    }

    pub fn uid() -> VariableDefinition {
        VariableDefinition::new("uid", "String")
    }

    pub fn required_uid() -> VariableDefinition {
        VariableDefinition::new("uid", "String!")
    }

    pub fn external_id() -> VariableDefinition {
        VariableDefinition::new("externalId", "String")
    }

    pub fn language() -> VariableDefinition {
        VariableDefinition::new("language", "String")
    }

    pub fn next_token(name: &str) -> VariableDefinition {
        VariableDefinition::new(name, "String")
    }

    pub fn limit() -> VariableDefinition {
        VariableDefinition::new("limit", "Int").default_value(PAGE_SIZE)
    }

    pub fn offset() -> VariableDefinition {
        VariableDefinition::new("offset", "Int")
    }

    pub fn draft() -> VariableDefinition {
        VariableDefinition::new("draft", "Boolean").default_value(false)
    }

    pub fn language_version() -> VariableDefinition {
        VariableDefinition::new("languageVersion", "Int")
    }

    pub fn global_version() -> VariableDefinition {
        VariableDefinition::new("globalVersion", "Int")
    }
}

/// The `_config` block every object type exposes.
pub(crate) fn config_selection() -> Field {
    Field::new("_config")
        .select_all(["primary_field", "colour", "display_name"])
        .select(Field::new("field_config").select_all(["name", "ui_field_type", "ui_position"]))
}

/// The `_meta` block every object type exposes.
pub(crate) fn meta_selection() -> Field {
    Field::new("_meta")
        .select("available_languages")
        .select(Field::new("language_data").select_all(["language", "version"]))
        .select(Field::new("global_data").select("version"))
        .select(Field::new("modified").select("date"))
        .select(Field::new("created").select("date"))
        .select("published")
}

/// One selection per declared field, in declaration order.
pub(crate) fn field_selections(meta: &ObjectTypeMeta) -> impl '_ + Iterator<Item = Field> {
    meta.fields().iter().map(|field| Field::new(&field.name))
}

/// Like [`field_selections`], but every field is aliased with the object type prefix, for use
/// inside an inline fragment of a polymorphic selection.
pub(crate) fn aliased_field_selections(
    meta: &ObjectTypeMeta,
) -> impl '_ + Iterator<Item = Field> {
    meta.fields()
        .iter()
        .map(|field| Field::new(&field.name).alias(encode_field_alias(meta.name(), &field.name)))
}

/// Everything needed to display an object of a single known type.
pub(crate) fn object_selection(meta: &ObjectTypeMeta) -> Vec<Selection> {
    let mut selections: Vec<Selection> = vec![
        TYPENAME.into(),
        config_selection().into(),
        meta_selection().into(),
    ];
    selections.extend(field_selections(meta).map(Selection::from));
    selections
}

/// Everything needed to display an object inside a polymorphic selection.
pub(crate) fn object_fragment(meta: &ObjectTypeMeta) -> InlineFragment {
    InlineFragment::on(meta.name())
        .select(config_selection())
        .select(meta_selection())
        .select_all(aliased_field_selections(meta))
}

/// The minimal identification of an object of unknown type.
pub(crate) fn object_reference() -> [&'static str; 3] {
    [TYPENAME, "uid", "external_id"]
}

/// A paginated connection `name`, selecting `next_token` and the given object selections.
pub(crate) fn connection<I>(name: &str, next_token: Option<&str>, objects: I) -> Field
where
    I: IntoIterator,
    I::Item: Into<Selection>,
{
    Field::new(name)
        .arg("limit", PAGE_SIZE)
        .opt_arg("next_token", next_token.map(Value::var))
        .select("next_token")
        .select(Field::new("objects").select_all(objects))
}

/// The root field for an operation on a single existing object, identified by a required `$uid`.
///
/// Returns the field, aliased to `alias`, together with the variables it references.
pub(crate) fn object_root(
    meta: &ObjectTypeMeta,
    op: &OperationMeta,
    alias: &str,
) -> (Field, Vec<VariableDefinition>) {
    let mut variables = vec![vars::ignore_availability(), vars::required_uid()];
    let mut field = Field::new(&op.name)
        .alias(alias)
        .arg("ignore_availability", Value::var("ignoreAvailability"))
        .arg("uid", Value::var("uid"));
    if meta.is_translatable() {
        variables.push(vars::language());
        field = field.arg("language", Value::var("language"));
    }
    (field, variables)
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::document::Document;

    /// Assert that a document is syntactically valid GraphQL.
    pub fn assert_parses(doc: &Document) {
        if let Err(err) = async_graphql::parser::parse_query(doc.to_string()) {
            panic!("invalid document: {err}\n{doc}");
        }
    }
}
