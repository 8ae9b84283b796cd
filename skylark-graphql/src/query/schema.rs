//! Queries about the schema itself: its versions and the UI configuration of its types.

use super::*;
use crate::alias::operation_alias;
use crate::meta::Loadable;

/// Every version of the account's schema.
pub fn schema_versions_query() -> Document {
    finished(
        Document::query(operation_name(&["LIST", "SCHEMA_VERSIONS"]))
            .variable(vars::next_token("nextToken"))
            .select(
                Field::new("listConfigurationVersions")
                    .arg("limit", PAGE_SIZE)
                    .arg("next_token", Value::var("nextToken"))
                    .select("count")
                    .select("next_token")
                    .select(Field::new("objects").select_all([
                        "version",
                        "base_version",
                        "active",
                        "published",
                    ])),
            ),
    )
}

/// The UI configuration of every type in `all`, one aliased `getObjectConfiguration` each.
///
/// Returns [`None`] if `all` is empty.
pub fn object_type_config_query<'a>(
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let all = all.into().ready()?;
    if all.is_empty() {
        return None;
    }

    let configs = all.iter().map(|meta| {
        Field::new("getObjectConfiguration")
            .alias(operation_alias("getObjectConfiguration", meta.name()))
            .arg("object_type", Value::enum_value(meta.name()))
            .select_all(["display_name", "colour", "primary_field"])
            .select(Field::new("field_config").select_all([
                "name",
                "ui_field_type",
                "ui_position",
            ]))
    });
    built(
        Document::query(operation_name(&["GET", "OBJECT_TYPE_CONFIGURATIONS"])).select_all(configs),
    )
}

/// The configuration of each relationship of one type, or [`None`] if it has no relationships.
pub fn relationship_config_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    if meta.relationships().is_empty() {
        return None;
    }
    built(
        Document::query(operation_name(&[
            "GET",
            &meta.constant_name(),
            "RELATIONSHIP_CONFIGURATION",
        ]))
        .select(
            Field::new("getRelationshipConfiguration")
                .arg("object_type", Value::enum_value(meta.name()))
                .select("relationship_name")
                .select(
                    Field::new("config").select_all(["default_sort_field", "inherit_availability"]),
                ),
        ),
    )
}
