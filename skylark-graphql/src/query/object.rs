//! Queries for a single object type: get, get a pinned version, and list.

use super::*;
use crate::meta::{Capabilities, Loadable, Verb};

/// Get one object by uid or external id.
///
/// The caller supplies exactly one of `$uid` and `$externalId`. Besides the object's own fields,
/// `_config` and `_meta`, the document includes a summary of each optional feature the type
/// supports: its availability, its content, the containers it is content of, its dynamic content
/// rules and its relationships.
///
/// Returns [`None`] if the type has no `get` operation.
pub fn get_object_query<'a>(meta: impl Into<Loadable<&'a ObjectTypeMeta>>) -> Option<Document> {
    let meta = meta.into().ready()?;
    let get = meta.operation(Verb::Get)?;

    let mut variables = vec![
        vars::ignore_availability(),
        vars::uid(),
        vars::external_id(),
    ];
    let mut root = Field::new(&get.name)
        .alias("getObject")
        .arg("ignore_availability", Value::var("ignoreAvailability"))
        .arg("uid", Value::var("uid"))
        .arg("external_id", Value::var("externalId"));
    if meta.is_translatable() {
        variables.push(vars::language());
        root = root.arg("language", Value::var("language"));
    }
    root = root.select_all(object_selection(meta));

    let Capabilities {
        has_content,
        has_content_of,
        has_relationships,
        has_availability,
        is_translatable: _,
        is_image: _,
        is_set,
    } = meta.capabilities();
    if has_availability {
        root = root.select(connection("availability", None, availability_fields()));
    }
    if has_content {
        root = root.select(connection(
            "content",
            None,
            [
                Selection::from("position"),
                Field::new("object").select_all(object_reference()).into(),
            ],
        ));
    }
    if has_content_of {
        root = root.select(connection("content_of", None, object_reference()));
    }
    if is_set {
        root = root.select(
            Field::new("dynamic_content")
                .select("dynamic_content_types")
                .select(
                    Field::new("dynamic_content_rules").select_all([
                        "object_types",
                        "relationship_name",
                        "uid",
                    ]),
                ),
        );
    }
    if has_relationships {
        for relationship in meta.relationships() {
            root = root.select(connection(
                &relationship.relationship_name,
                None,
                object_reference(),
            ));
        }
    }

    built(
        Document::query(operation_name(&["GET", &meta.constant_name()]))
            .variables(variables)
            .select(root),
    )
}

/// Get a specific version of one object.
///
/// The object is pinned with `$languageVersion` (translatable types only) and `$globalVersion`.
/// Returns [`None`] if the type has no `get` operation.
pub fn get_object_version_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let get = meta.operation(Verb::Get)?;

    let (mut root, mut variables) = object_root(meta, get, "getObjectVersion");
    if meta.is_translatable() {
        variables.push(vars::language_version());
        root = root.arg("language_version", Value::var("languageVersion"));
    }
    variables.push(vars::global_version());
    root = root
        .arg("global_version", Value::var("globalVersion"))
        .select_all(object_selection(meta));

    built(
        Document::query(operation_name(&["GET", &meta.constant_name(), "VERSION"]))
            .variables(variables)
            .select(root),
    )
}

/// List objects of one type, a page at a time.
///
/// Returns [`None`] if the type has no `list` operation.
pub fn list_objects_query<'a>(meta: impl Into<Loadable<&'a ObjectTypeMeta>>) -> Option<Document> {
    let meta = meta.into().ready()?;
    let list = meta.operation(Verb::List)?;

    let mut variables = vec![
        vars::ignore_availability(),
        vars::next_token("nextToken"),
        vars::limit(),
    ];
    let mut root = Field::new(&list.name)
        .alias("listObjects")
        .arg("ignore_availability", Value::var("ignoreAvailability"))
        .arg("next_token", Value::var("nextToken"))
        .arg("limit", Value::var("limit"));
    if meta.is_translatable() {
        variables.push(vars::language());
        root = root.arg("language", Value::var("language"));
    }
    root = root
        .select("count")
        .select("next_token")
        .select(Field::new("objects").select_all(object_selection(meta)));

    built(
        Document::query(operation_name(&["LIST", &meta.constant_name()]))
            .variables(variables)
            .select(root),
    )
}

/// The fields selected for each availability in an availability connection.
pub(crate) fn availability_fields() -> [&'static str; 7] {
    [
        "uid",
        "external_id",
        "title",
        "slug",
        "start",
        "end",
        "timezone",
    ]
}
