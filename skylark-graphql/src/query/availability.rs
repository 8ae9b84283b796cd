//! Availability queries.
//!
//! Availability is itself an object type (`Availability`) with a fixed schema, assigned to other
//! objects and scoped by audience dimensions and segments. Queries about an object's own
//! availability depend on its metadata; queries about availability objects do not, and are
//! always buildable.

use super::*;
use crate::meta::{find, Loadable, Verb};
use crate::query::object::availability_fields;
use crate::query::relationships::relationship_next_token_variable;

/// The fields selected for a dimension, a dimension value or a segment.
fn dimension_fields() -> [&'static str; 4] {
    ["uid", "title", "slug", "external_id"]
}

/// A dimension together with a page of its values.
fn dimension_with_values() -> Vec<Selection> {
    let mut selections: Vec<Selection> = dimension_fields()
        .into_iter()
        .map(Selection::from)
        .collect();
    selections.push(connection("values", None, dimension_fields()).into());
    selections
}

/// The availabilities assigned to an object, with their dimensions and values.
///
/// Returns [`None`] if the type has no availability or no `get` operation.
pub fn object_availability_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    if !meta.capabilities().has_availability {
        return None;
    }
    let get = meta.operation(Verb::Get)?;

    let mut objects: Vec<Selection> = availability_fields()
        .into_iter()
        .map(Selection::from)
        .collect();
    objects.push(connection("dimensions", None, dimension_with_values()).into());

    let (root, mut variables) = object_root(meta, get, "getObjectAvailability");
    variables.push(vars::next_token("nextToken"));
    let root = root.select(connection("availability", Some("nextToken"), objects));

    built(
        Document::query(operation_name(&[
            "GET",
            &meta.constant_name(),
            "AVAILABILITY",
        ]))
        .variables(variables)
        .select(root),
    )
}

/// The availability of the objects related to an object, and where it was inherited from.
///
/// Only relationships whose target type has availability are included, each paginated with its
/// own `$<relationship>NextToken` variable. Returns [`None`] if there are no such relationships.
pub fn availability_inheritance_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let all = all.into().ready()?;
    let get = meta.operation(Verb::Get)?;

    let relationships = meta
        .relationships()
        .iter()
        .filter(|relationship| {
            find(all, &relationship.object_type)
                .map_or(false, |target| target.capabilities().has_availability)
        })
        .collect::<Vec<_>>();
    if relationships.is_empty() {
        return None;
    }

    let (mut root, mut variables) = object_root(meta, get, "getObjectAvailabilityInheritance");
    for relationship in relationships {
        let next_token = relationship_next_token_variable(&relationship.relationship_name);
        let mut objects: Vec<Selection> = object_reference()
            .into_iter()
            .map(Selection::from)
            .collect();
        objects.push(
            connection(
                "availability",
                None,
                ["uid", "title", "slug", "inherited", "inheritance_source"],
            )
            .into(),
        );
        root = root.select(connection(
            &relationship.relationship_name,
            Some(&next_token),
            objects,
        ));
        variables.push(vars::next_token(&next_token));
    }

    built(
        Document::query(operation_name(&[
            "GET",
            &meta.constant_name(),
            "AVAILABILITY_INHERITANCE",
        ]))
        .variables(variables)
        .select(root),
    )
}

/// The objects an availability is assigned to.
///
/// Any type with availability can be assigned one, so the objects are selected with one inline
/// fragment per such type in `all`.
pub fn availability_assigned_to_query<'a>(
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let all = all.into().ready()?;

    let assignees = all
        .iter()
        .filter(|meta| meta.capabilities().has_availability)
        .map(object_fragment);
    let root = Field::new("getAvailability")
        .alias("getAvailabilityAssignedTo")
        .arg("uid", Value::var("uid"))
        .select(connection(
            "assigned_to",
            Some("nextToken"),
            [
                Selection::from("inherited"),
                "inheritance_source".into(),
                Field::new("object")
                    .select(TYPENAME)
                    .select_all(assignees)
                    .into(),
            ],
        ));

    built(
        Document::query(operation_name(&["GET", "AVAILABILITY", "ASSIGNED_TO"]))
            .variables([vars::required_uid(), vars::next_token("nextToken")])
            .select(root),
    )
}

/// The dimensions and values of one availability.
pub fn availability_dimensions_query() -> Document {
    finished(
        Document::query(operation_name(&["GET", "AVAILABILITY", "DIMENSIONS"]))
            .variables([vars::required_uid(), vars::next_token("nextToken")])
            .select(
                Field::new("getAvailability")
                    .alias("getAvailabilityDimensions")
                    .arg("uid", Value::var("uid"))
                    .select(connection(
                        "dimensions",
                        Some("nextToken"),
                        dimension_with_values(),
                    )),
            ),
    )
}

/// The audience segments of one availability.
pub fn availability_segments_query() -> Document {
    finished(
        Document::query(operation_name(&["GET", "AVAILABILITY", "SEGMENTS"]))
            .variables([vars::required_uid(), vars::next_token("nextToken")])
            .select(
                Field::new("getAvailability")
                    .alias("getAvailabilitySegments")
                    .arg("uid", Value::var("uid"))
                    .select(connection(
                        "segments",
                        Some("nextToken"),
                        dimension_fields(),
                    )),
            ),
    )
}

/// Every dimension in the account, with its values.
pub fn list_dimensions_query() -> Document {
    let mut objects = dimension_with_values();
    objects.insert(4, "description".into());
    finished(
        Document::query(operation_name(&["LIST", "AVAILABILITY", "DIMENSIONS"]))
            .variable(vars::next_token("nextToken"))
            .select(
                Field::new("listDimensions")
                    .arg("limit", PAGE_SIZE)
                    .arg("next_token", Value::var("nextToken"))
                    .select("count")
                    .select("next_token")
                    .select(Field::new("objects").select_all(objects)),
            ),
    )
}

/// Every audience segment in the account.
pub fn list_segments_query() -> Document {
    finished(
        Document::query(operation_name(&["LIST", "AVAILABILITY", "SEGMENTS"]))
            .variable(vars::next_token("nextToken"))
            .select(
                Field::new("listSegments")
                    .arg("limit", PAGE_SIZE)
                    .arg("next_token", Value::var("nextToken"))
                    .select("count")
                    .select("next_token")
                    .select(Field::new("objects").select_all(dimension_fields())),
            ),
    )
}
