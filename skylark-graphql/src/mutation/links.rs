//! Linking objects to each other: relationships, content and availability assignments.

use crate::{
    alias::{OperationAliases, TYPENAME},
    diff::{diff_links, LinkRef},
    document::{Document, Field, Value},
    meta::{find, Loadable, ObjectTypeMeta, Verb},
    mutation::{link_block, write_root},
    query::{built, operation_name},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The objects linked to an object through one relationship.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLinks {
    pub relationship_name: String,
    pub objects: Vec<LinkRef>,
}

impl RelationshipLinks {
    pub fn new(relationship_name: impl Into<String>, objects: Vec<LinkRef>) -> Self {
        Self {
            relationship_name: relationship_name.into(),
            objects,
        }
    }
}

fn uids<'a>(links: impl IntoIterator<Item = &'a LinkRef>) -> Vec<Value> {
    links
        .into_iter()
        .map(|link| link.uid.as_str().into())
        .collect()
}

/// The objects linked through `relationship` in `lists`, or nothing if it is absent.
fn linked<'a>(lists: &'a [RelationshipLinks], relationship: &str) -> &'a [LinkRef] {
    lists
        .iter()
        .find(|links| links.relationship_name == relationship)
        .map(|links| links.objects.as_slice())
        .unwrap_or_default()
}

/// Link and unlink the objects related to the object with `$uid`.
///
/// Relationships are unordered, so only membership changes count. Each changed relationship gets
/// a `link` and/or `unlink` block, in the order the type declares its relationships.
/// Relationships in `updated` the type does not declare are skipped with a warning.
///
/// Returns [`None`] if nothing changed or the type has no `update` operation.
pub fn update_relationships_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    original: &[RelationshipLinks],
    updated: &[RelationshipLinks],
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let update = meta.operation(Verb::Update)?;

    for links in updated {
        if meta.relationship(&links.relationship_name).is_none() {
            tracing::warn!(
                object_type = meta.name(),
                relationship = %links.relationship_name,
                "skipping unknown relationship"
            );
        }
    }

    let changes = meta
        .relationships()
        .iter()
        .filter_map(|relationship| {
            let name = relationship.relationship_name.as_str();
            let diff = diff_links(linked(original, name), linked(updated, name));
            let block = link_block(uids(diff.added_links()), uids(diff.removed.iter().copied()))?;
            Some((name, block))
        })
        .collect::<Vec<_>>();
    if changes.is_empty() {
        return None;
    }

    let (root, variables) = write_root(meta, update, "updateObjectRelationships");
    let root = root
        .arg(
            &update.arg_name,
            Value::object([("relationships", Value::object(changes))]),
        )
        .select_all([TYPENAME, "uid"]);

    built(
        Document::mutation(operation_name(&[
            "UPDATE",
            &meta.constant_name(),
            "RELATIONSHIPS",
        ]))
        .variables(variables)
        .select(root),
    )
}

/// Update the ordered content of the container with `$uid`.
///
/// Content is grouped by object type, in the order the types first appear in `updated` and then
/// `original`. Each type gets `link` (new members with their positions), `unlink` and
/// `reposition` (moved members with their new positions) blocks, each only when non-empty.
///
/// Returns [`None`] if nothing changed, or the type is not a container or has no `update`
/// operation.
pub fn update_content_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    original: &[LinkRef],
    updated: &[LinkRef],
) -> Option<Document> {
    let meta = meta.into().ready()?;
    if !meta.capabilities().has_content {
        return None;
    }
    let update = meta.operation(Verb::Update)?;

    let diff = diff_links(original, updated);
    if diff.is_empty() {
        return None;
    }

    let positioned = |link: &LinkRef, position: u32| {
        Value::object([
            ("uid", Value::from(link.uid.as_str())),
            ("position", Value::from(position)),
        ])
    };
    let content = updated
        .iter()
        .chain(original)
        .map(|link| link.object_type.as_str())
        .unique()
        .filter_map(|object_type| {
            let link = diff
                .added
                .iter()
                .filter(|(link, _)| link.object_type == object_type)
                .map(|(link, position)| positioned(*link, *position))
                .collect::<Vec<_>>();
            let unlink = uids(
                diff.removed
                    .iter()
                    .copied()
                    .filter(|link| link.object_type == object_type),
            );
            let reposition = diff
                .repositioned
                .iter()
                .filter(|moved| moved.link.object_type == object_type)
                .map(|moved| positioned(moved.link, moved.position))
                .collect::<Vec<_>>();

            let entries = [("link", link), ("unlink", unlink), ("reposition", reposition)]
                .into_iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(name, values)| (name, Value::List(values)))
                .collect::<Vec<_>>();
            if entries.is_empty() {
                None
            } else {
                Some((object_type, Value::object(entries)))
            }
        })
        .collect::<Vec<_>>();

    let (root, variables) = write_root(meta, update, "updateObjectContent");
    let root = root
        .arg(
            &update.arg_name,
            Value::object([("content", Value::object(content))]),
        )
        .select_all([TYPENAME, "uid"]);

    built(
        Document::mutation(operation_name(&["UPDATE", &meta.constant_name(), "CONTENT"]))
            .variables(variables)
            .select(root),
    )
}

/// Assign and unassign availabilities to the object with `$uid`.
///
/// Returns [`None`] if nothing changed, or the type has no availability or no `update` operation.
pub fn update_object_availability_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    original: &[LinkRef],
    updated: &[LinkRef],
) -> Option<Document> {
    let meta = meta.into().ready()?;
    if !meta.capabilities().has_availability {
        return None;
    }
    let update = meta.operation(Verb::Update)?;

    let diff = diff_links(original, updated);
    let block = link_block(uids(diff.added_links()), uids(diff.removed.iter().copied()))?;

    let (root, variables) = write_root(meta, update, "updateObjectAvailability");
    let root = root
        .arg(
            &update.arg_name,
            Value::object([("availability", block)]),
        )
        .select_all([TYPENAME, "uid"]);

    built(
        Document::mutation(operation_name(&[
            "UPDATE",
            &meta.constant_name(),
            "AVAILABILITY",
        ]))
        .variables(variables)
        .select(root),
    )
}

/// Assign the availability `availability_uid` to objects, and unassign it from others.
///
/// The API can only change an object's availability through the object itself, so each added or
/// removed object gets its own copy of its type's update operation, aliased
/// `{operation}_{object uid}`. Objects whose type is unknown or cannot be updated are skipped with
/// a warning.
///
/// Returns [`None`] if nothing changed.
pub fn update_availability_assigned_to_mutation<'a>(
    availability_uid: &str,
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
    original: &[LinkRef],
    updated: &[LinkRef],
) -> Option<Document> {
    let all = all.into().ready()?;
    let diff = diff_links(original, updated);

    let changes = diff
        .added_links()
        .map(|object| (object, "link"))
        .chain(diff.removed.iter().map(|object| (*object, "unlink")));

    let mut aliases = OperationAliases::new();
    let mut doc =
        Document::mutation(operation_name(&["UPDATE", "AVAILABILITY", "ASSIGNED_TO"]));
    let mut empty = true;
    for (object, action) in changes {
        let Some(update) =
            find(all, &object.object_type).and_then(|meta| meta.operation(Verb::Update))
        else {
            tracing::warn!(
                uid = %object.uid,
                object_type = %object.object_type,
                "skipping object of a type which cannot be updated"
            );
            continue;
        };
        let availability = Value::object([(action, Value::strings([availability_uid]))]);
        doc = doc.select(
            Field::new(&update.name)
                .alias(aliases.next(&update.name, &object.uid))
                .arg("uid", object.uid.as_str())
                .arg(
                    &update.arg_name,
                    Value::object([("availability", availability)]),
                )
                .select("uid"),
        );
        empty = false;
    }

    if empty {
        return None;
    }
    built(doc)
}
