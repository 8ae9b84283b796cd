//! Queries for the objects linked to an object: relationships, content and content-of.

use super::*;
use crate::meta::{find, Loadable, Verb};
use convert_case::{Case, Casing};

/// The pagination variable for the connection `relationship`, like `$brandsNextToken`.
pub fn relationship_next_token_variable(relationship: &str) -> String {
    format!("{}NextToken", relationship.to_case(Case::Camel))
}

/// Every relationship of one object, each paginated independently.
///
/// Each relationship connection has its own `$<relationship>NextToken` variable, so the caller
/// can fetch the next page of one relationship without refetching the others. Related objects
/// select their own type's fields when the type is found in `all`, and just enough to identify
/// them otherwise.
///
/// Returns [`None`] if the type has no relationships or no `get` operation.
pub fn object_relationships_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let all = all.into().ready()?;
    if !meta.capabilities().has_relationships || meta.relationships().is_empty() {
        return None;
    }
    let get = meta.operation(Verb::Get)?;

    let (mut root, mut variables) = object_root(meta, get, "getObjectRelationships");
    for relationship in meta.relationships() {
        let next_token = relationship_next_token_variable(&relationship.relationship_name);
        let objects = match find(all, &relationship.object_type) {
            Some(target) => object_selection(target),
            None => {
                tracing::debug!(
                    relationship = %relationship.relationship_name,
                    object_type = %relationship.object_type,
                    "no metadata for related type, selecting references only"
                );
                object_reference().into_iter().map(Selection::from).collect()
            }
        };
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
            "RELATIONSHIPS",
        ]))
        .variables(variables)
        .select(root),
    )
}

/// The ordered content of a container object.
///
/// Content can be of any type which can be content of something, so the members are selected
/// with one inline fragment per such type in `all`, together with their `position`.
///
/// Returns [`None`] if the type is not a container or has no `get` operation.
pub fn object_content_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let all = all.into().ready()?;
    if !meta.capabilities().has_content {
        return None;
    }
    let get = meta.operation(Verb::Get)?;

    let members = all
        .iter()
        .filter(|member| member.capabilities().has_content_of)
        .map(object_fragment);
    let (root, mut variables) = object_root(meta, get, "getObjectContent");
    variables.push(vars::next_token("nextToken"));
    let root = root.select(
        Field::new("content")
            .arg("order", Value::enum_value("ASC"))
            .arg("limit", PAGE_SIZE)
            .arg("next_token", Value::var("nextToken"))
            .select("next_token")
            .select(
                Field::new("objects").select("position").select(
                    Field::new("object")
                        .select(TYPENAME)
                        .select_all(members),
                ),
            ),
    );

    built(
        Document::query(operation_name(&["GET", &meta.constant_name(), "CONTENT"]))
            .variables(variables)
            .select(root),
    )
}

/// The containers an object is content of.
///
/// Returns [`None`] if the type cannot be content or has no `get` operation.
pub fn object_content_of_query<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let all = all.into().ready()?;
    if !meta.capabilities().has_content_of {
        return None;
    }
    let get = meta.operation(Verb::Get)?;

    let mut objects = vec![Selection::from(TYPENAME)];
    objects.extend(
        all.iter()
            .filter(|container| container.capabilities().has_content)
            .map(|container| object_fragment(container).into()),
    );
    let (root, mut variables) = object_root(meta, get, "getObjectContentOf");
    variables.push(vars::next_token("nextToken"));
    let root = root.select(connection("content_of", Some("nextToken"), objects));

    built(
        Document::query(operation_name(&[
            "GET",
            &meta.constant_name(),
            "CONTENT_OF",
        ]))
        .variables(variables)
        .select(root),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::fixtures::*;
    use crate::query::test_helpers::assert_parses;

    #[test]
    fn test_next_token_variable() {
        assert_eq!(relationship_next_token_variable("brands"), "brandsNextToken");
        assert_eq!(
            relationship_next_token_variable("call_to_actions"),
            "callToActionsNextToken"
        );
    }

    #[test]
    fn test_relationships() {
        let all = all();
        let doc = object_relationships_query(&all[0], &all).unwrap();
        assert_parses(&doc);
        assert_eq!(doc.name(), "SL_UI_GET_EPISODE_RELATIONSHIPS");
        assert_eq!(
            doc.variable_names().collect::<Vec<_>>(),
            [
                "ignoreAvailability",
                "uid",
                "language",
                "brandsNextToken",
                "imagesNextToken"
            ]
        );
        let text = doc.to_string();
        assert!(text.contains("    brands(limit: 50, next_token: $brandsNextToken) {\n"));
        assert!(text.contains("    images(limit: 50, next_token: $imagesNextToken) {\n"));
        // Related objects select their own type's fields.
        assert!(text.contains("        url\n"));
    }

    #[test]
    fn test_relationship_to_unknown_type() {
        let episode = episode();
        let doc = object_relationships_query(&episode, &vec![episode.clone()]).unwrap();
        assert_parses(&doc);
        assert!(doc.to_string().contains(
            "    brands(limit: 50, next_token: $brandsNextToken) {\n      next_token\n      objects {\n        __typename\n        uid\n        external_id\n      }\n    }\n"
        ));
    }

    #[test]
    fn test_no_relationships() {
        let all = all();
        assert_eq!(object_relationships_query(&image(), &all), None);
        assert_eq!(
            object_relationships_query(&episode(), Loadable::<&[ObjectTypeMeta]>::NotReady),
            None
        );
    }

    #[test]
    fn test_content() {
        let all = all();
        let doc = object_content_query(&set(), &all).unwrap();
        assert_parses(&doc);
        let text = doc.to_string();
        assert!(text.contains(
            "    content(order: ASC, limit: 50, next_token: $nextToken) {\n      next_token\n      objects {\n        position\n        object {\n          __typename\n          ... on Episode {\n"
        ));
        assert!(text.contains("            __Episode__title: title\n"));
        assert!(text.contains("          ... on Brand {\n"));
        assert!(!text.contains("... on SkylarkImage"));

        assert_eq!(object_content_query(&episode(), &all), None);
    }

    #[test]
    fn test_content_of() {
        let all = all();
        let doc = object_content_of_query(&brand(), &all).unwrap();
        assert_parses(&doc);
        let text = doc.to_string();
        assert!(text.contains("    content_of(limit: 50, next_token: $nextToken) {\n"));
        assert!(text.contains("        ... on SkylarkSet {\n"));
        assert!(!text.contains("... on Episode"));

        assert_eq!(object_content_of_query(&set(), &all), None);
    }
}
