//! Full-text search across object types.

use super::*;
use crate::meta::Loadable;

/// Search every type in `metas` at once.
///
/// Search results are polymorphic, so each type gets its own inline fragment inside
/// `search.objects`, with every field selected under its [field alias](encode_field_alias). Two
/// types that share a field name therefore never share a response key. Decode the response with
/// [`decode_response`](crate::alias::decode_response).
///
/// Returns [`None`] if there are no types to search.
pub fn search_objects_query<'a>(
    metas: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
) -> Option<Document> {
    let metas = metas.into().ready()?;
    if metas.is_empty() {
        return None;
    }

    let search = Field::new("search")
        .arg("ignore_availability", Value::var("ignoreAvailability"))
        .arg("query", Value::var("queryString"))
        .arg("offset", Value::var("offset"))
        .arg("limit", Value::var("limit"))
        .arg("language", Value::var("language"))
        .select(TYPENAME)
        .select("total_count")
        .select(
            Field::new("objects")
                .select(TYPENAME)
                .select_all(metas.iter().map(object_fragment)),
        );

    built(
        Document::query(operation_name(&["SEARCH"]))
            .variables([
                vars::ignore_availability(),
                VariableDefinition::new("queryString", "String!"),
                vars::offset(),
                VariableDefinition::new("limit", "Int"),
                vars::language(),
            ])
            .select(search),
    )
}
