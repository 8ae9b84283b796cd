//! Scoping an availability to audience dimensions and segments.

use crate::{
    diff::{diff_links, LinkRef},
    document::{Document, Field, Value},
    mutation::link_block,
    query::{built, operation_name, vars},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The audience of one availability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDimensions {
    /// The selected value slugs of each dimension, keyed by dimension slug.
    #[serde(default)]
    pub dimensions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub segments: Vec<LinkRef>,
}

/// One `{dimension_slug, value_slugs}` entry for each dimension with values in `changes`.
fn dimension_entries(changes: Vec<(&str, Vec<&String>)>) -> Vec<Value> {
    changes
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(dimension, values)| {
            Value::object([
                ("dimension_slug", Value::from(dimension)),
                ("value_slugs", Value::strings(values)),
            ])
        })
        .collect()
}

/// Change the dimension values and segments of the availability with `$uid`.
///
/// Dimension values and segments are diffed separately, and both changes are sent in one
/// `updateAvailability` call, each block only when it is non-empty.
///
/// Returns [`None`] if nothing changed.
pub fn update_availability_dimensions_mutation(
    original: &AvailabilityDimensions,
    updated: &AvailabilityDimensions,
) -> Option<Document> {
    let slugs = original
        .dimensions
        .keys()
        .chain(updated.dimensions.keys())
        .collect::<BTreeSet<_>>();
    let (mut link, mut unlink) = (vec![], vec![]);
    for slug in slugs {
        let diff = diff_links(
            original.dimensions.get(slug).map(Vec::as_slice).unwrap_or_default(),
            updated.dimensions.get(slug).map(Vec::as_slice).unwrap_or_default(),
        );
        link.push((slug.as_str(), diff.added_links().collect::<Vec<_>>()));
        unlink.push((slug.as_str(), diff.removed));
    }
    let dimensions = link_block(dimension_entries(link), dimension_entries(unlink));

    let segments = diff_links(&original.segments, &updated.segments);
    let segments = link_block(
        segments
            .added_links()
            .map(|segment| segment.uid.as_str().into())
            .collect(),
        segments
            .removed
            .iter()
            .map(|segment| segment.uid.as_str().into())
            .collect(),
    );

    let availability = [("dimensions", dimensions), ("segments", segments)]
        .into_iter()
        .filter_map(|(name, block)| Some((name, block?)))
        .collect::<Vec<_>>();
    if availability.is_empty() {
        return None;
    }

    built(
        Document::mutation(operation_name(&["UPDATE", "AVAILABILITY", "DIMENSIONS"]))
            .variable(vars::required_uid())
            .select(
                Field::new("updateAvailability")
                    .alias("updateAvailabilityDimensions")
                    .arg("uid", Value::var("uid"))
                    .arg("availability", Value::object(availability))
                    .select("uid"),
            ),
    )
}
