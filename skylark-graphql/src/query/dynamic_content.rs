//! Previews of rule-based set content.

use super::*;
use crate::meta::{find, Loadable};
use serde::{Deserialize, Serialize};

/// One step of a dynamic content rule.
///
/// A rule is a chain of steps. The first step selects objects of `object_types`, optionally
/// restricted to the objects with the given `uids`; each later step follows
/// `relationship_name` from the objects selected by the step before it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicContentRule {
    pub object_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_name: Option<String>,
    #[serde(default)]
    pub uids: Vec<String>,
}

impl DynamicContentRule {
    fn to_value(&self) -> Value {
        let mut entries = vec![(
            "object_types",
            Value::List(self.object_types.iter().map(Value::enum_value).collect()),
        )];
        if let Some(relationship_name) = &self.relationship_name {
            entries.push(("relationship_name", relationship_name.as_str().into()));
        }
        if !self.uids.is_empty() {
            entries.push(("uid", Value::strings(&self.uids)));
        }
        Value::object(entries)
    }
}

/// The configuration of a set whose members are computed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicContent {
    /// The types of the members.
    pub object_types: Vec<String>,
    /// The rules, each a chain of steps. An object is a member if any rule selects it.
    pub rules: Vec<Vec<DynamicContentRule>>,
}

impl DynamicContent {
    /// The `dynamic_content` argument describing this configuration.
    pub fn to_value(&self) -> Value {
        Value::object([
            (
                "dynamic_content_types",
                Value::List(self.object_types.iter().map(Value::enum_value).collect()),
            ),
            (
                "dynamic_content_rules",
                Value::List(
                    self.rules
                        .iter()
                        .map(|rule| {
                            Value::List(rule.iter().map(DynamicContentRule::to_value).collect())
                        })
                        .collect(),
                ),
            ),
        ])
    }
}

/// Preview the members a dynamic content configuration would select.
///
/// Members are selected with one inline fragment per requested type. Requested types missing
/// from `all` are skipped with a warning. Returns [`None`] if no types are requested.
pub fn dynamic_content_preview_query<'a>(
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
    content: &DynamicContent,
) -> Option<Document> {
    let all = all.into().ready()?;
    if content.object_types.is_empty() {
        return None;
    }

    let mut objects = vec![Selection::from(TYPENAME)];
    for object_type in &content.object_types {
        match find(all, object_type) {
            Some(meta) => objects.push(object_fragment(meta).into()),
            None => tracing::warn!(%object_type, "no metadata for dynamic content type"),
        }
    }

    let preview = Field::new("dynamicContentPreview")
        .arg("ignore_availability", Value::var("ignoreAvailability"))
        .arg("language", Value::var("language"))
        .arg("limit", PAGE_SIZE)
        .arg("next_token", Value::var("nextToken"))
        .arg("dynamic_content", content.to_value())
        .select("count")
        .select("next_token")
        .select(Field::new("objects").select_all(objects));

    built(
        Document::query(operation_name(&["DYNAMIC_CONTENT_PREVIEW"]))
            .variables([
                vars::ignore_availability(),
                vars::language(),
                vars::next_token("nextToken"),
            ])
            .select(preview),
    )
}
