//! Creating objects and writing their fields.

use crate::{
    alias::TYPENAME,
    classify::{coerce_input, is_system_field},
    document::{Document, Field, Selection, Value},
    meta::{Loadable, ObjectTypeMeta, OperationMeta, Verb},
    mutation::write_root,
    query::{built, meta_selection, object_selection, operation_name, vars},
};
use itertools::{Either, Itertools};

/// Field values supplied by a caller, keyed by field name.
pub type Values = serde_json::Map<String, serde_json::Value>;

/// The input to a create or update, split by language scope.
///
/// Translatable fields are written to the language given by `$language`; global fields are shared
/// by every language.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataInput {
    pub global: Vec<(String, Value)>,
    pub translatable: Vec<(String, Value)>,
}

impl MetadataInput {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.translatable.is_empty()
    }

    /// The input object: global fields first, then translatable ones.
    pub fn to_value(&self) -> Value {
        Value::object(
            self.global
                .iter()
                .chain(&self.translatable)
                .map(|(name, value)| (name.as_str(), value.clone())),
        )
    }
}

/// Split `values` into the input of `op`.
///
/// Only fields `op` accepts are kept, in the order `op` declares them. System fields are never
/// written. Values are coerced to the type of their field.
pub fn split_metadata(
    meta: &ObjectTypeMeta,
    op: &OperationMeta,
    values: &Values,
) -> MetadataInput {
    for name in values.keys() {
        if !is_system_field(name) && !op.accepts(name) {
            tracing::warn!(
                object_type = meta.name(),
                operation = %op.name,
                field = %name,
                "ignoring value for a field the operation does not accept"
            );
        }
    }

    let (translatable, global): (Vec<_>, Vec<_>) = op
        .inputs
        .iter()
        .filter(|field| !is_system_field(&field.name))
        .filter_map(|field| {
            let value = values.get(&field.name)?;
            Some((field.name.clone(), coerce_input(field, value)))
        })
        .partition_map(|(name, value)| {
            if meta.field_config().is_translatable(&name) {
                Either::Left((name, value))
            } else {
                Either::Right((name, value))
            }
        });
    MetadataInput {
        global,
        translatable,
    }
}

/// The selection returned by writes to an object.
fn write_result(meta: &ObjectTypeMeta) -> Vec<Selection> {
    let mut selections: Vec<Selection> = vec![
        TYPENAME.into(),
        "uid".into(),
        "external_id".into(),
        meta_selection().into(),
    ];
    if meta.capabilities().is_image {
        selections.push("upload_url".into());
    }
    selections
}

/// Create an object from `values`.
///
/// New objects are published unless `$draft` is set. Images also select the `upload_url` their
/// file must be uploaded to.
///
/// Returns [`None`] if the type has no `create` operation.
pub fn create_object_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    values: &Values,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let create = meta.operation(Verb::Create)?;
    let input = split_metadata(meta, create, values);

    let mut variables = vec![vars::draft()];
    let mut root = Field::new(&create.name)
        .alias("createObject")
        .arg("draft", Value::var("draft"));
    if meta.is_translatable() {
        variables.push(vars::language());
        root = root.arg("language", Value::var("language"));
    }
    root = root
        .arg(&create.arg_name, input.to_value())
        .select_all(write_result(meta));

    built(
        Document::mutation(operation_name(&["CREATE", &meta.constant_name()]))
            .variables(variables)
            .select(root),
    )
}

/// Write `values` to an existing object, or publish it.
///
/// With values, the fields are written to the object with `$uid`, as a draft if `$draft` is set.
/// Returns [`None`] if none of the values can be written.
///
/// Without values, the object's draft is published instead: the object is updated with
/// `draft: false` and an empty input, pinned to the versions being published by
/// `$languageVersion` (translatable types only) and `$globalVersion`.
///
/// Returns [`None`] if the type has no `update` operation.
pub fn update_object_metadata_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
    values: Option<&Values>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let update = meta.operation(Verb::Update)?;

    let Some(values) = values else {
        return publish(meta, update);
    };
    let input = split_metadata(meta, update, values);
    if input.is_empty() {
        return None;
    }

    let (root, mut variables) = write_root(meta, update, "updateObjectMetadata");
    variables.push(vars::draft());
    let root = root
        .arg("draft", Value::var("draft"))
        .arg(&update.arg_name, input.to_value())
        .select_all(object_selection(meta));

    built(
        Document::mutation(operation_name(&[
            "UPDATE",
            &meta.constant_name(),
            "METADATA",
        ]))
        .variables(variables)
        .select(root),
    )
}

fn publish(meta: &ObjectTypeMeta, update: &OperationMeta) -> Option<Document> {
    let (mut root, mut variables) = write_root(meta, update, "publishObject");
    root = root.arg("draft", false);
    if meta.is_translatable() {
        variables.push(vars::language_version());
        root = root.arg("language_version", Value::var("languageVersion"));
    }
    variables.push(vars::global_version());
    root = root
        .arg("global_version", Value::var("globalVersion"))
        .arg(&update.arg_name, Value::object(Vec::<(String, Value)>::new()))
        .select_all(write_result(meta));

    built(
        Document::mutation(operation_name(&["PUBLISH", &meta.constant_name()]))
            .variables(variables)
            .select(root),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::fixtures::*;
    use crate::query::test_helpers::assert_parses;
    use serde_json::json;

    fn values(json: serde_json::Value) -> Values {
        json.as_object().cloned().unwrap()
    }

    #[test]
    fn test_split() {
        let episode = episode();
        let create = episode.operation(Verb::Create).unwrap();
        let input = split_metadata(
            &episode,
            create,
            &values(json!({
                "title": "Pilot",
                "uid": "ep_1",
                "external_id": "pilot",
                "episode_number": "1",
                "tier": "FREE",
                "slug": "pilot",
                "unknown": 3,
            })),
        );
        assert_eq!(
            input.global,
            [
                ("slug".to_string(), Value::String("pilot".into())),
                ("episode_number".to_string(), Value::Int(1)),
                ("tier".to_string(), Value::Enum("FREE".into())),
            ]
        );
        assert_eq!(
            input.translatable,
            [("title".to_string(), Value::String("Pilot".into()))]
        );
        assert_eq!(
            input.to_value().to_string(),
            r#"{slug: "pilot", episode_number: 1, tier: FREE, title: "Pilot"}"#
        );
    }

    #[test]
    fn test_create() {
        let doc = create_object_mutation(
            &episode(),
            &values(json!({ "title": "Pilot", "release_date": "" })),
        )
        .unwrap();
        assert_parses(&doc);
        assert_eq!(
            doc.to_string(),
            r#"mutation SL_UI_CREATE_EPISODE($draft: Boolean = false, $language: String) {
  createObject: createEpisode(draft: $draft, language: $language, episode: {release_date: null, title: "Pilot"}) {
    __typename
    uid
    external_id
    _meta {
      available_languages
      language_data {
        language
        version
      }
      global_data {
        version
      }
      modified {
        date
      }
      created {
        date
      }
      published
    }
  }
}"#
        );
    }

    #[test]
    fn test_create_image() {
        let doc = create_object_mutation(&image(), &values(json!({ "title": "Poster" }))).unwrap();
        assert_parses(&doc);
        let text = doc.to_string();
        // Images are not translatable.
        assert!(text.starts_with(
            "mutation SL_UI_CREATE_SKYLARK_IMAGE($draft: Boolean = false) {\n  createObject: createSkylarkImage(draft: $draft, skylark_image: {title: \"Poster\"}) {\n"
        ));
        assert!(text.contains("    upload_url\n"));

        assert_eq!(create_object_mutation(&tag(), &Values::new()), None);
    }

    #[test]
    fn test_update() {
        let doc = update_object_metadata_mutation(
            &brand(),
            Some(&values(json!({ "synopsis": "A show", "title": "Show" }))),
        )
        .unwrap();
        assert_parses(&doc);
        assert_eq!(doc.name(), "SL_UI_UPDATE_BRAND_METADATA");
        assert_eq!(doc.required_variables().collect::<Vec<_>>(), ["uid"]);
        assert!(doc.to_string().contains(
            r#"  updateObjectMetadata: updateBrand(uid: $uid, language: $language, draft: $draft, brand: {title: "Show", synopsis: "A show"}) {"#
        ));
    }

    #[test]
    fn test_update_nothing() {
        let brand = brand();
        assert_eq!(
            update_object_metadata_mutation(&brand, Some(&values(json!({ "uid": "b_1" })))),
            None
        );
        assert_eq!(
            update_object_metadata_mutation(&brand, Some(&Values::new())),
            None
        );
    }

    #[test]
    fn test_publish() {
        let doc = update_object_metadata_mutation(&episode(), None).unwrap();
        assert_parses(&doc);
        assert_eq!(
            doc.variable_names().collect::<Vec<_>>(),
            ["uid", "language", "languageVersion", "globalVersion"]
        );
        assert!(doc.to_string().contains(
            "  publishObject: updateEpisode(uid: $uid, language: $language, draft: false, language_version: $languageVersion, global_version: $globalVersion, episode: {}) {\n"
        ));

        let doc = update_object_metadata_mutation(&image(), None).unwrap();
        assert_parses(&doc);
        assert_eq!(
            doc.variable_names().collect::<Vec<_>>(),
            ["uid", "globalVersion"]
        );
    }
}
