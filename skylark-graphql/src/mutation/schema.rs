//! Changing the UI configuration of object types and activating schema versions.

use crate::{
    alias::OperationAliases,
    document::{Document, Field, Value},
    meta::{Loadable, ObjectTypeMeta, SchemaVersion},
    query::{built, finished, operation_name},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How one field is presented in the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUiConfig {
    pub name: String,
    /// A UI field type such as `STRING`, `TEXTAREA` or `WYSIWYG`.
    pub ui_field_type: Option<String>,
    pub ui_position: u32,
}

impl FieldUiConfig {
    fn to_value(&self) -> Value {
        Value::object([
            ("name", Value::from(self.name.as_str())),
            (
                "ui_field_type",
                self.ui_field_type
                    .as_ref()
                    .map_or(Value::Null, Value::enum_value),
            ),
            ("ui_position", Value::from(self.ui_position)),
        ])
    }
}

/// How a relationship is presented and how it inherits availability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipConfig {
    pub default_sort_field: Option<String>,
    pub inherit_availability: bool,
}

impl RelationshipConfig {
    fn to_value(&self) -> Value {
        Value::object([
            (
                "default_sort_field",
                self.default_sort_field
                    .as_deref()
                    .map_or(Value::Null, Value::from),
            ),
            ("inherit_availability", Value::from(self.inherit_availability)),
        ])
    }
}

/// The UI configuration of one object type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeConfig {
    pub display_name: Option<String>,
    pub colour: Option<String>,
    pub primary_field: Option<String>,
    #[serde(default)]
    pub field_config: Vec<FieldUiConfig>,
    /// Keyed by relationship name.
    #[serde(default)]
    pub relationship_config: BTreeMap<String, RelationshipConfig>,
}

/// A property of [`ObjectTypeConfig`] which can be written on its own.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfigProperty {
    #[display(fmt = "display_name")]
    DisplayName,
    #[display(fmt = "colour")]
    Colour,
    #[display(fmt = "primary_field")]
    PrimaryField,
    #[display(fmt = "field_config")]
    FieldConfig,
}

impl ConfigProperty {
    fn value(self, config: &ObjectTypeConfig) -> Value {
        let string = |s: &Option<String>| s.as_deref().map_or(Value::Null, Value::from);
        match self {
            Self::DisplayName => string(&config.display_name),
            Self::Colour => string(&config.colour),
            Self::PrimaryField => string(&config.primary_field),
            Self::FieldConfig => Value::List(
                config
                    .field_config
                    .iter()
                    .map(FieldUiConfig::to_value)
                    .collect(),
            ),
        }
    }
}

/// What the user changed in the configuration of one object type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyConfig {
    #[serde(default)]
    pub properties: BTreeSet<ConfigProperty>,
    /// Names of relationships whose configuration changed.
    #[serde(default)]
    pub relationships: BTreeSet<String>,
}

impl DirtyConfig {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.relationships.is_empty()
    }
}

/// Write the changed configuration of every object type in `dirty`.
///
/// Each type with dirty properties gets one `setObjectConfiguration`, aliased
/// `setObjectTypeConfiguration_{type}`, carrying only those properties. Each dirty relationship
/// gets one `setRelationshipConfiguration`, aliased `setRelationshipConfiguration_{type}_{name}`,
/// in the order the type declares its relationships. Types are visited in the order of `all`.
/// Aliases which would repeat an earlier one get a numeric suffix, so a type named `Episode_call`
/// cannot clash with relationship `call_to_actions` of `Episode`.
/// Dirty types or relationships missing from `all` or `configs` are skipped with a warning.
///
/// Returns [`None`] if there is nothing to write, so the caller can skip the request.
pub fn update_schema_config_mutation<'a>(
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
    configs: &BTreeMap<String, ObjectTypeConfig>,
    dirty: &BTreeMap<String, DirtyConfig>,
) -> Option<Document> {
    let all = all.into().ready()?;
    if dirty.values().all(DirtyConfig::is_empty) {
        return None;
    }
    for object_type in dirty.keys() {
        if !all.iter().any(|meta| meta.name() == object_type) {
            tracing::warn!(%object_type, "skipping configuration of unknown object type");
        }
    }

    let mut aliases = OperationAliases::new();
    let mut doc =
        Document::mutation(operation_name(&["UPDATE", "OBJECT_TYPE_CONFIGURATIONS"]));
    let mut empty = true;
    for meta in all {
        let Some(changes) = dirty.get(meta.name()) else {
            continue;
        };
        let Some(config) = configs.get(meta.name()) else {
            tracing::warn!(object_type = meta.name(), "no configuration for dirty object type");
            continue;
        };

        if !changes.properties.is_empty() {
            let object_config = changes
                .properties
                .iter()
                .map(|property| (property.to_string(), property.value(config)));
            doc = doc.select(
                Field::new("setObjectConfiguration")
                    .alias(aliases.next("setObjectTypeConfiguration", meta.name()))
                    .arg("object_type", Value::enum_value(meta.name()))
                    .arg("object_config", Value::object(object_config))
                    .select_all(["display_name", "colour", "primary_field"])
                    .select(Field::new("field_config").select_all([
                        "name",
                        "ui_field_type",
                        "ui_position",
                    ])),
            );
            empty = false;
        }

        for relationship in meta.relationships() {
            let name = &relationship.relationship_name;
            if !changes.relationships.contains(name) {
                continue;
            }
            let Some(relationship_config) = config.relationship_config.get(name) else {
                tracing::warn!(
                    object_type = meta.name(),
                    relationship = %name,
                    "no configuration for dirty relationship"
                );
                continue;
            };
            doc = doc.select(
                Field::new("setRelationshipConfiguration")
                    .alias(aliases.next(
                        "setRelationshipConfiguration",
                        format!("{}_{name}", meta.name()),
                    ))
                    .arg("object_type", Value::enum_value(meta.name()))
                    .arg("relationship_name", name.as_str())
                    .arg("relationship_config", relationship_config.to_value())
                    .select_all(["default_sort_field", "inherit_availability"]),
            );
            empty = false;
        }
    }

    if empty {
        return None;
    }
    built(doc)
}

/// Make `version` the active schema version.
pub fn activate_schema_version_mutation(version: SchemaVersion) -> Document {
    finished(
        Document::mutation(operation_name(&["ACTIVATE", "SCHEMA_VERSION"])).select(
            Field::new("activateConfigurationVersion")
                .arg("version", version.0)
                .select_all(["version", "active"]),
        ),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::{fixtures::*, RelationshipMeta};
    use crate::query::test_helpers::assert_parses;

    fn configs() -> BTreeMap<String, ObjectTypeConfig> {
        let episode = ObjectTypeConfig {
            display_name: Some("Episode".into()),
            colour: Some("#ff0000".into()),
            primary_field: Some("title".into()),
            field_config: vec![
                FieldUiConfig {
                    name: "title".into(),
                    ui_field_type: Some("STRING".into()),
                    ui_position: 1,
                },
                FieldUiConfig {
                    name: "synopsis".into(),
                    ui_field_type: None,
                    ui_position: 2,
                },
            ],
            relationship_config: [(
                "brands".to_string(),
                RelationshipConfig {
                    default_sort_field: Some("title".into()),
                    inherit_availability: true,
                },
            )]
            .into_iter()
            .collect(),
        };
        let brand = ObjectTypeConfig {
            colour: Some("#00ff00".into()),
            ..Default::default()
        };
        [("Episode".to_string(), episode), ("Brand".to_string(), brand)]
            .into_iter()
            .collect()
    }

    fn dirty(object_type: &str, changes: DirtyConfig) -> BTreeMap<String, DirtyConfig> {
        [(object_type.to_string(), changes)].into_iter().collect()
    }

    #[test]
    fn test_only_dirty_properties() {
        let all = all();
        let doc = update_schema_config_mutation(
            &all,
            &configs(),
            &dirty(
                "Episode",
                DirtyConfig {
                    properties: [ConfigProperty::FieldConfig, ConfigProperty::Colour]
                        .into_iter()
                        .collect(),
                    relationships: ["brands".to_string()].into_iter().collect(),
                },
            ),
        )
        .unwrap();
        assert_parses(&doc);
        assert_eq!(
            doc.to_string(),
            r##"mutation SL_UI_UPDATE_OBJECT_TYPE_CONFIGURATIONS {
  setObjectTypeConfiguration_Episode: setObjectConfiguration(object_type: Episode, object_config: {colour: "#ff0000", field_config: [{name: "title", ui_field_type: STRING, ui_position: 1}, {name: "synopsis", ui_field_type: null, ui_position: 2}]}) {
    display_name
    colour
    primary_field
    field_config {
      name
      ui_field_type
      ui_position
    }
  }
  setRelationshipConfiguration_Episode_brands: setRelationshipConfiguration(object_type: Episode, relationship_name: "brands", relationship_config: {default_sort_field: "title", inherit_availability: true}) {
    default_sort_field
    inherit_availability
  }
}"##
        );
    }

    #[test]
    fn test_relationship_aliases_never_clash() {
        let all = vec![
            ObjectTypeMeta::builder("Episode")
                .relationship(RelationshipMeta::new("call_to_actions", "CallToAction"))
                .build(),
            ObjectTypeMeta::builder("Episode_call")
                .relationship(RelationshipMeta::new("to_actions", "CallToAction"))
                .build(),
        ];
        let config = |name: &str| ObjectTypeConfig {
            relationship_config: [(
                name.to_string(),
                RelationshipConfig {
                    default_sort_field: None,
                    inherit_availability: true,
                },
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        let configs: BTreeMap<_, _> = [
            ("Episode".to_string(), config("call_to_actions")),
            ("Episode_call".to_string(), config("to_actions")),
        ]
        .into_iter()
        .collect();
        let changes = |name: &str| DirtyConfig {
            properties: BTreeSet::new(),
            relationships: [name.to_string()].into_iter().collect(),
        };
        let mut dirty = dirty("Episode", changes("call_to_actions"));
        dirty.insert("Episode_call".into(), changes("to_actions"));

        let doc = update_schema_config_mutation(&all, &configs, &dirty).unwrap();
        assert_parses(&doc);
        assert_eq!(
            doc.selection_set().response_keys().collect::<Vec<_>>(),
            [
                "setRelationshipConfiguration_Episode_call_to_actions",
                "setRelationshipConfiguration_Episode_call_to_actions_1",
            ]
        );
    }

    #[test]
    fn test_types_follow_schema_order() {
        let all = all();
        let changes = DirtyConfig {
            properties: [ConfigProperty::Colour].into_iter().collect(),
            relationships: BTreeSet::new(),
        };
        let mut dirty = dirty("Brand", changes.clone());
        dirty.insert("Episode".into(), changes.clone());
        dirty.insert("Movie".into(), changes);
        let doc = update_schema_config_mutation(&all, &configs(), &dirty).unwrap();
        assert_eq!(
            doc.selection_set().response_keys().collect::<Vec<_>>(),
            [
                "setObjectTypeConfiguration_Episode",
                "setObjectTypeConfiguration_Brand"
            ]
        );
    }

    #[test]
    fn test_empty_dirty_set() {
        let all = all();
        assert_eq!(
            update_schema_config_mutation(&all, &configs(), &BTreeMap::new()),
            None
        );
        let clean = dirty("Episode", DirtyConfig::default());
        assert_eq!(
            update_schema_config_mutation(&all, &configs(), &clean),
            None
        );
        // Dirty, but nothing to write it from.
        let unconfigured = dirty(
            "SkylarkSet",
            DirtyConfig {
                properties: [ConfigProperty::Colour].into_iter().collect(),
                relationships: BTreeSet::new(),
            },
        );
        assert_eq!(
            update_schema_config_mutation(&all, &configs(), &unconfigured),
            None
        );
    }

    #[test]
    fn test_activate() {
        let doc = activate_schema_version_mutation(SchemaVersion(7));
        assert_parses(&doc);
        assert_eq!(
            doc.to_string(),
            "mutation SL_UI_ACTIVATE_SCHEMA_VERSION {
  activateConfigurationVersion(version: 7) {
    version
    active
  }
}"
        );
    }
}
