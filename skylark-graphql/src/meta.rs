//! The object metadata model.
//!
//! An [`ObjectTypeMeta`] is a normalized description of one content type in a customer-defined
//! Skylark schema: its fields, its relationships to other types, the operations the API exposes
//! for it, and a set of [`Capabilities`] that decide which optional selections a builder includes.
//!
//! Metadata is produced once per schema version by introspecting the API and is immutable after
//! that. The only way to build an [`ObjectTypeMeta`] is through [`ObjectTypeMetaBuilder`], which
//! enforces the invariants the query and mutation builders rely on. A new schema version produces
//! a whole new [`Schema`]; nothing here is ever updated in place, since two schema versions may
//! describe the same object type name with different fields.

use convert_case::{Case, Casing};
use derive_more::{Display, From, Into};
use std::collections::BTreeSet;

/// The semantic type of a field, independent of the exact GraphQL scalar used to represent it.
#[derive(Clone, Copy, Debug, Display, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SemanticType {
    #[default]
    #[display(fmt = "string")]
    String,
    #[display(fmt = "int")]
    Int,
    #[display(fmt = "float")]
    Float,
    #[display(fmt = "boolean")]
    Boolean,
    #[display(fmt = "enum")]
    Enum,
    #[display(fmt = "date")]
    Date,
    #[display(fmt = "datetime")]
    DateTime,
    #[display(fmt = "time")]
    Time,
    #[display(fmt = "timestamp")]
    Timestamp,
    #[display(fmt = "email")]
    Email,
    #[display(fmt = "url")]
    Url,
    #[display(fmt = "ipaddress")]
    IpAddress,
    #[display(fmt = "json")]
    Json,
    #[display(fmt = "phone")]
    Phone,
}

/// A field of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldMeta {
    pub name: String,
    pub semantic_type: SemanticType,
    /// The name of the GraphQL scalar or enum type this field was introspected from.
    pub original_type: String,
    /// The allowed values, for [`SemanticType::Enum`] fields.
    pub enum_values: Option<Vec<String>>,
    pub is_list: bool,
    pub is_required: bool,
}

impl FieldMeta {
    /// A nullable, non-list field.
    pub fn new(
        name: impl Into<String>,
        semantic_type: SemanticType,
        original_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            original_type: original_type.into(),
            enum_values: None,
            is_list: false,
            is_required: false,
        }
    }

    /// A nullable `String` field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, SemanticType::String, "String")
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }
}

/// The partition of an object type's fields into language-scoped and global fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldConfig {
    translatable: BTreeSet<String>,
    global: BTreeSet<String>,
}

impl FieldConfig {
    pub fn is_translatable(&self, field: &str) -> bool {
        self.translatable.contains(field)
    }

    pub fn is_global(&self, field: &str) -> bool {
        self.global.contains(field)
    }

    pub fn translatable(&self) -> impl Iterator<Item = &str> {
        self.translatable.iter().map(String::as_str)
    }

    pub fn global(&self) -> impl Iterator<Item = &str> {
        self.global.iter().map(String::as_str)
    }
}

/// A relationship from one object type to another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationshipMeta {
    /// The name of the relationship field, like `brands`.
    pub relationship_name: String,
    /// The name of the related object type, like `Brand`.
    pub object_type: String,
}

impl RelationshipMeta {
    pub fn new(relationship_name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            relationship_name: relationship_name.into(),
            object_type: object_type.into(),
        }
    }
}

/// The CRUD verbs an object type may support.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    #[display(fmt = "get")]
    Get,
    #[display(fmt = "list")]
    List,
    #[display(fmt = "create")]
    Create,
    #[display(fmt = "update")]
    Update,
    #[display(fmt = "delete")]
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Self::Get, Self::List, Self::Create, Self::Update, Self::Delete];
}

/// A resolver the API exposes for an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationMeta {
    /// The name of the root field, like `updateEpisode`.
    pub name: String,
    /// The argument which carries the input object, like `episode`.
    pub arg_name: String,
    /// The fields accepted in the input object (create and update only).
    pub inputs: Vec<FieldMeta>,
}

impl OperationMeta {
    pub fn new(name: impl Into<String>, arg_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_name: arg_name.into(),
            inputs: vec![],
        }
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = FieldMeta>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    /// Is `field` accepted as an input to this operation?
    pub fn accepts(&self, field: &str) -> bool {
        self.inputs.iter().any(|input| input.name == field)
    }
}

/// The operations available for an object type.
///
/// A missing operation means the capability is absent, and any builder that needs it returns
/// [`None`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Operations {
    pub get: Option<OperationMeta>,
    pub list: Option<OperationMeta>,
    pub create: Option<OperationMeta>,
    pub update: Option<OperationMeta>,
    pub delete: Option<OperationMeta>,
}

impl Operations {
    pub fn get(&self, verb: Verb) -> Option<&OperationMeta> {
        match verb {
            Verb::Get => self.get.as_ref(),
            Verb::List => self.list.as_ref(),
            Verb::Create => self.create.as_ref(),
            Verb::Update => self.update.as_ref(),
            Verb::Delete => self.delete.as_ref(),
        }
    }

    fn slot(&mut self, verb: Verb) -> &mut Option<OperationMeta> {
        match verb {
            Verb::Get => &mut self.get,
            Verb::List => &mut self.list,
            Verb::Create => &mut self.create,
            Verb::Update => &mut self.update,
            Verb::Delete => &mut self.delete,
        }
    }
}

/// Optional features of an object type, which gate optional blocks in generated documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// The type is a container with ordered `content`.
    pub has_content: bool,
    /// The type can appear as content of other objects (`content_of`).
    pub has_content_of: bool,
    pub has_relationships: bool,
    pub has_availability: bool,
    pub is_translatable: bool,
    pub is_image: bool,
    /// The type is a set, which may compute its content dynamically.
    pub is_set: bool,
}

/// Normalized schema description of one content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectTypeMeta {
    name: String,
    fields: Vec<FieldMeta>,
    field_config: FieldConfig,
    relationships: Vec<RelationshipMeta>,
    operations: Operations,
    capabilities: Capabilities,
}

impl ObjectTypeMeta {
    /// Start describing the object type `name`.
    pub fn builder(name: impl Into<String>) -> ObjectTypeMetaBuilder {
        ObjectTypeMetaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields, in schema declaration order.
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_config(&self) -> &FieldConfig {
        &self.field_config
    }

    pub fn relationships(&self) -> &[RelationshipMeta] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipMeta> {
        self.relationships
            .iter()
            .find(|rel| rel.relationship_name == name)
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn operation(&self, verb: Verb) -> Option<&OperationMeta> {
        self.operations.get(verb)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Shorthand for `capabilities().is_translatable`.
    pub fn is_translatable(&self) -> bool {
        self.capabilities.is_translatable
    }

    /// The upper snake case form of the name, used in operation names (`SkylarkSet` becomes
    /// `SKYLARK_SET`).
    pub fn constant_name(&self) -> String {
        self.name.to_case(Case::UpperSnake)
    }
}

/// Builder for an [`ObjectTypeMeta`].
#[derive(Clone, Debug)]
pub struct ObjectTypeMetaBuilder {
    name: String,
    fields: Vec<FieldMeta>,
    translatable: BTreeSet<String>,
    relationships: Vec<RelationshipMeta>,
    operations: Operations,
    capabilities: Capabilities,
}

impl ObjectTypeMetaBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
            translatable: BTreeSet::new(),
            relationships: vec![],
            operations: Operations::default(),
            capabilities: Capabilities::default(),
        }
    }

    /// Add a global field.
    pub fn field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a language-scoped field.
    ///
    /// The field only ends up translatable if the type itself is translatable; on other types
    /// every field is global.
    pub fn translatable_field(mut self, field: FieldMeta) -> Self {
        self.translatable.insert(field.name.clone());
        self.fields.push(field);
        self
    }

    pub fn relationship(mut self, relationship: RelationshipMeta) -> Self {
        self.relationships.push(relationship);
        self.capabilities.has_relationships = true;
        self
    }

    /// Declare the resolver for `verb`.
    pub fn operation(mut self, verb: Verb, op: OperationMeta) -> Self {
        *self.operations.slot(verb) = Some(op);
        self
    }

    /// Declare every operation using the platform's naming conventions.
    ///
    /// For `SkylarkSet` these are `getSkylarkSet`, `listSkylarkSet`, `createSkylarkSet`,
    /// `updateSkylarkSet` and `deleteSkylarkSet`, all taking their input in a `skylark_set`
    /// argument. Create and update accept every field declared so far, so call this after the
    /// fields have been added.
    pub fn with_default_operations(mut self) -> Self {
        let arg_name = self.name.to_case(Case::Snake);
        for verb in Verb::ALL {
            let mut op = OperationMeta::new(format!("{verb}{}", self.name), arg_name.clone());
            if matches!(verb, Verb::Create | Verb::Update) {
                op.inputs = self.fields.clone();
            }
            *self.operations.slot(verb) = Some(op);
        }
        self
    }

    /// Remove the resolver for `verb`.
    pub fn without_operation(mut self, verb: Verb) -> Self {
        *self.operations.slot(verb) = None;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Capabilities {
            has_relationships: capabilities.has_relationships || !self.relationships.is_empty(),
            ..capabilities
        };
        self
    }

    pub fn content(mut self) -> Self {
        self.capabilities.has_content = true;
        self
    }

    pub fn content_of(mut self) -> Self {
        self.capabilities.has_content_of = true;
        self
    }

    pub fn availability(mut self) -> Self {
        self.capabilities.has_availability = true;
        self
    }

    pub fn translatable(mut self) -> Self {
        self.capabilities.is_translatable = true;
        self
    }

    pub fn image(mut self) -> Self {
        self.capabilities.is_image = true;
        self
    }

    pub fn set(mut self) -> Self {
        self.capabilities.is_set = true;
        self
    }

    /// Finish the description.
    ///
    /// Every field lands in exactly one of the translatable and global sets of the resulting
    /// [`FieldConfig`]: a field is translatable only if it was declared translatable and the type
    /// is translatable.
    pub fn build(self) -> ObjectTypeMeta {
        let is_translatable = self.capabilities.is_translatable;
        let (translatable, global) = self
            .fields
            .iter()
            .map(|field| field.name.clone())
            .partition(|name| is_translatable && self.translatable.contains(name));
        ObjectTypeMeta {
            name: self.name,
            fields: self.fields,
            field_config: FieldConfig {
                translatable,
                global,
            },
            relationships: self.relationships,
            operations: self.operations,
            capabilities: self.capabilities,
        }
    }
}

/// A version of the customer's schema.
#[derive(
    Clone, Copy, Debug, Default, Display, From, Into, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct SchemaVersion(pub u32);

/// Every object type of one schema version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    version: SchemaVersion,
    object_types: Vec<ObjectTypeMeta>,
}

impl Schema {
    pub fn new(version: SchemaVersion, object_types: Vec<ObjectTypeMeta>) -> Self {
        Self {
            version,
            object_types,
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn object_types(&self) -> &[ObjectTypeMeta] {
        &self.object_types
    }

    pub fn get(&self, object_type: &str) -> Option<&ObjectTypeMeta> {
        find(&self.object_types, object_type)
    }
}

/// Find the metadata for `object_type` in a list of object types.
pub fn find<'a>(metas: &'a [ObjectTypeMeta], object_type: &str) -> Option<&'a ObjectTypeMeta> {
    metas.iter().find(|meta| meta.name == object_type)
}

/// Data which may not have been loaded yet.
///
/// Metadata is introspected asynchronously, so callers regularly ask for a document before the
/// metadata it needs exists. Builders take their metadata as a [`Loadable`] and return [`None`]
/// for [`NotReady`](Self::NotReady), which callers treat as "loading, do not execute".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Loadable<T> {
    NotReady,
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(t) => Some(t),
            Self::NotReady => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl<T> From<Option<T>> for Loadable<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(t) => Self::Ready(t),
            None => Self::NotReady,
        }
    }
}

impl<'a> From<&'a ObjectTypeMeta> for Loadable<&'a ObjectTypeMeta> {
    fn from(meta: &'a ObjectTypeMeta) -> Self {
        Self::Ready(meta)
    }
}

impl<'a> From<&'a [ObjectTypeMeta]> for Loadable<&'a [ObjectTypeMeta]> {
    fn from(metas: &'a [ObjectTypeMeta]) -> Self {
        Self::Ready(metas)
    }
}

impl<'a> From<&'a Vec<ObjectTypeMeta>> for Loadable<&'a [ObjectTypeMeta]> {
    fn from(metas: &'a Vec<ObjectTypeMeta>) -> Self {
        Self::Ready(metas)
    }
}

impl<'a> From<&'a Schema> for Loadable<&'a [ObjectTypeMeta]> {
    fn from(schema: &'a Schema) -> Self {
        Self::Ready(schema.object_types())
    }
}


#[cfg(test)]
mod test {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_field_config_partition() {
        let episode = episode();
        for field in episode.fields() {
            let config = episode.field_config();
            assert_ne!(
                config.is_translatable(&field.name),
                config.is_global(&field.name),
                "{} must be in exactly one set",
                field.name
            );
        }
        assert_eq!(
            episode.field_config().translatable().collect::<Vec<_>>(),
            ["synopsis", "title"]
        );
    }

    #[test]
    fn test_untranslatable_type_is_all_global() {
        let meta = ObjectTypeMeta::builder("Person")
            .field(FieldMeta::string("uid"))
            .translatable_field(FieldMeta::string("name"))
            .build();
        assert!(!meta.is_translatable());
        assert_eq!(meta.field_config().translatable().count(), 0);
        assert_eq!(
            meta.field_config().global().collect::<Vec<_>>(),
            ["name", "uid"]
        );
    }

    #[test]
    fn test_default_operations() {
        let set = set();
        let update = set.operation(Verb::Update).unwrap();
        assert_eq!(update.name, "updateSkylarkSet");
        assert_eq!(update.arg_name, "skylark_set");
        assert!(update.accepts("title"));
        assert_eq!(set.operation(Verb::Get).unwrap().name, "getSkylarkSet");
        assert!(set.operation(Verb::Get).unwrap().inputs.is_empty());

        let tag = tag();
        assert!(tag.operation(Verb::Delete).is_none());
        assert!(tag.operation(Verb::Get).is_some());
    }

    #[test]
    fn test_constant_name() {
        assert_eq!(set().constant_name(), "SKYLARK_SET");
        assert_eq!(episode().constant_name(), "EPISODE");
    }

    #[test]
    fn test_relationships_imply_capability() {
        assert!(episode().capabilities().has_relationships);
        assert!(!tag().capabilities().has_relationships);
        let meta = ObjectTypeMeta::builder("Season")
            .relationship(RelationshipMeta::new("brands", "Brand"))
            .capabilities(Capabilities::default())
            .build();
        assert!(meta.capabilities().has_relationships);
    }

    #[test]
    fn test_loadable() {
        let episode = episode();
        let ready: Loadable<&ObjectTypeMeta> = (&episode).into();
        assert!(ready.is_ready());
        assert_eq!(ready.ready().map(ObjectTypeMeta::name), Some("Episode"));

        let not_ready: Loadable<&ObjectTypeMeta> = None.into();
        assert_eq!(not_ready, Loadable::NotReady);
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::new(SchemaVersion(3), all());
        assert_eq!(schema.version(), SchemaVersion(3));
        assert_eq!(schema.get("Brand").map(ObjectTypeMeta::name), Some("Brand"));
        assert!(schema.get("Movie").is_none());
    }
}
