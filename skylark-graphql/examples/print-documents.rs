use clap::Parser;
use serde::Deserialize;
use skylark_graphql::{
    classify::{classify, RawField},
    init_logging,
    meta::RelationshipMeta,
    prelude::*,
    transport::mock::MockTransport,
};
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////////////////////////
// Schema description
//

/// One object type, as exported by an introspection script.
#[derive(Clone, Debug, Deserialize)]
pub struct ObjectTypeDescription {
    name: String,
    fields: Vec<RawField>,
    #[serde(default)]
    translatable_fields: Vec<String>,
    #[serde(default)]
    relationships: Vec<RelationshipDescription>,
    /// Any of `content`, `content_of`, `availability`, `translatable`, `image` and `set`.
    #[serde(default)]
    capabilities: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RelationshipDescription {
    relationship_name: String,
    object_type: String,
}

impl ObjectTypeDescription {
    fn build(self) -> ObjectTypeMeta {
        let mut builder = ObjectTypeMeta::builder(&self.name);
        for raw in &self.fields {
            let field = classify(raw);
            builder = if self.translatable_fields.contains(&field.name) {
                builder.translatable_field(field)
            } else {
                builder.field(field)
            };
        }
        for rel in self.relationships {
            builder = builder.relationship(RelationshipMeta::new(
                rel.relationship_name,
                rel.object_type,
            ));
        }
        builder = builder.with_default_operations();
        for capability in &self.capabilities {
            builder = match capability.as_str() {
                "content" => builder.content(),
                "content_of" => builder.content_of(),
                "availability" => builder.availability(),
                "translatable" => builder.translatable(),
                "image" => builder.image(),
                "set" => builder.set(),
                other => {
                    tracing::warn!(
                        object_type = %self.name,
                        capability = other,
                        "unknown capability"
                    );
                    builder
                }
            };
        }
        builder.build()
    }
}

pub fn load_schema(json: &str) -> color_eyre::Result<Schema> {
    let descriptions: Vec<ObjectTypeDescription> = serde_json::from_str(json)?;
    Ok(Schema::new(
        SchemaVersion(1),
        descriptions
            .into_iter()
            .map(ObjectTypeDescription::build)
            .collect(),
    ))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Documents
//

#[derive(Clone, Debug, Parser)]
pub struct Options {
    /// A JSON file with one description per object type.
    #[clap(long, env = "SKYLARK_SCHEMA")]
    schema: PathBuf,
    /// Also send the get query for `uid` to a mock transport and print the request body.
    #[clap(long)]
    uid: Option<String>,
    /// The object type to build documents for.
    object_type: String,
}

/// Every read document for `object_type` which the schema supports.
pub fn documents(schema: &Schema, object_type: &str) -> Vec<Document> {
    let meta = schema.get(object_type);
    [
        query::get_object_query(meta),
        query::list_objects_query(meta),
        query::object_relationships_query(meta, schema),
        query::object_content_query(meta, schema),
        query::object_content_of_query(meta, schema),
        query::object_availability_query(meta),
        query::availability_inheritance_query(meta, schema),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[async_std::main]
async fn main() -> color_eyre::Result<()> {
    init_logging();
    let opt = Options::parse();
    let schema = load_schema(&std::fs::read_to_string(&opt.schema)?)?;

    for doc in documents(&schema, &opt.object_type) {
        println!("{doc}\n");
    }

    if let Some(uid) = opt.uid {
        let transport = MockTransport::new();
        transport
            .reply(Response::ok(serde_json::json!({ "getObject": null })))
            .await;
        let request = Request::new(
            query::get_object_query(schema.get(&opt.object_type))
                .ok_or_else(|| color_eyre::eyre::eyre!("cannot get {}", opt.object_type))?,
        )
        .variable("uid", uid);
        let data = Client::new(transport.clone()).send(request).await?;
        for request in transport.requests().await {
            println!("{}", serde_json::to_string_pretty(&request.body())?);
        }
        println!("{data}");
    }
    Ok(())
}
