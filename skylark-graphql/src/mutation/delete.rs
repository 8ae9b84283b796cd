//! Deleting objects, one at a time or in bulk.

use crate::{
    alias::operation_alias,
    document::{Document, Field, Value},
    meta::{find, Loadable, ObjectTypeMeta, Verb},
    mutation::write_root,
    query::{built, operation_name},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Delete one object, in the language given by `$language` for translatable types.
///
/// Returns [`None`] if the type has no `delete` operation.
pub fn delete_object_mutation<'a>(
    meta: impl Into<Loadable<&'a ObjectTypeMeta>>,
) -> Option<Document> {
    let meta = meta.into().ready()?;
    let delete = meta.operation(Verb::Delete)?;

    let (root, variables) = write_root(meta, delete, "deleteObject");
    built(
        Document::mutation(operation_name(&["DELETE", &meta.constant_name()]))
            .variables(variables)
            .select(root.select("uid")),
    )
}

/// An object to delete in bulk.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub uid: String,
    pub object_type: String,
    /// The language to delete, for translatable types. Without one, the whole object is deleted.
    #[serde(default)]
    pub language: Option<String>,
}

impl ObjectRef {
    pub fn new(uid: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            object_type: object_type.into(),
            language: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Delete many objects, possibly of different types, in one document.
///
/// Each object gets its own copy of its type's delete operation, aliased `{operation}_{index}`
/// where `index` is the object's place in `objects`. Copies are grouped by object type, in the
/// order the types first appear. Arguments are inlined, so the document has no variables.
///
/// Objects whose type is unknown or cannot be deleted are skipped with a warning. Returns [`None`]
/// if no object remains.
pub fn bulk_delete_mutation<'a>(
    all: impl Into<Loadable<&'a [ObjectTypeMeta]>>,
    objects: &[ObjectRef],
) -> Option<Document> {
    let all = all.into().ready()?;

    let mut doc = Document::mutation(operation_name(&["BULK_DELETE_OBJECTS"]));
    let mut empty = true;
    for object_type in objects.iter().map(|object| &object.object_type).unique() {
        let Some((meta, delete)) = find(all, object_type)
            .and_then(|meta| Some((meta, meta.operation(Verb::Delete)?)))
        else {
            tracing::warn!(%object_type, "skipping objects of a type which cannot be deleted");
            continue;
        };

        for (index, object) in objects
            .iter()
            .enumerate()
            .filter(|(_, object)| &object.object_type == object_type)
        {
            let mut field = Field::new(&delete.name)
                .alias(operation_alias(&delete.name, index.to_string()))
                .arg("uid", object.uid.as_str());
            if meta.is_translatable() {
                field = field.opt_arg("language", object.language.as_deref().map(Value::from));
            }
            doc = doc.select(field.select("uid"));
            empty = false;
        }
    }

    if empty {
        return None;
    }
    built(doc)
}
