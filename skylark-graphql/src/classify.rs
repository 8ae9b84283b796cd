//! Classification of introspected fields into semantic types.
//!
//! The Skylark API describes object fields with GraphQL scalars, most of them AWS AppSync
//! scalars (`AWSDate`, `AWSURL`, ...), and with customer-defined enums. This module maps those raw
//! descriptors to the closed [`SemanticType`] set used by the rest of the crate, renders the
//! GraphQL type syntax for a field, and coerces caller-supplied values into argument literals of
//! the right shape.
//!
//! Nothing in here fails. An unknown scalar is treated as a string and an unconvertible value is
//! sent as a string literal, leaving it to the API to reject.

use crate::{
    document::Value,
    meta::{FieldMeta, SemanticType},
};
use serde::Deserialize;
use std::collections::HashMap;

/// Fields every object type has, which are managed by the platform.
pub const SYSTEM_FIELDS: [&str; 2] = ["uid", "external_id"];

/// Is `name` one of the [`SYSTEM_FIELDS`]?
pub fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

/// The kind of an introspected type reference.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

/// A reference to a type, as it appears in an introspection result.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// A reference to the named type of `kind`.
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            of_type: None,
        }
    }

    /// Wrap `inner` in a `NON_NULL` or `LIST` wrapper.
    pub fn wrap(kind: TypeKind, inner: TypeRef) -> Self {
        Self {
            kind,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }
}

/// An introspected field or input value.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// The values of each enum in the schema, by enum name.
pub type EnumValues = HashMap<String, Vec<String>>;

/// Classify a raw field without enum value information.
pub fn classify(raw: &RawField) -> FieldMeta {
    classify_with_enums(raw, &EnumValues::new())
}

/// Classify a raw field, attaching the allowed values if the field is an enum listed in `enums`.
pub fn classify_with_enums(raw: &RawField, enums: &EnumValues) -> FieldMeta {
    let mut is_required = false;
    let mut is_list = false;
    let mut ty = &raw.ty;
    loop {
        match (ty.kind, &ty.of_type) {
            (TypeKind::NonNull, Some(inner)) => {
                // Only the outermost non-null wrapper decides whether the field is required;
                // `[String!]` is an optional list.
                if !is_list {
                    is_required = true;
                }
                ty = inner;
            }
            (TypeKind::List, Some(inner)) => {
                is_list = true;
                ty = inner;
            }
            _ => break,
        }
    }

    let original_type = ty.name.clone().unwrap_or_default();
    let semantic_type = if ty.kind == TypeKind::Enum {
        SemanticType::Enum
    } else {
        scalar_semantic_type(&original_type)
    };
    let enum_values = match semantic_type {
        SemanticType::Enum => enums.get(&original_type).cloned(),
        _ => None,
    };

    FieldMeta {
        name: raw.name.clone(),
        semantic_type,
        original_type,
        enum_values,
        is_list,
        is_required,
    }
}

/// Map a GraphQL scalar name to its semantic type. Unknown scalars are strings.
pub fn scalar_semantic_type(scalar: &str) -> SemanticType {
    match scalar {
        "Int" => SemanticType::Int,
        "Float" => SemanticType::Float,
        "Boolean" => SemanticType::Boolean,
        "AWSDate" => SemanticType::Date,
        "AWSDateTime" => SemanticType::DateTime,
        "AWSTime" => SemanticType::Time,
        "AWSTimestamp" => SemanticType::Timestamp,
        "AWSEmail" => SemanticType::Email,
        "AWSURL" => SemanticType::Url,
        "AWSIPAddress" => SemanticType::IpAddress,
        "AWSJSON" => SemanticType::Json,
        "AWSPhone" => SemanticType::Phone,
        _ => SemanticType::String,
    }
}

/// The GraphQL scalar used to carry values of a semantic type.
pub fn graphql_scalar(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String | SemanticType::Enum => "String",
        SemanticType::Int => "Int",
        SemanticType::Float => "Float",
        SemanticType::Boolean => "Boolean",
        SemanticType::Date => "AWSDate",
        SemanticType::DateTime => "AWSDateTime",
        SemanticType::Time => "AWSTime",
        SemanticType::Timestamp => "AWSTimestamp",
        SemanticType::Email => "AWSEmail",
        SemanticType::Url => "AWSURL",
        SemanticType::IpAddress => "AWSIPAddress",
        SemanticType::Json => "AWSJSON",
        SemanticType::Phone => "AWSPhone",
    }
}

/// The GraphQL type syntax of a field, like `String`, `[AWSDate]` or `EpisodeTier!`.
pub fn graphql_type(field: &FieldMeta) -> String {
    let named = match field.semantic_type {
        SemanticType::Enum if !field.original_type.is_empty() => field.original_type.clone(),
        ty => graphql_scalar(ty).to_string(),
    };
    let ty = if field.is_list {
        format!("[{named}]")
    } else {
        named
    };
    if field.is_required {
        format!("{ty}!")
    } else {
        ty
    }
}

/// Convert a caller-supplied JSON value into an argument literal for `field`.
pub fn coerce_input(field: &FieldMeta, value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match value {
        Json::Null => Value::Null,
        Json::Array(items) if field.is_list => Value::List(
            items
                .iter()
                .map(|item| coerce_scalar(field, item))
                .collect(),
        ),
        value => coerce_scalar(field, value),
    }
}

fn coerce_scalar(field: &FieldMeta, value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match (field.semantic_type, value) {
        (_, Json::Null) => Value::Null,
        (SemanticType::String, Json::String(s)) => Value::String(s.clone()),
        (SemanticType::Json, Json::String(s)) => Value::String(s.clone()),
        (SemanticType::Json, value) => Value::String(value.to_string()),
        // Clearing an input in a form yields an empty string, which means "no value" for every
        // type other than a plain string.
        (_, Json::String(s)) if s.trim().is_empty() => Value::Null,
        (SemanticType::Enum, Json::String(s)) => Value::Enum(s.clone()),
        (SemanticType::Int | SemanticType::Timestamp, value) => match value {
            Json::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(x))
                    if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 =>
                {
                    Value::Int(x as i64)
                }
                _ => fallback(value),
            },
            Json::String(s) => s
                .trim()
                .parse()
                .map(Value::Int)
                .unwrap_or_else(|_| fallback(value)),
            _ => fallback(value),
        },
        (SemanticType::Float, value) => match value {
            Json::Number(n) => n.as_f64().map(Value::Float).unwrap_or_else(|| fallback(value)),
            Json::String(s) => match s.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => Value::Float(x),
                _ => fallback(value),
            },
            _ => fallback(value),
        },
        (SemanticType::Boolean, value) => match value {
            Json::Bool(b) => Value::Boolean(*b),
            Json::String(s) if s.eq_ignore_ascii_case("true") => Value::Boolean(true),
            Json::String(s) if s.eq_ignore_ascii_case("false") => Value::Boolean(false),
            _ => fallback(value),
        },
        (_, value) => fallback(value),
    }
}

/// Send anything we can't convert as a string and let the API validate it.
fn fallback(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::String(s) => Value::String(s.clone()),
        value => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn raw(json: serde_json::Value) -> RawField {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_classify_scalars() {
        let cases = [
            ("String", SemanticType::String),
            ("Int", SemanticType::Int),
            ("Float", SemanticType::Float),
            ("Boolean", SemanticType::Boolean),
            ("AWSDate", SemanticType::Date),
            ("AWSDateTime", SemanticType::DateTime),
            ("AWSTime", SemanticType::Time),
            ("AWSTimestamp", SemanticType::Timestamp),
            ("AWSEmail", SemanticType::Email),
            ("AWSURL", SemanticType::Url),
            ("AWSIPAddress", SemanticType::IpAddress),
            ("AWSJSON", SemanticType::Json),
            ("AWSPhone", SemanticType::Phone),
            ("SomethingNew", SemanticType::String),
        ];
        for (scalar, expected) in cases {
            let field = classify(&RawField {
                name: "f".into(),
                ty: TypeRef::named(TypeKind::Scalar, scalar),
            });
            assert_eq!(field.semantic_type, expected, "{scalar}");
            assert_eq!(field.original_type, scalar);
            assert!(!field.is_list);
            assert!(!field.is_required);
        }
    }

    #[test]
    fn test_classify_introspection_json() {
        let field = classify(&raw(json!({
            "name": "title",
            "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": { "kind": "SCALAR", "name": "String", "ofType": null }
            }
        })));
        assert_eq!(field.name, "title");
        assert_eq!(field.semantic_type, SemanticType::String);
        assert!(field.is_required);
        assert_eq!(graphql_type(&field), "String!");
    }

    #[test]
    fn test_classify_list_of_non_null() {
        let field = classify(&RawField {
            name: "tags".into(),
            ty: TypeRef::wrap(
                TypeKind::List,
                TypeRef::wrap(
                    TypeKind::NonNull,
                    TypeRef::named(TypeKind::Scalar, "AWSDate"),
                ),
            ),
        });
        assert!(field.is_list);
        assert!(!field.is_required);
        assert_eq!(field.semantic_type, SemanticType::Date);
        assert_eq!(graphql_type(&field), "[AWSDate]");
    }

    #[test]
    fn test_classify_enum() {
        let enums = EnumValues::from([(
            "EpisodeTier".to_string(),
            vec!["FREE".to_string(), "PREMIUM".to_string()],
        )]);
        let field = classify_with_enums(
            &RawField {
                name: "tier".into(),
                ty: TypeRef::named(TypeKind::Enum, "EpisodeTier"),
            },
            &enums,
        );
        assert_eq!(field.semantic_type, SemanticType::Enum);
        assert_eq!(
            field.enum_values.as_deref(),
            Some(&["FREE".to_string(), "PREMIUM".to_string()][..])
        );
        assert_eq!(graphql_type(&field), "EpisodeTier");

        // Without the enum table the values are unknown, but the type is still an enum.
        let field = classify(&RawField {
            name: "tier".into(),
            ty: TypeRef::named(TypeKind::Enum, "EpisodeTier"),
        });
        assert_eq!(field.semantic_type, SemanticType::Enum);
        assert_eq!(field.enum_values, None);
    }

    #[test]
    fn test_system_fields() {
        assert!(is_system_field("uid"));
        assert!(is_system_field("external_id"));
        assert!(!is_system_field("title"));
    }

    #[test]
    fn test_coerce_input() {
        let int = FieldMeta::new("n", SemanticType::Int, "Int");
        assert_eq!(coerce_input(&int, &json!(3)), Value::Int(3));
        assert_eq!(coerce_input(&int, &json!(" 42 ")), Value::Int(42));
        assert_eq!(coerce_input(&int, &json!("")), Value::Null);
        assert_eq!(coerce_input(&int, &json!("abc")), Value::String("abc".into()));

        // Integral floats are integers; anything with a fraction is left for the API to reject.
        let timestamp = FieldMeta::new("t", SemanticType::Timestamp, "AWSTimestamp");
        assert_eq!(coerce_input(&int, &json!(3.0)), Value::Int(3));
        assert_eq!(coerce_input(&timestamp, &json!(1700000000.0)), Value::Int(1700000000));
        assert_eq!(coerce_input(&int, &json!(3.5)), Value::String("3.5".into()));
        assert_eq!(coerce_input(&int, &json!(1e300)), Value::String("1e300".into()));

        let float = FieldMeta::new("x", SemanticType::Float, "Float");
        assert_eq!(coerce_input(&float, &json!("1.5")), Value::Float(1.5));
        assert_eq!(coerce_input(&float, &json!(2)), Value::Float(2.0));

        let boolean = FieldMeta::new("b", SemanticType::Boolean, "Boolean");
        assert_eq!(coerce_input(&boolean, &json!("TRUE")), Value::Boolean(true));
        assert_eq!(coerce_input(&boolean, &json!(false)), Value::Boolean(false));

        let tier = FieldMeta::new("tier", SemanticType::Enum, "EpisodeTier");
        assert_eq!(coerce_input(&tier, &json!("FREE")), Value::enum_value("FREE"));

        let string = FieldMeta::string("title");
        assert_eq!(coerce_input(&string, &json!("")), Value::String("".into()));
        assert_eq!(coerce_input(&string, &json!(null)), Value::Null);

        let json_field = FieldMeta::new("data", SemanticType::Json, "AWSJSON");
        assert_eq!(
            coerce_input(&json_field, &json!({"a": 1})),
            Value::String(r#"{"a":1}"#.into())
        );

        let dates = FieldMeta::new("dates", SemanticType::Date, "AWSDate").list();
        assert_eq!(
            coerce_input(&dates, &json!(["2024-01-01", ""])),
            Value::List(vec![Value::String("2024-01-01".into()), Value::Null])
        );
    }
}
