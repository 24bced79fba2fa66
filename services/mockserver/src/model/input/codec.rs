//! Flat wire codec for inputs.
//!
//! # Purpose
//! An input travels as one flat JSON object: the structural fields (`title`,
//! `type`, `id`, `global`, `node`, `created_at`, `creator_user_id`) sit next to
//! the type-specific attribute fields. Decoding splits them apart and
//! dispatches the remainder on `type`; encoding merges them back.
//!
//! # Key invariants
//! - Registered types decode strictly; an unknown attribute field is an error.
//! - Unregistered or missing types decode into an untyped bag so they
//!   round-trip unchanged.
//! - On encode, structural fields win over attribute fields of the same name.
//! - Structural fields sent as `null` or `""` come back out unchanged as long
//!   as nothing has set them since.
use super::Input;
use super::attributes::{
    BEATS, GELF_HTTP, GELF_UDP, InputAttributes, SYSLOG_TCP, SYSLOG_UDP, UntypedAttributes,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

pub const STRUCTURAL_FIELDS: [&str; 7] = [
    "title",
    "type",
    "id",
    "global",
    "node",
    "created_at",
    "creator_user_id",
];

#[derive(Debug, Error)]
pub enum InputCodecError {
    #[error("input must be a JSON object")]
    NotAnObject,
    #[error("field {field} must be a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("invalid attributes for input type {input_type}: {source}")]
    InvalidAttributes {
        input_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode input attributes: {0}")]
    Encode(#[from] serde_json::Error),
}

type AttributeDecoder = fn(Map<String, Value>) -> Result<InputAttributes, serde_json::Error>;

static REGISTRY: OnceLock<HashMap<&'static str, AttributeDecoder>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, AttributeDecoder> {
    REGISTRY.get_or_init(|| {
        let mut table: HashMap<&'static str, AttributeDecoder> = HashMap::new();
        table.insert(SYSLOG_UDP, |fields| {
            serde_json::from_value(Value::Object(fields)).map(InputAttributes::SyslogUdp)
        });
        table.insert(SYSLOG_TCP, |fields| {
            serde_json::from_value(Value::Object(fields)).map(InputAttributes::SyslogTcp)
        });
        table.insert(GELF_UDP, |fields| {
            serde_json::from_value(Value::Object(fields)).map(InputAttributes::GelfUdp)
        });
        table.insert(GELF_HTTP, |fields| {
            serde_json::from_value(Value::Object(fields)).map(InputAttributes::GelfHttp)
        });
        table.insert(BEATS, |fields| {
            serde_json::from_value(Value::Object(fields)).map(InputAttributes::Beats)
        });
        table
    })
}

/// Whether `input_type` has a strict attribute shape.
pub fn is_registered(input_type: &str) -> bool {
    registry().contains_key(input_type)
}

pub fn decode_input(value: Value) -> Result<Input, InputCodecError> {
    let Value::Object(mut fields) = value else {
        return Err(InputCodecError::NotAnObject);
    };
    let unset_fields = unset_structural_fields(&fields);
    let title = take_string(&mut fields, "title")?.unwrap_or_default();
    let input_type = take_string(&mut fields, "type")?;
    let id = take_string(&mut fields, "id")?.unwrap_or_default();
    let global = take_bool(&mut fields, "global")?.unwrap_or(false);
    let node = take_string(&mut fields, "node")?;
    let created_at = take_string(&mut fields, "created_at")?;
    let creator_user_id = take_string(&mut fields, "creator_user_id")?;
    let attributes = decode_attributes(input_type, fields)?;
    Ok(Input {
        id,
        title,
        global,
        node,
        created_at,
        creator_user_id,
        attributes,
        unset_fields,
    })
}

fn unset_structural_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    STRUCTURAL_FIELDS
        .iter()
        .filter_map(|name| match fields.get(*name) {
            Some(value @ Value::Null) => Some((name.to_string(), value.clone())),
            Some(Value::String(value)) if value.is_empty() => {
                Some((name.to_string(), Value::String(String::new())))
            }
            _ => None,
        })
        .collect()
}

fn is_unset(input: &Input, name: &str) -> bool {
    match name {
        "title" => input.title.is_empty(),
        "type" => input.input_type().is_empty(),
        "id" => input.id.is_empty(),
        "global" => !input.global,
        "node" => input.node.as_deref().is_none_or(str::is_empty),
        "created_at" => input.created_at.as_deref().is_none_or(str::is_empty),
        "creator_user_id" => input.creator_user_id.as_deref().is_none_or(str::is_empty),
        _ => false,
    }
}

fn decode_attributes(
    input_type: Option<String>,
    fields: Map<String, Value>,
) -> Result<Option<InputAttributes>, InputCodecError> {
    match input_type {
        Some(input_type) => decode_typed(input_type, fields).map(Some),
        None if fields.is_empty() => Ok(None),
        None => Ok(Some(InputAttributes::Untyped(UntypedAttributes {
            input_type: String::new(),
            fields,
        }))),
    }
}

fn decode_typed(
    input_type: String,
    fields: Map<String, Value>,
) -> Result<InputAttributes, InputCodecError> {
    match registry().get(input_type.as_str()).copied() {
        Some(decode) => decode(fields)
            .map_err(|source| InputCodecError::InvalidAttributes { input_type, source }),
        None => Ok(InputAttributes::Untyped(UntypedAttributes { input_type, fields })),
    }
}

/// Check an untyped bag against the registered shape for its type.
///
/// Bags built by hand can claim a registered type without matching its shape;
/// this re-decodes them strictly. Typed bags and unregistered types pass
/// through unchanged.
pub fn normalize_attributes(
    attributes: InputAttributes,
) -> Result<InputAttributes, InputCodecError> {
    match attributes {
        InputAttributes::Untyped(untyped) if is_registered(&untyped.input_type) => {
            decode_typed(untyped.input_type, untyped.fields)
        }
        other => Ok(other),
    }
}

pub fn encode_input(input: &Input) -> Result<Value, InputCodecError> {
    let mut fields = match &input.attributes {
        Some(attributes) => attributes.to_fields()?,
        None => Map::new(),
    };
    for name in STRUCTURAL_FIELDS {
        fields.remove(name);
    }
    fields.insert("title".into(), Value::String(input.title.clone()));
    let input_type = input.input_type();
    if !input_type.is_empty() {
        fields.insert("type".into(), Value::String(input_type.to_string()));
    }
    if !input.id.is_empty() {
        fields.insert("id".into(), Value::String(input.id.clone()));
    }
    fields.insert("global".into(), Value::Bool(input.global));
    let optional = [
        ("node", &input.node),
        ("created_at", &input.created_at),
        ("creator_user_id", &input.creator_user_id),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            fields.insert(name.into(), Value::String(value.clone()));
        }
    }
    for (name, value) in &input.unset_fields {
        if is_unset(input, name) {
            fields.insert(name.clone(), value.clone());
        }
    }
    Ok(Value::Object(fields))
}

fn take_string(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, InputCodecError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(InputCodecError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

fn take_bool(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<bool>, InputCodecError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(value)),
        Some(_) => Err(InputCodecError::InvalidField {
            field,
            expected: "boolean",
        }),
    }
}
