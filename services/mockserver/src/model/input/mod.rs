//! Input model.
//!
//! An input's attribute schema depends on its `type`; see [`codec`] for the
//! flat wire form and [`attributes`] for the known shapes.
pub mod attributes;
pub mod codec;

pub use attributes::{InputAttributes, UntypedAttributes};
pub use codec::{InputCodecError, decode_input, encode_input, normalize_attributes};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A message input. (De)serializes through the flat wire codec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    pub id: String,
    pub title: String,
    /// Start on every node.
    pub global: bool,
    /// Node to start on when not global.
    pub node: Option<String>,
    pub created_at: Option<String>,
    pub creator_user_id: Option<String>,
    pub attributes: Option<InputAttributes>,
    /// Structural fields that arrived as `null` or `""`, re-emitted verbatim
    /// while the matching field above is still unset.
    pub unset_fields: serde_json::Map<String, serde_json::Value>,
}

impl Input {
    pub fn new(title: impl Into<String>, attributes: InputAttributes) -> Self {
        Self {
            title: title.into(),
            attributes: Some(attributes),
            ..Self::default()
        }
    }

    /// The attribute bag's type identifier, or `""` without attributes.
    pub fn input_type(&self) -> &str {
        self.attributes
            .as_ref()
            .map(InputAttributes::input_type)
            .unwrap_or("")
    }
}

impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_input(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Input {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        decode_input(value).map_err(serde::de::Error::custom)
    }
}
