//! Stream and stream-rule models.
//!
//! # Purpose
//! A stream routes messages into an index set according to its rules. Rules
//! are stored separately and point back at their owning stream; the stream
//! keeps the ordered list of its rule ids.
use serde::{Deserialize, Serialize};

/// How a stream combines its rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchingType {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Empty on create means "use the default index set".
    #[serde(default)]
    pub index_set_id: String,
    #[serde(default)]
    pub matching_type: MatchingType,
    /// Ids of the rules owned by this stream, in creation order. Maintained by
    /// the store; values supplied by callers are ignored.
    #[serde(default)]
    pub rule_ids: Vec<String>,
    #[serde(default)]
    pub remove_matches_from_default_stream: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_user_id: Option<String>,
}

impl Stream {
    pub fn new(title: impl Into<String>, index_set_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            index_set_id: index_set_id.into(),
            ..Self::default()
        }
    }
}

/// Stream rule kinds, encoded on the wire as their numeric code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StreamRuleType {
    #[default]
    Exact,
    Regex,
    Greater,
    Smaller,
    Presence,
    Contain,
    AlwaysMatch,
}

impl From<StreamRuleType> for u8 {
    fn from(value: StreamRuleType) -> Self {
        match value {
            StreamRuleType::Exact => 1,
            StreamRuleType::Regex => 2,
            StreamRuleType::Greater => 3,
            StreamRuleType::Smaller => 4,
            StreamRuleType::Presence => 5,
            StreamRuleType::Contain => 6,
            StreamRuleType::AlwaysMatch => 7,
        }
    }
}

impl TryFrom<u8> for StreamRuleType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StreamRuleType::Exact),
            2 => Ok(StreamRuleType::Regex),
            3 => Ok(StreamRuleType::Greater),
            4 => Ok(StreamRuleType::Smaller),
            5 => Ok(StreamRuleType::Presence),
            6 => Ok(StreamRuleType::Contain),
            7 => Ok(StreamRuleType::AlwaysMatch),
            other => Err(format!("unknown stream rule type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRule {
    #[serde(default)]
    pub id: String,
    pub stream_id: String,
    pub field: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub rule_type: StreamRuleType,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub description: String,
}

impl StreamRule {
    pub fn new(
        stream_id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            field: field.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}
