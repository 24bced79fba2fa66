//! Type-specific input attribute shapes.
//!
//! Each known input type has a strict shape: unknown fields are rejected so a
//! typo in a listener setting surfaces as a validation error instead of being
//! dropped. Types without a registered shape are carried as an untyped bag.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SYSLOG_UDP: &str = "org.graylog2.inputs.syslog.udp.SyslogUDPInput";
pub const SYSLOG_TCP: &str = "org.graylog2.inputs.syslog.tcp.SyslogTCPInput";
pub const GELF_UDP: &str = "org.graylog2.inputs.gelf.udp.GELFUDPInput";
pub const GELF_HTTP: &str = "org.graylog2.inputs.gelf.http.GELFHttpInput";
pub const BEATS: &str = "org.graylog.plugins.beats.Beats2Input";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyslogUdpAttributes {
    pub bind_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_rdns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_override_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_full_message: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_structured_data: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyslogTcpAttributes {
    pub bind_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_rdns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_full_message: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_message_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_null_delimiter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_keepalive: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GelfUdpAttributes {
    pub bind_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decompress_size_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GelfHttpAttributes {
    pub bind_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decompress_size_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_writer_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeatsAttributes {
    pub bind_address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_beats_prefix: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_keepalive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_source: Option<String>,
}

/// Free-form attributes for input types without a registered shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntypedAttributes {
    pub input_type: String,
    pub fields: Map<String, Value>,
}

/// Attribute bag of an input, discriminated by the input's `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAttributes {
    SyslogUdp(SyslogUdpAttributes),
    SyslogTcp(SyslogTcpAttributes),
    GelfUdp(GelfUdpAttributes),
    GelfHttp(GelfHttpAttributes),
    Beats(BeatsAttributes),
    Untyped(UntypedAttributes),
}

impl InputAttributes {
    /// The type identifier this bag reports for itself.
    pub fn input_type(&self) -> &str {
        match self {
            InputAttributes::SyslogUdp(_) => SYSLOG_UDP,
            InputAttributes::SyslogTcp(_) => SYSLOG_TCP,
            InputAttributes::GelfUdp(_) => GELF_UDP,
            InputAttributes::GelfHttp(_) => GELF_HTTP,
            InputAttributes::Beats(_) => BEATS,
            InputAttributes::Untyped(untyped) => &untyped.input_type,
        }
    }

    /// Flatten the bag into JSON object fields.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match self {
            InputAttributes::SyslogUdp(attrs) => object_of(attrs),
            InputAttributes::SyslogTcp(attrs) => object_of(attrs),
            InputAttributes::GelfUdp(attrs) => object_of(attrs),
            InputAttributes::GelfHttp(attrs) => object_of(attrs),
            InputAttributes::Beats(attrs) => object_of(attrs),
            InputAttributes::Untyped(untyped) => Ok(untyped.fields.clone()),
        }
    }
}

fn object_of<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(serde::ser::Error::custom(
            "input attributes must encode as an object",
        )),
    }
}
