//! Serde model of the assembled specification document.
//!
//! The shapes here mirror the Swagger 2.0 object layout: `info`, `paths`
//! keyed by template then lowercased method, `definitions`,
//! `securityDefinitions` and `tags`. All maps are insertion-ordered and
//! every absent field is skipped during serialization, so a fixed set of
//! inputs always serializes to the same bytes and the output never
//! contains nulls.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// One operation parameter.
///
/// Non-body parameters inline their schema keys (`type`, `format`,
/// `description`, ...) next to `name`/`in`/`required`, the way Swagger 2.0
/// expects; body parameters carry the rendered schema under `schema`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(flatten)]
    pub inline: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
}

/// The final artifact served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecDocument {
    pub swagger: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub paths: IndexMap<String, IndexMap<String, Operation>>,
    pub definitions: IndexMap<String, Value>,
    #[serde(rename = "securityDefinitions", skip_serializing_if = "Option::is_none")]
    pub security_definitions: Option<Value>,
}

impl SpecDocument {
    /// Render as a `serde_json::Value` tree.
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Render as a JSON byte body for the specification read endpoint.
    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Render as YAML, for hosts that serve both encodings.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
