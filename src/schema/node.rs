use serde_json::{Map, Value};

use indexmap::IndexMap;

/// Scalar kind of a [`SchemaNode::Primitive`].
///
/// Covers the JSON Schema primitive types plus `file`, which Swagger 2.0
/// accepts for form-data upload parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
    File,
}

impl PrimitiveKind {
    /// The JSON Schema `type` keyword value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::File => "file",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional descriptive metadata carried by every schema node.
///
/// Rendered on top of the node's structural keys; absent fields are omitted
/// entirely so the serialized document never contains nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMeta {
    pub description: Option<String>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    /// Enumerated set of permitted values, rendered as JSON Schema `enum`.
    pub choices: Option<Vec<Value>>,
}

impl NodeMeta {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.example.is_none()
            && self.default.is_none()
            && self.choices.is_none()
    }

    fn overlay(&self, out: &mut Map<String, Value>) {
        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(choices) = &self.choices {
            out.insert("enum".to_string(), Value::Array(choices.clone()));
        }
        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.clone());
        }
        if let Some(example) = &self.example {
            out.insert("example".to_string(), example.clone());
        }
    }
}

/// Canonical in-memory representation of a JSON-Schema-like type.
///
/// Nodes are immutable value types: the inference engine builds them once and
/// the assembler only reads them. Structural equality is used by the
/// definitions registry to detect an already-resolved model.
///
/// An `Object` reachable from more than one place in the document is hoisted
/// into the definitions registry and pointed at through [`SchemaNode::Reference`],
/// never inlined twice. That keeps document size bounded by the number of
/// distinct declared models rather than the number of reference sites.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A scalar type, e.g. `{"type": "string", "format": "date-time"}`.
    Primitive {
        kind: PrimitiveKind,
        format: Option<String>,
        meta: NodeMeta,
    },
    /// A homogeneous array, `{"type": "array", "items": ...}`.
    Array { items: Box<SchemaNode>, meta: NodeMeta },
    /// A named aggregate. Property order is declaration order.
    Object {
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
        meta: NodeMeta,
    },
    /// A pointer into the document's `definitions` section.
    Reference { definition: String, meta: NodeMeta },
}

impl SchemaNode {
    /// Construct a bare primitive node with no format or metadata.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive {
            kind,
            format: None,
            meta: NodeMeta::default(),
        }
    }

    /// Construct a reference to a definition by name.
    pub fn reference(definition: impl Into<String>) -> Self {
        SchemaNode::Reference {
            definition: definition.into(),
            meta: NodeMeta::default(),
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        match self {
            SchemaNode::Primitive { meta, .. }
            | SchemaNode::Array { meta, .. }
            | SchemaNode::Object { meta, .. }
            | SchemaNode::Reference { meta, .. } => meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            SchemaNode::Primitive { meta, .. }
            | SchemaNode::Array { meta, .. }
            | SchemaNode::Object { meta, .. }
            | SchemaNode::Reference { meta, .. } => meta,
        }
    }

    /// Render the node as a JSON-Schema-compatible value.
    ///
    /// The rendering is lossless: every structural component and every piece
    /// of attached metadata appears in the output, and nothing else does.
    /// Object schemas always carry a `required` array, even when empty, so a
    /// document serializes byte-identically across assembly passes.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match self {
            SchemaNode::Primitive { kind, format, meta } => {
                out.insert("type".to_string(), Value::String(kind.as_str().to_string()));
                if let Some(format) = format {
                    out.insert("format".to_string(), Value::String(format.clone()));
                }
                meta.overlay(&mut out);
            }
            SchemaNode::Array { items, meta } => {
                out.insert("type".to_string(), Value::String("array".to_string()));
                out.insert("items".to_string(), items.to_value());
                meta.overlay(&mut out);
            }
            SchemaNode::Object {
                properties,
                required,
                meta,
            } => {
                out.insert("type".to_string(), Value::String("object".to_string()));
                out.insert(
                    "required".to_string(),
                    Value::Array(required.iter().map(|r| Value::String(r.clone())).collect()),
                );
                let mut props = Map::new();
                for (name, node) in properties {
                    props.insert(name.clone(), node.to_value());
                }
                out.insert("properties".to_string(), Value::Object(props));
                meta.overlay(&mut out);
            }
            SchemaNode::Reference { definition, meta } => {
                out.insert(
                    "$ref".to_string(),
                    Value::String(format!("#/definitions/{definition}")),
                );
                meta.overlay(&mut out);
            }
        }
        Value::Object(out)
    }
}
