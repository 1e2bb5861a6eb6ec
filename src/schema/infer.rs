use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::node::{NodeMeta, PrimitiveKind, SchemaNode};

/// Error raised while converting a type descriptor into a schema node.
///
/// Inference errors are never recovered locally: they abort the whole
/// assembly pass so a broken model declaration is caught before the document
/// is ever served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A scalar type token was not recognized.
    UnsupportedType {
        /// The offending token
        token: String,
    },
    /// A field's descriptor could not be resolved to any schema node.
    Inference {
        /// Owning `(model, field)` pair, when the failure happened inside a
        /// model declaration
        owner: Option<(String, String)>,
        detail: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnsupportedType { token } => {
                write!(
                    f,
                    "unsupported scalar type token '{token}' (expected one of: string, integer, \
                     number, boolean, date, datetime, file)"
                )
            }
            SchemaError::Inference {
                owner: Some((model, field)),
                detail,
            } => {
                write!(
                    f,
                    "cannot infer a schema for field '{field}' of model '{model}': {detail}"
                )
            }
            SchemaError::Inference { owner: None, detail } => {
                write!(f, "cannot infer a schema: {detail}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// A named, ordered aggregate of field declarations.
///
/// This is the explicit registration step that replaces attribute
/// introspection: each field is a `(name, descriptor)` pair, and declaration
/// order becomes property order in the rendered schema.
///
/// ```
/// use specsmith::schema::{FieldBuilder, Model};
///
/// let car = Model::new("Car")
///     .field("make", "string")
///     .field("model", "string")
///     .field("year", FieldBuilder::new("integer").required(false));
/// assert_eq!(car.name(), "Car");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    fields: Vec<(String, TypeDescriptor)>,
    description: Option<String>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Model {
            name: name.into(),
            fields: Vec::new(),
            description: None,
        }
    }

    /// Append a field. Declaration order is preserved.
    pub fn field(mut self, name: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.fields.push((name.into(), descriptor.into()));
        self
    }

    /// Attach a description rendered on the model's object schema.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, TypeDescriptor)] {
        &self.fields
    }
}

/// Descriptive field builder: an underlying descriptor plus documentation
/// metadata and a `required` flag.
///
/// `required` defaults to `true`; call [`FieldBuilder::required`] with `false`
/// to drop the field from the owning object's required set.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBuilder {
    kind: TypeDescriptor,
    description: Option<String>,
    example: Option<Value>,
    default: Option<Value>,
    choices: Option<Vec<Value>>,
    required: bool,
}

impl FieldBuilder {
    pub fn new(kind: impl Into<TypeDescriptor>) -> Self {
        FieldBuilder {
            kind: kind.into(),
            description: None,
            example: None,
            default: None,
            choices: None,
            required: true,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn example(mut self, value: Value) -> Self {
        self.example = Some(value);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn choices(mut self, values: Vec<Value>) -> Self {
        self.choices = Some(values);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A source-level type descriptor: the input language of the inference
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A built-in scalar type token (`"string"`, `"integer"`, ...).
    /// Unrecognized tokens fail inference with
    /// [`SchemaError::UnsupportedType`].
    Scalar(String),
    /// A descriptive field builder wrapping another descriptor.
    Field(Box<FieldBuilder>),
    /// "Array of" the inner descriptor.
    List(Box<TypeDescriptor>),
    /// An inline model declaration.
    Model(Arc<Model>),
    /// A by-name reference to a registered model. This is how
    /// self-referential and mutually-referential model graphs are expressed.
    Named(String),
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::Scalar("string".to_string())
    }

    pub fn integer() -> Self {
        TypeDescriptor::Scalar("integer".to_string())
    }

    pub fn number() -> Self {
        TypeDescriptor::Scalar("number".to_string())
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Scalar("boolean".to_string())
    }

    pub fn date() -> Self {
        TypeDescriptor::Scalar("date".to_string())
    }

    pub fn datetime() -> Self {
        TypeDescriptor::Scalar("datetime".to_string())
    }

    pub fn file() -> Self {
        TypeDescriptor::Scalar("file".to_string())
    }

    /// An arbitrary scalar token, validated at inference time.
    pub fn scalar(token: impl Into<String>) -> Self {
        TypeDescriptor::Scalar(token.into())
    }

    /// "Array of" marker.
    pub fn list(inner: impl Into<TypeDescriptor>) -> Self {
        TypeDescriptor::List(Box::new(inner.into()))
    }

    /// Reference a registered model by name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named(name.into())
    }
}

impl From<&str> for TypeDescriptor {
    fn from(token: &str) -> Self {
        TypeDescriptor::Scalar(token.to_string())
    }
}

impl From<Model> for TypeDescriptor {
    fn from(model: Model) -> Self {
        TypeDescriptor::Model(Arc::new(model))
    }
}

impl From<Arc<Model>> for TypeDescriptor {
    fn from(model: Arc<Model>) -> Self {
        TypeDescriptor::Model(model)
    }
}

impl From<FieldBuilder> for TypeDescriptor {
    fn from(builder: FieldBuilder) -> Self {
        TypeDescriptor::Field(Box::new(builder))
    }
}

fn scalar_node(token: &str) -> Result<SchemaNode, SchemaError> {
    let (kind, format) = match token {
        "string" | "str" => (PrimitiveKind::String, None),
        "integer" | "int" => (PrimitiveKind::Integer, Some("int64")),
        "number" | "float" | "double" => (PrimitiveKind::Number, Some("double")),
        "boolean" | "bool" => (PrimitiveKind::Boolean, None),
        "date" => (PrimitiveKind::String, Some("date")),
        "datetime" | "date-time" => (PrimitiveKind::String, Some("date-time")),
        "file" => (PrimitiveKind::File, None),
        _ => {
            return Err(SchemaError::UnsupportedType {
                token: token.to_string(),
            })
        }
    };
    Ok(SchemaNode::Primitive {
        kind,
        format: format.map(str::to_string),
        meta: NodeMeta::default(),
    })
}

/// The definitions registry: model name → resolved object schema, plus the
/// in-progress set that makes recursion over cyclic model graphs terminate.
///
/// One registry is shared across a whole assembly pass so cross-route model
/// reuse deduplicates: the first inference of a model installs its object
/// schema, every later sighting returns a [`SchemaNode::Reference`] without
/// re-deriving anything.
#[derive(Debug, Default)]
pub struct Definitions {
    resolved: IndexMap<String, SchemaNode>,
    in_progress: HashSet<String>,
    models: HashMap<String, Arc<Model>>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry's model catalog, used to resolve
    /// [`TypeDescriptor::Named`] references.
    pub fn with_models(models: &HashMap<String, Arc<Model>>) -> Self {
        Definitions {
            models: models.clone(),
            ..Self::default()
        }
    }

    /// Register a model so by-name references to it resolve.
    pub fn register(&mut self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        self.models
            .insert(model.name().to_string(), Arc::clone(&model));
        model
    }

    /// Convert a type descriptor into a schema node.
    ///
    /// Model descriptors resolve through the registry: the returned node is a
    /// [`SchemaNode::Reference`] and the object schema lands in
    /// [`Definitions::resolved`].
    pub fn infer(&mut self, descriptor: &TypeDescriptor) -> Result<SchemaNode, SchemaError> {
        self.infer_in(descriptor, None)
    }

    fn infer_in(
        &mut self,
        descriptor: &TypeDescriptor,
        owner: Option<(&str, &str)>,
    ) -> Result<SchemaNode, SchemaError> {
        match descriptor {
            TypeDescriptor::Scalar(token) => scalar_node(token),
            TypeDescriptor::Field(builder) => {
                let mut node = self.infer_in(&builder.kind, owner)?;
                let meta = node.meta_mut();
                if builder.description.is_some() {
                    meta.description = builder.description.clone();
                }
                if builder.example.is_some() {
                    meta.example = builder.example.clone();
                }
                if builder.default.is_some() {
                    meta.default = builder.default.clone();
                }
                if builder.choices.is_some() {
                    meta.choices = builder.choices.clone();
                }
                Ok(node)
            }
            TypeDescriptor::List(inner) => Ok(SchemaNode::Array {
                items: Box::new(self.infer_in(inner, owner)?),
                meta: NodeMeta::default(),
            }),
            TypeDescriptor::Model(model) => self.infer_model(model),
            TypeDescriptor::Named(name) => {
                if self.resolved.contains_key(name) || self.in_progress.contains(name) {
                    return Ok(SchemaNode::reference(name.clone()));
                }
                match self.models.get(name).cloned() {
                    Some(model) => self.infer_model(&model),
                    None => Err(SchemaError::Inference {
                        owner: owner.map(|(m, f)| (m.to_string(), f.to_string())),
                        detail: format!("model '{name}' is not registered"),
                    }),
                }
            }
        }
    }

    fn infer_model(&mut self, model: &Arc<Model>) -> Result<SchemaNode, SchemaError> {
        let name = model.name().to_string();
        // Cycle-breaking step: a model that is resolved or currently being
        // resolved is answered with a reference immediately.
        if self.resolved.contains_key(&name) || self.in_progress.contains(&name) {
            return Ok(SchemaNode::reference(name));
        }

        debug!(model = %name, "resolving model definition");
        self.in_progress.insert(name.clone());
        self.models
            .entry(name.clone())
            .or_insert_with(|| Arc::clone(model));

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for (field_name, field_descriptor) in model.fields() {
            let node = self
                .infer_in(field_descriptor, Some((name.as_str(), field_name.as_str())))
                .map_err(|err| match err {
                    SchemaError::UnsupportedType { token } => SchemaError::Inference {
                        owner: Some((name.clone(), field_name.clone())),
                        detail: format!("unsupported scalar type token '{token}'"),
                    },
                    other => other,
                })?;
            let field_required = match field_descriptor {
                TypeDescriptor::Field(builder) => builder.required,
                _ => true,
            };
            if field_required {
                required.push(field_name.clone());
            }
            properties.insert(field_name.clone(), node);
        }

        let object = SchemaNode::Object {
            properties,
            required,
            meta: NodeMeta {
                description: model.description.clone(),
                ..NodeMeta::default()
            },
        };
        self.in_progress.remove(&name);
        self.resolved.insert(name.clone(), object);
        Ok(SchemaNode::reference(name))
    }

    /// Resolved object schema for a definition name, if already inferred.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.resolved.get(name)
    }

    /// All resolved definitions, in first-inference order.
    pub fn resolved(&self) -> &IndexMap<String, SchemaNode> {
        &self.resolved
    }

    /// Render every resolved definition for the document's `definitions`
    /// section.
    pub fn render(&self) -> IndexMap<String, Value> {
        self.resolved
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Drop all inference state and the model catalog.
    pub fn reset(&mut self) {
        self.resolved.clear();
        self.in_progress.clear();
        self.models.clear();
    }
}
