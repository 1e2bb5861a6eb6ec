//! # Annotation Store
//!
//! The associative store of per-route documentation metadata. Route
//! declaration code attaches fields to a handler's entry through explicit
//! calls (`summary`, `consumes`, `response`, ...) keyed by the handler's
//! stable identity; the assembler reads the accumulated entries when the
//! specification document is built.
//!
//! Entries are created lazily on first attachment and accumulate
//! independently of route registration order. Each scalar field is
//! last-write-wins; `consumes`, `response`, `security` and `tag` accumulate
//! (with per-key replacement where a key exists, such as a response status
//! code). The store is written during application startup and then only
//! read, so hosts wrap it in an `RwLock` and never contend after boot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{Model, TypeDescriptor};

/// Where a consumed schema is read from in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParameterLocation {
    /// The Swagger `in` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Body => "body",
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `consumes` attachment: a schema, the request location it is read
/// from, an optional explicit parameter name and a required flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Consumer {
    pub descriptor: TypeDescriptor,
    pub location: ParameterLocation,
    pub name: Option<String>,
    pub required: bool,
}

impl Consumer {
    pub fn new(descriptor: impl Into<TypeDescriptor>, location: ParameterLocation) -> Self {
        Consumer {
            descriptor: descriptor.into(),
            location,
            name: None,
            required: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// One documented response: description plus optional body schema and
/// example payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseAnnotation {
    pub description: String,
    pub schema: Option<TypeDescriptor>,
    pub examples: Option<Value>,
}

impl ResponseAnnotation {
    pub fn new(description: impl Into<String>) -> Self {
        ResponseAnnotation {
            description: description.into(),
            schema: None,
            examples: None,
        }
    }

    pub fn schema(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.schema = Some(descriptor.into());
        self
    }

    pub fn examples(mut self, examples: Value) -> Self {
        self.examples = Some(examples);
        self
    }
}

/// One operation-level security requirement: a scheme name from the
/// document's `securityDefinitions` plus the requested scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub scheme: String,
    pub scopes: Vec<String>,
}

/// The per-handler bag of documentation metadata.
///
/// Every field has an empty/absent default, so a handler that was never
/// annotated still renders as a legal (if sparse) operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationEntry {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub consumes: Vec<Consumer>,
    pub produces: Option<TypeDescriptor>,
    pub responses: IndexMap<u16, ResponseAnnotation>,
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<String>,
    pub excluded: bool,
    pub deprecated: bool,
    /// Request content types, overriding the configured default.
    pub consumes_content_types: Option<Vec<String>>,
    /// Response content types, overriding the configured default.
    pub produces_content_types: Option<Vec<String>>,
}

/// Store of [`AnnotationEntry`] values keyed by handler identity, plus the
/// excluded-static-paths set and the catalog of registered models.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    entries: HashMap<String, AnnotationEntry>,
    excluded_paths: HashSet<String>,
    models: HashMap<String, Arc<Model>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, handler: &str) -> &mut AnnotationEntry {
        self.entries.entry(handler.to_string()).or_default()
    }

    /// Attach a one-line summary. Last write wins.
    pub fn summary(&mut self, handler: &str, text: impl Into<String>) {
        self.entry_mut(handler).summary = Some(text.into());
    }

    /// Attach a longer description. Last write wins.
    pub fn description(&mut self, handler: &str, text: impl Into<String>) {
        self.entry_mut(handler).description = Some(text.into());
    }

    /// Override the generated `operationId`. Last write wins.
    pub fn operation_id(&mut self, handler: &str, id: impl Into<String>) {
        self.entry_mut(handler).operation_id = Some(id.into());
    }

    /// Attach a consumed schema (request parameter source).
    pub fn consumes(&mut self, handler: &str, consumer: Consumer) {
        self.entry_mut(handler).consumes.push(consumer);
    }

    /// Attach the produced (success body) schema. Last write wins.
    pub fn produces(&mut self, handler: &str, descriptor: impl Into<TypeDescriptor>) {
        self.entry_mut(handler).produces = Some(descriptor.into());
    }

    /// Document a response for a status code. Last write per code wins.
    pub fn response(&mut self, handler: &str, code: u16, response: ResponseAnnotation) {
        self.entry_mut(handler).responses.insert(code, response);
    }

    /// Require a security scheme. Re-attaching the same scheme replaces its
    /// scope list.
    pub fn security(&mut self, handler: &str, scheme: impl Into<String>, scopes: Vec<String>) {
        let scheme = scheme.into();
        let entry = self.entry_mut(handler);
        if let Some(existing) = entry.security.iter_mut().find(|r| r.scheme == scheme) {
            existing.scopes = scopes;
        } else {
            entry.security.push(SecurityRequirement { scheme, scopes });
        }
    }

    /// Add a tag. Duplicates are ignored; order of first attachment is kept.
    pub fn tag(&mut self, handler: &str, name: impl Into<String>) {
        let name = name.into();
        let entry = self.entry_mut(handler);
        if !entry.tags.contains(&name) {
            entry.tags.push(name);
        }
    }

    /// Mark (or unmark) the handler as excluded from the document.
    pub fn exclude(&mut self, handler: &str, excluded: bool) {
        self.entry_mut(handler).excluded = excluded;
    }

    /// Mark (or unmark) the operation as deprecated.
    pub fn deprecated(&mut self, handler: &str, deprecated: bool) {
        self.entry_mut(handler).deprecated = deprecated;
    }

    /// Override request content types for this handler.
    pub fn consumes_content_types(&mut self, handler: &str, types: Vec<String>) {
        self.entry_mut(handler).consumes_content_types = Some(types);
    }

    /// Override response content types for this handler.
    pub fn produces_content_types(&mut self, handler: &str, types: Vec<String>) {
        self.entry_mut(handler).produces_content_types = Some(types);
    }

    /// Register a model so [`TypeDescriptor::Named`] references to it
    /// resolve during assembly.
    pub fn register_model(&mut self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        self.models
            .insert(model.name().to_string(), Arc::clone(&model));
        model
    }

    pub fn models(&self) -> &HashMap<String, Arc<Model>> {
        &self.models
    }

    /// Look up a handler's entry. `None` means the handler was never
    /// annotated, which is legal: the assembler renders it with defaults.
    pub fn lookup(&self, handler: &str) -> Option<&AnnotationEntry> {
        self.entries.get(handler)
    }

    /// Exclude a static asset path from the document (exact path match).
    pub fn exclude_static_path(&mut self, path: impl Into<String>) {
        self.excluded_paths.insert(path.into());
    }

    /// Whether a route should be left out of the document: its handler was
    /// excluded explicitly, or its path is in the excluded-static-paths set.
    pub fn is_excluded(&self, handler: &str, path: &str) -> bool {
        if self.excluded_paths.contains(path) {
            return true;
        }
        self.entries
            .get(handler)
            .map(|entry| entry.excluded)
            .unwrap_or(false)
    }

    /// Drop every entry, excluded path and registered model.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.excluded_paths.clear();
        self.models.clear();
    }
}
