use std::collections::HashSet;
use std::fmt;

use http::Method;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::document::{Contact, Info, Operation, Parameter, Response, SpecDocument, Tag};
use crate::annotations::{AnnotationEntry, AnnotationStore, ParameterLocation};
use crate::catalog::{normalize_path_template, PathParam, RouteCatalog, RouteEntry};
use crate::config::DocConfig;
use crate::schema::{Definitions, SchemaError, SchemaNode, TypeDescriptor};

/// Description used when a route documents no responses of its own.
const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful Operation";

/// A schema inference failure wrapped with the route it surfaced on.
///
/// Assembly is all-or-nothing: one broken model declaration fails the whole
/// pass, so the error names the route a maintainer has to look at.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyError {
    pub method: String,
    pub path: String,
    pub handler: String,
    pub source: SchemaError,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to assemble specification entry for {} {} (handler '{}'): {}",
            self.method, self.path, self.handler, self.source
        )
    }
}

impl std::error::Error for AssemblyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Join the route catalog, annotation store and configuration into one
/// specification document.
///
/// The pass walks every catalog entry, skips excluded routes, resolves each
/// handler's annotation entry (absent entries render with defaults), runs
/// type inference over every reachable schema through one shared
/// [`Definitions`] registry, and emits the finished document. Repeated
/// assembly of the same inputs produces an identical document.
///
/// # Errors
///
/// Returns [`AssemblyError`] on the first schema inference failure. No
/// partial document is ever returned.
pub fn assemble(
    catalog: &dyn RouteCatalog,
    store: &AnnotationStore,
    config: &DocConfig,
) -> Result<SpecDocument, AssemblyError> {
    let mut definitions = Definitions::with_models(store.models());
    let excluded_static: HashSet<String> = catalog.static_paths().into_iter().collect();
    let default_entry = AnnotationEntry::default();

    let routes = catalog.routes();
    debug!(route_count = routes.len(), "assembling specification document");

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut paths: IndexMap<String, IndexMap<String, Operation>> = IndexMap::new();
    let mut tag_names: Vec<String> = Vec::new();

    for route in &routes {
        if route.method == Method::OPTIONS {
            continue;
        }

        let (path, path_params) = normalize_path_template(&route.path_template);

        if excluded_static.contains(&path)
            || excluded_static.contains(route.path_template.as_str())
            || store.is_excluded(&route.handler, &path)
        {
            debug!(
                method = %route.method,
                path = %path,
                handler = %route.handler,
                "route excluded from documentation"
            );
            continue;
        }

        let method_key = route.method.as_str().to_ascii_lowercase();
        if !seen.insert((method_key.clone(), path.clone())) {
            warn!(
                method = %route.method,
                path = %path,
                handler = %route.handler,
                "duplicate route entry skipped"
            );
            continue;
        }

        let entry = store.lookup(&route.handler).unwrap_or(&default_entry);

        let tags = operation_tags(route, entry, config);
        for tag in &tags {
            if !tag_names.contains(tag) {
                tag_names.push(tag.clone());
            }
        }

        let operation = build_operation(route, entry, tags, &path_params, &mut definitions, config)
            .map_err(|source| AssemblyError {
                method: route.method.to_string(),
                path: path.clone(),
                handler: route.handler.clone(),
                source,
            })?;

        paths.entry(path).or_default().insert(method_key, operation);
    }

    debug!(
        path_count = paths.len(),
        definition_count = definitions.len(),
        tag_count = tag_names.len(),
        "specification document assembled"
    );

    Ok(SpecDocument {
        swagger: "2.0".to_string(),
        info: Info {
            title: config.title.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
            terms_of_service: config.terms_of_service.clone(),
            contact: config
                .contact_email
                .clone()
                .map(|email| Contact { email }),
        },
        host: config.host.clone(),
        base_path: config.base_path.clone(),
        schemes: config.schemes.clone(),
        tags: tag_names.into_iter().map(|name| Tag { name }).collect(),
        paths,
        definitions: definitions.render(),
        security_definitions: config.security_definitions.clone(),
    })
}

/// Explicit route tags win over the group-derived tag, unless the host
/// configured group precedence.
fn operation_tags(route: &RouteEntry, entry: &AnnotationEntry, config: &DocConfig) -> Vec<String> {
    match (&route.group, entry.tags.is_empty()) {
        (Some(group), true) => vec![group.clone()],
        (Some(group), false) => {
            if config.explicit_tags_win {
                entry.tags.clone()
            } else {
                vec![group.clone()]
            }
        }
        (None, _) => entry.tags.clone(),
    }
}

fn rendered_map(node: &SchemaNode) -> Map<String, Value> {
    match node.to_value() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Resolve a node to the object schema it denotes, following one level of
/// reference into the registry. Used to flatten non-body consumed objects
/// into individual parameters.
fn object_schema(definitions: &Definitions, node: &SchemaNode) -> Option<SchemaNode> {
    match node {
        SchemaNode::Object { .. } => Some(node.clone()),
        SchemaNode::Reference { definition, .. } => definitions
            .get(definition)
            .filter(|resolved| matches!(resolved, SchemaNode::Object { .. }))
            .cloned(),
        _ => None,
    }
}

fn build_operation(
    route: &RouteEntry,
    entry: &AnnotationEntry,
    tags: Vec<String>,
    path_params: &[PathParam],
    definitions: &mut Definitions,
    config: &DocConfig,
) -> Result<Operation, SchemaError> {
    let mut parameters: Vec<Parameter> = Vec::new();

    // Parameters named in the path template are always documented, typed
    // from the template's converter suffix.
    for param in path_params {
        let node = definitions.infer(&TypeDescriptor::scalar(&param.token))?;
        parameters.push(Parameter {
            name: param.name.clone(),
            location: ParameterLocation::Path.to_string(),
            required: true,
            schema: None,
            inline: rendered_map(&node),
        });
    }

    for consumer in &entry.consumes {
        let node = definitions.infer(&consumer.descriptor)?;
        match consumer.location {
            ParameterLocation::Body => {
                parameters.push(Parameter {
                    name: consumer
                        .name
                        .clone()
                        .unwrap_or_else(|| "body".to_string()),
                    location: ParameterLocation::Body.to_string(),
                    required: consumer.required,
                    schema: Some(node.to_value()),
                    inline: Map::new(),
                });
            }
            location => {
                if let Some(SchemaNode::Object { properties, .. }) =
                    object_schema(definitions, &node)
                {
                    // An object consumed outside the body flattens into one
                    // named parameter per top-level property.
                    for (name, property) in &properties {
                        parameters.push(Parameter {
                            name: name.clone(),
                            location: location.to_string(),
                            required: consumer.required,
                            schema: None,
                            inline: rendered_map(property),
                        });
                    }
                } else {
                    parameters.push(Parameter {
                        name: consumer
                            .name
                            .clone()
                            .unwrap_or_else(|| location.to_string()),
                        location: location.to_string(),
                        required: consumer.required,
                        schema: None,
                        inline: rendered_map(&node),
                    });
                }
            }
        }
    }

    let produces_schema = match &entry.produces {
        Some(descriptor) => Some(definitions.infer(descriptor)?.to_value()),
        None => None,
    };

    // Every endpoint documents at least one response.
    let mut responses: IndexMap<String, Response> = IndexMap::new();
    if entry.responses.is_empty() {
        responses.insert(
            "200".to_string(),
            Response {
                description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
                schema: produces_schema,
                examples: None,
            },
        );
    } else {
        for (code, annotation) in &entry.responses {
            let schema = match &annotation.schema {
                Some(descriptor) => Some(definitions.infer(descriptor)?.to_value()),
                None if *code == 200 => produces_schema.clone(),
                None => None,
            };
            responses.insert(
                code.to_string(),
                Response {
                    description: annotation.description.clone(),
                    schema,
                    examples: annotation.examples.clone(),
                },
            );
        }
    }

    let security = entry
        .security
        .iter()
        .map(|requirement| {
            IndexMap::from([(requirement.scheme.clone(), requirement.scopes.clone())])
        })
        .collect();

    Ok(Operation {
        operation_id: entry
            .operation_id
            .clone()
            .unwrap_or_else(|| route.handler.clone()),
        summary: entry.summary.clone(),
        description: entry.description.clone(),
        consumes: entry
            .consumes_content_types
            .clone()
            .unwrap_or_else(|| config.consumes_content_types.clone()),
        produces: entry
            .produces_content_types
            .clone()
            .unwrap_or_else(|| config.produces_content_types.clone()),
        tags,
        parameters,
        responses,
        security,
        deprecated: entry.deprecated,
    })
}
