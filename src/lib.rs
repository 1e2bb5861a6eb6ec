//! # specsmith
//!
//! **specsmith** is an annotation-driven OpenAPI documentation engine for
//! Rust web services: route metadata in, a deterministic Swagger 2.0
//! document out.
//!
//! ## Overview
//!
//! The crate is the schema introspection and specification-assembly core
//! behind an interactive API browser. Route declaration code attaches
//! summaries, consumed/produced schemas, responses, security requirements
//! and tags to an [`annotations::AnnotationStore`]; data models are declared
//! once as explicit [`schema::Model`] descriptors; and at request time the
//! assembler joins everything with the router's route catalog into one
//! finished document.
//!
//! The HTTP server and router stay external: the engine reads a
//! [`catalog::RouteCatalog`] and hands back a serialized document for the
//! host's specification endpoint. Nothing here blocks on I/O.
//!
//! ## Architecture
//!
//! - **[`schema`]** - canonical schema nodes and the type inference engine
//!   with its cycle-safe definitions registry
//! - **[`annotations`]** - the per-handler metadata store and attachment
//!   surface
//! - **[`catalog`]** - the route catalog boundary and path-template
//!   normalization
//! - **[`assembler`]** - the assembly pass and the serde model of the
//!   document
//! - **[`config`]** - `info`-block configuration from environment or opaque
//!   key/value pairs
//! - **[`service`]** - the cache-and-invalidate wrapper a host embeds
//!
//! ### Assembly Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App as Route declarations
//!     participant Store as AnnotationStore
//!     participant Router as Router (external)
//!     participant Svc as DocService
//!     participant Asm as assembler::assemble
//!     participant Defs as Definitions registry
//!
//!     App->>Store: summary / consumes / produces / response / tag ...
//!     Note over Store: entries accumulate during startup
//!     Router-->>Svc: RouteCatalog (method, path, handler, group)
//!     Svc->>Asm: first request to the spec endpoint
//!     Asm->>Store: lookup(handler) per route
//!     Asm->>Defs: infer every reachable schema (shared registry)
//!     Defs-->>Asm: references + deduplicated definitions
//!     Asm-->>Svc: SpecDocument (info, paths, definitions, tags)
//!     Note over Svc: cached as an immutable Arc; failures never cached
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use specsmith::{
//!     assemble, AnnotationStore, DocConfig, MemoryCatalog, Model, RouteEntry, TypeDescriptor,
//! };
//!
//! let mut store = AnnotationStore::new();
//! store.summary("list_pets", "List all pets");
//! store.produces(
//!     "list_pets",
//!     TypeDescriptor::list(Model::new("Pet").field("name", "string")),
//! );
//!
//! let catalog =
//!     MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/pets", "list_pets").group("pets"));
//!
//! let document = assemble(&catalog, &store, &DocConfig::default()).unwrap();
//! assert!(document.paths.contains_key("/pets"));
//! assert!(document.definitions.contains_key("Pet"));
//! ```
//!
//! ## Guarantees
//!
//! - **Deterministic**: a fixed set of declarations serializes to the same
//!   bytes on every pass.
//! - **Deduplicated**: a model referenced from N routes appears once in
//!   `definitions`; every use site is a `$ref`.
//! - **Cycle-safe**: self- and mutually-referential models resolve to finite
//!   documents.
//! - **Fail-fast**: one broken model declaration fails the whole pass with
//!   the offending route, model and field named; no partial document is
//!   ever served.

pub mod annotations;
pub mod assembler;
pub mod catalog;
pub mod config;
pub mod schema;
pub mod service;

pub use annotations::{
    AnnotationEntry, AnnotationStore, Consumer, ParameterLocation, ResponseAnnotation,
    SecurityRequirement,
};
pub use assembler::{assemble, AssemblyError, SpecDocument};
pub use catalog::{normalize_path_template, MemoryCatalog, PathParam, RouteCatalog, RouteEntry};
pub use config::DocConfig;
pub use schema::{Definitions, FieldBuilder, Model, SchemaError, SchemaNode, TypeDescriptor};
pub use service::DocService;
