#![allow(dead_code)]

use http::Method;
use specsmith::{AnnotationStore, FieldBuilder, MemoryCatalog, Model, RouteEntry, TypeDescriptor};

/// Install a test subscriber so `RUST_LOG` surfaces assembly tracing.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Catalog with a single grouped route: `GET /garage` → `get_garage`.
pub fn garage_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .route(RouteEntry::new(Method::GET, "/garage", "get_garage").group("garage"))
}

/// Annotate `get_garage` with the nested Garage/Car model pair.
pub fn annotate_garage(store: &mut AnnotationStore) {
    let car = Model::new("Car")
        .field("make", "string")
        .field("model", "string")
        .field("year", FieldBuilder::new("integer").required(false));
    let garage = Model::new("Garage")
        .field("spaces", "integer")
        .field("cars", TypeDescriptor::list(car));

    store.summary("get_garage", "Current garage contents");
    store.produces("get_garage", garage);
}
