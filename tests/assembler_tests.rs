use http::Method;
use serde_json::json;
use specsmith::{
    assemble, AnnotationStore, Consumer, DocConfig, MemoryCatalog, Model, ParameterLocation,
    ResponseAnnotation, RouteEntry, TypeDescriptor,
};

mod common;

#[test]
fn test_garage_scenario() {
    common::init_tracing();
    let mut store = AnnotationStore::new();
    common::annotate_garage(&mut store);

    let doc = assemble(&common::garage_catalog(), &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    // both models land in definitions, exactly once
    assert!(value["definitions"]["Car"].is_object());
    assert!(value["definitions"]["Garage"].is_object());
    assert_eq!(value["definitions"].as_object().unwrap().len(), 2);

    // the nested list holds a reference, not an inlined copy
    assert_eq!(
        value["definitions"]["Garage"]["properties"]["cars"],
        json!({ "type": "array", "items": { "$ref": "#/definitions/Car" } })
    );

    // required defaulting: the builder field with required(false) is left out
    assert_eq!(value["definitions"]["Car"]["required"], json!(["make", "model"]));

    // produces becomes the default 200 response schema
    let response = &value["paths"]["/garage"]["get"]["responses"]["200"];
    assert_eq!(response["description"], "Successful Operation");
    assert_eq!(response["schema"], json!({ "$ref": "#/definitions/Garage" }));
}

#[test]
fn test_shared_body_model_is_defined_once() {
    let mut store = AnnotationStore::new();
    let user = store.register_model(Model::new("User").field("name", "string").field("email", "string"));

    store.consumes(
        "create_user",
        Consumer::new(user, ParameterLocation::Body).required(true),
    );
    store.consumes(
        "update_user",
        Consumer::new(TypeDescriptor::named("User"), ParameterLocation::Body).required(true),
    );

    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::POST, "/users", "create_user"))
        .route(RouteEntry::new(Method::PUT, "/users/{id}", "update_user"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    assert_eq!(value["definitions"].as_object().unwrap().len(), 1);
    let expected = json!({
        "name": "body",
        "in": "body",
        "required": true,
        "schema": { "$ref": "#/definitions/User" }
    });
    assert_eq!(value["paths"]["/users"]["post"]["parameters"][0], expected);
    assert_eq!(value["paths"]["/users/{id}"]["put"]["parameters"][1], expected);
}

#[test]
fn test_unannotated_route_renders_with_defaults() {
    let store = AnnotationStore::new();
    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/healthz", "healthz"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    let op = &value["paths"]["/healthz"]["get"];
    assert_eq!(op["operationId"], "healthz");
    assert_eq!(op["consumes"], json!(["application/json"]));
    assert_eq!(op["produces"], json!(["application/json"]));
    assert_eq!(
        op["responses"],
        json!({ "200": { "description": "Successful Operation" } })
    );
}

#[test]
fn test_excluded_routes_and_static_paths_are_absent() {
    let mut store = AnnotationStore::new();
    store.exclude("internal_metrics", true);
    store.exclude_static_path("/favicon.ico");

    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::GET, "/metrics", "internal_metrics"))
        .route(RouteEntry::new(Method::GET, "/favicon.ico", "favicon"))
        .route(RouteEntry::new(Method::GET, "/pets", "list_pets"))
        .static_path("/swagger")
        .route(RouteEntry::new(Method::GET, "/swagger", "swagger_ui"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();

    assert!(doc.paths.contains_key("/pets"));
    assert!(!doc.paths.contains_key("/metrics"));
    assert!(!doc.paths.contains_key("/favicon.ico"));
    assert!(!doc.paths.contains_key("/swagger"));
}

#[test]
fn test_explicit_tags_override_group() {
    let mut store = AnnotationStore::new();
    store.tag("list_pets", "animals");

    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::GET, "/pets", "list_pets").group("pets"))
        .route(RouteEntry::new(Method::GET, "/stores", "list_stores").group("stores"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    assert_eq!(value["paths"]["/pets"]["get"]["tags"], json!(["animals"]));
    assert_eq!(value["paths"]["/stores"]["get"]["tags"], json!(["stores"]));
    // top-level tag set is ordered by first use
    assert_eq!(value["tags"], json!([{ "name": "animals" }, { "name": "stores" }]));
}

#[test]
fn test_group_precedence_is_overridable() {
    let mut store = AnnotationStore::new();
    store.tag("list_pets", "animals");

    let catalog =
        MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/pets", "list_pets").group("pets"));

    let config = DocConfig {
        explicit_tags_win: false,
        ..DocConfig::default()
    };
    let doc = assemble(&catalog, &store, &config).unwrap();
    let value = doc.to_json_value().unwrap();
    assert_eq!(value["paths"]["/pets"]["get"]["tags"], json!(["pets"]));
}

#[test]
fn test_path_parameters_typed_from_template() {
    let store = AnnotationStore::new();
    let catalog = MemoryCatalog::new().route(RouteEntry::new(
        Method::GET,
        "/users/<user_id:int>/posts/<slug>",
        "get_user_post",
    ));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    let params = &value["paths"]["/users/{user_id}/posts/{slug}"]["get"]["parameters"];
    assert_eq!(
        params[0],
        json!({
            "name": "user_id",
            "in": "path",
            "required": true,
            "type": "integer",
            "format": "int64"
        })
    );
    assert_eq!(
        params[1],
        json!({ "name": "slug", "in": "path", "required": true, "type": "string" })
    );
}

#[test]
fn test_query_object_flattens_into_named_parameters() {
    let mut store = AnnotationStore::new();
    let paging = Model::new("Paging")
        .field("limit", "integer")
        .field("offset", "integer");
    store.consumes("list_pets", Consumer::new(paging, ParameterLocation::Query));

    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/pets", "list_pets"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    let params = value["paths"]["/pets"]["get"]["parameters"]
        .as_array()
        .unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(
        params[0],
        json!({
            "name": "limit",
            "in": "query",
            "required": false,
            "type": "integer",
            "format": "int64"
        })
    );
    assert_eq!(params[1]["name"], "offset");
}

#[test]
fn test_scalar_query_parameter_uses_explicit_name() {
    let mut store = AnnotationStore::new();
    store.consumes(
        "search",
        Consumer::new("string", ParameterLocation::Query)
            .named("q")
            .required(true),
    );

    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/search", "search"));
    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    assert_eq!(
        value["paths"]["/search"]["get"]["parameters"][0],
        json!({ "name": "q", "in": "query", "required": true, "type": "string" })
    );
}

#[test]
fn test_security_and_definitions_passthrough() {
    let mut store = AnnotationStore::new();
    store.security("admin_settings", "oauth2", vec!["admin:read".to_string()]);

    let catalog =
        MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/admin", "admin_settings"));

    let config = DocConfig::from_pairs([(
        "API_SECURITY_DEFINITIONS",
        r#"{"oauth2": {"type": "oauth2", "flow": "implicit", "authorizationUrl": "https://auth.example.com"}}"#,
    )])
    .unwrap();

    let doc = assemble(&catalog, &store, &config).unwrap();
    let value = doc.to_json_value().unwrap();

    assert_eq!(
        value["paths"]["/admin"]["get"]["security"],
        json!([{ "oauth2": ["admin:read"] }])
    );
    assert_eq!(value["securityDefinitions"]["oauth2"]["type"], "oauth2");
}

#[test]
fn test_declared_responses_and_deprecation() {
    let mut store = AnnotationStore::new();
    store.deprecated("old_lookup", true);
    store.produces("old_lookup", Model::new("LookupResult").field("hit", "boolean"));
    store.response("old_lookup", 200, ResponseAnnotation::new("lookup result"));
    store.response(
        "old_lookup",
        404,
        ResponseAnnotation::new("nothing matched").examples(json!({ "error": "not found" })),
    );

    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/lookup", "old_lookup"));
    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    let op = &value["paths"]["/lookup"]["get"];
    assert_eq!(op["deprecated"], true);
    // produces fills the 200 response that declared no schema of its own
    assert_eq!(
        op["responses"]["200"]["schema"],
        json!({ "$ref": "#/definitions/LookupResult" })
    );
    assert_eq!(op["responses"]["404"]["examples"]["error"], "not found");
    assert!(op["responses"]["404"].get("schema").is_none());
}

#[test]
fn test_inference_failure_aborts_with_route_context() {
    let mut store = AnnotationStore::new();
    store.produces("broken", TypeDescriptor::named("Unregistered"));

    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::GET, "/ok", "fine"))
        .route(RouteEntry::new(Method::GET, "/broken", "broken"));

    let err = assemble(&catalog, &store, &DocConfig::default()).unwrap_err();
    assert_eq!(err.method, "GET");
    assert_eq!(err.path, "/broken");
    assert_eq!(err.handler, "broken");
    assert!(err.to_string().contains("Unregistered"));
}

#[test]
fn test_unsupported_scalar_token_aborts() {
    let mut store = AnnotationStore::new();
    store.consumes(
        "upload",
        Consumer::new("blob64", ParameterLocation::Query).named("data"),
    );
    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::POST, "/upload", "upload"));

    let err = assemble(&catalog, &store, &DocConfig::default()).unwrap_err();
    assert!(err.to_string().contains("blob64"));
}

#[test]
fn test_options_and_duplicates_are_skipped() {
    let store = AnnotationStore::new();
    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::OPTIONS, "/pets", "pets_preflight"))
        .route(RouteEntry::new(Method::GET, "/pets", "list_pets"))
        .route(RouteEntry::new(Method::GET, "/pets/", "list_pets_slash"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let value = doc.to_json_value().unwrap();

    let methods = value["paths"]["/pets"].as_object().unwrap();
    assert_eq!(methods.len(), 1);
    // the first registration of the collapsed template wins
    assert_eq!(methods["get"]["operationId"], "list_pets");
}

#[test]
fn test_methods_group_under_one_path_entry() {
    let store = AnnotationStore::new();
    let catalog = MemoryCatalog::new()
        .route(RouteEntry::new(Method::GET, "/pets/{id}", "get_pet"))
        .route(RouteEntry::new(Method::DELETE, "/pets/{id}", "delete_pet"));

    let doc = assemble(&catalog, &store, &DocConfig::default()).unwrap();
    let methods = &doc.paths["/pets/{id}"];
    assert_eq!(methods.len(), 2);
    assert!(methods.contains_key("get"));
    assert!(methods.contains_key("delete"));
}

#[test]
fn test_info_block_from_config() {
    let store = AnnotationStore::new();
    let catalog = MemoryCatalog::new().route(RouteEntry::new(Method::GET, "/pets", "list_pets"));

    let config = DocConfig::from_pairs([
        ("API_TITLE", "Pet Garage"),
        ("API_VERSION", "3.1.4"),
        ("API_DESCRIPTION", "Pets and the garages they live in"),
        ("API_TERMS_OF_SERVICE", "https://example.com/tos"),
        ("API_CONTACT_EMAIL", "api@example.com"),
        ("API_HOST", "api.example.com"),
        ("API_BASE_PATH", "/v3"),
        ("API_SCHEMES", "https"),
    ])
    .unwrap();

    let doc = assemble(&catalog, &store, &config).unwrap();
    let value = doc.to_json_value().unwrap();

    assert_eq!(value["swagger"], "2.0");
    assert_eq!(value["info"]["title"], "Pet Garage");
    assert_eq!(value["info"]["version"], "3.1.4");
    assert_eq!(value["info"]["termsOfService"], "https://example.com/tos");
    assert_eq!(value["info"]["contact"]["email"], "api@example.com");
    assert_eq!(value["host"], "api.example.com");
    assert_eq!(value["basePath"], "/v3");
    assert_eq!(value["schemes"], json!(["https"]));
}
