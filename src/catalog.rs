//! # Route Catalog
//!
//! The boundary to the external router: an enumeration of registered routes
//! (method, path template, handler identity, owning group) plus the static
//! asset paths. The core only reads this surface; registration and matching
//! stay with the router.
//!
//! Routers disagree on parameter syntax, so path templates are normalized
//! here before assembly: `<id:int>` and `:id` both become `{id}`, and the
//! converter suffix (when present) types the auto-documented path parameter.

use http::Method;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One registered endpoint, as reported by the router.
///
/// Uniqueness on `(method, path_template)` is the router's contract; the
/// assembler skips duplicates defensively rather than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub path_template: String,
    /// Stable handler identity, the key into the annotation store.
    pub handler: String,
    /// Owning route group (blueprint equivalent); derives the default tag.
    pub group: Option<String>,
}

impl RouteEntry {
    pub fn new(method: Method, path_template: impl Into<String>, handler: impl Into<String>) -> Self {
        RouteEntry {
            method,
            path_template: path_template.into(),
            handler: handler.into(),
            group: None,
        }
    }

    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.group = Some(name.into());
        self
    }
}

/// What the assembler consumes from the router.
pub trait RouteCatalog {
    /// Every registered, non-static route.
    fn routes(&self) -> Vec<RouteEntry>;

    /// Static asset paths, excluded from the document by exact match.
    fn static_paths(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory catalog, for embedding in tests or routers without a native
/// adapter.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    routes: Vec<RouteEntry>,
    static_paths: Vec<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, entry: RouteEntry) -> Self {
        self.routes.push(entry);
        self
    }

    pub fn static_path(mut self, path: impl Into<String>) -> Self {
        self.static_paths.push(path.into());
        self
    }
}

impl RouteCatalog for MemoryCatalog {
    fn routes(&self) -> Vec<RouteEntry> {
        self.routes.clone()
    }

    fn static_paths(&self) -> Vec<String> {
        self.static_paths.clone()
    }
}

/// A parameter discovered in a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    /// Scalar type token for the parameter schema (`"string"`, `"integer"`,
    /// `"number"`), derived from the router's converter suffix.
    pub token: String,
}

static ANGLE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)(?::([^>]*))?>").expect("angle parameter pattern")
});
static COLON_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|/):([A-Za-z_][A-Za-z0-9_]*)").expect("colon parameter pattern")
});
static BRACE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("brace parameter pattern"));

fn converter_token(converter: &str) -> &'static str {
    match converter {
        "int" | "integer" => "integer",
        "float" | "number" => "number",
        _ => "string",
    }
}

/// Normalize a router path template to `{name}` placeholders.
///
/// Returns the normalized template (trailing slash stripped, so `/pets` and
/// `/pets/` collapse onto one document entry) and the path parameters found
/// in it, in order of appearance.
pub fn normalize_path_template(template: &str) -> (String, Vec<PathParam>) {
    let mut params: Vec<PathParam> = Vec::new();

    let pass = ANGLE_PARAM.replace_all(template, |caps: &Captures| {
        let name = caps[1].to_string();
        let token = caps
            .get(2)
            .map(|converter| converter_token(converter.as_str()))
            .unwrap_or("string");
        params.push(PathParam {
            name: name.clone(),
            token: token.to_string(),
        });
        format!("{{{name}}}")
    });

    let pass = COLON_PARAM.replace_all(&pass, |caps: &Captures| {
        let name = caps[2].to_string();
        params.push(PathParam {
            name: name.clone(),
            token: "string".to_string(),
        });
        format!("{}{{{name}}}", &caps[1])
    });

    for caps in BRACE_PARAM.captures_iter(&pass) {
        let name = &caps[1];
        if !params.iter().any(|p| p.name == name) {
            params.push(PathParam {
                name: name.to_string(),
                token: "string".to_string(),
            });
        }
    }

    let mut path = pass.into_owned();
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if path.is_empty() {
        path.push('/');
    }

    (path, params)
}
