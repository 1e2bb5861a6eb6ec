mod infer;
mod node;

pub use infer::{Definitions, FieldBuilder, Model, SchemaError, TypeDescriptor};
pub use node::{NodeMeta, PrimitiveKind, SchemaNode};
