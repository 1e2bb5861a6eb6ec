//! # Spec Assembler
//!
//! Joins the route catalog, annotation store and definitions registry into
//! one specification document. The pass is pure in-memory graph traversal:
//! no I/O, no mutation of its inputs, and a hard failure on the first
//! inference error rather than a partial document.

mod build;
mod document;

pub use build::{assemble, AssemblyError};
pub use document::{Contact, Info, Operation, Parameter, Response, SpecDocument, Tag};
