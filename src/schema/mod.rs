//! Filter schema subsystem
//!
//! Model metadata, the declaration format and the compiler that turns a
//! declaration into an immutable [`CompiledSchema`].
//!
//! # Design Principles
//!
//! - Compiled once, read-only afterwards
//! - Every declaration invariant is checked at compile time
//! - Compile failures are fatal configuration errors

mod compiler;
mod declaration;
mod descriptor;
mod errors;
mod hints;
mod loader;
mod select_tree;
mod types;
mod validator;

pub use compiler::{CompiledSchema, SchemaCompiler};
pub use declaration::{ExtendedFilterDecl, FilterDecl, NamespaceDecl};
pub use descriptor::{default_null_values, FieldDescriptor, FilterEntry};
pub use errors::{ConfigError, ConfigResult, Severity};
pub use hints::{HintDecl, HintKind, QueryHint};
pub use loader::ModelRegistry;
pub use select_tree::SelectNode;
pub use types::{Choice, FieldKind, Model, ModelField};
pub use validator::DeclarationValidator;
