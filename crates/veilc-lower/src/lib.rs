/*! Lowering of resolved Veil programs to C# source text.
 *
 * The target language has no sum types, no lazy values, and no euclidean division, so this
 * crate encodes them: datatypes become a class family behind a value-wrapper struct,
 * co-recursive values go through a compute-once thunk, and arithmetic routes through
 * runtime helpers wherever C#'s native operators disagree with Veil's semantics. Bounded
 * numeric types are narrowed to machine words when a declared range permits it.
 *
 * Lowering reads the AST, consults two write-once session caches, and appends text to a
 * sink; it never mutates its input and never touches the file system.
 */

pub mod compile;
pub mod datatype;
pub mod expr;
pub mod native;
pub mod session;
pub mod stmt;
pub mod types;

pub use compile::Lowering;
pub use datatype::compile_datatype;
pub use expr::lower_expr;
pub use native::{select_width, NativeRepr, NativeWidth};
pub use session::Session;
pub use stmt::lower_method;
pub use types::{companion_type_name, csharp_type, default_value};

use thiserror::Error;
use veilc_ast::SourceLocation;

/// Checked, recoverable lowering errors. Each aborts the current declaration
/// only; the driver reports it and moves on. Internal defects (an AST shape
/// the resolver must never produce) panic instead.
#[derive(Error, Debug, Clone)]
pub enum LowerError {
    #[error("{loc}: {ty} cannot instantiate a collection or datatype: equality on a trait reference cannot be dispatched safely")]
    UnsupportedTypeArg { loc: SourceLocation, ty: String },
    #[error("{loc}: malformed extern attribute on {name}: expected at most two string arguments, got {count}")]
    MalformedExtern {
        loc: SourceLocation,
        name: String,
        count: usize,
    },
    #[error("{loc}: extern declaration {name} must not have a body")]
    ExternHasBody { loc: SourceLocation, name: String },
}

impl LowerError {
    /// Stamps the offending declaration's location onto an error raised deep
    /// inside type recursion, where no declaration is in scope.
    pub fn at(self, loc: SourceLocation) -> Self {
        match self {
            LowerError::UnsupportedTypeArg { ty, .. } => {
                LowerError::UnsupportedTypeArg { loc, ty }
            }
            LowerError::MalformedExtern { name, count, .. } => {
                LowerError::MalformedExtern { loc, name, count }
            }
            LowerError::ExternHasBody { name, .. } => LowerError::ExternHasBody { loc, name },
        }
    }
}

pub type Result<T> = std::result::Result<T, LowerError>;

#[cfg(test)]
mod tests;
