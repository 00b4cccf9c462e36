/*! Resolved AST for the Veil verification language.
 *
 * Code generation starts where verification ends: the resolver has already checked types,
 * erased ghost constructs, and designated default constructors. This crate is the read-only
 * picture of a program at that point, shaped so every lowering decision is a match over a
 * closed enum rather than a runtime type probe.
 */

pub mod decl;
pub mod expr;
pub mod persist;
pub mod source_location;
pub mod stmt;
pub mod types;

pub use decl::{
    ClassDecl, ClassId, Ctor, DatatypeDecl, DatatypeId, DeclRegistry, ExternSpec, Formal,
    MethodDecl, NewtypeDecl, NewtypeId, Program, ValueRange,
};
pub use expr::{BinOp, Expr, Literal, UnaryOp};
pub use persist::{load_program, save_program};
pub use source_location::SourceLocation;
pub use stmt::Stmt;
pub use types::{CollectionKind, Type};
