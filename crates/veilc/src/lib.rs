/*! Unified interface for lowering resolved Veil programs to C#.
 *
 * Single import for the whole pipeline tail: the resolved AST model, the emission sink,
 * and the lowering engine that turns one into text for the other.
 */

pub use veilc_ast as ast;
pub use veilc_emit as emit;
pub use veilc_lower as lower;

pub use veilc_ast::{
    BinOp, ClassDecl, Ctor, DatatypeDecl, DeclRegistry, Expr, Formal, Literal, MethodDecl,
    NewtypeDecl, Program, SourceLocation, Stmt, Type, UnaryOp,
};

pub use veilc_emit::CodeSink;

pub use veilc_lower::{LowerError, Lowering, Session};
