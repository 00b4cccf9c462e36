use crate::expr::Expr;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    VarDecl {
        name: String,
        ty: Type,
        init: Option<Expr>,
    },
    Assign {
        target: String,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    /// `cond: None` is an infinite loop; exits only via break/return.
    While {
        cond: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// Break target for labeled breaks anywhere in `body`.
    Labeled {
        label: String,
        body: Vec<Stmt>,
    },
    Break {
        label: Option<String>,
    },
    /// Assigns `values` to the out-parameters in order, then returns.
    Return {
        values: Vec<Expr>,
    },
    /// Recursive self-call in tail position of a tail-recursive method.
    TailCall {
        args: Vec<Expr>,
    },
    Call {
        outs: Vec<String>,
        callee: String,
        args: Vec<Expr>,
    },
    Print {
        args: Vec<Expr>,
    },
    /// Unbounded doubling iteration used in witness search; `index` has no
    /// declared upper bound.
    WitnessSearch {
        index: String,
        body: Vec<Stmt>,
    },
    /// Statically proven unreachable. Reaching it at run time is an upstream
    /// soundness defect and must abort.
    Unreachable,
}
