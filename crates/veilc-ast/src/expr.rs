use crate::decl::DatatypeId;
use crate::types::{CollectionKind, Type};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Char(char),
    Int(BigInt),
    /// Exact rational; emission never rounds.
    Real { num: BigInt, den: BigInt },
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    BitNot,
}

/// Resolved binary operators. The resolver has already picked the operand
/// type, so lowering only decides rendering, not meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Le,
    Ge,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    In,
    NotIn,
    Union,
    Intersection,
    Difference,
    Concat,
    Subset,
    ProperSubset,
    Disjoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Lit(Literal),
    Var(String),
    Unary {
        op: UnaryOp,
        /// Operand type, resolved upstream.
        ty: Type,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        /// Operand type, resolved upstream. Drives representation-sensitive
        /// rendering (equality dispatch, euclidean helpers, truncation).
        ty: Type,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    DatatypeValue {
        datatype: DatatypeId,
        type_args: Vec<Type>,
        ctor: usize,
        args: Vec<Expr>,
    },
    /// Destructor read, `e.f`.
    DtorSelect {
        datatype: DatatypeId,
        obj: Box<Expr>,
        dtor: String,
    },
    /// Discriminator test, `e.C?`.
    CtorTest {
        datatype: DatatypeId,
        obj: Box<Expr>,
        ctor: usize,
    },
    /// `{...}`, `multiset{...}`, `[...]` displays.
    Display {
        kind: CollectionKind,
        elem_ty: Type,
        elems: Vec<Expr>,
    },
    /// `map[k := v, ...]` display.
    MapDisplay {
        domain_ty: Type,
        range_ty: Type,
        entries: Vec<(Expr, Expr)>,
    },
    Convert {
        from: Type,
        to: Type,
        operand: Box<Expr>,
    },
    Lambda {
        params: Vec<(String, Type)>,
        result: Type,
        body: Box<Expr>,
    },
    Apply {
        /// Arrow type of `func`, resolved upstream.
        fn_ty: Type,
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Ite {
        cond: Box<Expr>,
        thn: Box<Expr>,
        els: Box<Expr>,
    },
    /// `|s|` over a collection.
    Cardinality(Box<Expr>),
    /// `a.Length`, `a.Length0`, ... of a possibly multi-dimensional array.
    ArrayLength {
        array: Box<Expr>,
        dim: u32,
        dims: u32,
    },
    /// `a[i, j]` element read.
    ArraySelect {
        array: Box<Expr>,
        indices: Vec<Expr>,
    },
    /// Direct call of a compiled function.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn bool(b: bool) -> Self {
        Expr::Lit(Literal::Bool(b))
    }

    pub fn int(v: i64) -> Self {
        Expr::Lit(Literal::Int(BigInt::from(v)))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn binary(op: BinOp, ty: Type, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            ty,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn convert(from: Type, to: Type, operand: Expr) -> Self {
        Expr::Convert {
            from,
            to,
            operand: Box::new(operand),
        }
    }
}
