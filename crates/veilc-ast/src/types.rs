use crate::decl::{ClassId, DatatypeId, NewtypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Set,
    Multiset,
    Seq,
    Map,
}

/// Semantic type of a resolved program. Exactly one lowering strategy applies
/// per variant; adding a variant breaks every match downstream, which is the
/// point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Char,
    /// Unbounded mathematical integer.
    Int,
    /// Exact rational.
    Real,
    BigOrdinal,
    BitVector(u32),
    Newtype(NewtypeId),
    Datatype(DatatypeId, Vec<Type>),
    Class(ClassId, Vec<Type>),
    Array { dims: u32, elem: Box<Type> },
    /// Set/Multiset/Seq carry one type argument, Map carries domain and range.
    Collection {
        kind: CollectionKind,
        type_args: Vec<Type>,
    },
    TypeParam(String),
    Arrow(Vec<Type>, Box<Type>),
}

impl Type {
    pub fn set(elem: Type) -> Self {
        Type::Collection {
            kind: CollectionKind::Set,
            type_args: vec![elem],
        }
    }

    pub fn multiset(elem: Type) -> Self {
        Type::Collection {
            kind: CollectionKind::Multiset,
            type_args: vec![elem],
        }
    }

    pub fn seq(elem: Type) -> Self {
        Type::Collection {
            kind: CollectionKind::Seq,
            type_args: vec![elem],
        }
    }

    pub fn map(domain: Type, range: Type) -> Self {
        Type::Collection {
            kind: CollectionKind::Map,
            type_args: vec![domain, range],
        }
    }

    pub fn array(elem: Type) -> Self {
        Type::Array {
            dims: 1,
            elem: Box::new(elem),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Type::Collection { .. })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
            Type::BigOrdinal => write!(f, "ORDINAL"),
            Type::BitVector(width) => write!(f, "bv{}", width),
            Type::Newtype(id) => write!(f, "newtype_{}", id.0),
            Type::Datatype(id, args) => write_applied(f, &format!("datatype_{}", id.0), args),
            Type::Class(id, args) => write_applied(f, &format!("class_{}", id.0), args),
            Type::Array { dims, elem } => {
                write!(f, "array")?;
                if *dims > 1 {
                    write!(f, "{}", dims)?;
                }
                write!(f, "<{}>", elem)
            }
            Type::Collection { kind, type_args } => {
                let name = match kind {
                    CollectionKind::Set => "set",
                    CollectionKind::Multiset => "multiset",
                    CollectionKind::Seq => "seq",
                    CollectionKind::Map => "map",
                };
                write_applied(f, name, type_args)
            }
            Type::TypeParam(name) => write!(f, "{}", name),
            Type::Arrow(params, result) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", result)
            }
        }
    }
}

fn write_applied(f: &mut fmt::Formatter<'_>, name: &str, args: &[Type]) -> fmt::Result {
    write!(f, "{}", name)?;
    if !args.is_empty() {
        write!(f, "<")?;
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, ">")?;
    }
    Ok(())
}
