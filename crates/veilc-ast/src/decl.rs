use crate::source_location::SourceLocation;
use crate::stmt::Stmt;
use crate::types::Type;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatatypeId(pub u32);

impl fmt::Display for DatatypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewtypeId(pub u32);

impl fmt::Display for NewtypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Every type and datatype declaration of a resolved program, id-keyed in
/// declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclRegistry {
    pub datatypes: IndexMap<DatatypeId, DatatypeDecl>,
    pub newtypes: IndexMap<NewtypeId, NewtypeDecl>,
    pub classes: IndexMap<ClassId, ClassDecl>,
    next_datatype_id: u32,
    next_newtype_id: u32,
    next_class_id: u32,
}

impl DeclRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_datatype(&mut self, decl: DatatypeDecl) -> DatatypeId {
        let id = DatatypeId(self.next_datatype_id);
        self.next_datatype_id += 1;
        self.datatypes.insert(id, decl);
        id
    }

    pub fn add_newtype(&mut self, decl: NewtypeDecl) -> NewtypeId {
        let id = NewtypeId(self.next_newtype_id);
        self.next_newtype_id += 1;
        self.newtypes.insert(id, decl);
        id
    }

    pub fn add_class(&mut self, decl: ClassDecl) -> ClassId {
        let id = ClassId(self.next_class_id);
        self.next_class_id += 1;
        self.classes.insert(id, decl);
        id
    }

    /// Resolved input only ever references ids it introduced, so a miss here
    /// is a resolver defect, not a user error.
    pub fn datatype(&self, id: DatatypeId) -> &DatatypeDecl {
        self.datatypes.get(&id).expect("datatype id not in registry")
    }

    pub fn newtype(&self, id: NewtypeId) -> &NewtypeDecl {
        self.newtypes.get(&id).expect("newtype id not in registry")
    }

    pub fn class(&self, id: ClassId) -> &ClassDecl {
        self.classes.get(&id).expect("class id not in registry")
    }
}

/// Inclusive value range the resolver proved for a bounded numeric type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub lo: BigInt,
    pub hi: BigInt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatatypeDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub ctors: Vec<Ctor>,
    pub is_corecursive: bool,
    /// Resolver-designated simplest constructor, used for default values of
    /// inductive datatypes. Co-datatypes ignore it; see `default_ctor_index`.
    pub default_ctor: usize,
    pub has_finite_values: bool,
    pub loc: SourceLocation,
}

impl DatatypeDecl {
    /// The constructor a default value is built from. Inductive datatypes use
    /// the resolver-designated one; co-datatypes always use the first
    /// declared constructor. The asymmetry is deliberate and must be
    /// preserved; every site that needs a known default goes through here.
    pub fn default_ctor_index(&self) -> usize {
        if self.is_corecursive {
            0
        } else {
            self.default_ctor
        }
    }

    /// Tuple datatypes are resolver-generated and print as "(...)".
    pub fn is_tuple(&self) -> bool {
        self.name.starts_with("_Tuple")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ctor {
    pub name: String,
    pub formals: Vec<Formal>,
}

impl Ctor {
    /// Non-ghost formals, in declaration order. These become fields.
    pub fn fields(&self) -> impl Iterator<Item = &Formal> {
        self.formals.iter().filter(|f| !f.is_ghost)
    }

    pub fn has_fields(&self) -> bool {
        self.formals.iter().any(|f| !f.is_ghost)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formal {
    pub name: String,
    pub typ: Type,
    pub is_ghost: bool,
}

impl Formal {
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        Self {
            name: name.into(),
            typ,
            is_ghost: false,
        }
    }

    pub fn ghost(name: impl Into<String>, typ: Type) -> Self {
        Self {
            name: name.into(),
            typ,
            is_ghost: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewtypeDecl {
    pub name: String,
    pub base: Type,
    /// Statically known value range, if the resolver could bound it.
    pub range: Option<ValueRange>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub is_trait: bool,
    /// Values of this type stand for raw external handles and always compare
    /// by identity.
    pub represents_handle: bool,
    pub external: Option<ExternSpec>,
    pub loc: SourceLocation,
}

/// Arguments of an external-linkage attribute, at most a library name and a
/// member name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternSpec {
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub ins: Vec<Formal>,
    pub outs: Vec<Formal>,
    pub body: Vec<Stmt>,
    pub is_tail_recursive: bool,
    pub external: Option<ExternSpec>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub registry: DeclRegistry,
    pub methods: Vec<MethodDecl>,
}
