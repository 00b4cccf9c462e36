mod stmt_tests;
mod type_tests;

use veilc_ast::{
    Ctor, DatatypeDecl, DatatypeId, DeclRegistry, Formal, NewtypeId, SourceLocation, Type,
    ValueRange,
};

use num_bigint::BigInt;

pub(crate) fn loc() -> SourceLocation {
    SourceLocation::new("test.veil", 1, 1)
}

/// `datatype List<T> = Nil | Cons(head: T, tail: List<T>)`
pub(crate) fn list_registry() -> (DeclRegistry, DatatypeId) {
    let mut registry = DeclRegistry::new();
    let id = DatatypeId(0);
    let list_ty = Type::Datatype(id, vec![Type::TypeParam("T".to_string())]);
    let added = registry.add_datatype(DatatypeDecl {
        name: "List".to_string(),
        type_params: vec!["T".to_string()],
        ctors: vec![
            Ctor {
                name: "Nil".to_string(),
                formals: vec![],
            },
            Ctor {
                name: "Cons".to_string(),
                formals: vec![
                    Formal::new("head", Type::TypeParam("T".to_string())),
                    Formal::new("tail", list_ty),
                ],
            },
        ],
        is_corecursive: false,
        default_ctor: 0,
        has_finite_values: false,
        loc: loc(),
    });
    assert_eq!(added, id);
    (registry, id)
}

/// `codatatype Stream = SCons(head: int, tail: Stream)`
pub(crate) fn stream_registry() -> (DeclRegistry, DatatypeId) {
    let mut registry = DeclRegistry::new();
    let id = DatatypeId(0);
    let stream_ty = Type::Datatype(id, vec![]);
    let added = registry.add_datatype(DatatypeDecl {
        name: "Stream".to_string(),
        type_params: vec![],
        ctors: vec![Ctor {
            name: "SCons".to_string(),
            formals: vec![
                Formal::new("head", Type::Int),
                Formal::new("tail", stream_ty),
            ],
        }],
        is_corecursive: true,
        default_ctor: 0,
        has_finite_values: false,
        loc: loc(),
    });
    assert_eq!(added, id);
    (registry, id)
}

/// Adds a newtype with the given proven range and returns its id.
pub(crate) fn add_bounded_newtype(
    registry: &mut DeclRegistry,
    name: &str,
    lo: i64,
    hi: i64,
) -> NewtypeId {
    registry.add_newtype(veilc_ast::NewtypeDecl {
        name: name.to_string(),
        base: Type::Int,
        range: Some(ValueRange {
            lo: BigInt::from(lo),
            hi: BigInt::from(hi),
        }),
        loc: loc(),
    })
}
