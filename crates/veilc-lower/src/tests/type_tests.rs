use crate::session::Session;
use crate::tests::{add_bounded_newtype, list_registry, loc};
use crate::types::{companion_type_name, csharp_type, default_value};
use crate::LowerError;
use pretty_assertions::assert_eq;
use veilc_ast::{ClassDecl, DeclRegistry, Type};

fn render(ty: &Type) -> String {
    let registry = DeclRegistry::new();
    let sess = Session::new(&registry);
    csharp_type(&sess, ty).unwrap()
}

fn default_of(ty: &Type) -> String {
    let registry = DeclRegistry::new();
    let sess = Session::new(&registry);
    default_value(&sess, ty).unwrap()
}

#[test]
fn test_primitive_type_rendering() {
    assert_eq!(render(&Type::Bool), "bool");
    assert_eq!(render(&Type::Char), "char");
    assert_eq!(render(&Type::Int), "BigInteger");
    assert_eq!(render(&Type::BigOrdinal), "BigInteger");
    assert_eq!(render(&Type::Real), "Veil.BigRational");
    assert_eq!(render(&Type::BitVector(8)), "byte");
    assert_eq!(render(&Type::BitVector(100)), "BigInteger");
}

#[test]
fn test_compound_type_rendering() {
    assert_eq!(render(&Type::seq(Type::Int)), "Veil.Sequence<BigInteger>");
    assert_eq!(
        render(&Type::map(Type::Char, Type::Bool)),
        "Veil.Map<char, bool>"
    );
    assert_eq!(render(&Type::array(Type::Bool)), "bool[]");
    assert_eq!(
        render(&Type::Array {
            dims: 3,
            elem: Box::new(Type::Int)
        }),
        "BigInteger[,,]"
    );
    assert_eq!(
        render(&Type::Arrow(vec![Type::Int, Type::Bool], Box::new(Type::Char))),
        "Func<BigInteger, bool, char>"
    );
}

#[test]
fn test_newtype_rendering_follows_selection() {
    let mut registry = DeclRegistry::new();
    let narrow = add_bounded_newtype(&mut registry, "Small", 0, 200);
    let unbounded = registry.add_newtype(veilc_ast::NewtypeDecl {
        name: "Wide".to_string(),
        base: Type::Int,
        range: None,
        loc: loc(),
    });
    let sess = Session::new(&registry);

    assert_eq!(csharp_type(&sess, &Type::Newtype(narrow)).unwrap(), "byte");
    assert_eq!(
        csharp_type(&sess, &Type::Newtype(unbounded)).unwrap(),
        "BigInteger"
    );
}

#[test]
fn test_datatype_rendering_uses_declared_name() {
    let (registry, id) = list_registry();
    let sess = Session::new(&registry);
    let ty = Type::Datatype(id, vec![Type::Int]);
    assert_eq!(csharp_type(&sess, &ty).unwrap(), "List<BigInteger>");
}

#[test]
fn test_primitive_defaults() {
    assert_eq!(default_of(&Type::Bool), "false");
    assert_eq!(default_of(&Type::Char), "' '");
    assert_eq!(default_of(&Type::Int), "BigInteger.Zero");
    assert_eq!(default_of(&Type::Real), "Veil.BigRational.ZERO");
    assert_eq!(default_of(&Type::BitVector(8)), "0");
    assert_eq!(default_of(&Type::BitVector(100)), "BigInteger.Zero");
    assert_eq!(default_of(&Type::TypeParam("T".to_string())), "default(T)");
}

#[test]
fn test_compound_defaults() {
    assert_eq!(
        default_of(&Type::set(Type::Int)),
        "Veil.Set<BigInteger>.Empty"
    );
    assert_eq!(default_of(&Type::array(Type::Bool)), "new bool[0]");
    assert_eq!(
        default_of(&Type::Array {
            dims: 2,
            elem: Box::new(Type::Char)
        }),
        "new char[0, 0]"
    );

    let (registry, id) = list_registry();
    let sess = Session::new(&registry);
    let ty = Type::Datatype(id, vec![Type::Int]);
    assert_eq!(
        default_value(&sess, &ty).unwrap(),
        "List<BigInteger>.Default"
    );
}

#[test]
fn test_arrow_default_ignores_arguments_and_recurses() {
    assert_eq!(
        default_of(&Type::Arrow(vec![Type::Int], Box::new(Type::Bool))),
        "((Func<BigInteger, bool>)((_x0) => false))"
    );
    // The result's default is itself constructed recursively.
    assert_eq!(
        default_of(&Type::Arrow(
            vec![Type::Bool, Type::Bool],
            Box::new(Type::seq(Type::Int))
        )),
        "((Func<bool, bool, Veil.Sequence<BigInteger>>)((_x0, _x1) => Veil.Sequence<BigInteger>.Empty))"
    );
}

#[test]
fn test_trait_type_argument_is_checked_error() {
    let mut registry = DeclRegistry::new();
    let trait_id = registry.add_class(ClassDecl {
        name: "Shape".to_string(),
        type_params: vec![],
        is_trait: true,
        represents_handle: false,
        external: None,
        loc: loc(),
    });
    let sess = Session::new(&registry);

    let bad = Type::set(Type::Class(trait_id, vec![]));
    match csharp_type(&sess, &bad) {
        Err(LowerError::UnsupportedTypeArg { .. }) => {}
        other => panic!("expected UnsupportedTypeArg, got {:?}", other.err()),
    }

    // A trait behind a reference position is fine; only element/argument
    // positions need dispatchable equality.
    let ok = Type::Class(trait_id, vec![]);
    assert_eq!(csharp_type(&sess, &ok).unwrap(), "Shape");
}

#[test]
fn test_companion_name_is_distinct_from_instance_type() {
    let mut registry = DeclRegistry::new();
    let id = registry.add_class(ClassDecl {
        name: "Ordered".to_string(),
        type_params: vec!["T".to_string()],
        is_trait: true,
        represents_handle: false,
        external: None,
        loc: loc(),
    });
    let sess = Session::new(&registry);
    assert_eq!(companion_type_name(&sess, id), "_Companion_Ordered");
}
