use crate::native::NativeRepr;
use crate::session::Session;
use crate::{LowerError, Result};
use std::fmt::Write;
use veilc_ast::{ClassId, CollectionKind, SourceLocation, Type};

/// Renders a semantic type as C# type syntax. A trait used as a set/map/
/// datatype type argument is a checked error: the runtime collections
/// dispatch equality and hashing on their element type, and an unconstrained
/// reference type has neither.
pub fn csharp_type(sess: &Session, ty: &Type) -> Result<String> {
    match ty {
        Type::Bool => Ok("bool".to_string()),
        Type::Char => Ok("char".to_string()),
        Type::Int | Type::BigOrdinal => Ok("BigInteger".to_string()),
        Type::Real => Ok("Veil.BigRational".to_string()),
        Type::BitVector(w) => Ok(match sess.bitvector_repr(*w) {
            NativeRepr::Native(width) => width.csharp_name().to_string(),
            NativeRepr::Big => "BigInteger".to_string(),
        }),
        Type::Newtype(id) => match sess.newtype_repr(*id) {
            NativeRepr::Native(width) => Ok(width.csharp_name().to_string()),
            NativeRepr::Big => csharp_type(sess, &sess.registry.newtype(*id).base),
        },
        Type::Datatype(id, args) => {
            for arg in args {
                check_type_arg(sess, arg)?;
            }
            applied(sess, &sess.registry.datatype(*id).name, args)
        }
        Type::Class(id, args) => applied(sess, &sess.registry.class(*id).name, args),
        Type::Array { dims, elem } => {
            let elem = csharp_type(sess, elem)?;
            Ok(format!("{}[{}]", elem, ",".repeat(*dims as usize - 1)))
        }
        Type::Collection { kind, type_args } => {
            for arg in type_args {
                check_type_arg(sess, arg)?;
            }
            let name = match kind {
                CollectionKind::Set => "Veil.Set",
                CollectionKind::Multiset => "Veil.MultiSet",
                CollectionKind::Seq => "Veil.Sequence",
                CollectionKind::Map => "Veil.Map",
            };
            applied(sess, name, type_args)
        }
        Type::TypeParam(name) => Ok(name.clone()),
        Type::Arrow(params, result) => {
            let mut out = String::from("Func<");
            for p in params {
                write!(out, "{}, ", csharp_type(sess, p)?).unwrap();
            }
            write!(out, "{}>", csharp_type(sess, result)?).unwrap();
            Ok(out)
        }
    }
}

fn applied(sess: &Session, name: &str, args: &[Type]) -> Result<String> {
    if args.is_empty() {
        return Ok(name.to_string());
    }
    let mut out = String::from(name);
    out.push('<');
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&csharp_type(sess, a)?);
    }
    out.push('>');
    Ok(out)
}

fn check_type_arg(sess: &Session, arg: &Type) -> Result<()> {
    if let Type::Class(id, _) = arg {
        if sess.registry.class(*id).is_trait {
            return Err(LowerError::UnsupportedTypeArg {
                loc: SourceLocation::default(),
                ty: arg.to_string(),
            });
        }
    }
    Ok(())
}

/// Zero-equivalent expression for a type. Cached per rendered type in the
/// session; every site that needs a known default (field initializers,
/// zero-filled arrays, wrapper defaults) reads the same entry.
pub fn default_value(sess: &Session, ty: &Type) -> Result<String> {
    let rendered = csharp_type(sess, ty)?;
    sess.cached_default(rendered.clone(), || match ty {
        Type::Bool => Ok("false".to_string()),
        Type::Char => Ok("' '".to_string()),
        Type::Int | Type::BigOrdinal => Ok("BigInteger.Zero".to_string()),
        Type::Real => Ok("Veil.BigRational.ZERO".to_string()),
        Type::BitVector(w) => Ok(match sess.bitvector_repr(*w) {
            NativeRepr::Native(_) => "0".to_string(),
            NativeRepr::Big => "BigInteger.Zero".to_string(),
        }),
        Type::Newtype(id) => match sess.newtype_repr(*id) {
            NativeRepr::Native(_) => Ok("0".to_string()),
            NativeRepr::Big => default_value(sess, &sess.registry.newtype(*id).base),
        },
        Type::Datatype(..) => Ok(format!("{}.Default", rendered)),
        Type::Class(..) => Ok(format!("({})null", rendered)),
        Type::Array { dims, elem } => {
            let elem = csharp_type(sess, elem)?;
            let zeros = vec!["0"; *dims as usize].join(", ");
            Ok(format!("new {}[{}]", elem, zeros))
        }
        Type::Collection { .. } => Ok(format!("{}.Empty", rendered)),
        Type::TypeParam(name) => Ok(format!("default({})", name)),
        Type::Arrow(params, result) => {
            // A total function's default ignores its arguments and returns
            // the result type's own default, built recursively.
            let binders = (0..params.len())
                .map(|i| format!("_x{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let body = default_value(sess, result)?;
            Ok(format!("(({})(({}) => {}))", rendered, binders, body))
        }
    })
}

/// Name of the static-member holder for a polymorphic trait, distinct from
/// the per-instance type name.
pub fn companion_type_name(sess: &Session, id: ClassId) -> String {
    format!("_Companion_{}", sess.registry.class(id).name)
}
