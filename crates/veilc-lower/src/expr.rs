use crate::native::{NativeRepr, NativeWidth};
use crate::session::Session;
use crate::types::csharp_type;
use crate::Result;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use veilc_ast::{BinOp, CollectionKind, Expr, Literal, Type, UnaryOp};

/// How one resolved binary operator renders.
pub(crate) enum OpStyle {
    Infix(&'static str),
    /// `(lhs).Name(rhs)`.
    Method(&'static str),
    /// `Name(lhs, rhs)`.
    Helper(String),
}

pub(crate) struct OpSpec {
    pub style: OpStyle,
    pub reverse_operands: bool,
    pub negate_result: bool,
    pub truncate_result: bool,
    pub coerce_rhs_to_int: bool,
}

impl OpSpec {
    fn infix(sym: &'static str) -> Self {
        Self::with(OpStyle::Infix(sym))
    }

    fn method(name: &'static str) -> Self {
        Self::with(OpStyle::Method(name))
    }

    fn helper(name: String) -> Self {
        Self::with(OpStyle::Helper(name))
    }

    fn with(style: OpStyle) -> Self {
        Self {
            style,
            reverse_operands: false,
            negate_result: false,
            truncate_result: false,
            coerce_rhs_to_int: false,
        }
    }

    fn reversed(mut self) -> Self {
        self.reverse_operands = true;
        self
    }

    fn negated(mut self) -> Self {
        self.negate_result = true;
        self
    }

    fn truncated(mut self) -> Self {
        self.truncate_result = true;
        self
    }

    fn coercing_rhs(mut self) -> Self {
        self.coerce_rhs_to_int = true;
        self
    }
}

/// Operand kinds whose equality is primitive comparison or reference
/// identity. Datatypes, collections, and type parameters compare
/// structurally instead.
pub(crate) fn is_directly_comparable(ty: &Type) -> bool {
    !matches!(
        ty,
        Type::Datatype(..) | Type::Collection { .. } | Type::TypeParam(_)
    )
}

/// A type marked as a raw external handle compares by identity regardless of
/// shape.
fn is_opaque_handle(sess: &Session, ty: &Type) -> bool {
    match ty {
        Type::Class(id, _) => sess.registry.class(*id).represents_handle,
        Type::Newtype(id) => is_opaque_handle(sess, &sess.registry.newtype(*id).base),
        _ => false,
    }
}

/// Fixed-width arithmetic results are reinterpreted into the
/// representation's bit width afterwards.
fn wraps(sess: &Session, ty: &Type) -> bool {
    match ty {
        Type::BitVector(_) => true,
        Type::Newtype(id) => sess.newtype_repr(*id).is_native(),
        _ => false,
    }
}

/// Remainder sign must follow the divisor, which C#'s truncating `/` and `%`
/// do not guarantee for signed operands.
fn is_non_negative(sess: &Session, ty: &Type) -> bool {
    match ty {
        Type::BitVector(_) | Type::BigOrdinal => true,
        Type::Newtype(id) => {
            let decl = sess.registry.newtype(*id);
            match &decl.range {
                Some(range) => !range.lo.is_negative(),
                None => is_non_negative(sess, &decl.base),
            }
        }
        _ => false,
    }
}

/// The rendering decision table: exactly one strategy per resolved operator
/// and operand representation.
pub(crate) fn op_spec(sess: &Session, op: BinOp, ty: &Type) -> OpSpec {
    match op {
        BinOp::And => OpSpec::infix("&&"),
        BinOp::Or => OpSpec::infix("||"),
        BinOp::Eq => {
            if is_opaque_handle(sess, ty) || is_directly_comparable(ty) {
                OpSpec::infix("==")
            } else {
                OpSpec::method("Equals")
            }
        }
        BinOp::Neq => {
            if is_opaque_handle(sess, ty) || is_directly_comparable(ty) {
                OpSpec::infix("!=")
            } else {
                OpSpec::method("Equals").negated()
            }
        }
        BinOp::Lt => OpSpec::infix("<"),
        BinOp::Le => OpSpec::infix("<="),
        BinOp::Ge => OpSpec::infix(">="),
        BinOp::Gt => OpSpec::infix(">"),
        BinOp::Add => arith(sess, ty, "+"),
        BinOp::Sub => arith(sess, ty, "-"),
        BinOp::Mul => arith(sess, ty, "*"),
        BinOp::Div => division(sess, ty, "/", "EuclideanDivision"),
        BinOp::Mod => division(sess, ty, "%", "EuclideanModulus"),
        BinOp::BitAnd => arith(sess, ty, "&"),
        BinOp::BitOr => arith(sess, ty, "|"),
        BinOp::BitXor => arith(sess, ty, "^"),
        // Shift amounts are machine-sized even over BigInteger operands; a
        // left shift can escape the width and is truncated back.
        BinOp::LeftShift => arith(sess, ty, "<<").coercing_rhs(),
        BinOp::RightShift => arith(sess, ty, ">>").coercing_rhs(),
        BinOp::In => OpSpec::method("Contains").reversed(),
        BinOp::NotIn => OpSpec::method("Contains").reversed().negated(),
        BinOp::Union => OpSpec::method("Union"),
        BinOp::Intersection => OpSpec::method("Intersection"),
        BinOp::Difference => OpSpec::method("Difference"),
        BinOp::Concat => OpSpec::method("Concat"),
        BinOp::Subset => OpSpec::method("IsSubsetOf"),
        BinOp::ProperSubset => OpSpec::method("IsProperSubsetOf"),
        BinOp::Disjoint => OpSpec::method("IsDisjointFrom"),
    }
}

fn arith(sess: &Session, ty: &Type, sym: &'static str) -> OpSpec {
    let spec = OpSpec::infix(sym);
    if wraps(sess, ty) {
        spec.truncated()
    } else {
        spec
    }
}

fn division(sess: &Session, ty: &Type, sym: &'static str, helper: &str) -> OpSpec {
    if matches!(ty, Type::Real) {
        return OpSpec::infix(sym);
    }
    match sess.integral_repr(ty) {
        NativeRepr::Native(w) if !w.is_signed() => arith(sess, ty, sym),
        NativeRepr::Native(w) => {
            OpSpec::helper(format!("Veil.Helpers.{}_{}", helper, w.csharp_name()))
        }
        NativeRepr::Big => {
            if is_non_negative(sess, ty) {
                OpSpec::infix(sym)
            } else {
                OpSpec::helper(format!("Veil.Helpers.{}", helper))
            }
        }
    }
}

/// Reinterprets a mathematical result into the representation's bit width.
pub(crate) fn truncate_to_width(sess: &Session, ty: &Type, expr: String) -> String {
    match ty {
        Type::BitVector(w) => match sess.bitvector_repr(*w) {
            NativeRepr::Native(nw) if nw.bits() == *w => {
                format!("unchecked(({})({}))", nw.csharp_name(), expr)
            }
            NativeRepr::Native(nw) => {
                let mask = (1u128 << w) - 1;
                format!("({})(({}) & {:#X})", nw.csharp_name(), expr, mask)
            }
            NativeRepr::Big => {
                format!("(({}) & ((BigInteger.One << {}) - 1))", expr, w)
            }
        },
        Type::Newtype(id) => match sess.newtype_repr(*id) {
            NativeRepr::Native(nw) => format!("unchecked(({})({}))", nw.csharp_name(), expr),
            NativeRepr::Big => expr,
        },
        _ => expr,
    }
}

pub fn lower_expr(sess: &Session, expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(lit) => Ok(lower_literal(lit)),
        Expr::Var(name) => Ok(name.clone()),
        Expr::Unary { op, ty, operand } => {
            let e = lower_expr(sess, operand)?;
            Ok(match op {
                UnaryOp::Not => format!("!({})", e),
                UnaryOp::BitNot => truncate_to_width(sess, ty, format!("~({})", e)),
            })
        }
        Expr::Binary { op, ty, lhs, rhs } => lower_binary(sess, *op, ty, lhs, rhs),
        Expr::DatatypeValue {
            datatype,
            type_args,
            ctor,
            args,
        } => {
            let wrapper = csharp_type(sess, &Type::Datatype(*datatype, type_args.clone()))?;
            let ctor_name = &sess.registry.datatype(*datatype).ctors[*ctor].name;
            Ok(format!(
                "{}.create_{}({})",
                wrapper,
                ctor_name,
                lower_all(sess, args)?.join(", ")
            ))
        }
        Expr::DtorSelect { obj, dtor, .. } => {
            Ok(format!("({}).dtor_{}", lower_expr(sess, obj)?, dtor))
        }
        Expr::CtorTest {
            datatype,
            obj,
            ctor,
        } => {
            let ctor_name = &sess.registry.datatype(*datatype).ctors[*ctor].name;
            Ok(format!("({}).is_{}", lower_expr(sess, obj)?, ctor_name))
        }
        Expr::Display {
            kind,
            elem_ty,
            elems,
        } => {
            let ty = Type::Collection {
                kind: *kind,
                type_args: vec![elem_ty.clone()],
            };
            Ok(format!(
                "{}.FromElements({})",
                csharp_type(sess, &ty)?,
                lower_all(sess, elems)?.join(", ")
            ))
        }
        Expr::MapDisplay {
            domain_ty,
            range_ty,
            entries,
        } => {
            let ty = Type::map(domain_ty.clone(), range_ty.clone());
            let kt = csharp_type(sess, domain_ty)?;
            let vt = csharp_type(sess, range_ty)?;
            let mut pairs = Vec::new();
            for (k, v) in entries {
                pairs.push(format!(
                    "new Veil.Pair<{}, {}>({}, {})",
                    kt,
                    vt,
                    lower_expr(sess, k)?,
                    lower_expr(sess, v)?
                ));
            }
            Ok(format!(
                "{}.FromElements({})",
                csharp_type(sess, &ty)?,
                pairs.join(", ")
            ))
        }
        Expr::Convert { from, to, operand } => lower_conversion(sess, from, to, operand),
        Expr::Lambda {
            params,
            result,
            body,
        } => {
            let fn_ty = Type::Arrow(
                params.iter().map(|(_, t)| t.clone()).collect(),
                Box::new(result.clone()),
            );
            let cs_fn = csharp_type(sess, &fn_ty)?;
            let mut binders = Vec::new();
            for (name, ty) in params {
                binders.push(format!("{} {}", csharp_type(sess, ty)?, name));
            }
            Ok(format!(
                "(({})(({}) => {}))",
                cs_fn,
                binders.join(", "),
                lower_expr(sess, body)?
            ))
        }
        Expr::Apply { fn_ty, func, args } => {
            // The source function type is more permissive than C#'s; pin the
            // static Func type before application.
            Ok(format!(
                "Veil.Helpers.Id<{}>({})({})",
                csharp_type(sess, fn_ty)?,
                lower_expr(sess, func)?,
                lower_all(sess, args)?.join(", ")
            ))
        }
        Expr::Ite { cond, thn, els } => Ok(format!(
            "(({}) ? ({}) : ({}))",
            lower_expr(sess, cond)?,
            lower_expr(sess, thn)?,
            lower_expr(sess, els)?
        )),
        Expr::Cardinality(e) => Ok(format!("new BigInteger(({}).Count)", lower_expr(sess, e)?)),
        Expr::ArrayLength { array, dim, dims } => {
            let a = lower_expr(sess, array)?;
            if *dims == 1 {
                Ok(format!("new BigInteger(({}).Length)", a))
            } else {
                Ok(format!("new BigInteger(({}).GetLength({}))", a, dim))
            }
        }
        Expr::ArraySelect { array, indices } => {
            let a = lower_expr(sess, array)?;
            let mut idx = Vec::new();
            for i in indices {
                idx.push(format!("(int)({})", lower_expr(sess, i)?));
            }
            Ok(format!("({})[{}]", a, idx.join(", ")))
        }
        Expr::Call { callee, args } => Ok(format!(
            "{}({})",
            callee,
            lower_all(sess, args)?.join(", ")
        )),
    }
}

fn lower_all(sess: &Session, exprs: &[Expr]) -> Result<Vec<String>> {
    exprs.iter().map(|e| lower_expr(sess, e)).collect()
}

fn lower_binary(sess: &Session, op: BinOp, ty: &Type, lhs: &Expr, rhs: &Expr) -> Result<String> {
    let spec = op_spec(sess, op, ty);
    let mut a = lower_expr(sess, lhs)?;
    let mut b = lower_expr(sess, rhs)?;
    if spec.reverse_operands {
        std::mem::swap(&mut a, &mut b);
    }
    if spec.coerce_rhs_to_int {
        b = format!("(int)({})", b);
    }
    let mut out = match spec.style {
        OpStyle::Infix(sym) => format!("({}) {} ({})", a, sym, b),
        OpStyle::Method(name) => format!("({}).{}({})", a, name, b),
        OpStyle::Helper(name) => format!("{}({}, {})", name, a, b),
    };
    if spec.truncate_result {
        out = truncate_to_width(sess, ty, out);
    }
    if spec.negate_result {
        out = format!("!({})", out);
    }
    Ok(out)
}

/// Numeric representation classes the conversion matrix crosses.
enum NumKind {
    Big,
    Native(NativeWidth),
    Real,
}

fn num_kind(sess: &Session, ty: &Type) -> NumKind {
    match ty {
        Type::Real => NumKind::Real,
        Type::Int | Type::BigOrdinal => NumKind::Big,
        Type::Char => NumKind::Native(NativeWidth::UShort),
        Type::BitVector(w) => match sess.bitvector_repr(*w) {
            NativeRepr::Native(nw) => NumKind::Native(nw),
            NativeRepr::Big => NumKind::Big,
        },
        Type::Newtype(id) => match sess.newtype_repr(*id) {
            NativeRepr::Native(nw) => NumKind::Native(nw),
            NativeRepr::Big => num_kind(sess, &sess.registry.newtype(*id).base),
        },
        other => panic!("internal error: numeric conversion over {}", other),
    }
}

fn lower_conversion(sess: &Session, from: &Type, to: &Type, operand: &Expr) -> Result<String> {
    // A char target converts through its scalar value; BigInteger has no
    // direct char conversion.
    if matches!(to, Type::Char) {
        let e = lower_expr(sess, operand)?;
        return Ok(match num_kind(sess, from) {
            NumKind::Big => format!("(char)(int)({})", e),
            NumKind::Native(_) => format!("(char)({})", e),
            NumKind::Real => format!("(char)(int)(({}).ToBigInteger())", e),
        });
    }
    match (num_kind(sess, from), num_kind(sess, to)) {
        (NumKind::Big, NumKind::Big) | (NumKind::Real, NumKind::Real) => lower_expr(sess, operand),
        (NumKind::Big, NumKind::Native(w)) => lower_to_native(sess, w, operand),
        (NumKind::Big, NumKind::Real) => Ok(format!(
            "new Veil.BigRational({}, BigInteger.One)",
            lower_expr(sess, operand)?
        )),
        (NumKind::Native(_), NumKind::Big) => Ok(format!(
            "new BigInteger({})",
            lower_expr(sess, operand)?
        )),
        (NumKind::Native(_), NumKind::Native(w)) => Ok(format!(
            "({})({})",
            w.csharp_name(),
            lower_expr(sess, operand)?
        )),
        (NumKind::Native(_), NumKind::Real) => Ok(format!(
            "new Veil.BigRational(new BigInteger({}), BigInteger.One)",
            lower_expr(sess, operand)?
        )),
        (NumKind::Real, NumKind::Big) => Ok(format!(
            "({}).ToBigInteger()",
            lower_expr(sess, operand)?
        )),
        (NumKind::Real, NumKind::Native(w)) => Ok(format!(
            "({})(({}).ToBigInteger())",
            w.csharp_name(),
            lower_expr(sess, operand)?
        )),
    }
}

/// Conversion to a native width folds constant-like operands straight to the
/// target type; no arbitrary-precision intermediate is materialized for a
/// literal, a cardinality, or an array length.
fn lower_to_native(sess: &Session, w: NativeWidth, operand: &Expr) -> Result<String> {
    let name = w.csharp_name();
    match operand {
        Expr::Lit(Literal::Int(v)) => Ok(format!("({})({})", name, v)),
        Expr::Cardinality(inner) => Ok(format!(
            "({})(({}).Count)",
            name,
            lower_expr(sess, inner)?
        )),
        Expr::ArrayLength { array, dim, dims } => {
            let a = lower_expr(sess, array)?;
            if *dims == 1 {
                Ok(format!("({})(({}).Length)", name, a))
            } else {
                Ok(format!("({})(({}).GetLength({}))", name, a, dim))
            }
        }
        _ => Ok(format!("({})({})", name, lower_expr(sess, operand)?)),
    }
}

fn lower_literal(lit: &Literal) -> String {
    match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Char(c) => format!("'{}'", escape_char(*c)),
        Literal::Int(v) => big_integer_literal(v),
        Literal::Real { num, den } => format!(
            "new Veil.BigRational({}, {})",
            big_integer_literal(num),
            big_integer_literal(den)
        ),
        Literal::Null => "null".to_string(),
    }
}

fn big_integer_literal(v: &BigInt) -> String {
    if v.is_zero() {
        return "BigInteger.Zero".to_string();
    }
    match v.to_i64() {
        Some(small) => format!("new BigInteger({})", small),
        None => format!("BigInteger.Parse(\"{}\")", v),
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\0".to_string(),
        _ => c.to_string(),
    }
}
