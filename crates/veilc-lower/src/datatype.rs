use crate::expr::is_directly_comparable;
use crate::session::Session;
use crate::types::{csharp_type, default_value};
use crate::Result;
use veilc_ast::{DatatypeDecl, DatatypeId, Type};
use veilc_emit::CodeSink;

/// Everything emission needs to know about one non-ghost field, computed up
/// front so the emission itself cannot fail halfway through a class body.
struct FieldInfo {
    name: String,
    cs_type: String,
    /// `==` suffices; otherwise structural `.Equals`.
    direct: bool,
    /// Native integral representation; hashes by unsigned widening.
    native: bool,
}

struct DtorInfo {
    name: String,
    cs_type: String,
    /// Indices of the constructors exposing this destructor, declaration
    /// order.
    ctors: Vec<usize>,
}

/// Lowers one datatype declaration into its C# encoding: an abstract marker
/// class, one variant class per constructor, a lazy thunk variant for
/// co-datatypes, and a value-wrapper struct carrying creators,
/// discriminators, and destructors.
pub fn compile_datatype(sess: &Session, id: DatatypeId, sink: &mut CodeSink) -> Result<()> {
    let decl = sess.registry.datatype(id);
    compile(sess, decl, sink).map_err(|e| e.at(decl.loc.clone()))
}

fn compile(sess: &Session, decl: &DatatypeDecl, sink: &mut CodeSink) -> Result<()> {
    let generic = if decl.type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", decl.type_params.join(", "))
    };
    let wrapper = format!("{}{}", decl.name, generic);
    let base = format!("Base_{}{}", decl.name, generic);
    let lazy = format!("{}__Lazy{}", decl.name, generic);
    let variant_names: Vec<String> = decl
        .ctors
        .iter()
        .map(|c| format!("{}_{}{}", decl.name, c.name, generic))
        .collect();

    // All fallible work happens before any text is appended, so a checked
    // error never leaves a half-emitted class behind.
    let mut fields: Vec<Vec<FieldInfo>> = Vec::new();
    for ctor in &decl.ctors {
        let mut infos = Vec::new();
        for formal in ctor.fields() {
            infos.push(FieldInfo {
                name: formal.name.clone(),
                cs_type: csharp_type(sess, &formal.typ)?,
                direct: is_directly_comparable(&formal.typ),
                native: sess.integral_repr(&formal.typ).is_native(),
            });
        }
        fields.push(infos);
    }

    let default_idx = decl.default_ctor_index();
    let mut default_args = Vec::new();
    for formal in decl.ctors[default_idx].fields() {
        default_args.push(field_default(sess, decl, &formal.typ)?);
    }

    let dtors = collect_destructors(decl, &fields);

    // 1. Marker class: nominal subtyping only, no members.
    sink.write_line(&format!("public abstract class {} {{ }}", base));

    for (i, ctor) in decl.ctors.iter().enumerate() {
        emit_variant(
            sink,
            decl,
            &variant_names[i],
            &base,
            &ctor.name,
            i,
            &fields[i],
        );
    }

    if decl.is_corecursive {
        emit_lazy_variant(sink, &base, &lazy);
    }

    emit_wrapper(
        sink,
        decl,
        &wrapper,
        &base,
        &lazy,
        &variant_names,
        &fields,
        default_idx,
        &default_args,
        &dtors,
    );

    Ok(())
}

/// Default argument for the designated constructor's fields. A co-recursive
/// field must not take the eager datatype default: evaluating it re-enters
/// `Default` before `theDefault` is assigned. It defers through the thunk,
/// which `_D`'s forcing loop unwinds on first read.
fn field_default(sess: &Session, decl: &DatatypeDecl, ty: &Type) -> Result<String> {
    if decl.is_corecursive {
        if let Type::Datatype(id, _) = ty {
            if sess.registry.datatype(*id).is_corecursive {
                let cs = csharp_type(sess, ty)?;
                let base = bare_name(&cs);
                let lazy = format!("{}__Lazy{}", base, &cs[base.len()..]);
                return Ok(format!("new {}(new {}(() => {}.Default._D))", cs, lazy, cs));
            }
        }
    }
    default_value(sess, ty)
}

fn collect_destructors(decl: &DatatypeDecl, fields: &[Vec<FieldInfo>]) -> Vec<DtorInfo> {
    let mut dtors: Vec<DtorInfo> = Vec::new();
    for (i, ctor_fields) in fields.iter().enumerate() {
        for field in ctor_fields {
            if let Some(existing) = dtors.iter_mut().find(|d| d.name == field.name) {
                // Resolver invariant: a shared destructor has one type.
                if existing.cs_type != field.cs_type {
                    panic!(
                        "internal error: destructor {}.{} changes type across constructors",
                        decl.name, field.name
                    );
                }
                existing.ctors.push(i);
            } else {
                dtors.push(DtorInfo {
                    name: field.name.clone(),
                    cs_type: field.cs_type.clone(),
                    ctors: vec![i],
                });
            }
        }
    }
    dtors
}

fn emit_variant(
    sink: &mut CodeSink,
    decl: &DatatypeDecl,
    variant: &str,
    base: &str,
    ctor_name: &str,
    ordinal: usize,
    fields: &[FieldInfo],
) {
    sink.block(&format!("public class {} : {}", variant, base), |s| {
        for f in fields {
            s.write_line(&format!("public readonly {} {};", f.cs_type, f.name));
        }

        let params = fields
            .iter()
            .map(|f| format!("{} {}", f.cs_type, f.name))
            .collect::<Vec<_>>()
            .join(", ");
        let ctor_header = format!("public {}({})", bare_name(variant), params);
        s.block(&ctor_header, |s| {
            for f in fields {
                s.write_line(&format!("this.{} = {};", f.name, f.name));
            }
        });

        s.block("public override bool Equals(object other)", |s| {
            s.write_line(&format!("var oth = other as {};", variant));
            let mut cond = String::from("oth != null");
            for f in fields {
                if f.direct {
                    cond.push_str(&format!(" && this.{} == oth.{}", f.name, f.name));
                } else {
                    cond.push_str(&format!(" && this.{}.Equals(oth.{})", f.name, f.name));
                }
            }
            s.write_line(&format!("return {};", cond));
        });

        s.block("public override int GetHashCode()", |s| {
            s.write_line("ulong hash = 5381;");
            s.write_line(&format!("hash = ((hash << 5) + hash) + {};", ordinal));
            for f in fields {
                let contribution = if f.native {
                    format!("((ulong) this.{})", f.name)
                } else {
                    format!("((ulong) this.{}.GetHashCode())", f.name)
                };
                s.write_line(&format!("hash = ((hash << 5) + hash) + {};", contribution));
            }
            s.write_line("return (int) hash;");
        });

        // Co-datatypes are not printable: forcing could diverge.
        if !decl.is_corecursive {
            emit_variant_to_string(s, decl, ctor_name, fields);
        }
    });
}

fn emit_variant_to_string(
    sink: &mut CodeSink,
    decl: &DatatypeDecl,
    ctor_name: &str,
    fields: &[FieldInfo],
) {
    sink.block("public override string ToString()", |s| {
        if fields.is_empty() {
            if decl.is_tuple() {
                s.write_line("return \"()\";");
            } else {
                s.write_line(&format!("return \"{}\";", ctor_name));
            }
            return;
        }
        if decl.is_tuple() {
            s.write_line("string s = \"(\";");
        } else {
            s.write_line(&format!("string s = \"{}(\";", ctor_name));
        }
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                s.write_line("s += \", \";");
            }
            s.write_line(&format!("s += this.{}.ToString();", f.name));
        }
        s.write_line("s += \")\";");
        s.write_line("return s;");
    });
}

/// The single place interior mutation of an otherwise immutable value is
/// permitted: the thunk runs at most once, under a lock so racing readers
/// still observe idempotent forcing.
fn emit_lazy_variant(sink: &mut CodeSink, base: &str, lazy: &str) {
    sink.block(&format!("public class {} : {}", lazy, base), |s| {
        s.write_line(&format!("public delegate {} Computer();", base));
        s.write_line("Computer c;");
        s.write_line(&format!("{} d;", base));
        s.block(&format!("public {}(Computer c)", bare_name(lazy)), |s| {
            s.write_line("this.c = c;");
        });
        s.block(&format!("public {} Get()", base), |s| {
            s.block("lock (this)", |s| {
                s.block("if (c != null)", |s| {
                    s.write_line("d = c();");
                    s.write_line("c = null;");
                });
            });
            s.write_line("return d;");
        });
    });
}

#[allow(clippy::too_many_arguments)]
fn emit_wrapper(
    sink: &mut CodeSink,
    decl: &DatatypeDecl,
    wrapper: &str,
    base: &str,
    lazy: &str,
    variant_names: &[String],
    fields: &[Vec<FieldInfo>],
    default_idx: usize,
    default_args: &[String],
    dtors: &[DtorInfo],
) {
    sink.block(&format!("public struct {}", wrapper), |s| {
        s.write_line(&format!("{} _d;", base));

        // Reading the representation lazily installs the cached default and,
        // for co-datatypes, forces through the thunk so callers never see it.
        s.block(&format!("public {} _D", base), |s| {
            s.block("get", |s| {
                s.block("if (_d == null)", |s| {
                    s.write_line("_d = Default._d;");
                });
                if decl.is_corecursive {
                    s.block(&format!("while (_d is {})", lazy), |s| {
                        s.write_line(&format!("_d = (({})_d).Get();", lazy));
                    });
                }
                s.write_line("return _d;");
            });
        });

        s.block(&format!("public {}({} d)", bare_name(wrapper), base), |s| {
            s.write_line("this._d = d;");
        });

        s.write_line(&format!("static {} theDefault;", base));
        s.block(&format!("public static {} Default", wrapper), |s| {
            s.block("get", |s| {
                s.block("if (theDefault == null)", |s| {
                    s.write_line(&format!(
                        "theDefault = new {}({});",
                        variant_names[default_idx],
                        default_args.join(", ")
                    ));
                });
                s.write_line(&format!("return new {}(theDefault);", wrapper));
            });
        });

        s.block("public override bool Equals(object other)", |s| {
            s.write_line(&format!(
                "return other is {} && _D.Equals((({})other)._D);",
                wrapper, wrapper
            ));
        });
        s.block("public override int GetHashCode()", |s| {
            s.write_line("return _D.GetHashCode();");
        });
        if !decl.is_corecursive {
            s.block("public override string ToString()", |s| {
                s.write_line("return _D.ToString();");
            });
        }

        for (i, ctor) in decl.ctors.iter().enumerate() {
            let params = fields[i]
                .iter()
                .map(|f| format!("{} {}", f.cs_type, f.name))
                .collect::<Vec<_>>()
                .join(", ");
            let args = fields[i]
                .iter()
                .map(|f| f.name.clone())
                .collect::<Vec<_>>()
                .join(", ");
            s.block(
                &format!("public static {} create_{}({})", wrapper, ctor.name, params),
                |s| {
                    s.write_line(&format!(
                        "return new {}(new {}({}));",
                        wrapper, variant_names[i], args
                    ));
                },
            );
        }

        for (i, ctor) in decl.ctors.iter().enumerate() {
            s.block(&format!("public bool is_{}", ctor.name), |s| {
                s.block("get", |s| {
                    s.write_line(&format!("return _D is {};", variant_names[i]));
                });
            });
        }

        if decl.has_finite_values {
            emit_enumerator(s, decl, wrapper);
        }

        for dtor in dtors {
            emit_destructor(s, variant_names, dtor);
        }
    });
}

/// One instance per zero-argument constructor.
fn emit_enumerator(sink: &mut CodeSink, decl: &DatatypeDecl, wrapper: &str) {
    sink.block(
        &format!(
            "public static System.Collections.Generic.IEnumerable<{}> AllSingletonConstructors",
            wrapper
        ),
        |s| {
            s.block("get", |s| {
                for ctor in &decl.ctors {
                    if !ctor.has_fields() {
                        s.write_line(&format!("yield return {}.create_{}();", wrapper, ctor.name));
                    }
                }
            });
        },
    );
}

fn emit_destructor(sink: &mut CodeSink, variant_names: &[String], dtor: &DtorInfo) {
    sink.block(&format!("public {} dtor_{}", dtor.cs_type, dtor.name), |s| {
        s.block("get", |s| {
            if dtor.ctors.len() == 1 {
                // Only one constructor can flow here; the resolver proved it.
                s.write_line(&format!(
                    "return (({})_D).{};",
                    variant_names[dtor.ctors[0]], dtor.name
                ));
                return;
            }
            // Cascade: test every enclosing constructor but the last, then
            // fall through unconditionally. Valid by elimination, and one
            // test cheaper.
            s.write_line("var d = _D;");
            let (last, rest) = dtor.ctors.split_last().unwrap();
            for &i in rest {
                s.block(&format!("if (d is {})", variant_names[i]), |s| {
                    s.write_line(&format!("return (({})d).{};", variant_names[i], dtor.name));
                });
            }
            s.write_line(&format!(
                "return (({})d).{};",
                variant_names[*last], dtor.name
            ));
        });
    });
}

/// Class name without its generic suffix, for constructor declarations.
fn bare_name(name: &str) -> &str {
    match name.find('<') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
