use crate::expr::lower_expr;
use crate::session::Session;
use crate::types::{csharp_type, default_value};
use crate::{LowerError, Result};
use veilc_ast::{Formal, MethodDecl, Stmt};
use veilc_emit::CodeSink;

/// Per-method lowering context: formal names for tail-call reassignment and
/// out-parameter returns.
struct MethodCtx<'m> {
    ins: &'m [Formal],
    outs: &'m [Formal],
}

pub fn lower_method(sess: &Session, method: &MethodDecl, sink: &mut CodeSink) -> Result<()> {
    lower(sess, method, sink).map_err(|e| e.at(method.loc.clone()))
}

fn lower(sess: &Session, method: &MethodDecl, sink: &mut CodeSink) -> Result<()> {
    if let Some(ext) = &method.external {
        if ext.args.len() > 2 {
            return Err(LowerError::MalformedExtern {
                loc: method.loc.clone(),
                name: method.name.clone(),
                count: ext.args.len(),
            });
        }
        if !method.body.is_empty() {
            return Err(LowerError::ExternHasBody {
                loc: method.loc.clone(),
                name: method.name.clone(),
            });
        }
        // The body lives in the external library; nothing to emit.
        sink.write_line(&format!("// extern method {}", method.name));
        return Ok(());
    }

    let generic = if method.type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", method.type_params.join(", "))
    };
    let mut params = Vec::new();
    for f in &method.ins {
        params.push(format!("{} {}", csharp_type(sess, &f.typ)?, f.name));
    }
    for f in &method.outs {
        params.push(format!("out {} {}", csharp_type(sess, &f.typ)?, f.name));
    }

    // All emission text is resolved before the block opens; see datatype.rs.
    let out_inits: Vec<String> = method
        .outs
        .iter()
        .map(|f| default_value(sess, &f.typ).map(|d| format!("{} = {};", f.name, d)))
        .collect::<Result<_>>()?;
    let ctx = MethodCtx {
        ins: &method.ins,
        outs: &method.outs,
    };
    let body = lower_stmts_to_string(sess, &ctx, &method.body)?;

    sink.begin_block(&format!(
        "public static void {}{}({})",
        method.name,
        generic,
        params.join(", ")
    ));
    for init in &out_inits {
        sink.write_line(init);
    }
    if method.is_tail_recursive {
        // Re-entry point: a tail call becomes a jump here, not a native
        // recursive call.
        sink.write_line("TAIL_CALL_START: ;");
    }
    sink.append(&body);
    sink.end_block();
    Ok(())
}

fn lower_stmts_to_string(sess: &Session, ctx: &MethodCtx, stmts: &[Stmt]) -> Result<String> {
    let mut sink = CodeSink::new();
    lower_stmts(sess, ctx, stmts, &mut sink)?;
    Ok(sink.finish())
}

fn lower_stmts(
    sess: &Session,
    ctx: &MethodCtx,
    stmts: &[Stmt],
    sink: &mut CodeSink,
) -> Result<()> {
    for stmt in stmts {
        lower_stmt(sess, ctx, stmt, sink)?;
    }
    Ok(())
}

fn lower_stmt(sess: &Session, ctx: &MethodCtx, stmt: &Stmt, sink: &mut CodeSink) -> Result<()> {
    match stmt {
        Stmt::VarDecl { name, ty, init } => {
            let cs = csharp_type(sess, ty)?;
            let value = match init {
                Some(e) => lower_expr(sess, e)?,
                None => default_value(sess, ty)?,
            };
            sink.write_line(&format!("{} {} = {};", cs, name, value));
        }
        Stmt::Assign { target, value } => {
            sink.write_line(&format!("{} = {};", target, lower_expr(sess, value)?));
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            sink.begin_block(&format!("if ({})", lower_expr(sess, cond)?));
            lower_stmts(sess, ctx, then_branch, sink)?;
            if else_branch.is_empty() {
                sink.end_block();
            } else {
                sink.dedent();
                sink.write_line("} else {");
                sink.indent();
                lower_stmts(sess, ctx, else_branch, sink)?;
                sink.end_block();
            }
        }
        Stmt::While { cond, body } => {
            let header = match cond {
                Some(c) => format!("while ({})", lower_expr(sess, c)?),
                None => "while (true)".to_string(),
            };
            sink.begin_block(&header);
            lower_stmts(sess, ctx, body, sink)?;
            sink.end_block();
        }
        Stmt::Labeled { label, body } => {
            lower_stmts(sess, ctx, body, sink)?;
            // Forward-jump target for labeled breaks inside `body`.
            sink.write_line(&format!("after_{}: ;", label));
        }
        Stmt::Break { label } => match label {
            Some(label) => sink.write_line(&format!("goto after_{};", label)),
            None => sink.write_line("break;"),
        },
        Stmt::Return { values } => {
            for (formal, value) in ctx.outs.iter().zip(values) {
                sink.write_line(&format!("{} = {};", formal.name, lower_expr(sess, value)?));
            }
            sink.write_line("return;");
        }
        Stmt::TailCall { args } => {
            // Every argument is evaluated before any formal is reassigned; a
            // partially updated parameter must never leak into a later
            // argument expression.
            for (i, arg) in args.iter().enumerate() {
                sink.write_line(&format!("var _in{} = {};", i, lower_expr(sess, arg)?));
            }
            for (i, formal) in ctx.ins.iter().enumerate() {
                sink.write_line(&format!("{} = _in{};", formal.name, i));
            }
            sink.write_line("goto TAIL_CALL_START;");
        }
        Stmt::Call { outs, callee, args } => {
            let mut rendered = Vec::new();
            for arg in args {
                rendered.push(lower_expr(sess, arg)?);
            }
            for out in outs {
                rendered.push(format!("out {}", out));
            }
            sink.write_line(&format!("{}({});", callee, rendered.join(", ")));
        }
        Stmt::Print { args } => {
            for arg in args {
                sink.write_line(&format!("Veil.Helpers.Print({});", lower_expr(sess, arg)?));
            }
        }
        Stmt::WitnessSearch { index, body } => {
            // Doubling search over an arbitrary-precision index with no
            // declared upper bound.
            sink.begin_block(&format!(
                "for (BigInteger {0} = BigInteger.One; ; {0} = {0} * 2)",
                index
            ));
            lower_stmts(sess, ctx, body, sink)?;
            sink.end_block();
        }
        Stmt::Unreachable => {
            // Reaching this at run time means the resolver's proof was
            // unsound; abort, never fall through.
            sink.write_line("throw new System.Exception(\"unexpected control point\");");
        }
    }
    Ok(())
}
