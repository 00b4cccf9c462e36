use crate::datatype::compile_datatype;
use crate::session::Session;
use crate::stmt::lower_method;
use crate::types::companion_type_name;
use crate::LowerError;
use veilc_ast::Program;
use veilc_emit::CodeSink;

/// One lowering run: walks the program declaration by declaration and
/// produces a single C# compilation unit. A checked error skips only the
/// declaration that raised it; the error is reported alongside a placeholder
/// comment and lowering continues.
pub struct Lowering<'a> {
    program: &'a Program,
    session: Session<'a>,
}

impl<'a> Lowering<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            session: Session::new(&program.registry),
        }
    }

    pub fn session(&self) -> &Session<'a> {
        &self.session
    }

    pub fn run(&self, sink: &mut CodeSink) -> Vec<LowerError> {
        let mut errors = Vec::new();

        sink.write_line("// <auto-generated> lowered from Veil source; do not edit.");
        sink.write_line("using System;");
        sink.write_line("using System.Numerics;");
        sink.blank_line();
        sink.begin_block("namespace _module");

        for (id, decl) in &self.program.registry.classes {
            if let Some(ext) = &decl.external {
                if ext.args.len() > 2 {
                    let err = LowerError::MalformedExtern {
                        loc: decl.loc.clone(),
                        name: decl.name.clone(),
                        count: ext.args.len(),
                    };
                    sink.write_line(&format!("// skipped class {}: {}", decl.name, err));
                    errors.push(err);
                    continue;
                }
            }
            if decl.is_trait {
                let generic = generic_suffix(&decl.type_params);
                sink.write_line(&format!("public interface {}{} {{ }}", decl.name, generic));
                // Static members of a trait live in a companion holder, kept
                // apart from the per-instance interface type.
                sink.write_line(&format!(
                    "public class {}{} {{ }}",
                    companion_type_name(&self.session, *id),
                    generic
                ));
            }
        }
        sink.blank_line();

        for (id, decl) in &self.program.registry.datatypes {
            let mut sub = CodeSink::new();
            match compile_datatype(&self.session, *id, &mut sub) {
                Ok(()) => {
                    sink.append(sub.as_str());
                    sink.blank_line();
                }
                Err(err) => {
                    sink.write_line(&format!("// skipped datatype {}: {}", decl.name, err));
                    errors.push(err);
                }
            }
        }

        sink.begin_block("public partial class _Module");
        for method in &self.program.methods {
            let mut sub = CodeSink::new();
            match lower_method(&self.session, method, &mut sub) {
                Ok(()) => sink.append(sub.as_str()),
                Err(err) => {
                    sink.write_line(&format!("// skipped method {}: {}", method.name, err));
                    errors.push(err);
                }
            }
        }
        sink.end_block();

        sink.end_block();
        errors
    }

    pub fn run_to_string(&self) -> (String, Vec<LowerError>) {
        let mut sink = CodeSink::new();
        let errors = self.run(&mut sink);
        (sink.finish(), errors)
    }
}

fn generic_suffix(type_params: &[String]) -> String {
    if type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", type_params.join(", "))
    }
}
