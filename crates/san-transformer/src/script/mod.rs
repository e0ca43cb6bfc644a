//! Script translation.
//!
//! The `<script>` block is parsed with SWC, every component options literal
//! is located and rewritten in place, and the module is printed back with
//! its comments. Method heads are then tightened to `name() {`.

mod accessors;
mod build;
mod component;
mod format;
mod path;

pub use accessors::{
    apply_replacements, classify_accesses, rewrite_accessors, AccessKind, ClassifiedAccess,
    NodeId, RewriteSummary, MUTATING_METHODS,
};
pub use component::{find_component_literals, translate_component_literal};
pub use path::{build_access_path, AccessChain, Segment};

use crate::diagnostic::Diagnostic;
use crate::error::ConvertError;
use crate::options::ConvertOptions;
use swc_common::comments::SingleThreadedComments;
use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::{Expr, Module};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// The result of translating a script block.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// The printed module.
    pub code: String,
    /// Non-fatal issues found while rewriting.
    pub diagnostics: Vec<Diagnostic>,
}

/// Translates the content of a `<script>` block.
///
/// A script without any component literal is still parsed and printed, so it
/// comes back normalized but otherwise unchanged.
pub fn translate_script(
    source: &str,
    options: &ConvertOptions,
) -> Result<ScriptOutput, ConvertError> {
    let script = ScriptSource::new();
    let mut module = script.parse_module(source)?;
    let mut diagnostics = Vec::new();

    let literals = component::locate_component_literals(&mut module, options);
    tracing::debug!(literals = literals.len(), "located component options");
    for literal in literals {
        translate_component_literal(literal, options, &mut diagnostics)?;
    }

    let code = format::tighten_method_heads(&script.print(&module), &module);
    Ok(ScriptOutput { code, diagnostics })
}

/// Source map and comment store shared by parsing and printing.
///
/// Nodes must be printed with the same `ScriptSource` they were parsed with,
/// since the printer resolves original spans against its source map.
pub struct ScriptSource {
    cm: Lrc<SourceMap>,
    comments: SingleThreadedComments,
}

impl Default for ScriptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptSource {
    /// Creates an empty source map.
    pub fn new() -> Self {
        Self {
            cm: Lrc::new(SourceMap::default()),
            comments: SingleThreadedComments::default(),
        }
    }

    fn syntax() -> Syntax {
        Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        })
    }

    /// Parses a module, keeping its comments.
    pub fn parse_module(&self, source: &str) -> Result<Module, ConvertError> {
        let fm = self.cm.new_source_file(
            Lrc::new(FileName::Custom("component.ts".into())),
            source.to_string(),
        );
        let mut parser = Parser::new(
            Self::syntax(),
            StringInput::from(&*fm),
            Some(&self.comments),
        );
        parser.parse_module().map_err(|err| ConvertError::ScriptParse {
            message: err.kind().msg().into_owned(),
        })
    }

    /// Parses a standalone expression such as a binding value.
    pub fn parse_expression(&self, source: &str) -> Result<Box<Expr>, ConvertError> {
        let fm = self.cm.new_source_file(
            Lrc::new(FileName::Custom("binding.ts".into())),
            source.to_string(),
        );
        let mut parser = Parser::new(Self::syntax(), StringInput::from(&*fm), None);
        parser.parse_expr().map_err(|err| ConvertError::ScriptParse {
            message: err.kind().msg().into_owned(),
        })
    }

    /// Prints a node as code.
    pub fn print<N: swc_ecma_codegen::Node>(&self, node: &N) -> String {
        swc_ecma_codegen::to_code_default(self.cm.clone(), Some(&self.comments), node)
    }
}
