//! Locating and rewriting component options literals.
//!
//! A component is either `export default { ... }` or `new Vue({ ... })`
//! (any configured constructor), optionally wrapped in parentheses or a
//! TypeScript assertion. An instantiation may sit at the root of a call
//! chain such as `new Vue({ ... }).$mount('#app')`.

use super::accessors::rewrite_accessors;
use super::build::{dotted_path, returning_function};
use crate::diagnostic::{report, Diagnostic, DiagnosticCode};
use crate::error::RewriteError;
use crate::options::ConvertOptions;
use swc_common::util::take::Take;
use swc_ecma_ast::{
    Callee, Decl, Expr, Function, IdentName, KeyValueProp, Module, ModuleDecl, ModuleItem,
    NewExpr, ObjectLit, Prop, PropName, PropOrSpread, Stmt,
};

/// Returns every component options literal in a module, in source order.
pub fn find_component_literals<'m>(
    module: &'m Module,
    options: &ConvertOptions,
) -> Vec<&'m ObjectLit> {
    let mut literals = Vec::new();
    for item in &module.body {
        for expr in candidate_exprs(item) {
            match unwrap_assertions(expr) {
                Expr::Object(object) if is_default_export(item) => literals.push(object),
                expr => {
                    if let Some(object) =
                        instantiation(expr).and_then(|new| instantiated_literal(new, options))
                    {
                        literals.push(object);
                    }
                }
            }
        }
    }
    literals
}

/// Like [`find_component_literals`], but also replaces the constructor of
/// every instantiation with the component factory.
pub(crate) fn locate_component_literals<'m>(
    module: &'m mut Module,
    options: &ConvertOptions,
) -> Vec<&'m mut ObjectLit> {
    let mut literals = Vec::new();
    for item in &mut module.body {
        let default_export = is_default_export(item);
        for expr in candidate_exprs_mut(item) {
            match (default_export, unwrap_assertions_mut(expr)) {
                (true, Expr::Object(object)) => literals.push(object),
                (_, expr) => {
                    let Some(new) = instantiation_mut(expr) else {
                        continue;
                    };
                    if instantiated_literal(new, options).is_none() {
                        continue;
                    }
                    new.callee = Box::new(dotted_path(&options.component_factory));
                    if let Some(Expr::Object(object)) = new
                        .args
                        .as_mut()
                        .and_then(|args| args.first_mut())
                        .map(|arg| &mut *arg.expr)
                    {
                        literals.push(object);
                    }
                }
            }
        }
    }
    literals
}

/// The `new` expression at the root of a call or member chain, as in
/// `new Vue({ ... }).$mount('#app')`.
fn instantiation(expr: &Expr) -> Option<&NewExpr> {
    match unwrap_assertions(expr) {
        Expr::New(new) => Some(new),
        Expr::Member(member) => instantiation(&member.obj),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => instantiation(callee),
            _ => None,
        },
        _ => None,
    }
}

fn instantiation_mut(expr: &mut Expr) -> Option<&mut NewExpr> {
    match unwrap_assertions_mut(expr) {
        Expr::New(new) => Some(new),
        Expr::Member(member) => instantiation_mut(&mut member.obj),
        Expr::Call(call) => match &mut call.callee {
            Callee::Expr(callee) => instantiation_mut(callee),
            _ => None,
        },
        _ => None,
    }
}

fn is_default_export(item: &ModuleItem) -> bool {
    matches!(item, ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(_)))
}

/// Top-level expressions that may hold a component: the default export,
/// expression statements, and variable initializers.
fn candidate_exprs(item: &ModuleItem) -> Vec<&Expr> {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => vec![&*export.expr],
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
            Decl::Var(var) => var.decls.iter().filter_map(|d| d.init.as_deref()).collect(),
            _ => Vec::new(),
        },
        ModuleItem::Stmt(Stmt::Expr(stmt)) => vec![&*stmt.expr],
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
            var.decls.iter().filter_map(|d| d.init.as_deref()).collect()
        }
        _ => Vec::new(),
    }
}

fn candidate_exprs_mut(item: &mut ModuleItem) -> Vec<&mut Expr> {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => vec![&mut *export.expr],
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &mut export.decl {
            Decl::Var(var) => var
                .decls
                .iter_mut()
                .filter_map(|d| d.init.as_deref_mut())
                .collect(),
            _ => Vec::new(),
        },
        ModuleItem::Stmt(Stmt::Expr(stmt)) => vec![&mut *stmt.expr],
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => var
            .decls
            .iter_mut()
            .filter_map(|d| d.init.as_deref_mut())
            .collect(),
        _ => Vec::new(),
    }
}

fn unwrap_assertions(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(e) => unwrap_assertions(&e.expr),
        Expr::TsAs(e) => unwrap_assertions(&e.expr),
        Expr::TsTypeAssertion(e) => unwrap_assertions(&e.expr),
        Expr::TsSatisfies(e) => unwrap_assertions(&e.expr),
        Expr::TsConstAssertion(e) => unwrap_assertions(&e.expr),
        _ => expr,
    }
}

fn unwrap_assertions_mut(expr: &mut Expr) -> &mut Expr {
    match expr {
        Expr::Paren(e) => unwrap_assertions_mut(&mut e.expr),
        Expr::TsAs(e) => unwrap_assertions_mut(&mut e.expr),
        Expr::TsTypeAssertion(e) => unwrap_assertions_mut(&mut e.expr),
        Expr::TsSatisfies(e) => unwrap_assertions_mut(&mut e.expr),
        Expr::TsConstAssertion(e) => unwrap_assertions_mut(&mut e.expr),
        other => other,
    }
}

/// The options literal of `new <Constructor>({ ... })`.
fn instantiated_literal<'a>(new: &'a NewExpr, options: &ConvertOptions) -> Option<&'a ObjectLit> {
    let Expr::Ident(callee) = &*new.callee else {
        return None;
    };
    if !options.is_constructor(&callee.sym) {
        return None;
    }
    match new.args.as_ref()?.first() {
        Some(arg) if arg.spread.is_none() => match &*arg.expr {
            Expr::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

/// Rewrites one component options literal.
///
/// - `data` becomes the initializer, wrapped in a function if it is a plain value.
/// - Members of `methods` move to the top level, with data access rewritten.
/// - Computed property bodies get their data access rewritten in place.
pub fn translate_component_literal(
    literal: &mut ObjectLit,
    options: &ConvertOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), RewriteError> {
    let mut hoisted = Vec::new();

    for prop in std::mem::take(&mut literal.props) {
        let PropOrSpread::Prop(mut prop) = prop else {
            literal.props.push(prop);
            continue;
        };
        match field_name(&prop).as_deref() {
            Some("data") => {
                translate_data(&mut prop, options, diagnostics);
                literal.props.push(PropOrSpread::Prop(prop));
            }
            Some("methods") => match *prop {
                Prop::KeyValue(kv) => match *kv.value {
                    Expr::Object(methods) => {
                        for mut member in methods.props {
                            if let PropOrSpread::Prop(method) = &mut member {
                                rewrite_function_member(method, options, diagnostics)?;
                            }
                            hoisted.push(member);
                        }
                    }
                    value => literal.props.push(PropOrSpread::Prop(Box::new(Prop::KeyValue(
                        KeyValueProp {
                            key: kv.key,
                            value: Box::new(value),
                        },
                    )))),
                },
                other => literal.props.push(PropOrSpread::Prop(Box::new(other))),
            },
            Some("computed") => {
                if let Prop::KeyValue(kv) = &mut *prop {
                    if let Expr::Object(computed) = &mut *kv.value {
                        translate_computed(computed, options, diagnostics)?;
                    }
                }
                literal.props.push(PropOrSpread::Prop(prop));
            }
            _ => literal.props.push(PropOrSpread::Prop(prop)),
        }
    }

    literal.props.extend(hoisted);
    Ok(())
}

fn field_name(prop: &Prop) -> Option<String> {
    let key = match prop {
        Prop::KeyValue(kv) => &kv.key,
        Prop::Method(method) => &method.key,
        Prop::Shorthand(ident) => return Some(ident.sym.to_string()),
        _ => return None,
    };
    prop_name(key)
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().into_owned()),
        _ => None,
    }
}

fn translate_data(prop: &mut Prop, options: &ConvertOptions, diagnostics: &mut Vec<Diagnostic>) {
    let initializer = options.initializer.as_str();
    match prop {
        Prop::Method(method) => {
            rename(&mut method.key, initializer);
            check_data_params(method.function.params.is_empty(), diagnostics);
        }
        Prop::KeyValue(kv) => {
            rename(&mut kv.key, initializer);
            match &mut *kv.value {
                Expr::Fn(f) => check_data_params(f.function.params.is_empty(), diagnostics),
                Expr::Arrow(arrow) => check_data_params(arrow.params.is_empty(), diagnostics),
                value => {
                    let value = Box::new(value.take());
                    *kv.value = returning_function(value);
                }
            }
        }
        Prop::Shorthand(ident) => {
            let value = Box::new(Expr::Ident(ident.clone()));
            let key = PropName::Ident(IdentName::new(initializer.into(), ident.span));
            *prop = Prop::KeyValue(KeyValueProp {
                key,
                value: Box::new(returning_function(value)),
            });
        }
        _ => {}
    }
}

fn check_data_params(parameterless: bool, diagnostics: &mut Vec<Diagnostic>) {
    if !parameterless {
        report(
            diagnostics,
            Diagnostic::new(
                DiagnosticCode::UnsupportedDataInitializer,
                "`data` takes arguments; it was renamed but not otherwise converted",
            ),
        );
    }
}

fn rename(key: &mut PropName, name: &str) {
    let span = match key {
        PropName::Ident(ident) => ident.span,
        PropName::Str(s) => s.span,
        _ => swc_common::DUMMY_SP,
    };
    *key = PropName::Ident(IdentName::new(name.into(), span));
}

/// Rewrites the body of a method-shaped member. Other members are untouched.
fn rewrite_function_member(
    prop: &mut Prop,
    options: &ConvertOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), RewriteError> {
    match prop {
        Prop::Method(method) => rewrite_function(&mut method.function, options, diagnostics),
        Prop::KeyValue(kv) => match &mut *kv.value {
            Expr::Fn(f) => rewrite_function(&mut f.function, options, diagnostics),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn translate_computed(
    computed: &mut ObjectLit,
    options: &ConvertOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), RewriteError> {
    for member in &mut computed.props {
        let PropOrSpread::Prop(prop) = member else {
            continue;
        };
        if let Prop::KeyValue(kv) = &mut **prop {
            if let Expr::Object(accessors) = &mut *kv.value {
                // `{ get() {}, set(v) {} }`
                for accessor in &mut accessors.props {
                    if let PropOrSpread::Prop(accessor) = accessor {
                        rewrite_function_member(accessor, options, diagnostics)?;
                    }
                }
                continue;
            }
        }
        rewrite_function_member(prop, options, diagnostics)?;
    }
    Ok(())
}

fn rewrite_function(
    function: &mut Function,
    options: &ConvertOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), RewriteError> {
    let Some(body) = &mut function.body else {
        return Ok(());
    };
    let summary = rewrite_accessors(body, &options.data_accessor)?;
    tracing::debug!(replacements = summary.rewritten, "rewrote data accesses");
    for target in summary.unsupported_targets {
        report(
            diagnostics,
            Diagnostic::new(
                DiagnosticCode::UnsupportedAssignmentTarget,
                format!("`{target}` is assigned through a pattern and was left as is"),
            ),
        );
    }
    Ok(())
}
