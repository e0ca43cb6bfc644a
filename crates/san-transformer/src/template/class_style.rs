//! `:class` and `:style` bindings.
//!
//! San has no object or array syntax for these, so literal bindings are
//! expanded into interpolations and merged with the static attribute.

use crate::script::ScriptSource;
use swc_ecma_ast::{Expr, ExprOrSpread, Lit, ObjectLit, Prop, PropName, PropOrSpread};
use thiserror::Error;

/// Why a binding could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("only array and object literals are supported, found `{0}`")]
    NotLiteral(String),
    #[error("unsupported entry in `{0}`")]
    UnsupportedEntry(String),
    #[error("cannot parse `{0}`")]
    Parse(String),
}

/// Translates a `:class` value and merges it with the static `class` value.
///
/// `['a', b]` gives `{{ 'a' }} {{ b }}`, and `{active: isActive}` gives
/// `{{ isActive ? 'active' : '' }}`.
pub fn translate_class_binding(expression: &str, static_class: &str) -> Result<String, BindingError> {
    if !expression.contains(['[', ']', '{', '}']) {
        return Err(BindingError::NotLiteral(expression.to_string()));
    }

    let script = ScriptSource::new();
    let expr = parse(&script, expression)?;
    let unsupported = || BindingError::UnsupportedEntry(expression.to_string());

    let mut translated = String::new();
    match unwrap_parens(&expr) {
        Expr::Array(array) => {
            for element in array.elems.iter().flatten() {
                let ExprOrSpread { spread: None, expr } = element else {
                    return Err(unsupported());
                };
                translated.push_str(&format!(" {{{{ {} }}}}", script.print(&**expr)));
            }
        }
        Expr::Object(object) => {
            for (name, condition) in object_entries(object, false).ok_or_else(unsupported)? {
                translated.push_str(&format!(
                    " {{{{ {} ? '{}' : '' }}}}",
                    script.print(condition),
                    name
                ));
            }
        }
        _ => return Err(unsupported()),
    }

    Ok(format!("{static_class}{translated}").trim().to_string())
}

/// Translates a `:style` object value and merges it with the static `style` value.
///
/// `{fontSize: size, color: 'red'}` gives `font-size: {{ size }};color: red;`.
pub fn translate_style_binding(expression: &str, static_style: &str) -> Result<String, BindingError> {
    if !expression.contains(['{', '}']) {
        return Err(BindingError::NotLiteral(expression.to_string()));
    }

    let script = ScriptSource::new();
    let expr = parse(&script, expression)?;
    let unsupported = || BindingError::UnsupportedEntry(expression.to_string());

    let Expr::Object(object) = unwrap_parens(&expr) else {
        return Err(unsupported());
    };

    let mut translated = String::new();
    for (name, value) in object_entries(object, true).ok_or_else(unsupported)? {
        let value = match value {
            Expr::Lit(Lit::Str(s)) => s.value.to_string_lossy().into_owned(),
            other => format!("{{{{ {} }}}}", script.print(other)),
        };
        translated.push_str(&format!("{name}: {value};"));
    }

    let mut style = static_style.trim_end().to_string();
    if !style.is_empty() {
        if !style.ends_with(';') {
            style.push(';');
        }
    }
    style.push_str(&translated);
    Ok(style.trim().to_string())
}

fn parse(script: &ScriptSource, expression: &str) -> Result<Box<Expr>, BindingError> {
    script
        .parse_expression(expression)
        .map_err(|_| BindingError::Parse(expression.to_string()))
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        _ => expr,
    }
}

/// The `(name, value)` pairs of an object literal.
///
/// With `dashed`, camel-case names become dashed, except string keys that
/// already contain a dash. Returns `None` if any entry is a spread, a
/// computed key, or a method.
fn object_entries(object: &ObjectLit, dashed: bool) -> Option<Vec<(String, &Expr)>> {
    object
        .props
        .iter()
        .map(|prop| {
            let PropOrSpread::Prop(prop) = prop else {
                return None;
            };
            match &**prop {
                Prop::KeyValue(kv) => {
                    let name = match &kv.key {
                        PropName::Ident(ident) if dashed => camel_to_dashed(&ident.sym),
                        PropName::Ident(ident) => ident.sym.to_string(),
                        PropName::Str(s) => {
                            let name = s.value.to_string_lossy();
                            if !dashed || name.contains('-') {
                                name.into_owned()
                            } else {
                                camel_to_dashed(&name)
                            }
                        }
                        PropName::Num(n) => n.value.to_string(),
                        _ => return None,
                    };
                    Some((name, &*kv.value))
                }
                _ => None,
            }
        })
        .collect()
}

/// `fontSize` becomes `font-size`.
fn camel_to_dashed(name: &str) -> String {
    let mut dashed = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            dashed.push('-');
            dashed.push(c.to_ascii_lowercase());
        } else {
            dashed.push(c);
        }
    }
    dashed
}
