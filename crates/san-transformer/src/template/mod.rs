//! Template translation.
//!
//! Walks the markup tree depth-first and rewrites Vue directive attributes
//! into their San forms:
//!
//! | Vue                      | San                            |
//! |--------------------------|--------------------------------|
//! | `v-if`, `v-show`         | `s-if`                         |
//! | `v-for="(a, i) in xs"`   | `s-for="a, i in xs"`           |
//! | `v-for` with `:key="k"`  | `s-for="... trackBy k"`        |
//! | `v-model="x"`            | `value="{= x =}"`              |
//! | `@click="f"`             | `on-click="f"`                 |
//! | `:href="x"`              | `href="{{ x }}"`               |
//! | `:class`, `:style`       | merged interpolations          |

mod class_style;
mod directive;

pub use class_style::{translate_class_binding, translate_style_binding, BindingError};
pub use directive::Directive;

use crate::diagnostic::{report, Diagnostic, DiagnosticCode};
use sfc_markup::{Document, Element, Node};

/// Translates every element of a document in place.
pub fn translate_template(document: &mut Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    translate_nodes(&mut document.nodes, &mut diagnostics);
    diagnostics
}

/// Translates a list of sibling nodes and everything below them.
pub fn translate_nodes(nodes: &mut [Node], diagnostics: &mut Vec<Diagnostic>) {
    for node in nodes {
        split_loop_condition(node);
        if let Node::Element(element) = node {
            translate_element(element, diagnostics);
            translate_nodes(&mut element.children, diagnostics);
        }
    }
}

/// Moves `v-for` (and its key) off an element that also has `v-if` into a
/// wrapping `<template>`, so the condition is checked per item.
fn split_loop_condition(node: &mut Node) {
    let Node::Element(element) = node else {
        return;
    };
    let directives: Vec<_> = element
        .attributes
        .iter()
        .map(|attr| Directive::parse(&attr.name))
        .collect();
    let has = |wanted: Directive| directives.iter().flatten().any(|d| *d == wanted);
    if !(has(Directive::For) && has(Directive::If)) {
        return;
    }

    let mut wrapper = Element::new("template");
    let mut kept = Vec::with_capacity(element.attributes.len());
    for (attr, directive) in element.attributes.drain(..).zip(&directives) {
        match directive {
            Some(directive) if *directive == Directive::For || directive.is_key() => {
                wrapper.attributes.push(attr)
            }
            _ => kept.push(attr),
        }
    }
    element.attributes = kept;

    tracing::debug!(element = %element.name, "wrapping loop with condition in <template>");
    let original = std::mem::replace(node, Node::Element(wrapper));
    if let Node::Element(wrapper) = node {
        wrapper.children.push(original);
    }
}

fn translate_element(element: &mut Element, diagnostics: &mut Vec<Diagnostic>) {
    let directives: Vec<_> = element
        .attributes
        .iter()
        .map(|attr| Directive::parse(&attr.name))
        .collect();
    let key = if directives.contains(&Some(Directive::For)) {
        directives
            .iter()
            .position(|d| d.as_ref().is_some_and(Directive::is_key))
    } else {
        None
    };

    for (index, directive) in directives.into_iter().enumerate() {
        let Some(directive) = directive else {
            continue;
        };
        if let Some(name) = directive.renamed() {
            element.attributes[index].name = name.into();
            continue;
        }

        match directive {
            Directive::For => {
                let mut value = loop_expression(&element.attributes[index].value);
                if let Some(key) = key {
                    let key = &mut element.attributes[key];
                    key.deleted = true;
                    value.push_str(" trackBy ");
                    value.push_str(key.value.trim());
                }
                let attr = &mut element.attributes[index];
                attr.name = "s-for".into();
                attr.value = value;
            }
            // Consumed by the loop.
            Directive::Bind { .. } if key == Some(index) => {}
            Directive::Bind { target, .. } if target == "class" || target == "style" => {
                translate_class_or_style(element, index, &target, diagnostics);
            }
            Directive::Bind { target, filter } => {
                let attr = &mut element.attributes[index];
                let expression = attr.value.trim();
                attr.value = match filter {
                    Some(filter) => format!("{{{{ {expression} | {filter} }}}}"),
                    None => format!("{{{{ {expression} }}}}"),
                };
                attr.name = target.into();
            }
            Directive::Event { event } => {
                element.attributes[index].name = format!("on-{event}").into();
            }
            Directive::Model => {
                let attr = &mut element.attributes[index];
                attr.value = format!("{{= {} =}}", attr.value.trim());
                attr.name = "value".into();
            }
            Directive::Pre | Directive::Cloak | Directive::Once => {}
            Directive::Unknown => {
                let attr = &element.attributes[index];
                report(
                    diagnostics,
                    Diagnostic::new(
                        DiagnosticCode::UnsupportedDirective,
                        format!("`{}` has no San equivalent and was left as is", attr.name),
                    )
                    .with_span(attr.span),
                );
            }
            Directive::Text
            | Directive::Html
            | Directive::Show
            | Directive::If
            | Directive::Else
            | Directive::ElseIf
            | Directive::On => {}
        }
    }

    element.purge_deleted();
}

/// Drops the parentheses around the alias list of a loop: `(a, i) in xs`
/// becomes `a, i in xs`. The iterable is kept as written.
fn loop_expression(value: &str) -> String {
    let split = [" in ", " of "]
        .iter()
        .filter_map(|separator| value.find(separator).map(|at| (at, *separator)))
        .min_by_key(|(at, _)| *at);
    let Some((at, separator)) = split else {
        return value.to_string();
    };

    let alias = value[..at].trim();
    let alias = alias
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .map_or(alias, str::trim);
    format!("{alias}{separator}{}", value[at + separator.len()..].trim())
}

/// Merges a `:class` or `:style` binding at `index` with the static attribute.
fn translate_class_or_style(
    element: &mut Element,
    index: usize,
    target: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let static_index = element
        .attributes
        .iter()
        .enumerate()
        .position(|(i, attr)| i != index && !attr.deleted && attr.name == target);
    let static_value = static_index.map_or("", |i| element.attributes[i].value.as_str());

    let binding = &element.attributes[index];
    let (translated, code) = if target == "class" {
        (
            translate_class_binding(&binding.value, static_value),
            DiagnosticCode::UnsupportedClassBinding,
        )
    } else {
        (
            translate_style_binding(&binding.value, static_value),
            DiagnosticCode::UnsupportedStyleBinding,
        )
    };

    match translated {
        Ok(value) => {
            if let Some(i) = static_index {
                element.attributes[i].deleted = true;
            }
            let attr = &mut element.attributes[index];
            attr.name = target.into();
            attr.value = value;
        }
        Err(err) => report(
            diagnostics,
            Diagnostic::new(code, format!("`{}`: {err}", binding.name)).with_span(binding.span),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sfc_markup::{parse, serialize};

    fn translate(source: &str) -> String {
        let mut document = parse(source).document;
        translate_template(&mut document);
        serialize(&document)
    }

    #[test]
    fn test_renames() {
        assert_eq!(
            translate(r#"<p v-if="a">x</p><p v-else-if="b">y</p><p v-else>z</p>"#),
            r#"<p s-if="a">x</p><p s-else-if="b">y</p><p s-else>z</p>"#
        );
        assert_eq!(translate(r#"<p v-show="shown"></p>"#), r#"<p s-if="shown"></p>"#);
        assert_eq!(translate(r#"<p v-html="raw"></p>"#), r#"<p s-html="raw"></p>"#);
    }

    #[test]
    fn test_loop_key_before_loop() {
        assert_eq!(
            translate(r#"<li :key="item.id" v-for="item in items"></li>"#),
            r#"<li s-for="item in items trackBy item.id"></li>"#
        );
    }

    #[test]
    fn test_loop_keeps_calls_in_iterable() {
        assert_eq!(
            translate(r#"<li v-for="(item, i) in items.slice(0, 3)"></li>"#),
            r#"<li s-for="item, i in items.slice(0, 3)"></li>"#
        );
        assert_eq!(
            translate(r#"<li v-for="item in sorted(items)"></li>"#),
            r#"<li s-for="item in sorted(items)"></li>"#
        );
    }

    #[test]
    fn test_loop_expression() {
        assert_eq!(loop_expression("(a, i) in xs"), "a, i in xs");
        assert_eq!(loop_expression("( a ) of list()"), "a of list()");
        assert_eq!(loop_expression("a in xs"), "a in xs");
        assert_eq!(loop_expression("broken"), "broken");
    }

    #[test]
    fn test_key_without_loop_is_a_binding() {
        assert_eq!(translate(r#"<li :key="id"></li>"#), r#"<li key="{{ id }}"></li>"#);
    }

    #[test]
    fn test_bind_with_filter() {
        assert_eq!(
            translate(r#"<p :title.upper="name"></p>"#),
            r#"<p title="{{ name | upper }}"></p>"#
        );
    }

    #[test]
    fn test_event_long_form() {
        assert_eq!(
            translate(r#"<a v-on:click="go"></a>"#),
            r#"<a on-click="go"></a>"#
        );
    }

    #[test]
    fn test_noop_directives_are_kept() {
        assert_eq!(translate("<p v-cloak v-once></p>"), "<p v-cloak v-once></p>");
    }

    #[test]
    fn test_unknown_directive_reports() {
        let mut document = parse(r#"<input v-focus="true">"#).document;
        let diagnostics = translate_template(&mut document);
        assert_eq!(serialize(&document), r#"<input v-focus="true">"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnsupportedDirective);
    }

    #[test]
    fn test_class_merges_with_static() {
        assert_eq!(
            translate(r#"<div class="item" :class="{done: item.done}"></div>"#),
            r#"<div class="item {{ item.done ? 'done' : '' }}"></div>"#
        );
    }

    #[test]
    fn test_unsupported_class_is_left_alone() {
        let mut document = parse(r#"<div class="a" :class="classes"></div>"#).document;
        let diagnostics = translate_template(&mut document);
        assert_eq!(
            serialize(&document),
            r#"<div class="a" :class="classes"></div>"#
        );
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnsupportedClassBinding);
    }

    #[test]
    fn test_style_merges_with_static() {
        assert_eq!(
            translate(r#"<div :style="{fontSize: size}" style="color: red"></div>"#),
            r#"<div style="color: red;font-size: {{ size }};"></div>"#
        );
    }

    #[test]
    fn test_loop_with_condition_is_split() {
        assert_eq!(
            translate(r#"<ul><li v-for="x in xs" v-if="x.ok" class="a"></li></ul>"#),
            r#"<ul><template s-for="x in xs"><li s-if="x.ok" class="a"></li></template></ul>"#
        );
    }

    #[test]
    fn test_children_are_translated() {
        assert_eq!(
            translate(r#"<div v-if="a"><span v-text="b"></span></div>"#),
            r#"<div s-if="a"><span s-text="b"></span></div>"#
        );
    }
}
