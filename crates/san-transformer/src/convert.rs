//! Whole-file conversion.

use crate::diagnostic::Diagnostic;
use crate::error::ConvertError;
use crate::options::ConvertOptions;
use crate::script::translate_script;
use crate::template::{translate_nodes, translate_template};
use sfc_markup::{parse, serialize, Node};

/// The result of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOutput {
    /// The converted source.
    pub code: String,
    /// Non-fatal issues, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts a Vue single-file component into a San one.
///
/// The children of the top-level `<template>` are translated, the first
/// top-level `<script>` is rewritten, and everything else (including
/// `<style>`) passes through unchanged.
pub fn convert_component(
    source: &str,
    options: &ConvertOptions,
) -> Result<ConvertOutput, ConvertError> {
    let parsed = parse(source);
    let mut diagnostics: Vec<Diagnostic> = parsed
        .errors
        .iter()
        .map(Diagnostic::from_parse_error)
        .collect();
    let mut document = parsed.document;
    let mut script_done = false;

    for node in &mut document.nodes {
        let Node::Element(element) = node else {
            continue;
        };
        match element.name.as_str() {
            "template" => translate_nodes(&mut element.children, &mut diagnostics),
            "script" if !script_done => {
                script_done = true;
                let translated = match element.raw_text() {
                    Some(text) => Some(translate_script(text, options)?),
                    None => None,
                };
                if let Some(translated) = translated {
                    element.set_raw_text(translated.code);
                    diagnostics.extend(translated.diagnostics);
                }
            }
            _ => {}
        }
    }

    tracing::debug!(diagnostics = diagnostics.len(), "converted component");
    Ok(ConvertOutput {
        code: serialize(&document),
        diagnostics,
    })
}

/// Converts a bare Vue template fragment.
pub fn convert_template(source: &str) -> ConvertOutput {
    let parsed = parse(source);
    let mut diagnostics: Vec<Diagnostic> = parsed
        .errors
        .iter()
        .map(Diagnostic::from_parse_error)
        .collect();
    let mut document = parsed.document;
    diagnostics.extend(translate_template(&mut document));

    ConvertOutput {
        code: serialize(&document),
        diagnostics,
    }
}
