//! Layout adjustments applied to printed scripts.
//!
//! The printer separates a method name from its parameter list
//! (`test () {`). Converted files write method heads as `test() {`, so
//! every line that opens a known method is tightened after printing.

use rustc_hash::FxHashSet;
use swc_ecma_ast::{ClassMethod, GetterProp, MethodProp, Module, PropName, SetterProp};
use swc_ecma_visit::{Visit, VisitWith};

/// Words that open a statement followed by a parenthesis. A method with one
/// of these names cannot be told apart from the statement by its line.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "function",
];

/// Modifiers the printer may put in front of a method name.
const HEAD_MODIFIERS: &[&str] = &["static ", "async ", "get ", "set ", "*"];

/// Removes the space between a method name and its parameters on every
/// line that opens one of the methods of `module`.
pub(crate) fn tighten_method_heads(code: &str, module: &Module) -> String {
    let mut collector = MethodNames::default();
    module.visit_with(&mut collector);
    if collector.names.is_empty() {
        return code.to_string();
    }

    let mut output = String::with_capacity(code.len());
    for line in code.split_inclusive('\n') {
        match tightened(line, &collector.names) {
            Some(line) => output.push_str(&line),
            None => output.push_str(line),
        }
    }
    output
}

fn tightened(line: &str, names: &FxHashSet<String>) -> Option<String> {
    let content = line.trim_end();
    if !(content.ends_with('{') || content.ends_with("{}") || content.ends_with("{},")) {
        return None;
    }

    let indent = line.len() - line.trim_start().len();
    let mut head = &line[indent..];
    loop {
        match HEAD_MODIFIERS
            .iter()
            .find_map(|modifier| head.strip_prefix(modifier))
        {
            Some(rest) => head = rest,
            None => break,
        }
    }

    let (name, rest) = head.split_once(" (")?;
    if !names.contains(name) {
        return None;
    }
    let at = line.len() - rest.len() - " (".len();
    Some(format!("{}({rest}", &line[..at]))
}

#[derive(Default)]
struct MethodNames {
    names: FxHashSet<String>,
}

impl MethodNames {
    fn add(&mut self, key: &PropName) {
        let name = match key {
            PropName::Ident(ident) => ident.sym.to_string(),
            PropName::Num(num) => num.value.to_string(),
            _ => return,
        };
        if !STATEMENT_KEYWORDS.contains(&name.as_str()) {
            self.names.insert(name);
        }
    }
}

impl Visit for MethodNames {
    fn visit_method_prop(&mut self, prop: &MethodProp) {
        self.add(&prop.key);
        prop.visit_children_with(self);
    }

    fn visit_getter_prop(&mut self, prop: &GetterProp) {
        self.add(&prop.key);
        prop.visit_children_with(self);
    }

    fn visit_setter_prop(&mut self, prop: &SetterProp) {
        self.add(&prop.key);
        prop.visit_children_with(self);
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        self.add(&method.key);
        method.visit_children_with(self);
    }
}
