//! Rewriting `this.x` data access into San data store calls.
//!
//! Rewriting happens in two passes over the same function body:
//!
//! 1. [`classify_accesses`] walks the body read-only and records every
//!    access anchored at `this`, keyed by the pre-order index of the
//!    expression that gets replaced (its origin).
//! 2. [`apply_replacements`] walks the body again with the same numbering
//!    and replaces each origin, innermost first, so nested accesses inside
//!    computed keys, assigned values, and call arguments are rewritten too.
//!
//! | Source                 | Output                                  |
//! |------------------------|-----------------------------------------|
//! | `this.a.b`             | `this.data.get('a.b')`                  |
//! | `this.a = v`           | `this.data.set('a', v)`                 |
//! | `this.a += v`          | `this.data.set('a', this.data.get('a') + v)` |
//! | `this.a++`             | `this.data.set('a', this.data.get('a') + 1)` |
//! | `this.list.push(v)`    | `this.data.push('list', v)`             |
//! | `this.list.map(f)`     | `this.data.get('list').map(f)`          |
//! | `this.a \|\|= v`         | `this.data.get('a') \|\| this.data.set('a', v)` |
//! | `this.method()`        | unchanged                               |
//!
//! A `this` member used as a destructuring target (`[this.a] = xs`) or as
//! the head of a `for-in`/`for-of` loop has no store equivalent. It is left
//! as written and reported in [`RewriteSummary::unsupported_targets`].

use super::build::{argument, binary, number_literal, paren_if_needed, store_call};
use super::path::{build_access_path, AccessChain};
use crate::error::RewriteError;
use rustc_hash::FxHashMap;
use std::fmt;
use swc_common::util::take::Take;
use swc_ecma_ast::{
    AssignExpr, AssignOp, AssignTarget, BinaryOp, BlockStmt, CallExpr, Callee, Class, Expr,
    Function, GetterProp, MemberExpr, MemberProp, Pat, SetterProp, SimpleAssignTarget,
    UpdateExpr, UpdateOp,
};
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

/// Array methods that mutate their receiver and have a data store counterpart.
pub const MUTATING_METHODS: &[&str] = &[
    "push", "pop", "unshift", "shift", "remove", "removeAt", "splice",
];

/// Pre-order index of an expression within a rewritten function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an anchored access is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// The value is read.
    Read,
    /// The chain is the target of an assignment.
    Write(AssignOp),
    /// The chain is incremented or decremented.
    Update(UpdateOp),
    /// A mutating array method is called on the chain.
    MutatingCall,
}

/// An access paired with the expression it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedAccess {
    /// The expression that gets replaced.
    pub origin: NodeId,
    pub kind: AccessKind,
    /// The chain of the accessed data, as seen at classification time.
    pub chain: AccessChain,
}

/// Classifies every `this`-anchored access in a function body.
///
/// Accesses inside nested non-arrow functions, classes, and accessor
/// properties are skipped, since `this` is rebound there.
pub fn classify_accesses(body: &BlockStmt) -> Vec<ClassifiedAccess> {
    classify(body).accesses
}

fn classify(body: &BlockStmt) -> AccessClassifier {
    let mut classifier = AccessClassifier::default();
    body.visit_with(&mut classifier);
    classifier
}

/// Replaces every classified access in `body`.
///
/// `accesses` must come from [`classify_accesses`] on the same, unmodified
/// body. Every access is applied exactly once or an error is returned.
pub fn apply_replacements(
    body: &mut BlockStmt,
    accesses: &[ClassifiedAccess],
    store: &str,
) -> Result<(), RewriteError> {
    let mut pending = FxHashMap::default();
    for access in accesses {
        if pending.insert(access.origin, access.kind).is_some() {
            return Err(RewriteError::DuplicateReplacement(access.origin));
        }
    }

    let mut rewriter = AccessRewriter {
        store,
        next: 0,
        pending,
        error: None,
    };
    body.visit_mut_with(&mut rewriter);
    rewriter.finish()
}

/// Outcome of [`rewrite_accessors`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteSummary {
    /// Number of rewritten accesses.
    pub rewritten: usize,
    /// `this` chains bound by a destructuring pattern or a loop head, in
    /// source order. They are left as written.
    pub unsupported_targets: Vec<AccessChain>,
}

/// Classifies and rewrites the accesses of a function body in one step.
pub fn rewrite_accessors(body: &mut BlockStmt, store: &str) -> Result<RewriteSummary, RewriteError> {
    let classifier = classify(body);
    apply_replacements(body, &classifier.accesses, store)?;
    Ok(RewriteSummary {
        rewritten: classifier.accesses.len(),
        unsupported_targets: classifier.pattern_targets,
    })
}

/// Role of the next expression visited, set by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Position {
    /// Not constrained by the parent.
    #[default]
    Free,
    /// Object of an already anchored member, or target of an anchored
    /// write, update, or mutating call. Never an anchor itself.
    Anchored,
    /// Callee of a non-mutating method call on a `this` chain. The callee
    /// is not an anchor, but its receiver is.
    Callee,
}

#[derive(Default)]
struct AccessClassifier {
    next: u32,
    /// Depth of nested scopes that rebind `this`.
    rebound: u32,
    position: Position,
    accesses: Vec<ClassifiedAccess>,
    pattern_targets: Vec<AccessChain>,
}

impl AccessClassifier {
    fn record(&mut self, origin: NodeId, kind: AccessKind, chain: AccessChain) {
        if self.rebound > 0 {
            return;
        }
        tracing::trace!(%origin, ?kind, "classified access");
        self.accesses.push(ClassifiedAccess {
            origin,
            kind,
            chain,
        });
    }

    fn visit_anchored(&mut self, member: &MemberExpr) {
        self.position = Position::Anchored;
        member.obj.visit_with(self);
        member.prop.visit_with(self);
    }
}

impl Visit for AccessClassifier {
    fn visit_expr(&mut self, expr: &Expr) {
        let id = NodeId(self.next);
        self.next += 1;
        let position = std::mem::take(&mut self.position);

        match expr {
            Expr::Member(member) => match AccessChain::from_member(member) {
                Some(chain) => {
                    if position == Position::Free {
                        self.record(id, AccessKind::Read, chain);
                    }
                    if position == Position::Callee {
                        member.visit_children_with(self);
                    } else {
                        self.visit_anchored(member);
                    }
                }
                None => member.visit_children_with(self),
            },
            Expr::Assign(assign) => match write_target(assign) {
                Some((target, chain)) => {
                    self.record(id, AccessKind::Write(assign.op), chain);
                    self.visit_anchored(target);
                    assign.right.visit_with(self);
                }
                None => assign.visit_children_with(self),
            },
            Expr::Update(update) => match update_target(update) {
                Some(chain) => {
                    self.record(id, AccessKind::Update(update.op), chain);
                    self.position = Position::Anchored;
                    update.arg.visit_with(self);
                }
                None => update.visit_children_with(self),
            },
            Expr::Call(call) => match method_call(call) {
                Some(MethodCall::Mutating(chain)) => {
                    self.record(id, AccessKind::MutatingCall, chain);
                    self.position = Position::Anchored;
                    call.visit_children_with(self);
                }
                Some(MethodCall::Other) => {
                    self.position = Position::Callee;
                    call.visit_children_with(self);
                }
                None => call.visit_children_with(self),
            },
            _ => expr.visit_children_with(self),
        }
    }

    fn visit_pat(&mut self, pat: &Pat) {
        if let Pat::Expr(target) = pat {
            if let Expr::Member(member) = &**target {
                if let Some(chain) = AccessChain::from_member(member) {
                    if self.rebound == 0 {
                        tracing::trace!(%chain, "pattern target left as is");
                        self.pattern_targets.push(chain);
                    }
                    // Keys inside the target are still rewritten.
                    self.position = Position::Anchored;
                }
            }
        }
        pat.visit_children_with(self);
    }

    fn visit_function(&mut self, function: &Function) {
        self.rebound += 1;
        function.visit_children_with(self);
        self.rebound -= 1;
    }

    fn visit_class(&mut self, class: &Class) {
        self.rebound += 1;
        class.visit_children_with(self);
        self.rebound -= 1;
    }

    fn visit_getter_prop(&mut self, prop: &GetterProp) {
        self.rebound += 1;
        prop.visit_children_with(self);
        self.rebound -= 1;
    }

    fn visit_setter_prop(&mut self, prop: &SetterProp) {
        self.rebound += 1;
        prop.visit_children_with(self);
        self.rebound -= 1;
    }
}

fn write_target(assign: &AssignExpr) -> Option<(&MemberExpr, AccessChain)> {
    match &assign.left {
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
            AccessChain::from_member(member).map(|chain| (member, chain))
        }
        _ => None,
    }
}

fn update_target(update: &UpdateExpr) -> Option<AccessChain> {
    match &*update.arg {
        Expr::Member(member) => AccessChain::from_member(member),
        _ => None,
    }
}

enum MethodCall {
    /// `this.<chain>.<mutating method>(...)`
    Mutating(AccessChain),
    /// Any other method called on a `this` chain, including `this.method()`.
    Other,
}

fn method_call(call: &CallExpr) -> Option<MethodCall> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(callee) = &**callee else {
        return None;
    };
    AccessChain::from_member(callee)?;

    if let (MemberProp::Ident(method), Expr::Member(receiver)) = (&callee.prop, &*callee.obj) {
        if MUTATING_METHODS.contains(&&*method.sym) {
            if let Some(chain) = AccessChain::from_member(receiver) {
                return Some(MethodCall::Mutating(chain));
            }
        }
    }
    Some(MethodCall::Other)
}

struct AccessRewriter<'a> {
    store: &'a str,
    next: u32,
    pending: FxHashMap<NodeId, AccessKind>,
    error: Option<RewriteError>,
}

impl AccessRewriter<'_> {
    fn fail(&mut self, error: RewriteError) {
        debug_assert!(false, "accessor rewrite failed: {error}");
        self.error.get_or_insert(error);
    }

    fn finish(self) -> Result<(), RewriteError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.pending.keys().min() {
            Some(&origin) => {
                debug_assert!(false, "unconsumed replacement {origin}");
                Err(RewriteError::UnconsumedReplacement(origin))
            }
            None => Ok(()),
        }
    }

    fn path(&self, member: &MemberExpr, origin: NodeId) -> Result<Expr, RewriteError> {
        let chain = AccessChain::from_member(member).ok_or(RewriteError::ShapeMismatch(origin))?;
        build_access_path(&chain)
    }

    fn get(&self, path: Expr) -> Expr {
        store_call(self.store, "get", vec![argument(path)])
    }

    fn set(&self, path: Expr, value: Expr) -> Expr {
        store_call(self.store, "set", vec![argument(path), argument(value)])
    }

    /// Builds the replacement for an origin whose children are already rewritten.
    fn replacement(
        &self,
        expr: &mut Expr,
        kind: AccessKind,
        origin: NodeId,
    ) -> Result<Expr, RewriteError> {
        let mismatch = RewriteError::ShapeMismatch(origin);
        match (kind, expr) {
            (AccessKind::Read, Expr::Member(member)) => Ok(self.get(self.path(member, origin)?)),
            (AccessKind::Write(op), Expr::Assign(assign)) => {
                let AssignTarget::Simple(SimpleAssignTarget::Member(target)) = &assign.left else {
                    return Err(mismatch);
                };
                let path = self.path(target, origin)?;
                let value = Expr::take(&mut assign.right);
                Ok(match compound_operator(op) {
                    None => self.set(path, value),
                    // `a ||= b` only assigns when `a` is falsy.
                    Some(
                        op @ (BinaryOp::LogicalAnd
                        | BinaryOp::LogicalOr
                        | BinaryOp::NullishCoalescing),
                    ) => binary(op, self.get(path.clone()), self.set(path, value)),
                    Some(op) => {
                        let value = binary(op, self.get(path.clone()), paren_if_needed(value));
                        self.set(path, value)
                    }
                })
            }
            (AccessKind::Update(op), Expr::Update(update)) => {
                let Expr::Member(target) = &*update.arg else {
                    return Err(mismatch);
                };
                let path = self.path(target, origin)?;
                let op = match op {
                    UpdateOp::PlusPlus => BinaryOp::Add,
                    UpdateOp::MinusMinus => BinaryOp::Sub,
                };
                let value = binary(op, self.get(path.clone()), number_literal(1.0));
                Ok(self.set(path, value))
            }
            (AccessKind::MutatingCall, Expr::Call(call)) => {
                let Callee::Expr(callee) = &call.callee else {
                    return Err(mismatch);
                };
                let Expr::Member(callee) = &**callee else {
                    return Err(mismatch);
                };
                let (MemberProp::Ident(method), Expr::Member(receiver)) =
                    (&callee.prop, &*callee.obj)
                else {
                    return Err(mismatch);
                };
                let mut args = vec![argument(self.path(receiver, origin)?)];
                args.append(&mut call.args);
                Ok(store_call(self.store, &method.sym, args))
            }
            _ => Err(mismatch),
        }
    }
}

impl VisitMut for AccessRewriter<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        let id = NodeId(self.next);
        self.next += 1;

        expr.visit_mut_children_with(self);

        if let Some(kind) = self.pending.remove(&id) {
            match self.replacement(expr, kind, id) {
                Ok(replacement) => *expr = replacement,
                Err(error) => self.fail(error),
            }
        }
    }
}

/// The binary operator of a compound assignment, `None` for plain `=`.
fn compound_operator(op: AssignOp) -> Option<BinaryOp> {
    Some(match op {
        AssignOp::Assign => return None,
        AssignOp::AddAssign => BinaryOp::Add,
        AssignOp::SubAssign => BinaryOp::Sub,
        AssignOp::MulAssign => BinaryOp::Mul,
        AssignOp::DivAssign => BinaryOp::Div,
        AssignOp::ModAssign => BinaryOp::Mod,
        AssignOp::LShiftAssign => BinaryOp::LShift,
        AssignOp::RShiftAssign => BinaryOp::RShift,
        AssignOp::ZeroFillRShiftAssign => BinaryOp::ZeroFillRShift,
        AssignOp::BitOrAssign => BinaryOp::BitOr,
        AssignOp::BitXorAssign => BinaryOp::BitXor,
        AssignOp::BitAndAssign => BinaryOp::BitAnd,
        AssignOp::ExpAssign => BinaryOp::Exp,
        AssignOp::AndAssign => BinaryOp::LogicalAnd,
        AssignOp::OrAssign => BinaryOp::LogicalOr,
        AssignOp::NullishAssign => BinaryOp::NullishCoalescing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptSource;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    /// Parses `source` as the body of a function.
    fn parse_body(script: &ScriptSource, source: &str) -> BlockStmt {
        let module = script
            .parse_module(&format!("function fragment() {{\n{source}\n}}"))
            .unwrap();
        match module.body.into_iter().next() {
            Some(ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl)))) => decl.function.body.unwrap(),
            other => panic!("unexpected module item: {other:?}"),
        }
    }

    fn rewrite(source: &str) -> String {
        let script = ScriptSource::new();
        let mut body = parse_body(&script, source);
        rewrite_accessors(&mut body, "data").unwrap();
        let printed = script.print(&body);
        let inner = printed
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(&printed);
        inner.trim().to_string()
    }

    fn kinds(source: &str) -> Vec<AccessKind> {
        let script = ScriptSource::new();
        let body = parse_body(&script, source);
        classify_accesses(&body)
            .into_iter()
            .map(|access| access.kind)
            .collect()
    }

    #[test]
    fn test_read() {
        assert_eq!(rewrite("this.some"), "this.data.get('some');");
        assert_eq!(rewrite("this.some.things"), "this.data.get('some.things');");
    }

    #[test]
    fn test_read_with_dynamic_keys() {
        assert_eq!(
            rewrite("this['some'].things['test'+ a][index]"),
            "this.data.get('some.things.' + ('test' + a) + '.' + index);"
        );
    }

    #[test]
    fn test_write() {
        assert_eq!(rewrite("this.some = 1"), "this.data.set('some', 1);");
        assert_eq!(
            rewrite("this.a.b = this.c"),
            "this.data.set('a.b', this.data.get('c'));"
        );
    }

    #[test]
    fn test_compound_write() {
        assert_eq!(
            rewrite("this.count += step"),
            "this.data.set('count', this.data.get('count') + step);"
        );
        assert_eq!(
            rewrite("this.count -= a - b"),
            "this.data.set('count', this.data.get('count') - (a - b));"
        );
    }

    #[test]
    fn test_logical_assignment_short_circuits() {
        assert_eq!(
            rewrite("this.name ||= fallback"),
            "this.data.get('name') || this.data.set('name', fallback);"
        );
        assert_eq!(
            rewrite("this.ready &&= check()"),
            "this.data.get('ready') && this.data.set('ready', check());"
        );
        assert_eq!(
            rewrite("this.cache ??= {}"),
            "this.data.get('cache') ?? this.data.set('cache', {});"
        );
    }

    #[test]
    fn test_update() {
        assert_eq!(
            rewrite("this.count++"),
            "this.data.set('count', this.data.get('count') + 1);"
        );
        assert_eq!(
            rewrite("--this.count"),
            "this.data.set('count', this.data.get('count') - 1);"
        );
    }

    #[test]
    fn test_mutating_call() {
        assert_eq!(rewrite("this.some.push(1)"), "this.data.push('some', 1);");
        assert_eq!(
            rewrite("this.a.list.splice(i, 1)"),
            "this.data.splice('a.list', i, 1);"
        );
        assert_eq!(rewrite("this.todos.pop()"), "this.data.pop('todos');");
    }

    #[test]
    fn test_non_mutating_call_reads_receiver() {
        assert_eq!(
            rewrite("this.todos.filter(done)"),
            "this.data.get('todos').filter(done);"
        );
    }

    #[test]
    fn test_component_method_call_is_untouched() {
        assert_eq!(rewrite("this.save(this.item)"), "this.save(this.data.get('item'));");
        assert_eq!(rewrite("this.push(1)"), "this.push(1);");
    }

    #[test]
    fn test_nested_anchor_in_dynamic_key() {
        assert_eq!(
            rewrite("this.x[this.y]"),
            "this.data.get('x.' + this.data.get('y'));"
        );
        assert_eq!(
            rewrite("this.x[this.y] = 1"),
            "this.data.set('x.' + this.data.get('y'), 1);"
        );
    }

    #[test]
    fn test_nested_anchor_in_arguments() {
        assert_eq!(
            rewrite("this.list.push(this.draft)"),
            "this.data.push('list', this.data.get('draft'));"
        );
        assert_eq!(
            rewrite("filters[this.visibility](this.todos)"),
            "filters[this.data.get('visibility')](this.data.get('todos'));"
        );
    }

    #[test]
    fn test_arrow_functions_keep_this() {
        let output = rewrite("items.forEach(item => this.total += item)");
        assert!(
            output.contains("this.data.set('total', this.data.get('total') + item)"),
            "got: {output}"
        );
    }

    #[test]
    fn test_nested_functions_rebind_this() {
        let source = "this.a;\nsetTimeout(function() { this.b = 1; });";
        assert_eq!(kinds(source), vec![AccessKind::Read]);
        let output = rewrite(source);
        assert!(output.contains("this.data.get('a')"), "got: {output}");
        assert!(output.contains("this.b = 1"), "got: {output}");
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(
            kinds("this.a = this.b;\nthis.c++;\nthis.d.push(1);"),
            vec![
                AccessKind::Write(AssignOp::Assign),
                AccessKind::Read,
                AccessKind::Update(UpdateOp::PlusPlus),
                AccessKind::MutatingCall,
            ]
        );
    }

    #[test]
    fn test_unrelated_code_is_untouched() {
        assert_eq!(rewrite("var a = b.c;"), "var a = b.c;");
        let script = ScriptSource::new();
        assert!(classify_accesses(&parse_body(&script, "foo.bar = 1")).is_empty());
    }

    #[test]
    fn test_pattern_targets_are_left_as_is() {
        let source = "[this.a, this.b] = [1, 2];\nfor (this.i of xs) {}";
        assert!(kinds(source).is_empty());
        let output = rewrite(source);
        assert!(!output.contains(".data."), "got: {output}");
        assert!(output.contains("this.i of xs"), "got: {output}");

        let script = ScriptSource::new();
        let mut body = parse_body(&script, source);
        let summary = rewrite_accessors(&mut body, "data").unwrap();
        assert_eq!(summary.rewritten, 0);
        let targets: Vec<_> = summary
            .unsupported_targets
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(targets, ["this.a", "this.b", "this.i"]);
    }

    #[test]
    fn test_keys_inside_pattern_targets_are_rewritten() {
        let output = rewrite("({ x: this.items[this.index] } = point)");
        assert!(
            output.contains("this.items[this.data.get('index')]"),
            "got: {output}"
        );
        assert_eq!(kinds("[this.a = this.b] = xs"), vec![AccessKind::Read]);
    }

    #[test]
    fn test_duplicate_origin_is_rejected() {
        let script = ScriptSource::new();
        let mut body = parse_body(&script, "this.a");
        let mut accesses = classify_accesses(&body);
        accesses.push(accesses[0].clone());
        assert_eq!(
            apply_replacements(&mut body, &accesses, "data"),
            Err(RewriteError::DuplicateReplacement(accesses[0].origin))
        );
    }
}
