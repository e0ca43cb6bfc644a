//! Constructors for synthesized AST nodes.

use swc_common::{SyntaxContext, DUMMY_SP};
use swc_ecma_ast::{
    BinExpr, BinaryOp, BlockStmt, CallExpr, Callee, Expr, ExprOrSpread, FnExpr, Function, Ident,
    IdentName, Lit, MemberExpr, MemberProp, Number, ParenExpr, ReturnStmt, Stmt, Str, ThisExpr,
};

/// A single-quoted string literal.
pub(crate) fn string_literal(value: &str) -> Expr {
    let mut raw = String::with_capacity(value.len() + 2);
    raw.push('\'');
    for c in value.chars() {
        match c {
            '\'' => raw.push_str("\\'"),
            '\\' => raw.push_str("\\\\"),
            '\n' => raw.push_str("\\n"),
            _ => raw.push(c),
        }
    }
    raw.push('\'');

    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: Some(raw.into()),
    }))
}

pub(crate) fn number_literal(value: f64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    }))
}

pub(crate) fn ident(name: &str) -> Expr {
    Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP))
}

pub(crate) fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub(crate) fn member(obj: Expr, name: &str) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(obj),
        prop: MemberProp::Ident(IdentName::new(name.into(), DUMMY_SP)),
    })
}

pub(crate) fn call(callee: Expr, args: Vec<ExprOrSpread>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(callee)),
        args,
        type_args: None,
    })
}

pub(crate) fn argument(expr: Expr) -> ExprOrSpread {
    ExprOrSpread {
        spread: None,
        expr: Box::new(expr),
    }
}

/// `this.<store>.<method>(args...)`
pub(crate) fn store_call(store: &str, method: &str, args: Vec<ExprOrSpread>) -> Expr {
    let this = Expr::This(ThisExpr { span: DUMMY_SP });
    call(member(member(this, store), method), args)
}

/// Wraps `expr` in parentheses unless it is a primary expression.
pub(crate) fn paren_if_needed(expr: Expr) -> Expr {
    match expr {
        Expr::Ident(_)
        | Expr::Lit(_)
        | Expr::Member(_)
        | Expr::SuperProp(_)
        | Expr::Call(_)
        | Expr::This(_)
        | Expr::Paren(_)
        | Expr::Array(_)
        | Expr::Object(_)
        | Expr::Tpl(_)
        | Expr::OptChain(_) => expr,
        other => Expr::Paren(ParenExpr {
            span: DUMMY_SP,
            expr: Box::new(other),
        }),
    }
}

/// Parses a dotted path such as `San.defineComponent` into a member chain.
pub(crate) fn dotted_path(path: &str) -> Expr {
    let mut parts = path.split('.').filter(|part| !part.is_empty());
    let head = parts.next().unwrap_or(path);
    parts.fold(ident(head), member)
}

/// `function() { return <value>; }`
pub(crate) fn returning_function(value: Box<Expr>) -> Expr {
    Expr::Fn(FnExpr {
        ident: None,
        function: Box::new(Function {
            params: Vec::new(),
            decorators: Vec::new(),
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            body: Some(BlockStmt {
                span: DUMMY_SP,
                ctxt: SyntaxContext::empty(),
                stmts: vec![Stmt::Return(ReturnStmt {
                    span: DUMMY_SP,
                    arg: Some(value),
                })],
            }),
            is_generator: false,
            is_async: false,
            type_params: None,
            return_type: None,
        }),
    })
}
