//! Access chains and data paths.
//!
//! A chain such as `this.items[i].title` becomes the path expression
//! `'items.' + i + '.title'`, which is what the San data store takes.

use super::build::{binary, paren_if_needed, string_literal};
use crate::error::RewriteError;
use std::fmt;
use swc_ecma_ast::{BinaryOp, Expr, Lit, MemberExpr, MemberProp};

/// One step of an access chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A property name known at compile time (`.x` or `['x']`).
    Literal(String),
    /// A computed key (`[expr]`).
    Dynamic(Box<Expr>),
}

/// The property steps after `this`, outermost last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessChain {
    pub segments: Vec<Segment>,
}

impl AccessChain {
    /// Extracts the chain of a member expression rooted directly at `this`.
    ///
    /// Returns `None` for any other member expression.
    pub fn from_member(member: &MemberExpr) -> Option<Self> {
        let mut segments = Vec::new();
        let mut current = member;
        loop {
            segments.push(Segment::from_prop(&current.prop)?);
            match &*current.obj {
                Expr::This(_) => break,
                Expr::Member(inner) => current = inner,
                _ => return None,
            }
        }
        segments.reverse();
        Some(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for AccessChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("this")?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(name) => write!(f, ".{name}")?,
                Segment::Dynamic(_) => f.write_str("[...]")?,
            }
        }
        Ok(())
    }
}

impl Segment {
    fn from_prop(prop: &MemberProp) -> Option<Self> {
        match prop {
            MemberProp::Ident(name) => Some(Segment::Literal(name.sym.to_string())),
            MemberProp::Computed(computed) => match &*computed.expr {
                Expr::Lit(Lit::Str(key)) => Some(Segment::Literal(
                    key.value.to_string_lossy().into_owned(),
                )),
                key => Some(Segment::Dynamic(Box::new(key.clone()))),
            },
            MemberProp::PrivateName(_) => None,
        }
    }
}

enum Accumulator {
    Literal(String),
    Expr(Expr),
}

/// Builds the data path expression for a chain.
///
/// Adjacent literal segments merge into one string literal; dynamic
/// segments are joined with `+` and parenthesized unless primary.
pub fn build_access_path(chain: &AccessChain) -> Result<Expr, RewriteError> {
    let (first, rest) = chain
        .segments
        .split_first()
        .ok_or(RewriteError::EmptyChain)?;

    let mut acc = match first {
        Segment::Literal(name) => Accumulator::Literal(name.clone()),
        Segment::Dynamic(key) if rest.is_empty() => return Ok((**key).clone()),
        Segment::Dynamic(key) => Accumulator::Expr(paren_if_needed((**key).clone())),
    };

    for segment in rest {
        acc = match (acc, segment) {
            (Accumulator::Literal(mut path), Segment::Literal(name)) => {
                path.push('.');
                path.push_str(name);
                Accumulator::Literal(path)
            }
            (Accumulator::Literal(path), Segment::Dynamic(key)) => Accumulator::Expr(binary(
                BinaryOp::Add,
                string_literal(&format!("{path}.")),
                paren_if_needed((**key).clone()),
            )),
            (Accumulator::Expr(expr), Segment::Literal(name)) => Accumulator::Expr(binary(
                BinaryOp::Add,
                expr,
                string_literal(&format!(".{name}")),
            )),
            (Accumulator::Expr(expr), Segment::Dynamic(key)) => Accumulator::Expr(binary(
                BinaryOp::Add,
                binary(BinaryOp::Add, expr, string_literal(".")),
                paren_if_needed((**key).clone()),
            )),
        };
    }

    Ok(match acc {
        Accumulator::Literal(path) => string_literal(&path),
        Accumulator::Expr(expr) => expr,
    })
}
