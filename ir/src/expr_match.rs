//! Free-form structural matching with named variables.
//!
//! The older companion to the typed pattern terms: patterns here are plain
//! expressions built at runtime, with `Var` nodes acting as wildcards.
//! Two flavors coexist:
//!
//! - [`expr_match`] treats variables literally named `"*"` as typed
//!   wildcards and returns captures in left-to-right order. A wildcard's
//!   type constrains the capture, with `bits == 0` meaning any bit width
//!   and `lanes == 0` any lane count.
//! - [`expr_match_named`] treats every variable as a named wildcard; all
//!   occurrences of one name must capture structurally equal subtrees.
//!
//! Both return `true` on success and leave the output unspecified on
//! failure.

use std::collections::HashMap;

use loam_dtype::Type;

use crate::expr::{Expr, Kind, equal};

enum Sink<'a> {
    Ordered(&'a mut Vec<Expr>),
    Named(&'a mut HashMap<String, Expr>),
}

/// Match `expr` against `pattern`, collecting `"*"` wildcard captures in
/// order of occurrence.
pub fn expr_match(pattern: &Expr, expr: &Expr, results: &mut Vec<Expr>) -> bool {
    results.clear();
    match_fragment(pattern, expr, &mut Sink::Ordered(results))
}

/// Match `expr` against `pattern`, binding variables by name. Repeated
/// names must capture structurally equal subtrees.
pub fn expr_match_named(pattern: &Expr, expr: &Expr, results: &mut HashMap<String, Expr>) -> bool {
    results.clear();
    match_fragment(pattern, expr, &mut Sink::Named(results))
}

/// `bits == 0` and `lanes == 0` in the pattern type act as "any".
fn types_compatible(pattern: Type, expr: Type) -> bool {
    pattern.code == expr.code
        && (pattern.bits == 0 || pattern.bits == expr.bits)
        && (pattern.lanes == 0 || pattern.lanes == expr.lanes)
}

fn match_fragment(pattern: &Expr, expr: &Expr, sink: &mut Sink<'_>) -> bool {
    if let Kind::Var { name } = pattern.kind() {
        return match sink {
            Sink::Ordered(results) => {
                if name == "*" {
                    if !types_compatible(pattern.ty(), expr.ty()) {
                        return false;
                    }
                    results.push(expr.clone());
                    true
                } else {
                    // Non-wildcard variables must appear verbatim.
                    pattern.ty() == expr.ty()
                        && matches!(expr.kind(), Kind::Var { name: other } if other == name)
                }
            }
            Sink::Named(results) => match results.get(name) {
                Some(previous) => equal(previous, expr),
                None => {
                    results.insert(name.clone(), expr.clone());
                    true
                }
            },
        };
    }

    if pattern.ty() != expr.ty() {
        return false;
    }

    match (pattern.kind(), expr.kind()) {
        (Kind::Imm(a), Kind::Imm(b)) => a == b,
        (Kind::Broadcast { value: a }, Kind::Broadcast { value: b }) => match_fragment(a, b, sink),
        (Kind::Ramp { base: ab, stride: astr }, Kind::Ramp { base: bb, stride: bstr }) => {
            match_fragment(ab, bb, sink) && match_fragment(astr, bstr, sink)
        }
        (Kind::Cast { value: a }, Kind::Cast { value: b }) => match_fragment(a, b, sink),
        (Kind::Binary { op: ao, a: aa, b: ab }, Kind::Binary { op: bo, a: ba, b: bb }) => {
            ao == bo && match_fragment(aa, ba, sink) && match_fragment(ab, bb, sink)
        }
        (Kind::Not { value: a }, Kind::Not { value: b }) => match_fragment(a, b, sink),
        (
            Kind::Select { condition: ac, true_value: at, false_value: af },
            Kind::Select { condition: bc, true_value: bt, false_value: bf },
        ) => {
            match_fragment(ac, bc, sink)
                && match_fragment(at, bt, sink)
                && match_fragment(af, bf, sink)
        }
        (Kind::Call { name: an, args: aa }, Kind::Call { name: bn, args: ba }) => {
            an == bn
                && aa.len() == ba.len()
                && aa.iter().zip(ba.iter()).all(|(a, b)| match_fragment(a, b, sink))
        }
        _ => false,
    }
}
