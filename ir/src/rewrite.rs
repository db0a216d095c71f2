//! The rewrite driver: try rules against one expression, first hit wins.

use crate::expr::Expr;
use crate::pattern::{FoldPattern, MakePattern, MatchPattern, MatcherState, evaluate_predicate};

/// Bound to a single expression instance, a `Rewriter` walks a list of
/// `before -> after [when predicate]` rules and stops at the first match.
///
/// The scratch state is reused across attempts; a failed attempt leaves
/// [`result`](Self::result) untouched.
pub struct Rewriter<'e> {
    instance: &'e Expr,
    /// The replacement produced by the most recent successful `apply*`.
    pub result: Option<Expr>,
    state: MatcherState,
}

/// Bind a rewriter to the expression it will try rules against.
pub fn rewriter(instance: &Expr) -> Rewriter<'_> {
    Rewriter { instance, result: None, state: MatcherState::new() }
}

impl Rewriter<'_> {
    /// `before -> after`.
    pub fn apply<B, A>(&mut self, before: B, after: A) -> bool
    where
        B: MatchPattern,
        A: MakePattern,
    {
        self.state.reset();
        if before.match_expr(self.instance, &mut self.state, 0) {
            self.result = Some(after.make(&mut self.state));
            tracing::trace!(before = %before, after = %after, "rewrote expression");
            true
        } else {
            false
        }
    }

    /// `before -> after when predicate`.
    pub fn apply_if<B, A, P>(&mut self, before: B, after: A, predicate: P) -> bool
    where
        B: MatchPattern,
        A: MakePattern,
        P: FoldPattern,
    {
        self.state.reset();
        if before.match_expr(self.instance, &mut self.state, 0)
            && evaluate_predicate(predicate, &mut self.state)
        {
            self.result = Some(after.make(&mut self.state));
            tracing::trace!(before = %before, after = %after, predicate = %predicate, "rewrote expression");
            true
        } else {
            false
        }
    }

    /// `before -> after` with a replacement built ahead of time.
    pub fn apply_expr<B: MatchPattern>(&mut self, before: B, after: &Expr) -> bool {
        self.state.reset();
        if before.match_expr(self.instance, &mut self.state, 0) {
            self.result = Some(after.clone());
            tracing::trace!(before = %before, after = %after, "rewrote expression");
            true
        } else {
            false
        }
    }

    /// `before -> after when predicate` with a prebuilt replacement.
    pub fn apply_expr_if<B, P>(&mut self, before: B, after: &Expr, predicate: P) -> bool
    where
        B: MatchPattern,
        P: FoldPattern,
    {
        self.state.reset();
        if before.match_expr(self.instance, &mut self.state, 0)
            && evaluate_predicate(predicate, &mut self.state)
        {
            self.result = Some(after.clone());
            tracing::trace!(before = %before, after = %after, predicate = %predicate, "rewrote expression");
            true
        } else {
            false
        }
    }
}
