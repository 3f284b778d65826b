//! Traversal and the visitor protocol (spec §4.3).

use crate::context::Context;
use crate::node::{DiffKind, DiffNodeId};

/// Six hooks over the diff graph. Every hook has a no-op default so a
/// concrete visitor only overrides what it needs (spec §9 "Visitor").
pub trait Visitor {
    fn begin_diff_node(&mut self, _ctx: &Context, _id: DiffNodeId) {}
    fn end_diff_node(&mut self, _ctx: &Context, _id: DiffNodeId) {}
    fn begin_corpus_diff(&mut self, _ctx: &Context, _id: DiffNodeId) {}
    fn end_corpus_diff(&mut self, _ctx: &Context, _id: DiffNodeId) {}

    /// Pre-order visit. Returning `false` aborts this node's subtree (and,
    /// propagated through the return value of [`traverse`], the remaining
    /// siblings in the caller's loop).
    fn visit_begin(&mut self, _ctx: &mut Context, _id: DiffNodeId) -> bool {
        true
    }

    /// Post-order visit, run after every child has been recursed into.
    fn visit_end(&mut self, _ctx: &mut Context, _id: DiffNodeId) {}

    /// When true (the default), a node already visited in this traversal
    /// is not descended into again. Debug dumpers that must show every
    /// occurrence of a shared subtree override this to `false`.
    fn marks_visited_nodes(&self) -> bool {
        true
    }
}

/// Depth-first walk of the diff graph rooted at `id`, with cycle
/// detection independent of `marks_visited_nodes` (an IR cycle — a class
/// holding a pointer to itself — must never be followed twice on the
/// *same path*, regardless of whether the visitor wants repeat visits
/// elsewhere in the graph).
///
/// Returns `false` if the visitor asked to abort (via `visit_begin`
/// returning `false`, directly or in a descendant), letting a caller like
/// a "find first match" visitor stop the whole walk early.
pub fn traverse(ctx: &mut Context, visitor: &mut dyn Visitor, id: DiffNodeId) -> bool {
    let is_corpus = matches!(ctx.get(id).kind, DiffKind::Corpus { .. });
    if is_corpus {
        visitor.begin_corpus_diff(ctx, id);
    } else {
        visitor.begin_diff_node(ctx, id);
    }

    let already_on_path = ctx.state(id).traversing;
    let already_visited = visitor.marks_visited_nodes() && ctx.state(id).visited;
    if already_on_path || already_visited {
        end_hooks(ctx, visitor, id, is_corpus);
        return true;
    }

    if !visitor.visit_begin(ctx, id) {
        end_hooks(ctx, visitor, id, is_corpus);
        return false;
    }

    ctx.state_mut(id).traversing = true;
    if visitor.marks_visited_nodes() {
        ctx.state_mut(id).visited = true;
    }

    let mut keep_going = true;
    for child in ctx.get(id).children() {
        if !traverse(ctx, visitor, child) {
            keep_going = false;
            break;
        }
    }

    ctx.state_mut(id).traversing = false;
    visitor.visit_end(ctx, id);
    end_hooks(ctx, visitor, id, is_corpus);
    keep_going
}

fn end_hooks(ctx: &Context, visitor: &mut dyn Visitor, id: DiffNodeId, is_corpus: bool) {
    if is_corpus {
        visitor.end_corpus_diff(ctx, id);
    } else {
        visitor.end_diff_node(ctx, id);
    }
}
