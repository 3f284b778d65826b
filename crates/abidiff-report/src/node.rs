//! Dispatch for a "wrapped" type diff's own body: pointer/reference,
//! qualified, array, typedef, enum, and distinct-kind nodes (spec §3 "Kinds
//! and their shape"). Entered both at the top of a function-parameter /
//! return-type / variable-type diff and recursively for nested layers.

use abidiff_category::Category;
use abidiff_core::{Context, DiffKind, DiffNodeId, EnumeratorBucket};

use crate::class::write_class_or_union_diff;
use crate::names::quote;
use crate::{category_allowed, indent, pluralize, to_be_reported};

pub(crate) fn write_type_diff(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    enum Shape {
        ClassOrUnion,
        Distinct(Option<DiffNodeId>),
        Wrapped(DiffNodeId, &'static str),
        Enum(DiffNodeId, EnumeratorBucket),
        Other,
    }

    let shape = match &ctx.get(id).kind {
        DiffKind::ClassOrUnion { .. } => Shape::ClassOrUnion,
        DiffKind::Distinct { compatible } => Shape::Distinct(*compatible),
        DiffKind::PointerOrReference { underlying } => Shape::Wrapped(*underlying, "underlying type"),
        DiffKind::Qualified { underlying } => Shape::Wrapped(*underlying, "underlying type"),
        DiffKind::Typedef { underlying } => Shape::Wrapped(*underlying, "underlying type"),
        DiffKind::Array { element } => Shape::Wrapped(*element, "array element type"),
        DiffKind::Enum { underlying, enumerators } => Shape::Enum(*underlying, enumerators.clone()),
        _ => Shape::Other,
    };

    match shape {
        Shape::ClassOrUnion => write_class_or_union_diff(ctx, id, depth, buf),
        Shape::Distinct(compatible) => write_distinct(ctx, id, compatible, depth, buf),
        Shape::Wrapped(underlying, label) => {
            write_size_and_name(ctx, id, depth, buf);
            if to_be_reported(ctx, underlying) {
                indent(buf, depth);
                buf.push_str(&format!("{label} changed:\n"));
                write_type_diff(ctx, underlying, depth + 1, buf);
            }
        }
        Shape::Enum(underlying, enumerators) => {
            write_size_and_name(ctx, id, depth, buf);
            if to_be_reported(ctx, underlying) {
                indent(buf, depth);
                buf.push_str("underlying type changed:\n");
                write_type_diff(ctx, underlying, depth + 1, buf);
            }
            write_enumerators(ctx, id, &enumerators, depth, buf);
        }
        Shape::Other => {}
    }
}

fn write_distinct(ctx: &mut Context, id: DiffNodeId, compatible: Option<DiffNodeId>, depth: usize, buf: &mut String) {
    let node = ctx.get(id);
    let (f, s) = (node.first, node.second);
    let f_kind = f.map(|s| ctx.env.get(s).kind().as_str()).unwrap_or("nothing");
    let s_kind = s.map(|s| ctx.env.get(s).kind().as_str()).unwrap_or("nothing");
    indent(buf, depth);
    buf.push_str(&format!("type changed from {f_kind} to {s_kind}\n"));
    if let Some(compat) = compatible {
        if to_be_reported(ctx, compat) {
            write_type_diff(ctx, compat, depth, buf);
        }
    }
}

/// Size, alignment, and (if the category is allowed) name-change lines for
/// a node's two subjects, ignoring whatever its children separately
/// contribute (spec §4.7's per-node body, before any "... changed:" child
/// recursion).
pub(crate) fn write_size_and_name(ctx: &Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let node = ctx.get(id);
    let (f, s) = match (node.first, node.second) {
        (Some(f), Some(s)) => (f, s),
        _ => return,
    };
    if let (Some(ft), Some(st)) = (ctx.env.get(f).as_type(), ctx.env.get(s).as_type()) {
        let (fa, sa) = (ft.size_align(), st.size_align());
        if let (Some(a), Some(b)) = (fa.size_in_bits, sa.size_in_bits) {
            if a != b {
                indent(buf, depth);
                buf.push_str(&format!("type size changed from {a} to {b} bits\n"));
            }
        }
        if let (Some(a), Some(b)) = (fa.alignment_in_bits, sa.alignment_in_bits) {
            if a != b {
                indent(buf, depth);
                buf.push_str(&format!("type alignment changed from {a} to {b} bits\n"));
            }
        }
    }
    if category_allowed(ctx, Category::HARMLESS_DECL_NAME) {
        let fname = ctx.env.get(f).qualified_name(ctx.env);
        let sname = ctx.env.get(s).qualified_name(ctx.env);
        if fname != sname {
            indent(buf, depth);
            buf.push_str(&format!("name changed from {} to {}\n", quote(fname), quote(sname)));
        }
    }
}

fn write_enumerators(ctx: &Context, id: DiffNodeId, enumerators: &EnumeratorBucket, depth: usize, buf: &mut String) {
    if enumerators.is_empty() {
        return;
    }
    let enum_name = ctx
        .get(id)
        .first
        .or(ctx.get(id).second)
        .map(|s| ctx.env.get(s).qualified_name(ctx.env))
        .unwrap_or_default();
    let total = enumerators.deleted.len() + enumerators.added.len() + enumerators.changed.len();
    indent(buf, depth);
    buf.push_str(&format!("{} enumerator {}\n", total, pluralize(total, "change", "changes")));
    for e in &enumerators.deleted {
        indent(buf, depth + 1);
        buf.push_str(&format!("'{enum_name}::{}' (value '{}') deleted\n", e.name, e.value));
    }
    for e in &enumerators.added {
        indent(buf, depth + 1);
        buf.push_str(&format!("'{enum_name}::{}' (value '{}') added\n", e.name, e.value));
    }
    for c in &enumerators.changed {
        indent(buf, depth + 1);
        buf.push_str(&format!(
            "'{enum_name}::{}' from value '{}' to '{}'\n",
            c.name, c.old_value, c.new_value
        ));
    }
}
