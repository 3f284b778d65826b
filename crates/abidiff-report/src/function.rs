//! Function-declaration diffs: shared by the corpus-level function bucket
//! and a class-or-union's member-function bucket (spec §4.7).

use abidiff_category::Category;
use abidiff_ir::SubjectId;

use abidiff_core::{Context, DiffKind, DiffNodeId};

use crate::names::{function_decl, function_signature, quote};
use crate::node::write_type_diff;
use crate::{category_allowed, indent, to_be_reported};

/// One line for a pure deletion or addition: `'<signature>' was removed`
/// or `'<signature>' was added`.
pub(crate) fn write_function_leaf(ctx: &Context, id: DiffNodeId, verb: &str, depth: usize, buf: &mut String) {
    let subject = {
        let node = ctx.get(id);
        node.first.or(node.second)
    }
    .expect("leaf function diff has exactly one side present");
    indent(buf, depth);
    buf.push_str(&format!("{} {verb}\n", quote(function_signature(ctx, subject))));
}

/// A function bucket entry: deleted, added, or changed (spec §4.7's
/// per-function report body).
pub(crate) fn write_function_entry(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let (first, second) = {
        let node = ctx.get(id);
        (node.first, node.second)
    };
    let (f, s) = match (first, second) {
        (Some(_), None) => return write_function_leaf(ctx, id, "was removed", depth, buf),
        (None, Some(_)) => return write_function_leaf(ctx, id, "was added", depth, buf),
        (None, None) => return,
        (Some(f), Some(s)) => (f, s),
    };

    indent(buf, depth);
    buf.push_str(&format!("'{}' changed:\n", function_signature(ctx, f)));
    write_function_body(ctx, id, f, s, depth + 1, buf);
}

fn write_function_body(ctx: &mut Context, id: DiffNodeId, f: SubjectId, s: SubjectId, depth: usize, buf: &mut String) {
    if let (Some(a), Some(b)) = (function_decl(ctx, f), function_decl(ctx, s)) {
        if category_allowed(ctx, Category::HARMLESS_DECL_NAME) && a.name != b.name {
            indent(buf, depth);
            buf.push_str(&format!("name changed from {} to {}\n", quote(&a.name), quote(&b.name)));
        }
        if let (Some(aa), Some(ba)) = (a.access, b.access) {
            if category_allowed(ctx, Category::ACCESS) && aa != ba {
                indent(buf, depth);
                buf.push_str(&format!("access changed from {aa} to {ba}\n"));
            }
        }
        if category_allowed(ctx, Category::VIRTUAL_MEMBER)
            && (a.is_declared_virtual != b.is_declared_virtual || a.vtable_offset != b.vtable_offset)
        {
            indent(buf, depth);
            match (a.vtable_offset, b.vtable_offset) {
                (Some(o1), Some(o2)) if o1 != o2 => {
                    buf.push_str(&format!("vtable offset changed from {o1} to {o2}\n"));
                }
                _ => buf.push_str("virtual-ness changed\n"),
            }
        }
        if category_allowed(ctx, Category::HARMLESS_SYMBOL_ALIAS) && a.linkage_name != b.linkage_name {
            indent(buf, depth);
            let old = a.linkage_name.clone().unwrap_or_default();
            let new = b.linkage_name.clone().unwrap_or_default();
            buf.push_str(&format!("linkage name changed from {} to {}\n", quote(old), quote(new)));
        }
    }

    let function_type = match ctx.get(id).kind.clone() {
        DiffKind::FunctionDecl { function_type } => function_type,
        _ => return,
    };
    if to_be_reported(ctx, function_type) {
        write_function_type_diff(ctx, function_type, depth, buf);
    }
}

fn write_function_type_diff(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let (return_type, changed_parameters, removed, added) = match ctx.get(id).kind.clone() {
        DiffKind::FunctionType { return_type, changed_parameters, removed_parameters, added_parameters } => {
            (return_type, changed_parameters, removed_parameters, added_parameters)
        }
        _ => return,
    };

    if to_be_reported(ctx, return_type) {
        indent(buf, depth);
        buf.push_str("return type changed:\n");
        write_type_diff(ctx, return_type, depth + 1, buf);
    }
    for &removed_id in &removed {
        indent(buf, depth);
        buf.push_str(&format!("parameter {} was removed\n", quote(ctx.env.get(removed_id).qualified_name(ctx.env))));
    }
    for &added_id in &added {
        indent(buf, depth);
        buf.push_str(&format!("parameter {} was added\n", quote(ctx.env.get(added_id).qualified_name(ctx.env))));
    }
    for &param in &changed_parameters {
        if to_be_reported(ctx, param) {
            write_parameter_diff(ctx, param, depth, buf);
        }
    }
}

fn write_parameter_diff(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let ty = match ctx.get(id).kind.clone() {
        DiffKind::FunctionParameter { ty } => ty,
        _ => return,
    };
    let label = {
        let node = ctx.get(id);
        node.first.or(node.second).map(|s| ctx.env.get(s).qualified_name(ctx.env)).unwrap_or_default()
    };
    indent(buf, depth);
    buf.push_str(&format!("parameter {} changed:\n", quote(label)));
    write_type_diff(ctx, ty, depth + 1, buf);
}
