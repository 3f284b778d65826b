//! Variable-declaration diffs: shared by the corpus-level variable bucket
//! and a class-or-union's data-member bucket (spec §4.7).

use abidiff_category::Category;
use abidiff_ir::SubjectId;

use abidiff_core::{Context, DiffKind, DiffNodeId};

use crate::names::{quote, variable_decl, variable_signature};
use crate::node::write_type_diff;
use crate::{category_allowed, indent, to_be_reported};

/// One line for a pure deletion or addition: `'<signature>' was removed`
/// or `'<signature>' was added`.
pub(crate) fn write_variable_leaf(ctx: &Context, id: DiffNodeId, verb: &str, depth: usize, buf: &mut String) {
    let subject = {
        let node = ctx.get(id);
        node.first.or(node.second)
    }
    .expect("leaf variable diff has exactly one side present");
    indent(buf, depth);
    buf.push_str(&format!("{} {verb}\n", quote(variable_signature(ctx, subject))));
}

/// A variable bucket entry: deleted, added, or changed (spec §4.7's
/// per-variable report body). Also used for class/union data members.
pub(crate) fn write_variable_entry(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let (first, second) = {
        let node = ctx.get(id);
        (node.first, node.second)
    };
    let (f, s) = match (first, second) {
        (Some(_), None) => return write_variable_leaf(ctx, id, "was removed", depth, buf),
        (None, Some(_)) => return write_variable_leaf(ctx, id, "was added", depth, buf),
        (None, None) => return,
        (Some(f), Some(s)) => (f, s),
    };

    indent(buf, depth);
    buf.push_str(&format!("'{}' changed:\n", variable_signature(ctx, f)));
    write_variable_body(ctx, id, f, s, depth + 1, buf);
}

fn write_variable_body(ctx: &mut Context, id: DiffNodeId, f: SubjectId, s: SubjectId, depth: usize, buf: &mut String) {
    if let (Some(a), Some(b)) = (variable_decl(ctx, f), variable_decl(ctx, s)) {
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
        if category_allowed(ctx, Category::STATIC_DATA_MEMBER) && a.is_static != b.is_static {
            indent(buf, depth);
            buf.push_str("static-ness changed\n");
        }
        if category_allowed(ctx, Category::SIZE_OR_OFFSET) && a.offset_in_bits != b.offset_in_bits {
            indent(buf, depth);
            match (a.offset_in_bits, b.offset_in_bits) {
                (Some(o1), Some(o2)) => buf.push_str(&format!("offset changed from {o1} to {o2} (in bits)\n")),
                _ => buf.push_str("offset changed\n"),
            }
        }
        if category_allowed(ctx, Category::HARMLESS_SYMBOL_ALIAS) && a.linkage_name != b.linkage_name {
            indent(buf, depth);
            let old = a.linkage_name.clone().unwrap_or_default();
            let new = b.linkage_name.clone().unwrap_or_default();
            buf.push_str(&format!("linkage name changed from {} to {}\n", quote(old), quote(new)));
        }
    }

    let ty = match ctx.get(id).kind.clone() {
        DiffKind::Variable { ty } => ty,
        _ => return,
    };
    if to_be_reported(ctx, ty) {
        indent(buf, depth);
        buf.push_str("type changed:\n");
        write_type_diff(ctx, ty, depth + 1, buf);
    }
}
