//! Class-or-union diffs: size/alignment/name header, then the five member
//! buckets (bases, data members, member functions, member types, member
//! class templates), each printed only when it has at least one reportable
//! entry (spec §4.7, and spec §9's open question on member types / member
//! class templates: listed "conditional on their respective counts being
//! non-zero").
//!
//! Guards cyclic subtrees (a class holding, however indirectly, a pointer
//! back to itself) with the `currently-reporting` / `reported-once` flags
//! the spec's design notes call out as living on the canonical
//! representative (§9 "Currently-reporting / reported-once flags").

use abidiff_ir::{BaseSpecifierDecl, ClassUnionKind, Decl, SubjectId};

use abidiff_core::{Bucket, Context, DiffKind, DiffNodeId};

use crate::function::write_function_entry;
use crate::names::quote;
use crate::node::{write_size_and_name, write_type_diff};
use crate::variable::write_variable_entry;
use crate::{indent, pluralize, to_be_reported};

pub(crate) fn write_class_or_union_diff(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    if ctx.state(id).currently_reporting || ctx.state(id).reported_once {
        indent(buf, depth);
        buf.push_str("(details elided, already reported above)\n");
        return;
    }
    ctx.state_mut(id).currently_reporting = true;

    let (noun, bases, data_members, member_functions, member_types, member_class_templates) =
        match ctx.get(id).kind.clone() {
            DiffKind::ClassOrUnion { union_kind, bases, data_members, member_functions, member_types, member_class_templates } => {
                let noun = match union_kind {
                    ClassUnionKind::Class => "class",
                    ClassUnionKind::Union => "union",
                };
                (noun, bases, data_members, member_functions, member_types, member_class_templates)
            }
            _ => {
                ctx.state_mut(id).currently_reporting = false;
                return;
            }
        };

    let node = ctx.get(id);
    if let (Some(f), Some(_)) = (node.first, node.second) {
        let name = ctx.env.get(f).qualified_name(ctx.env);
        indent(buf, depth);
        buf.push_str(&format!("{noun} {} changed:\n", quote(name)));
    }

    write_size_and_name(ctx, id, depth + 1, buf);
    write_bucket_section(ctx, depth + 1, buf, "base", &bases, write_base_entry);
    write_bucket_section(ctx, depth + 1, buf, "data member", &data_members, write_variable_entry);
    write_bucket_section(ctx, depth + 1, buf, "member function", &member_functions, write_function_entry);
    write_bucket_section(ctx, depth + 1, buf, "member type", &member_types, write_member_type_entry);
    write_bucket_section(
        ctx,
        depth + 1,
        buf,
        "member class template",
        &member_class_templates,
        write_member_type_entry,
    );

    ctx.state_mut(id).currently_reporting = false;
    ctx.state_mut(id).reported_once = true;
}

fn write_bucket_section(
    ctx: &mut Context,
    depth: usize,
    buf: &mut String,
    label: &str,
    bucket: &Bucket,
    mut write_entry: impl FnMut(&mut Context, DiffNodeId, usize, &mut String),
) {
    let reportable: Vec<DiffNodeId> = bucket.all().filter(|&id| to_be_reported(ctx, id)).collect();
    if reportable.is_empty() {
        return;
    }
    let total = reportable.len();
    let filtered_out = bucket.len() - total;
    indent(buf, depth);
    buf.push_str(&format!("{total} {label} {}", pluralize(total, "change", "changes")));
    if filtered_out > 0 {
        buf.push_str(&format!(" ({filtered_out} filtered out)"));
    }
    buf.push('\n');
    for id in reportable {
        write_entry(ctx, id, depth + 1, buf);
    }
}

fn base_class_name(ctx: &Context, decl: &BaseSpecifierDecl) -> String {
    ctx.env.get(decl.base_class).qualified_name(ctx.env).to_string()
}

fn base_decl(ctx: &Context, id: SubjectId) -> Option<BaseSpecifierDecl> {
    match ctx.env.get(id).as_decl()? {
        Decl::BaseSpecifier(b) => Some(b.clone()),
        _ => None,
    }
}

fn write_base_entry(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let (first, second) = {
        let node = ctx.get(id);
        (node.first, node.second)
    };
    let (f, s) = match (first, second) {
        (Some(f), None) => {
            let name = base_decl(ctx, f).map(|b| base_class_name(ctx, &b)).unwrap_or_default();
            indent(buf, depth);
            buf.push_str(&format!("base {} was removed\n", quote(name)));
            return;
        }
        (None, Some(s)) => {
            let name = base_decl(ctx, s).map(|b| base_class_name(ctx, &b)).unwrap_or_default();
            indent(buf, depth);
            buf.push_str(&format!("base {} was added\n", quote(name)));
            return;
        }
        (None, None) => return,
        (Some(f), Some(s)) => (f, s),
    };

    let name = base_decl(ctx, f).map(|b| base_class_name(ctx, &b)).unwrap_or_default();
    indent(buf, depth);
    buf.push_str(&format!("base {} changed:\n", quote(name)));

    if let (Some(a), Some(b)) = (base_decl(ctx, f), base_decl(ctx, s)) {
        if a.access != b.access {
            indent(buf, depth + 1);
            buf.push_str(&format!("access changed from {} to {}\n", a.access, b.access));
        }
        if a.is_virtual != b.is_virtual {
            indent(buf, depth + 1);
            buf.push_str("virtual-ness changed\n");
        }
        if a.offset_in_bits != b.offset_in_bits {
            indent(buf, depth + 1);
            buf.push_str(&format!("offset changed from {} to {} (in bits)\n", a.offset_in_bits, b.offset_in_bits));
        }
    }

    let underlying = match ctx.get(id).kind.clone() {
        DiffKind::BaseSpecifier { underlying_class } => underlying_class,
        _ => return,
    };
    if to_be_reported(ctx, underlying) {
        write_type_diff(ctx, underlying, depth + 1, buf);
    }
}

fn write_member_type_entry(ctx: &mut Context, id: DiffNodeId, depth: usize, buf: &mut String) {
    let (first, second) = {
        let node = ctx.get(id);
        (node.first, node.second)
    };
    match (first, second) {
        (Some(f), None) => {
            indent(buf, depth);
            buf.push_str(&format!("{} was removed\n", quote(ctx.env.get(f).qualified_name(ctx.env))));
        }
        (None, Some(s)) => {
            indent(buf, depth);
            buf.push_str(&format!("{} was added\n", quote(ctx.env.get(s).qualified_name(ctx.env))));
        }
        (None, None) => {}
        (Some(_), Some(_)) => write_type_diff(ctx, id, depth, buf),
    }
}
