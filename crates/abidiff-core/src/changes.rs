//! Whether a diff node actually represents a change.
//!
//! Two subjects can intern to different [`abidiff_ir::SubjectId`]s in their
//! respective environments while being structurally identical (e.g. `int` in
//! the old corpus and `int` in the new one) — id inequality alone is not
//! "changed". This module walks the diff graph once, bottom-up, to decide.

use abidiff_ir::Decl;

use crate::context::Context;
use crate::node::{DiffKind, DiffNodeId};

/// True if `id`'s subtree has any difference at all, structural or local.
/// Memoized per node and cycle-safe: a self-referential class compared
/// against itself only recurses through the cycle once, after which the
/// in-progress entry is treated as contributing no further change (the
/// ancestor's own fields still decide the outcome).
pub fn has_changes(ctx: &Context, id: DiffNodeId) -> bool {
    let mut memo = vec![None; ctx.node_count()];
    let mut calculating = vec![false; ctx.node_count()];
    compute(ctx, id, &mut memo, &mut calculating)
}

/// [`has_changes`] for every node in the pool at once, reusing a single
/// memo table. Used by passes (suppression cascading) that need the
/// answer for many nodes rather than just the root.
pub fn has_changes_map(ctx: &Context) -> Vec<bool> {
    let mut memo = vec![None; ctx.node_count()];
    let mut calculating = vec![false; ctx.node_count()];
    for id in ctx.all_ids() {
        compute(ctx, id, &mut memo, &mut calculating);
    }
    memo.into_iter().map(|v| v.unwrap_or(false)).collect()
}

fn compute(ctx: &Context, id: DiffNodeId, memo: &mut Vec<Option<bool>>, calculating: &mut Vec<bool>) -> bool {
    if let Some(v) = memo[id.index()] {
        return v;
    }
    if calculating[id.index()] {
        return false;
    }
    calculating[id.index()] = true;

    let node = ctx.get(id);
    let result = if let DiffKind::Corpus {
        old_soname,
        new_soname,
        old_architecture,
        new_architecture,
        functions,
        variables,
        unreferenced_function_symbols,
        unreferenced_variable_symbols,
    } = &node.kind
    {
        // The corpus root has no subjects of its own (spec §3 "Corpus" is
        // the external entry point, never a nested subject pair — see
        // abidiff-ir's `Decl` doc comment), so the "either side absent"
        // shortcut below does not apply to it.
        old_soname != new_soname
            || old_architecture != new_architecture
            || !functions.is_empty()
            || !variables.is_empty()
            || !unreferenced_function_symbols.deleted.is_empty()
            || !unreferenced_function_symbols.added.is_empty()
            || !unreferenced_variable_symbols.deleted.is_empty()
            || !unreferenced_variable_symbols.added.is_empty()
    } else if node.first.is_none() || node.second.is_none() {
        true
    } else {
        match &node.kind {
            DiffKind::Distinct { .. } => true,
            DiffKind::PointerOrReference { underlying }
            | DiffKind::Qualified { underlying }
            | DiffKind::Typedef { underlying } => {
                shallow_fields_changed(ctx, id) || compute(ctx, *underlying, memo, calculating)
            }
            DiffKind::Array { element } => {
                shallow_fields_changed(ctx, id) || compute(ctx, *element, memo, calculating)
            }
            DiffKind::Enum { underlying, enumerators } => {
                !enumerators.is_empty()
                    || shallow_fields_changed(ctx, id)
                    || compute(ctx, *underlying, memo, calculating)
            }
            DiffKind::FunctionParameter { ty } => compute(ctx, *ty, memo, calculating),
            DiffKind::FunctionType { return_type, changed_parameters, removed_parameters, added_parameters } => {
                !removed_parameters.is_empty()
                    || !added_parameters.is_empty()
                    || compute(ctx, *return_type, memo, calculating)
                    || changed_parameters.iter().any(|&c| compute(ctx, c, memo, calculating))
            }
            DiffKind::FunctionDecl { function_type } => {
                shallow_fields_changed(ctx, id) || compute(ctx, *function_type, memo, calculating)
            }
            DiffKind::Variable { ty } => {
                shallow_fields_changed(ctx, id) || compute(ctx, *ty, memo, calculating)
            }
            DiffKind::BaseSpecifier { underlying_class } => {
                shallow_fields_changed(ctx, id) || compute(ctx, *underlying_class, memo, calculating)
            }
            DiffKind::ClassOrUnion { bases, data_members, member_functions, member_types, member_class_templates, .. } => {
                shallow_fields_changed(ctx, id)
                    || !bases.is_empty()
                    || !data_members.is_empty()
                    || !member_functions.is_empty()
                    || !member_types.is_empty()
                    || !member_class_templates.is_empty()
            }
            DiffKind::Scope { decls, types } => !decls.is_empty() || !types.is_empty(),
            DiffKind::TranslationUnit { global_scope } => compute(ctx, *global_scope, memo, calculating),
            // Handled above, before subjects are consulted.
            DiffKind::Corpus { .. } => unreachable!("corpus root handled above"),
        }
    };

    calculating[id.index()] = false;
    memo[id.index()] = Some(result);
    result
}

/// True if `id` itself differs from its two subjects' own visible fields or
/// bucket contents, ignoring whatever its children separately contribute.
/// Used by the suppression cascade (spec §4.5) to tell "this class only
/// changed because a member changed" from "this class itself changed".
pub fn is_locally_changed(ctx: &Context, id: DiffNodeId) -> bool {
    let node = ctx.get(id);
    if node.first.is_none() || node.second.is_none() {
        return true;
    }
    match &node.kind {
        DiffKind::Distinct { .. } => true,
        DiffKind::PointerOrReference { .. }
        | DiffKind::Qualified { .. }
        | DiffKind::Typedef { .. }
        | DiffKind::Array { .. } => shallow_fields_changed(ctx, id),
        DiffKind::Enum { enumerators, .. } => !enumerators.is_empty() || shallow_fields_changed(ctx, id),
        DiffKind::FunctionParameter { .. } => false,
        DiffKind::FunctionType { removed_parameters, added_parameters, .. } => {
            !removed_parameters.is_empty() || !added_parameters.is_empty()
        }
        DiffKind::FunctionDecl { .. } | DiffKind::Variable { .. } | DiffKind::BaseSpecifier { .. } => {
            shallow_fields_changed(ctx, id)
        }
        DiffKind::ClassOrUnion { .. } => shallow_fields_changed(ctx, id),
        DiffKind::Scope { .. } | DiffKind::TranslationUnit { .. } | DiffKind::Corpus { .. } => false,
    }
}

/// Compares the fields visible on the node's two subjects directly (name,
/// size/alignment, access, staticness, ...) without descending into
/// children. Returns `true` (a conservative "changed") if either side is
/// absent, though callers only reach this after already checking that.
fn shallow_fields_changed(ctx: &Context, id: DiffNodeId) -> bool {
    let node = ctx.get(id);
    let (f, s) = match (node.first, node.second) {
        (Some(f), Some(s)) => (f, s),
        _ => return true,
    };
    let fs = ctx.env.get(f);
    let ss = ctx.env.get(s);

    if fs.qualified_name(ctx.env) != ss.qualified_name(ctx.env) {
        return true;
    }
    if let (Some(ft), Some(st)) = (fs.as_type(), ss.as_type()) {
        if ft.size_align() != st.size_align() {
            return true;
        }
    }

    let decl_changed = match (fs.as_decl(), ss.as_decl()) {
        (Some(Decl::Variable(fv)), Some(Decl::Variable(sv))) => {
            fv.access != sv.access
                || fv.is_static != sv.is_static
                || fv.offset_in_bits != sv.offset_in_bits
                || fv.linkage_name != sv.linkage_name
        }
        (Some(Decl::Function(ff)), Some(Decl::Function(sf))) => {
            ff.access != sf.access
                || ff.is_static != sf.is_static
                || ff.is_inline != sf.is_inline
                || ff.is_declared_virtual != sf.is_declared_virtual
                || ff.vtable_offset != sf.vtable_offset
                || ff.linkage_name != sf.linkage_name
        }
        (Some(Decl::BaseSpecifier(fb)), Some(Decl::BaseSpecifier(sb))) => {
            fb.offset_in_bits != sb.offset_in_bits || fb.is_virtual != sb.is_virtual || fb.access != sb.access
        }
        _ => false,
    };
    if decl_changed {
        return true;
    }

    match (fs.as_type(), ss.as_type()) {
        (Some(abidiff_ir::Type::Qualified(fq)), Some(abidiff_ir::Type::Qualified(sq))) => {
            fq.qualifiers != sq.qualifiers
        }
        (Some(abidiff_ir::Type::Reference(fr)), Some(abidiff_ir::Type::Reference(sr))) => {
            fr.is_rvalue != sr.is_rvalue
        }
        (Some(abidiff_ir::Type::Class(fc)), Some(abidiff_ir::Type::Class(sc)))
        | (Some(abidiff_ir::Type::Union(fc)), Some(abidiff_ir::Type::Union(sc))) => {
            fc.is_declaration_only != sc.is_declaration_only
        }
        _ => false,
    }
}
