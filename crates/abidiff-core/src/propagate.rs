//! Local category assignment and upward propagation (spec §4.4).
//!
//! A node's *local* category comes from the fields visible directly on its
//! two subjects (an access change, a static/non-static flip, a size change,
//! ...). Its *inherited* category is the union of its own local category
//! with every child's inherited category, with [`Category::REDUNDANT`] and
//! [`Category::SUPPRESSED`] masked out of what flows upward — a node buried
//! under a suppressed or already-reported subtree does not itself become
//! suppressed or redundant just because a descendant is.

use abidiff_category::Category;
use abidiff_ir::{BaseSpecifierDecl, Decl, FunctionDecl, Subject, SubjectId, Type, VariableDecl};

use crate::context::Context;
use crate::node::{DiffKind, DiffNode, DiffNodeId};
use crate::visit::{traverse, Visitor};

struct CategoryPropagation;

impl Visitor for CategoryPropagation {
    fn marks_visited_nodes(&self) -> bool {
        false
    }

    fn visit_begin(&mut self, ctx: &mut Context, id: DiffNodeId) -> bool {
        let cat = local_category(ctx, id);
        let state = ctx.state_mut(id);
        state.local_category = cat;
        state.inherited_category = cat;
        true
    }

    fn visit_end(&mut self, ctx: &mut Context, id: DiffNodeId) {
        let children = ctx.get(id).children();
        let mut inherited = ctx.state(id).local_category;
        for child in children {
            let child_cat = ctx.state(child).inherited_category;
            inherited = inherited.union(child_cat.subtraction(Category::REDUNDANT.union(Category::SUPPRESSED)));
        }
        ctx.state_mut(id).inherited_category = inherited;
    }
}

/// Run the propagation pass over the whole graph rooted at `root`. Safe to
/// call again after suppression/redundancy marking change the masked bits
/// it reads, since it recomputes every node's category from scratch.
pub fn propagate_categories(ctx: &mut Context, root: DiffNodeId) {
    traverse(ctx, &mut CategoryPropagation, root);
}

fn local_category(ctx: &Context, id: DiffNodeId) -> Category {
    let node = ctx.get(id);
    match &node.kind {
        DiffKind::Distinct { compatible } => {
            if compatible.is_some() {
                Category::COMPATIBLE_TYPE
            } else {
                Category::NO_CHANGE
            }
        }
        DiffKind::PointerOrReference { .. } | DiffKind::FunctionParameter { .. } | DiffKind::FunctionType { .. } => {
            Category::NO_CHANGE
        }
        DiffKind::Qualified { .. } | DiffKind::Array { .. } => size_align_category(ctx, node),
        DiffKind::Typedef { .. } => size_align_category(ctx, node).union(name_category(ctx, node)),
        DiffKind::Enum { enumerators, .. } => {
            let mut cat = size_align_category(ctx, node).union(name_category(ctx, node));
            if !enumerators.added.is_empty() && enumerators.deleted.is_empty() && enumerators.changed.is_empty() {
                cat = cat.union(Category::HARMLESS_ENUM);
            }
            cat
        }
        DiffKind::FunctionDecl { .. } => function_decl_category(ctx, node),
        DiffKind::Variable { .. } => variable_category(ctx, node),
        DiffKind::BaseSpecifier { .. } => base_specifier_category(ctx, node),
        DiffKind::ClassOrUnion { .. } => size_align_category(ctx, node).union(name_category(ctx, node)),
        DiffKind::Scope { .. } | DiffKind::TranslationUnit { .. } | DiffKind::Corpus { .. } => Category::NO_CHANGE,
    }
}

fn decl_of(ctx: &Context, id: Option<SubjectId>) -> Option<&Decl> {
    id.map(|i| ctx.env.get(i)).and_then(Subject::as_decl)
}

fn type_of(ctx: &Context, id: Option<SubjectId>) -> Option<&Type> {
    id.map(|i| ctx.env.get(i)).and_then(Subject::as_type)
}

fn as_function(d: &Decl) -> Option<&FunctionDecl> {
    match d {
        Decl::Function(f) => Some(f),
        _ => None,
    }
}

fn as_variable(d: &Decl) -> Option<&VariableDecl> {
    match d {
        Decl::Variable(v) => Some(v),
        _ => None,
    }
}

fn as_base(d: &Decl) -> Option<&BaseSpecifierDecl> {
    match d {
        Decl::BaseSpecifier(b) => Some(b),
        _ => None,
    }
}

fn size_align_category(ctx: &Context, node: &DiffNode) -> Category {
    match (type_of(ctx, node.first), type_of(ctx, node.second)) {
        (Some(ft), Some(st)) if ft.size_align() != st.size_align() => Category::SIZE_OR_OFFSET,
        _ => Category::NO_CHANGE,
    }
}

fn name_category(ctx: &Context, node: &DiffNode) -> Category {
    match (node.first, node.second) {
        (Some(f), Some(s))
            if ctx.env.get(f).qualified_name(ctx.env) != ctx.env.get(s).qualified_name(ctx.env) =>
        {
            Category::HARMLESS_DECL_NAME
        }
        _ => Category::NO_CHANGE,
    }
}

fn function_decl_category(ctx: &Context, node: &DiffNode) -> Category {
    let ff = decl_of(ctx, node.first).and_then(as_function);
    let sf = decl_of(ctx, node.second).and_then(as_function);
    match (ff, sf) {
        (Some(a), Some(b)) => {
            let mut cat = Category::NO_CHANGE;
            if a.access != b.access {
                cat = cat.union(Category::ACCESS);
            }
            if a.is_declared_virtual != b.is_declared_virtual || a.vtable_offset != b.vtable_offset {
                cat = cat.union(Category::VIRTUAL_MEMBER);
            }
            let only_alias_differs = a.linkage_name != b.linkage_name
                && a.access == b.access
                && a.is_static == b.is_static
                && a.is_inline == b.is_inline
                && a.is_declared_virtual == b.is_declared_virtual
                && a.vtable_offset == b.vtable_offset;
            if only_alias_differs {
                cat = cat.union(Category::HARMLESS_SYMBOL_ALIAS);
            }
            cat
        }
        _ => {
            // Pure addition/deletion of a member function: categorize by
            // whether it was virtual, so suppression of "non-virtual member
            // function added/removed" doesn't also swallow vtable changes.
            match ff.or(sf) {
                Some(f) if f.access.is_some() => {
                    if f.is_declared_virtual {
                        Category::VIRTUAL_MEMBER
                    } else {
                        Category::NON_VIRTUAL_MEMBER_FUNCTION
                    }
                }
                _ => Category::NO_CHANGE,
            }
        }
    }
}

fn variable_category(ctx: &Context, node: &DiffNode) -> Category {
    let fv = decl_of(ctx, node.first).and_then(as_variable);
    let sv = decl_of(ctx, node.second).and_then(as_variable);
    match (fv, sv) {
        (Some(a), Some(b)) => {
            let mut cat = Category::NO_CHANGE;
            if a.access != b.access {
                cat = cat.union(Category::ACCESS);
            }
            if a.is_static != b.is_static {
                cat = cat.union(Category::STATIC_DATA_MEMBER);
            }
            if a.offset_in_bits != b.offset_in_bits {
                cat = cat.union(Category::SIZE_OR_OFFSET);
            }
            let only_alias_differs = a.linkage_name != b.linkage_name
                && a.access == b.access
                && a.is_static == b.is_static
                && a.offset_in_bits == b.offset_in_bits;
            if only_alias_differs {
                cat = cat.union(Category::HARMLESS_SYMBOL_ALIAS);
            }
            cat
        }
        _ => match fv.or(sv) {
            Some(v) if v.is_static => Category::STATIC_DATA_MEMBER,
            _ => Category::NO_CHANGE,
        },
    }
}

fn base_specifier_category(ctx: &Context, node: &DiffNode) -> Category {
    let fb = decl_of(ctx, node.first).and_then(as_base);
    let sb = decl_of(ctx, node.second).and_then(as_base);
    let mut cat = Category::NO_CHANGE;
    if let (Some(a), Some(b)) = (fb, sb) {
        if a.access != b.access {
            cat = cat.union(Category::ACCESS);
        }
        if a.is_virtual != b.is_virtual {
            cat = cat.union(Category::VIRTUAL_MEMBER);
        }
        if a.offset_in_bits != b.offset_in_bits {
            cat = cat.union(Category::SIZE_OR_OFFSET);
        }
    }
    cat
}
