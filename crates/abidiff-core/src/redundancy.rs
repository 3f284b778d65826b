//! Redundancy marker (spec §4.6): a second traversal, after propagation and
//! suppression, that marks a diff node REDUNDANT when it has already been
//! visited in an earlier subtree — so a change reported once deep in a
//! shared subtree is not repeated at every reference site.

use std::collections::HashSet;

use abidiff_category::Category;
use abidiff_ir::Decl;

use crate::changes::{has_changes_map, is_locally_changed};
use crate::context::Context;
use crate::node::{DiffKind, DiffNodeId};
use crate::stats::is_filtered_out;

/// Run the redundancy pass over the graph rooted at `root`. Must run after
/// [`crate::propagate_categories`] and [`crate::apply_suppressions`], since
/// it reads `is_filtered_out`, which depends on both.
pub fn mark_redundant(ctx: &mut Context, root: DiffNodeId) {
    let mut pass = RedundancyPass { seen: HashSet::new(), on_path: HashSet::new(), ancestor_filtered: Vec::new() };
    pass.visit(ctx, root);

    let changes = has_changes_map(ctx);
    let mut done = HashSet::new();
    propagate_redundant_upward(ctx, root, &changes, &mut done);
}

/// Clears [`Category::REDUNDANT`] from every node, for when the caller wants
/// redundant changes shown in full (spec §4.6 "a complementary 'clear'
/// visitor").
pub fn clear_redundant(ctx: &mut Context) {
    for id in ctx.all_ids() {
        let state = ctx.state_mut(id);
        state.local_category.remove(Category::REDUNDANT);
        state.inherited_category.remove(Category::REDUNDANT);
    }
}

struct RedundancyPass {
    /// Canonical ids seen in some already-completed subtree.
    seen: HashSet<DiffNodeId>,
    /// Ids on the current root-to-node path, for true IR-cycle detection
    /// (independent of redundancy semantics).
    on_path: HashSet<DiffNodeId>,
    /// Whether each ancestor on the current path is filtered out.
    ancestor_filtered: Vec<bool>,
}

impl RedundancyPass {
    fn visit(&mut self, ctx: &mut Context, id: DiffNodeId) {
        if self.on_path.contains(&id) {
            return;
        }

        let canonical = ctx.canonical_of(id);
        let first_occurrence = !self.seen.contains(&canonical);
        let any_ancestor_filtered = self.ancestor_filtered.iter().any(|&b| b);

        if !first_occurrence && is_redundancy_eligible(ctx, id) {
            let canonical_filtered = is_filtered_out(ctx, canonical);
            if !canonical_filtered && !any_ancestor_filtered {
                mark_redundant_bit(ctx, id);
                // Children are skipped once a node is marked redundant
                // (spec §4.6): nothing further down this subtree needs its
                // own redundancy verdict, and skipping avoids walking back
                // into a self-referential type's own recursive subtree.
                return;
            }
        }

        self.seen.insert(canonical);
        self.on_path.insert(id);
        self.ancestor_filtered.push(is_filtered_out(ctx, id));
        for child in ctx.get(id).children() {
            self.visit(ctx, child);
        }
        self.ancestor_filtered.pop();
        self.on_path.remove(&id);
    }
}

/// False for the contexts the spec carves out as always-reported: function
/// parameters and base-class specifiers (spec §4.6's last bullet), and
/// variadic parameters (spec §4.6's second bullet). A node reached this way
/// is exempt from ever being marked redundant — the nested type diffs it
/// wraps remain ordinarily eligible.
fn is_redundancy_eligible(ctx: &Context, id: DiffNodeId) -> bool {
    let node = ctx.get(id);
    if matches!(node.kind, DiffKind::FunctionParameter { .. } | DiffKind::BaseSpecifier { .. }) {
        return false;
    }
    let is_variadic = node
        .first
        .or(node.second)
        .and_then(|s| ctx.env.get(s).as_decl())
        .map(|d| matches!(d, Decl::FunctionParameter(p) if p.is_variadic))
        .unwrap_or(false);
    !is_variadic
}

fn mark_redundant_bit(ctx: &mut Context, id: DiffNodeId) {
    let state = ctx.state_mut(id);
    state.local_category.insert(Category::REDUNDANT);
    state.inherited_category.insert(Category::REDUNDANT);
}

/// Post-order sweep: a node with at least one changed child, no
/// non-redundant changed child, and no locally reportable change of its own
/// inherits REDUNDANT (spec §4.6).
fn propagate_redundant_upward(
    ctx: &mut Context,
    id: DiffNodeId,
    changes: &[bool],
    done: &mut HashSet<DiffNodeId>,
) {
    if done.contains(&id) {
        return;
    }
    done.insert(id);

    let children = ctx.get(id).children();
    for &child in &children {
        propagate_redundant_upward(ctx, child, changes, done);
    }
    if children.is_empty() {
        return;
    }
    if ctx.state(id).local_category.contains(Category::REDUNDANT) {
        return;
    }
    if is_locally_changed(ctx, id) {
        return;
    }

    let has_changed_child = children.iter().any(|&c| changes[c.index()]);
    let has_non_redundant_changed_child = children
        .iter()
        .any(|&c| changes[c.index()] && !ctx.state(c).local_category.contains(Category::REDUNDANT));

    if has_changed_child && !has_non_redundant_changed_child {
        mark_redundant_bit(ctx, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_corpora;
    use crate::propagate::propagate_categories;
    use abidiff_ir::{
        Access, BasicType, ClassOrUnion, ClassUnionKind, Corpus, Decl, FunctionDecl, FunctionType,
        IrEnvironment, PointerType, SizeAlign, Subject, Type, VariableDecl,
    };

    fn make_class(env: &mut IrEnvironment, name: &str, member_count: u64) -> abidiff_ir::SubjectId {
        let int_ty = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        })));
        let mut data_members = Vec::new();
        for i in 0..member_count {
            data_members.push(env.intern(Subject::Decl(Decl::Variable(VariableDecl {
                name: format!("m{i}").into(),
                linkage_name: None,
                var_type: int_ty,
                symbol: None,
                offset_in_bits: Some(i * 32),
                access: Some(Access::Public),
                is_static: false,
            }))));
        }
        env.intern(Subject::Type(Type::Class(ClassOrUnion {
            name: name.into(),
            kind: ClassUnionKind::Class,
            bases: Vec::new(),
            data_members,
            member_functions: Vec::new(),
            member_types: Vec::new(),
            member_class_templates: Vec::new(),
            is_declaration_only: false,
            size_align: SizeAlign { size_in_bits: Some(member_count * 32), alignment_in_bits: Some(32) },
        })))
    }

    /// Two functions, `f(Foo*)` and `g(Foo*)`, where `Foo` gains a member in
    /// the new corpus: the `Foo` change should be reported once and marked
    /// REDUNDANT the second time it's reached through the other pointer
    /// parameter (spec §8 scenario 5).
    #[test]
    fn repeated_pointer_to_changed_type_is_marked_redundant_on_second_occurrence() {
        let mut env = IrEnvironment::new();
        let old_foo = make_class(&mut env, "Foo", 1);
        let new_foo = make_class(&mut env, "Foo", 2);
        let old_ptr = env.intern(Subject::Type(Type::Pointer(PointerType {
            underlying: old_foo,
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        })));
        let new_ptr = env.intern(Subject::Type(Type::Pointer(PointerType {
            underlying: new_foo,
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        })));

        let void = env.intern(Subject::Type(Type::Basic(BasicType { name: "void".into(), size_align: SizeAlign::default() })));
        let make_fn = |env: &mut IrEnvironment, name: &str, ptr: abidiff_ir::SubjectId| {
            let param = env.intern(Subject::Decl(Decl::FunctionParameter(abidiff_ir::FunctionParameterDecl {
                index: 0,
                name: Some("p".into()),
                param_type: ptr,
                is_variadic: false,
            })));
            let ftype = env.intern(Subject::Type(Type::FunctionType(FunctionType {
                return_type: void,
                parameters: vec![param],
                is_variadic: false,
            })));
            env.intern(Subject::Decl(Decl::Function(FunctionDecl {
                name: name.into(),
                linkage_name: None,
                function_type: ftype,
                symbol: None,
                is_inline: false,
                access: None,
                is_static: false,
                is_declared_virtual: false,
                vtable_offset: None,
            })))
        };

        let old_f = make_fn(&mut env, "f", old_ptr);
        let old_g = make_fn(&mut env, "g", old_ptr);
        let new_f = make_fn(&mut env, "f", new_ptr);
        let new_g = make_fn(&mut env, "g", new_ptr);

        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.functions.push(old_f);
        old.functions.push(old_g);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(new_f);
        new.functions.push(new_g);

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        propagate_categories(&mut ctx, root);
        mark_redundant(&mut ctx, root);

        let functions = match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => functions.changed.clone(),
            _ => unreachable!(),
        };
        assert_eq!(functions.len(), 2);

        let pointer_diff_of = |ctx: &Context, fn_id: DiffNodeId| -> DiffNodeId {
            let ft = match &ctx.get(fn_id).kind {
                DiffKind::FunctionDecl { function_type } => *function_type,
                _ => unreachable!(),
            };
            let param = match &ctx.get(ft).kind {
                DiffKind::FunctionType { changed_parameters, .. } => changed_parameters[0],
                _ => unreachable!(),
            };
            match &ctx.get(param).kind {
                DiffKind::FunctionParameter { ty } => *ty,
                _ => unreachable!(),
            }
        };

        let ptr_a = pointer_diff_of(&ctx, functions[0]);
        let ptr_b = pointer_diff_of(&ctx, functions[1]);
        assert_eq!(ptr_a, ptr_b, "both parameters diff the same cached pointer-type pair");

        let is_redundant = ctx.state(ptr_b).local_category.contains(Category::REDUNDANT);
        assert!(is_redundant || ctx.state(ptr_a).local_category.contains(Category::REDUNDANT));
    }

    #[test]
    fn clear_redundant_removes_the_bit_everywhere() {
        let mut env = IrEnvironment::new();
        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        ctx.state_mut(root).local_category.insert(Category::REDUNDANT);
        clear_redundant(&mut ctx);
        assert!(!ctx.state(root).local_category.contains(Category::REDUNDANT));
        let _ = env; // keep env alive for the whole test
    }
}
