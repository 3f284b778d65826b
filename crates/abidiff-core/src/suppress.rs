//! Suppression matching (spec §4.5): marks diff nodes [`Category::SUPPRESSED`]
//! without removing them from the graph, so redundancy and reporting still
//! see the full shape of what was silenced.
//!
//! Matching runs as a single traversal: a pre-order check against every
//! loaded rule, and a post-order cascade that suppresses a node with no
//! local changes of its own once every one of its non-empty children is
//! already suppressed (e.g. a struct whose only changes are in members that
//! were individually suppressed).

use std::collections::HashSet;

use abidiff_category::Category;
use abidiff_ir::{Decl, ElfSymbol, Subject, SubjectId, SubjectKind, Type};
use abidiff_suppr::{
    regex_is_match, ChangeKind, FunctionSuppression, ReachKind, SuppressionList, SuppressionRule,
    TypeSuppression, VariableSuppression,
};
use bstr::BString;
use regex::Regex;

use crate::changes::{has_changes_map, is_locally_changed};
use crate::context::Context;
use crate::node::{DiffKind, DiffNode, DiffNodeId};
use crate::visit::{traverse, Visitor};

/// Symbol names suppressed in the corpus-diff's unreferenced-symbol buckets
/// (spec §4.5: suppressions "are also applied to the corpus-diff's bucket of
/// added/removed ... unreferenced symbols"). Those entries are plain
/// `ElfSymbol`s, not diff nodes, so there is nowhere to set a category bit —
/// callers (`stats`, the reporter) consult this set instead.
#[derive(Debug, Clone, Default)]
pub struct SuppressedSymbols {
    pub functions: HashSet<BString>,
    pub variables: HashSet<BString>,
}

/// Run every suppression rule in `ctx.suppressions` over the graph rooted at
/// `root`, setting [`Category::SUPPRESSED`] on every node (and, for classes,
/// virtual member functions) a rule matches.
pub fn apply_suppressions(ctx: &mut Context, root: DiffNodeId) -> SuppressedSymbols {
    if ctx.suppressions.is_empty() {
        return SuppressedSymbols::default();
    }

    let sonames = corpus_sonames(ctx, root);
    let non_empty = has_changes_map(ctx);
    let rules = ctx.suppressions.clone();
    let mut visitor =
        SuppressionApplicator { rules: &rules, sonames: &sonames, reach_stack: Vec::new(), non_empty };
    traverse(ctx, &mut visitor, root);

    suppress_unreferenced_symbols(ctx, root, &rules, &sonames)
}

/// The two corpus sonames a rule's `soname_regex` is matched against (spec
/// §4.5 "soname regex"): either side of the comparison counts as a match,
/// since a rule scoping a library by name should still apply whether that
/// library is the "old" or "new" side of the diff.
#[derive(Debug, Clone, Default)]
struct Sonames {
    old: BString,
    new: BString,
}

fn corpus_sonames(ctx: &Context, root: DiffNodeId) -> Sonames {
    match &ctx.get(root).kind {
        DiffKind::Corpus { old_soname, new_soname, .. } => {
            Sonames { old: old_soname.clone(), new: new_soname.clone() }
        }
        _ => Sonames::default(),
    }
}

fn soname_matches(regex: Option<&Regex>, sonames: &Sonames) -> bool {
    match regex {
        Some(re) => regex_is_match(re, &sonames.old) || regex_is_match(re, &sonames.new),
        None => true,
    }
}

struct SuppressionApplicator<'a> {
    rules: &'a SuppressionList,
    sonames: &'a Sonames,
    reach_stack: Vec<ReachKind>,
    non_empty: Vec<bool>,
}

impl<'a> Visitor for SuppressionApplicator<'a> {
    fn marks_visited_nodes(&self) -> bool {
        false
    }

    fn visit_begin(&mut self, ctx: &mut Context, id: DiffNodeId) -> bool {
        let reach = self.reach_stack.last().copied().unwrap_or(ReachKind::Direct);
        if self.rules.rules.iter().any(|r| rule_matches(ctx, r, id, reach, self.sonames)) {
            mark_suppressed(ctx, id);
            suppress_virtual_members_of_matched_class(ctx, id);
        }
        self.reach_stack.push(child_reach(ctx, id, reach));
        true
    }

    fn visit_end(&mut self, ctx: &mut Context, id: DiffNodeId) {
        self.reach_stack.pop();
        if ctx.state(id).local_category.contains(Category::SUPPRESSED) {
            return;
        }
        if is_locally_changed(ctx, id) {
            return;
        }
        let children = ctx.get(id).children();
        if children.is_empty() {
            return;
        }
        let all_suppressed = children
            .iter()
            .all(|&c| !self.non_empty[c.index()] || ctx.state(c).local_category.contains(Category::SUPPRESSED));
        if all_suppressed {
            mark_suppressed(ctx, id);
        }
    }
}

fn mark_suppressed(ctx: &mut Context, id: DiffNodeId) {
    let state = ctx.state_mut(id);
    state.local_category.insert(Category::SUPPRESSED);
    state.inherited_category.insert(Category::SUPPRESSED);
}

/// When a type-suppression matches a class or union, an added or removed
/// virtual member function of that class is suppressed along with it (spec
/// §4.5: "... and to added/removed virtual member functions of classes
/// matched by type-suppressions").
fn suppress_virtual_members_of_matched_class(ctx: &mut Context, id: DiffNodeId) {
    let member_functions = match &ctx.get(id).kind {
        DiffKind::ClassOrUnion { member_functions, .. } => member_functions.clone(),
        _ => return,
    };
    for child in member_functions.deleted.iter().chain(member_functions.added.iter()) {
        let node = ctx.get(*child);
        let is_virtual = function_decl(ctx, node).map(|f| f.is_declared_virtual).unwrap_or(false);
        if is_virtual {
            mark_suppressed(ctx, *child);
        }
    }
}

fn child_reach(ctx: &Context, id: DiffNodeId, current: ReachKind) -> ReachKind {
    let node = ctx.get(id);
    match &node.kind {
        DiffKind::PointerOrReference { .. } => match subject_kind(ctx, node) {
            Some(SubjectKind::Pointer) => ReachKind::ThroughPointer,
            Some(SubjectKind::Reference) => ReachKind::ThroughReference,
            _ => current,
        },
        _ => current,
    }
}

fn subject_kind(ctx: &Context, node: &DiffNode) -> Option<SubjectKind> {
    node.first.or(node.second).map(|id| ctx.env.get(id).kind())
}

fn change_kind_of(node: &DiffNode) -> ChangeKind {
    if node.is_addition() {
        ChangeKind::Added
    } else if node.is_deletion() {
        ChangeKind::Removed
    } else {
        ChangeKind::SubTypeChange
    }
}

fn rule_matches(
    ctx: &Context,
    rule: &SuppressionRule,
    id: DiffNodeId,
    reach: ReachKind,
    sonames: &Sonames,
) -> bool {
    match rule {
        SuppressionRule::Type(t) => matches_type(ctx, t, id, reach, sonames),
        SuppressionRule::Function(f) => matches_function(ctx, f, id, sonames),
        SuppressionRule::Variable(v) => matches_variable(ctx, v, id, sonames),
    }
}

fn function_decl<'a>(ctx: &'a Context, node: &DiffNode) -> Option<&'a abidiff_ir::FunctionDecl> {
    node.first
        .or(node.second)
        .and_then(|s| ctx.env.get(s).as_decl())
        .and_then(|d| match d {
            Decl::Function(f) => Some(f),
            _ => None,
        })
}

fn variable_decl<'a>(ctx: &'a Context, node: &DiffNode) -> Option<&'a abidiff_ir::VariableDecl> {
    node.first
        .or(node.second)
        .and_then(|s| ctx.env.get(s).as_decl())
        .and_then(|d| match d {
            Decl::Variable(v) => Some(v),
            _ => None,
        })
}

fn matches_type(ctx: &Context, rule: &TypeSuppression, id: DiffNodeId, reach: ReachKind, sonames: &Sonames) -> bool {
    let node = ctx.get(id);
    let kind = match subject_kind(ctx, node) {
        Some(k) => k,
        None => return false,
    };
    if !matches!(
        kind,
        SubjectKind::Basic | SubjectKind::Array | SubjectKind::Enum | SubjectKind::Typedef | SubjectKind::Class | SubjectKind::Union
    ) {
        return false;
    }
    if let Some(re) = &rule.name_regex {
        let name = node.first.or(node.second).map(|s| ctx.env.get(s).qualified_name(ctx.env)).unwrap_or_default();
        if !regex_is_match(re, &name) {
            return false;
        }
    }
    // This IR does not model source locations (see DESIGN.md); a rule that
    // constrains on file never matches.
    if rule.file_regex.is_some() {
        return false;
    }
    if !soname_matches(rule.soname_regex.as_ref(), sonames) {
        return false;
    }
    if let Some(ck) = rule.change_kind {
        if change_kind_of(node) != ck {
            return false;
        }
    }
    if let Some(rk) = rule.reach_kind {
        if rk != reach {
            return false;
        }
    }
    if !matches_member_insertion(ctx, node, rule) {
        return false;
    }
    true
}

fn matches_member_insertion(ctx: &Context, node: &DiffNode, rule: &TypeSuppression) -> bool {
    if rule.has_data_member_inserted_at.is_none() && rule.has_data_member_inserted_between.is_none() {
        return true;
    }
    let data_members = match &node.kind {
        DiffKind::ClassOrUnion { data_members, .. } => data_members,
        _ => return false,
    };
    let size_align = node
        .second
        .or(node.first)
        .and_then(|s| ctx.env.get(s).as_type())
        .map(Type::size_align)
        .unwrap_or_default();
    let resolve = |b: abidiff_suppr::Boundary| match b {
        abidiff_suppr::Boundary::Offset(o) => o,
        abidiff_suppr::Boundary::End => size_align.size_in_bits.unwrap_or(u64::MAX),
    };
    let added_offsets: Vec<u64> = data_members
        .added
        .iter()
        .filter_map(|&cid| {
            let n = ctx.get(cid);
            match n.second.map(|s| ctx.env.get(s))?.as_decl()? {
                Decl::Variable(v) => v.offset_in_bits,
                _ => None,
            }
        })
        .collect();
    if let Some(at) = rule.has_data_member_inserted_at {
        if added_offsets.contains(&resolve(at)) {
            return true;
        }
    }
    if let Some(range) = rule.has_data_member_inserted_between {
        let begin = resolve(range.begin);
        let end = resolve(range.end);
        if added_offsets.iter().any(|&o| o >= begin && o <= end) {
            return true;
        }
    }
    false
}

fn matches_function(ctx: &Context, rule: &FunctionSuppression, id: DiffNodeId, sonames: &Sonames) -> bool {
    let node = ctx.get(id);
    if !matches!(node.kind, DiffKind::FunctionDecl { .. }) {
        return false;
    }
    let f = match function_decl(ctx, node) {
        Some(f) => f,
        None => return false,
    };
    if let Some(re) = &rule.name_regex {
        if !regex_is_match(re, &f.name) {
            return false;
        }
    }
    if let Some(re) = &rule.symbol_name_regex {
        match f.symbol.as_ref().map(ElfSymbol::versioned_name) {
            Some(s) if regex_is_match(re, &s) => {}
            _ => return false,
        }
    }
    if !soname_matches(rule.soname_regex.as_ref(), sonames) {
        return false;
    }
    if let Some(ck) = rule.change_kind {
        if change_kind_of(node) != ck {
            return false;
        }
    }
    if let Some(re) = &rule.return_type_regex {
        let ret = match ctx.env.get(f.function_type).as_type() {
            Some(Type::FunctionType(ft)) => ctx.env.get(ft.return_type).qualified_name(ctx.env),
            _ => BString::default(),
        };
        if !regex_is_match(re, &ret) {
            return false;
        }
    }
    if let Some(p) = &rule.parameter {
        let ft = match ctx.env.get(f.function_type).as_type() {
            Some(Type::FunctionType(ft)) => ft,
            _ => return false,
        };
        let matched = ft.parameters.iter().enumerate().any(|(i, &pid)| {
            if let Some(idx) = p.index {
                if i as u32 != idx {
                    return false;
                }
            }
            match &p.type_name_regex {
                Some(re) => match ctx.env.get(pid).as_decl() {
                    Some(Decl::FunctionParameter(pd)) => {
                        regex_is_match(re, &ctx.env.get(pd.param_type).qualified_name(ctx.env))
                    }
                    _ => false,
                },
                None => true,
            }
        });
        if !matched {
            return false;
        }
    }
    true
}

fn matches_variable(ctx: &Context, rule: &VariableSuppression, id: DiffNodeId, sonames: &Sonames) -> bool {
    let node = ctx.get(id);
    if !matches!(node.kind, DiffKind::Variable { .. }) {
        return false;
    }
    let v = match variable_decl(ctx, node) {
        Some(v) => v,
        None => return false,
    };
    if let Some(re) = &rule.name_regex {
        if !regex_is_match(re, &v.name) {
            return false;
        }
    }
    if let Some(re) = &rule.symbol_name_regex {
        match v.symbol.as_ref().map(ElfSymbol::versioned_name) {
            Some(s) if regex_is_match(re, &s) => {}
            _ => return false,
        }
    }
    if !soname_matches(rule.soname_regex.as_ref(), sonames) {
        return false;
    }
    if let Some(ck) = rule.change_kind {
        if change_kind_of(node) != ck {
            return false;
        }
    }
    if let Some(re) = &rule.type_name_regex {
        let tname = ctx.env.get(v.var_type).qualified_name(ctx.env);
        if !regex_is_match(re, &tname) {
            return false;
        }
    }
    true
}

fn suppress_unreferenced_symbols(
    ctx: &Context,
    root: DiffNodeId,
    rules: &SuppressionList,
    sonames: &Sonames,
) -> SuppressedSymbols {
    let (func_syms, var_syms) = match &ctx.get(root).kind {
        DiffKind::Corpus { unreferenced_function_symbols, unreferenced_variable_symbols, .. } => {
            (unreferenced_function_symbols, unreferenced_variable_symbols)
        }
        _ => return SuppressedSymbols::default(),
    };

    let mut out = SuppressedSymbols::default();
    for (bucket, change_kind) in
        [(&func_syms.added, ChangeKind::Added), (&func_syms.deleted, ChangeKind::Removed)]
    {
        for sym in bucket {
            if symbol_matches_any_function_rule(rules, sym, change_kind, sonames) {
                out.functions.insert(sym.versioned_name());
            }
        }
    }
    for (bucket, change_kind) in
        [(&var_syms.added, ChangeKind::Added), (&var_syms.deleted, ChangeKind::Removed)]
    {
        for sym in bucket {
            if symbol_matches_any_variable_rule(rules, sym, change_kind, sonames) {
                out.variables.insert(sym.versioned_name());
            }
        }
    }
    out
}

fn symbol_matches_any_function_rule(
    rules: &SuppressionList,
    sym: &ElfSymbol,
    change_kind: ChangeKind,
    sonames: &Sonames,
) -> bool {
    rules.rules.iter().any(|r| match r {
        SuppressionRule::Function(f) => {
            if let Some(ck) = f.change_kind {
                if ck != change_kind {
                    return false;
                }
            }
            if !soname_matches(f.soname_regex.as_ref(), sonames) {
                return false;
            }
            match &f.symbol_name_regex {
                Some(re) => regex_is_match(re, &sym.versioned_name()),
                None => f.name_regex.is_none(),
            }
        }
        _ => false,
    })
}

fn symbol_matches_any_variable_rule(
    rules: &SuppressionList,
    sym: &ElfSymbol,
    change_kind: ChangeKind,
    sonames: &Sonames,
) -> bool {
    rules.rules.iter().any(|r| match r {
        SuppressionRule::Variable(v) => {
            if let Some(ck) = v.change_kind {
                if ck != change_kind {
                    return false;
                }
            }
            if !soname_matches(v.soname_regex.as_ref(), sonames) {
                return false;
            }
            match &v.symbol_name_regex {
                Some(re) => regex_is_match(re, &sym.versioned_name()),
                None => v.name_regex.is_none(),
            }
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidiff_ir::{BasicType, FunctionType, IrEnvironment, SizeAlign};
    use abidiff_suppr::SuppressionList as SL;

    fn make_function(env: &mut IrEnvironment, name: &str, is_virtual: bool) -> SubjectId {
        let void = env.intern(Subject::Type(Type::Basic(BasicType { name: "void".into(), size_align: SizeAlign::default() })));
        let ftype = env.intern(Subject::Type(Type::FunctionType(FunctionType {
            return_type: void,
            parameters: Vec::new(),
            is_variadic: false,
        })));
        env.intern(Subject::Decl(Decl::Function(abidiff_ir::FunctionDecl {
            name: name.into(),
            linkage_name: None,
            function_type: ftype,
            symbol: None,
            is_inline: false,
            access: None,
            is_static: false,
            is_declared_virtual: is_virtual,
            vtable_offset: None,
        })))
    }

    #[test]
    fn name_matched_function_addition_is_suppressed() {
        use crate::compare::compare_corpora;
        use abidiff_ir::Corpus;

        let mut env = IrEnvironment::new();
        let g = make_function(&mut env, "internal_helper", false);

        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(g);

        let mut ctx = Context::new(&env);
        let (text, _) = SL::parse("[suppress_function]\nname_regexp = ^internal_.*$\nchange_kind = added-declaration\n", "r.ini");
        ctx.suppressions = text;
        let root = compare_corpora(&mut ctx, &old, &new);
        apply_suppressions(&mut ctx, root);

        let added = match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => functions.added[0],
            _ => unreachable!(),
        };
        assert!(ctx.state(added).local_category.contains(Category::SUPPRESSED));
    }

    #[test]
    fn unmatched_function_addition_is_not_suppressed() {
        use crate::compare::compare_corpora;
        use abidiff_ir::Corpus;

        let mut env = IrEnvironment::new();
        let g = make_function(&mut env, "public_api", false);

        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(g);

        let mut ctx = Context::new(&env);
        let (rules, _) = SL::parse("[suppress_function]\nname_regexp = ^internal_.*$\n", "r.ini");
        ctx.suppressions = rules;
        let root = compare_corpora(&mut ctx, &old, &new);
        apply_suppressions(&mut ctx, root);

        let added = match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => functions.added[0],
            _ => unreachable!(),
        };
        assert!(!ctx.state(added).local_category.contains(Category::SUPPRESSED));
    }

    #[test]
    fn soname_matched_rule_suppresses_in_named_library() {
        use crate::compare::compare_corpora;
        use abidiff_ir::Corpus;

        let mut env = IrEnvironment::new();
        let g = make_function(&mut env, "internal_helper", false);

        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(g);

        let mut ctx = Context::new(&env);
        let (rules, _) = SL::parse(
            "[suppress_function]\nname_regexp = ^internal_.*$\nsoname_regexp = ^libfoo\\.so\\.1$\n",
            "r.ini",
        );
        ctx.suppressions = rules;
        let root = compare_corpora(&mut ctx, &old, &new);
        apply_suppressions(&mut ctx, root);

        let added = match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => functions.added[0],
            _ => unreachable!(),
        };
        assert!(ctx.state(added).local_category.contains(Category::SUPPRESSED));
    }

    #[test]
    fn soname_mismatched_rule_does_not_suppress() {
        use crate::compare::compare_corpora;
        use abidiff_ir::Corpus;

        let mut env = IrEnvironment::new();
        let g = make_function(&mut env, "internal_helper", false);

        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(g);

        let mut ctx = Context::new(&env);
        let (rules, _) = SL::parse(
            "[suppress_function]\nname_regexp = ^internal_.*$\nsoname_regexp = ^libbar\\.so\\.1$\n",
            "r.ini",
        );
        ctx.suppressions = rules;
        let root = compare_corpora(&mut ctx, &old, &new);
        apply_suppressions(&mut ctx, root);

        let added = match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => functions.added[0],
            _ => unreachable!(),
        };
        assert!(!ctx.state(added).local_category.contains(Category::SUPPRESSED));
    }

    #[test]
    fn reach_kind_through_pointer_scopes_type_suppression() {
        use crate::compare::compare_corpora;
        use abidiff_ir::{BasicType, Corpus, PointerType, SizeAlign};

        let mut env = IrEnvironment::new();
        let int_old = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        })));
        let long_new = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "long".into(),
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        })));
        let ptr_old = env.intern(Subject::Type(Type::Pointer(PointerType {
            underlying: int_old,
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        })));
        let ptr_new = env.intern(Subject::Type(Type::Pointer(PointerType {
            underlying: long_new,
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        })));
        let v_old = make_variable(&mut env, ptr_old);
        let v_new = make_variable(&mut env, ptr_new);

        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.variables.push(v_old);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.variables.push(v_new);

        let mut ctx = Context::new(&env);
        let (rules, _) = SL::parse(
            "[suppress_type]\nname_regexp = ^(int|long)$\naccessed_through = pointer\n",
            "r.ini",
        );
        ctx.suppressions = rules;
        let root = compare_corpora(&mut ctx, &old, &new);
        apply_suppressions(&mut ctx, root);

        let changed = match &ctx.get(root).kind {
            DiffKind::Corpus { variables, .. } => variables.changed[0],
            _ => unreachable!(),
        };
        assert!(ctx.state(changed).local_category.contains(Category::SUPPRESSED));
    }

    fn make_variable(env: &mut IrEnvironment, ty: SubjectId) -> SubjectId {
        env.intern(Subject::Decl(Decl::Variable(abidiff_ir::VariableDecl {
            name: "v".into(),
            linkage_name: None,
            var_type: ty,
            symbol: None,
            offset_in_bits: None,
            access: None,
            is_static: false,
        })))
    }
}
