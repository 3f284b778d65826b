//! The corpus-diff's summary outputs (spec §6 "Outputs the core exposes"):
//! `has-changes`, `has-incompatible-changes`, `has-net-subtype-changes`,
//! `has-net-changes`, and the `diff-stats` record of removed/added/changed/
//! filtered-out counts per bucket.

use abidiff_category::Category;

use crate::changes::has_changes;
use crate::context::Context;
use crate::node::{Bucket, DiffKind, DiffNodeId};
use crate::suppress::SuppressedSymbols;

/// Removed/added/changed counts for one bucket of the corpus diff (functions
/// or variables), each paired with how many of that subcategory are filtered
/// out of the report. "Net" is spec §4.7's "net = total minus filtered-out".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketStats {
    pub removed: usize,
    pub removed_filtered_out: usize,
    pub added: usize,
    pub added_filtered_out: usize,
    pub changed: usize,
    pub changed_filtered_out: usize,
}

impl BucketStats {
    pub fn net_removed(&self) -> usize {
        self.removed.saturating_sub(self.removed_filtered_out)
    }

    pub fn net_added(&self) -> usize {
        self.added.saturating_sub(self.added_filtered_out)
    }

    pub fn net_changed(&self) -> usize {
        self.changed.saturating_sub(self.changed_filtered_out)
    }

    fn observe(&mut self, bucket: &Bucket, ctx: &Context) {
        self.removed = bucket.deleted.len();
        self.added = bucket.added.len();
        self.changed = bucket.changed.len();
        self.removed_filtered_out = bucket.deleted.iter().filter(|&&id| is_filtered_out(ctx, id)).count();
        self.added_filtered_out = bucket.added.iter().filter(|&&id| is_filtered_out(ctx, id)).count();
        self.changed_filtered_out = bucket.changed.iter().filter(|&&id| is_filtered_out(ctx, id)).count();
    }
}

/// Removed/added counts for one unreferenced-symbol bucket. Symbols have no
/// diff node of their own (spec §3 "corpus"), so "filtered out" here means
/// "named by a matching suppression rule" (see [`SuppressedSymbols`]) rather
/// than a category-mask test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolStats {
    pub removed: usize,
    pub removed_filtered_out: usize,
    pub added: usize,
    pub added_filtered_out: usize,
}

impl SymbolStats {
    pub fn net_removed(&self) -> usize {
        self.removed.saturating_sub(self.removed_filtered_out)
    }

    pub fn net_added(&self) -> usize {
        self.added.saturating_sub(self.added_filtered_out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub functions: BucketStats,
    pub variables: BucketStats,
    pub function_symbols: SymbolStats,
    pub variable_symbols: SymbolStats,
}

/// True if `id` should be hidden from the report regardless of whether it
/// has changes (spec §4.7 "A node is filtered out if ..."). Also the test
/// the redundancy marker (§4.6) uses for its "canonical is not itself
/// filtered out" / "no ancestor on the path is filtered out" exceptions.
pub fn is_filtered_out(ctx: &Context, id: DiffNodeId) -> bool {
    let cat = ctx.state(id).inherited_category;
    if cat.contains(Category::SUPPRESSED) {
        return true;
    }
    if cat.contains(Category::REDUNDANT) && !ctx.display.show_redundant_changes {
        return true;
    }
    if !cat.is_empty() {
        let relevant = cat.subtraction(Category::REDUNDANT);
        if !relevant.intersects(ctx.category_mask) {
            return true;
        }
    }
    false
}

/// Build the full stats record for the corpus diff rooted at `root`. Run
/// after [`crate::propagate_categories`], [`crate::apply_suppressions`], and
/// [`crate::mark_redundant`] so the category bits `is_filtered_out` reads are
/// final.
pub fn diff_stats(ctx: &Context, root: DiffNodeId, suppressed: &SuppressedSymbols) -> DiffStats {
    let (functions, variables, unreferenced_function_symbols, unreferenced_variable_symbols) =
        match &ctx.get(root).kind {
            DiffKind::Corpus { functions, variables, unreferenced_function_symbols, unreferenced_variable_symbols, .. } => {
                (functions, variables, unreferenced_function_symbols, unreferenced_variable_symbols)
            }
            _ => panic!("diff_stats requires a corpus-diff root"),
        };

    let mut stats = DiffStats::default();
    stats.functions.observe(functions, ctx);
    stats.variables.observe(variables, ctx);

    stats.function_symbols.removed = unreferenced_function_symbols.deleted.len();
    stats.function_symbols.added = unreferenced_function_symbols.added.len();
    stats.function_symbols.removed_filtered_out = unreferenced_function_symbols
        .deleted
        .iter()
        .filter(|s| suppressed.functions.contains(&s.versioned_name()))
        .count();
    stats.function_symbols.added_filtered_out = unreferenced_function_symbols
        .added
        .iter()
        .filter(|s| suppressed.functions.contains(&s.versioned_name()))
        .count();

    stats.variable_symbols.removed = unreferenced_variable_symbols.deleted.len();
    stats.variable_symbols.added = unreferenced_variable_symbols.added.len();
    stats.variable_symbols.removed_filtered_out = unreferenced_variable_symbols
        .deleted
        .iter()
        .filter(|s| suppressed.variables.contains(&s.versioned_name()))
        .count();
    stats.variable_symbols.added_filtered_out = unreferenced_variable_symbols
        .added
        .iter()
        .filter(|s| suppressed.variables.contains(&s.versioned_name()))
        .count();

    stats
}

fn soname_or_architecture_changed(ctx: &Context, root: DiffNodeId) -> bool {
    match &ctx.get(root).kind {
        DiffKind::Corpus { old_soname, new_soname, old_architecture, new_architecture, .. } => {
            old_soname != new_soname || old_architecture != new_architecture
        }
        _ => false,
    }
}

/// SONAME change, OR net function/variable removal, OR a virtual-member
/// (vtable) change surviving filtering, OR a net symbol removal (spec §6).
pub fn has_incompatible_changes(ctx: &Context, root: DiffNodeId, stats: &DiffStats) -> bool {
    if soname_or_architecture_changed(ctx, root) {
        return true;
    }
    if stats.functions.net_removed() > 0 || stats.variables.net_removed() > 0 {
        return true;
    }
    if stats.function_symbols.net_removed() > 0 || stats.variable_symbols.net_removed() > 0 {
        return true;
    }
    let functions = match &ctx.get(root).kind {
        DiffKind::Corpus { functions, .. } => functions,
        _ => return false,
    };
    functions.changed.iter().any(|&id| {
        !is_filtered_out(ctx, id) && ctx.state(id).inherited_category.contains(Category::VIRTUAL_MEMBER)
    })
}

/// At least one net (non-filtered-out) changed function or variable.
pub fn has_net_subtype_changes(_ctx: &Context, stats: &DiffStats) -> bool {
    stats.functions.net_changed() > 0 || stats.variables.net_changed() > 0
}

/// Any net change at all: additions, removals, subtype changes, or a
/// SONAME/architecture change.
pub fn has_net_changes(ctx: &Context, root: DiffNodeId, stats: &DiffStats) -> bool {
    if soname_or_architecture_changed(ctx, root) {
        return true;
    }
    if has_net_subtype_changes(ctx, stats) {
        return true;
    }
    stats.functions.net_added() > 0
        || stats.functions.net_removed() > 0
        || stats.variables.net_added() > 0
        || stats.variables.net_removed() > 0
        || stats.function_symbols.net_added() > 0
        || stats.function_symbols.net_removed() > 0
        || stats.variable_symbols.net_added() > 0
        || stats.variable_symbols.net_removed() > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_corpora;
    use crate::propagate::propagate_categories;
    use abidiff_ir::{BasicType, Corpus, Decl, FunctionDecl, FunctionType, IrEnvironment, SizeAlign, Subject, Type};

    fn make_function(env: &mut IrEnvironment, name: &str) -> abidiff_ir::SubjectId {
        let void = env.intern(Subject::Type(Type::Basic(BasicType { name: "void".into(), size_align: SizeAlign::default() })));
        let ftype = env.intern(Subject::Type(Type::FunctionType(FunctionType {
            return_type: void,
            parameters: Vec::new(),
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
    }

    #[test]
    fn removed_function_counts_as_incompatible() {
        let mut env = IrEnvironment::new();
        let f = make_function(&mut env, "f");
        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.functions.push(f);
        let new = Corpus::new(&env, "libfoo.so.1", "x86_64");

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        propagate_categories(&mut ctx, root);
        let stats = diff_stats(&ctx, root, &SuppressedSymbols::default());
        assert_eq!(stats.functions.removed, 1);
        assert_eq!(stats.functions.net_removed(), 1);
        assert!(has_incompatible_changes(&ctx, root, &stats));
        assert!(has_changes(&ctx, root));
    }

    #[test]
    fn soname_change_alone_is_incompatible() {
        let env = IrEnvironment::new();
        let old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        let new = Corpus::new(&env, "libfoo.so.2", "x86_64");

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        propagate_categories(&mut ctx, root);
        let stats = diff_stats(&ctx, root, &SuppressedSymbols::default());
        assert!(has_incompatible_changes(&ctx, root, &stats));
        assert!(!has_net_subtype_changes(&ctx, &stats));
    }
}
