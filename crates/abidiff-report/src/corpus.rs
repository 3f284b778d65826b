//! Top-level report entry: the corpus-diff's summary header, SONAME /
//! architecture change lines, per-bucket function and variable listings,
//! and the unreferenced-symbol buckets (spec §4.7 "Corpus").

use std::collections::HashSet;

use bstr::BString;

use abidiff_core::{
    diff_stats, BucketStats, Context, DiffKind, DiffNodeId, SuppressedSymbols, SymbolBucket, SymbolStats,
};

use crate::function::write_function_entry;
use crate::names::quote;
use crate::variable::write_variable_entry;
use crate::{pluralize, to_be_reported};

pub(crate) fn write_corpus_diff(ctx: &mut Context, root: DiffNodeId, suppressed: &SuppressedSymbols, buf: &mut String) {
    let (old_soname, new_soname, old_arch, new_arch) = match &ctx.get(root).kind {
        DiffKind::Corpus { old_soname, new_soname, old_architecture, new_architecture, .. } => {
            (old_soname.clone(), new_soname.clone(), old_architecture.clone(), new_architecture.clone())
        }
        _ => panic!("write_corpus_diff requires a corpus-diff root"),
    };

    if ctx.display.show_soname_change && old_soname != new_soname {
        buf.push_str(&format!("SONAME changed from {} to {}\n\n", quote(&old_soname), quote(&new_soname)));
    }
    if ctx.display.show_architecture_change && old_arch != new_arch {
        buf.push_str(&format!("architecture changed from {} to {}\n\n", quote(&old_arch), quote(&new_arch)));
    }

    let stats = diff_stats(ctx, root, suppressed);
    write_summary_line(buf, "Functions", &stats.functions, "function", "functions");
    write_summary_line(buf, "Variables", &stats.variables, "variable", "variables");
    buf.push('\n');

    if ctx.display.show_stats_only {
        return;
    }

    let (functions, variables) = match ctx.get(root).kind.clone() {
        DiffKind::Corpus { functions, variables, .. } => (functions, variables),
        _ => unreachable!("checked above"),
    };

    if ctx.display.show_deleted_functions {
        write_leaf_section(ctx, buf, "Removed function", &functions.deleted, write_function_entry);
    }
    if ctx.display.show_added_functions {
        write_leaf_section(ctx, buf, "Added function", &functions.added, write_function_entry);
    }
    if ctx.display.show_changed_functions {
        write_leaf_section(ctx, buf, "Changed function", &functions.changed, write_function_entry);
    }
    if ctx.display.show_deleted_variables {
        write_leaf_section(ctx, buf, "Removed variable", &variables.deleted, write_variable_entry);
    }
    if ctx.display.show_added_variables {
        write_leaf_section(ctx, buf, "Added variable", &variables.added, write_variable_entry);
    }
    if ctx.display.show_changed_variables {
        write_leaf_section(ctx, buf, "Changed variable", &variables.changed, write_variable_entry);
    }

    if ctx.display.show_symbols_unreferenced_by_debug_info {
        let (func_syms, var_syms) = match ctx.get(root).kind.clone() {
            DiffKind::Corpus { unreferenced_function_symbols, unreferenced_variable_symbols, .. } => {
                (unreferenced_function_symbols, unreferenced_variable_symbols)
            }
            _ => unreachable!("checked above"),
        };
        write_symbol_bucket(
            buf,
            "function symbol",
            &func_syms,
            &stats.function_symbols,
            &suppressed.functions,
            ctx.display.show_added_symbols_unreferenced_by_debug_info,
        );
        write_symbol_bucket(
            buf,
            "variable symbol",
            &var_syms,
            &stats.variable_symbols,
            &suppressed.variables,
            ctx.display.show_added_symbols_unreferenced_by_debug_info,
        );
    }
}

fn write_summary_line(buf: &mut String, heading: &str, stats: &BucketStats, singular: &str, plural: &str) {
    let removed = stats.net_removed();
    let changed = stats.net_changed();
    let added = stats.net_added();
    let noun = pluralize(removed + changed + added, singular, plural);
    buf.push_str(&format!("{heading} changes summary: {removed} Removed, {changed} Changed, {added} Added {noun}\n"));
}

fn write_leaf_section(
    ctx: &mut Context,
    buf: &mut String,
    label: &str,
    ids: &[DiffNodeId],
    mut write_entry: impl FnMut(&mut Context, DiffNodeId, usize, &mut String),
) {
    let reportable: Vec<DiffNodeId> = ids.iter().copied().filter(|&id| to_be_reported(ctx, id)).collect();
    if reportable.is_empty() {
        return;
    }
    let suffix = if reportable.len() == 1 { "" } else { "s" };
    buf.push_str(&format!("{} {label}{suffix}:\n\n", reportable.len()));
    for id in reportable {
        write_entry(ctx, id, 1, buf);
    }
    buf.push('\n');
}

fn write_symbol_bucket(
    buf: &mut String,
    label: &str,
    bucket: &SymbolBucket,
    stats: &SymbolStats,
    suppressed: &HashSet<BString>,
    show_added: bool,
) {
    let _ = stats;
    let deleted: Vec<_> = bucket.deleted.iter().filter(|s| !suppressed.contains(&s.versioned_name())).collect();
    if !deleted.is_empty() {
        let suffix = pluralize(deleted.len(), "", "s");
        buf.push_str(&format!("{} Removed {label}{suffix}, unreferenced by debug info:\n\n", deleted.len()));
        for s in &deleted {
            buf.push_str(&format!("  {}\n", quote(s.versioned_name())));
        }
        buf.push('\n');
    }
    if show_added {
        let added: Vec<_> = bucket.added.iter().filter(|s| !suppressed.contains(&s.versioned_name())).collect();
        if !added.is_empty() {
            let suffix = pluralize(added.len(), "", "s");
            buf.push_str(&format!("{} Added {label}{suffix}, unreferenced by debug info:\n\n", added.len()));
            for s in &added {
                buf.push_str(&format!("  {}\n", quote(s.versioned_name())));
            }
            buf.push('\n');
        }
    }
}
