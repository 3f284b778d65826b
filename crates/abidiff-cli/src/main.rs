//! Thin command-line front end over `abidiff-core`: loads two corpus
//! fixtures and zero or more suppression-rule files, runs the comparison
//! pipeline, and writes the report to stdout (spec §1, §6).
//!
//! This binary is ambient plumbing, not core logic — it owns no pairing,
//! categorization, suppression, or redundancy behavior of its own. Its job
//! ends at wiring `abidiff_core`/`abidiff_suppr`/`abidiff_report` together:
//! parse with `clap`, report errors through `anyhow`, exit with a status
//! code, the same conventions this workspace's teacher binary uses.

mod fixture;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;

use abidiff_category::Category;
use abidiff_core::{
    apply_suppressions, compare_corpora, diff_stats, has_incompatible_changes, has_net_changes,
    mark_redundant, propagate_categories, Context, DisplayFlags,
};
use abidiff_ir::{Corpus, IrEnvironment};
use abidiff_suppr::SuppressionList;

/// Compare two ABI corpora and report the differences.
#[derive(Parser)]
#[command(name = "abidiff", about = "Compare two ABI corpus fixtures and report the differences")]
struct Cli {
    /// JSON fixture describing the old corpus.
    old_corpus: PathBuf,

    /// JSON fixture describing the new corpus.
    new_corpus: PathBuf,

    /// Suppression-rule file to load; may be repeated.
    #[arg(long = "suppressions", value_name = "FILE")]
    suppressions: Vec<PathBuf>,

    /// Print only the summary counts, not the per-entity diffs.
    #[arg(long)]
    stat: bool,

    /// Show changes judged harmless by default (renames, non-virtual member
    /// function / static data member churn, compatible-type substitutions).
    #[arg(long)]
    harmless: bool,

    /// Show redundant changes that are already reported through another path.
    #[arg(long = "show-redundant")]
    show_redundant: bool,

    /// Show linkage (mangled) names alongside declaration names.
    #[arg(long = "linkage-names")]
    linkage_names: bool,

    /// Hide added functions from the report.
    #[arg(long = "no-added-functions")]
    no_added_functions: bool,

    /// Hide removed functions from the report.
    #[arg(long = "no-deleted-functions")]
    no_deleted_functions: bool,

    /// Hide changed functions from the report.
    #[arg(long = "no-changed-functions")]
    no_changed_functions: bool,

    /// Hide added variables from the report.
    #[arg(long = "no-added-variables")]
    no_added_variables: bool,

    /// Hide removed variables from the report.
    #[arg(long = "no-deleted-variables")]
    no_deleted_variables: bool,

    /// Hide changed variables from the report.
    #[arg(long = "no-changed-variables")]
    no_changed_variables: bool,

    /// Hide ELF symbols unreferenced by debug info.
    #[arg(long = "no-unreferenced-symbols")]
    no_unreferenced_symbols: bool,

    /// Exit 0 regardless of whether incompatible changes were found.
    #[arg(long = "no-fail")]
    no_fail: bool,

    /// Increase log verbosity; may be repeated.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(&cli) {
        Ok(exit_code) => ExitCode::from(exit_code),
        Err(err) => {
            eprintln!("abidiff: error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Runs the comparison and returns the process exit code the real abidiff
/// tool uses: 0 for no differences, 1 for differences with no incompatible
/// changes, 4 for incompatible changes, bits combine when both apply.
fn run(cli: &Cli) -> Result<u8> {
    let mut env = IrEnvironment::new();
    let old = fixture::load(&cli.old_corpus, &mut env)
        .with_context(|| format!("loading old corpus from {}", cli.old_corpus.display()))?;
    let new = fixture::load(&cli.new_corpus, &mut env)
        .with_context(|| format!("loading new corpus from {}", cli.new_corpus.display()))?;

    let mut old_corpus = Corpus::new(&env, old.soname, old.architecture);
    old_corpus.functions = old.functions;
    old_corpus.variables = old.variables;
    old_corpus.unreferenced_function_symbols = old.unreferenced_function_symbols;
    old_corpus.unreferenced_variable_symbols = old.unreferenced_variable_symbols;

    let mut new_corpus = Corpus::new(&env, new.soname, new.architecture);
    new_corpus.functions = new.functions;
    new_corpus.variables = new.variables;
    new_corpus.unreferenced_function_symbols = new.unreferenced_function_symbols;
    new_corpus.unreferenced_variable_symbols = new.unreferenced_variable_symbols;

    let mut ctx = Context::new(&env);
    ctx.category_mask = if cli.harmless { Category::ALL } else { Category::ALL - Category::HARMLESS };
    ctx.display = display_flags(cli);

    for path in &cli.suppressions {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading suppression file {}", path.display()))?;
        let file_name = path.display().to_string();
        let (list, errors) = SuppressionList::parse(&text, &file_name);
        for error in &errors {
            log::warn!("{error}");
        }
        for rule in list.rules {
            ctx.suppressions.push(rule);
        }
    }

    let root = compare_corpora(&mut ctx, &old_corpus, &new_corpus);
    propagate_categories(&mut ctx, root);
    let suppressed = apply_suppressions(&mut ctx, root);
    mark_redundant(&mut ctx, root);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    abidiff_report::report(&mut ctx, root, &suppressed, &mut handle)
        .context("writing report to stdout")?;

    let stats = diff_stats(&ctx, root, &suppressed);
    let incompatible = has_incompatible_changes(&ctx, root, &stats);
    let changed = has_net_changes(&ctx, root, &stats);

    if cli.no_fail {
        return Ok(0);
    }
    let mut code = 0u8;
    if changed {
        code |= 1;
    }
    if incompatible {
        code |= 4;
    }
    Ok(code)
}

fn display_flags(cli: &Cli) -> DisplayFlags {
    let mut flags = DisplayFlags::default();
    flags.show_stats_only = cli.stat;
    flags.show_redundant_changes = cli.show_redundant;
    flags.show_linkage_names = cli.linkage_names;
    flags.show_added_functions = !cli.no_added_functions;
    flags.show_deleted_functions = !cli.no_deleted_functions;
    flags.show_changed_functions = !cli.no_changed_functions;
    flags.show_added_variables = !cli.no_added_variables;
    flags.show_deleted_variables = !cli.no_deleted_variables;
    flags.show_changed_variables = !cli.no_changed_variables;
    flags.show_symbols_unreferenced_by_debug_info = !cli.no_unreferenced_symbols;
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn basic_function_fixture(soname: &str, with_g: bool) -> String {
        let mut subjects = vec![
            serde_json::json!({"Type": {"Basic": {"name": "void", "size_align": {"size_in_bits": null, "alignment_in_bits": null}}}}),
            serde_json::json!({"Type": {"FunctionType": {"return_type": 0, "parameters": [], "is_variadic": false}}}),
            serde_json::json!({"Decl": {"Function": {
                "name": "f", "linkage_name": null, "function_type": 1, "symbol": null,
                "is_inline": false, "access": null, "is_static": false,
                "is_declared_virtual": false, "vtable_offset": null
            }}}),
        ];
        let mut functions = vec![2];
        if with_g {
            subjects.push(serde_json::json!({"Decl": {"Function": {
                "name": "g", "linkage_name": null, "function_type": 1, "symbol": null,
                "is_inline": false, "access": null, "is_static": false,
                "is_declared_virtual": false, "vtable_offset": null
            }}}));
            functions.push(3);
        }
        serde_json::json!({
            "soname": soname,
            "architecture": "x86_64",
            "subjects": subjects,
            "functions": functions,
            "variables": [],
        })
        .to_string()
    }

    fn base_cli(old_path: PathBuf, new_path: PathBuf) -> Cli {
        Cli {
            old_corpus: old_path,
            new_corpus: new_path,
            suppressions: Vec::new(),
            stat: false,
            harmless: false,
            show_redundant: false,
            linkage_names: false,
            no_added_functions: false,
            no_deleted_functions: false,
            no_changed_functions: false,
            no_added_variables: false,
            no_deleted_variables: false,
            no_changed_variables: false,
            no_unreferenced_symbols: false,
            no_fail: false,
            verbose: 0,
        }
    }

    #[test]
    fn added_function_is_reported_and_flagged_changed() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = write_fixture(&dir, "old.json", &basic_function_fixture("libfoo.so.1", false));
        let new_path = write_fixture(&dir, "new.json", &basic_function_fixture("libfoo.so.1", true));

        let cli = base_cli(old_path, new_path);
        let code = run(&cli).unwrap();
        assert_eq!(code & 1, 1, "net changes should set the changed bit");
    }

    #[test]
    fn identical_corpora_exit_clean() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = write_fixture(&dir, "old.json", &basic_function_fixture("libfoo.so.1", false));
        let new_path = write_fixture(&dir, "new.json", &basic_function_fixture("libfoo.so.1", false));

        let cli = base_cli(old_path, new_path);
        assert_eq!(run(&cli).unwrap(), 0);
    }

    #[test]
    fn no_fail_forces_zero_exit_even_with_changes() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = write_fixture(&dir, "old.json", &basic_function_fixture("libfoo.so.1", false));
        let new_path = write_fixture(&dir, "new.json", &basic_function_fixture("libfoo.so.1", true));

        let mut cli = base_cli(old_path, new_path);
        cli.no_fail = true;
        assert_eq!(run(&cli).unwrap(), 0);
    }
}
