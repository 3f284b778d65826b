//! Top-level entry point: compare two corpora (spec §2 "Data flow": "A
//! single call to *compare two corpora* walks the IR and populates the
//! context with diff nodes.").

use abidiff_ir::Corpus;

use crate::context::Context;
use crate::node::{DiffKind, DiffNodeId};
use crate::pairing::{build_corpus_decl_bucket, build_symbol_bucket_retracted};

/// Build the corpus-diff rooting the whole graph. Does not itself run
/// category propagation, suppression, or redundancy marking — callers run
/// those as separate passes (spec §2's listed order) since suppressions
/// and the category mask may still change before the first report.
pub fn compare_corpora<'ir>(ctx: &mut Context<'ir>, old: &Corpus<'ir>, new: &Corpus<'ir>) -> DiffNodeId {
    assert!(
        std::ptr::eq(ctx.env, old.env) && std::ptr::eq(ctx.env, new.env),
        "both corpora must be produced by the context's IrEnvironment (spec §3 \
         \"same IR environment\" precondition)"
    );

    let functions = build_corpus_decl_bucket(
        ctx,
        &old.functions,
        &new.functions,
        &old.unreferenced_function_symbols,
        &new.unreferenced_function_symbols,
    );
    let variables = build_corpus_decl_bucket(
        ctx,
        &old.variables,
        &new.variables,
        &old.unreferenced_variable_symbols,
        &new.unreferenced_variable_symbols,
    );
    let unreferenced_function_symbols =
        build_symbol_bucket_retracted(&old.unreferenced_function_symbols, &new.unreferenced_function_symbols);
    let unreferenced_variable_symbols =
        build_symbol_bucket_retracted(&old.unreferenced_variable_symbols, &new.unreferenced_variable_symbols);

    ctx.new_root(DiffKind::Corpus {
        old_soname: old.soname.clone(),
        new_soname: new.soname.clone(),
        old_architecture: old.architecture.clone(),
        new_architecture: new.architecture.clone(),
        functions,
        variables,
        unreferenced_function_symbols,
        unreferenced_variable_symbols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidiff_ir::{BasicType, Decl, FunctionDecl, FunctionType, IrEnvironment, SizeAlign, Subject, Type};

    fn make_function(env: &mut IrEnvironment, name: &str) -> abidiff_ir::SubjectId {
        let void = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "void".into(),
            size_align: SizeAlign::default(),
        })));
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
    fn function_added_is_reflected_in_the_corpus_bucket() {
        let mut env = IrEnvironment::new();
        let f = make_function(&mut env, "f");
        let g = make_function(&mut env, "g");

        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.functions.push(f);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(f);
        new.functions.push(g);

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        match &ctx.get(root).kind {
            DiffKind::Corpus { functions, .. } => {
                assert_eq!(functions.added.len(), 1);
                assert!(functions.deleted.is_empty());
            }
            _ => panic!("expected a corpus diff"),
        }
        assert!(crate::has_changes(&ctx, root));
    }

    #[test]
    fn identical_corpora_have_no_changes() {
        let mut env = IrEnvironment::new();
        let f = make_function(&mut env, "f");
        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.functions.push(f);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.functions.push(f);

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        assert!(!crate::has_changes(&ctx, root));
    }
}
