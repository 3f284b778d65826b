//! Reporter (spec §4.7): walks an un-suppressed, non-redundant diff graph
//! and writes a human-facing, indented text report.
//!
//! This crate is a pure read over a graph built and shaped by
//! `abidiff-core` (pairing, category propagation, suppression, redundancy
//! marking all already run) except for the transient `currently-reporting` /
//! `reported-once` flags on [`abidiff_core::EquivState`], which the reporter
//! itself sets and clears as it walks — the mechanism spec §4.7 describes
//! for keeping cyclic subtrees bounded in output.

mod class;
mod corpus;
mod function;
mod names;
mod node;
mod variable;

use std::io::{self, Write};

use abidiff_category::Category;
use abidiff_core::{Context, DiffNodeId, SuppressedSymbols};

const INDENT: &str = "  ";

/// Render the diff graph rooted at `root` (a corpus-diff built by
/// [`abidiff_core::compare_corpora`]) to `out`.
///
/// `suppressed` is the set of unreferenced-symbol names that
/// [`abidiff_core::apply_suppressions`] decided to hide; the reporter
/// consults it directly since those symbols have no diff node of their own
/// to carry a `SUPPRESSED` category bit.
///
/// Clears the `reported-once` / `currently-reporting` flags first, so that
/// calling `report` twice in a row against the same graph produces
/// byte-identical output (spec §8 "Idempotence of reporting").
pub fn report(
    ctx: &mut Context,
    root: DiffNodeId,
    suppressed: &SuppressedSymbols,
    out: &mut dyn Write,
) -> io::Result<()> {
    ctx.clear_reported_once();
    let mut buf = String::new();
    corpus::write_corpus_diff(ctx, root, suppressed, &mut buf);
    out.write_all(buf.as_bytes())
}

/// Same as [`report`], but returns the rendered text directly — convenient
/// for tests and for callers that want to post-process the report rather
/// than stream it.
pub fn report_to_string(ctx: &mut Context, root: DiffNodeId, suppressed: &SuppressedSymbols) -> String {
    ctx.clear_reported_once();
    let mut buf = String::new();
    corpus::write_corpus_diff(ctx, root, suppressed, &mut buf);
    buf
}

/// A node should be reported if it has changes and is not filtered out
/// (spec §4.7 "The reporter's `to-be-reported` predicate").
pub(crate) fn to_be_reported(ctx: &Context, id: DiffNodeId) -> bool {
    abidiff_core::has_changes(ctx, id) && !abidiff_core::is_filtered_out(ctx, id)
}

/// Whether a category of field-level change is allowed to appear in the
/// report at all, per the active category mask (spec §6 "Category mask").
pub(crate) fn category_allowed(ctx: &Context, category: Category) -> bool {
    ctx.category_mask.intersects(category)
}

pub(crate) fn indent(buf: &mut String, depth: usize) {
    for _ in 0..depth {
        buf.push_str(INDENT);
    }
}

pub(crate) fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidiff_core::compare_corpora;
    use abidiff_ir::{
        BasicType, ClassOrUnion, ClassUnionKind, Corpus, Decl, Enumerator, EnumType, FunctionDecl,
        FunctionType, IrEnvironment, SizeAlign, Subject, Type, VariableDecl,
    };

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
    fn reporting_twice_is_byte_identical() {
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
        abidiff_core::propagate_categories(&mut ctx, root);
        let suppressed = abidiff_core::apply_suppressions(&mut ctx, root);
        abidiff_core::mark_redundant(&mut ctx, root);

        let first = report_to_string(&mut ctx, root, &suppressed);
        let second = report_to_string(&mut ctx, root, &suppressed);
        assert_eq!(first, second);
        assert!(first.contains('g'));
    }

    fn make_variable(env: &mut IrEnvironment, ty: abidiff_ir::SubjectId) -> abidiff_ir::SubjectId {
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

    /// spec §8 scenario 3: class `C` has `int x; int y;`; the new version
    /// keeps `x` at offset 0 but moves `y` from offset 32 to offset 96 bits
    /// (as would happen if a new member were inserted between them).
    #[test]
    fn data_member_offset_change_is_reported() {
        let mut env = IrEnvironment::new();
        let int_ty = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        })));

        let member = |env: &mut IrEnvironment, name: &str, offset: u64| {
            env.intern(Subject::Decl(Decl::Variable(VariableDecl {
                name: name.into(),
                linkage_name: None,
                var_type: int_ty,
                symbol: None,
                offset_in_bits: Some(offset),
                access: None,
                is_static: false,
            })))
        };

        let x_old = member(&mut env, "x", 0);
        let y_old = member(&mut env, "y", 32);
        let x_new = member(&mut env, "x", 0);
        let y_new = member(&mut env, "y", 96);

        let class_shape = |bases: Vec<abidiff_ir::SubjectId>, members: Vec<abidiff_ir::SubjectId>| ClassOrUnion {
            name: "C".into(),
            kind: ClassUnionKind::Class,
            bases,
            data_members: members,
            member_functions: Vec::new(),
            member_types: Vec::new(),
            member_class_templates: Vec::new(),
            is_declaration_only: false,
            size_align: SizeAlign { size_in_bits: Some(128), alignment_in_bits: Some(32) },
        };

        let c_old = env.intern(Subject::Type(Type::Class(class_shape(Vec::new(), vec![x_old, y_old]))));
        let c_new = env.intern(Subject::Type(Type::Class(class_shape(
            Vec::new(),
            vec![x_new, y_new],
        ))));

        let v_old = make_variable(&mut env, c_old);
        let v_new = make_variable(&mut env, c_new);

        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.variables.push(v_old);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.variables.push(v_new);

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        abidiff_core::propagate_categories(&mut ctx, root);
        let suppressed = abidiff_core::apply_suppressions(&mut ctx, root);
        abidiff_core::mark_redundant(&mut ctx, root);

        let report = report_to_string(&mut ctx, root, &suppressed);
        assert!(report.contains("1 data member change"), "{report}");
        assert!(
            report.contains("offset changed from 32 to 96 (in bits)"),
            "{report}"
        );
        assert!(!report.contains("'int x'"), "unchanged member x should not be reported: {report}");
    }

    /// spec §8 scenario 4: `enum E { A = 0, B = 1 }` becomes
    /// `enum E { A = 0, B = 2 }`.
    #[test]
    fn enumerator_value_change_is_reported() {
        let mut env = IrEnvironment::new();
        let int_ty = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        })));

        let enum_shape = |enumerators: Vec<Enumerator>| EnumType {
            name: "E".into(),
            underlying: int_ty,
            enumerators,
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        };

        let e_old = env.intern(Subject::Type(Type::Enum(enum_shape(vec![
            Enumerator { name: "A".into(), value: 0 },
            Enumerator { name: "B".into(), value: 1 },
        ]))));
        let e_new = env.intern(Subject::Type(Type::Enum(enum_shape(vec![
            Enumerator { name: "A".into(), value: 0 },
            Enumerator { name: "B".into(), value: 2 },
        ]))));

        let v_old = make_variable(&mut env, e_old);
        let v_new = make_variable(&mut env, e_new);

        let mut old = Corpus::new(&env, "libfoo.so.1", "x86_64");
        old.variables.push(v_old);
        let mut new = Corpus::new(&env, "libfoo.so.1", "x86_64");
        new.variables.push(v_new);

        let mut ctx = Context::new(&env);
        let root = compare_corpora(&mut ctx, &old, &new);
        abidiff_core::propagate_categories(&mut ctx, root);
        let suppressed = abidiff_core::apply_suppressions(&mut ctx, root);
        abidiff_core::mark_redundant(&mut ctx, root);

        let report = report_to_string(&mut ctx, root, &suppressed);
        assert!(report.contains("1 enumerator change"), "{report}");
        assert!(report.contains("'E::B' from value '1' to '2'"), "{report}");
    }
}
