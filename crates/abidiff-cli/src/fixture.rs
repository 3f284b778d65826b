//! Loads one side of a comparison from a small JSON fixture format.
//!
//! A fixture is a self-contained `subjects` array (serialized `abidiff_ir::
//! Subject` values) plus corpus metadata referencing that array by index.
//! Indices inside a fixture are always local to that fixture, starting at
//! zero, mirroring the arena order `IrEnvironment::intern` would assign if
//! the fixture were the only thing ever loaded. Since a comparison needs
//! both corpora's subjects interned into the *same* environment (spec
//! "same IR environment" precondition), loading offsets every embedded
//! `SubjectId` by the environment's length at load time, so a second
//! fixture's indices never collide with the first's.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use abidiff_ir::{
    ClassOrUnion, Decl, ElfSymbol, IrEnvironment, Subject, SubjectId, Type,
};

#[derive(Debug, Deserialize)]
struct CorpusFixture {
    soname: String,
    architecture: String,
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    functions: Vec<u32>,
    #[serde(default)]
    variables: Vec<u32>,
    #[serde(default)]
    unreferenced_function_symbols: Vec<ElfSymbol>,
    #[serde(default)]
    unreferenced_variable_symbols: Vec<ElfSymbol>,
}

/// One side of a comparison, fully interned into a shared [`IrEnvironment`]
/// but not yet wrapped in an [`abidiff_ir::Corpus`] (that needs a borrow of
/// the environment, which can only be taken once all loading is done).
pub struct LoadedCorpus {
    pub soname: String,
    pub architecture: String,
    pub functions: Vec<SubjectId>,
    pub variables: Vec<SubjectId>,
    pub unreferenced_function_symbols: Vec<ElfSymbol>,
    pub unreferenced_variable_symbols: Vec<ElfSymbol>,
}

/// Parse and intern a fixture file's subjects into `env`, offsetting every
/// reference by `env`'s current length so the result can share the
/// environment with another fixture loaded before or after it.
pub fn load(path: &Path, env: &mut IrEnvironment) -> Result<LoadedCorpus> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading corpus fixture {}", path.display()))?;
    let fixture: CorpusFixture = serde_json::from_str(&text)
        .with_context(|| format!("parsing corpus fixture {}", path.display()))?;

    let offset = env.len() as u32;
    for subject in fixture.subjects {
        env.intern(remap_subject(subject, offset));
    }

    Ok(LoadedCorpus {
        soname: fixture.soname,
        architecture: fixture.architecture,
        functions: fixture.functions.into_iter().map(|i| offset_id(i, offset)).collect(),
        variables: fixture.variables.into_iter().map(|i| offset_id(i, offset)).collect(),
        unreferenced_function_symbols: fixture.unreferenced_function_symbols,
        unreferenced_variable_symbols: fixture.unreferenced_variable_symbols,
    })
}

fn offset_id(raw: u32, offset: u32) -> SubjectId {
    SubjectId::from_index(raw + offset)
}

fn shift(id: SubjectId, offset: u32) -> SubjectId {
    SubjectId::from_index(id.index() + offset)
}

fn shift_all(ids: Vec<SubjectId>, offset: u32) -> Vec<SubjectId> {
    ids.into_iter().map(|id| shift(id, offset)).collect()
}

fn remap_subject(subject: Subject, offset: u32) -> Subject {
    match subject {
        Subject::Type(t) => Subject::Type(remap_type(t, offset)),
        Subject::Decl(d) => Subject::Decl(remap_decl(d, offset)),
    }
}

fn remap_type(ty: Type, offset: u32) -> Type {
    match ty {
        Type::Basic(b) => Type::Basic(b),
        Type::Pointer(mut p) => {
            p.underlying = shift(p.underlying, offset);
            Type::Pointer(p)
        }
        Type::Reference(mut r) => {
            r.underlying = shift(r.underlying, offset);
            Type::Reference(r)
        }
        Type::Qualified(mut q) => {
            q.underlying = shift(q.underlying, offset);
            Type::Qualified(q)
        }
        Type::Array(mut a) => {
            a.element = shift(a.element, offset);
            Type::Array(a)
        }
        Type::Enum(mut e) => {
            e.underlying = shift(e.underlying, offset);
            Type::Enum(e)
        }
        Type::Typedef(mut t) => {
            t.underlying = shift(t.underlying, offset);
            Type::Typedef(t)
        }
        Type::FunctionType(mut f) => {
            f.return_type = shift(f.return_type, offset);
            f.parameters = shift_all(f.parameters, offset);
            Type::FunctionType(f)
        }
        Type::Class(c) => Type::Class(remap_class_or_union(c, offset)),
        Type::Union(c) => Type::Union(remap_class_or_union(c, offset)),
        Type::Scope(mut s) => {
            s.decls = shift_all(s.decls, offset);
            s.types = shift_all(s.types, offset);
            Type::Scope(s)
        }
        Type::TranslationUnit(mut tu) => {
            tu.global_scope = shift(tu.global_scope, offset);
            Type::TranslationUnit(tu)
        }
    }
}

fn remap_class_or_union(mut c: ClassOrUnion, offset: u32) -> ClassOrUnion {
    c.bases = shift_all(c.bases, offset);
    c.data_members = shift_all(c.data_members, offset);
    c.member_functions = shift_all(c.member_functions, offset);
    c.member_types = shift_all(c.member_types, offset);
    c.member_class_templates = shift_all(c.member_class_templates, offset);
    c
}

fn remap_decl(decl: Decl, offset: u32) -> Decl {
    match decl {
        Decl::Variable(mut v) => {
            v.var_type = shift(v.var_type, offset);
            Decl::Variable(v)
        }
        Decl::Function(mut f) => {
            f.function_type = shift(f.function_type, offset);
            Decl::Function(f)
        }
        Decl::FunctionParameter(mut p) => {
            p.param_type = shift(p.param_type, offset);
            Decl::FunctionParameter(p)
        }
        Decl::BaseSpecifier(mut b) => {
            b.base_class = shift(b.base_class, offset);
            Decl::BaseSpecifier(b)
        }
        Decl::Namespace(mut n) => {
            n.members = shift_all(n.members, offset);
            Decl::Namespace(n)
        }
    }
}
