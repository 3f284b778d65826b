//! Minimal ABI IR: the subject model the comparison engine borrows
//! references into.
//!
//! This is deliberately small. It exists so the pairing engine, reporter,
//! and suppression matcher in `abidiff-core` have real types to operate on;
//! it does not parse DWARF, BTF, or any binary format — that extraction
//! step is out of scope (see spec §1) and is the responsibility of a real
//! reader built on top of this crate.
//!
//! Subjects live in an [`IrEnvironment`] arena and reference each other by
//! [`SubjectId`]. Two subjects can only be compared if they were interned by
//! the same environment; [`SubjectRef::same_environment`] is the
//! precondition check the pairing engine relies on (spec §4.1 "Errors").

mod corpus;
mod decl;
mod env;
mod subject;
mod types;

pub use corpus::{Corpus, ElfSymbol};
pub use decl::{
    BaseSpecifierDecl, Decl, FunctionDecl, FunctionParameterDecl, NamespaceDecl, VariableDecl,
};
pub use env::{IrEnvironment, SubjectId, SubjectRef};
pub use subject::{
    is_class_union_kind, strip_qualifiers, strip_typedefs, Access, Subject, SubjectKind,
};
pub use types::{
    ArrayType, BasicType, ClassOrUnion, ClassUnionKind, CvQualifiers, Enumerator, EnumType,
    FunctionType, PointerType, QualifiedType, ReferenceType, ScopeType, SizeAlign, Subrange,
    TranslationUnitType, TypedefType, Type,
};

/// Errors produced while building or walking the IR.
///
/// Construction through [`IrEnvironment::intern`] is infallible; this type
/// exists for symmetry with the rest of the workspace's per-crate error
/// convention and to leave room for a real reader crate built on top of this
/// one.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("subject {0:?} does not belong to this environment")]
    ForeignSubject(SubjectId),

    #[error("expected a {expected} subject, found a {actual}")]
    UnexpectedKind {
        expected: &'static str,
        actual: &'static str,
    },
}
