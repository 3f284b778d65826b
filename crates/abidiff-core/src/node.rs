use abidiff_category::Category;
use abidiff_ir::{Enumerator, SubjectId};
use bstr::BString;

/// An index into a [`crate::Context`]'s diff-node pool.
///
/// Because pairing always consults the cache before building a node (the
/// "idempotence guarantee" of §4.1), and the cache entry for a pair is
/// installed before its children are built (so a cycle back to the same
/// pair hits the cache rather than recursing forever), two diff nodes for
/// the same subject pair are always the *same* id. `canonical` below is
/// kept for interface fidelity with the spec's canonicalization story, but
/// in this arena design it is always the node's own id — see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiffNodeId(pub(crate) u32);

impl DiffNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Three-way bucket produced by the pairing engine's edit-script
/// classification (spec §4.1). Every entry, including a pure deletion or
/// addition, is itself a diff node — one whose absent side is `None` — so
/// that suppression and category propagation can match it like any other
/// node (spec §4.5: "Suppressions are also applied to the corpus-diff's
/// bucket of added/removed functions...").
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub deleted: Vec<DiffNodeId>,
    pub added: Vec<DiffNodeId>,
    pub changed: Vec<DiffNodeId>,
}

impl Bucket {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.added.is_empty() && self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deleted.len() + self.added.len() + self.changed.len()
    }

    pub fn all(&self) -> impl Iterator<Item = DiffNodeId> + '_ {
        self.deleted.iter().chain(self.added.iter()).chain(self.changed.iter()).copied()
    }
}

/// Deleted/added ELF symbols unreferenced by any declaration (spec §3
/// "corpus" row), after the retraction pass (spec §4.1 "corpus").
#[derive(Debug, Clone, Default)]
pub struct SymbolBucket {
    pub deleted: Vec<abidiff_ir::ElfSymbol>,
    pub added: Vec<abidiff_ir::ElfSymbol>,
}

/// A single enumerator's value changing between the two enum versions.
#[derive(Debug, Clone)]
pub struct EnumeratorChange {
    pub name: BString,
    pub old_value: i64,
    pub new_value: i64,
}

#[derive(Debug, Clone, Default)]
pub struct EnumeratorBucket {
    pub deleted: Vec<Enumerator>,
    pub added: Vec<Enumerator>,
    pub changed: Vec<EnumeratorChange>,
}

impl EnumeratorBucket {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.added.is_empty() && self.changed.is_empty()
    }
}

/// The per-kind payload of a diff node (spec §3 "Kinds and their shape").
#[derive(Debug, Clone)]
pub enum DiffKind {
    /// Two subjects of different runtime kinds.
    Distinct { compatible: Option<DiffNodeId> },
    PointerOrReference { underlying: DiffNodeId },
    Qualified { underlying: DiffNodeId },
    Array { element: DiffNodeId },
    Typedef { underlying: DiffNodeId },
    Enum { underlying: DiffNodeId, enumerators: EnumeratorBucket },
    FunctionParameter { ty: DiffNodeId },
    FunctionType {
        return_type: DiffNodeId,
        /// Parameters present on both sides at a key (index or name) that
        /// was promoted to a changed pairing (spec §4.1 "promoted to a
        /// changed parameter").
        changed_parameters: Vec<DiffNodeId>,
        removed_parameters: Vec<SubjectId>,
        added_parameters: Vec<SubjectId>,
    },
    FunctionDecl { function_type: DiffNodeId },
    Variable { ty: DiffNodeId },
    BaseSpecifier { underlying_class: DiffNodeId },
    /// Covers both `class` and `union` IR kinds; `bases` is always empty
    /// for a union (unions have no base classes). `union_kind` tells the
    /// reporter which noun to print.
    ClassOrUnion {
        union_kind: abidiff_ir::ClassUnionKind,
        bases: Bucket,
        data_members: Bucket,
        member_functions: Bucket,
        member_types: Bucket,
        member_class_templates: Bucket,
    },
    Scope {
        decls: Bucket,
        types: Bucket,
    },
    TranslationUnit { global_scope: DiffNodeId },
    Corpus {
        old_soname: BString,
        new_soname: BString,
        old_architecture: BString,
        new_architecture: BString,
        functions: Bucket,
        variables: Bucket,
        unreferenced_function_symbols: SymbolBucket,
        unreferenced_variable_symbols: SymbolBucket,
    },
}

/// A node in the diff graph: a pair of subjects plus the shape of their
/// difference (spec §3 "Diff node").
#[derive(Debug, Clone)]
pub struct DiffNode {
    pub first: Option<SubjectId>,
    pub second: Option<SubjectId>,
    pub kind: DiffKind,
    pub canonical: DiffNodeId,
}

impl DiffNode {
    /// Children reachable from this node, in the fixed per-kind order used
    /// for traversal and propagation. Deleted/added leaves have no diff
    /// sub-node and so are not children; only `changed`/wrapped diffs are.
    pub fn children(&self) -> Vec<DiffNodeId> {
        match &self.kind {
            DiffKind::Distinct { compatible } => compatible.into_iter().copied().collect(),
            DiffKind::PointerOrReference { underlying }
            | DiffKind::Qualified { underlying }
            | DiffKind::Typedef { underlying } => vec![*underlying],
            DiffKind::Array { element } => vec![*element],
            DiffKind::Enum { underlying, .. } => vec![*underlying],
            DiffKind::FunctionParameter { ty } => vec![*ty],
            DiffKind::FunctionType { return_type, changed_parameters, .. } => {
                let mut v = vec![*return_type];
                v.extend(changed_parameters.iter().copied());
                v
            }
            DiffKind::FunctionDecl { function_type } => vec![*function_type],
            DiffKind::Variable { ty } => vec![*ty],
            DiffKind::BaseSpecifier { underlying_class } => vec![*underlying_class],
            DiffKind::ClassOrUnion {
                bases,
                data_members,
                member_functions,
                member_types,
                member_class_templates,
                ..
            } => bases
                .all()
                .chain(data_members.all())
                .chain(member_functions.all())
                .chain(member_types.all())
                .chain(member_class_templates.all())
                .collect(),
            DiffKind::Scope { decls, types } => decls.all().chain(types.all()).collect(),
            DiffKind::TranslationUnit { global_scope } => vec![*global_scope],
            DiffKind::Corpus { functions, variables, .. } => {
                functions.all().chain(variables.all()).collect()
            }
        }
    }

    /// True when either side is absent (pure deletion/addition) rather
    /// than a paired change.
    pub fn is_deletion(&self) -> bool {
        self.first.is_some() && self.second.is_none()
    }

    pub fn is_addition(&self) -> bool {
        self.first.is_none() && self.second.is_some()
    }
}

/// Mutable state logically owned by an equivalence class of diff nodes
/// (spec §4.2 "canonicalization"), indexed by canonical id. In this arena
/// design the canonical id is always the node's own id, so this is simply
/// per-node state; the indirection is kept so traversal code reads and
/// writes "through the canonical" as the spec describes.
#[derive(Debug, Clone, Default)]
pub struct EquivState {
    pub local_category: Category,
    pub inherited_category: Category,
    pub visited: bool,
    pub traversing: bool,
    pub currently_reporting: bool,
    pub reported_once: bool,
}
