use bstr::{BString, ByteVec};

use crate::decl::Decl;
use crate::env::{IrEnvironment, SubjectId};
use crate::types::{ClassUnionKind, CvQualifiers, Type};

/// Access specifier of a class/union member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        })
    }
}

/// Either a type or a declaration — anything that can appear on either side
/// of a diff node (spec §3 "Subject").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    Type(Type),
    Decl(Decl),
}

/// A short, stable name for a subject's runtime kind, used for dispatch
/// logging and the `distinct` diff's "two subjects of different kinds" test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Basic,
    Pointer,
    Reference,
    Qualified,
    Array,
    Enum,
    Typedef,
    FunctionType,
    Class,
    Union,
    Scope,
    TranslationUnit,
    Variable,
    Function,
    FunctionParameter,
    BaseSpecifier,
    Namespace,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Basic => "basic type",
            SubjectKind::Pointer => "pointer type",
            SubjectKind::Reference => "reference type",
            SubjectKind::Qualified => "qualified type",
            SubjectKind::Array => "array type",
            SubjectKind::Enum => "enum type",
            SubjectKind::Typedef => "typedef",
            SubjectKind::FunctionType => "function type",
            SubjectKind::Class => "class",
            SubjectKind::Union => "union",
            SubjectKind::Scope => "scope",
            SubjectKind::TranslationUnit => "translation unit",
            SubjectKind::Variable => "variable",
            SubjectKind::Function => "function",
            SubjectKind::FunctionParameter => "function parameter",
            SubjectKind::BaseSpecifier => "base specifier",
            SubjectKind::Namespace => "namespace",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Subject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Type(t) => match t {
                Type::Basic(_) => SubjectKind::Basic,
                Type::Pointer(_) => SubjectKind::Pointer,
                Type::Reference(_) => SubjectKind::Reference,
                Type::Qualified(_) => SubjectKind::Qualified,
                Type::Array(_) => SubjectKind::Array,
                Type::Enum(_) => SubjectKind::Enum,
                Type::Typedef(_) => SubjectKind::Typedef,
                Type::FunctionType(_) => SubjectKind::FunctionType,
                Type::Class(_) => SubjectKind::Class,
                Type::Union(_) => SubjectKind::Union,
                Type::Scope(_) => SubjectKind::Scope,
                Type::TranslationUnit(_) => SubjectKind::TranslationUnit,
            },
            Subject::Decl(d) => match d {
                Decl::Variable(_) => SubjectKind::Variable,
                Decl::Function(_) => SubjectKind::Function,
                Decl::FunctionParameter(_) => SubjectKind::FunctionParameter,
                Decl::BaseSpecifier(_) => SubjectKind::BaseSpecifier,
                Decl::Namespace(_) => SubjectKind::Namespace,
            },
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Subject::Type(t) => Some(t),
            Subject::Decl(_) => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Decl> {
        match self {
            Subject::Decl(d) => Some(d),
            Subject::Type(_) => None,
        }
    }

    /// A qualified display name, used for deterministic child ordering
    /// (spec §3 "Children are ordered deterministically by the qualified
    /// name of the first subject") and for suppression-rule name matching.
    pub fn qualified_name(&self, env: &IrEnvironment) -> BString {
        match self {
            Subject::Type(t) => type_name(t, env),
            Subject::Decl(d) => match d {
                Decl::Variable(v) => v.name.clone(),
                Decl::Function(f) => f.name.clone(),
                Decl::FunctionParameter(p) => p.name.clone().unwrap_or_default(),
                Decl::BaseSpecifier(b) => env.get(b.base_class).qualified_name(env),
                Decl::Namespace(n) => n.name.clone(),
            },
        }
    }

    /// The key used to pair two subjects positionally-then-nominally in the
    /// pairing engine (spec §4.1 "tie-breaking").
    pub fn pairing_key(&self, env: &IrEnvironment) -> BString {
        self.qualified_name(env)
    }

    /// A stable integer used to break ties in child ordering when two
    /// subjects share a qualified name (spec §3: "ties broken by symbol
    /// id"). Falls back to the subject's arena id when there is no real
    /// ELF symbol to key on.
    pub fn tie_break_key(&self, id: SubjectId) -> u64 {
        match self {
            Subject::Decl(Decl::Variable(v)) => v
                .symbol
                .as_ref()
                .map(|s| fnv1a(&s.versioned_name()))
                .unwrap_or(id.index() as u64),
            Subject::Decl(Decl::Function(f)) => f
                .symbol
                .as_ref()
                .map(|s| fnv1a(&s.versioned_name()))
                .unwrap_or(id.index() as u64),
            _ => id.index() as u64,
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn type_name(t: &Type, env: &IrEnvironment) -> BString {
    match t {
        Type::Basic(b) => b.name.clone(),
        Type::Pointer(p) => {
            let mut s = type_name(env.get(p.underlying).as_type().unwrap(), env);
            s.push(b'*');
            s
        }
        Type::Reference(r) => {
            let mut s = type_name(env.get(r.underlying).as_type().unwrap(), env);
            s.push_str(if r.is_rvalue { "&&" } else { "&" });
            s
        }
        Type::Qualified(q) => {
            let inner = type_name(env.get(q.underlying).as_type().unwrap(), env);
            let mut s: BString = q.qualifiers.to_string().into();
            if !s.is_empty() {
                s.push(b' ');
            }
            s.extend_from_slice(&inner);
            s
        }
        Type::Array(a) => {
            let mut s = type_name(env.get(a.element).as_type().unwrap(), env);
            for sub in &a.subranges {
                s.push(b'[');
                match sub.length {
                    Some(n) => s.extend_from_slice(n.to_string().as_bytes()),
                    None => s.extend_from_slice(b"infinity"),
                }
                s.push(b']');
            }
            s
        }
        Type::Enum(e) => e.name.clone(),
        Type::Typedef(t) => t.name.clone(),
        Type::FunctionType(f) => {
            let ret = type_name(env.get(f.return_type).as_type().unwrap(), env);
            let mut s = ret;
            s.push_str(" (");
            for (i, p) in f.parameters.iter().enumerate() {
                if i > 0 {
                    s.push_str(", ");
                }
                if let Some(crate::Decl::FunctionParameter(pd)) = env.get(*p).as_decl() {
                    s.extend_from_slice(&type_name(env.get(pd.param_type).as_type().unwrap(), env));
                }
            }
            if f.is_variadic {
                if !f.parameters.is_empty() {
                    s.push_str(", ");
                }
                s.push_str("...");
            }
            s.push(b')');
            s
        }
        Type::Class(c) | Type::Union(c) => c.name.clone(),
        Type::Scope(s) => s.name.clone(),
        Type::TranslationUnit(tu) => tu.path.clone(),
    }
}

/// True for [`Type::Class`] / [`Type::Union`] of kind [`ClassUnionKind`].
pub fn is_class_union_kind(t: &Type, kind: ClassUnionKind) -> bool {
    matches!((t, kind),
        (Type::Class(_), ClassUnionKind::Class) | (Type::Union(_), ClassUnionKind::Union))
}

/// Strip `Typedef` and `Qualified(CvQualifiers::empty())` layers (the
/// "typedef-stripped leaf" used by the `distinct` diff's optional compatible
/// child, spec §3 "distinct" row and §4.1 "If kinds disagree").
pub fn strip_typedefs<'ir>(mut id: SubjectId, env: &'ir IrEnvironment) -> SubjectId {
    loop {
        match env.get(id).as_type() {
            Some(Type::Typedef(t)) => id = t.underlying,
            _ => return id,
        }
    }
}

/// Strip every layer of [`Type::Qualified`], returning the unqualified leaf
/// (spec §3 qualified-type row: "leaf-underlying-type diff").
pub fn strip_qualifiers(mut id: SubjectId, env: &IrEnvironment) -> SubjectId {
    loop {
        match env.get(id).as_type() {
            Some(Type::Qualified(q)) => id = q.underlying,
            _ => return id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicType, PointerType, SizeAlign};

    #[test]
    fn pointer_name_appends_star() {
        let mut env = IrEnvironment::new();
        let int_id = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: SizeAlign { size_in_bits: Some(32), alignment_in_bits: Some(32) },
        })));
        let ptr = Subject::Type(Type::Pointer(PointerType {
            underlying: int_id,
            size_align: SizeAlign { size_in_bits: Some(64), alignment_in_bits: Some(64) },
        }));
        assert_eq!(ptr.qualified_name(&env), BString::from("int*"));
    }
}
