use bstr::BString;
use bitflags::bitflags;

use crate::env::SubjectId;

/// Bit size and alignment, shared by every type subject. `None` means the
/// reader could not determine the value (e.g. an incomplete type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeAlign {
    pub size_in_bits: Option<u64>,
    pub alignment_in_bits: Option<u64>,
}

bitflags! {
    /// cv-qualifiers of a [`QualifiedType`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CvQualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CvQualifiers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CvQualifiers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(CvQualifiers::from_bits_truncate(bits))
    }
}

impl std::fmt::Display for CvQualifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.contains(CvQualifiers::CONST) {
            parts.push("const");
        }
        if self.contains(CvQualifiers::VOLATILE) {
            parts.push("volatile");
        }
        if self.contains(CvQualifiers::RESTRICT) {
            parts.push("restrict");
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// The tagged union of every type subject kind named in spec §3.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Basic(BasicType),
    Pointer(PointerType),
    Reference(ReferenceType),
    Qualified(QualifiedType),
    Array(ArrayType),
    Enum(EnumType),
    Typedef(TypedefType),
    FunctionType(FunctionType),
    Class(ClassOrUnion),
    Union(ClassOrUnion),
    Scope(ScopeType),
    TranslationUnit(TranslationUnitType),
}

impl Type {
    pub fn size_align(&self) -> SizeAlign {
        match self {
            Type::Basic(t) => t.size_align,
            Type::Pointer(t) => t.size_align,
            Type::Reference(t) => t.size_align,
            Type::Qualified(t) => t.size_align,
            Type::Array(t) => t.size_align,
            Type::Enum(t) => t.size_align,
            Type::Typedef(t) => t.size_align,
            Type::FunctionType(_) => SizeAlign::default(),
            Type::Class(t) | Type::Union(t) => t.size_align,
            Type::Scope(_) | Type::TranslationUnit(_) => SizeAlign::default(),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicType {
    pub name: BString,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerType {
    pub underlying: SubjectId,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceType {
    pub underlying: SubjectId,
    pub is_rvalue: bool,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedType {
    pub underlying: SubjectId,
    pub qualifiers: CvQualifiers,
    pub size_align: SizeAlign,
}

/// One dimension of an array type. `length: None` means an unbounded
/// ("infinite") subrange, printed as `infinity` per spec §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subrange {
    pub length: Option<u64>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayType {
    pub element: SubjectId,
    pub subranges: Vec<Subrange>,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enumerator {
    pub name: BString,
    pub value: i64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumType {
    pub name: BString,
    pub underlying: SubjectId,
    pub enumerators: Vec<Enumerator>,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedefType {
    pub name: BString,
    pub underlying: SubjectId,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionType {
    pub return_type: SubjectId,
    /// `Decl::FunctionParameter` subjects, in positional order, `this`
    /// excluded (spec §4.1: "skipping implicit `this`").
    pub parameters: Vec<SubjectId>,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassUnionKind {
    Class,
    Union,
}

/// Shared shape of class and union types (spec §3 "class-or-union").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassOrUnion {
    pub name: BString,
    pub kind: ClassUnionKind,
    /// `Decl::BaseSpecifier` subjects (empty for unions).
    pub bases: Vec<SubjectId>,
    /// `Decl::Variable` subjects with `member` set.
    pub data_members: Vec<SubjectId>,
    /// `Decl::Function` subjects with `member` set.
    pub member_functions: Vec<SubjectId>,
    /// Nested type subjects declared as members.
    pub member_types: Vec<SubjectId>,
    /// Nested member class/function template instantiations, tracked only
    /// as a named bucket per spec §9's open question on member templates.
    pub member_class_templates: Vec<SubjectId>,
    pub is_declaration_only: bool,
    pub size_align: SizeAlign,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopeType {
    pub name: BString,
    pub decls: Vec<SubjectId>,
    pub types: Vec<SubjectId>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationUnitType {
    pub path: BString,
    pub global_scope: SubjectId,
}
