use bstr::BString;

use crate::corpus::ElfSymbol;
use crate::env::SubjectId;
use crate::subject::Access;

/// The tagged union of every declaration subject kind named in spec §3.
///
/// `Corpus` is modeled as a standalone struct outside this arena (see
/// [`crate::Corpus`]) rather than as a variant here, since it is always the
/// external entry point handed to the comparison engine directly, never a
/// nested member of another subject. DESIGN.md records this simplification.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decl {
    Variable(VariableDecl),
    Function(FunctionDecl),
    FunctionParameter(FunctionParameterDecl),
    BaseSpecifier(BaseSpecifierDecl),
    Namespace(NamespaceDecl),
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDecl {
    pub name: BString,
    pub linkage_name: Option<BString>,
    pub var_type: SubjectId,
    pub symbol: Option<ElfSymbol>,
    /// `Some` when this variable is a class/union data member.
    pub offset_in_bits: Option<u64>,
    pub access: Option<Access>,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDecl {
    pub name: BString,
    pub linkage_name: Option<BString>,
    pub function_type: SubjectId,
    pub symbol: Option<ElfSymbol>,
    pub is_inline: bool,
    /// `Some` when this function is a class/union member function.
    pub access: Option<Access>,
    pub is_static: bool,
    pub is_declared_virtual: bool,
    pub vtable_offset: Option<u64>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionParameterDecl {
    /// Positional index, `this` excluded.
    pub index: u32,
    pub name: Option<BString>,
    pub param_type: SubjectId,
    pub is_variadic: bool,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseSpecifierDecl {
    /// The `Type::Class` subject this base specifier points at.
    pub base_class: SubjectId,
    pub offset_in_bits: u64,
    pub is_virtual: bool,
    pub access: Access,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceDecl {
    pub name: BString,
    pub members: Vec<SubjectId>,
}
