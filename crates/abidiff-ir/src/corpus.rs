use bstr::BString;

use crate::env::{IrEnvironment, SubjectId};

/// An ELF-level symbol: a name plus optional version information.
///
/// Corpora track symbols separately from the declarations the debug info
/// ties them to, so that symbols unreferenced by any declaration can still
/// be reported on (spec §3 "Context", §4.1 "Corpus").
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElfSymbol {
    pub name: BString,
    pub version: Option<BString>,
    /// True when this version is the `@@` default version for its name.
    pub is_default_version: bool,
}

impl ElfSymbol {
    pub fn versioned_name(&self) -> BString {
        match &self.version {
            Some(v) if self.is_default_version => {
                let mut s = self.name.clone();
                s.extend_from_slice(b"@@");
                s.extend_from_slice(v);
                s
            }
            Some(v) => {
                let mut s = self.name.clone();
                s.extend_from_slice(b"@");
                s.extend_from_slice(v);
                s
            }
            None => self.name.clone(),
        }
    }
}

/// One side of a comparison: everything the reader extracted from a single
/// binary (spec §6 "Inputs the core consumes").
pub struct Corpus<'ir> {
    pub env: &'ir IrEnvironment,
    pub soname: BString,
    pub architecture: BString,
    /// Ordered sequence of public function declarations.
    pub functions: Vec<SubjectId>,
    /// Ordered sequence of public variable declarations.
    pub variables: Vec<SubjectId>,
    /// Function symbols the debug info does not tie to any declaration.
    pub unreferenced_function_symbols: Vec<ElfSymbol>,
    /// Variable symbols the debug info does not tie to any declaration.
    pub unreferenced_variable_symbols: Vec<ElfSymbol>,
}

impl<'ir> Corpus<'ir> {
    pub fn new(env: &'ir IrEnvironment, soname: impl Into<BString>, architecture: impl Into<BString>) -> Self {
        Self {
            env,
            soname: soname.into(),
            architecture: architecture.into(),
            functions: Vec::new(),
            variables: Vec::new(),
            unreferenced_function_symbols: Vec::new(),
            unreferenced_variable_symbols: Vec::new(),
        }
    }
}
