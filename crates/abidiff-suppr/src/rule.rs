//! Typed suppression rules, built from the raw events `parse` produces.

use bstr::BString;
use regex::Regex;

/// How a parameter is matched against a function's parameter list.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Zero-based parameter index, or `None` to match by type name alone.
    pub index: Option<u32>,
    pub type_name_regex: Option<Regex>,
}

impl PartialEq for ParameterSpec {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.type_name_regex.as_ref().map(Regex::as_str)
                == other.type_name_regex.as_ref().map(Regex::as_str)
    }
}
impl Eq for ParameterSpec {}

/// A boundary value for a member-insertion range. The original format
/// allows either a literal bit offset or a small set of named keywords
/// resolved against the containing class at apply time; arbitrary
/// expression evaluation is out of scope (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Offset(u64),
    /// `end` keyword: the end of the class, i.e. any offset at or beyond
    /// the last existing member.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInsertionRange {
    pub begin: Boundary,
    pub end: Boundary,
}

/// What kind of change a rule applies to, independent of the subject kind
/// it targets (spec §4.5 "change-kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    SubTypeChange,
    Added,
    Removed,
}

/// How a changed type must be reached from the subject named by the rule
/// for the rule to apply (spec §4.5 "reach-kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachKind {
    Direct,
    ThroughPointer,
    ThroughReference,
}

#[derive(Debug, Clone, Default)]
pub struct TypeSuppression {
    pub label: Option<String>,
    pub name_regex: Option<Regex>,
    pub file_regex: Option<Regex>,
    pub soname_regex: Option<Regex>,
    pub change_kind: Option<ChangeKind>,
    pub reach_kind: Option<ReachKind>,
    pub has_data_member_inserted_at: Option<Boundary>,
    pub has_data_member_inserted_between: Option<MemberInsertionRange>,
}

impl PartialEq for TypeSuppression {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.name_regex.as_ref().map(Regex::as_str) == other.name_regex.as_ref().map(Regex::as_str)
            && self.file_regex.as_ref().map(Regex::as_str) == other.file_regex.as_ref().map(Regex::as_str)
            && self.soname_regex.as_ref().map(Regex::as_str) == other.soname_regex.as_ref().map(Regex::as_str)
            && self.change_kind == other.change_kind
            && self.reach_kind == other.reach_kind
            && self.has_data_member_inserted_at == other.has_data_member_inserted_at
            && self.has_data_member_inserted_between == other.has_data_member_inserted_between
    }
}
impl Eq for TypeSuppression {}

#[derive(Debug, Clone, Default)]
pub struct FunctionSuppression {
    pub label: Option<String>,
    pub name_regex: Option<Regex>,
    pub symbol_name_regex: Option<Regex>,
    pub soname_regex: Option<Regex>,
    pub change_kind: Option<ChangeKind>,
    pub parameter: Option<ParameterSpec>,
    pub return_type_regex: Option<Regex>,
}

impl PartialEq for FunctionSuppression {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.name_regex.as_ref().map(Regex::as_str) == other.name_regex.as_ref().map(Regex::as_str)
            && self.symbol_name_regex.as_ref().map(Regex::as_str)
                == other.symbol_name_regex.as_ref().map(Regex::as_str)
            && self.soname_regex.as_ref().map(Regex::as_str) == other.soname_regex.as_ref().map(Regex::as_str)
            && self.change_kind == other.change_kind
            && self.parameter == other.parameter
            && self.return_type_regex.as_ref().map(Regex::as_str)
                == other.return_type_regex.as_ref().map(Regex::as_str)
    }
}
impl Eq for FunctionSuppression {}

#[derive(Debug, Clone, Default)]
pub struct VariableSuppression {
    pub label: Option<String>,
    pub name_regex: Option<Regex>,
    pub symbol_name_regex: Option<Regex>,
    pub soname_regex: Option<Regex>,
    pub change_kind: Option<ChangeKind>,
    pub type_name_regex: Option<Regex>,
}

impl PartialEq for VariableSuppression {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.name_regex.as_ref().map(Regex::as_str) == other.name_regex.as_ref().map(Regex::as_str)
            && self.symbol_name_regex.as_ref().map(Regex::as_str)
                == other.symbol_name_regex.as_ref().map(Regex::as_str)
            && self.soname_regex.as_ref().map(Regex::as_str) == other.soname_regex.as_ref().map(Regex::as_str)
            && self.change_kind == other.change_kind
            && self.type_name_regex.as_ref().map(Regex::as_str)
                == other.type_name_regex.as_ref().map(Regex::as_str)
    }
}
impl Eq for VariableSuppression {}

/// A single parsed rule, tagged by the kind of subject it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionRule {
    Type(TypeSuppression),
    Function(FunctionSuppression),
    Variable(VariableSuppression),
}

impl SuppressionRule {
    pub fn label(&self) -> Option<&str> {
        match self {
            SuppressionRule::Type(t) => t.label.as_deref(),
            SuppressionRule::Function(f) => f.label.as_deref(),
            SuppressionRule::Variable(v) => v.label.as_deref(),
        }
    }
}

/// All rules loaded from one or more rule files, in file order (spec §4.5
/// "rules are tried in the order they were declared; the first match
/// wins").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionList {
    pub rules: Vec<SuppressionRule>,
}

impl SuppressionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: SuppressionRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Matches a regex against a byte-string subject name.
pub fn regex_is_match(re: &Regex, name: &BString) -> bool {
    match std::str::from_utf8(name) {
        Ok(s) => re.is_match(s),
        Err(_) => false,
    }
}
