//! Suppression rule types and the rule-file parser that builds them.
//!
//! A suppression rule silences diff nodes that would otherwise be reported,
//! without removing them from the graph: they stay reachable for
//! redundancy and category bookkeeping, just marked [`Category::SUPPRESSED`]
//! (spec §4.5).

mod error;
mod parse;
mod rule;

pub use error::SuppressionParseError;
pub use rule::{
    regex_is_match, Boundary, ChangeKind, FunctionSuppression, MemberInsertionRange, ParameterSpec,
    ReachKind, SuppressionList, SuppressionRule, TypeSuppression, VariableSuppression,
};

use regex::Regex;

impl SuppressionList {
    /// Parse a rule-file's text into a [`SuppressionList`], collecting
    /// errors for malformed rules rather than aborting (spec §7
    /// `suppression-parse-error`).
    pub fn parse(input: &str, file: &str) -> (SuppressionList, Vec<SuppressionParseError>) {
        let (events, mut errors) = parse::parse_events(input, file);
        let groups = parse::group_sections(&events, file, &mut errors);

        let mut list = SuppressionList::new();
        for (section, header_line, props) in groups {
            match section {
                "suppress_type" => match build_type_suppression(file, header_line, &props, &mut errors) {
                    Some(t) => list.push(SuppressionRule::Type(t)),
                    None => {}
                },
                "suppress_function" => {
                    match build_function_suppression(file, header_line, &props, &mut errors) {
                        Some(f) => list.push(SuppressionRule::Function(f)),
                        None => {}
                    }
                }
                "suppress_variable" => {
                    match build_variable_suppression(file, header_line, &props, &mut errors) {
                        Some(v) => list.push(SuppressionRule::Variable(v)),
                        None => {}
                    }
                }
                other => errors.push(SuppressionParseError::UnknownSection {
                    file: file.to_string(),
                    line: header_line,
                    section: other.to_string(),
                }),
            }
        }

        (list, errors)
    }
}

fn compile_regex(
    file: &str,
    line: usize,
    key: &str,
    value: &str,
    errors: &mut Vec<SuppressionParseError>,
) -> Option<Regex> {
    match Regex::new(value) {
        Ok(re) => Some(re),
        Err(e) => {
            errors.push(SuppressionParseError::InvalidRegex {
                file: file.to_string(),
                line,
                key: key.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn parse_change_kind(value: &str) -> Option<ChangeKind> {
    match value {
        "function-subtype-change" | "type-subtype-change" | "subtype-change" => {
            Some(ChangeKind::SubTypeChange)
        }
        "added-declaration" | "added" => Some(ChangeKind::Added),
        "deleted-declaration" | "removed" | "deleted" => Some(ChangeKind::Removed),
        _ => None,
    }
}

fn parse_boundary(value: &str) -> Option<Boundary> {
    if value.trim() == "end" {
        return Some(Boundary::End);
    }
    value.trim().parse::<u64>().ok().map(Boundary::Offset)
}

/// `accessed_through` (libabigail's key) names how the changed type must be
/// reached from the subject the rule names for the rule to apply (spec
/// §4.5 "reach kind").
fn parse_reach_kind(value: &str) -> Option<ReachKind> {
    match value.trim() {
        "direct" => Some(ReachKind::Direct),
        "pointer" => Some(ReachKind::ThroughPointer),
        "reference" => Some(ReachKind::ThroughReference),
        _ => None,
    }
}

fn build_type_suppression(
    file: &str,
    header_line: usize,
    props: &[(&str, &str, usize)],
    errors: &mut Vec<SuppressionParseError>,
) -> Option<TypeSuppression> {
    let mut rule = TypeSuppression::default();
    let mut insert_begin = None;
    let mut insert_end = None;

    for &(key, value, line) in props {
        match key {
            "label" => rule.label = Some(value.to_string()),
            "name" | "name_regexp" => rule.name_regex = compile_regex(file, line, key, value, errors),
            "file_name_regexp" | "source_location_regexp" => {
                rule.file_regex = compile_regex(file, line, key, value, errors)
            }
            "soname_regexp" => rule.soname_regex = compile_regex(file, line, key, value, errors),
            "change_kind" => rule.change_kind = parse_change_kind(value),
            "accessed_through" => rule.reach_kind = parse_reach_kind(value),
            "has_data_member_inserted_at" => rule.has_data_member_inserted_at = parse_boundary(value),
            "has_data_member_inserted_between_begin" => insert_begin = parse_boundary(value),
            "has_data_member_inserted_between_end" => insert_end = parse_boundary(value),
            _ => {}
        }
    }

    if let (Some(begin), Some(end)) = (insert_begin, insert_end) {
        rule.has_data_member_inserted_between = Some(MemberInsertionRange { begin, end });
    } else if insert_begin.is_some() || insert_end.is_some() {
        errors.push(SuppressionParseError::InvalidParameterSpec {
            file: file.to_string(),
            line: header_line,
            value: "has_data_member_inserted_between requires both _begin and _end".to_string(),
        });
    }

    Some(rule)
}

fn build_function_suppression(
    file: &str,
    _header_line: usize,
    props: &[(&str, &str, usize)],
    errors: &mut Vec<SuppressionParseError>,
) -> Option<FunctionSuppression> {
    let mut rule = FunctionSuppression::default();
    let mut param_index = None;
    let mut param_type_regex = None;

    for &(key, value, line) in props {
        match key {
            "label" => rule.label = Some(value.to_string()),
            "name" | "name_regexp" => rule.name_regex = compile_regex(file, line, key, value, errors),
            "symbol_name" | "symbol_name_regexp" => {
                rule.symbol_name_regex = compile_regex(file, line, key, value, errors)
            }
            "soname_regexp" => rule.soname_regex = compile_regex(file, line, key, value, errors),
            "change_kind" => rule.change_kind = parse_change_kind(value),
            "return_type_name_regexp" => {
                rule.return_type_regex = compile_regex(file, line, key, value, errors)
            }
            "parameter_index" => param_index = value.trim().parse::<u32>().ok(),
            "parameter_type_name_regexp" => {
                param_type_regex = compile_regex(file, line, key, value, errors)
            }
            _ => {}
        }
    }

    if param_index.is_some() || param_type_regex.is_some() {
        rule.parameter = Some(ParameterSpec {
            index: param_index,
            type_name_regex: param_type_regex,
        });
    }

    Some(rule)
}

fn build_variable_suppression(
    file: &str,
    _header_line: usize,
    props: &[(&str, &str, usize)],
    errors: &mut Vec<SuppressionParseError>,
) -> Option<VariableSuppression> {
    let mut rule = VariableSuppression::default();

    for &(key, value, line) in props {
        match key {
            "label" => rule.label = Some(value.to_string()),
            "name" | "name_regexp" => rule.name_regex = compile_regex(file, line, key, value, errors),
            "symbol_name" | "symbol_name_regexp" => {
                rule.symbol_name_regex = compile_regex(file, line, key, value, errors)
            }
            "soname_regexp" => rule.soname_regex = compile_regex(file, line, key, value, errors),
            "change_kind" => rule.change_kind = parse_change_kind(value),
            "type_name_regexp" => rule.type_name_regex = compile_regex(file, line, key, value, errors),
            _ => {}
        }
    }

    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_type_suppression_rule() {
        let text = "[suppress_type]\nlabel = ignore Foo\nname_regexp = ^Foo$\nchange_kind = added-declaration\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert!(errors.is_empty());
        assert_eq!(list.len(), 1);
        match &list.rules[0] {
            SuppressionRule::Type(t) => {
                assert_eq!(t.label.as_deref(), Some("ignore Foo"));
                assert_eq!(t.change_kind, Some(ChangeKind::Added));
                assert!(t.name_regex.is_some());
            }
            _ => panic!("expected a type suppression"),
        }
    }

    #[test]
    fn parses_a_function_suppression_rule_with_parameter() {
        let text = "[suppress_function]\nname_regexp = ^do_.*$\nparameter_index = 1\nparameter_type_name_regexp = int\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert!(errors.is_empty());
        match &list.rules[0] {
            SuppressionRule::Function(f) => {
                let p = f.parameter.as_ref().expect("parameter spec");
                assert_eq!(p.index, Some(1));
                assert!(p.type_name_regex.is_some());
            }
            _ => panic!("expected a function suppression"),
        }
    }

    #[test]
    fn parses_a_variable_suppression_rule() {
        let text = "[suppress_variable]\nname_regexp = ^g_.*$\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert!(errors.is_empty());
        assert!(matches!(list.rules[0], SuppressionRule::Variable(_)));
    }

    #[test]
    fn unknown_section_is_reported_but_does_not_abort_remaining_rules() {
        let text = "[bogus_section]\nname = x\n[suppress_type]\nname_regexp = Bar\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SuppressionParseError::UnknownSection { .. }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn invalid_regex_is_reported_and_rule_keeps_other_fields() {
        let text = "[suppress_type]\nname_regexp = (unclosed\nlabel = still here\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert_eq!(errors.len(), 1);
        match &list.rules[0] {
            SuppressionRule::Type(t) => {
                assert!(t.name_regex.is_none());
                assert_eq!(t.label.as_deref(), Some("still here"));
            }
            _ => panic!("expected a type suppression"),
        }
    }

    #[test]
    fn member_insertion_range_requires_both_bounds() {
        let text = "[suppress_type]\nhas_data_member_inserted_between_begin = 64\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert_eq!(errors.len(), 1);
        match &list.rules[0] {
            SuppressionRule::Type(t) => assert!(t.has_data_member_inserted_between.is_none()),
            _ => panic!("expected a type suppression"),
        }
    }

    #[test]
    fn boundary_keyword_end_is_recognized() {
        assert_eq!(parse_boundary("end"), Some(Boundary::End));
        assert_eq!(parse_boundary("128"), Some(Boundary::Offset(128)));
        assert_eq!(parse_boundary("nonsense"), None);
    }

    #[test]
    fn accessed_through_sets_reach_kind() {
        let text = "[suppress_type]\nname_regexp = ^Foo$\naccessed_through = pointer\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert!(errors.is_empty());
        match &list.rules[0] {
            SuppressionRule::Type(t) => assert_eq!(t.reach_kind, Some(ReachKind::ThroughPointer)),
            _ => panic!("expected a type suppression"),
        }
    }

    #[test]
    fn accessed_through_unrecognized_value_leaves_reach_kind_unset() {
        let text = "[suppress_type]\nname_regexp = ^Foo$\naccessed_through = bogus\n";
        let (list, errors) = SuppressionList::parse(text, "rules.ini");
        assert!(errors.is_empty());
        match &list.rules[0] {
            SuppressionRule::Type(t) => assert_eq!(t.reach_kind, None),
            _ => panic!("expected a type suppression"),
        }
    }

    #[test]
    fn soname_regexp_is_parsed_on_all_rule_kinds() {
        let (types, errors) = SuppressionList::parse("[suppress_type]\nsoname_regexp = ^libfoo\\.so\\.1$\n", "r.ini");
        assert!(errors.is_empty());
        match &types.rules[0] {
            SuppressionRule::Type(t) => assert!(t.soname_regex.is_some()),
            _ => panic!("expected a type suppression"),
        }

        let (functions, errors) =
            SuppressionList::parse("[suppress_function]\nsoname_regexp = ^libfoo\\.so\\.1$\n", "r.ini");
        assert!(errors.is_empty());
        match &functions.rules[0] {
            SuppressionRule::Function(f) => assert!(f.soname_regex.is_some()),
            _ => panic!("expected a function suppression"),
        }

        let (variables, errors) =
            SuppressionList::parse("[suppress_variable]\nsoname_regexp = ^libfoo\\.so\\.1$\n", "r.ini");
        assert!(errors.is_empty());
        match &variables.rules[0] {
            SuppressionRule::Variable(v) => assert!(v.soname_regex.is_some()),
            _ => panic!("expected a variable suppression"),
        }
    }
}
