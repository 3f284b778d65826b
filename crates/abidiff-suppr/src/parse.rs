//! Line-oriented parser for the suppression rule-file format: an INI-like
//! text with `[suppress_type]`, `[suppress_function]`, `[suppress_variable]`
//! section headers and `key = value` property lines underneath each.

use crate::error::SuppressionParseError;

/// A parsed event. Mirrors the section/entry/comment/blank event model of
/// an INI parser, kept separate from rule interpretation so a caller that
/// only wants to inspect the raw structure (e.g. a linter) can do so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEvent {
    Section { name: String, line: usize },
    Property { key: String, value: String, line: usize },
}

/// Parse the rule-file text into a flat sequence of events, collecting
/// (rather than aborting on) malformed lines.
pub fn parse_events(input: &str, file: &str) -> (Vec<RuleEvent>, Vec<SuppressionParseError>) {
    let mut events = Vec::new();
    let mut errors = Vec::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            match rest.strip_suffix(']') {
                Some(name) => events.push(RuleEvent::Section {
                    name: name.trim().to_string(),
                    line,
                }),
                None => errors.push(SuppressionParseError::MalformedProperty {
                    file: file.to_string(),
                    line,
                    raw: raw_line.to_string(),
                }),
            }
            continue;
        }

        match trimmed.split_once('=') {
            Some((key, value)) => events.push(RuleEvent::Property {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
                line,
            }),
            None => errors.push(SuppressionParseError::MalformedProperty {
                file: file.to_string(),
                line,
                raw: raw_line.to_string(),
            }),
        }
    }

    (events, errors)
}

/// Group a flat event stream into `(section_name, properties, header_line)`
/// triples, flagging any property line that precedes the first section
/// header.
pub fn group_sections<'a>(
    events: &'a [RuleEvent],
    file: &str,
    errors: &mut Vec<SuppressionParseError>,
) -> Vec<(&'a str, usize, Vec<(&'a str, &'a str, usize)>)> {
    let mut groups: Vec<(&str, usize, Vec<(&str, &str, usize)>)> = Vec::new();

    for event in events {
        match event {
            RuleEvent::Section { name, line } => groups.push((name.as_str(), *line, Vec::new())),
            RuleEvent::Property { key, value, line } => match groups.last_mut() {
                Some((_, _, props)) => props.push((key.as_str(), value.as_str(), *line)),
                None => errors.push(SuppressionParseError::PropertyOutsideSection {
                    file: file.to_string(),
                    line: *line,
                    raw: format!("{key} = {value}"),
                }),
            },
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_and_properties() {
        let text = "[suppress_type]\nname = Foo\nkind = class\n";
        let (events, errors) = parse_events(text, "rules.ini");
        assert!(errors.is_empty());
        assert_eq!(
            events,
            vec![
                RuleEvent::Section { name: "suppress_type".into(), line: 1 },
                RuleEvent::Property { key: "name".into(), value: "Foo".into(), line: 2 },
                RuleEvent::Property { key: "kind".into(), value: "class".into(), line: 3 },
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# a comment\n\n[suppress_function]\n; also a comment\nname = foo\n";
        let (events, errors) = parse_events(text, "rules.ini");
        assert!(errors.is_empty());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn flags_property_before_any_section() {
        let text = "name = foo\n[suppress_type]\n";
        let (events, errors) = parse_events(text, "rules.ini");
        let mut errs = Vec::new();
        let _ = group_sections(&events, "rules.ini", &mut errs);
        assert_eq!(errors.len(), 0); // this line parses fine as a property
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn flags_malformed_section_header() {
        let text = "[suppress_type\nname = foo\n";
        let (_, errors) = parse_events(text, "rules.ini");
        assert_eq!(errors.len(), 1);
    }
}
