/// Non-fatal: a malformed rule is reported but does not abort the load
/// (spec §7 `suppression-parse-error`: "the core continues with the
/// remaining rules").
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SuppressionParseError {
    #[error("{file}:{line}: unknown section header '{section}'")]
    UnknownSection {
        file: String,
        line: usize,
        section: String,
    },

    #[error("{file}:{line}: property line outside of any section: '{raw}'")]
    PropertyOutsideSection {
        file: String,
        line: usize,
        raw: String,
    },

    #[error("{file}:{line}: malformed property line: '{raw}'")]
    MalformedProperty {
        file: String,
        line: usize,
        raw: String,
    },

    #[error("{file}:{line}: invalid regex in '{key}': {message}")]
    InvalidRegex {
        file: String,
        line: usize,
        key: String,
        message: String,
    },

    #[error("{file}:{line}: invalid parameter spec '{value}'")]
    InvalidParameterSpec {
        file: String,
        line: usize,
        value: String,
    },
}
