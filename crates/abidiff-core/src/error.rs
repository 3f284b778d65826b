use abidiff_ir::SubjectId;

/// Fatal precondition violations. Both variants indicate a caller or
/// dispatch bug rather than anything recoverable: the core panics on them
/// rather than returning a `Result`, matching the "precondition violations
/// use whatever fatal-error facility the implementation language provides"
/// stance.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("subjects {0:?} and {1:?} were produced by different IR environments")]
    EnvironmentMismatch(SubjectId, SubjectId),

    #[error("no pairing dispatch arm for subject kinds {0} / {1}")]
    UnknownSubjectKindPair(String, String),
}
