use crate::subject::Subject;

/// An index into an [`IrEnvironment`]'s subject arena.
///
/// Meaningless outside the environment that produced it — two `SubjectId`s
/// from different environments may collide numerically without referring to
/// related subjects, which is exactly why comparisons carry the environment
/// alongside the id (see [`SubjectRef`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubjectId(u32);

impl SubjectId {
    /// The raw index, for callers that need a stable tie-break key.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Build an id directly from a raw index.
    ///
    /// Meant for external builders (a JSON fixture loader, a future real
    /// reader) that intern subjects in bulk and need to rewrite
    /// fixture-local references into environment-wide ones before calling
    /// [`IrEnvironment::intern`] — not for use within the core, which only
    /// ever receives ids back from `intern`.
    pub fn from_index(index: u32) -> SubjectId {
        SubjectId(index)
    }
}

/// Owning arena for every [`Subject`] produced while reading one side (or
/// both sides, if the reader shares an environment) of a comparison.
///
/// This plays the role the reader's IR normally plays: the core only ever
/// borrows `&IrEnvironment`, never owns one.
#[derive(Debug, Default)]
pub struct IrEnvironment {
    subjects: Vec<Subject>,
}

impl IrEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a subject, returning the id it can be referenced by.
    pub fn intern(&mut self, subject: Subject) -> SubjectId {
        let id = SubjectId(self.subjects.len() as u32);
        self.subjects.push(subject);
        id
    }

    /// Resolve a previously interned subject.
    ///
    /// Panics if `id` was not produced by this environment — the same
    /// "fatal precondition violation" spec §4.1 describes for cross-
    /// environment subject pairs.
    pub fn get(&self, id: SubjectId) -> &Subject {
        self.subjects
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("{id:?} does not belong to this IrEnvironment"))
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// A subject together with the environment that owns it.
///
/// This is the unit of currency the pairing engine operates on: every
/// recursive "diff these two subjects" call takes a pair of `SubjectRef`s
/// (or `Option<SubjectRef>` for additions/deletions).
#[derive(Clone, Copy)]
pub struct SubjectRef<'ir> {
    pub env: &'ir IrEnvironment,
    pub id: SubjectId,
}

impl<'ir> SubjectRef<'ir> {
    pub fn new(env: &'ir IrEnvironment, id: SubjectId) -> Self {
        Self { env, id }
    }

    pub fn get(&self) -> &'ir Subject {
        self.env.get(self.id)
    }

    /// True if `self` and `other` were interned by the same environment.
    ///
    /// Callers must check this before diffing two subjects; a mismatch is a
    /// fatal precondition violation (spec §4.1, §7 `environment-mismatch`).
    pub fn same_environment(&self, other: &SubjectRef<'_>) -> bool {
        std::ptr::eq(self.env, other.env)
    }
}

impl PartialEq for SubjectRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_environment(other) && self.id == other.id
    }
}
impl Eq for SubjectRef<'_> {}

impl std::hash::Hash for SubjectRef<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.env as *const IrEnvironment as usize).hash(state);
        self.id.hash(state);
    }
}

impl std::fmt::Debug for SubjectRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectRef").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BasicType;
    use crate::Type;

    #[test]
    fn interning_assigns_increasing_ids() {
        let mut env = IrEnvironment::new();
        let a = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: Default::default(),
        })));
        let b = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "char".into(),
            size_align: Default::default(),
        })));
        assert!(a.index() < b.index());
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn refs_from_same_env_are_comparable() {
        let mut env = IrEnvironment::new();
        let id = env.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: Default::default(),
        })));
        let r1 = SubjectRef::new(&env, id);
        let r2 = SubjectRef::new(&env, id);
        assert!(r1.same_environment(&r2));
        assert_eq!(r1, r2);
    }

    #[test]
    fn refs_from_different_envs_are_not_same_environment() {
        let mut env_a = IrEnvironment::new();
        let mut env_b = IrEnvironment::new();
        let id_a = env_a.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: Default::default(),
        })));
        let id_b = env_b.intern(Subject::Type(Type::Basic(BasicType {
            name: "int".into(),
            size_align: Default::default(),
        })));
        let r1 = SubjectRef::new(&env_a, id_a);
        let r2 = SubjectRef::new(&env_b, id_b);
        assert!(!r1.same_environment(&r2));
    }
}
