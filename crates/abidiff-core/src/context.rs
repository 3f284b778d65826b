use std::collections::HashMap;

use abidiff_category::Category;
use abidiff_ir::{IrEnvironment, SubjectId};
use abidiff_suppr::SuppressionList;

use crate::node::{DiffKind, DiffNode, DiffNodeId, EquivState};

/// Boolean switches governing what the reporter emits (spec §6 "Display
/// flags"). All default to `true` except the two explicitly noted as
/// default-false in the spec.
#[derive(Debug, Clone)]
pub struct DisplayFlags {
    pub show_stats_only: bool,
    pub show_soname_change: bool,
    pub show_architecture_change: bool,
    pub show_deleted_functions: bool,
    pub show_added_functions: bool,
    pub show_changed_functions: bool,
    pub show_deleted_variables: bool,
    pub show_added_variables: bool,
    pub show_changed_variables: bool,
    pub show_linkage_names: bool,
    pub show_locations: bool,
    pub show_redundant_changes: bool,
    pub show_symbols_unreferenced_by_debug_info: bool,
    pub show_added_symbols_unreferenced_by_debug_info: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        DisplayFlags {
            show_stats_only: false,
            show_soname_change: true,
            show_architecture_change: true,
            show_deleted_functions: true,
            show_added_functions: true,
            show_changed_functions: true,
            show_deleted_variables: true,
            show_added_variables: true,
            show_changed_variables: true,
            show_linkage_names: false,
            show_locations: true,
            show_redundant_changes: true,
            show_symbols_unreferenced_by_debug_info: true,
            show_added_symbols_unreferenced_by_debug_info: true,
        }
    }
}

/// Process-wide session state shared by every pass over one comparison
/// (spec §3 "Context"): the diff-node pool, the pairing cache that gives
/// canonicalization and cycle safety, the allowed category mask, the
/// suppression list, and the display flags the reporter reads.
///
/// The context outlives every diff node it registers: nodes are addressed
/// by [`DiffNodeId`] into `pool`, never borrowed out, so there is no
/// lifetime tying a `DiffNode` back to the `Context` that owns it.
pub struct Context<'ir> {
    pub env: &'ir IrEnvironment,
    pool: Vec<DiffNode>,
    states: Vec<EquivState>,
    cache: HashMap<(Option<SubjectId>, Option<SubjectId>), DiffNodeId>,
    pub category_mask: Category,
    pub suppressions: SuppressionList,
    pub display: DisplayFlags,
}

impl<'ir> Context<'ir> {
    pub fn new(env: &'ir IrEnvironment) -> Self {
        Context {
            env,
            pool: Vec::new(),
            states: Vec::new(),
            cache: HashMap::new(),
            category_mask: Category::ALL,
            suppressions: SuppressionList::new(),
            display: DisplayFlags::default(),
        }
    }

    /// Look up an already-built diff node for a subject pair.
    pub fn lookup(&self, first: Option<SubjectId>, second: Option<SubjectId>) -> Option<DiffNodeId> {
        self.cache.get(&(first, second)).copied()
    }

    /// Reserve a slot for a subject pair before its children are built, so
    /// that a cycle recursing back into the same pair hits the cache
    /// instead of looping forever (spec §4.1 "Errors": "Cycles ... are
    /// handled by returning the cached node on the second encounter").
    /// The placeholder is filled in by [`Context::finish`] once the real
    /// kind is known.
    pub fn reserve(&mut self, first: Option<SubjectId>, second: Option<SubjectId>) -> DiffNodeId {
        let id = DiffNodeId(self.pool.len() as u32);
        self.pool.push(DiffNode {
            first,
            second,
            kind: DiffKind::Distinct { compatible: None },
            canonical: id,
        });
        self.states.push(EquivState::default());
        self.cache.insert((first, second), id);
        id
    }

    /// Fill in the real kind for a node previously reserved with
    /// [`Context::reserve`].
    pub fn finish(&mut self, id: DiffNodeId, kind: DiffKind) {
        self.pool[id.index()].kind = kind;
    }

    /// Create a diff node with no subject pair: the corpus root (spec §3
    /// "Corpus" is always the external entry point, never itself a nested
    /// subject — see `abidiff_ir::Decl`'s doc comment). Bypasses the
    /// `(first, second)` cache entirely so it can never collide with a
    /// `diff_subjects(ctx, None, None)` call (spec §9's "both subjects
    /// absent" peculiarity).
    pub fn new_root(&mut self, kind: DiffKind) -> DiffNodeId {
        let id = DiffNodeId(self.pool.len() as u32);
        self.pool.push(DiffNode { first: None, second: None, kind, canonical: id });
        self.states.push(EquivState::default());
        id
    }

    pub fn get(&self, id: DiffNodeId) -> &DiffNode {
        &self.pool[id.index()]
    }

    /// The canonical id for a node. Always the node's own id in this arena
    /// design (see [`DiffNodeId`]'s doc comment); kept as a method so
    /// callers read "through the canonical" the way the spec describes.
    pub fn canonical_of(&self, id: DiffNodeId) -> DiffNodeId {
        self.pool[id.index()].canonical
    }

    pub fn state(&self, id: DiffNodeId) -> &EquivState {
        let canon = self.canonical_of(id);
        &self.states[canon.index()]
    }

    pub fn state_mut(&mut self, id: DiffNodeId) -> &mut EquivState {
        let canon = self.canonical_of(id);
        &mut self.states[canon.index()]
    }

    pub fn node_count(&self) -> usize {
        self.pool.len()
    }

    /// Every id in the pool, in construction order. Used by passes that
    /// need to reset transient per-traversal state (spec §5: "both are
    /// transient state that must be cleared between successive walks").
    pub fn all_ids(&self) -> impl Iterator<Item = DiffNodeId> {
        (0..self.pool.len() as u32).map(DiffNodeId)
    }

    pub fn clear_reported_once(&mut self) {
        for state in &mut self.states {
            state.reported_once = false;
            state.currently_reporting = false;
        }
    }

    pub fn clear_visit_marks(&mut self) {
        for state in &mut self.states {
            state.visited = false;
            state.traversing = false;
        }
    }
}
