//! Diff graph engine: construction, canonicalization, traversal,
//! categorization, suppression and redundancy marking over a pair of
//! [`abidiff_ir`] corpora (spec §1, §2).
//!
//! The entry point is [`compare_corpora`], which builds the diff graph; the
//! three passes that give a built graph its final shape are
//! [`propagate_categories`], [`apply_suppressions`], and
//! [`mark_redundant`], run in that order (spec §2 "Data flow"). Rendering
//! the result is `abidiff-report`'s job, not this crate's.

mod changes;
mod compare;
mod context;
mod error;
mod node;
mod pairing;
mod propagate;
mod redundancy;
mod stats;
mod suppress;
mod visit;

pub use changes::{has_changes, has_changes_map, is_locally_changed};
pub use compare::compare_corpora;
pub use context::{Context, DisplayFlags};
pub use error::CoreError;
pub use node::{
    Bucket, DiffKind, DiffNode, DiffNodeId, EnumeratorBucket, EnumeratorChange, EquivState,
    SymbolBucket,
};
pub use pairing::{diff_subjects, is_class_like};
pub use propagate::propagate_categories;
pub use redundancy::{clear_redundant, mark_redundant};
pub use stats::{
    diff_stats, has_incompatible_changes, has_net_changes, has_net_subtype_changes, is_filtered_out,
    BucketStats, DiffStats, SymbolStats,
};
pub use suppress::{apply_suppressions, SuppressedSymbols};
pub use visit::{traverse, Visitor};
