//! Pairing engine: turns two subjects into a diff node, recursing into
//! their structure and running the edit-script primitive over member
//! sequences (spec §4.1).

use std::collections::HashMap;

use abidiff_editscript::EditOp;
use abidiff_ir::{
    is_class_union_kind, strip_qualifiers, strip_typedefs, ClassUnionKind, Decl, ElfSymbol,
    FunctionParameterDecl, SubjectId, SubjectKind, Type, VariableDecl,
};
use bstr::BString;

use crate::context::Context;
use crate::node::{Bucket, DiffKind, DiffNodeId, EnumeratorBucket, EnumeratorChange, SymbolBucket};

/// Diff two subjects, building the child graph as needed. Idempotent: a
/// second call for the same pair returns the node built by the first
/// (spec §4.1 "idempotence guarantee").
pub fn diff_subjects(
    ctx: &mut Context,
    first: Option<SubjectId>,
    second: Option<SubjectId>,
) -> DiffNodeId {
    if let Some(id) = ctx.lookup(first, second) {
        return id;
    }
    let id = ctx.reserve(first, second);
    let kind = build_kind(ctx, first, second);
    ctx.finish(id, kind);
    id
}

fn subject_kind(ctx: &Context, id: SubjectId) -> SubjectKind {
    ctx.env.get(id).kind()
}

fn type_name(ctx: &Context, id: SubjectId) -> BString {
    ctx.env.get(id).qualified_name(ctx.env)
}

fn build_kind(ctx: &mut Context, first: Option<SubjectId>, second: Option<SubjectId>) -> DiffKind {
    let fk = first.map(|id| subject_kind(ctx, id));
    let sk = second.map(|id| subject_kind(ctx, id));

    match (fk, sk) {
        (None, None) => DiffKind::Distinct { compatible: None },
        (Some(k), None) | (None, Some(k)) => build_same_kind(ctx, k, first, second),
        (Some(k1), Some(k2)) if k1 == k2 => build_same_kind(ctx, k1, first, second),
        (Some(_), Some(_)) => build_distinct(ctx, first.unwrap(), second.unwrap()),
    }
}

/// Two subjects of different runtime kinds (spec §4.1 "If kinds
/// disagree").
fn build_distinct(ctx: &mut Context, first: SubjectId, second: SubjectId) -> DiffKind {
    let f_leaf = strip_qualifiers(strip_typedefs(first, ctx.env), ctx.env);
    let s_leaf = strip_qualifiers(strip_typedefs(second, ctx.env), ctx.env);

    let compatible = if f_leaf != first || s_leaf != second {
        if subject_kind(ctx, f_leaf) == subject_kind(ctx, s_leaf) {
            Some(diff_subjects(ctx, Some(f_leaf), Some(s_leaf)))
        } else {
            None
        }
    } else {
        None
    };

    DiffKind::Distinct { compatible }
}

fn build_same_kind(
    ctx: &mut Context,
    kind: SubjectKind,
    first: Option<SubjectId>,
    second: Option<SubjectId>,
) -> DiffKind {
    match kind {
        SubjectKind::Pointer => {
            let fu = first.map(|id| underlying_of_pointer_or_reference(ctx, id));
            let su = second.map(|id| underlying_of_pointer_or_reference(ctx, id));
            DiffKind::PointerOrReference { underlying: diff_subjects(ctx, fu, su) }
        }
        SubjectKind::Reference => {
            let fu = first.map(|id| underlying_of_pointer_or_reference(ctx, id));
            let su = second.map(|id| underlying_of_pointer_or_reference(ctx, id));
            DiffKind::PointerOrReference { underlying: diff_subjects(ctx, fu, su) }
        }
        SubjectKind::Qualified => {
            let fu = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Qualified(q) => q.underlying,
                _ => unreachable!(),
            });
            let su = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Qualified(q) => q.underlying,
                _ => unreachable!(),
            });
            DiffKind::Qualified { underlying: diff_subjects(ctx, fu, su) }
        }
        SubjectKind::Array => {
            let fe = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Array(a) => a.element,
                _ => unreachable!(),
            });
            let se = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Array(a) => a.element,
                _ => unreachable!(),
            });
            DiffKind::Array { element: diff_subjects(ctx, fe, se) }
        }
        SubjectKind::Typedef => {
            let fu = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Typedef(t) => t.underlying,
                _ => unreachable!(),
            });
            let su = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::Typedef(t) => t.underlying,
                _ => unreachable!(),
            });
            DiffKind::Typedef { underlying: diff_subjects(ctx, fu, su) }
        }
        SubjectKind::Enum => build_enum(ctx, first, second),
        SubjectKind::FunctionParameter => {
            let ft = first.map(|id| param_decl(ctx, id).param_type);
            let st = second.map(|id| param_decl(ctx, id).param_type);
            DiffKind::FunctionParameter { ty: diff_subjects(ctx, ft, st) }
        }
        SubjectKind::FunctionType => build_function_type(ctx, first, second),
        SubjectKind::Function => {
            let ft = first.map(|id| match ctx.env.get(id).as_decl().unwrap() {
                Decl::Function(f) => f.function_type,
                _ => unreachable!(),
            });
            let st = second.map(|id| match ctx.env.get(id).as_decl().unwrap() {
                Decl::Function(f) => f.function_type,
                _ => unreachable!(),
            });
            DiffKind::FunctionDecl { function_type: diff_subjects(ctx, ft, st) }
        }
        SubjectKind::Variable => {
            let ft = first.map(|id| var_decl(ctx, id).var_type);
            let st = second.map(|id| var_decl(ctx, id).var_type);
            DiffKind::Variable { ty: diff_subjects(ctx, ft, st) }
        }
        SubjectKind::BaseSpecifier => {
            let fc = first.map(|id| match ctx.env.get(id).as_decl().unwrap() {
                Decl::BaseSpecifier(b) => b.base_class,
                _ => unreachable!(),
            });
            let sc = second.map(|id| match ctx.env.get(id).as_decl().unwrap() {
                Decl::BaseSpecifier(b) => b.base_class,
                _ => unreachable!(),
            });
            DiffKind::BaseSpecifier { underlying_class: diff_subjects(ctx, fc, sc) }
        }
        SubjectKind::Class | SubjectKind::Union => build_class_or_union(ctx, first, second),
        SubjectKind::Scope => build_scope(ctx, first, second),
        SubjectKind::TranslationUnit => {
            let fg = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::TranslationUnit(tu) => tu.global_scope,
                _ => unreachable!(),
            });
            let sg = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
                Type::TranslationUnit(tu) => tu.global_scope,
                _ => unreachable!(),
            });
            DiffKind::TranslationUnit { global_scope: diff_subjects(ctx, fg, sg) }
        }
        // Basic types and namespaces have no further structure to recurse
        // into; a distinct-shaped node with no children still carries a
        // local category (name/size changes) and is otherwise a leaf.
        SubjectKind::Basic | SubjectKind::Namespace => DiffKind::Distinct { compatible: None },
    }
}

fn underlying_of_pointer_or_reference(ctx: &Context, id: SubjectId) -> SubjectId {
    match ctx.env.get(id).as_type().unwrap() {
        Type::Pointer(p) => p.underlying,
        Type::Reference(r) => r.underlying,
        _ => unreachable!(),
    }
}

fn param_decl<'a>(ctx: &'a Context, id: SubjectId) -> &'a FunctionParameterDecl {
    match ctx.env.get(id).as_decl().unwrap() {
        Decl::FunctionParameter(p) => p,
        _ => unreachable!(),
    }
}

fn var_decl<'a>(ctx: &'a Context, id: SubjectId) -> &'a VariableDecl {
    match ctx.env.get(id).as_decl().unwrap() {
        Decl::Variable(v) => v,
        _ => unreachable!(),
    }
}

fn build_enum(ctx: &mut Context, first: Option<SubjectId>, second: Option<SubjectId>) -> DiffKind {
    let fu = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::Enum(e) => e.underlying,
        _ => unreachable!(),
    });
    let su = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::Enum(e) => e.underlying,
        _ => unreachable!(),
    });
    let underlying = diff_subjects(ctx, fu, su);

    let old_enumerators = first
        .map(|id| match ctx.env.get(id).as_type().unwrap() {
            Type::Enum(e) => e.enumerators.clone(),
            _ => unreachable!(),
        })
        .unwrap_or_default();
    let new_enumerators = second
        .map(|id| match ctx.env.get(id).as_type().unwrap() {
            Type::Enum(e) => e.enumerators.clone(),
            _ => unreachable!(),
        })
        .unwrap_or_default();

    let enumerators = diff_enumerators(old_enumerators, new_enumerators);
    DiffKind::Enum { underlying, enumerators }
}

fn diff_enumerators(
    old: Vec<abidiff_ir::Enumerator>,
    new: Vec<abidiff_ir::Enumerator>,
) -> EnumeratorBucket {
    #[derive(PartialEq)]
    struct Key(BString, i64);
    let old_keys: Vec<Key> = old.iter().map(|e| Key(e.name.clone(), e.value)).collect();
    let new_keys: Vec<Key> = new.iter().map(|e| Key(e.name.clone(), e.value)).collect();
    let edits = abidiff_editscript::diff(&old_keys, &new_keys);

    let mut bucket = EnumeratorBucket::default();
    let mut deleted_by_name: HashMap<BString, abidiff_ir::Enumerator> = HashMap::new();
    let mut added_list: Vec<abidiff_ir::Enumerator> = Vec::new();

    for e in &edits {
        match e.op {
            EditOp::Delete => {
                let en = old[e.old_index].clone();
                deleted_by_name.insert(en.name.clone(), en);
            }
            EditOp::Insert => added_list.push(new[e.new_index].clone()),
            EditOp::Equal => {}
        }
    }

    for added in added_list {
        if let Some(removed) = deleted_by_name.remove(&added.name) {
            bucket.changed.push(EnumeratorChange {
                name: added.name.clone(),
                old_value: removed.value,
                new_value: added.value,
            });
        } else {
            bucket.added.push(added);
        }
    }
    bucket.deleted = deleted_by_name.into_values().collect();
    bucket
}

fn build_function_type(
    ctx: &mut Context,
    first: Option<SubjectId>,
    second: Option<SubjectId>,
) -> DiffKind {
    let fr = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::FunctionType(f) => f.return_type,
        _ => unreachable!(),
    });
    let sr = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::FunctionType(f) => f.return_type,
        _ => unreachable!(),
    });
    let return_type = diff_subjects(ctx, fr, sr);

    let old_params = first
        .map(|id| match ctx.env.get(id).as_type().unwrap() {
            Type::FunctionType(f) => f.parameters.clone(),
            _ => unreachable!(),
        })
        .unwrap_or_default();
    let new_params = second
        .map(|id| match ctx.env.get(id).as_type().unwrap() {
            Type::FunctionType(f) => f.parameters.clone(),
            _ => unreachable!(),
        })
        .unwrap_or_default();

    let (changed, removed, added) = diff_function_parameters(ctx, &old_params, &new_params);

    DiffKind::FunctionType {
        return_type,
        changed_parameters: changed,
        removed_parameters: removed,
        added_parameters: added,
    }
}

/// Parameters at the same positional index are compared for full equality
/// (name and type). Survivors of the edit-script are bucketed, then
/// promoted with name equality tried before positional equality (spec
/// §4.1 "Tie-breaking").
fn diff_function_parameters(
    ctx: &mut Context,
    old: &[SubjectId],
    new: &[SubjectId],
) -> (Vec<DiffNodeId>, Vec<SubjectId>, Vec<SubjectId>) {
    #[derive(PartialEq)]
    struct Key(u32, Option<BString>, BString);
    let key_of = |ctx: &Context, id: SubjectId| {
        let p = param_decl(ctx, id);
        Key(p.index, p.name.clone(), type_name(ctx, p.param_type))
    };
    let old_keys: Vec<Key> = old.iter().map(|&id| key_of(ctx, id)).collect();
    let new_keys: Vec<Key> = new.iter().map(|&id| key_of(ctx, id)).collect();
    let edits = abidiff_editscript::diff(&old_keys, &new_keys);

    let mut deleted = Vec::new();
    let mut added = Vec::new();
    for e in &edits {
        match e.op {
            EditOp::Delete => deleted.push(old[e.old_index]),
            EditOp::Insert => added.push(new[e.new_index]),
            EditOp::Equal => {}
        }
    }

    let mut consumed = vec![false; added.len()];
    let mut changed = Vec::new();

    // Tier 1: name equality wins.
    let mut tier2 = Vec::new();
    for &d in &deleted {
        let dp = param_decl(ctx, d);
        let dname = dp.name.clone();
        let mut matched = None;
        if let Some(dn) = &dname {
            for (i, &a) in added.iter().enumerate() {
                if consumed[i] {
                    continue;
                }
                if param_decl(ctx, a).name.as_ref() == Some(dn) {
                    matched = Some(i);
                    break;
                }
            }
        }
        match matched {
            Some(i) => {
                consumed[i] = true;
                changed.push(diff_subjects(ctx, Some(d), Some(added[i])));
            }
            None => tier2.push(d),
        }
    }

    // Tier 2: positional index equality.
    let mut remaining_deleted = Vec::new();
    for d in tier2 {
        let d_index = param_decl(ctx, d).index;
        let mut matched = None;
        for (i, &a) in added.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if param_decl(ctx, a).index == d_index {
                matched = Some(i);
                break;
            }
        }
        match matched {
            Some(i) => {
                consumed[i] = true;
                changed.push(diff_subjects(ctx, Some(d), Some(added[i])));
            }
            None => remaining_deleted.push(d),
        }
    }

    let remaining_added: Vec<SubjectId> =
        added.iter().enumerate().filter(|(i, _)| !consumed[*i]).map(|(_, &id)| id).collect();

    (changed, remaining_deleted, remaining_added)
}

/// Single-tier name-keyed promotion used for base specifiers, member
/// functions, member types and member class templates: a deletion and
/// insertion sharing the same qualified name are promoted to a changed
/// pair, everything else stays in its bucket.
fn build_bucket_by_name(ctx: &mut Context, old: &[SubjectId], new: &[SubjectId]) -> Bucket {
    let old_keys: Vec<BString> = old.iter().map(|&id| type_name(ctx, id)).collect();
    let new_keys: Vec<BString> = new.iter().map(|&id| type_name(ctx, id)).collect();
    let edits = abidiff_editscript::diff(&old_keys, &new_keys);

    let mut deleted = Vec::new();
    let mut added = Vec::new();
    for e in &edits {
        match e.op {
            EditOp::Delete => deleted.push(old[e.old_index]),
            EditOp::Insert => added.push(new[e.new_index]),
            EditOp::Equal => {}
        }
    }

    let mut added_by_name: HashMap<BString, Vec<usize>> = HashMap::new();
    for (i, &id) in added.iter().enumerate() {
        added_by_name.entry(type_name(ctx, id)).or_default().push(i);
    }

    let mut bucket = Bucket::default();
    let mut consumed = vec![false; added.len()];
    for d in deleted {
        let key = type_name(ctx, d);
        let slot = added_by_name
            .get(&key)
            .and_then(|v| v.iter().copied().find(|&i| !consumed[i]));
        match slot {
            Some(i) => {
                consumed[i] = true;
                bucket.changed.push(diff_subjects(ctx, Some(d), Some(added[i])));
            }
            None => bucket.deleted.push(diff_subjects(ctx, Some(d), None)),
        }
    }
    for (i, &a) in added.iter().enumerate() {
        if !consumed[i] {
            bucket.added.push(diff_subjects(ctx, None, Some(a)));
        }
    }
    bucket
}

/// Two-tier offset-then-name promotion for data members: "a deletion at
/// offset paired with an insertion at the same offset" is the data-member
/// analogue of the parameter promotion (spec §4.1 "the same deletion-at-
/// offset paired with insertion-at-offset promotion applies to data
/// members").
fn build_data_member_bucket(ctx: &mut Context, old: &[SubjectId], new: &[SubjectId]) -> Bucket {
    #[derive(PartialEq)]
    struct Key(BString, Option<u64>, BString);
    let key_of = |ctx: &Context, id: SubjectId| {
        let v = var_decl(ctx, id);
        Key(v.name.clone(), v.offset_in_bits, type_name(ctx, v.var_type))
    };
    let old_keys: Vec<Key> = old.iter().map(|&id| key_of(ctx, id)).collect();
    let new_keys: Vec<Key> = new.iter().map(|&id| key_of(ctx, id)).collect();
    let edits = abidiff_editscript::diff(&old_keys, &new_keys);

    let mut deleted = Vec::new();
    let mut added = Vec::new();
    for e in &edits {
        match e.op {
            EditOp::Delete => deleted.push(old[e.old_index]),
            EditOp::Insert => added.push(new[e.new_index]),
            EditOp::Equal => {}
        }
    }

    let mut consumed = vec![false; added.len()];
    let mut bucket = Bucket::default();

    // Tier 1: name equality.
    let mut tier2 = Vec::new();
    for d in deleted {
        let dname = var_decl(ctx, d).name.clone();
        let slot = added
            .iter()
            .enumerate()
            .find(|(i, &a)| !consumed[*i] && var_decl(ctx, a).name == dname)
            .map(|(i, _)| i);
        match slot {
            Some(i) => {
                consumed[i] = true;
                bucket.changed.push(diff_subjects(ctx, Some(d), Some(added[i])));
            }
            None => tier2.push(d),
        }
    }

    // Tier 2: offset equality.
    for d in tier2 {
        let doff = var_decl(ctx, d).offset_in_bits;
        let slot = doff.and_then(|off| {
            added
                .iter()
                .enumerate()
                .find(|(i, &a)| !consumed[*i] && var_decl(ctx, a).offset_in_bits == Some(off))
                .map(|(i, _)| i)
        });
        match slot {
            Some(i) => {
                consumed[i] = true;
                bucket.changed.push(diff_subjects(ctx, Some(d), Some(added[i])));
            }
            None => bucket.deleted.push(diff_subjects(ctx, Some(d), None)),
        }
    }

    for (i, &a) in added.iter().enumerate() {
        if !consumed[i] {
            bucket.added.push(diff_subjects(ctx, None, Some(a)));
        }
    }

    bucket
}

fn build_class_or_union(
    ctx: &mut Context,
    first: Option<SubjectId>,
    second: Option<SubjectId>,
) -> DiffKind {
    let fc = first.map(|id| class_of(ctx, id));
    let sc = second.map(|id| class_of(ctx, id));

    let union_kind = fc
        .as_ref()
        .or(sc.as_ref())
        .map(|c| c.kind)
        .unwrap_or(ClassUnionKind::Class);

    let empty: Vec<SubjectId> = Vec::new();
    let old_bases = fc.as_ref().map(|c| &c.bases).unwrap_or(&empty);
    let new_bases = sc.as_ref().map(|c| &c.bases).unwrap_or(&empty);
    let bases = build_bucket_by_name(ctx, old_bases, new_bases);

    let old_members = fc.as_ref().map(|c| &c.data_members).unwrap_or(&empty);
    let new_members = sc.as_ref().map(|c| &c.data_members).unwrap_or(&empty);
    let data_members = build_data_member_bucket(ctx, old_members, new_members);

    let old_funcs = fc.as_ref().map(|c| &c.member_functions).unwrap_or(&empty);
    let new_funcs = sc.as_ref().map(|c| &c.member_functions).unwrap_or(&empty);
    let member_functions = build_bucket_by_name(ctx, old_funcs, new_funcs);

    let old_types = fc.as_ref().map(|c| &c.member_types).unwrap_or(&empty);
    let new_types = sc.as_ref().map(|c| &c.member_types).unwrap_or(&empty);
    let member_types = build_bucket_by_name(ctx, old_types, new_types);

    let old_templates = fc.as_ref().map(|c| &c.member_class_templates).unwrap_or(&empty);
    let new_templates = sc.as_ref().map(|c| &c.member_class_templates).unwrap_or(&empty);
    let member_class_templates = build_bucket_by_name(ctx, old_templates, new_templates);

    DiffKind::ClassOrUnion {
        union_kind,
        bases,
        data_members,
        member_functions,
        member_types,
        member_class_templates,
    }
}

fn class_of(ctx: &Context, id: SubjectId) -> abidiff_ir::ClassOrUnion {
    match ctx.env.get(id).as_type().unwrap() {
        Type::Class(c) | Type::Union(c) => c.clone(),
        _ => unreachable!(),
    }
}

fn build_scope(ctx: &mut Context, first: Option<SubjectId>, second: Option<SubjectId>) -> DiffKind {
    let empty: Vec<SubjectId> = Vec::new();
    let fs = first.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::Scope(s) => s.clone(),
        _ => unreachable!(),
    });
    let ss = second.map(|id| match ctx.env.get(id).as_type().unwrap() {
        Type::Scope(s) => s.clone(),
        _ => unreachable!(),
    });

    let old_decls = fs.as_ref().map(|s| &s.decls).unwrap_or(&empty);
    let new_decls = ss.as_ref().map(|s| &s.decls).unwrap_or(&empty);
    let decls = build_bucket_by_name(ctx, old_decls, new_decls);

    let old_types = fs.as_ref().map(|s| &s.types).unwrap_or(&empty);
    let new_types = ss.as_ref().map(|s| &s.types).unwrap_or(&empty);
    let types = build_bucket_by_name(ctx, old_types, new_types);

    DiffKind::Scope { decls, types }
}

pub(crate) fn unversioned_name(name: &BString) -> BString {
    let bytes: &[u8] = name;
    let at_pos = bytes.iter().position(|&b| b == b'@');
    match at_pos {
        Some(p) => BString::from(bytes[..p].to_vec()),
        None => name.clone(),
    }
}

/// Build the `functions` or `variables` bucket of a corpus diff: subjects
/// are matched by name, and a deletion/addition whose unversioned symbol
/// name still occurs on the other side (an alias, or a re-versioning to a
/// default symbol) is retracted rather than counted (spec §4.1 "corpus").
pub fn build_corpus_decl_bucket(
    ctx: &mut Context,
    old: &[SubjectId],
    new: &[SubjectId],
    old_symbols: &[ElfSymbol],
    new_symbols: &[ElfSymbol],
) -> Bucket {
    let bucket = build_bucket_by_name(ctx, old, new);

    let new_symbol_names: std::collections::HashSet<BString> = new
        .iter()
        .filter_map(|&id| decl_symbol(ctx, id))
        .map(|s| unversioned_name(&s.name))
        .chain(new_symbols.iter().map(|s| unversioned_name(&s.name)))
        .collect();
    let old_symbol_names: std::collections::HashSet<BString> = old
        .iter()
        .filter_map(|&id| decl_symbol(ctx, id))
        .map(|s| unversioned_name(&s.name))
        .chain(old_symbols.iter().map(|s| unversioned_name(&s.name)))
        .collect();

    let mut retained_deleted = Vec::new();
    for &node_id in &bucket.deleted {
        let subject = ctx.get(node_id).first.expect("deletion node has a first subject");
        let retracted = decl_symbol(ctx, subject)
            .map(|s| new_symbol_names.contains(&unversioned_name(&s.name)))
            .unwrap_or(false);
        if !retracted {
            retained_deleted.push(node_id);
        }
    }

    let mut retained_added = Vec::new();
    for &node_id in &bucket.added {
        let subject = ctx.get(node_id).second.expect("addition node has a second subject");
        let retracted = decl_symbol(ctx, subject)
            .map(|s| old_symbol_names.contains(&unversioned_name(&s.name)))
            .unwrap_or(false);
        if !retracted {
            retained_added.push(node_id);
        }
    }

    Bucket { deleted: retained_deleted, added: retained_added, changed: bucket.changed }
}

fn decl_symbol(ctx: &Context, id: SubjectId) -> Option<ElfSymbol> {
    match ctx.env.get(id).as_decl()? {
        Decl::Function(f) => f.symbol.clone(),
        Decl::Variable(v) => v.symbol.clone(),
        _ => None,
    }
}

/// Symbol-only buckets (spec §3 "unreferenced symbol"): these have no IR
/// declaration to diff, so they are compared by versioned name alone, no
/// sub-diff is built for a "changed" entry.
pub fn build_symbol_bucket(old: &[ElfSymbol], new: &[ElfSymbol]) -> SymbolBucket {
    let old_keys: Vec<BString> = old.iter().map(|s| s.versioned_name()).collect();
    let new_keys: Vec<BString> = new.iter().map(|s| s.versioned_name()).collect();
    let edits = abidiff_editscript::diff(&old_keys, &new_keys);

    let mut bucket = SymbolBucket::default();
    for e in &edits {
        match e.op {
            EditOp::Delete => bucket.deleted.push(old[e.old_index].clone()),
            EditOp::Insert => bucket.added.push(new[e.new_index].clone()),
            EditOp::Equal => {}
        }
    }
    bucket
}

/// Like [`build_symbol_bucket`], but additionally retracts a deletion or
/// addition whose unversioned name still occurs on the other side (spec
/// §4.1 "corpus": the same alias/re-versioning retraction that applies to
/// the declared functions/variables buckets applies here too).
pub fn build_symbol_bucket_retracted(old: &[ElfSymbol], new: &[ElfSymbol]) -> SymbolBucket {
    let bucket = build_symbol_bucket(old, new);
    let old_names: std::collections::HashSet<BString> =
        old.iter().map(|s| unversioned_name(&s.name)).collect();
    let new_names: std::collections::HashSet<BString> =
        new.iter().map(|s| unversioned_name(&s.name)).collect();
    SymbolBucket {
        deleted: bucket
            .deleted
            .into_iter()
            .filter(|s| !new_names.contains(&unversioned_name(&s.name)))
            .collect(),
        added: bucket
            .added
            .into_iter()
            .filter(|s| !old_names.contains(&unversioned_name(&s.name)))
            .collect(),
    }
}

/// True for a node built through [`is_class_union_kind`]'s target kinds —
/// exposed for callers that need to tell a class/union diff apart from
/// other kinds without a full `match`.
pub fn is_class_like(ctx: &Context, id: SubjectId) -> bool {
    match ctx.env.get(id).as_type() {
        Some(t) => is_class_union_kind(t, ClassUnionKind::Class) || is_class_union_kind(t, ClassUnionKind::Union),
        None => false,
    }
}
