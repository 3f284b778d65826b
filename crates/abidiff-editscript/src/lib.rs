//! Generic Myers O(ND) edit-script primitive.
//!
//! Given two sequences `old` and `new`, computes the minimal sequence of
//! deletions (from `old`) and insertions (from `new`) that transforms one
//! into the other. This is deliberately generic over `T: PartialEq` rather
//! than specialized to lines of bytes, since the pairing engine runs it over
//! function parameters, data members, enumerators, base specifiers, and
//! whole corpora — never over text.
//!
//! The algorithm follows Eugene Myers' "An O(ND) Difference Algorithm and
//! Its Variations" (1986): a forward greedy search over edit graph diagonals,
//! with full-trace backtracking to recover the edit path.

/// A single operation in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Element present, unchanged, in both sequences.
    Equal,
    /// Element present only in the new sequence.
    Insert,
    /// Element present only in the old sequence.
    Delete,
}

/// A single edit, referencing elements by index into the original slices.
///
/// `old_index` is meaningful for `Equal` and `Delete`; `new_index` is
/// meaningful for `Equal` and `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    pub old_index: usize,
    pub new_index: usize,
}

/// Compute the minimal edit script transforming `old` into `new`.
///
/// Runs in O((n+m)*d) time and space, where `d` is the edit distance. The
/// common prefix and suffix are trimmed before the quadratic search so that
/// localized changes in long sequences stay cheap.
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() {
        return (0..new.len())
            .map(|j| Edit { op: EditOp::Insert, old_index: 0, new_index: j })
            .collect();
    }
    if new.is_empty() {
        return (0..old.len())
            .map(|i| Edit { op: EditOp::Delete, old_index: i, new_index: 0 })
            .collect();
    }

    let prefix_len = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let suffix_len = old[prefix_len..]
        .iter()
        .rev()
        .zip(new[prefix_len..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_trimmed = &old[prefix_len..old.len() - suffix_len];
    let new_trimmed = &new[prefix_len..new.len() - suffix_len];

    let inner = myers_inner(old_trimmed, new_trimmed);

    let mut edits = Vec::with_capacity(old.len() + new.len());
    for i in 0..prefix_len {
        edits.push(Edit { op: EditOp::Equal, old_index: i, new_index: i });
    }
    for e in inner {
        edits.push(Edit {
            op: e.op,
            old_index: e.old_index + prefix_len,
            new_index: e.new_index + prefix_len,
        });
    }
    for i in 0..suffix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: old.len() - suffix_len + i,
            new_index: new.len() - suffix_len + i,
        });
    }
    edits
}

/// Core Myers search on already-trimmed sequences.
fn myers_inner<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Edit> {
    let n = old.len();
    let m = new.len();

    if n == 0 && m == 0 {
        return Vec::new();
    }
    if n == 0 {
        return (0..m).map(|j| Edit { op: EditOp::Insert, old_index: 0, new_index: j }).collect();
    }
    if m == 0 {
        return (0..n).map(|i| Edit { op: EditOp::Delete, old_index: i, new_index: 0 }).collect();
    }

    let max_d = n + m;
    let v_size = 2 * max_d + 1;
    let v_offset = max_d as isize;

    let mut trace: Vec<Vec<usize>> = Vec::new();
    let mut v = vec![0usize; v_size];

    'outer: for d in 0..=max_d {
        let mut v_copy = v.clone();
        let k_min = -(d as isize);
        let k_max = d as isize;

        let mut k = k_min;
        while k <= k_max {
            let idx = (k + v_offset) as usize;

            let mut x = if k == k_min
                || (k != k_max && v[((k - 1) + v_offset) as usize] < v[((k + 1) + v_offset) as usize])
            {
                v[((k + 1) + v_offset) as usize]
            } else {
                v[((k - 1) + v_offset) as usize] + 1
            };
            let mut y = (x as isize - k) as usize;

            while x < n && y < m && old[x] == new[y] {
                x += 1;
                y += 1;
            }

            v_copy[idx] = x;

            if x >= n && y >= m {
                trace.push(v_copy);
                break 'outer;
            }

            k += 2;
        }

        trace.push(v_copy);
        v = trace.last().unwrap().clone();
    }

    backtrack(&trace, n, m, v_offset)
}

fn backtrack(trace: &[Vec<usize>], n: usize, m: usize, v_offset: isize) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut x = n;
    let mut y = m;

    for d in (0..trace.len()).rev() {
        let k = x as isize - y as isize;

        let prev_k = if d == 0 {
            k
        } else if k == -(d as isize)
            || (k != d as isize
                && trace[d - 1][((k - 1) + v_offset) as usize]
                    < trace[d - 1][((k + 1) + v_offset) as usize])
        {
            k + 1
        } else {
            k - 1
        };

        let prev_x = if d == 0 { 0 } else { trace[d - 1][(prev_k + v_offset) as usize] };
        let prev_y = (prev_x as isize - prev_k) as usize;

        while x > prev_x && y > prev_y && x > 0 && y > 0 {
            x -= 1;
            y -= 1;
            edits.push(Edit { op: EditOp::Equal, old_index: x, new_index: y });
        }

        if d > 0 {
            if prev_k == k + 1 {
                if y > 0 {
                    y -= 1;
                    edits.push(Edit { op: EditOp::Insert, old_index: x, new_index: y });
                }
            } else if x > 0 {
                x -= 1;
                edits.push(Edit { op: EditOp::Delete, old_index: x, new_index: y });
            }
        }
    }

    edits.reverse();
    edits
}

/// Replay an edit script against `old` and `new`, reconstructing `new`.
///
/// Used by tests (and available to callers) to check an edit script is a
/// faithful transformation rather than merely the right shape.
pub fn apply<T: Clone>(old: &[T], new: &[T], edits: &[Edit]) -> Vec<T> {
    edits
        .iter()
        .filter(|e| e.op != EditOp::Delete)
        .map(|e| match e.op {
            EditOp::Equal => old[e.old_index].clone(),
            EditOp::Insert => new[e.new_index].clone(),
            EditOp::Delete => unreachable!(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical() {
        let a = vec!["a", "b", "c"];
        let b = vec!["a", "b", "c"];
        let edits = diff(&a, &b);
        assert!(edits.iter().all(|e| e.op == EditOp::Equal));
        assert_eq!(edits.len(), 3);
    }

    #[test]
    fn all_different() {
        let a = vec!["a", "b"];
        let b = vec!["c", "d"];
        let edits = diff(&a, &b);
        assert_eq!(edits.iter().filter(|e| e.op == EditOp::Delete).count(), 2);
        assert_eq!(edits.iter().filter(|e| e.op == EditOp::Insert).count(), 2);
    }

    #[test]
    fn insert_in_middle() {
        let a = vec![1, 2, 4];
        let b = vec![1, 2, 3, 4];
        let edits = diff(&a, &b);
        let inserts: Vec<_> = edits.iter().filter(|e| e.op == EditOp::Insert).collect();
        assert_eq!(inserts.len(), 1);
        assert_eq!(b[inserts[0].new_index], 3);
    }

    #[test]
    fn delete_from_middle() {
        let a = vec![1, 2, 3];
        let b = vec![1, 3];
        let edits = diff(&a, &b);
        assert_eq!(edits.iter().filter(|e| e.op == EditOp::Delete).count(), 1);
        assert_eq!(edits.iter().filter(|e| e.op == EditOp::Equal).count(), 2);
    }

    #[test]
    fn both_empty() {
        let a: Vec<i32> = vec![];
        let b: Vec<i32> = vec![];
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn apply_reconstructs_new() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 9, 3, 5, 6];
        let edits = diff(&a, &b);
        assert_eq!(apply(&a, &b, &edits), b);
    }

    proptest::proptest! {
        #[test]
        fn edit_script_reconstructs_new_sequence(
            old in proptest::collection::vec(0i32..6, 0..12),
            new in proptest::collection::vec(0i32..6, 0..12),
        ) {
            let edits = diff(&old, &new);
            let reconstructed = apply(&old, &new, &edits);
            proptest::prop_assert_eq!(reconstructed, new);
        }
    }
}
