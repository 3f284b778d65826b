//! Category algebra: a bitset describing the kinds of change a diff node
//! carries, plus the total set of bitwise operators the rest of the engine
//! needs (union, intersection, symmetric difference, complement,
//! subtraction).
//!
//! Bit positions match `abg-comparison.h`'s `diff_category` enum so that a
//! report produced here orders its "enumerate set bits" output the same way
//! a libabigail-compatible reader would expect.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not, Sub};

/// A bitset of change categories carried by a diff node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Category(u32);

impl Category {
    /// No (meaningful) change, or not yet categorized.
    pub const NO_CHANGE: Category = Category(0);
    /// Access (public/protected/private) changed somewhere in the subtree.
    pub const ACCESS: Category = Category(1 << 0);
    /// A change between two compatible types (e.g. a type and its typedef).
    pub const COMPATIBLE_TYPE: Category = Category(1 << 1);
    /// A harmless declaration name change (data member or typedef rename).
    pub const HARMLESS_DECL_NAME: Category = Category(1 << 2);
    /// Addition or removal of a non-virtual member function.
    pub const NON_VIRTUAL_MEMBER_FUNCTION: Category = Category(1 << 3);
    /// Addition or removal of a static data member.
    pub const STATIC_DATA_MEMBER: Category = Category(1 << 4);
    /// Addition of an enumerator to an enum type.
    pub const HARMLESS_ENUM: Category = Category(1 << 5);
    /// A harmless symbol-alias change.
    pub const HARMLESS_SYMBOL_ALIAS: Category = Category(1 << 6);
    /// Suppressed by a user-provided suppression specification.
    pub const SUPPRESSED: Category = Category(1 << 7);
    /// A change to the size of a type, or the offset of a member.
    pub const SIZE_OR_OFFSET: Category = Category(1 << 8);
    /// A change to a vtable / virtual member function.
    pub const VIRTUAL_MEMBER: Category = Category(1 << 9);
    /// Already reachable through a sibling path; elided from the report.
    pub const REDUNDANT: Category = Category(1 << 10);

    const NAMED: &'static [(Category, &'static str)] = &[
        (Category::ACCESS, "access-change"),
        (Category::COMPATIBLE_TYPE, "compatible-type-change"),
        (Category::HARMLESS_DECL_NAME, "harmless-decl-name-change"),
        (Category::NON_VIRTUAL_MEMBER_FUNCTION, "non-virtual-member-function-change"),
        (Category::STATIC_DATA_MEMBER, "static-data-member-change"),
        (Category::HARMLESS_ENUM, "harmless-enum-change"),
        (Category::HARMLESS_SYMBOL_ALIAS, "harmless-symbol-alias-change"),
        (Category::SUPPRESSED, "suppressed"),
        (Category::SIZE_OR_OFFSET, "size-or-offset-change"),
        (Category::VIRTUAL_MEMBER, "virtual-member-change"),
        (Category::REDUNDANT, "redundant"),
    ];

    /// Union of the categories a default CLI run hides (spec.md §8 scenario
    /// 6's "with default category mask, HARMLESS-DECL-NAME is suppressed"):
    /// changes judged unlikely to break callers. `ALL` itself defaults to
    /// showing everything; a front end that wants the traditional
    /// quieter-by-default behavior starts from `ALL - HARMLESS` instead.
    pub const HARMLESS: Category = Category(
        Category::COMPATIBLE_TYPE.0
            | Category::HARMLESS_DECL_NAME.0
            | Category::NON_VIRTUAL_MEMBER_FUNCTION.0
            | Category::STATIC_DATA_MEMBER.0
            | Category::HARMLESS_ENUM.0
            | Category::HARMLESS_SYMBOL_ALIAS.0,
    );

    /// Union of every non-[`Category::NO_CHANGE`] bit.
    pub const ALL: Category = Category(
        Category::ACCESS.0
            | Category::COMPATIBLE_TYPE.0
            | Category::HARMLESS_DECL_NAME.0
            | Category::NON_VIRTUAL_MEMBER_FUNCTION.0
            | Category::STATIC_DATA_MEMBER.0
            | Category::HARMLESS_ENUM.0
            | Category::HARMLESS_SYMBOL_ALIAS.0
            | Category::SUPPRESSED.0
            | Category::SIZE_OR_OFFSET.0
            | Category::VIRTUAL_MEMBER.0
            | Category::REDUNDANT.0,
    );

    /// Build a category set from raw bits (no validation — unknown bits are
    /// preserved so a future category can be added without breaking callers
    /// who round-trip through `bits`/`from_bits`).
    pub const fn from_bits(bits: u32) -> Self {
        Category(bits)
    }

    /// The raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if this set has no bits in common with `NO_CHANGE`'s absence,
    /// i.e. at least one category bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if `self` contains every bit of `other`.
    pub fn contains(self, other: Category) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if `self` and `other` share at least one bit.
    pub fn intersects(self, other: Category) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Category) -> Category {
        Category(self.0 | other.0)
    }

    pub fn intersection(self, other: Category) -> Category {
        Category(self.0 & other.0)
    }

    pub fn symmetric_difference(self, other: Category) -> Category {
        Category(self.0 ^ other.0)
    }

    /// Complement relative to [`Category::ALL`] (bits outside `ALL` are
    /// never meaningful, so they are dropped rather than set).
    pub fn complement(self) -> Category {
        Category(!self.0 & Category::ALL.0)
    }

    /// `self` with every bit of `other` cleared.
    pub fn subtraction(self, other: Category) -> Category {
        Category(self.0 & !other.0)
    }

    /// Insert `other`'s bits in place.
    pub fn insert(&mut self, other: Category) {
        self.0 |= other.0;
    }

    /// Clear `other`'s bits in place.
    pub fn remove(&mut self, other: Category) {
        self.0 &= !other.0;
    }

    /// Iterate the named bits set in this category, in declaration order.
    pub fn iter_names(self) -> impl Iterator<Item = &'static str> {
        Category::NAMED
            .iter()
            .filter(move |(cat, _)| self.intersects(*cat))
            .map(|(_, name)| *name)
    }
}

impl BitOr for Category {
    type Output = Category;
    fn bitor(self, rhs: Category) -> Category {
        self.union(rhs)
    }
}

impl BitAnd for Category {
    type Output = Category;
    fn bitand(self, rhs: Category) -> Category {
        self.intersection(rhs)
    }
}

impl BitXor for Category {
    type Output = Category;
    fn bitxor(self, rhs: Category) -> Category {
        self.symmetric_difference(rhs)
    }
}

impl Not for Category {
    type Output = Category;
    fn not(self) -> Category {
        self.complement()
    }
}

impl Sub for Category {
    type Output = Category;
    fn sub(self, rhs: Category) -> Category {
        self.subtraction(rhs)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no-change");
        }
        let names: Vec<&str> = self.iter_names().collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_named_bit() {
        for (cat, _) in Category::NAMED {
            assert!(Category::ALL.contains(*cat));
        }
    }

    #[test]
    fn union_and_intersection() {
        let a = Category::ACCESS | Category::SIZE_OR_OFFSET;
        let b = Category::SIZE_OR_OFFSET | Category::REDUNDANT;
        assert_eq!(a & b, Category::SIZE_OR_OFFSET);
        assert_eq!(
            a | b,
            Category::ACCESS | Category::SIZE_OR_OFFSET | Category::REDUNDANT
        );
    }

    #[test]
    fn complement_is_relative_to_all() {
        let c = Category::complement(Category::ALL);
        assert_eq!(c, Category::NO_CHANGE);
        let c2 = (!Category::ACCESS) & Category::ALL;
        assert!(!c2.contains(Category::ACCESS));
        assert!(c2.contains(Category::REDUNDANT));
    }

    #[test]
    fn subtraction_clears_bits() {
        let a = Category::ACCESS | Category::REDUNDANT | Category::SUPPRESSED;
        let b = a - (Category::REDUNDANT | Category::SUPPRESSED);
        assert_eq!(b, Category::ACCESS);
    }

    #[test]
    fn display_lists_names_in_order() {
        let c = Category::REDUNDANT | Category::ACCESS;
        assert_eq!(c.to_string(), "access-change, redundant");
    }

    #[test]
    fn display_no_change() {
        assert_eq!(Category::NO_CHANGE.to_string(), "no-change");
    }

    #[test]
    fn harmless_excludes_access_and_size_changes() {
        assert!(!Category::HARMLESS.contains(Category::ACCESS));
        assert!(!Category::HARMLESS.contains(Category::SIZE_OR_OFFSET));
        assert!(!Category::HARMLESS.contains(Category::VIRTUAL_MEMBER));
        assert!(Category::HARMLESS.contains(Category::HARMLESS_DECL_NAME));
    }
}
