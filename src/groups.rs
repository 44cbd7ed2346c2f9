//! Built-in table of known-good groups.
//!
//! One group per common address-space width, each with a prime modulus just
//! above `2^bits`. The table is plain constant data. Nothing here is trusted
//! implicitly: [`KnownGroup::spec`] returns an unvalidated [`GroupSpec`] that
//! goes through [`GroupSpec::validate`] like any other input.

use num_bigint::BigUint;

use crate::algebra::group::GroupSpec;

/// A group description stored as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownGroup {
    /// Width of the address space the group covers.
    pub bits: u32,
    /// Prime modulus, the smallest prime above `2^bits`.
    pub modulus: u64,
    /// A primitive root mod `modulus`.
    pub root: u64,
    /// The prime factors of `modulus - 1`.
    pub order_factors: &'static [u64],
}

impl KnownGroup {
    /// Build the (unvalidated) [`GroupSpec`] for this entry.
    pub fn spec(&self) -> GroupSpec {
        GroupSpec::new_unchecked(
            BigUint::from(self.modulus),
            BigUint::from(self.root),
            self.order_factors.iter().map(|&f| BigUint::from(f)).collect(),
        )
    }

    /// Number of elements a full walk over this group emits, `p - 1`.
    pub const fn period(&self) -> u64 {
        self.modulus - 1
    }
}

/// 2^8 + 1
pub const GROUP_8: KnownGroup = KnownGroup {
    bits: 8,
    modulus: 257,
    root: 3,
    order_factors: &[2],
};

/// 2^16 + 1
pub const GROUP_16: KnownGroup = KnownGroup {
    bits: 16,
    modulus: 65537,
    root: 3,
    order_factors: &[2],
};

/// 2^24 + 43
pub const GROUP_24: KnownGroup = KnownGroup {
    bits: 24,
    modulus: 16777259,
    root: 2,
    order_factors: &[2, 23, 103, 3541],
};

/// 2^28 + 3
pub const GROUP_28: KnownGroup = KnownGroup {
    bits: 28,
    modulus: 268435459,
    root: 2,
    order_factors: &[2, 3, 19, 87211],
};

/// 2^32 + 15
pub const GROUP_32: KnownGroup = KnownGroup {
    bits: 32,
    modulus: 4294967311,
    root: 3,
    order_factors: &[2, 3, 5, 131, 364289],
};

/// All built-in groups, ordered by size.
pub static KNOWN_GROUPS: [KnownGroup; 5] = [GROUP_8, GROUP_16, GROUP_24, GROUP_28, GROUP_32];

/// Look up the built-in group for an address-space width.
pub fn by_bits(bits: u32) -> Option<&'static KnownGroup> {
    KNOWN_GROUPS.iter().find(|g| g.bits == bits)
}

/// The smallest built-in group whose walk emits at least `count` elements.
///
/// A walk over a group of modulus `p` emits `1..p`, so a consumer that maps
/// those onto `count` targets (and skips the excess) needs `p - 1 >= count`.
///
/// # Example
///
/// ```
/// use cyclo::groups::{smallest_covering, GROUP_16, GROUP_8};
///
/// assert_eq!(smallest_covering(200), Some(&GROUP_8));
/// assert_eq!(smallest_covering(257), Some(&GROUP_16));
/// assert_eq!(smallest_covering(1 << 40), None);
/// ```
pub fn smallest_covering(count: u64) -> Option<&'static KnownGroup> {
    KNOWN_GROUPS.iter().find(|g| g.period() >= count)
}
