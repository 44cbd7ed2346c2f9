//! Cyclic group descriptions and their validation.
//!
//! A [`GroupSpec`] names the multiplicative group `(Z/pZ)*` of a prime `p`
//! together with one known generator ("root") and the prime factors of the
//! group order `p - 1`. Validation checks that all three agree.

#[cfg(feature = "serde")]
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use log::debug;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::utils::is_probable_prime;

/// Error type for group validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The modulus failed the primality test.
    NotPrime { modulus: BigUint },
    /// A claimed order factor does not divide `p - 1`.
    FactorMismatch { factor: BigUint, order: BigUint },
    /// The element generates only the subgroup of order `(p - 1) / factor`.
    NotAGenerator { element: BigUint, factor: BigUint },
    /// The element is `0 (mod p)` and not a member of `(Z/pZ)*` at all.
    NotInGroup { element: BigUint },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotPrime { modulus } => write!(f, "not prime: {}", modulus),
            ValidationError::FactorMismatch { factor, order } => {
                write!(f, "{} is not a factor of the group order {}", factor, order)
            }
            ValidationError::NotAGenerator { element, factor } => write!(
                f,
                "{} is not a generator: it lies in the subgroup of index {}",
                element, factor
            ),
            ValidationError::NotInGroup { element } => {
                write!(f, "{} is not an element of the multiplicative group", element)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

/// An immutable description of the cyclic group `(Z/pZ)*`.
///
/// Holds the prime modulus `p`, a known generator `root` of order `p - 1`,
/// and the prime factors of `p - 1`. Factors may repeat and are not
/// required to multiply back to `p - 1`; each only has to divide it.
///
/// Specs are plain data and are `Send + Sync`, so one spec can back any
/// number of iterators on any number of threads.
///
/// # Example
///
/// ```
/// use cyclo::GroupSpec;
/// use num_bigint::BigUint;
///
/// let spec = GroupSpec::new(
///     BigUint::from(23u32),
///     BigUint::from(5u32),
///     vec![BigUint::from(2u32), BigUint::from(11u32)],
/// )
/// .unwrap();
/// assert_eq!(spec.order(), BigUint::from(22u32));
///
/// // 2 has order 11 mod 23, so it cannot be the root
/// let bad = GroupSpec::new(
///     BigUint::from(23u32),
///     BigUint::from(2u32),
///     vec![BigUint::from(2u32), BigUint::from(11u32)],
/// );
/// assert!(bad.is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GroupSpecRecord", into = "GroupSpecRecord")
)]
pub struct GroupSpec {
    modulus: BigUint,
    root: BigUint,
    order_factors: Vec<BigUint>,
}

impl GroupSpec {
    /// Create a new group description and validate it.
    ///
    /// # Errors
    ///
    /// Returns the first failing check of [`GroupSpec::validate`].
    pub fn new(
        modulus: BigUint,
        root: BigUint,
        order_factors: Vec<BigUint>,
    ) -> Result<Self, ValidationError> {
        let spec = Self::new_unchecked(modulus, root, order_factors);
        spec.validate()?;
        Ok(spec)
    }

    /// Create a group description without validating it.
    ///
    /// Call [`GroupSpec::validate`] before iterating over a spec built this
    /// way; iterators assume a valid spec.
    pub fn new_unchecked(modulus: BigUint, root: BigUint, order_factors: Vec<BigUint>) -> Self {
        Self {
            modulus,
            root,
            order_factors,
        }
    }

    /// The prime modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The known generator of the multiplicative group.
    pub fn root(&self) -> &BigUint {
        &self.root
    }

    /// The claimed prime factors of `p - 1`.
    pub fn order_factors(&self) -> &[BigUint] {
        &self.order_factors
    }

    /// The order of the multiplicative group, `p - 1`.
    pub fn order(&self) -> BigUint {
        if self.modulus.is_zero() {
            return BigUint::zero();
        }
        &self.modulus - BigUint::one()
    }

    /// Check that the spec is well-defined.
    ///
    /// In order:
    /// 1. `p` passes the probabilistic primality test.
    /// 2. Every order factor divides `p - 1`.
    /// 3. The root is a nonzero residue not confined to any subgroup, i.e.
    ///    `root^((p - 1) / f) != 1` for every factor `f`.
    ///
    /// Validation takes `&self` and has no side effects, so re-validating an
    /// already valid spec always succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotPrime`, `ValidationError::FactorMismatch`,
    /// `ValidationError::NotInGroup` or `ValidationError::NotAGenerator` for
    /// the first failing check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_probable_prime(&self.modulus) {
            debug!("rejecting group: modulus {} is not prime", self.modulus);
            return Err(ValidationError::NotPrime {
                modulus: self.modulus.clone(),
            });
        }

        let order = self.order();
        for factor in &self.order_factors {
            if factor.is_zero() || !order.is_multiple_of(factor) {
                debug!("rejecting group: {} does not divide {}", factor, order);
                return Err(ValidationError::FactorMismatch {
                    factor: factor.clone(),
                    order,
                });
            }
        }

        self.check_generator(&self.root)
    }

    /// Check that `element` generates the whole multiplicative group.
    ///
    /// An element generates the group unless it lies in a proper subgroup,
    /// and every maximal subgroup has order `(p - 1) / f` for a prime factor
    /// `f` of `p - 1`. So `element` is a generator iff
    /// `element^((p - 1) / f) != 1 (mod p)` for every order factor.
    ///
    /// The answer is only as complete as the factor list: a factor missing
    /// from the spec is a subgroup that is never excluded.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotInGroup` if `element` is `0 (mod p)`
    /// (or `p` is zero), and `ValidationError::NotAGenerator` naming the
    /// first factor whose subgroup contains `element`.
    pub fn check_generator(&self, element: &BigUint) -> Result<(), ValidationError> {
        // 0^k is never 1, so zero would slip through the subgroup test
        if self.modulus.is_zero() || (element % &self.modulus).is_zero() {
            return Err(ValidationError::NotInGroup {
                element: element.clone(),
            });
        }

        let order = self.order();
        for factor in &self.order_factors {
            if factor.is_zero() {
                continue;
            }
            let subgroup_order = &order / factor;
            if element.modpow(&subgroup_order, &self.modulus).is_one() {
                return Err(ValidationError::NotAGenerator {
                    element: element.clone(),
                    factor: factor.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Z/{}Z)* with root {}", self.modulus, self.root)
    }
}

// ============================================================================
// Serialized form
// ============================================================================

/// Error type for decoding a [`GroupSpecRecord`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecParseError {
    field: &'static str,
    text: String,
}

#[cfg(feature = "serde")]
impl fmt::Display for SpecParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a decimal integer: {:?}", self.field, self.text)
    }
}

#[cfg(all(feature = "serde", feature = "std"))]
impl std::error::Error for SpecParseError {}

/// A self-contained, serializable form of [`GroupSpec`].
///
/// Integers are stored as decimal strings so that moduli of any size survive
/// formats like JSON. `GroupSpec` serializes through this record.
///
/// Decoding parses the integers but does NOT validate the group; call
/// [`GroupSpec::validate`] on the result.
///
/// # Example
///
/// ```
/// use cyclo::GroupSpec;
///
/// let json = r#"{"modulus":"257","root":"3","order_factors":["2"]}"#;
/// let spec: GroupSpec = serde_json::from_str(json).unwrap();
/// assert!(spec.validate().is_ok());
/// assert_eq!(serde_json::to_string(&spec).unwrap(), json);
/// ```
#[cfg(feature = "serde")]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupSpecRecord {
    pub modulus: String,
    pub root: String,
    pub order_factors: Vec<String>,
}

#[cfg(feature = "serde")]
impl GroupSpecRecord {
    /// Create from a spec.
    pub fn from_spec(spec: &GroupSpec) -> Self {
        Self {
            modulus: spec.modulus.to_string(),
            root: spec.root.to_string(),
            order_factors: spec.order_factors.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Parse back into an (unvalidated) spec.
    ///
    /// # Errors
    ///
    /// Returns `SpecParseError` naming the first field that is not a
    /// decimal integer.
    pub fn to_spec(&self) -> Result<GroupSpec, SpecParseError> {
        fn parse(field: &'static str, text: &str) -> Result<BigUint, SpecParseError> {
            let err = || SpecParseError {
                field,
                text: text.to_string(),
            };
            // `BigUint::from_str` also accepts a sign and `_` separators.
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            text.parse().map_err(|_| err())
        }

        let modulus = parse("modulus", &self.modulus)?;
        let root = parse("root", &self.root)?;
        let order_factors = self
            .order_factors
            .iter()
            .map(|f| parse("order_factors", f))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GroupSpec::new_unchecked(modulus, root, order_factors))
    }
}

#[cfg(feature = "serde")]
impl From<GroupSpec> for GroupSpecRecord {
    fn from(spec: GroupSpec) -> Self {
        Self::from_spec(&spec)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<GroupSpecRecord> for GroupSpec {
    type Error = SpecParseError;

    fn try_from(record: GroupSpecRecord) -> Result<Self, Self::Error> {
        record.to_spec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn spec(p: u64, root: u64, factors: &[u64]) -> GroupSpec {
        GroupSpec::new_unchecked(
            BigUint::from(p),
            BigUint::from(root),
            factors.iter().map(|&f| BigUint::from(f)).collect(),
        )
    }

    const FACTORS_2_32_15: [u64; 5] = [2, 3, 5, 131, 364289];

    #[test]
    fn valid_small_group() {
        assert!(spec(23, 5, &[2, 11]).validate().is_ok());
        assert!(spec(17, 3, &[2]).validate().is_ok());
    }

    #[test]
    fn not_prime() {
        let err = spec(4294967303, 3, &FACTORS_2_32_15).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotPrime {
                modulus: BigUint::from(4294967303u64)
            }
        );
    }

    #[test]
    fn factor_mismatch() {
        let mut factors = vec![7u64];
        factors.extend_from_slice(&FACTORS_2_32_15);
        let err = spec(4294967311, 3, &factors).validate().unwrap_err();
        match err {
            ValidationError::FactorMismatch { factor, order } => {
                assert_eq!(factor, BigUint::from(7u8));
                assert_eq!(order, BigUint::from(4294967310u64));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn zero_factor_is_mismatch() {
        let err = spec(23, 5, &[0, 2]).validate().unwrap_err();
        assert!(matches!(err, ValidationError::FactorMismatch { .. }));
    }

    #[test]
    fn not_a_generator() {
        let err = spec(4294967311, 30, &FACTORS_2_32_15).validate().unwrap_err();
        assert!(matches!(err, ValidationError::NotAGenerator { .. }));

        // 2 has order 8 mod 17
        let err = spec(17, 2, &[2]).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAGenerator {
                element: BigUint::from(2u8),
                factor: BigUint::from(2u8),
            }
        );
    }

    #[test]
    fn zero_root_is_rejected() {
        for root in [0u64, 257, 514] {
            let err = spec(257, root, &[2]).validate().unwrap_err();
            assert_eq!(
                err,
                ValidationError::NotInGroup {
                    element: BigUint::from(root)
                }
            );
        }
        assert!(GroupSpec::new(
            BigUint::from(257u32),
            BigUint::zero(),
            vec![BigUint::from(2u8)]
        )
        .is_err());
        // p + 3 is the residue 3
        assert!(spec(257, 260, &[2]).validate().is_ok());
    }

    #[test]
    fn check_generator_rejects_zero() {
        let s = spec(23, 5, &[2, 11]);
        assert!(matches!(
            s.check_generator(&BigUint::zero()),
            Err(ValidationError::NotInGroup { .. })
        ));
        assert!(s.check_generator(&BigUint::from(46u8)).is_err());

        // Degenerate moduli return an error instead of panicking
        let zero = spec(0, 3, &[2]);
        assert!(zero.check_generator(&BigUint::from(3u8)).is_err());
        let one = spec(1, 3, &[2]);
        assert!(one.check_generator(&BigUint::from(3u8)).is_err());
    }

    #[test]
    fn checks_run_in_order() {
        // Composite modulus with a bad factor and a bad root: primality wins.
        let err = spec(15, 4, &[7]).validate().unwrap_err();
        assert!(matches!(err, ValidationError::NotPrime { .. }));

        // Prime modulus with a bad factor and a bad root: factors win.
        let err = spec(17, 2, &[2, 3]).validate().unwrap_err();
        assert!(matches!(err, ValidationError::FactorMismatch { .. }));
    }

    #[test]
    fn duplicate_factors_accepted() {
        assert!(spec(17, 3, &[2, 2, 2, 2]).validate().is_ok());
        assert!(spec(23, 5, &[11, 2, 11]).validate().is_ok());
    }

    #[test]
    fn incomplete_factorization_accepted() {
        // 2 has order 11 mod 23; without 2 in the list nothing excludes it.
        assert!(spec(23, 2, &[11]).validate().is_ok());
        assert!(spec(23, 2, &[2, 11]).validate().is_err());
    }

    #[test]
    fn validation_is_idempotent() {
        let s = spec(4294967311, 3, &FACTORS_2_32_15);
        for _ in 0..3 {
            assert!(s.validate().is_ok());
        }
        assert_eq!(s, spec(4294967311, 3, &FACTORS_2_32_15));
    }

    #[test]
    fn check_generator_on_candidates() {
        let s = spec(23, 5, &[2, 11]);
        // The primitive roots mod 23
        for g in [5u32, 7, 10, 11, 14, 15, 17, 19, 20, 21] {
            assert!(s.check_generator(&BigUint::from(g)).is_ok(), "{}", g);
        }
        for g in [1u32, 2, 3, 4, 6, 8, 9, 12, 13, 16, 18, 22] {
            assert!(s.check_generator(&BigUint::from(g)).is_err(), "{}", g);
        }
    }

    #[test]
    fn new_validates() {
        assert!(GroupSpec::new(
            BigUint::from(257u32),
            BigUint::from(3u32),
            vec![BigUint::from(2u32)]
        )
        .is_ok());
        assert!(GroupSpec::new(
            BigUint::from(256u32),
            BigUint::from(3u32),
            vec![BigUint::from(2u32)]
        )
        .is_err());
    }

    #[test]
    fn display() {
        assert_eq!(spec(257, 3, &[2]).to_string(), "(Z/257Z)* with root 3");
        let err = spec(21, 2, &[2]).validate().unwrap_err();
        assert_eq!(err.to_string(), "not prime: 21");
    }
}
