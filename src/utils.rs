use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Number of Miller-Rabin rounds run by [`is_probable_prime`].
pub const MILLER_RABIN_ROUNDS: usize = 32;

/// The first 32 primes. Used both for trial division and as the
/// Miller-Rabin witness set.
const WITNESSES: [u32; MILLER_RABIN_ROUNDS] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131,
];

/// Check if `n` is (very probably) prime.
///
/// Rejects multiples of the first 32 primes by trial division, then runs
/// [`MILLER_RABIN_ROUNDS`] rounds of Miller-Rabin using those same primes
/// as witnesses. The result is exact for every `n < 3.3 * 10^24`, and for
/// larger inputs a composite passes only if it is a strong pseudoprime to
/// all 32 bases.
///
/// # Example
///
/// ```
/// use cyclo::is_probable_prime;
/// use num_bigint::BigUint;
///
/// assert!(is_probable_prime(&BigUint::from(4294967311u64)));
/// assert!(!is_probable_prime(&BigUint::from(4294967303u64)));
/// ```
pub fn is_probable_prime(n: &BigUint) -> bool {
    if *n < BigUint::from(2u8) {
        return false;
    }

    for &p in WITNESSES.iter() {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    miller_rabin(n)
}

/// Miller-Rabin over the fixed witness set.
///
/// Assumes `n` is odd and larger than every witness.
fn miller_rabin(n: &BigUint) -> bool {
    let n_minus_one = n - BigUint::one();

    // n - 1 = d * 2^s with d odd
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for &a in WITNESSES.iter() {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trial division up to sqrt(n).
    const fn is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n == 2 {
            return true;
        }
        if n % 2 == 0 {
            return false;
        }

        let mut i = 3;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 2;
        }
        true
    }

    fn probable(n: u64) -> bool {
        is_probable_prime(&BigUint::from(n))
    }

    #[test]
    fn small_primes() {
        assert!(!probable(0));
        assert!(!probable(1));
        assert!(probable(2));
        assert!(probable(3));
        assert!(!probable(4));
        assert!(probable(5));
        assert!(!probable(9));
        assert!(probable(131));
        assert!(probable(137));
    }

    #[test]
    fn matches_trial_division() {
        for n in 0u64..20_000 {
            assert_eq!(probable(n), is_prime(n), "disagreement at {}", n);
        }
    }

    #[test]
    fn known_group_moduli() {
        for p in [257u64, 65537, 16777259, 268435459, 4294967311] {
            assert!(probable(p), "{} should be prime", p);
        }
        assert!(!probable(4294967303));
    }

    #[test]
    fn strong_pseudoprimes_rejected() {
        // Strong pseudoprime to bases 2, 3, 5 and 7, with no factor below 131.
        assert!(!probable(3215031751));
        // Carmichael numbers
        assert!(!probable(561));
        assert!(!probable(41041));
        assert!(!probable(825265));
    }

    #[test]
    fn large_primes() {
        // 2^61 - 1
        assert!(probable(2305843009213693951));
        // 2^127 - 1
        let m127 = (BigUint::one() << 127u32) - BigUint::one();
        assert!(is_probable_prime(&m127));
        // (2^61 - 1)^2
        let square = BigUint::from(2305843009213693951u64).pow(2u32);
        assert!(!is_probable_prime(&square));
    }
}
