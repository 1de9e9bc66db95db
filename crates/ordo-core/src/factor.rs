//! Integer factorization: trial division, Miller-Rabin, Brent-Pollard rho.
//!
//! Discriminants of orders are the only inputs, so the routine favours
//! robustness over raw speed; randomness is drawn from a deterministic
//! [`RngHandle`] substream.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::RngCore;

use crate::errors::{ErrorInfo, OrdoError};
use crate::rng::{derive_substream_seed, RngHandle};

const FACTOR_SEED: u64 = 0x0d0_0001;

/// Factors `|n|` into primes with multiplicities. `n` must be non-zero.
pub fn factor(n: &BigInt) -> Result<BTreeMap<BigInt, u32>, OrdoError> {
    if n.is_zero() {
        return Err(OrdoError::Precondition(ErrorInfo::new(
            "factor-zero",
            "cannot factor zero",
        )));
    }
    let mut out = BTreeMap::new();
    let mut n = n.abs();
    if n.is_one() {
        return Ok(out);
    }
    // Trial division knocks out everything a discriminant usually carries.
    let mut d = BigInt::from(2);
    let limit = BigInt::from(10_000u32);
    while &d * &d <= n && d <= limit {
        while (&n % &d).is_zero() {
            *out.entry(d.clone()).or_insert(0) += 1;
            n = &n / &d;
        }
        d += 1;
    }
    if n.is_one() {
        return Ok(out);
    }
    let mut rng = RngHandle::from_seed(derive_substream_seed(FACTOR_SEED, low_bits(&n)));
    let mut stack = vec![n];
    while let Some(m) = stack.pop() {
        if m.is_one() {
            continue;
        }
        if is_probable_prime(&m, &mut rng) {
            *out.entry(m).or_insert(0) += 1;
            continue;
        }
        let divisor = pollard_rho(&m, &mut rng)?;
        let quotient = &m / &divisor;
        stack.push(divisor);
        stack.push(quotient);
    }
    Ok(out)
}

/// The `p`-adic valuation of `|n|` for non-zero `n`.
pub fn valuation(n: &BigInt, p: &BigInt) -> u32 {
    let mut n = n.abs();
    let mut v = 0;
    while !n.is_zero() && (&n % p).is_zero() {
        n = &n / p;
        v += 1;
    }
    v
}

fn low_bits(n: &BigInt) -> u64 {
    (n.magnitude() & num_bigint::BigUint::from(u64::MAX))
        .to_u64()
        .unwrap_or(0)
}

fn random_below(bound: &BigInt, rng: &mut RngHandle) -> BigInt {
    // Modulo bias is irrelevant here; these are probe values only.
    let bits = bound.bits() as usize;
    let bytes = bits / 8 + 1;
    let mut buf = vec![0u8; bytes];
    rng.fill_bytes(&mut buf);
    let v = BigInt::from_bytes_be(num_bigint::Sign::Plus, &buf);
    v % bound
}

/// Miller-Rabin with 32 random bases; deterministic inputs give
/// deterministic verdicts through the seeded handle.
pub fn is_probable_prime(n: &BigInt, rng: &mut RngHandle) -> bool {
    let two = BigInt::from(2);
    if n < &two {
        return false;
    }
    for small in [2u32, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let s = BigInt::from(small);
        if *n == s {
            return true;
        }
        if (n % &s).is_zero() {
            return false;
        }
    }
    let n_minus_1 = n - BigInt::one();
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d = &d / &two;
        r += 1;
    }
    'witness: for _ in 0..32 {
        let a = random_below(&(n - BigInt::from(4)), rng) + &two;
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn pollard_rho(n: &BigInt, rng: &mut RngHandle) -> Result<BigInt, OrdoError> {
    let two = BigInt::from(2);
    if n.is_even() {
        return Ok(two);
    }
    for _ in 0..64 {
        let c = random_below(n, rng) + BigInt::one();
        let mut x = random_below(n, rng);
        let mut y = x.clone();
        let mut d = BigInt::one();
        let mut steps = 0u64;
        while d.is_one() && steps < 1 << 22 {
            x = (&x * &x + &c) % n;
            y = (&y * &y + &c) % n;
            y = (&y * &y + &c) % n;
            let diff = (&x - &y).abs();
            if diff.is_zero() {
                break;
            }
            d = diff.gcd(n);
            steps += 1;
        }
        if !d.is_one() && &d != n {
            return Ok(d);
        }
    }
    Err(OrdoError::Matrix(
        ErrorInfo::new("factorization-stalled", "pollard rho failed to split composite")
            .with_context("n_bits", n.bits().to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn factors_small_composites() {
        let f = factor(&big(-360)).unwrap();
        assert_eq!(f.get(&big(2)), Some(&3));
        assert_eq!(f.get(&big(3)), Some(&2));
        assert_eq!(f.get(&big(5)), Some(&1));
    }

    #[test]
    fn factors_semiprime_beyond_trial_range() {
        let p = big(104_729); // prime
        let q = big(130_043); // prime
        let f = factor(&(&p * &q)).unwrap();
        assert_eq!(f.get(&p), Some(&1));
        assert_eq!(f.get(&q), Some(&1));
    }

    #[test]
    fn valuation_counts_powers() {
        assert_eq!(valuation(&big(-48), &big(2)), 4);
        assert_eq!(valuation(&big(-48), &big(3)), 1);
        assert_eq!(valuation(&big(7), &big(5)), 0);
    }

    #[test]
    fn zero_is_rejected() {
        let err = factor(&big(0)).unwrap_err();
        assert_eq!(err.info().code, "factor-zero");
    }
}
