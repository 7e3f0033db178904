//! multi-precision integer kernel
//!
//! Re-exports `crypto_bigint` and fills in the number-theoretic routines it
//! does not ship: Jacobi symbols, 2-adic decomposition and decimal
//! conversion.

pub use crypto_bigint::*;

use crate::error::{Error, Result};
use num_bigint::BigUint;

/// supplies uniform samples in [0, bound)
///
/// Every cryptographic RNG is a random source; tests can pass a seeded one to
/// make square-root extraction reproducible.
pub trait RandomSource<const LIMBS: usize> {
    fn sample_below(&mut self, bound: &NonZero<Uint<LIMBS>>) -> Uint<LIMBS>;
}

impl<R: ::rand_core::CryptoRngCore, const LIMBS: usize> RandomSource<LIMBS> for R {
    fn sample_below(&mut self, bound: &NonZero<Uint<LIMBS>>) -> Uint<LIMBS> {
        Uint::<LIMBS>::random_mod(self, bound)
    }
}

#[inline]
fn low_word<const LIMBS: usize>(n: &Uint<LIMBS>) -> Word {
    n.as_words()[0]
}

/// computes the Jacobi symbol (a/n) for an odd modulus n
///
/// The result is 0 when gcd(a, n) > 1, otherwise ±1. For a prime n it is
/// the Legendre symbol.
pub fn jacobi<const LIMBS: usize>(a: &Uint<LIMBS>, n: &Odd<Uint<LIMBS>>) -> i8 {
    let mut a = *a % *n.as_nz_ref();
    let mut n = n.get();
    let mut sign = 1i8;
    while a != Uint::ZERO {
        let twos = a.trailing_zeros();
        a = a >> twos;
        // (2/n) = -1 iff n = 3, 5 (mod 8)
        if twos % 2 == 1 && matches!(low_word(&n) & 7, 3 | 5) {
            sign = -sign;
        }
        // quadratic reciprocity, both a and n are odd here
        core::mem::swap(&mut a, &mut n);
        if low_word(&a) & 3 == 3 && low_word(&n) & 3 == 3 {
            sign = -sign;
        }
        let Some(modulus) = Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(n)) else {
            break;
        };
        a = a % modulus;
    }
    if n == Uint::ONE {
        sign
    } else {
        0
    }
}

/// splits n = q * 2^e with q odd, returning (q, e); zero maps to (0, 0)
pub fn two_adic_decomposition<const LIMBS: usize>(n: &Uint<LIMBS>) -> (Uint<LIMBS>, u32) {
    if *n == Uint::ZERO {
        return (Uint::ZERO, 0);
    }
    let e = n.trailing_zeros();
    (*n >> e, e)
}

/// computes n * factor + addend, or None on overflow
fn mul_add_word<const LIMBS: usize>(
    n: &Uint<LIMBS>,
    factor: Word,
    addend: Word,
) -> Option<Uint<LIMBS>> {
    let mut words = *n.as_words();
    let mut carry = addend as WideWord;
    for word in words.iter_mut() {
        let wide = *word as WideWord * factor as WideWord + carry;
        *word = wide as Word;
        carry = wide >> Word::BITS;
    }
    (carry == 0).then(|| Uint::from_words(words))
}

/// parses an unsigned decimal integer
///
/// Surrounding whitespace is ignored. Signs, separators and other characters
/// are rejected with [`Error::InvalidDecimal`]; values that do not fit in
/// `LIMBS` limbs are rejected with [`Error::OutOfRange`].
/// ```
/// use zp::math::gauss::{parse_decimal, U128};
///
/// let n: U128 = parse_decimal("19963065620013555197").unwrap();
/// assert_eq!(n, U128::from_u128(19963065620013555197));
/// ```
pub fn parse_decimal<const LIMBS: usize>(text: &str) -> Result<Uint<LIMBS>> {
    let digits = text.trim();
    if digits.is_empty() {
        return Err(Error::InvalidDecimal);
    }
    digits.chars().try_fold(Uint::ZERO, |acc, c| {
        let digit = c.to_digit(10).ok_or(Error::InvalidDecimal)?;
        mul_add_word(&acc, 10, digit as Word).ok_or(Error::OutOfRange)
    })
}

/// formats n in decimal
pub fn to_decimal<const LIMBS: usize>(n: &Uint<LIMBS>) -> String {
    let bytes: Vec<u8> = n.as_words().iter().flat_map(|word| word.to_le_bytes()).collect();
    BigUint::from_bytes_le(&bytes).to_string()
}

#[cfg(test)]
fn euler_criterion(a: u64, p: u64) -> i8 {
    let params = modular::MontyParams::new(Odd::new(U64::from_u64(p)).unwrap());
    let x = modular::MontyForm::new(&U64::from_u64(a), params);
    let e = x.pow(&U64::from_u64((p - 1) / 2)).retrieve();
    if e == U64::ZERO {
        0
    } else if e == U64::ONE {
        1
    } else {
        -1
    }
}

#[test]
fn test_jacobi_matches_euler_criterion() {
    for p in [3u64, 5, 7, 11, 13, 17, 23, 29, 97, 257, 65537] {
        let n = Odd::new(U64::from_u64(p)).unwrap();
        for a in 0..p {
            assert_eq!(
                jacobi(&U64::from_u64(a), &n),
                euler_criterion(a, p),
                "({a}/{p})"
            );
        }
    }
}

#[test]
fn test_jacobi_composite_modulus() {
    // (2/15) = (2/3)(2/5) = (-1)(-1)
    let n = Odd::new(U64::from_u64(15)).unwrap();
    assert_eq!(jacobi(&U64::from_u64(2), &n), 1);
    assert_eq!(jacobi(&U64::from_u64(7), &n), -1);
    assert_eq!(jacobi(&U64::from_u64(5), &n), 0);
    // a larger than n is reduced first
    assert_eq!(jacobi(&U64::from_u64(17), &n), 1);
}

#[test]
fn test_two_adic_decomposition() {
    assert_eq!(
        two_adic_decomposition(&U64::from_u64(16)),
        (U64::ONE, 4)
    );
    assert_eq!(
        two_adic_decomposition(&U64::from_u64(96)),
        (U64::from_u64(3), 5)
    );
    assert_eq!(two_adic_decomposition(&U64::from_u64(7)), (U64::from_u64(7), 0));
    assert_eq!(two_adic_decomposition(&U64::ZERO), (U64::ZERO, 0));
    // P-224: p - 1 = (2^128 - 1) * 2^96
    let p = U256::from_be_hex("00000000ffffffffffffffffffffffffffffffff000000000000000000000001");
    let (q, e) = two_adic_decomposition(&p.wrapping_sub(&U256::ONE));
    assert_eq!(e, 96);
    assert_eq!(q, U256::from_u128(u128::MAX));
}

#[test]
fn test_decimal_conversion() {
    assert_eq!(parse_decimal::<1>("0"), Ok(U64::ZERO));
    assert_eq!(parse_decimal::<1>(" 42\n"), Ok(U64::from_u64(42)));
    assert_eq!(
        parse_decimal::<1>("18446744073709551615"),
        Ok(U64::MAX)
    );
    assert_eq!(
        parse_decimal::<1>("18446744073709551616"),
        Err(Error::OutOfRange)
    );
    assert_eq!(parse_decimal::<1>(""), Err(Error::InvalidDecimal));
    assert_eq!(parse_decimal::<1>("-5"), Err(Error::InvalidDecimal));
    assert_eq!(parse_decimal::<1>("12a"), Err(Error::InvalidDecimal));

    assert_eq!(to_decimal(&U64::ZERO), "0");
    assert_eq!(to_decimal(&U64::MAX), "18446744073709551615");
    let big = "115792089237316195423570985008687907852837564279074904382605163141518161494337";
    assert_eq!(to_decimal(&parse_decimal::<4>(big).unwrap()), big);
}
