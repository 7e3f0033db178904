//! square roots in prime fields
//!
//! Primes p = 3 (mod 4) take the direct route x = v^((p+1)/4). All other odd
//! primes go through Tonelli-Shanks, which needs a quadratic non-residue that
//! is found by random search.

use super::{
    primefield::{FieldElement, PrimeField},
    Legendre,
};
use crate::error::{Error, InvariantKind, Result};
use crate::math::gauss::{modular::MontyForm, two_adic_decomposition, RandomSource, Uint};
use log::{debug, error, trace};

/// the non-residue search gives up after this many draws per bit of p
pub const NON_RESIDUE_ATTEMPTS_PER_BIT: u32 = 10;

/// draws random elements until one is a quadratic non-residue
///
/// Half of the nonzero elements qualify, so about two draws are expected.
pub fn find_non_residue<const LIMBS: usize>(
    field: &PrimeField<LIMBS>,
    rng: &mut impl RandomSource<LIMBS>,
) -> Result<FieldElement<LIMBS>> {
    let attempts = NON_RESIDUE_ATTEMPTS_PER_BIT * field.modulus().bits();
    for attempt in 1..=attempts {
        let candidate = field.random(rng);
        if candidate.legendre() == Legendre::NonResidue {
            debug!("found non-residue {candidate} after {attempt} draws");
            return Ok(candidate);
        }
    }
    error!("no non-residue of {field} within {attempts} draws");
    Err(Error::InternalInvariantViolation(
        InvariantKind::NonResidueSearchExhausted,
    ))
}

/// smallest m in [1, r) with b^(2^m) = 1
fn order_exponent<const LIMBS: usize>(b: MontyForm<LIMBS>, r: u32) -> Option<u32> {
    let one = MontyForm::one(*b.params());
    let mut power = b;
    (1..r).find(|_| {
        power = power * power;
        power == one
    })
}

impl<const LIMBS: usize> FieldElement<LIMBS> {
    /// a square root of this number, or None for a non-residue
    ///
    /// Of the two roots x and p - x the smaller one is returned, so the result
    /// does not depend on `rng`; it is cached after the first success. Zero is
    /// its own root.
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use zp::math::{gauss::U64, PrimeField};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let field = PrimeField::new(U64::from_u64(17)).unwrap();
    /// let nine = field.lift_i64(9).unwrap();
    /// let root = nine.sqrt(&mut rng).unwrap().unwrap();
    /// assert_eq!(root.value(), U64::from_u64(3));
    /// assert_eq!(&root * &root, nine);
    /// assert!(field.lift_i64(3).unwrap().sqrt(&mut rng).unwrap().is_none());
    /// ```
    pub fn sqrt(&self, rng: &mut impl RandomSource<LIMBS>) -> Result<Option<Self>> {
        if let Some(root) = self.root.get() {
            return Ok(root.map(Self::from_monty));
        }
        let root = self.compute_sqrt(rng)?.map(|x| {
            let y = -x;
            if y.retrieve() < x.retrieve() {
                y
            } else {
                x
            }
        });
        // a concurrent caller may have stored the same root already
        let _ = self.root.set(root);
        Ok(root.map(Self::from_monty))
    }

    /// true if this number has a square root, zero included
    pub fn is_square(&self) -> bool {
        self.is_zero() || self.is_residue()
    }

    fn compute_sqrt(
        &self,
        rng: &mut impl RandomSource<LIMBS>,
    ) -> Result<Option<MontyForm<LIMBS>>> {
        if self.is_zero() {
            return Ok(Some(self.value));
        }
        if self.legendre() != Legendre::Residue {
            return Ok(None);
        }
        let modulus = self.modulus();
        if modulus.as_words()[0] & 3 == 3 {
            // p = 4k + 3, so (p + 1) / 4 = k + 1
            let exponent = (modulus >> 2u32).wrapping_add(&Uint::ONE);
            return Ok(Some(self.value.pow(&exponent)));
        }
        self.tonelli_shanks(rng).map(Some)
    }

    fn tonelli_shanks(&self, rng: &mut impl RandomSource<LIMBS>) -> Result<MontyForm<LIMBS>> {
        let (q, e) = two_adic_decomposition(&self.modulus().wrapping_sub(&Uint::ONE));
        let generator = find_non_residue(&self.field(), rng)?;
        let one = MontyForm::one(*self.value.params());

        let mut y = generator.value.pow(&q);
        // q is odd, so (q - 1) / 2 = q >> 1
        let mut x = self.value.pow(&(q >> 1u32));
        let mut b = self.value * x * x;
        x = self.value * x;
        let mut r = e;

        // invariants: x^2 = v * b, y has order 2^r, b has order dividing 2^(r-1)
        while b != one {
            let Some(m) = order_exponent(b, r) else {
                error!("{} has no order-reducing exponent below {}", self, r);
                return Err(Error::InternalInvariantViolation(
                    InvariantKind::OrderReductionFailed,
                ));
            };
            trace!("tonelli-shanks step r = {r}, m = {m}");
            let mut t = y;
            for _ in 0..r - m - 1 {
                t = t * t;
            }
            x = x * t;
            y = t * t;
            b = b * y;
            r = m;
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::gauss::{rand_core::{CryptoRng, RngCore}, U256, U64};
    use rand::{rngs::StdRng, SeedableRng};

    /// always yields zero, so every candidate is the zero element
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    fn field(p: u64) -> PrimeField<{ U64::LIMBS }> {
        PrimeField::new(U64::from_u64(p)).unwrap()
    }

    fn root_of<const LIMBS: usize>(x: &FieldElement<LIMBS>, rng: &mut StdRng) -> Option<FieldElement<LIMBS>> {
        x.sqrt(rng).unwrap()
    }

    #[test]
    fn test_fast_path() {
        let mut rng = StdRng::seed_from_u64(1);
        let f = field(23);
        let four = f.lift_i64(4).unwrap();
        assert_eq!(four.legendre(), Legendre::Residue);
        let root = root_of(&four, &mut rng).unwrap();
        assert_eq!(root.value(), U64::from_u64(2));
        assert_eq!(&root * &root, four);
    }

    #[test]
    fn test_general_path() {
        let mut rng = StdRng::seed_from_u64(2);
        let f = field(17);
        let nine = f.lift_i64(9).unwrap();
        let root = root_of(&nine, &mut rng).unwrap();
        assert_eq!(root.value(), U64::from_u64(3));
        let other = -&root;
        assert_eq!(other.value(), U64::from_u64(14));
        assert_eq!(&other * &other, nine);
    }

    #[test]
    fn test_small_primes_exhaustive() {
        let mut rng = StdRng::seed_from_u64(3);
        for p in [3u64, 5, 7, 11, 13, 17, 29, 37, 41, 73, 97, 113, 193, 241, 257, 65537] {
            let f = field(p);
            let mut roots = 0;
            for v in 1..p as i64 {
                let x = f.lift_i64(v).unwrap();
                match root_of(&x, &mut rng) {
                    Some(root) => {
                        assert_eq!(x.legendre(), Legendre::Residue, "{x}");
                        assert_eq!(&root * &root, x, "{x}");
                        assert!(root.value() <= (-&root).value());
                        roots += 1;
                    }
                    None => assert_eq!(x.legendre(), Legendre::NonResidue, "{x}"),
                }
            }
            assert_eq!(roots, (p - 1) / 2, "Z/{p}");
        }
    }

    #[test]
    fn test_zero() {
        let mut rng = StdRng::seed_from_u64(4);
        let f = field(17);
        assert_eq!(f.zero().legendre(), Legendre::Divides);
        assert_eq!(root_of(&f.zero(), &mut rng), Some(f.zero()));
        assert!(f.zero().is_square());
    }

    #[test]
    fn test_non_residue_search() {
        let mut rng = StdRng::seed_from_u64(5);
        let f = field(97);
        let g = find_non_residue(&f, &mut rng).unwrap();
        assert_eq!(g.legendre(), Legendre::NonResidue);
        assert_eq!(
            find_non_residue(&f, &mut ZeroRng),
            Err(Error::InternalInvariantViolation(
                InvariantKind::NonResidueSearchExhausted
            ))
        );
    }

    #[test]
    fn test_exhausted_search_surfaces() {
        let f = field(41);
        let x = f.lift_i64(2).unwrap();
        assert_eq!(
            x.sqrt(&mut ZeroRng),
            Err(Error::InternalInvariantViolation(
                InvariantKind::NonResidueSearchExhausted
            ))
        );
        // the fast path never draws
        let f = field(43);
        let x = f.lift_i64(4).unwrap();
        assert_eq!(x.sqrt(&mut ZeroRng).unwrap().unwrap().value(), U64::from_u64(2));
    }

    #[test]
    fn test_order_reduction_failure_surfaces() {
        use crate::math::{
            fermat::PrimeModulus,
            gauss::{modular::MontyParams, Odd},
        };

        // 65 = 5 * 13 slips past primality checking; 2 has Jacobi symbol +1
        // but is a non-square mod 5, and its order 12 is not a power of two
        let modulus = Odd::new(U64::from_u64(65)).unwrap();
        let f = PrimeField::from_modulus(PrimeModulus(MontyParams::new(modulus)));
        let x = f.lift_i64(2).unwrap();
        assert_eq!(x.legendre(), Legendre::Residue);
        for seed in 0..4 {
            assert_eq!(
                x.sqrt(&mut StdRng::seed_from_u64(seed)),
                Err(Error::InternalInvariantViolation(
                    InvariantKind::OrderReductionFailed
                ))
            );
        }
    }

    #[test]
    fn test_root_is_cached() {
        let mut rng = StdRng::seed_from_u64(6);
        let f = field(97);
        let x = f.lift_i64(2).unwrap();
        let root = root_of(&x, &mut rng).unwrap();
        // a cached root needs no generator
        assert_eq!(x.sqrt(&mut ZeroRng).unwrap(), Some(root.clone()));
        assert_eq!(x.clone().sqrt(&mut ZeroRng).unwrap(), Some(root));
    }

    #[test]
    fn test_concurrent_first_access() {
        let f = field(65537);
        let x = f.lift_i64(3 * 3 * 5 * 5).unwrap();
        let roots: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4u64)
                .map(|seed| {
                    let x = &x;
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        (x.legendre(), x.invert(), root_of(x, &mut rng))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (legendre, inverse, root) in roots {
            assert_eq!(legendre, Legendre::Residue);
            assert_eq!(inverse, x.invert());
            assert_eq!(root.unwrap().value(), U64::from_u64(15));
        }
    }

    #[test]
    fn test_large_two_adicity() {
        // P-224 prime, p - 1 = (2^128 - 1) * 2^96
        let mut rng = StdRng::seed_from_u64(7);
        let p = U256::from_be_hex("00000000ffffffffffffffffffffffffffffffff000000000000000000000001");
        let f = PrimeField::new(p).unwrap();
        let two = f.lift_i64(2).unwrap();
        let root = root_of(&two, &mut rng).unwrap();
        assert_eq!(
            root.value(),
            crate::math::gauss::parse_decimal(
                "11530978453080176508409676669917297614893691613623558510871677887308"
            )
            .unwrap()
        );
        for v in 3..40 {
            let x = f.lift_i64(v).unwrap();
            if let Some(root) = root_of(&x, &mut rng) {
                assert_eq!(&root * &root, x);
            } else {
                assert_eq!(x.legendre(), Legendre::NonResidue);
            }
        }
    }

    #[test]
    fn test_secp256k1_order() {
        let mut rng = StdRng::seed_from_u64(8);
        let n = U256::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
        let f = PrimeField::new(n).unwrap();
        let root = root_of(&f.lift_i64(2).unwrap(), &mut rng).unwrap();
        assert_eq!(
            root.value(),
            U256::from_be_hex("063e4b822d103a31a484d5efc164de812448b0c4820f957860dc0068ffe13c60")
        );
    }

    #[test]
    fn test_two_limb_prime() {
        let mut rng = StdRng::seed_from_u64(9);
        let f = PrimeField::<2>::from_decimal("19963065620013555197").unwrap();
        let x = f.lift_decimal("10459268535876674306").unwrap();
        assert_eq!(x.legendre(), Legendre::Residue);
        let root = root_of(&x, &mut rng).unwrap();
        assert_eq!(root.to_string(), "2813793832382480187 (mod 19963065620013555197)");
        assert_eq!(&root * &root, x);
    }
}
