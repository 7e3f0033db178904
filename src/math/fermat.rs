//! prime number arithmetic

use super::gauss::{
    modular::{MontyForm, MontyParams},
    rand_core::{CryptoRngCore, OsRng},
    Concat, Limb, NonZero, Odd, RandomSource, Split, Uint, Word,
};
use crate::error::{Error, Result};
use log::debug;

/// Miller-Rabin rounds used when no count is given
pub const DEFAULT_PRIMALITY_ROUNDS: usize = 25;

/// the 54 primes below 256, used for trial division
const SMALL_PRIMES: [Word; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// trial division by SMALL_PRIMES decides every n below this bound
const TRIAL_DIVISION_BOUND: u32 = 256 * 256;

/// outcome of a primality test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimalityStatus {
    Composite,
    /// passed every Miller-Rabin round
    ProbablyPrime,
    /// proven by trial division
    Prime,
}

impl PrimalityStatus {
    pub fn is_prime(self) -> bool {
        self != Self::Composite
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillerRabinTester;

impl MillerRabinTester {
    /// runs one round with witness `a`; false means the modulus of `a` is composite
    pub fn check<const LIMBS: usize>(a: &MontyForm<LIMBS>) -> bool {
        let t = a.params().modulus().get().wrapping_sub(&Uint::ONE);
        let h = t.trailing_zeros();
        let p1 = MontyForm::one(*a.params());
        let m1 = -p1;
        let mut b = a.pow(&(t >> h));
        if b == p1 || b == m1 {
            return true;
        }
        for _ in 1..h {
            b = b * b;
            if b == m1 {
                return true;
            }
            if b == p1 {
                return false;
            }
        }
        false
    }

    /// classifies `n` by trial division, then `rounds` random Miller-Rabin rounds
    pub fn probab_prime<const LIMBS: usize, const WIDE_LIMBS: usize>(
        n: &Uint<LIMBS>,
        rounds: usize,
        rng: &mut impl RandomSource<LIMBS>,
    ) -> PrimalityStatus
    where
        Uint<LIMBS>: Concat<Output = Uint<WIDE_LIMBS>>,
        Uint<WIDE_LIMBS>: Split<Output = Uint<LIMBS>>,
    {
        if *n < Uint::from_u8(2) {
            return PrimalityStatus::Composite;
        }
        for p in SMALL_PRIMES {
            if *n == Uint::from_word(p) {
                return PrimalityStatus::Prime;
            }
            // table entries are nonzero
            if n.rem_limb(NonZero::<Limb>::new_unwrap(Limb(p))) == Limb::ZERO {
                return PrimalityStatus::Composite;
            }
        }
        if *n < Uint::from_u32(TRIAL_DIVISION_BOUND) {
            return PrimalityStatus::Prime;
        }

        // n is odd and above 256^2 from here on
        let Some(odd) = Option::<Odd<Uint<LIMBS>>>::from(Odd::new(*n)) else {
            return PrimalityStatus::Composite;
        };
        let Some(span) =
            Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(n.wrapping_sub(&Uint::from_u8(3))))
        else {
            return PrimalityStatus::Composite;
        };
        let params = MontyParams::new(odd);
        for _ in 0..rounds {
            // witness uniform in [2, n - 2]
            let witness = rng.sample_below(&span).wrapping_add(&Uint::from_u8(2));
            if !Self::check(&MontyForm::new(&witness, params)) {
                return PrimalityStatus::Composite;
            }
        }
        PrimalityStatus::ProbablyPrime
    }
}

/// represents an odd prime modulus for PrimeField
/// Example:
/// ```
/// use zp::math::{gauss::U64, PrimeModulus};
///
/// let modulus = PrimeModulus::try_from(U64::from_u64(1_000_000_007)).unwrap();
/// assert_eq!(modulus.get(), U64::from_u64(1_000_000_007));
/// assert!(PrimeModulus::try_from(U64::from_u64(561)).is_err());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PrimeModulus<const LIMBS: usize>(pub(crate) MontyParams<LIMBS>);

impl<const LIMBS: usize> From<PrimeModulus<LIMBS>> for Odd<Uint<LIMBS>> {
    fn from(modulus: PrimeModulus<LIMBS>) -> Self {
        *modulus.0.modulus()
    }
}

impl<const LIMBS: usize> PrimeModulus<LIMBS> {
    /// the prime as an integer
    pub fn get(&self) -> Uint<LIMBS> {
        self.0.modulus().get()
    }

    pub fn params(&self) -> &MontyParams<LIMBS> {
        &self.0
    }

    /// reduces `value` into Montgomery form of this modulus
    pub(crate) fn make(&self, value: &Uint<LIMBS>) -> MontyForm<LIMBS> {
        MontyForm::new(value, self.0)
    }

    /// draws a uniform residue of this modulus
    pub(crate) fn random_make(&self, rng: &mut impl RandomSource<LIMBS>) -> MontyForm<LIMBS> {
        self.make(&rng.sample_below(self.0.modulus().as_nz_ref()))
    }
}

impl<const LIMBS: usize, const WIDE_LIMBS: usize> PrimeModulus<LIMBS>
where
    Uint<LIMBS>: Concat<Output = Uint<WIDE_LIMBS>>,
    Uint<WIDE_LIMBS>: Split<Output = Uint<LIMBS>>,
{
    /// validates an odd prime with DEFAULT_PRIMALITY_ROUNDS rounds
    pub fn try_from(modulus: Uint<LIMBS>) -> Result<Self> {
        Self::with_rounds(modulus, DEFAULT_PRIMALITY_ROUNDS)
    }

    /// validates an odd prime with the given number of rounds
    pub fn with_rounds(modulus: Uint<LIMBS>, rounds: usize) -> Result<Self> {
        Self::with_rng(modulus, rounds, &mut OsRng)
    }

    /// validates an odd prime, drawing witnesses from `rng`
    ///
    /// # Errors
    /// [`Error::InvalidModulus`] when `modulus` is even (2 included) or fails
    /// the primality test.
    pub fn with_rng(
        modulus: Uint<LIMBS>,
        rounds: usize,
        rng: &mut impl RandomSource<LIMBS>,
    ) -> Result<Self> {
        let odd = Option::<Odd<Uint<LIMBS>>>::from(Odd::new(modulus)).ok_or(Error::InvalidModulus)?;
        let status = MillerRabinTester::probab_prime(&modulus, rounds, rng);
        if !status.is_prime() {
            return Err(Error::InvalidModulus);
        }
        debug!(
            "accepted {}-bit modulus as {:?} after {} rounds",
            modulus.bits(),
            status,
            rounds
        );
        Ok(Self(MontyParams::new(odd)))
    }

    /// constructs a random prime modulus of given bit size (at least 2)
    pub fn from_random(nbits: u32, rng: &mut impl CryptoRngCore) -> Result<Self> {
        if nbits < 2 || nbits > Uint::<LIMBS>::BITS {
            return Err(Error::InvalidModulus);
        }
        let Some(full) = Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(Uint::MAX)) else {
            return Err(Error::InvalidModulus);
        };
        let mask = Uint::<LIMBS>::ONE | (Uint::<LIMBS>::ONE << (nbits - 1));
        loop {
            let candidate = (rng.sample_below(&full) >> (Uint::<LIMBS>::BITS - nbits)) | mask;
            if let Ok(modulus) = Self::with_rng(candidate, DEFAULT_PRIMALITY_ROUNDS, rng) {
                return Ok(modulus);
            }
        }
    }
}

#[test]
fn test_small_numbers() {
    use super::gauss::U64;
    let mut rng = OsRng;
    let status = |n: u64, rng: &mut OsRng| MillerRabinTester::probab_prime(&U64::from_u64(n), 10, rng);
    assert_eq!(status(0, &mut rng), PrimalityStatus::Composite);
    assert_eq!(status(1, &mut rng), PrimalityStatus::Composite);
    assert_eq!(status(2, &mut rng), PrimalityStatus::Prime);
    assert_eq!(status(251, &mut rng), PrimalityStatus::Prime);
    assert_eq!(status(65521, &mut rng), PrimalityStatus::Prime);
    assert_eq!(status(65519 * 3, &mut rng), PrimalityStatus::Composite);
    assert_eq!(status(257 * 263, &mut rng), PrimalityStatus::Composite);
}

#[test]
fn test_miller_rabin() {
    use super::gauss::{U128, U64};
    let mut rng = OsRng;
    for p in [65537u64, 998_244_353, 1_000_000_007, 18_446_744_073_709_551_557] {
        assert_eq!(
            MillerRabinTester::probab_prime(&U64::from_u64(p), 25, &mut rng),
            PrimalityStatus::ProbablyPrime,
            "{p}"
        );
    }
    // Carmichael numbers fool the Fermat test but not Miller-Rabin
    for n in [118_901_521u64, 172_947_529, 216_821_881, 228_842_209] {
        assert_eq!(
            MillerRabinTester::probab_prime(&U64::from_u64(n), 25, &mut rng),
            PrimalityStatus::Composite,
            "{n}"
        );
    }
    // product of two 64-bit primes
    let n = U128::from_u128(18_446_744_073_709_551_557u128 * 18_446_744_073_709_551_533u128);
    assert!(!MillerRabinTester::probab_prime(&n, 25, &mut rng).is_prime());
}

#[test]
fn test_prime_modulus() {
    use super::gauss::U64;
    assert!(PrimeModulus::try_from(U64::from_u64(23)).is_ok());
    assert_eq!(
        PrimeModulus::try_from(U64::from_u64(2)),
        Err(Error::InvalidModulus)
    );
    assert_eq!(
        PrimeModulus::try_from(U64::ZERO),
        Err(Error::InvalidModulus)
    );
    assert_eq!(
        PrimeModulus::try_from(U64::from_u64(561)),
        Err(Error::InvalidModulus)
    );
    let modulus = PrimeModulus::with_rounds(U64::from_u64(1_000_000_007), 5).unwrap();
    assert_eq!(Odd::from(modulus).get(), U64::from_u64(1_000_000_007));
}

#[test]
fn test_random_modulus() {
    use super::gauss::U128;
    let mut rng = OsRng;
    for nbits in [2, 8, 61, 100, 128] {
        let modulus = PrimeModulus::<{ U128::LIMBS }>::from_random(nbits, &mut rng).unwrap();
        assert_eq!(modulus.get().bits(), nbits);
    }
    assert!(PrimeModulus::<{ U128::LIMBS }>::from_random(1, &mut rng).is_err());
    assert!(PrimeModulus::<{ U128::LIMBS }>::from_random(129, &mut rng).is_err());
}
