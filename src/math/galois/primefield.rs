//! prime field is a field of prime order

use crate::error::{Error, Result};
use crate::math::{
    fermat::{PrimeModulus, DEFAULT_PRIMALITY_ROUNDS},
    galois::Legendre,
    gauss::{
        jacobi,
        modular::{MontyForm, SafeGcdInverter},
        parse_decimal, to_decimal, Concat, Odd, PrecomputeInverter, RandomSource, Split, Uint, U64,
    },
};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

/// the field Z/p for an odd prime p
/// Example:
/// ```
/// use zp::math::{gauss::U64, PrimeField};
///
/// let field = PrimeField::new(U64::from_u64(13)).unwrap();
/// let four = field.lift(&U64::from_u64(4)).unwrap();
/// assert_eq!(four.invert().unwrap().value(), U64::from_u64(10));
/// assert_eq!((&four * &four.invert().unwrap()), field.one());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PrimeField<const LIMBS: usize>(PrimeModulus<LIMBS>);

impl<const LIMBS: usize, const WIDE_LIMBS: usize> PrimeField<LIMBS>
where
    Uint<LIMBS>: Concat<Output = Uint<WIDE_LIMBS>>,
    Uint<WIDE_LIMBS>: Split<Output = Uint<LIMBS>>,
{
    /// constructs Z/p, checking primality with DEFAULT_PRIMALITY_ROUNDS rounds
    ///
    /// # Errors
    /// [`Error::InvalidModulus`] for composites, 0, 1 and for the even prime 2,
    /// which has no Montgomery representation.
    pub fn new(modulus: Uint<LIMBS>) -> Result<Self> {
        Self::with_rounds(modulus, DEFAULT_PRIMALITY_ROUNDS)
    }

    pub fn with_rounds(modulus: Uint<LIMBS>, rounds: usize) -> Result<Self> {
        PrimeModulus::with_rounds(modulus, rounds).map(Self)
    }

    /// constructs Z/p from the decimal digits of p
    pub fn from_decimal(modulus: &str) -> Result<Self> {
        Self::new(parse_decimal(modulus)?)
    }
}

impl<const LIMBS: usize> PrimeField<LIMBS> {
    /// wraps an already validated modulus
    pub fn from_modulus(modulus: PrimeModulus<LIMBS>) -> Self {
        Self(modulus)
    }

    pub fn modulus(&self) -> Uint<LIMBS> {
        self.0.get()
    }

    pub fn prime_modulus(&self) -> &PrimeModulus<LIMBS> {
        &self.0
    }

    pub fn zero(&self) -> FieldElement<LIMBS> {
        FieldElement::from_monty(MontyForm::zero(*self.0.params()))
    }

    /// the multiplicative identity
    pub fn one(&self) -> FieldElement<LIMBS> {
        FieldElement::from_monty(MontyForm::one(*self.0.params()))
    }

    /// lifts `value` into the field; fails unless 0 <= value < p
    pub fn lift(&self, value: &Uint<LIMBS>) -> Result<FieldElement<LIMBS>> {
        if *value >= self.modulus() {
            return Err(Error::OutOfRange);
        }
        Ok(self.reduce(value))
    }

    /// lifts a native integer; negative values are out of range
    pub fn lift_i64(&self, value: i64) -> Result<FieldElement<LIMBS>> {
        let value = u64::try_from(value).map_err(|_| Error::OutOfRange)?;
        self.lift(&Uint::from_u64(value))
    }

    /// lifts a decimal string
    pub fn lift_decimal(&self, value: &str) -> Result<FieldElement<LIMBS>> {
        self.lift(&parse_decimal(value)?)
    }

    /// maps any integer to its residue class
    pub fn reduce(&self, value: &Uint<LIMBS>) -> FieldElement<LIMBS> {
        FieldElement::from_monty(self.0.make(value))
    }

    /// draws a uniformly random element
    pub fn random(&self, rng: &mut impl RandomSource<LIMBS>) -> FieldElement<LIMBS> {
        FieldElement::from_monty(self.0.random_make(rng))
    }
}

impl<const LIMBS: usize> fmt::Display for PrimeField<LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z/{}", to_decimal(&self.modulus()))
    }
}

/// represents a number in a prime field
///
/// The inverse, the Legendre class and the square root are computed on first
/// use and cached in the element; clones share nothing but copy what was
/// already computed.
#[derive(Clone)]
pub struct FieldElement<const LIMBS: usize> {
    pub(super) value: MontyForm<LIMBS>,
    inverse: OnceLock<Option<MontyForm<LIMBS>>>,
    legendre: OnceLock<Legendre>,
    pub(super) root: OnceLock<Option<MontyForm<LIMBS>>>,
}

impl<const LIMBS: usize> FieldElement<LIMBS> {
    pub(super) fn from_monty(value: MontyForm<LIMBS>) -> Self {
        Self {
            value,
            inverse: OnceLock::new(),
            legendre: OnceLock::new(),
            root: OnceLock::new(),
        }
    }

    /// get the integer representation of this number
    pub fn value(&self) -> Uint<LIMBS> {
        self.value.retrieve()
    }

    /// get the modulus of this number
    pub fn modulus(&self) -> Uint<LIMBS> {
        self.value.params().modulus().get()
    }

    /// the field this number lives in
    pub fn field(&self) -> PrimeField<LIMBS> {
        PrimeField(PrimeModulus(*self.value.params()))
    }

    pub fn is_zero(&self) -> bool {
        self.value == MontyForm::zero(*self.value.params())
    }

    pub fn is_one(&self) -> bool {
        self.value == MontyForm::one(*self.value.params())
    }

    fn same_field(&self, other: &Self) -> Result<()> {
        if self.value.params() == other.value.params() {
            Ok(())
        } else {
            Err(Error::CrossFieldOperation)
        }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.same_field(other)?;
        Ok(Self::from_monty(self.value + other.value))
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.same_field(other)?;
        Ok(Self::from_monty(self.value - other.value))
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self> {
        self.same_field(other)?;
        Ok(Self::from_monty(self.value * other.value))
    }

    /// quadratic character of this number
    pub fn legendre(&self) -> Legendre {
        *self.legendre.get_or_init(|| {
            let symbol = jacobi(&self.value(), self.value.params().modulus());
            Legendre::from_symbol(symbol).unwrap_or(Legendre::Divides)
        })
    }

    pub fn is_residue(&self) -> bool {
        self.legendre() == Legendre::Residue
    }

    /// raises to a non-negative power; x^0 = 1 for every x
    pub fn pow<const EXP_LIMBS: usize>(&self, exponent: &Uint<EXP_LIMBS>) -> Self {
        Self::from_monty(self.value.pow(exponent))
    }
}

impl<const LIMBS: usize, const UNSAT_LIMBS: usize> FieldElement<LIMBS>
where
    Odd<Uint<LIMBS>>: PrecomputeInverter<
        Inverter = SafeGcdInverter<LIMBS, UNSAT_LIMBS>,
        Output = Uint<LIMBS>,
    >,
{
    /// computes self * other^-1
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        self.same_field(other)?;
        let inverse = other.try_invert()?;
        Ok(Self::from_monty(self.value * inverse.value))
    }

    /// the multiplicative inverse, absent only for zero
    pub fn invert(&self) -> Option<Self> {
        let inverse = *self.inverse.get_or_init(|| Option::from(self.value.inv()));
        inverse.map(Self::from_monty)
    }

    pub fn try_invert(&self) -> Result<Self> {
        self.invert().ok_or(Error::NoInverse)
    }

    /// raises to the power -exponent, i.e. (self^-1)^exponent
    pub fn pow_inverse<const EXP_LIMBS: usize>(&self, exponent: &Uint<EXP_LIMBS>) -> Result<Self> {
        if *exponent == Uint::ZERO {
            return Ok(self.field().one());
        }
        Ok(self.try_invert()?.pow(exponent))
    }

    /// raises to a signed native power
    /// ```
    /// use zp::math::{gauss::U64, PrimeField};
    ///
    /// let field = PrimeField::new(U64::from_u64(17)).unwrap();
    /// let three = field.lift_i64(3).unwrap();
    /// assert_eq!(three.pow_i64(0).unwrap(), field.one());
    /// assert_eq!(three.pow_i64(-1).unwrap(), three.invert().unwrap());
    /// assert_eq!(three.pow_i64(16).unwrap(), field.one());
    /// assert!(field.zero().pow_i64(-3).is_err());
    /// ```
    pub fn pow_i64(&self, exponent: i64) -> Result<Self> {
        let magnitude = U64::from_u64(exponent.unsigned_abs());
        if exponent < 0 {
            self.pow_inverse(&magnitude)
        } else {
            Ok(self.pow(&magnitude))
        }
    }
}

impl<const LIMBS: usize> PartialEq for FieldElement<LIMBS> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<const LIMBS: usize> Eq for FieldElement<LIMBS> {}

impl<const LIMBS: usize> Hash for FieldElement<LIMBS> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().as_words().hash(state);
        self.modulus().as_words().hash(state);
    }
}

impl<const LIMBS: usize> fmt::Debug for FieldElement<LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldElement")
            .field("value", &self.value())
            .field("modulus", &self.modulus())
            .finish()
    }
}

impl<const LIMBS: usize> fmt::Display for FieldElement<LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (mod {})",
            to_decimal(&self.value()),
            to_decimal(&self.modulus())
        )
    }
}

impl<const LIMBS: usize> Neg for &FieldElement<LIMBS> {
    type Output = FieldElement<LIMBS>;

    #[inline]
    fn neg(self) -> Self::Output {
        FieldElement::from_monty(-self.value)
    }
}

impl<const LIMBS: usize> Neg for FieldElement<LIMBS> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        -&self
    }
}

/// derives binary operators from the checked methods
///
/// # Panics
/// when the operands belong to different fields, or on division by zero
macro_rules! derive_binary_ops {
    ($Op:ident :: $op:ident => $checked:ident) => {
        derive_binary_ops!($Op::$op => $checked; [const LIMBS: usize]; []);
    };
    ($Op:ident :: $op:ident => $checked:ident; [$($generics:tt)*]; [$($bounds:tt)*]) => {
        impl<$($generics)*> $Op<&FieldElement<LIMBS>> for &FieldElement<LIMBS>
        where
            $($bounds)*
        {
            type Output = FieldElement<LIMBS>;

            #[inline]
            #[track_caller]
            fn $op(self, other: &FieldElement<LIMBS>) -> Self::Output {
                match self.$checked(other) {
                    Ok(result) => result,
                    Err(err) => panic!("cannot {} {} and {}: {}", stringify!($op), self, other, err),
                }
            }
        }

        impl<$($generics)*> $Op<FieldElement<LIMBS>> for &FieldElement<LIMBS>
        where
            $($bounds)*
        {
            type Output = FieldElement<LIMBS>;

            #[inline]
            #[track_caller]
            fn $op(self, other: FieldElement<LIMBS>) -> Self::Output {
                $Op::$op(self, &other)
            }
        }

        impl<$($generics)*> $Op<&Self> for FieldElement<LIMBS>
        where
            $($bounds)*
        {
            type Output = Self;

            #[inline]
            #[track_caller]
            fn $op(self, other: &Self) -> Self::Output {
                $Op::$op(&self, other)
            }
        }

        impl<$($generics)*> $Op<Self> for FieldElement<LIMBS>
        where
            $($bounds)*
        {
            type Output = Self;

            #[inline]
            #[track_caller]
            fn $op(self, other: Self) -> Self::Output {
                $Op::$op(&self, &other)
            }
        }
    };
}

derive_binary_ops!(Add::add => checked_add);
derive_binary_ops!(Sub::sub => checked_sub);
derive_binary_ops!(Mul::mul => checked_mul);
derive_binary_ops!(
    Div::div => checked_div;
    [const LIMBS: usize, const UNSAT_LIMBS: usize];
    [Odd<Uint<LIMBS>>: PrecomputeInverter<
        Inverter = SafeGcdInverter<LIMBS, UNSAT_LIMBS>,
        Output = Uint<LIMBS>,
    >]
);

/// derives binary assignment operators from the binary operators
macro_rules! derive_binary_assign_ops {
    ($Op:ident :: $op:ident => $Bin:ident :: $bin:ident) => {
        derive_binary_assign_ops!($Op::$op => $Bin::$bin; [const LIMBS: usize]; []);
    };
    ($Op:ident :: $op:ident => $Bin:ident :: $bin:ident; [$($generics:tt)*]; [$($bounds:tt)*]) => {
        impl<$($generics)*> $Op<&Self> for FieldElement<LIMBS>
        where
            $($bounds)*
        {
            #[inline]
            #[track_caller]
            fn $op(&mut self, other: &Self) {
                *self = $Bin::$bin(&*self, other);
            }
        }

        impl<$($generics)*> $Op<Self> for FieldElement<LIMBS>
        where
            $($bounds)*
        {
            #[inline]
            #[track_caller]
            fn $op(&mut self, other: Self) {
                *self = $Bin::$bin(&*self, &other);
            }
        }
    };
}

derive_binary_assign_ops!(AddAssign::add_assign => Add::add);
derive_binary_assign_ops!(SubAssign::sub_assign => Sub::sub);
derive_binary_assign_ops!(MulAssign::mul_assign => Mul::mul);
derive_binary_assign_ops!(
    DivAssign::div_assign => Div::div;
    [const LIMBS: usize, const UNSAT_LIMBS: usize];
    [Odd<Uint<LIMBS>>: PrecomputeInverter<
        Inverter = SafeGcdInverter<LIMBS, UNSAT_LIMBS>,
        Output = Uint<LIMBS>,
    >]
);

#[cfg(test)]
fn small_field(p: u64) -> PrimeField<{ U64::LIMBS }> {
    PrimeField::new(U64::from_u64(p)).unwrap()
}

#[test]
fn test_construction() {
    assert!(PrimeField::new(U64::from_u64(7)).is_ok());
    // 2 is prime but even
    assert_eq!(PrimeField::new(U64::from_u64(2)), Err(Error::InvalidModulus));
    for n in [0u64, 1, 4, 9, 15, 561] {
        assert_eq!(
            PrimeField::new(U64::from_u64(n)),
            Err(Error::InvalidModulus),
            "{n}"
        );
    }
    let field = PrimeField::<2>::from_decimal("19963065620013555197").unwrap();
    assert_eq!(field.to_string(), "Z/19963065620013555197");
    assert_eq!(
        PrimeField::<1>::from_decimal("seven"),
        Err(Error::InvalidDecimal)
    );
}

#[test]
fn test_lift() {
    let field = small_field(23);
    for v in 0..23u64 {
        assert_eq!(field.lift(&U64::from_u64(v)).unwrap().value(), U64::from_u64(v));
    }
    assert_eq!(field.lift(&U64::from_u64(23)), Err(Error::OutOfRange));
    assert_eq!(field.lift(&U64::MAX), Err(Error::OutOfRange));
    assert_eq!(field.lift_i64(-1), Err(Error::OutOfRange));
    assert_eq!(field.lift_i64(22).unwrap().value(), U64::from_u64(22));
    assert_eq!(field.lift_decimal("24"), Err(Error::OutOfRange));
    assert_eq!(field.reduce(&U64::from_u64(24)).value(), U64::ONE);
    assert_eq!(field.lift_decimal("5").unwrap().to_string(), "5 (mod 23)");
}

#[test]
fn test_arithmetic() {
    let field = small_field(13);
    let a = field.lift_i64(9).unwrap();
    let b = field.lift_i64(7).unwrap();
    assert_eq!((&a + &b).value(), U64::from_u64(3));
    assert_eq!((&a - &b).value(), U64::from_u64(2));
    assert_eq!((&b - &a).value(), U64::from_u64(11));
    assert_eq!((&a * &b).value(), U64::from_u64(11));
    assert_eq!((-&a).value(), U64::from_u64(4));
    assert_eq!(-field.zero(), field.zero());
    assert_eq!(&(&a / &b) * &b, a);

    let mut c = a.clone();
    c += &b;
    c *= b.clone();
    c -= &a;
    c /= &b;
    assert_eq!(c, field.lift_i64(11).unwrap());
}

#[test]
fn test_inverse() {
    let field = small_field(13);
    let four = field.lift_i64(4).unwrap();
    assert_eq!(four.invert().unwrap().value(), U64::from_u64(10));
    assert!(field.zero().invert().is_none());
    assert_eq!(field.zero().try_invert(), Err(Error::NoInverse));
    assert_eq!(
        four.checked_div(&field.zero()),
        Err(Error::NoInverse)
    );
    for v in 1..13 {
        let x = field.lift_i64(v).unwrap();
        let inverse = x.invert().unwrap();
        assert!((&x * &inverse).is_one());
        // agrees with v^(p-2)
        assert_eq!(inverse, x.pow(&U64::from_u64(11)));
        let mut y = field.one();
        y /= &x;
        assert_eq!(y, inverse);
    }
}

#[test]
fn test_cross_field() {
    let a = small_field(7).lift_i64(3).unwrap();
    let b = small_field(11).lift_i64(3).unwrap();
    assert_ne!(a, b);
    assert_eq!(a.checked_add(&b), Err(Error::CrossFieldOperation));
    assert_eq!(a.checked_sub(&b), Err(Error::CrossFieldOperation));
    assert_eq!(a.checked_mul(&b), Err(Error::CrossFieldOperation));
    assert_eq!(a.checked_div(&b), Err(Error::CrossFieldOperation));
    let result = std::panic::catch_unwind(|| &a + &b);
    assert!(result.is_err());
}

#[test]
fn test_pow() {
    let field = small_field(17);
    let three = field.lift_i64(3).unwrap();
    assert_eq!(three.pow(&U64::ZERO), field.one());
    assert_eq!(field.zero().pow(&U64::ZERO), field.one());
    assert_eq!(three.pow(&U64::from_u64(4)).value(), U64::from_u64(13));
    assert_eq!(three.pow_i64(-2).unwrap(), three.invert().unwrap().pow_i64(2).unwrap());
    assert_eq!(three.pow_i64(i64::MIN).unwrap(), three.pow_inverse(&U64::from_u64(1 << 63)).unwrap());
    assert_eq!(three.pow_i64(i64::MAX).unwrap(), three.pow(&U64::from_u64(i64::MAX as u64)));
    assert_eq!(field.zero().pow_i64(-1), Err(Error::NoInverse));
    assert_eq!(field.zero().pow_inverse(&U64::ZERO).unwrap(), field.one());
}

#[test]
fn test_legendre() {
    let field = small_field(23);
    assert_eq!(field.zero().legendre(), Legendre::Divides);
    let squares: Vec<_> = (1..23i64)
        .map(|v| field.lift_i64(v).unwrap())
        .map(|x| (&x * &x).value())
        .collect();
    for v in 1..23i64 {
        let x = field.lift_i64(v).unwrap();
        let expected = if squares.contains(&x.value()) {
            Legendre::Residue
        } else {
            Legendre::NonResidue
        };
        assert_eq!(x.legendre(), expected, "{x}");
        assert_eq!(x.is_residue(), expected == Legendre::Residue);
    }
}

#[test]
fn test_hash_agrees_with_eq() {
    use std::collections::HashSet;
    let field = small_field(7);
    let set: HashSet<_> = (0..14).map(|v| field.reduce(&U64::from_u64(v))).collect();
    assert_eq!(set.len(), 7);
}
