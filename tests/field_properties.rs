use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use zp::math::gauss::{U256, U64};
use zp::{Error, FieldElement, Legendre, PrimeField};

type Fp = PrimeField<{ U64::LIMBS }>;

/// both residue classes of p mod 4, including large two-adicity
const PRIMES: &[u64] = &[
    3,
    5,
    7,
    13,
    17,
    23,
    97,
    193,
    7681,
    65537,
    998_244_353,
    1_000_000_007,
    2_305_843_009_213_693_951,
    18_446_744_069_414_584_321,
    18_446_744_073_709_551_557,
];

fn field(p: u64) -> Fp {
    PrimeField::new(U64::from_u64(p)).unwrap()
}

fn arb_field() -> impl Strategy<Value = Fp> {
    prop::sample::select(PRIMES).prop_map(field)
}

fn arb_elem() -> impl Strategy<Value = FieldElement<{ U64::LIMBS }>> {
    (arb_field(), any::<u64>()).prop_map(|(f, v)| f.reduce(&U64::from_u64(v)))
}

fn arb_pair() -> impl Strategy<Value = (FieldElement<{ U64::LIMBS }>, FieldElement<{ U64::LIMBS }>)>
{
    (arb_field(), any::<u64>(), any::<u64>())
        .prop_map(|(f, a, b)| (f.reduce(&U64::from_u64(a)), f.reduce(&U64::from_u64(b))))
}

// ===== Lifting =====

proptest! {
    #[test]
    fn lift_keeps_value(f in arb_field(), v in any::<u64>()) {
        let v = U64::from_u64(v);
        if v < f.modulus() {
            prop_assert_eq!(f.lift(&v).unwrap().value(), v);
        } else {
            prop_assert_eq!(f.lift(&v), Err(Error::OutOfRange));
        }
    }
}

proptest! {
    #[test]
    fn lift_rejects_negative(f in arb_field(), v in i64::MIN..0) {
        prop_assert_eq!(f.lift_i64(v), Err(Error::OutOfRange));
    }
}

// ===== Field axioms =====

proptest! {
    #[test]
    fn addition_commutative((a, b) in arb_pair()) {
        prop_assert_eq!(&a + &b, &b + &a);
    }
}

proptest! {
    #[test]
    fn multiplication_distributes((a, b) in arb_pair()) {
        let c = &a - &b;
        prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
    }
}

proptest! {
    #[test]
    fn additive_inverse(a in arb_elem()) {
        prop_assert!((&a + &(-&a)).is_zero());
        prop_assert_eq!(-(-a.clone()), a);
    }
}

// ===== Inversion and division =====

proptest! {
    #[test]
    fn nonzero_elements_invert(a in arb_elem()) {
        if a.is_zero() {
            prop_assert!(a.invert().is_none());
        } else {
            let inverse = a.invert().unwrap();
            prop_assert!((&a * &inverse).is_one());
        }
    }
}

proptest! {
    #[test]
    fn division_undoes_multiplication((a, b) in arb_pair()) {
        if b.is_zero() {
            prop_assert_eq!(a.checked_div(&b), Err(Error::NoInverse));
        } else {
            prop_assert_eq!(&(&a / &b) * &b, a);
        }
    }
}

proptest! {
    #[test]
    fn negative_powers_invert(a in arb_elem(), n in 1i64..1000) {
        prop_assume!(!a.is_zero());
        prop_assert!((&a.pow_i64(n).unwrap() * &a.pow_i64(-n).unwrap()).is_one());
    }
}

// ===== Quadratic residues =====

proptest! {
    #[test]
    fn residues_have_roots(a in arb_elem(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let root = a.sqrt(&mut rng).unwrap();
        match a.legendre() {
            Legendre::Residue => {
                let root = root.unwrap();
                prop_assert_eq!(&root * &root, a);
            }
            Legendre::NonResidue => prop_assert!(root.is_none()),
            Legendre::Divides => prop_assert!(root.unwrap().is_zero()),
        }
    }
}

proptest! {
    #[test]
    fn squares_are_residues(a in arb_elem(), seed in any::<u64>()) {
        prop_assume!(!a.is_zero());
        let square = &a * &a;
        prop_assert_eq!(square.legendre(), Legendre::Residue);
        let root = square.sqrt(&mut StdRng::seed_from_u64(seed)).unwrap().unwrap();
        prop_assert!(root == a || root == -a);
    }
}

proptest! {
    #[test]
    fn root_does_not_depend_on_rng(a in arb_elem(), s in any::<u64>(), t in any::<u64>()) {
        let b = a.clone();
        let x = a.sqrt(&mut StdRng::seed_from_u64(s)).unwrap();
        let y = b.sqrt(&mut StdRng::seed_from_u64(t)).unwrap();
        prop_assert_eq!(x, y);
    }
}

// ===== Concrete scenarios =====

#[test]
fn cross_field_operation_fails() {
    let a = field(7).lift_i64(1).unwrap();
    let b = field(11).lift_i64(1).unwrap();
    assert_eq!(a.checked_mul(&b), Err(Error::CrossFieldOperation));
    assert_eq!(b.checked_sub(&a), Err(Error::CrossFieldOperation));
}

#[test]
fn inverse_of_four_mod_thirteen() {
    let four = field(13).lift_i64(4).unwrap();
    assert_eq!(four.invert().unwrap().value(), U64::from_u64(10));
}

#[test]
fn roots_in_both_residue_classes() {
    let mut rng = StdRng::seed_from_u64(42);
    let four = field(23).lift_i64(4).unwrap();
    let root = four.sqrt(&mut rng).unwrap().unwrap();
    assert!([2, 21].map(U64::from_u64).contains(&root.value()));
    assert_eq!(&root * &root, four);

    let nine = field(17).lift_i64(9).unwrap();
    let root = nine.sqrt(&mut rng).unwrap().unwrap();
    assert!([3, 14].map(U64::from_u64).contains(&root.value()));
    assert_eq!(&root * &root, nine);
}

#[test]
fn random_elements_of_large_field() {
    // secp256k1 group order, p = 1 (mod 64)
    let n = U256::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
    let f = PrimeField::new(n).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut residues = 0;
    for _ in 0..64 {
        let x = f.random(&mut rng);
        assert!((&x * &x.invert().unwrap()).is_one());
        if let Some(root) = x.sqrt(&mut rng).unwrap() {
            assert_eq!(&root * &root, x);
            residues += 1;
        } else {
            assert_eq!(x.legendre(), Legendre::NonResidue);
        }
    }
    assert!(residues > 0 && residues < 64);
}
