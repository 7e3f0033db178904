//! arithmetic in prime fields Z/p
//!
//! A [`PrimeField`] is built from a prime modulus that passes a Miller-Rabin
//! check; integers are lifted into it as [`FieldElement`]s, which support the
//! field operations, inversion, Legendre classification and square roots by
//! Tonelli-Shanks.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use zp::{math::gauss::U64, Legendre, PrimeField};
//!
//! let field = PrimeField::new(U64::from_u64(23)).unwrap();
//! let four = field.lift_i64(4).unwrap();
//! assert_eq!(four.legendre(), Legendre::Residue);
//!
//! let root = four.sqrt(&mut StdRng::seed_from_u64(0)).unwrap().unwrap();
//! assert_eq!(&root * &root, four);
//! ```

pub mod error;
pub mod math;

pub use error::{Error, InvariantKind, Result};
pub use math::{FieldElement, Legendre, PrimalityStatus, PrimeField, PrimeModulus, RandomSource};
