//! provides basic math functions

pub mod fermat;
pub mod galois;
pub mod gauss;

pub use fermat::{MillerRabinTester, PrimalityStatus, PrimeModulus, DEFAULT_PRIMALITY_ROUNDS};
pub use galois::{
    primefield::{FieldElement, PrimeField},
    sqrt::{find_non_residue, NON_RESIDUE_ATTEMPTS_PER_BIT},
    Legendre,
};
pub use gauss::{RandomSource, Uint};
