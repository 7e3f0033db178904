//! errors raised by field construction and arithmetic

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, thiserror::Error)]
pub enum Error {
    /// modulus is zero, even or composite
    #[error("modulus must be an odd prime")]
    InvalidModulus,
    /// value does not lie in [0, modulus)
    #[error("value is outside of [0, modulus)")]
    OutOfRange,
    #[error("malformed decimal integer")]
    InvalidDecimal,
    /// operands belong to different fields
    #[error("operands belong to different fields")]
    CrossFieldOperation,
    #[error("zero has no multiplicative inverse")]
    NoInverse,
    /// never expected for a prime modulus
    #[error("internal invariant violated: {0:?}")]
    InternalInvariantViolation(InvariantKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum InvariantKind {
    /// the random search for a quadratic non-residue ran out of attempts
    NonResidueSearchExhausted,
    /// Tonelli-Shanks found no order-reducing exponent
    OrderReductionFailed,
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn test_display() {
    assert_eq!(Error::NoInverse.to_string(), "zero has no multiplicative inverse");
    assert_eq!(
        Error::InternalInvariantViolation(InvariantKind::OrderReductionFailed).to_string(),
        "internal invariant violated: OrderReductionFailed"
    );
}
