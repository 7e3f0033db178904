//! finite field arithmetic

/// quadratic character of a field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Legendre {
    /// the element is zero
    Divides,
    NonResidue,
    Residue,
}

impl Legendre {
    /// maps a Legendre symbol value in {-1, 0, 1}
    pub fn from_symbol(symbol: i8) -> Option<Self> {
        match symbol {
            0 => Some(Self::Divides),
            -1 => Some(Self::NonResidue),
            1 => Some(Self::Residue),
            _ => None,
        }
    }

    pub fn symbol(self) -> i8 {
        match self {
            Self::Divides => 0,
            Self::NonResidue => -1,
            Self::Residue => 1,
        }
    }
}

pub mod primefield;
pub mod sqrt;

#[test]
fn test_legendre_symbol() {
    for class in [Legendre::Divides, Legendre::NonResidue, Legendre::Residue] {
        assert_eq!(Legendre::from_symbol(class.symbol()), Some(class));
    }
    assert_eq!(Legendre::from_symbol(2), None);
}
