use derive_more::Display;

/// Reasons a multiplication table is rejected by [`Monoid::new`](crate::Monoid::new).
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum InvalidTable {
    #[display("table is empty")]
    Empty,

    #[display("row {row} has length {len}, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[display("entry ({i}, {j}) = {value} is out of range")]
    OutOfRange { i: usize, j: usize, value: usize },

    #[display("({a} * {b}) * {c} != {a} * ({b} * {c})")]
    NotAssociative { a: usize, b: usize, c: usize },

    #[display("expected exactly one two-sided identity, found {_0}")]
    NoIdentity(usize),
}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum ResolutionError {
    #[display("invalid monoid table: {_0}")]
    InputInvalid(InvalidTable),

    #[display("no idempotent fixes kernel vector {kindex}")]
    CoverImpossible { kindex: usize },

    #[display("resource limit exceeded: {_0}")]
    ResourceLimit(String),
}

impl std::error::Error for InvalidTable {}
impl std::error::Error for ResolutionError {}

impl From<InvalidTable> for ResolutionError {
    fn from(e: InvalidTable) -> Self {
        ResolutionError::InputInvalid(e)
    }
}

pub type Result<T> = std::result::Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = ResolutionError::from(InvalidTable::NotAssociative { a: 0, b: 1, c: 2 });
        assert_eq!(e.to_string(), "invalid monoid table: (0 * 1) * 2 != 0 * (1 * 2)");

        let e = ResolutionError::CoverImpossible { kindex: 3 };
        assert_eq!(e.to_string(), "no idempotent fixes kernel vector 3");

        let e = InvalidTable::NoIdentity(0);
        assert_eq!(e.to_string(), "expected exactly one two-sided identity, found 0");
    }
}
