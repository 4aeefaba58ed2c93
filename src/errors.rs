use crate::WireId;
use thiserror::Error;

/// All semantic violations the validator and the evaluator can detect.
/// The evaluator fails fast on the first one; the validator aggregates their
/// rendered messages, except scoping corruption which aborts the pass.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SemanticError {
    #[error("Wire_{0} already has a value in this scope.")]
    DoubleAssignment(WireId),

    #[error("Wire_{0} is used but was not assigned a value.")]
    UseBeforeDef(WireId),

    #[error("Wire_{0} is used after having been freed.")]
    UseAfterFree(WireId),

    #[error("Wire_{0} has already been freed.")]
    DoubleFree(WireId),

    #[error("Wire_{0} is freed but was never assigned a value.")]
    FreeUnassigned(WireId),

    #[error("Wrong number of {role} wires in call to {name} (expected {expected} / got {actual}).")]
    ArityMismatch {
        name: String,
        role: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Not enough {0} values to consume.")]
    StreamExhausted(&'static str),

    #[error("Wire_{0} should be 0, while it is not.")]
    AssertionViolated(WireId),

    #[error("The value of the condition wire_{0} matches none of the case values.")]
    NoMatchingCase(WireId),

    #[error("Gate {0} is not part of the declared gateset.")]
    GatesetViolation(&'static str),

    #[error("The {0} feature is used but not declared.")]
    FeatureViolation(&'static str),

    #[error("Iterator expression value {numer} is not divisible by {denom}.")]
    InexactDivision { numer: u64, denom: u64 },

    #[error("Iterator expression overflows a 64-bit wire number ({0}).")]
    IteratorOverflow(String),

    #[error("Unknown iterator {0}.")]
    UnknownIterator(String),

    #[error("Unknown function {0}.")]
    UnknownFunction(String),

    #[error("A function with the name {0} already exists.")]
    DuplicateFunction(String),
}
