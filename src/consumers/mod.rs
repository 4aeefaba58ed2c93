/// The Validator checks the format and semantics of a statement.
pub mod validator;

/// The Evaluator determines whether a statement is true by evaluating the circuit using the short witness.
pub mod evaluator;

/// Scope frames track which wires are live, assigned, or freed within one execution context.
pub mod scope;

/// Stats aggregates statistics about a circuit.
pub mod stats;
