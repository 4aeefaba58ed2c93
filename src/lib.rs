pub extern crate serde;

/// Semantic error taxonomy shared by the validator and the evaluator.
pub mod errors;

/// Fully-owned version of each data structure.
/// These structures are the contract with the message decoding layer.
pub mod structs;

/// Tools and helpers to consume messages.
pub mod consumers;

#[cfg(test)]
pub(crate) mod test_statements;

// Exports.
pub use consumers::evaluator::{Evaluator, ZKBackend};
pub use consumers::validator::Validator;
pub use errors::SemanticError;
pub use structs::{
    gates::Gate, header::Header, instance::Instance, message::Message, messages::Messages,
    relation::Relation, value::Value, witness::Witness, WireId,
};

/// File extension used by the binary framing layer for serialized messages.
pub const FILE_EXTENSION: &str = "sieve";

// Common definitions.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
