use serde::{Deserialize, Serialize};

use crate::structs::value::Value;
use crate::structs::IR_VERSION;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Header {
    pub version: String,
    /// The prime order of the field, encoded least-significant-byte first.
    /// Trailing zero bytes may be omitted.
    pub field_characteristic: Value,
    /// Only fields of degree 1 are supported.
    pub field_degree: u32,
}

impl Default for Header {
    fn default() -> Self {
        Header {
            version: IR_VERSION.to_string(),
            field_characteristic: vec![],
            field_degree: 1,
        }
    }
}

impl Header {
    pub fn new(field_characteristic: Value) -> Self {
        Header {
            field_characteristic,
            ..Header::default()
        }
    }
}
