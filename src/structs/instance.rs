use serde::{Deserialize, Serialize};

use super::header::Header;
use crate::structs::value::Value;

#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Instance {
    pub header: Header,
    pub common_inputs: Vec<Value>,
}
