use serde::{Deserialize, Serialize};

use super::header::Header;
use crate::structs::value::Value;

#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Witness {
    pub header: Header,
    pub short_witness: Vec<Value>,
}
