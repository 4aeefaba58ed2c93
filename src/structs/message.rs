use serde::{Deserialize, Serialize};

use crate::{Instance, Relation, Witness};

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Message {
    Instance(Instance),
    Witness(Witness),
    Relation(Relation),
}
