use serde::{Deserialize, Serialize};

use crate::structs::iterators::IterExprList;
use crate::structs::wire::WireList;
use crate::Gate;

// ******************************
//
//   Functions declaration
//    (used everywhere)
// ******************************

/// This structure handles the declaration of a function.
/// Output wires of the body are numbered `0..output_count`, input wires
/// `output_count..output_count+input_count`.
#[derive(Clone, Default, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Function {
    pub name: String,
    pub output_count: usize,
    pub input_count: usize,
    pub instance_count: usize,
    pub witness_count: usize,
    pub body: Vec<Gate>,
}

impl Function {
    /// Default constructor
    pub fn new(
        name: String,
        output_count: usize,
        input_count: usize,
        instance_count: usize,
        witness_count: usize,
        body: Vec<Gate>,
    ) -> Self {
        Function {
            name,
            output_count,
            input_count,
            instance_count,
            witness_count,
            body,
        }
    }
}

// ******************************
//
//   CaseInvoke (for switches)
//
// ******************************

/// The body of one switch branch, paired positionally with its case value.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum CaseInvoke {
    /// AbstractGateCall(name, input_wires)
    AbstractGateCall(String, WireList),
    /// AbstractAnonCall(input_wires, instance_count, witness_count, subcircuit)
    AbstractAnonCall(WireList, usize, usize, Vec<Gate>),
}

// ******************************
//
//   ForLoopBody (for loops)
//
// ******************************

/// The body of a For loop, invoked once per iteration after resolving its
/// iterator expressions into concrete wire numbers.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum ForLoopBody {
    /// IterExprCall(name, output_wires, input_wires)
    IterExprCall(String, IterExprList, IterExprList),
    /// IterExprAnonCall(output_wires, input_wires, instance_count, witness_count, subcircuit)
    IterExprAnonCall(IterExprList, IterExprList, usize, usize, Vec<Gate>),
}
