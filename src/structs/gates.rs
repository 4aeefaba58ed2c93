use serde::{Deserialize, Serialize};

use super::function::{CaseInvoke, ForLoopBody};
use super::wire::WireList;
use crate::{Value, WireId};

/// This one corresponds to Directive in the binary schema.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Gate {
    /// Constant(output, constant)
    Constant(WireId, Value),
    /// AssertZero(input)
    AssertZero(WireId),
    /// Copy(output, input)
    Copy(WireId, WireId),
    /// Add(output, input, input)
    Add(WireId, WireId, WireId),
    /// Mul(output, input, input)
    Mul(WireId, WireId, WireId),
    /// AddConstant(output, input, constant)
    AddConstant(WireId, WireId, Value),
    /// MulConstant(output, input, constant)
    MulConstant(WireId, WireId, Value),
    /// And(output, input, input)
    And(WireId, WireId, WireId),
    /// Xor(output, input, input)
    Xor(WireId, WireId, WireId),
    /// Not(output, input)
    Not(WireId, WireId),
    /// Instance(output)
    Instance(WireId),
    /// Witness(output)
    Witness(WireId),
    /// Free(first, last)
    /// If the option is not given, then only the first wire is freed, otherwise all wires between
    /// the first and the last INCLUSIVE are freed.
    Free(WireId, Option<WireId>),
    /// AnonCall(output_wires, input_wires, instance_count, witness_count, subcircuit)
    AnonCall(WireList, WireList, usize, usize, Vec<Gate>),
    /// GateCall(name, output_wires, input_wires)
    Call(String, WireList, WireList),
    /// GateSwitch(condition, output_wires, cases, branches)
    Switch(WireId, WireList, Vec<Value>, Vec<CaseInvoke>),
    /// GateFor(iterator_name, start_val, end_val, global_output_list, body)
    For(String, u64, u64, WireList, ForLoopBody),
}

impl Gate {
    /// The name of this gate in the textual gateset/feature grammar.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Constant(_, _) => "@constant",
            Gate::AssertZero(_) => "@assert_zero",
            Gate::Copy(_, _) => "@copy",
            Gate::Add(_, _, _) => "@add",
            Gate::Mul(_, _, _) => "@mul",
            Gate::AddConstant(_, _, _) => "@addc",
            Gate::MulConstant(_, _, _) => "@mulc",
            Gate::And(_, _, _) => "@and",
            Gate::Xor(_, _, _) => "@xor",
            Gate::Not(_, _) => "@not",
            Gate::Instance(_) => "@instance",
            Gate::Witness(_) => "@short_witness",
            Gate::Free(_, _) => "@free",
            Gate::AnonCall(_, _, _, _, _) => "@anon_call",
            Gate::Call(_, _, _) => "@call",
            Gate::Switch(_, _, _, _) => "@switch",
            Gate::For(_, _, _, _, _) => "@for",
        }
    }
}
