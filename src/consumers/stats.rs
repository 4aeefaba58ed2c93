use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::structs::function::{CaseInvoke, ForLoopBody};
use crate::structs::value::Value;
use crate::{Gate, Instance, Message, Relation, Witness};

/// Static occurrence counts over the directives of a statement. Bodies of
/// functions, branches and loops are counted once, not unrolled.
#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GateStats {
    // Inputs.
    pub instance_gates: usize,
    pub witness_gates: usize,
    // Gates.
    pub constants_gates: usize,
    pub assert_zero_gates: usize,
    pub copy_gates: usize,
    pub add_gates: usize,
    pub mul_gates: usize,
    pub add_constant_gates: usize,
    pub mul_constant_gates: usize,
    pub and_gates: usize,
    pub xor_gates: usize,
    pub not_gates: usize,
    pub wires_freed: usize,

    pub functions_defined: usize,
    pub functions_called: usize,
    pub anon_calls: usize,
    pub switches: usize,
    pub branches: usize,
    pub for_loops: usize,

    // The number of messages into which the statement was split.
    pub instance_messages: usize,
    pub witness_messages: usize,
    pub relation_messages: usize,

    pub instance_values: usize,
    pub witness_values: usize,
}

#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Stats {
    // Header.
    pub moduli: Vec<Value>,

    pub gate_stats: GateStats,

    // name => stats of the function body
    pub functions: HashMap<String, GateStats>,
}

impl Stats {
    pub fn from_messages(messages: impl Iterator<Item = crate::Result<Message>>) -> Self {
        let mut stats = Stats::default();
        messages.for_each(|msg| stats.ingest_message(&msg.unwrap()));
        stats
    }

    pub fn ingest_message(&mut self, msg: &Message) {
        match msg {
            Message::Instance(i) => self.ingest_instance(i),
            Message::Witness(w) => self.ingest_witness(w),
            Message::Relation(r) => self.ingest_relation(r),
        }
    }

    pub fn ingest_instance(&mut self, instance: &Instance) {
        self.ingest_modulus(&instance.header.field_characteristic);
        self.gate_stats.instance_messages += 1;
        self.gate_stats.instance_values += instance.common_inputs.len();
    }

    pub fn ingest_witness(&mut self, witness: &Witness) {
        self.ingest_modulus(&witness.header.field_characteristic);
        self.gate_stats.witness_messages += 1;
        self.gate_stats.witness_values += witness.short_witness.len();
    }

    pub fn ingest_relation(&mut self, relation: &Relation) {
        self.ingest_modulus(&relation.header.field_characteristic);
        self.gate_stats.relation_messages += 1;

        for function in relation.functions.iter() {
            self.gate_stats.functions_defined += 1;
            let mut function_stats = GateStats::default();
            for gate in function.body.iter() {
                ingest_gate(&mut function_stats, gate);
            }
            self.functions
                .insert(function.name.clone(), function_stats);
        }

        for gate in relation.gates.iter() {
            ingest_gate(&mut self.gate_stats, gate);
        }
    }

    fn ingest_modulus(&mut self, modulus: &[u8]) {
        let modulus = modulus.to_vec();
        if !self.moduli.contains(&modulus) {
            self.moduli.push(modulus);
        }
    }
}

fn ingest_gate(stats: &mut GateStats, gate: &Gate) {
    use Gate::*;

    match gate {
        Constant(_, _) => stats.constants_gates += 1,
        AssertZero(_) => stats.assert_zero_gates += 1,
        Copy(_, _) => stats.copy_gates += 1,
        Add(_, _, _) => stats.add_gates += 1,
        Mul(_, _, _) => stats.mul_gates += 1,
        AddConstant(_, _, _) => stats.add_constant_gates += 1,
        MulConstant(_, _, _) => stats.mul_constant_gates += 1,
        And(_, _, _) => stats.and_gates += 1,
        Xor(_, _, _) => stats.xor_gates += 1,
        Not(_, _) => stats.not_gates += 1,
        Instance(_) => stats.instance_gates += 1,
        Witness(_) => stats.witness_gates += 1,
        Free(first, last) => {
            stats.wires_freed += (last.unwrap_or(*first) - *first + 1) as usize
        }
        Call(_, _, _) => stats.functions_called += 1,
        AnonCall(_, _, _, _, subcircuit) => {
            stats.anon_calls += 1;
            for inner in subcircuit.iter() {
                ingest_gate(stats, inner);
            }
        }
        Switch(_, _, _, branches) => {
            stats.switches += 1;
            stats.branches += branches.len();
            for branch in branches.iter() {
                match branch {
                    CaseInvoke::AbstractGateCall(_, _) => stats.functions_called += 1,
                    CaseInvoke::AbstractAnonCall(_, _, _, subcircuit) => {
                        stats.anon_calls += 1;
                        for inner in subcircuit.iter() {
                            ingest_gate(stats, inner);
                        }
                    }
                }
            }
        }
        For(_, _, _, _, body) => {
            stats.for_loops += 1;
            match body {
                ForLoopBody::IterExprCall(_, _, _) => stats.functions_called += 1,
                ForLoopBody::IterExprAnonCall(_, _, _, _, subcircuit) => {
                    stats.anon_calls += 1;
                    for inner in subcircuit.iter() {
                        ingest_gate(stats, inner);
                    }
                }
            }
        }
    }
}

#[test]
fn test_stats() -> crate::Result<()> {
    use crate::test_statements::*;

    let mut stats = Stats::default();
    stats.ingest_instance(&example_instance());
    stats.ingest_witness(&example_witness());
    stats.ingest_relation(&example_relation());

    assert_eq!(stats.moduli, vec![literal32(EXAMPLE_MODULUS)]);
    assert_eq!(stats.gate_stats.instance_messages, 1);
    assert_eq!(stats.gate_stats.witness_messages, 1);
    assert_eq!(stats.gate_stats.relation_messages, 1);
    assert_eq!(stats.gate_stats.instance_values, 3);
    assert_eq!(stats.gate_stats.witness_values, 4);

    assert_eq!(stats.gate_stats.functions_defined, 1);
    assert_eq!(stats.functions["com.example::mul"].mul_gates, 1);

    // one call at top level, three in the switch branches, one in a loop body
    assert_eq!(stats.gate_stats.functions_called, 5);
    assert_eq!(stats.gate_stats.switches, 1);
    assert_eq!(stats.gate_stats.branches, 2);
    assert_eq!(stats.gate_stats.anon_calls, 3);
    assert_eq!(stats.gate_stats.for_loops, 2);
    assert_eq!(stats.gate_stats.instance_gates, 6);
    assert_eq!(stats.gate_stats.witness_gates, 6);
    assert_eq!(stats.gate_stats.wires_freed, 8 + 43);

    Ok(())
}
