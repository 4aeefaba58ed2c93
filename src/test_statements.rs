//! Example statements shared by the in-crate tests.
//!
//! The main statement is a right-triangle check combined with a switch on a
//! witness value and two bounded loops computing a Fibonacci sequence, so that
//! every control construct is exercised at least once.

use num_bigint::BigUint;

use crate::structs::function::CaseInvoke::AbstractAnonCall;
use crate::structs::function::{ForLoopBody, Function};
use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
use crate::structs::relation::{ADD, FOR, FUNCTION, MUL, MULC, SWITCH};
use crate::structs::wire::WireListElement::WireRange;
use crate::wirelist;
use crate::{Gate, Header, Instance, Relation, Witness};

pub const EXAMPLE_MODULUS: u32 = 101;

pub fn literal32(v: u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

pub fn encode_negative_one(header: &Header) -> Vec<u8> {
    let mut neg_one = header.field_characteristic.clone();
    assert!(!neg_one.is_empty() && neg_one[0] > 0, "Invalid field order");
    neg_one[0] -= 1;
    neg_one
}

pub fn example_header() -> Header {
    Header::new(literal32(EXAMPLE_MODULUS))
}

pub fn example_instance() -> Instance {
    Instance {
        header: example_header(),
        common_inputs: vec![literal32(25), literal32(0), literal32(1)],
    }
}

pub fn example_witness() -> Witness {
    let modulus = BigUint::from_bytes_le(&example_header().field_characteristic);
    let fibonacci_22 = BigUint::from(17711u64) % modulus;
    Witness {
        header: example_header(),
        short_witness: vec![
            literal32(3),
            literal32(4),
            literal32(0),
            fibonacci_22.to_bytes_le(),
        ],
    }
}

pub fn example_witness_incorrect() -> Witness {
    Witness {
        header: example_header(),
        short_witness: vec![
            literal32(3),
            literal32(4 + 1), // incorrect.
            literal32(1),     // incorrect.
            literal32(40),    // incorrect.
        ],
    }
}

pub fn example_relation() -> Relation {
    use crate::Gate::*;

    let header = example_header();
    Relation {
        header: header.clone(),
        gate_mask: ADD | MUL | MULC,
        feat_mask: FUNCTION | SWITCH | FOR,
        functions: vec![Function::new(
            "com.example::mul".to_string(),
            1,
            2,
            0,
            0,
            vec![Mul(0, 1, 2)],
        )],
        gates: vec![
            Witness(1),
            Switch(
                1,                                   // condition
                wirelist![0, 2, 4, 5, 6, 9, 10, 11], // output wires
                vec![vec![3], vec![5]],              // cases
                vec![
                    // branches
                    AbstractAnonCall(
                        // WireList, usize, usize, Vec<Gate>
                        wirelist![1],
                        3,
                        3,
                        vec![
                            Instance(0), // In Global Namespace: Instance(0)
                            Witness(1),  // In Global Namespace: Witness(2)
                            Call(
                                "com.example::mul".to_string(),
                                wirelist![2],
                                wirelist![8; 2],
                            ), // In Global Namespace: Mul(4, 1, 1)
                            Call(
                                "com.example::mul".to_string(),
                                wirelist![3],
                                wirelist![1; 2],
                            ), // In Global Namespace: Mul(5, 2, 2)
                            Add(4, 2, 3), // In Global Namespace: Add(6, 4, 5)
                            Witness(9),
                            AssertZero(9), // This witness is indeed zero, so check that in a branch.
                            Instance(6),
                            AssertZero(6),
                            Instance(7),
                            Witness(5),
                        ],
                    ),
                    // remapping local-to-global namespaces: [0, 2, 4, 5, 6] || [1] = [0, 2, 4, 5, 6, 1]
                    AbstractAnonCall(
                        wirelist![1],
                        3,
                        2,
                        vec![
                            Instance(0),
                            Call(
                                "com.example::mul".to_string(),
                                wirelist![1],
                                wirelist![8, 0],
                            ),
                            Witness(2),
                            Mul(3, 1, 2),
                            Add(4, 2, 3),
                            Instance(5),
                            Instance(6),
                            Witness(7),
                            AssertZero(5), // its value is actually 0, so this assert passes in this branch.
                            AssertZero(0), // '0' is not zero in this branch, but this branch is only taken when the condition is 5.
                        ],
                    ),
                ],
            ),
            Constant(3, encode_negative_one(&header)), // -1
            Call(
                "com.example::mul".to_string(),
                wirelist![7],
                wirelist![3, 0],
            ), // - instance_0
            Add(8, 6, 7),     // sum - instance_0
            Free(0, Some(7)), // Free all previous wires
            AssertZero(8),    // difference == 0
            For(
                "i".into(),
                0,
                20,
                vec![WireRange(12, 32)],
                ForLoopBody::IterExprAnonCall(
                    vec![Single(IterExprAdd(
                        Box::new(IterExprName("i".into())),
                        Box::new(IterExprConst(12)),
                    ))], // i + 12
                    vec![
                        Single(IterExprAdd(
                            Box::new(IterExprName("i".into())),
                            Box::new(IterExprConst(10)),
                        )),
                        Single(IterExprAdd(
                            Box::new(IterExprName("i".into())),
                            Box::new(IterExprConst(11)),
                        )),
                    ],
                    0,
                    0,
                    vec![Add(0, 1, 2)],
                ),
            ),
            MulConstant(33, 32, encode_negative_one(&header)), // multiply by -1
            Add(34, 9, 33),
            AssertZero(34),
            // second loop, reusing the same loop iterator
            For(
                "i".into(),
                35,
                50,
                vec![WireRange(35, 50)],
                ForLoopBody::IterExprCall(
                    "com.example::mul".to_string(),
                    vec![Single(IterExprName("i".into()))], // i
                    vec![
                        Single(IterExprSub(
                            Box::new(IterExprName("i".into())),
                            Box::new(IterExprConst(1)),
                        )),
                        Single(IterExprSub(
                            Box::new(IterExprName("i".into())),
                            Box::new(IterExprConst(2)),
                        )),
                    ],
                ),
            ),
            Free(8, Some(50)),
        ],
    }
}

/// A minimal arithmetic relation around the given gates, without functions.
pub fn simple_relation(gate_mask: u16, feat_mask: u16, gates: Vec<Gate>) -> Relation {
    Relation {
        header: example_header(),
        gate_mask,
        feat_mask,
        functions: vec![],
        gates,
    }
}

pub fn instance_of(values: Vec<u32>) -> Instance {
    Instance {
        header: example_header(),
        common_inputs: values.into_iter().map(literal32).collect(),
    }
}

pub fn witness_of(values: Vec<u32>) -> Witness {
    Witness {
        header: example_header(),
        short_witness: values.into_iter().map(literal32).collect(),
    }
}
