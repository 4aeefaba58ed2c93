use serde::{Deserialize, Serialize};

use super::gates::Gate;
use super::header::Header;
use crate::errors::SemanticError;
use crate::structs::function::Function;

// Arithmetic Gates
pub const ADD: u16 = 0x0001;
pub const ADDC: u16 = 0x0002;
pub const MUL: u16 = 0x0004;
pub const MULC: u16 = 0x0008;
pub const ARITH: u16 = ADD | ADDC | MUL | MULC;

// Boolean Gates
pub const XOR: u16 = 0x0100;
pub const AND: u16 = 0x0200;
pub const NOT: u16 = 0x0400;
pub const BOOL: u16 = XOR | AND | NOT;

// Toggle features
pub const FUNCTION: u16 = 0x1000;
pub const FOR: u16 = 0x2000;
pub const SWITCH: u16 = 0x4000;
pub const SIMPLE: u16 = 0x8000;

#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Relation {
    pub header: Header,
    pub gate_mask: u16,
    pub feat_mask: u16,
    pub functions: Vec<Function>,
    pub gates: Vec<Gate>,
}

impl Relation {
    /// The textual form of the declared gateset, as found in the wire format.
    pub fn gateset(&self) -> String {
        create_gateset_string(self.gate_mask)
    }

    /// The textual form of the declared features, as found in the wire format.
    pub fn features(&self) -> String {
        create_feature_string(self.feat_mask)
    }
}

pub fn parse_gate_set(gateset: impl Into<String>) -> u16 {
    let mut ret: u16 = 0x0000;
    for substr in gateset.into().split(',') {
        match substr.trim() {
            "arithmetic" => return ARITH,
            "@add" => ret |= ADD,
            "@addc" => ret |= ADDC,
            "@mul" => ret |= MUL,
            "@mulc" => ret |= MULC,

            "boolean" => return BOOL,
            "@xor" => ret |= XOR,
            "@not" => ret |= NOT,
            "@and" => ret |= AND,

            _ => { /* DO NOTHING */ }
        }
    }
    ret
}

pub fn create_gateset_string(gateset: u16) -> String {
    let mut gateset_val = gateset;
    let mut ret = String::new();
    while gateset_val != 0 {
        match gateset_val {
            _ if contains_feature(gateset_val, ARITH) => return "arithmetic".into(),
            _ if contains_feature(gateset_val, BOOL) => return "boolean".into(),
            _ if contains_feature(gateset_val, ADD) => {
                ret += "@add,";
                gateset_val ^= ADD;
            }
            _ if contains_feature(gateset_val, ADDC) => {
                ret += "@addc,";
                gateset_val ^= ADDC;
            }
            _ if contains_feature(gateset_val, MUL) => {
                ret += "@mul,";
                gateset_val ^= MUL;
            }
            _ if contains_feature(gateset_val, MULC) => {
                ret += "@mulc,";
                gateset_val ^= MULC;
            }

            _ if contains_feature(gateset_val, XOR) => {
                ret += "@xor,";
                gateset_val ^= XOR;
            }
            _ if contains_feature(gateset_val, NOT) => {
                ret += "@not,";
                gateset_val ^= NOT;
            }
            _ if contains_feature(gateset_val, AND) => {
                ret += "@and,";
                gateset_val ^= AND;
            }

            _ => { /* DO NOTHING */ }
        }
    }

    ret
}

pub fn parse_feature_toggle(features: impl Into<String>) -> u16 {
    let mut ret: u16 = 0x0000;
    for substr in features.into().split(',') {
        match substr.trim() {
            "simple" => return SIMPLE,
            "@function" => ret |= FUNCTION,
            "@for" => ret |= FOR,
            "@switch" => ret |= SWITCH,
            _ => { /* DO NOTHING */ }
        }
    }
    ret
}

pub fn create_feature_string(features: u16) -> String {
    let mut features_val = features;
    let mut ret = String::new();
    while features_val != 0 {
        match features_val {
            _ if contains_feature(features_val, SIMPLE) => return "simple".into(),
            _ if contains_feature(features_val, FOR) => {
                ret += "@for,";
                features_val ^= FOR;
            }
            _ if contains_feature(features_val, SWITCH) => {
                ret += "@switch,";
                features_val ^= SWITCH;
            }
            _ if contains_feature(features_val, FUNCTION) => {
                ret += "@function,";
                features_val ^= FUNCTION;
            }

            _ => { /* DO NOTHING */ }
        }
    }
    ret
}

pub fn contains_feature(feature_set: u16, feature: u16) -> bool {
    (feature_set & feature) == feature
}

/// Checks one gate against the declared gateset and feature toggles.
/// The validator aggregates the returned violation, the evaluator treats it
/// as fatal when the gate is reached.
pub fn check_gate_allowed(
    gate: &Gate,
    gate_mask: u16,
    feat_mask: u16,
) -> std::result::Result<(), SemanticError> {
    let required_gate = match gate {
        Gate::Add(_, _, _) => Some(ADD),
        Gate::AddConstant(_, _, _) => Some(ADDC),
        Gate::Mul(_, _, _) => Some(MUL),
        Gate::MulConstant(_, _, _) => Some(MULC),
        Gate::And(_, _, _) => Some(AND),
        Gate::Xor(_, _, _) => Some(XOR),
        Gate::Not(_, _) => Some(NOT),
        _ => None,
    };
    if let Some(bit) = required_gate {
        if !contains_feature(gate_mask, bit) {
            return Err(SemanticError::GatesetViolation(gate.name()));
        }
    }

    let required_feature = match gate {
        Gate::Call(_, _, _) | Gate::AnonCall(_, _, _, _, _) => Some(("@function", FUNCTION)),
        Gate::For(_, _, _, _, _) => Some(("@for", FOR)),
        Gate::Switch(_, _, _, _) => Some(("@switch", SWITCH)),
        _ => None,
    };
    if let Some((name, bit)) = required_feature {
        if !contains_feature(feat_mask, bit) {
            return Err(SemanticError::FeatureViolation(name));
        }
    }
    Ok(())
}

#[test]
fn test_parse_gate_set() -> crate::Result<()> {
    assert_eq!(parse_gate_set("arithmetic"), ARITH);
    assert_eq!(parse_gate_set("boolean"), BOOL);
    assert_eq!(parse_gate_set("arithmetic,@add"), ARITH | ADD);
    assert_eq!(parse_gate_set("@add,@addc,"), ADD | ADDC);
    assert_eq!(parse_gate_set("@add , @mulc , @mul "), ADD | MULC | MUL);
    assert_eq!(parse_gate_set("@add,@add,@mul"), ADD | MUL);
    assert_eq!(parse_gate_set("@add,@addc,@mulc,@mul"), ARITH);

    assert_eq!(parse_gate_set("boolean"), BOOL);
    assert_eq!(parse_gate_set("boolean,@xor"), BOOL | XOR);
    assert_eq!(parse_gate_set("@xor,@and,@not"), XOR | AND | NOT);
    assert_eq!(parse_gate_set(" @xor ,@and , @not"), XOR | AND | NOT);
    assert_eq!(parse_gate_set("@xor,@and,@not"), BOOL);

    assert_eq!(parse_gate_set("boolean,arithmetic"), BOOL);
    assert_eq!(parse_gate_set("arithmetic,boolean"), ARITH);

    Ok(())
}

#[test]
fn test_create_gateset_string() -> crate::Result<()> {
    assert_eq!(create_gateset_string(ARITH), "arithmetic");
    assert_eq!(create_gateset_string(ARITH | ADD), "arithmetic");
    assert_eq!(create_gateset_string(ADD | ADDC), "@add,@addc,");
    assert_eq!(create_gateset_string(ADD | MULC | MUL), "@add,@mul,@mulc,");
    assert_eq!(create_gateset_string(ADD | MUL), "@add,@mul,");

    assert_eq!(create_gateset_string(BOOL), "boolean");
    assert_eq!(create_gateset_string(BOOL | XOR), "boolean");
    assert_eq!(create_gateset_string(XOR | AND), "@xor,@and,");
    assert_eq!(create_gateset_string(XOR | NOT), "@xor,@not,");
    assert_eq!(create_gateset_string(XOR | AND | NOT), "boolean");

    Ok(())
}

#[test]
fn test_parse_feature_toggle() -> crate::Result<()> {
    assert_eq!(parse_feature_toggle("simple"), SIMPLE);
    assert_eq!(parse_feature_toggle("@function"), FUNCTION);
    assert_eq!(parse_feature_toggle("@function,@for"), FUNCTION | FOR);
    assert_eq!(
        parse_feature_toggle("@for, @switch , @function"),
        FUNCTION | FOR | SWITCH
    );

    Ok(())
}
