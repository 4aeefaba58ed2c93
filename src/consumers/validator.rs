use num_bigint::BigUint;
use num_traits::identities::One;
use regex::Regex;
use std::cmp::{max, Ordering};
use std::collections::HashMap;

use crate::consumers::scope::WireFrame;
use crate::errors::SemanticError;
use crate::structs::function::{CaseInvoke, ForLoopBody};
use crate::structs::iterators::evaluate_iterexpr_list;
use crate::structs::relation::check_gate_allowed;
use crate::structs::value::{is_probably_prime, value_to_biguint};
use crate::structs::wire::expand_wirelist;
use crate::{Gate, Header, Instance, Messages, Relation, Result, WireId, Witness};

type Field = BigUint;

/// Used to check the validity of the version.
const VERSION_REGEX: &str = r"^\d+\.\d+\.\d+$";
/// Used to check the validity of names of functions / iterators
const NAMES_REGEX: &str = r"^[a-zA-Z_][\w]*(?:(?:\.|:{2})[a-zA-Z_][\w]*)*$";

const IMPLEMENTED_CHECKS: &str = r"
Here is the list of implemented semantic/syntactic checks:

Header Validation
 - Ensure that the field characteristic is strictly greater than 1, and is a prime.
 - Ensure that the field degree is exactly 1.
 - Ensure that the version string has the correct format (e.g. matches the following regular expression '^\d+\.\d+\.\d+$').
 - Ensure header messages are coherent (same version, characteristic and degree).

Inputs Validation (Instance / Witness)
 - Ensure that Instance and Witness values are actual field elements (strictly smaller than the characteristic).
 - Ensure that instance and witness values are consumed exactly once, in order, and that none is left at the end.

Gateset / Features Validation
 - Ensure that every gate belongs to the declared gateset.
 - Ensure that function/for/switch constructs are only used when the corresponding feature is declared.

Gates Validation
 - Ensure that constants given in @addc/@mulc are actual field elements.
 - Ensure that input wires of gates map to an already assigned wire of the current scope.
 - Enforce single assignment: a wire is assigned at most once per scope, and never again after being freed.
 - Ensure that freed wires were assigned, and freed at most once.
 - Ensure that function declarations are unique, properly named, and that their body consumes
   exactly the declared number of instance and witness values.
 - Ensure that call sites match the declared arities.
 - Ensure that the wires defined by the iterations of a For loop match the declared output list.
 - Ensure that the case values of a Switch are pairwise distinct field elements.
";

/// Declared counts of a known function, kept once its body has been validated.
#[derive(Clone)]
struct FunctionCounts {
    output_count: usize,
    input_count: usize,
    instance_count: usize,
    witness_count: usize,
}

/// The `Validator` checks the format and the semantics of a statement without
/// evaluating any arithmetic: the same scoping, arity and stream-consumption
/// rules as the evaluation engine run here in shape-only mode.
///
/// Structural violations are aggregated so one pass surfaces as many
/// diagnostics as possible; scoping corruption (use of an unassigned or freed
/// wire, a double assignment or a double free) aborts the pass since
/// everything after it would be checked against an undefined state.
#[derive(Default)]
pub struct Validator {
    as_prover: bool,

    instance_values_left: u64,
    witness_values_left: u64,

    got_header: bool,
    header_version: String,
    field_characteristic: Field,
    field_degree: u32,

    gate_mask: u16,
    feat_mask: u16,

    known_functions: HashMap<String, FunctionCounts>,
    root_frame: WireFrame<()>,

    violations: Vec<String>,
    aborted: bool,
}

impl Validator {
    pub fn new_as_verifier() -> Validator {
        Validator::default()
    }

    pub fn new_as_prover() -> Validator {
        Validator {
            as_prover: true,
            ..Default::default()
        }
    }

    pub fn print_implemented_checks() {
        println!("{}", IMPLEMENTED_CHECKS);
    }

    pub fn ingest_messages(&mut self, messages: &Messages) {
        for instance in &messages.instances {
            self.ingest_instance(instance);
        }
        if self.as_prover {
            for witness in &messages.witnesses {
                self.ingest_witness(witness);
            }
        }
        for relation in &messages.relations {
            self.ingest_relation(relation);
        }
    }

    /// Returns the aggregated list of violations. It consumes `self`.
    pub fn get_violations(mut self) -> Vec<String> {
        if !self.aborted {
            self.ensure_all_instance_values_consumed();
            self.ensure_all_witness_values_consumed();
        }
        self.violations
    }

    pub fn get_strict_violations(&self) -> &Vec<String> {
        &self.violations
    }

    pub fn how_many_violations(&self) -> usize {
        self.violations.len()
    }

    fn ingest_header(&mut self, header: &Header) {
        if self.got_header {
            // in this case, ensure that headers are compatible
            if self.field_characteristic != value_to_biguint(&header.field_characteristic) {
                self.violate("The field_characteristic is not consistent across headers.");
            }
            if self.field_degree != header.field_degree {
                self.violate("The field_degree is not consistent across headers.");
            }
            if self.header_version != header.version {
                self.violate("The version is not consistent across headers.");
            }
        } else {
            self.got_header = true;

            // Check validity of field_characteristic
            self.field_characteristic = value_to_biguint(&header.field_characteristic);
            if self.field_characteristic.cmp(&One::one()) != Ordering::Greater {
                self.violate("The field_characteristic should be > 1.");
            } else if !is_probably_prime(&header.field_characteristic) {
                self.violate("The field_characteristic should be a prime.");
            }

            self.field_degree = header.field_degree;
            if self.field_degree != 1 {
                self.violate("The field_degree must be exactly 1 (extension fields are not supported).");
            }

            // check version
            let re = Regex::new(VERSION_REGEX).unwrap();
            if !re.is_match(header.version.trim()) {
                self.violate(
                    "The version should match the following format <major>.<minor>.<patch>.",
                );
            }
            self.header_version = header.version.clone();
        }
    }

    pub fn ingest_instance(&mut self, instance: &Instance) {
        if self.aborted {
            return;
        }
        self.ingest_header(&instance.header);

        for value in instance.common_inputs.iter() {
            self.ensure_value_in_field(value, || format!("instance value {:?}", value));
        }
        self.instance_values_left += instance.common_inputs.len() as u64;
    }

    pub fn ingest_witness(&mut self, witness: &Witness) {
        if self.aborted {
            return;
        }
        if !self.as_prover {
            self.violate("As verifier, got an unexpected Witness message.");
        }
        self.ingest_header(&witness.header);

        for value in witness.short_witness.iter() {
            self.ensure_value_in_field(value, || format!("witness value {:?}", value));
        }
        self.witness_values_left += witness.short_witness.len() as u64;
    }

    pub fn ingest_relation(&mut self, relation: &Relation) {
        if self.aborted {
            return;
        }
        self.ingest_header(&relation.header);
        self.gate_mask = relation.gate_mask;
        self.feat_mask = relation.feat_mask;

        for function in relation.functions.iter() {
            // Check that the name follows the proper REGEX
            let re = Regex::new(NAMES_REGEX).unwrap();
            if !re.is_match(function.name.trim()) {
                self.violate(format!(
                    "The function name ({}) should match the proper format ({}).",
                    function.name, NAMES_REGEX
                ));
            }

            if self.known_functions.contains_key(&function.name) {
                self.violate(SemanticError::DuplicateFunction(function.name.clone()).to_string());
                continue;
            }

            // The body is checked against the declared counts before the
            // function becomes callable, so a function can never call itself.
            let status = self.ingest_custom_subcircuit(
                &function.body,
                function.output_count,
                function.input_count,
                function.instance_count,
                function.witness_count,
                &HashMap::new(),
            );
            if let Err(err) = status {
                self.violate(err.to_string());
                self.aborted = true;
                return;
            }

            self.known_functions.insert(
                function.name.clone(),
                FunctionCounts {
                    output_count: function.output_count,
                    input_count: function.input_count,
                    instance_count: function.instance_count,
                    witness_count: function.witness_count,
                },
            );
        }

        let mut frame = std::mem::take(&mut self.root_frame);
        let mut known_iterators = HashMap::new();
        for gate in relation.gates.iter() {
            if let Err(err) = self.ingest_gate(gate, &mut frame, &mut known_iterators) {
                self.violate(err.to_string());
                self.aborted = true;
                break;
            }
        }
        self.root_frame = frame;
    }

    /// Checks one gate in the given scope frame. Aggregable violations are
    /// recorded and `Ok` is returned; scoping corruption comes back as `Err`
    /// and stops the whole pass.
    fn ingest_gate(
        &mut self,
        gate: &Gate,
        frame: &mut WireFrame<()>,
        known_iterators: &mut HashMap<String, u64>,
    ) -> Result<()> {
        use Gate::*;

        if let Err(err) = check_gate_allowed(gate, self.gate_mask, self.feat_mask) {
            self.violate(err.to_string());
        }

        match gate {
            Constant(out, value) => {
                self.ensure_value_in_field(value, || "Gate::Constant constant".to_string());
                frame.assign(*out, ())?;
            }

            AssertZero(inp) => {
                // The arithmetic check is the evaluator's job; only liveness here.
                frame.get(*inp)?;
            }

            Copy(out, inp) => {
                frame.get(*inp)?;
                frame.assign(*out, ())?;
            }

            Add(out, left, right) | Mul(out, left, right) | And(out, left, right)
            | Xor(out, left, right) => {
                frame.get(*left)?;
                frame.get(*right)?;
                frame.assign(*out, ())?;
            }

            AddConstant(out, inp, constant) => {
                self.ensure_value_in_field(constant, || format!("Gate::AddConstant_{}", *out));
                frame.get(*inp)?;
                frame.assign(*out, ())?;
            }

            MulConstant(out, inp, constant) => {
                self.ensure_value_in_field(constant, || format!("Gate::MulConstant_{}", *out));
                frame.get(*inp)?;
                frame.assign(*out, ())?;
            }

            Not(out, inp) => {
                frame.get(*inp)?;
                frame.assign(*out, ())?;
            }

            Instance(out) => {
                frame.assign(*out, ())?;
                self.consume_instances(1);
            }

            Witness(out) => {
                frame.assign(*out, ())?;
                self.consume_witnesses(1);
            }

            Free(first, last) => {
                frame.free_range(*first, last.unwrap_or(*first))?;
            }

            Call(name, output_wires, input_wires) => {
                let expanded_output = match expand_wirelist(output_wires) {
                    Ok(list) => list,
                    Err(err) => {
                        self.violate(err.to_string());
                        return Ok(());
                    }
                };
                let expanded_input = match expand_wirelist(input_wires) {
                    Ok(list) => list,
                    Err(err) => {
                        self.violate(err.to_string());
                        return Ok(());
                    }
                };

                match self.known_functions.get(name).cloned() {
                    None => {
                        self.violate(SemanticError::UnknownFunction(name.clone()).to_string());
                        // Keep scanning with the outputs treated as assigned.
                        self.declare_outputs(frame, &expanded_output)?;
                    }
                    Some(counts) => {
                        self.check_arity(name, "output", counts.output_count, expanded_output.len());
                        self.check_arity(name, "input", counts.input_count, expanded_input.len());
                        for wire in expanded_input.iter() {
                            frame.get(*wire)?;
                        }
                        self.declare_outputs(frame, &expanded_output)?;
                        self.consume_instances(counts.instance_count as u64);
                        self.consume_witnesses(counts.witness_count as u64);
                    }
                }
            }

            AnonCall(output_wires, input_wires, instance_count, witness_count, subcircuit) => {
                let expanded_output = match expand_wirelist(output_wires) {
                    Ok(list) => list,
                    Err(err) => {
                        self.violate(err.to_string());
                        return Ok(());
                    }
                };
                let expanded_input = match expand_wirelist(input_wires) {
                    Ok(list) => list,
                    Err(err) => {
                        self.violate(err.to_string());
                        return Ok(());
                    }
                };

                for wire in expanded_input.iter() {
                    frame.get(*wire)?;
                }
                self.ingest_custom_subcircuit(
                    subcircuit,
                    expanded_output.len(),
                    expanded_input.len(),
                    *instance_count,
                    *witness_count,
                    known_iterators,
                )?;
                self.declare_outputs(frame, &expanded_output)?;
                self.consume_instances(*instance_count as u64);
                self.consume_witnesses(*witness_count as u64);
            }

            For(iterator_name, start_val, end_val, global_output_list, body) => {
                let re = Regex::new(NAMES_REGEX).unwrap();
                if !re.is_match(iterator_name.trim()) {
                    self.violate(format!(
                        "The iterator name ({}) should match the proper format ({}).",
                        iterator_name, NAMES_REGEX
                    ));
                }

                // A nested loop reusing the name of an enclosing iterator
                // shadows it for the duration of this loop only.
                let shadowed = known_iterators.remove(iterator_name);
                let mut collected_outputs: Vec<WireId> = vec![];
                let mut fatal: Option<Box<dyn std::error::Error>> = None;

                'iterations: for i in *start_val..=*end_val {
                    known_iterators.insert(iterator_name.clone(), i);

                    let (expanded_output, expanded_input) = match body {
                        ForLoopBody::IterExprCall(_, outputs, inputs)
                        | ForLoopBody::IterExprAnonCall(outputs, inputs, _, _, _) => {
                            let out = match evaluate_iterexpr_list(outputs, known_iterators) {
                                Ok(list) => list,
                                Err(err) => {
                                    self.violate(err.to_string());
                                    break 'iterations;
                                }
                            };
                            let inp = match evaluate_iterexpr_list(inputs, known_iterators) {
                                Ok(list) => list,
                                Err(err) => {
                                    self.violate(err.to_string());
                                    break 'iterations;
                                }
                            };
                            (out, inp)
                        }
                    };

                    for wire in expanded_input.iter() {
                        if let Err(err) = frame.get(*wire) {
                            fatal = Some(err);
                            break 'iterations;
                        }
                    }

                    match body {
                        ForLoopBody::IterExprCall(name, _, _) => {
                            match self.known_functions.get(name).cloned() {
                                None => {
                                    self.violate(
                                        SemanticError::UnknownFunction(name.clone()).to_string(),
                                    );
                                    break 'iterations;
                                }
                                Some(counts) => {
                                    self.check_arity(
                                        name,
                                        "output",
                                        counts.output_count,
                                        expanded_output.len(),
                                    );
                                    self.check_arity(
                                        name,
                                        "input",
                                        counts.input_count,
                                        expanded_input.len(),
                                    );
                                    self.consume_instances(counts.instance_count as u64);
                                    self.consume_witnesses(counts.witness_count as u64);
                                }
                            }
                        }
                        ForLoopBody::IterExprAnonCall(_, _, instance_count, witness_count, sub) => {
                            if let Err(err) = self.ingest_custom_subcircuit(
                                sub,
                                expanded_output.len(),
                                expanded_input.len(),
                                *instance_count,
                                *witness_count,
                                known_iterators,
                            ) {
                                fatal = Some(err);
                                break 'iterations;
                            }
                            self.consume_instances(*instance_count as u64);
                            self.consume_witnesses(*witness_count as u64);
                        }
                    }

                    if let Err(err) = self.declare_outputs(frame, &expanded_output) {
                        fatal = Some(err);
                        break 'iterations;
                    }
                    collected_outputs.extend(expanded_output);
                }

                known_iterators.remove(iterator_name);
                if let Some(outer) = shadowed {
                    known_iterators.insert(iterator_name.clone(), outer);
                }
                if let Some(err) = fatal {
                    return Err(err);
                }

                match expand_wirelist(global_output_list) {
                    Ok(declared) => {
                        if declared != collected_outputs {
                            self.violate(format!(
                                "For loop on iterator ({}): the wires assigned by the iterations ({:?}) do not match the declared output list ({:?}).",
                                iterator_name, collected_outputs, declared
                            ));
                        }
                    }
                    Err(err) => self.violate(err.to_string()),
                }
            }

            // The evaluator runs a single branch; the validator cannot know
            // which one, so every branch is checked independently for internal
            // well-formedness, and the canonical stream consumption is the
            // maximum of the declared counts over all branches.
            Switch(condition, output_wires, cases, branches) => {
                frame.get(*condition)?;

                if cases.len() != branches.len() {
                    self.violate(format!(
                        "Switch on wire_{}: {} case values for {} branches.",
                        *condition,
                        cases.len(),
                        branches.len()
                    ));
                    return Ok(());
                }

                // Case values must be pairwise distinct field elements.
                let mut case_values: Vec<Field> = vec![];
                for case in cases.iter() {
                    self.ensure_value_in_field(case, || format!("case value {:?}", case));
                    let case_value = value_to_biguint(case);
                    if case_values.contains(&case_value) {
                        self.violate(format!(
                            "Switch on wire_{}: the case value {} appears more than once.",
                            *condition, case_value
                        ));
                    }
                    case_values.push(case_value);
                }

                let expanded_output = match expand_wirelist(output_wires) {
                    Ok(list) => list,
                    Err(err) => {
                        self.violate(err.to_string());
                        return Ok(());
                    }
                };

                let mut max_instance_count: usize = 0;
                let mut max_witness_count: usize = 0;

                for branch in branches.iter() {
                    match branch {
                        CaseInvoke::AbstractGateCall(name, input_wires) => {
                            let expanded_input = match expand_wirelist(input_wires) {
                                Ok(list) => list,
                                Err(err) => {
                                    self.violate(err.to_string());
                                    continue;
                                }
                            };
                            for wire in expanded_input.iter() {
                                frame.get(*wire)?;
                            }
                            match self.known_functions.get(name).cloned() {
                                None => self.violate(
                                    SemanticError::UnknownFunction(name.clone()).to_string(),
                                ),
                                Some(counts) => {
                                    self.check_arity(
                                        name,
                                        "output",
                                        counts.output_count,
                                        expanded_output.len(),
                                    );
                                    self.check_arity(
                                        name,
                                        "input",
                                        counts.input_count,
                                        expanded_input.len(),
                                    );
                                    max_instance_count =
                                        max(max_instance_count, counts.instance_count);
                                    max_witness_count =
                                        max(max_witness_count, counts.witness_count);
                                }
                            }
                        }
                        CaseInvoke::AbstractAnonCall(
                            input_wires,
                            instance_count,
                            witness_count,
                            subcircuit,
                        ) => {
                            let expanded_input = match expand_wirelist(input_wires) {
                                Ok(list) => list,
                                Err(err) => {
                                    self.violate(err.to_string());
                                    continue;
                                }
                            };
                            for wire in expanded_input.iter() {
                                frame.get(*wire)?;
                            }
                            self.ingest_custom_subcircuit(
                                subcircuit,
                                expanded_output.len(),
                                expanded_input.len(),
                                *instance_count,
                                *witness_count,
                                known_iterators,
                            )?;
                            max_instance_count = max(max_instance_count, *instance_count);
                            max_witness_count = max(max_witness_count, *witness_count);
                        }
                    }
                }

                self.declare_outputs(frame, &expanded_output)?;
                self.consume_instances(max_instance_count as u64);
                self.consume_witnesses(max_witness_count as u64);
            }
        }
        Ok(())
    }

    /// This function checks the semantic validity of all the gates of an inner
    /// body (function declaration, anonymous call, loop body or switch branch)
    /// against its declared signature.
    /// The body runs in a fresh scope whose inputs are pre-assigned after the
    /// outputs, the way calls bind them, and against a stream budget equal to
    /// the declared counts: consuming more or less than declared is reported.
    /// To do so, it creates a local validator, and appends the violations found
    /// by it to the current validator object.
    fn ingest_custom_subcircuit(
        &mut self,
        subcircuit: &[Gate],
        output_count: usize,
        input_count: usize,
        instance_count: usize,
        witness_count: usize,
        iterators: &HashMap<String, u64>,
    ) -> Result<()> {
        let mut current_validator = Validator {
            as_prover: self.as_prover,
            instance_values_left: instance_count as u64,
            witness_values_left: witness_count as u64,
            got_header: self.got_header,
            header_version: self.header_version.clone(),
            field_characteristic: self.field_characteristic.clone(),
            field_degree: self.field_degree,
            gate_mask: self.gate_mask,
            feat_mask: self.feat_mask,
            known_functions: self.known_functions.clone(),
            root_frame: WireFrame::new(),
            violations: vec![],
            aborted: false,
        };

        // Input wires are already defined by the caller, numbered right after
        // the outputs, so they are artificially assigned in the inner frame.
        let mut frame = WireFrame::new();
        for wire_id in output_count as u64..(output_count + input_count) as u64 {
            frame.assign(wire_id, ())?;
        }

        let mut known_iterators = iterators.clone();
        for gate in subcircuit.iter() {
            let status = current_validator.ingest_gate(gate, &mut frame, &mut known_iterators);
            if let Err(err) = status {
                self.violations.append(&mut current_validator.violations);
                return Err(err);
            }
        }

        // ensure that all output wires are set.
        for output_id in 0..output_count as u64 {
            if !frame.is_live(output_id) {
                current_validator.violate(format!(
                    "The subcircuit does not assign its output wire_{}.",
                    output_id
                ));
            }
        }

        // The declared-count contract: the body consumes exactly what it declares.
        if current_validator.instance_values_left != 0 {
            current_validator.violate(format!(
                "The subcircuit declares {} instance values but consumes {} of them.",
                instance_count,
                instance_count as u64 - current_validator.instance_values_left
            ));
        }
        if self.as_prover && current_validator.witness_values_left != 0 {
            current_validator.violate(format!(
                "The subcircuit declares {} witness values but consumes {} of them.",
                witness_count,
                witness_count as u64 - current_validator.witness_values_left
            ));
        }

        self.violations.append(&mut current_validator.violations);
        Ok(())
    }

    fn declare_outputs(&mut self, frame: &mut WireFrame<()>, wires: &[WireId]) -> Result<()> {
        for wire in wires.iter() {
            frame.assign(*wire, ())?;
        }
        Ok(())
    }

    fn check_arity(&mut self, name: &str, role: &'static str, expected: usize, actual: usize) {
        if expected != actual {
            self.violate(
                SemanticError::ArityMismatch {
                    name: name.to_string(),
                    role,
                    expected,
                    actual,
                }
                .to_string(),
            );
        }
    }

    fn consume_instances(&mut self, how_many: u64) {
        if how_many == 0 {
            return;
        }
        if self.instance_values_left >= how_many {
            self.instance_values_left -= how_many;
        } else {
            self.instance_values_left = 0;
            self.violate(SemanticError::StreamExhausted("instance").to_string());
        }
    }

    fn consume_witnesses(&mut self, how_many: u64) {
        if !self.as_prover || how_many == 0 {
            return;
        }
        if self.witness_values_left >= how_many {
            self.witness_values_left -= how_many;
        } else {
            self.witness_values_left = 0;
            self.violate(SemanticError::StreamExhausted("witness").to_string());
        }
    }

    fn ensure_all_instance_values_consumed(&mut self) {
        if self.instance_values_left != 0 {
            self.violate(format!(
                "Too many instance values ({} not consumed).",
                self.instance_values_left
            ));
        }
    }

    fn ensure_all_witness_values_consumed(&mut self) {
        if self.as_prover && self.witness_values_left != 0 {
            self.violate(format!(
                "Too many witness values ({} not consumed).",
                self.witness_values_left
            ));
        }
    }

    /// This function checks that the `value` is an element of the declared field.
    fn ensure_value_in_field(&mut self, value: &[u8], name: impl Fn() -> String) {
        if value.is_empty() {
            self.violate(format!("The {} is empty.", name()));
        }

        if !self.got_header {
            return;
        }
        let int = value_to_biguint(value);
        if int >= self.field_characteristic {
            self.violate(format!(
                "The {} cannot be represented in the field specified in Header ({} >= {}).",
                name(),
                int,
                self.field_characteristic
            ));
        }
    }

    fn violate(&mut self, msg: impl Into<String>) {
        self.violations.push(msg.into());
    }
}

#[test]
fn test_validator() -> crate::Result<()> {
    use crate::test_statements::*;

    let instance = example_instance();
    let witness = example_witness();
    let relation = example_relation();

    let mut validator = Validator::new_as_prover();

    validator.ingest_instance(&instance);
    validator.ingest_witness(&witness);
    validator.ingest_relation(&relation);

    assert_eq!(validator.get_violations(), Vec::<String>::new());

    Ok(())
}

#[test]
fn test_validator_as_verifier() -> crate::Result<()> {
    use crate::test_statements::*;

    let instance = example_instance();
    let relation = example_relation();

    let mut validator = Validator::new_as_verifier();

    validator.ingest_instance(&instance);
    validator.ingest_relation(&relation);

    assert_eq!(validator.get_violations(), Vec::<String>::new());

    Ok(())
}

#[test]
fn test_validator_header_violations() -> crate::Result<()> {
    use crate::test_statements::*;
    use crate::{Header, Instance};

    let instance = Instance {
        header: Header {
            version: "1.0".to_string(),
            field_characteristic: literal32(100),
            field_degree: 2,
        },
        common_inputs: vec![],
    };

    let mut validator = Validator::new_as_verifier();
    validator.ingest_instance(&instance);

    let violations = validator.get_violations();
    assert_eq!(
        violations,
        vec![
            "The field_characteristic should be a prime.",
            "The field_degree must be exactly 1 (extension fields are not supported).",
            "The version should match the following format <major>.<minor>.<patch>.",
        ]
    );

    Ok(())
}

#[test]
fn test_validator_header_inconsistency() -> crate::Result<()> {
    use crate::test_statements::*;
    use crate::Instance;

    let mut other = example_header();
    other.field_characteristic = literal32(7);

    let mut validator = Validator::new_as_verifier();
    validator.ingest_instance(&example_instance());
    validator.ingest_instance(&Instance {
        header: other,
        common_inputs: vec![],
    });

    let violations = validator.get_violations();
    assert!(violations
        .contains(&"The field_characteristic is not consistent across headers.".to_string()));

    Ok(())
}

#[test]
fn test_validator_free_then_use() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![Instance(0), Instance(1), Free(0, None), Add(2, 0, 1)],
    );

    let mut validator = Validator::new_as_prover();
    validator.ingest_instance(&instance_of(vec![1, 2]));
    validator.ingest_relation(&relation);

    // Scoping corruption aborts the pass: this is the one and only violation.
    assert_eq!(
        validator.get_violations(),
        vec!["Wire_0 is used after having been freed.".to_string()]
    );

    Ok(())
}

#[test]
fn test_validator_inexact_division() -> crate::Result<()> {
    use crate::structs::function::ForLoopBody;
    use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
    use crate::structs::relation::{ARITH, FOR};
    use crate::structs::wire::WireListElement::Wire;
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        FOR,
        vec![For(
            "i".into(),
            0,
            0,
            vec![Wire(3)],
            ForLoopBody::IterExprAnonCall(
                vec![Single(IterExprDivConst(Box::new(IterExprConst(7)), 2))],
                vec![],
                0,
                0,
                vec![Constant(0, vec![1])],
            ),
        )],
    );

    let mut validator = Validator::new_as_prover();
    validator.ingest_relation(&relation);

    let violations = validator.get_violations();
    assert_eq!(
        violations[0],
        "Iterator expression value 7 is not divisible by 2."
    );

    Ok(())
}

#[test]
fn test_validator_stream_accounting() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let gates = vec![Instance(0), Instance(1), Add(2, 0, 1), AssertZero(2)];

    // One instance value too many.
    let mut validator = Validator::new_as_prover();
    validator.ingest_instance(&instance_of(vec![50, 51, 99]));
    validator.ingest_relation(&simple_relation(ARITH, SIMPLE, gates.clone()));
    assert_eq!(
        validator.get_violations(),
        vec!["Too many instance values (1 not consumed).".to_string()]
    );

    // One instance value missing.
    let mut validator = Validator::new_as_prover();
    validator.ingest_instance(&instance_of(vec![50]));
    validator.ingest_relation(&simple_relation(ARITH, SIMPLE, gates));
    assert_eq!(
        validator.get_violations(),
        vec!["Not enough instance values to consume.".to_string()]
    );

    Ok(())
}

#[test]
fn test_validator_gateset_and_feature_violations() -> crate::Result<()> {
    use crate::structs::function::ForLoopBody;
    use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::structs::wire::WireListElement::Wire;
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![
            Instance(0),
            Instance(1),
            And(2, 0, 1),
            For(
                "i".into(),
                0,
                0,
                vec![Wire(3)],
                ForLoopBody::IterExprAnonCall(
                    vec![Single(IterExprConst(3))],
                    vec![Single(IterExprConst(2))],
                    0,
                    0,
                    vec![Copy(0, 1)],
                ),
            ),
        ],
    );

    let mut validator = Validator::new_as_prover();
    validator.ingest_instance(&instance_of(vec![1, 1]));
    validator.ingest_relation(&relation);

    assert_eq!(
        validator.get_violations(),
        vec![
            "Gate @and is not part of the declared gateset.".to_string(),
            "The @for feature is used but not declared.".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn test_validator_function_violations() -> crate::Result<()> {
    use crate::structs::function::Function;
    use crate::structs::relation::{ARITH, FUNCTION};
    use crate::test_statements::*;
    use crate::wirelist;
    use crate::Gate::*;
    use crate::Relation;

    let relation = Relation {
        header: example_header(),
        gate_mask: ARITH,
        feat_mask: FUNCTION,
        functions: vec![
            Function::new("square".to_string(), 1, 1, 0, 0, vec![Mul(0, 1, 1)]),
            // duplicate declaration
            Function::new("square".to_string(), 1, 1, 0, 0, vec![Mul(0, 1, 1)]),
            // malformed name
            Function::new("9bad".to_string(), 1, 1, 0, 0, vec![Mul(0, 1, 1)]),
            // declares one instance value but consumes none
            Function::new("com.eats::more".to_string(), 1, 1, 1, 0, vec![Mul(0, 1, 1)]),
        ],
        gates: vec![
            Instance(0),
            Call("unknown".to_string(), wirelist![1], wirelist![0]),
            Call("square".to_string(), wirelist![2, 3], wirelist![0]),
        ],
    };

    let mut validator = Validator::new_as_prover();
    validator.ingest_instance(&instance_of(vec![4]));
    validator.ingest_relation(&relation);

    let violations = validator.get_violations();
    assert_eq!(
        violations,
        vec![
            "A function with the name square already exists.".to_string(),
            format!(
                "The function name (9bad) should match the proper format ({}).",
                NAMES_REGEX
            ),
            "The subcircuit declares 1 instance values but consumes 0 of them.".to_string(),
            "Unknown function unknown.".to_string(),
            "Wrong number of output wires in call to square (expected 1 / got 2).".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn test_validator_switch_violations() -> crate::Result<()> {
    use crate::structs::function::CaseInvoke::AbstractAnonCall;
    use crate::structs::relation::{ARITH, SWITCH};
    use crate::test_statements::*;
    use crate::wirelist;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SWITCH,
        vec![
            Witness(0),
            Switch(
                0,
                wirelist![1],
                // [3] and [3, 0] encode the same field element.
                vec![vec![3], vec![3, 0, 0, 0]],
                vec![
                    AbstractAnonCall(wirelist![], 0, 0, vec![Constant(0, vec![1])]),
                    // this branch never assigns its output wire
                    AbstractAnonCall(wirelist![], 0, 0, vec![]),
                ],
            ),
        ],
    );

    let mut validator = Validator::new_as_prover();
    validator.ingest_witness(&witness_of(vec![3]));
    validator.ingest_relation(&relation);

    let violations = validator.get_violations();
    assert_eq!(
        violations,
        vec![
            "Switch on wire_0: the case value 3 appears more than once.".to_string(),
            "The subcircuit does not assign its output wire_0.".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn test_validator_for_loop_output_mismatch() -> crate::Result<()> {
    use crate::structs::function::ForLoopBody;
    use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
    use crate::structs::relation::{ARITH, FOR};
    use crate::structs::wire::WireListElement::Wire;
    use crate::test_statements::*;
    use crate::Gate::*;

    // The iteration assigns wire_1, the declared output list says wire_5.
    let relation = simple_relation(
        ARITH,
        FOR,
        vec![For(
            "i".into(),
            1,
            1,
            vec![Wire(5)],
            ForLoopBody::IterExprAnonCall(
                vec![Single(IterExprName("i".into()))],
                vec![],
                0,
                0,
                vec![Constant(0, vec![1])],
            ),
        )],
    );

    let mut validator = Validator::new_as_prover();
    validator.ingest_relation(&relation);

    let violations = validator.get_violations();
    assert_eq!(
        violations,
        vec![
            "For loop on iterator (i): the wires assigned by the iterations ([1]) do not match the declared output list ([5]).".to_string()
        ]
    );

    Ok(())
}
