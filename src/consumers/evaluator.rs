use num_bigint::BigUint;
use num_traits::identities::Zero;
use std::cmp::{max, min};
use std::collections::{HashMap, VecDeque};
use std::ops::{BitAnd, BitXor};

use crate::consumers::scope::WireFrame;
use crate::errors::SemanticError;
use crate::structs::function::{CaseInvoke, ForLoopBody};
use crate::structs::iterators::evaluate_iterexpr_list;
use crate::structs::relation::{check_gate_allowed, contains_feature, BOOL};
use crate::structs::wire::expand_wirelist;
use crate::{Gate, Instance, Message, Relation, Result, WireId, Witness};

/// The `ZKBackend` trait should be implemented by any backend that wants to evaluate SIEVE IR circuits.
/// It has to define 2 types:
///  - `Wire`: represents a variable in the circuit.
///  - `FieldElement`: represents elements of the underlying field. Mainly used when importing
///                    instances/witnesses from the corresponding pools.
///
/// The evaluation engine is polymorphic over this capability set, so a
/// plaintext backend, a proof-system backend, or the shape-only `ShapeBackend`
/// plug in without changing the dispatch or control-flow logic.
/// See `PlaintextBackend` for a working example of an implementation.
pub trait ZKBackend {
    type Wire;
    /// Usually a big Integer type.
    type FieldElement: 'static + Clone;

    /// Imports a `Self::FieldElement` from a byte buffer, in little endian.
    /// If the buffer does not represent an element of the underlying field, then
    /// it returns an Err.
    fn from_bytes_le(val: &[u8]) -> Result<Self::FieldElement>;
    /// Set the underlying field of the running backend.
    /// If the field is not compatible with this ZKBackend, then it should return Err
    fn set_field(&mut self, modulus: &[u8], degree: u32, is_boolean: bool) -> Result<()>;

    /// Returns a new instance of a given Wire id
    fn copy(&mut self, wire: &Self::Wire) -> Result<Self::Wire>;
    /// Imports a constant value into a new `Self::Wire`.
    fn constant(&mut self, val: Self::FieldElement) -> Result<Self::Wire>;

    /// Whether the given wire carries the value zero.
    fn is_zero(&mut self, wire: &Self::Wire) -> Result<bool>;
    /// Whether two wires carry the same value. Used to select switch branches.
    fn equals(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<bool>;

    /// Adds two wires into a new wire.
    fn add(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire>;
    /// Multiplies two wires into a new wire.
    fn multiply(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire>;
    /// Adds a given wire by a constant `Self::FieldElement` into a new wire.
    fn add_constant(&mut self, a: &Self::Wire, b: Self::FieldElement) -> Result<Self::Wire>;
    /// Multiplies a given wire by a constant `Self::FieldElement` into a new wire.
    fn mul_constant(&mut self, a: &Self::Wire, b: Self::FieldElement) -> Result<Self::Wire>;

    /// Performs a boolean `and` between two wires. The result is stored in a new wire.
    fn and(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire>;
    /// Performs a boolean `xor` between two wires. The result is stored in a new wire.
    fn xor(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire>;
    /// Performs a boolean `not` on a given wire. The result is stored in a new wire.
    fn not(&mut self, a: &Self::Wire) -> Result<Self::Wire>;

    /// This function declares a new instance variable owning the value given as parameter,
    /// which should be stored in a new wire.
    fn instance(&mut self, val: Self::FieldElement) -> Result<Self::Wire>;
    /// This function declares a new witness variable owning the value given as parameter,
    /// which should be stored in a new wire.
    /// The value is given as an `Option`, because depending upon the type of this ZKBackend
    /// (prover / verifier), it should act differently.
    ///  - In prover mode, the witness should be provided, so the value should be `Some`.
    ///  - In verifier mode, the witness is not provided and the value is `None`; the
    ///    ZKBackend should have a specific wire value to handle it.
    fn witness(&mut self, val: Option<Self::FieldElement>) -> Result<Self::Wire>;
}

/// This structure defines a function as defined in the circuit, but without the name.
/// It's mainly used to retrieve information from the name.
struct FunctionDeclaration {
    subcircuit: Vec<Gate>,
    instance_nbr: usize,
    witness_nbr: usize,
    output_count: usize,
    input_count: usize,
}

/// This structure is the core of IR evaluation. It is instantiated using a ZKBackend,
/// and will read the IR circuit, parse it, and call the corresponding function from the
/// ZKBackend to evaluate each single operation.
/// It will inline functions, unroll loops, and evaluate the selected branch of switches.
///
/// # Example
/// ```
/// use sieve_ir::consumers::evaluator::{PlaintextBackend, Evaluator};
/// use sieve_ir::{Relation, Instance, Witness};
///
/// # fn example(relation: Relation, instance: Instance, witness: Witness) {
/// let mut zkbackend = PlaintextBackend::default();
/// let mut simulator = Evaluator::default();
/// let _ = simulator.ingest_instance(&instance);
/// let _ = simulator.ingest_witness(&witness);
/// let _ = simulator.ingest_relation(&relation, &mut zkbackend);
/// # }
/// ```
pub struct Evaluator<B: ZKBackend> {
    values: WireFrame<B::Wire>,
    instance_queue: VecDeque<B::FieldElement>,
    witness_queue: VecDeque<B::FieldElement>,
    is_boolean: bool,

    // name => (instance_nbr, witness_nbr, subcircuit)
    known_functions: HashMap<String, FunctionDeclaration>,

    verified_at_least_one_gate: bool,
    found_error: Option<String>,
    // Index of the top-level directive the failure occurred at.
    failed_directive: Option<usize>,
}

impl<B: ZKBackend> Default for Evaluator<B> {
    fn default() -> Self {
        Evaluator {
            values: WireFrame::new(),
            instance_queue: Default::default(),
            witness_queue: Default::default(),
            is_boolean: false,
            known_functions: Default::default(),
            verified_at_least_one_gate: false,
            found_error: None,
            failed_directive: None,
        }
    }
}

impl<B: ZKBackend> Evaluator<B> {
    /// Creates an Evaluator for an iterator over `Messages`
    /// The returned Evaluator can then be reused to ingest more messages using one of the
    /// `ingest_***` functions.
    pub fn from_messages(messages: impl Iterator<Item = Result<Message>>, backend: &mut B) -> Self {
        let mut evaluator = Evaluator::default();
        messages.for_each(|msg| evaluator.ingest_message(&msg.unwrap(), backend));
        evaluator
    }

    /// Returns the list of violations detected when evaluating the IR circuit.
    /// It consumes `self`.
    pub fn get_violations(self) -> Vec<String> {
        let mut violations = vec![];
        if !self.verified_at_least_one_gate {
            violations.push("Did not receive any gate to verify.".to_string());
        }
        if let Some(err) = self.found_error {
            violations.push(err);
        }
        violations
    }

    /// The index of the top-level directive the evaluation failed at, if any.
    pub fn failed_directive(&self) -> Option<usize> {
        self.failed_directive
    }

    /// Ingests a `Message` using the ZKBackend given in parameter.
    /// If an error was found in previous Messages, then it does nothing but returns,
    /// otherwise it ingests the message.
    pub fn ingest_message(&mut self, msg: &Message, backend: &mut B) {
        if self.found_error.is_some() {
            return;
        }

        if let Err(err) = self.ingest_message_(msg, backend) {
            self.found_error = Some(err.to_string());
        }
    }

    fn ingest_message_(&mut self, msg: &Message, backend: &mut B) -> Result<()> {
        match msg {
            Message::Instance(i) => self.ingest_instance(i),
            Message::Witness(w) => self.ingest_witness(w),
            Message::Relation(r) => self.ingest_relation(r, backend),
        }
    }

    /// Ingest an `Instance` message, and returns a `Result` whether or not an error
    /// was encountered. It stores the instance values in a pool.
    pub fn ingest_instance(&mut self, instance: &Instance) -> Result<()> {
        for value in &instance.common_inputs {
            self.instance_queue.push_back(B::from_bytes_le(value)?);
        }
        Ok(())
    }

    /// Ingest a `Witness` message, and returns a `Result` whether or not an error
    /// was encountered. It stores the witness values in a pool.
    pub fn ingest_witness(&mut self, witness: &Witness) -> Result<()> {
        for value in &witness.short_witness {
            self.witness_queue.push_back(B::from_bytes_le(value)?);
        }
        Ok(())
    }

    /// Ingest a `Relation` message
    pub fn ingest_relation(&mut self, relation: &Relation, backend: &mut B) -> Result<()> {
        self.is_boolean = contains_feature(relation.gate_mask, BOOL);
        backend.set_field(
            &relation.header.field_characteristic,
            relation.header.field_degree,
            self.is_boolean,
        )?;

        if !relation.gates.is_empty() {
            self.verified_at_least_one_gate = true;
        }

        for f in relation.functions.iter() {
            self.known_functions.insert(
                f.name.clone(),
                FunctionDeclaration {
                    subcircuit: f.body.clone(),
                    instance_nbr: f.instance_count,
                    witness_nbr: f.witness_count,
                    output_count: f.output_count,
                    input_count: f.input_count,
                },
            );
        }

        let mut known_iterators = HashMap::new();

        for (idx, gate) in relation.gates.iter().enumerate() {
            let status = Self::ingest_gate(
                gate,
                backend,
                &mut self.values,
                &self.known_functions,
                &mut known_iterators,
                relation.gate_mask,
                relation.feat_mask,
                &mut self.instance_queue,
                &mut self.witness_queue,
            );
            if status.is_err() {
                self.failed_directive = Some(idx);
                return status;
            }
        }
        Ok(())
    }

    /// This function ingests one gate at a time (but can call itself recursively)
    /// - `scope` contains the list of existing wires with their respective value. It will be
    ///    augmented if this gate produces outputs, or reduced if this is a `GateFree`
    /// - `known_functions` is the map of functions defined in previous or current `Relation` message
    /// - `known_iterators` is the map of defined iterators. It will be temporarily updated if the
    ///    current gate is a `GateFor`
    /// - `gate_mask` / `feat_mask` are the declared gateset and features; a gate outside them is
    ///    a fatal policy violation when reached at evaluation time.
    /// - `instances` and `witnesses` are the instances and witnesses pools, implemented as Queues.
    ///    They will be consumed whenever necessary.
    #[allow(clippy::too_many_arguments)]
    fn ingest_gate(
        gate: &Gate,
        backend: &mut B,
        scope: &mut WireFrame<B::Wire>,
        known_functions: &HashMap<String, FunctionDeclaration>,
        known_iterators: &mut HashMap<String, u64>,
        gate_mask: u16,
        feat_mask: u16,
        instances: &mut VecDeque<B::FieldElement>,
        witnesses: &mut VecDeque<B::FieldElement>,
    ) -> Result<()> {
        use Gate::*;

        check_gate_allowed(gate, gate_mask, feat_mask)?;

        match gate {
            Constant(out, value) => {
                let wire = backend.constant(B::from_bytes_le(value)?)?;
                scope.assign(*out, wire)?;
            }

            AssertZero(inp) => {
                let inp_wire = scope.get(*inp)?;
                if !backend.is_zero(inp_wire)? {
                    return Err(SemanticError::AssertionViolated(*inp).into());
                }
            }

            Copy(out, inp) => {
                let in_wire = scope.get(*inp)?;
                let out_wire = backend.copy(in_wire)?;
                scope.assign(*out, out_wire)?;
            }

            Add(out, left, right) => {
                let sum = {
                    let l = scope.get(*left)?;
                    let r = scope.get(*right)?;
                    backend.add(l, r)?
                };
                scope.assign(*out, sum)?;
            }

            Mul(out, left, right) => {
                let prod = {
                    let l = scope.get(*left)?;
                    let r = scope.get(*right)?;
                    backend.multiply(l, r)?
                };
                scope.assign(*out, prod)?;
            }

            AddConstant(out, inp, constant) => {
                let sum = {
                    let l = scope.get(*inp)?;
                    backend.add_constant(l, B::from_bytes_le(constant)?)?
                };
                scope.assign(*out, sum)?;
            }

            MulConstant(out, inp, constant) => {
                let prod = {
                    let l = scope.get(*inp)?;
                    backend.mul_constant(l, B::from_bytes_le(constant)?)?
                };
                scope.assign(*out, prod)?;
            }

            And(out, left, right) => {
                let and = {
                    let l = scope.get(*left)?;
                    let r = scope.get(*right)?;
                    backend.and(l, r)?
                };
                scope.assign(*out, and)?;
            }

            Xor(out, left, right) => {
                let xor = {
                    let l = scope.get(*left)?;
                    let r = scope.get(*right)?;
                    backend.xor(l, r)?
                };
                scope.assign(*out, xor)?;
            }

            Not(out, inp) => {
                let not = {
                    let val = scope.get(*inp)?;
                    backend.not(val)?
                };
                scope.assign(*out, not)?;
            }

            Instance(out) => {
                let val = instances
                    .pop_front()
                    .ok_or(SemanticError::StreamExhausted("instance"))?;
                let wire = backend.instance(val)?;
                scope.assign(*out, wire)?;
            }

            Witness(out) => {
                // In verifier mode the queue is empty; the backend receives
                // `None` and the consumption count still advances.
                let val = witnesses.pop_front();
                let wire = backend.witness(val)?;
                scope.assign(*out, wire)?;
            }

            Free(first, last) => {
                scope.free_range(*first, last.unwrap_or(*first))?;
            }

            Call(name, output_wires, input_wires) => {
                let function = known_functions
                    .get(name)
                    .ok_or_else(|| SemanticError::UnknownFunction(name.clone()))?;
                let expanded_output = expand_wirelist(output_wires)?;
                let expanded_input = expand_wirelist(input_wires)?;
                check_arity(name, "output", function.output_count, expanded_output.len())?;
                check_arity(name, "input", function.input_count, expanded_input.len())?;

                // in the case of a named call, iterators *ARE NOT* forwarded into inner bodies.
                Self::ingest_subcircuit(
                    &function.subcircuit,
                    backend,
                    &expanded_output,
                    &expanded_input,
                    scope,
                    known_functions,
                    &mut HashMap::new(),
                    gate_mask,
                    feat_mask,
                    instances,
                    witnesses,
                )?;
            }

            AnonCall(output_wires, input_wires, _, _, subcircuit) => {
                let expanded_output = expand_wirelist(output_wires)?;
                let expanded_input = expand_wirelist(input_wires)?;
                // in the case of an anoncall, iterators *ARE* forwarded into inner bodies.
                Self::ingest_subcircuit(
                    subcircuit,
                    backend,
                    &expanded_output,
                    &expanded_input,
                    scope,
                    known_functions,
                    known_iterators,
                    gate_mask,
                    feat_mask,
                    instances,
                    witnesses,
                )?;
            }

            // For loops are unrolled. The body is called as many times (NB: the loop bounds are
            // inclusive), and iterator expressions are evaluated for each.
            For(iterator_name, start_val, end_val, _, body) => {
                // An enclosing loop may already bind this name. The inner
                // binding shadows it strictly for the duration of this loop,
                // and the outer binding is restored unchanged afterwards.
                let shadowed = known_iterators.remove(iterator_name);

                for i in *start_val..=*end_val {
                    known_iterators.insert(iterator_name.clone(), i);

                    match body {
                        ForLoopBody::IterExprCall(name, outputs, inputs) => {
                            let function = known_functions
                                .get(name)
                                .ok_or_else(|| SemanticError::UnknownFunction(name.clone()))?;
                            let expanded_output = evaluate_iterexpr_list(outputs, known_iterators)?;
                            let expanded_input = evaluate_iterexpr_list(inputs, known_iterators)?;
                            check_arity(name, "output", function.output_count, expanded_output.len())?;
                            check_arity(name, "input", function.input_count, expanded_input.len())?;

                            Self::ingest_subcircuit(
                                &function.subcircuit,
                                backend,
                                &expanded_output,
                                &expanded_input,
                                scope,
                                known_functions,
                                &mut HashMap::new(),
                                gate_mask,
                                feat_mask,
                                instances,
                                witnesses,
                            )?;
                        }
                        ForLoopBody::IterExprAnonCall(
                            output_wires,
                            input_wires,
                            _,
                            _,
                            subcircuit,
                        ) => {
                            let expanded_output =
                                evaluate_iterexpr_list(output_wires, known_iterators)?;
                            let expanded_input =
                                evaluate_iterexpr_list(input_wires, known_iterators)?;
                            Self::ingest_subcircuit(
                                subcircuit,
                                backend,
                                &expanded_output,
                                &expanded_input,
                                scope,
                                known_functions,
                                known_iterators,
                                gate_mask,
                                feat_mask,
                                instances,
                                witnesses,
                            )?;
                        }
                    }
                }
                known_iterators.remove(iterator_name);
                if let Some(outer) = shadowed {
                    known_iterators.insert(iterator_name.clone(), outer);
                }
            }

            // Exactly one branch executes: the one whose case value equals the
            // condition. The streams still advance by the maximum declared
            // counts over all branches, so consumption stays in the canonical
            // order whatever the (possibly secret) condition value is.
            Switch(condition, output_wires, cases, branches) => {
                if cases.len() != branches.len() {
                    return Err(format!(
                        "Switch on wire_{}: {} case values for {} branches.",
                        *condition,
                        cases.len(),
                        branches.len()
                    )
                    .into());
                }

                // determine the maximum instance/witness consumption
                let mut max_instance_count: usize = 0;
                let mut max_witness_count: usize = 0;
                for branch in branches.iter() {
                    let (instance_cnt, witness_cnt) = match branch {
                        CaseInvoke::AbstractGateCall(name, _) => {
                            let function = known_functions
                                .get(name)
                                .ok_or_else(|| SemanticError::UnknownFunction(name.clone()))?;
                            (function.instance_nbr, function.witness_nbr)
                        }
                        CaseInvoke::AbstractAnonCall(_, instance_count, witness_count, _) => {
                            (*instance_count, *witness_count)
                        }
                    };
                    max_instance_count = max(max_instance_count, instance_cnt);
                    max_witness_count = max(max_witness_count, witness_cnt);
                }

                // Detach max_instances / max_witnesses values from the
                // corresponding pools. The selected branch consumes its own
                // declared counts from the detached segment; the rest of the
                // segment is discarded.
                let mut branch_instances: VecDeque<B::FieldElement> =
                    instances.split_off(min(instances.len(), max_instance_count));
                std::mem::swap(instances, &mut branch_instances);
                let mut branch_witnesses: VecDeque<B::FieldElement> =
                    witnesses.split_off(min(witnesses.len(), max_witness_count));
                std::mem::swap(witnesses, &mut branch_witnesses);

                let mut selected = None;
                for (i, case) in cases.iter().enumerate() {
                    let case_wire = backend.constant(B::from_bytes_le(case)?)?;
                    if backend.equals(scope.get(*condition)?, &case_wire)? {
                        selected = Some(i);
                        break;
                    }
                }
                let selected =
                    selected.ok_or(SemanticError::NoMatchingCase(*condition))?;

                let expanded_output = expand_wirelist(output_wires)?;

                match &branches[selected] {
                    CaseInvoke::AbstractGateCall(name, input_wires) => {
                        let function = known_functions
                            .get(name)
                            .ok_or_else(|| SemanticError::UnknownFunction(name.clone()))?;
                        let expanded_input = expand_wirelist(input_wires)?;
                        check_arity(name, "output", function.output_count, expanded_output.len())?;
                        check_arity(name, "input", function.input_count, expanded_input.len())?;

                        Self::ingest_subcircuit(
                            &function.subcircuit,
                            backend,
                            &expanded_output,
                            &expanded_input,
                            scope,
                            known_functions,
                            &mut HashMap::new(),
                            gate_mask,
                            feat_mask,
                            &mut branch_instances,
                            &mut branch_witnesses,
                        )?;
                    }
                    CaseInvoke::AbstractAnonCall(input_wires, _, _, subcircuit) => {
                        let expanded_input = expand_wirelist(input_wires)?;
                        Self::ingest_subcircuit(
                            subcircuit,
                            backend,
                            &expanded_output,
                            &expanded_input,
                            scope,
                            known_functions,
                            known_iterators,
                            gate_mask,
                            feat_mask,
                            &mut branch_instances,
                            &mut branch_witnesses,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// This function is similar to `ingest_gate` except that it operates linearly on a subcircuit
    /// (i.e. a list of gates in an inner body of another gate).
    /// It will operate on an internal scope, and will write outputs produced by the subcircuit
    /// into the caller scope.
    /// Internally, it will call `ingest_gate` with the internal scope for each sub-gate.
    #[allow(clippy::too_many_arguments)]
    fn ingest_subcircuit(
        subcircuit: &[Gate],
        backend: &mut B,
        output_list: &[WireId],
        input_list: &[WireId],
        scope: &mut WireFrame<B::Wire>,
        known_functions: &HashMap<String, FunctionDeclaration>,
        known_iterators: &mut HashMap<String, u64>,
        gate_mask: u16,
        feat_mask: u16,
        instances: &mut VecDeque<B::FieldElement>,
        witnesses: &mut VecDeque<B::FieldElement>,
    ) -> Result<()> {
        let mut new_scope: WireFrame<B::Wire> = WireFrame::new();

        // copy the inputs required by this function into the new scope, at the proper index
        for (idx, input) in input_list.iter().enumerate() {
            let copied = {
                let i = scope.get(*input)?;
                backend.copy(i)?
            };
            new_scope.assign((idx + output_list.len()) as u64, copied)?;
        }
        // evaluate the subcircuit in the new scope.
        for gate in subcircuit {
            Self::ingest_gate(
                gate,
                backend,
                &mut new_scope,
                known_functions,
                known_iterators,
                gate_mask,
                feat_mask,
                instances,
                witnesses,
            )?;
        }
        // copy the outputs produced from 'new_scope', into 'scope'
        for (idx, output) in output_list.iter().enumerate() {
            let copied = {
                let w = new_scope.get(idx as u64)?;
                backend.copy(w)?
            };
            scope.assign(*output, copied)?;
        }

        Ok(())
    }

    /// This helper function can be used to retrieve value of a given wire at some point
    /// if it has *NOT* been freed yet, otherwise it will return an Err.
    pub fn get(&self, id: WireId) -> Result<&B::Wire> {
        self.values.get(id)
    }
}

fn check_arity(name: &str, role: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SemanticError::ArityMismatch {
            name: name.to_string(),
            role,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

/// This is the default backend, evaluating a IR circuit in plaintext, meaning that it is not meant
/// for security purposes, will never ensure ZK properties, ...
/// It's used only for demo or tests.
/// Moreover, it's not optimized at all for modular operations (e.g. modular multiplications) and
/// can even be slower than a secure backend if the evaluated circuit contains a lot of such
/// operations.
/// This backend requires the witness to be provided (prover mode).
pub struct PlaintextBackend {
    pub m: BigUint,
}

impl Default for PlaintextBackend {
    fn default() -> Self {
        PlaintextBackend { m: BigUint::zero() }
    }
}

impl ZKBackend for PlaintextBackend {
    type Wire = BigUint;
    type FieldElement = BigUint;

    fn from_bytes_le(val: &[u8]) -> Result<Self::FieldElement> {
        Ok(BigUint::from_bytes_le(val))
    }

    fn set_field(&mut self, modulus: &[u8], degree: u32, _is_boolean: bool) -> Result<()> {
        self.m = BigUint::from_bytes_le(modulus);
        if self.m.is_zero() {
            Err("Modulus cannot be zero.".into())
        } else if degree != 1 {
            Err("Field should be of degree 1".into())
        } else {
            Ok(())
        }
    }

    fn copy(&mut self, wire: &Self::Wire) -> Result<Self::Wire> {
        Ok(wire.clone())
    }

    fn constant(&mut self, val: Self::FieldElement) -> Result<Self::Wire> {
        Ok(val)
    }

    fn is_zero(&mut self, wire: &Self::Wire) -> Result<bool> {
        Ok(wire.is_zero())
    }

    fn equals(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<bool> {
        Ok(a == b)
    }

    fn add(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire> {
        Ok((a + b) % &self.m)
    }

    fn multiply(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire> {
        Ok((a * b) % &self.m)
    }

    fn add_constant(&mut self, a: &Self::Wire, b: Self::FieldElement) -> Result<Self::Wire> {
        Ok((a + b) % &self.m)
    }

    fn mul_constant(&mut self, a: &Self::Wire, b: Self::FieldElement) -> Result<Self::Wire> {
        Ok((a * b) % &self.m)
    }

    fn and(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire> {
        Ok((a.bitand(b)) % &self.m)
    }

    fn xor(&mut self, a: &Self::Wire, b: &Self::Wire) -> Result<Self::Wire> {
        Ok((a.bitxor(b)) % &self.m)
    }

    fn not(&mut self, a: &Self::Wire) -> Result<Self::Wire> {
        Ok(if a.is_zero() {
            BigUint::from(1u8)
        } else {
            BigUint::zero()
        })
    }

    fn instance(&mut self, val: Self::FieldElement) -> Result<Self::Wire> {
        self.constant(val)
    }

    fn witness(&mut self, val: Option<Self::FieldElement>) -> Result<Self::Wire> {
        let val = val.ok_or("Missing witness value for PlaintextBackend (prover mode required)")?;
        self.constant(val)
    }
}

/// A shape-only backend: it performs no arithmetic, every wire is a unit value
/// and every check passes. Plugging it into the `Evaluator` traverses a
/// statement for scoping and stream consumption only, without knowing any
/// input value.
#[derive(Clone, Default)]
pub struct ShapeBackend;

impl ZKBackend for ShapeBackend {
    type Wire = ();
    type FieldElement = ();

    fn from_bytes_le(_val: &[u8]) -> Result<Self::FieldElement> {
        Ok(())
    }
    fn set_field(&mut self, _modulus: &[u8], _degree: u32, _is_boolean: bool) -> Result<()> {
        Ok(())
    }
    fn copy(&mut self, _wire: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn constant(&mut self, _val: Self::FieldElement) -> Result<Self::Wire> {
        Ok(())
    }
    fn is_zero(&mut self, _wire: &Self::Wire) -> Result<bool> {
        Ok(true)
    }
    // Selects the first case of every switch during shape-only traversal.
    fn equals(&mut self, _a: &Self::Wire, _b: &Self::Wire) -> Result<bool> {
        Ok(true)
    }
    fn add(&mut self, _a: &Self::Wire, _b: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn multiply(&mut self, _a: &Self::Wire, _b: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn add_constant(&mut self, _a: &Self::Wire, _b: Self::FieldElement) -> Result<Self::Wire> {
        Ok(())
    }
    fn mul_constant(&mut self, _a: &Self::Wire, _b: Self::FieldElement) -> Result<Self::Wire> {
        Ok(())
    }
    fn and(&mut self, _a: &Self::Wire, _b: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn xor(&mut self, _a: &Self::Wire, _b: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn not(&mut self, _a: &Self::Wire) -> Result<Self::Wire> {
        Ok(())
    }
    fn instance(&mut self, _val: Self::FieldElement) -> Result<Self::Wire> {
        Ok(())
    }
    fn witness(&mut self, _val: Option<Self::FieldElement>) -> Result<Self::Wire> {
        Ok(())
    }
}

#[test]
fn test_evaluator() -> crate::Result<()> {
    use crate::test_statements::*;

    let relation = example_relation();
    let instance = example_instance();
    let witness = example_witness();

    let mut zkbackend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance)?;
    simulator.ingest_witness(&witness)?;
    simulator.ingest_relation(&relation, &mut zkbackend)?;

    assert_eq!(simulator.get_violations().len(), 0);

    Ok(())
}

#[test]
fn test_evaluator_as_verifier() -> crate::Result<()> {
    // Checks that the Evaluator runs a whole statement against a backend that
    // never sees the witness values.
    use crate::test_statements::*;

    let relation = example_relation();
    let instance = example_instance();

    let mut zkbackend = ShapeBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance)?;
    simulator.ingest_relation(&relation, &mut zkbackend)?;

    assert_eq!(simulator.get_violations().len(), 0);

    Ok(())
}

#[test]
fn test_evaluator_wrong_result() -> crate::Result<()> {
    use crate::test_statements::*;

    let relation = example_relation();
    let instance = example_instance();
    let witness = example_witness_incorrect();

    let mut zkbackend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    let _ = simulator.ingest_instance(&instance);
    let _ = simulator.ingest_witness(&witness);
    let should_be_err = simulator.ingest_relation(&relation, &mut zkbackend);

    assert!(should_be_err.is_err());
    assert_eq!(
        "Wire_9 should be 0, while it is not.",
        should_be_err.err().unwrap().to_string()
    );
    // The failure happened while expanding the switch.
    assert_eq!(simulator.failed_directive(), Some(1));

    Ok(())
}

#[test]
fn test_evaluator_sum_to_modulus_accepts() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![Instance(0), Instance(1), Add(2, 0, 1), AssertZero(2)],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![50, 51]))?;
    simulator.ingest_relation(&relation, &mut backend)?;

    assert_eq!(simulator.get_violations().len(), 0);

    Ok(())
}

#[test]
fn test_evaluator_sum_off_by_one_rejects() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![Instance(0), Instance(1), Add(2, 0, 1), AssertZero(2)],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![50, 52]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::AssertionViolated(2))
    );

    Ok(())
}

#[test]
fn test_evaluator_use_after_free_rejects() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![Instance(0), Instance(1), Free(0, None), Add(2, 0, 1)],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![1, 2]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::UseAfterFree(0))
    );
    assert_eq!(simulator.failed_directive(), Some(3));

    Ok(())
}

#[test]
fn test_evaluator_instance_stream_exhausted() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(ARITH, SIMPLE, vec![Instance(0), Instance(1)]);

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![5]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::StreamExhausted("instance"))
    );

    Ok(())
}

#[test]
fn test_evaluator_switch_without_matching_case_rejects() -> crate::Result<()> {
    use crate::structs::function::CaseInvoke::AbstractAnonCall;
    use crate::structs::relation::{ARITH, SWITCH};
    use crate::test_statements::*;
    use crate::wirelist;
    use crate::Gate::*;

    let branch = AbstractAnonCall(wirelist![], 0, 0, vec![Constant(0, vec![1])]);
    let relation = simple_relation(
        ARITH,
        SWITCH,
        vec![
            Witness(0),
            Switch(
                0,
                wirelist![1],
                vec![vec![3], vec![5]],
                vec![branch.clone(), branch],
            ),
        ],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_witness(&witness_of(vec![7]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::NoMatchingCase(0))
    );

    Ok(())
}

#[test]
fn test_evaluator_for_loop_assigns_outputs_in_iteration_order() -> crate::Result<()> {
    use crate::structs::function::ForLoopBody;
    use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
    use crate::structs::relation::{ARITH, FOR};
    use crate::structs::wire::WireListElement::WireRange;
    use crate::test_statements::*;
    use crate::Gate::*;

    // Each iteration adds one to the previous wire: wires 0..=2 hold 0, 1, 2.
    let relation = simple_relation(
        ARITH,
        FOR,
        vec![
            Constant(0, vec![0]),
            For(
                "i".into(),
                1,
                2,
                vec![WireRange(1, 2)],
                ForLoopBody::IterExprAnonCall(
                    vec![Single(IterExprName("i".into()))],
                    vec![Single(IterExprSub(
                        Box::new(IterExprName("i".into())),
                        Box::new(IterExprConst(1)),
                    ))],
                    0,
                    0,
                    vec![AddConstant(0, 1, vec![1])],
                ),
            ),
        ],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_relation(&relation, &mut backend)?;

    assert_eq!(simulator.get(0)?, &BigUint::from(0u8));
    assert_eq!(simulator.get(1)?, &BigUint::from(1u8));
    assert_eq!(simulator.get(2)?, &BigUint::from(2u8));
    assert_eq!(simulator.get_violations().len(), 0);

    Ok(())
}

#[test]
fn test_evaluator_nested_loops_shadow_iterator_name() -> crate::Result<()> {
    use crate::structs::function::ForLoopBody;
    use crate::structs::iterators::{IterExprListElement::*, IterExprWireNumber::*};
    use crate::structs::relation::{ARITH, FOR};
    use crate::structs::wire::WireListElement::{Wire, WireRange};
    use crate::test_statements::*;
    use crate::Gate::*;

    // Baseline: wires 1 and 2 hold 1 and 2.
    let baseline_body = ForLoopBody::IterExprAnonCall(
        vec![Single(IterExprName("i".into()))],
        vec![Single(IterExprSub(
            Box::new(IterExprName("i".into())),
            Box::new(IterExprConst(1)),
        ))],
        0,
        0,
        vec![AddConstant(0, 1, vec![1])],
    );
    let baseline = simple_relation(
        ARITH,
        FOR,
        vec![
            Constant(0, vec![0]),
            For("i".into(), 1, 2, vec![WireRange(1, 2)], baseline_body),
        ],
    );

    // Same computation, but the body contains an inner loop shadowing "i",
    // followed by a sibling loop whose expressions read the outer "i" again.
    let nested_body = ForLoopBody::IterExprAnonCall(
        vec![Single(IterExprName("i".into()))],
        vec![Single(IterExprSub(
            Box::new(IterExprName("i".into())),
            Box::new(IterExprConst(1)),
        ))],
        0,
        0,
        vec![
            For(
                "i".into(),
                5,
                6,
                vec![WireRange(2, 3)],
                ForLoopBody::IterExprAnonCall(
                    vec![Single(IterExprSub(
                        Box::new(IterExprName("i".into())),
                        Box::new(IterExprConst(3)),
                    ))],
                    vec![],
                    0,
                    0,
                    vec![Constant(0, vec![9])],
                ),
            ),
            // (i + 1) - i resolves to local wire 1 only if the outer binding
            // was restored after the inner loop.
            For(
                "j".into(),
                0,
                0,
                vec![Wire(4)],
                ForLoopBody::IterExprAnonCall(
                    vec![Single(IterExprConst(4))],
                    vec![Single(IterExprSub(
                        Box::new(IterExprAdd(
                            Box::new(IterExprName("i".into())),
                            Box::new(IterExprConst(1)),
                        )),
                        Box::new(IterExprName("i".into())),
                    ))],
                    0,
                    0,
                    vec![Copy(0, 1)],
                ),
            ),
            AddConstant(0, 1, vec![1]),
        ],
    );
    let nested = simple_relation(
        ARITH,
        FOR,
        vec![
            Constant(0, vec![0]),
            For("i".into(), 1, 2, vec![WireRange(1, 2)], nested_body),
        ],
    );

    let mut backend = PlaintextBackend::default();
    let mut baseline_simulator = Evaluator::default();
    baseline_simulator.ingest_relation(&baseline, &mut backend)?;

    let mut nested_simulator = Evaluator::default();
    nested_simulator.ingest_relation(&nested, &mut backend)?;

    for wire in 0..=2 {
        assert_eq!(baseline_simulator.get(wire)?, nested_simulator.get(wire)?);
    }

    Ok(())
}

#[test]
fn test_evaluator_witness_byte_flip_rejects() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![
            Instance(0),
            Witness(1),
            MulConstant(2, 1, encode_negative_one(&example_header())),
            Add(3, 0, 2),
            AssertZero(3),
        ],
    );

    // The honest witness is accepted.
    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![7]))?;
    simulator.ingest_witness(&witness_of(vec![7]))?;
    simulator.ingest_relation(&relation, &mut backend)?;
    assert_eq!(simulator.get_violations().len(), 0);

    // Any single flipped byte of the witness value flips the assertion.
    for byte in 0..4 {
        let mut witness = witness_of(vec![7]);
        witness.short_witness[0][byte] ^= 0x01;
        let mut backend = PlaintextBackend::default();
        let mut simulator = Evaluator::default();
        simulator.ingest_instance(&instance_of(vec![7]))?;
        simulator.ingest_witness(&witness)?;
        let should_be_err = simulator.ingest_relation(&relation, &mut backend);
        assert_eq!(
            should_be_err
                .unwrap_err()
                .downcast_ref::<SemanticError>(),
            Some(&SemanticError::AssertionViolated(3))
        );
    }

    Ok(())
}

#[test]
fn test_evaluator_call_arity_mismatch() -> crate::Result<()> {
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
        functions: vec![Function::new(
            "square".to_string(),
            1,
            1,
            0,
            0,
            vec![Mul(0, 1, 1)],
        )],
        gates: vec![
            Instance(0),
            Call("square".to_string(), wirelist![1, 2], wirelist![0]),
        ],
    };

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![4]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::ArityMismatch {
            name: "square".to_string(),
            role: "output",
            expected: 1,
            actual: 2,
        })
    );

    Ok(())
}

#[test]
fn test_evaluator_gateset_violation() -> crate::Result<()> {
    use crate::structs::relation::{ARITH, SIMPLE};
    use crate::test_statements::*;
    use crate::Gate::*;

    let relation = simple_relation(
        ARITH,
        SIMPLE,
        vec![Instance(0), Instance(1), And(2, 0, 1)],
    );

    let mut backend = PlaintextBackend::default();
    let mut simulator = Evaluator::default();
    simulator.ingest_instance(&instance_of(vec![1, 1]))?;
    let should_be_err = simulator.ingest_relation(&relation, &mut backend);

    assert_eq!(
        should_be_err
            .unwrap_err()
            .downcast_ref::<SemanticError>(),
        Some(&SemanticError::GatesetViolation("@and"))
    );

    Ok(())
}

#[test]
fn test_plaintext_backend_arithmetic() -> crate::Result<()> {
    use itertools::izip;

    let mut backend = PlaintextBackend::default();
    backend.set_field(&[101], 1, false)?;

    let lefts = vec![BigUint::from(60u8), BigUint::from(100u8)];
    let rights = vec![BigUint::from(60u8), BigUint::from(2u8)];
    let sums = vec![BigUint::from(19u8), BigUint::from(1u8)];
    let products = vec![BigUint::from(65u8), BigUint::from(99u8)];

    for (left, right, sum, product) in izip!(&lefts, &rights, &sums, &products) {
        assert_eq!(backend.add(left, right)?, *sum);
        assert_eq!(backend.multiply(left, right)?, *product);
    }

    assert!(backend.is_zero(&BigUint::from(0u8))?);
    assert!(!backend.is_zero(&BigUint::from(5u8))?);
    assert!(backend.equals(&BigUint::from(5u8), &BigUint::from(5u8))?);
    assert!(!backend.equals(&BigUint::from(5u8), &BigUint::from(6u8))?);
    assert_eq!(backend.not(&BigUint::from(0u8))?, BigUint::from(1u8));
    assert_eq!(backend.not(&BigUint::from(1u8))?, BigUint::from(0u8));

    Ok(())
}
