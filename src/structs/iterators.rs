use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::SemanticError;
use crate::{Result, WireId};

/// An iterator expression, resolved into a concrete wire number once per
/// loop iteration against the iterator bindings currently in scope.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum IterExprWireNumber {
    /// Integer constant.
    IterExprConst(u64),
    /// Named iterator.
    IterExprName(String),
    /// Sum of two expressions.
    IterExprAdd(Box<IterExprWireNumber>, Box<IterExprWireNumber>),
    /// Difference of two expressions.
    IterExprSub(Box<IterExprWireNumber>, Box<IterExprWireNumber>),
    /// Product of two expressions.
    IterExprMul(Box<IterExprWireNumber>, Box<IterExprWireNumber>),
    /// Exact division by a constant.
    IterExprDivConst(Box<IterExprWireNumber>, u64),
}

use IterExprWireNumber::*;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum IterExprListElement {
    Single(IterExprWireNumber),
    Range(IterExprWireNumber, IterExprWireNumber),
}
use IterExprListElement::*;

pub type IterExprList = Vec<IterExprListElement>;

/// This function evaluates an iterator expression, replacing the iterator names by their value
/// given in the 'known_iterators' parameter.
pub fn evaluate_iterexpr(
    iter_expr: &IterExprWireNumber,
    known_iterators: &HashMap<String, u64>,
) -> Result<WireId> {
    Ok(match iter_expr {
        IterExprConst(val) => *val,
        IterExprName(name) => *known_iterators
            .get(name)
            .ok_or_else(|| SemanticError::UnknownIterator(name.clone()))?,
        IterExprAdd(left, right) => {
            let (l, r) = (
                evaluate_iterexpr(left, known_iterators)?,
                evaluate_iterexpr(right, known_iterators)?,
            );
            l.checked_add(r)
                .ok_or_else(|| SemanticError::IteratorOverflow(format!("{} + {}", l, r)))?
        }
        IterExprSub(left, right) => {
            let (l, r) = (
                evaluate_iterexpr(left, known_iterators)?,
                evaluate_iterexpr(right, known_iterators)?,
            );
            l.checked_sub(r)
                .ok_or_else(|| SemanticError::IteratorOverflow(format!("{} - {}", l, r)))?
        }
        IterExprMul(left, right) => {
            let (l, r) = (
                evaluate_iterexpr(left, known_iterators)?,
                evaluate_iterexpr(right, known_iterators)?,
            );
            l.checked_mul(r)
                .ok_or_else(|| SemanticError::IteratorOverflow(format!("{} * {}", l, r)))?
        }
        IterExprDivConst(numer, denom) => {
            if *denom == 0 {
                return Err("Division of an iterator expression by zero.".into());
            }
            let n = evaluate_iterexpr(numer, known_iterators)?;
            if n % denom != 0 {
                return Err(SemanticError::InexactDivision {
                    numer: n,
                    denom: *denom,
                }
                .into());
            }
            n / denom
        }
    })
}

/// Resolve a list of iterator expressions into concrete wire numbers, in order,
/// expanding ranges into each wire they cover.
pub fn evaluate_iterexpr_list(
    list: &IterExprList,
    known_iterators: &HashMap<String, u64>,
) -> Result<Vec<WireId>> {
    let mut wires = vec![];
    for element in list {
        match element {
            Single(expr) => wires.push(evaluate_iterexpr(expr, known_iterators)?),
            Range(first, last) => {
                let first_id = evaluate_iterexpr(first, known_iterators)?;
                let last_id = evaluate_iterexpr(last, known_iterators)?;
                if last_id <= first_id {
                    return Err(format!(
                        "In IterExpr range, last WireId ({}) must be strictly greater than first WireId ({}).",
                        last_id, first_id
                    )
                    .into());
                }
                wires.extend(first_id..=last_id);
            }
        }
    }
    Ok(wires)
}

#[cfg(test)]
mod tests {
    use super::IterExprListElement::*;
    use super::IterExprWireNumber::*;
    use super::*;

    fn bindings(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_evaluate_iterexpr() {
        let iters = bindings(&[("i", 7)]);

        assert_eq!(evaluate_iterexpr(&IterExprConst(4), &iters).unwrap(), 4);
        assert_eq!(
            evaluate_iterexpr(&IterExprName("i".into()), &iters).unwrap(),
            7
        );
        assert_eq!(
            evaluate_iterexpr(
                &IterExprAdd(
                    Box::new(IterExprName("i".into())),
                    Box::new(IterExprConst(12))
                ),
                &iters
            )
            .unwrap(),
            19
        );
        assert_eq!(
            evaluate_iterexpr(
                &IterExprMul(
                    Box::new(IterExprName("i".into())),
                    Box::new(IterExprConst(3))
                ),
                &iters
            )
            .unwrap(),
            21
        );
        assert_eq!(
            evaluate_iterexpr(
                &IterExprDivConst(Box::new(IterExprConst(8)), 2),
                &iters
            )
            .unwrap(),
            4
        );
    }

    #[test]
    fn test_inexact_division_is_rejected() {
        let err = evaluate_iterexpr(
            &IterExprDivConst(Box::new(IterExprConst(7)), 2),
            &HashMap::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemanticError>(),
            Some(&SemanticError::InexactDivision { numer: 7, denom: 2 })
        );
    }

    #[test]
    fn test_unknown_iterator_is_rejected() {
        let err = evaluate_iterexpr(&IterExprName("j".into()), &HashMap::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemanticError>(),
            Some(&SemanticError::UnknownIterator("j".into()))
        );
    }

    #[test]
    fn test_underflowing_subtraction_is_rejected() {
        let err = evaluate_iterexpr(
            &IterExprSub(Box::new(IterExprConst(1)), Box::new(IterExprConst(2))),
            &HashMap::new(),
        )
        .unwrap_err();
        assert!(err.downcast_ref::<SemanticError>().is_some());
    }

    #[test]
    fn test_evaluate_iterexpr_list() {
        let iters = bindings(&[("i", 2)]);
        let list: IterExprList = vec![
            Single(IterExprName("i".into())),
            Range(IterExprConst(5), IterExprConst(7)),
        ];
        assert_eq!(
            evaluate_iterexpr_list(&list, &iters).unwrap(),
            vec![2, 5, 6, 7]
        );
    }
}
