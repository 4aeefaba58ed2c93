use crate::Result;
use crate::WireId;
use serde::{Deserialize, Serialize};

/// A WireListElement is either a single wire, or a range.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum WireListElement {
    Wire(WireId),
    WireRange(WireId, WireId),
}
use WireListElement::*;

/// A WireList is simply a vector of WireListElement
pub type WireList = Vec<WireListElement>;

/// Build a WireList of single wires from a list of ids.
///
/// `wirelist![1, 4, 8]` is `vec![Wire(1), Wire(4), Wire(8)]`, and
/// `wirelist![2; 3]` repeats `Wire(2)` three times.
#[macro_export]
macro_rules! wirelist {
    ($elem:expr; $n:expr) => {
        vec![$crate::structs::wire::WireListElement::Wire($elem); $n]
    };
    ($($wire:expr),* $(,)?) => {
        vec![$($crate::structs::wire::WireListElement::Wire($wire)),*]
    };
}

/// Expand a WireListElement into a vector of Result<WireId>.
pub fn expand_wirelistelement(wire: &WireListElement) -> Vec<Result<WireId>> {
    match wire {
        Wire(val) => vec![Ok(*val)],
        WireRange(first, last) => {
            if last <= first {
                vec![Err(format!(
                    "In WireRange, last WireId ({}) must be strictly greater than first WireId ({}).",
                    last, first
                )
                .into())]
            } else {
                (*first..=*last).map(Ok).collect()
            }
        }
    }
}

/// Expand a WireList into a vector of individual WireId.
pub fn expand_wirelist(wirelist: &WireList) -> Result<Vec<WireId>> {
    let res = wirelist
        .iter()
        .flat_map(expand_wirelistelement)
        .collect::<Result<Vec<WireId>>>()?;
    Ok(res)
}

pub fn wirelist_len(wirelist: &WireList) -> usize {
    wirelist
        .iter()
        .map(|wire| match wire {
            Wire(_) => 1,
            WireRange(first, last) => (*last as usize) - (*first as usize) + 1,
        })
        .sum()
}

#[test]
fn test_expand_wirelist() {
    let wirelist = vec![WireRange(0, 2), Wire(5)];
    let new_wirelist = expand_wirelist(&wirelist).unwrap();
    let correct_wirelist: Vec<WireId> = vec![0, 1, 2, 5];
    assert_eq!(new_wirelist, correct_wirelist);

    let wirelist = vec![WireRange(0, 1), WireRange(2, 2), Wire(5)];
    let new_wirelist = expand_wirelist(&wirelist);
    assert!(new_wirelist.is_err());

    let wirelist = vec![WireRange(0, 1), WireRange(4, 2), Wire(5)];
    let new_wirelist = expand_wirelist(&wirelist);
    assert!(new_wirelist.is_err());
}

#[test]
fn test_wirelist_macro() {
    assert_eq!(wirelist![3, 1], vec![Wire(3), Wire(1)]);
    assert_eq!(wirelist![8; 2], vec![Wire(8), Wire(8)]);
    assert_eq!(wirelist_len(&vec![WireRange(0, 2), Wire(5)]), 4);
}
