use std::collections::{HashMap, HashSet};

use crate::errors::SemanticError;
use crate::{Result, WireId};

/// The wire store of one lexical scope (relation root, function body,
/// anonymous subcircuit, or loop iteration).
///
/// Each wire id goes through at most three states: unassigned, assigned
/// (holding a backend wire), then freed. Freed wires give their storage back,
/// only the id itself is remembered so later accesses can be told apart from
/// plain use-before-definition.
///
/// The type is generic over the backend's wire representation; the validator
/// instantiates it with `()` to track liveness without values.
pub struct WireFrame<W> {
    live: HashMap<WireId, W>,
    freed: HashSet<WireId>,
}

impl<W> Default for WireFrame<W> {
    fn default() -> Self {
        WireFrame {
            live: HashMap::new(),
            freed: HashSet::new(),
        }
    }
}

impl<W> WireFrame<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the single assignment of `id` in this scope.
    pub fn assign(&mut self, id: WireId, wire: W) -> Result<()> {
        if self.live.contains_key(&id) || self.freed.contains(&id) {
            return Err(SemanticError::DoubleAssignment(id).into());
        }
        self.live.insert(id, wire);
        Ok(())
    }

    /// Read a wire previously assigned and not yet freed.
    pub fn get(&self, id: WireId) -> Result<&W> {
        match self.live.get(&id) {
            Some(wire) => Ok(wire),
            None if self.freed.contains(&id) => Err(SemanticError::UseAfterFree(id).into()),
            None => Err(SemanticError::UseBeforeDef(id).into()),
        }
    }

    pub fn is_live(&self, id: WireId) -> bool {
        self.live.contains_key(&id)
    }

    /// Free all wires between `first` and `last` INCLUSIVE.
    /// The whole range is checked before any wire is reclaimed, so a failing
    /// free leaves the frame untouched.
    pub fn free_range(&mut self, first: WireId, last: WireId) -> Result<()> {
        for id in first..=last {
            if self.freed.contains(&id) {
                return Err(SemanticError::DoubleFree(id).into());
            }
            if !self.live.contains_key(&id) {
                return Err(SemanticError::FreeUnassigned(id).into());
            }
        }
        for id in first..=last {
            self.live.remove(&id);
            self.freed.insert(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(err: Box<dyn std::error::Error>) -> SemanticError {
        err.downcast_ref::<SemanticError>().unwrap().clone()
    }

    #[test]
    fn test_assign_then_read() {
        let mut frame = WireFrame::new();
        frame.assign(4, 42u64).unwrap();
        assert_eq!(*frame.get(4).unwrap(), 42);
        assert!(frame.is_live(4));
    }

    #[test]
    fn test_double_assignment() {
        let mut frame = WireFrame::new();
        frame.assign(0, ()).unwrap();
        assert_eq!(
            kind_of(frame.assign(0, ()).unwrap_err()),
            SemanticError::DoubleAssignment(0)
        );
    }

    #[test]
    fn test_use_before_def() {
        let frame = WireFrame::<()>::new();
        assert_eq!(
            kind_of(frame.get(7).unwrap_err()),
            SemanticError::UseBeforeDef(7)
        );
    }

    #[test]
    fn test_free_then_liveness() {
        let mut frame = WireFrame::new();
        for id in 0..=3 {
            frame.assign(id, id).unwrap();
        }
        frame.free_range(0, 2).unwrap();

        // Freed ids are gone, the rest of the frame is untouched.
        assert!(!frame.is_live(1));
        assert_eq!(
            kind_of(frame.get(1).unwrap_err()),
            SemanticError::UseAfterFree(1)
        );
        assert_eq!(*frame.get(3).unwrap(), 3);

        // A freed id can never be redefined in this scope.
        assert_eq!(
            kind_of(frame.assign(2, 8).unwrap_err()),
            SemanticError::DoubleAssignment(2)
        );
    }

    #[test]
    fn test_double_free() {
        let mut frame = WireFrame::new();
        frame.assign(0, ()).unwrap();
        frame.free_range(0, 0).unwrap();
        assert_eq!(
            kind_of(frame.free_range(0, 0).unwrap_err()),
            SemanticError::DoubleFree(0)
        );
    }

    #[test]
    fn test_free_unassigned() {
        let mut frame = WireFrame::new();
        frame.assign(0, ()).unwrap();
        let err = frame.free_range(0, 1).unwrap_err();
        assert_eq!(kind_of(err), SemanticError::FreeUnassigned(1));
        // The failing free left wire_0 live.
        assert!(frame.is_live(0));
    }
}
