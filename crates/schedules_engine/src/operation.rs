//! Internal operation vocabulary emitted by the sequence builder
//! (Component B) and consumed by the action adapter (Component E).
//!
//! `Operation` never reaches the public API; [`crate::hrevolve_adapter`]
//! is the only consumer. The spec's data model distinguishes a
//! single-step `Forward` from a bulk `Forwards` pair, but the adapter
//! treats both identically (both become `Action::Forward(n0, n1)`), so
//! this implementation unifies them into one `Forward { from, to }`
//! variant — a representational simplification recorded in
//! `DESIGN.md`, not a behaviour change.

/// A low-level scheduling step produced by the H-Revolve sequence
/// builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operation {
    /// Advance the forward solver from `from` to `to` (`to > from`).
    Forward {
        /// Starting step.
        from: usize,
        /// Ending step.
        to: usize,
    },
    /// A single adjoint step ending at `step`.
    Backward {
        /// The step the adjoint is currently working from.
        step: usize,
    },
    /// Persist a checkpoint for `step` at `level`.
    Write {
        /// Memory level index.
        level: usize,
        /// Step being checkpointed.
        step: usize,
    },
    /// Restore the checkpoint for `step` from `level`.
    Read {
        /// Memory level index.
        level: usize,
        /// Step being restored.
        step: usize,
    },
    /// Free the checkpoint for `step` at `level`.
    Discard {
        /// Memory level index.
        level: usize,
        /// Step being freed.
        step: usize,
    },
    /// Internal marker: adjoint-dependency data captured while
    /// advancing forward from `from` to `to`. Never surfaces as a
    /// public action; folded into the following `Backward`'s mapping.
    WriteForward {
        /// Starting step.
        from: usize,
        /// Ending step.
        to: usize,
    },
    /// Internal marker: adjoint-dependency data for `from..to` may be
    /// dropped. Never surfaces as a public action.
    DiscardForward {
        /// Starting step.
        from: usize,
        /// Ending step.
        to: usize,
    },
}

impl Operation {
    /// Adds `delta` to every step index this operation carries, except
    /// the `level` field of level/step pairs (§4.B `shift`).
    fn shift(self, delta: usize) -> Self {
        match self {
            Operation::Forward { from, to } => Operation::Forward {
                from: from + delta,
                to: to + delta,
            },
            Operation::Backward { step } => Operation::Backward { step: step + delta },
            Operation::Write { level, step } => Operation::Write {
                level,
                step: step + delta,
            },
            Operation::Read { level, step } => Operation::Read {
                level,
                step: step + delta,
            },
            Operation::Discard { level, step } => Operation::Discard {
                level,
                step: step + delta,
            },
            Operation::WriteForward { from, to } => Operation::WriteForward {
                from: from + delta,
                to: to + delta,
            },
            Operation::DiscardForward { from, to } => Operation::DiscardForward {
                from: from + delta,
                to: to + delta,
            },
        }
    }
}

/// A flat, ordered list of [`Operation`]s realizing a schedule, or part
/// of one. Nested `concat` presentation is not modeled: only the
/// flattened, ordered view matters for Component E (§4.B).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence(pub Vec<Operation>);

impl Sequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a single operation.
    pub fn push(&mut self, op: Operation) {
        self.0.push(op);
    }

    /// Appends every operation of `other`, in order.
    pub fn extend(&mut self, other: Sequence) {
        self.0.extend(other.0);
    }

    /// Returns a copy with every step index shifted by `delta`.
    pub fn shift(mut self, delta: usize) -> Self {
        for op in &mut self.0 {
            *op = op.shift(delta);
        }
        self
    }

    /// Number of operations in the sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Sequence {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_step_indices_not_levels() {
        let op = Operation::Read { level: 1, step: 0 };
        assert_eq!(op.shift(5), Operation::Read { level: 1, step: 5 });
    }

    #[test]
    fn shift_moves_forward_pair() {
        let op = Operation::Forward { from: 0, to: 3 };
        assert_eq!(op.shift(2), Operation::Forward { from: 2, to: 5 });
    }

    #[test]
    fn sequence_extend_preserves_order() {
        let mut seq = Sequence::new();
        seq.push(Operation::Backward { step: 0 });
        let mut other = Sequence::new();
        other.push(Operation::Backward { step: 1 });
        seq.extend(other);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.0[1], Operation::Backward { step: 1 });
    }
}
