//! Label management for control flow.
//!
//! Tracks, per method, which labels exist, whether they are bound, and the
//! operand stack shape expected at each one. Every jump to a label and the
//! fall-through at its binding must agree on that shape.

use tern_core::StackKind;

use crate::bytecode::Label;

/// State of a single label.
#[derive(Debug, Default)]
struct LabelState {
    /// Whether the label has been bound.
    bound: bool,
    /// Stack shape recorded by the first jump or by the binding.
    stack: Option<Vec<StackKind>>,
}

/// Manages the labels of one method.
#[derive(Debug, Default)]
pub struct LabelManager {
    labels: Vec<LabelState>,
}

impl LabelManager {
    /// Create a new label manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh, unbound label.
    pub fn create(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(LabelState::default());
        label
    }

    fn state(&mut self, label: Label) -> Result<&mut LabelState, String> {
        self.labels
            .get_mut(label.0 as usize)
            .ok_or_else(|| format!("label {label} does not belong to this method"))
    }

    /// Record a jump to `label` taken with `stack` on the operand stack.
    pub fn record_jump(&mut self, label: Label, stack: &[StackKind]) -> Result<(), String> {
        let state = self.state(label)?;
        match &state.stack {
            None => {
                state.stack = Some(stack.to_vec());
                Ok(())
            }
            Some(expected) if expected.as_slice() == stack => Ok(()),
            Some(expected) => Err(format!(
                "jump to {label} with stack depth {} (expected {})",
                stack.len(),
                expected.len()
            )),
        }
    }

    /// Bind `label` at the current position.
    ///
    /// `stack` is the fall-through stack shape, or `None` when the current
    /// position is unreachable. Returns the shape execution continues with.
    pub fn bind(
        &mut self,
        label: Label,
        stack: Option<&[StackKind]>,
    ) -> Result<Option<Vec<StackKind>>, String> {
        let state = self.state(label)?;
        if state.bound {
            return Err(format!("label {label} bound twice"));
        }
        state.bound = true;

        match (stack, state.stack.clone()) {
            (Some(current), Some(expected)) if expected.as_slice() != current => Err(format!(
                "stack depth {} at {label} does not match jumps ({})",
                current.len(),
                expected.len()
            )),
            (Some(current), None) => {
                state.stack = Some(current.to_vec());
                Ok(Some(current.to_vec()))
            }
            (_, expected) => Ok(expected),
        }
    }

    /// Labels created but never bound.
    pub fn unbound(&self) -> Vec<Label> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, state)| !state.bound)
            .map(|(index, _)| Label(index as u32))
            .collect()
    }

    /// Number of labels created.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no label was created.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
