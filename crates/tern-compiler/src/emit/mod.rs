//! Bytecode emitter for the Tern backend.
//!
//! The [`BytecodeEmitter`] appends instructions for a single method in
//! execution order and simulates the operand stack as it goes, so every
//! method leaves with a verified `max_stack` and balanced branches.
//!
//! # Example
//!
//! ```
//! use tern_compiler::bytecode::Instruction;
//! use tern_compiler::emit::BytecodeEmitter;
//! use tern_core::StackKind;
//!
//! let mut emitter = BytecodeEmitter::new(false);
//! emitter.emit_int(40);
//! emitter.emit_int(2);
//! emitter.emit(Instruction::IAdd);
//! emitter.emit_return(StackKind::Int);
//!
//! let code = emitter.finish().unwrap();
//! assert_eq!(code.max_stack, 2);
//! ```

mod labels;

pub use labels::LabelManager;

use tern_core::{ClassRef, CompilationError, MethodCandidate, StackKind};

use crate::bytecode::{Condition, Instruction, Label, MethodRef};

/// How an invocation dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Static,
    Virtual,
    Interface,
    Special,
}

/// Finished instruction stream of one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedCode {
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Maximum operand stack size, in slots (wide values take two).
    pub max_stack: u16,
}

/// Emits instructions for one method.
#[derive(Debug)]
pub struct BytecodeEmitter {
    /// Instructions emitted so far.
    code: Vec<Instruction>,

    /// Simulated operand stack (kinds, bottom first).
    stack: Vec<StackKind>,

    /// Current stack size in slots.
    words: u16,

    /// Largest `words` seen.
    max_words: u16,

    /// Whether the current position can be reached.
    reachable: bool,

    /// Label bookkeeping.
    labels: LabelManager,

    /// First broken invariant, reported by `finish`.
    fault: Option<String>,

    /// Trace every instruction.
    verbose: bool,
}

impl BytecodeEmitter {
    /// Create an emitter for a fresh method.
    pub fn new(verbose: bool) -> Self {
        Self {
            code: Vec::new(),
            stack: Vec::new(),
            words: 0,
            max_words: 0,
            reachable: true,
            labels: LabelManager::new(),
            fault: None,
            verbose,
        }
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an instruction, applying its stack effect.
    pub fn emit(&mut self, instruction: Instruction) {
        if self.verbose {
            tracing::trace!(
                target: "tern::emit",
                depth = self.stack.len(),
                "{instruction}"
            );
        }

        if let Some(target) = instruction.target() {
            let pops = instruction.pops();
            let remaining = self.stack.len().saturating_sub(pops);
            let snapshot = self.stack[..remaining].to_vec();
            if let Err(message) = self.labels.record_jump(target, &snapshot) {
                self.fail(message);
            }
        }

        self.apply(&instruction);
        if instruction.is_terminal() {
            self.reachable = false;
        }
        self.code.push(instruction);
    }

    fn apply(&mut self, instruction: &Instruction) {
        let mut popped = Vec::with_capacity(instruction.pops());
        for _ in 0..instruction.pops() {
            let Some(kind) = self.stack.pop() else {
                self.fail(format!("stack underflow at '{instruction}'"));
                return;
            };
            self.words -= kind.slot_width();
            popped.push(kind);
        }

        // Width-specific instructions must see a value of their own kind.
        let checked = match instruction {
            Instruction::Pop(kind) | Instruction::Return(kind) | Instruction::Store { kind, .. } => {
                popped.first().map(|actual| (*kind, *actual))
            }
            Instruction::Dup(kind) => match self.stack.last() {
                Some(actual) => Some((*kind, *actual)),
                None => {
                    self.fail(format!("stack underflow at '{instruction}'"));
                    return;
                }
            },
            _ => None,
        };
        if let Some((expected, actual)) = checked {
            if expected != actual {
                self.fail(format!("'{instruction}' on a {actual:?} value"));
            }
        }

        if let Some(kind) = instruction.pushes() {
            self.push(kind);
        }
    }

    fn push(&mut self, kind: StackKind) {
        self.stack.push(kind);
        self.words += kind.slot_width();
        self.max_words = self.max_words.max(self.words);
    }

    fn fail(&mut self, message: String) {
        if self.fault.is_none() {
            tracing::debug!(%message, "emitter invariant broken");
            self.fault = Some(message);
        }
    }

    /// Number of values currently on the simulated stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Kind of the top value.
    pub fn top(&self) -> Option<StackKind> {
        self.stack.last().copied()
    }

    /// Whether the current position can be reached.
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit a narrow integer constant.
    pub fn emit_int(&mut self, value: i32) {
        self.emit(Instruction::PushInt(value));
    }

    /// Emit a wide integer constant.
    pub fn emit_long(&mut self, value: i64) {
        self.emit(Instruction::PushLong(value));
    }

    /// Emit a boolean as `0`/`1`.
    pub fn emit_bool(&mut self, value: bool) {
        self.emit(Instruction::PushInt(i32::from(value)));
    }

    /// Emit a string constant.
    pub fn emit_string(&mut self, value: &str) {
        self.emit(Instruction::PushString(value.to_string()));
    }

    /// Emit null.
    pub fn emit_null(&mut self) {
        self.emit(Instruction::PushNull);
    }

    // ==========================================================================
    // Locals and Stack
    // ==========================================================================

    /// Emit a local load.
    pub fn emit_load(&mut self, kind: StackKind, slot: u16) {
        self.emit(Instruction::Load { kind, slot });
    }

    /// Emit a local store.
    pub fn emit_store(&mut self, kind: StackKind, slot: u16) {
        self.emit(Instruction::Store { kind, slot });
    }

    /// Emit duplicate top of stack.
    pub fn emit_dup(&mut self, kind: StackKind) {
        self.emit(Instruction::Dup(kind));
    }

    /// Emit pop (discard top of stack).
    pub fn emit_pop(&mut self, kind: StackKind) {
        self.emit(Instruction::Pop(kind));
    }

    // ==========================================================================
    // Arithmetic
    // ==========================================================================

    /// Emit `int -> long` widening.
    pub fn emit_widen(&mut self) {
        self.emit(Instruction::I2L);
    }

    // ==========================================================================
    // Objects and Calls
    // ==========================================================================

    /// Emit allocation of an uninitialized instance.
    pub fn emit_new(&mut self, class: &ClassRef) {
        self.emit(Instruction::New(class.clone()));
    }

    /// Emit a call of `method`.
    pub fn emit_invoke(&mut self, kind: InvokeKind, method: &MethodCandidate) {
        let method = MethodRef::from(method);
        self.emit(match kind {
            InvokeKind::Static => Instruction::InvokeStatic(method),
            InvokeKind::Virtual => Instruction::InvokeVirtual(method),
            InvokeKind::Interface => Instruction::InvokeInterface(method),
            InvokeKind::Special => Instruction::InvokeSpecial(method),
        });
    }

    /// Emit return of the top value.
    pub fn emit_return(&mut self, kind: StackKind) {
        self.emit(Instruction::Return(kind));
    }

    /// Emit return from a void method.
    pub fn emit_return_void(&mut self) {
        self.emit(Instruction::ReturnVoid);
    }

    // ==========================================================================
    // Jumps and Control Flow
    // ==========================================================================

    /// Create a new unbound label.
    pub fn new_label(&mut self) -> Label {
        self.labels.create()
    }

    /// Bind `label` at the current position.
    pub fn bind(&mut self, label: Label) {
        let current = self.reachable.then(|| self.stack.clone());
        match self.labels.bind(label, current.as_deref()) {
            Ok(Some(stack)) => {
                self.words = stack.iter().map(|kind| kind.slot_width()).sum();
                self.stack = stack;
                self.reachable = true;
            }
            Ok(None) => self.reachable = true,
            Err(message) => self.fail(message),
        }
        self.code.push(Instruction::Bind(label));
    }

    /// Emit an unconditional jump.
    pub fn emit_goto(&mut self, target: Label) {
        self.emit(Instruction::Goto(target));
    }

    /// Emit a test of the top narrow integer against zero.
    pub fn emit_if(&mut self, cond: Condition, target: Label) {
        self.emit(Instruction::If { cond, target });
    }

    /// Emit a comparison of the two top narrow integers.
    pub fn emit_if_icmp(&mut self, cond: Condition, target: Label) {
        self.emit(Instruction::IfICmp { cond, target });
    }

    // ==========================================================================
    // Completion
    // ==========================================================================

    /// Finish the method.
    ///
    /// Fails with an internal error when a label was left unbound or the
    /// simulated stack was ever inconsistent.
    pub fn finish(self) -> Result<EmittedCode, CompilationError> {
        if let Some(message) = self.fault {
            return Err(CompilationError::internal(message));
        }
        let unbound = self.labels.unbound();
        if let Some(label) = unbound.first() {
            return Err(CompilationError::internal(format!(
                "label {label} was never bound"
            )));
        }
        Ok(EmittedCode {
            instructions: self.code,
            max_stack: self.max_words,
        })
    }
}
