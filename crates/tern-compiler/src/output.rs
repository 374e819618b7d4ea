//! Compilation output handed to the class-file writer.

use tern_core::{MachineType, MethodFlags};

use crate::bytecode::Instruction;

/// Every class produced from one compilation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledUnit {
    /// Classes in declaration order (the script class first).
    pub classes: Vec<CompiledClass>,
}

impl CompiledUnit {
    /// Find a class by name.
    pub fn class(&self, name: &str) -> Option<&CompiledClass> {
        self.classes.iter().find(|class| class.name == name)
    }
}

/// A public class declaration with its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClass {
    pub name: String,
    pub superclass: String,
    pub interfaces: Vec<String>,
    /// Methods in the order they finished compiling.
    pub methods: Vec<CompiledMethod>,
}

impl CompiledClass {
    /// First method named `name`.
    pub fn method(&self, name: &str) -> Option<&CompiledMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Every overload named `name`.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CompiledMethod> {
        self.methods.iter().filter(move |method| method.name == name)
    }
}

/// A public method (or constructor) declaration with its code.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMethod {
    /// Method name; `<init>` for constructors.
    pub name: String,
    pub flags: MethodFlags,
    pub params: Vec<MachineType>,
    pub return_type: MachineType,
    pub instructions: Vec<Instruction>,
    /// Local variable slots used, including `this` and parameters.
    pub max_locals: u16,
    /// Operand stack slots used.
    pub max_stack: u16,
}

impl CompiledMethod {
    /// Whether the method is static.
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Whether the method is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodFlags::CONSTRUCTOR)
    }

}
