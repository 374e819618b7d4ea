//! Host standard library seeded into every registry.
//!
//! Only the handful of classes scripts commonly touch: the root class,
//! strings and builders, boxed integers, math helpers, the basic collection
//! interfaces and the console stream.

use tern_core::{
    CONSTRUCTOR_NAME, MachineType, MethodCandidate, MethodFlags, classes,
};

use crate::{ClassEntry, HostRegistry};

pub const STRING_BUILDER: &str = "java.lang.StringBuilder";
pub const MATH: &str = "java.lang.Math";
pub const INTEGER: &str = "java.lang.Integer";
pub const RUNNABLE: &str = "java.lang.Runnable";
pub const COMPARABLE: &str = "java.lang.Comparable";
pub const LIST: &str = "java.util.List";
pub const ARRAY_LIST: &str = "java.util.ArrayList";
pub const PRINT_STREAM: &str = "java.io.PrintStream";

/// Collects the members of one class before registration.
struct ClassBuilder {
    entry: ClassEntry,
}

impl ClassBuilder {
    fn new(entry: ClassEntry) -> Self {
        Self { entry }
    }

    fn member(
        mut self,
        name: &str,
        params: &[MachineType],
        return_type: MachineType,
        flags: MethodFlags,
    ) -> Self {
        let flags = if self.entry.is_interface() {
            flags | MethodFlags::INTERFACE
        } else {
            flags
        };
        self.entry.members.push(MethodCandidate {
            owner: self.entry.class.clone(),
            name: name.to_string(),
            params: params.to_vec(),
            return_type,
            flags,
        });
        self
    }

    fn constructor(self, params: &[MachineType]) -> Self {
        self.member(
            CONSTRUCTOR_NAME,
            params,
            MachineType::Void,
            MethodFlags::CONSTRUCTOR,
        )
    }

    fn method(self, name: &str, params: &[MachineType], return_type: MachineType) -> Self {
        self.member(name, params, return_type, MethodFlags::empty())
    }

    fn function(self, name: &str, params: &[MachineType], return_type: MachineType) -> Self {
        self.member(name, params, return_type, MethodFlags::STATIC)
    }

    fn build(self) -> ClassEntry {
        self.entry
    }
}

/// Register the standard library classes.
///
/// The table is static and internally consistent, so registration conflicts
/// can only come from a registry that already holds these names; such
/// entries are kept as they are.
pub(crate) fn register_standard_library(registry: &mut HostRegistry) {
    for entry in standard_classes() {
        let name = entry.name().to_string();
        if let Err(err) = registry.register_class(entry) {
            tracing::warn!(class = %name, error = %err, "standard class not registered");
        }
    }
}

fn standard_classes() -> Vec<ClassEntry> {
    let int = MachineType::INT;
    let long = MachineType::LONG;
    let boolean = MachineType::BOOLEAN;
    let void = MachineType::Void;
    let object = MachineType::object();
    let string = MachineType::string();
    let builder = MachineType::class(STRING_BUILDER);

    vec![
        ClassBuilder::new(ClassEntry {
            superclass: None,
            ..ClassEntry::class(classes::OBJECT)
        })
        .constructor(&[])
        .method("toString", &[], string.clone())
        .method("hashCode", &[], int.clone())
        .method("equals", &[object.clone()], boolean.clone())
        .build(),
        ClassBuilder::new(ClassEntry::class(classes::STRING).with_interface(COMPARABLE))
            .constructor(&[])
            .constructor(&[string.clone()])
            .method("length", &[], int.clone())
            .method("isEmpty", &[], boolean.clone())
            .method("concat", &[string.clone()], string.clone())
            .method("compareTo", &[object.clone()], int.clone())
            .function("valueOf", &[int.clone()], string.clone())
            .function("valueOf", &[long.clone()], string.clone())
            .function("valueOf", &[boolean.clone()], string.clone())
            .function("valueOf", &[object.clone()], string.clone())
            .build(),
        ClassBuilder::new(ClassEntry::class(STRING_BUILDER))
            .constructor(&[])
            .constructor(&[string.clone()])
            .method("append", &[string.clone()], builder.clone())
            .method("append", &[int.clone()], builder.clone())
            .method("append", &[long.clone()], builder.clone())
            .method("append", &[boolean.clone()], builder.clone())
            .method("append", &[object.clone()], builder.clone())
            .method("length", &[], int.clone())
            .method("setLength", &[int.clone()], void.clone())
            .build(),
        ClassBuilder::new(ClassEntry::class(MATH))
            .function("abs", &[int.clone()], int.clone())
            .function("abs", &[long.clone()], long.clone())
            .function("max", &[int.clone(), int.clone()], int.clone())
            .function("max", &[long.clone(), long.clone()], long.clone())
            .function("min", &[int.clone(), int.clone()], int.clone())
            .function("min", &[long.clone(), long.clone()], long.clone())
            .build(),
        ClassBuilder::new(ClassEntry::class(INTEGER).with_interface(COMPARABLE))
            .constructor(&[int.clone()])
            .method("intValue", &[], int.clone())
            .method("longValue", &[], long.clone())
            .method("compareTo", &[object.clone()], int.clone())
            .function("valueOf", &[int.clone()], MachineType::class(INTEGER))
            .function("parseInt", &[string.clone()], int.clone())
            .function("toString", &[int.clone()], string.clone())
            .build(),
        ClassBuilder::new(ClassEntry::interface(RUNNABLE))
            .method("run", &[], void.clone())
            .build(),
        ClassBuilder::new(ClassEntry::interface(COMPARABLE))
            .method("compareTo", &[object.clone()], int.clone())
            .build(),
        ClassBuilder::new(ClassEntry::interface(LIST))
            .method("add", &[object.clone()], boolean.clone())
            .method("get", &[int.clone()], object.clone())
            .method("size", &[], int.clone())
            .method("isEmpty", &[], boolean.clone())
            .method("clear", &[], void.clone())
            .build(),
        ClassBuilder::new(ClassEntry::class(ARRAY_LIST).with_interface(LIST))
            .constructor(&[])
            .constructor(&[int.clone()])
            .method("add", &[object.clone()], boolean.clone())
            .method("get", &[int.clone()], object.clone())
            .method("size", &[], int.clone())
            .method("isEmpty", &[], boolean.clone())
            .method("clear", &[], void.clone())
            .build(),
        ClassBuilder::new(ClassEntry::class(PRINT_STREAM))
            .method("println", &[], void.clone())
            .method("println", &[string.clone()], void.clone())
            .method("println", &[int.clone()], void.clone())
            .method("println", &[long.clone()], void.clone())
            .method("println", &[boolean.clone()], void.clone())
            .method("println", &[object.clone()], void.clone())
            .method("print", &[string], void)
            .build(),
    ]
}
