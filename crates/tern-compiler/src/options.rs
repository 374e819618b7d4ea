//! Compiler configuration.

/// What a value-returning method does after its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnEpilogue {
    /// Return the value the body computed.
    #[default]
    Corrected,
    /// Reference-returning instance methods discard the body value and
    /// return `this`.
    Legacy,
}

/// Options applied to every unit a [`Compiler`](crate::Compiler) compiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Trace every emitted instruction (`tern::emit` target).
    pub verbose: bool,
    /// `(short name, fully qualified host class)` aliases installed before
    /// any user class is registered.
    pub imports: Vec<(String, String)>,
    /// Return epilogue for value-returning methods.
    pub return_epilogue: ReturnEpilogue,
}

impl CompileOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable per-instruction tracing.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Alias `short` to the host class `full`.
    pub fn with_import(mut self, short: impl Into<String>, full: impl Into<String>) -> Self {
        self.imports.push((short.into(), full.into()));
        self
    }

    /// Select the return epilogue.
    pub fn with_return_epilogue(mut self, epilogue: ReturnEpilogue) -> Self {
        self.return_epilogue = epilogue;
        self
    }
}
