use thiserror::Error;

/// Internal failure of the pattern matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A pattern matched zero tokens, which would make the scan loop forever.
    #[error("zero length match for pattern `{0}`")]
    ZeroLengthMatch(String),
}

/// A compile error from the thread micro-language.
///
/// Every variant is fatal: no partial [`Script`](crate::Script) is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("program has no `[<outputs>] thread (<params>)` signature")]
    MissingThread,

    #[error("program declares {0} thread functions, expected exactly one")]
    MultipleThreads(usize),

    #[error("invalid thread output `{0}`, expected `float` or `color`")]
    InvalidOutput(String),

    #[error("thread functions take 1, 2 or 3 parameters, got {0}")]
    InvalidParameterCount(usize),

    #[error("uniform `{name}` has unknown type `{ty}`")]
    UnknownUniformType { name: String, ty: String },

    #[error("uniform `{0}` is declared more than once")]
    DuplicateUniform(String),

    #[error("thread[{index}] written but the thread declares {outputs} output(s)")]
    OutputIndexOutOfRange { index: usize, outputs: usize },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}
