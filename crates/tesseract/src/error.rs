use std::fmt;

use tesseract_script::{BufferKind, ElementKind, Indexing, ScriptError, UniformType};
use thiserror::Error;

// ── program construction ──────────────────────────────────────────────────

/// Shader stage of a generated program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The generated shader was rejected; `diagnostic` is the compiler output.
    #[error("{stage} shader failed to compile:\n{diagnostic}")]
    Shader { stage: Stage, diagnostic: String },

    #[error("program needs {requested} {what}, device allows {limit}")]
    Limit { what: &'static str, requested: u32, limit: u32 },
}

// ── execution ─────────────────────────────────────────────────────────────

/// One reason an invocation was rejected before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    OutputCount { expected: usize, found: usize },
    OutputIndexing { index: usize, expected: Indexing, found: BufferKind },
    OutputElement { index: usize, expected: ElementKind, found: BufferKind },
    OutputDimensions { index: usize, expected: (u32, u32), found: (u32, u32) },
    UniformKind { name: String, expected: UniformType, found: String },
    DuplicateOutput { index: usize, first: usize },
    Aliased { name: String, output: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputCount { expected, found } => {
                write!(f, "expected {expected} outputs, {found} given")
            }
            Self::OutputIndexing { index, expected, found } => {
                write!(f, "output {index}: {found} cannot be written by a {expected} thread")
            }
            Self::OutputElement { index, expected, found } => {
                write!(f, "output {index}: {found} cannot hold a `{expected}` output")
            }
            Self::OutputDimensions { index, expected, found } => write!(
                f,
                "output {index}: texture is {}x{}, other outputs are {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::UniformKind { name, expected, found } => {
                write!(f, "uniform `{name}` is declared {expected}, {found} given")
            }
            Self::DuplicateOutput { index, first } => {
                write!(f, "output {index} is the same buffer as output {first}")
            }
            Self::Aliased { name, output } => {
                write!(f, "uniform `{name}` is also bound as output {output}")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("{}", join_lines(.0))]
    Validation(Vec<Violation>),

    #[error("output {index} cannot be a render attachment: {reason}")]
    IncompleteAttachment { index: usize, reason: String },
}

fn join_lines(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

// ── buffers ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer texture {width}x{height} exceeds the device limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },

    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("readback map callback was dropped")]
    MapCallbackDropped,

    #[error("device poll failed: {0}")]
    Poll(String),
}
