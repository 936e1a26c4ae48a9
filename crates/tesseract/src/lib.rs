//! Tesseract: elementwise GPU compute over typed 1D/2D/3D buffers.
//!
//! A thread program (see [`tesseract_script`]) is compiled into a render
//! pipeline; executing it runs the thread function once per texel of its
//! outputs. Buffers live in RGBA8 textures with a CPU mirror that is
//! synchronised explicitly with `push`/`pull`.
//!
//! ```no_run
//! use tesseract::{Context, ContextConfig, Uniforms};
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = Context::new(ContextConfig::default())?;
//!
//! let mut input = ctx.create_float1d(8)?;
//! input.map(|i| i as f32).push();
//! let mut output = ctx.create_float1d(8)?;
//!
//! let program = ctx.create_program(
//!     "uniform Float1D input;\n[float] thread (int x) { thread[0] = input[x] * 2.0; }",
//! )?;
//! program.execute(&[output.binding()], &Uniforms::new().buffer("input", input.binding()))?;
//!
//! output.pull()?;
//! assert_eq!(output.get(3), 6.0);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod context;
pub mod device;
pub mod error;
pub mod logging;
pub mod program;
mod quad;

pub use buffer::{
    Buffer, BufferDesc, BufferId, BufferRef, Color, Color1D, Color2D, Color3D, Element, Extents, Float1D, Float2D,
    Float3D, Shape, Shape1D, Shape2D, Shape3D,
};
pub use context::Context;
pub use device::ContextConfig;
pub use error::{BufferError, ExecuteError, ProgramError, Stage, Violation};
pub use logging::{LoggingConfig, init_logging};
pub use program::{Program, UniformValue, Uniforms};

pub use tesseract_script::{BufferKind, ElementKind, Indexing, Script, ScriptError};
