//! Front-end check of generated GLSL.
//!
//! Parsing and validating with naga before handing the module to wgpu turns
//! a malformed program into a [`ProgramError::Shader`] carrying the compiler
//! diagnostic, instead of a device validation error.

use wgpu::naga;

use crate::error::{ProgramError, Stage};

impl Stage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// Parses and validates `source`, returning the checked module.
pub(crate) fn compile(stage: Stage, source: &str) -> Result<naga::Module, ProgramError> {
    let options = naga::front::glsl::Options::from(stage.naga());
    let module = naga::front::glsl::Frontend::default()
        .parse(&options, source)
        .map_err(|e| ProgramError::Shader { stage, diagnostic: e.emit_to_string(source) })?;

    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::default())
        .validate(&module)
        .map_err(|e| ProgramError::Shader { stage, diagnostic: e.emit_to_string(source) })?;

    log::trace!("{stage} shader:\n{source}");
    Ok(module)
}

/// Whether the module's entry point reads vertex attribute `location`.
pub(crate) fn reads_location(module: &naga::Module, location: u32) -> bool {
    module.entry_points.iter().any(|ep| {
        ep.function.arguments.iter().any(|arg| {
            matches!(arg.binding, Some(naga::Binding::Location { location: l, .. }) if l == location)
        })
    })
}
