//! Pre-flight checks of one invocation against a compiled signature.
//!
//! Pure over buffer descriptors, so it runs before any GPU state is touched.

use tesseract_script::{Script, UniformType};

use super::uniforms::{UniformValue, Uniforms};
use crate::buffer::BufferDesc;
use crate::error::Violation;

/// Collects every violation of `outputs`/`uniforms` against `script`.
pub(crate) fn validate(script: &Script, outputs: &[BufferDesc], uniforms: &Uniforms<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let thread = &script.thread;

    if outputs.len() != thread.outputs.len() {
        violations.push(Violation::OutputCount { expected: thread.outputs.len(), found: outputs.len() });
    }

    for (index, (desc, element)) in outputs.iter().zip(&thread.outputs).enumerate() {
        if desc.kind.indexing() != thread.indexing {
            violations.push(Violation::OutputIndexing { index, expected: thread.indexing, found: desc.kind });
        }
        if desc.kind.element() != *element {
            violations.push(Violation::OutputElement { index, expected: *element, found: desc.kind });
        }
    }

    for (index, desc) in outputs.iter().enumerate() {
        if let Some(first) = outputs[..index].iter().position(|o| o.id == desc.id) {
            violations.push(Violation::DuplicateOutput { index, first });
        }
    }

    if let Some(first) = outputs.first() {
        for (index, desc) in outputs.iter().enumerate().skip(1) {
            if desc.texture_size != first.texture_size {
                violations.push(Violation::OutputDimensions {
                    index,
                    expected: first.texture_size,
                    found: desc.texture_size,
                });
            }
        }
    }

    for declaration in &script.uniforms {
        let Some(value) = uniforms.get(&declaration.name) else { continue };
        let matches = match (declaration.ty, value) {
            (UniformType::Int, UniformValue::Int(_)) => true,
            (UniformType::Float, UniformValue::Float(_)) => true,
            (UniformType::Buffer(kind), UniformValue::Buffer(b)) => b.desc.kind == kind,
            _ => false,
        };
        if !matches {
            violations.push(Violation::UniformKind {
                name: declaration.name.clone(),
                expected: declaration.ty,
                found: value.kind_name(),
            });
        }

        if let UniformValue::Buffer(b) = value {
            if let Some(output) = outputs.iter().position(|o| o.id == b.desc.id) {
                violations.push(Violation::Aliased { name: declaration.name.clone(), output });
            }
        }
    }

    violations
}
