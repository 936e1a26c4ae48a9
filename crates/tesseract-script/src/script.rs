//! Source-to-source compiler from thread programs to a shader pair.
//!
//! Each pass re-tokenizes the current text, matches a [`Pattern`] and splices
//! the replacement by byte range. Passes run in a fixed order; buffer index
//! and field rewrites locate names from the still-unrewritten declaration
//! lines, so they run before the declaration of that kind is expanded.

use std::collections::HashSet;

use crate::ast::{
    BufferKind, ElementKind, Indexing, ThreadFunction, UniformDeclaration, UniformType,
};
use crate::bindings::BindingTable;
use crate::codec::{self, host_endian};
use crate::error::ScriptError;
use crate::glsl;
use crate::pattern::Pattern;

/// A compiled thread program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub thread: ThreadFunction,
    pub uniforms: Vec<UniformDeclaration>,
    pub bindings: BindingTable,
    pub vertex: String,
    pub fragment: String,
}

/// Compiles thread program source into a [`Script`].
pub fn transform(source: &str) -> Result<Script, ScriptError> {
    let mut code = strip_comments(source);

    let thread = read_thread_function(&code)?;
    let uniforms = read_uniforms(&code)?;
    let bindings = BindingTable::new(&uniforms);
    log::debug!(
        "thread {} -> [{}], {} uniform(s)",
        thread.indexing,
        thread.outputs.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        uniforms.len()
    );

    for kind in BufferKind::ALL {
        code = replace_buffer_indexer(&code, kind)?;
        code = replace_buffer_fields(&code, kind)?;
        code = replace_buffer_declaration(&code, kind, &bindings)?;
        log::trace!("after {kind} pass:\n{code}");
    }
    code = replace_scalar_declarations(&code, &bindings)?;
    code = replace_thread_output_indexer(&code, &thread)?;
    code = replace_thread_output_dimensions(&code)?;
    code = replace_thread_signature(&code)?;

    let fragment = [
        glsl::VERSION.to_string(),
        bindings.glsl_uniforms(),
        glsl::fragment_inputs().to_string(),
        glsl::output_register(&thread),
        glsl::integer_mod().to_string(),
        codec::glsl_functions(host_endian()),
        glsl::select_functions().to_string(),
        code,
        glsl::thread_main(&thread),
    ]
    .join("\n");

    Ok(Script {
        thread,
        uniforms,
        bindings,
        vertex: glsl::vertex_shader(),
        fragment,
    })
}

/// Drops everything from `//` to the end of each line.
///
/// `//` inside a string literal also starts a comment; thread programs have no
/// string literals.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| match line.find("//") {
            Some(i) => &line[..i],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Inspection ────────────────────────────────────────────────────────────

fn signature_pattern() -> Pattern {
    Pattern::new()
        .bracket_open()
        .capture(Pattern::new().codeblock())
        .bracket_close()
        .space_optional()
        .literal("thread")
        .space_optional()
        .parentheses_open()
        .capture(Pattern::new().codeblock())
        .parentheses_close()
}

/// `[...] thread ()` has no parameter block for the signature pattern to capture.
fn empty_signature_pattern() -> Pattern {
    Pattern::new()
        .bracket_open()
        .capture(Pattern::new().codeblock())
        .bracket_close()
        .space_optional()
        .literal("thread")
        .space_optional()
        .parentheses_open()
        .space_optional()
        .parentheses_close()
}

fn read_thread_function(code: &str) -> Result<ThreadFunction, ScriptError> {
    let found = signature_pattern().find_all(code)?;
    let (outputs, params) = match found.as_slice() {
        [m] => (m.captures[0].as_str(), m.captures[1].as_str()),
        [] => {
            if empty_signature_pattern().find_all(code)?.is_empty() {
                return Err(ScriptError::MissingThread);
            }
            return Err(ScriptError::InvalidParameterCount(0));
        }
        many => return Err(ScriptError::MultipleThreads(many.len())),
    };

    let outputs = outputs
        .split(',')
        .map(str::trim)
        .map(|word| {
            ElementKind::from_keyword(word).ok_or_else(|| ScriptError::InvalidOutput(word.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = params.split(',').filter(|p| !p.trim().is_empty()).count();
    let indexing = Indexing::from_rank(count).ok_or(ScriptError::InvalidParameterCount(count))?;

    Ok(ThreadFunction { indexing, outputs })
}

fn declaration_pattern() -> Pattern {
    Pattern::new()
        .literal("uniform")
        .space_mandated()
        .capture(Pattern::new().alphanumeric())
        .space_mandated()
        .capture(Pattern::new().alphanumeric())
        .space_optional()
        .semicolon()
}

fn read_uniforms(code: &str) -> Result<Vec<UniformDeclaration>, ScriptError> {
    let mut seen = HashSet::new();
    let mut uniforms = Vec::new();

    for m in declaration_pattern().find_all(code)? {
        let (ty, name) = (&m.captures[0], &m.captures[1]);
        let ty = UniformType::from_name(ty).ok_or_else(|| ScriptError::UnknownUniformType {
            name: name.clone(),
            ty: ty.clone(),
        })?;
        if !seen.insert(name.clone()) {
            return Err(ScriptError::DuplicateUniform(name.clone()));
        }
        uniforms.push(UniformDeclaration { name: name.clone(), ty });
    }

    Ok(uniforms)
}

/// Names declared with `uniform <type_name> <name>;` in the current text.
fn declared_names(code: &str, type_name: &str) -> Result<Vec<String>, ScriptError> {
    let pattern = Pattern::new()
        .literal("uniform")
        .space_mandated()
        .literal(type_name)
        .space_mandated()
        .capture(Pattern::new().alphanumeric())
        .space_optional()
        .semicolon();
    Ok(pattern.find_all(code)?.into_iter().map(|m| m.captures[0].clone()).collect())
}

// ── Buffer passes ─────────────────────────────────────────────────────────

fn indexer_pattern(name: &str, rank: usize) -> Pattern {
    let mut pattern = Pattern::new().literal(name);
    for _ in 0..rank {
        pattern = pattern
            .space_optional()
            .bracket_open()
            .capture(Pattern::new().codeblock())
            .bracket_close();
    }
    pattern
}

fn sample_expression(name: &str, kind: BufferKind, indices: &[String]) -> String {
    let prefix = format!("nc_uniform_{name}");
    let mut args = vec![format!("{prefix}_textureWidth"), format!("{prefix}_textureHeight")];
    for field in ["width", "height", "depth"].iter().take(kind.indexing().rank()) {
        args.push(format!("{prefix}_{field}"));
    }
    args.extend(indices.iter().map(|i| i.trim().to_string()));

    let sample = format!(
        "textureLod(sampler2D({prefix}_texture, nc_sampler), nc_select_{}({}), 0.0)",
        kind.indexing(),
        args.join(", ")
    );
    match kind.element() {
        ElementKind::Float => format!("nc_decode({sample})"),
        ElementKind::Color => sample,
    }
}

/// `name[i]`, `name[x][y]`, `name[x][y][z]` become texture samples.
///
/// Index expressions are copied into the replacement untouched, so passes
/// repeat until no indexing of `name` remains.
fn replace_buffer_indexer(code: &str, kind: BufferKind) -> Result<String, ScriptError> {
    let mut code = code.to_string();
    for name in declared_names(&code, kind.name())? {
        let pattern = indexer_pattern(&name, kind.indexing().rank());
        while !pattern.find_all(&code)?.is_empty() {
            code = pattern.replace_all(&code, |m| sample_expression(&name, kind, &m.captures))?;
        }
    }
    Ok(code)
}

fn replace_buffer_fields(code: &str, kind: BufferKind) -> Result<String, ScriptError> {
    let mut code = code.to_string();
    let fields = &["width", "height", "depth"][..kind.indexing().rank()];
    for name in declared_names(&code, kind.name())? {
        for field in fields {
            let pattern = Pattern::new()
                .literal(&name)
                .space_optional()
                .dot()
                .space_optional()
                .literal(field);
            code = pattern.replace_all(&code, |_| format!("nc_uniform_{name}_{field}"))?;
        }
    }
    Ok(code)
}

fn replace_declarations(
    code: &str,
    type_name: &str,
    bindings: &BindingTable,
) -> Result<String, ScriptError> {
    let pattern = Pattern::new()
        .literal("uniform")
        .space_mandated()
        .literal(type_name)
        .space_mandated()
        .capture(Pattern::new().alphanumeric())
        .space_optional()
        .semicolon();
    Ok(pattern.replace_all(code, |m| match bindings.by_name(&m.captures[0]) {
        Some(slot) => slot.glsl_declaration(),
        None => m.literal.clone(),
    })?)
}

fn replace_buffer_declaration(
    code: &str,
    kind: BufferKind,
    bindings: &BindingTable,
) -> Result<String, ScriptError> {
    replace_declarations(code, kind.name(), bindings)
}

fn replace_scalar_declarations(code: &str, bindings: &BindingTable) -> Result<String, ScriptError> {
    let code = replace_declarations(code, "int", bindings)?;
    replace_declarations(&code, "float", bindings)
}

// ── Thread passes ─────────────────────────────────────────────────────────

fn replace_thread_output_indexer(code: &str, thread: &ThreadFunction) -> Result<String, ScriptError> {
    let pattern = Pattern::new()
        .literal("thread")
        .space_optional()
        .bracket_open()
        .space_optional()
        .capture(Pattern::new().numeric())
        .space_optional()
        .bracket_close();

    let outputs = thread.outputs.len();
    let mut out_of_range = None;
    let code = pattern.replace_all(code, |m| {
        let Ok(index) = m.captures[0].parse::<usize>() else {
            return m.literal.clone();
        };
        match thread.outputs.get(index) {
            Some(ElementKind::Float) => format!("nc_thread_output_{index}.r"),
            Some(ElementKind::Color) => format!("nc_thread_output_{index}"),
            None => {
                out_of_range.get_or_insert(index);
                m.literal.clone()
            }
        }
    })?;

    match out_of_range {
        Some(index) => Err(ScriptError::OutputIndexOutOfRange { index, outputs }),
        None => Ok(code),
    }
}

fn replace_thread_output_dimensions(code: &str) -> Result<String, ScriptError> {
    let mut code = code.to_string();
    for field in ["width", "height", "depth"] {
        let pattern = Pattern::new()
            .literal("thread")
            .space_optional()
            .dot()
            .space_optional()
            .literal(field);
        code = pattern.replace_all(&code, |_| format!("nc_thread_output_{field}"))?;
    }
    Ok(code)
}

fn replace_thread_signature(code: &str) -> Result<String, ScriptError> {
    Ok(signature_pattern().replace_all(code, |m| format!("void thread({})", m.captures[1].trim()))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comments() {
        assert_eq!(strip_comments("a; // b\n// c\nd;"), "a; \n\nd;");
    }

    #[test]
    fn float_indexer_decodes() {
        let code = "uniform Float1D input;\nfloat v = input[x + 1];";
        let out = replace_buffer_indexer(code, BufferKind::Float1D).unwrap();
        assert!(out.contains(
            "nc_decode(textureLod(sampler2D(nc_uniform_input_texture, nc_sampler), \
             nc_select_1D(nc_uniform_input_textureWidth, nc_uniform_input_textureHeight, \
             nc_uniform_input_width, x + 1), 0.0))"
        ));
    }

    #[test]
    fn color_indexer_samples_raw() {
        let code = "uniform Color2D img;\nvec4 c = img [x][y];";
        let out = replace_buffer_indexer(code, BufferKind::Color2D).unwrap();
        assert!(out.contains("vec4 c = textureLod(sampler2D(nc_uniform_img_texture, nc_sampler), nc_select_2D("));
        assert!(out.contains("nc_uniform_img_height, x, y), 0.0);"));
        assert!(!out.contains("nc_decode"));
    }

    #[test]
    fn nested_indexing_of_same_buffer() {
        let code = "uniform Float1D a;\nfloat v = a[int(a[i])];";
        let out = replace_buffer_indexer(code, BufferKind::Float1D).unwrap();
        assert!(!out.contains("a["));
        assert_eq!(out.matches("nc_select_1D").count(), 2);
    }

    #[test]
    fn fields_by_rank() {
        let code = "uniform Float2D m;\nint n = m.width * m.height;";
        let out = replace_buffer_fields(code, BufferKind::Float2D).unwrap();
        assert!(out.contains("int n = nc_uniform_m_width * nc_uniform_m_height;"));
    }

    #[test]
    fn output_indexer() {
        let thread = ThreadFunction {
            indexing: Indexing::D1,
            outputs: vec![ElementKind::Float, ElementKind::Color],
        };
        let out = replace_thread_output_indexer("thread[0] = 1.0; thread[ 1 ] = c;", &thread).unwrap();
        assert_eq!(out, "nc_thread_output_0.r = 1.0; nc_thread_output_1 = c;");
    }

    #[test]
    fn output_indexer_out_of_range() {
        let thread = ThreadFunction { indexing: Indexing::D1, outputs: vec![ElementKind::Float] };
        let err = replace_thread_output_indexer("thread[2] = 1.0;", &thread).unwrap_err();
        assert_eq!(err, ScriptError::OutputIndexOutOfRange { index: 2, outputs: 1 });
    }

    #[test]
    fn output_dimensions_are_logical() {
        let out = replace_thread_output_dimensions("x < thread.width && y < thread.depth").unwrap();
        assert_eq!(out, "x < nc_thread_output_width && y < nc_thread_output_depth");
    }

    #[test]
    fn signature_becomes_void() {
        let out = replace_thread_signature("[float, color] thread (int x, int y) {").unwrap();
        assert_eq!(out, "void thread(int x, int y) {");
    }
}
