//! Compiler for the **tesseract thread language**.
//!
//! A thread program is a single function body run once per output element,
//! plus typed `uniform` declarations. [`transform`] rewrites it into a GLSL
//! 450 vertex/fragment pair in which buffer reads become texture samples and
//! `float` outputs are byte-encoded into RGBA8 texels.
//!
//! This crate carries no GPU code; the `tesseract` crate compiles and runs
//! its output.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `ThreadFunction`, `UniformDeclaration`, `BufferKind` |
//! | [`bindings`] | `BindingTable`, bind group layout constants |
//! | [`codec`] | float byte codec, `host_endian` |
//! | [`error`] | `ScriptError`, `PatternError` |
//! | [`glsl`] | fixed shader fragments |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`pattern`] | `Pattern` builder |
//! | [`script`] | `transform` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use tesseract_script::{transform, ElementKind, Indexing};
//!
//! let src = r#"
//!     uniform Float1D input;
//!
//!     [float] thread (int x) {
//!         thread[0] = input[x] * 2.0;
//!     }
//! "#;
//!
//! let script = transform(src).unwrap();
//! assert_eq!(script.thread.indexing, Indexing::D1);
//! assert_eq!(script.thread.outputs, vec![ElementKind::Float]);
//! assert!(script.fragment.contains("void thread(int x)"));
//! ```

pub mod ast;
pub mod bindings;
pub mod codec;
pub mod error;
pub mod glsl;
pub mod lexer;
pub mod pattern;
pub mod script;

pub use ast::{BufferKind, ElementKind, Indexing, ThreadFunction, UniformDeclaration, UniformType};
pub use bindings::BindingTable;
pub use error::{PatternError, ScriptError};
pub use script::{Script, transform};

#[cfg(test)]
mod transform_tests {
    use super::*;

    fn ok(src: &str) -> Script { transform(src).unwrap() }
    fn err(src: &str) -> ScriptError { transform(src).unwrap_err() }

    #[test] fn float_1d() {
        let s = ok("[float] thread (int x) { thread[0] = float(x); }");
        assert_eq!(s.thread, ThreadFunction { indexing: Indexing::D1, outputs: vec![ElementKind::Float] });
    }
    #[test] fn color_color_2d() {
        let s = ok("[color, color] thread (int x, int y) { thread[0] = vec4(1.0); thread[1] = vec4(0.0); }");
        assert_eq!(s.thread.indexing, Indexing::D2);
        assert_eq!(s.thread.outputs, vec![ElementKind::Color, ElementKind::Color]);
    }
    #[test] fn three_params_is_3d() {
        assert_eq!(ok("[float] thread (int x, int y, int z) { }").thread.indexing, Indexing::D3);
    }
    #[test] fn four_params() {
        assert_eq!(err("[float] thread (int x, int y, int z, int w) { }"), ScriptError::InvalidParameterCount(4));
    }
    #[test] fn zero_params() {
        assert_eq!(err("[float] thread () { }"), ScriptError::InvalidParameterCount(0));
    }
    #[test] fn bad_output() {
        assert_eq!(err("[vec4] thread (int x) { }"), ScriptError::InvalidOutput("vec4".into()));
    }
    #[test] fn missing_thread() {
        assert_eq!(err("void main() { }"), ScriptError::MissingThread);
    }
    #[test] fn two_threads() {
        assert_eq!(err("[float] thread (int x) { }\n[float] thread (int x) { }"), ScriptError::MultipleThreads(2));
    }
    #[test] fn unknown_uniform_type() {
        assert_eq!(
            err("uniform vec4 tint;\n[color] thread (int x) { }"),
            ScriptError::UnknownUniformType { name: "tint".into(), ty: "vec4".into() }
        );
    }
    #[test] fn duplicate_uniform() {
        assert_eq!(
            err("uniform int n;\nuniform float n;\n[float] thread (int x) { }"),
            ScriptError::DuplicateUniform("n".into())
        );
    }
    #[test] fn commented_out_signature() {
        assert_eq!(err("// [float] thread (int x) { }"), ScriptError::MissingThread);
    }

    #[test]
    fn uniforms_in_declaration_order() {
        let s = ok("uniform Float2D a;\nuniform int n;\nuniform Color3D c;\n[float] thread (int x) { }");
        let names: Vec<_> = s.uniforms.iter().map(|u| (u.name.as_str(), u.ty)).collect();
        assert_eq!(
            names,
            vec![
                ("a", UniformType::Buffer(BufferKind::Float2D)),
                ("n", UniformType::Int),
                ("c", UniformType::Buffer(BufferKind::Color3D)),
            ]
        );
        assert_eq!(s.bindings.len(), 3);
    }

    #[test]
    fn identifier_exact_rewriting() {
        let s = ok("uniform Float1D in;\n[float] thread (int x) { thread[0] = index[x] + in[x]; }");
        assert!(s.fragment.contains("index[x]"));
        assert_eq!(s.fragment.matches("nc_uniform_in_texture, nc_sampler").count(), 1);
    }

    #[test]
    fn declarations_expand_into_shared_block() {
        let s = ok("uniform Float3D v;\nuniform int n;\n[float] thread (int x, int y, int z) { thread[0] = v[x][y][z] + float(n); }");
        assert!(s.fragment.contains("layout(set = 0, binding = 2) uniform texture2D nc_uniform_v_texture;"));
        assert!(s.fragment.contains("layout(set = 0, binding = 0) uniform nc_uniform_block {\n  int nc_thread_viewport_width;"));
        assert!(s.fragment.contains("  int nc_uniform_v_depth;\n  int n;\n};"));
        assert!(!s.fragment.contains("uniform Float3D"));
        assert!(!s.fragment.contains("uniform int n;"));
    }

    #[test]
    fn fragment_layout() {
        let s = ok("[float, color] thread (int x) { thread[0] = 1.0; thread[1] = vec4(1.0); }");
        let f = &s.fragment;
        let order = [
            "#version 450",
            "uniform nc_uniform_block",
            "uniform sampler nc_sampler",
            "in vec2 nc_thread_uv",
            "out vec4 nc_thread_output_1",
            "float nc_int_mod(float x, float y)",
            "float nc_decode(vec4 rgba)",
            "vec2 nc_select_3D",
            "void thread(int x)",
            "void main()",
        ];
        let positions: Vec<_> = order.iter().map(|p| f.find(p).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{f}");
        assert!(f.contains("nc_thread_output_0.r = 1.0;"));
        assert!(f.contains("nc_thread_output_0 = nc_encode(nc_thread_output_0.r);"));
    }

    #[test]
    fn vertex_passes_texcoord() {
        let s = ok("[float] thread (int x) { }");
        assert!(s.vertex.contains("nc_thread_uv = nc_thread_texcoord;"));
        assert!(s.vertex.starts_with("#version 450"));
    }
}
