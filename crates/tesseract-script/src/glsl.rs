//! Fixed GLSL fragments around the user's thread body.

use crate::ast::{ElementKind, Indexing, ThreadFunction};

pub const VERSION: &str = "#version 450\n";

/// Vertex attribute location of the quad position.
pub const POSITION_LOCATION: u32 = 0;
/// Vertex attribute location of the quad texture coordinate.
pub const TEXCOORD_LOCATION: u32 = 1;

/// Passes the quad texture coordinate through to `nc_thread_uv`.
pub fn vertex_shader() -> String {
    format!(
        "\
{VERSION}
layout(location = {POSITION_LOCATION}) in vec3 nc_thread_position;
layout(location = {TEXCOORD_LOCATION}) in vec2 nc_thread_texcoord;
layout(location = 0) out vec2 nc_thread_uv;

void main() {{
  nc_thread_uv = nc_thread_texcoord;
  gl_Position = vec4(nc_thread_position.x, nc_thread_position.y, nc_thread_position.z, 1.0);
}}
"
    )
}

pub fn fragment_inputs() -> &'static str {
    "layout(location = 0) in vec2 nc_thread_uv;\n"
}

/// One `vec4` output per declared thread output.
pub fn output_register(thread: &ThreadFunction) -> String {
    (0..thread.outputs.len())
        .map(|i| format!("layout(location = {i}) out vec4 nc_thread_output_{i};\n"))
        .collect()
}

/// Floored modulo that snaps results within one of `y` back to zero.
///
/// GLSL `mod` on floats can land a hair below `y` after rounding; the codec
/// needs exact integer remainders. The `int` overload stays in integers so
/// texel indices past 2^24 are exact; its operands are never negative.
pub fn integer_mod() -> &'static str {
    "\
vec2 nc_int_mod(vec2 x, float y) {
  vec2 res = floor(mod(x, vec2(y)));
  return res * step(vec2(1.0 - floor(y)), -res);
}
vec3 nc_int_mod(vec3 x, float y) {
  vec3 res = floor(mod(x, vec3(y)));
  return res * step(vec3(1.0 - floor(y)), -res);
}
vec4 nc_int_mod(vec4 x, vec4 y) {
  vec4 res = floor(mod(x, y));
  return res * step(1.0 - floor(y), -res);
}
float nc_int_mod(float x, float y) {
  float res = floor(mod(x, y));
  return res * (res > floor(y) - 1.0 ? 0.0 : 1.0);
}
int nc_int_mod(int x, int y) {
  return x - (x / y) * y;
}
"
}

/// Texel-center coordinates for a logical index, per indexing mode.
pub fn select_functions() -> &'static str {
    "\
vec2 nc_select_1D(int textureWidth, int textureHeight, int width, int index_x) {
  float x = float(nc_int_mod(index_x, textureWidth)) + 0.5;
  float y = float(index_x / textureWidth) + 0.5;
  return vec2(x / float(textureWidth), y / float(textureHeight));
}

vec2 nc_select_2D(int textureWidth, int textureHeight, int width, int height, int index_x, int index_y) {
  float x = (float(index_x) + 0.5) / float(textureWidth);
  float y = (float(index_y) + 0.5) / float(textureHeight);
  return vec2(x, y);
}

vec2 nc_select_3D(int textureWidth, int textureHeight, int width, int height, int depth, int index_x, int index_y, int index_z) {
  int i = index_x + (index_y * width) + (index_z * (width * height));
  float x = float(nc_int_mod(i, textureWidth)) + 0.5;
  float y = float(i / textureWidth) + 0.5;
  return vec2(x / float(textureWidth), y / float(textureHeight));
}
"
}

/// Entry point: recovers the logical index from the texel, runs `thread`
/// and encodes every `float` output.
pub fn thread_main(thread: &ThreadFunction) -> String {
    let mut out = String::from("void main() {\n");
    out.push_str("  int x = int(nc_thread_uv.x * float(nc_thread_viewport_width));\n");
    out.push_str("  int y = int(nc_thread_uv.y * float(nc_thread_viewport_height));\n");

    match thread.indexing {
        Indexing::D1 => {
            out.push_str("  thread(x + y * nc_thread_viewport_width);\n");
        }
        Indexing::D2 => {
            out.push_str("  thread(x, y);\n");
        }
        Indexing::D3 => {
            out.push_str("  int i = x + y * nc_thread_viewport_width;\n");
            out.push_str("  int ix = nc_int_mod(i, nc_thread_output_width);\n");
            out.push_str("  int iy = nc_int_mod(i / nc_thread_output_width, nc_thread_output_height);\n");
            out.push_str(
                "  int iz = nc_int_mod(i / (nc_thread_output_width * nc_thread_output_height), nc_thread_output_depth);\n",
            );
            out.push_str("  thread(ix, iy, iz);\n");
        }
    }

    for (i, output) in thread.outputs.iter().enumerate() {
        if *output == ElementKind::Float {
            out.push_str(&format!("  nc_thread_output_{i} = nc_encode(nc_thread_output_{i}.r);\n"));
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_encodes_float_outputs_only() {
        let thread = ThreadFunction {
            indexing: Indexing::D2,
            outputs: vec![ElementKind::Float, ElementKind::Color, ElementKind::Float],
        };
        let main = thread_main(&thread);
        assert!(main.contains("thread(x, y);"));
        assert!(main.contains("nc_thread_output_0 = nc_encode(nc_thread_output_0.r);"));
        assert!(!main.contains("nc_thread_output_1 = nc_encode"));
        assert!(main.contains("nc_thread_output_2 = nc_encode(nc_thread_output_2.r);"));
    }

    #[test]
    fn main_recovers_3d_index_from_logical_extents() {
        let thread = ThreadFunction { indexing: Indexing::D3, outputs: vec![ElementKind::Color] };
        let main = thread_main(&thread);
        assert!(main.contains("thread(ix, iy, iz);"));
        assert!(main.contains("nc_thread_output_width * nc_thread_output_height"));
    }

    #[test]
    fn integer_index_modulo_stays_integral() {
        let helpers = integer_mod();
        let int_overload = &helpers[helpers.find("int nc_int_mod(int x, int y)").unwrap()..];
        assert!(int_overload.contains("return x - (x / y) * y;"));
        assert!(!int_overload.contains("float("));
    }

    #[test]
    fn output_register_locations() {
        let thread = ThreadFunction {
            indexing: Indexing::D1,
            outputs: vec![ElementKind::Float, ElementKind::Color],
        };
        assert_eq!(
            output_register(&thread),
            "layout(location = 0) out vec4 nc_thread_output_0;\n\
             layout(location = 1) out vec4 nc_thread_output_1;\n"
        );
    }
}
