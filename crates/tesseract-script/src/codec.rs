//! Float <-> RGBA8 byte codec emitted into fragment shaders.
//!
//! Float buffers are stored as the host's native `f32` bytes in an RGBA8
//! texture. Shaders only see those bytes as `0..=1` normalized channels, so
//! `nc_decode` rebuilds the float from sign, exponent and mantissa bytes and
//! `nc_encode` produces the same four bytes from a float. The CPU never runs
//! this codec.

use std::sync::OnceLock;

/// Byte order of the host's native 32-bit types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Host byte order, detected once on first use.
pub fn host_endian() -> Endian {
    static HOST: OnceLock<Endian> = OnceLock::new();
    *HOST.get_or_init(|| {
        let endian = if 0xdead_beef_u32.to_ne_bytes()[0] == 0xef {
            Endian::Little
        } else {
            Endian::Big
        };
        log::debug!("host endianness: {endian:?}");
        endian
    })
}

/// GLSL source for `nc_decode` / `nc_encode`.
///
/// Requires `nc_int_mod` to be declared first.
pub fn glsl_functions(endian: Endian) -> String {
    // On big-endian hosts byte 0 of an f32 holds the sign and exponent.
    let swap = match endian {
        Endian::Little => "",
        Endian::Big => "  bytes = bytes.abgr;\n",
    };

    format!(
        "\
const vec2 NC_MAGIC_VEC        = vec2(1.0, -256.0);
const vec4 NC_SCALE_FACTOR     = vec4(1.0, 256.0, 65536.0, 0.0);
const vec4 NC_SCALE_FACTOR_INV = vec4(1.0, 0.00390625, 0.0000152587890625, 0.0);
const float NC_MANTISSA_SCALE  = 8388608.0;
const float NC_MANTISSA_ULP    = 0.00000011920928955078125;

float nc_decode(vec4 rgba) {{
  vec4 bytes = rgba;
{swap}  bytes = floor(bytes * 255.0 + 0.5);
  vec2 gte128 = vec2(bytes.b >= 128.0 ? 1.0 : 0.0, bytes.a >= 128.0 ? 1.0 : 0.0);
  float exponent = 2.0 * bytes.a - 127.0 + dot(gte128, NC_MAGIC_VEC);
  if (exponent <= -127.0) {{
    return 0.0;
  }}
  bytes.b = bytes.b - 128.0 * gte128.x;
  float mantissa = dot(bytes, NC_SCALE_FACTOR) * NC_MANTISSA_ULP + 1.0;
  return mantissa * exp2(exponent) * (gte128.y * -2.0 + 1.0);
}}

vec4 nc_encode(float f) {{
  float F = abs(f);
  if (F == 0.0) {{
    return vec4(0.0);
  }}
  float negative = f < 0.0 ? 1.0 : 0.0;
  float exponent = floor(log2(F));
  // Two half steps keep every intermediate a normal float.
  float half_exponent = floor(exponent * 0.5);
  float mantissa = F * exp2(-half_exponent) * exp2(half_exponent - exponent);
  if (mantissa >= 2.0) {{
    exponent += 1.0;
    mantissa *= 0.5;
  }}
  if (mantissa < 1.0) {{
    exponent -= 1.0;
    mantissa *= 2.0;
  }}
  if (exponent < -126.0) {{
    return vec4(0.0);
  }}
  vec4 bytes = vec4((mantissa - 1.0) * NC_MANTISSA_SCALE) * NC_SCALE_FACTOR_INV;
  bytes.r = nc_int_mod(bytes.r, 256.0);
  bytes.g = nc_int_mod(bytes.g, 256.0);
  bytes.b = nc_int_mod(bytes.b, 128.0);
  bytes.a = floor(exponent * 0.5 + 63.5);
  bytes.b += nc_int_mod(exponent + 127.0, 2.0) * 128.0;
  bytes.a += negative * 128.0;
  bytes = floor(bytes) / 255.0;
{swap}  return bytes;
}}
"
    )
}
