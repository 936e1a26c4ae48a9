use std::fmt;

use tesseract_script::ElementKind;

/// An RGBA8 texel.
pub type Color = [u8; 4];

/// Types storable one-per-texel in an RGBA8 texture.
///
/// The in-memory bytes of an element are exactly the texel bytes: `f32` is
/// stored as its native byte pattern and decoded on the GPU.
pub trait Element: bytemuck::Pod + PartialEq + fmt::Debug {
    const KIND: ElementKind;
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float;
}

impl Element for Color {
    const KIND: ElementKind = ElementKind::Color;
}
