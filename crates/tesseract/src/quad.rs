//! Full-screen quad shared by every program.

use bytemuck::{Pod, Zeroable};
use tesseract_script::glsl::{POSITION_LOCATION, TEXCOORD_LOCATION};
use wgpu::util::DeviceExt;

// ── vertex types ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Position {
    pub pos: [f32; 3],
}

impl Position {
    const ATTRS: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![POSITION_LOCATION => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Position>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Texcoord {
    pub uv: [f32; 2],
}

impl Texcoord {
    const ATTRS: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![TEXCOORD_LOCATION => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Texcoord>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const POSITIONS: [Position; 4] = [
    Position { pos: [-1.0, -1.0, 0.0] },
    Position { pos: [-1.0, 1.0, 0.0] },
    Position { pos: [1.0, 1.0, 0.0] },
    Position { pos: [1.0, -1.0, 0.0] },
];

// Framebuffer rows run top-down, so v = 0 sits at clip-space y = +1 and
// row r of a target samples row r of a texture.
const TEXCOORDS: [Texcoord; 4] = [
    Texcoord { uv: [0.0, 1.0] },
    Texcoord { uv: [0.0, 0.0] },
    Texcoord { uv: [1.0, 0.0] },
    Texcoord { uv: [1.0, 1.0] },
];

const INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

pub(crate) const INDEX_COUNT: u32 = INDICES.len() as u32;

// ── quad ──────────────────────────────────────────────────────────────────

/// Two triangles covering clip space, with positions and texture
/// coordinates in separate vertex buffers (slots 0 and 1).
pub(crate) struct Quad {
    pub positions: wgpu::Buffer,
    pub texcoords: wgpu::Buffer,
    pub indices: wgpu::Buffer,
}

impl Quad {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tesseract quad positions"),
            contents: bytemuck::cast_slice(&POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tesseract quad texcoords"),
            contents: bytemuck::cast_slice(&TEXCOORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tesseract quad indices"),
            contents: bytemuck::cast_slice(&INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::debug!("quad geometry created");
        Self { positions, texcoords, indices }
    }
}

impl Drop for Quad {
    fn drop(&mut self) {
        self.positions.destroy();
        self.texcoords.destroy();
        self.indices.destroy();
        log::debug!("quad geometry released");
    }
}
