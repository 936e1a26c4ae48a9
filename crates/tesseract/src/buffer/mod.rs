//! Typed N-dimensional buffers backed by RGBA8 textures.
//!
//! A [`Buffer`] pairs a GPU texture with a CPU [`Mirror`]. `get`/`set`/`map`
//! only touch the mirror; [`Buffer::push`] uploads it and [`Buffer::pull`]
//! reads the texture back. 1D and 3D buffers are packed into a square
//! texture (see [`pack`]); 2D buffers use their exact extents.

mod element;
mod mirror;
mod shape;

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

use tesseract_script::BufferKind;

use crate::context::Shared;
use crate::error::BufferError;

pub use element::{Color, Element};
pub use mirror::Mirror;
pub use shape::{Extents, Shape, Shape1D, Shape2D, Shape3D, pack};

pub type Float1D = Buffer<f32, Shape1D>;
pub type Float2D = Buffer<f32, Shape2D>;
pub type Float3D = Buffer<f32, Shape3D>;
pub type Color1D = Buffer<Color, Shape1D>;
pub type Color2D = Buffer<Color, Shape2D>;
pub type Color3D = Buffer<Color, Shape3D>;

pub(crate) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_TEXEL: u32 = 4;

// ── identity ──────────────────────────────────────────────────────────────

/// Process-unique buffer identity, used to detect read/write aliasing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything validation needs to know about a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    pub id: BufferId,
    pub kind: BufferKind,
    pub extents: Extents,
    pub texture_size: (u32, u32),
}

/// A borrowed buffer, bindable as a program output or uniform.
#[derive(Debug, Copy, Clone)]
pub struct BufferRef<'a> {
    pub desc: BufferDesc,
    pub(crate) view: &'a wgpu::TextureView,
}

// ── buffer ────────────────────────────────────────────────────────────────

/// A typed buffer of `E` elements with shape `S`.
///
/// The texture is allocated at construction, zero-filled, and destroyed when
/// the buffer is dropped.
pub struct Buffer<E: Element, S: Shape> {
    shared: Rc<Shared>,
    id: BufferId,
    mirror: Mirror<E, S>,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl<E: Element, S: Shape> Buffer<E, S> {
    pub(crate) fn new(shared: Rc<Shared>, shape: S) -> Result<Self, BufferError> {
        let (width, height) = shape.texture_size();
        let limit = shared.gpu.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(BufferError::TooLarge { width, height, limit });
        }

        let id = BufferId::next();
        let texture = shared.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("tesseract buffer"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut buffer = Self { shared, id, mirror: Mirror::new(shape), texture, view };
        buffer.push();
        log::debug!(
            "buffer {:?} created: {} {:?} in {width}x{height} texture",
            id,
            buffer.kind(),
            shape.extents()
        );
        Ok(buffer)
    }

    pub fn kind(&self) -> BufferKind {
        BufferKind::new(E::KIND, S::INDEXING)
    }

    pub fn shape(&self) -> &S {
        self.mirror.shape()
    }

    pub fn width(&self) -> usize {
        self.shape().extents().width as usize
    }

    pub fn height(&self) -> usize {
        self.shape().extents().height as usize
    }

    pub fn depth(&self) -> usize {
        self.shape().extents().depth as usize
    }

    pub fn len(&self) -> usize {
        self.shape().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape().is_empty()
    }

    pub fn texture_size(&self) -> (u32, u32) {
        self.shape().texture_size()
    }

    /// Logical elements of the mirror in row-major order.
    pub fn data(&self) -> &[E] {
        self.mirror.data()
    }

    pub fn get(&self, index: S::Index) -> E {
        self.mirror.get(index)
    }

    pub fn set(&mut self, index: S::Index, value: E) -> &mut Self {
        self.mirror.set(index, value);
        self
    }

    pub fn map<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(S::Index) -> E,
    {
        self.mirror.map(f);
        self
    }

    pub fn desc(&self) -> BufferDesc {
        BufferDesc {
            id: self.id,
            kind: self.kind(),
            extents: self.shape().extents(),
            texture_size: self.texture_size(),
        }
    }

    /// Borrows this buffer for [`Program::execute`](crate::Program::execute).
    pub fn binding(&self) -> BufferRef<'_> {
        BufferRef { desc: self.desc(), view: &self.view }
    }

    /// Uploads the mirror to the texture.
    pub fn push(&mut self) -> &mut Self {
        let (width, height) = self.texture_size();
        if width == 0 || height == 0 {
            return self;
        }

        self.shared.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.mirror.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * BYTES_PER_TEXEL),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        self
    }

    /// Reads the texture back into the mirror, blocking until prior GPU work
    /// on it has completed.
    pub fn pull(&mut self) -> Result<&mut Self, BufferError> {
        let (width, height) = self.texture_size();
        if width == 0 || height == 0 {
            return Ok(self);
        }

        let gpu = &self.shared.gpu;
        let unpadded_bytes_per_row = width * BYTES_PER_TEXEL;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let readback = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("tesseract readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tesseract pull encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        gpu.wait_idle().map_err(|e| BufferError::Poll(e.to_string()))?;
        receiver.recv().map_err(|_| BufferError::MapCallbackDropped)??;

        {
            let mapped = slice.get_mapped_range();
            let row = unpadded_bytes_per_row as usize;
            let bytes = self.mirror.bytes_mut();
            for (dst, src) in bytes
                .chunks_exact_mut(row)
                .zip(mapped.chunks_exact(padded_bytes_per_row as usize))
            {
                dst.copy_from_slice(&src[..row]);
            }
        }
        readback.unmap();
        readback.destroy();

        Ok(self)
    }
}

impl<E: Element, S: Shape> Drop for Buffer<E, S> {
    fn drop(&mut self) {
        self.texture.destroy();
        log::debug!("buffer {:?} released", self.id);
    }
}
