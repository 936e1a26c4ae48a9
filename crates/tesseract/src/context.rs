use std::rc::Rc;

use anyhow::Result;

use crate::buffer::{
    Buffer, Color1D, Color2D, Color3D, Float1D, Float2D, Float3D, Shape1D, Shape2D, Shape3D, TEXTURE_FORMAT,
};
use crate::device::{ContextConfig, Gpu};
use crate::error::{BufferError, ProgramError};
use crate::program::Program;
use crate::quad::Quad;

/// Resources every buffer and program holds on to.
///
/// Field order matters: the GPU objects below are dropped before `gpu`.
pub(crate) struct Shared {
    pub quad: Quad,
    pub sampler: wgpu::Sampler,
    placeholder: wgpu::Texture,
    /// Bound in place of buffer uniforms the caller did not supply.
    pub placeholder_view: wgpu::TextureView,
    pub gpu: Gpu,
}

impl Shared {
    fn new(gpu: Gpu) -> Self {
        let device = gpu.device();
        let quad = Quad::new(device);

        // Texel-exact reads: no filtering, never sample outside the texture.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tesseract nearest sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let placeholder = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tesseract placeholder texture"),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let placeholder_view = placeholder.create_view(&wgpu::TextureViewDescriptor::default());

        Self { quad, sampler, placeholder, placeholder_view, gpu }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.placeholder.destroy();
    }
}

/// Entry point: owns the device and creates buffers and programs on it.
///
/// Buffers and programs keep the device alive, so they may outlive the
/// `Context` that created them. None of these types are `Send`.
pub struct Context {
    shared: Rc<Shared>,
}

impl Context {
    /// Acquires a headless device, blocking on wgpu's async setup.
    pub fn new(config: ContextConfig) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(&config))?;
        Ok(Self { shared: Rc::new(Shared::new(gpu)) })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.shared.gpu.adapter_info()
    }

    /// Device limits; bound buffer sizes and thread output counts.
    pub fn limits(&self) -> wgpu::Limits {
        self.shared.gpu.limits()
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_float1d(&self, width: usize) -> Result<Float1D, BufferError> {
        Buffer::new(self.shared.clone(), Shape1D { width })
    }

    pub fn create_float2d(&self, width: usize, height: usize) -> Result<Float2D, BufferError> {
        Buffer::new(self.shared.clone(), Shape2D { width, height })
    }

    pub fn create_float3d(&self, width: usize, height: usize, depth: usize) -> Result<Float3D, BufferError> {
        Buffer::new(self.shared.clone(), Shape3D { width, height, depth })
    }

    pub fn create_color1d(&self, width: usize) -> Result<Color1D, BufferError> {
        Buffer::new(self.shared.clone(), Shape1D { width })
    }

    pub fn create_color2d(&self, width: usize, height: usize) -> Result<Color2D, BufferError> {
        Buffer::new(self.shared.clone(), Shape2D { width, height })
    }

    pub fn create_color3d(&self, width: usize, height: usize, depth: usize) -> Result<Color3D, BufferError> {
        Buffer::new(self.shared.clone(), Shape3D { width, height, depth })
    }

    // ── programs ──────────────────────────────────────────────────────────

    /// Compiles thread-language `source` into a runnable program.
    pub fn create_program(&self, source: &str) -> Result<Program, ProgramError> {
        Program::new(self.shared.clone(), source)
    }

    /// Blocks until all submitted programs have finished.
    pub fn finish(&self) -> Result<(), wgpu::PollError> {
        self.shared.gpu.wait_idle()
    }
}
