//! Headless GPU device management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue without a surface; every
//! render target is an offscreen buffer texture.

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::ContextConfig;
