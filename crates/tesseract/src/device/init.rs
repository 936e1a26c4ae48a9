/// Initialization parameters for a [`Context`](crate::Context).
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Backends the instance may pick an adapter from.
    pub backends: wgpu::Backends,

    /// Adapter preference when several are available.
    pub power_preference: wgpu::PowerPreference,

    /// Request a software adapter (e.g. for CI without a GPU).
    pub force_fallback_adapter: bool,

    /// Limits requested from the adapter/device.
    ///
    /// Texture dimension and color attachment limits bound buffer sizes and
    /// the number of thread outputs.
    pub required_limits: wgpu::Limits,

    /// Debug label for the device.
    pub label: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_limits: wgpu::Limits::default(),
            label: Some("tesseract device".to_string()),
        }
    }
}
