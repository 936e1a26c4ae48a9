use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// wgpu and naga log every resource at `info`; a compute run creates
/// textures per buffer, so they are held at `warn`.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "tesseract=debug,wgpu_core=warn"). When unset, `RUST_LOG` is honoured,
/// then [`DEFAULT_FILTER`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Logs every compiler pass and the generated GLSL of each program.
    pub fn shader_trace() -> Self {
        Self {
            env_filter: Some(format!("{DEFAULT_FILTER},tesseract_script=trace,tesseract=trace")),
            ..Self::default()
        }
    }

    /// The filter `init_logging` installs, given the value of `RUST_LOG`.
    fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs an `env_logger` backend once; later calls are ignored.
///
/// Uses `try_init` so a logger installed by a host application wins.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized with `{filter}`");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig { env_filter: Some("warn".into()), ..Default::default() };
        assert_eq!(config.resolve_filter(Some("trace".into())), "warn");
    }

    #[test]
    fn rust_log_then_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.resolve_filter(Some("debug".into())), "debug");
        assert_eq!(config.resolve_filter(None), DEFAULT_FILTER);
    }

    #[test]
    fn shader_trace_keeps_gpu_internals_quiet() {
        let filter = LoggingConfig::shader_trace().resolve_filter(None);
        assert!(filter.starts_with(DEFAULT_FILTER));
        assert!(filter.contains("tesseract_script=trace"));
    }
}
