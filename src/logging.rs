use std::sync::Once;

use log::LevelFilter;

/// Crates that are noisy at `info` and only worth hearing from when something goes wrong.
const QUIET_CRATES: &[&str] = &["winit", "glutin"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. "debug" or "render=trace,glquad=info".
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

/// Where the filter ended up coming from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    CommandLine(String),
    Environment(String),
    Default,
}

impl FilterSource {
    /// `--log` wins over `RUST_LOG`; without either, everything logs at `info`.
    pub fn resolve(flag: Option<String>, env: Option<String>) -> Self {
        match (flag, env) {
            (Some(filter), _) => FilterSource::CommandLine(filter),
            (None, Some(filter)) if !filter.trim().is_empty() => FilterSource::Environment(filter),
            _ => FilterSource::Default,
        }
    }

    fn apply(&self, builder: &mut env_logger::Builder) {
        match self {
            FilterSource::CommandLine(filter) | FilterSource::Environment(filter) => {
                builder.parse_filters(filter);
            }
            FilterSource::Default => {
                builder.filter_level(LevelFilter::Info);
                for name in QUIET_CRATES {
                    builder.filter_module(name, LevelFilter::Warn);
                }
            }
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call does anything.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let source = FilterSource::resolve(config.env_filter, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        source.apply(&mut builder);
        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized, filter from {:?}", source);
    });
}
