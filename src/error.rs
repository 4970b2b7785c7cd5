use render::RenderError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not create an OpenGL window: {0}")]
    Window(#[from] glutin::CreationError),

    #[error("OpenGL context error: {0}")]
    Context(#[from] glutin::ContextError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    /// Rendering errors are logged by the context that reports them, so only the rest are logged
    /// here.
    pub fn log(&self) {
        if !self.is_logged() {
            log::error!("{}", self);
        }
    }

    pub fn is_logged(&self) -> bool {
        matches!(self, AppError::Render(_))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::config::Config;

    #[test]
    fn only_render_errors_count_as_logged() {
        let render = AppError::from(RenderError::Io {
            path: PathBuf::from("missing.vert"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert!(render.is_logged());

        let config = match Config::parse(vec!["glquad", "--width", "0"]) {
            Err(e) => AppError::from(e),
            Ok(_) => panic!("zero width accepted"),
        };
        assert!(!config.is_logged());
    }
}
