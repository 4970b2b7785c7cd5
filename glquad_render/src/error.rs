//! Everything that can go wrong between the caller and the graphics device.
//!
//! Device-level failures are detected the same way regardless of what happens to them afterwards:
//! right after each call the device's error queue is drained, and whatever was pending becomes a
//! [`DeviceError`]. What happens next is decided by the [`ErrorPolicy`] of the
//! [`Context`](crate::Context) the call went through.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use gl::types::GLenum;
use thiserror::Error;

use crate::shader::ShaderStage;

lazy_static! {
    static ref GL_ERROR_NAMES: HashMap<GLenum, &'static str> = {
        let mut names = HashMap::new();
        names.insert(gl::INVALID_ENUM, "GL_INVALID_ENUM");
        names.insert(gl::INVALID_VALUE, "GL_INVALID_VALUE");
        names.insert(gl::INVALID_OPERATION, "GL_INVALID_OPERATION");
        names.insert(gl::STACK_OVERFLOW, "GL_STACK_OVERFLOW");
        names.insert(gl::STACK_UNDERFLOW, "GL_STACK_UNDERFLOW");
        names.insert(gl::OUT_OF_MEMORY, "GL_OUT_OF_MEMORY");
        names.insert(gl::INVALID_FRAMEBUFFER_OPERATION, "GL_INVALID_FRAMEBUFFER_OPERATION");
        names
    };
}

/// Returns the symbolic name of an OpenGL error code, if it's one we know about.
pub fn gl_error_name(code: GLenum) -> Option<&'static str> {
    GL_ERROR_NAMES.get(&code).copied()
}

/// One or more error codes that were pending on the device right after a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// The call as it was written at the call site.
    pub call: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub codes: Vec<GLenum>,
}

impl DeviceError {
    /// One human-readable line per drained error code.
    pub fn diagnostics(&self) -> Vec<String> {
        self.codes
            .iter()
            .map(|&code| {
                format!(
                    "[OpenGL error] {} (0x{:04X}) from `{}` at {}:{}",
                    gl_error_name(code).unwrap_or("unknown error"),
                    code,
                    self.call,
                    self.file,
                    self.line
                )
            })
            .collect()
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self
            .codes
            .iter()
            .map(|&code| match gl_error_name(code) {
                Some(name) => name.to_string(),
                None => format!("0x{:04X}", code),
            })
            .collect::<Vec<_>>();

        write!(f, "{} from `{}` at {}:{}", names.join(", "), self.call, self.file, self.line)
    }
}

impl std::error::Error for DeviceError {}

pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

/// What kind of GPU buffer an operation was acting on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BufferKind::Vertex => f.write_str("vertex"),
            BufferKind::Index => f.write_str("index"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("device call failed: {0}")]
    Device(#[from] DeviceError),

    #[error("failed to compile {stage} shader {path}:\n{log}")]
    ShaderCompile {
        stage: ShaderStage,
        path: String,
        log: String,
    },

    #[error("failed to link shader program:\n{log}")]
    ProgramLink { log: String },

    #[error("error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("texture slot {slot} is out of range, the device has {max} texture units")]
    TextureSlot { slot: u32, max: u32 },

    #[error("refusing to create an empty {kind} buffer")]
    EmptyBuffer { kind: BufferKind },
}

impl RenderError {
    /// Lines to print for this error. Device errors get one line per drained code.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            RenderError::Device(e) => e.diagnostics(),
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// What a [`Context`](crate::Context) does with an error once it's been detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Print the diagnostic and terminate the process. Device state after an error is treated as
    /// unrecoverable.
    Fatal,
    /// Print the diagnostic and hand the error back to the caller.
    Propagate,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy::Fatal
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(ErrorPolicy::Fatal),
            "propagate" => Ok(ErrorPolicy::Propagate),
            other => Err(format!("unknown error policy `{}`", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_names_every_code() {
        let err = DeviceError {
            call: "gl::BindBuffer(target, id)",
            file: "src/device/gl.rs",
            line: 42,
            codes: vec![gl::INVALID_ENUM, 0x1234],
        };

        let lines = err.diagnostics();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("GL_INVALID_ENUM"));
        assert!(lines[0].contains("gl::BindBuffer(target, id)"));
        assert!(lines[0].contains("src/device/gl.rs:42"));
        assert!(lines[1].contains("unknown error"));
        assert_eq!(
            err.to_string(),
            "GL_INVALID_ENUM, 0x1234 from `gl::BindBuffer(target, id)` at src/device/gl.rs:42"
        );
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Fatal".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Fatal));
        assert_eq!("propagate".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Propagate));
        assert!("retry".parse::<ErrorPolicy>().is_err());
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Fatal);
    }
}
