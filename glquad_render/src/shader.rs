//! Shader programs built from a vertex and a fragment stage, and the uniforms they expose.
//!
//! Creating a [`Program`] walks the stages through compile, link and validate. Any failure along
//! the way deletes what was created so far and reports the error through the [`Context`]; there is
//! no half-built program to hold on to. A `Program` value is therefore always a linked program.

use std::fmt;
use std::fs;
use std::path::Path;

use glam::Mat4;

use crate::context::Context;
use crate::device::{ProgramId, ProgramStatus, ShaderId, UniformLocation};
use crate::error::{RenderError, Result};

/// Name of the `vec4` tint uniform of the demo shaders.
pub const U_COLOR: &str = "u_Color";
/// Name of the `mat4` model-view-projection uniform of the demo shaders.
pub const U_MVP: &str = "u_MVP";
/// Name of the `sampler2D` texture unit uniform of the demo shaders.
pub const U_TEXTURE: &str = "u_Texture";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The text of one shader stage and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Shown in diagnostics. Sources that weren't read from disk get a descriptive name instead.
    pub path: String,
    pub text: String,
}

impl ShaderSource {
    pub fn new<P: Into<String>, T: Into<String>>(path: P, text: T) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Reads a whole shader source file.
///
/// A missing or unreadable file is an error here, before anything is handed to the compiler.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<ShaderSource> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("read {} bytes of shader source from {}", text.len(), path.display());
    Ok(ShaderSource::new(path.display().to_string(), text))
}

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
    ctx: Context,
    id: ProgramId,
}

impl Program {
    /// Reads both stages from disk and builds a program from them.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        ctx: &Context,
        vertex: P,
        fragment: Q,
    ) -> Result<Self> {
        let vertex = read_source(vertex).map_err(|e| ctx.report(e))?;
        let fragment = read_source(fragment).map_err(|e| ctx.report(e))?;
        Self::create(ctx, &vertex, &fragment)
    }

    /// Compiles both stages, then links them into a program and validates it.
    pub fn create(ctx: &Context, vertex: &ShaderSource, fragment: &ShaderSource) -> Result<Self> {
        let vs = compile(ctx, ShaderStage::Vertex, vertex)?;
        let fs = match compile(ctx, ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                ctx.release("vertex shader", |d| d.delete_shader(vs));
                return Err(e);
            }
        };

        let linked = link(ctx, vs, fs);

        // The program holds on to everything it needs once linked
        ctx.release("vertex shader", |d| d.delete_shader(vs));
        ctx.release("fragment shader", |d| d.delete_shader(fs));

        let id = linked?;
        log::debug!("linked program {} from {} and {}", id.0, vertex.path, fragment.path);
        Ok(Self { ctx: ctx.clone(), id })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Makes this the current program.
    pub fn bind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.use_program(Some(self.id)))
    }

    /// Clears the current program.
    pub fn unbind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.use_program(None))
    }

    /// Looks the uniform up on the device. Not cached: every call asks again.
    ///
    /// A uniform that doesn't exist (or that the compiler optimized away) isn't an error; the
    /// returned location is [absent](UniformLocation::is_absent) and writes to it do nothing.
    pub fn uniform_location(&self, name: &str) -> Result<UniformLocation> {
        let location = self.ctx.with_device(|d| d.uniform_location(self.id, name))?;
        if location.is_absent() {
            log::info!("uniform `{}` not found in program {}", name, self.id.0);
        }

        Ok(location)
    }

    // Uniform writes go to the current program, so each setter binds this one first. That leaves
    // it current afterwards.

    pub fn set_uniform_1i(&self, name: &str, value: i32) -> Result<()> {
        let location = self.uniform_location(name)?;
        self.bind()?;
        self.ctx.with_device(|d| d.uniform_1i(location, value))
    }

    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) -> Result<()> {
        let location = self.uniform_location(name)?;
        self.bind()?;
        self.ctx.with_device(|d| d.uniform_4f(location, value))
    }

    /// Uploads `matrix` column-major, as glam stores it, without transposing.
    pub fn set_uniform_mat4(&self, name: &str, matrix: &Mat4) -> Result<()> {
        let location = self.uniform_location(name)?;
        self.bind()?;
        let columns = matrix.to_cols_array();
        self.ctx.with_device(|d| d.uniform_matrix_4f(location, &columns))
    }

    pub fn read_uniform_1i(&self, name: &str) -> Result<i32> {
        let location = self.uniform_location(name)?;
        self.ctx.with_device(|d| d.read_uniform_i(self.id, location))
    }

    pub fn read_uniform_4f(&self, name: &str) -> Result<[f32; 4]> {
        let location = self.uniform_location(name)?;
        let mut value = [0f32; 4];
        self.ctx.with_device(|d| d.read_uniform_f(self.id, location, &mut value))?;
        Ok(value)
    }

    /// Reads a `mat4` uniform back from the device.
    pub fn read_uniform_mat4(&self, name: &str) -> Result<Mat4> {
        let location = self.uniform_location(name)?;
        let mut columns = [0f32; 16];
        self.ctx.with_device(|d| d.read_uniform_f(self.id, location, &mut columns))?;
        Ok(Mat4::from_cols_array(&columns))
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        let id = self.id;
        self.ctx.release("program", |d| d.delete_program(id));
    }
}

fn compile(ctx: &Context, stage: ShaderStage, source: &ShaderSource) -> Result<ShaderId> {
    let id = ctx.with_device(|d| d.create_shader(stage))?;

    let compiled = ctx.with_device(|d| {
        d.compile_shader(id, &source.text)?;
        d.shader_compiled(id)
    });

    match compiled {
        Ok(true) => {
            log::trace!("compiled {} shader {}", stage, source.path);
            Ok(id)
        }
        Ok(false) => {
            let log = ctx.with_device(|d| d.shader_info_log(id)).unwrap_or_default();
            ctx.release("shader", |d| d.delete_shader(id));
            Err(ctx.report(RenderError::ShaderCompile {
                stage,
                path: source.path.clone(),
                log,
            }))
        }
        Err(e) => {
            ctx.release("shader", |d| d.delete_shader(id));
            Err(e)
        }
    }
}

fn link(ctx: &Context, vs: ShaderId, fs: ShaderId) -> Result<ProgramId> {
    let id = ctx.with_device(|d| d.create_program())?;

    let result = (|| {
        let linked = ctx.with_device(|d| {
            d.attach_shader(id, vs)?;
            d.attach_shader(id, fs)?;
            d.link_program(id)?;
            d.program_status(id, ProgramStatus::Link)
        })?;

        if !linked {
            let log = ctx.with_device(|d| d.program_info_log(id))?;
            return Err(ctx.report(RenderError::ProgramLink { log }));
        }

        let valid = ctx.with_device(|d| {
            d.validate_program(id)?;
            d.program_status(id, ProgramStatus::Validate)
        })?;

        // Validation depends on whatever state is bound right now, so a failure here is only
        // worth a warning
        if !valid {
            let log = ctx.with_device(|d| d.program_info_log(id))?;
            log::warn!("program {} failed validation: {}", id.0, log);
        }

        Ok(id)
    })();

    if result.is_err() {
        ctx.release("program", |d| d.delete_program(id));
    }

    result
}
