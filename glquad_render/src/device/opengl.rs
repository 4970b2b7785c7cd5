use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::ptr::{null, null_mut};

use gl;
use gl::types::*;

use super::*;
use crate::error::{DeviceError, DeviceResult};

/// Runs a raw OpenGL call, then drains the error queue and turns anything pending into a
/// [`DeviceError`] that remembers the call text, file and line.
macro_rules! gl_call {
    ($device:expr, $call:expr) => {{
        #[allow(unused_unsafe)]
        let value = unsafe { $call };
        $device.check(stringify!($call), file!(), line!()).map(|_| value)
    }};
}

// glGetError can keep returning GL_CONTEXT_LOST forever; don't spin on it.
const MAX_DRAINED_ERRORS: usize = 32;

/// A [`Device`] that executes on the OpenGL context current on this thread.
///
/// The function pointers are loaded once with [`GlDevice::load`]. The device has to stay on the
/// thread that made the context current, which is why it is neither `Send` nor `Sync`.
pub struct GlDevice {
    _not_send: PhantomData<*const ()>,
}

impl GlDevice {
    /// Loads the OpenGL function pointers through `loader`, usually the windowing library's
    /// `get_proc_address`.
    pub fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        log::debug!("loaded OpenGL function pointers");

        Self { _not_send: PhantomData }
    }

    fn check(&self, call: &'static str, file: &'static str, line: u32) -> DeviceResult<()> {
        let mut codes = vec![];
        while codes.len() < MAX_DRAINED_ERRORS {
            let code = unsafe { gl::GetError() };
            if code == gl::NO_ERROR {
                break;
            }
            codes.push(code);
        }

        if codes.is_empty() {
            Ok(())
        } else {
            Err(DeviceError { call, file, line, codes })
        }
    }

    fn read_string<F>(len: GLint, read: F) -> String
    where
        F: FnOnce(GLsizei, *mut GLchar),
    {
        if len <= 0 {
            return String::new();
        }

        let mut buf = create_ws_buffer_with_len(len as usize);
        read(len, buf.as_mut_ptr() as *mut GLchar);

        // The log is NUL-terminated inside the buffer
        if let Some(end) = buf.iter().position(|&b| b == 0) {
            buf.truncate(end);
        }

        String::from_utf8_lossy(&buf).trim_end().to_string()
    }
}

fn create_ws_buffer_with_len(len: usize) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::with_capacity(len + 1);
    buf.extend([b' '].iter().cycle().take(len));
    buf
}

impl BufferTarget {
    fn gl_enum(self) -> GLenum {
        match self {
            BufferTarget::Array => gl::ARRAY_BUFFER,
            BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl ScalarType {
    fn gl_enum(self) -> GLenum {
        match self {
            ScalarType::Float => gl::FLOAT,
            ScalarType::UnsignedInt => gl::UNSIGNED_INT,
            ScalarType::UnsignedByte => gl::UNSIGNED_BYTE,
        }
    }
}

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl TextureParameter {
    fn gl_pair(self) -> (GLenum, GLint) {
        fn filter(f: Filter) -> GLint {
            match f {
                Filter::Nearest => gl::NEAREST as GLint,
                Filter::Linear => gl::LINEAR as GLint,
            }
        }

        fn wrap(w: Wrap) -> GLint {
            match w {
                Wrap::Repeat => gl::REPEAT as GLint,
                Wrap::ClampToEdge => gl::CLAMP_TO_EDGE as GLint,
            }
        }

        match self {
            TextureParameter::MinFilter(f) => (gl::TEXTURE_MIN_FILTER, filter(f)),
            TextureParameter::MagFilter(f) => (gl::TEXTURE_MAG_FILTER, filter(f)),
            TextureParameter::WrapS(w) => (gl::TEXTURE_WRAP_S, wrap(w)),
            TextureParameter::WrapT(w) => (gl::TEXTURE_WRAP_T, wrap(w)),
        }
    }
}

fn gl_bool(b: bool) -> GLboolean {
    if b {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

impl Device for GlDevice {
    fn name(&self) -> &'static str {
        "OpenGL"
    }

    fn create_buffer(&mut self) -> DeviceResult<BufferId> {
        let mut id = 0u32;
        gl_call!(self, gl::GenBuffers(1, &mut id))?;
        Ok(BufferId(id))
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> DeviceResult<()> {
        let id = buffer.map_or(0, BufferId::raw);
        gl_call!(self, gl::BindBuffer(target.gl_enum(), id))
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<()> {
        gl_call!(
            self,
            gl::BufferData(
                target.gl_enum(),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW
            )
        )
    }

    fn buffer_size(&mut self, target: BufferTarget) -> DeviceResult<usize> {
        let mut size: GLint = 0;
        gl_call!(self, gl::GetBufferParameteriv(target.gl_enum(), gl::BUFFER_SIZE, &mut size))?;
        Ok(size.max(0) as usize)
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> DeviceResult<()> {
        gl_call!(self, gl::DeleteBuffers(1, &buffer.0))
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId> {
        let mut id = 0u32;
        gl_call!(self, gl::GenVertexArrays(1, &mut id))?;
        Ok(VertexArrayId(id))
    }

    fn bind_vertex_array(&mut self, array: Option<VertexArrayId>) -> DeviceResult<()> {
        let id = array.map_or(0, VertexArrayId::raw);
        gl_call!(self, gl::BindVertexArray(id))
    }

    fn enable_vertex_attrib(&mut self, index: u32) -> DeviceResult<()> {
        gl_call!(self, gl::EnableVertexAttribArray(index))
    }

    fn vertex_attrib_pointer(&mut self, pointer: &AttribPointer) -> DeviceResult<()> {
        gl_call!(
            self,
            gl::VertexAttribPointer(
                pointer.index,
                pointer.components as GLint,
                pointer.scalar.gl_enum(),
                gl_bool(pointer.normalized),
                pointer.stride as GLsizei,
                pointer.offset as *const c_void
            )
        )
    }

    fn delete_vertex_array(&mut self, array: VertexArrayId) -> DeviceResult<()> {
        gl_call!(self, gl::DeleteVertexArrays(1, &array.0))
    }

    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderId> {
        let id = gl_call!(self, gl::CreateShader(stage.gl_enum()))?;
        Ok(ShaderId(id))
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> DeviceResult<()> {
        // Passing the length explicitly means the source doesn't need a NUL terminator
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        gl_call!(self, gl::ShaderSource(shader.0, 1, &ptr, &len))?;
        gl_call!(self, gl::CompileShader(shader.0))
    }

    fn shader_compiled(&mut self, shader: ShaderId) -> DeviceResult<bool> {
        let mut success: GLint = 1;
        gl_call!(self, gl::GetShaderiv(shader.0, gl::COMPILE_STATUS, &mut success))?;
        Ok(success != 0)
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> DeviceResult<String> {
        let mut len: GLint = 0;
        gl_call!(self, gl::GetShaderiv(shader.0, gl::INFO_LOG_LENGTH, &mut len))?;

        let log = Self::read_string(len, |len, buf| unsafe {
            gl::GetShaderInfoLog(shader.0, len, null_mut(), buf);
        });
        self.check("gl::GetShaderInfoLog(shader, len, null_mut(), buf)", file!(), line!())?;
        Ok(log)
    }

    fn delete_shader(&mut self, shader: ShaderId) -> DeviceResult<()> {
        gl_call!(self, gl::DeleteShader(shader.0))
    }

    fn create_program(&mut self) -> DeviceResult<ProgramId> {
        let id = gl_call!(self, gl::CreateProgram())?;
        Ok(ProgramId(id))
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> DeviceResult<()> {
        gl_call!(self, gl::AttachShader(program.0, shader.0))
    }

    fn link_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        gl_call!(self, gl::LinkProgram(program.0))
    }

    fn validate_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        gl_call!(self, gl::ValidateProgram(program.0))
    }

    fn program_status(&mut self, program: ProgramId, status: ProgramStatus) -> DeviceResult<bool> {
        let pname = match status {
            ProgramStatus::Link => gl::LINK_STATUS,
            ProgramStatus::Validate => gl::VALIDATE_STATUS,
        };

        let mut success: GLint = 1;
        gl_call!(self, gl::GetProgramiv(program.0, pname, &mut success))?;
        Ok(success != 0)
    }

    fn program_info_log(&mut self, program: ProgramId) -> DeviceResult<String> {
        let mut len: GLint = 0;
        gl_call!(self, gl::GetProgramiv(program.0, gl::INFO_LOG_LENGTH, &mut len))?;

        let log = Self::read_string(len, |len, buf| unsafe {
            gl::GetProgramInfoLog(program.0, len, null_mut(), buf);
        });
        self.check("gl::GetProgramInfoLog(program, len, null_mut(), buf)", file!(), line!())?;
        Ok(log)
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> DeviceResult<()> {
        let id = program.map_or(0, ProgramId::raw);
        gl_call!(self, gl::UseProgram(id))
    }

    fn delete_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        gl_call!(self, gl::DeleteProgram(program.0))
    }

    fn uniform_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> DeviceResult<UniformLocation> {
        // A name with an interior NUL can't name any uniform
        let name = match CString::new(name) {
            Ok(name) => name,
            Err(_) => return Ok(UniformLocation::ABSENT),
        };

        let location = gl_call!(self, gl::GetUniformLocation(program.0, name.as_ptr()))?;
        Ok(UniformLocation(location))
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) -> DeviceResult<()> {
        gl_call!(self, gl::Uniform1i(location.0, value))
    }

    fn uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) -> DeviceResult<()> {
        let [x, y, z, w] = value;
        gl_call!(self, gl::Uniform4f(location.0, x, y, z, w))
    }

    fn uniform_matrix_4f(
        &mut self,
        location: UniformLocation,
        columns: &[f32; 16],
    ) -> DeviceResult<()> {
        gl_call!(self, gl::UniformMatrix4fv(location.0, 1, gl::FALSE, columns.as_ptr()))
    }

    fn read_uniform_f(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        out: &mut [f32],
    ) -> DeviceResult<()> {
        // glGetUniformfv writes as many floats as the uniform's type holds, so read into a buffer
        // big enough for a mat4 and copy out what the caller asked for
        let mut values = [0f32; 16];
        gl_call!(self, gl::GetUniformfv(program.0, location.0, values.as_mut_ptr()))?;

        let n = out.len().min(values.len());
        out[..n].copy_from_slice(&values[..n]);
        Ok(())
    }

    fn read_uniform_i(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
    ) -> DeviceResult<i32> {
        let mut value: GLint = 0;
        gl_call!(self, gl::GetUniformiv(program.0, location.0, &mut value))?;
        Ok(value)
    }

    fn create_texture(&mut self) -> DeviceResult<TextureId> {
        let mut id = 0u32;
        gl_call!(self, gl::GenTextures(1, &mut id))?;
        Ok(TextureId(id))
    }

    fn active_texture(&mut self, unit: u32) -> DeviceResult<()> {
        gl_call!(self, gl::ActiveTexture(gl::TEXTURE0 + unit))
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) -> DeviceResult<()> {
        let id = texture.map_or(0, TextureId::raw);
        gl_call!(self, gl::BindTexture(gl::TEXTURE_2D, id))
    }

    fn texture_parameter(&mut self, parameter: TextureParameter) -> DeviceResult<()> {
        let (pname, value) = parameter.gl_pair();
        gl_call!(self, gl::TexParameteri(gl::TEXTURE_2D, pname, value))
    }

    fn texture_image_rgba8(&mut self, width: u32, height: u32, pixels: &[u8]) -> DeviceResult<()> {
        gl_call!(
            self,
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA8 as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                if pixels.is_empty() { null() } else { pixels.as_ptr() as *const c_void }
            )
        )
    }

    fn delete_texture(&mut self, texture: TextureId) -> DeviceResult<()> {
        gl_call!(self, gl::DeleteTextures(1, &texture.0))
    }

    fn max_texture_units(&mut self) -> DeviceResult<u32> {
        let mut units: GLint = 0;
        gl_call!(self, gl::GetIntegerv(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut units))?;
        Ok(units.max(0) as u32)
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> DeviceResult<()> {
        gl_call!(self, gl::Viewport(x, y, width, height))
    }

    fn clear_color(&mut self, rgba: [f32; 4]) -> DeviceResult<()> {
        let [r, g, b, a] = rgba;
        gl_call!(self, gl::ClearColor(r, g, b, a))
    }

    fn enable_depth_test(&mut self) -> DeviceResult<()> {
        gl_call!(self, gl::Enable(gl::DEPTH_TEST))
    }

    fn clear(&mut self, depth: bool) -> DeviceResult<()> {
        let mut mask = gl::COLOR_BUFFER_BIT;
        if depth {
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        gl_call!(self, gl::Clear(mask))
    }

    fn draw_triangles_indexed(&mut self, count: usize) -> DeviceResult<()> {
        gl_call!(
            self,
            gl::DrawElements(gl::TRIANGLES, count as GLsizei, gl::UNSIGNED_INT, null())
        )
    }
}
