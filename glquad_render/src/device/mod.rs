//! The seam between the resource wrappers and whatever actually executes graphics calls.
//!
//! Each method on [`Device`] corresponds to (at most) a couple of raw OpenGL calls. The wrappers in
//! this crate never call `gl::*` themselves; they go through a `Device`, which means the same
//! wrapper code runs on a real context ([`GlDevice`]) or on the in-memory [`HeadlessDevice`].
//!
//! Like the OpenGL state it stands for, a device is bound to the thread that owns the context.
//! Nothing here is `Send`, and nothing should be made `Send`: handles are only meaningful on the
//! context that created them.

mod headless;
mod opengl;

pub use self::opengl::GlDevice;
pub use self::headless::{DrawCall, HeadlessDevice, TextureImage, UniformValue};

use crate::error::DeviceResult;
use crate::layout::ScalarType;
use crate::shader::ShaderStage;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A buffer object living in device memory.
    BufferId
);
handle!(
    /// A vertex array object.
    VertexArrayId
);
handle!(ShaderId);
handle!(ProgramId);
handle!(TextureId);

/// The two buffer binding points the layer uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`
    ElementArray,
}

/// A uniform's location within a program.
///
/// `-1` is a legitimate answer from the device: the uniform doesn't exist (or was optimized out).
/// Writes to an absent location are accepted and do nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    pub const ABSENT: UniformLocation = UniformLocation(-1);

    pub fn is_absent(self) -> bool {
        self.0 < 0
    }
}

/// Everything `glVertexAttribPointer` needs to know about one attribute slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttribPointer {
    pub index: u32,
    pub components: u32,
    pub scalar: ScalarType,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

/// Which status flag of a program to query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramStatus {
    Link,
    Validate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Parameters of the currently bound 2D texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureParameter {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapS(Wrap),
    WrapT(Wrap),
}

/// A graphics device and its context-global binding state.
///
/// Every method reports failure by draining the device's error queue after the call; a non-empty
/// queue comes back as a [`DeviceError`](crate::DeviceError).
pub trait Device {
    /// Short name for log messages.
    fn name(&self) -> &'static str;

    fn create_buffer(&mut self) -> DeviceResult<BufferId>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> DeviceResult<()>;
    /// Uploads `data` with static usage into the buffer bound at `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<()>;
    /// The size in bytes of the buffer bound at `target`, as the device sees it.
    fn buffer_size(&mut self, target: BufferTarget) -> DeviceResult<usize>;
    fn delete_buffer(&mut self, buffer: BufferId) -> DeviceResult<()>;

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId>;
    fn bind_vertex_array(&mut self, array: Option<VertexArrayId>) -> DeviceResult<()>;
    fn enable_vertex_attrib(&mut self, index: u32) -> DeviceResult<()>;
    fn vertex_attrib_pointer(&mut self, pointer: &AttribPointer) -> DeviceResult<()>;
    fn delete_vertex_array(&mut self, array: VertexArrayId) -> DeviceResult<()>;

    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderId>;
    /// Hands `source` to the shader and compiles it. Compilation *failure* is not a device
    /// error; ask [`Device::shader_compiled`].
    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> DeviceResult<()>;
    fn shader_compiled(&mut self, shader: ShaderId) -> DeviceResult<bool>;
    fn shader_info_log(&mut self, shader: ShaderId) -> DeviceResult<String>;
    fn delete_shader(&mut self, shader: ShaderId) -> DeviceResult<()>;

    fn create_program(&mut self) -> DeviceResult<ProgramId>;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> DeviceResult<()>;
    fn link_program(&mut self, program: ProgramId) -> DeviceResult<()>;
    fn validate_program(&mut self, program: ProgramId) -> DeviceResult<()>;
    fn program_status(&mut self, program: ProgramId, status: ProgramStatus) -> DeviceResult<bool>;
    fn program_info_log(&mut self, program: ProgramId) -> DeviceResult<String>;
    fn use_program(&mut self, program: Option<ProgramId>) -> DeviceResult<()>;
    fn delete_program(&mut self, program: ProgramId) -> DeviceResult<()>;

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> DeviceResult<UniformLocation>;
    /// Writes go to the program currently in use.
    fn uniform_1i(&mut self, location: UniformLocation, value: i32) -> DeviceResult<()>;
    fn uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) -> DeviceResult<()>;
    /// `columns` is column-major and is uploaded without transposing.
    fn uniform_matrix_4f(
        &mut self,
        location: UniformLocation,
        columns: &[f32; 16],
    ) -> DeviceResult<()>;
    fn read_uniform_f(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        out: &mut [f32],
    ) -> DeviceResult<()>;
    fn read_uniform_i(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
    ) -> DeviceResult<i32>;

    fn create_texture(&mut self) -> DeviceResult<TextureId>;
    /// Makes texture unit `unit` (0-based) active.
    fn active_texture(&mut self, unit: u32) -> DeviceResult<()>;
    /// Binds a 2D texture on the active unit.
    fn bind_texture(&mut self, texture: Option<TextureId>) -> DeviceResult<()>;
    fn texture_parameter(&mut self, parameter: TextureParameter) -> DeviceResult<()>;
    /// Uploads tightly packed RGBA8 rows, bottom row first, into the bound 2D texture.
    fn texture_image_rgba8(&mut self, width: u32, height: u32, pixels: &[u8]) -> DeviceResult<()>;
    fn delete_texture(&mut self, texture: TextureId) -> DeviceResult<()>;
    fn max_texture_units(&mut self) -> DeviceResult<u32>;

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> DeviceResult<()>;
    fn clear_color(&mut self, rgba: [f32; 4]) -> DeviceResult<()>;
    fn enable_depth_test(&mut self) -> DeviceResult<()>;
    /// Clears the color buffer, and the depth buffer too if `depth` is set.
    fn clear(&mut self, depth: bool) -> DeviceResult<()>;
    /// Draws `count` unsigned 32-bit indices from the bound element buffer as a triangle list.
    fn draw_triangles_indexed(&mut self, count: usize) -> DeviceResult<()>;
}
