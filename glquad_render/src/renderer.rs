use crate::buffer::IndexBuffer;
use crate::context::Context;
use crate::error::Result;
use crate::shader::Program;
use crate::vertex_array::VertexArray;

/// Frame-level state and the one draw call the layer knows how to make.
#[derive(Debug, Clone)]
pub struct Renderer {
    ctx: Context,
}

impl Renderer {
    pub fn new(ctx: &Context) -> Self {
        Self { ctx: ctx.clone() }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn set_clear_color(&self, rgba: [f32; 4]) -> Result<()> {
        self.ctx.with_device(|d| d.clear_color(rgba))
    }

    pub fn enable_depth_test(&self) -> Result<()> {
        self.ctx.with_device(|d| d.enable_depth_test())
    }

    pub fn viewport(&self, width: u32, height: u32) -> Result<()> {
        self.ctx.with_device(|d| d.viewport(0, 0, width as i32, height as i32))
    }

    /// Clears color and depth.
    pub fn clear(&self) -> Result<()> {
        self.ctx.with_device(|d| d.clear(true))
    }

    /// Binds `vertex_array`, `index_buffer` and `program`, then draws every index as a triangle
    /// list. Textures are not touched; bind them beforehand.
    pub fn draw_indexed(
        &self,
        vertex_array: &VertexArray,
        index_buffer: &IndexBuffer,
        program: &Program,
    ) -> Result<()> {
        program.bind()?;
        vertex_array.bind()?;
        index_buffer.bind()?;

        let count = index_buffer.count();
        log::trace!("drawing {} indices from vertex array {}", count, vertex_array.id().0);
        self.ctx.with_device(|d| d.draw_triangles_indexed(count))
    }
}
