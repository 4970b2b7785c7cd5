use std::rc::Rc;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::context::Context;
use crate::error::Result;
use crate::layout::VertexLayout;
use crate::renderer::Renderer;
use crate::shader::Program;
use crate::texture::Texture;
use crate::vertex_array::VertexArray;

/// Geometry ready to be drawn: a vertex array with its buffers, the indices into it, the program
/// to draw it with (shared with other drawables) and optionally a texture.
///
/// Dropping a drawable deletes everything it owns. The program is only deleted once the last
/// drawable sharing it is gone.
#[derive(Debug)]
pub struct Drawable {
    vertex_array: VertexArray,
    index_buffer: IndexBuffer,
    program: Rc<Program>,
    texture: Option<Texture>,
}

impl Drawable {
    /// Uploads `vertices`, described by `layout`, and `indices`.
    pub fn new<T: bytemuck::Pod>(
        ctx: &Context,
        vertices: &[T],
        layout: &VertexLayout,
        indices: &[u32],
        program: Rc<Program>,
    ) -> Result<Self> {
        let mut vertex_array = VertexArray::create(ctx)?;
        vertex_array.attach(VertexBuffer::from_slice(ctx, vertices)?, layout)?;

        let index_buffer = IndexBuffer::create(ctx, indices)?;

        // Records the element binding in the vertex array
        vertex_array.bind()?;
        index_buffer.bind()?;
        vertex_array.unbind()?;

        Ok(Self {
            vertex_array,
            index_buffer,
            program,
            texture: None,
        })
    }

    /// Gives the drawable a texture, sampled from unit 0.
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }

    /// Binds the texture (if any) to unit 0 and draws.
    pub fn draw(&self, renderer: &Renderer) -> Result<()> {
        if let Some(texture) = &self.texture {
            texture.bind(0)?;
        }

        renderer.draw_indexed(&self.vertex_array, &self.index_buffer, &self.program)
    }
}
