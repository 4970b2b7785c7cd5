//! Vertex and index data uploaded once to device memory.
//!
//! Both kinds are written exactly once, at creation, with static usage. There's no resizing and no
//! partial update.

use crate::context::Context;
use crate::device::{BufferId, BufferTarget};
use crate::error::{BufferKind, RenderError, Result};

/// Represents a [vertex buffer object (VBO)](vbo): raw per-vertex bytes living on the device.
/// How the bytes are split into attributes is described separately by a
/// [`VertexLayout`](crate::VertexLayout).
///
/// Unlike [`IndexBuffer`], a vertex buffer doesn't remember how big it is; ask the device with
/// [`device_size`](Self::device_size).
///
/// [vbo]: https://en.wikipedia.org/wiki/Vertex_buffer_object
#[derive(Debug)]
pub struct VertexBuffer {
    ctx: Context,
    id: BufferId,
}

impl VertexBuffer {
    /// Uploads `bytes`. Leaves the new buffer bound to the array target.
    pub fn create(ctx: &Context, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ctx.report(RenderError::EmptyBuffer { kind: BufferKind::Vertex }));
        }

        let id = ctx.with_device(|d| d.create_buffer())?;
        let buffer = Self { ctx: ctx.clone(), id };
        ctx.with_device(|d| {
            d.bind_buffer(BufferTarget::Array, Some(id))?;
            d.buffer_data(BufferTarget::Array, bytes)
        })?;

        log::debug!("created vertex buffer {} ({} bytes)", id.0, bytes.len());
        Ok(buffer)
    }

    /// Uploads a slice of plain vertex structs or scalars.
    pub fn from_slice<T: bytemuck::Pod>(ctx: &Context, data: &[T]) -> Result<Self> {
        Self::create(ctx, bytemuck::cast_slice(data))
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn bind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_buffer(BufferTarget::Array, Some(self.id)))
    }

    pub fn unbind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_buffer(BufferTarget::Array, None))
    }

    /// Size of the buffer's data store in bytes, as reported by the device. Binds the buffer.
    pub fn device_size(&self) -> Result<usize> {
        self.ctx.with_device(|d| {
            d.bind_buffer(BufferTarget::Array, Some(self.id))?;
            d.buffer_size(BufferTarget::Array)
        })
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        let id = self.id;
        self.ctx.release("vertex buffer", |d| d.delete_buffer(id));
    }
}

/// Represents an element buffer object (EBO), which is a list of vertex indices. This allows you
/// to reuse vertex data: to draw a rectangle (two triangles sharing a side) you don't need to send
/// the shared vertices twice.
///
/// Indices are always unsigned 32-bit. The element binding is part of the vertex array state, so
/// a vertex array has to be bound while binding one. Creating one doesn't need a vertex array.
#[derive(Debug)]
pub struct IndexBuffer {
    ctx: Context,
    id: BufferId,
    count: usize,
}

impl IndexBuffer {
    /// Uploads `indices`.
    ///
    /// The data goes in through the array target, which doesn't belong to any vertex array, and
    /// that target is left unbound afterwards. Bind the buffer to a vertex array to use it.
    pub fn create(ctx: &Context, indices: &[u32]) -> Result<Self> {
        if indices.is_empty() {
            return Err(ctx.report(RenderError::EmptyBuffer { kind: BufferKind::Index }));
        }

        let id = ctx.with_device(|d| d.create_buffer())?;
        let buffer = Self {
            ctx: ctx.clone(),
            id,
            count: indices.len(),
        };
        ctx.with_device(|d| {
            d.bind_buffer(BufferTarget::Array, Some(id))?;
            d.buffer_data(BufferTarget::Array, bytemuck::cast_slice(indices))?;
            d.bind_buffer(BufferTarget::Array, None)
        })?;

        log::debug!("created index buffer {} ({} indices)", id.0, indices.len());
        Ok(buffer)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The number of indices.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_buffer(BufferTarget::ElementArray, Some(self.id)))
    }

    pub fn unbind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_buffer(BufferTarget::ElementArray, None))
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        let id = self.id;
        self.ctx.release("index buffer", |d| d.delete_buffer(id));
    }
}
