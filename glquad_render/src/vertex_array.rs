use crate::buffer::VertexBuffer;
use crate::context::Context;
use crate::device::{AttribPointer, BufferTarget, VertexArrayId};
use crate::error::Result;
use crate::layout::VertexLayout;

/// A vertex array object: remembers which buffers feed which attribute slots, and how.
///
/// Attached vertex buffers are owned by the array and live as long as it does.
#[derive(Debug)]
pub struct VertexArray {
    ctx: Context,
    id: VertexArrayId,
    buffers: Vec<VertexBuffer>,
}

impl VertexArray {
    pub fn create(ctx: &Context) -> Result<Self> {
        let id = ctx.with_device(|d| d.create_vertex_array())?;
        log::debug!("created vertex array {}", id.0);

        Ok(Self {
            ctx: ctx.clone(),
            id,
            buffers: vec![],
        })
    }

    pub fn id(&self) -> VertexArrayId {
        self.id
    }

    /// Binds this array and `buffer`, then points one attribute slot per layout element into the
    /// buffer. Slot `i` is the `i`-th element pushed onto `layout`.
    ///
    /// Slots are numbered from 0 for every attached buffer, so attaching a second buffer
    /// overwrites the slots the first one set up.
    pub fn attach(&mut self, buffer: VertexBuffer, layout: &VertexLayout) -> Result<()> {
        let stride = layout.stride();
        let id = self.id;
        let buffer_id = buffer.id();

        self.ctx.with_device(|d| {
            d.bind_vertex_array(Some(id))?;
            d.bind_buffer(BufferTarget::Array, Some(buffer_id))?;

            for (index, (offset, element)) in layout.iter().enumerate() {
                let index = index as u32;
                d.enable_vertex_attrib(index)?;
                d.vertex_attrib_pointer(&AttribPointer {
                    index,
                    components: element.count,
                    scalar: element.scalar,
                    normalized: element.normalized(),
                    stride,
                    offset,
                })?;
            }

            Ok(())
        })?;

        log::trace!(
            "attached buffer {} to vertex array {}: {} attributes, stride {}",
            buffer_id.0,
            id.0,
            layout.len(),
            stride
        );
        self.buffers.push(buffer);
        Ok(())
    }

    /// The vertex buffers attached so far, in attach order.
    pub fn buffers(&self) -> &[VertexBuffer] {
        &self.buffers
    }

    pub fn bind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_vertex_array(Some(self.id)))
    }

    pub fn unbind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_vertex_array(None))
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        let id = self.id;
        self.ctx.release("vertex array", |d| d.delete_vertex_array(id));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::device::HeadlessDevice;
    use crate::error::ErrorPolicy;
    use crate::layout::ScalarType;

    #[test]
    fn attach_registers_one_slot_per_element() {
        let device = Rc::new(RefCell::new(HeadlessDevice::new()));
        let ctx = Context::from_shared(device.clone(), ErrorPolicy::Propagate);

        let mut layout = VertexLayout::new();
        layout
            .push(3, ScalarType::Float)
            .push(4, ScalarType::UnsignedByte)
            .push(2, ScalarType::Float);

        assert_eq!(layout.stride(), 24);

        let vb = VertexBuffer::create(&ctx, &[0u8; 24 * 3]).unwrap();
        let vb_id = vb.id();
        let mut va = VertexArray::create(&ctx).unwrap();
        va.attach(vb, &layout).unwrap();

        let attribs = device.borrow().attributes(va.id());
        let summary = attribs
            .iter()
            .map(|(p, buffer)| (p.index, p.components, p.offset, p.stride, p.normalized, *buffer))
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![
                (0, 3, 0, 24, false, vb_id),
                (1, 4, 12, 24, true, vb_id),
                (2, 2, 16, 24, false, vb_id),
            ]
        );
        assert_eq!(va.buffers().len(), 1);
    }

    #[test]
    fn second_attach_overwrites_slot_zero() {
        let device = Rc::new(RefCell::new(HeadlessDevice::new()));
        let ctx = Context::from_shared(device.clone(), ErrorPolicy::Propagate);

        let mut va = VertexArray::create(&ctx).unwrap();
        let first = VertexBuffer::create(&ctx, &[0u8; 24]).unwrap();
        let second = VertexBuffer::create(&ctx, &[0u8; 16]).unwrap();
        let second_id = second.id();

        va.attach(first, &VertexLayout::new().with(3, ScalarType::Float)).unwrap();
        va.attach(second, &VertexLayout::new().with(2, ScalarType::Float)).unwrap();

        let attribs = device.borrow().attributes(va.id());
        assert_eq!(attribs.len(), 1);
        assert_eq!(attribs[0].0.components, 2);
        assert_eq!(attribs[0].1, second_id);
        assert_eq!(va.buffers().len(), 2);
    }

    #[test]
    fn dropping_releases_attached_buffers() {
        let device = Rc::new(RefCell::new(HeadlessDevice::new()));
        let ctx = Context::from_shared(device.clone(), ErrorPolicy::Propagate);

        let mut va = VertexArray::create(&ctx).unwrap();
        let vb = VertexBuffer::create(&ctx, &[0u8; 8]).unwrap();
        va.attach(vb, &VertexLayout::new().with(2, ScalarType::Float)).unwrap();
        drop(va);

        assert_eq!(device.borrow().live_vertex_arrays(), 0);
        assert_eq!(device.borrow().live_buffers(), 0);
    }
}
