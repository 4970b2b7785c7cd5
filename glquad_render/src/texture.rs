use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::device::{Filter, TextureId, TextureParameter, Wrap};
use crate::error::{RenderError, Result};

/// "Texture" is the OpenGL term for an image passed to the graphics pipeline. In the fragment
/// shader a texture can be sampled and its pixel data applied to the fragments.
///
/// Textures are immutable 2D RGBA8 images with linear filtering and clamp-to-edge wrapping. The
/// decoded pixels only live long enough to be uploaded; the texture keeps nothing but its size.
#[derive(Debug)]
pub struct Texture {
    ctx: Context,
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Reads and decodes an image file, see [`create`](Self::create).
    pub fn from_file<P: AsRef<Path>>(ctx: &Context, path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| {
            ctx.report(RenderError::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;

        log::debug!("read {} bytes of image data from {}", bytes.len(), path.display());
        Self::create(ctx, &bytes)
    }

    /// Decodes a compressed image (any format the `image` crate reads) and uploads it.
    ///
    /// Rows are flipped on the way so that row 0 on the device is the bottom of the image, which
    /// is where OpenGL expects texture coordinate `v = 0` to be. Malformed image bytes are a
    /// [`RenderError::ImageDecode`], never a device error.
    pub fn create(ctx: &Context, image_bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(image_bytes).map_err(|e| ctx.report(e.into()))?;
        let pixels = decoded.flipv().into_rgba8();
        let (width, height) = pixels.dimensions();

        let id = ctx.with_device(|d| d.create_texture())?;
        let texture = Self {
            ctx: ctx.clone(),
            id,
            width,
            height,
        };

        ctx.with_device(|d| {
            d.bind_texture(Some(id))?;
            d.texture_parameter(TextureParameter::MinFilter(Filter::Linear))?;
            d.texture_parameter(TextureParameter::MagFilter(Filter::Linear))?;
            d.texture_parameter(TextureParameter::WrapS(Wrap::ClampToEdge))?;
            d.texture_parameter(TextureParameter::WrapT(Wrap::ClampToEdge))?;
            d.texture_image_rgba8(width, height, pixels.as_raw())?;
            d.bind_texture(None)
        })?;

        // The device has its own copy now
        drop(pixels);

        log::debug!("created texture {} ({}x{})", id.0, width, height);
        Ok(texture)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        Self::BYTES_PER_PIXEL
    }

    /// Activates texture unit `slot` and binds this texture to it.
    ///
    /// Slots run from 0 up to the device's number of texture units; anything past that is a
    /// [`RenderError::TextureSlot`].
    pub fn bind(&self, slot: u32) -> Result<()> {
        let max = self.ctx.max_texture_units()?;
        if slot >= max {
            return Err(self.ctx.report(RenderError::TextureSlot { slot, max }));
        }

        let id = self.id;
        self.ctx.with_device(|d| {
            d.active_texture(slot)?;
            d.bind_texture(Some(id))
        })
    }

    /// Clears the 2D texture binding of the active unit.
    pub fn unbind(&self) -> Result<()> {
        self.ctx.with_device(|d| d.bind_texture(None))
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        let id = self.id;
        self.ctx.release("texture", |d| d.delete_texture(id));
    }
}
