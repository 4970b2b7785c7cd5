//! A small set of wrappers around the OpenGL API.
//!
//! Drawing a textured rectangle with raw OpenGL takes hundreds of lines of cryptic, unsafe function
//! calls. This crate wraps those calls in a safe interface: vertex and index buffers, a layout
//! describing how vertex bytes split into attributes, vertex arrays tying the two together, shader
//! programs, textures, and a renderer that issues the indexed draw.
//!
//! Every wrapper talks to the graphics device through a [`Context`], which carries a [`Device`]
//! and the [`ErrorPolicy`] applied when the device reports a problem. [`GlDevice`] runs on a real
//! OpenGL context; [`HeadlessDevice`] keeps the same bookkeeping in memory, which is what the tests
//! (and `glquad --headless`) run on.
//!
//! OpenGL keeps "current" bindings in global context state. Wrappers re-establish the bindings
//! they need on entry instead of relying on whatever a previous call left bound, but they don't
//! restore anything on exit.
//!
//! A knowledge of OpenGL is pretty much necessary to follow any of this. [Learn OpenGL] is a
//! classic set of tutorials on it, and [Rust and OpenGL from scratch] covers writing a safe
//! interface over the unsafe calls.
//!
//! [Learn OpenGL]: https://learnopengl.com/
//! [Rust and OpenGL from scratch]: http://nercury.github.io/rust/opengl/tutorial/2018/02/09/opengl-in-rust-from-scratch-02-opengl-context.html

#[macro_use]
extern crate lazy_static;

pub mod buffer;
pub mod context;
pub mod device;
pub mod drawable;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use crate::buffer::{IndexBuffer, VertexBuffer};
pub use crate::context::Context;
pub use crate::device::{Device, GlDevice, HeadlessDevice, UniformLocation};
pub use crate::drawable::Drawable;
pub use crate::error::{BufferKind, DeviceError, ErrorPolicy, RenderError, Result};
pub use crate::layout::{LayoutElement, ScalarType, VertexLayout};
pub use crate::renderer::Renderer;
pub use crate::shader::{Program, ShaderSource, ShaderStage, U_COLOR, U_MVP, U_TEXTURE};
pub use crate::texture::Texture;
pub use crate::vertex_array::VertexArray;
