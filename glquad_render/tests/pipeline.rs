use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};

use render::device::UniformValue;
use render::*;

const VERTEX: &str = "
#version 330 core
layout(location = 0) in vec4 position;
layout(location = 1) in vec2 texCoord;
out vec2 v_TexCoord;
uniform mat4 u_MVP;
void main() {
    gl_Position = u_MVP * position;
    v_TexCoord = texCoord;
}
";

const FRAGMENT: &str = "
#version 330 core
layout(location = 0) out vec4 color;
in vec2 v_TexCoord;
uniform vec4 u_Color;
uniform sampler2D u_Texture;
void main() {
    color = texture(u_Texture, v_TexCoord) * u_Color;
}
";

fn headless() -> (Rc<RefCell<HeadlessDevice>>, Context) {
    let device = Rc::new(RefCell::new(HeadlessDevice::new()));
    let ctx = Context::from_shared(device.clone(), ErrorPolicy::Propagate);
    (device, ctx)
}

fn program(ctx: &Context) -> Program {
    Program::create(
        ctx,
        &ShaderSource::new("quad.vert", VERTEX),
        &ShaderSource::new("quad.frag", FRAGMENT),
    )
    .unwrap()
}

fn quad_layout() -> VertexLayout {
    VertexLayout::new().with(2, ScalarType::Float).with(2, ScalarType::Float)
}

fn quad(ctx: &Context, program: Rc<Program>) -> Drawable {
    let vertices: [f32; 16] = [
        -0.5, -0.5, 0.0, 0.0, //
        0.5, -0.5, 1.0, 0.0, //
        0.5, 0.5, 1.0, 1.0, //
        -0.5, 0.5, 0.0, 1.0,
    ];
    let indices = [0, 1, 2, 2, 3, 0];

    Drawable::new(ctx, &vertices, &quad_layout(), &indices, program).unwrap()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![];
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn program_links_and_deletes_its_stages() {
    let (device, ctx) = headless();

    let _program = program(&ctx);

    let device = device.borrow();
    assert_eq!(device.live_programs(), 1);
    assert_eq!(device.live_shaders(), 0);
}

#[test]
fn broken_fragment_stage_yields_no_program() {
    let (device, ctx) = headless();

    let result = Program::create(
        &ctx,
        &ShaderSource::new("quad.vert", VERTEX),
        &ShaderSource::new("broken.frag", "#version 330 core\nout vec4 color;\n"),
    );

    match result {
        Err(RenderError::ShaderCompile { stage, path, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert_eq!(path, "broken.frag");
            assert!(log.contains("main"));
        }
        other => panic!("unexpected {:?}", other.map(|p| p.id())),
    }

    let device = device.borrow();
    assert_eq!(device.live_shaders(), 0);
    assert_eq!(device.live_programs(), 0);
    assert!(device.draw_calls().is_empty());
}

#[test]
fn missing_shader_file_fails_before_compiling() {
    let (device, ctx) = headless();

    match Program::from_files(&ctx, "no/such/quad.vert", "no/such/quad.frag") {
        Err(RenderError::Io { path, .. }) => assert!(path.ends_with("quad.vert")),
        other => panic!("unexpected {:?}", other.map(|p| p.id())),
    }
    assert_eq!(device.borrow().live_shaders(), 0);
}

#[test]
fn mvp_reads_back_column_major() {
    let (device, ctx) = headless();
    let program = program(&ctx);

    program.set_uniform_mat4(U_MVP, &Mat4::IDENTITY).unwrap();
    assert_eq!(program.read_uniform_mat4(U_MVP).unwrap(), Mat4::IDENTITY);

    // Not symmetric, so a transpose anywhere would show
    let mvp = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    program.set_uniform_mat4(U_MVP, &mvp).unwrap();
    assert_eq!(program.read_uniform_mat4(U_MVP).unwrap(), mvp);

    let device = device.borrow();
    match device.uniform_value(program.id(), U_MVP) {
        Some(UniformValue::Mat4(columns)) => assert_eq!(&columns[12..15], &[1.0, 2.0, 3.0]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn uniform_writes_rebind_the_program() {
    let (device, ctx) = headless();
    let first = program(&ctx);
    let second = program(&ctx);

    second.bind().unwrap();
    first.set_uniform_4f(U_COLOR, [0.2, 0.4, 0.6, 1.0]).unwrap();

    assert_eq!(device.borrow().current_program(), Some(first.id()));
    assert_eq!(first.read_uniform_4f(U_COLOR).unwrap(), [0.2, 0.4, 0.6, 1.0]);
}

#[test]
fn unknown_uniform_is_a_silent_no_op() {
    let (_, ctx) = headless();
    let program = program(&ctx);

    let location = program.uniform_location("u_DoesNotExist").unwrap();
    assert!(location.is_absent());
    program.set_uniform_1i("u_DoesNotExist", 3).unwrap();
    program.set_uniform_mat4("u_DoesNotExist", &Mat4::ZERO).unwrap();
}

#[test]
fn draw_uses_index_count() {
    let (device, ctx) = headless();
    let program = Rc::new(program(&ctx));

    let mut layout = VertexLayout::new();
    layout.push(3, ScalarType::Float).push(4, ScalarType::Float).push(2, ScalarType::Float);
    assert_eq!(layout.stride(), 36);

    let vertices = [0f32; 9 * 5];
    let indices = [0, 1, 2, 2, 3, 4];
    let drawable = Drawable::new(&ctx, &vertices, &layout, &indices, program).unwrap();

    let renderer = Renderer::new(&ctx);
    drawable.draw(&renderer).unwrap();

    let device = device.borrow();
    let draws = device.draw_calls();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].count, 6);
    assert_eq!(draws[0].vertex_array, Some(drawable.vertex_array().id()));
    assert_eq!(draws[0].element_buffer, Some(drawable.index_buffer().id()));
    assert_eq!(draws[0].program, Some(drawable.program().id()));
}

#[test]
fn standalone_index_buffer_draws() {
    let (device, ctx) = headless();
    let program = program(&ctx);

    let indices = IndexBuffer::create(&ctx, &[0, 1, 2, 2, 3, 0]).unwrap();
    assert_eq!(indices.count(), 6);

    let mut vertex_array = VertexArray::create(&ctx).unwrap();
    let vertices = VertexBuffer::from_slice(&ctx, &[0f32; 16]).unwrap();
    vertex_array.attach(vertices, &quad_layout()).unwrap();
    vertex_array.unbind().unwrap();

    Renderer::new(&ctx).draw_indexed(&vertex_array, &indices, &program).unwrap();

    let device = device.borrow();
    let draws = device.draw_calls();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].count, 6);
    assert_eq!(draws[0].element_buffer, Some(indices.id()));
}

#[test]
fn draw_rebinds_what_it_needs() {
    let (device, ctx) = headless();
    let program = Rc::new(program(&ctx));
    let a = quad(&ctx, program.clone());
    let b = quad(&ctx, program.clone());
    let renderer = Renderer::new(&ctx);

    // Leave unrelated state bound between draws
    b.vertex_array().bind().unwrap();
    program.unbind().unwrap();
    a.draw(&renderer).unwrap();
    b.draw(&renderer).unwrap();

    let device = device.borrow();
    let draws = device.draw_calls();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].vertex_array, Some(a.vertex_array().id()));
    assert_eq!(draws[1].vertex_array, Some(b.vertex_array().id()));
}

#[test]
fn textured_quad_frame() {
    let (device, ctx) = headless();
    let program = Rc::new(program(&ctx));
    let texture = Texture::create(&ctx, &png(4, 4)).unwrap();
    let quad = quad(&ctx, program.clone()).with_texture(texture);
    let renderer = Renderer::new(&ctx);

    renderer.set_clear_color([1.0, 1.0, 1.0, 1.0]).unwrap();
    renderer.enable_depth_test().unwrap();
    renderer.viewport(500, 500).unwrap();

    renderer.clear().unwrap();
    program.set_uniform_mat4(U_MVP, &Mat4::IDENTITY).unwrap();
    program.set_uniform_4f(U_COLOR, [1.0; 4]).unwrap();
    program.set_uniform_1i(U_TEXTURE, 0).unwrap();
    quad.draw(&renderer).unwrap();

    assert_eq!(program.read_uniform_1i(U_TEXTURE).unwrap(), 0);

    let texture_id = quad.texture().map(Texture::id).unwrap();
    let device = device.borrow();
    assert_eq!(device.clear_count(), 1);
    assert!(device.depth_test_enabled());
    assert_eq!(device.viewport_rect(), (0, 0, 500, 500));
    assert_eq!(device.draw_calls()[0].textures.get(&0), Some(&texture_id));
}

#[test]
fn dropping_everything_frees_the_device() {
    let (device, ctx) = headless();
    let program = Rc::new(program(&ctx));
    let a = quad(&ctx, program.clone()).with_texture(Texture::create(&ctx, &png(2, 2)).unwrap());
    let b = quad(&ctx, program.clone());
    drop(program);

    drop(a);
    assert_eq!(device.borrow().live_programs(), 1);
    drop(b);

    let device = device.borrow();
    assert_eq!(device.live_programs(), 0);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_vertex_arrays(), 0);
    assert_eq!(device.live_textures(), 0);
}

#[test]
fn device_errors_carry_the_failing_call() {
    let (device, ctx) = headless();
    device.borrow_mut().inject_error(0x0505);

    match VertexArray::create(&ctx) {
        Err(RenderError::Device(e)) => {
            assert_eq!(e.codes, vec![0x0505]);
            assert_eq!(e.call, "create_vertex_array");
            assert!(e.diagnostics()[0].contains("GL_OUT_OF_MEMORY"));
        }
        other => panic!("unexpected {:?}", other),
    }
}
