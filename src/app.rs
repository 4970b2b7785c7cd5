use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;
use render::{
    Context, Drawable, HeadlessDevice, Program, Renderer, ScalarType, Texture, VertexLayout,
    U_COLOR, U_MVP, U_TEXTURE,
};

use crate::config::Config;
use crate::error::AppResult;
use crate::scene::{Key, KeyOutcome, Scene};

const CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A unit quad in the XY plane, centered on the origin.
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 16] = [
    // Position     Texture
    -0.5, -0.5,     0.0, 0.0,
     0.5, -0.5,     1.0, 0.0,
     0.5,  0.5,     1.0, 1.0,
    -0.5,  0.5,     0.0, 1.0,
];

#[rustfmt::skip]
const QUAD_INDICES: [u32; 6] = [
    0, 1, 2,
    2, 3, 0,
];

/// Everything drawn and every piece of input state. The event loop owns the one instance.
#[derive(Debug)]
pub struct App {
    renderer: Renderer,
    quad: Drawable,
    scene: Scene,
    tint: [f32; 4],
}

impl App {
    pub fn new(ctx: &Context, config: &Config) -> AppResult<Self> {
        let program = Program::from_files(ctx, &config.vertex_shader, &config.fragment_shader)?;
        let program = Rc::new(program);
        let texture = Texture::from_file(ctx, &config.texture)?;

        let layout = VertexLayout::new()
            .with(2, ScalarType::Float)
            .with(2, ScalarType::Float);
        let quad = Drawable::new(ctx, &QUAD_VERTICES, &layout, &QUAD_INDICES, program)?
            .with_texture(texture);

        let renderer = Renderer::new(ctx);
        renderer.set_clear_color(CLEAR_COLOR)?;
        renderer.enable_depth_test()?;
        renderer.viewport(config.width, config.height)?;

        log::info!(
            "scene ready: {}x{} texture on a {}x{} viewport",
            quad.texture().map_or(0, Texture::width),
            quad.texture().map_or(0, Texture::height),
            config.width,
            config.height
        );

        Ok(Self {
            renderer,
            quad,
            scene: Scene::new(config.width, config.height, config.fov_degrees),
            tint: config.tint,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn key_press(&mut self, key: Key) -> KeyOutcome {
        self.scene.key_press(key)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> AppResult<()> {
        self.scene.reshape(width, height);
        self.renderer.viewport(self.scene.width, self.scene.height)?;
        Ok(())
    }

    pub fn render_frame(&self) -> AppResult<()> {
        self.renderer.clear()?;

        let program = self.quad.program();
        program.set_uniform_mat4(U_MVP, &self.scene.mvp(&Mat4::IDENTITY))?;
        program.set_uniform_4f(U_COLOR, self.tint)?;
        program.set_uniform_1i(U_TEXTURE, 0)?;

        self.quad.draw(&self.renderer)?;
        Ok(())
    }
}

/// Builds the scene on a [`HeadlessDevice`], renders a single frame and logs what the device was
/// asked to draw.
pub fn run_headless(config: &Config) -> AppResult<()> {
    let device = Rc::new(RefCell::new(HeadlessDevice::new()));
    let ctx = Context::from_shared(device.clone(), config.error_policy);

    let app = App::new(&ctx, config)?;
    app.render_frame()?;

    let device = device.borrow();
    for (i, call) in device.draw_calls().iter().enumerate() {
        log::info!(
            "draw {}: {} indices, vertex array {:?}, program {:?}, textures {:?}",
            i,
            call.count,
            call.vertex_array,
            call.program,
            call.textures
        );
    }
    println!(
        "headless frame: {} clear(s), {} draw call(s)",
        device.clear_count(),
        device.draw_calls().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use render::device::UniformValue;
    use render::{ErrorPolicy, RenderError};

    fn config() -> Config {
        Config::parse(vec!["glquad", "--tint", "1,0,0,1", "--on-error", "propagate"]).unwrap()
    }

    fn app() -> (Rc<RefCell<HeadlessDevice>>, App) {
        let device = Rc::new(RefCell::new(HeadlessDevice::new()));
        let ctx = Context::from_shared(device.clone(), ErrorPolicy::Propagate);
        let app = App::new(&ctx, &config()).unwrap();
        (device, app)
    }

    #[test]
    fn frame_uploads_scene_uniforms() {
        let (device, app) = app();
        app.render_frame().unwrap();

        let program = app.quad.program().id();
        let device = device.borrow();
        assert_eq!(device.clear_count(), 1);
        assert_eq!(device.draw_calls().len(), 1);
        assert_eq!(device.draw_calls()[0].count, 6);
        assert_eq!(
            device.uniform_value(program, U_COLOR),
            Some(&UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(
            device.uniform_value(program, U_MVP),
            Some(&UniformValue::Mat4(app.scene().mvp(&Mat4::IDENTITY).to_cols_array()))
        );
        assert_eq!(device.clear_color_value(), CLEAR_COLOR);
        assert!(device.depth_test_enabled());
    }

    #[test]
    fn keys_change_the_next_frame() {
        let (device, mut app) = app();
        app.render_frame().unwrap();
        let before = app.scene().mvp(&Mat4::IDENTITY);

        assert_eq!(app.key_press(Key::Left), KeyOutcome::Redraw);
        app.render_frame().unwrap();

        let after = app.scene().mvp(&Mat4::IDENTITY);
        assert_ne!(before, after);
        assert_eq!(
            device.borrow().uniform_value(app.quad.program().id(), U_MVP),
            Some(&UniformValue::Mat4(after.to_cols_array()))
        );
        assert_eq!(app.key_press(Key::Quit), KeyOutcome::Quit);
    }

    #[test]
    fn resize_updates_viewport() {
        let (device, mut app) = app();
        app.resize(800, 600).unwrap();

        assert_eq!(device.borrow().viewport_rect(), (0, 0, 800, 600));
        assert_eq!((app.scene().width, app.scene().height), (800, 600));
    }

    #[test]
    fn missing_texture_is_reported() {
        let ctx = Context::new(HeadlessDevice::new(), ErrorPolicy::Propagate);
        let config = Config {
            texture: "res/textures/missing.png".into(),
            ..config()
        };

        match App::new(&ctx, &config) {
            Err(AppError::Render(RenderError::Io { path, .. })) => {
                assert!(path.ends_with("missing.png"))
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn headless_run_succeeds() {
        run_headless(&config()).unwrap();
    }
}
