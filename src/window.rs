use glutin::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
    Api, ContextBuilder, GlProfile, GlRequest,
};
use render::{Context, GlDevice};

use crate::app::App;
use crate::config::Config;
use crate::error::AppResult;
use crate::scene::{Key, KeyOutcome};

fn key_from_code(code: VirtualKeyCode) -> Option<Key> {
    match code {
        VirtualKeyCode::Left => Some(Key::Left),
        VirtualKeyCode::Right => Some(Key::Right),
        VirtualKeyCode::Up => Some(Key::Up),
        VirtualKeyCode::Down => Some(Key::Down),
        VirtualKeyCode::PageUp => Some(Key::PageUp),
        VirtualKeyCode::PageDown => Some(Key::PageDown),
        VirtualKeyCode::Escape => Some(Key::Quit),
        _ => None,
    }
}

/// Opens the window, builds the scene on its OpenGL context and runs the event loop.
///
/// Only returns if setting up fails. Once the loop is running the process exits when the window
/// closes, with status 1 if a frame failed.
pub fn run(config: &Config) -> AppResult<()> {
    let events = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height));
    let win_context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
        .with_gl_profile(GlProfile::Core)
        .with_vsync(true)
        .build_windowed(window, &events)?;

    let win_context = unsafe { win_context.make_current().map_err(|(_, e)| e)? };

    let device = GlDevice::load(|s| win_context.get_proc_address(s) as *const _);
    let ctx = Context::new(device, config.error_policy);
    let mut app = App::new(&ctx, config)?;
    let mut failed = false;

    log::info!("window open, arrows turn, page up/down zoom, q or escape quits");

    events.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        let outcome = match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => Ok(Some(KeyOutcome::Quit)),
                WindowEvent::Resized(size) => {
                    win_context.resize(size);
                    app.resize(size.width, size.height).map(|_| Some(KeyOutcome::Redraw))
                }
                WindowEvent::ReceivedCharacter(c) => {
                    Ok(Key::from_char(c).map(|key| app.key_press(key)))
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(code),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => Ok(key_from_code(code).map(|key| app.key_press(key))),
                _ => Ok(None),
            },
            Event::RedrawRequested(_) => app
                .render_frame()
                .and_then(|_| win_context.swap_buffers().map_err(Into::into))
                .map(|_| None),
            Event::LoopDestroyed => {
                if failed {
                    std::process::exit(1);
                }
                return;
            }
            _ => Ok(None),
        };

        match outcome {
            Ok(Some(KeyOutcome::Redraw)) => win_context.window().request_redraw(),
            Ok(Some(KeyOutcome::Quit)) => *control_flow = ControlFlow::Exit,
            Ok(None) => {}
            Err(e) => {
                e.log();
                failed = true;
                *control_flow = ControlFlow::Exit;
            }
        }
    })
}
