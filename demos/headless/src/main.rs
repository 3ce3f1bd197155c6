use std::collections::VecDeque;

use log::info;
use raw_window_handle::{RawWindowHandle, WebWindowHandle};
use tenebra::engine::{EngineBuilder, EngineError};
use tenebra::graphics::backend::headless::HeadlessBackend;
use tenebra::graphics::config::GraphicsConfig;
use tenebra::graphics::cursor::Cursor;
use tenebra::graphics::material::MaterialPreset;
use tenebra::graphics::texture::TextureTable;
use tenebra::graphics::GraphicsError;
use tenebra::input::keyboard::{Key, KeyboardSnapshot};
use tenebra::input::mouse::{Button, MouseSnapshot};
use tenebra::input::{InputDevice, InputFocus, InputOutcome, RawInput};
use tenebra::math::vector::Vector3f;

/// Mouse and keyboard that replay a fixed session.
struct Replay {
    mouse: VecDeque<MouseSnapshot>,
    keyboard: VecDeque<KeyboardSnapshot>,
}

impl Replay {
    fn session() -> Self {
        let mut mouse: VecDeque<_> = (0..20).map(|_| MouseSnapshot::new(4, 3, 0)).collect();
        mouse.push_back(MouseSnapshot::new(0, 0, 0).with_button_down(Button::Left));
        mouse.push_back(MouseSnapshot::new(0, 0, 1));
        mouse.push_back(MouseSnapshot::new(-2, 0, 0).with_button_down(Button::Right));

        let mut keyboard: VecDeque<_> = (0..30).map(|_| KeyboardSnapshot::new()).collect();
        keyboard.push_back(KeyboardSnapshot::with_keys_down(&[
            Key::Escape,
            Key::LControl,
        ]));
        Self { mouse, keyboard }
    }
}

impl RawInput for Replay {
    fn cursor_position(&self) -> (i32, i32) {
        (200, 150)
    }

    fn set_cooperative_level(
        &mut self,
        _device: InputDevice,
        _exclusive: bool,
    ) -> tenebra::input::Result<()> {
        Ok(())
    }

    fn acquire(&mut self, _device: InputDevice) -> tenebra::input::Result<()> {
        Ok(())
    }

    fn unacquire(&mut self, _device: InputDevice) {}

    fn release(&mut self, _device: InputDevice) {}

    fn read_mouse(&mut self) -> tenebra::input::Result<Option<MouseSnapshot>> {
        Ok(self.mouse.pop_front())
    }

    fn read_keyboard(&mut self) -> tenebra::input::Result<Option<KeyboardSnapshot>> {
        Ok(self.keyboard.pop_front())
    }
}

/// Keeps the mouse on screen and reports clicks.
struct Screen {
    width: i32,
    height: i32,
}

impl InputFocus for Screen {
    fn move_mouse(&mut self, x: &mut i32, y: &mut i32, _z: &mut i32) {
        *x = (*x).clamp(0, self.width - 1);
        *y = (*y).clamp(0, self.height - 1);
    }

    fn left_button_down(&mut self, x: i32, y: i32) {
        info!("Left click at ({x}, {y})");
    }

    fn right_button_down(&mut self, x: i32, y: i32) {
        info!("Right click at ({x}, {y})");
    }
}

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GraphicsConfig::load(path).map_err(GraphicsError::from)?,
        None => GraphicsConfig::default(),
    };
    let mut focus = Screen {
        width: i32::try_from(config.screen.width).unwrap_or(i32::MAX),
        height: i32::try_from(config.screen.height).unwrap_or(i32::MAX),
    };

    let mut textures = TextureTable::new();
    for name in ["circle1", "circle2", "circle3"] {
        textures.insert(name);
    }

    let mut engine = EngineBuilder::new()
        .with_config(config)
        .with_texture_source(Box::new(textures))
        .build(
            HeadlessBackend::new(),
            Replay::session(),
            RawWindowHandle::Web(WebWindowHandle::new(1)),
        )?;
    engine.graphics_mut().cursor_mut().set_cursor(Cursor::Grab);

    let unit = Vector3f::new(1.0, 1.0, 0.0);
    let mut frames = 0;
    let mut backend_calls = engine.graphics_mut().backend_mut().take_calls().len();
    loop {
        match engine.update(&mut focus)? {
            InputOutcome::Continue => {}
            InputOutcome::FocusReleased => info!("Focus released"),
            InputOutcome::ExitRequested => break,
        }

        engine
            .graphics_mut()
            .draw_circle(&unit, MaterialPreset::Green, 0.5)?;
        engine.draw_cursor()?;
        engine.flip()?;
        frames += 1;
        backend_calls += engine.graphics_mut().backend_mut().take_calls().len();
    }

    info!(
        "{frames} frames presented, {backend_calls} backend calls, unit point at {:?} on screen",
        engine.graphics().world_to_screen(&unit)
    );
    engine.shutdown();
    Ok(())
}
