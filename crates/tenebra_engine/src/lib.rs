#![warn(clippy::pedantic)]

use log::{debug, info};
use raw_window_handle::RawWindowHandle;
use tenebra_graphics::backend::DisplayBackend;
use tenebra_graphics::config::GraphicsConfig;
use tenebra_graphics::texture::TextureSource;
use tenebra_graphics::{GraphicsError, GraphicsSystem};
use tenebra_input::{InputFocus, InputOutcome, InputSystem, RawInput, RawInputError};
use tenebra_math::vector::Vector2i;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("graphics failure")]
    Graphics(#[from] GraphicsError),
    #[error("input failure")]
    Input(#[from] RawInputError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// The display and the input devices of one window, brought up and torn down
/// together.
pub struct Engine<B, R>
where
    B: DisplayBackend,
    R: RawInput,
{
    graphics: GraphicsSystem<B>,
    raw_input: R,
    input: InputSystem,
}

impl<B, R> Engine<B, R>
where
    B: DisplayBackend,
    R: RawInput,
{
    /// Polls the input devices for `focus`, then moves the cursor and circle
    /// animations on by one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if an input device fails and cannot be acquired
    /// again.
    pub fn update<F>(&mut self, focus: &mut F) -> Result<InputOutcome>
    where
        F: InputFocus + ?Sized,
    {
        let outcome = self.input.update(&mut self.raw_input, focus)?;
        self.graphics.cursor_mut().advance_frame();
        Ok(outcome)
    }

    /// Draws the cursor at the current mouse position.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor blit fails.
    pub fn draw_cursor(&mut self) -> Result<()> {
        let position = self.mouse_position();
        self.graphics.draw_cursor(position)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if presenting the back buffer fails.
    pub fn flip(&mut self) -> Result<()> {
        self.graphics.flip()?;
        Ok(())
    }

    #[must_use]
    pub fn mouse_position(&self) -> Vector2i {
        let (x, y) = self.input.mouse.position();
        Vector2i::new(x, y)
    }

    /// Releases the input devices, then the display. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.input.shutdown(&mut self.raw_input);
        self.graphics.shutdown();
    }

    #[must_use]
    pub fn graphics(&self) -> &GraphicsSystem<B> {
        &self.graphics
    }

    pub fn graphics_mut(&mut self) -> &mut GraphicsSystem<B> {
        &mut self.graphics
    }

    #[must_use]
    pub fn input(&self) -> &InputSystem {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSystem {
        &mut self.input
    }

    #[must_use]
    pub fn raw_input(&self) -> &R {
        &self.raw_input
    }
}

impl<B, R> Drop for Engine<B, R>
where
    B: DisplayBackend,
    R: RawInput,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct EngineBuilder {
    config: GraphicsConfig,
    texture_source: Option<Box<dyn TextureSource>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GraphicsConfig::default(),
            texture_source: None,
        }
    }

    pub fn with_config(&mut self, config: GraphicsConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Source of the named textures, the overlay circles among them.
    pub fn with_texture_source(&mut self, texture_source: Box<dyn TextureSource>) -> &mut Self {
        self.texture_source = Some(texture_source);
        self
    }

    /// Initializes the display on `window`, then the input devices. Input is
    /// taken exclusively in fullscreen mode.
    ///
    /// # Errors
    ///
    /// Returns an error if any part fails to come up, in which case whatever
    /// was already initialized is shut down again.
    pub fn build<B, R>(
        &mut self,
        backend: B,
        raw_input: R,
        window: RawWindowHandle,
    ) -> Result<Engine<B, R>>
    where
        B: DisplayBackend,
        R: RawInput,
    {
        let windowed = self.config.screen.windowed;
        let mut graphics = GraphicsSystem::new(backend);
        graphics.initialize(window, self.config.clone())?;

        let mut engine = Engine {
            graphics,
            raw_input,
            input: InputSystem::new(),
        };
        engine.graphics.create_cursor_sheet()?;
        engine.input.init(&mut engine.raw_input, windowed)?;

        if let Some(texture_source) = self.texture_source.as_deref() {
            engine.graphics.set_up_circles(texture_source)?;
        } else {
            debug!("No texture source, overlay circles are disabled");
        }

        info!(
            "Engine ready: {}x{}, windowed: {windowed}",
            engine.graphics.width(),
            engine.graphics.height()
        );
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
