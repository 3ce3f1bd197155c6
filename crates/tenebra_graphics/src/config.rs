//! Display and cursor settings, stored as RON.
//!
//! ```ron
//! (
//!     screen: (width: 1024, height: 768, windowed: false),
//!     cursors: [(frames: 1, offset_x: 0, offset_y: 0), (frames: 4, offset_x: 16, offset_y: 16)],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cursor::{MAX_CURSOR_FRAMES, NUM_CURSORS};

/// Rows reserved below the viewport; screens must be taller than this.
pub const MIN_SCREEN_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read configuration file")]
    Read(#[from] std::io::Error),
    #[error("couldn't parse configuration")]
    Parse(#[from] ron::error::SpannedError),
    #[error("screen size {width}x{height} is too small")]
    ScreenTooSmall { width: u32, height: u32 },
    #[error("{0} cursors configured, at most {NUM_CURSORS} are supported")]
    TooManyCursors(usize),
    #[error("cursor {index} has {frames} frames, expected 1 to {MAX_CURSOR_FRAMES}")]
    InvalidFrameCount { index: usize, frames: usize },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub windowed: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            windowed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub frames: usize,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            frames: 1,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub screen: ScreenConfig,
    pub cursors: Vec<CursorConfig>,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            cursors: vec![CursorConfig::default(); NUM_CURSORS],
        }
    }
}

impl GraphicsConfig {
    /// Parses and validates a RON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON for this structure or
    /// if the values fail [`GraphicsConfig::validate`].
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: GraphicsConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or for the same reasons as
    /// [`GraphicsConfig::from_ron_str`].
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// # Errors
    ///
    /// Returns an error if the screen is not larger than
    /// [`MIN_SCREEN_SIZE`] in both dimensions, if more cursors are configured
    /// than there are slots, or if a cursor's frame count is out of range.
    pub fn validate(&self) -> Result<()> {
        let ScreenConfig { width, height, .. } = self.screen;
        if width <= MIN_SCREEN_SIZE || height <= MIN_SCREEN_SIZE {
            return Err(ConfigError::ScreenTooSmall { width, height });
        }

        if self.cursors.len() > NUM_CURSORS {
            return Err(ConfigError::TooManyCursors(self.cursors.len()));
        }

        if let Some((index, cursor)) = self
            .cursors
            .iter()
            .enumerate()
            .find(|(_, cursor)| !(1..=MAX_CURSOR_FRAMES).contains(&cursor.frames))
        {
            return Err(ConfigError::InvalidFrameCount {
                index,
                frames: cursor.frames,
            });
        }

        Ok(())
    }
}
