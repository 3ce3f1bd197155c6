//! Mouse cursor animation.
//!
//! The cursor sheet holds one row of 32x32 cells per cursor, five cells per
//! row. Every cursor but `Point` cycles through its frames, and the overlay
//! circle frame advances on the same beat.

use tenebra_math::vector::Vector2i;

use crate::config::CursorConfig;
use crate::surface::Rect;

pub const NUM_CURSORS: usize = 12;
pub const MAX_CURSOR_FRAMES: usize = 5;
pub const CURSOR_SIZE: i32 = 32;
pub const NUM_CIRCLE_FRAMES: usize = 3;

/// Ticks spent on each animation frame.
pub const FRAME_RATE: u32 = 3;

pub const CURSOR_SHEET_WIDTH: u32 = 160;
pub const CURSOR_SHEET_HEIGHT: u32 = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cursor {
    #[default]
    Point,
    Grab,
    River,
    Camera,
    Attack,
    Flame,
    Thaumaturgy,
    Talk,
    Defend,
    Move,
    Wait,
}

impl Cursor {
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// Source rectangle of cell `index` on the cursor sheet.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn cell_rect(index: usize) -> Rect {
    let column = (index % MAX_CURSOR_FRAMES) as i32;
    let row = (index / MAX_CURSOR_FRAMES) as i32;
    Rect::with_size(
        column * CURSOR_SIZE,
        row * CURSOR_SIZE,
        CURSOR_SIZE,
        CURSOR_SIZE,
    )
}

#[derive(Debug, Clone)]
pub struct CursorAnimation {
    cursor: Cursor,
    frame: usize,
    sub_frame: u32,
    circle_frame: usize,
    frame_counts: [usize; NUM_CURSORS],
    offsets: [(i32, i32); NUM_CURSORS],
}

impl CursorAnimation {
    /// Creates the animation state from per-cursor settings.
    ///
    /// Slots without settings get a single frame and no hot-spot offset.
    #[must_use]
    pub fn new(cursors: &[CursorConfig]) -> Self {
        let mut frame_counts = [1; NUM_CURSORS];
        let mut offsets = [(0, 0); NUM_CURSORS];
        for (slot, cursor) in cursors.iter().take(NUM_CURSORS).enumerate() {
            frame_counts[slot] = cursor.frames.clamp(1, MAX_CURSOR_FRAMES);
            offsets[slot] = (cursor.offset_x, cursor.offset_y);
        }

        Self {
            cursor: Cursor::Point,
            frame: 0,
            sub_frame: 0,
            circle_frame: 0,
            frame_counts,
            offsets,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    #[must_use]
    pub fn circle_frame(&self) -> usize {
        self.circle_frame
    }

    #[must_use]
    pub fn frame_count(&self, cursor: Cursor) -> usize {
        self.frame_counts[cursor.slot()]
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        if self.frame >= self.frame_count(cursor) || cursor == Cursor::Point {
            self.frame = 0;
        }
    }

    /// Jumps to `frame`, falling back to the first frame when the current
    /// cursor has fewer frames.
    pub fn set_frame(&mut self, frame: usize) {
        self.frame = if frame < self.frame_count(self.cursor) {
            frame
        } else {
            0
        };
    }

    /// Advances the animation by one tick.
    pub fn advance_frame(&mut self) {
        self.sub_frame += 1;
        if self.sub_frame < FRAME_RATE {
            return;
        }

        self.sub_frame = 0;
        self.circle_frame = (self.circle_frame + 1) % NUM_CIRCLE_FRAMES;
        if self.cursor != Cursor::Point {
            self.frame = (self.frame + 1) % self.frame_count(self.cursor);
        }
    }

    /// Source cell on the sheet and destination rectangle for drawing the
    /// cursor with its top-left corner at `at`, shifted by the hot spot.
    #[must_use]
    pub fn blit_rects(&self, at: Vector2i) -> (Rect, Rect) {
        let source = cell_rect(self.cursor.slot() * MAX_CURSOR_FRAMES + self.frame);
        let (offset_x, offset_y) = self.offsets[self.cursor.slot()];
        let destination = Rect::with_size(at.x, at.y, CURSOR_SIZE, CURSOR_SIZE)
            .translated(-offset_x, -offset_y);
        (source, destination)
    }
}

impl Default for CursorAnimation {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animated() -> CursorAnimation {
        let mut configs = vec![CursorConfig::default(); NUM_CURSORS];
        configs[Cursor::Grab.slot()] = CursorConfig {
            frames: 4,
            offset_x: 16,
            offset_y: 8,
        };
        configs[Cursor::Wait.slot()] = CursorConfig {
            frames: 2,
            offset_x: 0,
            offset_y: 0,
        };
        CursorAnimation::new(&configs)
    }

    fn tick(animation: &mut CursorAnimation, count: u32) {
        for _ in 0..count {
            animation.advance_frame();
        }
    }

    #[test]
    fn cell_layout() {
        assert_eq!(cell_rect(0), Rect::new(0, 0, 32, 32));
        assert_eq!(cell_rect(4), Rect::new(128, 0, 160, 32));
        assert_eq!(cell_rect(7), Rect::new(64, 32, 96, 64));
        assert_eq!(
            cell_rect(NUM_CURSORS * MAX_CURSOR_FRAMES - 1),
            Rect::new(128, 352, 160, 384)
        );
    }

    #[test]
    fn frames_advance_every_third_tick() {
        let mut animation = animated();
        animation.set_cursor(Cursor::Grab);

        tick(&mut animation, 2);
        assert_eq!(animation.frame(), 0);

        tick(&mut animation, 1);
        assert_eq!(animation.frame(), 1);

        tick(&mut animation, 9);
        assert_eq!(animation.frame(), 0);
    }

    #[test]
    fn point_cursor_does_not_animate() {
        let mut animation = animated();

        tick(&mut animation, 30);

        assert_eq!(animation.frame(), 0);
        assert_eq!(animation.circle_frame(), 10 % NUM_CIRCLE_FRAMES);
    }

    #[test]
    fn circle_frame_cycles() {
        let mut animation = animated();

        let frames: Vec<usize> = (0..4)
            .map(|_| {
                tick(&mut animation, FRAME_RATE);
                animation.circle_frame()
            })
            .collect();

        assert_eq!(frames, vec![1, 2, 0, 1]);
    }

    #[test]
    fn set_cursor_resets_out_of_range_frame() {
        let mut animation = animated();
        animation.set_cursor(Cursor::Grab);
        animation.set_frame(3);

        animation.set_cursor(Cursor::Wait);
        assert_eq!(animation.frame(), 0);

        animation.set_frame(1);
        animation.set_cursor(Cursor::Grab);
        assert_eq!(animation.frame(), 1);

        animation.set_cursor(Cursor::Point);
        assert_eq!(animation.frame(), 0);
    }

    #[test]
    fn set_frame_out_of_range_falls_back_to_first() {
        let mut animation = animated();
        animation.set_cursor(Cursor::Wait);

        animation.set_frame(4);

        assert_eq!(animation.frame(), 0);
    }

    #[test]
    fn blit_rects_apply_hot_spot() {
        let mut animation = animated();
        animation.set_cursor(Cursor::Grab);
        animation.set_frame(2);

        let (source, destination) = animation.blit_rects(Vector2i::new(100, 50));

        assert_eq!(source, Rect::new(64, 32, 96, 64));
        assert_eq!(destination, Rect::new(84, 42, 116, 74));
    }

    #[test]
    fn missing_configs_default_to_single_frame() {
        let animation = CursorAnimation::default();

        for cursor in [Cursor::Point, Cursor::Attack, Cursor::Wait] {
            assert_eq!(animation.frame_count(cursor), 1);
        }
    }
}
