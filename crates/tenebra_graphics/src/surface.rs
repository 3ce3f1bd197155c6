/// Screen-space rectangle with exclusive `right`/`bottom` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[must_use]
    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }
}

const BOUND_SENTINEL: i32 = 64000;

/// A set of rectangles handed to a clipper, along with their bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipList {
    rects: Vec<Rect>,
    bounds: Rect,
}

impl ClipList {
    /// Builds a clip list and computes its bounds.
    ///
    /// An empty list keeps the inverted sentinel bounds.
    #[must_use]
    pub fn new(rects: Vec<Rect>) -> Self {
        let mut bounds = Rect::new(
            BOUND_SENTINEL,
            BOUND_SENTINEL,
            -BOUND_SENTINEL,
            -BOUND_SENTINEL,
        );
        for rect in &rects {
            bounds.left = bounds.left.min(rect.left);
            bounds.top = bounds.top.min(rect.top);
            bounds.right = bounds.right.max(rect.right);
            bounds.bottom = bounds.bottom.max(rect.bottom);
        }

        Self { rects, bounds }
    }

    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Rectangle used by software blits, inclusive of the last row and column.
#[must_use]
pub fn software_clip_rect(width: u32, height: u32) -> Rect {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);
    Rect::new(0, 0, width - 1, height - 1)
}
