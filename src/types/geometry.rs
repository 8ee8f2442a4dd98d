//! Glyph-space geometry: rectangles, outlines and bounding boxes.
//!
//! All coordinates are integer font design units with Y growing upward.

/// An axis-aligned rectangle, `x1 > x0` and `y1 > y0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    /// Create a rectangle, returning `None` if it would be degenerate.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        if x1 > x0 && y1 > y0 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Corner points as a closed contour, clockwise from the bottom-left
    /// (the TrueType direction for filled contours).
    pub fn contour(&self) -> [(i32, i32); 4] {
        [
            (self.x0, self.y0),
            (self.x0, self.y1),
            (self.x1, self.y1),
            (self.x1, self.y0),
        ]
    }
}

/// Bounding box of an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Bounds {
    fn of(rect: &Rect) -> Self {
        Self {
            x_min: rect.x0,
            y_min: rect.y0,
            x_max: rect.x1,
            y_max: rect.y1,
        }
    }

    /// Smallest box containing both.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// An ordered set of closed rectangular contours. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    rects: Vec<Rect>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self { rects }
    }

    pub fn push(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn contour_count(&self) -> usize {
        self.rects.len()
    }

    /// Total number of points across all contours.
    pub fn point_count(&self) -> usize {
        self.rects.len() * 4
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding box over every contour point, `None` for an empty outline.
    pub fn bounds(&self) -> Option<Bounds> {
        self.rects
            .iter()
            .map(Bounds::of)
            .reduce(Bounds::union)
    }

    /// Minimum X over all contours, 0 for an empty outline.
    pub fn x_min(&self) -> i32 {
        self.bounds().map_or(0, |b| b.x_min)
    }
}
