//! Bounds and viewbox helpers for scene output.

use camoverlay_core::Vec2;

/// Bounding box accumulator used while walking scenes and toolpaths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.update(p.x, p.y);
        }
        bounds
    }

    pub fn update(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.max_x, self.max_y)
    }

    /// Corners counter-clockwise from the minimum corner
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min_x, self.min_y),
            Vec2::new(self.max_x, self.min_y),
            Vec2::new(self.max_x, self.max_y),
            Vec2::new(self.min_x, self.max_y),
        ]
    }

    /// SVG viewbox `(min_x, min_y, width, height)` with proportional padding.
    ///
    /// Empty bounds fall back to a 100 x 100 box at the origin. Flat bounds
    /// get one unit of padding so the box never collapses.
    pub fn viewbox_with_padding(&self, padding_factor: f64) -> (f64, f64, f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0, 100.0, 100.0);
        }

        let pad = |extent: f64| {
            if extent > 0.0 {
                extent * padding_factor
            } else {
                1.0
            }
        };
        let padding_x = pad(self.width());
        let padding_y = pad(self.height());

        (
            self.min_x - padding_x,
            self.min_y - padding_y,
            self.width() + 2.0 * padding_x,
            self.height() + 2.0 * padding_y,
        )
    }
}
