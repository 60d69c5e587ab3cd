//! Size computations for keys and indicator dots.
//!
//! Everything scales with the available bounds so a resize keeps the same
//! proportions between circle, border and text.

/// Border width as a fraction of the key radius.
pub const BORDER_WIDTH_RATIO: f64 = 1.0 / 26.0;

/// Border never gets thinner than this.
pub const MIN_BORDER_WIDTH: f64 = 2.0;

/// Digit font size as a fraction of the key radius.
pub const DIGIT_FONT_RATIO: f64 = 39.0 / 40.0;

/// Sub-label font size as a fraction of the key radius.
pub const SYMBOLS_FONT_RATIO: f64 = 11.0 / 40.0;

/// Circle inscribed in a key's bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub border_width: f64,
    pub inner_radius: f64,
    pub digit_font_size: f64,
    pub symbols_font_size: f64,
}

impl CircleGeometry {
    pub fn for_bounds(width: f64, height: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let radius = width.min(height) / 2.0;
        let border_width = MIN_BORDER_WIDTH.max(radius * BORDER_WIDTH_RATIO);

        Self {
            center_x: width / 2.0,
            center_y: height / 2.0,
            radius,
            border_width,
            inner_radius: (radius - border_width).max(0.0),
            digit_font_size: radius * DIGIT_FONT_RATIO,
            symbols_font_size: radius * SYMBOLS_FONT_RATIO,
        }
    }

    /// Radius of the path to stroke so the whole border stays inside `radius`.
    pub fn stroke_radius(&self) -> f64 {
        (self.radius - self.border_width / 2.0).max(0.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// One indicator dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

/// Horizontal row of `count` equally spaced dots centered in the bounds.
///
/// Each dot gets an equal slot; the dot fills half of its slot so the gaps
/// match the dot diameter, and is capped by the row height.
pub fn dot_row(width: f64, height: f64, count: usize) -> Vec<Dot> {
    if count == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let slot = width / count as f64;
    let radius = (slot / 4.0).min(height / 2.0 - MIN_BORDER_WIDTH).max(0.0);
    let diameter = radius * 2.0;
    let spacing = diameter;
    let total = diameter * count as f64 + spacing * (count as f64 - 1.0);
    let start = (width - total) / 2.0 + radius;

    (0..count)
        .map(|i| Dot {
            center_x: start + i as f64 * (diameter + spacing),
            center_y: height / 2.0,
            radius,
        })
        .collect()
}
