/// Axis-aligned extent in display coordinates (Web Mercator meters).
///
/// Starts as the empty sentinel (min = +inf, max = -inf) and grows as
/// coordinates are folded in. A non-finite coordinate poisons the extent
/// permanently: that is the post-hoc signal that the declared source CRS
/// does not match the actual coordinate values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent {
    pub fn empty() -> Self {
        Extent {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Extent { min, max }
    }

    pub fn grow(&mut self, x: f64, y: f64) {
        if self.min[0].is_nan() {
            return;
        }
        if !x.is_finite() || !y.is_finite() {
            self.min = [f64::NAN, f64::NAN];
            self.max = [f64::NAN, f64::NAN];
            return;
        }
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
    }

    pub fn union(&mut self, other: &Extent) {
        self.grow(other.min[0], other.min[1]);
        self.grow(other.max[0], other.max[1]);
    }

    /// Empty, poisoned, or otherwise unbounded extents are degenerate and
    /// must not drive the camera.
    pub fn is_degenerate(&self) -> bool {
        !(self.min[0].is_finite()
            && self.min[1].is_finite()
            && self.max[0].is_finite()
            && self.max[1].is_finite()
            && self.min[0] <= self.max[0]
            && self.min[1] <= self.max[1])
    }

    pub fn center(&self) -> Option<[f64; 2]> {
        if self.is_degenerate() {
            return None;
        }
        Some([
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_degenerate()
            && x >= self.min[0]
            && x <= self.max[0]
            && y >= self.min[1]
            && y <= self.max[1]
    }
}
