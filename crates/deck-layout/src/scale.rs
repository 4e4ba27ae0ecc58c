// ABOUTME: Data-to-pixel scales shared by the line, bump, bullet and forecast charts.
// ABOUTME: Linear scales with round tick generation, and band scales for categories.

/// Round step (1, 2 or 5 times a power of ten) giving about `count` ticks over `span`
pub fn nice_step(span: f64, count: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let raw = span / count.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    // Exact powers of ten stay on their own step despite float error
    let factor = if normalized <= 1.0 + 1e-9 {
        1.0
    } else if normalized <= 2.0 + 1e-9 {
        2.0
    } else if normalized <= 5.0 + 1e-9 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Continuous mapping from a data domain onto a pixel range.
/// Ranges may be inverted (e.g. y axes where larger values sit higher).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    fn is_degenerate(&self) -> bool {
        (self.domain.1 - self.domain.0).abs() < f64::EPSILON
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Like [`map`](Self::map) but pinned to the ends of the range
    pub fn map_clamped(&self, value: f64) -> f64 {
        let lo = self.domain.0.min(self.domain.1);
        let hi = self.domain.0.max(self.domain.1);
        self.map(value.clamp(lo, hi))
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (r1 - r0).abs() < f64::EPSILON {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Widen the domain outward to multiples of a round step
    pub fn nice(&self, count: usize) -> Self {
        if self.is_degenerate() {
            return *self;
        }
        let (lo, hi) = (
            self.domain.0.min(self.domain.1),
            self.domain.0.max(self.domain.1),
        );
        let step = nice_step(hi - lo, count);
        let lo = (lo / step).floor() * step;
        let hi = (hi / step).ceil() * step;
        let domain = if self.domain.0 <= self.domain.1 {
            (lo, hi)
        } else {
            (hi, lo)
        };
        Self::new(domain, self.range)
    }

    /// Round values inside the domain, ascending
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if self.is_degenerate() {
            return vec![self.domain.0];
        }
        let lo = self.domain.0.min(self.domain.1);
        let hi = self.domain.0.max(self.domain.1);
        let step = nice_step(hi - lo, count);
        let first = (lo / step).ceil() as i64;
        let last = (hi / step + 1e-9).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Evenly divides a pixel range into `count` bands with optional gaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    pub count: usize,
    pub range: (f64, f64),
    /// Fraction of each step left empty, split evenly on both sides
    pub padding: f64,
}

impl BandScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        Self {
            count,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    pub fn step(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.range.1 - self.range.0) / self.count as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    pub fn start(&self, index: usize) -> f64 {
        let step = self.step();
        self.range.0 + step * index as f64 + step * self.padding / 2.0
    }

    pub fn center(&self, index: usize) -> f64 {
        self.range.0 + self.step() * (index as f64 + 0.5)
    }
}
