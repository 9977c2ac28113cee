use crate::geometry::{Coord, Polygon};

/// Axis-aligned bounding envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    /// Smallest envelope holding every coordinate; `None` when the iterator is empty.
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let seed = Self::new(first.x, first.y, first.x, first.y);
        Some(iter.fold(seed, |env, c| Self {
            min_x: env.min_x.min(c.x),
            min_y: env.min_y.min(c.y),
            max_x: env.max_x.max(c.x),
            max_y: env.max_y.max(c.y),
        }))
    }

    pub fn merge(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centre(&self) -> Coord {
        Coord::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Scale both sides by `factor` around the centre.
    pub fn scaled(&self, factor: f64) -> Envelope {
        let centre = self.centre();
        let half_w = self.width() * factor / 2.0;
        let half_h = self.height() * factor / 2.0;
        Envelope::new(
            centre.x - half_w,
            centre.y - half_h,
            centre.x + half_w,
            centre.y + half_h,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Envelope {
        Envelope::new(
            self.min_x + dx,
            self.min_y + dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Counter-clockwise rectangle covering the envelope.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_ring_unchecked(vec![
            Coord::new(self.min_x, self.min_y),
            Coord::new(self.max_x, self.min_y),
            Coord::new(self.max_x, self.max_y),
            Coord::new(self.min_x, self.max_y),
            Coord::new(self.min_x, self.min_y),
        ])
    }
}
