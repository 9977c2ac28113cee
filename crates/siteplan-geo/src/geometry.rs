use serde::{Deserialize, Serialize};

use crate::{Envelope, GeoError};

/// Tolerance for boundary tests on the plane.
const EPSILON: f64 = 1e-12;

/// A planar position. Serialized as a GeoJSON `[x, y]` position; extra
/// ordinates (altitude) are accepted and dropped on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl TryFrom<Vec<f64>> for Coord {
    type Error = GeoError;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        match raw.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord::new(*x, *y)),
            _ => Err(GeoError::InvalidPosition(raw)),
        }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

/// Polygon with one exterior ring and optional holes. Rings are closed
/// (first position repeated last) and hold at least four positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<Coord>,
    interiors: Vec<Vec<Coord>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Coord>, interiors: Vec<Vec<Coord>>) -> Result<Self, GeoError> {
        check_ring(&exterior)?;
        for ring in &interiors {
            check_ring(ring)?;
        }
        Ok(Self {
            exterior,
            interiors,
        })
    }

    /// Build from rings in GeoJSON order: exterior first, then holes.
    pub fn from_rings(mut rings: Vec<Vec<Coord>>) -> Result<Self, GeoError> {
        if rings.is_empty() {
            return Err(GeoError::MissingExterior);
        }
        let exterior = rings.remove(0);
        Self::new(exterior, rings)
    }

    pub(crate) fn from_ring_unchecked(exterior: Vec<Coord>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    pub fn exterior(&self) -> &[Coord] {
        &self.exterior
    }

    pub fn interiors(&self) -> &[Vec<Coord>] {
        &self.interiors
    }

    pub(crate) fn rings(&self) -> impl Iterator<Item = &Vec<Coord>> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    pub fn area(&self) -> f64 {
        let holes: f64 = self.interiors.iter().map(|r| ring_area(r).abs()).sum();
        (ring_area(&self.exterior).abs() - holes).max(0.0)
    }

    pub fn envelope(&self) -> Envelope {
        // check_ring guarantees a non-empty exterior
        Envelope::from_coords(self.exterior.iter().copied())
            .unwrap_or_else(|| Envelope::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Ray-casting test against the exterior minus holes. Points exactly on
    /// an edge may land on either side; use [`Polygon::on_boundary`] to
    /// disambiguate.
    pub fn contains_point(&self, p: Coord) -> bool {
        ring_contains(&self.exterior, p) && !self.interiors.iter().any(|h| ring_contains(h, p))
    }

    pub fn on_boundary(&self, p: Coord) -> bool {
        self.edges().any(|(a, b)| on_segment(p, a, b))
    }

    /// Interior or boundary.
    pub fn covers_point(&self, p: Coord) -> bool {
        self.on_boundary(p) || self.contains_point(p)
    }

    /// True when `other` lies inside this polygon. Every vertex must be
    /// covered, each edge piece between contacts with our boundary must have
    /// a covered midpoint, an interior sample of `other` must be covered, and
    /// none of our holes may poke into it.
    pub fn covers_polygon(&self, other: &Polygon) -> bool {
        if !other.exterior.iter().all(|c| self.covers_point(*c)) {
            return false;
        }
        let edges_covered = other.edges().all(|(a, b)| {
            self.split_params(a, b)
                .windows(2)
                .filter(|w| w[1] - w[0] > EPSILON)
                .all(|w| self.covers_point(lerp(a, b, (w[0] + w[1]) / 2.0)))
        });
        if !edges_covered {
            return false;
        }
        match other.interior_sample() {
            Some(p) if self.covers_point(p) => {}
            _ => return false,
        }
        !self
            .interiors
            .iter()
            .any(|hole| hole.iter().any(|c| other.contains_point(*c) && !other.on_boundary(*c)))
    }

    /// Sorted parameters along `a..b` where it meets one of our edges,
    /// including both ends.
    fn split_params(&self, a: Coord, b: Coord) -> Vec<f64> {
        let mut params = vec![0.0, 1.0];
        for (c, d) in self.edges() {
            for v in [c, d] {
                if on_segment(v, a, b) {
                    params.push(param_along(v, a, b));
                }
            }
            if segments_cross(a, b, c, d) {
                let oa = orientation(c, d, a);
                let ob = orientation(c, d, b);
                params.push(oa / (oa - ob));
            }
        }
        params.retain(|t| (0.0..=1.0).contains(t));
        params.sort_by(f64::total_cmp);
        params.dedup_by(|x, y| (*x - *y).abs() <= EPSILON);
        params
    }

    /// A point strictly inside the polygon: the midpoint of the first span
    /// cut by a horizontal line between the two lowest distinct vertex rows.
    fn interior_sample(&self) -> Option<Coord> {
        let mut ys: Vec<f64> = self.exterior.iter().map(|c| c.y).collect();
        ys.sort_by(f64::total_cmp);
        ys.dedup_by(|x, y| (*x - *y).abs() <= EPSILON);
        let y = match ys.as_slice() {
            [lo, next, ..] => (lo + next) / 2.0,
            _ => return None,
        };
        let mut xs: Vec<f64> = self
            .edges()
            .filter(|(a, b)| (a.y > y) != (b.y > y))
            .map(|(a, b)| a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
            .collect();
        xs.sort_by(f64::total_cmp);
        match xs.as_slice() {
            [x0, x1, ..] if x1 - x0 > EPSILON => Some(Coord::new((x0 + x1) / 2.0, y)),
            _ => None,
        }
    }

    fn edges(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.rings()
            .flat_map(|ring| ring.windows(2).map(|w| (w[0], w[1])))
    }
}

/// Geometry values understood by the planner.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Geometry::Point(_) => 0.0,
            Geometry::Polygon(p) => p.area(),
            Geometry::MultiPolygon(parts) => parts.iter().map(Polygon::area).sum(),
        }
    }

    /// Bounding envelope; `None` only for an empty multi-polygon.
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            Geometry::Point(c) => Some(Envelope::new(c.x, c.y, c.x, c.y)),
            Geometry::Polygon(p) => Some(p.envelope()),
            Geometry::MultiPolygon(parts) => parts
                .iter()
                .map(Polygon::envelope)
                .reduce(|a, b| a.merge(&b)),
        }
    }

    /// `self` lies within `container`. Points on a boundary are not within;
    /// areal geometries may touch the container boundary from inside.
    pub fn is_within(&self, container: &Geometry) -> bool {
        match (self, container) {
            (Geometry::Point(p), Geometry::Point(q)) => p == q,
            (_, Geometry::Point(_)) => false,
            (Geometry::Point(p), Geometry::Polygon(c)) => point_within(*p, c),
            (Geometry::Point(p), Geometry::MultiPolygon(cs)) => {
                cs.iter().any(|c| point_within(*p, c))
            }
            (Geometry::Polygon(a), Geometry::Polygon(c)) => c.covers_polygon(a),
            (Geometry::Polygon(a), Geometry::MultiPolygon(cs)) => {
                cs.iter().any(|c| c.covers_polygon(a))
            }
            (Geometry::MultiPolygon(parts), _) => {
                !parts.is_empty()
                    && parts
                        .iter()
                        .all(|p| Geometry::Polygon(p.clone()).is_within(container))
            }
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

impl From<Coord> for Geometry {
    fn from(c: Coord) -> Self {
        Geometry::Point(c)
    }
}

fn point_within(p: Coord, polygon: &Polygon) -> bool {
    polygon.contains_point(p) && !polygon.on_boundary(p)
}

fn check_ring(ring: &[Coord]) -> Result<(), GeoError> {
    if ring.len() < 4 {
        return Err(GeoError::ShortRing(ring.len()));
    }
    if ring.first() != ring.last() {
        return Err(GeoError::UnclosedRing);
    }
    Ok(())
}

/// Signed shoelace area of a closed ring.
fn ring_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

fn ring_contains(ring: &[Coord], p: Coord) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn orientation(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: Coord, a: Coord, b: Coord) -> bool {
    if orientation(a, b, p).abs() > EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

fn lerp(a: Coord, b: Coord, t: f64) -> Coord {
    Coord::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Position of `p` along `a..b` as a fraction of its length.
fn param_along(p: Coord, a: Coord, b: Coord) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= EPSILON {
        return 0.0;
    }
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2
}

/// Proper crossing: the segments intersect at a single interior point of both.
fn segments_cross(a: Coord, b: Coord, c: Coord, d: Coord) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < -EPSILON && o3 * o4 < -EPSILON
}
