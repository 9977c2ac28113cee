//! Candidate site generation.
//!
//! Strategies here are placeholders: they anchor candidates on the corridor's
//! bounding envelope rather than running a real siting algorithm. Anything
//! implementing [`CandidateGenerator`] can replace them.

use siteplan_geo::{Coord, Geometry};

use crate::config::{CandidateConfig, CandidateStrategy};

pub const DEFAULT_OFFSET_DELTA: f64 = 0.001;
pub const DEFAULT_FOOTPRINT_AREA_RATIO: f64 = 0.8;

/// Produces candidate geometries for one corridor. Implementations must be
/// deterministic: the same corridor yields the same sequence.
pub trait CandidateGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, corridor: &Geometry) -> Vec<Geometry>;
}

/// Envelope centroid plus a second point shifted by `offset_delta` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidPointGenerator {
    pub offset_delta: f64,
}

impl Default for CentroidPointGenerator {
    fn default() -> Self {
        Self {
            offset_delta: DEFAULT_OFFSET_DELTA,
        }
    }
}

impl CandidateGenerator for CentroidPointGenerator {
    fn name(&self) -> &'static str {
        "centroid_points"
    }

    fn generate(&self, corridor: &Geometry) -> Vec<Geometry> {
        let Some(envelope) = corridor.envelope() else {
            return Vec::new();
        };
        let centre = envelope.centre();
        vec![
            Geometry::Point(centre),
            Geometry::Point(Coord::new(
                centre.x + self.offset_delta,
                centre.y + self.offset_delta,
            )),
        ]
    }
}

/// Two rectangular footprints, each covering `area_ratio` of the corridor
/// envelope: one centred on the envelope, one shifted by `offset_delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeFootprintGenerator {
    pub offset_delta: f64,
    pub area_ratio: f64,
}

impl Default for EnvelopeFootprintGenerator {
    fn default() -> Self {
        Self {
            offset_delta: DEFAULT_OFFSET_DELTA,
            area_ratio: DEFAULT_FOOTPRINT_AREA_RATIO,
        }
    }
}

impl CandidateGenerator for EnvelopeFootprintGenerator {
    fn name(&self) -> &'static str {
        "envelope_footprint"
    }

    fn generate(&self, corridor: &Geometry) -> Vec<Geometry> {
        let Some(envelope) = corridor.envelope() else {
            return Vec::new();
        };
        let footprint = envelope.scaled(self.area_ratio.sqrt());
        let shifted = footprint.translated(self.offset_delta, self.offset_delta);
        vec![
            Geometry::Polygon(footprint.to_polygon()),
            Geometry::Polygon(shifted.to_polygon()),
        ]
    }
}

pub fn generator_for(cfg: &CandidateConfig) -> Box<dyn CandidateGenerator> {
    match cfg.strategy {
        CandidateStrategy::EnvelopeFootprint => Box::new(EnvelopeFootprintGenerator {
            offset_delta: cfg.offset_delta,
            area_ratio: cfg.footprint_area_ratio,
        }),
        CandidateStrategy::CentroidPoints => Box::new(CentroidPointGenerator {
            offset_delta: cfg.offset_delta,
        }),
    }
}
