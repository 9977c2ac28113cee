//! Eco-impact scoring.
//!
//! Sprawl reduction compares a candidate's area with a baseline footprint.
//! The eco-impact score maps that reduction onto [0, 1], saturating at the
//! nominal governance threshold.

use siteplan_geo::Geometry;

/// Baseline stand-in when no baseline geometry is supplied.
pub const SYNTHETIC_BASELINE_FACTOR: f64 = 1.12;
/// Sprawl reduction (percent) at which the eco-impact score reaches 1.0.
pub const SATURATION_PERCENT: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactScore {
    pub eco_impact_score: f64,
    pub sprawl_reduction_percent: f64,
    pub candidate_area: f64,
    pub baseline_area: f64,
}

pub trait ImpactScorer: Send + Sync {
    fn score(&self, candidate: &Geometry, baseline: Option<&Geometry>) -> ImpactScore;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SprawlReductionScorer;

impl ImpactScorer for SprawlReductionScorer {
    fn score(&self, candidate: &Geometry, baseline: Option<&Geometry>) -> ImpactScore {
        let candidate_area = candidate.area();
        let baseline_area = baseline
            .map(Geometry::area)
            .unwrap_or(candidate_area * SYNTHETIC_BASELINE_FACTOR);

        if baseline_area <= 0.0 {
            return ImpactScore {
                eco_impact_score: 0.0,
                sprawl_reduction_percent: 0.0,
                candidate_area,
                baseline_area,
            };
        }

        let sprawl_reduction_percent = (baseline_area - candidate_area) / baseline_area * 100.0;
        ImpactScore {
            eco_impact_score: eco_impact_from_sprawl(sprawl_reduction_percent),
            sprawl_reduction_percent,
            candidate_area,
            baseline_area,
        }
    }
}

/// 0 for no reduction, otherwise `0.5 + sprawl / 24` capped at 1.0.
pub fn eco_impact_from_sprawl(sprawl_reduction_percent: f64) -> f64 {
    if sprawl_reduction_percent <= 0.0 {
        return 0.0;
    }
    (0.5 + sprawl_reduction_percent / (2.0 * SATURATION_PERCENT)).min(1.0)
}
