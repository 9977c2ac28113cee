use siteplan_contracts::{ShardEnvelope, ShardKind};
use siteplan_geo::Geometry;
use tracing::warn;

/// Corridor geometry together with the shard it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub source_shard_id: String,
    pub geometry: Geometry,
}

/// Parse corridor geometries out of `corridor_parameters` shards, in shard
/// order. Shards whose geometry is missing or malformed are skipped.
pub fn extract_corridors(shards: &[ShardEnvelope]) -> Vec<Corridor> {
    shards
        .iter()
        .filter(|shard| shard.is_kind(ShardKind::CorridorParameters))
        .filter_map(|shard| match shard.payload.corridor_geometry() {
            Ok(geometry) => Some(Corridor {
                source_shard_id: shard.shard_id.clone(),
                geometry,
            }),
            Err(err) => {
                warn!(
                    target: "siteplan::planning",
                    shard_id = %shard.shard_id,
                    error = %err,
                    "skipping corridor shard"
                );
                None
            }
        })
        .collect()
}

/// True only when `candidate` lies within every corridor. An empty corridor
/// set admits nothing.
pub fn is_within_all_corridors<'a, I>(candidate: &Geometry, corridors: I) -> bool
where
    I: IntoIterator<Item = &'a Geometry>,
{
    let mut seen = false;
    for corridor in corridors {
        seen = true;
        if !candidate.is_within(corridor) {
            return false;
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainmentPolicy {
    #[default]
    Disabled,
    RequireAllCorridors,
}

impl ContainmentPolicy {
    pub fn from_flag(enforce: bool) -> Self {
        if enforce {
            ContainmentPolicy::RequireAllCorridors
        } else {
            ContainmentPolicy::Disabled
        }
    }

    pub fn admits(self, candidate: &Geometry, corridors: &[Corridor]) -> bool {
        match self {
            ContainmentPolicy::Disabled => true,
            ContainmentPolicy::RequireAllCorridors => {
                is_within_all_corridors(candidate, corridors.iter().map(|c| &c.geometry))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use siteplan_contracts::ShardPayload;
    use siteplan_geo::{Coord, Envelope};

    fn square(min: f64, max: f64) -> Geometry {
        Geometry::Polygon(Envelope::new(min, min, max, max).to_polygon())
    }

    fn corridor_shard(id: &str, payload: serde_json::Value) -> ShardEnvelope {
        ShardEnvelope {
            shard_id: id.into(),
            shard_type: "corridor_parameters".into(),
            schema_ref: "did:example:schema:corridor_parameters:v1".into(),
            grammar_version_id: "g1".into(),
            payload: serde_json::from_value::<ShardPayload>(payload).expect("payload"),
        }
    }

    #[test]
    fn extracts_in_order_and_skips_bad_shards() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
        });
        let shards = vec![
            corridor_shard("c1", json!({ "geometry": polygon })),
            corridor_shard("c2", json!({ "geometry": "not geojson" })),
            corridor_shard("c3", json!({})),
            ShardEnvelope {
                shard_type: "eco_impact_kernel".into(),
                ..corridor_shard("k1", json!({ "geometry": polygon }))
            },
            corridor_shard("c4", json!({ "geometry": { "type": "Point", "coordinates": [0.5, 0.5] } })),
        ];
        let corridors = extract_corridors(&shards);
        let ids: Vec<_> = corridors.iter().map(|c| c.source_shard_id.as_str()).collect();
        assert_eq!(ids, ["c1", "c4"]);
    }

    #[test]
    fn empty_corridor_set_admits_nothing() {
        let candidate = Geometry::Point(Coord::new(0.5, 0.5));
        assert!(!is_within_all_corridors(&candidate, std::iter::empty()));
    }

    #[test]
    fn requires_every_corridor() {
        let candidate = square(2.0, 3.0);
        let wide = square(0.0, 10.0);
        let narrow = square(0.0, 2.5);
        assert!(is_within_all_corridors(&candidate, [&wide]));
        assert!(!is_within_all_corridors(&candidate, [&wide, &narrow]));
    }

    #[test]
    fn policy_switch() {
        let outside = square(20.0, 21.0);
        let corridors = vec![Corridor {
            source_shard_id: "c1".into(),
            geometry: square(0.0, 10.0),
        }];
        assert!(ContainmentPolicy::Disabled.admits(&outside, &corridors));
        assert!(!ContainmentPolicy::from_flag(true).admits(&outside, &corridors));
        assert!(ContainmentPolicy::from_flag(true).admits(&square(1.0, 2.0), &corridors));
        assert_eq!(ContainmentPolicy::from_flag(false), ContainmentPolicy::Disabled);
    }
}
