//! Nearby medical facilities from Overpass results.
//!
//! Only the data side lives here: turning an already-fetched Overpass JSON document into
//! distance-sorted [`Place`] records. Querying Overpass and drawing maps are left to the front
//! end.

use crate::constants::EARTH_RADIUS_KM;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_PLACE_NAME: &str = "Clinic / Medical";
const DEFAULT_PLACE_KIND: &str = "medical";
const NAME_TAGS: &[&str] = &["name", "healthcare", "operator"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Extracts places from an Overpass `out center` document, nearest first.
///
/// Nodes carry `lat`/`lon` directly; ways and relations carry them under `center`. Elements
/// with neither are skipped.
pub fn places_from_overpass(document: &Value, origin: Coordinates) -> Vec<Place> {
    let Some(elements) = document.get("elements").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut places: Vec<Place> = elements
        .iter()
        .filter_map(|element| {
            let position = element_position(element)?;
            let tags = element.get("tags");
            let tag = |key: &str| {
                tags.and_then(|t| t.get(key))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            };

            let name = NAME_TAGS
                .iter()
                .find_map(|key| tag(*key))
                .unwrap_or(DEFAULT_PLACE_NAME);
            let kind = tag("amenity").unwrap_or(DEFAULT_PLACE_KIND);

            Some(Place {
                name: name.to_owned(),
                kind: kind.to_owned(),
                lat: position.lat,
                lon: position.lon,
                distance_km: haversine_km(origin, position),
            })
        })
        .collect();

    places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    places
}

fn element_position(element: &Value) -> Option<Coordinates> {
    let read = |v: &Value| {
        Some(Coordinates::new(
            v.get("lat")?.as_f64()?,
            v.get("lon")?.as_f64()?,
        ))
    };
    read(element).or_else(|| element.get("center").and_then(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn haversine_matches_known_distance() {
        // London to Paris is roughly 344 km.
        let london = Coordinates::new(51.5074, -0.1278);
        let paris = Coordinates::new(48.8566, 2.3522);
        let d = haversine_km(london, paris);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
        assert_eq!(haversine_km(london, london), 0.0);
    }

    #[test]
    fn places_are_sorted_nearest_first() {
        let origin = Coordinates::new(0.0, 0.0);
        let doc = json!({
            "elements": [
                {"type": "node", "lat": 0.05, "lon": 0.0, "tags": {"amenity": "hospital", "name": "Far"}},
                {"type": "way", "center": {"lat": 0.01, "lon": 0.0}, "tags": {"amenity": "pharmacy", "operator": "Chain"}},
                {"type": "node", "lat": 0.02, "lon": 0.0},
            ]
        });

        let places = places_from_overpass(&doc, origin);
        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Chain", "Clinic / Medical", "Far"]);
        assert_eq!(places[0].kind, "pharmacy");
        assert_eq!(places[1].kind, "medical");
        assert!(places[0].distance_km < places[1].distance_km);
    }

    #[test]
    fn name_tag_priority() {
        let doc = json!({"elements": [
            {"lat": 1.0, "lon": 1.0, "tags": {"operator": "Op", "healthcare": "clinic", "name": ""}}
        ]});
        let places = places_from_overpass(&doc, Coordinates::new(1.0, 1.0));
        assert_eq!(places[0].name, "clinic");
    }

    #[test]
    fn elements_without_coordinates_are_skipped() {
        let doc = json!({"elements": [{"type": "relation", "tags": {"name": "Nowhere"}}]});
        assert!(places_from_overpass(&doc, Coordinates::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn missing_elements_yields_nothing() {
        assert!(places_from_overpass(&json!({}), Coordinates::new(0.0, 0.0)).is_empty());
        assert!(places_from_overpass(&json!([]), Coordinates::new(0.0, 0.0)).is_empty());
    }
}
