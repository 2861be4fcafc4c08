use serde_json::{Map, Value};
use tracing::warn;

/// `[longitude, latitude]` in degrees.
pub type LonLat = [f64; 2];

/// Name used when a feature carries no `NOM` property.
pub const DEFAULT_LINE_NAME: &str = "Metro Line";

/// `Unsupported` kind recorded for a feature that could not be read.
pub const MALFORMED_KIND: &str = "malformed";

#[derive(Debug, Clone, PartialEq)]
pub enum TransitGeometry {
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    /// Any other GeoJSON geometry, `null`, or a malformed feature. Kept so callers can skip it.
    Unsupported { kind: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitFeature {
    pub name: Option<String>,
    pub geometry: TransitGeometry,
}

impl TransitFeature {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_LINE_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitCollection {
    pub features: Vec<TransitFeature>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransitParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
}

impl TransitCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, TransitParseError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, TransitParseError> {
        let obj = value
            .as_object()
            .ok_or(TransitParseError::NotAFeatureCollection)?;
        if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(TransitParseError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(TransitParseError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feature = parse_feature(feat_val).unwrap_or_else(|reason| {
                warn!(index, %reason, "malformed transit feature skipped");
                TransitFeature {
                    name: None,
                    geometry: TransitGeometry::Unsupported {
                        kind: MALFORMED_KIND.to_string(),
                    },
                }
            });
            features.push(feature);
        }

        Ok(Self { features })
    }

    /// Total number of line segments across all supported features.
    pub fn segment_count(&self) -> usize {
        self.features
            .iter()
            .map(|f| crate::segments::segments(&f.geometry).len())
            .sum()
    }
}

fn parse_feature(value: &Value) -> Result<TransitFeature, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let name = obj
        .get("properties")
        .and_then(Value::as_object)
        .and_then(display_name);
    let geometry = parse_geometry(obj.get("geometry"))?;
    Ok(TransitFeature { name, geometry })
}

fn display_name(properties: &Map<String, Value>) -> Option<String> {
    match properties.get("NOM")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geometry(value: Option<&Value>) -> Result<TransitGeometry, String> {
    let obj = match value {
        None | Some(Value::Null) => {
            return Ok(TransitGeometry::Unsupported {
                kind: "null".to_string(),
            });
        }
        Some(v) => v
            .as_object()
            .ok_or("geometry must be an object".to_string())?,
    };
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "LineString" => Ok(TransitGeometry::LineString(parse_positions(coordinates(
            obj,
        )?)?)),
        "MultiLineString" => {
            let lines = coordinates(obj)?
                .as_array()
                .ok_or("MultiLineString coordinates must be an array".to_string())?;
            let mut out = Vec::with_capacity(lines.len());
            for line in lines {
                out.push(parse_positions(line)?);
            }
            Ok(TransitGeometry::MultiLineString(out))
        }
        other => Ok(TransitGeometry::Unsupported {
            kind: other.to_string(),
        }),
    }
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value, String> {
    obj.get("coordinates")
        .ok_or("geometry missing coordinates".to_string())
}

fn parse_positions(coords: &Value) -> Result<Vec<LonLat>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

/// Extra members (altitude, measure) are ignored.
fn parse_position(value: &Value) -> Result<LonLat, String> {
    let arr = value
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok([lon, lat])
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_LINE_NAME, MALFORMED_KIND, TransitCollection, TransitGeometry, TransitParseError,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_line_and_multiline_features() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NOM": "Line 1"},
                 "geometry": {"type": "LineString", "coordinates": [[4.30, 50.84], [4.35, 50.85, 12.0]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiLineString", "coordinates": [[[4.3, 50.8], [4.4, 50.9]], [[4.5, 50.8]]]}}
            ]
        }"#;
        let collection = TransitCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].display_name(), "Line 1");
        assert_eq!(
            collection.features[0].geometry,
            TransitGeometry::LineString(vec![[4.30, 50.84], [4.35, 50.85]])
        );
        assert_eq!(collection.features[1].display_name(), DEFAULT_LINE_NAME);
        assert_eq!(collection.segment_count(), 3);
    }

    #[test]
    fn unsupported_and_null_geometries_are_kept_as_unsupported() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [4.3, 50.8]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]}"#;
        let collection = TransitCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(
            collection.features[0].geometry,
            TransitGeometry::Unsupported {
                kind: "Point".to_string()
            }
        );
        assert_eq!(
            collection.features[1].geometry,
            TransitGeometry::Unsupported {
                kind: "null".to_string()
            }
        );
        assert_eq!(collection.segment_count(), 0);
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(matches!(
            TransitCollection::from_geojson_str(r#"{"type": "Feature"}"#),
            Err(TransitParseError::NotAFeatureCollection)
        ));
        assert!(matches!(
            TransitCollection::from_geojson_str("not json"),
            Err(TransitParseError::Json(_))
        ));
        assert!(matches!(
            TransitCollection::from_geojson_str(r#"{"type": "FeatureCollection"}"#),
            Err(TransitParseError::NotAFeatureCollection)
        ));
    }

    #[test]
    fn malformed_features_do_not_hide_valid_lines() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"NOM": "Line 2"},
             "geometry": {"type": "LineString", "coordinates": [[4.33, 50.84], [4.34, 50.85]]}},
            {"type": "Feature", "properties": {"NOM": "Broken"}, "geometry": {"type": "LineString"}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[4.3]]}},
            "not a feature",
            {"type": "Feature", "properties": {"NOM": "Line 6"},
             "geometry": {"type": "MultiLineString", "coordinates": [[[4.31, 50.86], [4.32, 50.87]]]}}
        ]}"#;
        let collection = TransitCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(collection.features.len(), 5);
        for feature in &collection.features[1..4] {
            assert_eq!(
                feature.geometry,
                TransitGeometry::Unsupported {
                    kind: MALFORMED_KIND.to_string()
                }
            );
        }
        assert_eq!(collection.features[0].display_name(), "Line 2");
        assert_eq!(collection.features[4].display_name(), "Line 6");
        assert_eq!(collection.segment_count(), 2);
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        let payload = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"NOM": ""},
             "geometry": {"type": "LineString", "coordinates": [[4.33, 50.84], [4.34, 50.85]]}}
        ]}"#;
        let collection = TransitCollection::from_geojson_str(payload).expect("parse");
        assert_eq!(collection.features[0].name, None);
        assert_eq!(collection.features[0].display_name(), DEFAULT_LINE_NAME);
    }

    #[test]
    fn parses_bundled_metro_asset() {
        let payload = include_str!("../../apps/viewer_web/assets/metro.geojson");
        let collection = TransitCollection::from_geojson_str(payload).expect("parse");
        assert!(!collection.features.is_empty());
        assert!(collection.segment_count() >= collection.features.len());
    }
}
