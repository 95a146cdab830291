use serde_json::{Map, Value};

/// A coordinate pair in the source projection. Depending on the CRS these
/// are degrees (geographic) or meters (projected); the reprojector decides.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceGeometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: SourceGeometry,
}

/// Decoded features tagged with the CRS name the payload declared, if any.
///
/// `crs_name` comes from the non-standard GeoJSON `crs.properties.name`
/// member and feeds the GeoJSON-side projection hint table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs_name: Option<String>,
}

#[derive(Debug)]
pub enum FeatureSetError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSetError::NotAFeatureCollection => {
                write!(f, "expected a GeoJSON FeatureCollection")
            }
            FeatureSetError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureSetError {}

impl FeatureCollection {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureSetError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| FeatureSetError::InvalidFeature {
                index: 0,
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, FeatureSetError> {
        let obj = value
            .as_object()
            .filter(|obj| obj.get("type").and_then(Value::as_str) == Some("FeatureCollection"))
            .ok_or(FeatureSetError::NotAFeatureCollection)?;

        let crs_name = obj
            .get("crs")
            .and_then(|crs| crs.get("properties"))
            .and_then(|props| props.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        let feature_values = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(FeatureSetError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(feature_values.len());
        for (index, feature_value) in feature_values.iter().enumerate() {
            let feature = parse_feature(feature_value)
                .map_err(|reason| FeatureSetError::InvalidFeature { index, reason })?;
            features.push(feature);
        }

        Ok(Self { features, crs_name })
    }

    /// Semantic round-trip exporter: geometry, properties, and the declared
    /// CRS name survive; JSON key ordering may differ from the input.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("type".into(), Value::String("FeatureCollection".into()));

        if let Some(name) = &self.crs_name {
            let mut props = Map::new();
            props.insert("name".into(), Value::String(name.clone()));
            let mut crs = Map::new();
            crs.insert("type".into(), Value::String("name".into()));
            crs.insert("properties".into(), Value::Object(props));
            root.insert("crs".into(), Value::Object(crs));
        }

        let features = self
            .features
            .iter()
            .map(|feature| {
                let mut obj = Map::new();
                obj.insert("type".into(), Value::String("Feature".into()));
                if let Some(id) = &feature.id {
                    obj.insert("id".into(), Value::String(id.clone()));
                }
                obj.insert("properties".into(), Value::Object(feature.properties.clone()));
                obj.insert("geometry".into(), geometry_to_value(&feature.geometry));
                Value::Object(obj)
            })
            .collect();
        root.insert("features".into(), Value::Array(features));

        Value::Object(root)
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_geojson_value())
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let geometry = obj.get("geometry").ok_or("feature missing geometry")?;
    let geometry = parse_geometry(geometry)?;

    Ok(Feature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<SourceGeometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = obj.get("coordinates").ok_or("geometry missing coordinates")?;

    match kind {
        "Point" => Ok(SourceGeometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(SourceGeometry::MultiPoint(parse_ring(coords)?)),
        "LineString" => Ok(SourceGeometry::LineString(parse_ring(coords)?)),
        "MultiLineString" => Ok(SourceGeometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(SourceGeometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array")?;
            polys
                .iter()
                .map(parse_rings)
                .collect::<Result<Vec<_>, _>>()
                .map(SourceGeometry::MultiPolygon)
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(value: &Value) -> Result<GeoPoint, String> {
    let arr = value.as_array().ok_or("position must be an array")?;
    if arr.len() < 2 {
        return Err("position must have at least [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("position x must be a number")?;
    let y = arr[1].as_f64().ok_or("position y must be a number")?;
    Ok(GeoPoint::new(x, y))
}

fn parse_ring(value: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = value.as_array().ok_or("coordinates must be an array")?;
    arr.iter().map(parse_position).collect()
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let arr = value.as_array().ok_or("coordinates must be an array of rings")?;
    arr.iter().map(parse_ring).collect()
}

fn geometry_to_value(geometry: &SourceGeometry) -> Value {
    let (kind, coordinates) = match geometry {
        SourceGeometry::Point(p) => ("Point", position_value(p)),
        SourceGeometry::MultiPoint(ps) => ("MultiPoint", ring_value(ps)),
        SourceGeometry::LineString(ps) => ("LineString", ring_value(ps)),
        SourceGeometry::MultiLineString(lines) => ("MultiLineString", rings_value(lines)),
        SourceGeometry::Polygon(rings) => ("Polygon", rings_value(rings)),
        SourceGeometry::MultiPolygon(polys) => (
            "MultiPolygon",
            Value::Array(polys.iter().map(|rings| rings_value(rings)).collect()),
        ),
    };

    let mut obj = Map::new();
    obj.insert("type".into(), Value::String(kind.into()));
    obj.insert("coordinates".into(), coordinates);
    Value::Object(obj)
}

fn position_value(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.x), Value::from(p.y)])
}

fn ring_value(points: &[GeoPoint]) -> Value {
    Value::Array(points.iter().map(position_value).collect())
}

fn rings_value(rings: &[Vec<GeoPoint>]) -> Value {
    Value::Array(rings.iter().map(|ring| ring_value(ring)).collect())
}

#[cfg(test)]
mod tests {
    use super::{FeatureCollection, FeatureSetError, GeoPoint, SourceGeometry};

    const POINTS: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "WGS_1984_UTM_Zone_13N"}},
        "features": [
            {"type": "Feature", "id": 7, "properties": {"name": "a"},
             "geometry": {"type": "Point", "coordinates": [-106.3, 35.9]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString",
                          "coordinates": [[-106.0, 35.0], [-105.5, 35.5]]}}
        ]
    }"#;

    #[test]
    fn parses_features_and_crs_name() {
        let fc = FeatureCollection::from_geojson_str(POINTS).expect("parse collection");
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.crs_name.as_deref(), Some("WGS_1984_UTM_Zone_13N"));
        assert_eq!(fc.features[0].id.as_deref(), Some("7"));
        assert_eq!(
            fc.features[0].geometry,
            SourceGeometry::Point(GeoPoint::new(-106.3, 35.9))
        );
    }

    #[test]
    fn missing_crs_member_is_none() {
        let fc = FeatureCollection::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": []}"#,
        )
        .expect("parse collection");
        assert!(fc.crs_name.is_none());
        assert!(fc.is_empty());
    }

    #[test]
    fn rejects_non_feature_collections() {
        let err = FeatureCollection::from_geojson_str(r#"{"type": "Feature"}"#)
            .expect_err("expect rejection");
        assert!(matches!(err, FeatureSetError::NotAFeatureCollection));
    }

    #[test]
    fn reports_invalid_feature_index() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [0, 0]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Blob", "coordinates": []}}
            ]
        }"#;
        let err = FeatureCollection::from_geojson_str(payload).expect_err("expect rejection");
        match err {
            FeatureSetError::InvalidFeature { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("Blob"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn round_trips_crs_and_geometry() {
        let fc = FeatureCollection::from_geojson_str(POINTS).expect("parse collection");
        let value = fc.to_geojson_value();
        let back = FeatureCollection::from_geojson_value(&value).expect("reparse");
        assert_eq!(back, fc);
    }
}
