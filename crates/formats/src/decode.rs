use std::fmt;
use std::io::Cursor;

use serde_json::{Map, Value};
use shapefile::dbase;

use crate::feature_set::{Feature, FeatureCollection, GeoPoint, SourceGeometry};

/// Binary parse failure from the decoding library. Recoverable: the upload
/// is abandoned, the map stays as it was.
#[derive(Debug)]
pub enum DecodeError {
    Shp(shapefile::Error),
    Dbf(dbase::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Shp(err) => write!(f, "shapefile decode error: {err}"),
            DecodeError::Dbf(err) => write!(f, "attribute table decode error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes a `.shp` geometry stream paired with its `.dbf` attribute table.
///
/// Null shapes carry no geometry and are skipped; a file of only null
/// shapes therefore decodes to an empty collection.
pub fn decode(shp_bytes: &[u8], dbf_bytes: &[u8]) -> Result<FeatureCollection, DecodeError> {
    let shape_reader =
        shapefile::ShapeReader::new(Cursor::new(shp_bytes)).map_err(DecodeError::Shp)?;
    let dbase_reader = dbase::Reader::new(Cursor::new(dbf_bytes)).map_err(DecodeError::Dbf)?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

    let mut features = Vec::new();
    for entry in reader.iter_shapes_and_records() {
        let (shape, record) = entry.map_err(DecodeError::Shp)?;
        let Some(geometry) = shape_to_geometry(shape) else {
            continue;
        };
        features.push(Feature {
            id: None,
            properties: record_to_properties(record),
            geometry,
        });
    }

    Ok(FeatureCollection {
        features,
        crs_name: None,
    })
}

/// Single-file path: a bare `.shp` with no attribute table.
///
/// Sibling `.dbf`/`.prj` files are deliberately not collected here; the
/// features come back with empty property maps and no CRS metadata.
pub fn decode_shp_only(shp_bytes: &[u8]) -> Result<FeatureCollection, DecodeError> {
    let reader = shapefile::ShapeReader::new(Cursor::new(shp_bytes)).map_err(DecodeError::Shp)?;
    let shapes = reader.read().map_err(DecodeError::Shp)?;

    let features = shapes
        .into_iter()
        .filter_map(shape_to_geometry)
        .map(|geometry| Feature {
            id: None,
            properties: Map::new(),
            geometry,
        })
        .collect();

    Ok(FeatureCollection {
        features,
        crs_name: None,
    })
}

fn shape_to_geometry(shape: shapefile::Shape) -> Option<SourceGeometry> {
    let geometry = geo_types::Geometry::<f64>::try_from(shape).ok()?;
    match geometry {
        geo_types::Geometry::Point(p) => Some(SourceGeometry::Point(coord(p.0))),
        geo_types::Geometry::MultiPoint(mp) => Some(SourceGeometry::MultiPoint(
            mp.into_iter().map(|p| coord(p.0)).collect(),
        )),
        geo_types::Geometry::LineString(line) => {
            Some(SourceGeometry::LineString(line_points(line)))
        }
        geo_types::Geometry::MultiLineString(mls) => Some(SourceGeometry::MultiLineString(
            mls.into_iter().map(line_points).collect(),
        )),
        geo_types::Geometry::Polygon(poly) => Some(SourceGeometry::Polygon(polygon_rings(poly))),
        geo_types::Geometry::MultiPolygon(mp) => Some(SourceGeometry::MultiPolygon(
            mp.into_iter().map(polygon_rings).collect(),
        )),
        _ => None,
    }
}

fn coord(c: geo_types::Coord<f64>) -> GeoPoint {
    GeoPoint::new(c.x, c.y)
}

fn line_points(line: geo_types::LineString<f64>) -> Vec<GeoPoint> {
    line.into_iter().map(coord).collect()
}

fn polygon_rings(poly: geo_types::Polygon<f64>) -> Vec<Vec<GeoPoint>> {
    let (exterior, interiors) = poly.into_inner();
    let mut rings = Vec::with_capacity(1 + interiors.len());
    rings.push(line_points(exterior));
    rings.extend(interiors.into_iter().map(line_points));
    rings
}

fn record_to_properties(record: dbase::Record) -> Map<String, Value> {
    let mut properties = Map::new();
    for (name, value) in record {
        properties.insert(name, field_value_to_json(value));
    }
    properties
}

fn field_value_to_json(value: dbase::FieldValue) -> Value {
    use dbase::FieldValue;
    match value {
        FieldValue::Character(Some(s)) => Value::String(s),
        FieldValue::Numeric(Some(n)) => Value::from(n),
        FieldValue::Float(Some(n)) => Value::from(f64::from(n)),
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Double(n) => Value::from(n),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        FieldValue::Date(Some(d)) => {
            Value::String(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        // Absent values and exotic field types flatten to null.
        _ => Value::Null,
    }
}
