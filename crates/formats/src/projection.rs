use std::fmt;

/// An EPSG coordinate reference system identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Epsg(pub u32);

pub const EPSG_WGS84: Epsg = Epsg(4326);
pub const EPSG_WEB_MERCATOR: Epsg = Epsg(3857);
pub const EPSG_UTM_ZONE_13N: Epsg = Epsg(32613);

/// Geographic CRS used whenever no hint matches or none was supplied.
pub const DEFAULT_PROJECTION: Epsg = EPSG_WGS84;

impl Epsg {
    pub fn code(self) -> u32 {
        self.0
    }

    /// Geographic CRSes carry coordinates in degrees; the transform layer
    /// must feed them to proj as radians.
    pub fn is_geographic(self) -> bool {
        self.0 == 4326
    }

    /// proj4 definition string for the codes the viewer can act on.
    pub fn proj_definition(self) -> Option<&'static str> {
        match self.0 {
            4326 => Some("+proj=longlat +datum=WGS84 +no_defs"),
            3857 => Some(
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 \
                 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
            ),
            32613 => Some("+proj=utm +zone=13 +datum=WGS84 +units=m +no_defs"),
            _ => None,
        }
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Match rules for `.prj` text content. Substring match, first hit wins.
///
/// Deliberately independent from `GEOJSON_CRS_RULES`: the two hint sources
/// resolve through separate tables and must never be silently unified.
pub const PRJ_CONTENT_RULES: &[(&str, Epsg)] = &[("WGS_1984_UTM_Zone_13N", EPSG_UTM_ZONE_13N)];

/// Match rules for GeoJSON `crs.properties.name` values.
pub const GEOJSON_CRS_RULES: &[(&str, Epsg)] = &[
    ("EPSG:4326", EPSG_WGS84),
    ("WGS_1984_UTM_Zone_13N", EPSG_UTM_ZONE_13N),
];

/// Resolves a `.prj` file's textual content to a source projection.
/// Total: unknown or absent content yields the default.
pub fn resolve_prj_hint(hint: Option<&str>) -> Epsg {
    resolve(hint, PRJ_CONTENT_RULES)
}

/// Resolves a GeoJSON CRS name to a source projection. Total.
pub fn resolve_geojson_hint(hint: Option<&str>) -> Epsg {
    resolve(hint, GEOJSON_CRS_RULES)
}

fn resolve(hint: Option<&str>, rules: &[(&str, Epsg)]) -> Epsg {
    hint.and_then(|text| {
        rules
            .iter()
            .find(|(token, _)| text.contains(token))
            .map(|(_, epsg)| *epsg)
    })
    .unwrap_or(DEFAULT_PROJECTION)
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_PROJECTION, EPSG_UTM_ZONE_13N, EPSG_WGS84, Epsg, resolve_geojson_hint,
        resolve_prj_hint,
    };

    #[test]
    fn prj_table_matches_utm_token_inside_wkt() {
        let wkt = r#"PROJCS["WGS_1984_UTM_Zone_13N",GEOGCS["GCS_WGS_1984"]]"#;
        assert_eq!(resolve_prj_hint(Some(wkt)), EPSG_UTM_ZONE_13N);
    }

    #[test]
    fn prj_table_defaults_on_unknown_content() {
        assert_eq!(resolve_prj_hint(Some("LOCAL_CS[\"unknown\"]")), DEFAULT_PROJECTION);
        assert_eq!(resolve_prj_hint(None), DEFAULT_PROJECTION);
    }

    #[test]
    fn geojson_table_matches_epsg_and_utm_tokens() {
        assert_eq!(
            resolve_geojson_hint(Some("urn:ogc:def:crs:EPSG:4326")),
            EPSG_WGS84
        );
        assert_eq!(
            resolve_geojson_hint(Some("WGS_1984_UTM_Zone_13N")),
            EPSG_UTM_ZONE_13N
        );
        assert_eq!(resolve_geojson_hint(None), DEFAULT_PROJECTION);
    }

    #[test]
    fn prj_table_does_not_know_geojson_only_tokens() {
        // "EPSG:4326" is only a GeoJSON-side token; through the .prj table it
        // falls back to the default (which happens to be the same code).
        assert_eq!(resolve_prj_hint(Some("EPSG:4326")), DEFAULT_PROJECTION);
    }

    #[test]
    fn display_and_definitions() {
        assert_eq!(EPSG_UTM_ZONE_13N.to_string(), "EPSG:32613");
        assert!(EPSG_WGS84.is_geographic());
        assert!(!EPSG_UTM_ZONE_13N.is_geographic());
        assert!(Epsg(9999).proj_definition().is_none());
    }
}
