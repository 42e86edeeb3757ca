//! One entry point for every way a CRS can be written down.

use crate::crs::CrsDefinition;
use crate::epsg::{EpsgCache, normalize_code};
use crate::error::{CrsError, Result};
use crate::proj_string::parse_proj_string;
use crate::projjson::parse_projjson;
use crate::wkt::parse_wkt;

/// The grammar a CRS descriptor is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsFormat {
    Wkt,
    ProjJson,
    ProjString,
    EpsgCode,
}

impl CrsFormat {
    /// Guess the grammar from the text's shape. No parsing happens here.
    pub fn detect(text: &str) -> Option<CrsFormat> {
        let text = text.trim();
        match text.chars().next()? {
            '+' => Some(CrsFormat::ProjString),
            '{' => Some(CrsFormat::ProjJson),
            _ if text.contains('[') || text.contains('(') => Some(CrsFormat::Wkt),
            _ if normalize_code(strip_urn(text)).is_ok() => Some(CrsFormat::EpsgCode),
            _ if text.contains("proj=") => Some(CrsFormat::ProjString),
            _ => None,
        }
    }
}

/// Resolve a CRS given as WKT, WKT2, PROJJSON, a PROJ string, or an EPSG code.
///
/// EPSG codes may be bare digits, `EPSG:<code>`, or an OGC URN such as
/// `urn:ogc:def:crs:EPSG::4326`. Codes outside the built-in set go through `cache`.
pub fn resolve_crs(text: &str, cache: &EpsgCache) -> Result<CrsDefinition> {
    match CrsFormat::detect(text) {
        Some(CrsFormat::Wkt) => parse_wkt(text),
        Some(CrsFormat::ProjJson) => parse_projjson(text),
        Some(CrsFormat::ProjString) => parse_proj_string(text),
        Some(CrsFormat::EpsgCode) => cache.resolve(strip_urn(text.trim())),
        None if text.trim().is_empty() => {
            Err(CrsError::InvalidInput("empty CRS descriptor".to_string()))
        }
        None => Err(CrsError::InvalidInput(format!(
            "`{text}` is not a recognised CRS descriptor"
        ))),
    }
}

fn strip_urn(text: &str) -> &str {
    const URN: &str = "urn:ogc:def:crs:epsg:";
    match text.get(..URN.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(URN) => {
            let rest = &text[URN.len()..];
            // The version segment between the two colons is usually empty.
            rest.rsplit_once(':').map_or(rest, |(_, code)| code)
        }
        _ => text,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::{AxisOrder, CrsKind};
    use crate::epsg::LookupResponse;

    fn offline() -> EpsgCache {
        EpsgCache::new(|_: &str| -> Result<LookupResponse> { Ok(LookupResponse::status(404)) })
    }

    #[test]
    fn detection() {
        assert_eq!(CrsFormat::detect("+proj=longlat"), Some(CrsFormat::ProjString));
        assert_eq!(CrsFormat::detect("proj=longlat"), Some(CrsFormat::ProjString));
        assert_eq!(CrsFormat::detect(" {\"type\": 1}"), Some(CrsFormat::ProjJson));
        assert_eq!(CrsFormat::detect("GEOGCS[\"x\"]"), Some(CrsFormat::Wkt));
        assert_eq!(CrsFormat::detect("EPSG:4326"), Some(CrsFormat::EpsgCode));
        assert_eq!(CrsFormat::detect("32633"), Some(CrsFormat::EpsgCode));
        assert_eq!(
            CrsFormat::detect("urn:ogc:def:crs:EPSG::3857"),
            Some(CrsFormat::EpsgCode)
        );
        assert_eq!(CrsFormat::detect("wgs84"), None);
        assert_eq!(CrsFormat::detect("   "), None);
    }

    #[test]
    fn every_format_resolves() {
        let cache = offline();
        let wkt = resolve_crs(
            r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#,
            &cache,
        )
        .unwrap();
        assert_eq!(wkt.kind, CrsKind::Geographic);

        let proj = resolve_crs("+proj=utm +zone=31 +datum=WGS84", &cache).unwrap();
        assert_eq!(proj.kind, CrsKind::Projected);

        let json = resolve_crs(
            r#"{"type": "GeographicCRS", "name": "WGS 84",
                "datum": {"name": "WGS84", "ellipsoid": {"name": "WGS 84", "semi_major_axis": 6378137, "inverse_flattening": 298.257223563}},
                "coordinate_system": {"subtype": "ellipsoidal", "axis": [
                    {"name": "Lat", "direction": "north", "unit": "degree"},
                    {"name": "Lon", "direction": "east", "unit": "degree"}]},
                "id": {"authority": "EPSG", "code": 4326}}"#,
            &cache,
        )
        .unwrap();
        assert_eq!(json.axis_order, AxisOrder::NorthEast);

        let urn = resolve_crs("urn:ogc:def:crs:EPSG::3857", &cache).unwrap();
        assert_eq!(urn, CrsDefinition::web_mercator());
        assert_eq!(resolve_crs("EPSG:4269", &cache).unwrap(), CrsDefinition::nad83());
    }

    #[test]
    fn unrecognised_descriptors() {
        let cache = offline();
        assert!(matches!(resolve_crs("", &cache), Err(CrsError::InvalidInput(_))));
        assert!(matches!(resolve_crs("wgs84", &cache), Err(CrsError::InvalidInput(_))));
        assert!(matches!(
            resolve_crs("EPSG:2154", &cache),
            Err(CrsError::NotFound { status: 404, .. })
        ));
        assert!(matches!(resolve_crs("INVALID[", &cache), Err(CrsError::Parse(_))));
    }
}
