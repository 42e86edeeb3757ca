use std::collections::BTreeMap;

use super::sexpr::SemanticObject;
use crate::crs::{
    AxisOrder, CrsDefinition, CrsKind, DEG_TO_RAD, DatumShift, Ellipsoid, Parameter,
    ProjectionDef, unit_factor_by_name,
};
use crate::datum::helmert_from_parameters;
use crate::error::{CrsError, Result};
use crate::projection::Method;

const GEOGRAPHIC_TAGS: [&str; 7] = [
    "GEOGCS",
    "GEOGCRS",
    "GEODCRS",
    "BASEGEOGCRS",
    "BASEGEODCRS",
    "GEOGRAPHICCRS",
    "GEODETICCRS",
];
const HORIZONTAL_TAGS: [&str; 8] = [
    "PROJCS",
    "PROJCRS",
    "PROJECTEDCRS",
    "GEOGCS",
    "GEOGCRS",
    "GEODCRS",
    "GEOGRAPHICCRS",
    "BOUNDCRS",
];
const UNIT_TAGS: [&str; 4] = ["ANGLEUNIT", "LENGTHUNIT", "SCALEUNIT", "UNIT"];

/// Reduce a structured WKT object to the canonical CRS model.
///
/// The object's own tag selects the rule set: geographic, projected, compound (horizontal
/// component only), bound (source CRS plus its abridged Helmert transformation) or
/// geocentric.
pub fn normalize(obj: &SemanticObject) -> Result<CrsDefinition> {
    let def = crs(obj)?;
    def.validate()?;
    Ok(def)
}

fn crs(obj: &SemanticObject) -> Result<CrsDefinition> {
    match obj.tag.as_str() {
        tag if GEOGRAPHIC_TAGS.contains(&tag) => geographic(obj),
        "GEOCCS" => geographic(obj),
        "PROJCS" | "PROJCRS" | "PROJECTEDCRS" => projected(obj),
        "COMPD_CS" | "COMPOUNDCRS" => {
            let horizontal = obj.child_any(&HORIZONTAL_TAGS).ok_or_else(|| {
                CrsError::validation(obj.tag.clone(), "compound CRS has no horizontal component")
            })?;
            crs(horizontal)
        }
        "BOUNDCRS" => bound(obj),
        other => Err(CrsError::validation(
            other.to_string(),
            "not a supported CRS type",
        )),
    }
}

fn geographic(obj: &SemanticObject) -> Result<CrsDefinition> {
    let datum = obj.child_any(&["DATUM", "GEODETICDATUM", "TRF", "ENSEMBLE"]);
    let spheroid = datum
        .and_then(|d| d.child_any(&["SPHEROID", "ELLIPSOID"]))
        .or_else(|| obj.child_any(&["SPHEROID", "ELLIPSOID"]))
        .ok_or_else(|| CrsError::validation("SPHEROID", "no ellipsoid definition"))?;
    let ellipsoid = ellipsoid(spheroid)?;

    let datum_shift = match datum
        .and_then(|d| d.child("TOWGS84"))
        .or_else(|| obj.child("TOWGS84"))
    {
        Some(node) => {
            let values = node.numbers();
            if values.len() != node.args.len() {
                return Err(CrsError::validation("TOWGS84", "non-numeric value"));
            }
            DatumShift::from_towgs84(&values)?
        }
        None => DatumShift::IDENTITY,
    };

    let geocentric = obj.tag == "GEOCCS"
        || obj
            .child("CS")
            .and_then(|cs| cs.keyword(0))
            .is_some_and(|kind| kind.eq_ignore_ascii_case("cartesian"));
    let (kind, crs_unit) = if geocentric {
        (CrsKind::Unknown, linear_unit(obj)?.unwrap_or(1.0))
    } else {
        (
            CrsKind::Geographic,
            angular_unit(obj)?.unwrap_or(DEG_TO_RAD),
        )
    };

    // WKT1 gives the prime meridian in the CRS's angular unit, WKT2 in its own.
    let prime_meridian = match obj.child_any(&["PRIMEM", "PRIMEMERIDIAN"]) {
        Some(pm) => {
            let value = pm
                .number(1)
                .ok_or_else(|| CrsError::validation("PRIMEM", "longitude is not numeric"))?;
            let factor = match pm.child_any(&["ANGLEUNIT", "UNIT"]) {
                Some(unit) => unit_factor(unit)?,
                None if kind == CrsKind::Geographic => crs_unit,
                None => DEG_TO_RAD,
            };
            value * factor
        }
        None => 0.0,
    };

    Ok(CrsDefinition {
        kind,
        name: obj.name().unwrap_or_default(),
        ellipsoid,
        datum_shift,
        prime_meridian,
        unit_factor: crs_unit,
        axis_order: axis_order(obj),
        projection: None,
        authority_code: authority(obj),
    })
}

fn projected(obj: &SemanticObject) -> Result<CrsDefinition> {
    let base_node = obj.child_any(&GEOGRAPHIC_TAGS).ok_or_else(|| {
        CrsError::validation("GEOGCS", "projected CRS has no base geographic CRS")
    })?;
    let base = geographic(base_node)?;
    let linear = linear_unit(obj)?.unwrap_or(1.0);

    let (method, parameter_nodes) = match obj.child("CONVERSION") {
        Some(conversion) => (
            conversion
                .child("METHOD")
                .and_then(SemanticObject::name)
                .ok_or_else(|| CrsError::validation("METHOD", "conversion has no method"))?,
            conversion.children("PARAMETER"),
        ),
        None => (
            obj.child("PROJECTION")
                .and_then(SemanticObject::name)
                .ok_or_else(|| {
                    CrsError::validation("PROJECTION", "projected CRS has no projection method")
                })?,
            obj.children("PARAMETER"),
        ),
    };

    let mut parameters = BTreeMap::new();
    for node in parameter_nodes {
        let name = node.name().unwrap_or_default();
        let Some(parameter) = Parameter::from_name(&name) else {
            log::debug!("ignoring unsupported projection parameter `{name}`");
            continue;
        };
        let value = node
            .number(1)
            .ok_or_else(|| CrsError::validation(name.clone(), "parameter value is not numeric"))?;
        let factor = match node.child_any(&UNIT_TAGS) {
            Some(unit) => unit_factor(unit)?,
            None if parameter.is_angular() => base.unit_factor,
            None if parameter.is_linear() => linear,
            None => 1.0,
        };
        parameters.insert(parameter, value * factor);
    }

    let authority_code = authority(obj);
    let method = if is_web_mercator(obj, &method, authority_code.as_deref()) {
        log::debug!("treating `{method}` as spherical Web Mercator");
        Method::WebMercator.name().to_string()
    } else {
        method
    };

    Ok(CrsDefinition {
        kind: CrsKind::Projected,
        name: obj.name().unwrap_or_default(),
        unit_factor: linear,
        axis_order: axis_order(obj),
        projection: Some(ProjectionDef::new(method, parameters)),
        authority_code,
        ..base
    })
}

fn bound(obj: &SemanticObject) -> Result<CrsDefinition> {
    let source = obj
        .child("SOURCECRS")
        .and_then(|s| s.child_any(&HORIZONTAL_TAGS))
        .ok_or_else(|| CrsError::validation("SOURCECRS", "bound CRS has no source CRS"))?;
    let mut def = crs(source)?;
    if let Some(transformation) = obj.child("ABRIDGEDTRANSFORMATION") {
        let method = transformation
            .child("METHOD")
            .and_then(SemanticObject::name)
            .unwrap_or_default();
        let mut values = Vec::new();
        for node in transformation.children("PARAMETER") {
            let name = node.name().unwrap_or_default();
            let value = node.number(1).ok_or_else(|| {
                CrsError::validation(name.clone(), "parameter value is not numeric")
            })?;
            let factor = node.child_any(&UNIT_TAGS).map(unit_factor).transpose()?;
            values.push((name, value, factor));
        }
        def.datum_shift = helmert_from_parameters(
            &method,
            values.iter().map(|(n, v, f)| (n.as_str(), *v, *f)),
        );
    }
    Ok(def)
}

fn ellipsoid(node: &SemanticObject) -> Result<Ellipsoid> {
    let a = node
        .number(1)
        .ok_or_else(|| CrsError::validation("SPHEROID", "semi-major axis is not numeric"))?;
    let rf = node
        .number(2)
        .ok_or_else(|| CrsError::validation("SPHEROID", "inverse flattening is not numeric"))?;
    let factor = match node.child_any(&["LENGTHUNIT", "UNIT"]) {
        Some(unit) => unit_factor(unit)?,
        None => 1.0,
    };
    Ellipsoid::new(node.name().unwrap_or_default(), a * factor, rf)
}

/// The conversion factor of a `UNIT`-like node, falling back to the unit's name.
fn unit_factor(unit: &SemanticObject) -> Result<f64> {
    let factor = unit
        .number(1)
        .or_else(|| unit.name().as_deref().and_then(unit_factor_by_name))
        .ok_or_else(|| CrsError::validation(unit.tag.clone(), "conversion factor is missing"))?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(CrsError::validation(
            unit.tag.clone(),
            format!("conversion factor must be positive, got {factor}"),
        ));
    }
    Ok(factor)
}

/// The CRS-wide unit, or the one declared on its first axis.
fn declared_unit(obj: &SemanticObject, tags: &[&str]) -> Result<Option<f64>> {
    let unit = obj
        .child_any(tags)
        .or_else(|| obj.children("AXIS").first().and_then(|axis| axis.child_any(tags)))
        .or_else(|| obj.child("CS").and_then(|cs| cs.child_any(tags)));
    unit.map(unit_factor).transpose()
}

fn angular_unit(obj: &SemanticObject) -> Result<Option<f64>> {
    declared_unit(obj, &["UNIT", "ANGLEUNIT"])
}

fn linear_unit(obj: &SemanticObject) -> Result<Option<f64>> {
    declared_unit(obj, &["UNIT", "LENGTHUNIT"])
}

fn axis_order(obj: &SemanticObject) -> AxisOrder {
    let mut axes: Vec<&SemanticObject> = obj.children("AXIS").iter().collect();
    if axes.len() < 2 {
        return AxisOrder::EastNorth;
    }
    if axes.iter().all(|axis| axis_rank(axis).is_some()) {
        axes.sort_by(|a, b| {
            axis_rank(a)
                .partial_cmp(&axis_rank(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    let first = axes[0];
    let northing = match first.keyword(1) {
        Some(direction) => {
            direction.eq_ignore_ascii_case("north") || direction.eq_ignore_ascii_case("south")
        }
        None => {
            let name = first.name().unwrap_or_default().to_ascii_lowercase();
            name.contains("lat") || name.contains("north")
        }
    };
    if northing {
        AxisOrder::NorthEast
    } else {
        AxisOrder::EastNorth
    }
}

fn axis_rank(axis: &SemanticObject) -> Option<f64> {
    axis.child("ORDER").and_then(|o| o.number(0))
}

fn authority(obj: &SemanticObject) -> Option<String> {
    let id = obj.child_any(&["AUTHORITY", "ID"])?;
    let authority = id.name()?;
    let code = id.args.get(1)?.as_text();
    Some(format!("{authority}:{code}"))
}

fn is_web_mercator(obj: &SemanticObject, method: &str, authority: Option<&str>) -> bool {
    if !matches!(Method::from_name(method), Ok(Method::Mercator)) {
        return false;
    }
    if matches!(authority, Some("EPSG:3857" | "EPSG:900913")) {
        return true;
    }
    obj.children("EXTENSION").iter().any(|ext| {
        ext.name().is_some_and(|n| n.eq_ignore_ascii_case("PROJ4"))
            && ext.args.get(1).is_some_and(|proj4| {
                let proj4 = proj4.as_text();
                proj4.contains("+a=6378137") && proj4.contains("+b=6378137")
            })
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::SEC_TO_RAD;
    use crate::wkt::parse_wkt;
    use approx::assert_relative_eq;

    const WGS84_WKT1: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

    const PSEUDO_MERCATOR_WKT1: &str = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1],AXIS["Easting",EAST],AXIS["Northing",NORTH],EXTENSION["PROJ4","+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs"]]"#;

    const UTM33_WKT1: &str = r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",15],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1],AXIS["Easting",EAST],AXIS["Northing",NORTH],AUTHORITY["EPSG","32633"]]"#;

    const WGS84_WKT2: &str = r#"GEOGCRS["WGS 84",
        ENSEMBLE["World Geodetic System 1984 ensemble",
            MEMBER["World Geodetic System 1984 (Transit)"],
            ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]],
            ENSEMBLEACCURACY[2.0]],
        PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],
        CS[ellipsoidal,2],
            AXIS["geodetic latitude (Lat)",north,ORDER[1],ANGLEUNIT["degree",0.0174532925199433]],
            AXIS["geodetic longitude (Lon)",east,ORDER[2],ANGLEUNIT["degree",0.0174532925199433]],
        USAGE[SCOPE["Horizontal component of 3D system."],AREA["World."],BBOX[-90,-180,90,180]],
        ID["EPSG",4326]]"#;

    const LAMBERT93_WKT2: &str = r#"PROJCRS["RGF93 v1 / Lambert-93",
        BASEGEOGCRS["RGF93 v1",
            DATUM["Reseau Geodesique Francais 1993 v1",
                ELLIPSOID["GRS 1980",6378137,298.257222101,LENGTHUNIT["metre",1]]],
            PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],
            ID["EPSG",4171]],
        CONVERSION["Lambert-93",
            METHOD["Lambert Conic Conformal (2SP)",ID["EPSG",9802]],
            PARAMETER["Latitude of false origin",46.5,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Longitude of false origin",3,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Latitude of 1st standard parallel",49,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Latitude of 2nd standard parallel",44,ANGLEUNIT["degree",0.0174532925199433]],
            PARAMETER["Easting at false origin",700000,LENGTHUNIT["metre",1]],
            PARAMETER["Northing at false origin",6600000,LENGTHUNIT["metre",1]]],
        CS[Cartesian,2],
            AXIS["easting (X)",east,ORDER[1],LENGTHUNIT["metre",1]],
            AXIS["northing (Y)",north,ORDER[2],LENGTHUNIT["metre",1]],
        ID["EPSG",2154]]"#;

    #[test]
    fn wgs84_wkt1() {
        let def = parse_wkt(WGS84_WKT1).unwrap();
        assert_eq!(def.kind, CrsKind::Geographic);
        assert_eq!(def.name, "WGS 84");
        assert_eq!(def.ellipsoid.a, 6_378_137.0);
        assert_eq!(def.ellipsoid.rf, 298.257_223_563);
        assert!(def.datum_shift.is_identity());
        assert_eq!(def.prime_meridian, 0.0);
        assert_relative_eq!(def.unit_factor, DEG_TO_RAD, epsilon = 1e-15);
        assert_eq!(def.axis_order, AxisOrder::EastNorth);
        assert_eq!(def.authority_code.as_deref(), Some("EPSG:4326"));
        assert!(def.projection.is_none());
    }

    #[test]
    fn wgs84_wkt2_is_latitude_first() {
        let def = parse_wkt(WGS84_WKT2).unwrap();
        assert_eq!(def.kind, CrsKind::Geographic);
        assert_eq!(def.axis_order, AxisOrder::NorthEast);
        assert_eq!(def.authority_code.as_deref(), Some("EPSG:4326"));
        assert_eq!(def.ellipsoid, parse_wkt(WGS84_WKT1).unwrap().ellipsoid);
    }

    #[test]
    fn pseudo_mercator_is_detected() {
        let def = parse_wkt(PSEUDO_MERCATOR_WKT1).unwrap();
        assert_eq!(def.kind, CrsKind::Projected);
        let projection = def.projection.unwrap();
        assert_eq!(
            Method::from_name(&projection.method).unwrap(),
            Method::WebMercator
        );
        assert_eq!(projection.get(Parameter::ScaleFactor), Some(1.0));
    }

    #[test]
    fn utm_parameters_are_canonical() {
        let def = parse_wkt(UTM33_WKT1).unwrap();
        let projection = def.projection.as_ref().unwrap();
        assert_eq!(projection.method, "Transverse_Mercator");
        assert_relative_eq!(
            projection.get(Parameter::CentralMeridian).unwrap(),
            15.0 * DEG_TO_RAD,
            epsilon = 1e-15
        );
        assert_eq!(projection.get(Parameter::FalseEasting), Some(500_000.0));
        assert_eq!(def.unit_factor, 1.0);
        assert_eq!(def.authority_code.as_deref(), Some("EPSG:32633"));
    }

    #[test]
    fn wkt2_projected_with_conversion() {
        let def = parse_wkt(LAMBERT93_WKT2).unwrap();
        let projection = def.projection.as_ref().unwrap();
        assert_eq!(
            Method::from_name(&projection.method).unwrap(),
            Method::LambertConformalConic
        );
        assert_relative_eq!(
            projection.get(Parameter::StandardParallel2).unwrap(),
            44.0 * DEG_TO_RAD,
            epsilon = 1e-15
        );
        assert_eq!(projection.get(Parameter::FalseNorthing), Some(6_600_000.0));
        assert_eq!(def.axis_order, AxisOrder::EastNorth);
        assert!(def.ellipsoid.same_shape(&Ellipsoid::grs80()));
    }

    #[test]
    fn missing_spheroid_is_a_validation_error() {
        let err = parse_wkt(r#"GEOGCS["x",DATUM["d"],UNIT["degree",0.0174532925199433]]"#).unwrap_err();
        assert!(matches!(err, CrsError::Validation { field, .. } if field == "SPHEROID"));
    }

    #[test]
    fn non_physical_spheroid_names_the_field() {
        let err = parse_wkt(r#"GEOGCS["x",DATUM["d",SPHEROID["s",-5,298]]]"#).unwrap_err();
        assert!(matches!(err, CrsError::Validation { field, .. } if field == "semi_major_axis"));
        let err = parse_wkt(r#"GEOGCS["x",DATUM["d",SPHEROID["s",EAST,298]]]"#).unwrap_err();
        assert!(matches!(err, CrsError::Validation { field, .. } if field == "SPHEROID"));
    }

    #[test]
    fn towgs84_and_grad_prime_meridian() {
        let def = parse_wkt(
            r#"GEOGCS["NTF (Paris)",DATUM["Nouvelle_Triangulation_Francaise_Paris",SPHEROID["Clarke 1880 (IGN)",6378249.2,293.4660212936265],TOWGS84[-168,-60,320,0,0,0,0]],PRIMEM["Paris",2.5969213],UNIT["grad",0.01570796326794897],AXIS["Lat",NORTH],AXIS["Long",EAST]]"#,
        )
        .unwrap();
        assert_eq!(def.datum_shift.dx, -168.0);
        assert_eq!(def.datum_shift.scale, 1.0);
        assert_relative_eq!(def.prime_meridian.to_degrees(), 2.337_229_17, epsilon = 1e-8);
        assert_eq!(def.axis_order, AxisOrder::NorthEast);
    }

    #[test]
    fn three_parameter_towgs84() {
        let def = parse_wkt(
            r#"GEOGCS["x",DATUM["d",SPHEROID["intl",6378388,297],TOWGS84[-87,-98,-121]],UNIT["degree",0.0174532925199433]]"#,
        )
        .unwrap();
        assert_eq!(def.datum_shift.dz, -121.0);
        assert_eq!(def.datum_shift.rx, 0.0);
    }

    #[test]
    fn compound_takes_horizontal_component() {
        let wkt = format!(
            r#"COMPD_CS["WGS 84 + EGM96 height",{WGS84_WKT1},VERT_CS["EGM96 height",VERT_DATUM["EGM96 geoid",2005],UNIT["metre",1]]]"#
        );
        let def = parse_wkt(&wkt).unwrap();
        assert_eq!(def.kind, CrsKind::Geographic);
        assert_eq!(def.authority_code.as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn bound_crs_carries_helmert() {
        let wkt = r#"BOUNDCRS[
            SOURCECRS[GEOGCRS["OSGB36",DATUM["Ordnance Survey of Great Britain 1936",ELLIPSOID["Airy 1830",6377563.396,299.3249646,LENGTHUNIT["metre",1]]],PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],CS[ellipsoidal,2],AXIS["longitude",east,ORDER[1]],AXIS["latitude",north,ORDER[2]],ANGLEUNIT["degree",0.0174532925199433]]],
            TARGETCRS[GEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563]],CS[ellipsoidal,2],ANGLEUNIT["degree",0.0174532925199433]]],
            ABRIDGEDTRANSFORMATION["OSGB36 to WGS 84",
                METHOD["Position Vector transformation (geog2D domain)"],
                PARAMETER["X-axis translation",446.448,LENGTHUNIT["metre",1]],
                PARAMETER["Y-axis translation",-125.157,LENGTHUNIT["metre",1]],
                PARAMETER["Z-axis translation",542.06,LENGTHUNIT["metre",1]],
                PARAMETER["X-axis rotation",0.15,ANGLEUNIT["arc-second",4.84813681109536E-06]],
                PARAMETER["Y-axis rotation",0.247,ANGLEUNIT["arc-second",4.84813681109536E-06]],
                PARAMETER["Z-axis rotation",0.842,ANGLEUNIT["arc-second",4.84813681109536E-06]],
                PARAMETER["Scale difference",-20.489,SCALEUNIT["parts per million",1E-06]]]]"#;
        let def = parse_wkt(wkt).unwrap();
        assert_eq!(def.name, "OSGB36");
        assert_eq!(def.axis_order, AxisOrder::EastNorth);
        assert_relative_eq!(def.datum_shift.rz, 0.842 * SEC_TO_RAD, epsilon = 1e-18);
        assert_relative_eq!(def.datum_shift.scale, 1.0 - 20.489e-6, epsilon = 1e-15);
    }

    #[test]
    fn unknown_parameters_are_dropped() {
        let wkt = UTM33_WKT1.replace(
            r#"PARAMETER["false_northing",0]"#,
            r#"PARAMETER["false_northing",0],PARAMETER["azimuth",30]"#,
        );
        let def = parse_wkt(&wkt).unwrap();
        assert_eq!(def.projection.unwrap().parameters.len(), 5);
    }

    #[test]
    fn projection_without_method_is_invalid() {
        let err = parse_wkt(
            r#"PROJCS["x",GEOGCS["g",DATUM["d",SPHEROID["s",6378137,298.257223563]]],UNIT["metre",1]]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CrsError::Validation { field, .. } if field == "PROJECTION"));
    }

    #[test]
    fn unsupported_root() {
        assert!(matches!(
            parse_wkt(r#"VERT_CS["h",VERT_DATUM["d",2005]]"#),
            Err(CrsError::Validation { .. })
        ));
    }
}
