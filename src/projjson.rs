//! PROJJSON input, and rendering of canonical definitions as PROJ strings.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::crs::{
    AxisOrder, CrsDefinition, CrsKind, DEG_TO_RAD, DatumShift, Ellipsoid, Parameter,
    ProjectionDef, unit_factor_by_name,
};
use crate::datum::helmert_from_parameters;
use crate::error::{CrsError, Result};
use crate::projection::Method;

/// Decode PROJJSON text into a validated CRS definition.
pub fn parse_projjson(text: &str) -> Result<CrsDefinition> {
    let doc: Value = serde_json::from_str(text)?;
    from_projjson(&doc)
}

/// Convert a decoded PROJJSON document into a validated CRS definition.
pub fn from_projjson(doc: &Value) -> Result<CrsDefinition> {
    let def = crs(doc)?;
    def.validate()?;
    Ok(def)
}

fn crs(doc: &Value) -> Result<CrsDefinition> {
    let kind = doc
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CrsError::validation("type", "PROJJSON object has no type"))?;
    match kind {
        "GeographicCRS" | "GeodeticCRS" => geographic(doc),
        "ProjectedCRS" => projected(doc),
        "BoundCRS" => bound(doc),
        "CompoundCRS" => {
            let components = doc
                .get("components")
                .and_then(Value::as_array)
                .ok_or_else(|| CrsError::validation("components", "compound CRS has no components"))?;
            let horizontal = components
                .iter()
                .find(|c| {
                    matches!(
                        c.get("type").and_then(Value::as_str),
                        Some("GeographicCRS" | "GeodeticCRS" | "ProjectedCRS" | "BoundCRS")
                    )
                })
                .ok_or_else(|| {
                    CrsError::validation("components", "compound CRS has no horizontal component")
                })?;
            crs(horizontal)
        }
        other => Err(CrsError::validation(
            "type",
            format!("unsupported PROJJSON CRS type `{other}`"),
        )),
    }
}

fn geographic(doc: &Value) -> Result<CrsDefinition> {
    let datum = doc
        .get("datum")
        .or_else(|| doc.get("datum_ensemble"))
        .ok_or_else(|| CrsError::validation("datum", "geographic CRS has no datum"))?;
    let ellipsoid = ellipsoid(
        datum
            .get("ellipsoid")
            .ok_or_else(|| CrsError::validation("ellipsoid", "datum has no ellipsoid"))?,
    )?;

    let prime_meridian = match datum.get("prime_meridian").or_else(|| doc.get("prime_meridian")) {
        Some(pm) => match pm.get("longitude") {
            Some(longitude) => {
                let (value, factor) = measure(longitude, "prime_meridian")?;
                value * factor.unwrap_or(DEG_TO_RAD)
            }
            None => 0.0,
        },
        None => 0.0,
    };

    let cs = doc.get("coordinate_system");
    let geocentric = cs
        .and_then(|cs| cs.get("subtype"))
        .and_then(Value::as_str)
        .is_some_and(|subtype| subtype.eq_ignore_ascii_case("cartesian"));
    let (kind, default_unit) = if geocentric {
        (CrsKind::Unknown, 1.0)
    } else {
        (CrsKind::Geographic, DEG_TO_RAD)
    };

    Ok(CrsDefinition {
        kind,
        name: text(doc, "name"),
        ellipsoid,
        datum_shift: DatumShift::IDENTITY,
        prime_meridian,
        unit_factor: axis_unit(cs)?.unwrap_or(default_unit),
        axis_order: axis_order(cs),
        projection: None,
        authority_code: id(doc),
    })
}

fn projected(doc: &Value) -> Result<CrsDefinition> {
    let base = geographic(
        doc.get("base_crs")
            .ok_or_else(|| CrsError::validation("base_crs", "projected CRS has no base CRS"))?,
    )?;
    let conversion = doc
        .get("conversion")
        .ok_or_else(|| CrsError::validation("conversion", "projected CRS has no conversion"))?;
    let method = conversion
        .get("method")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| CrsError::validation("method", "conversion has no method name"))?;

    let cs = doc.get("coordinate_system");
    let linear = axis_unit(cs)?.unwrap_or(1.0);

    let mut parameters = BTreeMap::new();
    for node in array(conversion, "parameters") {
        let name = text(node, "name");
        let Some(parameter) = Parameter::from_name(&name) else {
            log::debug!("ignoring unsupported projection parameter `{name}`");
            continue;
        };
        let value = node
            .get("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| CrsError::validation(name.clone(), "parameter value is not numeric"))?;
        let factor = match node.get("unit") {
            Some(unit) => unit_factor(unit)?,
            None if parameter.is_angular() => DEG_TO_RAD,
            None => 1.0,
        };
        parameters.insert(parameter, value * factor);
    }

    Ok(CrsDefinition {
        kind: CrsKind::Projected,
        name: text(doc, "name"),
        unit_factor: linear,
        axis_order: axis_order(cs),
        projection: Some(ProjectionDef::new(method, parameters)),
        authority_code: id(doc),
        ..base
    })
}

fn bound(doc: &Value) -> Result<CrsDefinition> {
    let mut def = crs(doc
        .get("source_crs")
        .ok_or_else(|| CrsError::validation("source_crs", "bound CRS has no source CRS"))?)?;
    if let Some(transformation) = doc.get("transformation") {
        let method = transformation
            .get("method")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mut values = Vec::new();
        for node in array(transformation, "parameters") {
            let name = text(node, "name");
            let value = node.get("value").and_then(Value::as_f64).ok_or_else(|| {
                CrsError::validation(name.clone(), "parameter value is not numeric")
            })?;
            let factor = node.get("unit").map(unit_factor).transpose()?;
            values.push((name, value, factor));
        }
        def.datum_shift =
            helmert_from_parameters(method, values.iter().map(|(n, v, f)| (n.as_str(), *v, *f)));
    }
    Ok(def)
}

fn ellipsoid(node: &Value) -> Result<Ellipsoid> {
    let name = text(node, "name");
    if let Some(radius) = node.get("radius") {
        let (r, factor) = measure(radius, "radius")?;
        return Ellipsoid::sphere(name, r * factor.unwrap_or(1.0));
    }
    let (a, factor) = measure(
        node.get("semi_major_axis")
            .ok_or_else(|| CrsError::validation("semi_major_axis", "ellipsoid has no semi-major axis"))?,
        "semi_major_axis",
    )?;
    let a = a * factor.unwrap_or(1.0);
    if let Some(rf) = node.get("inverse_flattening") {
        let (rf, _) = measure(rf, "inverse_flattening")?;
        return Ellipsoid::new(name, a, rf);
    }
    if let Some(b) = node.get("semi_minor_axis") {
        let (b, factor) = measure(b, "semi_minor_axis")?;
        return Ellipsoid::from_axes(name, a, b * factor.unwrap_or(1.0));
    }
    Err(CrsError::validation(
        "inverse_flattening",
        "ellipsoid has neither inverse flattening nor semi-minor axis",
    ))
}

/// A bare number, or a `{"value": .., "unit": ..}` object with its unit's factor.
fn measure(value: &Value, field: &str) -> Result<(f64, Option<f64>)> {
    if let Some(n) = value.as_f64() {
        return Ok((n, None));
    }
    let n = value
        .get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| CrsError::validation(field, "value is not numeric"))?;
    let factor = value.get("unit").map(unit_factor).transpose()?;
    Ok((n, factor))
}

fn unit_factor(unit: &Value) -> Result<f64> {
    let factor = match unit {
        Value::String(name) => unit_factor_by_name(name),
        Value::Object(_) => unit
            .get("conversion_factor")
            .and_then(Value::as_f64)
            .or_else(|| unit.get("name").and_then(Value::as_str).and_then(unit_factor_by_name)),
        _ => None,
    };
    match factor {
        Some(f) if f.is_finite() && f > 0.0 => Ok(f),
        _ => Err(CrsError::validation("unit", format!("unrecognised unit {unit}"))),
    }
}

fn axis_unit(cs: Option<&Value>) -> Result<Option<f64>> {
    cs.and_then(|cs| cs.get("axis"))
        .and_then(Value::as_array)
        .and_then(|axes| axes.first())
        .and_then(|axis| axis.get("unit"))
        .map(unit_factor)
        .transpose()
}

fn axis_order(cs: Option<&Value>) -> AxisOrder {
    let axes = cs
        .and_then(|cs| cs.get("axis"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if axes.len() < 2 {
        return AxisOrder::EastNorth;
    }
    match axes[0].get("direction").and_then(Value::as_str) {
        Some(dir) if dir.eq_ignore_ascii_case("north") || dir.eq_ignore_ascii_case("south") => {
            AxisOrder::NorthEast
        }
        _ => AxisOrder::EastNorth,
    }
}

fn id(doc: &Value) -> Option<String> {
    let id = doc
        .get("id")
        .or_else(|| doc.get("ids").and_then(Value::as_array).and_then(|ids| ids.first()))?;
    let authority = id.get("authority")?.as_str()?;
    let code = match id.get("code")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    Some(format!("{authority}:{code}"))
}

fn text(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn array<'v>(node: &'v Value, key: &str) -> &'v [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Render a definition as a legacy PROJ string.
///
/// Every field of the canonical model that PROJ syntax can carry is written out, so that
/// [`parse_proj_string`](crate::parse_proj_string) reads back an equivalent definition.
/// The angular unit of a geographic CRS is the exception: PROJ strings are always in degrees.
pub fn to_proj_string(def: &CrsDefinition) -> Result<String> {
    let mut parts = Vec::new();
    match def.kind {
        CrsKind::Geographic => parts.push("+proj=longlat".to_string()),
        CrsKind::Projected => {
            let projection = def.projection.as_ref().ok_or_else(|| {
                CrsError::validation("PROJECTION", "projected CRS has no projection method")
            })?;
            let method = Method::from_name(&projection.method)?;
            parts.push(format!("+proj={}", method.proj_name()));
            for (parameter, value) in &projection.parameters {
                let value = if parameter.is_angular() {
                    degrees(*value)
                } else {
                    *value
                };
                parts.push(format!("+{}={}", parameter.proj_key(), value));
            }
        }
        CrsKind::Unknown => {
            return Err(CrsError::validation(
                "kind",
                "only geographic and projected CRS definitions have a PROJ string form",
            ));
        }
    }

    let ellps = &def.ellipsoid;
    if ellps.is_sphere() {
        parts.push(format!("+a={} +b={}", ellps.a, ellps.a));
    } else {
        parts.push(format!("+a={} +rf={}", ellps.a, ellps.rf));
    }

    if !def.datum_shift.is_identity() {
        let values = def.datum_shift.to_towgs84();
        let values = if values[3..].iter().all(|v| *v == 0.0) {
            &values[..3]
        } else {
            &values[..]
        };
        let joined: Vec<String> = values.iter().map(f64::to_string).collect();
        parts.push(format!("+towgs84={}", joined.join(",")));
    }

    if def.prime_meridian != 0.0 {
        parts.push(format!("+pm={}", degrees(def.prime_meridian)));
    }

    if def.kind == CrsKind::Projected {
        if def.unit_factor == 1.0 {
            parts.push("+units=m".to_string());
        } else {
            parts.push(format!("+to_meter={}", def.unit_factor));
        }
    }

    if def.axis_order == AxisOrder::NorthEast {
        parts.push("+axis=neu".to_string());
    }
    if !def.name.is_empty() {
        parts.push(format!("+title={}", quote_value(&def.name)));
    }
    parts.push("+no_defs".to_string());
    Ok(parts.join(" "))
}

/// Double-quote a value that would otherwise break PROJ-string tokenization; embedded
/// quotes are doubled.
fn quote_value(value: &str) -> Cow<'_, str> {
    if value.contains(|c: char| c.is_whitespace() || c == '"') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Radians to degrees, rounded to 1e-12° so values that entered as whole degrees print as such.
fn degrees(radians: f64) -> f64 {
    (radians.to_degrees() * 1.0e12).round() / 1.0e12
}
