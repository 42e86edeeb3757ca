//! A reader for the `+key=value` PROJ-string syntax.
//!
//! Only the keys needed to express the supported projection methods and to read back
//! [`to_proj_string`](crate::to_proj_string) output are understood. Anything else is
//! logged and skipped.

use std::collections::BTreeMap;

use crate::crs::{
    AxisOrder, CrsDefinition, CrsKind, DEG_TO_RAD, DatumShift, Ellipsoid, Parameter,
    ProjectionDef, prime_meridian_by_name, unit_factor_by_name,
};
use crate::error::{CrsError, Result};
use crate::projection::Method;

const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Parse a PROJ string such as `+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs`.
pub fn parse_proj_string(text: &str) -> Result<CrsDefinition> {
    let pairs = tokenize(text)?;
    let get = |key: &str| pairs.get(key).map(String::as_str);

    let proj = get("proj").ok_or_else(|| CrsError::validation("proj", "missing +proj"))?;

    let mut ellipsoid = ellipsoid(&pairs)?;
    let datum_shift = match get("towgs84") {
        Some(values) => {
            let values = values
                .split(',')
                .map(|v| number("towgs84", v))
                .collect::<Result<Vec<_>>>()?;
            DatumShift::from_towgs84(&values)?
        }
        None => DatumShift::IDENTITY,
    };
    let prime_meridian = match get("pm") {
        Some(pm) => match prime_meridian_by_name(pm) {
            Some(degrees) => degrees * DEG_TO_RAD,
            None => number("pm", pm)? * DEG_TO_RAD,
        },
        None => 0.0,
    };
    let axis_order = match get("axis") {
        None | Some("enu") => AxisOrder::EastNorth,
        Some("neu") => AxisOrder::NorthEast,
        Some(other) => {
            return Err(CrsError::validation(
                "axis",
                format!("unsupported axis order `{other}`"),
            ));
        }
    };
    let name = get("title").unwrap_or(proj).to_string();

    let def = match proj {
        "longlat" | "latlong" | "lonlat" | "latlon" => CrsDefinition {
            kind: CrsKind::Geographic,
            name,
            ellipsoid,
            datum_shift,
            prime_meridian,
            unit_factor: DEG_TO_RAD,
            axis_order,
            projection: None,
            authority_code: None,
        },
        _ => {
            let (method, parameters) = projection(proj, &pairs)?;
            let method = if method == Method::Mercator
                && ellipsoid.is_sphere()
                && ellipsoid.a == WEB_MERCATOR_RADIUS
            {
                log::debug!("spherical Mercator on {WEB_MERCATOR_RADIUS} m read as Web Mercator");
                ellipsoid = Ellipsoid::wgs84();
                Method::WebMercator
            } else {
                method
            };
            CrsDefinition {
                kind: CrsKind::Projected,
                name,
                ellipsoid,
                datum_shift,
                prime_meridian,
                unit_factor: linear_unit(&pairs)?,
                axis_order,
                projection: Some(ProjectionDef::new(method.name(), parameters)),
                authority_code: None,
            }
        }
    };
    def.validate()?;
    Ok(def)
}

fn tokenize(text: &str) -> Result<BTreeMap<String, String>> {
    if text.trim().is_empty() {
        return Err(CrsError::InvalidInput("empty PROJ string".to_string()));
    }
    let mut pairs = BTreeMap::new();
    for token in split_tokens(text)? {
        let token = token.strip_prefix('+').unwrap_or(token.as_str());
        if token.is_empty() {
            continue;
        }
        let (key, value) = token.split_once('=').unwrap_or((token, ""));
        pairs.insert(key.to_ascii_lowercase(), value.to_string());
    }
    Ok(pairs)
}

/// Split on whitespace, except inside a `key="quoted value"`, where `""` stands for a quote.
fn split_tokens(text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.next_if_eq(&'"').is_some() {
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.ends_with('=') => in_quotes = true,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(CrsError::InvalidInput(format!(
            "unterminated quoted value in PROJ string `{text}`"
        )));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn ellipsoid(pairs: &BTreeMap<String, String>) -> Result<Ellipsoid> {
    let get = |key: &str| pairs.get(key).map(String::as_str);

    let named = match (get("ellps"), get("datum")) {
        (Some(ellps), _) => Ellipsoid::by_name(ellps).ok_or_else(|| {
            CrsError::validation("ellps", format!("unknown ellipsoid `{ellps}`"))
        })?,
        (None, Some(datum)) => match datum.to_ascii_uppercase().as_str() {
            "WGS84" => Ellipsoid::wgs84(),
            "NAD83" => Ellipsoid::grs80(),
            "NAD27" => Ellipsoid::by_name("clrk66").unwrap_or_else(Ellipsoid::wgs84),
            _ => {
                return Err(CrsError::validation(
                    "datum",
                    format!("unknown datum `{datum}`"),
                ));
            }
        },
        (None, None) => Ellipsoid::wgs84(),
    };

    if let Some(r) = get("r") {
        return Ellipsoid::sphere(named.name, number("R", r)?);
    }
    let Some(a) = get("a") else {
        return Ok(named);
    };
    let a = number("a", a)?;
    let name = if get("ellps").is_some() || get("datum").is_some() {
        named.name
    } else {
        String::new()
    };
    match (get("rf"), get("b")) {
        (Some(rf), _) => Ellipsoid::new(name, a, number("rf", rf)?),
        (None, Some(b)) => Ellipsoid::from_axes(name, a, number("b", b)?),
        (None, None) => Ellipsoid::sphere(name, a),
    }
}

fn projection(
    proj: &str,
    pairs: &BTreeMap<String, String>,
) -> Result<(Method, BTreeMap<Parameter, f64>)> {
    let mut parameters = BTreeMap::new();

    if proj == "utm" {
        let zone = pairs
            .get("zone")
            .ok_or_else(|| CrsError::validation("zone", "+proj=utm needs a +zone"))?;
        let zone: u8 = zone
            .parse()
            .ok()
            .filter(|z| (1..=60).contains(z))
            .ok_or_else(|| {
                CrsError::validation("zone", format!("UTM zone must be within 1..=60, got {zone}"))
            })?;
        let south = pairs.contains_key("south");
        parameters.insert(Parameter::LatitudeOfOrigin, 0.0);
        parameters.insert(
            Parameter::CentralMeridian,
            (f64::from(zone) * 6.0 - 183.0) * DEG_TO_RAD,
        );
        parameters.insert(Parameter::ScaleFactor, 0.9996);
        parameters.insert(Parameter::FalseEasting, 500_000.0);
        parameters.insert(
            Parameter::FalseNorthing,
            if south { 10_000_000.0 } else { 0.0 },
        );
        return Ok((Method::TransverseMercator, parameters));
    }

    let method = Method::from_name(proj)?;
    for (key, value) in pairs {
        let Some(parameter) = Parameter::from_name(key) else {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::debug!("ignoring PROJ key `+{key}`");
            }
            continue;
        };
        let value = number(key, value)?;
        let value = if parameter.is_angular() {
            value * DEG_TO_RAD
        } else {
            value
        };
        parameters.insert(parameter, value);
    }
    Ok((method, parameters))
}

/// Keys read elsewhere in this module, or accepted without effect.
const KNOWN_KEYS: &[&str] = &[
    "proj", "a", "b", "rf", "r", "ellps", "datum", "towgs84", "pm", "units", "to_meter", "axis",
    "zone", "south", "title", "no_defs", "wktext", "nadgrids", "type",
];

fn linear_unit(pairs: &BTreeMap<String, String>) -> Result<f64> {
    if let Some(to_meter) = pairs.get("to_meter") {
        // PROJ accepts fractions here, e.g. `+to_meter=1200/3937`.
        let factor = match to_meter.split_once('/') {
            Some((num, den)) => number("to_meter", num)? / number("to_meter", den)?,
            None => number("to_meter", to_meter)?,
        };
        return Ok(factor);
    }
    match pairs.get("units") {
        Some(units) => unit_factor_by_name(units).ok_or_else(|| {
            CrsError::validation("units", format!("unknown linear unit `{units}`"))
        }),
        None => Ok(1.0),
    }
}

fn number(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CrsError::validation(field, format!("`{value}` is not a number")))
}
