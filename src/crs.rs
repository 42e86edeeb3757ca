use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use crate::error::{CrsError, Result};
use crate::projection::Method;

/// Radians per degree.
pub const DEG_TO_RAD: f64 = PI / 180.0;
/// Radians per arc-second.
pub const SEC_TO_RAD: f64 = 4.848_136_811_095_36e-6;

/// Tolerance used when deciding whether two ellipsoids describe the same shape.
/// It is loose enough for GRS80 and WGS84 to compare equal.
const ES_TOLERANCE: f64 = 5.0e-11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsKind {
    Geographic,
    Projected,
    Unknown,
}

/// Order of the two horizontal components as they appear in user coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisOrder {
    /// Longitude/easting first.
    #[default]
    EastNorth,
    /// Latitude/northing first.
    NorthEast,
}

/// A reference ellipsoid. An inverse flattening of `0` denotes a sphere, as in WKT.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    pub name: String,
    /// Semi-major axis in metres.
    pub a: f64,
    /// Inverse flattening, `0` for a sphere.
    pub rf: f64,
}

impl Ellipsoid {
    pub fn new(name: impl Into<String>, a: f64, rf: f64) -> Result<Self> {
        if !a.is_finite() || a <= 0.0 {
            return Err(CrsError::validation(
                "semi_major_axis",
                format!("must be a positive length, got {a}"),
            ));
        }
        if !rf.is_finite() || rf < 0.0 || (rf > 0.0 && rf <= 1.0) {
            return Err(CrsError::validation(
                "inverse_flattening",
                format!("must be 0 (sphere) or greater than 1, got {rf}"),
            ));
        }
        Ok(Ellipsoid {
            name: name.into(),
            a,
            rf,
        })
    }

    /// Build an ellipsoid from its two semi-axes.
    pub fn from_axes(name: impl Into<String>, a: f64, b: f64) -> Result<Self> {
        if !b.is_finite() || b <= 0.0 || b > a {
            return Err(CrsError::validation(
                "semi_minor_axis",
                format!("must be positive and not larger than the semi-major axis, got {b}"),
            ));
        }
        let rf = if a == b { 0.0 } else { a / (a - b) };
        Ellipsoid::new(name, a, rf)
    }

    pub fn sphere(name: impl Into<String>, radius: f64) -> Result<Self> {
        Ellipsoid::new(name, radius, 0.0)
    }

    pub fn wgs84() -> Self {
        Ellipsoid {
            name: "WGS 84".to_string(),
            a: 6_378_137.0,
            rf: 298.257_223_563,
        }
    }

    pub fn grs80() -> Self {
        Ellipsoid {
            name: "GRS 1980".to_string(),
            a: 6_378_137.0,
            rf: 298.257_222_101,
        }
    }

    /// Look up one of the well-known ellipsoids by its PROJ `+ellps` identifier.
    pub fn by_name(name: &str) -> Option<Self> {
        let (label, a, rf) = match name.to_ascii_lowercase().as_str() {
            "wgs84" => return Some(Ellipsoid::wgs84()),
            "grs80" => return Some(Ellipsoid::grs80()),
            "airy" => ("Airy 1830", 6_377_563.396, 299.324_964_6),
            "clrk66" => ("Clarke 1866", 6_378_206.4, 294.978_698_213_898),
            "intl" => ("International 1924", 6_378_388.0, 297.0),
            "bessel" => ("Bessel 1841", 6_377_397.155, 299.152_812_8),
            "krass" => ("Krassowsky 1940", 6_378_245.0, 298.3),
            "sphere" => ("Normal Sphere (r=6370997)", 6_370_997.0, 0.0),
            _ => return None,
        };
        Some(Ellipsoid {
            name: label.to_string(),
            a,
            rf,
        })
    }

    pub fn is_sphere(&self) -> bool {
        self.rf == 0.0
    }

    /// Semi-minor axis in metres.
    pub fn b(&self) -> f64 {
        if self.is_sphere() {
            self.a
        } else {
            self.a * (1.0 - 1.0 / self.rf)
        }
    }

    /// First eccentricity squared.
    pub fn es(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            let f = 1.0 / self.rf;
            f * (2.0 - f)
        }
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.es().sqrt()
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let es = self.es();
        es / (1.0 - es)
    }

    pub fn same_shape(&self, other: &Ellipsoid) -> bool {
        self.a == other.a && (self.es() - other.es()).abs() <= ES_TOLERANCE
    }
}

/// Seven-parameter Helmert shift from a datum towards WGS84.
///
/// Translations are in metres, rotations in radians, and `scale` is the multiplicative
/// factor `1 + ppm * 1e-6`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumShift {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub scale: f64,
}

impl Default for DatumShift {
    fn default() -> Self {
        DatumShift::IDENTITY
    }
}

impl DatumShift {
    pub const IDENTITY: DatumShift = DatumShift {
        dx: 0.0,
        dy: 0.0,
        dz: 0.0,
        rx: 0.0,
        ry: 0.0,
        rz: 0.0,
        scale: 1.0,
    };

    /// Build a shift from `TOWGS84`-style values: three translations, optionally followed by
    /// three rotations in arc-seconds and a scale difference in parts per million.
    pub fn from_towgs84(values: &[f64]) -> Result<Self> {
        if values.len() != 3 && values.len() != 7 {
            return Err(CrsError::validation(
                "TOWGS84",
                format!("expected 3 or 7 values, got {}", values.len()),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(CrsError::validation(
                "TOWGS84",
                format!("non-finite value {bad}"),
            ));
        }
        let mut shift = DatumShift {
            dx: values[0],
            dy: values[1],
            dz: values[2],
            ..DatumShift::IDENTITY
        };
        if values.len() == 7 {
            shift.rx = values[3] * SEC_TO_RAD;
            shift.ry = values[4] * SEC_TO_RAD;
            shift.rz = values[5] * SEC_TO_RAD;
            shift.scale = 1.0 + values[6] * 1.0e-6;
        }
        Ok(shift)
    }

    /// The shift in `TOWGS84` units (metres, arc-seconds, ppm).
    pub fn to_towgs84(&self) -> [f64; 7] {
        [
            self.dx,
            self.dy,
            self.dz,
            self.rx / SEC_TO_RAD,
            self.ry / SEC_TO_RAD,
            self.rz / SEC_TO_RAD,
            (self.scale - 1.0) * 1.0e6,
        ]
    }

    pub fn is_identity(&self) -> bool {
        *self == DatumShift::IDENTITY
    }
}

/// Canonical projection parameter names.
///
/// Angular values are stored in radians, linear values in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    LatitudeOfOrigin,
    CentralMeridian,
    StandardParallel1,
    StandardParallel2,
    LatitudeOfTrueScale,
    ScaleFactor,
    FalseEasting,
    FalseNorthing,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::LatitudeOfOrigin,
        Parameter::CentralMeridian,
        Parameter::StandardParallel1,
        Parameter::StandardParallel2,
        Parameter::LatitudeOfTrueScale,
        Parameter::ScaleFactor,
        Parameter::FalseEasting,
        Parameter::FalseNorthing,
    ];

    /// Map a WKT1, WKT2/PROJJSON or PROJ-string parameter name onto its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        let p = match normalize_name(name).as_str() {
            "latitude_of_origin"
            | "latitude_of_natural_origin"
            | "latitude_of_false_origin"
            | "latitude_of_center"
            | "latitude_of_centre"
            | "latitude_of_projection_centre"
            | "central_parallel"
            | "lat_0" => Parameter::LatitudeOfOrigin,
            "central_meridian"
            | "longitude_of_natural_origin"
            | "longitude_of_false_origin"
            | "longitude_of_origin"
            | "longitude_of_center"
            | "longitude_of_centre"
            | "longitude_of_projection_centre"
            | "lon_0" => Parameter::CentralMeridian,
            "standard_parallel_1" | "latitude_of_1st_standard_parallel" | "lat_1" => {
                Parameter::StandardParallel1
            }
            "standard_parallel_2" | "latitude_of_2nd_standard_parallel" | "lat_2" => {
                Parameter::StandardParallel2
            }
            "latitude_of_standard_parallel" | "latitude_of_true_scale" | "lat_ts" => {
                Parameter::LatitudeOfTrueScale
            }
            "scale_factor"
            | "scale_factor_at_natural_origin"
            | "scale_factor_at_projection_centre"
            | "k"
            | "k_0" => Parameter::ScaleFactor,
            "false_easting" | "easting_at_false_origin" | "easting_at_projection_centre" | "x_0" => {
                Parameter::FalseEasting
            }
            "false_northing"
            | "northing_at_false_origin"
            | "northing_at_projection_centre"
            | "y_0" => Parameter::FalseNorthing,
            _ => return None,
        };
        Some(p)
    }

    /// The PROJ-string key for this parameter.
    pub fn proj_key(&self) -> &'static str {
        match self {
            Parameter::LatitudeOfOrigin => "lat_0",
            Parameter::CentralMeridian => "lon_0",
            Parameter::StandardParallel1 => "lat_1",
            Parameter::StandardParallel2 => "lat_2",
            Parameter::LatitudeOfTrueScale => "lat_ts",
            Parameter::ScaleFactor => "k_0",
            Parameter::FalseEasting => "x_0",
            Parameter::FalseNorthing => "y_0",
        }
    }

    pub fn is_angular(&self) -> bool {
        matches!(
            self,
            Parameter::LatitudeOfOrigin
                | Parameter::CentralMeridian
                | Parameter::StandardParallel1
                | Parameter::StandardParallel2
                | Parameter::LatitudeOfTrueScale
        )
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Parameter::FalseEasting | Parameter::FalseNorthing)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proj_key())
    }
}

/// The projection half of a projected CRS: the method name as it was declared, and its
/// parameters in canonical units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDef {
    pub method: String,
    pub parameters: BTreeMap<Parameter, f64>,
}

impl ProjectionDef {
    pub fn new(method: impl Into<String>, parameters: BTreeMap<Parameter, f64>) -> Self {
        let method = method.into();
        let mut parameters = parameters;
        // Mercator variant B and Equidistant Cylindrical call their true-scale latitude the
        // first standard parallel.
        if let Ok(Method::Mercator | Method::EquidistantCylindrical) = Method::from_name(&method) {
            if let Some(lat_ts) = parameters.remove(&Parameter::StandardParallel1) {
                parameters.entry(Parameter::LatitudeOfTrueScale).or_insert(lat_ts);
            }
        }
        if let Ok(Method::Stereographic) = Method::from_name(&method) {
            let name = normalize_name(&method);
            if name.contains("polar") || name.contains("pole") {
                polar_stereographic_defaults(&mut parameters);
            }
        }
        ProjectionDef { method, parameters }
    }

    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.parameters.get(&parameter).copied()
    }

    pub fn get_or(&self, parameter: Parameter, default: f64) -> f64 {
        self.get(parameter).unwrap_or(default)
    }
}

/// Polar stereographic definitions name their true-scale latitude inconsistently: WKT2 as
/// the latitude of the standard parallel, WKT1 as the latitude of origin. The origin itself
/// is always the pole on the same side as that latitude.
fn polar_stereographic_defaults(parameters: &mut BTreeMap<Parameter, f64>) {
    let pole = |lat: f64| FRAC_PI_2.copysign(lat);
    if !parameters.contains_key(&Parameter::LatitudeOfTrueScale) {
        if let Some(lat_ts) = parameters.remove(&Parameter::StandardParallel1) {
            parameters.insert(Parameter::LatitudeOfTrueScale, lat_ts);
            parameters.insert(Parameter::LatitudeOfOrigin, pole(lat_ts));
        } else if let Some(lat0) = parameters.get(&Parameter::LatitudeOfOrigin).copied() {
            if (lat0.abs() - FRAC_PI_2).abs() > 1.0e-10 {
                parameters.insert(Parameter::LatitudeOfTrueScale, lat0);
                parameters.insert(Parameter::LatitudeOfOrigin, pole(lat0));
            }
        }
    }
    if let Some(lat_ts) = parameters.get(&Parameter::LatitudeOfTrueScale).copied() {
        parameters
            .entry(Parameter::LatitudeOfOrigin)
            .or_insert_with(|| pole(lat_ts));
    }
}

/// The canonical CRS model every input grammar converges on.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    pub kind: CrsKind,
    pub name: String,
    pub ellipsoid: Ellipsoid,
    pub datum_shift: DatumShift,
    /// Prime meridian longitude east of Greenwich, in radians.
    pub prime_meridian: f64,
    /// Radians (geographic) or metres (projected) per declared unit.
    pub unit_factor: f64,
    pub axis_order: AxisOrder,
    /// Present exactly when `kind == CrsKind::Projected`.
    pub projection: Option<ProjectionDef>,
    /// Authority identifier such as `EPSG:4326`.
    pub authority_code: Option<String>,
}

impl CrsDefinition {
    /// A longitude/latitude CRS in degrees on `ellipsoid`, with no datum shift.
    pub fn geographic(name: impl Into<String>, ellipsoid: Ellipsoid) -> Self {
        CrsDefinition {
            kind: CrsKind::Geographic,
            name: name.into(),
            ellipsoid,
            datum_shift: DatumShift::IDENTITY,
            prime_meridian: 0.0,
            unit_factor: DEG_TO_RAD,
            axis_order: AxisOrder::EastNorth,
            projection: None,
            authority_code: None,
        }
    }

    /// A projected CRS in metres.
    pub fn projected(name: impl Into<String>, ellipsoid: Ellipsoid, projection: ProjectionDef) -> Self {
        CrsDefinition {
            kind: CrsKind::Projected,
            unit_factor: 1.0,
            projection: Some(projection),
            ..CrsDefinition::geographic(name, ellipsoid)
        }
    }

    pub fn wgs84() -> Self {
        CrsDefinition {
            authority_code: Some("EPSG:4326".to_string()),
            ..CrsDefinition::geographic("WGS 84", Ellipsoid::wgs84())
        }
    }

    pub fn nad83() -> Self {
        CrsDefinition {
            authority_code: Some("EPSG:4269".to_string()),
            ..CrsDefinition::geographic("NAD83", Ellipsoid::grs80())
        }
    }

    pub fn web_mercator() -> Self {
        let projection = ProjectionDef::new(Method::WebMercator.name(), BTreeMap::new());
        CrsDefinition {
            authority_code: Some("EPSG:3857".to_string()),
            ..CrsDefinition::projected(
                "WGS 84 / Pseudo-Mercator",
                Ellipsoid::wgs84(),
                projection,
            )
        }
    }

    /// WGS84 / UTM zone `zone` (1..=60), northern or southern hemisphere.
    pub fn utm(zone: u8, south: bool) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(CrsError::validation(
                "zone",
                format!("UTM zone must be within 1..=60, got {zone}"),
            ));
        }
        let central_meridian = (f64::from(zone) * 6.0 - 183.0) * DEG_TO_RAD;
        let parameters = BTreeMap::from([
            (Parameter::LatitudeOfOrigin, 0.0),
            (Parameter::CentralMeridian, central_meridian),
            (Parameter::ScaleFactor, 0.9996),
            (Parameter::FalseEasting, 500_000.0),
            (Parameter::FalseNorthing, if south { 10_000_000.0 } else { 0.0 }),
        ]);
        let hemisphere = if south { 'S' } else { 'N' };
        let base: u32 = if south { 32700 } else { 32600 };
        let code = base + u32::from(zone);
        Ok(CrsDefinition {
            authority_code: Some(format!("EPSG:{code}")),
            ..CrsDefinition::projected(
                format!("WGS 84 / UTM zone {zone}{hemisphere}"),
                Ellipsoid::wgs84(),
                ProjectionDef::new(Method::TransverseMercator.name(), parameters),
            )
        })
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    pub fn is_projected(&self) -> bool {
        self.kind == CrsKind::Projected
    }

    /// Check the model's invariants. Every parser runs this before handing out a definition.
    pub fn validate(&self) -> Result<()> {
        // Re-run the constructor checks; fields are public and may have been edited.
        Ellipsoid::new(self.ellipsoid.name.clone(), self.ellipsoid.a, self.ellipsoid.rf)?;
        if !self.unit_factor.is_finite() || self.unit_factor <= 0.0 {
            return Err(CrsError::validation(
                "UNIT",
                format!("conversion factor must be positive, got {}", self.unit_factor),
            ));
        }
        if !self.prime_meridian.is_finite() {
            return Err(CrsError::validation("PRIMEM", "longitude is not finite"));
        }
        match (&self.kind, &self.projection) {
            (CrsKind::Projected, None) => Err(CrsError::validation(
                "PROJECTION",
                "projected CRS has no projection method",
            )),
            (CrsKind::Projected, Some(p)) if p.method.trim().is_empty() => Err(
                CrsError::validation("PROJECTION", "projection method name is empty"),
            ),
            (CrsKind::Projected, Some(p)) => {
                match p.parameters.iter().find(|(_, v)| !v.is_finite()) {
                    Some((param, v)) => Err(CrsError::validation(
                        param.proj_key(),
                        format!("parameter value {v} is not finite"),
                    )),
                    None => Ok(()),
                }
            }
            (_, Some(_)) => Err(CrsError::validation(
                "PROJECTION",
                "only projected CRS definitions carry a projection",
            )),
            (_, None) => Ok(()),
        }
    }

    /// Whether points can move between `self` and `other` without a datum shift.
    pub fn shares_datum_with(&self, other: &CrsDefinition) -> bool {
        self.ellipsoid.same_shape(&other.ellipsoid) && self.datum_shift == other.datum_shift
    }
}

/// Longitude of a named prime meridian east of Greenwich, in degrees.
pub fn prime_meridian_by_name(name: &str) -> Option<f64> {
    let degrees = match name.to_ascii_lowercase().as_str() {
        "greenwich" => 0.0,
        "lisbon" => -9.131_906_111_111,
        "paris" => 2.337_229_166_667,
        "bogota" => -74.080_916_666_667,
        "madrid" => -3.687_938_888_889,
        "rome" => 12.452_333_333_333,
        "bern" => 7.439_583_333_333,
        "jakarta" => 106.807_719_444_444,
        "ferro" => -17.666_666_666_667,
        "brussels" => 4.367_975,
        "stockholm" => 18.058_277_777_778,
        "athens" => 23.716_337_5,
        "oslo" => 10.722_916_666_667,
        _ => return None,
    };
    Some(degrees)
}

/// Conversion factor to metres, radians or unity for a unit known by name.
pub fn unit_factor_by_name(name: &str) -> Option<f64> {
    let factor = match normalize_name(name).as_str() {
        "metre" | "meter" | "metres" | "meters" | "m" => 1.0,
        "kilometre" | "kilometer" | "km" => 1000.0,
        "foot" | "international_foot" | "ft" => 0.3048,
        "us_survey_foot" | "foot_us" | "us_ft" => 1200.0 / 3937.0,
        "degree" | "degrees" | "deg" => DEG_TO_RAD,
        "radian" | "radians" | "rad" => 1.0,
        "grad" | "gon" => PI / 200.0,
        "arc_second" | "arcsecond" => SEC_TO_RAD,
        "arc_minute" | "arcminute" => SEC_TO_RAD * 60.0,
        "unity" => 1.0,
        "parts_per_million" | "ppm" => 1.0e-6,
        _ => return None,
    };
    Some(factor)
}

/// Lower-case a WKT/PROJJSON name and fold punctuation and spaces into single underscores,
/// so `"Lambert Conic Conformal (2SP)"` and `"Lambert_Conic_Conformal_2SP"` compare equal.
pub(crate) fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
