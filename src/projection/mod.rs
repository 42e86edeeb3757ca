//! Forward and inverse formulas for the supported projection methods.
//!
//! Every method is a pair of pure functions over radians and metres, parameterised by the
//! ellipsoid and the method's canonical parameters. Method names coming from WKT, PROJJSON
//! or PROJ strings are resolved to [`Method`] once, when a [`Projector`] is built.

mod aea;
pub(crate) mod common;
mod eqc;
mod eqdc;
mod laea;
mod lcc;
mod mercator;
mod stere;
mod sterea;
mod tmerc;

use std::fmt;

use crate::crs::{Ellipsoid, ProjectionDef, normalize_name};
use crate::error::{CrsError, Result};

use aea::AlbersEqualArea;
use eqc::EquidistantCylindrical;
use eqdc::EquidistantConic;
use laea::LambertAzimuthalEqualArea;
use lcc::LambertConformalConic;
use mercator::Mercator;
use stere::Stereographic;
use sterea::ObliqueStereographic;
use tmerc::TransverseMercator;

/// The closed set of projection methods the engine can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Mercator,
    WebMercator,
    TransverseMercator,
    LambertConformalConic,
    AlbersEqualArea,
    EquidistantCylindrical,
    EquidistantConic,
    Stereographic,
    ObliqueStereographic,
    LambertAzimuthalEqualArea,
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::Mercator,
        Method::WebMercator,
        Method::TransverseMercator,
        Method::LambertConformalConic,
        Method::AlbersEqualArea,
        Method::EquidistantCylindrical,
        Method::EquidistantConic,
        Method::Stereographic,
        Method::ObliqueStereographic,
        Method::LambertAzimuthalEqualArea,
    ];

    /// Resolve a WKT1, WKT2/PROJJSON or PROJ-string method name.
    pub fn from_name(name: &str) -> Result<Method> {
        let method = match normalize_name(name).as_str() {
            "mercator" | "mercator_1sp" | "mercator_2sp" | "mercator_variant_a"
            | "mercator_variant_b" | "merc" => Method::Mercator,
            "popular_visualisation_pseudo_mercator"
            | "mercator_auxiliary_sphere"
            | "pseudo_mercator"
            | "web_mercator"
            | "webmerc" => Method::WebMercator,
            "transverse_mercator" | "gauss_kruger" | "universal_transverse_mercator" | "utm"
            | "tmerc" => Method::TransverseMercator,
            "lambert_conformal_conic"
            | "lambert_conformal_conic_1sp"
            | "lambert_conformal_conic_2sp"
            | "lambert_conic_conformal"
            | "lambert_conic_conformal_1sp"
            | "lambert_conic_conformal_2sp"
            | "lcc" => Method::LambertConformalConic,
            "albers_conic_equal_area" | "albers_equal_area" | "albers" | "aea" => {
                Method::AlbersEqualArea
            }
            "equidistant_cylindrical"
            | "equidistant_cylindrical_spherical"
            | "equirectangular"
            | "plate_carree"
            | "eqc" => Method::EquidistantCylindrical,
            "equidistant_conic" | "eqdc" => Method::EquidistantConic,
            "stereographic"
            | "polar_stereographic"
            | "polar_stereographic_variant_a"
            | "polar_stereographic_variant_b"
            | "stereographic_north_pole"
            | "stereographic_south_pole"
            | "stere" => Method::Stereographic,
            "oblique_stereographic" | "double_stereographic" | "sterea" => {
                Method::ObliqueStereographic
            }
            "lambert_azimuthal_equal_area" | "lambert_azimuthal_equal_area_spherical" | "laea" => {
                Method::LambertAzimuthalEqualArea
            }
            _ => return Err(CrsError::UnsupportedProjection(name.to_string())),
        };
        Ok(method)
    }

    /// Display name, as WKT2 spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Mercator => "Mercator",
            Method::WebMercator => "Popular Visualisation Pseudo Mercator",
            Method::TransverseMercator => "Transverse Mercator",
            Method::LambertConformalConic => "Lambert Conic Conformal",
            Method::AlbersEqualArea => "Albers Equal Area",
            Method::EquidistantCylindrical => "Equidistant Cylindrical",
            Method::EquidistantConic => "Equidistant Conic",
            Method::Stereographic => "Stereographic",
            Method::ObliqueStereographic => "Oblique Stereographic",
            Method::LambertAzimuthalEqualArea => "Lambert Azimuthal Equal Area",
        }
    }

    /// The `+proj=` identifier.
    pub fn proj_name(&self) -> &'static str {
        match self {
            Method::Mercator => "merc",
            Method::WebMercator => "webmerc",
            Method::TransverseMercator => "tmerc",
            Method::LambertConformalConic => "lcc",
            Method::AlbersEqualArea => "aea",
            Method::EquidistantCylindrical => "eqc",
            Method::EquidistantConic => "eqdc",
            Method::Stereographic => "stere",
            Method::ObliqueStereographic => "sterea",
            Method::LambertAzimuthalEqualArea => "laea",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A projection method bound to its ellipsoid and parameters, with all derived constants
/// computed up front.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projector {
    Mercator(Mercator),
    TransverseMercator(TransverseMercator),
    LambertConformalConic(LambertConformalConic),
    AlbersEqualArea(AlbersEqualArea),
    EquidistantCylindrical(EquidistantCylindrical),
    EquidistantConic(EquidistantConic),
    Stereographic(Stereographic),
    ObliqueStereographic(ObliqueStereographic),
    LambertAzimuthalEqualArea(LambertAzimuthalEqualArea),
}

impl Projector {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let projector = match Method::from_name(&def.method)? {
            Method::Mercator => Projector::Mercator(Mercator::new(ellps, def)?),
            Method::WebMercator => Projector::Mercator(Mercator::web(ellps, def)),
            Method::TransverseMercator => {
                Projector::TransverseMercator(TransverseMercator::new(ellps, def)?)
            }
            Method::LambertConformalConic => {
                Projector::LambertConformalConic(LambertConformalConic::new(ellps, def)?)
            }
            Method::AlbersEqualArea => Projector::AlbersEqualArea(AlbersEqualArea::new(ellps, def)?),
            Method::EquidistantCylindrical => {
                Projector::EquidistantCylindrical(EquidistantCylindrical::new(ellps, def)?)
            }
            Method::EquidistantConic => {
                Projector::EquidistantConic(EquidistantConic::new(ellps, def)?)
            }
            Method::Stereographic => Projector::Stereographic(Stereographic::new(ellps, def)?),
            Method::ObliqueStereographic => {
                Projector::ObliqueStereographic(ObliqueStereographic::new(ellps, def)?)
            }
            Method::LambertAzimuthalEqualArea => {
                Projector::LambertAzimuthalEqualArea(LambertAzimuthalEqualArea::new(ellps, def)?)
            }
        };
        Ok(projector)
    }

    /// Geographic radians to projected metres.
    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let (x, y) = match self {
            Projector::Mercator(p) => p.forward(lam, phi),
            Projector::TransverseMercator(p) => p.forward(lam, phi),
            Projector::LambertConformalConic(p) => p.forward(lam, phi),
            Projector::AlbersEqualArea(p) => p.forward(lam, phi),
            Projector::EquidistantCylindrical(p) => p.forward(lam, phi),
            Projector::EquidistantConic(p) => p.forward(lam, phi),
            Projector::Stereographic(p) => p.forward(lam, phi),
            Projector::ObliqueStereographic(p) => p.forward(lam, phi),
            Projector::LambertAzimuthalEqualArea(p) => p.forward(lam, phi),
        }?;
        finite(x, y, "forward")
    }

    /// Projected metres to geographic radians.
    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (lam, phi) = match self {
            Projector::Mercator(p) => p.inverse(x, y),
            Projector::TransverseMercator(p) => p.inverse(x, y),
            Projector::LambertConformalConic(p) => p.inverse(x, y),
            Projector::AlbersEqualArea(p) => p.inverse(x, y),
            Projector::EquidistantCylindrical(p) => p.inverse(x, y),
            Projector::EquidistantConic(p) => p.inverse(x, y),
            Projector::Stereographic(p) => p.inverse(x, y),
            Projector::ObliqueStereographic(p) => p.inverse(x, y),
            Projector::LambertAzimuthalEqualArea(p) => p.inverse(x, y),
        }?;
        finite(lam, phi, "inverse")
    }
}

fn finite(a: f64, b: f64, direction: &str) -> Result<(f64, f64)> {
    if a.is_finite() && b.is_finite() {
        Ok((a, b))
    } else {
        Err(CrsError::out_of_domain(format!(
            "{direction} projection produced a non-finite coordinate"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::{DEG_TO_RAD, Parameter};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    #[test]
    fn method_names_from_every_grammar() {
        assert_eq!(
            Method::from_name("Transverse_Mercator").unwrap(),
            Method::TransverseMercator
        );
        assert_eq!(
            Method::from_name("Lambert Conic Conformal (2SP)").unwrap(),
            Method::LambertConformalConic
        );
        assert_eq!(
            Method::from_name("Mercator_Auxiliary_Sphere").unwrap(),
            Method::WebMercator
        );
        assert_eq!(Method::from_name("aea").unwrap(), Method::AlbersEqualArea);
        assert_eq!(
            Method::from_name("Polar Stereographic (variant B)").unwrap(),
            Method::Stereographic
        );
        assert_eq!(
            Method::from_name("Double_Stereographic").unwrap(),
            Method::ObliqueStereographic
        );
        assert_eq!(
            Method::from_name("Lambert_Azimuthal_Equal_Area").unwrap(),
            Method::LambertAzimuthalEqualArea
        );
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name()).unwrap(), method);
            assert_eq!(Method::from_name(method.proj_name()).unwrap(), method);
        }
    }

    #[test]
    fn unknown_method_is_unsupported() {
        let err = Method::from_name("Hotine_Oblique_Mercator").unwrap_err();
        assert_eq!(
            err,
            CrsError::UnsupportedProjection("Hotine_Oblique_Mercator".to_string())
        );
    }

    #[test]
    fn forward_inverse_round_trip_for_every_method() {
        let params = BTreeMap::from([
            (Parameter::LatitudeOfOrigin, 30.0 * DEG_TO_RAD),
            (Parameter::CentralMeridian, 10.0 * DEG_TO_RAD),
            (Parameter::StandardParallel1, 35.0 * DEG_TO_RAD),
            (Parameter::StandardParallel2, 50.0 * DEG_TO_RAD),
            (Parameter::FalseEasting, 1_000.0),
            (Parameter::FalseNorthing, -2_000.0),
        ]);
        let ellps = Ellipsoid::wgs84();
        for method in Method::ALL {
            let def = ProjectionDef::new(method.name(), params.clone());
            let projector = Projector::new(&ellps, &def).unwrap();
            let (lam, phi) = (12.5 * DEG_TO_RAD, 43.25 * DEG_TO_RAD);
            let (x, y) = projector.forward(lam, phi).unwrap();
            let (lam2, phi2) = projector.inverse(x, y).unwrap();
            assert_relative_eq!(lam2, lam, epsilon = 1e-9);
            assert_relative_eq!(phi2, phi, epsilon = 1e-9);
        }
    }
}
