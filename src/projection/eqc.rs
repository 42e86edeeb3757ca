use std::f64::consts::FRAC_PI_2;

use super::common::{adjust_lat, adjust_lon};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Equidistant Cylindrical (Plate Carrée when the true-scale latitude is zero).
///
/// Always evaluated on the sphere of radius `a`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EquidistantCylindrical {
    a: f64,
    rc: f64,
    lat0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
}

impl EquidistantCylindrical {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let lat_ts = def.get_or(Parameter::LatitudeOfTrueScale, 0.0);
        if lat_ts.abs() >= FRAC_PI_2 {
            return Err(CrsError::validation(
                "lat_ts",
                "latitude of true scale must be strictly between the poles",
            ));
        }
        Ok(EquidistantCylindrical {
            a: ellps.a,
            rc: lat_ts.cos(),
            lat0: def.get_or(Parameter::LatitudeOfOrigin, 0.0),
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let dlon = adjust_lon(lam - self.lon0);
        let dlat = adjust_lat(phi - self.lat0);
        Ok((self.x0 + self.a * dlon * self.rc, self.y0 + self.a * dlat))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let lam = adjust_lon(self.lon0 + (x - self.x0) / (self.a * self.rc));
        let phi = adjust_lat(self.lat0 + (y - self.y0) / self.a);
        Ok((lam, phi))
    }
}
