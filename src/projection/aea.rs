use super::common::{EPSLN, adjust_lon, msfnz, phi1z, qsfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Albers Equal Area conic.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AlbersEqualArea {
    a: f64,
    e: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    ns0: f64,
    c: f64,
    rh: f64,
}

impl AlbersEqualArea {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let lat0 = def.get_or(Parameter::LatitudeOfOrigin, 0.0);
        let lat1 = def.get_or(Parameter::StandardParallel1, lat0);
        let lat2 = def.get_or(Parameter::StandardParallel2, lat1);
        if (lat1 + lat2).abs() < EPSLN {
            return Err(CrsError::validation(
                "lat_1",
                "standard parallels must not be symmetric about the equator",
            ));
        }
        let e = ellps.e();

        let (sin1, cos1) = lat1.sin_cos();
        let ms1 = msfnz(e, sin1, cos1);
        let qs1 = qsfnz(e, sin1);
        let (sin2, cos2) = lat2.sin_cos();
        let ms2 = msfnz(e, sin2, cos2);
        let qs2 = qsfnz(e, sin2);
        let qs0 = qsfnz(e, lat0.sin());

        let ns0 = if (lat1 - lat2).abs() > EPSLN {
            (ms1 * ms1 - ms2 * ms2) / (qs2 - qs1)
        } else {
            sin1
        };
        let c = ms1 * ms1 + ns0 * qs1;
        Ok(AlbersEqualArea {
            a: ellps.a,
            e,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            ns0,
            c,
            rh: ellps.a * (c - ns0 * qs0).sqrt() / ns0,
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let qs = qsfnz(self.e, phi.sin());
        let radicand = self.c - self.ns0 * qs;
        if radicand < 0.0 {
            return Err(CrsError::out_of_domain(
                "latitude lies outside the Albers cone",
            ));
        }
        let rh1 = self.a * radicand.sqrt() / self.ns0;
        let theta = self.ns0 * adjust_lon(lam - self.lon0);
        let x = rh1 * theta.sin() + self.x0;
        let y = self.rh - rh1 * theta.cos() + self.y0;
        Ok((x, y))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = x - self.x0;
        let y = self.rh - y + self.y0;
        let (rh1, con) = if self.ns0 >= 0.0 {
            (x.hypot(y), 1.0)
        } else {
            (-x.hypot(y), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let con = rh1 * self.ns0 / self.a;
        let qs = (self.c - con * con) / self.ns0;
        let phi = phi1z(self.e, qs)?;
        Ok((adjust_lon(theta / self.ns0 + self.lon0), phi))
    }
}
