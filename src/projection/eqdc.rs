use super::common::{EPSLN, adjust_lon, enfn, inv_mlfn, mlfn, msfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Equidistant Conic: meridians keep their true length between one or two standard
/// parallels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EquidistantConic {
    a: f64,
    es: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    en: [f64; 5],
    ns: f64,
    g: f64,
    rh: f64,
}

impl EquidistantConic {
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
        let es = ellps.es();
        let e = ellps.e();
        let en = enfn(es);
        let arc = |phi: f64| mlfn(phi, phi.sin(), phi.cos(), &en);

        let (sin1, cos1) = lat1.sin_cos();
        let ms1 = msfnz(e, sin1, cos1);
        let ml1 = arc(lat1);
        let ns = if (lat1 - lat2).abs() < EPSLN {
            sin1
        } else {
            let ms2 = msfnz(e, lat2.sin(), lat2.cos());
            (ms1 - ms2) / (arc(lat2) - ml1)
        };
        let g = ml1 + ms1 / ns;
        Ok(EquidistantConic {
            a: ellps.a,
            es,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            en,
            ns,
            g,
            rh: ellps.a * (g - arc(lat0)),
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let ml = mlfn(phi, phi.sin(), phi.cos(), &self.en);
        let rh1 = self.a * (self.g - ml);
        let theta = self.ns * adjust_lon(lam - self.lon0);
        Ok((
            self.x0 + rh1 * theta.sin(),
            self.y0 + self.rh - rh1 * theta.cos(),
        ))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = x - self.x0;
        let y = self.rh - y + self.y0;
        let (rh1, con) = if self.ns >= 0.0 {
            (x.hypot(y), 1.0)
        } else {
            (-x.hypot(y), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let phi = inv_mlfn(self.g - rh1 / self.a, self.es, &self.en)?;
        Ok((adjust_lon(self.lon0 + theta / self.ns), phi))
    }
}
