use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{EPSLN, adjust_lon, msfnz, phi2z, tsfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Lambert Conformal Conic with one or two standard parallels.
///
/// The one-parallel form takes its standard parallel from the latitude of origin.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LambertConformalConic {
    a: f64,
    e: f64,
    k0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    ns: f64,
    f0: f64,
    rh: f64,
}

impl LambertConformalConic {
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
        let ts1 = tsfnz(e, lat1, sin1);
        let (sin2, cos2) = lat2.sin_cos();
        let ms2 = msfnz(e, sin2, cos2);
        let ts2 = tsfnz(e, lat2, sin2);
        let ts0 = if (lat0.abs() - FRAC_PI_2).abs() < EPSLN {
            0.0
        } else {
            tsfnz(e, lat0, lat0.sin())
        };

        let mut ns = if (lat1 - lat2).abs() > EPSLN {
            (ms1 / ms2).ln() / (ts1 / ts2).ln()
        } else {
            sin1
        };
        if ns.is_nan() {
            ns = sin1;
        }
        let f0 = ms1 / (ns * ts1.powf(ns));
        Ok(LambertConformalConic {
            a: ellps.a,
            e,
            k0: def.get_or(Parameter::ScaleFactor, 1.0),
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            ns,
            f0,
            rh: ellps.a * f0 * ts0.powf(ns),
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let phi = if (2.0 * phi.abs() - PI).abs() <= EPSLN {
            phi.signum() * (FRAC_PI_2 - 2.0 * EPSLN)
        } else {
            phi
        };
        let rh1 = if (phi.abs() - FRAC_PI_2).abs() > EPSLN {
            let ts = tsfnz(self.e, phi, phi.sin());
            self.a * self.f0 * ts.powf(self.ns)
        } else {
            if phi * self.ns <= 0.0 {
                return Err(CrsError::out_of_domain(
                    "pole opposite the cone apex cannot be projected",
                ));
            }
            0.0
        };
        let theta = self.ns * adjust_lon(lam - self.lon0);
        let x = self.k0 * (rh1 * theta.sin()) + self.x0;
        let y = self.k0 * (self.rh - rh1 * theta.cos()) + self.y0;
        Ok((x, y))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = (x - self.x0) / self.k0;
        let y = self.rh - (y - self.y0) / self.k0;
        let (rh1, con) = if self.ns > 0.0 {
            (x.hypot(y), 1.0)
        } else {
            (-x.hypot(y), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let phi = if rh1 != 0.0 || self.ns > 0.0 {
            let ts = (rh1 / (self.a * self.f0)).powf(1.0 / self.ns);
            phi2z(self.e, ts)?
        } else {
            -FRAC_PI_2
        };
        Ok((adjust_lon(theta / self.ns + self.lon0), phi))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    const US_FOOT: f64 = 0.304_800_609_601_219_2;

    fn dms(d: f64, m: f64) -> f64 {
        (d.abs() + m / 60.0).copysign(d).to_radians()
    }

    #[test]
    fn texas_south_central_two_parallels() {
        // NAD27 / Texas South Central
        let clarke = Ellipsoid::by_name("clrk66").unwrap();
        let def = ProjectionDef::new(
            "Lambert_Conformal_Conic_2SP",
            BTreeMap::from([
                (Parameter::StandardParallel1, dms(28.0, 23.0)),
                (Parameter::StandardParallel2, dms(30.0, 17.0)),
                (Parameter::LatitudeOfOrigin, dms(27.0, 50.0)),
                (Parameter::CentralMeridian, (-99f64).to_radians()),
                (Parameter::FalseEasting, 2_000_000.0 * US_FOOT),
            ]),
        );
        let lcc = LambertConformalConic::new(&clarke, &def).unwrap();
        let (x, y) = lcc
            .forward((-96f64).to_radians(), dms(28.0, 30.0))
            .unwrap();
        assert_relative_eq!(x / US_FOOT, 2_963_503.91, epsilon = 0.01);
        assert_relative_eq!(y / US_FOOT, 254_759.80, epsilon = 0.01);

        let (lam, phi) = lcc.inverse(x, y).unwrap();
        assert_relative_eq!(lam, (-96f64).to_radians(), epsilon = 1e-11);
        assert_relative_eq!(phi, dms(28.0, 30.0), epsilon = 1e-10);
    }

    #[test]
    fn one_parallel_origin_maps_to_false_origin() {
        let def = ProjectionDef::new(
            "Lambert_Conformal_Conic_1SP",
            BTreeMap::from([
                (Parameter::LatitudeOfOrigin, 46.8f64.to_radians()),
                (Parameter::CentralMeridian, 2.337_229f64.to_radians()),
                (Parameter::ScaleFactor, 0.999_877_34),
                (Parameter::FalseEasting, 600_000.0),
                (Parameter::FalseNorthing, 2_200_000.0),
            ]),
        );
        let lcc = LambertConformalConic::new(&Ellipsoid::by_name("clrk66").unwrap(), &def).unwrap();
        let (x, y) = lcc
            .forward(2.337_229f64.to_radians(), 46.8f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 600_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 2_200_000.0, epsilon = 1e-6);
    }

    #[test]
    fn symmetric_parallels_are_rejected() {
        let def = ProjectionDef::new(
            "lcc",
            BTreeMap::from([
                (Parameter::StandardParallel1, 0.3),
                (Parameter::StandardParallel2, -0.3),
            ]),
        );
        assert!(LambertConformalConic::new(&Ellipsoid::wgs84(), &def).is_err());
    }
}
