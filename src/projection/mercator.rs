use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{EPSLN, adjust_lon, msfnz, phi2z, tsfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Normal-aspect Mercator, ellipsoidal or spherical.
///
/// Web Mercator is the spherical variant evaluated on the datum's semi-major axis with
/// geodetic latitudes fed in unchanged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mercator {
    a: f64,
    e: f64,
    k0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    spherical: bool,
}

impl Mercator {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let e = ellps.e();
        let spherical = ellps.is_sphere();
        let k0 = match def.get(Parameter::LatitudeOfTrueScale) {
            Some(lat_ts) if lat_ts.abs() >= FRAC_PI_2 => {
                return Err(CrsError::validation(
                    "lat_ts",
                    "latitude of true scale must be strictly between the poles",
                ));
            }
            Some(lat_ts) if spherical => lat_ts.cos(),
            Some(lat_ts) => msfnz(e, lat_ts.sin(), lat_ts.cos()),
            None => def.get_or(Parameter::ScaleFactor, 1.0),
        };
        Ok(Mercator {
            a: ellps.a,
            e,
            k0,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            spherical,
        })
    }

    pub(crate) fn web(ellps: &Ellipsoid, def: &ProjectionDef) -> Self {
        Mercator {
            a: ellps.a,
            e: 0.0,
            k0: 1.0,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            spherical: true,
        }
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        if (phi.abs() - FRAC_PI_2).abs() <= EPSLN || phi.abs() > FRAC_PI_2 {
            return Err(CrsError::out_of_domain(
                "Mercator is undefined at the poles",
            ));
        }
        let ak0 = self.a * self.k0;
        let x = self.x0 + ak0 * adjust_lon(lam - self.lon0);
        let y = if self.spherical {
            self.y0 + ak0 * (FRAC_PI_4 + 0.5 * phi).tan().ln()
        } else {
            self.y0 - ak0 * tsfnz(self.e, phi, phi.sin()).ln()
        };
        Ok((x, y))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let ak0 = self.a * self.k0;
        let x = x - self.x0;
        let y = y - self.y0;
        let phi = if self.spherical {
            FRAC_PI_2 - 2.0 * (-y / ak0).exp().atan()
        } else {
            phi2z(self.e, (-y / ak0).exp())?
        };
        let lam = adjust_lon(self.lon0 + x / ak0);
        Ok((lam, phi))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    #[test]
    fn variant_a_on_bessel() {
        // Makassar / NEIEZ
        let ellps = Ellipsoid::by_name("bessel").unwrap();
        let def = ProjectionDef::new(
            "Mercator (variant A)",
            BTreeMap::from([
                (Parameter::CentralMeridian, 110f64.to_radians()),
                (Parameter::ScaleFactor, 0.997),
                (Parameter::FalseEasting, 3_900_000.0),
                (Parameter::FalseNorthing, 900_000.0),
            ]),
        );
        let merc = Mercator::new(&ellps, &def).unwrap();
        let (x, y) = merc
            .forward(120f64.to_radians(), (-3f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 5_009_726.58, epsilon = 0.01);
        assert_relative_eq!(y, 569_150.82, epsilon = 0.01);

        let (lam, phi) = merc.inverse(x, y).unwrap();
        assert_relative_eq!(lam, 120f64.to_radians(), epsilon = 1e-10);
        assert_relative_eq!(phi, (-3f64).to_radians(), epsilon = 1e-10);
    }

    #[test]
    fn web_mercator_extent() {
        let merc = Mercator::web(&Ellipsoid::wgs84(), &ProjectionDef::new("webmerc", BTreeMap::new()));
        let (x, y) = merc.forward(std::f64::consts::PI, 0.0).unwrap();
        assert_relative_eq!(x, 20_037_508.342_789_244, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0);
        let (_, y) = merc.forward(0.0, 85.051_128_779_806_6f64.to_radians()).unwrap();
        assert_relative_eq!(y, 20_037_508.342_789_244, epsilon = 1e-3);
    }

    #[test]
    fn poles_are_out_of_domain() {
        let merc = Mercator::new(
            &Ellipsoid::wgs84(),
            &ProjectionDef::new("Mercator_1SP", BTreeMap::new()),
        )
        .unwrap();
        assert!(matches!(
            merc.forward(0.0, FRAC_PI_2),
            Err(CrsError::OutOfDomain(_))
        ));
    }

    #[test]
    fn true_scale_latitude_shrinks_scale() {
        let def = ProjectionDef::new(
            "Mercator_2SP",
            BTreeMap::from([(Parameter::StandardParallel1, 45f64.to_radians())]),
        );
        let merc = Mercator::new(&Ellipsoid::wgs84(), &def).unwrap();
        assert!(merc.k0 < 0.71 && merc.k0 > 0.70);
    }
}
