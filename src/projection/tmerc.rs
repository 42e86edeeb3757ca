use std::f64::consts::FRAC_PI_2;

use super::common::{EPSLN, adjust_lon};
use crate::crs::{DEG_TO_RAD, Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Widest longitude offset from the central meridian the ellipsoidal series accepts. The
/// forward/inverse round trip stays within a few millimetres out to here.
const MAX_DELTA_LON: f64 = 70.0 * DEG_TO_RAD;

/// Bound on the scaled isometric easting beyond which the series diverges.
const ETA_LIMIT: f64 = 2.623_395_162_778;

/// Transverse Mercator (Gauss-Krüger), the projection behind every UTM zone.
///
/// Ellipsoids use the extended Krüger series (Poder/Engsager) to sixth order in the third
/// flattening, which holds its accuracy far outside a UTM zone. Spheres use the closed form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransverseMercator {
    a: f64,
    k0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    form: Form,
}

#[derive(Debug, Clone, PartialEq)]
enum Form {
    Spherical {
        lat0: f64,
    },
    Ellipsoidal {
        /// Geodetic to conformal latitude.
        cbg: [f64; 6],
        /// Conformal to geodetic latitude.
        cgb: [f64; 6],
        /// Conformal sphere to ellipsoidal Gauss-Krüger.
        gtu: [f64; 6],
        /// Ellipsoidal Gauss-Krüger to conformal sphere.
        utg: [f64; 6],
        /// Meridian quadrant, scaled by `k0`.
        qn: f64,
        /// Northing of the latitude of origin.
        zb: f64,
    },
}

impl TransverseMercator {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let lat0 = def.get_or(Parameter::LatitudeOfOrigin, 0.0);
        let k0 = def.get_or(Parameter::ScaleFactor, 1.0);
        if k0 <= 0.0 {
            return Err(CrsError::validation(
                "k_0",
                format!("scale factor must be positive, got {k0}"),
            ));
        }
        let form = if ellps.is_sphere() {
            Form::Spherical { lat0 }
        } else {
            kruger(ellps.es(), k0, lat0)
        };
        Ok(TransverseMercator {
            a: ellps.a,
            k0,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            form,
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let delta_lon = adjust_lon(lam - self.lon0);
        match &self.form {
            Form::Spherical { lat0 } => {
                if delta_lon.abs() > FRAC_PI_2 {
                    return Err(too_far(lam, 90.0));
                }
                let cos_phi = phi.cos();
                let b = cos_phi * delta_lon.sin();
                if (b.abs() - 1.0).abs() < EPSLN {
                    return Err(CrsError::out_of_domain("point projects to infinity"));
                }
                let x = 0.5 * self.a * self.k0 * ((1.0 + b) / (1.0 - b)).ln() + self.x0;
                let mut y = cos_phi * delta_lon.cos() / (1.0 - b * b).sqrt();
                y = if y.abs() >= 1.0 { 0.0 } else { y.acos() };
                if phi < 0.0 {
                    y = -y;
                }
                let y = self.a * self.k0 * (y - lat0) + self.y0;
                Ok((x, y))
            }
            Form::Ellipsoidal {
                cbg, gtu, qn, zb, ..
            } => {
                if delta_lon.abs() > MAX_DELTA_LON {
                    return Err(too_far(lam, 70.0));
                }
                let cn = gatg(cbg, phi);
                let (sin_cn, cos_cn) = cn.sin_cos();
                let (sin_ce, cos_ce) = delta_lon.sin_cos();

                let cn = sin_cn.atan2(cos_ce * cos_cn);
                let ce = (sin_ce * cos_cn).atan2(sin_cn.hypot(cos_cn * cos_ce));
                let ce = ce.tan().asinh();

                let (dn, de) = clens_cmplx(gtu, 2.0 * cn, 2.0 * ce);
                let (cn, ce) = (cn + dn, ce + de);
                if ce.abs() > ETA_LIMIT {
                    return Err(CrsError::out_of_domain(
                        "point is outside the Transverse Mercator series domain",
                    ));
                }
                Ok((
                    self.a * (qn * ce) + self.x0,
                    self.a * (qn * cn + zb) + self.y0,
                ))
            }
        }
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = (x - self.x0) / self.a;
        let y = (y - self.y0) / self.a;

        match &self.form {
            Form::Spherical { lat0 } => {
                let f = (x / self.k0).exp();
                let g = 0.5 * (f - 1.0 / f);
                let temp = lat0 + y / self.k0;
                let h = temp.cos();
                let con = ((1.0 - h * h) / (1.0 + g * g)).sqrt();
                let mut phi = con.clamp(-1.0, 1.0).asin();
                if temp < 0.0 {
                    phi = -phi;
                }
                let lam = if g == 0.0 && h == 0.0 {
                    self.lon0
                } else {
                    adjust_lon(g.atan2(h) + self.lon0)
                };
                Ok((lam, phi))
            }
            Form::Ellipsoidal {
                cgb, utg, qn, zb, ..
            } => {
                let cn = (y - zb) / qn;
                let ce = x / qn;
                if ce.abs() > ETA_LIMIT {
                    return Err(CrsError::out_of_domain(
                        "easting is outside the Transverse Mercator series domain",
                    ));
                }
                let (dn, de) = clens_cmplx(utg, 2.0 * cn, 2.0 * ce);
                let (cn, ce) = (cn + dn, (ce + de).sinh().atan());

                let (sin_cn, cos_cn) = cn.sin_cos();
                let (sin_ce, cos_ce) = ce.sin_cos();
                let cn = (sin_cn * cos_ce).atan2(sin_ce.hypot(cos_ce * cos_cn));
                let ce = sin_ce.atan2(cos_ce * cos_cn);
                Ok((adjust_lon(ce + self.lon0), gatg(cgb, cn)))
            }
        }
    }
}

fn too_far(lam: f64, limit: f64) -> CrsError {
    CrsError::out_of_domain(format!(
        "longitude {:.6}° is more than {limit}° from the central meridian",
        lam.to_degrees()
    ))
}

/// Series coefficients for the ellipsoid with eccentricity squared `es`.
fn kruger(es: f64, k0: f64, lat0: f64) -> Form {
    let f = es / (1.0 + (1.0 - es).sqrt());
    let n = f / (2.0 - f);
    let mut cgb = [0.0; 6];
    let mut cbg = [0.0; 6];
    let mut utg = [0.0; 6];
    let mut gtu = [0.0; 6];

    let mut np = n;
    cgb[0] = n
        * (2.0
            + n * (-2.0 / 3.0
                + n * (-2.0 + n * (116.0 / 45.0 + n * (26.0 / 45.0 + n * (-2854.0 / 675.0))))));
    cbg[0] = n
        * (-2.0
            + n * (2.0 / 3.0
                + n * (4.0 / 3.0 + n * (-82.0 / 45.0 + n * (32.0 / 45.0 + n * (4642.0 / 4725.0))))));
    np *= n;
    cgb[1] = np
        * (7.0 / 3.0
            + n * (-8.0 / 5.0 + n * (-227.0 / 45.0 + n * (2704.0 / 315.0 + n * (2323.0 / 945.0)))));
    cbg[1] = np
        * (5.0 / 3.0
            + n * (-16.0 / 15.0 + n * (-13.0 / 9.0 + n * (904.0 / 315.0 + n * (-1522.0 / 945.0)))));
    np *= n;
    cgb[2] = np * (56.0 / 15.0 + n * (-136.0 / 35.0 + n * (-1262.0 / 105.0 + n * (73814.0 / 2835.0))));
    cbg[2] = np * (-26.0 / 15.0 + n * (34.0 / 21.0 + n * (8.0 / 5.0 + n * (-12686.0 / 2835.0))));
    np *= n;
    cgb[3] = np * (4279.0 / 630.0 + n * (-332.0 / 35.0 + n * (-399572.0 / 14175.0)));
    cbg[3] = np * (1237.0 / 630.0 + n * (-12.0 / 5.0 + n * (-24832.0 / 14175.0)));
    np *= n;
    cgb[4] = np * (4174.0 / 315.0 + n * (-144838.0 / 6237.0));
    cbg[4] = np * (-734.0 / 315.0 + n * (109598.0 / 31185.0));
    np *= n;
    cgb[5] = np * (601676.0 / 22275.0);
    cbg[5] = np * (444337.0 / 155925.0);

    let n2 = n * n;
    let qn = k0 / (1.0 + n) * (1.0 + n2 * (1.0 / 4.0 + n2 * (1.0 / 64.0 + n2 / 256.0)));

    np = n2;
    utg[0] = n
        * (-0.5
            + n * (2.0 / 3.0
                + n * (-37.0 / 96.0
                    + n * (1.0 / 360.0 + n * (81.0 / 512.0 + n * (-96199.0 / 604800.0))))));
    gtu[0] = n
        * (0.5
            + n * (-2.0 / 3.0
                + n * (5.0 / 16.0
                    + n * (41.0 / 180.0 + n * (-127.0 / 288.0 + n * (7891.0 / 37800.0))))));
    utg[1] = np
        * (-1.0 / 48.0
            + n * (-1.0 / 15.0
                + n * (437.0 / 1440.0 + n * (-46.0 / 105.0 + n * (1118711.0 / 3870720.0)))));
    gtu[1] = np
        * (13.0 / 48.0
            + n * (-3.0 / 5.0
                + n * (557.0 / 1440.0 + n * (281.0 / 630.0 + n * (-1983433.0 / 1935360.0)))));
    np *= n;
    utg[2] = np
        * (-17.0 / 480.0 + n * (37.0 / 840.0 + n * (209.0 / 4480.0 + n * (-5569.0 / 90720.0))));
    gtu[2] = np
        * (61.0 / 240.0
            + n * (-103.0 / 140.0 + n * (15061.0 / 26880.0 + n * (167603.0 / 181440.0))));
    np *= n;
    utg[3] = np * (-4397.0 / 161280.0 + n * (11.0 / 504.0 + n * (830251.0 / 7257600.0)));
    gtu[3] = np * (49561.0 / 161280.0 + n * (-179.0 / 168.0 + n * (6601661.0 / 7257600.0)));
    np *= n;
    utg[4] = np * (-4583.0 / 161280.0 + n * (108847.0 / 3991680.0));
    gtu[4] = np * (34729.0 / 80640.0 + n * (-3418889.0 / 1995840.0));
    np *= n;
    utg[5] = np * (-20648693.0 / 638668800.0);
    gtu[5] = np * (212378941.0 / 319334400.0);

    let z = gatg(&cbg, lat0);
    let zb = -qn * (z + clens(&gtu, 2.0 * z));
    Form::Ellipsoidal {
        cbg,
        cgb,
        gtu,
        utg,
        qn,
        zb,
    }
}

/// Latitude conversion `b + Σ pp[k]·sin(2(k+1)b)` by Clenshaw summation.
fn gatg(pp: &[f64; 6], b: f64) -> f64 {
    let cos_2b = 2.0 * (2.0 * b).cos();
    let mut h1 = pp[5];
    let mut h2 = 0.0;
    let mut h = h1;
    for &p in pp[..5].iter().rev() {
        h = -h2 + cos_2b * h1 + p;
        h2 = h1;
        h1 = h;
    }
    b + h * (2.0 * b).sin()
}

/// Real Clenshaw sum `Σ pp[k]·sin((k+1)·arg)`.
fn clens(pp: &[f64; 6], arg: f64) -> f64 {
    let r = 2.0 * arg.cos();
    let mut hr1 = pp[5];
    let mut hr2 = 0.0;
    let mut hr = hr1;
    for &p in pp[..5].iter().rev() {
        hr = -hr2 + r * hr1 + p;
        hr2 = hr1;
        hr1 = hr;
    }
    arg.sin() * hr
}

/// Complex Clenshaw sum over `arg_r + i·arg_i`, returned as (real, imaginary).
fn clens_cmplx(pp: &[f64; 6], arg_r: f64, arg_i: f64) -> (f64, f64) {
    let (sin_r, cos_r) = arg_r.sin_cos();
    let (sinh_i, cosh_i) = (arg_i.sinh(), arg_i.cosh());
    let r = 2.0 * cos_r * cosh_i;
    let i = -2.0 * sin_r * sinh_i;

    let mut hr = pp[5];
    let mut hi = 0.0;
    let (mut hr1, mut hi1) = (0.0, 0.0);
    for &p in pp[..5].iter().rev() {
        let (hr2, hi2) = (hr1, hi1);
        hr1 = hr;
        hi1 = hi;
        hr = -hr2 + r * hr1 - i * hi1 + p;
        hi = -hi2 + i * hr1 + r * hi1;
    }
    let r = sin_r * cosh_i;
    let i = cos_r * sinh_i;
    (r * hr - i * hi, r * hi + i * hr)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::CrsDefinition;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn utm33() -> TransverseMercator {
        let def = CrsDefinition::utm(33, false).unwrap();
        TransverseMercator::new(&def.ellipsoid, def.projection.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn central_meridian_is_scaled_meridian_arc() {
        let tm = utm33();
        let (x, y) = tm
            .forward(15f64.to_radians(), 45f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.9996 * 4_984_944.378, epsilon = 1e-2);
    }

    #[test]
    fn round_trip_inside_zone() {
        let tm = utm33();
        for (lon, lat) in [(12.0f64, 55.7f64), (17.9, 40.1), (15.0, 0.0), (13.4, -20.0)] {
            let (x, y) = tm.forward(lon.to_radians(), lat.to_radians()).unwrap();
            let (lam, phi) = tm.inverse(x, y).unwrap();
            assert_relative_eq!(lam.to_degrees(), lon, epsilon = 1e-9);
            assert_relative_eq!(phi.to_degrees(), lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn round_trip_far_from_central_meridian() {
        let tm = utm33();
        let (x, y) = tm.forward(45f64.to_radians(), 30f64.to_radians()).unwrap();
        assert_relative_eq!(x, 3_458_646.329_6, epsilon = 1e-3);
        assert_relative_eq!(y, 3_730_073.897_1, epsilon = 1e-3);

        for (lon, lat) in [
            (45.0f64, 30.0f64),
            (60.0, 30.0),
            (60.0, -45.0),
            (-30.0, 10.0),
            (75.0, 10.0),
            (80.0, 60.0),
        ] {
            let (x, y) = tm.forward(lon.to_radians(), lat.to_radians()).unwrap();
            let (lam, phi) = tm.inverse(x, y).unwrap();
            assert_relative_eq!(lam.to_degrees(), lon, epsilon = 1e-7);
            assert_relative_eq!(phi.to_degrees(), lat, epsilon = 1e-7);
        }
    }

    #[test]
    fn rejects_points_beyond_the_series_domain() {
        let tm = utm33();
        for lon in [100.0f64, 120.0, -60.0] {
            assert!(matches!(
                tm.forward(lon.to_radians(), 10f64.to_radians()),
                Err(CrsError::OutOfDomain(_))
            ));
        }
        assert!(matches!(
            tm.inverse(500_000.0 + 3.0 * 6_378_137.0, 0.0),
            Err(CrsError::OutOfDomain(_))
        ));
    }

    #[test]
    fn spherical_round_trip() {
        let sphere = Ellipsoid::by_name("sphere").unwrap();
        let def = ProjectionDef::new(
            "tmerc",
            BTreeMap::from([(Parameter::CentralMeridian, 9f64.to_radians())]),
        );
        let tm = TransverseMercator::new(&sphere, &def).unwrap();
        let (x, y) = tm.forward(11f64.to_radians(), (-30f64).to_radians()).unwrap();
        let (lam, phi) = tm.inverse(x, y).unwrap();
        assert_relative_eq!(lam, 11f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(phi, (-30f64).to_radians(), epsilon = 1e-12);
    }
}
