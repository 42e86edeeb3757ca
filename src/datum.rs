//! Datum shifts through earth-centred, earth-fixed coordinates.
//!
//! Both datums are related to WGS84 by their Helmert parameters: a point is lifted to
//! geocentric XYZ on the source ellipsoid, shifted to WGS84, shifted from WGS84 into the
//! target datum, and dropped back to geodetic coordinates on the target ellipsoid.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::crs::{CrsDefinition, DatumShift, Ellipsoid, SEC_TO_RAD, normalize_name};
use crate::error::{CrsError, Result};

const GENAU: f64 = 1.0e-12;
const GENAU2: f64 = GENAU * GENAU;
const MAX_ITER: usize = 30;

/// Geodetic longitude, latitude (radians) and height (metres) to geocentric XYZ.
pub fn geodetic_to_geocentric(ellps: &Ellipsoid, lam: f64, phi: f64, h: f64) -> Result<[f64; 3]> {
    let phi = if phi < -FRAC_PI_2 && phi > -1.001 * FRAC_PI_2 {
        -FRAC_PI_2
    } else if phi > FRAC_PI_2 && phi < 1.001 * FRAC_PI_2 {
        FRAC_PI_2
    } else if phi.abs() > FRAC_PI_2 {
        return Err(CrsError::out_of_domain(format!(
            "latitude {:.6}° is beyond the poles",
            phi.to_degrees()
        )));
    } else {
        phi
    };
    let lam = if lam > PI { lam - TAU } else { lam };

    let a = ellps.a;
    let es = ellps.es();
    let (sin_lat, cos_lat) = phi.sin_cos();
    let rn = a / (1.0 - es * sin_lat * sin_lat).sqrt();
    Ok([
        (rn + h) * cos_lat * lam.cos(),
        (rn + h) * cos_lat * lam.sin(),
        (rn * (1.0 - es) + h) * sin_lat,
    ])
}

/// Geocentric XYZ back to geodetic longitude, latitude (radians) and height (metres).
pub fn geocentric_to_geodetic(ellps: &Ellipsoid, xyz: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = xyz;
    let a = ellps.a;
    let es = ellps.es();

    let p = x.hypot(y);
    let rr = (x * x + y * y + z * z).sqrt();

    let lam = if p / a < GENAU {
        if rr / a < GENAU {
            return (0.0, FRAC_PI_2, -ellps.b());
        }
        0.0
    } else {
        y.atan2(x)
    };

    let ct = z / rr;
    let st = p / rr;
    let rx = 1.0 / (1.0 - es * (2.0 - es) * st * st).sqrt();
    let mut cphi0 = st * (1.0 - es) * rx;
    let mut sphi0 = ct * rx;
    let mut cphi;
    let mut sphi;
    let mut height;
    let mut iter = 0;
    loop {
        iter += 1;
        let rn = a / (1.0 - es * sphi0 * sphi0).sqrt();
        height = p * cphi0 + z * sphi0 - rn * (1.0 - es * sphi0 * sphi0);
        let rk = es * rn / (rn + height);
        let rx = 1.0 / (1.0 - rk * (2.0 - rk) * st * st).sqrt();
        cphi = st * (1.0 - rk) * rx;
        sphi = ct * rx;
        let sdphi = sphi * cphi0 - cphi * sphi0;
        cphi0 = cphi;
        sphi0 = sphi;
        if sdphi * sdphi <= GENAU2 || iter >= MAX_ITER {
            break;
        }
    }
    (lam, (sphi / cphi.abs()).atan(), height)
}

impl DatumShift {
    /// Apply the position-vector Helmert transform, taking XYZ on this datum to WGS84.
    pub fn to_wgs84(&self, xyz: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = xyz;
        let m = self.scale;
        [
            m * (x - self.rz * y + self.ry * z) + self.dx,
            m * (self.rz * x + y - self.rx * z) + self.dy,
            m * (-self.ry * x + self.rx * y + z) + self.dz,
        ]
    }

    /// Inverse of [`DatumShift::to_wgs84`], to first order in the rotations.
    pub fn from_wgs84(&self, xyz: [f64; 3]) -> [f64; 3] {
        let m = self.scale;
        let x = (xyz[0] - self.dx) / m;
        let y = (xyz[1] - self.dy) / m;
        let z = (xyz[2] - self.dz) / m;
        [
            x + self.rz * y - self.ry * z,
            -self.rz * x + y + self.rx * z,
            self.ry * x - self.rx * y + z,
        ]
    }
}

/// Build a shift from named Helmert parameters, as WKT2 abridged transformations and
/// PROJJSON bound CRSs spell them.
///
/// Each value comes with its unit's conversion factor when the source declared one;
/// otherwise translations are taken as metres, rotations as arc-seconds and the scale
/// difference as parts per million. Coordinate-frame methods have their rotations flipped
/// into the position-vector convention.
pub(crate) fn helmert_from_parameters<'p>(
    method: &str,
    parameters: impl IntoIterator<Item = (&'p str, f64, Option<f64>)>,
) -> DatumShift {
    let mut shift = DatumShift::IDENTITY;
    for (name, value, factor) in parameters {
        match normalize_name(name).as_str() {
            "x_axis_translation" => shift.dx = value * factor.unwrap_or(1.0),
            "y_axis_translation" => shift.dy = value * factor.unwrap_or(1.0),
            "z_axis_translation" => shift.dz = value * factor.unwrap_or(1.0),
            "x_axis_rotation" => shift.rx = value * factor.unwrap_or(SEC_TO_RAD),
            "y_axis_rotation" => shift.ry = value * factor.unwrap_or(SEC_TO_RAD),
            "z_axis_rotation" => shift.rz = value * factor.unwrap_or(SEC_TO_RAD),
            "scale_difference" => shift.scale = 1.0 + value * factor.unwrap_or(1.0e-6),
            other => log::debug!("ignoring transformation parameter `{other}`"),
        }
    }
    if normalize_name(method).contains("coordinate_frame") {
        shift.rx = -shift.rx;
        shift.ry = -shift.ry;
        shift.rz = -shift.rz;
    }
    shift
}

/// Move a geodetic point from `from`'s datum to `to`'s.
///
/// Coordinates are radians and metres, longitudes relative to Greenwich.
pub(crate) fn shift(
    from: &CrsDefinition,
    to: &CrsDefinition,
    lam: f64,
    phi: f64,
    h: f64,
) -> Result<(f64, f64, f64)> {
    if from.shares_datum_with(to) {
        log::trace!("datums match, no shift between {} and {}", from.name, to.name);
        return Ok((lam, phi, h));
    }
    log::trace!("shifting {} -> {} through geocentric WGS84", from.name, to.name);
    let xyz = geodetic_to_geocentric(&from.ellipsoid, lam, phi, h)?;
    let xyz = if from.datum_shift.is_identity() {
        xyz
    } else {
        from.datum_shift.to_wgs84(xyz)
    };
    let xyz = if to.datum_shift.is_identity() {
        xyz
    } else {
        to.datum_shift.from_wgs84(xyz)
    };
    Ok(geocentric_to_geodetic(&to.ellipsoid, xyz))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::DEG_TO_RAD;
    use approx::assert_relative_eq;

    fn osgb36() -> CrsDefinition {
        CrsDefinition {
            datum_shift: DatumShift::from_towgs84(&[
                446.448, -125.157, 542.06, 0.15, 0.247, 0.842, -20.489,
            ])
            .unwrap(),
            ..CrsDefinition::geographic("OSGB36", Ellipsoid::by_name("airy").unwrap())
        }
    }

    #[test]
    fn equator_on_greenwich() {
        let xyz = geodetic_to_geocentric(&Ellipsoid::wgs84(), 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(xyz[0], 6_378_137.0);
        assert_relative_eq!(xyz[1], 0.0);
        assert_relative_eq!(xyz[2], 0.0);
    }

    #[test]
    fn geocentric_round_trip() {
        let ellps = Ellipsoid::wgs84();
        for (lon, lat, h) in [(-2.0f64, 53.0f64, 120.0), (151.2, -33.9, 0.0), (0.0, 89.9, 10.0)] {
            let xyz = geodetic_to_geocentric(&ellps, lon * DEG_TO_RAD, lat * DEG_TO_RAD, h).unwrap();
            let (lam, phi, h2) = geocentric_to_geodetic(&ellps, xyz);
            assert_relative_eq!(lam / DEG_TO_RAD, lon, epsilon = 1e-10);
            assert_relative_eq!(phi / DEG_TO_RAD, lat, epsilon = 1e-10);
            assert_relative_eq!(h2, h, epsilon = 1e-6);
        }
    }

    #[test]
    fn geocentric_centre_is_pole() {
        let (_, phi, h) = geocentric_to_geodetic(&Ellipsoid::wgs84(), [0.0, 0.0, 0.0]);
        assert_relative_eq!(phi, FRAC_PI_2);
        assert_relative_eq!(h, -Ellipsoid::wgs84().b());
    }

    #[test]
    fn beyond_pole_is_rejected() {
        assert!(geodetic_to_geocentric(&Ellipsoid::wgs84(), 0.0, 2.0, 0.0).is_err());
    }

    #[test]
    fn helmert_inverts() {
        let shift = osgb36().datum_shift;
        let xyz = [3_909_833.018, -147_097.138, 5_020_322.523];
        let back = shift.from_wgs84(shift.to_wgs84(xyz));
        for i in 0..3 {
            assert_relative_eq!(back[i], xyz[i], epsilon = 1e-3);
        }
    }

    #[test]
    fn osgb36_shift_round_trip() {
        let wgs84 = CrsDefinition::wgs84();
        let osgb = osgb36();
        let (lam, phi, h) = shift(&wgs84, &osgb, -2.0 * DEG_TO_RAD, 53.0 * DEG_TO_RAD, 0.0).unwrap();
        // OSGB36 sits roughly 100 m east of WGS84 in this part of England.
        let moved = ((lam / DEG_TO_RAD + 2.0).abs(), (phi / DEG_TO_RAD - 53.0).abs());
        assert!(moved.0 > 1e-4 && moved.0 < 1e-2, "{moved:?}");
        assert!(moved.1 < 1e-2);

        let (lam2, phi2, h2) = shift(&osgb, &wgs84, lam, phi, h).unwrap();
        assert_relative_eq!(lam2 / DEG_TO_RAD, -2.0, epsilon = 1e-7);
        assert_relative_eq!(phi2 / DEG_TO_RAD, 53.0, epsilon = 1e-7);
        assert_relative_eq!(h2, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn named_helmert_parameters() {
        let shift = helmert_from_parameters(
            "Coordinate Frame rotation (geog2D domain)",
            [
                ("X-axis translation", 1.0, None),
                ("Y-axis translation", 2.0, Some(1.0)),
                ("Z-axis translation", 3.0, None),
                ("X-axis rotation", 0.5, None),
                ("Z-axis rotation", 1.0e-6, Some(1.0)),
                ("Scale difference", 2.0, None),
                ("Wobble", 9.0, None),
            ],
        );
        assert_eq!((shift.dx, shift.dy, shift.dz), (1.0, 2.0, 3.0));
        assert_relative_eq!(shift.rx, -0.5 * SEC_TO_RAD);
        assert_relative_eq!(shift.rz, -1.0e-6);
        assert_relative_eq!(shift.scale, 1.000_002);
    }

    #[test]
    fn same_datum_passes_through() {
        let nad83 = CrsDefinition::nad83();
        let wgs84 = CrsDefinition::wgs84();
        let out = shift(&nad83, &wgs84, 0.3, 0.4, 5.0).unwrap();
        assert_eq!(out, (0.3, 0.4, 5.0));
    }
}
