//! Series and iteration helpers shared by the ellipsoidal projection formulas.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{CrsError, Result};

pub(crate) const EPSLN: f64 = 1.0e-10;

/// Slightly more than π, so that ±180° expressed through a rounded degree factor is not
/// wrapped to the opposite edge.
const SPI: f64 = 3.141_592_653_59;

/// Wrap a longitude difference into `[-π, π]`.
pub(crate) fn adjust_lon(lon: f64) -> f64 {
    if lon.abs() <= SPI {
        lon
    } else {
        lon - (lon / TAU).round() * TAU
    }
}

/// Fold a latitude difference back into `[-π/2, π/2]`.
pub(crate) fn adjust_lat(lat: f64) -> f64 {
    if lat.abs() < FRAC_PI_2 {
        lat
    } else {
        lat - lat.signum() * PI
    }
}

/// Radius of the parallel divided by the semi-major axis.
pub(crate) fn msfnz(e: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = e * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// Isometric-latitude helper `t` used by the conformal projections.
pub(crate) fn tsfnz(e: f64, phi: f64, sinphi: f64) -> f64 {
    let con = e * sinphi;
    let com = 0.5 * e;
    let con = ((1.0 - con) / (1.0 + con)).powf(com);
    (0.5 * (FRAC_PI_2 - phi)).tan() / con
}

/// Inverse of [`tsfnz`]: recover the latitude from `t`.
pub(crate) fn phi2z(e: f64, ts: f64) -> Result<f64> {
    let eccnth = 0.5 * e;
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..=15 {
        let con = e * phi.sin();
        let dphi =
            FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= EPSLN {
            return Ok(phi);
        }
    }
    Err(CrsError::out_of_domain(
        "latitude iteration did not converge",
    ))
}

/// Authalic `q` for the equal-area projections.
pub(crate) fn qsfnz(e: f64, sinphi: f64) -> f64 {
    if e > 1.0e-7 {
        let con = e * sinphi;
        (1.0 - e * e) * (sinphi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
    } else {
        2.0 * sinphi
    }
}

/// Inverse of [`qsfnz`].
pub(crate) fn phi1z(e: f64, qs: f64) -> Result<f64> {
    let mut phi = (0.5 * qs).clamp(-1.0, 1.0).asin();
    if e < EPSLN {
        return Ok(phi);
    }
    let eccnts = e * e;
    for _ in 0..25 {
        let sinphi = phi.sin();
        let cosphi = phi.cos();
        let con = e * sinphi;
        let com = 1.0 - con * con;
        let dphi = 0.5 * com * com / cosphi
            * (qs / (1.0 - eccnts) - sinphi / com + 0.5 / e * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() <= 1.0e-7 {
            return Ok(phi);
        }
    }
    Err(CrsError::out_of_domain(
        "authalic latitude iteration did not converge",
    ))
}

/// Coefficients of the meridional distance series.
pub(crate) fn enfn(es: f64) -> [f64; 5] {
    const C00: f64 = 1.0;
    const C02: f64 = 0.25;
    const C04: f64 = 0.046875;
    const C06: f64 = 0.01953125;
    const C08: f64 = 0.01068115234375;
    const C22: f64 = 0.75;
    const C44: f64 = 0.46875;
    const C46: f64 = 0.01302083333333333333;
    const C48: f64 = 0.00712076822916666666;
    const C66: f64 = 0.36458333333333333333;
    const C68: f64 = 0.00569661458333333333;
    const C88: f64 = 0.3076171875;

    let mut en = [0.0; 5];
    en[0] = C00 - es * (C02 + es * (C04 + es * (C06 + es * C08)));
    en[1] = es * (C22 - es * (C04 + es * (C06 + es * C08)));
    let mut t = es * es;
    en[2] = t * (C44 - es * (C46 + es * C48));
    t *= es;
    en[3] = t * (C66 - es * C68);
    en[4] = t * es * C88;
    en
}

/// Meridional distance from the equator to `phi`, in units of the semi-major axis.
pub(crate) fn mlfn(phi: f64, sphi: f64, cphi: f64, en: &[f64; 5]) -> f64 {
    let cphi = cphi * sphi;
    let sphi = sphi * sphi;
    en[0] * phi - cphi * (en[1] + sphi * (en[2] + sphi * (en[3] + sphi * en[4])))
}

/// Latitude whose meridional distance is `arg`.
pub(crate) fn inv_mlfn(arg: f64, es: f64, en: &[f64; 5]) -> Result<f64> {
    let k = 1.0 / (1.0 - es);
    let mut phi = arg;
    for _ in 0..20 {
        let s = phi.sin();
        let t = 1.0 - es * s * s;
        let t = (mlfn(phi, s, phi.cos(), en) - arg) * (t * t.sqrt()) * k;
        phi -= t;
        if t.abs() < EPSLN {
            return Ok(phi);
        }
    }
    Err(CrsError::out_of_domain(
        "meridional distance iteration did not converge",
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::Ellipsoid;
    use approx::assert_relative_eq;

    #[test]
    fn longitude_wrapping() {
        assert_relative_eq!(adjust_lon(PI + 0.5), -PI + 0.5, epsilon = 1e-12);
        assert_relative_eq!(adjust_lon(-3.0 * PI - 0.25), PI - 0.25, epsilon = 1e-12);
        assert_eq!(adjust_lon(1.0), 1.0);
        let east_edge = 180.0 * 0.017_453_292_519_943_3;
        assert_eq!(adjust_lon(east_edge), east_edge);
    }

    #[test]
    fn isometric_latitude_inverts() {
        let e = Ellipsoid::wgs84().e();
        for deg in [-80.0f64, -33.3, 0.0, 12.5, 60.0, 89.0] {
            let phi = deg.to_radians();
            let ts = tsfnz(e, phi, phi.sin());
            assert_relative_eq!(phi2z(e, ts).unwrap(), phi, epsilon = 1e-10);
        }
    }

    #[test]
    fn authalic_latitude_inverts() {
        let e = Ellipsoid::grs80().e();
        for deg in [-70.0f64, -10.0, 0.0, 45.0, 75.0] {
            let phi = deg.to_radians();
            let q = qsfnz(e, phi.sin());
            assert_relative_eq!(phi1z(e, q).unwrap(), phi, epsilon = 1e-7);
        }
    }

    #[test]
    fn meridian_arc_at_45_degrees() {
        let ellps = Ellipsoid::wgs84();
        let en = enfn(ellps.es());
        let phi = 45f64.to_radians();
        let arc = ellps.a * mlfn(phi, phi.sin(), phi.cos(), &en);
        assert_relative_eq!(arc, 4_984_944.378, epsilon = 1e-2);
        let back = inv_mlfn(arc / ellps.a, ellps.es(), &en).unwrap();
        assert_relative_eq!(back, phi, epsilon = 1e-11);
    }
}
