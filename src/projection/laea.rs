use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::common::{EPSLN, adjust_lon, qsfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Lambert Azimuthal Equal Area, in polar, equatorial and oblique aspects.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LambertAzimuthalEqualArea {
    a: f64,
    e: f64,
    lat0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    mode: Mode,
    sin_lat0: f64,
    cos_lat0: f64,
    /// Ellipsoidal constants; `None` on a sphere.
    authalic: Option<Authalic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    NorthPole,
    SouthPole,
    Equatorial,
    Oblique,
}

#[derive(Debug, Clone, PartialEq)]
struct Authalic {
    qp: f64,
    rq: f64,
    dd: f64,
    xmf: f64,
    ymf: f64,
    sinb1: f64,
    cosb1: f64,
    /// Series from authalic back to geodetic latitude.
    apa: [f64; 3],
}

impl LambertAzimuthalEqualArea {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let lat0 = def.get_or(Parameter::LatitudeOfOrigin, 0.0);
        let mode = if (lat0.abs() - FRAC_PI_2).abs() < EPSLN {
            if lat0 < 0.0 { Mode::SouthPole } else { Mode::NorthPole }
        } else if lat0.abs() < EPSLN {
            Mode::Equatorial
        } else {
            Mode::Oblique
        };
        let (sin_lat0, cos_lat0) = lat0.sin_cos();

        let authalic = if ellps.is_sphere() {
            None
        } else {
            let es = ellps.es();
            let e = ellps.e();
            let qp = qsfnz(e, 1.0);
            let rq = (0.5 * qp).sqrt();
            let (dd, xmf, ymf, sinb1, cosb1) = match mode {
                Mode::NorthPole | Mode::SouthPole => (1.0, 1.0, 1.0, 0.0, 1.0),
                Mode::Equatorial => (1.0 / rq, 1.0, 0.5 * qp, 0.0, 1.0),
                Mode::Oblique => {
                    let sinb1 = qsfnz(e, sin_lat0) / qp;
                    let cosb1 = (1.0 - sinb1 * sinb1).sqrt();
                    let dd = cos_lat0 / ((1.0 - es * sin_lat0 * sin_lat0).sqrt() * rq * cosb1);
                    (dd, rq * dd, rq / dd, sinb1, cosb1)
                }
            };
            Some(Authalic {
                qp,
                rq,
                dd,
                xmf,
                ymf,
                sinb1,
                cosb1,
                apa: authset(es),
            })
        };

        Ok(LambertAzimuthalEqualArea {
            a: ellps.a,
            e: ellps.e(),
            lat0,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            mode,
            sin_lat0,
            cos_lat0,
            authalic,
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let lam = adjust_lon(lam - self.lon0);
        let (sin_lam, cos_lam) = lam.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();

        let (x, y) = match &self.authalic {
            None => match self.mode {
                Mode::Equatorial | Mode::Oblique => {
                    let denom = if self.mode == Mode::Equatorial {
                        1.0 + cos_phi * cos_lam
                    } else {
                        1.0 + self.sin_lat0 * sin_phi + self.cos_lat0 * cos_phi * cos_lam
                    };
                    if denom <= EPSLN {
                        return Err(antipode());
                    }
                    let k = (2.0 / denom).sqrt();
                    let y = if self.mode == Mode::Equatorial {
                        k * sin_phi
                    } else {
                        k * (self.cos_lat0 * sin_phi - self.sin_lat0 * cos_phi * cos_lam)
                    };
                    (k * cos_phi * sin_lam, y)
                }
                Mode::NorthPole | Mode::SouthPole => {
                    if (phi + self.lat0).abs() < EPSLN {
                        return Err(antipode());
                    }
                    let half = FRAC_PI_4 - 0.5 * phi;
                    let rho = if self.mode == Mode::SouthPole {
                        2.0 * half.cos()
                    } else {
                        2.0 * half.sin()
                    };
                    let cos_lam = if self.mode == Mode::NorthPole { -cos_lam } else { cos_lam };
                    (rho * sin_lam, rho * cos_lam)
                }
            },
            Some(auth) => {
                let q = qsfnz(self.e, sin_phi);
                match self.mode {
                    Mode::Equatorial | Mode::Oblique => {
                        let sinb = q / auth.qp;
                        let cosb = (1.0 - sinb * sinb).sqrt();
                        let denom = if self.mode == Mode::Oblique {
                            1.0 + auth.sinb1 * sinb + auth.cosb1 * cosb * cos_lam
                        } else {
                            1.0 + cosb * cos_lam
                        };
                        if denom.abs() < EPSLN {
                            return Err(antipode());
                        }
                        let b = (2.0 / denom).sqrt();
                        let y = if self.mode == Mode::Oblique {
                            auth.ymf * b * (auth.cosb1 * sinb - auth.sinb1 * cosb * cos_lam)
                        } else {
                            auth.ymf * b * sinb
                        };
                        (auth.xmf * b * cosb * sin_lam, y)
                    }
                    Mode::NorthPole | Mode::SouthPole => {
                        let (b, q) = if self.mode == Mode::NorthPole {
                            (FRAC_PI_2 + phi, auth.qp - q)
                        } else {
                            (phi - FRAC_PI_2, auth.qp + q)
                        };
                        if b.abs() < EPSLN {
                            return Err(antipode());
                        }
                        let rho = q.max(0.0).sqrt();
                        let y = if self.mode == Mode::SouthPole { rho } else { -rho };
                        (rho * sin_lam, y * cos_lam)
                    }
                }
            }
        };
        Ok((self.a * x + self.x0, self.a * y + self.y0))
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut x = (x - self.x0) / self.a;
        let mut y = (y - self.y0) / self.a;

        let (lam, phi) = match &self.authalic {
            None => {
                let rh = x.hypot(y);
                let half = rh * 0.5;
                if half > 1.0 {
                    return Err(beyond_hemisphere());
                }
                let z = 2.0 * half.asin();
                let (sin_z, cos_z) = z.sin_cos();
                let phi = match self.mode {
                    Mode::Equatorial => {
                        let phi = if rh <= EPSLN { 0.0 } else { (y * sin_z / rh).asin() };
                        x *= sin_z;
                        y = cos_z * rh;
                        phi
                    }
                    Mode::Oblique => {
                        let phi = if rh <= EPSLN {
                            self.lat0
                        } else {
                            (cos_z * self.sin_lat0 + y * sin_z * self.cos_lat0 / rh)
                                .clamp(-1.0, 1.0)
                                .asin()
                        };
                        x *= sin_z * self.cos_lat0;
                        y = (cos_z - phi.sin() * self.sin_lat0) * rh;
                        phi
                    }
                    Mode::NorthPole => {
                        y = -y;
                        FRAC_PI_2 - z
                    }
                    Mode::SouthPole => z - FRAC_PI_2,
                };
                let lam = if y == 0.0 && matches!(self.mode, Mode::Equatorial | Mode::Oblique) {
                    0.0
                } else {
                    x.atan2(y)
                };
                (lam, phi)
            }
            Some(auth) => {
                let ab = match self.mode {
                    Mode::Equatorial | Mode::Oblique => {
                        x /= auth.dd;
                        y *= auth.dd;
                        let rho = x.hypot(y);
                        if rho < EPSLN {
                            return Ok((self.lon0, self.lat0));
                        }
                        let ratio = 0.5 * rho / auth.rq;
                        if ratio > 1.0 {
                            return Err(beyond_hemisphere());
                        }
                        let s_ce = 2.0 * ratio.asin();
                        let (sin_ce, cos_ce) = s_ce.sin_cos();
                        x *= sin_ce;
                        if self.mode == Mode::Oblique {
                            let ab = cos_ce * auth.sinb1 + y * sin_ce * auth.cosb1 / rho;
                            y = rho * auth.cosb1 * cos_ce - y * auth.sinb1 * sin_ce;
                            ab
                        } else {
                            let ab = y * sin_ce / rho;
                            y = rho * cos_ce;
                            ab
                        }
                    }
                    Mode::NorthPole | Mode::SouthPole => {
                        if self.mode == Mode::NorthPole {
                            y = -y;
                        }
                        let q = x * x + y * y;
                        if q == 0.0 {
                            return Ok((self.lon0, self.lat0));
                        }
                        let ab = 1.0 - q / auth.qp;
                        if self.mode == Mode::SouthPole { -ab } else { ab }
                    }
                };
                (x.atan2(y), authlat(ab.clamp(-1.0, 1.0).asin(), &auth.apa))
            }
        };
        Ok((adjust_lon(self.lon0 + lam), phi))
    }
}

fn authset(es: f64) -> [f64; 3] {
    const P00: f64 = 0.333_333_333_333_333_33;
    const P01: f64 = 0.172_222_222_222_222_22;
    const P02: f64 = 0.102_579_365_079_365_08;
    const P10: f64 = 0.063_888_888_888_888_89;
    const P11: f64 = 0.066_402_116_402_116_4;
    const P20: f64 = 0.016_415_012_942_191_544;

    let t = es * es;
    [
        es * P00 + t * P01 + t * es * P02,
        t * P10 + t * es * P11,
        t * es * P20,
    ]
}

/// Geodetic latitude from authalic latitude `beta`.
fn authlat(beta: f64, apa: &[f64; 3]) -> f64 {
    let t = beta + beta;
    beta + apa[0] * t.sin() + apa[1] * (t + t).sin() + apa[2] * (t + t + t).sin()
}

fn antipode() -> CrsError {
    CrsError::out_of_domain("the antipode of the projection centre cannot be projected")
}

fn beyond_hemisphere() -> CrsError {
    CrsError::out_of_domain("point lies outside the projected disc")
}
