use std::f64::consts::{FRAC_PI_2, PI};

use super::common::{EPSLN, adjust_lon, msfnz, phi2z, tsfnz};
use crate::crs::{Ellipsoid, Parameter, ProjectionDef};
use crate::error::{CrsError, Result};

/// Stereographic, centred on a pole or on any point through the conformal latitude.
///
/// A polar aspect with a latitude of true scale and no explicit scale factor derives `k0`
/// from that latitude (Polar Stereographic variant B).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stereographic {
    a: f64,
    e: f64,
    k0: f64,
    lat0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    aspect: Aspect,
}

#[derive(Debug, Clone, PartialEq)]
enum Aspect {
    Spherical { sin_lat0: f64, cos_lat0: f64 },
    /// `con` is `1` at the north pole and `-1` at the south pole.
    Polar { con: f64, cons: f64 },
    Oblique { ms1: f64, chi0: f64, sin_chi0: f64, cos_chi0: f64 },
}

impl Stereographic {
    pub(crate) fn new(ellps: &Ellipsoid, def: &ProjectionDef) -> Result<Self> {
        let lat0 = def.get_or(Parameter::LatitudeOfOrigin, 0.0);
        let lat_ts = def.get(Parameter::LatitudeOfTrueScale);
        let mut k0 = def.get_or(Parameter::ScaleFactor, 1.0);
        if k0 <= 0.0 {
            return Err(CrsError::validation(
                "k_0",
                format!("scale factor must be positive, got {k0}"),
            ));
        }
        let e = ellps.e();
        let (sin_lat0, cos_lat0) = lat0.sin_cos();
        let polar = cos_lat0.abs() <= EPSLN;

        let aspect = if ellps.is_sphere() {
            if let Some(lat_ts) = lat_ts.filter(|_| polar && k0 == 1.0) {
                k0 = 0.5 * (1.0 + lat0.signum() * lat_ts.sin());
            }
            Aspect::Spherical { sin_lat0, cos_lat0 }
        } else if polar {
            let con = lat0.signum();
            let cons = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
            if let Some(lat_ts) = lat_ts {
                if k0 == 1.0 && lat_ts.cos().abs() > EPSLN {
                    k0 = 0.5 * cons * msfnz(e, lat_ts.sin(), lat_ts.cos())
                        / tsfnz(e, con * lat_ts, con * lat_ts.sin());
                }
            }
            Aspect::Polar { con, cons }
        } else {
            let chi0 = conformal_latitude(e, lat0);
            Aspect::Oblique {
                ms1: msfnz(e, sin_lat0, cos_lat0),
                chi0,
                sin_chi0: chi0.sin(),
                cos_chi0: chi0.cos(),
            }
        };

        Ok(Stereographic {
            a: ellps.a,
            e,
            k0,
            lat0,
            lon0: def.get_or(Parameter::CentralMeridian, 0.0),
            x0: def.get_or(Parameter::FalseEasting, 0.0),
            y0: def.get_or(Parameter::FalseNorthing, 0.0),
            aspect,
        })
    }

    pub(crate) fn forward(&self, lam: f64, phi: f64) -> Result<(f64, f64)> {
        let dlon = adjust_lon(lam - self.lon0);
        if (dlon.abs() - PI).abs() <= EPSLN && (phi + self.lat0).abs() <= EPSLN {
            return Err(antipode());
        }
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_dlon, cos_dlon) = dlon.sin_cos();

        match self.aspect {
            Aspect::Spherical { sin_lat0, cos_lat0 } => {
                let denom = 1.0 + sin_lat0 * sin_phi + cos_lat0 * cos_phi * cos_dlon;
                if denom <= EPSLN {
                    return Err(antipode());
                }
                let k = 2.0 * self.k0 / denom;
                Ok((
                    self.a * k * cos_phi * sin_dlon + self.x0,
                    self.a * k * (cos_lat0 * sin_phi - sin_lat0 * cos_phi * cos_dlon) + self.y0,
                ))
            }
            Aspect::Polar { con, cons } => {
                if (phi + self.lat0).abs() <= EPSLN {
                    return Err(antipode());
                }
                let ts = tsfnz(self.e, phi * con, con * sin_phi);
                let rh = 2.0 * self.a * self.k0 * ts / cons;
                Ok((self.x0 + rh * sin_dlon, self.y0 - con * rh * cos_dlon))
            }
            Aspect::Oblique {
                ms1,
                sin_chi0,
                cos_chi0,
                ..
            } => {
                let (sin_chi, cos_chi) = conformal_latitude(self.e, phi).sin_cos();
                let denom = cos_chi0 * (1.0 + sin_chi0 * sin_chi + cos_chi0 * cos_chi * cos_dlon);
                if denom.abs() <= EPSLN {
                    return Err(antipode());
                }
                let k = 2.0 * self.a * self.k0 * ms1 / denom;
                Ok((
                    k * cos_chi * sin_dlon + self.x0,
                    k * (cos_chi0 * sin_chi - sin_chi0 * cos_chi * cos_dlon) + self.y0,
                ))
            }
        }
    }

    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x = x - self.x0;
        let y = y - self.y0;
        let rh = x.hypot(y);
        if rh <= EPSLN {
            return Ok((self.lon0, self.lat0));
        }

        match self.aspect {
            Aspect::Spherical { sin_lat0, cos_lat0 } => {
                let c = 2.0 * (rh / (2.0 * self.a * self.k0)).atan();
                let (sin_c, cos_c) = c.sin_cos();
                let phi = (cos_c * sin_lat0 + y * sin_c * cos_lat0 / rh)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lam = if cos_lat0.abs() <= EPSLN {
                    if self.lat0 > 0.0 {
                        x.atan2(-y)
                    } else {
                        x.atan2(y)
                    }
                } else {
                    (x * sin_c).atan2(rh * cos_lat0 * cos_c - y * sin_lat0 * sin_c)
                };
                Ok((adjust_lon(self.lon0 + lam), phi))
            }
            Aspect::Polar { con, cons } => {
                let ts = rh * cons / (2.0 * self.a * self.k0);
                let phi = con * phi2z(self.e, ts)?;
                let lam = con * adjust_lon(con * self.lon0 + (con * x).atan2(-con * y));
                Ok((lam, phi))
            }
            Aspect::Oblique {
                ms1,
                sin_chi0,
                cos_chi0,
                ..
            } => {
                let ce = 2.0 * (rh * cos_chi0 / (2.0 * self.a * self.k0 * ms1)).atan();
                let (sin_ce, cos_ce) = ce.sin_cos();
                let chi = (cos_ce * sin_chi0 + y * sin_ce * cos_chi0 / rh)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lam = adjust_lon(
                    self.lon0 + (x * sin_ce).atan2(rh * cos_chi0 * cos_ce - y * sin_chi0 * sin_ce),
                );
                let phi = -phi2z(self.e, (0.5 * (FRAC_PI_2 + chi)).tan())?;
                Ok((lam, phi))
            }
        }
    }
}

/// Latitude on the conformal sphere.
fn conformal_latitude(e: f64, phi: f64) -> f64 {
    let con = e * phi.sin();
    let t = (0.5 * (FRAC_PI_2 + phi)).tan() * ((1.0 - con) / (1.0 + con)).powf(0.5 * e);
    2.0 * t.atan() - FRAC_PI_2
}

fn antipode() -> CrsError {
    CrsError::out_of_domain("the antipode of the projection centre cannot be projected")
}
