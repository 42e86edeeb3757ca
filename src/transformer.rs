//! The transformation engine: two resolved CRS definitions bound into a point pipeline.

use std::f64::consts::FRAC_PI_2;

use crate::crs::{AxisOrder, CrsDefinition, CrsKind};
use crate::datum;
use crate::error::{CrsError, Result};
use crate::point::{Coord, CoordinateType, Point};
use crate::projection::Projector;
use crate::projection::common::adjust_lon;

/// Latitudes this far past a pole are rounding noise from the unit factor and get clamped.
const POLE_TOLERANCE: f64 = 1.0e-12;

/// A transformation between two CRS definitions, with projection constants computed once.
///
/// Binding checks that both definitions can take part in a transformation, so an
/// unsupported projection method fails here rather than on the first point.
///
/// ```
/// use proj_crs::{CrsDefinition, Point, Transformer};
/// # use approx::assert_relative_eq;
///
/// let wgs84 = CrsDefinition::wgs84();
/// let web = CrsDefinition::web_mercator();
/// let to_web = Transformer::new(&wgs84, &web, false).unwrap();
/// let p = to_web.transform(Point::new(180.0, 0.0)).unwrap();
/// assert_relative_eq!(p.x, 20_037_508.342_789_244, epsilon = 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Transformer<'a> {
    from: &'a CrsDefinition,
    to: &'a CrsDefinition,
    from_projector: Option<Projector>,
    to_projector: Option<Projector>,
    inverse_only: bool,
}

impl<'a> Transformer<'a> {
    /// Bind `from` and `to`.
    ///
    /// With `inverse_only` set the pipeline stops after the datum shift and yields
    /// longitude/latitude in degrees on `to`'s datum, in `to`'s axis order.
    pub fn new(from: &'a CrsDefinition, to: &'a CrsDefinition, inverse_only: bool) -> Result<Self> {
        from.validate()?;
        to.validate()?;
        Ok(Transformer {
            from,
            to,
            from_projector: projector(from)?,
            to_projector: if inverse_only { None } else { projector(to)? },
            inverse_only,
        })
    }

    pub fn source(&self) -> &CrsDefinition {
        self.from
    }

    pub fn target(&self) -> &CrsDefinition {
        self.to
    }

    /// Transform a single point.
    pub fn transform(&self, point: Point) -> Result<Point> {
        if !point.is_finite() {
            return Err(CrsError::out_of_domain(format!(
                "non-finite input coordinate {point:?}"
            )));
        }
        let (x, y) = swap(self.from.axis_order, point.x, point.y);

        let (lam, phi) = match &self.from_projector {
            Some(projector) => {
                let unit = self.from.unit_factor;
                projector.inverse(x * unit, y * unit)?
            }
            None => (x * self.from.unit_factor, y * self.from.unit_factor),
        };
        let phi = check_latitude(phi)?;
        let lam = lam + self.from.prime_meridian;

        let (lam, phi, h) = datum::shift(self.from, self.to, lam, phi, point.z.unwrap_or(0.0))?;
        let lam = lam - self.to.prime_meridian;

        let (x, y) = if self.inverse_only {
            (adjust_lon(lam).to_degrees(), phi.to_degrees())
        } else {
            match &self.to_projector {
                Some(projector) => {
                    let (x, y) = projector.forward(lam, phi)?;
                    (x / self.to.unit_factor, y / self.to.unit_factor)
                }
                None => (
                    adjust_lon(lam) / self.to.unit_factor,
                    phi / self.to.unit_factor,
                ),
            }
        };
        let (x, y) = swap(self.to.axis_order, x, y);
        Ok(Point {
            x,
            y,
            z: point.z.map(|_| h),
        })
    }

    /// Transform any two-dimensional coordinate type, such as a `geo_types::Coord`.
    pub fn convert<T, C>(&self, coord: C) -> Result<C>
    where
        T: CoordinateType,
        C: Coord<T>,
    {
        let x = coord.x().to_f64().ok_or_else(|| {
            CrsError::InvalidInput("x component could not be represented as f64".to_string())
        })?;
        let y = coord.y().to_f64().ok_or_else(|| {
            CrsError::InvalidInput("y component could not be represented as f64".to_string())
        })?;
        let out = self.transform(Point::new(x, y))?;
        match (T::from(out.x), T::from(out.y)) {
            (Some(x), Some(y)) => Ok(C::from_xy(x, y)),
            _ => Err(CrsError::out_of_domain(
                "transformed coordinate does not fit the coordinate type",
            )),
        }
    }

    /// Transform every point independently; one failure does not stop the rest.
    pub fn transform_batch<I>(&self, points: I) -> BatchResult
    where
        I: IntoIterator<Item = Point>,
    {
        BatchResult {
            results: points.into_iter().map(|p| self.transform(p)).collect(),
        }
    }
}

/// Per-point outcomes of a batch transformation, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub results: Vec<Result<Point>>,
}

impl BatchResult {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The successfully transformed points, skipping failures.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.results.iter().filter_map(|r| r.as_ref().ok().copied())
    }
}

impl IntoIterator for BatchResult {
    type Item = Result<Point>;
    type IntoIter = std::vec::IntoIter<Result<Point>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Transform one point from `from` to `to`.
pub fn transform(
    from: &CrsDefinition,
    to: &CrsDefinition,
    point: Point,
    inverse_only: bool,
) -> Result<Point> {
    Transformer::new(from, to, inverse_only)?.transform(point)
}

/// Transform a sequence of points from `from` to `to`.
///
/// If the pair cannot be bound at all, every element reports the binding error.
pub fn transform_batch(
    from: &CrsDefinition,
    to: &CrsDefinition,
    points: &[Point],
    inverse_only: bool,
) -> BatchResult {
    match Transformer::new(from, to, inverse_only) {
        Ok(transformer) => transformer.transform_batch(points.iter().copied()),
        Err(e) => {
            log::debug!("cannot bind {} -> {}: {e}", from.name, to.name);
            BatchResult {
                results: vec![Err(e); points.len()],
            }
        }
    }
}

fn projector(def: &CrsDefinition) -> Result<Option<Projector>> {
    match (def.kind, &def.projection) {
        (CrsKind::Geographic, _) => Ok(None),
        (CrsKind::Projected, Some(projection)) => {
            Projector::new(&def.ellipsoid, projection).map(Some)
        }
        (CrsKind::Projected, None) => Err(CrsError::validation(
            "PROJECTION",
            "projected CRS has no projection method",
        )),
        (CrsKind::Unknown, _) => Err(CrsError::validation(
            "kind",
            format!("`{}` is neither geographic nor projected", def.name),
        )),
    }
}

fn swap(order: AxisOrder, a: f64, b: f64) -> (f64, f64) {
    match order {
        AxisOrder::EastNorth => (a, b),
        AxisOrder::NorthEast => (b, a),
    }
}

fn check_latitude(phi: f64) -> Result<f64> {
    if phi.abs() <= FRAC_PI_2 {
        Ok(phi)
    } else if phi.abs() <= FRAC_PI_2 + POLE_TOLERANCE {
        Ok(FRAC_PI_2.copysign(phi))
    } else {
        Err(CrsError::out_of_domain(format!(
            "latitude {:.6}° is beyond the poles",
            phi.to_degrees()
        )))
    }
}
