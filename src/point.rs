use num_traits::Float;
use std::fmt::Debug;

/// Scalar types usable as coordinate components.
pub trait CoordinateType: Float + Copy + PartialOrd + Debug {}
impl<T: Float + Copy + PartialOrd + Debug> CoordinateType for T {}

/// Anything that exposes an `x`/`y` pair can be pushed through a [`Transformer`](crate::Transformer).
///
/// The crate provides implementations for its own [`Point`] and, with the `geo-types`
/// feature, for `geo_types::Coord` and `geo_types::Point`.
pub trait Coord<T>
where
    T: CoordinateType,
{
    fn x(&self) -> T;
    fn y(&self) -> T;
    fn from_xy(x: T, y: T) -> Self;
}

/// A coordinate pair with an optional ellipsoidal height.
///
/// Points carry no units: whether `x` is a longitude in degrees or an easting in feet is
/// decided by the CRS the point is transformed from or to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y, z: None }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z: Some(z) }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<(f64, f64, f64)> for Point {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point::new_3d(x, y, z)
    }
}

impl Coord<f64> for Point {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn from_xy(x: f64, y: f64) -> Self {
        Point::new(x, y)
    }
}
