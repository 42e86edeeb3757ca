use crate::error::Result;
use crate::point::{Coord, CoordinateType};
use crate::transform::Transform;
use crate::transformer::Transformer;

///```rust
/// # use approx::assert_relative_eq;
/// use proj_crs::{CrsDefinition, Transformer};
///
/// let wgs84 = CrsDefinition::wgs84();
/// let utm = CrsDefinition::utm(33, false).unwrap();
/// let to_utm = Transformer::new(&wgs84, &utm, false).unwrap();
/// let result = to_utm
///     .convert(geo_types::Coord { x: 15.0f64, y: 0.0f64 })
///     .unwrap();
/// assert_relative_eq!(result.x, 500_000.0, epsilon = 1.0e-6);
/// assert_relative_eq!(result.y, 0.0, epsilon = 1.0e-6);
/// ```
impl<T: CoordinateType> Coord<T> for geo_types::Coord<T> {
    fn x(&self) -> T {
        self.x
    }
    fn y(&self) -> T {
        self.y
    }
    fn from_xy(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: CoordinateType> Coord<T> for geo_types::Point<T> {
    fn x(&self) -> T {
        geo_types::Point::x(*self)
    }
    fn y(&self) -> T {
        geo_types::Point::y(*self)
    }
    fn from_xy(x: T, y: T) -> Self {
        Self::new(x, y)
    }
}

impl<T: CoordinateType> Transform<T> for geo_types::Coord<T> {
    type Output = Self;

    fn transform(&mut self, transformer: &Transformer) -> Result<()> {
        *self = transformer.convert(*self)?;
        Ok(())
    }

    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output> {
        transformer.convert(*self)
    }
}

impl<T: CoordinateType> Transform<T> for geo_types::Point<T> {
    type Output = Self;

    fn transform(&mut self, transformer: &Transformer) -> Result<()> {
        self.0.transform(transformer)
    }

    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output> {
        transformer.convert(*self)
    }
}

impl<T: CoordinateType> Transform<T> for geo_types::LineString<T> {
    type Output = Self;

    fn transform(&mut self, transformer: &Transformer) -> Result<()> {
        for coord in self.coords_mut() {
            coord.transform(transformer)?;
        }
        Ok(())
    }

    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output> {
        let mut output = self.clone();
        output.transform(transformer)?;
        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use crate::crs::CrsDefinition;
    use crate::transform::Transform;
    use crate::transformer::Transformer;
    use approx::assert_relative_eq;
    use geo_types::{coord, line_string, point};

    #[test]
    fn point_to_web_mercator() {
        let wgs84 = CrsDefinition::wgs84();
        let web = CrsDefinition::web_mercator();
        let t = Transformer::new(&wgs84, &web, false).unwrap();
        let p = point!(x: 180.0f64, y: 0.0f64).transformed(&t).unwrap();
        assert_relative_eq!(p, point!(x: 20_037_508.342_789_244, y: 0.0), epsilon = 1e-6);
    }

    #[test]
    fn f32_coordinates() {
        let wgs84 = CrsDefinition::wgs84();
        let utm = CrsDefinition::utm(33, false).unwrap();
        let t = Transformer::new(&wgs84, &utm, false).unwrap();
        let mut c = coord! { x: 15.0f32, y: 0.0f32 };
        c.transform(&t).unwrap();
        assert_relative_eq!(c.x, 500_000.0f32);
    }

    #[test]
    fn line_string_round_trip() {
        let wgs84 = CrsDefinition::wgs84();
        let utm = CrsDefinition::utm(33, false).unwrap();
        let forward = Transformer::new(&wgs84, &utm, false).unwrap();
        let inverse = Transformer::new(&utm, &wgs84, false).unwrap();

        let line = line_string![(x: 14.0, y: 50.0), (x: 15.0, y: 51.0), (x: 16.5, y: 49.25)];
        let projected = line.transformed(&forward).unwrap();
        assert_relative_eq!(projected.0[1].x, 500_000.0, epsilon = 1e-6);
        let back = projected.transformed(&inverse).unwrap();
        assert_relative_eq!(back, line, epsilon = 1e-8);
    }

    #[test]
    fn failing_coordinate_surfaces_error() {
        let wgs84 = CrsDefinition::wgs84();
        let utm = CrsDefinition::utm(33, false).unwrap();
        let t = Transformer::new(&wgs84, &utm, false).unwrap();
        let mut line = line_string![(x: 15.0, y: 0.0), (x: 170.0, y: 0.0)];
        assert!(line.transform(&t).is_err());
    }
}
