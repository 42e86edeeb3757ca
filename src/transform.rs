use crate::epsg::EpsgCache;
use crate::error::Result;
use crate::point::Point;
use crate::resolve::resolve_crs;
use crate::transformer::Transformer;

/// Transform a geometry between coordinate reference systems.
pub trait Transform<T> {
    type Output;

    /// Transform a geometry by mutating it in place.
    ///
    #[cfg_attr(feature = "geo-types", doc = r##"
# Examples

```
use proj_crs::{CrsDefinition, Transform, Transformer};
# use approx::assert_relative_eq;

let wgs84 = CrsDefinition::wgs84();
let web = CrsDefinition::web_mercator();
let to_web = Transformer::new(&wgs84, &web, false).unwrap();

let mut point = geo_types::point!(x: 10.0f64, y: 0.0f64);
point.transform(&to_web).unwrap();

assert_relative_eq!(point, geo_types::point!(x: 1_113_194.907_932_735_7, y: 0.0), epsilon = 1e-6);
```
"##)]
    fn transform(&mut self, transformer: &Transformer) -> Result<()>;

    /// Immutable flavor of [`Transform::transform`], which allocates a new geometry.
    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output>;

    /// Transform a geometry from one CRS to another by modifying it in place.
    ///
    /// Both CRSs may be given in any form [`resolve_crs`] accepts; EPSG codes outside the
    /// built-in set are looked up through `cache`.
    ///
    #[cfg_attr(feature = "geo-types", doc = r##"
# Examples

```
# use approx::assert_relative_eq;
use proj_crs::{EpsgCache, LookupResponse, Transform};
use geo_types::{point, Point};

let cache = EpsgCache::new(|_: &str| -> proj_crs::Result<LookupResponse> {
    Ok(LookupResponse::status(404))
});
let mut point: Point<f64> = point!(x: 15.0, y: 0.0);
point.transform_crs_to_crs("EPSG:4326", "EPSG:32633", &cache).unwrap();

assert_relative_eq!(point, point!(x: 500_000.0, y: 0.0), epsilon = 1e-6);
```
"##)]
    fn transform_crs_to_crs(
        &mut self,
        source_crs: &str,
        target_crs: &str,
        cache: &EpsgCache,
    ) -> Result<()> {
        let source = resolve_crs(source_crs, cache)?;
        let target = resolve_crs(target_crs, cache)?;
        let transformer = Transformer::new(&source, &target, false)?;
        self.transform(&transformer)
    }

    /// Immutable flavor of [`Transform::transform_crs_to_crs`], which allocates a new geometry.
    fn transformed_crs_to_crs(
        &self,
        source_crs: &str,
        target_crs: &str,
        cache: &EpsgCache,
    ) -> Result<Self::Output> {
        let source = resolve_crs(source_crs, cache)?;
        let target = resolve_crs(target_crs, cache)?;
        let transformer = Transformer::new(&source, &target, false)?;
        self.transformed(&transformer)
    }
}

impl Transform<f64> for Point {
    type Output = Point;

    fn transform(&mut self, transformer: &Transformer) -> Result<()> {
        *self = transformer.transform(*self)?;
        Ok(())
    }

    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output> {
        transformer.transform(*self)
    }
}

impl Transform<f64> for Vec<Point> {
    type Output = Vec<Point>;

    /// Stops at the first failing point; points before it keep their transformed values.
    fn transform(&mut self, transformer: &Transformer) -> Result<()> {
        for point in self.iter_mut() {
            point.transform(transformer)?;
        }
        Ok(())
    }

    fn transformed(&self, transformer: &Transformer) -> Result<Self::Output> {
        self.iter().map(|p| transformer.transform(*p)).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::CrsDefinition;
    use crate::epsg::LookupResponse;
    use crate::error::CrsError;
    use approx::assert_relative_eq;

    fn offline() -> EpsgCache {
        EpsgCache::new(|_: &str| -> Result<LookupResponse> { Ok(LookupResponse::status(404)) })
    }

    #[test]
    fn point_in_place_keeps_height() {
        let wgs84 = CrsDefinition::wgs84();
        let utm = CrsDefinition::utm(33, false).unwrap();
        let t = Transformer::new(&wgs84, &utm, false).unwrap();
        let mut p = Point::new_3d(15.0, 0.0, 12.5);
        p.transform(&t).unwrap();
        assert_relative_eq!(p.x, 500_000.0, epsilon = 1e-6);
        assert_eq!(p.z, Some(12.5));
    }

    #[test]
    fn crs_to_crs_by_code() {
        let cache = offline();
        let p = Point::new(15.0, 0.0)
            .transformed_crs_to_crs("EPSG:4326", "32633", &cache)
            .unwrap();
        assert_relative_eq!(p.x, 500_000.0, epsilon = 1e-6);
        let err = Point::new(15.0, 0.0)
            .transformed_crs_to_crs("EPSG:4326", "EPSG:2154", &cache)
            .unwrap_err();
        assert!(matches!(err, CrsError::NotFound { .. }));
    }

    #[test]
    fn vec_of_points() {
        let cache = offline();
        let mut points = vec![Point::new(0.0, 0.0), Point::new(180.0, 0.0)];
        points
            .transform_crs_to_crs("EPSG:4326", "EPSG:3857", &cache)
            .unwrap();
        assert_relative_eq!(points[1].x, 20_037_508.342_789_244, epsilon = 1e-6);
    }
}
