#![doc(html_logo_url = "https://raw.githubusercontent.com/georust/meta/master/logo/logo.png")]
//! `proj-crs` resolves coordinate reference system definitions and transforms points between
//! them, in pure Rust.
//!
//! A CRS can be described in any of four ways, and every one of them lands on the same
//! [`CrsDefinition`]:
//!
//! - WKT1 or WKT2 text, via [`parse_wkt`] (or step by step through the [`wkt`] module);
//! - PROJJSON, via [`parse_projjson`] / [`from_projjson`];
//! - a legacy PROJ string, via [`parse_proj_string`];
//! - an EPSG code, via an [`EpsgCache`].
//!
//! [`resolve_crs`] picks the right one from the shape of its input.
//!
//! Two definitions are bound into a [`Transformer`], which takes points through inverse
//! projection, a Helmert datum shift when the datums differ, and forward projection. The
//! supported projection methods are listed by [`Method`]; anything else is rejected with
//! [`CrsError::UnsupportedProjection`] when the transformer is built.
//!
//! # EPSG codes
//!
//! 4326, 3857, 4269 and the WGS84 UTM zones (32601–32660, 32701–32760) are built in. Other
//! codes are fetched as PROJJSON through an [`EpsgLookup`] and remembered by the cache.
//! Concurrent requests for the same code share a single fetch. With the `network` feature
//! (on by default) [`HttpLookup`] queries spatialreference.org, with separate connect and
//! read timeouts and no retries.
//!
//! # Features
//!
//! - `network`: the [`HttpLookup`] EPSG service client, built on `ureq`.
//! - `geo-types`: [`Transform`] for `geo_types::{Coord, Point, LineString}`.
//!
//! # Example
//!
//! ```
//! use approx::assert_relative_eq;
//! use proj_crs::{EpsgCache, LookupResponse, Point, Transformer, resolve_crs};
//!
//! // Built-in codes never reach the lookup.
//! let cache = EpsgCache::new(|_: &str| -> proj_crs::Result<LookupResponse> {
//!     Ok(LookupResponse::status(404))
//! });
//! let wgs84 = resolve_crs("EPSG:4326", &cache).unwrap();
//! let web = resolve_crs(
//!     "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null",
//!     &cache,
//! )
//! .unwrap();
//!
//! let to_web = Transformer::new(&wgs84, &web, false).unwrap();
//! let result = to_web.transform(Point::new(180.0, 0.0)).unwrap();
//! assert_relative_eq!(result.x, 20_037_508.34, epsilon = 1e-2);
//! assert_relative_eq!(result.y, 0.0, epsilon = 1e-6);
//! ```

mod crs;
mod datum;
mod epsg;
mod error;
#[cfg(feature = "geo-types")]
mod geo_types;
#[cfg(feature = "network")]
mod network;
mod point;
mod proj_string;
mod projection;
mod projjson;
mod resolve;
mod transform;
mod transformer;
pub mod wkt;

pub use crate::crs::{
    AxisOrder, CrsDefinition, CrsKind, DEG_TO_RAD, DatumShift, Ellipsoid, Parameter,
    ProjectionDef, SEC_TO_RAD, prime_meridian_by_name, unit_factor_by_name,
};
pub use crate::datum::{geocentric_to_geodetic, geodetic_to_geocentric};
pub use crate::epsg::{EpsgCache, EpsgLookup, LookupResponse, builtin, normalize_code};
pub use crate::error::{CrsError, ParseError, Result};
#[cfg(feature = "network")]
pub use crate::network::{HttpLookup, HttpLookupBuilder};
pub use crate::point::{Coord, CoordinateType, Point};
pub use crate::proj_string::parse_proj_string;
pub use crate::projection::Method;
pub use crate::projjson::{from_projjson, parse_projjson, to_proj_string};
pub use crate::resolve::{CrsFormat, resolve_crs};
pub use crate::transform::Transform;
pub use crate::transformer::{BatchResult, Transformer, transform, transform_batch};
pub use crate::wkt::parse_wkt;
