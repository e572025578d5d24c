//! Projection collaborator.
//!
//! Placement and eligibility checks go through the [`Projection`] trait so the
//! full transform library stays outside this crate. [`GeographicProjection`]
//! covers the spherical-Mercator pair the built-in tiling schemes address.

use glam::{DVec2, DVec3};

use super::crs::{Crs, CrsError, MAX_LAT, MIN_LAT};
use super::extent::Extent;

/// WGS84 equatorial radius in meters, the Web Mercator reference sphere.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Forward spherical Mercator: degrees lon/lat to EPSG:3857 meters.
pub fn lon_lat_to_mercator(p: DVec2) -> DVec2 {
    DVec2::new(
        EARTH_RADIUS_M * p.x.to_radians(),
        EARTH_RADIUS_M * p.y.to_radians().tan().asinh(),
    )
}

/// Inverse spherical Mercator: EPSG:3857 meters to degrees lon/lat.
pub fn mercator_to_lon_lat(p: DVec2) -> DVec2 {
    DVec2::new(
        (p.x / EARTH_RADIUS_M).to_degrees(),
        (p.y / EARTH_RADIUS_M).sinh().atan().to_degrees(),
    )
}

/// Reprojection operations the core needs from a transform library.
pub trait Projection {
    /// Reproject an extent into `target`. Reprojecting into the extent's own
    /// projection is a no-op apart from normalizing the CRS tag.
    fn reproject_extent(&self, extent: &Extent, target: Crs) -> Result<Extent, CrsError>;

    /// Width and height of an extent in its native units.
    fn dimensions(&self, extent: &Extent) -> DVec2;

    /// Reproject a point. The z component is carried through unchanged.
    fn reproject_point(&self, point: DVec3, source: Crs, target: Crs) -> Result<DVec3, CrsError>;
}

/// Default projection over the WGS84 / Web Mercator pair.
///
/// Extent reprojection maps the corner points; both projections are
/// axis-aligned with respect to each other so this is exact. Latitudes are
/// clamped to the Mercator-representable range before the forward transform.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeographicProjection;

impl Projection for GeographicProjection {
    fn reproject_extent(&self, extent: &Extent, target: Crs) -> Result<Extent, CrsError> {
        let src = extent.crs().to_geographic();
        let dst = target.to_geographic();
        if src == dst {
            return Ok(extent.retagged(dst));
        }
        match (src, dst) {
            (Crs::Wgs84, Crs::WebMercator) => {
                let sw = lon_lat_to_mercator(DVec2::new(
                    extent.west(),
                    extent.south().clamp(MIN_LAT, MAX_LAT),
                ));
                let ne = lon_lat_to_mercator(DVec2::new(
                    extent.east(),
                    extent.north().clamp(MIN_LAT, MAX_LAT),
                ));
                Ok(Extent::new(Crs::WebMercator, sw.x, ne.x, sw.y, ne.y))
            }
            (Crs::WebMercator, Crs::Wgs84) => {
                let sw = mercator_to_lon_lat(DVec2::new(extent.west(), extent.south()));
                let ne = mercator_to_lon_lat(DVec2::new(extent.east(), extent.north()));
                Ok(Extent::new(Crs::Wgs84, sw.x, ne.x, sw.y, ne.y))
            }
            _ => Err(CrsError::UnknownCode(format!("{} -> {}", src, dst))),
        }
    }

    fn dimensions(&self, extent: &Extent) -> DVec2 {
        extent.dimensions()
    }

    fn reproject_point(&self, point: DVec3, source: Crs, target: Crs) -> Result<DVec3, CrsError> {
        let src = source.to_geographic();
        let dst = target.to_geographic();
        if src == dst {
            return Ok(point);
        }
        let xy = DVec2::new(point.x, point.y);
        let out = match (src, dst) {
            (Crs::Wgs84, Crs::WebMercator) => {
                if !(MIN_LAT..=MAX_LAT).contains(&point.y) {
                    return Err(CrsError::LatitudeOutOfBounds(point.y));
                }
                lon_lat_to_mercator(xy)
            }
            (Crs::WebMercator, Crs::Wgs84) => mercator_to_lon_lat(xy),
            _ => return Err(CrsError::UnknownCode(format!("{} -> {}", src, dst))),
        };
        Ok(DVec3::new(out.x, out.y, point.z))
    }
}
