//! Coordinate reference systems, extents, and reprojection.
//!
//! Two coordinate projections (WGS84 and spherical Web Mercator) and their
//! tile-grid schemes are built in; anything beyond that is reached through the
//! [`Projection`] collaborator trait.

mod crs;
mod extent;
mod projection;

pub use crs::{Crs, CrsError, MAX_LAT, MIN_LAT};
pub use extent::{Extent, TiledExtent};
pub use projection::{
    lon_lat_to_mercator, mercator_to_lon_lat, GeographicProjection, Projection, EARTH_RADIUS_M,
};
