//! Geographic and tile-grid extents.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::crs::{Crs, CrsError, MAX_LAT, MIN_LAT};
use super::projection::EARTH_RADIUS_M;

/// A geographic bounding rectangle in the units of its CRS.
///
/// Degrees for EPSG:4326, meters for EPSG:3857. An extent may also carry a
/// tile-scheme tag when it was derived from grid cells; placement normalizes
/// such tags before reprojecting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    crs: Crs,
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl Extent {
    /// Create an extent. Callers are expected to pass `west <= east` and
    /// `south <= north`.
    pub fn new(crs: Crs, west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            crs,
            west,
            east,
            south,
            north,
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    /// The same rectangle under a different CRS tag, without reprojection.
    pub fn retagged(&self, crs: Crs) -> Self {
        Self { crs, ..*self }
    }

    /// Width and height in native units.
    pub fn dimensions(&self) -> DVec2 {
        DVec2::new((self.east - self.west).abs(), (self.north - self.south).abs())
    }

    /// Center point in native units.
    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
        )
    }

    /// Whether `point` (in this extent's CRS) lies inside the rectangle.
    /// Boundary points count as inside.
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.west && point.x <= self.east && point.y >= self.south && point.y <= self.north
    }

    /// Whether two extents overlap. Both must be expressed in the same CRS;
    /// reproject first when they are not.
    pub fn intersects(&self, other: &Extent) -> bool {
        debug_assert_eq!(
            self.crs.to_geographic(),
            other.crs.to_geographic(),
            "intersects requires same-projection extents"
        );
        self.west <= other.east
            && self.east >= other.west
            && self.south <= other.north
            && self.north >= other.south
    }
}

/// A tile-grid extent: one cell of a tiling scheme at a given zoom.
///
/// Row 0 is the northernmost row in both supported schemes; rows increase
/// southward and columns eastward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TiledExtent {
    crs: Crs,
    zoom: u8,
    row: u32,
    col: u32,
}

impl TiledExtent {
    /// Create a tile-grid extent. `crs` must be a tiling scheme.
    pub fn new(crs: Crs, zoom: u8, row: u32, col: u32) -> Result<Self, CrsError> {
        if !crs.is_tiling_scheme() {
            return Err(CrsError::NotATilingScheme(crs.code()));
        }
        Ok(Self { crs, zoom, row, col })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// The grid cell containing `lon`/`lat` (degrees) at `zoom` in `crs`.
    pub fn from_lon_lat(crs: Crs, zoom: u8, lon: f64, lat: f64) -> Result<Self, CrsError> {
        match crs {
            Crs::TmsWgs84 => {
                let size = 180.0 / f64::from(1u32 << zoom);
                let cols = 2u32 << zoom;
                let rows = 1u32 << zoom;
                let col = (((lon + 180.0) / size).floor() as i64).clamp(0, i64::from(cols) - 1);
                let row = (((90.0 - lat) / size).floor() as i64).clamp(0, i64::from(rows) - 1);
                Ok(Self {
                    crs,
                    zoom,
                    row: row as u32,
                    col: col as u32,
                })
            }
            Crs::TmsWebMercator => {
                if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                    return Err(CrsError::LatitudeOutOfBounds(lat));
                }
                let n = f64::from(1u32 << zoom);
                let col = ((lon + 180.0) / 360.0 * n) as i64;
                let lat_rad = lat.to_radians();
                let row = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n) as i64;
                let max = i64::from(1u32 << zoom) - 1;
                Ok(Self {
                    crs,
                    zoom,
                    row: row.clamp(0, max) as u32,
                    col: col.clamp(0, max) as u32,
                })
            }
            other => Err(CrsError::NotATilingScheme(other.code())),
        }
    }

    /// The geographic rectangle covered by this grid cell, in the projection
    /// the scheme addresses.
    pub fn as_extent(&self) -> Extent {
        match self.crs {
            Crs::TmsWgs84 => {
                let size = 180.0 / f64::from(1u32 << self.zoom);
                let west = -180.0 + f64::from(self.col) * size;
                let north = 90.0 - f64::from(self.row) * size;
                Extent::new(Crs::Wgs84, west, west + size, north - size, north)
            }
            Crs::TmsWebMercator => {
                let half = std::f64::consts::PI * EARTH_RADIUS_M;
                let size = 2.0 * half / f64::from(1u32 << self.zoom);
                let west = -half + f64::from(self.col) * size;
                let north = half - f64::from(self.row) * size;
                Extent::new(Crs::WebMercator, west, west + size, north - size, north)
            }
            // Constructors reject non-scheme CRS tags.
            _ => unreachable!("TiledExtent carries a tiling scheme"),
        }
    }
}
