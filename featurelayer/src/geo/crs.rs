//! Coordinate reference system identifiers.
//!
//! Extents and feature meshes carry a CRS tag that is either a coordinate
//! projection (`EPSG:*`) or a tile-grid scheme (`TMS:*`) addressing cells of
//! that projection by zoom/row/col. Placement math normalizes tile-scheme and
//! alias codes down to the canonical projection before reprojecting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum latitude representable in the spherical Mercator projection.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in the spherical Mercator projection.
pub const MIN_LAT: f64 = -85.05112878;

/// Errors produced by CRS parsing and coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrsError {
    /// The code string does not name a supported CRS.
    #[error("unknown CRS code: {0}")]
    UnknownCode(String),

    /// A tile-grid operation was attempted on a plain coordinate projection.
    #[error("{0} is not a tiling scheme")]
    NotATilingScheme(&'static str),

    /// Latitude outside the Mercator-representable range.
    #[error("latitude {0} outside projection bounds")]
    LatitudeOutOfBounds(f64),
}

/// A coordinate reference system or tile-grid scheme.
///
/// Two coordinate projections are supported (geographic WGS84 and spherical
/// Web Mercator) together with the tile-grid schemes addressing them. Alias
/// codes (`CRS:84`, `EPSG:900913`, `WMTS:WGS84G`) parse to their canonical
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// Geographic latitude/longitude in degrees (EPSG:4326).
    Wgs84,
    /// Spherical Web Mercator in meters (EPSG:3857).
    WebMercator,
    /// Geodetic tile grid over EPSG:4326 (TMS:4326), 2·2^z × 2^z cells.
    TmsWgs84,
    /// Web Mercator tile grid (TMS:3857), 2^z × 2^z cells.
    TmsWebMercator,
}

impl Crs {
    /// Parse a CRS code string.
    pub fn from_code(code: &str) -> Result<Self, CrsError> {
        match code {
            "EPSG:4326" | "CRS:84" | "WMTS:WGS84G" => Ok(Crs::Wgs84),
            "EPSG:3857" | "EPSG:900913" => Ok(Crs::WebMercator),
            "TMS:4326" => Ok(Crs::TmsWgs84),
            "TMS:3857" => Ok(Crs::TmsWebMercator),
            other => Err(CrsError::UnknownCode(other.to_string())),
        }
    }

    /// The canonical code string for this CRS.
    pub fn code(&self) -> &'static str {
        match self {
            Crs::Wgs84 => "EPSG:4326",
            Crs::WebMercator => "EPSG:3857",
            Crs::TmsWgs84 => "TMS:4326",
            Crs::TmsWebMercator => "TMS:3857",
        }
    }

    /// Normalize to the coordinate projection this CRS addresses.
    ///
    /// Tile-grid schemes map to the projection their cells are defined in;
    /// coordinate projections are returned unchanged.
    pub fn to_geographic(self) -> Crs {
        match self {
            Crs::TmsWgs84 => Crs::Wgs84,
            Crs::TmsWebMercator => Crs::WebMercator,
            other => other,
        }
    }

    /// The tile-grid scheme addressing this CRS.
    pub fn to_tiling_scheme(self) -> Crs {
        match self {
            Crs::Wgs84 => Crs::TmsWgs84,
            Crs::WebMercator => Crs::TmsWebMercator,
            other => other,
        }
    }

    /// Whether this CRS is a tile-grid scheme rather than a projection.
    pub fn is_tiling_scheme(self) -> bool {
        matches!(self, Crs::TmsWgs84 | Crs::TmsWebMercator)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Crs {
    type Error = CrsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Crs::from_code(&value)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.code().to_string()
    }
}
