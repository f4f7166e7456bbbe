use serde::{Deserialize, Serialize};

pub const TILE_SIZE: f64 = 256.0;
pub const MERCATOR_LAT_MAX: f64 = 85.051_128_78;
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// A geographic coordinate in degrees. Latitude is clamped to the Web
/// Mercator range so every coordinate projects to a finite pixel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.clamp(-MERCATOR_LAT_MAX, MERCATOR_LAT_MAX),
            lng,
        }
    }
}

/// Seed coordinates arrive from the server template as `{lon, lat}` pairs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl From<LonLat> for LatLng {
    fn from(pair: LonLat) -> Self {
        LatLng::new(pair.lat, pair.lon)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPixel {
    pub x: f64,
    pub y: f64,
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Web Mercator projection into world pixel space at a (fractional) zoom.
pub fn project(point: LatLng, zoom: f64) -> WorldPixel {
    let size = world_size(zoom);
    let lat = point
        .lat
        .clamp(-MERCATOR_LAT_MAX, MERCATOR_LAT_MAX)
        .to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    WorldPixel { x, y }
}

pub fn unproject(pixel: WorldPixel, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let y = pixel.y.clamp(0.0, size);
    let lng = pixel.x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Ground resolution of one screen pixel at the given latitude and zoom.
pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    let lat = lat.clamp(-MERCATOR_LAT_MAX, MERCATOR_LAT_MAX).to_radians();
    EARTH_CIRCUMFERENCE_M * lat.cos() / world_size(zoom)
}

/// Pixel offset of `point` from `center` on a viewport rendered at `zoom`.
pub fn view_offset(center: LatLng, zoom: f64, point: LatLng) -> (f64, f64) {
    let center_px = project(center, zoom);
    let point_px = project(point, zoom);
    (point_px.x - center_px.x, point_px.y - center_px.y)
}

/// Inverse of [`view_offset`]: the coordinate under a pixel offset from the
/// viewport center.
pub fn offset_to_latlng(center: LatLng, zoom: f64, dx: f64, dy: f64) -> LatLng {
    let center_px = project(center, zoom);
    unproject(
        WorldPixel {
            x: center_px.x + dx,
            y: center_px.y + dy,
        },
        zoom,
    )
}
