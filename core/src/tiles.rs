use crate::geo::{self, LatLng, TILE_SIZE};

pub const TILE_ZOOM_MIN: f64 = 0.0;
pub const TILE_ZOOM_MAX: f64 = 19.0;
pub const OSM_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

pub const SCALE_BAR_MAX_PX: f64 = 100.0;
const SCALE_STEPS: [f64; 4] = [1.0, 2.0, 3.0, 5.0];

/// Address of one tile in the XYZ pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A visible tile with its placement inside the viewport, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedTile {
    pub coord: TileCoord,
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// Expands a `{s}`/`{z}`/`{x}`/`{y}` template. The subdomain rotates with the
/// tile address so neighboring tiles spread across the provider's hosts.
pub fn tile_url(template: &str, coord: TileCoord) -> String {
    let subdomain = OSM_SUBDOMAINS[((coord.x + coord.y) % OSM_SUBDOMAINS.len() as u32) as usize];
    template
        .replace("{s}", subdomain)
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(TILE_ZOOM_MIN, TILE_ZOOM_MAX)
}

/// Enumerates the tiles covering a viewport centered on `center` at a
/// fractional zoom. Tiles come from the integer level below the zoom and are
/// scaled up; x wraps around the antimeridian, y outside the pyramid is
/// skipped.
pub fn visible_tiles(
    center: LatLng,
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> Vec<PlacedTile> {
    if viewport_w <= 0.0 || viewport_h <= 0.0 {
        return Vec::new();
    }
    let zoom = clamp_zoom(zoom);
    let level = zoom.floor();
    let factor = (zoom - level).exp2();
    let side = (level as u32).min(31);
    let tiles_per_side = 1_i64 << side;

    let center_px = geo::project(center, level);
    let half_w = viewport_w / (2.0 * factor);
    let half_h = viewport_h / (2.0 * factor);
    let min_x = center_px.x - half_w;
    let min_y = center_px.y - half_h;
    let max_x = center_px.x + half_w;
    let max_y = center_px.y + half_h;

    let tx0 = (min_x / TILE_SIZE).floor() as i64;
    let tx1 = (max_x / TILE_SIZE).floor() as i64;
    let ty0 = (min_y / TILE_SIZE).floor() as i64;
    let ty1 = (max_y / TILE_SIZE).floor() as i64;

    let mut tiles = Vec::with_capacity(((tx1 - tx0 + 1) * (ty1 - ty0 + 1)).max(0) as usize);
    for ty in ty0..=ty1 {
        if ty < 0 || ty >= tiles_per_side {
            continue;
        }
        for tx in tx0..=tx1 {
            let wrapped_x = tx.rem_euclid(tiles_per_side);
            tiles.push(PlacedTile {
                coord: TileCoord {
                    z: side as u8,
                    x: wrapped_x as u32,
                    y: ty as u32,
                },
                left: (tx as f64 * TILE_SIZE - min_x) * factor,
                top: (ty as f64 * TILE_SIZE - min_y) * factor,
                size: TILE_SIZE * factor,
            });
        }
    }
    tiles
}

/// A round-number distance bar fitted under a maximum width.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBar {
    pub meters: f64,
    pub px: f64,
    pub label: String,
}

pub fn scale_bar(lat: f64, zoom: f64, max_px: f64) -> ScaleBar {
    let mpp = geo::meters_per_pixel(lat, zoom);
    let max_meters = (mpp * max_px).max(1.0);
    let meters = round_scale(max_meters);
    let label = if meters >= 1000.0 {
        format!("{} km", meters / 1000.0)
    } else {
        format!("{meters} m")
    };
    ScaleBar {
        meters,
        px: meters / mpp,
        label,
    }
}

fn round_scale(max_meters: f64) -> f64 {
    let magnitude = 10f64.powf(max_meters.log10().floor());
    let mut best = magnitude;
    for step in SCALE_STEPS {
        let candidate = step * magnitude;
        if candidate <= max_meters {
            best = candidate;
        }
    }
    best
}
