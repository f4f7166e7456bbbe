use hivemark_core::geo::{self, LatLng, WorldPixel};
use hivemark_core::tiles::{self, TileCoord};

const HOME: LatLng = LatLng {
    lat: 62.24147,
    lng: 25.72088,
};

#[test]
fn origin_projects_to_world_center() {
    let px = geo::project(LatLng::new(0.0, 0.0), 0.0);
    assert!((px.x - 128.0).abs() < 1e-9);
    assert!((px.y - 128.0).abs() < 1e-9);
}

#[test]
fn home_viewport_lands_on_known_tile() {
    let px = geo::project(HOME, 15.0);
    let tile = TileCoord {
        z: 15,
        x: (px.x / 256.0).floor() as u32,
        y: (px.y / 256.0).floor() as u32,
    };
    assert_eq!(tile, TileCoord { z: 15, x: 18725, y: 9093 });
}

#[test]
fn projection_round_trips() {
    for zoom in [0.0, 7.0, 15.0, 15.5, 19.0] {
        let back = geo::unproject(geo::project(HOME, zoom), zoom);
        assert!((back.lat - HOME.lat).abs() < 1e-6, "lat at zoom {zoom}");
        assert!((back.lng - HOME.lng).abs() < 1e-6, "lng at zoom {zoom}");
    }
}

#[test]
fn offset_inverts_view_offset() {
    let point = LatLng::new(62.25, 25.73);
    let (dx, dy) = geo::view_offset(HOME, 15.5, point);
    let back = geo::offset_to_latlng(HOME, 15.5, dx, dy);
    assert!((back.lat - point.lat).abs() < 1e-9);
    assert!((back.lng - point.lng).abs() < 1e-9);
}

#[test]
fn ground_resolution_halves_per_zoom_level() {
    let coarse = geo::meters_per_pixel(HOME.lat, 15.0);
    let fine = geo::meters_per_pixel(HOME.lat, 16.0);
    assert!((coarse / fine - 2.0).abs() < 1e-9);
    assert!((geo::meters_per_pixel(HOME.lat, 15.5) - 1.5733241).abs() < 1e-6);
}

#[test]
fn visible_tiles_cover_the_viewport() {
    let tiles = tiles::visible_tiles(HOME, 15.0, 512.0, 512.0);
    // a 512px viewport needs at least a 2x2 tile cover, at most 3x3
    assert!(tiles.len() >= 4 && tiles.len() <= 9, "got {}", tiles.len());

    let center = geo::project(HOME, 15.0);
    let center_tile = TileCoord {
        z: 15,
        x: (center.x / 256.0).floor() as u32,
        y: (center.y / 256.0).floor() as u32,
    };
    assert!(tiles.iter().any(|placed| placed.coord == center_tile));

    for placed in &tiles {
        // every tile overlaps the viewport
        assert!(placed.left < 512.0 && placed.left + placed.size > 0.0);
        assert!(placed.top < 512.0 && placed.top + placed.size > 0.0);
        assert_eq!(placed.coord.z, 15);
        assert!(placed.coord.x < 1u32 << 15);
        assert!(placed.coord.y < 1u32 << 15);
    }
}

#[test]
fn fractional_zoom_scales_tiles_up() {
    let tiles = tiles::visible_tiles(HOME, 15.5, 512.0, 512.0);
    assert!(!tiles.is_empty());
    for placed in &tiles {
        assert_eq!(placed.coord.z, 15);
        assert!((placed.size - 256.0 * 2f64.powf(0.5)).abs() < 1e-9);
    }
}

#[test]
fn tile_urls_fill_the_template_and_rotate_subdomains() {
    let url = tiles::tile_url(
        tiles::OSM_TILE_TEMPLATE,
        TileCoord { z: 15, x: 18725, y: 9093 },
    );
    assert_eq!(url, "https://c.tile.openstreetmap.org/15/18725/9093.png");

    let next = tiles::tile_url(
        tiles::OSM_TILE_TEMPLATE,
        TileCoord { z: 15, x: 18726, y: 9093 },
    );
    assert!(next.starts_with("https://a.tile.openstreetmap.org/"));
}

#[test]
fn scale_bar_picks_a_round_distance() {
    let bar = tiles::scale_bar(HOME.lat, 15.5, 100.0);
    assert_eq!(bar.meters, 100.0);
    assert_eq!(bar.label, "100 m");
    assert!((bar.px - 63.5597).abs() < 1e-3);
    assert!(bar.px <= 100.0);

    let coarse = tiles::scale_bar(HOME.lat, 8.0, 100.0);
    assert!(coarse.meters >= 1000.0);
    assert!(coarse.label.ends_with("km"));
    assert!(coarse.px <= 100.0);
}

#[test]
fn zoom_clamps_to_provider_range() {
    assert_eq!(tiles::clamp_zoom(25.0), tiles::TILE_ZOOM_MAX);
    assert_eq!(tiles::clamp_zoom(-3.0), tiles::TILE_ZOOM_MIN);
    assert_eq!(tiles::clamp_zoom(15.5), 15.5);
}

#[test]
fn unprojection_clamps_to_the_world_edge() {
    let top = geo::unproject(WorldPixel { x: 128.0, y: -50.0 }, 0.0);
    assert!((top.lat - geo::MERCATOR_LAT_MAX).abs() < 1e-6);
}
