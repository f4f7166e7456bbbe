use hivemark_core::geo::{self, LatLng};
use hivemark_core::tiles;

use web_sys::{DomRect, Element};

pub(crate) const DRAG_SLOP_PX: f64 = 4.0;
pub(crate) const WHEEL_ZOOM_STEP: f64 = 0.25;

/// Suppresses accidental pans: a pointer that never leaves the slop radius
/// is a click, not a drag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DragGate {
    start: (f64, f64),
    slop: f64,
    moved: bool,
}

impl DragGate {
    pub(crate) fn new(start_x: f64, start_y: f64) -> Self {
        Self {
            start: (start_x, start_y),
            slop: DRAG_SLOP_PX,
            moved: false,
        }
    }

    pub(crate) fn update(&mut self, x: f64, y: f64) -> bool {
        if self.moved {
            return true;
        }
        let dx = x - self.start.0;
        let dy = y - self.start.1;
        if dx * dx + dy * dy > self.slop * self.slop {
            self.moved = true;
        }
        self.moved
    }

    pub(crate) fn moved(&self) -> bool {
        self.moved
    }
}

/// New viewport center after dragging the map contents by a pixel delta.
pub(crate) fn pan_by_pixels(center: LatLng, zoom: f64, dx: f64, dy: f64) -> LatLng {
    geo::offset_to_latlng(center, zoom, -dx, -dy)
}

/// New center and zoom for a zoom step anchored at a cursor offset from the
/// viewport center: the coordinate under the cursor stays put.
pub(crate) fn zoom_about(
    center: LatLng,
    zoom: f64,
    delta: f64,
    anchor_dx: f64,
    anchor_dy: f64,
) -> (LatLng, f64) {
    let new_zoom = tiles::clamp_zoom(zoom + delta);
    if new_zoom == zoom {
        return (center, zoom);
    }
    let anchor = geo::offset_to_latlng(center, zoom, anchor_dx, anchor_dy);
    let new_center = geo::offset_to_latlng(anchor, new_zoom, -anchor_dx, -anchor_dy);
    (new_center, new_zoom)
}

/// Maps a position inside an element to the coordinate under it, given the
/// viewport the element currently renders.
pub(crate) fn element_point_to_latlng(
    client_x: f64,
    client_y: f64,
    element: &Element,
    center: LatLng,
    zoom: f64,
) -> Option<LatLng> {
    let rect: DomRect = element.get_bounding_client_rect();
    let width = rect.width();
    let height = rect.height();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let dx = client_x - rect.left() - width / 2.0;
    let dy = client_y - rect.top() - height / 2.0;
    Some(geo::offset_to_latlng(center, zoom, dx, dy))
}
