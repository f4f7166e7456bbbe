pub mod codec;
pub mod form;
pub mod geo;
pub mod marker;
pub mod save;
pub mod tiles;

pub use codec::{decode, encode};
pub use form::{
    EmbedCard, FieldKind, FieldSpec, FormSpec, FormValues, PopupSpec, FIELD_COMMENT, FIELD_EMAIL,
    FIELD_FILE, FIELD_FIRSTNAME, FIELD_SURNAME,
};
pub use geo::{LatLng, LonLat, WorldPixel, MERCATOR_LAT_MAX, TILE_SIZE};
pub use marker::{Marker, MarkerId, MarkerOrigin, MarkerRegistry};
pub use save::{
    SaveOutcome, SavePayload, SavePhase, SaveTracker, SubmitError, CSRF_HEADER, SAVE_CONTENT_TYPE,
    SAVE_PATH,
};
pub use tiles::{
    scale_bar, tile_url, visible_tiles, PlacedTile, ScaleBar, TileCoord, OSM_ATTRIBUTION,
    OSM_SUBDOMAINS, OSM_TILE_TEMPLATE, SCALE_BAR_MAX_PX, TILE_ZOOM_MAX, TILE_ZOOM_MIN,
};
