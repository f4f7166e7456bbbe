use crate::app_router::{DEFAULT_CENTER, DEFAULT_ZOOM};

pub(crate) const VIEW_RECORD_VERSION: u32 = 1;
pub(crate) const DRAFT_RECORD_VERSION: u32 = 1;

pub(crate) const VIEW_RECORD_KEY: &str = "hivemark.view.v1";
pub(crate) const DRAFT_RECORD_KEY: &str = "hivemark.draft.v1";

/// Last viewport the user looked at, restored on the next visit.
#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub(crate) struct ViewRecord {
    pub(crate) version: u32,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) zoom: f64,
}

impl Default for ViewRecord {
    fn default() -> Self {
        Self {
            version: VIEW_RECORD_VERSION,
            lat: DEFAULT_CENTER.lat,
            lng: DEFAULT_CENTER.lng,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub(crate) struct DraftField {
    pub(crate) name: String,
    pub(crate) value: String,
}

/// Text the user typed into a popup form but has not sent yet, so a reload
/// does not eat a half-filled form.
#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub(crate) struct DraftRecord {
    pub(crate) version: u32,
    pub(crate) fields: Vec<DraftField>,
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self {
            version: DRAFT_RECORD_VERSION,
            fields: Vec::new(),
        }
    }
}
