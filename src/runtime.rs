use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::app_core::AppSnapshot;
use crate::persisted::{DraftField, DraftRecord, ViewRecord, DRAFT_RECORD_VERSION, VIEW_RECORD_VERSION};
use crate::persisted_store;
use hivemark_core::{FormValues, LatLng, MarkerId, SaveOutcome, SavePhase};

/// A discrete UI event the view hands to the runtime for dispatch.
#[derive(Clone, Debug)]
pub(crate) enum CoreAction {
    PlaceMarker { position: LatLng },
    OpenPopup { marker_id: MarkerId },
    ClosePopup,
    EditField {
        marker_id: MarkerId,
        name: String,
        value: String,
    },
    SubmitForm { marker_id: MarkerId },
}

/// One outbound save request, fully assembled before it reaches a gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveRequest {
    pub(crate) url: String,
    pub(crate) body: String,
    pub(crate) content_type: &'static str,
    pub(crate) csrf_token: Option<String>,
}

/// Seam between the save workflow and the transport. The browser adapter
/// posts over fetch; tests plug in a recording gateway instead.
pub(crate) trait SaveGateway {
    fn submit(&self, request: SaveRequest, on_outcome: Rc<dyn Fn(SaveOutcome)>);
}

/// Mirrors snapshots into local records: the last viewport always, the open
/// form draft while one exists. Fingerprints keep the storage writes to
/// actual changes.
pub(crate) struct LocalRecordAdapter {
    last_view: Option<u64>,
    last_draft: Option<u64>,
}

impl LocalRecordAdapter {
    pub(crate) fn new() -> Self {
        Self {
            last_view: None,
            last_draft: None,
        }
    }

    pub(crate) fn save_if_needed(&mut self, snapshot: &AppSnapshot) {
        let view_fingerprint = fingerprint_view(snapshot);
        if self.last_view != Some(view_fingerprint) {
            persisted_store::save_view_record(&ViewRecord {
                version: VIEW_RECORD_VERSION,
                lat: snapshot.center.lat,
                lng: snapshot.center.lng,
                zoom: snapshot.zoom,
            });
            self.last_view = Some(view_fingerprint);
        }

        if snapshot.open_draft.is_empty() {
            if snapshot.save_phase == SavePhase::Confirmed && self.last_draft.is_some() {
                persisted_store::clear_draft_record();
                self.last_draft = None;
            }
            return;
        }
        let draft_fingerprint = fingerprint_draft(&snapshot.open_draft);
        if self.last_draft != Some(draft_fingerprint) {
            persisted_store::save_draft_record(&DraftRecord {
                version: DRAFT_RECORD_VERSION,
                fields: snapshot
                    .open_draft
                    .iter()
                    .map(|(name, value)| DraftField {
                        name: name.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
            });
            self.last_draft = Some(draft_fingerprint);
        }
    }
}

pub(crate) fn draft_record_to_values(record: &DraftRecord) -> FormValues {
    let mut values = FormValues::new();
    for field in &record.fields {
        values.set(&field.name, field.value.clone());
    }
    values
}

fn fingerprint_view(snapshot: &AppSnapshot) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.center.lat.to_bits().hash(&mut hasher);
    snapshot.center.lng.to_bits().hash(&mut hasher);
    snapshot.zoom.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn fingerprint_draft(draft: &FormValues) -> u64 {
    let mut hasher = DefaultHasher::new();
    for (name, value) in draft.iter() {
        name.hash(&mut hasher);
        value.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{SaveGateway, SaveRequest};
    use hivemark_core::SaveOutcome;

    /// Records requests and lets a test resolve them by hand, so the order of
    /// "request sent" and "confirmation shown" is observable.
    #[derive(Default)]
    pub(crate) struct ManualGateway {
        pending: RefCell<Vec<(SaveRequest, Rc<dyn Fn(SaveOutcome)>)>>,
    }

    impl ManualGateway {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn sent(&self) -> usize {
            self.pending.borrow().len()
        }

        pub(crate) fn request(&self, index: usize) -> Option<SaveRequest> {
            self.pending
                .borrow()
                .get(index)
                .map(|(request, _)| request.clone())
        }

        pub(crate) fn resolve(&self, index: usize, outcome: SaveOutcome) {
            let callback = self
                .pending
                .borrow()
                .get(index)
                .map(|(_, callback)| callback.clone());
            if let Some(callback) = callback {
                callback(outcome);
            }
        }
    }

    impl SaveGateway for ManualGateway {
        fn submit(&self, request: SaveRequest, on_outcome: Rc<dyn Fn(SaveOutcome)>) {
            self.pending.borrow_mut().push((request, on_outcome));
        }
    }
}
