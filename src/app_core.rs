use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::input;
use crate::runtime::CoreAction;
use hivemark_core::{
    FormValues, LatLng, Marker, MarkerId, MarkerRegistry, SaveOutcome, SavePayload, SavePhase,
    SaveTracker,
};

pub(crate) type AppSubscriber = Rc<dyn Fn()>;

/// Owns the whole widget state: viewport, markers, the open popup and its
/// draft, and the save workflow. The view mutates nothing directly; every
/// event lands here and subscribers re-render from snapshots.
pub(crate) struct AppCore {
    state: RefCell<AppState>,
    snapshots: RefCell<SnapshotBuffer>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

#[derive(Clone, Copy, Debug)]
struct ViewState {
    center: LatLng,
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
}

struct AppState {
    view: ViewState,
    registry: MarkerRegistry,
    open_popup: Option<MarkerId>,
    drafts: HashMap<MarkerId, FormValues>,
    restored_draft: Option<FormValues>,
    tracker: SaveTracker,
    in_flight_marker: Option<MarkerId>,
    status_line: String,
    save_message: String,
}

#[derive(Clone)]
pub(crate) struct AppSnapshot {
    pub(crate) center: LatLng,
    pub(crate) zoom: f64,
    pub(crate) viewport_w: f64,
    pub(crate) viewport_h: f64,
    pub(crate) markers: Vec<Marker>,
    pub(crate) open_popup: Option<MarkerId>,
    pub(crate) open_draft: FormValues,
    pub(crate) save_phase: SavePhase,
    pub(crate) status_line: String,
    pub(crate) save_message: String,
}

struct SnapshotBuffer {
    front: AppSnapshot,
    back: AppSnapshot,
}

impl SnapshotBuffer {
    fn new(state: &AppState) -> Self {
        let snapshot = build_snapshot_from_state(state);
        Self {
            front: snapshot.clone(),
            back: snapshot,
        }
    }

    fn refresh_from_state(&mut self, state: &AppState) {
        fill_snapshot_from_state(state, &mut self.back);
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

impl AppCore {
    pub(crate) fn new(center: LatLng, zoom: f64) -> Rc<Self> {
        let state = AppState::new(center, zoom);
        let snapshots = SnapshotBuffer::new(&state);
        Rc::new(Self {
            state: RefCell::new(state),
            snapshots: RefCell::new(snapshots),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub(crate) fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        {
            let state = self.state.borrow();
            let mut snapshots = self.snapshots.borrow_mut();
            snapshots.refresh_from_state(&state);
        }
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    pub(crate) fn snapshot(&self) -> AppSnapshot {
        self.snapshots.borrow().front.clone()
    }

    pub(crate) fn apply_action(&self, action: CoreAction) {
        match action {
            CoreAction::PlaceMarker { position } => {
                let id = self.place_user_marker(position);
                self.open_popup(id);
            }
            CoreAction::OpenPopup { marker_id } => self.open_popup(marker_id),
            CoreAction::ClosePopup => self.close_popup(),
            CoreAction::EditField {
                marker_id,
                name,
                value,
            } => self.edit_field(marker_id, &name, value),
            // submits need the gateway; the runtime routes them before they
            // would reach here
            CoreAction::SubmitForm { .. } => {}
        }
    }

    pub(crate) fn set_viewport_size(&self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        if (state.view.viewport_w - width).abs() <= f64::EPSILON
            && (state.view.viewport_h - height).abs() <= f64::EPSILON
        {
            return;
        }
        state.view.viewport_w = width;
        state.view.viewport_h = height;
        drop(state);
        self.notify();
    }

    pub(crate) fn pan_by(&self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.view.center = input::pan_by_pixels(state.view.center, state.view.zoom, dx, dy);
        drop(state);
        self.notify();
    }

    pub(crate) fn zoom_by(&self, delta: f64, anchor_dx: f64, anchor_dy: f64) {
        let mut state = self.state.borrow_mut();
        let (center, zoom) = input::zoom_about(
            state.view.center,
            state.view.zoom,
            delta,
            anchor_dx,
            anchor_dy,
        );
        if zoom == state.view.zoom && center == state.view.center {
            return;
        }
        state.view.center = center;
        state.view.zoom = zoom;
        drop(state);
        self.notify();
    }

    /// Places one marker per seed coordinate; called once at boot.
    pub(crate) fn seed_markers(&self, seeds: &[LatLng]) {
        if seeds.is_empty() {
            return;
        }
        let mut state = self.state.borrow_mut();
        for seed in seeds {
            state.registry.add_seed_marker(*seed);
        }
        drop(state);
        self.notify();
    }

    /// A draft recovered from local storage, prefilled into the next popup
    /// that opens without one.
    pub(crate) fn restore_draft(&self, values: FormValues) {
        if values.is_empty() {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.restored_draft = Some(values);
    }

    pub(crate) fn place_user_marker(&self, position: LatLng) -> MarkerId {
        let mut state = self.state.borrow_mut();
        let id = state.registry.add_user_marker(position);
        drop(state);
        self.notify();
        id
    }

    /// Opens a marker's popup; whatever popup was open closes, so at most one
    /// is ever showing.
    pub(crate) fn open_popup(&self, marker_id: MarkerId) {
        let mut state = self.state.borrow_mut();
        if state.registry.get(marker_id).is_none() {
            return;
        }
        if state.open_popup == Some(marker_id) {
            return;
        }
        state.open_popup = Some(marker_id);
        if !state.drafts.contains_key(&marker_id) {
            if let Some(restored) = state.restored_draft.take() {
                state.drafts.insert(marker_id, restored);
            }
        }
        drop(state);
        self.notify();
    }

    pub(crate) fn close_popup(&self) {
        let mut state = self.state.borrow_mut();
        if state.open_popup.is_none() {
            return;
        }
        state.open_popup = None;
        drop(state);
        self.notify();
    }

    pub(crate) fn edit_field(&self, marker_id: MarkerId, name: &str, value: String) {
        let mut state = self.state.borrow_mut();
        if state.registry.get(marker_id).is_none() {
            return;
        }
        state.drafts.entry(marker_id).or_default().set(name, value);
        drop(state);
        self.notify();
    }

    /// Starts a save for a marker's draft. Returns the JSON body to dispatch,
    /// or `None` when the marker is unknown, the body cannot be built, or a
    /// request is already in flight.
    pub(crate) fn begin_save(&self, marker_id: MarkerId) -> Option<String> {
        let mut state = self.state.borrow_mut();
        state.registry.get(marker_id)?;
        let draft = state.drafts.get(&marker_id).cloned().unwrap_or_default();
        let body = SavePayload::from_values(&draft).to_json().ok()?;
        if state.tracker.begin(body.clone()).is_err() {
            return None;
        }
        state.in_flight_marker = Some(marker_id);
        state.save_message = "Saving…".to_string();
        drop(state);
        self.notify();
        Some(body)
    }

    /// Lands the outcome of the in-flight request. The confirmation appears
    /// here and only here, after the server acknowledged; anything else shows
    /// as a failure.
    pub(crate) fn finish_save(&self, outcome: &SaveOutcome) {
        let mut state = self.state.borrow_mut();
        if !state.tracker.finish(outcome) {
            return;
        }
        let marker_id = state.in_flight_marker.take();
        state.save_message = outcome.to_string();
        if outcome.is_accepted() {
            state.status_line = state
                .tracker
                .submitted_body()
                .unwrap_or_default()
                .to_string();
            if let Some(marker_id) = marker_id {
                state.drafts.remove(&marker_id);
                if state.open_popup == Some(marker_id) {
                    state.open_popup = None;
                }
            }
        }
        drop(state);
        self.notify();
    }

    /// Drops the whole user overlay layer in one operation.
    pub(crate) fn clear_user_markers(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let removed = state.registry.clear_user_layer();
        if removed == 0 {
            return 0;
        }
        if let Some(open) = state.open_popup {
            if state.registry.get(open).is_none() {
                state.open_popup = None;
            }
        }
        drop(state);
        self.notify();
        removed
    }
}

impl AppState {
    fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            view: ViewState {
                center,
                zoom,
                viewport_w: 1.0,
                viewport_h: 1.0,
            },
            registry: MarkerRegistry::new(),
            open_popup: None,
            drafts: HashMap::new(),
            restored_draft: None,
            tracker: SaveTracker::new(),
            in_flight_marker: None,
            status_line: String::new(),
            save_message: String::new(),
        }
    }
}

fn build_snapshot_from_state(state: &AppState) -> AppSnapshot {
    let mut snapshot = AppSnapshot {
        center: state.view.center,
        zoom: state.view.zoom,
        viewport_w: state.view.viewport_w,
        viewport_h: state.view.viewport_h,
        markers: Vec::new(),
        open_popup: None,
        open_draft: FormValues::new(),
        save_phase: SavePhase::Idle,
        status_line: String::new(),
        save_message: String::new(),
    };
    fill_snapshot_from_state(state, &mut snapshot);
    snapshot
}

fn fill_snapshot_from_state(state: &AppState, snapshot: &mut AppSnapshot) {
    snapshot.center = state.view.center;
    snapshot.zoom = state.view.zoom;
    snapshot.viewport_w = state.view.viewport_w;
    snapshot.viewport_h = state.view.viewport_h;
    snapshot.markers.clear();
    snapshot.markers.extend_from_slice(state.registry.markers());
    snapshot.open_popup = state.open_popup;
    snapshot.open_draft = state
        .open_popup
        .and_then(|id| state.drafts.get(&id).cloned())
        .unwrap_or_default();
    snapshot.save_phase = state.tracker.phase();
    snapshot.status_line.clone_from(&state.status_line);
    snapshot.save_message.clone_from(&state.save_message);
}

pub(crate) struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
